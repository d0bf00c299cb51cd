//! Damage resolution: попадания → Combatant
//!
//! Вход: HitEvent от hit-detection слоя (сами мы геометрию не считаем):
//! - Contact: тело attacker коснулось target
//! - Area: strike-зона накрыла список entities
//! - Direct: прямой урон (атаки игрока, скрипты, тесты)
//!
//! Все попадания за тик применяются последовательно через apply_to_combatant,
//! поэтому уведомление о смерти/подавлении приходит ровно один раз.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;

use crate::combat::drops::{DropTable, SpawnRequest};
use crate::combat::status::{Burn, BurnParams};
use crate::components::{Body, Combatant, DamageOutcome, DefeatKind, Hurtbox, Invincibility, MotionIntent};
use crate::logger;
use crate::DeterministicRng;

/// Форма зоны удара
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrikeShape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl StrikeShape {
    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        let delta = point - center;
        match *self {
            StrikeShape::Circle { radius } => delta.length() <= radius,
            StrikeShape::Rect { width, height } => {
                delta.x.abs() <= width * 0.5 && delta.y.abs() <= height * 0.5
            }
        }
    }
}

/// Удар по площади, ещё не привязанный к позиции (часть скрипта атаки)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeSpec {
    pub shape: StrikeShape,
    /// Смещение центра относительно атакующего в момент удара
    pub offset: Vec2,
    pub damage: f32,
    pub burn: Option<BurnParams>,
}

/// Удар по площади в мировых координатах
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub attacker: Entity,
    pub shape: StrikeShape,
    pub center: Vec2,
    pub damage: f32,
    pub burn: Option<BurnParams>,
}

/// Событие: ядро просит hit-detection проверить зону удара
///
/// Ответ приходит как HitEvent::Area с тем же Strike.
#[derive(Event, Debug, Clone)]
pub struct StrikeRequested {
    pub strike: Strike,
}

/// Событие от hit-detection слоя
#[derive(Event, Debug, Clone)]
pub enum HitEvent {
    Contact { attacker: Entity, target: Entity },
    Area { strike: Strike, targets: Vec<Entity> },
    Direct { source: Option<Entity>, target: Entity, amount: f32 },
}

/// Событие: урон нанесен
///
/// attacker == None для burn тиков и безымянных источников.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: f32,
    pub target_defeated: bool,
}

/// Событие: entity умер (DefeatKind::Death)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Событие: entity подавлен (DefeatKind::Subdue, фрагменты)
#[derive(Event, Debug, Clone)]
pub struct EntitySubdued {
    pub entity: Entity,
    pub by: Option<Entity>,
}

/// Компонент-маркер: entity мертв
///
/// Деспавн не автоматический: трупы остаются на месте.
#[derive(Component, Debug)]
pub struct Dead;

/// Урон касанием тела
///
/// - single_hit: после попадания разоружается (атаки Knight: один удар за атаку)
/// - rehit_delay: пауза между касаниями для постоянно вооружённых (фрагменты)
#[derive(Component, Debug, Clone)]
pub struct ContactDamage {
    pub damage: f32,
    pub burn: Option<BurnParams>,
    pub armed: bool,
    pub single_hit: bool,
    pub rehit_delay: f32,
    pub rehit_timer: f32,
}

impl ContactDamage {
    /// Разоружённый, вооружается атаками босса
    pub fn per_attack() -> Self {
        Self {
            damage: 0.0,
            burn: None,
            armed: false,
            single_hit: true,
            rehit_delay: 0.0,
            rehit_timer: 0.0,
        }
    }

    /// Всегда вооружённый (касание фрагмента, камни)
    pub fn constant(damage: f32, rehit_delay: f32) -> Self {
        Self {
            damage,
            burn: None,
            armed: damage > 0.0,
            single_hit: false,
            rehit_delay,
            rehit_timer: 0.0,
        }
    }

    pub fn arm(&mut self, damage: f32, burn: Option<BurnParams>) {
        self.damage = damage;
        self.burn = burn;
        self.armed = damage > 0.0;
        self.rehit_timer = 0.0;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Вооружить заново с текущими параметрами
    pub fn rearm(&mut self) {
        self.armed = self.damage > 0.0;
        self.rehit_timer = 0.0;
    }

    pub fn ready(&self) -> bool {
        self.armed && self.rehit_timer <= 0.0
    }

    pub fn register_hit(&mut self) {
        if self.single_hit {
            self.armed = false;
        }
        self.rehit_timer = self.rehit_delay;
    }
}

/// Writers для исходов урона (общие для попаданий и burn)
#[derive(SystemParam)]
pub struct DamageWriters<'w> {
    pub dealt: EventWriter<'w, DamageDealt>,
    pub died: EventWriter<'w, EntityDied>,
    pub subdued: EventWriter<'w, EntitySubdued>,
}

/// Single mutation point: применяет урон к Combatant и рассылает события
pub fn apply_to_combatant(
    entity: Entity,
    combatant: &mut Combatant,
    amount: f32,
    source: Option<Entity>,
    writers: &mut DamageWriters,
) -> DamageOutcome {
    let outcome = combatant.take_damage(amount);
    if outcome == DamageOutcome::Ignored {
        return outcome;
    }

    writers.dealt.send(DamageDealt {
        attacker: source,
        target: entity,
        damage: outcome.dealt(),
        target_defeated: outcome.is_defeat(),
    });

    if outcome.is_defeat() {
        match combatant.defeat_kind {
            DefeatKind::Death => {
                writers.died.send(EntityDied {
                    entity,
                    killer: source,
                });
                logger::log_info(&format!("Entity {:?} killed by {:?}", entity, source));
            }
            DefeatKind::Subdue => {
                writers.subdued.send(EntitySubdued { entity, by: source });
                logger::log_info(&format!("Entity {:?} subdued by {:?}", entity, source));
            }
        }
    }

    outcome
}

type HitTargets<'w, 's> =
    Query<'w, 's, (&'static mut Combatant, Option<&'static Hurtbox>, Option<&'static Invincibility>)>;

/// Может ли target сейчас принять попадание
fn accepts_hit(targets: &HitTargets, attacker: Option<Entity>, target: Entity) -> bool {
    if attacker == Some(target) {
        return false;
    }
    let Ok((combatant, hurtbox, invincibility)) = targets.get(target) else {
        logger::log_warning(&format!("Hit on {:?} without Combatant", target));
        return false;
    };
    !combatant.is_defeated()
        && hurtbox.is_none_or(|hurtbox| hurtbox.enabled)
        && !invincibility.is_some_and(|invincibility| invincibility.is_active())
}

/// Попадание уже принято: power boost атакующего, урон, burn
fn land_hit(
    commands: &mut Commands,
    targets: &mut HitTargets,
    attacker: Option<Entity>,
    target: Entity,
    base_damage: f32,
    burn: Option<BurnParams>,
    writers: &mut DamageWriters,
) {
    let amount = match attacker.and_then(|entity| targets.get_mut(entity).ok()) {
        Some((mut attacker_combatant, _, _)) => attacker_combatant.outgoing_damage(base_damage),
        None => base_damage,
    };

    let Ok((mut combatant, _, _)) = targets.get_mut(target) else {
        return;
    };
    apply_to_combatant(target, &mut combatant, amount, attacker, writers);

    // Re-apply = insert поверх старого burn (restart)
    if let Some(burn) = burn.and_then(Burn::from_params) {
        if !combatant.is_defeated() {
            logger::log(&format!(
                "Burn applied to {:?}: {}s × {}",
                target, burn.remaining, burn.tick_damage
            ));
            commands.entity(target).insert(burn);
        }
    }
}

/// Система: применяет HitEvent к Combatant
///
/// 1. Фильтр: hurtbox выключен / неуязвимость / уже повержен → попадание игнорируется
/// 2. Contact: урон из ContactDamage атакующего (если вооружён)
/// 3. Power boost атакующего тратится на первое принятое попадание
/// 4. Burn из атаки перезапускается на цели
pub fn apply_hits(
    mut commands: Commands,
    mut hit_events: EventReader<HitEvent>,
    mut targets: HitTargets,
    mut contacts: Query<&mut ContactDamage>,
    mut writers: DamageWriters,
) {
    for hit in hit_events.read() {
        match hit {
            HitEvent::Contact { attacker, target } => {
                let Ok(mut contact) = contacts.get_mut(*attacker) else {
                    continue;
                };
                if !contact.ready() || !accepts_hit(&targets, Some(*attacker), *target) {
                    continue;
                }
                contact.register_hit();
                let (damage, burn) = (contact.damage, contact.burn);
                land_hit(&mut commands, &mut targets, Some(*attacker), *target, damage, burn, &mut writers);
            }
            HitEvent::Area { strike, targets: hit_list } => {
                for target in hit_list {
                    if accepts_hit(&targets, Some(strike.attacker), *target) {
                        land_hit(
                            &mut commands,
                            &mut targets,
                            Some(strike.attacker),
                            *target,
                            strike.damage,
                            strike.burn,
                            &mut writers,
                        );
                    }
                }
            }
            HitEvent::Direct {
                source,
                target,
                amount,
            } => {
                if accepts_hit(&targets, *source, *target) {
                    land_hit(&mut commands, &mut targets, *source, *target, *amount, None, &mut writers);
                }
            }
        }
    }
}

/// Система: обработка смерти
///
/// Dead marker, снятие burn, остановка движения, разоружение касания, drops.
/// Drops катятся один раз: EntityDied приходит ровно один раз на Combatant.
pub fn handle_defeats(
    mut commands: Commands,
    mut died_events: EventReader<EntityDied>,
    mut victims: Query<(&Body, Option<&mut MotionIntent>, Option<&mut ContactDamage>, Option<&DropTable>)>,
    mut rng: ResMut<DeterministicRng>,
    mut spawn_events: EventWriter<SpawnRequest>,
) {
    for event in died_events.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert(Dead).remove::<Burn>();
        }

        let Ok((body, motion, contact, drops)) = victims.get_mut(event.entity) else {
            continue;
        };

        if let Some(mut motion) = motion {
            *motion = MotionIntent::Stop;
        }
        if let Some(mut contact) = contact {
            contact.disarm();
        }

        if let Some(table) = drops {
            let seed: u64 = rng.rng.gen();
            let kinds = table.roll(seed);
            logger::log_info(&format!("Entity {:?} dropped {} item(s)", event.entity, kinds.len()));
            for kind in kinds {
                spawn_events.send(SpawnRequest {
                    kind,
                    position: body.position,
                    velocity: Vec2::ZERO,
                    source: Some(event.entity),
                });
            }
        }
    }
}

/// Система: пауза между касаниями
pub fn tick_contact_cooldowns(mut contacts: Query<&mut ContactDamage>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();
    for mut contact in contacts.iter_mut() {
        if contact.rehit_timer > 0.0 {
            contact.rehit_timer = (contact.rehit_timer - delta).max(0.0);
        }
    }
}

/// Система: таймер неуязвимости
pub fn tick_invincibility(mut query: Query<&mut Invincibility>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();
    for mut invincibility in query.iter_mut() {
        if invincibility.is_active() {
            invincibility.tick(delta);
        }
    }
}
