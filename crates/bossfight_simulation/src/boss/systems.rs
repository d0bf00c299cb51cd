//! Boss ECS systems: цели, phase trigger, тик контроллеров
//!
//! Порядок (SimulationSet::Decide, chained):
//! acquire_targets → check_phase_thresholds → tick_boss_controllers
//!
//! Phase trigger до тика контроллера: новое поведение работает с того же тика.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::boss::config::PhaseMode;
use crate::boss::controller::{BossController, Observation};
use crate::boss::events::{AnimationHint, AttackStarted, BossTarget, PhaseChanged};
use crate::boss::phase::PhaseTrigger;
use crate::boss::script::SpawnSpec;
use crate::combat::damage::{ContactDamage, Dead, Strike, StrikeRequested};
use crate::combat::drops::SpawnRequest;
use crate::components::{Arena, Body, Combatant, MotionIntent, Player};
use crate::logger;
use crate::DeterministicRng;

/// Система: выбор цели (lazy re-acquire)
///
/// Цель невалидна (despawn / повержена) → первый живой Player, либо None.
pub fn acquire_targets(
    mut bosses: Query<(Entity, &mut BossTarget), Without<Dead>>,
    players: Query<(Entity, &Combatant), With<Player>>,
) {
    for (entity, mut target) in bosses.iter_mut() {
        let still_valid = target
            .0
            .is_some_and(|current| players.get(current).is_ok_and(|(_, combatant)| !combatant.is_defeated()));
        if still_valid {
            continue;
        }

        let next = players
            .iter()
            .find(|(_, combatant)| !combatant.is_defeated())
            .map(|(player, _)| player);

        if next != target.0 {
            match next {
                Some(player) => logger::log(&format!("Boss {:?} targets {:?}", entity, player)),
                None => logger::log(&format!("Boss {:?} lost its target", entity)),
            }
            target.0 = next;
        }
    }
}

/// Система: Phase1 → Phase2 по порогу здоровья (один раз)
pub fn check_phase_thresholds(
    mut bosses: Query<
        (
            Entity,
            &Combatant,
            &mut PhaseTrigger,
            &mut BossController,
            Option<&mut ContactDamage>,
        ),
        Without<Dead>,
    >,
    mut phase_events: EventWriter<PhaseChanged>,
) {
    for (entity, combatant, mut trigger, mut controller, contact) in bosses.iter_mut() {
        if combatant.is_defeated() || !trigger.check(combatant.current, combatant.max) {
            continue;
        }
        if !controller.enter_phase_two() {
            continue;
        }

        // Атака в полёте прервана: её касание больше не бьёт
        if let Some(mut contact) = contact {
            if contact.single_hit {
                contact.disarm();
            }
        }

        let split = matches!(
            controller.config().phase.as_ref().map(|phase| &phase.mode),
            Some(PhaseMode::Split { .. })
        );

        logger::log_info(&format!(
            "{} {:?} enters phase 2 at {}/{} hp{}",
            controller.config().name,
            entity,
            combatant.current,
            combatant.max,
            if split { " (split)" } else { "" }
        ));

        phase_events.send(PhaseChanged {
            boss: entity,
            phase: controller.phase(),
            split,
        });
    }
}

/// Writers для выходов контроллера
#[derive(SystemParam)]
pub struct BossWriters<'w> {
    pub strikes: EventWriter<'w, StrikeRequested>,
    pub spawns: EventWriter<'w, SpawnRequest>,
    pub attacks: EventWriter<'w, AttackStarted>,
    pub animations: EventWriter<'w, AnimationHint>,
}

type BossQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut BossController,
        &'static BossTarget,
        &'static Body,
        &'static mut MotionIntent,
        &'static mut Combatant,
        Option<&'static mut ContactDamage>,
    ),
    Without<Dead>,
>;

/// Система: тик всех активных контроллеров
///
/// Observation из Body (spatial query) → BossController::tick → MotionIntent,
/// StrikeRequested, SpawnRequest, ContactDamage arm/disarm, power boost.
pub fn tick_boss_controllers(
    mut bosses: BossQuery,
    bodies: Query<&Body>,
    arena: Res<Arena>,
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    mut writers: BossWriters,
) {
    let delta = time.delta_secs();

    for (entity, mut controller, target, body, mut motion, mut combatant, mut contact) in bosses.iter_mut() {
        // Неактивные фрагменты двигает fragments::follow_parent
        if !controller.is_active() {
            continue;
        }

        let observation = Observation {
            position: body.position,
            velocity: body.velocity,
            grounded: body.grounded,
            target: target.0.and_then(|target| bodies.get(target).ok()).map(|target| target.position),
            ground_y: arena.floor_y,
        };

        let out = controller.tick(delta, &observation, &mut rng.rng);
        *motion = out.motion;

        if let Some(name) = out.animation {
            logger::log(&format!("{} {:?} → {}", controller.config().name, entity, name));
            writers.animations.send(AnimationHint { entity, name });
        }

        if let Some(attack) = out.attack_started {
            if let (Some(contact), Some(definition)) = (contact.as_mut(), controller.catalog().get(attack)) {
                if definition.contact && contact.single_hit {
                    contact.arm(definition.damage, definition.burn);
                }
            }
            writers.attacks.send(AttackStarted { boss: entity, attack });
        }

        if out.power_boost_armed {
            combatant.arm_power_boost();
            logger::log(&format!("{} {:?} power boost armed", controller.config().name, entity));
        }

        for spec in out.strikes {
            writers.strikes.send(StrikeRequested {
                strike: Strike {
                    attacker: entity,
                    shape: spec.shape,
                    center: body.position + spec.offset,
                    damage: spec.damage,
                    burn: spec.burn,
                },
            });
        }

        for (spawn, position) in out.spawns {
            let (kind, velocity) = match spawn {
                SpawnSpec::Projectile { kind, velocity } => (kind, velocity),
                SpawnSpec::Summon { kind } => (kind, Vec2::ZERO),
            };
            writers.spawns.send(SpawnRequest {
                kind,
                position,
                velocity,
                source: Some(entity),
            });
        }

        if out.attack_finished.is_some() {
            if let Some(contact) = contact.as_mut() {
                if contact.single_hit {
                    contact.disarm();
                }
            }
        }
    }
}
