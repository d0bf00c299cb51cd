//! Spawn helpers: босс (с фрагментами) и игрок

use bevy::prelude::*;

use crate::boss::config::{ApproachStyle, BossConfig, PhaseMode};
use crate::boss::controller::BossController;
use crate::boss::events::BossTarget;
use crate::boss::phase::PhaseTrigger;
use crate::combat::damage::ContactDamage;
use crate::components::{Body, Combatant, DefeatKind, Hurtbox, Mana, MotionIntent, Player};
use crate::fragments::{Fragment, FragmentAssembly};

/// Пауза между касаниями постоянно вооружённого тела
pub const CONTACT_REHIT_DELAY: f32 = 0.5;

/// Базовый набор компонентов босса по конфигу
fn boss_bundle(config: &BossConfig, position: Vec2) -> impl Bundle {
    let body = match config.approach {
        ApproachStyle::Hover { .. } => Body::flying_at(position),
        ApproachStyle::Ground { .. } => Body::grounded_at(position),
    };
    let contact = if config.contact_damage > 0.0 {
        ContactDamage::constant(config.contact_damage, CONTACT_REHIT_DELAY)
    } else {
        ContactDamage::per_attack()
    };

    (
        Name::new(config.name.clone()),
        BossController::new(config.clone(), position),
        Combatant::new(config.max_health, config.defeat),
        body,
        MotionIntent::default(),
        BossTarget::default(),
        contact,
        Hurtbox::default(),
    )
}

/// Spawn босса из конфига
///
/// - PhaseTrigger если у конфига есть фаза 2
/// - DropTable если есть drops
/// - Split фаза: фрагменты спавнятся сразу, неактивными и без hurtbox
pub fn spawn_boss(commands: &mut Commands, config: &BossConfig, position: Vec2) -> Entity {
    let boss = commands.spawn(boss_bundle(config, position)).id();

    if let Some(drops) = &config.drops {
        commands.entity(boss).insert(drops.clone());
    }

    let Some(phase) = &config.phase else {
        return boss;
    };
    commands.entity(boss).insert(PhaseTrigger::new(phase.threshold));

    if let PhaseMode::Split {
        reassemble_duration,
        fragments,
        ..
    } = &phase.mode
    {
        let mut members = Vec::with_capacity(fragments.len());
        for spec in fragments {
            let offset = Vec2::from(spec.offset);
            let mut controller = BossController::new(spec.config.clone(), position + offset);
            controller.deactivate();
            // Спящий фрагмент не бьёт касанием до распада
            let mut contact = ContactDamage::constant(spec.config.contact_damage, CONTACT_REHIT_DELAY);
            contact.disarm();

            let fragment = commands
                .spawn(boss_bundle(&spec.config, position + offset))
                .insert((
                    controller,
                    contact,
                    Hurtbox { enabled: false },
                    Fragment {
                        assembly: boss,
                        offset,
                    },
                ))
                .id();
            members.push(fragment);
        }
        commands
            .entity(boss)
            .insert(FragmentAssembly::new(members, *reassemble_duration));
    }

    boss
}

/// Spawn игрока: цель боссов
pub fn spawn_player(commands: &mut Commands, position: Vec2, max_health: f32) -> Entity {
    commands
        .spawn((
            Name::new("Player"),
            Player,
            Combatant::new(max_health, DefeatKind::Death),
            Mana::default(),
            Body::grounded_at(position),
            Hurtbox::default(),
        ))
        .id()
}
