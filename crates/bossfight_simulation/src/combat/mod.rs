//! Combat system module
//!
//! ECS ответственность:
//! - Game state: Combatant, Mana, Burn, ContactDamage
//! - Combat rules: power boost, burn restart, hurtbox/invincibility фильтр
//! - Events: DamageDealt, EntityDied, EntitySubdued, SpawnRequest
//!
//! Внешний слой (физика/коллизии):
//! - отвечает на StrikeRequested → HitEvent::Area
//! - сообщает касания тел → HitEvent::Contact

use bevy::prelude::*;

use crate::{configure_simulation_sets, SimulationSet};

pub mod catalog;
pub mod damage;
pub mod drops;
pub mod mana;
pub mod status;

#[cfg(test)]
mod damage_tests;

// Re-export основных типов
pub use catalog::{Attack, AttackCatalog, AttackName, Maneuver};
pub use damage::{
    apply_to_combatant, ContactDamage, DamageDealt, Dead, EntityDied, EntitySubdued, HitEvent, Strike,
    StrikeRequested, StrikeShape, StrikeSpec,
};
pub use drops::{drop_count, pick_drop, DropEntry, DropTable, SpawnRequest};
pub use mana::{CastRequest, CastResolved};
pub use status::{Burn, BurnParams, BURN_TICK_INTERVAL};

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. Timers: contact cooldowns, неуязвимость, mana regen, casts
/// 2. Resolve: apply_hits → tick_burns → handle_defeats
///
/// Между ними (Decide/World) боссы выбирают атаки, а физический слой
/// превращает StrikeRequested/касания в HitEvent.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        configure_simulation_sets(app);

        // Регистрация событий
        app.add_event::<HitEvent>()
            .add_event::<StrikeRequested>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<EntitySubdued>()
            .add_event::<SpawnRequest>()
            .add_event::<CastRequest>()
            .add_event::<CastResolved>();

        app.add_systems(
            FixedUpdate,
            (
                damage::tick_contact_cooldowns,
                damage::tick_invincibility,
                mana::regenerate_mana,
                mana::resolve_casts,
            )
                .chain()
                .in_set(SimulationSet::Timers),
        );

        app.add_systems(
            FixedUpdate,
            (damage::apply_hits, status::tick_burns, damage::handle_defeats)
                .chain() // Последовательное применение урона
                .in_set(SimulationSet::Resolve),
        );
    }
}
