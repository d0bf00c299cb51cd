//! Boss module: data-driven state machine для всех боссов
//!
//! - config: BossConfig (RON/пресеты), ConfigError
//! - selection: ability/basic cooldown + flee roll
//! - script: Maneuver → шаги атаки по тикам
//! - controller: BossController (чистый FSM)
//! - phase: PhaseTrigger (one-shot по порогу здоровья)
//! - systems: ECS-обвязка (цели, фазы, тик контроллеров)

use bevy::prelude::*;

use crate::{configure_simulation_sets, SimulationSet};

pub mod config;
pub mod controller;
pub mod events;
pub mod phase;
pub mod script;
pub mod selection;
pub mod spawn;
pub mod state;
pub mod systems;

#[cfg(test)]
mod systems_tests;

pub use config::{ApproachStyle, BossConfig, ConfigError, FleeConfig, FragmentSpec, PhaseConfig, PhaseMode, SelectionConfig};
pub use controller::{BossController, BossOutput, Observation};
pub use events::{AnimationHint, AttackStarted, BossTarget, PhaseChanged};
pub use phase::PhaseTrigger;
pub use selection::{AttackSelector, Decision};
pub use spawn::{spawn_boss, spawn_player};
pub use state::{BossPhase, BossState};

/// Boss Plugin
///
/// Порядок выполнения (FixedUpdate, SimulationSet::Decide):
/// 1. acquire_targets: lazy re-acquire цели
/// 2. check_phase_thresholds: смена фазы до решения контроллера
/// 3. tick_boss_controllers: FSM, motion intent, удары, спавны
pub struct BossPlugin;

impl Plugin for BossPlugin {
    fn build(&self, app: &mut App) {
        configure_simulation_sets(app);

        app.add_event::<AttackStarted>()
            .add_event::<PhaseChanged>()
            .add_event::<AnimationHint>();

        app.add_systems(
            FixedUpdate,
            (
                systems::acquire_targets,
                systems::check_phase_thresholds,
                systems::tick_boss_controllers,
            )
                .chain()
                .in_set(SimulationSet::Decide),
        );
    }
}
