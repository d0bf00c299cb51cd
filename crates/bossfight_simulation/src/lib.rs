//! Bossfight Simulation Core
//!
//! ECS-симуляция боссов 2D платформера на Bevy 0.16 (headless)
//!
//! Ядро = правила боя и решения боссов:
//! - combat: Combatant, урон, burn, drops, mana
//! - boss: data-driven FSM (Knight, Obelok, фрагменты), phase trigger
//! - fragments: составной босс и окно уязвимости
//!
//! Физика/рендер/анимации: внешний слой. Ядро пишет MotionIntent,
//! StrikeRequested, SpawnRequest, AnimationHint и читает HitEvent.
//! В headless режиме внешний слой изображает HeadlessWorldPlugin.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod boss;
pub mod combat;
pub mod components;
pub mod fragments;
pub mod headless;
pub mod logger;

// Re-export базовых типов для удобства
pub use boss::{
    spawn_boss, spawn_player, BossConfig, BossController, BossPhase, BossPlugin, BossState, BossTarget, ConfigError,
    PhaseChanged,
};
pub use combat::{
    AttackCatalog, AttackName, Burn, CombatPlugin, ContactDamage, DamageDealt, Dead, EntityDied, EntitySubdued,
    HitEvent, SpawnRequest,
};
pub use components::*;
pub use fragments::{Fragment, FragmentAssembly, FragmentsPlugin, VulnerabilityWindow};
pub use headless::HeadlessWorldPlugin;
use logger::{init_logger, LogLevel};

/// Порядок фаз тика (FixedUpdate)
///
/// Timers → Decide → World → Resolve → Aftermath:
/// cooldown'ы уменьшаются до выбора атак, урон применяется после коллизий,
/// последствия (subdue, окно уязвимости): в конце тика.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Timers,
    Decide,
    World,
    Resolve,
    Aftermath,
}

/// Идемпотентно: каждый plugin вызывает при build
pub fn configure_simulation_sets(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            SimulationSet::Timers,
            SimulationSet::Decide,
            SimulationSet::World,
            SimulationSet::Resolve,
            SimulationSet::Aftermath,
        )
            .chain(),
    );
}

/// Настройки симуляции (tick rate, seed, уровень логов)
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub tick_hz: f64,
    pub seed: u64,
    pub log_level: LogLevel,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            log_level: LogLevel::Info,
        }
    }
}

/// Главный plugin симуляции (объединяет все подсистемы ядра)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .copied()
            .unwrap_or_default();

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            // Детерминистичный RNG (единственный источник случайности)
            .insert_resource(DeterministicRng::new(config.seed))
            .insert_resource(config)
            .init_resource::<Arena>()
            .add_plugins((CombatPlugin, BossPlugin, FragmentsPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции (60Hz, seed)
pub fn create_headless_app(seed: u64) -> App {
    create_headless_app_with(SimulationConfig {
        seed,
        ..SimulationConfig::default()
    })
}

/// Headless App: один app.update() = один fixed tick
pub fn create_headless_app_with(config: SimulationConfig) -> App {
    init_logger();
    logger::set_log_level(config.log_level);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / config.tick_hz,
        )))
        .insert_resource(config)
        .add_plugins((SimulationPlugin, HeadlessWorldPlugin));

    app
}

/// Прогоняет ровно один FixedUpdate с заданным dt (для тестов)
pub fn advance_fixed(app: &mut App, delta_secs: f32) {
    let world = app.world_mut();
    world
        .resource_mut::<Time<Fixed>>()
        .advance_by(Duration::from_secs_f32(delta_secs));
    world.run_schedule(FixedUpdate);
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
