//! Headless bossfight симуляция
//!
//! Игрок против Knight и Obelok (или боссов из RON файлов).
//! Игрок "бьёт" скриптом: раз в полсекунды прямой удар по каждому
//! уязвимому противнику.
//!
//! Usage: bossfight_simulation [boss.ron ...]

use bevy::prelude::*;
use bossfight_simulation::boss::ApproachStyle;
use bossfight_simulation::logger;
use bossfight_simulation::*;

const TICKS: u32 = 3600;
const PLAYER_HIT_INTERVAL: u32 = 30;
const PLAYER_DAMAGE: f32 = 8.0;
const REPORT_INTERVAL: u32 = 600;

fn load_bosses() -> Result<Vec<BossConfig>, ConfigError> {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        return Ok(vec![BossConfig::knight(), BossConfig::obelok()]);
    }
    paths.iter().map(BossConfig::load).collect()
}

fn spawn_arena(app: &mut App, bosses: &[BossConfig]) -> Entity {
    let player = {
        let mut commands = app.world_mut().commands();
        let player = spawn_player(&mut commands, Vec2::ZERO, 300.0);

        for (index, config) in bosses.iter().enumerate() {
            let side = if index % 2 == 0 { 1.0 } else { -1.0 };
            let height = match config.approach {
                ApproachStyle::Hover { height, .. } => height,
                ApproachStyle::Ground { .. } => 0.0,
            };
            spawn_boss(&mut commands, config, Vec2::new(side * (6.0 + index as f32), height));
        }
        player
    };

    app.world_mut().flush();
    player
}

/// Скриптовый игрок: прямой удар по всем, у кого включён hurtbox
fn player_attacks(app: &mut App, player: Entity) {
    let world = app.world_mut();
    let mut targets = world.query_filtered::<(Entity, &Combatant, &Hurtbox), (Without<Player>, Without<Dead>)>();
    let hits: Vec<HitEvent> = targets
        .iter(world)
        .filter(|(_, combatant, hurtbox)| hurtbox.enabled && !combatant.is_defeated())
        .map(|(target, _, _)| HitEvent::Direct {
            source: Some(player),
            target,
            amount: PLAYER_DAMAGE,
        })
        .collect();

    world.send_event_batch(hits);
}

fn report(app: &mut App, tick: u32, player: Entity) {
    let world = app.world_mut();

    if let Some(combatant) = world.get::<Combatant>(player) {
        logger::log_info(&format!("Tick {}: player {}/{} hp", tick, combatant.current, combatant.max));
    }

    let mut bosses = world.query::<(&Name, &Combatant, &BossController)>();
    for (name, combatant, controller) in bosses.iter(world) {
        if !controller.is_active() {
            continue;
        }
        logger::log_info(&format!(
            "Tick {}: {} {}/{} hp, {:?}, {}",
            tick,
            name,
            combatant.current,
            combatant.max,
            controller.phase(),
            controller.state().label()
        ));
    }
}

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);

    let bosses = match load_bosses() {
        Ok(bosses) => bosses,
        Err(error) => {
            logger::log_error(&format!("{}", error));
            std::process::exit(1);
        }
    };
    logger::log_info(&format!(
        "Starting bossfight simulation (seed: {}, bosses: {})",
        seed,
        bosses.len()
    ));

    let player = spawn_arena(&mut app, &bosses);

    for tick in 0..TICKS {
        app.update();

        if tick % PLAYER_HIT_INTERVAL == 0 {
            player_attacks(&mut app, player);
        }
        if tick % REPORT_INTERVAL == 0 {
            report(&mut app, tick, player);
        }

        if app.world().get::<Dead>(player).is_some() {
            logger::log_info(&format!("Player died at tick {}", tick));
            break;
        }
    }

    report(&mut app, TICKS, player);
    logger::log_info("Simulation complete!");
}
