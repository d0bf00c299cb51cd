//! App-level tests для boss систем (цели, phase trigger, тик контроллеров)

use bevy::prelude::*;

use super::config::BossConfig;
use super::events::{BossTarget, PhaseChanged};
use super::spawn::{spawn_boss, spawn_player};
use super::state::{BossPhase, BossState};
use super::BossController;
use crate::combat::catalog::AttackCatalog;
use crate::combat::damage::{DamageDealt, HitEvent};
use crate::components::{Combatant, MotionIntent};
use crate::{advance_fixed, create_headless_app};

const DT: f32 = 1.0 / 60.0;

fn arena_with(config: &BossConfig, boss_at: Vec2, player_at: Vec2) -> (App, Entity, Entity) {
    let mut app = create_headless_app(7);
    let (boss, player) = {
        let mut commands = app.world_mut().commands();
        let player = spawn_player(&mut commands, player_at, 100.0);
        (spawn_boss(&mut commands, config, boss_at), player)
    };
    app.world_mut().flush();
    (app, boss, player)
}

fn step(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        advance_fixed(app, DT);
    }
}

fn strike(app: &mut App, target: Entity, amount: f32) {
    app.world_mut().send_event(HitEvent::Direct {
        source: None,
        target,
        amount,
    });
}

fn controller(app: &App, boss: Entity) -> &BossController {
    app.world().get::<BossController>(boss).unwrap()
}

fn phase_changes(app: &mut App) -> Vec<PhaseChanged> {
    app.world_mut()
        .resource_mut::<Events<PhaseChanged>>()
        .drain()
        .collect()
}

#[test]
fn test_boss_acquires_first_living_player() {
    let (mut app, boss, player) = arena_with(&BossConfig::knight(), Vec2::new(30.0, 0.0), Vec2::ZERO);

    step(&mut app, 1);
    assert_eq!(app.world().get::<BossTarget>(boss).unwrap().0, Some(player));

    strike(&mut app, player, 1000.0);
    step(&mut app, 2);
    assert_eq!(app.world().get::<BossTarget>(boss).unwrap().0, None);
}

#[test]
fn test_knight_phase_two_triggers_once_at_half_health() {
    // Далеко от игрока: контроллер спит в Idle
    let (mut app, boss, _) = arena_with(&BossConfig::knight(), Vec2::new(30.0, 0.0), Vec2::ZERO);

    strike(&mut app, boss, 49.0);
    step(&mut app, 2);
    assert_eq!(app.world().get::<Combatant>(boss).unwrap().current, 51.0);
    assert!(phase_changes(&mut app).is_empty());
    assert_eq!(controller(&app, boss).phase(), BossPhase::Phase1);

    strike(&mut app, boss, 1.0);
    step(&mut app, 2);
    let changes = phase_changes(&mut app);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].boss, boss);
    assert_eq!(changes[0].phase, BossPhase::Phase2);
    assert!(!changes[0].split);
    assert_eq!(*controller(&app, boss).catalog(), AttackCatalog::knight_phase2());

    // Дальнейший урон фазу не перезапускает
    strike(&mut app, boss, 10.0);
    step(&mut app, 2);
    assert!(phase_changes(&mut app).is_empty());
    assert_eq!(controller(&app, boss).phase(), BossPhase::Phase2);
}

#[test]
fn test_obelok_phase_two_is_split() {
    let (mut app, boss, _) = arena_with(&BossConfig::obelok(), Vec2::new(30.0, 4.0), Vec2::ZERO);

    strike(&mut app, boss, 60.0);
    step(&mut app, 2);

    let changes = phase_changes(&mut app);
    assert_eq!(changes.len(), 1);
    assert!(changes[0].split);
    assert_eq!(*controller(&app, boss).state(), BossState::Splitting);
}

#[test]
fn test_missing_target_freezes_controller() {
    let (mut app, boss, player) = arena_with(&BossConfig::knight(), Vec2::new(3.0, 0.0), Vec2::ZERO);

    step(&mut app, 1);
    assert!(matches!(controller(&app, boss).state(), BossState::Awakening { .. }));

    strike(&mut app, player, 1000.0);
    step(&mut app, 2);
    let frozen = controller(&app, boss).state().clone();

    step(&mut app, 120);
    assert_eq!(*controller(&app, boss).state(), frozen);
    assert_eq!(*app.world().get::<MotionIntent>(boss).unwrap(), MotionIntent::Stop);
}

#[test]
fn test_knight_engages_nearby_player() {
    let (mut app, _, player) = arena_with(&BossConfig::knight(), Vec2::new(4.0, 0.0), Vec2::ZERO);

    step(&mut app, 60 * 20);

    let hits_on_player = app
        .world_mut()
        .resource_mut::<Events<DamageDealt>>()
        .drain()
        .filter(|event| event.target == player)
        .count();
    assert!(hits_on_player > 0);
    assert!(app.world().get::<Combatant>(player).unwrap().current < 100.0);
}
