//! App-level tests для damage pipeline (HitEvent → Combatant → события)

use bevy::prelude::*;

use super::damage::*;
use super::drops::{DropEntry, DropTable, SpawnRequest};
use super::status::{Burn, BurnParams};
use super::CombatPlugin;
use crate::components::*;
use crate::{advance_fixed, DeterministicRng};

const DT: f32 = 1.0 / 60.0;

fn combat_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(42))
        .add_plugins(CombatPlugin);
    app
}

fn spawn_fighter(app: &mut App, max_health: f32) -> Entity {
    app.world_mut()
        .spawn((
            Combatant::new(max_health, DefeatKind::Death),
            Body::grounded_at(Vec2::ZERO),
            MotionIntent::default(),
            Hurtbox::default(),
        ))
        .id()
}

fn health(app: &App, entity: Entity) -> f32 {
    app.world().get::<Combatant>(entity).unwrap().current
}

fn hit(app: &mut App, event: HitEvent) {
    app.world_mut().send_event(event);
}

fn direct(source: Entity, target: Entity, amount: f32) -> HitEvent {
    HitEvent::Direct {
        source: Some(source),
        target,
        amount,
    }
}

fn drain<E: Event + Clone>(app: &mut App) -> Vec<E> {
    app.world_mut()
        .resource_mut::<Events<E>>()
        .drain()
        .collect()
}

#[test]
fn test_power_boost_applies_once() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let target = spawn_fighter(&mut app, 100.0);
    app.world_mut()
        .get_mut::<Combatant>(attacker)
        .unwrap()
        .arm_power_boost();

    hit(&mut app, direct(attacker, target, 10.0));
    advance_fixed(&mut app, DT);
    assert_eq!(health(&app, target), 100.0 - 10.0 * POWER_BOOST_MULTIPLIER);
    assert!(!app.world().get::<Combatant>(attacker).unwrap().power_boost_armed());

    // Второй удар без множителя
    hit(&mut app, direct(attacker, target, 10.0));
    advance_fixed(&mut app, DT);
    assert_eq!(health(&app, target), 100.0 - 10.0 * POWER_BOOST_MULTIPLIER - 10.0);
}

#[test]
fn test_power_boost_survives_ignored_hit() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let shielded = spawn_fighter(&mut app, 100.0);
    let target = spawn_fighter(&mut app, 100.0);
    app.world_mut().get_mut::<Hurtbox>(shielded).unwrap().enabled = false;
    app.world_mut()
        .get_mut::<Combatant>(attacker)
        .unwrap()
        .arm_power_boost();

    // Попадание в выключенный hurtbox не тратит boost
    hit(&mut app, direct(attacker, shielded, 10.0));
    advance_fixed(&mut app, DT);
    assert_eq!(health(&app, shielded), 100.0);
    assert!(app.world().get::<Combatant>(attacker).unwrap().power_boost_armed());

    hit(&mut app, direct(attacker, target, 10.0));
    advance_fixed(&mut app, DT);
    assert_eq!(health(&app, target), 100.0 - 10.0 * POWER_BOOST_MULTIPLIER);
}

#[test]
fn test_invincibility_ignores_hits() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let target = spawn_fighter(&mut app, 100.0);
    app.world_mut()
        .entity_mut(target)
        .insert(Invincibility { remaining: 1.0 });

    hit(&mut app, direct(attacker, target, 30.0));
    advance_fixed(&mut app, DT);
    assert_eq!(health(&app, target), 100.0);

    // Неуязвимость истекла
    for _ in 0..70 {
        advance_fixed(&mut app, DT);
    }
    hit(&mut app, direct(attacker, target, 30.0));
    advance_fixed(&mut app, DT);
    assert_eq!(health(&app, target), 70.0);
}

#[test]
fn test_contact_hits_once_per_attack() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let target = spawn_fighter(&mut app, 100.0);
    let mut contact = ContactDamage::per_attack();
    contact.arm(20.0, None);
    app.world_mut().entity_mut(attacker).insert(contact);

    let touch = HitEvent::Contact { attacker, target };
    hit(&mut app, touch.clone());
    hit(&mut app, touch.clone());
    advance_fixed(&mut app, DT);
    hit(&mut app, touch);
    advance_fixed(&mut app, DT);

    assert_eq!(health(&app, target), 80.0);
    assert!(!app.world().get::<ContactDamage>(attacker).unwrap().armed);
}

#[test]
fn test_constant_contact_respects_rehit_delay() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let target = spawn_fighter(&mut app, 100.0);
    app.world_mut()
        .entity_mut(attacker)
        .insert(ContactDamage::constant(5.0, 0.5));

    let touch = HitEvent::Contact { attacker, target };
    for _ in 0..60 {
        hit(&mut app, touch.clone());
        advance_fixed(&mut app, DT);
    }

    // 1 секунда касания при паузе 0.5с → 2 попадания (+ возможно третье на границе)
    let dealt = 100.0 - health(&app, target);
    assert!(dealt == 10.0 || dealt == 15.0, "dealt = {}", dealt);
}

#[test]
fn test_area_strike_applies_burn() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let target = spawn_fighter(&mut app, 100.0);

    hit(
        &mut app,
        HitEvent::Area {
            strike: Strike {
                attacker,
                shape: StrikeShape::Circle { radius: 2.5 },
                center: Vec2::ZERO,
                damage: 10.0,
                burn: Some(BurnParams::new(3.0, 2.0)),
            },
            targets: vec![target],
        },
    );
    advance_fixed(&mut app, DT);
    assert!(health(&app, target) <= 90.0);

    for _ in 0..200 {
        advance_fixed(&mut app, DT);
    }

    // 10 удар + 3 тика по 2
    assert_eq!(health(&app, target), 84.0);
    assert!(app.world().get::<Burn>(target).is_none());
}

#[test]
fn test_simultaneous_hits_single_death() {
    let mut app = combat_app();
    let first = spawn_fighter(&mut app, 100.0);
    let second = spawn_fighter(&mut app, 100.0);
    let target = spawn_fighter(&mut app, 30.0);

    hit(&mut app, direct(first, target, 20.0));
    hit(&mut app, direct(second, target, 20.0));
    hit(&mut app, direct(first, target, 20.0));
    advance_fixed(&mut app, DT);

    let deaths = drain::<EntityDied>(&mut app);
    let dealt = drain::<DamageDealt>(&mut app);

    assert_eq!(health(&app, target), 0.0);
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].killer, Some(second));
    // Оба удара до смерти применились, третий: no-op
    assert_eq!(dealt.len(), 2);
    assert!(app.world().get::<Dead>(target).is_some());
}

#[test]
fn test_death_rolls_drops_once() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let target = spawn_fighter(&mut app, 10.0);
    app.world_mut().entity_mut(target).insert(DropTable {
        min: 2,
        max: 2,
        entries: vec![DropEntry::new("coin", 1.0)],
    });

    hit(&mut app, direct(attacker, target, 50.0));
    advance_fixed(&mut app, DT);
    hit(&mut app, direct(attacker, target, 50.0));
    advance_fixed(&mut app, DT);

    let drops = drain::<SpawnRequest>(&mut app);
    assert_eq!(drops.len(), 2);
    assert!(drops.iter().all(|drop| drop.kind == "coin" && drop.source == Some(target)));
    assert_eq!(
        *app.world().get::<MotionIntent>(target).unwrap(),
        MotionIntent::Stop
    );
}

#[test]
fn test_subdue_does_not_drop_or_die() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let fragment = app
        .world_mut()
        .spawn((
            Combatant::new(25.0, DefeatKind::Subdue),
            Body::flying_at(Vec2::ZERO),
            DropTable {
                min: 1,
                max: 1,
                entries: vec![DropEntry::new("coin", 1.0)],
            },
        ))
        .id();

    hit(&mut app, direct(attacker, fragment, 40.0));
    advance_fixed(&mut app, DT);

    assert_eq!(drain::<EntitySubdued>(&mut app).len(), 1);
    assert!(drain::<EntityDied>(&mut app).is_empty());
    assert!(drain::<SpawnRequest>(&mut app).is_empty());
    assert!(app.world().get::<Dead>(fragment).is_none());
    assert!(app.world().get::<Combatant>(fragment).unwrap().is_subdued());
}

#[test]
fn test_hit_on_missing_entity_is_ignored() {
    let mut app = combat_app();
    let attacker = spawn_fighter(&mut app, 100.0);
    let ghost = app.world_mut().spawn_empty().id();
    app.world_mut().despawn(ghost);

    hit(&mut app, direct(attacker, ghost, 10.0));
    advance_fixed(&mut app, DT);

    assert!(drain::<DamageDealt>(&mut app).is_empty());
}
