//! Headless world: минимальная замена физики/сцены для тестов и CLI
//!
//! Ядро не вызывает этот модуль: оно пишет MotionIntent и StrikeRequested,
//! а здесь они превращаются в движение тел и HitEvent.
//! В игре эту роль играет движок (коллизии, rigidbody).

use bevy::prelude::*;

use crate::combat::damage::{ContactDamage, Dead, HitEvent, StrikeRequested};
use crate::components::{Arena, Body, MotionIntent, Player};
use crate::{configure_simulation_sets, SimulationSet};

/// Дистанция "тела касаются"
pub const CONTACT_RADIUS: f32 = 1.0;

/// Headless World Plugin (SimulationSet::World)
///
/// integrate_bodies → resolve_strikes → detect_contacts
pub struct HeadlessWorldPlugin;

impl Plugin for HeadlessWorldPlugin {
    fn build(&self, app: &mut App) {
        configure_simulation_sets(app);

        app.add_systems(
            FixedUpdate,
            (integrate_bodies, resolve_strikes, detect_contacts)
                .chain()
                .in_set(SimulationSet::World),
        );
    }
}

/// Применяет motion intent к скорости (без интеграции)
///
/// Возвращает true если MoveTowards уже доставил тело в точку.
fn apply_motion(body: &mut Body, motion: MotionIntent, delta: f32) -> bool {
    match motion {
        MotionIntent::Keep => {}
        MotionIntent::Stop => body.velocity = Vec2::ZERO,
        MotionIntent::Velocity(velocity) => body.velocity = velocity,
        MotionIntent::Horizontal(x) => body.velocity.x = x,
        MotionIntent::Vertical(y) => body.velocity.y = y,
        MotionIntent::MoveTowards { target, speed } => {
            let offset = target - body.position;
            let distance = offset.length();
            // Без overshoot: последний шаг ставит тело ровно в точку
            if distance <= speed.max(0.0) * delta || distance <= f32::EPSILON {
                body.position = target;
                body.velocity = Vec2::ZERO;
                return true;
            }
            body.velocity = offset / distance * speed;
        }
    }
    false
}

/// Один шаг тела: motion intent → гравитация → позиция → пол
fn step_body(body: &mut Body, motion: MotionIntent, arena: &Arena, delta: f32) {
    if apply_motion(body, motion, delta) {
        return;
    }

    if body.gravity_scale > 0.0 && !(body.grounded && body.velocity.y <= 0.0) {
        body.velocity.y -= arena.gravity * body.gravity_scale * delta;
    }

    let step = body.velocity * delta;
    body.position += step;

    if body.gravity_scale > 0.0 {
        if body.position.y <= arena.floor_y {
            body.position.y = arena.floor_y;
            body.velocity.y = body.velocity.y.max(0.0);
            body.grounded = true;
        } else {
            body.grounded = false;
        }
    }
}

/// Система: кинематическая интеграция тел (гравитация + плоский пол)
pub fn integrate_bodies(mut bodies: Query<(&mut Body, &MotionIntent)>, arena: Res<Arena>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut body, motion) in bodies.iter_mut() {
        step_body(&mut body, *motion, &arena, delta);
    }
}

/// Система: StrikeRequested → HitEvent::Area по игрокам внутри формы
pub fn resolve_strikes(
    mut strikes: EventReader<StrikeRequested>,
    players: Query<(Entity, &Body), (With<Player>, Without<Dead>)>,
    mut hits: EventWriter<HitEvent>,
) {
    for request in strikes.read() {
        let strike = &request.strike;
        let targets: Vec<Entity> = players
            .iter()
            .filter(|(_, body)| strike.shape.contains(strike.center, body.position))
            .map(|(entity, _)| entity)
            .collect();

        if !targets.is_empty() {
            hits.send(HitEvent::Area {
                strike: strike.clone(),
                targets,
            });
        }
    }
}

/// Система: вооружённое тело рядом с игроком → HitEvent::Contact
pub fn detect_contacts(
    attackers: Query<(Entity, &Body, &ContactDamage), Without<Dead>>,
    players: Query<(Entity, &Body), (With<Player>, Without<Dead>)>,
    mut hits: EventWriter<HitEvent>,
) {
    for (attacker, attacker_body, contact) in attackers.iter() {
        if !contact.ready() {
            continue;
        }
        for (player, player_body) in players.iter() {
            if attacker_body.position.distance(player_body.position) <= CONTACT_RADIUS {
                hits.send(HitEvent::Contact {
                    attacker,
                    target: player,
                });
            }
        }
    }
}
