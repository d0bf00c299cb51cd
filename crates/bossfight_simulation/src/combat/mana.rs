//! Mana management система
//!
//! - Регенерация mana (Mana::regen_rate)
//! - CastRequest → CastResolved { accepted } (нехватка mana = отказ без изменений)
//! - Под Invincibility каст бесплатный

use bevy::prelude::*;

use crate::components::{Invincibility, Mana};
use crate::logger;

/// Событие: entity хочет потратить mana на способность
#[derive(Event, Debug, Clone)]
pub struct CastRequest {
    pub caster: Entity,
    pub cost: f32,
}

/// Событие: результат CastRequest (для UI и способностей)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CastResolved {
    pub caster: Entity,
    pub accepted: bool,
}

/// Система: regenerate mana для всех entities
pub fn regenerate_mana(mut query: Query<&mut Mana>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut mana in query.iter_mut() {
        mana.regenerate(delta);
    }
}

/// Система: списание mana по CastRequest
pub fn resolve_casts(
    mut requests: EventReader<CastRequest>,
    mut casters: Query<(&mut Mana, Option<&Invincibility>)>,
    mut resolved: EventWriter<CastResolved>,
) {
    for request in requests.read() {
        let accepted = match casters.get_mut(request.caster) {
            Ok((_, Some(invincibility))) if invincibility.is_active() => request.cost >= 0.0,
            Ok((mut mana, _)) => mana.try_spend(request.cost),
            Err(_) => {
                logger::log_warning(&format!("CastRequest: caster {:?} has no Mana", request.caster));
                false
            }
        };

        if !accepted {
            logger::log(&format!("Cast rejected for {:?} (cost {})", request.caster, request.cost));
        }

        resolved.send(CastResolved {
            caster: request.caster,
            accepted,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::CombatPlugin;
    use crate::{advance_fixed, DeterministicRng};

    fn cast(app: &mut App, caster: Entity, cost: f32) -> Vec<CastResolved> {
        app.world_mut().send_event(CastRequest { caster, cost });
        advance_fixed(app, 1.0 / 60.0);
        app.world_mut()
            .resource_mut::<Events<CastResolved>>()
            .drain()
            .collect()
    }

    #[test]
    fn test_cast_spends_or_rejects() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(DeterministicRng::new(1))
            .add_plugins(CombatPlugin);
        let caster = app.world_mut().spawn(Mana::new(100.0)).id();
        let mute = app.world_mut().spawn_empty().id();

        assert_eq!(cast(&mut app, caster, 30.0), vec![CastResolved { caster, accepted: true }]);
        assert_eq!(app.world().get::<Mana>(caster).unwrap().current, 70.0);

        // Нехватка: отказ, mana только регенерирует
        assert_eq!(cast(&mut app, caster, 80.0), vec![CastResolved { caster, accepted: false }]);
        let current = app.world().get::<Mana>(caster).unwrap().current;
        assert!(current > 70.0 && current < 71.0);

        // Неуязвимость: каст принят, mana не тратится
        app.world_mut()
            .entity_mut(caster)
            .insert(Invincibility { remaining: 5.0 });
        let before = app.world().get::<Mana>(caster).unwrap().current;
        assert_eq!(cast(&mut app, caster, 500.0), vec![CastResolved { caster, accepted: true }]);
        assert!(app.world().get::<Mana>(caster).unwrap().current >= before);

        assert_eq!(
            cast(&mut app, mute, 1.0),
            vec![CastResolved {
                caster: mute,
                accepted: false
            }]
        );
    }
}
