//! Burn debuff: damage-over-time с фиксированным тиком 1 сек
//!
//! Re-apply заменяет текущий burn целиком (restart, не stack/extend).
//! Первый тик срабатывает сразу при следующем апдейте после наложения.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::damage::{apply_to_combatant, DamageWriters};
use crate::components::Combatant;
use crate::logger;

/// Интервал между тиками burn (секунды)
pub const BURN_TICK_INTERVAL: f32 = 1.0;

/// Параметры burn в описании атаки (config data)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurnParams {
    pub duration: f32,
    pub tick_damage: f32,
}

impl BurnParams {
    pub fn new(duration: f32, tick_damage: f32) -> Self {
        Self {
            duration,
            tick_damage,
        }
    }
}

/// Активный burn на цели (максимум один на entity)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Burn {
    pub remaining: f32,
    pub tick_damage: f32,
    until_next_tick: f32,
}

impl Burn {
    /// None для нулевой/отрицательной длительности или урона
    pub fn new(duration: f32, tick_damage: f32) -> Option<Self> {
        if !(duration > 0.0) || !(tick_damage > 0.0) {
            return None;
        }
        Some(Self {
            remaining: duration,
            tick_damage,
            until_next_tick: 0.0,
        })
    }

    pub fn from_params(params: BurnParams) -> Option<Self> {
        Self::new(params.duration, params.tick_damage)
    }

    /// Перезапуск с новыми параметрами (старый таймер отменён)
    pub fn restart(&mut self, duration: f32, tick_damage: f32) {
        if let Some(fresh) = Self::new(duration, tick_damage) {
            *self = fresh;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Продвигает таймер, возвращает число сработавших тиков
    ///
    /// Тик: сначала урон, потом remaining -= interval.
    pub fn tick(&mut self, delta_time: f32) -> u32 {
        let mut fired = 0;
        while self.until_next_tick <= 0.0 && self.remaining > 0.0 {
            fired += 1;
            self.remaining -= BURN_TICK_INTERVAL;
            self.until_next_tick += BURN_TICK_INTERVAL;
        }
        self.until_next_tick -= delta_time.max(0.0);
        fired
    }
}

/// Система: burn тики по Combatant
///
/// Урон идёт через общий apply_to_combatant (тот же single mutation point,
/// что и у попаданий). Догоревший burn удаляется.
pub fn tick_burns(
    mut commands: Commands,
    mut burning: Query<(Entity, &mut Burn, &mut Combatant)>,
    mut writers: DamageWriters,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut burn, mut combatant) in burning.iter_mut() {
        let ticks = burn.tick(delta);

        for _ in 0..ticks {
            apply_to_combatant(
                entity,
                &mut combatant,
                burn.tick_damage,
                None,
                &mut writers,
            );
        }

        if burn.is_finished() || combatant.is_defeated() {
            logger::log(&format!("Burn on {:?} expired", entity));
            commands.entity(entity).remove::<Burn>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Прогоняет burn по Combatant дискретными шагами, возвращает нанесённый урон
    fn run_burn(burn: &mut Burn, target: &mut Combatant, steps: usize, dt: f32) -> f32 {
        let mut total = 0.0;
        for _ in 0..steps {
            for _ in 0..burn.tick(dt) {
                total += target.take_damage(burn.tick_damage).dealt();
            }
        }
        total
    }

    #[test]
    fn test_burn_ticks_once_per_second() {
        let mut burn = Burn::new(3.0, 2.0).unwrap();
        let mut target = Combatant::default();

        let dealt = run_burn(&mut burn, &mut target, 10, 1.0);

        // 3 тика по 2 урона, потом burn догорел
        assert_eq!(dealt, 6.0);
        assert!(burn.is_finished());
    }

    #[test]
    fn test_first_tick_is_immediate() {
        let mut burn = Burn::new(2.0, 5.0).unwrap();

        assert_eq!(burn.tick(0.25), 1);
        assert_eq!(burn.tick(0.5), 0);
        assert_eq!(burn.tick(0.25), 0);
        // Прошла секунда: второй тик на следующем апдейте
        assert_eq!(burn.tick(0.25), 1);
        assert!(burn.is_finished());
    }

    #[test]
    fn test_burn_restart_replaces_parameters() {
        let mut target = Combatant::new(100.0, crate::components::DefeatKind::Death);
        let mut burn = Burn::new(3.0, 2.0).unwrap();

        // Один тик первого burn (2 урона)
        let first = run_burn(&mut burn, &mut target, 1, 1.0);
        assert_eq!(first, 2.0);

        // Re-apply до истечения: burn(5, 1) полностью заменяет первый
        burn.restart(5.0, 1.0);
        let second = run_burn(&mut burn, &mut target, 20, 1.0);

        assert_eq!(second, 5.0);
        assert_eq!(target.current, 93.0);
        assert!(burn.is_finished());
    }

    #[test]
    fn test_invalid_burn_rejected() {
        assert!(Burn::new(0.0, 2.0).is_none());
        assert!(Burn::new(3.0, -1.0).is_none());
        assert!(Burn::new(f32::NAN, 1.0).is_none());

        // restart с мусором не трогает текущий burn
        let mut burn = Burn::new(3.0, 2.0).unwrap();
        burn.restart(-1.0, 5.0);
        assert_eq!(burn.remaining, 3.0);
        assert_eq!(burn.tick_damage, 2.0);
    }
}
