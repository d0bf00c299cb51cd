//! Базовые компоненты бойцов: Combatant, Mana, Invincibility, Hurtbox, Player

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Множитель урона следующего удара после PowerBoost
pub const POWER_BOOST_MULTIPLIER: f32 = 1.6;

/// Что происходит с бойцом при health == 0
///
/// - Death: entity умирает (Dead marker, drops)
/// - Subdue: entity "подавлен" (фрагмент Obelok), обратимо через reset()
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum DefeatKind {
    Death,
    Subdue,
}

/// Результат TakeDamage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Урон не применён (amount <= 0, NaN, боец уже повержен)
    Ignored,
    /// Урон применён, боец жив
    Damaged { dealt: f32 },
    /// Урон применён и боец повержен (ровно один раз за жизнь)
    Defeated { dealt: f32 },
}

impl DamageOutcome {
    pub fn dealt(&self) -> f32 {
        match self {
            DamageOutcome::Ignored => 0.0,
            DamageOutcome::Damaged { dealt } | DamageOutcome::Defeated { dealt } => *dealt,
        }
    }

    pub fn is_defeat(&self) -> bool {
        matches!(self, DamageOutcome::Defeated { .. })
    }
}

/// Здоровье + power boost флаг
///
/// Инварианты:
/// - 0 ≤ current ≤ max
/// - is_alive() == (current > 0)
/// - переход в defeated происходит ровно один раз (повторный урон = no-op)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Combatant {
    pub current: f32,
    pub max: f32,
    pub defeat_kind: DefeatKind,
    defeated: bool,
    power_boost: bool,
}

impl Default for Combatant {
    fn default() -> Self {
        Self::new(100.0, DefeatKind::Death)
    }
}

impl Combatant {
    pub fn new(max: f32, defeat_kind: DefeatKind) -> Self {
        // NaN/отрицательный max → минимум 1 HP
        let max = if max.is_finite() { max.max(1.0) } else { 1.0 };
        Self {
            current: max,
            max,
            defeat_kind,
            defeated: false,
            power_boost: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn is_subdued(&self) -> bool {
        self.defeated && self.defeat_kind == DefeatKind::Subdue
    }

    pub fn health_fraction(&self) -> f32 {
        self.current / self.max
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        // `!(amount > 0)` отсекает и NaN
        if !(amount > 0.0) || self.defeated {
            return DamageOutcome::Ignored;
        }

        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        let dealt = before - self.current;

        if self.current <= 0.0 {
            self.defeated = true;
            DamageOutcome::Defeated { dealt }
        } else {
            DamageOutcome::Damaged { dealt }
        }
    }

    /// Лечение живого бойца (повергнутого поднимает только reset)
    pub fn heal(&mut self, amount: f32) {
        if !(amount > 0.0) || self.defeated {
            return;
        }
        self.current = (self.current + amount).min(self.max);
    }

    /// Полный сброс: full health, снят defeated и power boost
    pub fn reset(&mut self) {
        self.current = self.max;
        self.defeated = false;
        self.power_boost = false;
    }

    pub fn arm_power_boost(&mut self) {
        self.power_boost = true;
    }

    pub fn power_boost_armed(&self) -> bool {
        self.power_boost
    }

    /// Исходящий урон удара, который уже точно попал
    ///
    /// Power boost умножает первый ненулевой удар и сгорает.
    pub fn outgoing_damage(&mut self, base: f32) -> f32 {
        if base > 0.0 && self.power_boost {
            self.power_boost = false;
            base * POWER_BOOST_MULTIPLIER
        } else {
            base
        }
    }
}

/// Мана игрока для способностей
///
/// Инвариант: 0.0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Mana {
    pub current: f32,
    pub max: f32,
    pub regen_rate: f32, // units per second
}

impl Default for Mana {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Mana {
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        Self {
            current: max,
            max,
            regen_rate: 10.0,
        }
    }

    pub fn can_afford(&self, cost: f32) -> bool {
        cost >= 0.0 && self.current >= cost
    }

    /// Списывает cost; при нехватке (или мусорном cost) ничего не меняет и возвращает false
    pub fn try_spend(&mut self, cost: f32) -> bool {
        if self.can_afford(cost) {
            self.current -= cost;
            true
        } else {
            false
        }
    }

    pub fn regenerate(&mut self, delta_time: f32) {
        if delta_time > 0.0 {
            self.current = (self.current + self.regen_rate * delta_time).min(self.max);
        }
    }
}

/// Неуязвимость (power-up): пока remaining > 0 все попадания игнорируются
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Invincibility {
    pub remaining: f32,
}

impl Invincibility {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Повторный grant не укорачивает текущую неуязвимость
    pub fn grant(&mut self, duration: f32) {
        if duration > 0.0 {
            self.remaining = self.remaining.max(duration);
        }
    }

    pub fn tick(&mut self, delta_time: f32) {
        self.remaining = (self.remaining - delta_time).max(0.0);
    }
}

/// Можно ли вообще попасть по entity
///
/// Ядро Obelok держит hurtbox выключенным вне окна уязвимости.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub enabled: bool,
}

impl Default for Hurtbox {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Маркер игрока (цель боссов)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;
