//! Movement компоненты: тело, motion intent, арена

use bevy::prelude::*;

/// Кинематическое состояние entity (позиция/скорость в 2D)
///
/// Пишется физическим слоем (в headless: HeadlessWorldPlugin),
/// ядро только читает его как spatial query.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// 0.0 = летающий (Obelok), 1.0 = обычная гравитация (Knight, игрок)
    pub gravity_scale: f32,
    pub grounded: bool,
}

impl Body {
    pub fn grounded_at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            grounded: true,
        }
    }

    pub fn flying_at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            gravity_scale: 0.0,
            grounded: false,
        }
    }
}

/// Желаемое движение на текущий тик (выход ядра → физика)
///
/// Пишется каждый тик контроллером босса.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum MotionIntent {
    /// Не трогать скорость (прыжок/падение продолжаются)
    #[default]
    Keep,
    /// Нулевая скорость
    Stop,
    /// Полностью задать скорость
    Velocity(Vec2),
    /// Задать горизонтальную скорость, вертикальную оставить гравитации
    Horizontal(f32),
    /// Задать вертикальную скорость, горизонтальную оставить
    Vertical(f32),
    /// Двигаться к точке с постоянной скоростью (без overshoot)
    MoveTowards { target: Vec2, speed: f32 },
}

/// Параметры арены: уровень пола и гравитация
///
/// floor_y заменяет raycast "земля под боссом".
#[derive(Resource, Debug, Clone, Copy)]
pub struct Arena {
    pub floor_y: f32,
    pub gravity: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            floor_y: 0.0,
            gravity: 30.0,
        }
    }
}
