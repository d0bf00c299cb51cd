//! Boss события (выходы для аниматора/UI/фрагментов) и цель босса

use bevy::prelude::*;

use crate::boss::state::BossPhase;
use crate::combat::catalog::AttackName;

/// Текущая цель босса (None: цели нет, контроллер замирает)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct BossTarget(pub Option<Entity>);

/// Событие: атака стартовала (cooldown уже сброшен)
#[derive(Event, Debug, Clone)]
pub struct AttackStarted {
    pub boss: Entity,
    pub attack: AttackName,
}

/// Событие: смена фазы
#[derive(Event, Debug, Clone)]
pub struct PhaseChanged {
    pub boss: Entity,
    pub phase: BossPhase,
    /// true: фаза 2 = распад на фрагменты
    pub split: bool,
}

/// Событие: имя анимации/состояния на переходе
#[derive(Event, Debug, Clone)]
pub struct AnimationHint {
    pub entity: Entity,
    pub name: &'static str,
}
