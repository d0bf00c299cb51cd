//! Boss FSM состояния и фаза

use serde::{Deserialize, Serialize};

use crate::boss::script::AttackRun;
use crate::combat::catalog::AttackName;

/// Состояние контроллера босса (ровно одно активное)
///
/// Каждая точка ожидания: countdown в payload состояния.
#[derive(Debug, Clone, PartialEq)]
pub enum BossState {
    /// Цели нет в радиусе обнаружения
    Idle,
    /// Вступительная анимация
    Awakening { remaining: f32 },
    /// Сближение с целью / ожидание выбора атаки
    Targeting,
    /// Телеграф: атака уже выбрана, прервать нельзя
    Charging { attack: AttackName, remaining: f32 },
    /// Исполнение скрипта атаки (включая recovery)
    Attacking { attack: AttackName, run: AttackRun },
    /// Возврат домой после потери aggro
    Returning,
    /// Отступление (melee варианты)
    Fleeing { remaining: f32 },
    /// Ядро неактивно, работают фрагменты
    Splitting,
    /// Падение собранного ядра
    Reforming { remaining: f32 },
    /// Ядро оглушено и уязвимо
    KnockedOut { remaining: f32 },
}

impl Default for BossState {
    fn default() -> Self {
        Self::Idle
    }
}

impl BossState {
    /// Имя анимации/состояния для внешнего аниматора
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Awakening { .. } => "awakening",
            Self::Targeting => "targeting",
            Self::Charging { .. } => "charging",
            Self::Attacking { attack, .. } => attack.as_str(),
            Self::Returning => "returning",
            Self::Fleeing { .. } => "fleeing",
            Self::Splitting => "splitting",
            Self::Reforming { .. } => "reforming",
            Self::KnockedOut { .. } => "knocked_out",
        }
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self, Self::Charging { .. } | Self::Attacking { .. })
    }
}

/// Фаза босса: только Phase1 → Phase2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossPhase {
    #[default]
    Phase1,
    Phase2,
}
