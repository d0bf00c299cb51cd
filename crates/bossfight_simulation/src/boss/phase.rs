//! One-shot phase trigger по порогу здоровья

use bevy::prelude::*;

/// Phase1 → Phase2 ровно один раз при health <= ceil(max * threshold)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PhaseTrigger {
    pub threshold: f32,
    triggered: bool,
}

impl PhaseTrigger {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            triggered: false,
        }
    }

    pub fn boundary(&self, max_health: f32) -> f32 {
        (max_health * self.threshold).ceil()
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// true только на тике срабатывания; повторные вызовы: no-op
    pub fn check(&mut self, current_health: f32, max_health: f32) -> bool {
        if self.triggered || current_health > self.boundary(max_health) {
            return false;
        }
        self.triggered = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_triggers_exactly_once() {
        let mut trigger = PhaseTrigger::new(0.5);

        assert!(!trigger.check(51.0, 100.0));
        assert!(trigger.check(50.0, 100.0));
        assert!(!trigger.check(50.0, 100.0));
        assert!(!trigger.check(10.0, 100.0));
        assert!(trigger.is_triggered());
    }

    #[test]
    fn test_boundary_rounds_up() {
        // 99 * 0.5 = 49.5 → 50
        let mut trigger = PhaseTrigger::new(0.5);
        assert_eq!(trigger.boundary(99.0), 50.0);
        assert!(!trigger.check(50.5, 99.0));
        assert!(trigger.check(50.0, 99.0));
    }

    #[test]
    fn test_skipping_past_boundary_still_triggers() {
        let mut trigger = PhaseTrigger::new(0.5);
        assert!(trigger.check(0.0, 120.0));
    }
}
