//! FragmentAssembly: агрегатор subdue-состояния фрагментов составного босса

use bevy::prelude::*;

/// Фрагмент составного босса (ссылка на ядро + место в собранном виде)
#[derive(Component, Debug, Clone, Copy)]
pub struct Fragment {
    pub assembly: Entity,
    pub offset: Vec2,
}

/// Живёт на ядре: N фрагментов, окно уязвимости
///
/// Инвариант: subdued_count == число усмирённых фрагментов на момент
/// последнего notify. assembled == true ровно пока идёт окно.
#[derive(Component, Debug, Clone)]
pub struct FragmentAssembly {
    fragments: Vec<Entity>,
    reassemble_duration: f32,
    subdued_count: usize,
    assembled: bool,
    window_remaining: f32,
}

impl FragmentAssembly {
    pub fn new(fragments: Vec<Entity>, reassemble_duration: f32) -> Self {
        Self {
            fragments,
            reassemble_duration: reassemble_duration.max(0.0),
            subdued_count: 0,
            assembled: false,
            window_remaining: 0.0,
        }
    }

    pub fn fragments(&self) -> &[Entity] {
        &self.fragments
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.fragments.contains(&entity)
    }

    pub fn subdued_count(&self) -> usize {
        self.subdued_count
    }

    pub fn is_assembled(&self) -> bool {
        self.assembled
    }

    pub fn window_remaining(&self) -> f32 {
        self.window_remaining
    }

    /// Пересчёт subdued; true если именно этот вызов открыл окно
    ///
    /// Пока окно открыто: no-op.
    pub fn notify_fragment_subdued(&mut self, is_subdued: impl Fn(Entity) -> bool) -> bool {
        if self.assembled {
            return false;
        }

        self.subdued_count = self.fragments.iter().filter(|fragment| is_subdued(**fragment)).count();
        if self.fragments.is_empty() || self.subdued_count < self.fragments.len() {
            return false;
        }

        self.assembled = true;
        self.window_remaining = self.reassemble_duration;
        true
    }

    /// Отсчёт окна; true на тике закрытия (вызывающий сбрасывает фрагменты)
    pub fn tick(&mut self, delta_time: f32) -> bool {
        if !self.assembled {
            return false;
        }

        self.window_remaining -= delta_time.max(0.0);
        if self.window_remaining > 0.0 {
            return false;
        }

        self.assembled = false;
        self.window_remaining = 0.0;
        self.subdued_count = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fragments() -> Vec<Entity> {
        (1..=4).map(Entity::from_raw).collect()
    }

    #[test]
    fn test_three_of_four_not_assembled() {
        let members = fragments();
        let mut assembly = FragmentAssembly::new(members.clone(), 10.0);
        let mut subdued = HashSet::new();

        for fragment in &members[..3] {
            subdued.insert(*fragment);
            assert!(!assembly.notify_fragment_subdued(|entity| subdued.contains(&entity)));
        }

        assert_eq!(assembly.subdued_count(), 3);
        assert!(!assembly.is_assembled());
    }

    #[test]
    fn test_fourth_opens_window_once() {
        let members = fragments();
        let mut assembly = FragmentAssembly::new(members.clone(), 10.0);
        let subdued: HashSet<Entity> = members.iter().copied().collect();

        assert!(assembly.notify_fragment_subdued(|entity| subdued.contains(&entity)));
        assert!(assembly.is_assembled());
        assert_eq!(assembly.subdued_count(), 4);
        assert_eq!(assembly.window_remaining(), 10.0);

        // Повторный notify во время окна: no-op
        assert!(!assembly.notify_fragment_subdued(|entity| subdued.contains(&entity)));
        assert_eq!(assembly.window_remaining(), 10.0);
    }

    #[test]
    fn test_window_closes_after_duration() {
        let members = fragments();
        let mut assembly = FragmentAssembly::new(members.clone(), 10.0);
        assembly.notify_fragment_subdued(|_| true);

        assert!(!assembly.tick(4.0));
        assert!(!assembly.tick(5.5));
        assert!(assembly.tick(0.5));

        assert!(!assembly.is_assembled());
        assert_eq!(assembly.subdued_count(), 0);
        assert!(!assembly.tick(1.0));
    }

    #[test]
    fn test_empty_assembly_never_opens() {
        let mut assembly = FragmentAssembly::new(Vec::new(), 10.0);
        assert!(!assembly.notify_fragment_subdued(|_| true));
    }
}
