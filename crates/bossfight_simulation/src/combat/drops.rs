//! Drops при смерти + spawn requests
//!
//! Чистые функции от seed (детерминизм и тестируемость):
//! - drop_count(min, max, seed) → количество (uniform, inclusive)
//! - pick_drop(choices, seed) → выбранный kind (weighted, fallback uniform)

use bevy::prelude::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Fire-and-forget запрос на спавн (factory collaborator)
///
/// Источники: drops, снаряды и призывы фрагментов.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub kind: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub source: Option<Entity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    pub kind: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl DropEntry {
    pub fn new(kind: &str, weight: f32) -> Self {
        Self {
            kind: kind.to_string(),
            weight,
        }
    }
}

/// Таблица дропа entity (катится один раз на смерть)
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub min: i32,
    pub max: i32,
    pub entries: Vec<DropEntry>,
}

impl DropTable {
    /// Список kind'ов для спавна (пустой если entries пуст)
    pub fn roll(&self, seed: u64) -> Vec<String> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let count = roll_drop_count(self.min, self.max, &mut rng);
        (0..count)
            .filter_map(|_| roll_drop(&self.entries, &mut rng).map(|entry| entry.kind.clone()))
            .collect()
    }
}

/// Количество дропа: uniform в [max(0, min), max(min, max)]
pub fn roll_drop_count<R: Rng>(min: i32, max: i32, rng: &mut R) -> u32 {
    let low = min.max(0);
    let high = max.max(low);
    rng.gen_range(low..=high) as u32
}

/// Выбор записи: по весам, если веса валидны; иначе uniform
pub fn roll_drop<'a, R: Rng>(choices: &'a [DropEntry], rng: &mut R) -> Option<&'a DropEntry> {
    if choices.is_empty() {
        return None;
    }

    match WeightedIndex::new(choices.iter().map(|entry| entry.weight.max(0.0))) {
        Ok(weighted) => choices.get(weighted.sample(rng)),
        // Все веса нулевые / NaN
        Err(_) => choices.get(rng.gen_range(0..choices.len())),
    }
}

pub fn drop_count(min: i32, max: i32, seed: u64) -> u32 {
    roll_drop_count(min, max, &mut ChaCha8Rng::seed_from_u64(seed))
}

pub fn pick_drop(choices: &[DropEntry], seed: u64) -> Option<&DropEntry> {
    roll_drop(choices, &mut ChaCha8Rng::seed_from_u64(seed))
}
