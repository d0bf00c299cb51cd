//! Attack selection policy (общая для всех боссов)
//!
//! Два независимых таймера: ability cooldown и basic cooldown,
//! плюс per-attack cooldown каждой атаки каталога.
//!
//! decide():
//! 1. ability готов → uniform среди способностей вне cooldown (fallback: basic)
//! 2. иначе basic готов → basic
//! 3. иначе Wait
//!
//! Flee roll (если настроен) делается только когда атака иначе была бы выбрана.

use rand::Rng;

use crate::boss::config::{FleeConfig, SelectionConfig};
use crate::combat::catalog::{AttackCatalog, AttackName};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Attack(AttackName),
    /// Отступление на duration секунд
    Flee(f32),
    Wait,
}

#[derive(Debug, Clone)]
pub struct AttackSelector {
    ability_cooldown: f32,
    basic_cooldown: f32,
    ability_timer: f32,
    basic_timer: f32,
    cooldowns: Vec<(AttackName, f32)>,
    flee: Option<FleeConfig>,
}

impl AttackSelector {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            ability_cooldown: config.ability_cooldown,
            basic_cooldown: config.basic_cooldown,
            ability_timer: 0.0,
            basic_timer: 0.0,
            cooldowns: Vec::new(),
            flee: config.flee.clone(),
        }
    }

    /// Уменьшает все таймеры (вызывается до decide в том же тике)
    pub fn tick(&mut self, delta_time: f32) {
        let delta = delta_time.max(0.0);
        self.ability_timer = (self.ability_timer - delta).max(0.0);
        self.basic_timer = (self.basic_timer - delta).max(0.0);
        for (_, remaining) in self.cooldowns.iter_mut() {
            *remaining = (*remaining - delta).max(0.0);
        }
    }

    pub fn cooldown_of(&self, name: AttackName) -> f32 {
        self.cooldowns
            .iter()
            .find(|(attack, _)| *attack == name)
            .map(|(_, remaining)| *remaining)
            .unwrap_or(0.0)
    }

    pub fn ability_ready(&self) -> bool {
        self.ability_timer <= 0.0
    }

    /// Сброс всех таймеров (смена фазы: новый каталог стартует "свежим")
    pub fn reset(&mut self) {
        self.ability_timer = 0.0;
        self.basic_timer = 0.0;
        self.cooldowns.clear();
    }

    fn start_cooldown(&mut self, name: AttackName, cooldown: f32) {
        match self.cooldowns.iter_mut().find(|(attack, _)| *attack == name) {
            Some((_, remaining)) => *remaining = cooldown,
            None => self.cooldowns.push((name, cooldown)),
        }
    }

    pub fn decide<R: Rng>(&mut self, catalog: &AttackCatalog, rng: &mut R) -> Decision {
        // basic тоже уважает свой per-attack cooldown
        let basic = catalog
            .basic_attack()
            .filter(|attack| self.cooldown_of(attack.name) <= 0.0);
        let ability_ready = self.ability_ready();
        let basic_ready = self.basic_timer <= 0.0 && basic.is_some();

        if !ability_ready && !basic_ready {
            return Decision::Wait;
        }

        if let Some(flee) = &self.flee {
            if rng.gen::<f32>() < flee.chance {
                let duration = if flee.min_duration < flee.max_duration {
                    rng.gen_range(flee.min_duration..=flee.max_duration)
                } else {
                    flee.min_duration
                };
                return Decision::Flee(duration);
            }
        }

        if ability_ready {
            let candidates: Vec<_> = catalog
                .abilities()
                .filter(|attack| self.cooldown_of(attack.name) <= 0.0)
                .collect();

            let chosen = if candidates.is_empty() {
                match basic {
                    Some(basic) => basic,
                    None => return Decision::Wait,
                }
            } else {
                candidates[rng.gen_range(0..candidates.len())]
            };

            let (name, cooldown) = (chosen.name, chosen.cooldown);
            self.ability_timer = self.ability_cooldown;
            self.basic_timer = self.basic_cooldown;
            self.start_cooldown(name, cooldown);
            return Decision::Attack(name);
        }

        match basic {
            Some(basic) => {
                let (name, cooldown) = (basic.name, basic.cooldown);
                self.basic_timer = self.basic_cooldown;
                self.start_cooldown(name, cooldown);
                Decision::Attack(name)
            }
            None => Decision::Wait,
        }
    }
}
