//! Attack catalog: статические описания атак босса
//!
//! Одна запись на имя атаки на тип босса. Создаётся при спавне из BossConfig,
//! в рантайме не мутирует.

use serde::{Deserialize, Serialize};

use crate::combat::status::BurnParams;

/// Имена атак (общие для всех боссов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackName {
    Basic,
    Lunge,
    Slam,
    Charge,
    PowerBoost,
    FlamingSlam,
    InfernalTorrent,
    GroundBreaker,
    MoltenEruption,
}

impl AttackName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackName::Basic => "Basic",
            AttackName::Lunge => "Lunge",
            AttackName::Slam => "Slam",
            AttackName::Charge => "Charge",
            AttackName::PowerBoost => "PowerBoost",
            AttackName::FlamingSlam => "FlamingSlam",
            AttackName::InfernalTorrent => "InfernalTorrent",
            AttackName::GroundBreaker => "GroundBreaker",
            AttackName::MoltenEruption => "MoltenEruption",
        }
    }
}

/// Motion profile атаки (во что компилируется скрипт атаки)
///
/// Общие числа (force, range, duration) лежат в Attack,
/// здесь только специфичные для профиля параметры.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Maneuver {
    /// Стоя: удар по кругу radius = range посередине duration
    Strike,
    /// Горизонтальный рывок (horizontal_force), направление фиксируется на старте
    Lunge,
    /// Прыжок (horizontal_force, vertical_force) → падение с drop_speed до земли
    Leap { drop_speed: f32 },
    /// Разбег по прямой horizontal_force на duration
    Charge,
    /// Ноль урона, взводит power boost
    Buff,
    /// Пикирование вниз до земли (vertical_force = скорость), удар, подъём обратно
    HoverSlam { ground_offset: f32 },
    /// Прыжок на range + 10, падение 3×range, удар по кругу radius с burn
    FlamingSlam { radius: f32 },
    /// Серия ударов каждые interval с движением к цели
    Torrent {
        radius: f32,
        interval: f32,
        speed: f32,
        damage_scale: f32,
    },
    /// Подскок (vertical_force), при приземлении удар прямоугольником под собой
    GroundBreak { width: f32, height: f32 },
    /// Замах windup × duration, взрыв по кругу, восстановление остаток duration
    Eruption {
        radius: f32,
        windup: f32,
        damage_scale: f32,
    },
    /// Пролёт сквозь цель на overshoot дальше неё (horizontal_force = скорость)
    Dash { overshoot: f32 },
    /// Выстрел снарядом kind в сторону цели
    Volley { projectile: String, speed: f32 },
    /// Призыв kind на месте
    Summon { kind: String },
}

/// Описание одной атаки (immutable catalog entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub name: AttackName,
    pub duration: f32,
    pub cooldown: f32,
    pub damage: f32,
    #[serde(default)]
    pub horizontal_force: f32,
    #[serde(default)]
    pub vertical_force: f32,
    #[serde(default)]
    pub range: f32,
    pub maneuver: Maneuver,
    /// Наносит урон касанием тела во время атаки (один раз за атаку)
    #[serde(default)]
    pub contact: bool,
    #[serde(default)]
    pub burn: Option<BurnParams>,
}

impl Attack {
    pub fn new(name: AttackName, maneuver: Maneuver) -> Self {
        Self {
            name,
            duration: 1.0,
            cooldown: 0.0,
            damage: 0.0,
            horizontal_force: 0.0,
            vertical_force: 0.0,
            range: 0.0,
            maneuver,
            contact: false,
            burn: None,
        }
    }

    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn forces(mut self, horizontal: f32, vertical: f32) -> Self {
        self.horizontal_force = horizontal;
        self.vertical_force = vertical;
        self
    }

    pub fn range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn contact(mut self) -> Self {
        self.contact = true;
        self
    }

    pub fn burn(mut self, duration: f32, tick_damage: f32) -> Self {
        self.burn = Some(BurnParams::new(duration, tick_damage));
        self
    }
}

/// Набор атак босса (для одной фазы)
///
/// `basic`: атака по basic-cooldown и fallback, когда все способности на cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackCatalog {
    pub attacks: Vec<Attack>,
    #[serde(default)]
    pub basic: Option<AttackName>,
}

impl AttackCatalog {
    pub fn new(attacks: Vec<Attack>, basic: Option<AttackName>) -> Self {
        Self { attacks, basic }
    }

    pub fn get(&self, name: AttackName) -> Option<&Attack> {
        self.attacks.iter().find(|attack| attack.name == name)
    }

    pub fn basic_attack(&self) -> Option<&Attack> {
        self.basic.and_then(|name| self.get(name))
    }

    /// Все атаки кроме basic (кандидаты ability-выбора), в порядке каталога
    pub fn abilities(&self) -> impl Iterator<Item = &Attack> {
        let basic = self.basic;
        self.attacks
            .iter()
            .filter(move |attack| Some(attack.name) != basic)
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// Knight, фаза 1: Basic / Lunge / Slam / Charge / PowerBoost
    pub fn knight_phase1() -> Self {
        Self::new(
            vec![
                Attack::new(AttackName::Basic, Maneuver::Strike)
                    .duration(0.8)
                    .damage(10.0)
                    .range(2.3),
                Attack::new(AttackName::Lunge, Maneuver::Lunge)
                    .duration(1.0)
                    .cooldown(3.0)
                    .damage(20.0)
                    .forces(15.0, 0.0)
                    .contact(),
                Attack::new(AttackName::Slam, Maneuver::Leap { drop_speed: 20.0 })
                    .duration(1.5)
                    .cooldown(4.0)
                    .damage(25.0)
                    .forces(5.0, 12.0)
                    .contact(),
                Attack::new(AttackName::Charge, Maneuver::Charge)
                    .duration(1.5)
                    .cooldown(4.0)
                    .damage(30.0)
                    .forces(10.0, 0.0)
                    .contact(),
                Attack::new(AttackName::PowerBoost, Maneuver::Buff)
                    .duration(0.8)
                    .cooldown(8.0),
            ],
            Some(AttackName::Basic),
        )
    }

    /// Knight, фаза 2: огненные атаки по площади
    pub fn knight_phase2() -> Self {
        Self::new(
            vec![
                Attack::new(AttackName::Basic, Maneuver::Strike)
                    .duration(0.8)
                    .damage(10.0)
                    .range(2.3),
                Attack::new(AttackName::FlamingSlam, Maneuver::FlamingSlam { radius: 2.5 })
                    .duration(1.5)
                    .cooldown(4.0)
                    .damage(30.0)
                    .range(6.0)
                    .burn(4.0, 3.0),
                Attack::new(
                    AttackName::InfernalTorrent,
                    Maneuver::Torrent {
                        radius: 1.6,
                        interval: 0.4,
                        speed: 3.5,
                        damage_scale: 0.75,
                    },
                )
                .duration(2.0)
                .cooldown(5.0)
                .damage(12.0)
                .burn(2.5, 2.0),
                Attack::new(
                    AttackName::GroundBreaker,
                    Maneuver::GroundBreak {
                        width: 3.0,
                        height: 1.2,
                    },
                )
                .duration(1.0)
                .cooldown(4.0)
                .damage(35.0)
                .forces(0.0, 8.0),
                Attack::new(
                    AttackName::MoltenEruption,
                    Maneuver::Eruption {
                        radius: 4.0,
                        windup: 0.4,
                        damage_scale: 0.8,
                    },
                )
                .duration(2.0)
                .cooldown(6.0)
                .damage(40.0)
                .burn(5.0, 2.5),
            ],
            Some(AttackName::Basic),
        )
    }

    /// Obelok (собранный): пикирование на цель
    pub fn obelok() -> Self {
        Self::new(
            vec![Attack::new(AttackName::Slam, Maneuver::HoverSlam { ground_offset: 0.5 })
                .duration(0.3)
                .cooldown(3.0)
                .damage(25.0)
                .forces(0.0, 20.0)
                .range(1.5)
                .contact()],
            None,
        )
    }

    /// Фрагмент-slammer (TL)
    pub fn fragment_slammer() -> Self {
        Self::new(
            vec![Attack::new(AttackName::Slam, Maneuver::HoverSlam { ground_offset: 0.5 })
                .duration(0.3)
                .cooldown(2.5)
                .damage(15.0)
                .forces(0.0, 20.0)
                .range(1.2)],
            None,
        )
    }

    /// Фрагмент-shooter (TR)
    pub fn fragment_shooter() -> Self {
        Self::new(
            vec![Attack::new(
                AttackName::Basic,
                Maneuver::Volley {
                    projectile: "obelok_bolt".to_string(),
                    speed: 10.0,
                },
            )
            .duration(0.5)
            .cooldown(0.5)],
            None,
        )
    }

    /// Фрагмент-dasher (BL)
    pub fn fragment_dasher() -> Self {
        Self::new(
            vec![Attack::new(AttackName::Charge, Maneuver::Dash { overshoot: 10.0 })
                .duration(0.2)
                .cooldown(3.0)
                .damage(15.0)
                .forces(15.0, 0.0)
                .contact()],
            None,
        )
    }

    /// Фрагмент-summoner (BR)
    pub fn fragment_summoner() -> Self {
        Self::new(
            vec![Attack::new(
                AttackName::Basic,
                Maneuver::Summon {
                    kind: "obelok_stone".to_string(),
                },
            )
            .duration(0.1)
            .cooldown(2.0)],
            None,
        )
    }
}
