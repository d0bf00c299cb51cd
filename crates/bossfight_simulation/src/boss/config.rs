//! BossConfig: все tunable параметры босса (data-driven вместо N копий скрипта)
//!
//! Пресеты в коде + те же данные в `config/*.ron`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::catalog::{Attack, AttackCatalog, Maneuver};
use crate::combat::drops::{DropEntry, DropTable};
use crate::components::DefeatKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read boss config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse boss config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("{boss}: max_health must be positive, got {value}")]
    InvalidHealth { boss: String, value: f32 },
    #[error("{boss}: phase threshold must be in (0, 1], got {value}")]
    InvalidThreshold { boss: String, value: f32 },
    #[error("{boss}: attack catalog is empty")]
    EmptyCatalog { boss: String },
    #[error("{boss}: basic attack {name} is not in the catalog")]
    MissingBasic { boss: String, name: String },
    #[error("{boss}: attack {name} is listed twice")]
    DuplicateAttack { boss: String, name: String },
    #[error("{boss}: lose_aggro_distance ({lose}) is below chase_trigger_distance ({chase})")]
    InvertedAggro { boss: String, chase: f32, lose: f32 },
    #[error("{boss}: flee chance must be in [0, 1] with min_duration <= max_duration")]
    InvalidFlee { boss: String },
    #[error("{boss}: {field} must be finite and non-negative, got {value}")]
    InvalidValue {
        boss: String,
        field: &'static str,
        value: f32,
    },
    #[error("{boss}: attack {attack} {field} must be finite and non-negative, got {value}")]
    InvalidAttackValue {
        boss: String,
        attack: String,
        field: &'static str,
        value: f32,
    },
}

/// Как босс держит позицию относительно цели в Targeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApproachStyle {
    /// Висит над целью на height, атакует при |Δx| < alignment_epsilon
    Hover { height: f32, alignment_epsilon: f32 },
    /// Бежит по земле, атакует при distance <= attack_range
    Ground { attack_range: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleeConfig {
    pub chance: f32,
    pub min_duration: f32,
    pub max_duration: f32,
}

/// Таймеры выбора атаки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub ability_cooldown: f32,
    pub basic_cooldown: f32,
    #[serde(default)]
    pub flee: Option<FleeConfig>,
}

/// Фрагмент составного босса: смещение в собранном виде + свой конфиг
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSpec {
    pub offset: [f32; 2],
    pub config: BossConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhaseMode {
    /// Фаза 2 = другой каталог атак (Knight)
    SwapCatalog(AttackCatalog),
    /// Фаза 2 = распад на фрагменты (Obelok)
    Split {
        reform_time: f32,
        knockout_duration: f32,
        reassemble_duration: f32,
        fragments: Vec<FragmentSpec>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Доля max health: фаза 2 при health <= ceil(max * threshold)
    pub threshold: f32,
    pub mode: PhaseMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    pub name: String,
    pub max_health: f32,
    #[serde(default = "default_defeat")]
    pub defeat: DefeatKind,
    pub chase_trigger_distance: f32,
    pub lose_aggro_distance: f32,
    pub approach: ApproachStyle,
    /// Скорость Targeting/Returning (hover speed или chase speed)
    pub move_speed: f32,
    #[serde(default)]
    pub flee_speed: f32,
    #[serde(default)]
    pub charge_time: f32,
    #[serde(default)]
    pub awakening_time: f32,
    #[serde(default)]
    pub recovery_time: f32,
    /// Урон касанием вне атак (0 = нет)
    #[serde(default)]
    pub contact_damage: f32,
    pub catalog: AttackCatalog,
    pub selection: SelectionConfig,
    #[serde(default)]
    pub phase: Option<PhaseConfig>,
    #[serde(default)]
    pub drops: Option<DropTable>,
}

fn default_defeat() -> DefeatKind {
    DefeatKind::Death
}

impl BossConfig {
    /// Парсит RON и валидирует
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let config: BossConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let boss = self.name.clone();

        if !(self.max_health > 0.0) || !self.max_health.is_finite() {
            return Err(ConfigError::InvalidHealth {
                boss,
                value: self.max_health,
            });
        }

        if self.lose_aggro_distance < self.chase_trigger_distance {
            return Err(ConfigError::InvertedAggro {
                boss,
                chase: self.chase_trigger_distance,
                lose: self.lose_aggro_distance,
            });
        }

        for (field, value) in [
            ("chase_trigger_distance", self.chase_trigger_distance),
            ("lose_aggro_distance", self.lose_aggro_distance),
            ("move_speed", self.move_speed),
            ("flee_speed", self.flee_speed),
            ("charge_time", self.charge_time),
            ("awakening_time", self.awakening_time),
            ("recovery_time", self.recovery_time),
            ("contact_damage", self.contact_damage),
            ("ability_cooldown", self.selection.ability_cooldown),
            ("basic_cooldown", self.selection.basic_cooldown),
        ] {
            require_non_negative(&boss, field, value)?;
        }

        match self.approach {
            ApproachStyle::Hover {
                height,
                alignment_epsilon,
            } => {
                require_non_negative(&boss, "hover height", height)?;
                require_non_negative(&boss, "alignment_epsilon", alignment_epsilon)?;
            }
            ApproachStyle::Ground { attack_range } => {
                require_non_negative(&boss, "attack_range", attack_range)?;
            }
        }

        if let Some(flee) = &self.selection.flee {
            let chance_ok = (0.0..=1.0).contains(&flee.chance);
            let range_ok = flee.min_duration >= 0.0
                && flee.max_duration.is_finite()
                && flee.min_duration <= flee.max_duration;
            if !chance_ok || !range_ok {
                return Err(ConfigError::InvalidFlee { boss });
            }
        }

        validate_catalog(&boss, &self.catalog)?;

        if let Some(phase) = &self.phase {
            if !(phase.threshold > 0.0 && phase.threshold <= 1.0) {
                return Err(ConfigError::InvalidThreshold {
                    boss,
                    value: phase.threshold,
                });
            }
            match &phase.mode {
                PhaseMode::SwapCatalog(catalog) => validate_catalog(&boss, catalog)?,
                PhaseMode::Split {
                    reform_time,
                    knockout_duration,
                    reassemble_duration,
                    fragments,
                } => {
                    require_non_negative(&boss, "reform_time", *reform_time)?;
                    require_non_negative(&boss, "knockout_duration", *knockout_duration)?;
                    require_non_negative(&boss, "reassemble_duration", *reassemble_duration)?;
                    for fragment in fragments {
                        if let Some(value) = fragment.offset.iter().copied().find(|value| !value.is_finite()) {
                            return Err(ConfigError::InvalidValue {
                                boss,
                                field: "fragment offset",
                                value,
                            });
                        }
                        fragment.config.validate()?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Knight: наземный, flee 20%, фаза 2 со сменой каталога на 50% HP
    pub fn knight() -> Self {
        Self {
            name: "Knight".to_string(),
            max_health: 100.0,
            defeat: DefeatKind::Death,
            chase_trigger_distance: 10.0,
            lose_aggro_distance: 15.0,
            approach: ApproachStyle::Ground { attack_range: 2.0 },
            move_speed: 5.0,
            flee_speed: 4.0,
            charge_time: 0.0,
            awakening_time: 0.5,
            recovery_time: 0.2,
            contact_damage: 0.0,
            catalog: AttackCatalog::knight_phase1(),
            selection: SelectionConfig {
                ability_cooldown: 5.0,
                basic_cooldown: 2.0,
                flee: Some(FleeConfig {
                    chance: 0.2,
                    min_duration: 1.0,
                    max_duration: 2.0,
                }),
            },
            phase: Some(PhaseConfig {
                threshold: 0.5,
                mode: PhaseMode::SwapCatalog(AttackCatalog::knight_phase2()),
            }),
            drops: Some(DropTable {
                min: 3,
                max: 6,
                entries: vec![DropEntry::new("coin", 3.0), DropEntry::new("health_orb", 1.0)],
            }),
        }
    }

    /// Obelok: летающий, пикирует сверху; фаза 2: распад на 4 фрагмента
    pub fn obelok() -> Self {
        Self {
            name: "Obelok".to_string(),
            max_health: 120.0,
            defeat: DefeatKind::Death,
            chase_trigger_distance: 10.0,
            lose_aggro_distance: 15.0,
            approach: ApproachStyle::Hover {
                height: 4.0,
                alignment_epsilon: 0.5,
            },
            move_speed: 4.0,
            flee_speed: 0.0,
            charge_time: 0.5,
            awakening_time: 1.0,
            recovery_time: 0.0,
            contact_damage: 0.0,
            catalog: AttackCatalog::obelok(),
            selection: SelectionConfig {
                ability_cooldown: 0.0,
                basic_cooldown: 0.0,
                flee: None,
            },
            phase: Some(PhaseConfig {
                threshold: 0.5,
                mode: PhaseMode::Split {
                    reform_time: 1.0,
                    knockout_duration: 4.0,
                    reassemble_duration: 10.0,
                    fragments: vec![
                        FragmentSpec {
                            offset: [-0.5, 0.5],
                            config: Self::fragment("ObelokSlammer", 4.0, 0.5, 4.0, AttackCatalog::fragment_slammer()),
                        },
                        FragmentSpec {
                            offset: [0.5, 0.5],
                            config: Self::fragment("ObelokShooter", 3.0, 8.0, 3.0, AttackCatalog::fragment_shooter()),
                        },
                        FragmentSpec {
                            offset: [-0.5, -0.5],
                            config: Self::fragment("ObelokDasher", 0.0, 12.0, 4.0, AttackCatalog::fragment_dasher()),
                        },
                        FragmentSpec {
                            offset: [0.5, -0.5],
                            config: Self::fragment(
                                "ObelokSummoner",
                                3.0,
                                100.0,
                                3.0,
                                AttackCatalog::fragment_summoner(),
                            ),
                        },
                    ],
                },
            }),
            drops: Some(DropTable {
                min: 5,
                max: 8,
                entries: vec![DropEntry::new("coin", 1.0)],
            }),
        }
    }

    /// Фрагмент Obelok: Subdue вместо смерти, всегда hover
    pub fn fragment(
        name: &str,
        height: f32,
        alignment_epsilon: f32,
        move_speed: f32,
        catalog: AttackCatalog,
    ) -> Self {
        Self {
            name: name.to_string(),
            max_health: 25.0,
            defeat: DefeatKind::Subdue,
            chase_trigger_distance: 100.0,
            lose_aggro_distance: 200.0,
            approach: ApproachStyle::Hover {
                height,
                alignment_epsilon,
            },
            move_speed,
            flee_speed: 0.0,
            charge_time: 0.5,
            awakening_time: 0.0,
            recovery_time: 0.0,
            contact_damage: 5.0,
            catalog,
            selection: SelectionConfig {
                ability_cooldown: 0.0,
                basic_cooldown: 0.0,
                flee: None,
            },
            phase: None,
            drops: None,
        }
    }
}

fn require_non_negative(boss: &str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            boss: boss.to_string(),
            field,
            value,
        })
    }
}

/// Все числовые параметры атаки, включая поля манёвра и burn
fn attack_values(attack: &Attack) -> Vec<(&'static str, f32)> {
    let mut values = vec![
        ("duration", attack.duration),
        ("cooldown", attack.cooldown),
        ("damage", attack.damage),
        ("horizontal_force", attack.horizontal_force),
        ("vertical_force", attack.vertical_force),
        ("range", attack.range),
    ];
    if let Some(burn) = &attack.burn {
        values.push(("burn duration", burn.duration));
        values.push(("burn tick_damage", burn.tick_damage));
    }
    match &attack.maneuver {
        Maneuver::Strike | Maneuver::Lunge | Maneuver::Charge | Maneuver::Buff | Maneuver::Summon { .. } => {}
        Maneuver::Leap { drop_speed } => values.push(("drop_speed", *drop_speed)),
        Maneuver::HoverSlam { ground_offset } => values.push(("ground_offset", *ground_offset)),
        Maneuver::FlamingSlam { radius } => values.push(("radius", *radius)),
        Maneuver::Torrent {
            radius,
            interval,
            speed,
            damage_scale,
        } => values.extend([
            ("radius", *radius),
            ("interval", *interval),
            ("speed", *speed),
            ("damage_scale", *damage_scale),
        ]),
        Maneuver::GroundBreak { width, height } => values.extend([("width", *width), ("height", *height)]),
        Maneuver::Eruption {
            radius,
            windup,
            damage_scale,
        } => values.extend([
            ("radius", *radius),
            ("windup", *windup),
            ("damage_scale", *damage_scale),
        ]),
        Maneuver::Dash { overshoot } => values.push(("overshoot", *overshoot)),
        Maneuver::Volley { speed, .. } => values.push(("speed", *speed)),
    }
    values
}

fn validate_catalog(boss: &str, catalog: &AttackCatalog) -> Result<(), ConfigError> {
    if catalog.is_empty() {
        return Err(ConfigError::EmptyCatalog {
            boss: boss.to_string(),
        });
    }

    for (index, attack) in catalog.attacks.iter().enumerate() {
        if catalog.attacks[..index].iter().any(|other| other.name == attack.name) {
            return Err(ConfigError::DuplicateAttack {
                boss: boss.to_string(),
                name: attack.name.as_str().to_string(),
            });
        }
        for (field, value) in attack_values(attack) {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidAttackValue {
                    boss: boss.to_string(),
                    attack: attack.name.as_str().to_string(),
                    field,
                    value,
                });
            }
        }
    }

    if let Some(basic) = catalog.basic {
        if catalog.get(basic).is_none() {
            return Err(ConfigError::MissingBasic {
                boss: boss.to_string(),
                name: basic.as_str().to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::catalog::AttackName;

    #[test]
    fn test_presets_are_valid() {
        BossConfig::knight().validate().unwrap();
        BossConfig::obelok().validate().unwrap();
    }

    #[test]
    fn test_knight_ron_matches_preset() {
        let config = BossConfig::from_ron(include_str!("../../config/knight.ron")).unwrap();
        let preset = BossConfig::knight();

        assert_eq!(config.name, preset.name);
        assert_eq!(config.max_health, preset.max_health);
        assert_eq!(config.approach, preset.approach);
        assert_eq!(config.selection, preset.selection);
        assert_eq!(config.catalog, preset.catalog);
        assert_eq!(config.phase, preset.phase);
    }

    #[test]
    fn test_obelok_ron_matches_preset() {
        let config = BossConfig::from_ron(include_str!("../../config/obelok.ron")).unwrap();
        let preset = BossConfig::obelok();

        assert_eq!(config.catalog, preset.catalog);
        assert_eq!(config.phase, preset.phase);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = BossConfig::knight();
        if let Some(phase) = config.phase.as_mut() {
            phase.threshold = 1.5;
        }

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_missing_basic_rejected() {
        let mut config = BossConfig::knight();
        config.catalog.basic = Some(AttackName::MoltenEruption);

        assert!(matches!(config.validate(), Err(ConfigError::MissingBasic { .. })));
    }

    #[test]
    fn test_parse_error_reported() {
        let result = BossConfig::from_ron("(name: \"Broken\",");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_infinite_attack_duration_rejected() {
        let mut config = BossConfig::knight();
        if let Some(PhaseMode::SwapCatalog(catalog)) = config.phase.as_mut().map(|phase| &mut phase.mode) {
            for attack in &mut catalog.attacks {
                if attack.name == AttackName::InfernalTorrent {
                    attack.duration = f32::INFINITY;
                }
            }
        }

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAttackValue { field: "duration", .. })
        ));
    }

    #[test]
    fn test_maneuver_fields_checked() {
        let mut config = BossConfig::knight();
        for attack in &mut config.catalog.attacks {
            if let Maneuver::Leap { drop_speed } = &mut attack.maneuver {
                *drop_speed = f32::NAN;
            }
        }

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAttackValue { field: "drop_speed", .. })
        ));
    }

    #[test]
    fn test_split_timings_checked() {
        for broken in [f32::NAN, f32::INFINITY, -1.0] {
            let mut config = BossConfig::obelok();
            if let Some(PhaseMode::Split { reform_time, .. }) = config.phase.as_mut().map(|phase| &mut phase.mode) {
                *reform_time = broken;
            }

            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidValue { field: "reform_time", .. })
            ));
        }

        let mut config = BossConfig::obelok();
        if let Some(PhaseMode::Split {
            reassemble_duration, ..
        }) = config.phase.as_mut().map(|phase| &mut phase.mode)
        {
            *reassemble_duration = f32::INFINITY;
        }
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "reassemble_duration",
                ..
            })
        ));
    }

    #[test]
    fn test_inverted_flee_range_rejected() {
        let mut config = BossConfig::knight();
        config.selection.flee = Some(FleeConfig {
            chance: 0.2,
            min_duration: 3.0,
            max_duration: 1.0,
        });

        assert!(matches!(config.validate(), Err(ConfigError::InvalidFlee { .. })));
    }
}
