//! Attack scripts: Maneuver → список шагов, исполняемых по тикам
//!
//! Каждая точка ожидания атаки: отдельный Hold шаг с явным условием.
//! Направления и точки фиксируются при старте атаки (lunge direction lock).
//! Условные ожидания ограничены STEP_TIMEOUT, атака не может зависнуть.

use bevy::math::Vec2;

use crate::combat::catalog::{Attack, Maneuver};
use crate::combat::damage::{StrikeShape, StrikeSpec};
use crate::components::MotionIntent;

/// Максимум ожидания условного шага (секунды)
pub const STEP_TIMEOUT: f32 = 3.0;

/// Допуск "прибыл в точку"
pub const ARRIVE_EPSILON: f32 = 0.05;

/// Верхняя граница волн Torrent
pub const MAX_TORRENT_WAVES: usize = 256;

/// Условие завершения Hold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Until {
    Elapsed(f32),
    /// vertical velocity <= 0 (вершина прыжка)
    Falling,
    Grounded,
    Arrived { point: Vec2, epsilon: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnSpec {
    Projectile { kind: String, velocity: Vec2 },
    Summon { kind: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttackStep {
    /// Мгновенно выставить motion (импульс)
    Set(MotionIntent),
    /// Держать motion пока не выполнится условие
    Hold { motion: MotionIntent, until: Until },
    Strike(StrikeSpec),
    ArmPowerBoost,
    Spawn(SpawnSpec),
}

/// Что видит скрипт в момент старта атаки
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext {
    pub origin: Vec2,
    pub target: Vec2,
    pub ground_y: f32,
    pub hover_height: f32,
    pub hover_speed: f32,
    pub recovery_time: f32,
}

/// Что видит скрипт каждый тик
#[derive(Debug, Clone, Copy)]
pub struct StepObservation {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
}

/// Выход одного тика скрипта
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    pub motion: Option<MotionIntent>,
    pub strikes: Vec<StrikeSpec>,
    pub spawns: Vec<(SpawnSpec, Vec2)>,
    pub power_boost_armed: bool,
}

impl StepOutput {
    fn set_motion(&mut self, motion: MotionIntent) {
        // Keep не перетирает импульс, выставленный в этом же тике
        if motion != MotionIntent::Keep || self.motion.is_none() {
            self.motion = Some(motion);
        }
    }
}

fn facing(from: f32, to: f32) -> f32 {
    if to < from {
        -1.0
    } else {
        1.0
    }
}

fn strike(shape: StrikeShape, offset: Vec2, attack: &Attack, damage_scale: f32) -> AttackStep {
    AttackStep::Strike(StrikeSpec {
        shape,
        offset,
        damage: attack.damage * damage_scale,
        burn: attack.burn,
    })
}

fn hold(motion: MotionIntent, until: Until) -> AttackStep {
    AttackStep::Hold { motion, until }
}

/// Компилирует атаку в шаги (+ recovery в конце)
pub fn build_script(attack: &Attack, ctx: &ScriptContext) -> Vec<AttackStep> {
    let dir_x = facing(ctx.origin.x, ctx.target.x);
    let aim = (ctx.target - ctx.origin).normalize_or_zero();
    let stand = MotionIntent::Horizontal(0.0);

    let mut steps = match &attack.maneuver {
        Maneuver::Strike => vec![
            hold(stand, Until::Elapsed(attack.duration * 0.5)),
            strike(StrikeShape::Circle { radius: attack.range }, Vec2::ZERO, attack, 1.0),
            hold(stand, Until::Elapsed(attack.duration * 0.5)),
        ],
        Maneuver::Lunge | Maneuver::Charge => vec![
            hold(
                MotionIntent::Horizontal(dir_x * attack.horizontal_force),
                Until::Elapsed(attack.duration),
            ),
            AttackStep::Set(stand),
        ],
        Maneuver::Leap { drop_speed } => vec![
            AttackStep::Set(MotionIntent::Velocity(Vec2::new(
                dir_x * attack.horizontal_force,
                attack.vertical_force,
            ))),
            hold(MotionIntent::Keep, Until::Falling),
            AttackStep::Set(MotionIntent::Vertical(-drop_speed)),
            hold(MotionIntent::Keep, Until::Grounded),
            hold(stand, Until::Elapsed(attack.duration * 0.25)),
        ],
        Maneuver::Buff => vec![
            AttackStep::ArmPowerBoost,
            hold(stand, Until::Elapsed(attack.duration)),
        ],
        Maneuver::HoverSlam { ground_offset } => {
            let impact = Vec2::new(ctx.origin.x, ctx.ground_y + ground_offset);
            let rise = Vec2::new(ctx.origin.x, ctx.target.y + ctx.hover_height);
            vec![
                hold(
                    MotionIntent::MoveTowards {
                        target: impact,
                        speed: attack.vertical_force,
                    },
                    Until::Arrived {
                        point: impact,
                        epsilon: ARRIVE_EPSILON,
                    },
                ),
                strike(StrikeShape::Circle { radius: attack.range }, Vec2::ZERO, attack, 1.0),
                hold(MotionIntent::Stop, Until::Elapsed(attack.duration)),
                hold(
                    MotionIntent::MoveTowards {
                        target: rise,
                        speed: ctx.hover_speed,
                    },
                    Until::Arrived {
                        point: rise,
                        epsilon: ARRIVE_EPSILON,
                    },
                ),
            ]
        }
        Maneuver::FlamingSlam { radius } => vec![
            AttackStep::Set(MotionIntent::Vertical(attack.range + 10.0)),
            hold(MotionIntent::Keep, Until::Falling),
            AttackStep::Set(MotionIntent::Velocity(Vec2::new(0.0, -attack.range * 3.0))),
            hold(MotionIntent::Keep, Until::Grounded),
            strike(StrikeShape::Circle { radius: *radius }, Vec2::ZERO, attack, 1.0),
            hold(stand, Until::Elapsed(0.5)),
        ],
        Maneuver::Torrent {
            radius,
            interval,
            speed,
            damage_scale,
        } => {
            let interval = interval.max(0.05);
            let waves = ((attack.duration / interval).ceil().max(1.0) as usize).min(MAX_TORRENT_WAVES);
            let mut steps = Vec::with_capacity(waves * 2 + 1);
            for _ in 0..waves {
                steps.push(strike(
                    StrikeShape::Circle { radius: *radius },
                    Vec2::ZERO,
                    attack,
                    *damage_scale,
                ));
                steps.push(hold(MotionIntent::Horizontal(dir_x * speed), Until::Elapsed(interval)));
            }
            steps.push(AttackStep::Set(stand));
            steps
        }
        Maneuver::GroundBreak { width, height } => vec![
            AttackStep::Set(MotionIntent::Velocity(Vec2::new(0.0, attack.vertical_force))),
            hold(MotionIntent::Keep, Until::Falling),
            hold(MotionIntent::Keep, Until::Grounded),
            strike(
                StrikeShape::Rect {
                    width: *width,
                    height: *height,
                },
                Vec2::new(0.0, -0.5),
                attack,
                1.0,
            ),
            hold(stand, Until::Elapsed(0.6)),
        ],
        Maneuver::Eruption {
            radius,
            windup,
            damage_scale,
        } => {
            let windup = windup.clamp(0.0, 1.0);
            vec![
                hold(stand, Until::Elapsed(attack.duration * windup)),
                strike(StrikeShape::Circle { radius: *radius }, Vec2::ZERO, attack, *damage_scale),
                hold(stand, Until::Elapsed(attack.duration * (1.0 - windup))),
            ]
        }
        Maneuver::Dash { overshoot } => {
            // Пролетаем сквозь цель на overshoot дальше
            let side = facing(ctx.target.x, ctx.origin.x);
            let destination = Vec2::new(ctx.target.x - side * overshoot, ctx.target.y);
            vec![
                hold(
                    MotionIntent::MoveTowards {
                        target: destination,
                        speed: attack.horizontal_force,
                    },
                    Until::Arrived {
                        point: destination,
                        epsilon: 0.1,
                    },
                ),
                hold(MotionIntent::Stop, Until::Elapsed(attack.duration)),
            ]
        }
        Maneuver::Volley { projectile, speed } => vec![
            AttackStep::Spawn(SpawnSpec::Projectile {
                kind: projectile.clone(),
                velocity: aim * *speed,
            }),
            hold(MotionIntent::Stop, Until::Elapsed(attack.duration)),
        ],
        Maneuver::Summon { kind } => vec![
            AttackStep::Spawn(SpawnSpec::Summon { kind: kind.clone() }),
            hold(MotionIntent::Stop, Until::Elapsed(attack.duration)),
        ],
    };

    if ctx.recovery_time > 0.0 {
        steps.push(hold(MotionIntent::Keep, Until::Elapsed(ctx.recovery_time)));
    }
    steps
}

/// Исполнение скрипта атаки по тикам
#[derive(Debug, Clone, PartialEq)]
pub struct AttackRun {
    steps: Vec<AttackStep>,
    cursor: usize,
    step_elapsed: f32,
    step_ticks: u32,
}

impl AttackRun {
    pub fn new(steps: Vec<AttackStep>) -> Self {
        Self {
            steps,
            cursor: 0,
            step_elapsed: 0.0,
            step_ticks: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn current_step(&self) -> Option<&AttackStep> {
        self.steps.get(self.cursor)
    }

    fn next_step(&mut self) {
        self.cursor += 1;
        self.step_elapsed = 0.0;
        self.step_ticks = 0;
    }

    /// Один тик: мгновенные шаги подряд, затем первый незавершённый Hold
    ///
    /// dt засчитывается только первому Hold тика. Условные проверки Hold
    /// пропускаются в тик его старта (физика ещё не применила импульс).
    pub fn advance(&mut self, delta_time: f32, observation: &StepObservation, out: &mut StepOutput) -> bool {
        let mut dt_left = delta_time.max(0.0);

        while let Some(step) = self.steps.get(self.cursor).cloned() {
            match step {
                AttackStep::Set(motion) => {
                    out.motion = Some(motion);
                    self.next_step();
                }
                AttackStep::Strike(spec) => {
                    out.strikes.push(spec);
                    self.next_step();
                }
                AttackStep::ArmPowerBoost => {
                    out.power_boost_armed = true;
                    self.next_step();
                }
                AttackStep::Spawn(spec) => {
                    out.spawns.push((spec, observation.position));
                    self.next_step();
                }
                AttackStep::Hold { motion, until } => {
                    out.set_motion(motion);
                    self.step_ticks += 1;
                    self.step_elapsed += dt_left;
                    dt_left = 0.0;

                    let done = match until {
                        Until::Elapsed(duration) => self.step_elapsed >= duration,
                        _ if self.step_ticks < 2 => false,
                        _ if self.step_elapsed >= STEP_TIMEOUT => true,
                        Until::Falling => observation.velocity.y <= 0.0,
                        Until::Grounded => observation.grounded,
                        Until::Arrived { point, epsilon } => observation.position.distance(point) <= epsilon,
                    };

                    if !done {
                        return false;
                    }
                    self.next_step();
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::catalog::{AttackCatalog, AttackName};

    fn context() -> ScriptContext {
        ScriptContext {
            origin: Vec2::new(0.0, 0.0),
            target: Vec2::new(5.0, 0.0),
            ground_y: 0.0,
            hover_height: 4.0,
            hover_speed: 4.0,
            recovery_time: 0.0,
        }
    }

    fn grounded_at(position: Vec2) -> StepObservation {
        StepObservation {
            position,
            velocity: Vec2::ZERO,
            grounded: true,
        }
    }

    #[test]
    fn test_lunge_direction_locked_at_start() {
        let catalog = AttackCatalog::knight_phase1();
        let lunge = catalog.get(AttackName::Lunge).unwrap();

        let steps = build_script(lunge, &context());

        assert_eq!(
            steps[0],
            AttackStep::Hold {
                motion: MotionIntent::Horizontal(15.0),
                until: Until::Elapsed(1.0)
            }
        );

        // Цель слева → рывок влево
        let mut left = context();
        left.target = Vec2::new(-3.0, 0.0);
        let steps = build_script(lunge, &left);
        assert!(matches!(
            steps[0],
            AttackStep::Hold {
                motion: MotionIntent::Horizontal(x),
                ..
            } if x < 0.0
        ));
    }

    #[test]
    fn test_basic_strike_fires_mid_attack() {
        let catalog = AttackCatalog::knight_phase1();
        let basic = catalog.get(AttackName::Basic).unwrap();
        let mut run = AttackRun::new(build_script(basic, &context()));
        let observation = grounded_at(Vec2::ZERO);

        let mut out = StepOutput::default();
        assert!(!run.advance(0.25, &observation, &mut out));
        assert!(out.strikes.is_empty());

        // 0.4 сек (половина 0.8): удар
        let mut out = StepOutput::default();
        assert!(!run.advance(0.25, &observation, &mut out));
        assert_eq!(out.strikes.len(), 1);
        assert_eq!(out.strikes[0].damage, 10.0);

        let mut out = StepOutput::default();
        run.advance(0.5, &observation, &mut out);
        assert!(run.is_finished());
    }

    #[test]
    fn test_buff_arms_power_boost_immediately() {
        let catalog = AttackCatalog::knight_phase1();
        let buff = catalog.get(AttackName::PowerBoost).unwrap();
        let mut run = AttackRun::new(build_script(buff, &context()));

        let mut out = StepOutput::default();
        run.advance(0.1, &grounded_at(Vec2::ZERO), &mut out);

        assert!(out.power_boost_armed);
        assert!(out.strikes.is_empty());
    }

    #[test]
    fn test_leap_waits_for_apex_then_ground() {
        let catalog = AttackCatalog::knight_phase1();
        let slam = catalog.get(AttackName::Slam).unwrap();
        let mut run = AttackRun::new(build_script(slam, &context()));

        // Тик старта: импульс прыжка, Keep его не перетирает
        let mut out = StepOutput::default();
        run.advance(0.1, &grounded_at(Vec2::ZERO), &mut out);
        assert_eq!(out.motion, Some(MotionIntent::Velocity(Vec2::new(5.0, 12.0))));

        // Летим вверх: ждём
        let rising = StepObservation {
            position: Vec2::new(0.5, 2.0),
            velocity: Vec2::new(5.0, 6.0),
            grounded: false,
        };
        let mut out = StepOutput::default();
        run.advance(0.1, &rising, &mut out);
        assert_eq!(out.motion, Some(MotionIntent::Keep));

        // Вершина → резкое падение
        let apex = StepObservation {
            velocity: Vec2::new(5.0, -0.1),
            ..rising
        };
        let mut out = StepOutput::default();
        run.advance(0.1, &apex, &mut out);
        assert_eq!(out.motion, Some(MotionIntent::Vertical(-20.0)));

        // Приземлились → стоим, потом конец
        let mut out = StepOutput::default();
        run.advance(0.1, &grounded_at(Vec2::new(1.0, 0.0)), &mut out);
        let mut out = StepOutput::default();
        run.advance(1.0, &grounded_at(Vec2::new(1.0, 0.0)), &mut out);
        assert!(run.is_finished());
    }

    #[test]
    fn test_conditional_step_times_out() {
        let catalog = AttackCatalog::knight_phase1();
        let slam = catalog.get(AttackName::Slam).unwrap();
        let mut run = AttackRun::new(build_script(slam, &context()));

        // Физика не применяет прыжок: velocity.y навсегда > 0
        let stuck = StepObservation {
            position: Vec2::ZERO,
            velocity: Vec2::new(0.0, 1.0),
            grounded: false,
        };
        for _ in 0..100 {
            let mut out = StepOutput::default();
            if run.advance(0.1, &stuck, &mut out) {
                break;
            }
        }

        assert!(run.is_finished());
    }

    #[test]
    fn test_torrent_wave_count() {
        let catalog = AttackCatalog::knight_phase2();
        let torrent = catalog.get(AttackName::InfernalTorrent).unwrap();

        let steps = build_script(torrent, &context());
        let strikes: Vec<_> = steps
            .iter()
            .filter_map(|step| match step {
                AttackStep::Strike(spec) => Some(spec),
                _ => None,
            })
            .collect();

        // 2.0 / 0.4 = 5 волн по 75% урона с burn
        assert_eq!(strikes.len(), 5);
        assert_eq!(strikes[0].damage, 12.0 * 0.75);
        assert!(strikes[0].burn.is_some());
    }

    #[test]
    fn test_torrent_waves_capped() {
        let catalog = AttackCatalog::knight_phase2();
        let mut torrent = catalog.get(AttackName::InfernalTorrent).unwrap().clone();
        torrent.duration = 1.0e30;

        let steps = build_script(&torrent, &context());

        // strike + hold на волну, плюс финальный Set
        assert_eq!(steps.len(), MAX_TORRENT_WAVES * 2 + 1);
    }

    #[test]
    fn test_hover_slam_targets_ground_below_origin() {
        let catalog = AttackCatalog::obelok();
        let slam = catalog.get(AttackName::Slam).unwrap();
        let mut ctx = context();
        ctx.origin = Vec2::new(2.0, 6.0);
        ctx.target = Vec2::new(2.2, 0.0);

        let steps = build_script(slam, &ctx);

        assert_eq!(
            steps[0],
            AttackStep::Hold {
                motion: MotionIntent::MoveTowards {
                    target: Vec2::new(2.0, 0.5),
                    speed: 20.0
                },
                until: Until::Arrived {
                    point: Vec2::new(2.0, 0.5),
                    epsilon: ARRIVE_EPSILON
                }
            }
        );
    }
}
