//! BossController: единый data-driven контроллер босса
//!
//! Один конечный автомат на все варианты (Knight, Obelok, фрагменты),
//! различия только в BossConfig. Контроллер чистый: получает Observation,
//! возвращает BossOutput (motion intent, удары, спавны, анимации).
//! ECS-обвязка в systems.rs.

use bevy::prelude::*;
use rand::Rng;

use crate::boss::config::{ApproachStyle, BossConfig, PhaseMode};
use crate::boss::script::{build_script, AttackRun, ScriptContext, SpawnSpec, StepObservation, StepOutput};
use crate::boss::selection::{AttackSelector, Decision};
use crate::boss::state::{BossPhase, BossState};
use crate::combat::catalog::{AttackCatalog, AttackName};
use crate::combat::damage::StrikeSpec;
use crate::components::MotionIntent;

/// Returning → Idle когда ближе этого к дому
pub const HOME_EPSILON: f32 = 0.1;

/// |Δx| меньше этого: цель строго над/под наземным боссом
pub const ALIGN_EPSILON: f32 = 0.01;

/// Высота над полом, на которую падает собранное ядро
const KNOCKED_OUT_HEIGHT: f32 = 1.0;

/// Что контроллер видит в начале тика (spatial query)
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
    /// None: цели нет (despawn / ещё не найдена)
    pub target: Option<Vec2>,
    pub ground_y: f32,
}

/// Результат тика
#[derive(Debug, Clone, Default)]
pub struct BossOutput {
    pub motion: MotionIntent,
    /// Новое состояние (только на тике перехода)
    pub animation: Option<&'static str>,
    pub attack_started: Option<AttackName>,
    pub attack_finished: Option<AttackName>,
    pub strikes: Vec<StrikeSpec>,
    pub spawns: Vec<(SpawnSpec, Vec2)>,
    pub power_boost_armed: bool,
}

#[derive(Component, Debug, Clone)]
pub struct BossController {
    config: BossConfig,
    state: BossState,
    phase: BossPhase,
    home: Vec2,
    active: bool,
    catalog: AttackCatalog,
    selector: AttackSelector,
}

impl BossController {
    pub fn new(config: BossConfig, home: Vec2) -> Self {
        let catalog = config.catalog.clone();
        let selector = AttackSelector::new(&config.selection);
        Self {
            config,
            state: BossState::Idle,
            phase: BossPhase::Phase1,
            home,
            active: true,
            catalog,
            selector,
        }
    }

    pub fn config(&self) -> &BossConfig {
        &self.config
    }

    pub fn state(&self) -> &BossState {
        &self.state
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Текущий каталог (после SwapCatalog: каталог фазы 2)
    pub fn catalog(&self) -> &AttackCatalog {
        &self.catalog
    }

    pub fn selector(&self) -> &AttackSelector {
        &self.selector
    }

    /// Фрагмент включается сразу в Targeting (без Idle/Awakening)
    pub fn activate(&mut self) {
        self.active = true;
        self.state = BossState::Targeting;
        self.selector.reset();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.state = BossState::Idle;
    }

    /// Phase1 → Phase2, атомарно в пределах тика
    ///
    /// Атака в полёте прерывается, новое поведение работает с этого же тика.
    /// Повторный вызов: no-op (false).
    pub fn enter_phase_two(&mut self) -> bool {
        if self.phase == BossPhase::Phase2 {
            return false;
        }
        let Some(phase) = self.config.phase.clone() else {
            return false;
        };

        self.phase = BossPhase::Phase2;
        match phase.mode {
            PhaseMode::SwapCatalog(catalog) => {
                self.catalog = catalog;
                self.selector.reset();
                if self.state.is_attacking() || matches!(self.state, BossState::Fleeing { .. }) {
                    self.state = BossState::Targeting;
                }
            }
            PhaseMode::Split { .. } => {
                self.state = BossState::Splitting;
            }
        }
        true
    }

    /// Все фрагменты усмирены: ядро падает (Splitting → Reforming)
    pub fn begin_reform(&mut self) -> bool {
        if self.state != BossState::Splitting {
            return false;
        }
        let reform_time = match &self.config.phase {
            Some(phase) => match &phase.mode {
                PhaseMode::Split { reform_time, .. } => *reform_time,
                PhaseMode::SwapCatalog(_) => return false,
            },
            None => return false,
        };
        self.state = BossState::Reforming {
            remaining: reform_time,
        };
        true
    }

    /// Окно уязвимости закрылось: снова распад на фрагменты
    pub fn resplit(&mut self) {
        self.state = BossState::Splitting;
        self.selector.reset();
    }

    fn knockout_duration(&self) -> f32 {
        match self.config.phase.as_ref().map(|phase| &phase.mode) {
            Some(PhaseMode::Split {
                knockout_duration, ..
            }) => *knockout_duration,
            _ => 0.0,
        }
    }

    fn hover_height(&self) -> f32 {
        match self.config.approach {
            ApproachStyle::Hover { height, .. } => height,
            ApproachStyle::Ground { .. } => 0.0,
        }
    }

    /// "Стоять на месте" для стиля передвижения
    fn halt(&self) -> MotionIntent {
        match self.config.approach {
            ApproachStyle::Hover { .. } => MotionIntent::Stop,
            ApproachStyle::Ground { .. } => MotionIntent::Horizontal(0.0),
        }
    }

    /// Один тик автомата
    ///
    /// Порядок: cooldown таймеры → переходы/выбор атаки → скрипт атаки.
    pub fn tick<R: Rng>(&mut self, delta_time: f32, observation: &Observation, rng: &mut R) -> BossOutput {
        let mut out = BossOutput::default();
        if !self.active {
            return out;
        }

        let dt = delta_time.max(0.0);
        self.selector.tick(dt);
        let previous = self.state.label();

        match observation.target {
            Some(target) => {
                let state = std::mem::take(&mut self.state);
                self.state = self.step(state, dt, observation, target, rng, &mut out);
            }
            // Цель пропала: замираем, состояние сохраняется
            None => out.motion = MotionIntent::Stop,
        }

        let current = self.state.label();
        if current != previous {
            out.animation = Some(current);
        }
        out
    }

    fn step<R: Rng>(
        &mut self,
        state: BossState,
        dt: f32,
        observation: &Observation,
        target: Vec2,
        rng: &mut R,
        out: &mut BossOutput,
    ) -> BossState {
        let distance = observation.position.distance(target);

        match state {
            BossState::Idle => {
                out.motion = self.halt();
                if distance >= self.config.chase_trigger_distance {
                    BossState::Idle
                } else if self.config.awakening_time > 0.0 {
                    BossState::Awakening {
                        remaining: self.config.awakening_time,
                    }
                } else {
                    BossState::Targeting
                }
            }
            BossState::Awakening { remaining } => {
                out.motion = self.halt();
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    BossState::Targeting
                } else {
                    BossState::Awakening { remaining }
                }
            }
            BossState::Targeting => self.pursue(distance, observation, target, rng, out),
            BossState::Charging { attack, remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.start_attack(attack, observation, target, out)
                } else {
                    out.motion = self.halt();
                    BossState::Charging { attack, remaining }
                }
            }
            BossState::Attacking { attack, run } => self.run_attack(attack, run, dt, observation, out),
            BossState::Returning => self.return_home(observation, out),
            BossState::Fleeing { remaining } => {
                let away = if target.x < observation.position.x { 1.0 } else { -1.0 };
                out.motion = MotionIntent::Horizontal(away * self.config.flee_speed);
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    BossState::Targeting
                } else {
                    BossState::Fleeing { remaining }
                }
            }
            BossState::Splitting => {
                out.motion = MotionIntent::Stop;
                BossState::Splitting
            }
            BossState::Reforming { remaining } => {
                let rest = Vec2::new(observation.position.x, observation.ground_y + KNOCKED_OUT_HEIGHT);
                out.motion = MotionIntent::MoveTowards {
                    target: rest,
                    speed: self.config.move_speed * 2.0,
                };
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    BossState::KnockedOut {
                        remaining: self.knockout_duration(),
                    }
                } else {
                    BossState::Reforming { remaining }
                }
            }
            BossState::KnockedOut { remaining } => {
                out.motion = MotionIntent::Stop;
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    BossState::Targeting
                } else {
                    BossState::KnockedOut { remaining }
                }
            }
        }
    }

    /// Targeting: сближение + выбор атаки, когда цель на линии атаки
    fn pursue<R: Rng>(
        &mut self,
        distance: f32,
        observation: &Observation,
        target: Vec2,
        rng: &mut R,
        out: &mut BossOutput,
    ) -> BossState {
        if distance > self.config.lose_aggro_distance {
            out.motion = self.halt();
            return BossState::Returning;
        }

        let in_position = match self.config.approach {
            ApproachStyle::Hover {
                height,
                alignment_epsilon,
            } => {
                out.motion = MotionIntent::MoveTowards {
                    target: target + Vec2::Y * height,
                    speed: self.config.move_speed,
                };
                (target.x - observation.position.x).abs() < alignment_epsilon
            }
            ApproachStyle::Ground { attack_range } => {
                if distance <= attack_range {
                    out.motion = MotionIntent::Horizontal(0.0);
                    true
                } else {
                    // Цель ровно над/под боссом: бежать некуда
                    let dx = target.x - observation.position.x;
                    let direction = if dx.abs() < ALIGN_EPSILON { 0.0 } else { dx.signum() };
                    out.motion = MotionIntent::Horizontal(direction * self.config.move_speed);
                    false
                }
            }
        };

        if !in_position {
            return BossState::Targeting;
        }

        match self.selector.decide(&self.catalog, rng) {
            Decision::Attack(attack) if self.config.charge_time > 0.0 => {
                out.motion = self.halt();
                BossState::Charging {
                    attack,
                    remaining: self.config.charge_time,
                }
            }
            Decision::Attack(attack) => self.start_attack(attack, observation, target, out),
            Decision::Flee(duration) => BossState::Fleeing { remaining: duration },
            Decision::Wait => BossState::Targeting,
        }
    }

    fn start_attack(
        &mut self,
        attack: AttackName,
        observation: &Observation,
        target: Vec2,
        out: &mut BossOutput,
    ) -> BossState {
        let Some(definition) = self.catalog.get(attack) else {
            return BossState::Targeting;
        };

        let context = ScriptContext {
            origin: observation.position,
            target,
            ground_y: observation.ground_y,
            hover_height: self.hover_height(),
            hover_speed: self.config.move_speed,
            recovery_time: self.config.recovery_time,
        };
        let run = AttackRun::new(build_script(definition, &context));
        out.attack_started = Some(attack);

        // Мгновенные шаги (импульсы): в тике старта
        self.run_attack(attack, run, 0.0, observation, out)
    }

    fn run_attack(
        &mut self,
        attack: AttackName,
        mut run: AttackRun,
        dt: f32,
        observation: &Observation,
        out: &mut BossOutput,
    ) -> BossState {
        let step_observation = StepObservation {
            position: observation.position,
            velocity: observation.velocity,
            grounded: observation.grounded,
        };
        let mut step_out = StepOutput::default();
        let finished = run.advance(dt, &step_observation, &mut step_out);

        out.motion = step_out.motion.unwrap_or(MotionIntent::Keep);
        out.strikes.extend(step_out.strikes);
        out.spawns.extend(step_out.spawns);
        out.power_boost_armed |= step_out.power_boost_armed;

        if finished {
            out.attack_finished = Some(attack);
            BossState::Targeting
        } else {
            BossState::Attacking { attack, run }
        }
    }

    fn return_home(&mut self, observation: &Observation, out: &mut BossOutput) -> BossState {
        let arrived = match self.config.approach {
            ApproachStyle::Hover { .. } => {
                out.motion = MotionIntent::MoveTowards {
                    target: self.home,
                    speed: self.config.move_speed,
                };
                observation.position.distance(self.home) < HOME_EPSILON
            }
            ApproachStyle::Ground { .. } => {
                let offset = self.home.x - observation.position.x;
                out.motion = if offset.abs() < HOME_EPSILON {
                    MotionIntent::Horizontal(0.0)
                } else {
                    MotionIntent::Horizontal(offset.signum() * self.config.move_speed)
                };
                offset.abs() < HOME_EPSILON
            }
        };

        if arrived {
            out.motion = self.halt();
            BossState::Idle
        } else {
            BossState::Returning
        }
    }
}
