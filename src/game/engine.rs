use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::action::Action;
use super::config::EnvConfig;
use super::state::{CollisionKind, GameState, Pipe, Rect, StateVec};

/// Diagnostic information about a single step
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInfo {
    /// Whether a pipe was passed this step
    pub just_scored: bool,
    /// What the bird collided with, if the step ended the episode
    pub collision: Option<CollisionKind>,
}

/// Result of taking one environment step
#[derive(Debug, Clone, Copy)]
pub struct StepResult {
    /// Observation after the step
    pub state: StateVec,
    /// Shaped reward for the transition
    pub reward: f32,
    /// Whether the episode has ended
    pub done: bool,
    pub info: StepInfo,
}

/// The side-scrolling obstacle environment.
///
/// Owns the full game state and a seedable RNG for pipe gap placement.
/// `reset` starts a fresh episode; `step` advances it by one tick and
/// returns the observation, shaped reward, and termination flag.
pub struct FlappyEnv {
    config: EnvConfig,
    state: GameState,
    rng: StdRng,
}

impl FlappyEnv {
    /// Create an environment with an entropy-seeded RNG
    pub fn new(config: EnvConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an environment with a fixed seed for reproducible runs
    pub fn with_seed(config: EnvConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EnvConfig, rng: StdRng) -> Self {
        let mut env = Self {
            config,
            state: GameState::new(),
            rng,
        };
        env.reset();
        env
    }

    /// Start a new episode and return the initial observation.
    ///
    /// The bird starts at mid-screen with zero velocity. Three pipes are
    /// spawned starting one offset past the right edge, spaced by the
    /// difficulty's pipe spacing, each with a random gap position.
    pub fn reset(&mut self) -> StateVec {
        let start_x = self.config.screen_width + self.config.init_pipe_offset;
        let spacing = self.config.pipe_spacing();

        self.state = GameState::new();
        self.state.bird_y = self.config.screen_height / 2.0;

        for i in 0..3 {
            let gap_y = self.spawn_gap_y();
            let id = self.state.next_pipe_id;
            self.state.next_pipe_id += 1;
            self.state
                .pipes
                .push(Pipe::new(id, start_x + i as f32 * spacing, gap_y));
        }

        self.state_vector()
    }

    /// Advance the environment by one tick.
    ///
    /// Stepping a finished episode is a no-op that returns the current
    /// observation with zero reward.
    pub fn step(&mut self, action: Action) -> StepResult {
        if self.state.done {
            return StepResult {
                state: self.state_vector(),
                reward: 0.0,
                done: true,
                info: StepInfo::default(),
            };
        }

        // Physics: flap impulse, then gravity, clamp, integrate
        if let Action::Flap = action {
            self.state.bird_vel = self.config.flap_vel;
        }
        self.state.bird_vel = (self.state.bird_vel + self.config.gravity)
            .clamp(-self.config.max_vel, self.config.max_vel);
        self.state.bird_y += self.state.bird_vel;

        // Scroll layers: ground at full speed, background at half, both
        // wrapping after one screen width
        let speed = self.config.scroll_speed();
        self.state.base_x -= speed;
        if self.state.base_x <= -self.config.screen_width {
            self.state.base_x = 0.0;
        }
        self.state.bg_x -= speed / 2.0;
        if self.state.bg_x <= -self.config.screen_width {
            self.state.bg_x = 0.0;
        }

        for pipe in &mut self.state.pipes {
            pipe.x -= speed;
        }

        // Recycle the leftmost pipe once it has fully left the screen
        let off_screen = self
            .state
            .pipes
            .first()
            .map_or(false, |p| p.x + self.config.pipe_width < 0.0);
        if off_screen {
            self.state.pipes.remove(0);
            let new_x = self
                .state
                .pipes
                .last()
                .map_or(self.config.screen_width, |p| p.x)
                + self.config.pipe_spacing();
            let gap_y = self.spawn_gap_y();
            let id = self.state.next_pipe_id;
            self.state.next_pipe_id += 1;
            self.state.pipes.push(Pipe::new(id, new_x, gap_y));
        }

        self.state.steps += 1;

        if let Some(kind) = self.check_collision() {
            self.state.done = true;
            return StepResult {
                state: self.state_vector(),
                reward: self.config.death_penalty,
                done: true,
                info: StepInfo {
                    just_scored: false,
                    collision: Some(kind),
                },
            };
        }

        // Scoring: a pipe counts once its trailing edge passes the bird,
        // and only if the bird is inside the gap at that moment
        let gap = self.config.gap_size();
        let bird_x = self.config.bird_x;
        let bird_y = self.state.bird_y;
        let pipe_width = self.config.pipe_width;
        let mut just_scored = false;
        for pipe in &mut self.state.pipes {
            if pipe.x + pipe_width < bird_x && !pipe.scored {
                if pipe.gap_y < bird_y && bird_y < pipe.gap_y + gap {
                    self.state.score += 1;
                    just_scored = true;
                }
                pipe.scored = true;
            }
        }

        let (dy_norm, vel_norm, dx_norm) = self.normalized();
        let reward = if just_scored {
            self.reward_score(dy_norm)
        } else {
            self.reward_alive(dy_norm, vel_norm, dx_norm)
        };

        StepResult {
            state: self.state_vector(),
            reward,
            done: false,
            info: StepInfo {
                just_scored,
                collision: None,
            },
        }
    }

    /// Observation vector for the current state.
    ///
    /// `[dy_norm, vel_norm, pipe_dist_norm, gap_y_norm]`, all derived from
    /// the next pipe at or ahead of the bird.
    pub fn state_vector(&self) -> StateVec {
        let (dy_norm, vel_norm, dx_norm) = self.normalized();
        let pipe = self.next_pipe();
        let gap_y_norm = pipe.gap_y / (self.config.screen_height - self.config.ground_height);
        [dy_norm, vel_norm, dx_norm, gap_y_norm]
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    fn spawn_gap_y(&mut self) -> f32 {
        self.rng
            .gen_range(self.config.min_gap_y..=self.config.max_gap_y())
    }

    /// First pipe whose trailing edge has not yet passed the bird. Falls
    /// back to the oldest pipe so the observation is always defined.
    fn next_pipe(&self) -> &Pipe {
        self.state
            .pipes
            .iter()
            .find(|p| p.x + self.config.pipe_width >= self.config.bird_x)
            .unwrap_or(&self.state.pipes[0])
    }

    fn check_collision(&self) -> Option<CollisionKind> {
        let cfg = &self.config;
        let bird_y = self.state.bird_y;

        if bird_y - cfg.bird_radius <= 0.0 {
            return Some(CollisionKind::Ceiling);
        }
        if bird_y + cfg.bird_radius >= cfg.ground_y() {
            return Some(CollisionKind::Ground);
        }

        // Hitbox is a square deflated 3 px per side relative to the sprite
        let hitbox = Rect::centered(cfg.bird_x, bird_y, cfg.bird_radius - 3.0);
        let gap = cfg.gap_size();
        for pipe in &self.state.pipes {
            let top = Rect::new(pipe.x, 0.0, cfg.pipe_width, pipe.gap_y);
            let bottom = Rect::new(
                pipe.x,
                pipe.gap_y + gap,
                cfg.pipe_width,
                cfg.screen_height - (pipe.gap_y + gap),
            );
            if hitbox.intersects(&top) || hitbox.intersects(&bottom) {
                return Some(CollisionKind::Pipe);
            }
        }
        None
    }

    fn normalized(&self) -> (f32, f32, f32) {
        let pipe = self.next_pipe();
        let gap = self.config.gap_size();
        let gap_center = pipe.gap_y + gap / 2.0;
        let dy_norm = (gap_center - self.state.bird_y) / gap;
        let vel_norm = self.state.bird_vel / self.config.max_vel;
        let dx_norm = (pipe.x - self.config.bird_x) / self.config.screen_width;
        (dy_norm, vel_norm, dx_norm)
    }

    /// Reward for a step that passed a pipe: base score reward plus a
    /// bonus for being near the center of the next gap
    fn reward_score(&self, dy_norm: f32) -> f32 {
        let center_bonus = ((1.0 - dy_norm.abs()) * self.config.center_bonus_mult).max(0.0);
        self.config.score_reward + center_bonus
    }

    /// Reward for an ordinary surviving step: small living reward minus
    /// penalties for gap misalignment and vertical speed. The alignment
    /// penalty doubles while a pipe is close ahead.
    fn reward_alive(&self, dy_norm: f32, vel_norm: f32, dx_norm: f32) -> f32 {
        let mut vertical_penalty = dy_norm.abs() * self.config.vertical_weight;
        if dx_norm < self.config.approaching_threshold {
            vertical_penalty *= self.config.approaching_multiplier;
        }
        let velocity_penalty = vel_norm.abs() * self.config.velocity_weight;
        self.config.living_reward - vertical_penalty - velocity_penalty
    }
}
