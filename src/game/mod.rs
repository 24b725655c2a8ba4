//! Core game logic for the side-scrolling obstacle environment.
//!
//! The environment is fully headless: `FlappyEnv` is a deterministic state
//! machine (given a seed) that the training and evaluation modes drive
//! directly.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

pub use action::Action;
pub use config::{Difficulty, EnvConfig};
pub use engine::{FlappyEnv, StepInfo, StepResult};
pub use state::{CollisionKind, GameState, Pipe, Rect, StateVec, NUM_ACTIONS, STATE_DIM};
