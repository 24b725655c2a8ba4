//! Flappy RL - DQN training for a side-scrolling obstacle-avoidance game
//!
//! This library provides:
//! - Core game logic as a headless, seedable state machine (game module)
//! - DQN training infrastructure on the Burn framework (rl module)
//! - Training statistics tracking (metrics module)
//! - Train and play execution modes (modes module)

pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
