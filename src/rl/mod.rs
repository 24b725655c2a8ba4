//! Reinforcement learning infrastructure for the obstacle game
//!
//! Provides:
//! - Backend type aliases for training and inference
//! - DQN hyperparameter configuration with a linear epsilon schedule
//! - Action-value network with Polyak target blending
//! - Bounded FIFO replay memory with uniform sampling
//! - DQN agent (epsilon-greedy acting, TD learning, target updates)
//! - Checkpoint persistence for both weight sets

pub mod agent;
pub mod backend;
pub mod buffer;
pub mod config;
pub mod network;
pub mod persistence;

pub use agent::DqnAgent;
pub use backend::{default_device, InferenceBackend, TrainingBackend};
pub use buffer::{ReplayBuffer, Transition, TransitionBatch};
pub use config::DqnConfig;
pub use network::{QNetwork, QNetworkConfig};
pub use persistence::{
    load_checkpoint, save_checkpoint, CheckpointBundle, CheckpointMetadata,
};
