//! Training mode for the DQN agent
//!
//! Runs the training loop: a random-policy warmup phase to seed the replay
//! buffer, then episodic epsilon-greedy training with one learning step per
//! environment step, periodic logging, and checkpointing.

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

use crate::game::{Action, EnvConfig, FlappyEnv, NUM_ACTIONS};
use crate::metrics::TrainingStats;
use crate::rl::{DqnAgent, DqnConfig, QNetworkConfig, ReplayBuffer, Transition};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Path of the checkpoint written during and after training
    pub checkpoint_path: PathBuf,

    /// Log progress and save a checkpoint every N episodes
    pub log_frequency: usize,

    /// Continue from the checkpoint at `checkpoint_path` if it exists
    pub resume: bool,

    /// Seed for the environment, exploration, and warmup RNGs
    pub seed: Option<u64>,

    /// Environment configuration (difficulty, rewards)
    pub env_config: EnvConfig,

    /// DQN hyperparameters
    pub dqn_config: DqnConfig,
}

impl TrainConfig {
    pub fn new(num_episodes: usize, checkpoint_path: PathBuf) -> Self {
        Self {
            num_episodes,
            checkpoint_path,
            log_frequency: 10,
            resume: false,
            seed: None,
            env_config: EnvConfig::default(),
            dqn_config: DqnConfig::default(),
        }
    }
}

/// Training mode for the DQN agent
///
/// Owns the agent, environment, replay buffer, and statistics. The step
/// counter driving the epsilon schedule is a field of this struct, scoped to
/// one training session.
pub struct TrainMode<B: AutodiffBackend> {
    agent: DqnAgent<B>,

    env: FlappyEnv,

    buffer: ReplayBuffer,

    stats: TrainingStats,

    config: TrainConfig,

    /// Policy steps taken this session (drives the epsilon schedule)
    total_steps: usize,

    /// Episodes completed this session
    episodes_done: usize,

    /// RNG for the random warmup policy
    rng: StdRng,

    device: B::Device,
}

impl<B: AutodiffBackend> TrainMode<B> {
    pub fn new(config: TrainConfig, device: B::Device) -> Self {
        let network_config = QNetworkConfig::default();

        let (env, agent, rng) = match config.seed {
            Some(seed) => (
                FlappyEnv::with_seed(config.env_config.clone(), seed),
                DqnAgent::with_seed(
                    network_config,
                    config.dqn_config.clone(),
                    device.clone(),
                    seed.wrapping_add(1),
                ),
                StdRng::seed_from_u64(seed.wrapping_add(2)),
            ),
            None => (
                FlappyEnv::new(config.env_config.clone()),
                DqnAgent::new(network_config, config.dqn_config.clone(), device.clone()),
                StdRng::from_entropy(),
            ),
        };

        let buffer = ReplayBuffer::new(config.dqn_config.replay_capacity);
        // 50-episode score window, 100-step loss window
        let stats = TrainingStats::new(50, 100);

        Self {
            agent,
            env,
            buffer,
            stats,
            config,
            total_steps: 0,
            episodes_done: 0,
            rng,
            device,
        }
    }

    /// Run the training loop
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        if self.config.resume {
            self.try_resume()?;
        }

        self.warmup();

        for episode in 0..self.config.num_episodes {
            let (episode_reward, episode_steps, episode_score) = self.run_episode();
            self.stats
                .record_episode(episode_reward, episode_steps, episode_score);
            self.episodes_done += 1;

            if (episode + 1) % self.config.log_frequency == 0 {
                self.print_progress(episode + 1);
                self.save_checkpoint()?;
            }
        }

        self.save_checkpoint()?;

        println!("\nTraining complete!");
        println!("Checkpoint saved to: {:?}", self.config.checkpoint_path);
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Load an existing checkpoint if one is present.
    ///
    /// A missing checkpoint is reported and training starts from fresh
    /// weights; a corrupt one is an error.
    fn try_resume(&mut self) -> Result<()> {
        if !self.config.checkpoint_path.exists() {
            println!(
                "No checkpoint at {:?}, starting fresh",
                self.config.checkpoint_path
            );
            return Ok(());
        }

        let (agent, metadata) =
            DqnAgent::load(&self.config.checkpoint_path, self.device.clone())
                .with_context(|| {
                    format!(
                        "Failed to resume from checkpoint {:?}",
                        self.config.checkpoint_path
                    )
                })?;
        self.agent = agent;
        self.total_steps = metadata.training_steps;
        println!(
            "Resumed from {:?} ({} steps, {} episodes)",
            self.config.checkpoint_path, metadata.training_steps, metadata.episodes_trained
        );
        Ok(())
    }

    /// Seed the replay buffer with uniformly random transitions
    fn warmup(&mut self) {
        let warmup_steps = self.config.dqn_config.warmup_steps;
        println!("Collecting {} warmup transitions...", warmup_steps);

        let mut state = self.env.reset();
        for _ in 0..warmup_steps {
            let action = self.rng.gen_range(0..NUM_ACTIONS);
            let result = self.env.step(Action::from_index(action));
            self.buffer.push(Transition {
                state,
                action,
                reward: result.reward,
                next_state: result.state,
                done: result.done,
            });
            state = if result.done {
                self.env.reset()
            } else {
                result.state
            };
        }
        println!("Warmup complete ({} transitions)\n", self.buffer.len());
    }

    /// Run one epsilon-greedy episode with a learning step after every
    /// environment step
    fn run_episode(&mut self) -> (f32, usize, u32) {
        let mut state = self.env.reset();
        let mut episode_reward = 0.0;
        let mut episode_steps = 0usize;

        loop {
            let epsilon = self.config.dqn_config.epsilon_at(self.total_steps);
            let action = self.agent.act(&state, epsilon);
            let result = self.env.step(Action::from_index(action));

            self.buffer.push(Transition {
                state,
                action,
                reward: result.reward,
                next_state: result.state,
                done: result.done,
            });

            episode_reward += result.reward;
            episode_steps += 1;
            self.total_steps += 1;

            if let Some(loss) = self
                .agent
                .update(&self.buffer, self.config.dqn_config.batch_size)
            {
                self.stats.record_loss(loss);
            }

            state = result.state;
            if result.done {
                break;
            }
        }

        (episode_reward, episode_steps, self.env.state().score)
    }

    fn save_checkpoint(&self) -> Result<()> {
        self.agent
            .save(
                &self.config.checkpoint_path,
                self.total_steps,
                self.episodes_done,
            )
            .with_context(|| {
                format!(
                    "Failed to save checkpoint to {:?}",
                    self.config.checkpoint_path
                )
            })
    }

    fn print_header(&self) {
        println!("{}", "=".repeat(70));
        println!("DQN Training - Flappy RL");
        println!("{}", "=".repeat(70));
        println!("Episodes: {}", self.config.num_episodes);
        println!("Difficulty: {}", self.config.env_config.difficulty);
        println!("DQN Config:");
        println!("  Learning rate: {}", self.config.dqn_config.learning_rate);
        println!("  Gamma: {}", self.config.dqn_config.gamma);
        println!("  Tau: {}", self.config.dqn_config.tau);
        println!("  Batch size: {}", self.config.dqn_config.batch_size);
        println!(
            "  Replay capacity: {}",
            self.config.dqn_config.replay_capacity
        );
        println!("  Warmup steps: {}", self.config.dqn_config.warmup_steps);
        println!(
            "  Epsilon: {} -> {} over {} steps",
            self.config.dqn_config.epsilon_start,
            self.config.dqn_config.epsilon_final,
            self.config.dqn_config.epsilon_decay_steps
        );
        println!("Logging: Every {} episodes", self.config.log_frequency);
        println!("Checkpoint path: {:?}", self.config.checkpoint_path);
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self, episode: usize) {
        println!(
            "[Episode {}/{}] {} | Eps: {:.3}",
            episode,
            self.config.num_episodes,
            self.stats.format_summary(),
            self.config.dqn_config.epsilon_at(self.total_steps)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{default_device, TrainingBackend};
    use tempfile::TempDir;

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(1000, PathBuf::from("test.mpk"));
        assert_eq!(config.num_episodes, 1000);
        assert_eq!(config.log_frequency, 10);
        assert!(!config.resume);
    }

    #[test]
    fn test_run_single_episode() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = TrainConfig::new(1, temp_dir.path().join("model.mpk"));
        config.seed = Some(3);
        // Keep the test fast: tiny batch, no warmup needed for run_episode
        config.dqn_config.batch_size = 4;
        config.dqn_config.replay_capacity = 256;

        let device = default_device();
        let mut train_mode = TrainMode::<TrainingBackend>::new(config, device);

        let (reward, steps, _score) = train_mode.run_episode();
        assert!(steps > 0);
        assert!(reward.is_finite());
        assert_eq!(train_mode.buffer.len(), steps);
        assert_eq!(train_mode.total_steps, steps);
    }

    #[test]
    fn test_resume_without_checkpoint_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = TrainConfig::new(1, temp_dir.path().join("missing.mpk"));
        config.resume = true;
        config.seed = Some(5);

        let device = default_device();
        let mut train_mode = TrainMode::<TrainingBackend>::new(config, device);
        assert!(train_mode.try_resume().is_ok());
        assert_eq!(train_mode.total_steps, 0);
    }

    #[test]
    fn test_resume_restores_step_counter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.mpk");

        let device = default_device();
        let mut config = TrainConfig::new(1, path.clone());
        config.seed = Some(8);
        let train_mode = TrainMode::<TrainingBackend>::new(config.clone(), device);
        train_mode.agent.save(&path, 1234, 56).unwrap();

        config.resume = true;
        let mut resumed = TrainMode::<TrainingBackend>::new(config, default_device());
        resumed.try_resume().unwrap();
        assert_eq!(resumed.total_steps, 1234);
    }
}
