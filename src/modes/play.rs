//! Evaluation mode: run a trained agent greedily and report scores
//!
//! Loads a checkpoint and plays headless episodes with no exploration. An
//! episode ends on death or when the target score is reached, so a fully
//! trained agent cannot run forever.

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;
use std::path::PathBuf;

use crate::game::{Action, EnvConfig, FlappyEnv};
use crate::rl::{DqnAgent, DqnConfig, QNetworkConfig};

/// Configuration for evaluation mode
#[derive(Debug, Clone)]
pub struct PlayConfig {
    /// Number of episodes to play
    pub num_episodes: usize,

    /// Path of the checkpoint to evaluate
    pub checkpoint_path: PathBuf,

    /// Stop an episode early once this score is reached
    pub target_score: u32,

    /// Environment configuration (difficulty, rewards)
    pub env_config: EnvConfig,

    /// Seed for the environment RNG
    pub seed: Option<u64>,
}

impl PlayConfig {
    pub fn new(num_episodes: usize, checkpoint_path: PathBuf) -> Self {
        Self {
            num_episodes,
            checkpoint_path,
            target_score: 1000,
            env_config: EnvConfig::default(),
            seed: None,
        }
    }
}

/// Evaluation mode for a trained agent
pub struct PlayMode<B: AutodiffBackend> {
    agent: DqnAgent<B>,

    env: FlappyEnv,

    config: PlayConfig,
}

impl<B: AutodiffBackend> PlayMode<B> {
    /// Create an evaluation mode, loading the checkpoint if present.
    ///
    /// A missing checkpoint is reported and evaluation runs with untrained
    /// weights; a corrupt one is an error.
    pub fn new(config: PlayConfig, device: B::Device) -> Result<Self> {
        let agent = if config.checkpoint_path.exists() {
            let (agent, metadata) = DqnAgent::load(&config.checkpoint_path, device)?;
            println!(
                "Loaded checkpoint {:?} ({} steps, {} episodes)",
                config.checkpoint_path, metadata.training_steps, metadata.episodes_trained
            );
            agent
        } else {
            println!(
                "No checkpoint at {:?}, playing with untrained weights",
                config.checkpoint_path
            );
            DqnAgent::new(QNetworkConfig::default(), DqnConfig::default(), device)
        };

        let env = match config.seed {
            Some(seed) => FlappyEnv::with_seed(config.env_config.clone(), seed),
            None => FlappyEnv::new(config.env_config.clone()),
        };

        Ok(Self { agent, env, config })
    }

    /// Play the configured number of greedy episodes and report results
    pub fn run(&mut self) -> Result<()> {
        println!("{}", "=".repeat(70));
        println!("Evaluation - Flappy RL");
        println!("{}", "=".repeat(70));
        println!("Episodes: {}", self.config.num_episodes);
        println!("Difficulty: {}", self.config.env_config.difficulty);
        println!("Target score: {}", self.config.target_score);
        println!();

        let mut scores = Vec::with_capacity(self.config.num_episodes);
        for episode in 0..self.config.num_episodes {
            let (reward, steps, score, reached_target) = self.run_episode();
            scores.push(score);

            let note = if reached_target { " (target reached)" } else { "" };
            println!(
                "Episode {}: score {} | steps {} | reward {:.2}{}",
                episode + 1,
                score,
                steps,
                reward,
                note
            );
        }

        let best = scores.iter().copied().max().unwrap_or(0);
        let mean = if scores.is_empty() {
            0.0
        } else {
            scores.iter().map(|&s| s as f32).sum::<f32>() / scores.len() as f32
        };
        println!();
        println!("Mean score: {:.2} | Best score: {}", mean, best);

        Ok(())
    }

    /// Play one greedy episode. Returns (reward, steps, score, reached_target).
    fn run_episode(&mut self) -> (f32, usize, u32, bool) {
        let mut state = self.env.reset();
        let mut episode_reward = 0.0;
        let mut episode_steps = 0usize;
        let mut reached_target = false;

        loop {
            let action = self.agent.greedy_action(&state);
            let result = self.env.step(Action::from_index(action));
            episode_reward += result.reward;
            episode_steps += 1;
            state = result.state;

            if result.done {
                break;
            }
            if self.env.state().score >= self.config.target_score {
                reached_target = true;
                break;
            }
        }

        (
            episode_reward,
            episode_steps,
            self.env.state().score,
            reached_target,
        )
    }
}
