use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use flappy_rl::game::{Difficulty, EnvConfig};
use flappy_rl::modes::{PlayConfig, PlayMode, TrainConfig, TrainMode};
use flappy_rl::rl::{default_device, TrainingBackend};

#[derive(Parser)]
#[command(name = "flappy-rl")]
#[command(version, about = "DQN training for a side-scrolling obstacle game")]
struct Cli {
    /// Execution mode
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// Difficulty preset
    #[arg(long, default_value = "normal")]
    difficulty: Difficulty,

    /// Number of episodes to train or play
    #[arg(long, default_value = "2000")]
    episodes: usize,

    /// Checkpoint path
    #[arg(long, default_value = "models/flappy_dqn.mpk")]
    checkpoint: PathBuf,

    /// Resume training from the checkpoint if it exists
    #[arg(long)]
    resume: bool,

    /// Seed for the environment and exploration RNGs
    #[arg(long)]
    seed: Option<u64>,

    /// Stop a play episode early once this score is reached
    #[arg(long, default_value = "1000")]
    target_score: u32,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train a DQN agent
    Train,
    /// Evaluate a trained checkpoint greedily
    Play,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let device = default_device();
    let env_config = EnvConfig::new(cli.difficulty);

    match cli.mode {
        Mode::Train => {
            let mut config = TrainConfig::new(cli.episodes, cli.checkpoint);
            config.env_config = env_config;
            config.resume = cli.resume;
            config.seed = cli.seed;

            let mut train_mode = TrainMode::<TrainingBackend>::new(config, device);
            train_mode.run()?;
        }
        Mode::Play => {
            let mut config = PlayConfig::new(cli.episodes, cli.checkpoint);
            config.env_config = env_config;
            config.target_score = cli.target_score;
            config.seed = cli.seed;

            let mut play_mode = PlayMode::<TrainingBackend>::new(config, device)?;
            play_mode.run()?;
        }
    }

    Ok(())
}
