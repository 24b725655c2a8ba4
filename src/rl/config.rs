use serde::{Deserialize, Serialize};

/// Hyperparameters for DQN training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqnConfig {
    /// Adam learning rate
    pub learning_rate: f64,
    /// Discount factor for bootstrap targets
    pub gamma: f32,
    /// Polyak coefficient for the target network update
    pub tau: f64,
    /// Gradient norm clipping threshold
    pub max_grad_norm: f32,
    /// Number of transitions per learning step
    pub batch_size: usize,
    /// Maximum number of transitions held in the replay buffer
    pub replay_capacity: usize,
    /// Random-policy steps collected before any learning
    pub warmup_steps: usize,
    /// Exploration rate at the start of training
    pub epsilon_start: f32,
    /// Exploration rate floor
    pub epsilon_final: f32,
    /// Steps over which epsilon decays linearly from start to floor
    pub epsilon_decay_steps: usize,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            gamma: 0.99,
            tau: 0.001,
            max_grad_norm: 10.0,
            batch_size: 64,
            replay_capacity: 50_000,
            warmup_steps: 5_000,
            epsilon_start: 1.0,
            epsilon_final: 0.02,
            epsilon_decay_steps: 15_000,
        }
    }
}

impl DqnConfig {
    /// Validate hyperparameter ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        if !(0.0..=1.0).contains(&self.tau) {
            return Err(format!("tau must be in [0, 1], got {}", self.tau));
        }
        if self.max_grad_norm <= 0.0 {
            return Err(format!(
                "max_grad_norm must be positive, got {}",
                self.max_grad_norm
            ));
        }
        if self.batch_size == 0 {
            return Err("batch_size must be positive".to_string());
        }
        if self.replay_capacity < self.batch_size {
            return Err(format!(
                "replay_capacity ({}) must be at least batch_size ({})",
                self.replay_capacity, self.batch_size
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon_start)
            || !(0.0..=1.0).contains(&self.epsilon_final)
        {
            return Err("epsilon bounds must be in [0, 1]".to_string());
        }
        if self.epsilon_final > self.epsilon_start {
            return Err(format!(
                "epsilon_final ({}) must not exceed epsilon_start ({})",
                self.epsilon_final, self.epsilon_start
            ));
        }
        if self.epsilon_decay_steps == 0 {
            return Err("epsilon_decay_steps must be positive".to_string());
        }
        Ok(())
    }

    /// Linearly decayed exploration rate after `total_steps` policy steps
    pub fn epsilon_at(&self, total_steps: usize) -> f32 {
        let progress = total_steps as f32 / self.epsilon_decay_steps as f32;
        let remaining = (1.0 - progress).max(0.0);
        self.epsilon_final + (self.epsilon_start - self.epsilon_final) * remaining
    }
}
