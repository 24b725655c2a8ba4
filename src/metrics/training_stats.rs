//! Training statistics tracking for DQN
//!
//! Tracks episode-level metrics (rewards, lengths, scores) and the learning
//! loss using rolling windows for smoothed statistics.

use std::collections::VecDeque;

/// Training statistics tracker with rolling averages
///
/// Episode metrics and losses use independent window sizes because an
/// episode produces one reward entry but many learning steps.
///
/// # Example
///
/// ```rust
/// use flappy_rl::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(50, 100);
/// stats.record_episode(15.5, 150, 5);
/// stats.record_loss(0.02);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window)
    episode_rewards: VecDeque<f32>,

    /// Episode lengths in steps (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Episode scores (pipes passed) (rolling window)
    episode_scores: VecDeque<u32>,

    /// TD losses (rolling window)
    losses: VecDeque<f32>,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of environment steps taken
    total_steps: usize,

    /// Best score seen so far
    best_score: u32,

    /// Window size for episode metrics
    episode_window: usize,

    /// Window size for losses
    loss_window: usize,
}

impl TrainingStats {
    /// Create a tracker with the given rolling window sizes
    pub fn new(episode_window: usize, loss_window: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(episode_window),
            episode_lengths: VecDeque::with_capacity(episode_window),
            episode_scores: VecDeque::with_capacity(episode_window),
            losses: VecDeque::with_capacity(loss_window),
            total_episodes: 0,
            total_steps: 0,
            best_score: 0,
            episode_window,
            loss_window,
        }
    }

    /// Record the completion of an episode
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        Self::push_deque(&mut self.episode_rewards, reward, self.episode_window);
        Self::push_deque(&mut self.episode_lengths, length, self.episode_window);
        Self::push_deque(&mut self.episode_scores, score, self.episode_window);
        self.total_episodes += 1;
        self.total_steps += length;
        self.best_score = self.best_score.max(score);
    }

    /// Record the loss of one learning step
    pub fn record_loss(&mut self, loss: f32) {
        Self::push_deque(&mut self.losses, loss, self.loss_window);
    }

    /// Mean episode reward over the rolling window, 0.0 when empty
    pub fn mean_episode_reward(&self) -> f32 {
        Self::mean(&self.episode_rewards)
    }

    /// Mean episode length over the rolling window
    pub fn mean_episode_length(&self) -> f32 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<usize>() as f32 / self.episode_lengths.len() as f32
        }
    }

    /// Mean episode score over the rolling window
    pub fn mean_episode_score(&self) -> f32 {
        if self.episode_scores.is_empty() {
            0.0
        } else {
            self.episode_scores.iter().sum::<u32>() as f32 / self.episode_scores.len() as f32
        }
    }

    /// Mean TD loss over the rolling window, 0.0 when empty
    pub fn mean_loss(&self) -> f32 {
        Self::mean(&self.losses)
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Format a one-line summary of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} | Best: {} | Len: {:.1} | Loss: {:.4}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.best_score,
            self.mean_episode_length(),
            self.mean_loss(),
        )
    }

    fn mean(deque: &VecDeque<f32>) -> f32 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f32>() / deque.len() as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(50, 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.total_steps(), 0);
        assert_eq!(stats.best_score(), 0);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(50, 100);
        stats.record_episode(10.0, 50, 3);

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert_eq!(stats.best_score(), 3);
        assert!((stats.mean_episode_reward() - 10.0).abs() < 1e-5);
        assert!((stats.mean_episode_length() - 50.0).abs() < 1e-5);
        assert!((stats.mean_episode_score() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_rolling_episode_window() {
        let mut stats = TrainingStats::new(3, 100);
        stats.record_episode(1.0, 10, 1);
        stats.record_episode(2.0, 20, 2);
        stats.record_episode(3.0, 30, 3);
        assert!((stats.mean_episode_reward() - 2.0).abs() < 1e-5);

        // A 4th episode evicts the first
        stats.record_episode(4.0, 40, 4);
        assert_eq!(stats.total_episodes(), 4);
        assert!((stats.mean_episode_reward() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_rolling_loss_window() {
        let mut stats = TrainingStats::new(50, 2);
        stats.record_loss(0.1);
        stats.record_loss(0.2);
        assert!((stats.mean_loss() - 0.15).abs() < 1e-5);

        stats.record_loss(0.3);
        assert!((stats.mean_loss() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_best_score_persists_past_window() {
        let mut stats = TrainingStats::new(2, 100);
        stats.record_episode(1.0, 10, 9);
        stats.record_episode(1.0, 10, 1);
        stats.record_episode(1.0, 10, 2);
        assert_eq!(stats.best_score(), 9);
    }

    #[test]
    fn test_total_steps_accumulate() {
        let mut stats = TrainingStats::new(10, 10);
        stats.record_episode(1.0, 10, 1);
        stats.record_episode(2.0, 20, 2);
        stats.record_episode(3.0, 30, 3);
        assert_eq!(stats.total_steps(), 60);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(50, 100);
        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.mean_episode_length(), 0.0);
        assert_eq!(stats.mean_episode_score(), 0.0);
        assert_eq!(stats.mean_loss(), 0.0);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(50, 100);
        stats.record_episode(15.5, 150, 5);
        stats.record_loss(0.02);

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Steps: 150"));
        assert!(summary.contains("Reward: 15.50"));
        assert!(summary.contains("Score: 5.00"));
        assert!(summary.contains("Best: 5"));
        assert!(summary.contains("Loss: 0.0200"));
    }
}
