//! DQN agent: epsilon-greedy action selection and temporal-difference
//! learning with an online/target network pair.

use anyhow::Result;
use burn::grad_clipping::GradientClippingConfig;
use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Int, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

use super::buffer::ReplayBuffer;
use super::config::DqnConfig;
use super::network::{QNetwork, QNetworkConfig};
use super::persistence::{self, CheckpointBundle, CheckpointMetadata};
use crate::game::{StateVec, NUM_ACTIONS, STATE_DIM};

/// Deep Q-learning agent.
///
/// Holds the online network on the autodiff backend and the target network
/// on the inner (gradient-free) backend, so bootstrap targets can never
/// contribute gradients. The target trails the online net through a Polyak
/// blend applied after every optimizer step.
pub struct DqnAgent<B: AutodiffBackend> {
    /// Online action-value network, updated by gradient descent
    online: QNetwork<B>,

    /// Target network used for bootstrap targets
    target: QNetwork<B::InnerBackend>,

    /// Adam optimizer with gradient norm clipping
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,

    /// Network shape (for checkpoint metadata)
    network_config: QNetworkConfig,

    /// Learning hyperparameters
    config: DqnConfig,

    /// RNG driving exploration and replay sampling
    rng: StdRng,

    /// Device for tensor operations
    device: B::Device,
}

impl<B: AutodiffBackend> DqnAgent<B> {
    /// Create a new agent with freshly initialized networks.
    ///
    /// The target network starts as an exact copy of the online network.
    pub fn new(network_config: QNetworkConfig, config: DqnConfig, device: B::Device) -> Self {
        Self::with_rng(network_config, config, device, StdRng::from_entropy())
    }

    /// Create a new agent with a fixed exploration seed
    pub fn with_seed(
        network_config: QNetworkConfig,
        config: DqnConfig,
        device: B::Device,
        seed: u64,
    ) -> Self {
        Self::with_rng(network_config, config, device, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        network_config: QNetworkConfig,
        config: DqnConfig,
        device: B::Device,
        rng: StdRng,
    ) -> Self {
        config.validate().expect("Invalid DQN configuration");

        let online = network_config.init::<B>(&device);
        let target = online.valid();
        let optim = AdamConfig::new()
            .with_grad_clipping(Some(GradientClippingConfig::Norm(config.max_grad_norm)))
            .init();

        Self {
            online,
            target,
            optim,
            network_config,
            config,
            rng,
            device,
        }
    }

    /// Select an action for a state with epsilon-greedy exploration.
    ///
    /// With probability `epsilon` a uniform random action; otherwise the
    /// greedy action under the online network. Never mutates weights.
    pub fn act(&mut self, state: &StateVec, epsilon: f32) -> usize {
        if self.rng.gen::<f32>() < epsilon {
            return self.rng.gen_range(0..NUM_ACTIONS);
        }
        self.greedy_action(state)
    }

    /// Greedy action under the online network, evaluated without gradients
    pub fn greedy_action(&self, state: &StateVec) -> usize {
        let network = self.online.valid();
        let input = Tensor::<B::InnerBackend, 2>::from_floats([*state], &self.device);
        let q_values = network.forward(input);
        q_values.argmax(1).into_scalar().elem::<i64>() as usize
    }

    /// Perform one learning step from a sampled minibatch.
    ///
    /// Returns `None` when the buffer holds fewer than `batch_size`
    /// transitions. Otherwise computes the TD targets on the inner backend,
    /// takes a gradient-clipped Adam step on the Huber loss, applies the
    /// Polyak target update, and returns the scalar loss.
    pub fn update(&mut self, buffer: &ReplayBuffer, batch_size: usize) -> Option<f32> {
        if buffer.len() < batch_size {
            return None;
        }
        let batch = buffer.sample(&mut self.rng, batch_size).ok()?;
        let n = batch.len;

        // Bootstrap targets: r + gamma * max_a' Q_target(s')(a') * (1 - done)
        let next_states =
            Tensor::<B::InnerBackend, 1>::from_floats(batch.next_states.as_slice(), &self.device)
                .reshape([n, STATE_DIM]);
        let max_next_q = self
            .target
            .forward(next_states)
            .max_dim(1)
            .squeeze::<1>(1);
        let rewards =
            Tensor::<B::InnerBackend, 1>::from_floats(batch.rewards.as_slice(), &self.device);
        let not_done =
            Tensor::<B::InnerBackend, 1>::from_floats(batch.dones.as_slice(), &self.device)
                .neg()
                .add_scalar(1.0);
        let targets = rewards + max_next_q * not_done * self.config.gamma;

        // Lift onto the autodiff backend as a constant
        let targets = Tensor::<B, 1>::from_data(targets.into_data(), &self.device);

        // Q-values of the taken actions under the online network
        let states = Tensor::<B, 1>::from_floats(batch.states.as_slice(), &self.device)
            .reshape([n, STATE_DIM]);
        let actions = Tensor::<B, 1, Int>::from_ints(batch.actions.as_slice(), &self.device);
        let chosen_q = self
            .online
            .forward(states)
            .gather(1, actions.unsqueeze_dim(1))
            .squeeze::<1>(1);

        // Huber (smooth-L1) loss with delta 1.0
        let diff = chosen_q - targets;
        let abs = diff.clone().abs();
        let quadratic = diff.powf_scalar(2.0) * 0.5;
        let linear = abs.clone() - 0.5;
        let loss = quadratic.mask_where(abs.greater_elem(1.0), linear).mean();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.online);
        self.online = self
            .optim
            .step(self.config.learning_rate, self.online.clone(), grads);

        // Trail the target towards the new online weights
        self.target = self
            .target
            .clone()
            .soft_update(&self.online.valid(), self.config.tau);

        Some(loss.into_scalar().elem::<f32>())
    }

    /// Save both weight sets and training metadata to `path`
    pub fn save(&self, path: &Path, training_steps: usize, episodes_trained: usize) -> Result<()> {
        let bundle = CheckpointBundle {
            online: self.online.clone(),
            target: QNetwork::from_inner(&self.target),
        };
        let metadata = CheckpointMetadata::new(
            self.config.clone(),
            self.network_config.clone(),
            training_steps,
            episodes_trained,
        );
        persistence::save_checkpoint(bundle, &metadata, path)
    }

    /// Load an agent from a checkpoint, restoring both weight sets.
    ///
    /// The optimizer state starts fresh; hyperparameters come from the
    /// checkpoint metadata.
    pub fn load(path: &Path, device: B::Device) -> Result<(Self, CheckpointMetadata)> {
        let (bundle, metadata) = persistence::load_checkpoint::<B>(path, &device)?;
        let mut agent = Self::new(
            metadata.network_config.clone(),
            metadata.dqn_config.clone(),
            device,
        );
        agent.online = bundle.online;
        agent.target = bundle.target.valid();
        Ok((agent, metadata))
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::backend::{default_device, TrainingBackend};
    use crate::rl::buffer::Transition;

    fn test_agent(config: DqnConfig) -> DqnAgent<TrainingBackend> {
        DqnAgent::with_seed(QNetworkConfig::default(), config, default_device(), 99)
    }

    fn filled_buffer(n: usize) -> ReplayBuffer {
        let mut buffer = ReplayBuffer::new(n.max(64));
        for i in 0..n {
            let x = i as f32 / n as f32;
            buffer.push(Transition {
                state: [x, -x, 0.5 - x, x * 0.1],
                action: i % NUM_ACTIONS,
                reward: if i % 7 == 0 { 10.0 } else { 0.01 },
                next_state: [x + 0.01, -x, 0.4 - x, x * 0.1],
                done: i % 11 == 0,
            });
        }
        buffer
    }

    #[test]
    fn test_random_exploration_covers_both_actions() {
        let mut agent = test_agent(DqnConfig::default());
        let state = [0.0, 0.0, 0.5, 0.4];

        let mut counts = [0usize; NUM_ACTIONS];
        for _ in 0..1000 {
            counts[agent.act(&state, 1.0)] += 1;
        }
        // Roughly uniform over two actions
        assert!(counts[0] > 400 && counts[0] < 600, "counts: {:?}", counts);
        assert!(counts[1] > 400 && counts[1] < 600, "counts: {:?}", counts);
    }

    #[test]
    fn test_greedy_action_is_deterministic() {
        let mut agent = test_agent(DqnConfig::default());
        let state = [0.2, -0.1, 0.3, 0.5];

        let first = agent.act(&state, 0.0);
        for _ in 0..10 {
            assert_eq!(agent.act(&state, 0.0), first);
        }
        assert_eq!(agent.greedy_action(&state), first);
    }

    #[test]
    fn test_target_starts_as_copy_of_online() {
        let agent = test_agent(DqnConfig::default());
        let state = [0.1, 0.2, 0.3, 0.4];

        let device = default_device();
        let input = Tensor::from_floats([state], &device);
        let online_q = agent
            .online
            .valid()
            .forward(input.clone())
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        let target_q = agent
            .target
            .forward(input)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(online_q, target_q);
    }

    #[test]
    fn test_update_requires_full_batch() {
        let mut config = DqnConfig::default();
        config.batch_size = 8;
        let mut agent = test_agent(config);

        let buffer = filled_buffer(4);
        assert!(agent.update(&buffer, 8).is_none());
    }

    #[test]
    fn test_update_returns_finite_loss() {
        let mut config = DqnConfig::default();
        config.batch_size = 8;
        let mut agent = test_agent(config);

        let buffer = filled_buffer(32);
        let loss = agent.update(&buffer, 8);
        assert!(loss.is_some());
        assert!(loss.unwrap().is_finite());
    }

    #[test]
    fn test_update_moves_target_slightly() {
        let mut config = DqnConfig::default();
        config.batch_size = 8;
        let mut agent = test_agent(config);

        let device = default_device();
        let state = [0.1, 0.2, 0.3, 0.4];
        let input = Tensor::from_floats([state], &device);
        let before = agent
            .target
            .forward(input.clone())
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        let buffer = filled_buffer(32);
        for _ in 0..5 {
            agent.update(&buffer, 8).unwrap();
        }

        let after = agent
            .target
            .forward(input)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        // tau is tiny, so the target moves but only a little
        assert_ne!(before, after);
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b - a).abs() < 0.1);
        }
    }
}
