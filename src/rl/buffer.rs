use std::collections::VecDeque;

use anyhow::{bail, Result};
use rand::Rng;

use crate::game::{StateVec, STATE_DIM};

/// A single environment transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: StateVec,
    pub action: usize,
    pub reward: f32,
    pub next_state: StateVec,
    pub done: bool,
}

/// A sampled minibatch laid out as parallel arrays ready for tensor
/// construction. States are flattened row-major, `len * STATE_DIM`.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    pub states: Vec<f32>,
    pub actions: Vec<i32>,
    pub rewards: Vec<f32>,
    pub next_states: Vec<f32>,
    /// Terminal flags as 0.0 / 1.0 for masking bootstrap targets
    pub dones: Vec<f32>,
    pub len: usize,
}

/// Bounded FIFO replay memory with uniform sampling
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest one at capacity
    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Sample `batch_size` distinct transitions uniformly at random.
    ///
    /// Fails when fewer than `batch_size` transitions are stored.
    pub fn sample<R: Rng>(&self, rng: &mut R, batch_size: usize) -> Result<TransitionBatch> {
        if batch_size > self.buffer.len() {
            bail!(
                "cannot sample {} transitions from a buffer of {}",
                batch_size,
                self.buffer.len()
            );
        }

        let indices = rand::seq::index::sample(rng, self.buffer.len(), batch_size);

        let mut states = Vec::with_capacity(batch_size * STATE_DIM);
        let mut actions = Vec::with_capacity(batch_size);
        let mut rewards = Vec::with_capacity(batch_size);
        let mut next_states = Vec::with_capacity(batch_size * STATE_DIM);
        let mut dones = Vec::with_capacity(batch_size);

        for idx in indices.iter() {
            let t = &self.buffer[idx];
            states.extend_from_slice(&t.state);
            actions.push(t.action as i32);
            rewards.push(t.reward);
            next_states.extend_from_slice(&t.next_state);
            dones.push(if t.done { 1.0 } else { 0.0 });
        }

        Ok(TransitionBatch {
            states,
            actions,
            rewards,
            next_states,
            dones,
            len: batch_size,
        })
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
