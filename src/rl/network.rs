use burn::module::{Module, Param};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::game::{NUM_ACTIONS, STATE_DIM};

/// Configuration for the action-value network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QNetworkConfig {
    pub state_dim: usize,
    pub num_actions: usize,
    pub hidden_dim: usize,
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self {
            state_dim: STATE_DIM,
            num_actions: NUM_ACTIONS,
            hidden_dim: 128,
        }
    }
}

impl QNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            fc1: LinearConfig::new(self.state_dim, self.hidden_dim).init(device),
            fc2: LinearConfig::new(self.hidden_dim, self.hidden_dim).init(device),
            out: LinearConfig::new(self.hidden_dim, self.num_actions).init(device),
        }
    }
}

/// Action-value network: two hidden ReLU layers, one linear output per action
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    out: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Q-values for a batch of states, shape [batch, num_actions]
    pub fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(states));
        let x = relu(self.fc2.forward(x));
        self.out.forward(x)
    }

    /// Polyak blend of this network towards `online`:
    /// `theta <- (1 - tau) * theta + tau * theta_online` for every parameter.
    pub fn soft_update(self, online: &Self, tau: f64) -> Self {
        Self {
            fc1: blend_linear(self.fc1, &online.fc1, tau),
            fc2: blend_linear(self.fc2, &online.fc2, tau),
            out: blend_linear(self.out, &online.out, tau),
        }
    }
}

impl<B: AutodiffBackend> QNetwork<B> {
    /// Lift a gradient-free network onto the autodiff backend
    pub fn from_inner(inner: &QNetwork<B::InnerBackend>) -> Self {
        Self {
            fc1: lift_linear(&inner.fc1),
            fc2: lift_linear(&inner.fc2),
            out: lift_linear(&inner.out),
        }
    }
}

fn lift_linear<B: AutodiffBackend>(inner: &Linear<B::InnerBackend>) -> Linear<B> {
    Linear {
        weight: Param::from_tensor(Tensor::from_inner(inner.weight.val())),
        bias: inner
            .bias
            .as_ref()
            .map(|b| Param::from_tensor(Tensor::from_inner(b.val()))),
    }
}

fn blend_linear<B: Backend>(target: Linear<B>, online: &Linear<B>, tau: f64) -> Linear<B> {
    let tau = tau as f32;
    let online_weight = online.weight.val();
    let weight = target
        .weight
        .map(|w| w * (1.0 - tau) + online_weight.clone() * tau);
    let bias = match (target.bias, &online.bias) {
        (Some(bias), Some(online_bias)) => {
            let online_bias = online_bias.val();
            Some(bias.map(|b| b * (1.0 - tau) + online_bias.clone() * tau))
        }
        (bias, _) => bias,
    };
    Linear { weight, bias }
}
