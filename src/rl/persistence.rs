//! Checkpoint persistence for trained agents.
//!
//! A checkpoint is a single named-Mpk record bundling both value networks
//! (online and target) plus a JSON metadata sidecar describing the
//! configuration and training progress needed to reconstruct the agent.

use anyhow::{Context, Result};
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::config::DqnConfig;
use super::network::{QNetwork, QNetworkConfig};

/// Both weight sets of a DQN agent, recorded together so a checkpoint can
/// never hold an online net without its matching target net.
#[derive(Module, Debug)]
pub struct CheckpointBundle<B: Backend> {
    pub online: QNetwork<B>,
    pub target: QNetwork<B>,
}

/// Metadata saved next to the weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Hyperparameters used during training
    pub dqn_config: DqnConfig,

    /// Network shape, needed to rebuild the modules before loading weights
    pub network_config: QNetworkConfig,

    /// Total environment steps completed
    pub training_steps: usize,

    /// Number of episodes trained
    pub episodes_trained: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl CheckpointMetadata {
    pub fn new(
        dqn_config: DqnConfig,
        network_config: QNetworkConfig,
        training_steps: usize,
        episodes_trained: usize,
    ) -> Self {
        Self {
            dqn_config,
            network_config,
            training_steps,
            episodes_trained,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Save an agent checkpoint.
///
/// Writes two files, creating parent directories as needed:
/// - `<path>` - both weight sets (Burn record format)
/// - `<path>.meta.json` - metadata as JSON
pub fn save_checkpoint<B: Backend>(
    bundle: CheckpointBundle<B>,
    metadata: &CheckpointMetadata,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(bundle.into_record(), path.to_path_buf())
        .context("Failed to save network weights")?;

    let meta_path = path.with_extension("meta.json");
    let meta_json =
        serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Load an agent checkpoint.
///
/// Reads the metadata sidecar first to rebuild the networks, then loads both
/// weight sets into them. A missing or corrupt file surfaces as an error;
/// the caller decides whether that is fatal.
pub fn load_checkpoint<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(CheckpointBundle<B>, CheckpointMetadata)> {
    let meta_path = path.with_extension("meta.json");
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: CheckpointMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    let mut bundle = CheckpointBundle {
        online: metadata.network_config.init::<B>(device),
        target: metadata.network_config.init::<B>(device),
    };

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;
    bundle = bundle.load_record(record);

    Ok((bundle, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::backend::{default_device, InferenceBackend};
    use burn::tensor::Tensor;
    use tempfile::TempDir;

    fn q_values(network: &QNetwork<InferenceBackend>, state: [f32; 4]) -> Vec<f32> {
        let device = default_device();
        let input = Tensor::from_floats([state], &device);
        network.forward(input).into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_metadata_serialization_round_trip() {
        let metadata = CheckpointMetadata::new(
            DqnConfig::default(),
            QNetworkConfig::default(),
            1000,
            100,
        );

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: CheckpointMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.training_steps, 1000);
        assert_eq!(deserialized.episodes_trained, 100);
        assert_eq!(deserialized.network_config.hidden_dim, 128);
    }

    #[test]
    fn test_save_load_round_trip() {
        let device = default_device();
        let network_config = QNetworkConfig::default();
        let bundle = CheckpointBundle::<InferenceBackend> {
            online: network_config.init(&device),
            target: network_config.init(&device),
        };
        let metadata =
            CheckpointMetadata::new(DqnConfig::default(), network_config, 42, 7);

        let state = [0.1, -0.3, 0.5, 0.2];
        let online_before = q_values(&bundle.online, state);
        let target_before = q_values(&bundle.target, state);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checkpoint.mpk");
        save_checkpoint(bundle, &metadata, &path).unwrap();

        let (loaded, loaded_meta) =
            load_checkpoint::<InferenceBackend>(&path, &device).unwrap();

        assert_eq!(q_values(&loaded.online, state), online_before);
        assert_eq!(q_values(&loaded.target, state), target_before);
        assert_eq!(loaded_meta.training_steps, 42);
        assert_eq!(loaded_meta.episodes_trained, 7);
    }

    #[test]
    fn test_load_missing_checkpoint_fails() {
        let device = default_device();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does_not_exist.mpk");
        assert!(load_checkpoint::<InferenceBackend>(&path, &device).is_err());
    }
}
