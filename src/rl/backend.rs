use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};

/// Backend used for training (autodiff on top of ndarray)
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend used for gradient-free inference
pub type InferenceBackend = NdArray<f32>;

/// Default device for the ndarray backend
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}
