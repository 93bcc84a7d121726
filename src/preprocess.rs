use crate::error::PreprocessError;
use crate::frame::Frame;
use candle_core::{Device, Tensor};

/// Converts a raw frame into the model input tensor: every byte mapped to
/// `byte / 255.0`, shape `(1, height, width, channels)`, pixel order
/// preserved. Rejects frames whose buffer length does not match their
/// dimensions. The frame is consumed; the tensor lives only as long as the
/// classify call it feeds.
pub fn normalize(frame: Frame) -> Result<Tensor, PreprocessError> {
    let expected = frame.expected_len();
    if frame.data.len() != expected {
        return Err(PreprocessError::BufferLength {
            expected,
            actual: frame.data.len(),
        });
    }
    let Frame {
        width,
        height,
        channels,
        data,
    } = frame;
    let floats: Vec<f32> = data.into_iter().map(|b| b as f32 / 255.0).collect();
    let shape = (1usize, height as usize, width as usize, channels as usize);
    Tensor::from_vec(floats, shape, &Device::Cpu).map_err(|e| PreprocessError::Tensor(e.to_string()))
}
