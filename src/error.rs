use thiserror::Error;

use crate::shape::DOWNSAMPLE_FACTOR;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UNetError {
    #[error("{name} must be non-zero")]
    ZeroChannels { name: &'static str },

    #[error("expected {expected} input channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error(
        "input spatial size {height}x{width} must be a non-zero multiple of {}",
        DOWNSAMPLE_FACTOR
    )]
    SpatialSize { height: usize, width: usize },

    #[error("expected a rank 4 [batch, channels, height, width] shape, got rank {0}")]
    Rank(usize),

    #[error("batch size must be non-zero")]
    EmptyBatch,

    #[error("channel or parameter counts overflow usize")]
    TooLarge,
}
