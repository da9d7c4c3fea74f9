//! Backend-free shape and parameter bookkeeping for [`UNetConfig`].
//!
//! Everything here mirrors what the modules compute at runtime, so a shape
//! plan can be checked before any weights are allocated.

use std::fmt;

use derive_new::new;

use crate::error::UNetError;
use crate::model::{NUM_STAGES, UNetConfig};

/// Downsampling factor between the input and the deepest encoder stage.
pub const DOWNSAMPLE_FACTOR: usize = 16;

/// Validates an NCHW input shape against the expected input channels.
pub fn check_input(in_channels: usize, dims: [usize; 4]) -> Result<(), UNetError> {
    let [batch, channels, height, width] = dims;

    if batch == 0 {
        return Err(UNetError::EmptyBatch);
    }
    if channels != in_channels {
        return Err(UNetError::ChannelMismatch {
            expected: in_channels,
            actual: channels,
        });
    }

    let fits = |size: usize| size != 0 && size % DOWNSAMPLE_FACTOR == 0;
    if !fits(height) || !fits(width) {
        return Err(UNetError::SpatialSize { height, width });
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Encoder(usize),
    Decoder(usize),
    Head,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Input => write!(f, "input"),
            Stage::Encoder(i) => write!(f, "encoder.s{i}"),
            Stage::Decoder(i) => write!(f, "decoder.d{i}"),
            Stage::Head => write!(f, "head"),
        }
    }
}

#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageShape {
    pub stage: Stage,
    pub dims: [usize; 4],
}

/// Output shape of every stage for one input shape, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePlan {
    stages: Vec<StageShape>,
    num_params: usize,
}

impl ShapePlan {
    pub fn new(config: &UNetConfig, input: [usize; 4]) -> Result<Self, UNetError> {
        config.validate()?;
        check_input(config.in_channels, input)?;

        let [batch, _, height, width] = input;
        let mut stages = Vec::with_capacity(NUM_STAGES + 6);
        stages.push(StageShape::new(Stage::Input, input));

        for (i, channels) in config.encoder().stage_channels().into_iter().enumerate() {
            let scale = 1 << i;
            stages.push(StageShape::new(
                Stage::Encoder(i + 1),
                [batch, channels, height / scale, width / scale],
            ));
        }

        // Decoder blocks run deepest first: d4 restores 1/8 resolution, d1 full.
        let blocks = config.decoder().block_channels();
        for (i, (_, _, channels)) in blocks.into_iter().enumerate() {
            let level = blocks.len() - i;
            let scale = 1 << (level - 1);
            stages.push(StageShape::new(
                Stage::Decoder(level),
                [batch, channels, height / scale, width / scale],
            ));
        }

        stages.push(StageShape::new(
            Stage::Head,
            [batch, config.num_classes, height, width],
        ));

        Ok(Self {
            stages,
            num_params: num_params(config).ok_or(UNetError::TooLarge)?,
        })
    }

    /// Builds a plan from a dynamically sized shape, such as one parsed from
    /// the command line.
    pub fn from_dims(config: &UNetConfig, dims: &[usize]) -> Result<Self, UNetError> {
        let input: [usize; 4] = dims.try_into().map_err(|_| UNetError::Rank(dims.len()))?;

        Self::new(config, input)
    }

    pub fn stages(&self) -> &[StageShape] {
        &self.stages
    }

    pub fn get(&self, stage: Stage) -> Option<[usize; 4]> {
        self.stages
            .iter()
            .find(|shape| shape.stage == stage)
            .map(|shape| shape.dims)
    }

    pub fn output(&self) -> [usize; 4] {
        self.stages
            .last()
            .map(|shape| shape.dims)
            .unwrap_or_default()
    }

    pub fn num_params(&self) -> usize {
        self.num_params
    }
}

impl fmt::Display for ShapePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for shape in &self.stages {
            writeln!(f, "{:<12} {:?}", shape.stage.to_string(), shape.dims)?;
        }
        write!(f, "parameters   {}", self.num_params)
    }
}

/// Trainable parameters of a model built from `config`, or `None` when a
/// channel or parameter count does not fit in `usize`.
pub fn num_params(config: &UNetConfig) -> Option<usize> {
    let conv = |input: usize, output: usize, kernel: usize| {
        (kernel * kernel)
            .checked_mul(input)?
            .checked_mul(output)?
            .checked_add(output)
    };
    let basic_block = |input: usize, output: usize| {
        conv(input, output, 3)?.checked_add(conv(output, output, 3)?)
    };

    // Widest stage; every other channel count derived from the config is smaller.
    config.base_channels.checked_mul(16)?;

    let mut input = config.in_channels;
    let mut total: usize = 0;
    for output in config.encoder().stage_channels() {
        total = total.checked_add(basic_block(input, output)?)?;
        input = output;
    }

    for (upsampled, skip, output) in config.decoder().block_channels() {
        total = total.checked_add(basic_block(upsampled.checked_add(skip)?, output)?)?;
    }

    total.checked_add(conv(config.base_channels, config.num_classes, 1)?)
}
