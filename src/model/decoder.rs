use burn::prelude::*;

use super::blocks::{DecoderBlock, DecoderBlockConfig};
use super::encoder::Features;

/// Four upsampling stages, each fusing the matching encoder feature.
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    block_4: DecoderBlock<B>,
    block_3: DecoderBlock<B>,
    block_2: DecoderBlock<B>,
    block_1: DecoderBlock<B>,
}

impl<B: Backend> Decoder<B> {
    pub fn forward(&self, features: Features<B>) -> Tensor<B, 4> {
        let [f1, f2, f3, f4, f5] = features;

        let x = self.block_4.forward(f5, f4);
        tracing::trace!(shape = ?x.dims(), "decoder stage 4");
        let x = self.block_3.forward(x, f3);
        tracing::trace!(shape = ?x.dims(), "decoder stage 3");
        let x = self.block_2.forward(x, f2);
        tracing::trace!(shape = ?x.dims(), "decoder stage 2");
        let x = self.block_1.forward(x, f1);
        tracing::trace!(shape = ?x.dims(), "decoder stage 1");

        x
    }
}

/// `input_channels` is the width of the deepest encoder stage (16b) and
/// `base_channels` the output width of the first decoder block (8b). Skip
/// widths are derived by halving `input_channels`.
#[derive(Config, Debug)]
pub struct DecoderConfig {
    pub input_channels: usize,
    pub base_channels: usize,
}

impl DecoderConfig {
    /// `(upsampled, skip, output)` channels for blocks 4, 3, 2 and 1.
    pub fn block_channels(&self) -> [(usize, usize, usize); 4] {
        let cin = self.input_channels;
        let base = self.base_channels;

        [
            (cin, cin / 2, base),
            (base, cin / 4, base / 2),
            (base / 2, cin / 8, base / 4),
            (base / 4, cin / 16, base / 8),
        ]
    }

    /// Channels of the decoder output.
    pub fn output_channels(&self) -> usize {
        self.base_channels / 8
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Decoder<B> {
        let [b4, b3, b2, b1] = self
            .block_channels()
            .map(|(input, skip, filters)| DecoderBlockConfig::new(input, skip, filters));

        Decoder {
            block_4: b4.init(device),
            block_3: b3.init(device),
            block_2: b2.init(device),
            block_1: b1.init(device),
        }
    }
}
