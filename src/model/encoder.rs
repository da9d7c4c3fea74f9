use burn::{
    nn::pool::{MaxPool2d, MaxPool2dConfig},
    prelude::*,
};

use super::blocks::{BasicBlock, BasicBlockConfig};

/// Number of encoder stages, and therefore of skip features.
pub const NUM_STAGES: usize = 5;

/// Encoder stage outputs ordered from full resolution (`s1`) to the deepest
/// stage (`s5`, one sixteenth of the input resolution).
pub type Features<B> = [Tensor<B, 4>; NUM_STAGES];

#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    stage_1: BasicBlock<B>,
    stage_2: BasicBlock<B>,
    stage_3: BasicBlock<B>,
    stage_4: BasicBlock<B>,
    stage_5: BasicBlock<B>,
    max_pool: MaxPool2d,
}

impl<B: Backend> Encoder<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Features<B> {
        let s1 = self.stage_1.forward(x);
        let x = self.max_pool.forward(s1.clone());
        let s2 = self.stage_2.forward(x);
        let x = self.max_pool.forward(s2.clone());
        let s3 = self.stage_3.forward(x);
        let x = self.max_pool.forward(s3.clone());
        let s4 = self.stage_4.forward(x);
        let x = self.max_pool.forward(s4.clone());
        let s5 = self.stage_5.forward(x);

        [s1, s2, s3, s4, s5]
    }
}

#[derive(Config, Debug)]
pub struct EncoderConfig {
    pub input_channels: usize,
    #[config(default = "64")]
    pub base_channels: usize,
}

impl EncoderConfig {
    /// Output channels of each stage: `b, 2b, 4b, 8b, 16b`.
    pub fn stage_channels(&self) -> [usize; NUM_STAGES] {
        let b = self.base_channels;
        [b, b * 2, b * 4, b * 8, b * 16]
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Encoder<B> {
        let [c1, c2, c3, c4, c5] = self.stage_channels();

        Encoder {
            stage_1: BasicBlockConfig::new(self.input_channels, c1).init(device),
            stage_2: BasicBlockConfig::new(c1, c2).init(device),
            stage_3: BasicBlockConfig::new(c2, c3).init(device),
            stage_4: BasicBlockConfig::new(c3, c4).init(device),
            stage_5: BasicBlockConfig::new(c4, c5).init(device),
            max_pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }
}
