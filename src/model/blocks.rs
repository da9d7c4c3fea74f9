use burn::{
    nn::{
        PaddingConfig2d, Relu,
        conv::{Conv2d, Conv2dConfig},
        interpolate::{Interpolate2d, Interpolate2dConfig, InterpolateMode},
    },
    prelude::*,
};

/// Two 3x3 convolutions, each followed by a ReLU. Spatial size is preserved.
#[derive(Module, Debug)]
pub struct BasicBlock<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    activation: Relu,
}

impl<B: Backend> BasicBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv1.forward(x);
        let x = self.activation.forward(x);
        let x = self.conv2.forward(x);

        self.activation.forward(x)
    }
}

#[derive(Config, Debug)]
pub struct BasicBlockConfig {
    pub input_channels: usize,
    pub num_filters: usize,
}

impl BasicBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> BasicBlock<B> {
        BasicBlock {
            conv1: Conv2dConfig::new([self.input_channels, self.num_filters], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            conv2: Conv2dConfig::new([self.num_filters, self.num_filters], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            activation: Relu::new(),
        }
    }
}

/// Upsamples the deeper feature map by two, concatenates the skip features
/// after it along the channel axis and fuses both with a [`BasicBlock`].
#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    upsample: Interpolate2d,
    conv_block: BasicBlock<B>,
}

impl<B: Backend> DecoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>, skip_features: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.fuse(x, skip_features);

        self.conv_block.forward(x)
    }

    /// Upsampled input followed by the skip features, before convolution.
    pub fn fuse(&self, x: Tensor<B, 4>, skip_features: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.upsample.forward(x);

        Tensor::cat(vec![x, skip_features], 1)
    }
}

#[derive(Config, Debug)]
pub struct DecoderBlockConfig {
    /// Channels of the feature map being upsampled.
    pub input_channels: usize,
    /// Channels of the skip connection.
    pub skip_channels: usize,
    pub num_filters: usize,
}

impl DecoderBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DecoderBlock<B> {
        DecoderBlock {
            upsample: Interpolate2dConfig::new()
                .with_scale_factor(Some([2.0, 2.0]))
                .with_mode(InterpolateMode::Nearest)
                .init(),
            conv_block: BasicBlockConfig::new(
                self.input_channels + self.skip_channels,
                self.num_filters,
            )
            .init(device),
        }
    }
}

/// 1x1 convolution producing per-pixel class scores.
#[derive(Module, Debug)]
pub struct Head<B: Backend> {
    conv_1x1: Conv2d<B>,
}

impl<B: Backend> Head<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.conv_1x1.forward(x)
    }
}

#[derive(Config, Debug)]
pub struct HeadConfig {
    pub input_channels: usize,
    pub num_classes: usize,
}

impl HeadConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Head<B> {
        Head {
            conv_1x1: Conv2dConfig::new([self.input_channels, self.num_classes], [1, 1])
                .init(device),
        }
    }
}
