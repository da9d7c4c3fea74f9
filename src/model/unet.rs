use burn::{
    prelude::*,
    tensor::activation::{sigmoid, softmax},
};

use crate::error::UNetError;
use crate::shape::{check_input, num_params};

use super::blocks::{Head, HeadConfig};
use super::bridger::Bridger;
use super::decoder::{Decoder, DecoderConfig};
use super::encoder::{Encoder, EncoderConfig, Features};

#[derive(Module, Debug)]
pub struct UNet<B: Backend> {
    encoder: Encoder<B>,
    decoder: Decoder<B>,
    head: Head<B>,
    in_channels: usize,
    num_classes: usize,
}

#[derive(Config, Debug)]
pub struct UNetConfig {
    pub in_channels: usize,
    pub num_classes: usize,
    #[config(default = "64")]
    pub base_channels: usize,
}

impl UNetConfig {
    pub fn validate(&self) -> Result<(), UNetError> {
        if self.in_channels == 0 {
            return Err(UNetError::ZeroChannels {
                name: "in_channels",
            });
        }
        if self.num_classes == 0 {
            return Err(UNetError::ZeroChannels {
                name: "num_classes",
            });
        }
        if self.base_channels == 0 {
            return Err(UNetError::ZeroChannels {
                name: "base_channels",
            });
        }

        num_params(self).ok_or(UNetError::TooLarge)?;

        Ok(())
    }

    /// Checks that an NCHW input shape can flow through the network.
    pub fn check_input(&self, dims: [usize; 4]) -> Result<(), UNetError> {
        check_input(self.in_channels, dims)
    }

    pub fn encoder(&self) -> EncoderConfig {
        EncoderConfig::new(self.in_channels).with_base_channels(self.base_channels)
    }

    pub fn decoder(&self) -> DecoderConfig {
        DecoderConfig::new(self.base_channels * 16, self.base_channels * 8)
    }

    pub fn head(&self) -> HeadConfig {
        HeadConfig::new(self.base_channels, self.num_classes)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> UNet<B> {
        self.assertions();

        tracing::debug!(
            in_channels = self.in_channels,
            num_classes = self.num_classes,
            base_channels = self.base_channels,
            "initializing U-Net"
        );

        UNet {
            encoder: self.encoder().init(device),
            decoder: self.decoder().init(device),
            head: self.head().init(device),
            in_channels: self.in_channels,
            num_classes: self.num_classes,
        }
    }

    fn assertions(&self) {
        if let Err(err) = self.validate() {
            panic!("Invalid U-Net configuration: {err}");
        }
    }
}

impl<B: Backend> UNet<B> {
    /// Per-pixel class scores, `[N, num_classes, H, W]`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let features = self.forward_features(images);
        let x = self.decoder.forward(features);

        self.head.forward(x)
    }

    /// Encoder features after the bridger, from full resolution to the deepest
    /// stage.
    pub fn forward_features(&self, images: Tensor<B, 4>) -> Features<B> {
        tracing::trace!(shape = ?images.dims(), "input");
        let features = self.encoder.forward(images);

        Bridger.forward(features)
    }

    /// Like [`UNet::forward`] but rejects inputs whose shape cannot go through
    /// the skip connections.
    pub fn try_forward(&self, images: Tensor<B, 4>) -> Result<Tensor<B, 4>, UNetError> {
        self.check_input(images.dims())?;

        Ok(self.forward(images))
    }

    /// Class probabilities: softmax over classes, or a sigmoid for a single
    /// class output.
    pub fn predict(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let logits = self.forward(images);

        if self.num_classes > 1 {
            softmax(logits, 1)
        } else {
            sigmoid(logits)
        }
    }

    /// Index of the most likely class per pixel, `[N, 1, H, W]`.
    pub fn segment(&self, images: Tensor<B, 4>) -> Tensor<B, 4, Int> {
        if self.num_classes > 1 {
            self.forward(images).argmax(1)
        } else {
            self.predict(images).greater_equal_elem(0.5).int()
        }
    }

    pub fn check_input(&self, dims: [usize; 4]) -> Result<(), UNetError> {
        check_input(self.in_channels, dims)
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{ShapePlan, Stage};
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    fn small_config() -> UNetConfig {
        UNetConfig::new(3, 4).with_base_channels(2)
    }

    fn images(dims: [usize; 4]) -> Tensor<TestBackend, 4> {
        Tensor::random(dims, Distribution::Normal(0.0, 1.0), &Default::default())
    }

    #[test]
    fn forward_produces_class_scores_at_input_resolution() {
        let model = small_config().init::<TestBackend>(&Default::default());

        assert_eq!(model.forward(images([2, 3, 32, 48])).dims(), [2, 4, 32, 48]);
    }

    #[test]
    fn features_follow_shape_plan() {
        let config = small_config();
        let model = config.init::<TestBackend>(&Default::default());
        let plan = ShapePlan::new(&config, [1, 3, 32, 32]).unwrap();

        let features = model.forward_features(images([1, 3, 32, 32]));

        for (i, feature) in features.iter().enumerate() {
            assert_eq!(Some(feature.dims()), plan.get(Stage::Encoder(i + 1)));
        }
    }

    #[test]
    fn parameter_count_matches_plan() {
        let config = small_config();
        let model = config.init::<TestBackend>(&Default::default());

        assert_eq!(Some(model.num_params()), num_params(&config));
    }

    #[test]
    fn try_forward_rejects_bad_inputs() {
        let model = small_config().init::<TestBackend>(&Default::default());

        assert_eq!(
            model.try_forward(images([1, 3, 24, 32])).unwrap_err(),
            UNetError::SpatialSize {
                height: 24,
                width: 32
            }
        );
        assert_eq!(
            model.try_forward(images([1, 1, 32, 32])).unwrap_err(),
            UNetError::ChannelMismatch {
                expected: 3,
                actual: 1
            }
        );
        assert!(model.try_forward(images([1, 3, 16, 16])).is_ok());
    }

    #[test]
    fn predict_softmax_sums_to_one_over_classes() {
        let model = small_config().init::<TestBackend>(&Default::default());

        let sums = model.predict(images([1, 3, 16, 16])).sum_dim(1);
        let ones = sums.ones_like();

        sums.to_data().assert_approx_eq(&ones.to_data(), 3);
    }

    #[test]
    fn predict_single_class_is_a_probability() {
        let model = UNetConfig::new(1, 1)
            .with_base_channels(2)
            .init::<TestBackend>(&Default::default());

        let probabilities = model.predict(images([1, 1, 16, 16]));

        assert!(probabilities.clone().min().into_scalar() >= 0.0);
        assert!(probabilities.max().into_scalar() <= 1.0);
    }

    #[test]
    fn segment_returns_one_label_per_pixel() {
        let model = small_config().init::<TestBackend>(&Default::default());

        let labels = model.segment(images([2, 3, 16, 16]));

        assert_eq!(labels.dims(), [2, 1, 16, 16]);
        assert!(labels.clone().min().into_scalar() >= 0);
        assert!(labels.max().into_scalar() < 4);
    }

    #[test]
    fn accessors_report_configured_channels() {
        let model = small_config().init::<TestBackend>(&Default::default());

        assert_eq!(model.in_channels(), 3);
        assert_eq!(model.num_classes(), 4);
    }

    #[test]
    #[should_panic(expected = "num_classes must be non-zero")]
    fn init_rejects_zero_classes() {
        UNetConfig::new(3, 0).init::<TestBackend>(&Default::default());
    }
}
