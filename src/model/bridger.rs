use burn::prelude::*;

use super::encoder::Features;

/// Pass-through stage between the encoder and the decoder.
///
/// Holds no parameters and returns the encoder features unchanged, tracing
/// each shape on the way through.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bridger;

impl Bridger {
    pub fn forward<B: Backend>(&self, features: Features<B>) -> Features<B> {
        for (stage, feature) in features.iter().enumerate() {
            tracing::trace!(stage = stage + 1, shape = ?feature.dims(), "bridger");
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn returns_features_unchanged() {
        let device = Default::default();
        let features: Features<TestBackend> = [8, 4, 2, 1, 1].map(|size| {
            Tensor::random([1, 2, size, size], Distribution::Default, &device)
        });
        let expected: Vec<_> = features.iter().map(|f| f.to_data()).collect();

        let bridged = Bridger.forward(features);

        for (feature, expected) in bridged.iter().zip(expected.iter()) {
            feature.to_data().assert_eq(expected, true);
        }
    }
}
