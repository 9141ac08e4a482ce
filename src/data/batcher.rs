// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<ImageItem>
// into tensors the network can consume.
//
//   Input:  N ImageItems, each with F pixels
//   Output: ImageBatch { images: [N, F], targets: [N] }
//
// All pixels are flattened into one long Vec, then reshaped:
//   [s1_p1, s1_p2, ..., s1_pF, s2_p1, ..., sN_pF] → [N, F]

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ImageItem;

/// A batch of images ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Normalised pixels, shape [batch_size, input_size]
    pub images: Tensor<B, 2>,

    /// Class indices, shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created where the
/// model lives.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ImageItem, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageItem>) -> ImageBatch<B> {
        let batch_size = items.len();
        // Every image in a dataset has the same length
        let input_size = items.first().map(|i| i.pixels.len()).unwrap_or(0);

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|i| i.pixels.iter().copied())
            .collect();

        let labels: Vec<i64> = items
            .iter()
            .map(|i| i.label as i64)
            .collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, input_size]);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ImageBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let device  = <TestBackend as Backend>::Device::default();
        let batcher = ImageBatcher::<TestBackend>::new(device);

        let batch = batcher.batch(vec![
            ImageItem { pixels: vec![1.0, 2.0, 3.0], label: 2 },
            ImageItem { pixels: vec![4.0, 5.0, 6.0], label: 0 },
        ]);

        assert_eq!(batch.images.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);

        let pixels: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        assert_eq!(pixels, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let targets: Vec<i64> = batch.targets.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(targets, vec![2, 0]);
    }
}
