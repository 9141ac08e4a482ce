// ============================================================
// Layer 4 — Image Dataset
// ============================================================
// Implements Burn's Dataset trait so the DataLoader can index
// into the images and shuffle them.

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::image::LabeledImage;

/// One normalised, flattened image and its class index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageItem {
    pub pixels: Vec<f32>,
    pub label:  usize,
}

impl From<LabeledImage> for ImageItem {
    fn from(img: LabeledImage) -> Self {
        Self { pixels: img.pixels, label: img.label as usize }
    }
}

pub struct ImageDataset {
    items: Vec<ImageItem>,
}

impl ImageDataset {
    pub fn new(items: Vec<ImageItem>) -> Self { Self { items } }

    pub fn from_images(images: Vec<LabeledImage>) -> Self {
        Self::new(images.into_iter().map(ImageItem::from).collect())
    }

    pub fn sample_count(&self) -> usize { self.items.len() }
}

impl Dataset<ImageItem> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
