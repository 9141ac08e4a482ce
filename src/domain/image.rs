// ============================================================
// Layer 3 — Image Domain Types
// ============================================================
// A labelled greyscale image, flattened row by row, and the
// two image datasets the lessons use.
//
// Pixels are intensities in [0, 1] at this layer. Normalisation
// to [-1, 1] happens later in the data pipeline.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledImage {
    /// Flattened pixels, row-major, each in [0, 1]
    pub pixels: Vec<f32>,

    /// Class index
    pub label: u8,
}

impl LabeledImage {
    pub fn new(pixels: Vec<f32>, label: u8) -> Self {
        Self { pixels, label }
    }
}

/// Which half of a dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

const FASHION_CLASSES: [&str; 10] = [
    "T-shirt/top", "Trouser", "Pullover", "Dress", "Coat",
    "Sandal", "Shirt", "Sneaker", "Bag", "Ankle boot",
];

const DIGIT_CLASSES: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// The two 28x28 ten-class datasets. They share the IDX file
/// layout and differ only in what the labels mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetKind {
    Mnist,
    FashionMnist,
}

impl DatasetKind {
    pub fn class_names(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Mnist        => &DIGIT_CLASSES,
            DatasetKind::FashionMnist => &FASHION_CLASSES,
        }
    }

    /// Human-readable name for a class index; falls back to the index.
    pub fn class_name(&self, class: usize) -> String {
        self.class_names()
            .get(class)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("class {class}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        assert_eq!(DatasetKind::FashionMnist.class_name(9), "Ankle boot");
        assert_eq!(DatasetKind::Mnist.class_name(3), "3");
        assert_eq!(DatasetKind::Mnist.class_name(42), "class 42");
    }
}
