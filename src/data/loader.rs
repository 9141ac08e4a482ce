// ============================================================
// Layer 4 — IDX Dataset Loader
// ============================================================
// Reads MNIST / Fashion-MNIST from the uncompressed IDX files
// they are distributed in:
//
//   {dir}/train-images-idx3-ubyte   60 000 images
//   {dir}/train-labels-idx1-ubyte   60 000 labels
//   {dir}/t10k-images-idx3-ubyte    10 000 images
//   {dir}/t10k-labels-idx1-ubyte    10 000 labels
//
// IDX layout (all header integers are big-endian u32):
//
//   images: magic=2051 | count | rows | cols | count*rows*cols bytes
//   labels: magic=2049 | count | count bytes
//
// Pixel bytes 0..=255 are scaled to [0, 1].

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::image::{DatasetKind, LabeledImage, Split};
use crate::domain::traits::ImageSource;

pub const IMAGE_MAGIC: u32 = 2051;
pub const LABEL_MAGIC: u32 = 2049;

const ROWS: usize = 28;
const COLS: usize = 28;
const CLASSES: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum IdxError {
    #[error("bad magic number {found} (expected {expected})")]
    BadMagic { expected: u32, found: u32 },

    #[error("file truncated: needed {needed} bytes, found {found}")]
    Truncated { needed: usize, found: usize },

    #[error("{images} images but {labels} labels")]
    CountMismatch { images: usize, labels: usize },

    #[error("unusable image dimensions: {count} images of {rows}x{cols}")]
    BadDimensions { count: usize, rows: usize, cols: usize },

    #[error("label {label} at index {index} is not below {classes}")]
    LabelOutOfRange { index: usize, label: u8, classes: usize },
}

/// Loads one of the IDX datasets from a directory.
pub struct IdxLoader {
    dir:  PathBuf,
    kind: DatasetKind,
}

impl IdxLoader {
    pub fn new(dir: impl Into<PathBuf>, kind: DatasetKind) -> Self {
        Self { dir: dir.into(), kind }
    }

    fn file_names(split: Split) -> (&'static str, &'static str) {
        match split {
            Split::Train => ("train-images-idx3-ubyte", "train-labels-idx1-ubyte"),
            Split::Test  => ("t10k-images-idx3-ubyte",  "t10k-labels-idx1-ubyte"),
        }
    }
}

impl ImageSource for IdxLoader {
    fn load(&self, split: Split) -> Result<Vec<LabeledImage>> {
        let (images_name, labels_name) = Self::file_names(split);
        let images_path = self.dir.join(images_name);
        let labels_path = self.dir.join(labels_name);

        let image_bytes = fs::read(&images_path)
            .with_context(|| format!("Cannot read '{}'", images_path.display()))?;
        let label_bytes = fs::read(&labels_path)
            .with_context(|| format!("Cannot read '{}'", labels_path.display()))?;

        let images = parse_images(&image_bytes)
            .with_context(|| format!("Invalid image file '{}'", images_path.display()))?;
        let labels = parse_labels(&label_bytes, CLASSES)
            .with_context(|| format!("Invalid label file '{}'", labels_path.display()))?;

        let samples = zip_samples(images, labels)?;
        tracing::info!(
            "Loaded {} {:?} images ({:?}) from '{}'",
            samples.len(), split, self.kind, self.dir.display()
        );
        Ok(samples)
    }

    fn input_size(&self) -> usize {
        ROWS * COLS
    }

    fn num_classes(&self) -> usize {
        CLASSES
    }
}

/// Pair up images and labels, failing if the counts differ.
pub fn zip_samples(images: Vec<Vec<f32>>, labels: Vec<u8>) -> Result<Vec<LabeledImage>, IdxError> {
    if images.len() != labels.len() {
        return Err(IdxError::CountMismatch { images: images.len(), labels: labels.len() });
    }
    Ok(images
        .into_iter()
        .zip(labels)
        .map(|(pixels, label)| LabeledImage::new(pixels, label))
        .collect())
}

/// Parse an IDX3 image file into flattened images scaled to [0, 1].
pub fn parse_images(bytes: &[u8]) -> Result<Vec<Vec<f32>>, IdxError> {
    expect_magic(bytes, IMAGE_MAGIC)?;
    let count = read_u32_be(bytes, 4)? as usize;
    let rows  = read_u32_be(bytes, 8)? as usize;
    let cols  = read_u32_be(bytes, 12)? as usize;

    // Header values are untrusted: no zero-sized images, no overflow
    let bad_dims = IdxError::BadDimensions { count, rows, cols };
    let pixels_per_image = match rows.checked_mul(cols) {
        Some(0) | None => return Err(bad_dims),
        Some(n) => n,
    };
    let needed = count
        .checked_mul(pixels_per_image)
        .and_then(|n| n.checked_add(16))
        .ok_or(bad_dims)?;
    if bytes.len() < needed {
        return Err(IdxError::Truncated { needed, found: bytes.len() });
    }
    let body = &bytes[16..needed];

    Ok(body
        .chunks_exact(pixels_per_image)
        .map(|img| img.iter().map(|&b| b as f32 / 255.0).collect())
        .collect())
}

/// Parse an IDX1 label file. Every label must be below `classes`.
pub fn parse_labels(bytes: &[u8], classes: usize) -> Result<Vec<u8>, IdxError> {
    expect_magic(bytes, LABEL_MAGIC)?;
    let count = read_u32_be(bytes, 4)? as usize;
    let body  = &bytes[8..];
    if body.len() < count {
        return Err(IdxError::Truncated { needed: count.saturating_add(8), found: bytes.len() });
    }

    let labels = &body[..count];
    if let Some(index) = labels.iter().position(|&l| l as usize >= classes) {
        return Err(IdxError::LabelOutOfRange { index, label: labels[index], classes });
    }
    Ok(labels.to_vec())
}

fn expect_magic(bytes: &[u8], expected: u32) -> Result<(), IdxError> {
    let found = read_u32_be(bytes, 0)?;
    if found != expected {
        return Err(IdxError::BadMagic { expected, found });
    }
    Ok(())
}

fn read_u32_be(bytes: &[u8], offset: usize) -> Result<u32, IdxError> {
    let end = offset + 4;
    let slice = bytes
        .get(offset..end)
        .ok_or(IdxError::Truncated { needed: end, found: bytes.len() })?;
    Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}
