//! Perceptual content hashing.
//!
//! The engine uses a fixed average hash (aHash):
//! 1. Resize the image to hash_size x hash_size
//! 2. Convert to grayscale
//! 3. Compute the average brightness
//! 4. For each pixel: bit = 1 if brighter than average, else 0
//!
//! Byte-identical detection would miss re-saved uploads (recompressed
//! JPEGs, stripped metadata), which are the duplication pattern actually
//! seen in uploaded content; equal average hashes catch those. The hash is
//! deterministic for identical pixel content and hash parameters.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// A fixed-length perceptual fingerprint of an image's visual content.
///
/// Two files with equal `ContentHash` are treated as visual duplicates
/// regardless of byte-level differences.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash {
    bytes: Vec<u8>,
}

impl ContentHash {
    /// Wrap raw hash bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw hash bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hexadecimal rendering for logs and reports
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Hamming distance to another hash (diagnostic only; grouping uses
    /// exact equality)
    pub fn distance(&self, other: &Self) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Average-hash implementation with configurable bit width
pub struct AverageHasher {
    /// Edge length; the hash is hash_size * hash_size bits
    hash_size: u32,
}

impl AverageHasher {
    /// Create a hasher with the configured edge length
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }

    /// Hash an already-decoded image
    pub fn hash_image(&self, image: &DynamicImage) -> ContentHash {
        let resized = image.resize_exact(
            self.hash_size,
            self.hash_size,
            image::imageops::FilterType::Lanczos3,
        );
        let gray = resized.to_luma8();

        let total: u64 = gray.pixels().map(|p| p[0] as u64).sum();
        let count = (self.hash_size * self.hash_size) as u64;
        let average = (total / count) as u8;

        let mut hash_bytes =
            Vec::with_capacity((self.hash_size * self.hash_size).div_ceil(8) as usize);
        let mut current_byte: u8 = 0;
        let mut bit_position = 0;

        for y in 0..self.hash_size {
            for x in 0..self.hash_size {
                if gray.get_pixel(x, y)[0] > average {
                    current_byte |= 1 << (7 - bit_position);
                }

                bit_position += 1;
                if bit_position == 8 {
                    hash_bytes.push(current_byte);
                    current_byte = 0;
                    bit_position = 0;
                }
            }
        }

        if bit_position > 0 {
            hash_bytes.push(current_byte);
        }

        ContentHash::new(hash_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, _| Rgb([(x * 255 / width) as u8, 0, 0]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn identical_pixels_produce_identical_hash() {
        let hasher = AverageHasher::new(8);
        let image = gradient_image(100, 100);

        assert_eq!(hasher.hash_image(&image), hasher.hash_image(&image));
    }

    #[test]
    fn resized_copy_produces_identical_hash() {
        // The duplication pattern in practice: same content, different
        // encoding or resolution
        let hasher = AverageHasher::new(8);
        let original = gradient_image(200, 200);
        let resaved = original.resize_exact(120, 120, image::imageops::FilterType::Lanczos3);

        assert_eq!(hasher.hash_image(&original), hasher.hash_image(&resaved));
    }

    #[test]
    fn different_content_produces_different_hash() {
        let hasher = AverageHasher::new(8);
        let gradient = gradient_image(100, 100);
        let inverted = ImageBuffer::from_fn(100, 100, |x, _| Rgb([(255 - x * 255 / 100) as u8, 0, 0]));
        let inverted = DynamicImage::ImageRgb8(inverted);

        assert_ne!(hasher.hash_image(&gradient), hasher.hash_image(&inverted));
    }

    #[test]
    fn hash_length_follows_hash_size() {
        let image = gradient_image(64, 64);
        assert_eq!(AverageHasher::new(8).hash_image(&image).as_bytes().len(), 8);
        assert_eq!(
            AverageHasher::new(16).hash_image(&image).as_bytes().len(),
            32
        );
    }

    #[test]
    fn to_hex_renders_bytes() {
        let hash = ContentHash::new(vec![0xDE, 0xAD]);
        assert_eq!(hash.to_hex(), "dead");
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = ContentHash::new(vec![0b1111_1111]);
        let b = ContentHash::new(vec![0b0000_0000]);
        assert_eq!(a.distance(&b), 8);
        assert_eq!(a.distance(&a), 0);
    }
}
