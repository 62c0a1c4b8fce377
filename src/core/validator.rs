//! Full-decode image validation.
//!
//! Header inspection alone misses truncated bodies, so validation decodes
//! the whole image. A decode or dimension failure only ever affects that
//! one file's disposition; it is never a run error.

use image::DynamicImage;
use std::path::Path;

/// Outcome of validating one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    /// Decoded cleanly and meets the dimension rule
    Valid { width: u32, height: u32 },
    /// Could not be opened or decoded as an image
    Corrupt { reason: String },
    /// Decoded but its smaller edge is under the minimum
    TooSmall { width: u32, height: u32 },
}

impl Validity {
    /// True only for [`Validity::Valid`]
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid { .. })
    }
}

/// Validates candidate files by fully decoding them
pub struct ContentValidator {
    min_dimension_px: u32,
}

impl ContentValidator {
    /// Create a validator with the configured minimum edge length
    pub fn new(min_dimension_px: u32) -> Self {
        Self { min_dimension_px }
    }

    /// Decode `path` and apply the dimension rule.
    pub fn validate(&self, path: &Path) -> (Validity, Option<DynamicImage>) {
        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) => {
                return (
                    Validity::Corrupt {
                        reason: e.to_string(),
                    },
                    None,
                )
            }
        };

        let (width, height) = (image.width(), image.height());
        if width.min(height) < self.min_dimension_px {
            return (Validity::TooSmall { width, height }, None);
        }

        (Validity::Valid { width, height }, Some(image))
    }
}
