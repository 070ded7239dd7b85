//! Print Geometry
//!
//! Physical card size and the resolution PDF exports embed the render at.

use serde::{Deserialize, Serialize};

/// Physical card size in inches.
pub const CARD_WIDTH_INCHES: f64 = 2.5;
pub const CARD_HEIGHT_INCHES: f64 = 3.5;

const POINTS_PER_INCH: f64 = 72.0;

/// Print specifications for physical output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSpec {
    pub dpi: u32,
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self { dpi: 300 }
    }
}

impl PrintSpec {
    /// Create from user input with validation
    pub fn from_user(dpi: u32) -> Result<Self, &'static str> {
        if !(72..=1200).contains(&dpi) {
            return Err("DPI must be between 72 and 1200");
        }
        Ok(Self { dpi })
    }

    /// Pixel size of a full card at this resolution.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (CARD_WIDTH_INCHES * self.dpi as f64).round() as u32,
            (CARD_HEIGHT_INCHES * self.dpi as f64).round() as u32,
        )
    }

    /// PDF page size in points; independent of DPI.
    pub fn page_size_points() -> (f64, f64) {
        (
            CARD_WIDTH_INCHES * POINTS_PER_INCH,
            CARD_HEIGHT_INCHES * POINTS_PER_INCH,
        )
    }
}
