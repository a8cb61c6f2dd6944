//! Unit conversions between page geometry and drawing geometry
//!
//! WordprocessingML measures page size and margins in twips (twentieths of
//! a point) while DrawingML measures extents in EMUs (English Metric Units):
//! - 914400 EMUs = 1 inch
//! - 12700 EMUs = 1 point = 20 twips
//! - 635 EMUs = 1 twip

use crate::error::{OoxmlError, Result};

/// EMUs per inch (914400)
pub const EMU_PER_INCH: i64 = 914_400;

/// EMUs per point (12700)
pub const EMU_PER_POINT: i64 = 12_700;

/// Twips per point (20)
pub const TWIPS_PER_POINT: i64 = 20;

/// EMUs per twip (635)
pub const EMU_PER_TWIP: i64 = EMU_PER_POINT / TWIPS_PER_POINT;

/// Width available for content between the left and right margins, in twips
pub fn page_content_width(page_width: i64, left_margin: i64, right_margin: i64) -> i64 {
    page_width - left_margin - right_margin
}

/// Convert twips to EMUs
pub fn twips_to_emu(twips: i64) -> i64 {
    twips * EMU_PER_TWIP
}

/// Convert a pixel count at the given resolution (dots per inch) to EMUs
///
/// Width and height must be converted separately with the image's own
/// horizontal and vertical resolution; pixels need not be square.
pub fn pixels_to_emu(pixels: u32, dpi: f64) -> Result<i64> {
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(OoxmlError::InvalidImageMetadata(format!(
            "resolution must be positive, got {} dpi",
            dpi
        )));
    }

    Ok((f64::from(pixels) / dpi * EMU_PER_INCH as f64).round() as i64)
}

/// Shrink an extent so its width fits `max_width_emu`, keeping the aspect ratio
///
/// Extents that already fit are returned unchanged; this never upscales.
/// The new height is `round(max_width * height / width)` computed with exact
/// integer arithmetic, so repeated conversions do not drift.
pub fn scale_to_fit(width_emu: i64, height_emu: i64, max_width_emu: i64) -> (i64, i64) {
    if width_emu <= max_width_emu {
        return (width_emu, height_emu);
    }

    let numerator = i128::from(max_width_emu) * i128::from(height_emu);
    let height = div_round(numerator, i128::from(width_emu));
    (max_width_emu, height as i64)
}

/// Integer division rounding half away from zero (denominator > 0)
fn div_round(numerator: i128, denominator: i128) -> i128 {
    if numerator >= 0 {
        (2 * numerator + denominator) / (2 * denominator)
    } else {
        -((-2 * numerator + denominator) / (2 * denominator))
    }
}
