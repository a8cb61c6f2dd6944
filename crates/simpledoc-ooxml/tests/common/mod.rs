//! Image fixtures shared by the integration tests
//!
//! Encoded in memory with the `image` crate so no binary files are checked in.

use std::io::Cursor;

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{ImageFormat, RgbImage};

/// Black JPEG; `dpi` sets the JFIF density, `None` leaves aspect-ratio units
pub fn jpeg(width: u32, height: u32, dpi: Option<u16>) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new(&mut bytes);
    if let Some(dpi) = dpi {
        encoder.set_pixel_density(PixelDensity::dpi(dpi));
    }
    encoder
        .encode_image(&RgbImage::new(width, height))
        .unwrap();
    bytes
}

/// Black PNG without a `pHYs` chunk
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    RgbImage::new(width, height)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}
