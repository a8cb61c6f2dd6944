//! Shared test fixtures for simpledoc-ooxml
//!
//! Images are encoded in memory with the `image` crate so no binary
//! fixtures live in the repository.

use std::io::Cursor;

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{ImageFormat, Rgb, RgbImage};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
}

/// Encode a JPEG; `dpi` sets the JFIF density, `None` keeps the encoder's aspect-only default
pub fn jpeg_bytes(width: u32, height: u32, dpi: Option<u16>) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, 80);
    if let Some(dpi) = dpi {
        encoder.set_pixel_density(PixelDensity::dpi(dpi));
    }
    encoder.encode_image(&gradient(width, height)).unwrap();
    bytes
}

/// Encode a PNG without physical resolution metadata
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// EXIF APP1 segment (big-endian TIFF) holding only the resolution tags
///
/// `x` and `y` are `(numerator, denominator)`; `unit` is the EXIF
/// `ResolutionUnit` (2 inch, 3 cm).
pub fn exif_app1(x: (u32, u32), y: (u32, u32), unit: u16) -> Vec<u8> {
    const ENTRIES: u16 = 3;
    let values_at = 8 + 2 + u32::from(ENTRIES) * 12 + 4;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&ENTRIES.to_be_bytes());

    // XResolution, YResolution: one RATIONAL each, stored after the IFD
    for (i, tag) in [0x011Au16, 0x011B].into_iter().enumerate() {
        tiff.extend_from_slice(&tag.to_be_bytes());
        tiff.extend_from_slice(&5u16.to_be_bytes());
        tiff.extend_from_slice(&1u32.to_be_bytes());
        tiff.extend_from_slice(&(values_at + i as u32 * 8).to_be_bytes());
    }

    // ResolutionUnit: one SHORT, inline
    tiff.extend_from_slice(&0x0128u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&unit.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);

    tiff.extend_from_slice(&0u32.to_be_bytes());
    for (num, denom) in [x, y] {
        tiff.extend_from_slice(&num.to_be_bytes());
        tiff.extend_from_slice(&denom.to_be_bytes());
    }

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);
    segment
}

/// Insert `segment` right after the SOI marker, optionally dropping the JFIF APP0
pub fn with_segment(jpeg: &[u8], segment: &[u8], drop_jfif: bool) -> Vec<u8> {
    assert_eq!(&jpeg[..4], &[0xFF, 0xD8, 0xFF, 0xE0], "encoder output starts with APP0");
    let app0_len = usize::from(u16::from_be_bytes([jpeg[4], jpeg[5]]));

    let rest = if drop_jfif {
        &jpeg[4 + app0_len..]
    } else {
        &jpeg[2..]
    };

    let mut bytes = jpeg[..2].to_vec();
    bytes.extend_from_slice(segment);
    bytes.extend_from_slice(rest);
    bytes
}
