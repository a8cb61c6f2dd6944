//! Image embedding
//!
//! Pictures are placed inline: a paragraph holding one run whose drawing
//! references the image part through a relationship id.
//!
//! # OOXML Image Structure
//!
//! ```xml
//! <w:drawing>
//!   <wp:inline distT="0" distB="0" distL="0" distR="0">
//!     <wp:extent cx="..." cy="..."/>              <!-- Dimensions in EMUs -->
//!     <wp:effectExtent l="0" t="0" r="0" b="0"/>
//!     <wp:docPr id="N" name="Picture N"/>         <!-- Unique per document -->
//!     <wp:cNvGraphicFramePr>...</wp:cNvGraphicFramePr>
//!     <a:graphic>
//!       <a:graphicData uri="...picture">
//!         <pic:pic>
//!           <pic:blipFill>
//!             <a:blip r:embed="rIdNN" cstate="print"/>
//!           </pic:blipFill>
//!         </pic:pic>
//!       </a:graphicData>
//!     </a:graphic>
//!   </wp:inline>
//! </w:drawing>
//! ```
//!
//! # Sizing
//!
//! The natural size comes from the pixel dimensions and the resolution
//! recorded in the file: the EXIF `XResolution`/`YResolution` tags when
//! present (JPEG APP1 or PNG `eXIf`), otherwise the JFIF density for JPEG or
//! `pHYs` for PNG. Images without a usable resolution are treated as 96 DPI. Pictures wider than
//! the page's content area are scaled down to fit, keeping the aspect ratio.

use std::io::Cursor;

use exif::{In, Tag, Value};
use image::{ImageFormat, ImageReader};

use crate::document::{escape_xml, Paragraph, ParagraphId, Run};
use crate::error::{OoxmlError, Result};
use crate::package::Package;
use crate::units::{pixels_to_emu, scale_to_fit, twips_to_emu};

/// WordprocessingML drawing namespace (`wp:` prefix)
pub const WORDPROCESSING_DRAWING_NS: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

/// DrawingML main namespace (`a:` prefix)
pub const DRAWINGML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// DrawingML picture namespace (`pic:` prefix)
pub const PICTURE_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Resolution assumed when an image does not record one
pub const DEFAULT_DPI: f64 = 96.0;

const CM_PER_INCH: f64 = 2.54;
const METRES_PER_INCH: f64 = 0.0254;

/// Raster formats that can be embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    Jpeg,
    Png,
}

impl RasterFormat {
    /// File extension used for the image part
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// MIME content type of the image part
    pub fn content_type(&self) -> &'static str {
        content_type_for_extension(self.extension())
    }
}

/// Get the MIME content type for an image extension
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Horizontal and vertical resolution in dots per inch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            horizontal: DEFAULT_DPI,
            vertical: DEFAULT_DPI,
        }
    }
}

/// Size of a drawing in EMUs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub cx: i64,
    pub cy: i64,
}

impl Extent {
    pub fn new(cx: i64, cy: i64) -> Self {
        Self { cx, cy }
    }
}

/// Decoded facts about an image stream
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// Detected raster format
    pub format: RasterFormat,
    /// Width in pixels
    pub width_px: u32,
    /// Height in pixels
    pub height_px: u32,
    /// Recorded resolution, or the 96 DPI default
    pub resolution: Resolution,
}

impl ImageInfo {
    /// Detect format, pixel dimensions and resolution of an encoded image
    pub fn inspect(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(OoxmlError::ImageReadError("image stream is empty".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| OoxmlError::ImageReadError(e.to_string()))?;

        let format = match reader.format() {
            Some(ImageFormat::Jpeg) => RasterFormat::Jpeg,
            Some(ImageFormat::Png) => RasterFormat::Png,
            Some(other) => {
                return Err(OoxmlError::UnsupportedImageFormat(format!("{:?}", other)));
            }
            None => {
                return Err(OoxmlError::UnsupportedImageFormat(
                    "unrecognized image data".to_string(),
                ));
            }
        };

        let (width_px, height_px) = reader
            .into_dimensions()
            .map_err(|e| OoxmlError::ImageReadError(e.to_string()))?;

        let resolution = match read_resolution(bytes, format)? {
            Some(resolution) => resolution,
            None => {
                log::warn!(
                    "{:?} image has no resolution metadata, assuming {} DPI",
                    format,
                    DEFAULT_DPI
                );
                Resolution::default()
            }
        };

        Ok(Self {
            format,
            width_px,
            height_px,
            resolution,
        })
    }

    /// Natural size in EMUs, scaled down to `max_width_emu` when wider
    pub fn extent(&self, max_width_emu: i64) -> Result<Extent> {
        let width = pixels_to_emu(self.width_px, self.resolution.horizontal)?;
        let height = pixels_to_emu(self.height_px, self.resolution.vertical)?;
        let (cx, cy) = scale_to_fit(width, height, max_width_emu);
        Ok(Extent::new(cx, cy))
    }
}

/// Read the resolution recorded in the file
///
/// EXIF tags win over the container's own density fields. `Ok(None)` means
/// the file carries no physical resolution (missing metadata or
/// aspect-ratio-only units). An explicit zero density is an error.
pub fn read_resolution(bytes: &[u8], format: RasterFormat) -> Result<Option<Resolution>> {
    if let Some(resolution) = exif_resolution(bytes)? {
        return Ok(Some(resolution));
    }
    match format {
        RasterFormat::Jpeg => jfif_resolution(bytes),
        RasterFormat::Png => phys_resolution(bytes),
    }
}

/// EXIF `XResolution`/`YResolution` with `ResolutionUnit` (2 inch, 3 cm)
fn exif_resolution(bytes: &[u8]) -> Result<Option<Resolution>> {
    let Ok(exif) = exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) else {
        return Ok(None);
    };

    let rational = |tag: Tag| match exif.get_field(tag, In::PRIMARY).map(|f| &f.value) {
        Some(Value::Rational(values)) => values.first().map(|r| (r.num, r.denom)),
        _ => None,
    };
    let (Some(x), Some(y)) = (rational(Tag::XResolution), rational(Tag::YResolution)) else {
        return Ok(None);
    };

    // absent unit means inches
    let unit = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(2);
    let (scale, label) = match unit {
        2 => (1.0, "dots per inch"),
        3 => (CM_PER_INCH, "dots per cm"),
        _ => return Ok(None),
    };

    if x.0 == 0 || x.1 == 0 || y.0 == 0 || y.1 == 0 {
        return Err(OoxmlError::InvalidImageMetadata(format!(
            "EXIF resolution {}/{} x {}/{} {}",
            x.0, x.1, y.0, y.1, label
        )));
    }

    Ok(Some(Resolution {
        horizontal: f64::from(x.0) / f64::from(x.1) * scale,
        vertical: f64::from(y.0) / f64::from(y.1) * scale,
    }))
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn checked_resolution(x: u32, y: u32, scale: f64, unit: &str) -> Result<Resolution> {
    if x == 0 || y == 0 {
        return Err(OoxmlError::InvalidImageMetadata(format!(
            "zero resolution {}x{} {}",
            x, y, unit
        )));
    }
    Ok(Resolution {
        horizontal: f64::from(x) * scale,
        vertical: f64::from(y) * scale,
    })
}

/// JFIF APP0 segment: units (0 aspect, 1 dots/inch, 2 dots/cm) and densities
fn jfif_resolution(bytes: &[u8]) -> Result<Option<Resolution>> {
    const SOI: [u8; 2] = [0xFF, 0xD8];
    const APP0: u8 = 0xE0;
    const SOS: u8 = 0xDA;
    const EOI: u8 = 0xD9;

    if !bytes.starts_with(&SOI) {
        return Ok(None);
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return Ok(None);
        }
        let marker = bytes[pos + 1];
        if marker == 0xFF {
            // fill byte
            pos += 1;
            continue;
        }
        if marker == SOS || marker == EOI {
            return Ok(None);
        }

        let Some(length) = be_u16(bytes, pos + 2) else {
            return Ok(None);
        };
        let length = usize::from(length);
        let data_start = pos + 4;
        let data_end = pos + 2 + length;
        if length < 2 || data_end > bytes.len() {
            return Ok(None);
        }

        let data = &bytes[data_start..data_end];
        if marker == APP0 && data.len() >= 12 && data.starts_with(b"JFIF\0") {
            let units = data[7];
            let (Some(x), Some(y)) = (be_u16(data, 8), be_u16(data, 10)) else {
                return Ok(None);
            };
            let (x, y) = (u32::from(x), u32::from(y));
            return match units {
                1 => checked_resolution(x, y, 1.0, "dots per inch").map(Some),
                2 => checked_resolution(x, y, CM_PER_INCH, "dots per cm").map(Some),
                _ => Ok(None),
            };
        }

        pos = data_end;
    }

    Ok(None)
}

/// PNG `pHYs` chunk: pixels per unit, unit 1 = metre
fn phys_resolution(bytes: &[u8]) -> Result<Option<Resolution>> {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    if !bytes.starts_with(&SIGNATURE) {
        return Ok(None);
    }

    let mut pos = SIGNATURE.len();
    while let Some(length) = be_u32(bytes, pos) {
        let length = length as usize;
        let Some(kind) = bytes.get(pos + 4..pos + 8) else {
            return Ok(None);
        };
        let data_start = pos + 8;
        let Some(data) = bytes.get(data_start..data_start.saturating_add(length)) else {
            return Ok(None);
        };

        match kind {
            b"pHYs" if data.len() >= 9 => {
                let (Some(x), Some(y)) = (be_u32(data, 0), be_u32(data, 4)) else {
                    return Ok(None);
                };
                return match data[8] {
                    1 => checked_resolution(x, y, METRES_PER_INCH, "pixels per metre").map(Some),
                    _ => Ok(None),
                };
            }
            b"IDAT" | b"IEND" => return Ok(None),
            _ => {}
        }

        // length, type, data, crc
        pos = data_start + length + 4;
    }

    Ok(None)
}

/// Inline picture anchored in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawing {
    /// Document-wide unique drawing id (`wp:docPr/@id`)
    pub doc_property_id: u32,
    /// Relationship id of the image part
    pub relationship_id: String,
    /// Size in EMUs
    pub extent: Extent,
    /// Name of the embedded picture file
    pub picture_name: String,
}

impl Drawing {
    pub fn new(
        doc_property_id: u32,
        relationship_id: impl Into<String>,
        extent: Extent,
        picture_name: impl Into<String>,
    ) -> Self {
        Self {
            doc_property_id,
            relationship_id: relationship_id.into(),
            extent,
            picture_name: picture_name.into(),
        }
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        let Extent { cx, cy } = self.extent;
        let id = self.doc_property_id;

        out.push_str("<w:drawing>");
        out.push_str(r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#);
        out.push_str(&format!(r#"<wp:extent cx="{}" cy="{}"/>"#, cx, cy));
        out.push_str(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#);
        out.push_str(&format!(r#"<wp:docPr id="{}" name="Picture {}"/>"#, id, id));
        out.push_str(
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
        );
        out.push_str(&format!(
            r#"<a:graphic><a:graphicData uri="{}"><pic:pic>"#,
            PICTURE_NS
        ));
        out.push_str(&format!(
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="{}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            escape_xml(&self.picture_name)
        ));
        out.push_str(&format!(
            r#"<pic:blipFill><a:blip r:embed="{}" cstate="print"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            escape_xml(&self.relationship_id)
        ));
        out.push_str(&format!(
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            cx, cy
        ));
        out.push_str("</pic:pic></a:graphicData></a:graphic>");
        out.push_str("</wp:inline>");
        out.push_str("</w:drawing>");
    }
}

/// Embed an encoded image as a new paragraph at the end of the body
///
/// Everything that can fail (decoding, resolution, page geometry, body
/// ordering) is checked before the package is touched, so an error leaves
/// the document exactly as it was.
pub fn add_image(package: &mut Package, bytes: &[u8]) -> Result<ParagraphId> {
    let info = ImageInfo::inspect(bytes)?;

    package.body().check_order()?;
    let section = package
        .body()
        .section_properties()
        .copied()
        .unwrap_or_default();

    let max_width = twips_to_emu(section.content_width());
    if max_width <= 0 {
        return Err(OoxmlError::InvalidStructure(format!(
            "page leaves no room for content ({} twips between margins)",
            section.content_width()
        )));
    }
    let extent = info.extent(max_width)?;

    package.body_mut().ensure_section_properties()?;
    let (relationship_id, picture_name) = package.add_image_part(bytes.to_vec(), info.format);
    let doc_property_id = package.body().max_doc_property_id() + 1;

    log::debug!(
        "Placing {}x{} px {:?} as {}x{} EMU (docPr {}, {})",
        info.width_px,
        info.height_px,
        info.format,
        extent.cx,
        extent.cy,
        doc_property_id,
        relationship_id
    );

    let drawing = Drawing::new(doc_property_id, relationship_id, extent, picture_name);
    package
        .body_mut()
        .append_paragraph(Paragraph::new(vec![Run::drawing(drawing)]))
}
