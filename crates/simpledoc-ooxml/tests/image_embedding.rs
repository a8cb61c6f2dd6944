//! Image Embedding Tests
//!
//! Fixtures are encoded in memory with the `image` crate's encoders.

use std::io::Cursor;

use simpledoc_ooxml::{DocumentWriter, Extent, OoxmlArchive, OoxmlError};

mod common;

use common::{jpeg, png};

fn extent_of(writer: &DocumentWriter, id: simpledoc_ooxml::ParagraphId) -> Extent {
    writer
        .body()
        .unwrap()
        .paragraph(id)
        .unwrap()
        .drawings()
        .next()
        .unwrap()
        .extent
}

// =============================================================================
// PLACEMENT
// =============================================================================

mod placement {
    use super::*;

    #[test]
    fn test_wide_jpeg_scaled_to_letter_content_width() {
        let mut writer = DocumentWriter::new();
        let id = writer.add_image(&jpeg(800, 400, Some(72))).unwrap();

        // 800 px at 72 DPI is 10,160,000 EMU; content width is 9360 twips
        assert_eq!(extent_of(&writer, id), Extent::new(5_943_600, 2_971_800));
    }

    #[test]
    fn test_small_jpeg_keeps_natural_size() {
        let mut writer = DocumentWriter::new();
        let id = writer.add_image(&jpeg(150, 75, Some(150))).unwrap();
        assert_eq!(extent_of(&writer, id), Extent::new(914_400, 457_200));
    }

    #[test]
    fn test_jpeg_without_density_uses_96_dpi() {
        let mut writer = DocumentWriter::new();
        let id = writer.add_image(&jpeg(192, 96, None)).unwrap();
        assert_eq!(extent_of(&writer, id), Extent::new(1_828_800, 914_400));
    }

    #[test]
    fn test_png_without_phys_uses_96_dpi() {
        let mut writer = DocumentWriter::new();
        let id = writer.add_image(&png(96, 96)).unwrap();
        assert_eq!(extent_of(&writer, id), Extent::new(914_400, 914_400));
    }

    #[test]
    fn test_from_reader() {
        let mut writer = DocumentWriter::new();
        let id = writer
            .add_image_from_reader(Cursor::new(jpeg(96, 96, Some(96))))
            .unwrap();
        assert_eq!(extent_of(&writer, id), Extent::new(914_400, 914_400));
    }
}

// =============================================================================
// DRAWING IDS AND PARTS
// =============================================================================

mod parts {
    use super::*;

    #[test]
    fn test_drawing_ids_increase() {
        let mut writer = DocumentWriter::new();
        let ids: Vec<_> = (0..3)
            .map(|_| writer.add_image(&png(8, 8)).unwrap())
            .collect();

        let body = writer.body().unwrap();
        let doc_ids: Vec<u32> = ids
            .iter()
            .map(|id| body.paragraph(*id).unwrap().drawings().next().unwrap().doc_property_id)
            .collect();
        assert_eq!(doc_ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_media_parts_follow_detected_format() {
        let mut writer = DocumentWriter::new();
        let jpeg_bytes = jpeg(16, 16, Some(96));
        writer.add_image(&jpeg_bytes).unwrap();
        writer.add_image(&png(16, 16)).unwrap();

        let archive = OoxmlArchive::from_reader(writer.save_to_stream().unwrap()).unwrap();
        assert_eq!(archive.get("word/media/image1.jpeg"), Some(jpeg_bytes.as_slice()));
        assert!(archive.contains("word/media/image2.png"));

        let types = archive.get_string("[Content_Types].xml").unwrap().unwrap();
        assert!(types.contains(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#));
        assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));

        let rels = archive
            .get_string("word/_rels/document.xml.rels")
            .unwrap()
            .unwrap();
        assert!(rels.contains(r#"Id="rId1""#) && rels.contains(r#"Target="media/image1.jpeg""#));
        assert!(rels.contains(r#"Id="rId2""#) && rels.contains(r#"Target="media/image2.png""#));

        let document = archive.get_string("word/document.xml").unwrap().unwrap();
        assert!(document.contains(r#"<a:blip r:embed="rId1" cstate="print"/>"#));
        assert!(document.contains(r#"<wp:docPr id="2" name="Picture 2"/>"#));
    }

    #[test]
    fn test_image_relationship_follows_numbering_part() {
        let mut writer = DocumentWriter::new();
        writer.add_bulleted_list(["a"]).unwrap();
        let id = writer.add_image(&png(8, 8)).unwrap();

        let body = writer.body().unwrap();
        let drawing = body.paragraph(id).unwrap().drawings().next().unwrap();
        assert_eq!(drawing.relationship_id, "rId2");
    }
}

// =============================================================================
// FAILURES
// =============================================================================

mod failures {
    use super::*;

    #[test]
    fn test_empty_stream() {
        let mut writer = DocumentWriter::new();
        assert!(matches!(
            writer.add_image(&[]),
            Err(OoxmlError::ImageReadError(_))
        ));
    }

    #[test]
    fn test_not_an_image() {
        let mut writer = DocumentWriter::new();
        assert!(matches!(
            writer.add_image(b"hello world, this is text"),
            Err(OoxmlError::UnsupportedImageFormat(_))
        ));
    }

    #[test]
    fn test_other_raster_format() {
        let mut bmp = b"BM".to_vec();
        bmp.extend_from_slice(&[0u8; 52]);

        let mut writer = DocumentWriter::new();
        assert!(matches!(
            writer.add_image(&bmp),
            Err(OoxmlError::UnsupportedImageFormat(_))
        ));
    }

    #[test]
    fn test_truncated_png() {
        let mut bytes = png(32, 32);
        bytes.truncate(12);

        let mut writer = DocumentWriter::new();
        assert!(matches!(
            writer.add_image(&bytes),
            Err(OoxmlError::ImageReadError(_))
        ));
    }

    #[test]
    fn test_failure_leaves_document_untouched() {
        let mut writer = DocumentWriter::new();
        writer.add_paragraph("kept").unwrap();
        writer.add_image(&png(8, 8)).unwrap();
        let before = writer.body().unwrap().clone();

        assert!(writer.add_image(&[0xFF, 0xD8, 0xFF]).is_err());
        assert_eq!(writer.body().unwrap(), &before);

        let archive = OoxmlArchive::from_reader(writer.save_to_stream().unwrap()).unwrap();
        assert!(!archive.contains("word/media/image2.jpeg"));
        let rels = archive
            .get_string("word/_rels/document.xml.rels")
            .unwrap()
            .unwrap();
        assert_eq!(rels.matches("<Relationship ").count(), 1);
    }
}
