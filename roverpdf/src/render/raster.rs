//! Turning a raster image into a one-page PDF.
//!
//! The image is decoded, turned upright when it is wider than tall,
//! re-encoded as a full-quality JPEG and placed on an A4 page, scaled to
//! fit inside a fixed margin and centred.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Cursor;
use std::path::Path;

use crate::error::{Result, RoverError};
use crate::mime::MimeType;

/// A4 width in points.
pub const A4_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const A4_HEIGHT: f32 = 841.89;
/// Blank border kept around the image, in points.
pub const PAGE_MARGIN: f32 = 25.0;

const JPEG_QUALITY: u8 = 100;
const IMAGE_RESOURCE: &str = "Im0";

/// Where the image lands on the page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Drawn width.
    pub width: f32,
    /// Drawn height.
    pub height: f32,
}

/// Scale `width` x `height` pixels to fit the A4 area inside the margin,
/// keeping the aspect ratio, and centre the result.
pub fn fit_to_page(width: u32, height: u32) -> Placement {
    let area_width = A4_WIDTH - 2.0 * PAGE_MARGIN;
    let area_height = A4_HEIGHT - 2.0 * PAGE_MARGIN;

    let scale = (area_width / width.max(1) as f32).min(area_height / height.max(1) as f32);
    let drawn_width = width as f32 * scale;
    let drawn_height = height as f32 * scale;

    Placement {
        x: PAGE_MARGIN + (area_width - drawn_width) / 2.0,
        y: PAGE_MARGIN + (area_height - drawn_height) / 2.0,
        width: drawn_width,
        height: drawn_height,
    }
}

/// Render image bytes into a serialized one-page PDF.
///
/// `path` is only used for error messages.
///
/// # Errors
///
/// Returns [`RoverError::ImageDecode`] if the bytes cannot be decoded as a
/// PNG, JPEG or BMP image, and [`RoverError::ImageEncode`] if the page cannot be
/// produced.
pub fn image_to_pdf(data: &[u8], mime: MimeType, path: &Path) -> Result<Vec<u8>> {
    let format = match mime {
        MimeType::Png => ImageFormat::Png,
        MimeType::Jpeg => ImageFormat::Jpeg,
        MimeType::Bmp => ImageFormat::Bmp,
        MimeType::Pdf => {
            return Err(RoverError::ImageDecode {
                path: path.to_path_buf(),
                reason: "application/pdf is not an image type".to_string(),
            });
        }
    };

    let decode_err = |reason: String| RoverError::ImageDecode {
        path: path.to_path_buf(),
        reason,
    };

    // The content decides the decoder; the declared type only covers
    // bytes without a recognisable signature.
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?;
    if reader.format().is_none() {
        reader.set_format(format);
    }
    let decoded = reader.decode().map_err(|e| decode_err(e.to_string()))?;

    let upright = upright(decoded);
    let rgb = upright.to_rgb8();
    let (width, height) = rgb.dimensions();

    let encode_err = |reason: String| RoverError::ImageEncode {
        path: path.to_path_buf(),
        reason,
    };

    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY))
        .map_err(|e| encode_err(e.to_string()))?;

    let mut doc = single_image_page(jpeg, width, height).map_err(|e| encode_err(e.to_string()))?;

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| encode_err(e.to_string()))?;

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        bytes = bytes.len(),
        "Rendered image page"
    );

    Ok(bytes)
}

/// Rotate landscape images a quarter turn so they fill a portrait page.
fn upright(image: DynamicImage) -> DynamicImage {
    if image.width() > image.height() {
        image.rotate90()
    } else {
        image
    }
}

fn single_image_page(jpeg: Vec<u8>, width: u32, height: u32) -> lopdf::Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    // Already DCT-encoded; flate on top gains nothing.
    let image_id = doc.add_object(
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        )
        .with_compression(false),
    );

    let placement = fit_to_page(width, height);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_RESOURCE => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}
