//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Whether `data` starts with the PNG signature
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter (always "FlateDecode")
    pub filter: String,
    /// Encoded image samples
    pub data: Vec<u8>,
    /// Flate-compressed 8-bit alpha channel, embedded as a soft mask
    pub alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Create an XObject from encoded PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !is_png(data) {
            return Err(PdfError::ImageError("Unsupported image format".to_string()));
        }
        Self::from_png(data)
    }

    /// Create XObject from PNG data
    ///
    /// Transparent PNGs keep their alpha channel as a soft mask so that
    /// the image composites over the page instead of hiding it.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        if color_type.has_alpha() {
            return Self::from_rgba(&image.to_rgba8());
        }

        let (raw, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                (image.to_luma8().into_raw(), "DeviceGray")
            }
            _ => (image.to_rgb8().into_raw(), "DeviceRGB"),
        };

        Ok(Self {
            width: image.width(),
            height: image.height(),
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: deflate(&raw)?,
            alpha: None,
        })
    }

    /// Create XObject from an in-memory RGBA raster
    pub fn from_rgba(image: &RgbaImage) -> Result<Self> {
        let pixel_count = (image.width() * image.height()) as usize;
        let mut rgb = Vec::with_capacity(pixel_count * 3);
        let mut alpha = Vec::with_capacity(pixel_count);
        for pixel in image.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }

        Ok(Self {
            width: image.width(),
            height: image.height(),
            color_space: "DeviceRGB".to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: deflate(&rgb)?,
            alpha: Some(deflate(&alpha)?),
        })
    }

    /// Soft mask stream for the alpha channel, if any
    pub fn smask_stream(&self) -> Option<Stream> {
        self.alpha.as_ref().map(|alpha| {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"XObject".to_vec()));
            dict.set("Subtype", Object::Name(b"Image".to_vec()));
            dict.set("Width", self.width as i64);
            dict.set("Height", self.height as i64);
            dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
            dict.set("BitsPerComponent", 8i64);
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            dict.set("Length", alpha.len() as i64);
            Stream::new(dict, alpha.clone())
        })
    }

    /// Convert to lopdf Stream object
    ///
    /// `smask` must reference the stream produced by [`Self::smask_stream`]
    /// once it has been added to the document.
    pub fn to_pdf_stream(&self, smask: Option<ObjectId>) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));
        dict.set("Length", self.data.len() as i64);
        if let Some(smask_id) = smask {
            dict.set("SMask", Object::Reference(smask_id));
        }

        Stream::new(dict, self.data.clone())
    }
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x` - X coordinate in points
/// * `y` - Y coordinate in points (from bottom, PDF coordinates)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
