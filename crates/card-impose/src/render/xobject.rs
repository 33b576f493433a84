//! Image XObject creation
//!
//! Raster assets are embedded as Flate-compressed 8-bit samples. Each stream
//! is compressed as soon as it is built, so only one card's raw samples are
//! held at a time. Alpha becomes a soft mask so transparent card corners stay
//! transparent.

use crate::preprocess::RenderedAsset;
use crate::types::Result;
use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Embed `asset` into `output` and return the image XObject id
pub fn create_image_xobject(output: &mut Document, asset: &RenderedAsset) -> Result<ObjectId> {
    let image = asset.load()?;
    let (width, height) = (image.width(), image.height());

    let (samples, alpha) = match image {
        DynamicImage::ImageRgba8(rgba) => split_alpha(rgba.into_raw()),
        other if other.color().has_alpha() => split_alpha(other.into_rgba8().into_raw()),
        other => (other.into_rgb8().into_raw(), None),
    };

    let mut dict = image_dict(width, height, "DeviceRGB");
    if let Some(alpha) = alpha {
        let mask = compressed_stream(image_dict(width, height, "DeviceGray"), alpha)?;
        let mask_id = output.add_object(mask);
        dict.set("SMask", Object::Reference(mask_id));
    }

    let image = compressed_stream(dict, samples)?;
    Ok(output.add_object(image))
}

fn compressed_stream(dict: Dictionary, samples: Vec<u8>) -> Result<Stream> {
    let mut stream = Stream::new(dict, samples);
    stream.compress()?;
    Ok(stream)
}

fn image_dict(width: u32, height: u32, color_space: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}

/// Split interleaved RGBA into RGB samples and an alpha channel.
///
/// The alpha channel is dropped when every pixel is opaque.
fn split_alpha(rgba: Vec<u8>) -> (Vec<u8>, Option<Vec<u8>>) {
    let pixels = rgba.len() / 4;
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);

    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }

    if alpha.iter().all(|&a| a == u8::MAX) {
        (rgb, None)
    } else {
        (rgb, Some(alpha))
    }
}
