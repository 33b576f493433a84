//! Rendered assets backed by temporary files

use crate::types::{CardImposeError, Result};
use image::{DynamicImage, ImageFormat};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::NamedTempFile;

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of an asset, used by renderers to reuse embedded images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(pub u64);

/// A scaled card image stored as a temporary PNG file.
///
/// The file is deleted when the asset is released or dropped, whichever
/// comes first.
#[derive(Debug)]
pub struct RenderedAsset {
    id: AssetId,
    file: NamedTempFile,
    width: u32,
    height: u32,
    scale: f32,
    source: PathBuf,
}

impl RenderedAsset {
    /// Encode `image` into a fresh temporary file
    pub fn from_image(image: &DynamicImage, source: impl Into<PathBuf>, scale: f32) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("card-asset-")
            .suffix(".png")
            .tempfile()
            .map_err(CardImposeError::TempResource)?;

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            image
                .write_to(&mut writer, ImageFormat::Png)
                .map_err(|e| CardImposeError::TempResource(std::io::Error::other(e)))?;
            writer.flush().map_err(CardImposeError::TempResource)?;
        }

        Ok(Self {
            id: AssetId(NEXT_ASSET_ID.fetch_add(1, Ordering::SeqCst)),
            file,
            width: image.width(),
            height: image.height(),
            scale,
            source: source.into(),
        })
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Scale factor applied to the source image (1.0 = untouched)
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Image the asset was produced from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path of the backing temporary file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Decode the stored pixels
    pub fn load(&self) -> Result<DynamicImage> {
        image::open(self.path()).map_err(|source| CardImposeError::ImageDecode {
            path: self.path().to_path_buf(),
            source,
        })
    }

    /// Delete the backing file now, logging rather than failing on error
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            log::warn!("Failed to delete temporary asset {}: {}", path.display(), e);
        }
    }
}
