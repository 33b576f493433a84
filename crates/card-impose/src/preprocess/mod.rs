//! Image preprocessing
//!
//! Card images are decoded and downscaled on a fixed pool of blocking workers
//! that pull from a shared index queue. Each worker writes into the result
//! slot reserved for its image, so the batch comes back in input order no
//! matter which worker finishes first.

mod asset;
mod scale;

pub use asset::{AssetId, RenderedAsset};
pub use scale::{PixelBox, fit_dimensions, fit_scale, preprocess_image};

use crate::cancel::CancelToken;
use crate::constants::IMAGE_EXTENSIONS;
use crate::progress::Progress;
use crate::types::{CardImposeError, Result, SkippedImage, SourceImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;

type SlotOutcome = std::result::Result<RenderedAsset, SkippedImage>;

/// Preprocessed batch, indexed by input position
#[derive(Debug, Default)]
pub struct PreprocessedBatch {
    /// One entry per input image; `None` where the image was skipped
    pub slots: Vec<Option<RenderedAsset>>,
    pub skipped: Vec<SkippedImage>,
}

impl PreprocessedBatch {
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn succeeded(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Whether `path` has one of the accepted image extensions
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

/// List card images directly inside `folder`, sorted by path
pub async fn list_image_files(folder: impl AsRef<Path>) -> Result<Vec<SourceImage>> {
    let mut entries = tokio::fs::read_dir(folder.as_ref()).await?;
    let mut paths: Vec<PathBuf> = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_supported_image(&path) {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable entry {}: {}", path.display(), e),
        }
    }

    paths.sort();
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| SourceImage { index, path })
        .collect())
}

/// Default worker count: the machine's available parallelism
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Prepare the shared back image. Any failure here is fatal for the run.
pub async fn preprocess_back_asset(path: &Path, target: PixelBox) -> Result<RenderedAsset> {
    let path = path.to_owned();
    tokio::task::spawn_blocking(move || preprocess_image(&path, target)).await?
}

/// Preprocess `images` on `workers` blocking threads.
///
/// Per-image failures are recorded in [`PreprocessedBatch::skipped`] and leave
/// their slot empty. Cancellation drops every asset produced so far.
pub async fn preprocess_batch(
    images: Vec<SourceImage>,
    target: PixelBox,
    workers: usize,
    cancel: &CancelToken,
    progress: &mut Progress<'_>,
) -> Result<PreprocessedBatch> {
    let total = images.len();
    if total == 0 {
        return Ok(PreprocessedBatch::default());
    }

    let images: Arc<[SourceImage]> = images.into();
    let results: Arc<Vec<OnceLock<SlotOutcome>>> =
        Arc::new((0..total).map(|_| OnceLock::new()).collect());
    let next = Arc::new(AtomicUsize::new(0));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<()>();

    let worker_count = workers.clamp(1, total);
    log::info!("Preprocessing {} images on {} workers", total, worker_count);

    let mut handles = Vec::with_capacity(worker_count);
    for worker in 0..worker_count {
        let images = Arc::clone(&images);
        let results = Arc::clone(&results);
        let next = Arc::clone(&next);
        let done_tx = done_tx.clone();
        let cancel = cancel.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            while !cancel.is_cancelled() {
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(image) = images.get(index) else {
                    break;
                };

                let outcome = preprocess_image(&image.path, target).map_err(|e| {
                    log::warn!("Skipping {}: {}", image.path.display(), e);
                    SkippedImage {
                        index: image.index,
                        path: image.path.clone(),
                        reason: e.to_string(),
                    }
                });
                // Each index is handed out exactly once, so the slot is empty.
                let _ = results[index].set(outcome);
                let _ = done_tx.send(());
            }
            log::debug!("Preprocess worker {} finished", worker);
        }));
    }
    drop(done_tx);

    // Counted on the receiving side so reported counts arrive in order
    let mut completed = 0;
    while done_rx.recv().await.is_some() {
        completed += 1;
        progress.image_done(completed, total);
    }
    for handle in handles {
        handle.await?;
    }

    let results = Arc::into_inner(results)
        .ok_or_else(|| CardImposeError::WorkerPool("result buffer still shared".to_string()))?;
    cancel.check()?;

    let mut batch = PreprocessedBatch {
        slots: Vec::with_capacity(total),
        skipped: Vec::new(),
    };
    for (index, cell) in results.into_iter().enumerate() {
        match cell.into_inner() {
            Some(Ok(asset)) => batch.slots.push(Some(asset)),
            Some(Err(skipped)) => {
                batch.skipped.push(skipped);
                batch.slots.push(None);
            }
            None => {
                batch.skipped.push(SkippedImage {
                    index,
                    path: images[index].path.clone(),
                    reason: "not processed".to_string(),
                });
                batch.slots.push(None);
            }
        }
    }

    log::info!(
        "Preprocessed {}/{} images ({} skipped)",
        batch.succeeded(),
        total,
        batch.skipped.len()
    );
    Ok(batch)
}
