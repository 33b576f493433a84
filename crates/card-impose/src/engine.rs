//! Run orchestration
//!
//! One run walks `Idle -> Preprocessing -> Composing -> Finalizing -> Done`.
//! Preprocessing fans out over the worker pool, composition runs on a single
//! blocking thread and streams page events back so progress keeps moving.

use crate::cancel::CancelToken;
use crate::compose::{CompositionSummary, compose_sheets};
use crate::options::RunOptions;
use crate::preprocess::{PreprocessedBatch, list_image_files, preprocess_back_asset, preprocess_batch};
use crate::progress::{Progress, ProgressSink};
use crate::render::{PageRenderer, PdfRenderer, save_pdf};
use crate::types::*;
use lopdf::Document;
use tokio::sync::mpsc;

/// Stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunPhase {
    Idle,
    Preprocessing,
    Composing(ComposeMode),
    Finalizing,
    Done,
}

#[derive(Debug)]
struct PhaseTracker {
    phase: RunPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
        }
    }

    fn advance(&mut self, next: RunPhase) {
        log::info!("Run phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Failure path: a started run ends in `Finalizing` with the error,
    /// a run rejected during validation never leaves `Idle`.
    fn fail(&mut self) {
        if matches!(self.phase, RunPhase::Preprocessing | RunPhase::Composing(_)) {
            self.advance(RunPhase::Finalizing);
        }
    }
}

/// Impose every card image in `options.image_folder` into one PDF.
///
/// Fatal problems come back as errors; images that fail to decode are listed
/// in [`RunReport::skipped`] instead.
pub async fn impose_cards(
    options: &RunOptions,
    progress: &mut (dyn ProgressSink + Send),
    cancel: &CancelToken,
) -> Result<RunReport> {
    let mut tracker = PhaseTracker::new();
    let mut progress = Progress::new(progress);

    let result = run_pipeline(options, &mut progress, cancel, &mut tracker).await;
    if let Err(e) = &result {
        tracker.fail();
        log::error!("Imposition failed in {:?}: {}", tracker.phase, e);
    }
    result
}

/// Entry point that never fails: the outcome carries a success flag and a
/// message suitable for display.
pub async fn run(
    options: &RunOptions,
    progress: &mut (dyn ProgressSink + Send),
    cancel: &CancelToken,
) -> RunOutcome {
    match impose_cards(options, progress, cancel).await {
        Ok(report) => RunOutcome::succeeded(report),
        Err(e) => RunOutcome::failed(&e),
    }
}

async fn run_pipeline(
    options: &RunOptions,
    progress: &mut Progress<'_>,
    cancel: &CancelToken,
    tracker: &mut PhaseTracker,
) -> Result<RunReport> {
    options.validate()?;

    let images = list_image_files(&options.image_folder).await?;
    if images.is_empty() {
        return Err(CardImposeError::NoImagesFound);
    }
    let images_found = images.len();
    let mode = options.mode();
    let geometry = options.geometry();
    let target = options.target_pixels();
    log::info!(
        "Found {} images in {}; {}x{} grid, target {}x{} px",
        images_found,
        options.image_folder.display(),
        geometry.columns,
        geometry.rows,
        target.width,
        target.height
    );

    // Preprocessing
    tracker.advance(RunPhase::Preprocessing);
    progress.started(images_found);

    let back_asset = match (mode, options.back_image()) {
        (ComposeMode::Duplex, Some(path)) => Some(preprocess_back_asset(path, target).await?),
        (ComposeMode::Duplex, None) => return Err(CardImposeError::MissingBackAsset),
        (ComposeMode::Simplex, _) => None,
    };
    cancel.check()?;

    let batch = preprocess_batch(
        images,
        target,
        options.effective_workers(),
        cancel,
        progress,
    )
    .await?;
    if batch.succeeded() == 0 {
        return Err(CardImposeError::AllImagesFailed {
            count: images_found,
        });
    }
    let PreprocessedBatch { slots, skipped } = batch;

    // Composition
    tracker.advance(RunPhase::Composing(mode));
    let (page_tx, mut page_rx) = mpsc::unbounded_channel::<(usize, usize)>();
    let compose_options = options.compose_options();
    let compose_cancel = cancel.clone();

    let handle = tokio::task::spawn_blocking(
        move || -> Result<(Document, CompositionSummary)> {
            let mut renderer = PdfRenderer::new(geometry.page_width, geometry.page_height);
            let mut on_page = |done: usize, total: usize| {
                let _ = page_tx.send((done, total));
            };
            let summary = compose_sheets(
                &mut renderer,
                slots,
                &geometry,
                &compose_options,
                back_asset.as_ref(),
                mode,
                &compose_cancel,
                &mut on_page,
            )?;
            let doc = renderer.finish()?;
            Ok((doc, summary))
        },
    );

    while let Some((done, total)) = page_rx.recv().await {
        progress.page_done(done, total);
    }
    let (doc, summary) = handle.await??;
    cancel.check()?;

    // Output
    tracker.advance(RunPhase::Finalizing);
    progress.saving();
    save_pdf(doc, &options.output_path).await?;

    let report = RunReport {
        output_path: options.output_path.clone(),
        mode,
        pages: summary.page_count(),
        cards_placed: summary.cards_placed,
        images_found,
        skipped,
    };

    tracker.advance(RunPhase::Done);
    progress.complete();
    log::info!("{} -> {}", report.message(), report.output_path.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_run_stays_idle() {
        let mut tracker = PhaseTracker::new();
        tracker.fail();
        assert_eq!(tracker.phase, RunPhase::Idle);
    }

    #[test]
    fn test_failure_while_working_ends_in_finalizing() {
        for phase in [
            RunPhase::Preprocessing,
            RunPhase::Composing(ComposeMode::Duplex),
        ] {
            let mut tracker = PhaseTracker::new();
            tracker.advance(phase);
            tracker.fail();
            assert_eq!(tracker.phase, RunPhase::Finalizing);
        }
    }

    #[test]
    fn test_failure_while_saving_stays_in_finalizing() {
        let mut tracker = PhaseTracker::new();
        tracker.advance(RunPhase::Finalizing);
        tracker.fail();
        assert_eq!(tracker.phase, RunPhase::Finalizing);
    }
}
