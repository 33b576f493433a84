mod settings;

use anyhow::{Result, bail};
use card_impose::{CancelToken, RunOptions};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use settings::{DEFAULT_SETTINGS_FILE, PrinterSettings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cardimpose", about = "Lay out card images on printable A4 sheets", version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a printable PDF from a folder of card images
    Print {
        /// Folder with card images (defaults to the last used folder)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Back image printed behind every card (defaults to the last used one)
        #[arg(long)]
        back: Option<PathBuf>,

        /// Skip crop marks
        #[arg(long)]
        no_crop_marks: bool,

        /// Preprocessing workers (0 = all cores)
        #[arg(long)]
        workers: Option<usize>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Store the resolved settings after a successful run
        #[arg(long)]
        save_settings: bool,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the sheet layout for the current settings
    Info {
        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// Image resolution in dots per inch
    #[arg(long)]
    dpi: Option<u32>,

    /// Card width in mm
    #[arg(long)]
    card_width: Option<f32>,

    /// Card height in mm
    #[arg(long)]
    card_height: Option<f32>,

    /// Gap between cards in mm
    #[arg(long)]
    gap: Option<f32>,

    /// Print card faces only, without back pages
    #[arg(long)]
    front_only: bool,

    /// Settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,
}

impl LayoutArgs {
    /// Command-line values first, then saved settings
    fn resolve(&self, settings: &PrinterSettings) -> RunOptions {
        RunOptions {
            dpi: self.dpi.unwrap_or(settings.dpi),
            card_width_mm: self.card_width.unwrap_or(settings.card_width),
            card_height_mm: self.card_height.unwrap_or(settings.card_height),
            gap_mm: self.gap.unwrap_or(settings.gap),
            show_crop_marks: settings.show_crop,
            workers: settings.workers,
            include_back: settings.include_back && !self.front_only,
            back_image: non_empty_path(&settings.last_logo),
            image_folder: PathBuf::from(&settings.last_folder),
            ..RunOptions::default()
        }
    }
}

fn non_empty_path(path: &str) -> Option<PathBuf> {
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
        )?
        .progress_chars("#>-"),
    );
    Ok(bar)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Print {
            input,
            output,
            back,
            no_crop_marks,
            workers,
            layout,
            save_settings,
            stats_only,
            json,
        } => {
            let mut settings = PrinterSettings::load_or_default(&layout.settings).await?;
            let mut options = layout.resolve(&settings);
            options.output_path = output;
            if let Some(input) = input {
                options.image_folder = input;
            }
            if let Some(back) = back {
                options.back_image = Some(back);
            }
            if let Some(workers) = workers {
                options.workers = workers;
            }
            if no_crop_marks {
                options.show_crop_marks = false;
            }
            if options.image_folder.as_os_str().is_empty() {
                bail!("No input folder given and none saved in settings");
            }

            if stats_only {
                let images = card_impose::list_image_files(&options.image_folder).await?;
                let stats = card_impose::calculate_statistics(
                    images.len(),
                    &options.geometry(),
                    options.include_back,
                );
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    println!("Imposition Statistics:");
                    println!("  Card images: {}", stats.card_count);
                    println!("  Cards per sheet: {}", stats.slots_per_page);
                    println!("  Sheets: {}", stats.sheets);
                    println!("  Output pages: {}", stats.output_pages);
                    println!("  Empty slots: {}", stats.empty_slots);
                }
                return Ok(());
            }

            let cancel = CancelToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, cancelling");
                    ctrl_c.cancel();
                }
            });

            let bar = progress_bar(json)?;
            let mut on_progress = |percent: f32, message: &str| {
                bar.set_position(percent.round() as u64);
                bar.set_message(message.to_string());
            };
            let outcome = card_impose::run(&options, &mut on_progress, &cancel).await;
            bar.finish_and_clear();

            if json {
                let value = serde_json::json!({
                    "success": outcome.success,
                    "message": outcome.message,
                    "report": outcome.report,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else if outcome.success {
                println!("{} → {}", outcome.message, options.output_path.display());
            }

            if !outcome.success {
                bail!(outcome.message);
            }
            if let Some(report) = &outcome.report {
                for skipped in &report.skipped {
                    log::warn!("Skipped {}: {}", skipped.path.display(), skipped.reason);
                }
            }

            if save_settings {
                settings.dpi = options.dpi;
                settings.card_width = options.card_width_mm;
                settings.card_height = options.card_height_mm;
                settings.gap = options.gap_mm;
                settings.show_crop = options.show_crop_marks;
                settings.include_back = options.include_back;
                settings.workers = options.workers;
                settings.last_folder = options.image_folder.display().to_string();
                settings.last_logo = options
                    .back_image()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                settings.save(&layout.settings).await?;
            }
        }

        Commands::Info { layout } => {
            let settings = PrinterSettings::load_or_default(&layout.settings).await?;
            let options = layout.resolve(&settings);
            options.validate().or_else(|e| match e {
                // Previewing a duplex layout doesn't need the back image yet
                card_impose::CardImposeError::MissingBackAsset => Ok(()),
                other => Err(other),
            })?;

            let info = card_impose::describe(&options);
            println!("Sheet: A4 portrait (210 x 297 mm)");
            println!(
                "Card: {} x {} mm, gap {} mm",
                options.card_width_mm, options.card_height_mm, options.gap_mm
            );
            println!("Layout: {}", info.summary());
        }
    }

    Ok(())
}
