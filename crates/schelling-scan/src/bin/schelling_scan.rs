//! Command-line front end for the scan pipeline.
//!
//! Runs the vision stages on a photo, optionally dumping intermediate
//! images for threshold tuning. Analytics need class predictions, which
//! live in an external model; pass them in as a JSON matrix exported by
//! the classifier (`--labels`) to get the full report.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, LevelFilter};
use nalgebra::DMatrix;

use schelling_scan::detect::{boundary_mask, locate_boundary, partition, rectify};
use schelling_scan::model::{decode_labels, LabelTable};
use schelling_scan::{init_with_level, AnalyticsReport, GridSpec, ScanParams};

#[derive(Parser, Debug)]
#[command(name = "schelling-scan", about = "Schelling board photo analyzer")]
struct Args {
    /// Input photograph.
    #[arg(short, long)]
    img: PathBuf,

    /// Board grid as 'NxM' (columns x rows).
    #[arg(short, long, default_value = "26x18")]
    grid: GridSpec,

    /// Cell tile side in pixels.
    #[arg(long, default_value_t = 75)]
    cell_size: u32,

    /// Directory for intermediate image dumps (threshold, rectified).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Class-index matrix (rows x cols JSON array) exported by the
    /// classifier; enables the analytics report.
    #[arg(short, long)]
    labels: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let photo = image::open(&args.img)?.to_rgb8();
    info!(
        "loaded {} ({}x{})",
        args.img.display(),
        photo.width(),
        photo.height()
    );

    let params = ScanParams {
        grid: args.grid,
        cell_size: args.cell_size,
        ..ScanParams::default()
    };

    let quads = locate_boundary(&photo, &params.boundary)?;
    let rectified = rectify(&photo, &quads[0], params.grid)?;
    let cells = partition(&rectified, params.grid, params.cell_size)?;
    info!("partitioned board into {} cells", cells.len());

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)?;
        let mask = boundary_mask(&photo, &params.boundary)?;
        mask.save(dir.join("threshold.png"))?;
        rectified.save(dir.join("rectified.png"))?;
        info!("wrote debug images to {}", dir.display());
    }

    if let Some(labels_path) = &args.labels {
        let raw: Vec<Vec<usize>> = serde_json::from_str(&fs::read_to_string(labels_path)?)?;
        let rows = args.grid.rows as usize;
        let cols = args.grid.cols as usize;
        if raw.len() != rows || raw.iter().any(|r| r.len() != cols) {
            return Err(format!(
                "label matrix from {} does not match the {} grid",
                labels_path.display(),
                args.grid
            )
            .into());
        }
        let class_indices =
            DMatrix::from_fn(rows, cols, |r, c| raw[r][c]);
        let board = decode_labels(&class_indices, &LabelTable::two_teams())?;
        let report = AnalyticsReport::from_board(&board);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = init_with_level(level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("scan of {} failed: {err}", args.img.display());
            ExitCode::FAILURE
        }
    }
}
