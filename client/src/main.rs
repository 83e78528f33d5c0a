mod config;
mod imaging;
mod inference;
mod results;
mod session;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use shared::{InferenceOutcome, ServerStatus};

use config::Config;
use imaging::UploadedImage;
use inference::health::HealthService;
use results::{export, ranking};
use session::{AnalysisReport, AnalysisSession, Pipeline};

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let mut args = env::args().skip(1);
    let Some(image_path) = args.next() else {
        eprintln!("Usage: client <image-file> [export-directory]");
        return ExitCode::FAILURE;
    };
    let export_dir = args.next().map(PathBuf::from);

    let config = Config::from_env();
    log::info!("Prediction endpoint: {}", config.predictions_url());

    match HealthService::new(&config).check() {
        ServerStatus::Online => log::info!("Inference server online"),
        status => log::warn!("Inference server status: {}", status),
    }

    let bytes = match fs::read(&image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Failed to read {}: {}", image_path, e);
            return ExitCode::FAILURE;
        }
    };
    let file_name = Path::new(&image_path)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string);
    let upload = UploadedImage::from_bytes(bytes, file_name.clone());

    let pipeline = Pipeline::new(config);
    let mut session = AnalysisSession::new();
    let report = match pipeline.analyze(&upload, &mut session) {
        Ok(report) => report,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match &report.outcome {
        InferenceOutcome::Failure { message, .. } => {
            log::error!("{}", message);
            ExitCode::FAILURE
        }
        InferenceOutcome::Success { predictions } => {
            print_report(&report, predictions);
            if let Some(dir) = export_dir {
                let uploaded_name = file_name.as_deref().unwrap_or("upload");
                if let Err(e) = write_export(&dir, uploaded_name, predictions) {
                    log::error!("Failed to export results: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
    }
}

fn print_report(report: &AnalysisReport, predictions: &[shared::Prediction]) {
    println!(
        "Image: {}x{} {} ({})",
        report.image.width,
        report.image.height,
        report.image.mode,
        report.image.format.as_deref().unwrap_or("unknown format"),
    );

    if let Some(top) = ranking::top_summary(predictions) {
        println!(
            "Top prediction: {} ({}, {})",
            top.display_label,
            ranking::format_headline(top.confidence),
            top.bucket
        );
    }

    println!();
    for row in ranking::rank(predictions) {
        println!(
            "{:>3}. {:<32} {:>7}  [{}]",
            row.rank,
            row.display_label,
            ranking::format_row(row.confidence),
            row.bucket
        );
    }
    println!();
    println!(
        "Analysis time: {:.3}s | {} classes",
        report.duration.as_secs_f64(),
        predictions.len()
    );
}

fn write_export(
    dir: &Path,
    uploaded_name: &str,
    predictions: &[shared::Prediction],
) -> Result<(), Box<dyn std::error::Error>> {
    let ranked = ranking::rank(predictions);
    let json = export::to_json(&ranked)?;
    let path = dir.join(export::file_name(uploaded_name));
    fs::write(&path, json)?;
    log::info!("Results written to {}", path.display());
    Ok(())
}
