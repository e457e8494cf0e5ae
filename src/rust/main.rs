use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use binwise::{
    parse_predictions, score, AnalysisError, AnalysisReport, Analyzer, AnalyzerConfig, BuiltinModel,
    ClassificationResult, ModelManager, OnnxImageClassifier, Prediction,
};
use clap::{Parser, Subcommand};
use log::info;

const BAR_WIDTH: usize = 30;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one or more photos with the built-in image model
    Analyze {
        /// Image files to analyze, in order
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Force a fresh download of the model files
        #[arg(short, long)]
        fresh: bool,
        /// Number of raw predictions requested from the model
        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: usize,
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score a JSON array of {"label", "score"} predictions without any model
    Score {
        /// Predictions file, or "-" for stdin
        input: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

async fn ensure_model_downloaded(fresh: bool) -> Result<()> {
    let manager = ModelManager::new_default()?;
    let model = BuiltinModel::MobileNetV2;

    if fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(model)?;
    }
    manager.ensure_model_downloaded(model).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Analyze { images, fresh, top_k, json } => analyze(images, fresh, top_k, json).await,
        Command::Score { input, json } => score_file(input, json),
    }
}

async fn analyze(images: Vec<PathBuf>, fresh: bool, top_k: usize, json: bool) -> Result<()> {
    ensure_model_downloaded(fresh).await?;

    let start_time = Instant::now();
    let classifier = OnnxImageClassifier::builder()
        .with_model(BuiltinModel::MobileNetV2)?
        .with_top_k(top_k)
        .build()?;
    info!("Classifier ready (took {:.2?})", start_time.elapsed());

    let analyzer = Analyzer::with_config(classifier, AnalyzerConfig::default());
    let mut failures = 0;

    for path in &images {
        match analyzer.analyze_file(path).await {
            Ok(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
            Ok(report) => print_report(&path.display().to_string(), &report),
            Err(e) => {
                failures += 1;
                eprintln!("\nCould not analyze {}: {}", path.display(), e);
                if !matches!(e, AnalysisError::Unreadable(_)) {
                    eprintln!("Try another photo, or check that the file is a JPEG or PNG image.");
                }
            }
        }
    }

    if !json {
        print_history(&analyzer.history().await);
    }
    if failures == images.len() {
        anyhow::bail!("No image could be analyzed");
    }
    Ok(())
}

fn score_file(input: PathBuf, json: bool) -> Result<()> {
    let text = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&input).with_context(|| format!("Failed to read {}", input.display()))?
    };

    let predictions = parse_predictions(&text)?;
    let report = AnalysisReport {
        result: score(&predictions),
        top_predictions: predictions.into_iter().take(5).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&input.display().to_string(), &report);
    }
    Ok(())
}

fn bar(value: f64) -> String {
    let filled = ((value.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn print_report(source: &str, report: &AnalysisReport) {
    let result = &report.result;
    println!("\n{}", source);
    println!("  Category:   {}", result.category);
    println!("  Confidence: {}%", result.confidence);
    println!("  {}", result.description);
    println!("  Tips:");
    for tip in &result.tips {
        println!("    - {}", tip);
    }
    println!("  Scores:");
    for (category, value) in result.scores.entries() {
        println!("    {:<11} {} {:>5.1}%", category.as_str(), bar(value), value * 100.0);
    }
    print_predictions(&report.top_predictions);
}

fn print_predictions(predictions: &[Prediction]) {
    if predictions.is_empty() {
        println!("  Model labels: none");
        return;
    }
    println!("  Model labels:");
    for prediction in predictions {
        println!("    {:>5.1}%  {}", prediction.score() * 100.0, prediction.label());
    }
}

fn print_history(history: &[ClassificationResult]) {
    println!("\nRecent results (newest first):");
    for (i, result) in history.iter().enumerate() {
        println!("  {}. {} ({}%)", i + 1, result.category, result.confidence);
    }
}
