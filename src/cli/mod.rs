//! stock-ann CLI Module
//!
//! Command-line interface for training, prediction, evaluation and serving.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::lifecycle::{LifecycleConfig, ModelLifecycle, TrainParams};
use crate::registry::{ModelMetadata, RegistryEntry};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn row(key: &str, val: impl std::fmt::Display) {
    println!("  {:<18} {}", muted(key), val.to_string().white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "stock-ann")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve a feed-forward regressor on OHLCV data")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model on a CSV file
    Train {
        /// Input CSV (header row, date column, numeric features, target last)
        #[arg(short, long)]
        data: PathBuf,

        /// Number of training epochs
        #[arg(short, long, default_value = "50")]
        epochs: usize,

        /// Mini-batch size
        #[arg(short, long, default_value = "32")]
        batch_size: usize,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_split: f64,

        /// Target column (defaults to the last non-date column)
        #[arg(short, long)]
        target: Option<String>,

        /// Write the trained model to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Comma-separated feature values to predict after training
        #[arg(short, long)]
        predict: Option<String>,
    },

    /// Predict with a saved model
    Predict {
        /// Saved model file
        #[arg(short, long)]
        model: PathBuf,

        /// Comma-separated feature values
        #[arg(short, long)]
        features: String,
    },

    /// Evaluate a saved model on a CSV file
    Evaluate {
        /// Saved model file
        #[arg(short, long)]
        model: PathBuf,

        /// Input CSV with the training columns
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Show the metadata of a saved model
    Info {
        /// Saved model file
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Server port
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Server host
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

/// Parse `"1.0, 2.5,3"` into feature values
pub fn parse_features(input: &str) -> anyhow::Result<Vec<f64>> {
    input
        .split(',')
        .map(|v| {
            let v = v.trim();
            v.parse::<f64>()
                .with_context(|| format!("'{}' is not a number", v))
        })
        .collect()
}

fn load_model(path: &Path) -> anyhow::Result<ModelLifecycle> {
    let entry = RegistryEntry::load(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;
    let lifecycle = ModelLifecycle::new(LifecycleConfig::from_env());
    lifecycle.install(entry);
    Ok(lifecycle)
}

fn print_metadata(meta: &ModelMetadata) {
    row("Model", &meta.model_id);
    row("Created", meta.created_at.to_rfc3339());
    row("Features", meta.feature_names.join(", "));
    row("Target", &meta.target_name);
    row("Samples", format!("{} train / {} test", meta.training_samples, meta.test_samples));
    row("Epochs", meta.epochs);
    row("Batch size", meta.batch_size);
    row("Training loss", format!("{:.4}", meta.training_loss));
    row("Training MAE", format!("{:.4}", meta.training_mae));
    row("Test loss", format!("{:.4}", meta.loss));
    row("Test MAE", format!("{:.4}", meta.mae));
}

// ─── Commands ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_train(
    data_path: &Path,
    epochs: usize,
    batch_size: usize,
    test_split: f64,
    target: Option<&str>,
    output: Option<&Path>,
    predict: Option<&str>,
) -> anyhow::Result<()> {
    section("Train");

    let mut config = LifecycleConfig::from_env();
    if let Some(target) = target {
        config.preprocessing.target_column = Some(target.to_string());
    }
    let lifecycle = ModelLifecycle::new(config);

    step_run("Loading data");
    let start = Instant::now();
    let bytes = std::fs::read(data_path)
        .with_context(|| format!("Failed to read {}", data_path.display()))?;
    step_done(&format!("{} bytes in {:?}", bytes.len(), start.elapsed()));

    step_run(&format!("Training for {} epochs", epochs.to_string().cyan()));
    let summary = lifecycle.train(&bytes, TrainParams::new(epochs, batch_size, test_split))?;
    step_done(&format!("{:.2}s", summary.training_time));

    println!();
    row("Model", &summary.model_id);
    row("Data shape", format!("{} × {}", summary.data_shape.0, summary.data_shape.1));
    row("Samples", format!("{} train / {} test", summary.train_samples, summary.test_samples));
    println!("  {:<18} {}", muted("Test loss"), format!("{:.4}", summary.loss).white().bold());
    println!("  {:<18} {}", muted("Test MAE"), format!("{:.4}", summary.mae).white().bold());

    if let Some(path) = output {
        lifecycle.export(path)?;
        row("Saved to", path.display());
    }

    if let Some(features) = predict {
        let features = parse_features(features)?;
        let outcome = lifecycle.predict(&features)?;
        println!("  {:<18} {}", muted("Prediction"), format!("{:.4}", outcome.prediction).green().bold());
    }

    println!();
    Ok(())
}

pub fn cmd_predict(model_path: &Path, features: &str) -> anyhow::Result<()> {
    section("Predict");

    let lifecycle = load_model(model_path)?;
    let features = parse_features(features)?;
    let outcome = lifecycle.predict(&features)?;

    row("Model", &outcome.model_id);
    println!("  {:<18} {}", muted("Prediction"), format!("{:.4}", outcome.prediction).green().bold());
    println!();
    Ok(())
}

pub fn cmd_evaluate(model_path: &Path, data_path: &Path) -> anyhow::Result<()> {
    section("Evaluate");

    let lifecycle = load_model(model_path)?;
    let bytes = std::fs::read(data_path)
        .with_context(|| format!("Failed to read {}", data_path.display()))?;

    step_run("Scoring");
    let outcome = lifecycle.evaluate(&bytes)?;
    step_done(&format!("{} rows", outcome.test_samples));

    println!();
    row("Model", &outcome.model_id);
    println!("  {:<18} {}", muted("Loss"), format!("{:.4}", outcome.loss).white().bold());
    println!("  {:<18} {}", muted("MAE"), format!("{:.4}", outcome.mae).white().bold());
    println!();
    Ok(())
}

pub fn cmd_info(model_path: &Path) -> anyhow::Result<()> {
    section("Model Info");

    let lifecycle = load_model(model_path)?;
    print_metadata(&lifecycle.info()?);
    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "stock-ann".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("API    ", &format!("http://{}:{}", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig::default().with_host(host).with_port(port);
    run_server(config, LifecycleConfig::from_env()).await
}
