//! Placement Predictor CLI Module
//!
//! Command-line interface for training, one-off prediction, inspection and serving.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::pipeline::PlacementPipeline;
use crate::schema::StudentProfile;
use crate::training::{TrainEngine, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString    { s.truecolor(235, 100, 100) }

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
#[command(name = "placement")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Student placement predictor: train a pipeline and serve predictions")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the pipeline on a placement CSV and write the artifact
    Train {
        /// Raw placement data (CSV with header)
        #[arg(short, long)]
        data: PathBuf,

        /// Output artifact file
        #[arg(short, long, default_value = "placement_pipeline.bin")]
        output: PathBuf,

        /// Training configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Predict the outcome for one student
    Predict {
        /// Trained artifact file
        #[arg(short, long, default_value = "placement_pipeline.bin")]
        model: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Show artifact metadata
    Inspect {
        /// Trained artifact file
        #[arg(short, long, default_value = "placement_pipeline.bin")]
        model: PathBuf,
    },

    /// Start the web form and JSON API
    Serve {
        /// Trained artifact file
        #[arg(short, long, env = "PLACEMENT_MODEL")]
        model: Option<PathBuf>,

        /// Server host
        #[arg(long, env = "PLACEMENT_HOST")]
        host: Option<String>,

        /// Server port
        #[arg(short, long, env = "PLACEMENT_PORT")]
        port: Option<u16>,
    },
}

/// The twelve applicant fields
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Male | Female
    #[arg(long)]
    pub gender: String,
    /// Secondary school percentage
    #[arg(long)]
    pub ssc_p: f64,
    /// Central | Others
    #[arg(long)]
    pub ssc_b: String,
    /// Higher secondary percentage
    #[arg(long)]
    pub hsc_p: f64,
    /// Central | Others
    #[arg(long)]
    pub hsc_b: String,
    /// Science | Commerce | Arts
    #[arg(long)]
    pub hsc_s: String,
    /// Degree percentage
    #[arg(long)]
    pub degree_p: f64,
    /// Sci&Tech | Comm&Mgmt | Others
    #[arg(long)]
    pub degree_t: String,
    /// Yes | No
    #[arg(long)]
    pub workex: String,
    /// Employability test percentage
    #[arg(long)]
    pub etest_p: f64,
    /// Mkt&HR | Mkt&Fin
    #[arg(long)]
    pub specialisation: String,
    /// MBA percentage
    #[arg(long)]
    pub mba_p: f64,
}

impl From<ProfileArgs> for StudentProfile {
    fn from(args: ProfileArgs) -> Self {
        StudentProfile {
            gender: args.gender,
            ssc_p: args.ssc_p,
            ssc_b: args.ssc_b,
            hsc_p: args.hsc_p,
            hsc_b: args.hsc_b,
            hsc_s: args.hsc_s,
            degree_p: args.degree_p,
            degree_t: args.degree_t,
            workex: args.workex,
            etest_p: args.etest_p,
            specialisation: args.specialisation,
            mba_p: args.mba_p,
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data_path: &Path, output: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    section("Train");

    let config = match config_path {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => TrainingConfig::default(),
    };

    step_run(&format!("Fitting on {}", data_path.display()));
    let start = Instant::now();
    let engine = TrainEngine::new(config);
    let (pipeline, report) = engine.run(data_path, output)?;
    step_done(&format!("{:.2?}", start.elapsed()));

    println!();
    row("Rows", report.n_rows);
    row("Train / test", format!("{} / {}", report.n_train, report.n_test));
    for (label, count) in &report.class_counts {
        let name = if *label == 1 { "Placed" } else { "Not placed" };
        row(name, count);
    }
    row("Features", pipeline.transformer().n_output_features());
    println!(
        "  {:<18} {}",
        muted("Train accuracy"),
        format!("{:.4}", report.train_accuracy).white().bold()
    );
    println!(
        "  {:<18} {}",
        muted("Test accuracy"),
        format!("{:.4}", report.test_accuracy).white().bold()
    );
    println!();
    println!("  {} {}", ok("✓"), format!("saved {}", output.display()));
    println!();

    Ok(())
}

pub fn cmd_predict(model_path: &Path, profile: StudentProfile) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading pipeline");
    let pipeline = PlacementPipeline::load(model_path)?;
    step_done(&model_path.display().to_string());

    let (placement, probability) = pipeline.predict_one_with_proba(&profile)?;

    println!();
    if placement.is_placed() {
        println!("  {}", ok(placement.message()).bold());
    } else {
        println!("  {}", bad(placement.message()).bold());
    }
    row("P(placed)", format!("{:.4}", probability));
    println!();

    Ok(())
}

pub fn cmd_inspect(model_path: &Path) -> anyhow::Result<()> {
    section("Inspect");

    let pipeline = PlacementPipeline::load(model_path)?;
    let meta = pipeline
        .metadata()
        .ok_or_else(|| anyhow::anyhow!("artifact carries no metadata"))?;

    row("Name", &meta.name);
    row("Model", &meta.model_type);
    row("Written by", format!("v{}", meta.crate_version));
    row("Trained at", &meta.trained_at);
    row("Target", &meta.target_name);
    row("Inputs", meta.input_columns.join(", "));

    section("Hyperparameters");
    for (key, value) in &meta.hyperparameters {
        row(key, value);
    }

    section("Metrics");
    for (key, value) in &meta.metrics {
        row(key, format!("{:.4}", value));
    }

    section("Features");
    for name in &meta.feature_names {
        println!("  {}", dim(name));
    }
    println!();

    Ok(())
}

pub async fn cmd_serve(
    model: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let mut config = ServerConfig::default();
    if let Some(model) = model {
        config = config.with_model_path(model);
    }
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Placement Predictor".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Form   ", &format!("http://{}:{}", config.host, config.port)));
    line_box(&kv("API    ", &format!("http://{}:{}/api/predict", config.host, config.port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", config.host, config.port)));
    line_box(&kv("Model  ", &config.model_path.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}
