//! PressTest CLI - certificate generation from JSON drafts
//!
//! Commands: profiles, validate, render
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when the draft is incomplete

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use presstest_core::{
    GeneratorConfig, PipelineError, ProfileRegistry, ReportDraft, ReportPipeline, Strings,
    SystemClock,
};

#[derive(Parser)]
#[command(name = "presstest-cli")]
#[command(about = "PressTest CLI - Pressure Test Certificate Generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON generator config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List available report profiles
    Profiles,

    /// Check a draft for missing sections
    Validate {
        /// Draft JSON file
        #[arg(short, long)]
        draft: PathBuf,

        /// Profile ID (overrides the config)
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Render a complete draft to PDF
    Render {
        /// Draft JSON file
        #[arg(short, long)]
        draft: PathBuf,

        /// Output directory (overrides the config)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Profile ID (overrides the config)
        #[arg(short, long)]
        profile: Option<String>,
    },
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

fn fail(key: &str, error: impl std::fmt::Display) -> ExitCode {
    print_json(&serde_json::json!({ (key): false, "error": error.to_string() }));
    ExitCode::FAILURE
}

fn build_pipeline(config: &GeneratorConfig, profile_id: Option<String>) -> Result<ReportPipeline, String> {
    let registry = ProfileRegistry::load_from_dir(&config.profiles_dir)
        .map_err(|e| format!("Failed to load profiles: {}", e))?;
    let id = profile_id.unwrap_or_else(|| config.profile.clone());
    let profile = registry
        .get(&id)
        .cloned()
        .ok_or_else(|| format!("Unknown profile: {}", id))?;
    let page = config.page_spec().map_err(|e| e.to_string())?;
    Ok(ReportPipeline::new(profile)
        .with_page(page)
        .with_logo(config.load_logo()))
}

fn load_draft(path: &Path, today: chrono::NaiveDate) -> Result<presstest_core::ReportBuilder, String> {
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    ReportDraft::load(path)
        .and_then(|draft| draft.into_builder(base_dir, today, &SystemClock))
        .map_err(|e| format!("Invalid draft: {}", e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => match GeneratorConfig::load(path) {
            Ok(c) => c,
            Err(e) => return fail("success", e),
        },
        None => GeneratorConfig::default(),
    };
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Profiles => {
            let registry = match ProfileRegistry::load_from_dir(&config.profiles_dir) {
                Ok(r) => r,
                Err(e) => return fail("success", format!("Failed to load profiles: {}", e)),
            };
            let profiles: Vec<_> = registry.list().into_iter().cloned().collect();
            print_json(&serde_json::json!(profiles));
            ExitCode::SUCCESS
        }

        Commands::Validate { draft, profile } => {
            let pipeline = match build_pipeline(&config, profile) {
                Ok(p) => p,
                Err(e) => return fail("valid", e),
            };
            let builder = match load_draft(&draft, today) {
                Ok(b) => b,
                Err(e) => return fail("valid", e),
            };

            let result = pipeline.validate(&builder);
            let strings = Strings::for_language(config.operator_language);
            print_json(&serde_json::json!({
                "valid": result.valid,
                "missing": result.missing_sections(),
                "labels": result.missing_labels(strings),
                "message": result.prompt(strings),
                "violations": result.violations,
            }));
            if result.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Render { draft, out, profile } => {
            let pipeline = match build_pipeline(&config, profile) {
                Ok(p) => p,
                Err(e) => return fail("success", e),
            };
            let builder = match load_draft(&draft, today) {
                Ok(b) => b,
                Err(e) => return fail("success", e),
            };

            let report = match pipeline.generate(&builder, today) {
                Ok(r) => r,
                Err(PipelineError::Incomplete { missing, validation }) => {
                    let strings = Strings::for_language(config.operator_language);
                    print_json(&serde_json::json!({
                        "success": false,
                        "missing": missing,
                        "labels": validation.missing_labels(strings),
                        "message": validation.prompt(strings),
                    }));
                    return ExitCode::from(2);
                }
                Err(e) => return fail("success", e),
            };

            let out_dir = out.unwrap_or(config.output_dir);
            let file = out_dir.join(&report.filename);
            if let Err(e) = fs::create_dir_all(&out_dir).and_then(|_| fs::write(&file, &report.pdf)) {
                return fail("success", format!("Failed to write {}: {}", file.display(), e));
            }

            print_json(&serde_json::json!({
                "success": true,
                "file": file,
                "sha256": report.pdf_sha256,
                "record_hash": report.record_hash,
                "pages": report.page_count,
            }));
            ExitCode::SUCCESS
        }
    }
}
