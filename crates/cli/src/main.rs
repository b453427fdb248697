// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

mod vcd_trace;

use anyhow::Context;
use clap::{Parser, Subcommand};
use regen_config::{BenchScript, RegFileDescriptor};
use regen_core::{ApbConfig, ApbError, BenchReport, BenchRunner, ExpectationResult, StopReason};
use regen_ir::RegFile;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const RESULT_SCHEMA_VERSION: &str = "1.0";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Regen register file generator",
    long_about = None
)]
struct Cli {
    /// Enable debug-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the register file Verilog module (<rgf>.v)
    Verilog(GenerateArgs),

    /// Generate the module instantiation stub (<rgf>_inst.v)
    Inst(InstArgs),

    /// Generate the HTML documentation (<rgf>.html)
    Html(GenerateArgs),

    /// Generate the JSON field dictionary (<rgf>.json)
    Json(JsonArgs),

    /// Generate Rust accessor bindings (<rgf>.rs)
    Rust(GenerateArgs),

    /// Run a bench script against the behavioral register file model.
    Bench(BenchArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Path to the register file description (YAML)
    #[arg(short, long)]
    description: PathBuf,

    /// Output directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct InstArgs {
    #[command(flatten)]
    common: GenerateArgs,

    /// Append the stub to this file instead of writing <rgf>_inst.v
    #[arg(long)]
    append: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct JsonArgs {
    #[command(flatten)]
    common: GenerateArgs,

    /// Write the nested register mapping instead of the flat field dictionary
    #[arg(long)]
    nested: bool,
}

#[derive(Parser, Debug)]
struct BenchArgs {
    /// Path to the bench script (YAML)
    #[arg(short = 'c', long)]
    script: PathBuf,

    /// Override the register file description named by the script
    #[arg(short, long)]
    description: Option<PathBuf>,

    /// Override max cycles limit
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Write an APB waveform (VCD) to this file
    #[arg(long)]
    vcd: Option<PathBuf>,

    /// Directory to write test artifacts (result.json)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BenchResult {
    result_schema_version: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<BenchReport>,
    description_hash: String,
    config: BenchConfig,
}

#[derive(Debug, Serialize)]
struct BenchConfig {
    script: PathBuf,
    description: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level based on --trace flag
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    match cli.command {
        Commands::Verilog(args) => run_generate(&args, Artifact::Verilog),
        Commands::Inst(args) => run_inst(args),
        Commands::Html(args) => run_generate(&args, Artifact::Html),
        Commands::Json(args) => {
            let artifact = if args.nested {
                Artifact::NestedJson
            } else {
                Artifact::Json
            };
            run_generate(&args.common, artifact)
        }
        Commands::Rust(args) => run_generate(&args, Artifact::Rust),
        Commands::Bench(args) => run_bench(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Artifact {
    Verilog,
    Instance,
    Html,
    Json,
    NestedJson,
    Rust,
}

impl Artifact {
    fn file_name(self, rgf: &str) -> String {
        match self {
            Artifact::Verilog => format!("{}.v", rgf),
            Artifact::Instance => format!("{}_inst.v", rgf),
            Artifact::Html => format!("{}.html", rgf),
            Artifact::Json | Artifact::NestedJson => format!("{}.json", rgf),
            Artifact::Rust => format!("{}.rs", rgf),
        }
    }

    /// Provenance header, or `None` for formats without comments.
    fn header(self, source: &Path, hash: &str) -> Option<String> {
        let text = format!(
            "Generated by regen from {} (sha256 {}). Do not edit.",
            source.display(),
            hash
        );
        match self {
            Artifact::Verilog | Artifact::Instance | Artifact::Rust => {
                Some(format!("// {}\n\n", text))
            }
            Artifact::Html => Some(format!("<!-- {} -->\n", text)),
            Artifact::Json | Artifact::NestedJson => None,
        }
    }

    fn render(self, rgf: &RegFile) -> anyhow::Result<String> {
        Ok(match self {
            Artifact::Verilog => regen_codegen::render_verilog(rgf),
            Artifact::Instance => regen_codegen::render_instance(rgf),
            Artifact::Html => regen_codegen::render_html(rgf),
            Artifact::Json => rgf
                .field_dictionary()
                .to_json()
                .context("Failed to serialize field dictionary")?,
            Artifact::NestedJson => serde_json::to_string_pretty(&rgf.to_mapping())
                .context("Failed to serialize register mapping")?,
            Artifact::Rust => regen_codegen::render_rust(rgf)?,
        })
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Loads and checks a description, returning the model and the digest of the file.
fn load_description(path: &Path) -> anyhow::Result<(RegFile, String)> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read register file description {:?}", path))?;
    let descriptor = RegFileDescriptor::from_yaml(&yaml)?;
    let rgf = descriptor.to_regfile()?;
    info!(
        "Loaded register file '{}' ({} registers, {}-bit address)",
        rgf.name(),
        rgf.registers().len(),
        rgf.address_width()
    );
    Ok((rgf, sha256_hex(yaml.as_bytes())))
}

fn rendered(artifact: Artifact, description: &Path) -> Result<(RegFile, String), ExitCode> {
    let (rgf, hash) = match load_description(description) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{:#}", e);
            return Err(ExitCode::from(EXIT_CONFIG_ERROR));
        }
    };
    let body = match artifact.render(&rgf) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to render {:?}: {:#}", artifact, e);
            return Err(ExitCode::from(EXIT_RUNTIME_ERROR));
        }
    };
    let text = match artifact.header(description, &hash) {
        Some(header) => header + &body,
        None => body,
    };
    Ok((rgf, text))
}

fn write_artifact(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))
}

fn run_generate(args: &GenerateArgs, artifact: Artifact) -> ExitCode {
    let (rgf, text) = match rendered(artifact, &args.description) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let path = args.out_dir.join(artifact.file_name(rgf.name()));
    match write_artifact(&path, &text) {
        Ok(()) => {
            info!("Wrote {:?}", path);
            ExitCode::from(EXIT_PASS)
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn run_inst(args: InstArgs) -> ExitCode {
    let Some(target) = &args.append else {
        return run_generate(&args.common, Artifact::Instance);
    };
    let (_, text) = match rendered(Artifact::Instance, &args.common.description) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let appended = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(target)
        .and_then(|mut f| writeln!(f, "\n{}", text));
    match appended {
        Ok(()) => {
            info!("Appended instance to {:?}", target);
            ExitCode::from(EXIT_PASS)
        }
        Err(e) => {
            error!("Failed to append to {:?}: {}", target, e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn run_bench(args: BenchArgs) -> ExitCode {
    let mut script = match BenchScript::from_file(&args.script) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("{:#}", e);
            error!("{}", msg);
            write_result(&args, None, String::new(), "config_error", Some(msg), None);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    if let Some(max_cycles) = args.max_cycles {
        script.limits.max_cycles = max_cycles;
    }

    let description = args
        .description
        .clone()
        .unwrap_or_else(|| script.description_path(&args.script));
    let (rgf, hash) = match load_description(&description) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{:#}", e);
            error!("{}", msg);
            write_result(
                &args,
                Some(&description),
                String::new(),
                "config_error",
                Some(msg),
                None,
            );
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut runner = match BenchRunner::new(&script, &rgf) {
        Ok(r) => r,
        Err(e) => {
            error!("{}", e);
            write_result(
                &args,
                Some(&description),
                hash,
                "config_error",
                Some(e.to_string()),
                None,
            );
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    if let Some(vcd_path) = &args.vcd {
        let config = ApbConfig {
            address_width: script.bus.address_width,
            data_width: script.bus.data_width,
        };
        match vcd_trace::VcdObserver::new(vcd_path.clone(), config, script.clock_period_ns) {
            Ok(observer) => {
                info!("Tracing APB bus to {:?}", vcd_path);
                runner.add_observer(Arc::new(observer));
            }
            Err(e) => {
                error!("Failed to create VCD file {:?}: {:#}", vcd_path, e);
                return ExitCode::from(EXIT_RUNTIME_ERROR);
            }
        }
    }

    let report = match runner.run() {
        Ok(report) => report,
        Err(e) => {
            let (status, code) = match &e {
                ApbError::Lookup(_) | ApbError::BusWidth { .. } => {
                    ("config_error", EXIT_CONFIG_ERROR)
                }
                _ => ("error", EXIT_RUNTIME_ERROR),
            };
            error!("Bench aborted: {}", e);
            write_result(
                &args,
                Some(&description),
                hash,
                status,
                Some(e.to_string()),
                None,
            );
            return ExitCode::from(code);
        }
    };

    log_report(&report);
    let (status, code) = if report.passed {
        ("pass", EXIT_PASS)
    } else {
        ("fail", EXIT_ASSERT_FAIL)
    };
    write_result(&args, Some(&description), hash, status, None, Some(report));
    ExitCode::from(code)
}

fn log_report(report: &BenchReport) {
    info!(
        "Bench '{}' finished: {} cycles, {} ns, {} transactions, stop reason {:?}",
        report.regfile,
        report.cycles,
        report.time_ns,
        report.transactions.len(),
        report.stop_reason
    );
    for ExpectationResult {
        field,
        expected,
        actual,
        passed,
        ..
    } in &report.expectations
    {
        if *passed {
            info!("  PASS {} == {:#x}", field, expected);
        } else {
            error!("  FAIL {}: expected {:#x}, got {:?}", field, expected, actual);
        }
    }
    for failure in &report.failures {
        error!("  {}", failure);
    }
    if report.stop_reason == StopReason::MaxCycles {
        error!("  max_cycles reached before the script finished");
    }
}

fn write_result(
    args: &BenchArgs,
    description: Option<&PathBuf>,
    description_hash: String,
    status: &str,
    message: Option<String>,
    report: Option<BenchReport>,
) {
    let Some(output_dir) = &args.output_dir else {
        return;
    };
    if let Err(e) = std::fs::create_dir_all(output_dir) {
        error!("Failed to create output directory {:?}: {}", output_dir, e);
        return;
    }

    let result = BenchResult {
        result_schema_version: RESULT_SCHEMA_VERSION.to_string(),
        status: status.to_string(),
        message,
        report,
        description_hash,
        config: BenchConfig {
            script: args.script.clone(),
            description: description.cloned(),
        },
    };

    let result_path = output_dir.join("result.json");
    match std::fs::File::create(&result_path) {
        Ok(f) => {
            if let Err(e) = serde_json::to_writer_pretty(f, &result) {
                error!("Failed to write result.json: {}", e);
            }
        }
        Err(e) => error!("Failed to create result.json: {}", e),
    }
}
