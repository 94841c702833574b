//! `labmerge merge` — discover reports, merge them, write the tables.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use clap::{Args, ValueEnum};
use labmerge_io::{csv, discover, json, source, xlsx};
use labmerge_recon::diagnostics::CountingSink;
use labmerge_recon::{build_report, run, LogSink, ReportOptions, SourceInput};

use crate::config::load_config;
use crate::CliError;

#[derive(Args, Default)]
pub struct MergeArgs {
    /// Directory holding the lab reports [default: current directory]
    pub dir: Option<PathBuf>,

    /// TOML configuration file (see `labmerge config default`)
    #[arg(long, short = 'c', env = "LABMERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where to write the reports [default: the input directory]
    #[arg(long, short = 'o')]
    pub out_dir: Option<PathBuf>,

    /// Output base name, without extension [default: <prefix>_YYMMDD_HHMMSS]
    #[arg(long)]
    pub name: Option<String>,

    /// Output format; repeat for several [default: csv and xlsx]
    #[arg(long, short = 'f', value_enum)]
    pub format: Vec<OutputFormat>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Xlsx,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }
}

/// `<prefix>_%y%m%d_%H%M%S`
pub fn report_base_name(prefix: &str, at: NaiveDateTime) -> String {
    format!("{}_{}", prefix, at.format("%y%m%d_%H%M%S"))
}

/// Requested formats in first-mention order, without repeats.
fn resolve_formats(requested: &[OutputFormat]) -> Vec<OutputFormat> {
    if requested.is_empty() {
        return vec![OutputFormat::Csv, OutputFormat::Xlsx];
    }
    let mut formats = Vec::with_capacity(requested.len());
    for f in requested {
        if !formats.contains(f) {
            formats.push(*f);
        }
    }
    formats
}

pub fn cmd_merge(args: MergeArgs, quiet: bool) -> Result<(), CliError> {
    log_startup();

    let config = load_config(args.config.as_deref())?;
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    let out_dir = args.out_dir.unwrap_or_else(|| dir.clone());

    // 1. Discover and read inputs
    let sources = discover::discover_inputs(&dir, &config.input_extensions)
        .map_err(CliError::input)?;
    if sources.is_empty() {
        log::warn!(
            "no input files with extension {} found in {}; writing an empty report",
            config.input_extensions.join("/"),
            dir.display()
        );
    }

    let mut inputs = Vec::with_capacity(sources.len());
    for source in sources {
        log::info!("processing file {}", source.id);
        let lines = source::read_lines(Path::new(&source.id)).map_err(CliError::input)?;
        inputs.push(SourceInput { source, lines });
    }

    // 2. Parse + merge
    let mut sink = CountingSink::new(LogSink);
    let output = run(&config, &inputs, &mut sink).map_err(|e| CliError::config(e.to_string()))?;
    let report = build_report(&output.table, &ReportOptions::from_config(&config));

    // 3. Write every requested format
    std::fs::create_dir_all(&out_dir).map_err(|e| {
        CliError::output(format!("cannot create {}: {}", out_dir.display(), e))
    })?;
    let base = args
        .name
        .unwrap_or_else(|| report_base_name(&config.report_name_prefix, Local::now().naive_local()));

    let mut written = Vec::new();
    for format in resolve_formats(&args.format) {
        let path = out_dir.join(format!("{}.{}", base, format.extension()));
        log::info!("writing report to {}", path.display());
        let result = match format {
            OutputFormat::Csv => csv::write_report(&report, &path),
            OutputFormat::Xlsx => xlsx::write_report(&report, &path),
            OutputFormat::Json => json::write_table(&output.table, &path),
        };
        result.map_err(CliError::output)?;
        written.push(path);
    }

    // 4. Summary
    let summary = &output.summary;
    if args.json {
        let value = serde_json::json!({
            "summary": summary,
            "warnings": sink.warnings,
            "errors": sink.errors,
            "outputs": written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    }
    if !quiet {
        eprintln!("merged {}", summary);
        if summary.conflicts > 0 {
            eprintln!(
                "  {} field conflict(s) marked {:?}; see the log for details",
                summary.conflicts, config.conflict_marker
            );
        }
    }

    Ok(())
}

fn log_startup() {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string());
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown-user".to_string());
    log::info!(
        "labmerge {} started on {} at {} running as {}",
        env!("CARGO_PKG_VERSION"),
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        host,
        user
    );
}
