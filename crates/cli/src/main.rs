// labmerge - merge lab result reports into one comparison table

mod config;
mod exit_codes;
mod merge;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::Log;

use config::ConfigCommands;
use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_INPUT, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};
use merge::MergeArgs;

#[derive(Parser)]
#[command(name = "labmerge")]
#[command(about = "Merge lab result reports into one table (CSV / Excel)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors and skip the summary line
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the log to FILE instead of stderr
    #[arg(long, global = true, value_name = "FILE", env = "LABMERGE_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every report in a directory (the default command)
    #[command(after_help = "\
Examples:
  labmerge merge
  labmerge merge reports/ --out-dir out/
  labmerge merge reports/ --format xlsx --name 2024-review
  labmerge merge reports/ --config labmerge.toml -v --log-file merge.log")]
    Merge(MergeArgs),

    /// Inspect or check the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// List the known section headers and their parameter prefixes
    Sections {
        /// TOML configuration file
        #[arg(long, short = 'c', env = "LABMERGE_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  labmerge-recon ", env!("CARGO_PKG_VERSION"),
        "\nbuild:   ", env!("BUILD_PROFILE"),
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Log target that reaches the log file only, never the console.
const FILE_ONLY: &str = "labmerge::file_only";

/// Console logger plus an optional log file that keeps debug detail
/// regardless of `-v`/`-q`.
struct TeeLogger {
    console: env_logger::Logger,
    file: Option<env_logger::Logger>,
}

impl Log for TeeLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.console.enabled(metadata)
            || self.file.as_ref().is_some_and(|file| file.enabled(metadata))
    }

    fn log(&self, record: &log::Record<'_>) {
        self.console.log(record);
        if let Some(file) = &self.file {
            file.log(record);
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            file.flush();
        }
    }
}

fn format_record(
    buf: &mut env_logger::fmt::Formatter,
    record: &log::Record<'_>,
) -> std::io::Result<()> {
    use std::io::Write;

    let style = buf.default_level_style(record.level());
    writeln!(buf, "{style}{}{style:#} - {}", record.level(), record.args())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool, log_file: Option<&PathBuf>) -> Result<(), CliError> {
    use env_logger::{Builder, Target, WriteStyle};
    use log::LevelFilter;

    let console_level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let console = Builder::new()
        .filter_level(console_level)
        .filter_module(FILE_ONLY, LevelFilter::Off)
        .format(format_record)
        .build();

    let file_level = console_level.max(LevelFilter::Debug);
    let file = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                CliError::output(format!("cannot create log file {}: {}", path.display(), e))
            })?;
            Some(
                Builder::new()
                    .filter_level(file_level)
                    .write_style(WriteStyle::Never)
                    .target(Target::Pipe(Box::new(file)))
                    .format(format_record)
                    .build(),
            )
        }
        None => None,
    };

    let max_level = if file.is_some() { file_level } else { console_level };
    log::set_boxed_logger(Box::new(TeeLogger { console, file }))
        .map_err(|e| CliError::general(format!("cannot install logger: {e}")))?;
    log::set_max_level(max_level);
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS });
        }
    };

    let result = init_logging(cli.verbose, cli.quiet, cli.log_file.as_ref()).and_then(|()| {
        match cli.command {
            None => merge::cmd_merge(MergeArgs::default(), cli.quiet),
            Some(Commands::Merge(args)) => merge::cmd_merge(args, cli.quiet),
            Some(Commands::Config { command }) => config::cmd_config(command),
            Some(Commands::Sections { config, json }) => config::cmd_sections(config, json),
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            log::error!(target: FILE_ONLY, "{}", message);
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
