use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wrapgen::build::{self, WrapOptions};
use wrapgen::codegen::{Backend, DefaultArgs};

/// Generate pybind11 binding modules from interface files.
#[derive(Parser, Debug)]
#[command(name = "wrapgen", version)]
struct Cli {
    /// Interface files or glob patterns (`*.i`, `*.h`, `*.idl`)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory receiving `<module>.cpp`
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Module name; defaults to the file stem (single input only)
    #[arg(short, long)]
    module_name: Option<String>,

    /// Target backend
    #[arg(long, default_value = "pybind11")]
    backend: String,

    /// Class declared outside the inputs, e.g. `gtsam::Pose3` (repeatable)
    #[arg(long = "extern", value_name = "QUALIFIED")]
    externs: Vec<String>,

    /// Emit one overload per omitted trailing default instead of inline defaults
    #[arg(long)]
    expand_defaults: bool,

    /// Debug logging (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(mut backend) = Backend::named(&cli.backend) else {
        eprintln!("error: unknown backend '{}'", cli.backend);
        return ExitCode::FAILURE;
    };
    if cli.expand_defaults {
        backend = backend.with_default_args(DefaultArgs::Expand);
    }
    let options = WrapOptions {
        module_name: cli.module_name,
        backend,
        externs: cli.externs,
    };

    let globs: Vec<&str> = cli.inputs.iter().map(String::as_str).collect();
    let result = build::build(&globs, &options);
    for error in &result.build_errors {
        eprintln!("{error}");
    }

    match build::write_outputs(&result, &cli.out_dir) {
        Ok(written) => {
            for path in &written {
                log::info!("wrote {}", path.display());
            }
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }

    if result.build_errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
