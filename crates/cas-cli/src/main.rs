//! cas - sharpen and resize images on the GPU, or resample on the CPU.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cas_core::Precision;

mod pipeline;

use pipeline::{Mode, ProcessingRequest, Processor};

#[derive(Parser)]
#[command(name = "cas")]
#[command(version, about = "Resize and sharpen images on the GPU")]
#[command(after_help = "\
Examples:
  cas in.png out.png                                # sharpen at native size
  cas --scale 1920 1080 --sharpness 0.5 in.png out.jpg
  cas --mode cubic --scale 640 480 in.tif out.tif
  cas --fp16 --sharpness 1 a.png a2.png b.png b2.png

Supported outputs: BMP, PNG, ICO, JPG, TIF, GIF (DDS and WMP are read-only).")]
struct Cli {
    /// Fixed destination size; defaults to the source size
    #[arg(
        long,
        num_args = 2,
        value_names = ["WIDTH", "HEIGHT"],
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    scale: Option<Vec<u32>>,

    /// Interpolation mode; cas is the GPU sharpen-and-resize kernel
    #[arg(long, value_enum, default_value = "cas", ignore_case = true)]
    mode: Mode,

    /// Sharpening strength for cas mode, between 0 and 1 (not range-checked)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    sharpness: f32,

    /// Use a 16-bit float working format instead of 8-bit
    #[arg(long)]
    fp16: bool,

    /// Treat input and output as linear instead of display-encoded.
    /// Has no effect when --fp16 is set.
    #[arg(long)]
    linear: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Alternating source and destination file pairs
    #[arg(value_name = "SRC DST")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.files.is_empty() {
        let _ = Cli::command().print_help();
        return ExitCode::from(1);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), pipeline::Error> {
    let pairs = pipeline::pair_files(&cli.files)?;
    let dst_size = cli.scale.as_ref().map(|s| (s[0], s[1]));
    let precision = if cli.fp16 {
        Precision::Extended
    } else {
        Precision::Standard
    };

    let requests: Vec<ProcessingRequest> = pairs
        .into_iter()
        .map(|(src, dst)| ProcessingRequest {
            src,
            dst,
            mode: cli.mode,
            dst_size,
            sharpness: cli.sharpness,
            precision,
            linear: cli.linear,
        })
        .collect();

    Processor::new().process(&requests)
}
