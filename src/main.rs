use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use wav_loop_batch::{BatchOptions, WavReport, find_wav_files, inspect, set_batch_loop_points};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// input WAV file or directory
    input: PathBuf,

    /// output directory, default to override input audios
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// loop start in seconds, default to the first sample
    #[arg(long)]
    start: Option<f64>,

    /// loop end in seconds, default to the last sample
    #[arg(long)]
    end: Option<f64>,

    /// number of threads to use, default to CPU core count
    #[arg(short, long)]
    threads: Option<usize>,

    /// print chunk layout and loop points instead of editing
    #[arg(long)]
    inspect: bool,
}

fn print_report(report: &WavReport) {
    println!("{}", report.path.display());
    println!(
        "  size: {} bytes (RIFF size field {})",
        report.file_len, report.declared_size
    );
    match report.format {
        Some(f) => println!(
            "  format: tag {}, {} channel(s), {} Hz",
            f.format_tag, f.channels, f.sample_rate
        ),
        None => println!("  format: missing \"fmt \" chunk"),
    }
    for chunk in &report.chunks {
        println!(
            "  {:>10}  {:?}  {} bytes",
            chunk.header_offset(),
            chunk.id_str(),
            chunk.size
        );
    }
    match (&report.sampler, report.loop_seconds()) {
        (Some(s), Some((start, end))) => {
            for (i, (a, b)) in s.loops.iter().enumerate() {
                println!("  loop {}: samples {}..={}", i, a, b);
            }
            println!("  first loop: {:.3}s..{:.3}s", start, end);
        }
        (Some(s), None) => println!("  loops: {:?}", s.loops),
        (None, _) => println!("  loops: none"),
    }
}

fn main() -> Result<()> {
    _ = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .parse_filters("symphonia=error")
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();

    if cli.inspect {
        for path in find_wav_files(&cli.input) {
            match inspect(&path) {
                Ok(report) => print_report(&report),
                Err(e) => error!("{}", e),
            }
        }
        return Ok(());
    }

    // --- Configuration ---
    let options = BatchOptions {
        input: cli.input,
        output_dir: cli.output,
        start_seconds: cli.start,
        end_seconds: cli.end,
        num_threads: cli.threads,
    };

    info!("Setting loop points with options:");
    info!("  Input: {:?}", options.input);
    info!("  Output Directory: {:?}", options.output_dir);
    match options.start_seconds {
        Some(s) => info!("  Loop Start: {}s", s),
        None => info!("  Loop Start: first sample"),
    }
    match options.end_seconds {
        Some(s) => info!("  Loop End: {}s", s),
        None => info!("  Loop End: last sample"),
    }
    if let Some(n) = options.num_threads {
        info!("  Threads: {}", n);
    } else {
        info!("  Threads: Default");
    }
    info!("---");

    match set_batch_loop_points(&options) {
        Ok(_) => {
            info!("Loop points written successfully!");
            Ok(())
        }
        Err(e) => {
            error!("Setting loop points failed: {}", e);
            Err(e)?
        }
    }
}
