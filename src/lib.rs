/// Module for orchestrating loop point edits
pub mod editor;
/// Module for error handling
pub mod error;
/// Module for reading the `fmt ` chunk
pub mod format;
/// Module for converting loop times to sample indices
pub mod loop_points;
/// Module for rebuilding a container around a new sampler chunk
pub mod mutate;
/// Module for walking RIFF chunks
pub mod riff;
/// Module for the `smpl` chunk layout
pub mod sampler;
/// Module for saving audio files
pub mod save;

pub use crate::editor::{
    LoopEditor, SampleCounter, SymphoniaSampleCounter, WavReport, inspect, set_loop_points,
};
pub use crate::error::{ArgumentError, Error, FormatError, SampleCountError};
pub use crate::format::FormatInfo;
pub use crate::loop_points::LoopSpec;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of the files the batch driver picks up, compared case-insensitively.
pub const WAV_EXTENSION: &str = "wav";

/// Configuration options for a batch loop point run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// A WAV file, or a directory searched recursively for WAV files
    pub input: PathBuf,
    /// Output directory mirroring the input tree. If not set, override the files in place.
    pub output_dir: Option<PathBuf>,
    /// Loop start in seconds, default to the first sample
    pub start_seconds: Option<f64>,
    /// Loop end in seconds, default to the last sample
    pub end_seconds: Option<f64>,
    /// Number of threads for parallel processing
    pub num_threads: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            input: PathBuf::from("."),
            output_dir: None,
            start_seconds: None,
            end_seconds: None,
            num_threads: None,
        }
    }
}

/// Writes loop points into every WAV file under `options.input`
pub fn set_batch_loop_points(options: &BatchOptions) -> Result<(), Error> {
    // Configure Rayon thread pool size if specified
    match options.num_threads {
        Some(num_threads) if num_threads > 0 => {
            let rayon_init_result = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global();
            if let Err(e) = rayon_init_result {
                warn!(
                    "Failed to configure Rayon thread pool: {}. Using default number of threads.",
                    e
                );
            } else {
                info!("Using {} threads for processing.", num_threads);
            }
        }
        _ => info!("Using default number of threads."),
    }

    // 1. Validate options
    validate_options(options)?;

    // 2. Discover audio files
    info!("Discovering WAV files in {:?}...", options.input);
    let wav_files = find_wav_files(&options.input);
    if wav_files.is_empty() {
        info!("No WAV files found.");
        return Ok(());
    }
    info!("Found {} WAV files.", wav_files.len());

    let input_base_dir = if options.input.is_dir() {
        options.input.as_path()
    } else {
        options.input.parent().unwrap_or(Path::new(""))
    };

    // 3. Process all files
    let process_pb = ProgressBar::new(wav_files.len() as u64);
    process_pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}").expect("Internal Error: Failed to set progress bar style")
        .progress_chars("#>-"));
    process_pb.set_message("Setting loop points");

    let editor = LoopEditor::new();
    let results: Vec<Result<LoopSpec, Error>> = wav_files
        .par_iter()
        .progress_with(process_pb.clone())
        .map(|path| {
            process_single_file(
                &editor,
                path,
                input_base_dir,
                &options.output_dir,
                options.start_seconds,
                options.end_seconds,
            )
        })
        .collect();
    process_pb.finish_with_message("Processing done");

    // 4. Report final status and errors
    let mut success_count = 0;
    let mut error_count = 0;
    for result in results {
        match result {
            Ok(_) => success_count += 1,
            Err(e) => {
                error!("Error: {}", e);
                error_count += 1;
            }
        }
    }

    info!(
        "Processing complete. {} files succeeded, {} files failed.",
        success_count, error_count
    );

    if error_count > 0 {
        Err(Error::FilesFailed(error_count))
    } else {
        Ok(())
    }
}

/// Computes the destination of a single file and writes its loop points
///
/// # Arguments
/// * `editor` - Loop editor carrying the sample counter
/// * `input_path` - Path to input WAV file
/// * `input_base_dir` - Base directory for input files
/// * `output_base_dir` - Base directory for output files. If not set, the input is overwritten
/// * `start_seconds` - Loop start in seconds
/// * `end_seconds` - Loop end in seconds
pub fn process_single_file<C: SampleCounter>(
    editor: &LoopEditor<C>,
    input_path: impl AsRef<Path>,
    input_base_dir: impl AsRef<Path>,
    output_base_dir: &Option<impl AsRef<Path>>,
    start_seconds: Option<f64>,
    end_seconds: Option<f64>,
) -> Result<LoopSpec, Error> {
    let input_path = input_path.as_ref();
    debug!(
        "Processing: {}",
        input_path.file_name().unwrap_or_default().to_string_lossy()
    );

    let output_path = match output_base_dir.as_ref() {
        Some(obd) => {
            let relative_path =
                pathdiff::diff_paths(input_path, input_base_dir).ok_or_else(|| Error::Io {
                    path: input_path.to_path_buf(),
                    source: std::io::Error::other("Failed to calculate relative path"),
                })?;
            obd.as_ref().join(relative_path)
        }
        None => input_path.to_path_buf(),
    };

    // Ensure parent directory exists
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    editor.set_loop_points(input_path, &output_path, start_seconds, end_seconds)
}

/// Validates batch options before any file is touched
///
/// # Arguments
/// * `options` - Reference to BatchOptions struct
pub fn validate_options(options: &BatchOptions) -> Result<(), Error> {
    if !options.input.exists() {
        return Err(Error::InvalidOptions(format!(
            "Input path does not exist: {:?}",
            options.input
        )));
    }
    if let Some(output_dir) = &options.output_dir {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|e| Error::Io {
                path: output_dir.to_path_buf(),
                source: e,
            })?;
            info!("Created output directory: {:?}", output_dir);
        } else if !output_dir.is_dir() {
            return Err(Error::InvalidOptions(format!(
                "Output path exists but is not a directory: {:?}",
                output_dir
            )));
        }
    }

    for (name, seconds) in [
        ("start", options.start_seconds),
        ("end", options.end_seconds),
    ] {
        if let Some(s) = seconds {
            loop_points::validate_seconds(s)
                .map_err(|e| Error::InvalidOptions(format!("Loop {}: {}", name, e)))?;
        }
    }
    if let (Some(start), Some(end)) = (options.start_seconds, options.end_seconds) {
        if start > end {
            return Err(Error::InvalidOptions(format!(
                "Loop start {}s is after loop end {}s",
                start, end
            )));
        }
    }
    Ok(())
}

/// Finds all WAV files at or below `input`
///
/// # Arguments
/// * `input` - A WAV file or a directory to search
///
/// # Returns
/// Sorted paths of the WAV files found
pub fn find_wav_files(input: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut wav_files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok()) // Filter out directory reading errors
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|os| os.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(WAV_EXTENSION))
        })
        .collect();
    wav_files.sort();
    wav_files
}
