use std::path::PathBuf;

use symphonia::core::errors::Error as SymphoniaError;

/// Structural problems in a RIFF/WAVE byte buffer.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Not a RIFF/WAVE file")]
    NotRiffWave,
    #[error("Truncated chunk header at offset {offset}")]
    TruncatedHeader { offset: usize },
    #[error(
        "Chunk {id:?} at offset {offset} declares {size} bytes but only {available} bytes remain"
    )]
    ChunkOverrun {
        id: String,
        offset: usize,
        size: u32,
        available: usize,
    },
    #[error("No \"fmt \" chunk found")]
    MissingFmt,
    #[error("\"fmt \" chunk is too short ({0} bytes)")]
    FmtTooShort(u32),
    #[error("Sample rate is zero")]
    ZeroSampleRate,
    #[error("Container of {0} bytes does not fit a 32-bit RIFF size field")]
    TooLarge(usize),
}

/// Rejected loop point arguments.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ArgumentError {
    #[error("Time must be finite, got {0}")]
    NonFinite(f64),
    #[error("Time must not be negative, got {0}")]
    Negative(f64),
    #[error("{seconds}s at {sample_rate} Hz overflows a 32-bit sample index")]
    Overflow { seconds: f64, sample_rate: u32 },
    #[error("Sample count {0} overflows a 32-bit sample index")]
    SampleCountOverflow(u64),
    #[error("Audio contains no samples")]
    NoSamples,
    #[error("Loop start {start} is after loop end {end}")]
    StartAfterEnd { start: u32, end: u32 },
}

#[derive(thiserror::Error, Debug)]
pub enum SampleCountError {
    #[error("Symphonia error: {0}")]
    Symphonia(#[from] SymphoniaError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No compatible audio track found")]
    NoTrack,
    #[error("Track does not report its length")]
    UnknownLength,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Malformed WAV file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("Invalid loop points for {path}: {source}")]
    InvalidArgument {
        path: PathBuf,
        #[source]
        source: ArgumentError,
    },
    #[error("Sample count query failed for {path}: {source}")]
    SampleCount {
        path: PathBuf,
        #[source]
        source: SampleCountError,
    },
    #[error("I/O error during processing of {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("{0} files failed")]
    FilesFailed(usize),
}
