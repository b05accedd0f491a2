use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{ArgumentError, Error, FormatError, SampleCountError};
use crate::format::{FormatInfo, inspect_format, sample_rate};
use crate::loop_points::LoopSpec;
use crate::mutate::replace_sampler_chunk;
use crate::riff::{Chunk, RiffContainer, SMPL_ID};
use crate::sampler::{SamplerInfo, build_sampler_chunk};
use crate::save::save_wav_bytes;

/// Source of an audio file's length in sample frames.
///
/// Only consulted when no loop end is given.
pub trait SampleCounter {
    fn total_samples(&self, path: &Path) -> Result<u64, SampleCountError>;
}

impl<F> SampleCounter for F
where
    F: Fn(&Path) -> Result<u64, SampleCountError>,
{
    fn total_samples(&self, path: &Path) -> Result<u64, SampleCountError> {
        self(path)
    }
}

/// Reads the frame count symphonia's WAV reader derives from the `data`
/// chunk and block alignment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaSampleCounter;

impl SampleCounter for SymphoniaSampleCounter {
    fn total_samples(&self, path: &Path) -> Result<u64, SampleCountError> {
        let file = fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        hint.with_extension("wav");
        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;
        let track = probed
            .format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(SampleCountError::NoTrack)?;
        track
            .codec_params
            .n_frames
            .ok_or(SampleCountError::UnknownLength)
    }
}

/// Failure while resolving loop times, before a path is attached.
enum ResolveError {
    Argument(ArgumentError),
    Count(SampleCountError),
}

impl From<ArgumentError> for ResolveError {
    fn from(e: ArgumentError) -> Self {
        ResolveError::Argument(e)
    }
}

/// Writes loop points into WAV files.
#[derive(Debug, Default, Clone)]
pub struct LoopEditor<C = SymphoniaSampleCounter> {
    counter: C,
}

impl LoopEditor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: SampleCounter> LoopEditor<C> {
    pub fn with_counter(counter: C) -> Self {
        Self { counter }
    }

    /// Reads `source`, replaces its sampler chunk with one looping from
    /// `start_seconds` (default: first sample) to `end_seconds` (default:
    /// last sample), and writes the result to `dest`.
    ///
    /// Nothing is written unless every step succeeds. `dest` may equal
    /// `source`. Returns the loop that was written.
    pub fn set_loop_points(
        &self,
        source: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        start_seconds: Option<f64>,
        end_seconds: Option<f64>,
    ) -> Result<LoopSpec, Error> {
        let source = source.as_ref();
        let dest = dest.as_ref();
        let format_err = |e: FormatError| Error::Format {
            path: source.to_path_buf(),
            source: e,
        };

        let bytes = fs::read(source).map_err(|e| Error::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        let container = RiffContainer::parse(bytes).map_err(format_err)?;
        let rate = sample_rate(&container).map_err(format_err)?;

        let spec = LoopSpec::from_seconds(rate, start_seconds, end_seconds, || {
            self.counter
                .total_samples(source)
                .map_err(ResolveError::Count)
        })
        .map_err(|e| match e {
            ResolveError::Argument(e) => Error::InvalidArgument {
                path: source.to_path_buf(),
                source: e,
            },
            ResolveError::Count(e) => Error::SampleCount {
                path: source.to_path_buf(),
                source: e,
            },
        })?;
        debug!(
            "  -> {:?}: {} Hz, loop {}..={}",
            source.file_name().unwrap_or_default(),
            rate,
            spec.start(),
            spec.end()
        );

        let out = replace_sampler_chunk(&container, &build_sampler_chunk(&spec))
            .map_err(format_err)?;
        save_wav_bytes(dest, &out).map_err(|e| Error::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;
        debug!("Successfully wrote looped file to {:?}", dest);
        Ok(spec)
    }
}

/// [`LoopEditor::set_loop_points`] with the symphonia sample counter.
pub fn set_loop_points(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    start_seconds: Option<f64>,
    end_seconds: Option<f64>,
) -> Result<LoopSpec, Error> {
    LoopEditor::new().set_loop_points(source, dest, start_seconds, end_seconds)
}

/// What [`inspect`] found in a WAV file.
#[derive(Debug, Clone)]
pub struct WavReport {
    pub path: PathBuf,
    pub file_len: usize,
    pub declared_size: u32,
    /// `None` if there is no usable `fmt ` chunk.
    pub format: Option<FormatInfo>,
    pub chunks: Vec<Chunk>,
    /// Decoded first `smpl` chunk, if any.
    pub sampler: Option<SamplerInfo>,
}

impl WavReport {
    /// Loop bounds of the first loop, in seconds.
    pub fn loop_seconds(&self) -> Option<(f64, f64)> {
        let rate = self.format?.sample_rate;
        let (start, end) = self.sampler.as_ref()?.first_loop()?;
        (rate > 0).then(|| (start as f64 / rate as f64, end as f64 / rate as f64))
    }
}

/// Walks a WAV file's chunks and decodes its format and loop points.
pub fn inspect(path: impl AsRef<Path>) -> Result<WavReport, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let container = RiffContainer::parse(bytes).map_err(|e| Error::Format {
        path: path.to_path_buf(),
        source: e,
    })?;
    let format = inspect_format(&container).ok();
    let sampler = container
        .find(&SMPL_ID)
        .and_then(|c| SamplerInfo::parse(container.payload(c)));

    Ok(WavReport {
        path: path.to_path_buf(),
        file_len: container.bytes().len(),
        declared_size: container.declared_size(),
        format,
        chunks: container.chunks().to_vec(),
        sampler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riff::{DATA_ID, FMT_ID, build_wave, pcm_fmt};

    fn fixed(count: u64) -> impl Fn(&Path) -> Result<u64, SampleCountError> {
        move |_| Ok(count)
    }

    fn never(_: &Path) -> Result<u64, SampleCountError> {
        panic!("sample count queried although an end time was given")
    }

    fn write_source(dir: &Path, chunks: &[(&[u8; 4], &[u8])]) -> PathBuf {
        let path = dir.join("in.wav");
        fs::write(&path, build_wave(chunks)).unwrap();
        path
    }

    #[test]
    fn writes_loop_from_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let fmt = pcm_fmt(44100, 1, 16);
        let src = write_source(dir.path(), &[(&FMT_ID, &fmt), (&DATA_ID, &[0; 16])]);
        let dst = dir.path().join("out.wav");

        let spec = LoopEditor::with_counter(never)
            .set_loop_points(&src, &dst, Some(0.5), Some(1.5))
            .unwrap();
        assert_eq!((spec.start(), spec.end()), (22050, 66150));

        let report = inspect(&dst).unwrap();
        assert_eq!(report.sampler.unwrap().first_loop(), Some((22050, 66150)));
        assert_eq!(report.file_len, fs::read(&src).unwrap().len() + 68);
    }

    #[test]
    fn default_end_uses_sample_count() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), &[(&FMT_ID, &pcm_fmt(44100, 1, 16))]);
        let spec = LoopEditor::with_counter(fixed(88200))
            .set_loop_points(&src, &src, Some(0.25), None)
            .unwrap();
        assert_eq!((spec.start(), spec.end()), (11025, 88199));
        assert_eq!(
            inspect(&src).unwrap().sampler.unwrap().first_loop(),
            Some((11025, 88199))
        );
    }

    #[test]
    fn failures_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out.wav");

        let no_fmt = write_source(dir.path(), &[(&DATA_ID, &[0; 4])]);
        let err = LoopEditor::with_counter(never)
            .set_loop_points(&no_fmt, &dst, Some(0.0), Some(1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Format {
                source: FormatError::MissingFmt,
                ..
            }
        ));
        assert!(!dst.exists());

        let ok = write_source(dir.path(), &[(&FMT_ID, &pcm_fmt(8000, 1, 8))]);
        let err = LoopEditor::with_counter(never)
            .set_loop_points(&ok, &dst, Some(2.0), Some(1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument {
                source: ArgumentError::StartAfterEnd { .. },
                ..
            }
        ));
        assert!(!dst.exists());

        let broken = |_: &Path| -> Result<u64, SampleCountError> { Err(SampleCountError::NoTrack) };
        let err = LoopEditor::with_counter(broken)
            .set_loop_points(&ok, &dst, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::SampleCount { .. }));
        assert!(!dst.exists());
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = set_loop_points(dir.path().join("nope.wav"), dir.path().join("o.wav"), None, None)
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn report_converts_loop_to_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), &[(&FMT_ID, &pcm_fmt(1000, 1, 16))]);
        LoopEditor::with_counter(never)
            .set_loop_points(&src, &src, Some(0.5), Some(0.75))
            .unwrap();
        let report = inspect(&src).unwrap();
        assert_eq!(report.loop_seconds(), Some((0.5, 0.75)));
        assert_eq!(report.declared_size as usize, report.file_len - 8);
    }
}
