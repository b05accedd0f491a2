use crate::error::ArgumentError;

/// A loop region expressed in sample frames. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSpec {
    start: u32,
    end: u32,
}

impl LoopSpec {
    pub fn new(start: u32, end: u32) -> Result<Self, ArgumentError> {
        if start > end {
            return Err(ArgumentError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Resolves optional loop times in seconds against a sample rate.
    ///
    /// A missing start means the first sample. A missing end means the last
    /// sample, in which case `total_samples` is called to learn the length;
    /// it is not called otherwise.
    pub fn from_seconds<E>(
        sample_rate: u32,
        start_seconds: Option<f64>,
        end_seconds: Option<f64>,
        total_samples: impl FnOnce() -> Result<u64, E>,
    ) -> Result<Self, E>
    where
        E: From<ArgumentError>,
    {
        let start = match start_seconds {
            Some(s) => seconds_to_samples(sample_rate, s)?,
            None => 0,
        };
        let end = match end_seconds {
            Some(s) => seconds_to_samples(sample_rate, s)?,
            None => last_sample_index(total_samples()?)?,
        };
        Ok(Self::new(start, end)?)
    }
}

/// Checks that a time argument is usable before any file is touched.
pub fn validate_seconds(seconds: f64) -> Result<(), ArgumentError> {
    if !seconds.is_finite() {
        return Err(ArgumentError::NonFinite(seconds));
    }
    if seconds < 0.0 {
        return Err(ArgumentError::Negative(seconds));
    }
    Ok(())
}

/// `floor(sample_rate * seconds)`, rejecting values that do not fit a u32.
pub fn seconds_to_samples(sample_rate: u32, seconds: f64) -> Result<u32, ArgumentError> {
    validate_seconds(seconds)?;
    let samples = (sample_rate as f64 * seconds).floor();
    if samples > u32::MAX as f64 {
        return Err(ArgumentError::Overflow {
            seconds,
            sample_rate,
        });
    }
    Ok(samples as u32)
}

/// Index of the last sample frame, `total - 1`.
pub fn last_sample_index(total_samples: u64) -> Result<u32, ArgumentError> {
    let last = total_samples.checked_sub(1).ok_or(ArgumentError::NoSamples)?;
    u32::try_from(last).map_err(|_| ArgumentError::SampleCountOverflow(total_samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_count() -> Result<u64, ArgumentError> {
        panic!("sample count must not be queried when an end time is given")
    }

    #[test]
    fn converts_with_floor() {
        assert_eq!(seconds_to_samples(44100, 0.5), Ok(22050));
        assert_eq!(seconds_to_samples(44100, 1.5), Ok(66150));
        assert_eq!(seconds_to_samples(48000, 0.00001), Ok(0));
        assert_eq!(seconds_to_samples(22050, 1.99999), Ok(44099));
        assert_eq!(seconds_to_samples(44100, 0.0), Ok(0));
    }

    #[test]
    fn rejects_bad_times() {
        assert_eq!(
            seconds_to_samples(44100, -0.1),
            Err(ArgumentError::Negative(-0.1))
        );
        assert!(matches!(
            seconds_to_samples(44100, f64::NAN),
            Err(ArgumentError::NonFinite(_))
        ));
        assert!(matches!(
            seconds_to_samples(44100, f64::INFINITY),
            Err(ArgumentError::NonFinite(_))
        ));
        assert!(matches!(
            seconds_to_samples(192000, 30000.0),
            Err(ArgumentError::Overflow { .. })
        ));
    }

    #[test]
    fn explicit_times() {
        let spec = LoopSpec::from_seconds(44100, Some(0.5), Some(1.5), no_count).unwrap();
        assert_eq!((spec.start(), spec.end()), (22050, 66150));
    }

    #[test]
    fn defaults_to_whole_file() {
        let spec =
            LoopSpec::from_seconds::<ArgumentError>(44100, None, None, || Ok(88200)).unwrap();
        assert_eq!((spec.start(), spec.end()), (0, 88199));

        let spec =
            LoopSpec::from_seconds::<ArgumentError>(44100, Some(0.25), None, || Ok(88200))
                .unwrap();
        assert_eq!((spec.start(), spec.end()), (11025, 88199));
    }

    #[test]
    fn start_after_end() {
        assert_eq!(
            LoopSpec::from_seconds(44100, Some(2.0), Some(1.0), no_count),
            Err(ArgumentError::StartAfterEnd {
                start: 88200,
                end: 44100
            })
        );
        assert!(LoopSpec::new(5, 5).is_ok());
    }

    #[test]
    fn empty_or_huge_sample_count() {
        assert_eq!(last_sample_index(0), Err(ArgumentError::NoSamples));
        assert_eq!(last_sample_index(1), Ok(0));
        assert_eq!(last_sample_index(1 << 32), Ok(u32::MAX));
        assert_eq!(
            last_sample_index((1 << 32) + 1),
            Err(ArgumentError::SampleCountOverflow((1 << 32) + 1))
        );
    }

    #[test]
    fn sample_count_error_passes_through() {
        #[derive(Debug, PartialEq)]
        enum Failure {
            Arg(ArgumentError),
            Query,
        }
        impl From<ArgumentError> for Failure {
            fn from(e: ArgumentError) -> Self {
                Failure::Arg(e)
            }
        }
        assert_eq!(
            LoopSpec::from_seconds(44100, None, None, || Err(Failure::Query)),
            Err(Failure::Query)
        );
    }
}
