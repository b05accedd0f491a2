use crate::error::FormatError;
use crate::riff::{FMT_ID, RiffContainer, read_u16_le, read_u32_le};

/// Encoding parameters read from the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Reads the first `fmt ` chunk of a parsed container.
///
/// The payload starts with the 2-byte format tag and 2-byte channel count,
/// followed by the sample rate as a little-endian u32 at offset 4.
pub fn inspect_format(container: &RiffContainer) -> Result<FormatInfo, FormatError> {
    let chunk = container.find(&FMT_ID).ok_or(FormatError::MissingFmt)?;
    let payload = container.payload(chunk);
    let (Some(format_tag), Some(channels), Some(sample_rate)) = (
        read_u16_le(payload, 0),
        read_u16_le(payload, 2),
        read_u32_le(payload, 4),
    ) else {
        return Err(FormatError::FmtTooShort(chunk.size));
    };
    Ok(FormatInfo {
        format_tag,
        channels,
        sample_rate,
    })
}

/// Like [`inspect_format`], but a zero sample rate is an error since no
/// time can be converted to a sample index with it.
pub fn sample_rate(container: &RiffContainer) -> Result<u32, FormatError> {
    match inspect_format(container)?.sample_rate {
        0 => Err(FormatError::ZeroSampleRate),
        rate => Ok(rate),
    }
}
