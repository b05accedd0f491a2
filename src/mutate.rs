use log::debug;

use crate::error::FormatError;
use crate::riff::{HEADER_LEN, RiffContainer, SMPL_ID};
use crate::sampler::SAMPLER_CHUNK_LEN;

/// Returns a copy of the container with its first `smpl` chunk removed and
/// `sampler` appended as the last chunk, with the RIFF size field updated.
///
/// Any later `smpl` chunks are kept as they are. Each chunk span is copied
/// verbatim, pad byte included; a pad byte missing after the final chunk is
/// written out so the appended chunk starts on an even offset.
pub fn replace_sampler_chunk(
    container: &RiffContainer,
    sampler: &[u8; SAMPLER_CHUNK_LEN],
) -> Result<Vec<u8>, FormatError> {
    let src = container.bytes();
    let mut out = Vec::with_capacity(src.len() + SAMPLER_CHUNK_LEN);
    out.extend_from_slice(&src[..HEADER_LEN]);

    let mut removed = false;
    for chunk in container.chunks() {
        if !removed && chunk.id == SMPL_ID {
            debug!(
                "Removing existing smpl chunk at offset {} ({} bytes)",
                chunk.header_offset(),
                chunk.span_len()
            );
            removed = true;
            continue;
        }
        let end = chunk.padded_end().min(src.len());
        out.extend_from_slice(&src[chunk.header_offset()..end]);
        if end < chunk.padded_end() {
            out.push(0);
        }
    }

    out.extend_from_slice(sampler);
    let riff_size =
        u32::try_from(out.len() - 8).map_err(|_| FormatError::TooLarge(out.len()))?;
    out[4..8].copy_from_slice(&riff_size.to_le_bytes());
    Ok(out)
}
