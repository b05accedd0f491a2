//! Structural traversal of RIFF/WAVE byte buffers.
//!
//! A WAVE file is a 12-byte header followed by a flat run of chunks:
//!
//! Offset | Size | Data
//! -----: | ---: | ----------------------------------------------------------
//!      0 |    4 | "RIFF"
//!      4 |    4 | little-endian size of everything after this field
//!      8 |    4 | "WAVE"
//!     12 |    8 | first chunk header: 4-byte id + little-endian payload size
//!
//! Every payload is followed by a single zero pad byte when its size is odd.
//! Chunks are only ever located by following these size fields; sample data
//! can contain any byte sequence, including ones that look like chunk ids.

use std::borrow::Cow;

use crate::error::FormatError;

pub type ChunkId = [u8; 4];

pub const RIFF_ID: ChunkId = *b"RIFF";
pub const WAVE_ID: ChunkId = *b"WAVE";
pub const FMT_ID: ChunkId = *b"fmt ";
pub const DATA_ID: ChunkId = *b"data";
pub const SMPL_ID: ChunkId = *b"smpl";

/// Length of the `RIFF` + size + `WAVE` header.
pub const HEADER_LEN: usize = 12;
/// Length of a chunk's id + size header.
pub const CHUNK_HEADER_LEN: usize = 8;

#[inline]
pub(crate) fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_le_bytes(buf.get(offset..offset + 2)?.try_into().ok()?))
}

#[inline]
pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    Some(u32::from_le_bytes(buf.get(offset..offset + 4)?.try_into().ok()?))
}

/// A chunk located inside a buffer. Holds positions only, never bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    /// Declared payload length, excluding the header and pad byte.
    pub size: u32,
    /// Offset of the first payload byte in the containing buffer.
    pub payload_offset: usize,
}

impl Chunk {
    #[inline]
    pub fn header_offset(&self) -> usize {
        self.payload_offset - CHUNK_HEADER_LEN
    }

    #[inline]
    pub fn payload_end(&self) -> usize {
        self.payload_offset + self.size as usize
    }

    /// End of the chunk's full span, pad byte included.
    #[inline]
    pub fn padded_end(&self) -> usize {
        self.payload_end() + (self.size as usize & 1)
    }

    /// Header + payload + pad byte.
    #[inline]
    pub fn span_len(&self) -> usize {
        self.padded_end() - self.header_offset()
    }

    pub fn payload<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.payload_offset..self.payload_end()]
    }

    pub fn id_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.id)
    }
}

/// Iterator over the chunks following the RIFF header.
///
/// Yields an error and then stops if a chunk header is cut short or a
/// declared size runs past the end of the buffer. A pad byte missing after
/// the last chunk is tolerated.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    buf: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.buf.len() {
            return None;
        }
        let offset = self.offset;
        if self.buf.len() - offset < CHUNK_HEADER_LEN {
            self.failed = true;
            return Some(Err(FormatError::TruncatedHeader { offset }));
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&self.buf[offset..offset + 4]);
        let size = read_u32_le(self.buf, offset + 4)?;
        let payload_offset = offset + CHUNK_HEADER_LEN;
        let available = self.buf.len() - payload_offset;
        if size as usize > available {
            self.failed = true;
            return Some(Err(FormatError::ChunkOverrun {
                id: String::from_utf8_lossy(&id).into_owned(),
                offset,
                size,
                available,
            }));
        }

        let chunk = Chunk {
            id,
            size,
            payload_offset,
        };
        self.offset = chunk.padded_end();
        Some(Ok(chunk))
    }
}

/// Checks the 12-byte `RIFF`/`WAVE` header.
pub fn check_header(buf: &[u8]) -> Result<(), FormatError> {
    if buf.len() < HEADER_LEN || buf[0..4] != RIFF_ID || buf[8..12] != WAVE_ID {
        return Err(FormatError::NotRiffWave);
    }
    Ok(())
}

/// Validates the header and returns a fresh traversal of the chunk list.
/// Calling it again restarts the walk from the first chunk.
pub fn chunks(buf: &[u8]) -> Result<Chunks<'_>, FormatError> {
    check_header(buf)?;
    Ok(Chunks {
        buf,
        offset: HEADER_LEN,
        failed: false,
    })
}

/// A fully read WAVE file together with its chunk list.
#[derive(Debug, Clone)]
pub struct RiffContainer {
    bytes: Vec<u8>,
    chunks: Vec<Chunk>,
}

impl RiffContainer {
    /// Walks the whole buffer once. Fails on the first structural error.
    pub fn parse(bytes: Vec<u8>) -> Result<Self, FormatError> {
        let chunks = chunks(&bytes)?.collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bytes, chunks })
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// First chunk with the given id.
    pub fn find(&self, id: &ChunkId) -> Option<&Chunk> {
        self.chunks.iter().find(|c| &c.id == id)
    }

    pub fn payload(&self, chunk: &Chunk) -> &[u8] {
        chunk.payload(&self.bytes)
    }

    /// The value of the RIFF-level size field.
    pub fn declared_size(&self) -> u32 {
        read_u32_le(&self.bytes, 4).unwrap_or_default()
    }
}

/// Builds a well-formed WAVE buffer from `(id, payload)` pairs.
#[cfg(test)]
pub(crate) fn build_wave(chunks: &[(&ChunkId, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&RIFF_ID);
    buf.extend_from_slice(&[0; 4]);
    buf.extend_from_slice(&WAVE_ID);
    for (id, payload) in chunks {
        buf.extend_from_slice(*id);
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            buf.push(0);
        }
    }
    let riff_size = (buf.len() - 8) as u32;
    buf[4..8].copy_from_slice(&riff_size.to_le_bytes());
    buf
}

/// A 16-byte PCM `fmt ` payload.
#[cfg(test)]
pub(crate) fn pcm_fmt(sample_rate: u32, channels: u16, bits: u16) -> Vec<u8> {
    let block_align = channels * bits / 8;
    let mut fmt = Vec::with_capacity(16);
    fmt.extend_from_slice(&1u16.to_le_bytes());
    fmt.extend_from_slice(&channels.to_le_bytes());
    fmt.extend_from_slice(&sample_rate.to_le_bytes());
    fmt.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    fmt.extend_from_slice(&block_align.to_le_bytes());
    fmt.extend_from_slice(&bits.to_le_bytes());
    fmt
}
