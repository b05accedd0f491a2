//! The `smpl` (sampler) chunk.
//!
//! Layout of the block written here, offsets relative to the chunk id:
//!
//! Offset | Field
//! -----: | ------------------------------------------
//!      0 | "smpl"
//!      4 | payload size (60)
//!      8 | manufacturer
//!     12 | product
//!     16 | sample period
//!     20 | MIDI unity note (60, middle C)
//!     24 | MIDI pitch fraction
//!     28 | SMPTE format
//!     32 | SMPTE offset
//!     36 | number of sample loops (1)
//!     40 | sampler data size
//!     44 | loop: cue point id
//!     48 | loop: type (0 = forward)
//!     52 | loop: start sample
//!     56 | loop: end sample
//!     60 | loop: fraction
//!     64 | loop: play count (0 = infinite)

use crate::loop_points::LoopSpec;
use crate::riff::{CHUNK_HEADER_LEN, SMPL_ID, read_u32_le};

/// Payload size of a sampler chunk carrying exactly one loop.
pub const SAMPLER_PAYLOAD_LEN: u32 = 60;
/// Header plus payload. Even, so it never needs a pad byte.
pub const SAMPLER_CHUNK_LEN: usize = CHUNK_HEADER_LEN + SAMPLER_PAYLOAD_LEN as usize;

const MIDI_MIDDLE_C: u32 = 60;

// Payload-relative offsets.
const UNITY_NOTE: usize = 12;
const NUM_LOOPS: usize = 28;
const FIRST_LOOP: usize = 36;
const LOOP_RECORD_LEN: usize = 24;
const LOOP_START: usize = 8;
const LOOP_END: usize = 12;

/// Encodes a one-loop, forward, infinitely repeating sampler chunk.
/// Every field not listed in the module table is zero.
pub fn build_sampler_chunk(spec: &LoopSpec) -> [u8; SAMPLER_CHUNK_LEN] {
    let mut block = [0u8; SAMPLER_CHUNK_LEN];
    let mut put = |payload_offset: usize, value: u32| {
        let at = CHUNK_HEADER_LEN + payload_offset;
        block[at..at + 4].copy_from_slice(&value.to_le_bytes());
    };
    put(UNITY_NOTE, MIDI_MIDDLE_C);
    put(NUM_LOOPS, 1);
    put(FIRST_LOOP + LOOP_START, spec.start());
    put(FIRST_LOOP + LOOP_END, spec.end());

    block[0..4].copy_from_slice(&SMPL_ID);
    block[4..8].copy_from_slice(&SAMPLER_PAYLOAD_LEN.to_le_bytes());
    block
}

/// Loop information decoded from an existing `smpl` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerInfo {
    pub midi_unity_note: u32,
    /// `(start, end)` of each loop record present in the payload.
    pub loops: Vec<(u32, u32)>,
}

impl SamplerInfo {
    /// Returns `None` if the fixed part of the payload is cut short. Loop
    /// records declared but not present are skipped.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let midi_unity_note = read_u32_le(payload, UNITY_NOTE)?;
        let num_loops = read_u32_le(payload, NUM_LOOPS)?;
        let loops = (0..num_loops as usize)
            .map_while(|i| {
                let record = FIRST_LOOP + i * LOOP_RECORD_LEN;
                Some((
                    read_u32_le(payload, record + LOOP_START)?,
                    read_u32_le(payload, record + LOOP_END)?,
                ))
            })
            .collect();
        Some(Self {
            midi_unity_note,
            loops,
        })
    }

    pub fn first_loop(&self) -> Option<(u32, u32)> {
        self.loops.first().copied()
    }
}
