/*
    FluxFox
    https://github.com/dbalsom/fluxfox

    Copyright 2024-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/bitstream_codec/mfm.rs

    MFM record sync detection, clock estimation and encoding.

*/

use bit_vec::BitVec;

use crate::{
    bitstream_codec::{push_word, RecordCodec},
    types::TrackDataEncoding,
};

pub const MFM_BYTE_LEN: usize = 16;
/// Three 0xA1 sync bytes, each with the clock bit between data bits 4 and 5 omitted.
pub const MFM_SYNC_MARKER: u64 = 0x4489_4489_4489;
pub const MFM_SYNC_MARKER_MASK: u64 = 0xFFFF_FFFF_FFFF;
pub const MFM_SYNC_LEN: usize = 48;
/// The number of 0xA1 sync bytes preceding an address mark byte.
pub const MFM_SYNC_BYTES: usize = 3;
pub const MFM_SYNC_WORD: u16 = 0x4489;

/// Reads records from MFM encoded System 34 tracks.
///
/// Every record other than the IAM is introduced by three 0xA1 bytes written with a missing
/// clock transition:
///
/// ```text
/// data:    1  0  1  0  0  0  0  1
/// mfm:     01 00 01 00 10 10 10 01 = 0x44A9
/// sync:    01 00 01 00 10 00 10 01 = 0x4489
/// ```
///
/// Shifted out of phase, this pattern becomes `10 00 10 01 ...`, which MFM can never produce,
/// so a match on `0x448944894489` always lands at the start of a new record.
///
/// The IAM uses a similarly damaged 0xC2 (`0x5224`), but shifted out of phase that pattern is
/// a legal encoding that can occur in ordinary sector data. The IAM carries nothing needed to
/// decode the track, so it is not matched.
#[derive(Copy, Clone, Debug, Default)]
pub struct MfmRecordCodec;

impl RecordCodec for MfmRecordCodec {
    fn encoding(&self) -> TrackDataEncoding {
        TrackDataEncoding::Mfm
    }

    fn record_matcher(&self, fifo: u64) -> usize {
        if fifo & MFM_SYNC_MARKER_MASK == MFM_SYNC_MARKER {
            MFM_SYNC_LEN
        }
        else {
            0
        }
    }

    fn header_len(&self) -> usize {
        MFM_SYNC_BYTES
    }

    /// MFM records twice as many bitcells as FM in the same space, so the clock runs at half
    /// the shortest flux interval.
    fn guess_clock(&self, raw_clock: f64) -> f64 {
        raw_clock / 2.0
    }
}

impl MfmRecordCodec {
    /// MFM encode `data`. `prev_bit` is the last data bit written before `data`, which
    /// determines the first clock bit.
    pub fn encode(data: &[u8], prev_bit: bool) -> BitVec {
        let mut bitvec = BitVec::with_capacity(data.len() * MFM_BYTE_LEN);
        let mut previous_bit = prev_bit;

        for &byte in data {
            for i in (0..8).rev() {
                let bit = (byte & (1 << i)) != 0;
                if bit {
                    // 1 is encoded as 01
                    bitvec.push(false);
                    bitvec.push(true);
                }
                else {
                    // 0 is encoded as 10 if previous bit was 0, otherwise 00
                    bitvec.push(!previous_bit);
                    bitvec.push(false);
                }
                previous_bit = bit;
            }
        }
        bitvec
    }

    /// Append the three-byte 0xA1 sync pattern that introduces an MFM record.
    pub fn encode_sync(bits: &mut BitVec) {
        for _ in 0..MFM_SYNC_BYTES {
            push_word(bits, MFM_SYNC_WORD);
        }
    }
}
