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

    src/bitstream_codec/fm.rs

    FM record sync detection, clock estimation and encoding.

*/

use bit_vec::BitVec;

use crate::{
    bitstream_codec::{push_word, RecordCodec},
    types::TrackDataEncoding,
};

pub const FM_BYTE_LEN: usize = 16;
pub const FM_SYNC_LEN: usize = 16;
pub const FM_SYNC_MASK: u64 = 0xFFFF;

/// IAM: clock 0xD7, data 0xFC
pub const FM_IAM_MARKER: u16 = 0xF77A;
/// IDAM: clock 0xC7, data 0xFE
pub const FM_IDAM_MARKER: u16 = 0xF57E;
/// DAM: clock 0xC7, data 0xFB
pub const FM_DAM_MARKER: u16 = 0xF56F;

/// Reads records from FM encoded System 34 tracks.
///
/// FM address marks are a single byte written with some clock transitions missing. Normal FM
/// data always has a clock transition in every bitcell, so these patterns cannot occur in
/// data at either phase:
///
/// ```text
/// IAM   flux:  XXXX-XXX-XXXX-X- = 0xF77A
///       clock: X X - X - X X X  = 0xD7
///       data:   X X X X X X - - = 0xFC
///
/// IDAM  flux:  XXXX-X-X-XXXXXX- = 0xF57E
///       clock: X X - - - X X X  = 0xC7
///       data:   X X X X X X X - = 0xFE
///
/// DAM   flux:  XXXX-X-X-XX-XXXX = 0xF56F
///       clock: X X - - - X X X  = 0xC7
///       data:   X X X X X - X X = 0xFB
/// ```
///
/// There are no separate sync bytes in FM; the address mark itself is the sync pattern, so a
/// decoded record begins with its address mark byte.
#[derive(Copy, Clone, Debug, Default)]
pub struct FmRecordCodec;

impl RecordCodec for FmRecordCodec {
    fn encoding(&self) -> TrackDataEncoding {
        TrackDataEncoding::Fm
    }

    fn record_matcher(&self, fifo: u64) -> usize {
        match (fifo & FM_SYNC_MASK) as u16 {
            FM_IAM_MARKER | FM_IDAM_MARKER | FM_DAM_MARKER => FM_SYNC_LEN,
            _ => 0,
        }
    }

    fn header_len(&self) -> usize {
        0
    }

    fn guess_clock(&self, raw_clock: f64) -> f64 {
        raw_clock
    }
}

impl FmRecordCodec {
    /// FM encode `data`. Every data bit is preceded by a clock bit of 1.
    pub fn encode(data: &[u8]) -> BitVec {
        let mut bitvec = BitVec::with_capacity(data.len() * FM_BYTE_LEN);
        for &byte in data {
            for i in (0..8).rev() {
                bitvec.push(true);
                bitvec.push((byte & (1 << i)) != 0);
            }
        }
        bitvec
    }

    /// Combine a data byte with a clock byte to produce an FM address mark pattern.
    pub fn encode_marker(data: u8, clock: u8) -> u16 {
        let mut word = 0u16;
        for i in (0..8).rev() {
            word = (word << 2) | (((clock >> i) & 1) as u16) << 1 | ((data >> i) & 1) as u16;
        }
        word
    }

    /// Append an address mark pattern for `data` written with `clock`.
    pub fn encode_sync(bits: &mut BitVec, data: u8, clock: u8) {
        push_word(bits, Self::encode_marker(data, clock));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream_codec::decode_fm_mfm;

    #[test]
    fn test_fm_matcher_recognizes_markers() {
        let codec = FmRecordCodec;
        for marker in [0xF77A, 0xF57E, 0xF56F] {
            assert_eq!(codec.record_matcher(marker), 16, "marker {:04X}", marker);
            // Only the low 16 bits are examined.
            assert_eq!(codec.record_matcher(0xFFFF_0000 | marker), 16);
        }
    }

    #[test]
    fn test_fm_matcher_rejects_everything_else() {
        let codec = FmRecordCodec;
        let matched = (0..=u16::MAX).filter(|&w| codec.record_matcher(w as u64) > 0).count();
        assert_eq!(matched, 3);
    }

    #[test]
    fn test_fm_clock_passthrough() {
        let codec = FmRecordCodec;
        assert_eq!(codec.guess_clock(4.0e-6), 4.0e-6);
    }

    #[test]
    fn test_fm_marker_encoding() {
        assert_eq!(FmRecordCodec::encode_marker(0xFC, 0xD7), FM_IAM_MARKER);
        assert_eq!(FmRecordCodec::encode_marker(0xFE, 0xC7), FM_IDAM_MARKER);
        assert_eq!(FmRecordCodec::encode_marker(0xFB, 0xC7), FM_DAM_MARKER);
    }

    #[test]
    fn test_fm_encode() {
        let bits = FmRecordCodec::encode(&[0x00, 0xFF]);
        assert_eq!(bits.to_bytes(), vec![0xAA, 0xAA, 0xFF, 0xFF]);
        let data = [0xFE, 0x00, 0x01, 0x03, 0x01];
        assert_eq!(decode_fm_mfm(&FmRecordCodec::encode(&data)), data.to_vec());
    }

    #[test]
    fn test_fm_markers_decode_to_mark_bytes() {
        let mut bits = BitVec::new();
        FmRecordCodec::encode_sync(&mut bits, 0xFE, 0xC7);
        FmRecordCodec::encode_sync(&mut bits, 0xFB, 0xC7);
        FmRecordCodec::encode_sync(&mut bits, 0xFC, 0xD7);
        assert_eq!(decode_fm_mfm(&bits), vec![0xFE, 0xFB, 0xFC]);
    }
}
