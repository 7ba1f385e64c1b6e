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
*/

//! The `bitstream_codec` module splits a track bitstream into sync-delimited records and
//! demodulates them into bytes.
//!
//! FM and MFM differ only in how their address mark sync patterns look, how many sync bytes
//! precede the address mark byte in a decoded record, and how the bitcell clock relates to the
//! raw flux timing of a track. Those differences are captured by the [RecordCodec] trait, with
//! one implementation per encoding. Everything downstream of demodulation is encoding-agnostic.

pub mod fm;
pub mod mfm;

use bit_vec::BitVec;

use crate::types::TrackDataEncoding;

pub use fm::FmRecordCodec;
pub use mfm::MfmRecordCodec;

/// A `RecordCodec` describes the encoding-specific parts of reading records from a track.
pub trait RecordCodec: Send + Sync {
    /// Return the encoding this codec reads.
    fn encoding(&self) -> TrackDataEncoding;

    /// Examine the most recently received bits of a track, with the newest bit in the least
    /// significant position of `fifo`. If they end exactly on an address mark sync pattern,
    /// return the number of bits the pattern occupies, otherwise return 0.
    fn record_matcher(&self, fifo: u64) -> usize;

    /// Return the number of sync bytes preceding the address mark byte in a decoded record.
    fn header_len(&self) -> usize;

    /// Return the bitcell clock period to use for decoding, given the raw nominal bitcell period
    /// measured from a track's flux timings.
    fn guess_clock(&self, raw_clock: f64) -> f64;

    /// Demodulate a raw record into bytes.
    fn decode_record(&self, record: &RawRecord) -> DecodedRecord {
        DecodedRecord::new(decode_fm_mfm(&record.bits), self.header_len())
    }
}

/// Return the [RecordCodec] for the specified encoding.
pub fn record_codec(encoding: TrackDataEncoding) -> &'static dyn RecordCodec {
    match encoding {
        TrackDataEncoding::Fm => &FmRecordCodec,
        TrackDataEncoding::Mfm => &MfmRecordCodec,
    }
}

/// A sync-delimited run of raw encoded bits from a track, starting at the first bit of an
/// address mark sync pattern.
#[derive(Clone, Debug)]
pub struct RawRecord {
    /// The bit offset of the start of this record within the track bitstream.
    pub start: usize,
    pub bits: BitVec,
}

impl RawRecord {
    pub fn new(start: usize, bits: BitVec) -> Self {
        Self { start, bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

/// The demodulated bytes of a single record. The address mark byte follows `header_len` sync
/// bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedRecord {
    bytes: Vec<u8>,
    header_len: usize,
}

impl DecodedRecord {
    pub fn new(bytes: Vec<u8>, header_len: usize) -> Self {
        Self { bytes, header_len }
    }

    /// Return all bytes of the record, including sync bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Return the address mark byte, if the record is long enough to have one.
    pub fn marker(&self) -> Option<u8> {
        self.bytes.get(self.header_len).copied()
    }

    /// Return the record bytes starting at the address mark byte.
    pub fn body(&self) -> &[u8] {
        self.bytes.get(self.header_len..).unwrap_or(&[])
    }
}

/// Split a track bitstream into records, using the codec's sync matcher to find where each
/// record begins. Each record runs up to the start of the next one, the last to the end of the
/// track. Bits preceding the first sync pattern are discarded.
pub fn segment_records(bits: &BitVec, codec: &dyn RecordCodec) -> Vec<RawRecord> {
    let mut starts = Vec::new();
    let mut fifo: u64 = 0;

    for (i, bit) in bits.iter().enumerate() {
        fifo = fifo << 1 | bit as u64;
        let matched = codec.record_matcher(fifo);
        if matched > 0 && i + 1 >= matched {
            let start = i + 1 - matched;
            log::trace!("segment_records(): {} sync at bit offset {}", codec.encoding(), start);
            starts.push(start);
        }
    }

    let mut records = Vec::with_capacity(starts.len());
    for (ri, &start) in starts.iter().enumerate() {
        let end = starts.get(ri + 1).copied().unwrap_or(bits.len());
        let record_bits: BitVec = bits.iter().skip(start).take(end - start).collect();
        records.push(RawRecord::new(start, record_bits));
    }
    records
}

/// Demodulate FM or MFM encoded bits into bytes. Both encodings place a clock bit before each
/// data bit, so starting from a record boundary every second bit is data. Bytes are assembled
/// MSB first and a trailing partial byte is dropped.
pub fn decode_fm_mfm(bits: &BitVec) -> Vec<u8> {
    let data_bits: BitVec = bits.iter().skip(1).step_by(2).collect();
    let mut bytes = data_bits.to_bytes();
    bytes.truncate(data_bits.len() / 8);
    bytes
}

/// Append the 16 bits of `word` to `bits`, MSB first.
pub(crate) fn push_word(bits: &mut BitVec, word: u16) {
    for i in (0..16).rev() {
        bits.push(word & (1 << i) != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_decode_fm_mfm_strips_clock_bits() {
        let mut bits = BitVec::new();
        // MFM encoding of 0xA1 with its missing clock, then 0xFE.
        push_word(&mut bits, 0x4489);
        push_word(&mut bits, 0x5554);
        assert_eq!(decode_fm_mfm(&bits), vec![0xA1, 0xFE]);
    }

    #[test]
    fn test_decode_fm_mfm_drops_partial_byte() {
        let mut bits = BitVec::new();
        push_word(&mut bits, 0xF57E);
        // Seven more bitcells; not enough for another byte.
        for _ in 0..7 {
            bits.push(true);
        }
        assert_eq!(decode_fm_mfm(&bits), vec![0xFE]);
    }

    #[test]
    fn test_decoded_record_accessors() {
        let record = DecodedRecord::new(vec![0xA1, 0xA1, 0xA1, 0xFE, 0x01], 3);
        assert_eq!(record.marker(), Some(0xFE));
        assert_eq!(record.body(), &[0xFE, 0x01]);

        let short = DecodedRecord::new(vec![0xA1, 0xA1], 3);
        assert_eq!(short.marker(), None);
        assert!(short.body().is_empty());
    }

    #[test]
    fn test_segment_records_splits_at_sync() {
        let codec = record_codec(TrackDataEncoding::Mfm);
        let mut bits = BitVec::new();
        // Some gap before the first record
        for _ in 0..8 {
            push_word(&mut bits, 0x9254);
        }
        for _ in 0..2 {
            push_word(&mut bits, 0x4489);
            push_word(&mut bits, 0x4489);
            push_word(&mut bits, 0x4489);
            push_word(&mut bits, 0x5554);
            push_word(&mut bits, 0xAAAA);
        }

        let records = segment_records(&bits, codec);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].start, 8 * 16);
        assert_eq!(records[0].len(), 5 * 16);
        assert_eq!(records[1].start, 8 * 16 + 5 * 16);
        assert_eq!(records[1].len(), 5 * 16);

        let decoded = codec.decode_record(&records[1]);
        assert_eq!(decoded.bytes(), &[0xA1, 0xA1, 0xA1, 0xFE, 0x00]);
        assert_eq!(decoded.marker(), Some(0xFE));
    }

    #[test]
    fn test_segment_records_empty_track() {
        for encoding in TrackDataEncoding::iter() {
            let bits = BitVec::from_elem(4096, false);
            assert!(segment_records(&bits, record_codec(encoding)).is_empty());
        }
    }

    #[test]
    fn test_record_codec_selects_encoding() {
        for encoding in TrackDataEncoding::iter() {
            assert_eq!(record_codec(encoding).encoding(), encoding);
        }
    }
}
