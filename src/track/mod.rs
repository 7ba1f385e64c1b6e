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

//! The `track` module provides [TrackDecoder], which runs the full decoding pipeline for a
//! single track: flux intervals are resolved into a bitstream, the bitstream is split into
//! records by the encoding's [RecordCodec], the records are demodulated into bytes and finally
//! interpreted by the [System34Schema] into sectors.
//!
//! Each stage is also available on its own, so a track may enter the pipeline as flux, as a
//! bitstream or as already decoded records.

use bit_vec::BitVec;

use crate::{
    bitstream_codec::{record_codec, segment_records, DecodedRecord, RawRecord, RecordCodec},
    flux::{flux_to_bitstream, FluxCapture},
    format_us,
    track_schema::System34Schema,
    types::{DecodedSector, DecoderConfig, TrackDataEncoding},
    IbmTrackError,
};

/// A decoder for the tracks of a single disk. A [TrackDecoder] holds only its configuration,
/// so the same decoder may be used for any number of tracks, including from multiple threads.
#[derive(Copy, Clone, Debug, Default)]
pub struct TrackDecoder {
    encoding: TrackDataEncoding,
    config: DecoderConfig,
}

impl TrackDecoder {
    pub fn new(encoding: TrackDataEncoding, config: DecoderConfig) -> Self {
        Self { encoding, config }
    }

    pub fn encoding(&self) -> TrackDataEncoding {
        self.encoding
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn codec(&self) -> &'static dyn RecordCodec {
        record_codec(self.encoding)
    }

    /// Decode already demodulated records into sectors.
    pub fn decode_records(&self, records: &[DecodedRecord]) -> Vec<DecodedSector> {
        System34Schema::decode_records(records, &self.config)
    }

    /// Demodulate raw records and decode them into sectors.
    pub fn decode_raw_records(&self, records: &[RawRecord]) -> Vec<DecodedSector> {
        let codec = self.codec();
        let decoded: Vec<DecodedRecord> = records.iter().map(|record| codec.decode_record(record)).collect();
        self.decode_records(&decoded)
    }

    /// Decode a track bitstream into sectors.
    pub fn decode_bitstream(&self, bits: &BitVec) -> Vec<DecodedSector> {
        let records = segment_records(bits, self.codec());
        log::debug!(
            "TrackDecoder::decode_bitstream(): Found {} {} records in {} bits",
            records.len(),
            self.encoding,
            bits.len()
        );
        let sectors = self.decode_raw_records(&records);
        log::debug!("TrackDecoder::decode_bitstream(): Decoded {} sectors", sectors.len());
        sectors
    }

    /// Decode a track from flux intervals, given the raw nominal bitcell period of the track.
    /// The encoding's codec converts the raw period into the bitcell clock.
    pub fn decode_flux_with_clock(&self, deltas: &[f64], raw_clock: f64) -> Result<Vec<DecodedSector>, IbmTrackError> {
        if !(raw_clock > 0.0) {
            log::error!("TrackDecoder::decode_flux_with_clock(): Invalid clock {}", raw_clock);
            return Err(IbmTrackError::ParameterError);
        }
        let clock = self.codec().guess_clock(raw_clock);
        log::debug!(
            "TrackDecoder::decode_flux_with_clock(): Raw clock {} {} clock {}",
            format_us!(raw_clock),
            self.encoding,
            format_us!(clock)
        );
        let bits = flux_to_bitstream(deltas, clock);
        Ok(self.decode_bitstream(&bits))
    }

    /// Decode a track from flux intervals, estimating the bitcell clock from the intervals
    /// themselves.
    #[cfg(feature = "flux")]
    pub fn decode_flux(&self, deltas: &[f64]) -> Result<Vec<DecodedSector>, IbmTrackError> {
        let mut histogram = crate::flux::FluxHistogram::new(deltas, 1.0);
        let Some(raw_clock) = histogram.base_transition_time()
        else {
            log::error!("TrackDecoder::decode_flux(): Unable to determine clock from flux");
            return Err(IbmTrackError::IncompatibleImage);
        };
        self.decode_flux_with_clock(deltas, raw_clock)
    }

    /// Decode a captured track, estimating the bitcell clock from the capture.
    #[cfg(feature = "flux")]
    pub fn decode_capture(&self, capture: &FluxCapture) -> Result<Vec<DecodedSector>, IbmTrackError> {
        self.decode_flux(capture.deltas())
    }

    /// Decode a captured track with a known raw nominal bitcell period.
    pub fn decode_capture_with_clock(
        &self,
        capture: &FluxCapture,
        raw_clock: f64,
    ) -> Result<Vec<DecodedSector>, IbmTrackError> {
        self.decode_flux_with_clock(capture.deltas(), raw_clock)
    }
}
