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

//! # ibmtrack
//!
//! `ibmtrack` decodes the sectors of a single floppy disk track written in the IBM System 34
//! format, the track format used by IBM PC compatible floppy disks, from either its flux
//! transition timings or its raw bitstream. Both FM and MFM encoded tracks are supported.
//!
//! Decoding happens in stages:
//!
//! * [flux] resolves flux intervals into a bitstream, estimating the bitcell clock if needed.
//! * [bitstream_codec] splits the bitstream into records at address mark sync patterns and
//!   demodulates each record into bytes.
//! * [track_schema] pairs ID records with the data records that follow them, checks CRCs and
//!   produces [DecodedSector]s.
//!
//! [TrackDecoder] runs the whole pipeline, and [RawTrackStore] reads and writes collections of
//! raw track captures.
//!
//! ## Features
//!
//! * `flux` (default): Estimate the bitcell clock of a track from its flux intervals.
//! * `serde`: Serialization of decoded sectors and decoder configuration.

pub mod bitstream_codec;
pub mod flux;
pub mod raw_store;
pub mod track;
pub mod track_schema;
pub mod types;
pub mod util;

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum IbmTrackError {
    #[error("An IO error occurred reading or writing a track store: {0}")]
    IoError(String),
    #[error("The track store parser encountered an error")]
    FormatParseError,
    #[error("Invalid parameters were specified to a library function")]
    ParameterError,
    #[error("The track data is not compatible with the requested operation")]
    IncompatibleImage,
}

impl From<std::io::Error> for IbmTrackError {
    fn from(err: std::io::Error) -> Self {
        IbmTrackError::IoError(err.to_string())
    }
}

impl From<binrw::Error> for IbmTrackError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(e) => IbmTrackError::IoError(e.to_string()),
            _ => IbmTrackError::FormatParseError,
        }
    }
}

pub use crate::{
    bitstream_codec::{record_codec, DecodedRecord, RawRecord, RecordCodec},
    flux::{flux_to_bitstream, FluxCapture},
    raw_store::RawTrackStore,
    track::TrackDecoder,
    track_schema::System34Schema,
    types::{DecodedSector, DecoderConfig, DiskCh, PairingPolicy, SectorStatus, TrackDataEncoding},
};

pub mod prelude {
    pub use crate::{
        flux::FluxCapture,
        raw_store::RawTrackStore,
        track::TrackDecoder,
        types::{DecodedSector, DecoderConfig, DiskCh, PairingPolicy, SectorStatus, TrackDataEncoding},
        IbmTrackError,
    };
}
