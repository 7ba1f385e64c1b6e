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

//! Decoding of IBM System 34 tracks into sectors, used by IBM PCs and compatibles and many
//! other systems. The System 34 track schema supports both MFM and FM track encodings.
//!
//! A track is read as a sequence of demodulated records, each starting with an address mark.
//! An ID record (IDAM) names the sector that follows; the next data record (DAM or DDAM)
//! holds its contents. Each record carries a CRC-16/CCITT calculated over everything from the
//! first sync byte up to the CRC field itself.
//!
//! Decoding is a fold over the record sequence. A [DecoderState] tracks the most recent ID
//! record and whether it is still waiting for its data; each record produces a new state and
//! possibly a [DecodedSector]. Nothing is fatal: malformed records are dropped, and sectors
//! whose data CRC fails are still returned with [SectorStatus::BadChecksum].

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::{
    bitstream_codec::DecodedRecord,
    types::{DecodedSector, DecoderConfig, PairingPolicy, SectorStatus},
    util::{crc16, CCITT_POLY},
};

pub const IBM_IAM: u8 = 0xFC;
pub const IBM_IDAM: u8 = 0xFE;
pub const IBM_DAM: u8 = 0xFB;
pub const IBM_DDAM: u8 = 0xF8;

/// The number of bytes preceding sector data in a data record (the address mark).
pub const IBM_DAM_LEN: usize = 1;
pub const IBM_CRC_LEN: usize = 2;

/// The address marks defined by System 34.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum System34Marker {
    Iam,
    Idam,
    Dam,
    Ddam,
}

impl TryFrom<u8> for System34Marker {
    type Error = ();

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            IBM_IAM => Ok(System34Marker::Iam),
            IBM_IDAM => Ok(System34Marker::Idam),
            IBM_DAM => Ok(System34Marker::Dam),
            IBM_DDAM => Ok(System34Marker::Ddam),
            _ => Err(()),
        }
    }
}

impl From<System34Marker> for u8 {
    fn from(marker: System34Marker) -> u8 {
        match marker {
            System34Marker::Iam => IBM_IAM,
            System34Marker::Idam => IBM_IDAM,
            System34Marker::Dam => IBM_DAM,
            System34Marker::Ddam => IBM_DDAM,
        }
    }
}

/// The ID record of a sector, exactly as laid out on disk following any sync bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IbmIdam {
    pub marker: u8,
    pub cylinder: u8,
    pub side: u8,
    pub sector: u8,
    pub sector_size: u8,
    pub crc: [u8; 2],
}

const _: () = assert!(size_of::<IbmIdam>() == 7);

impl IbmIdam {
    pub const LEN: usize = size_of::<IbmIdam>();
    /// Offset of the CRC field from the address mark.
    pub const CRC_OFFSET: usize = offset_of!(IbmIdam, crc);

    /// Read an ID record from the start of `bytes`, or return None if there are too few bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<IbmIdam> {
        bytes.get(..Self::LEN).map(bytemuck::pod_read_unaligned)
    }

    /// Return the CRC recorded in the ID record.
    pub fn crc(&self) -> u16 {
        u16::from_be_bytes(self.crc)
    }

    /// Return the length of the sector data in bytes, `128 << sector_size`, or None if the size
    /// code is too large to represent.
    pub fn sector_size_in_bytes(&self) -> Option<usize> {
        sector_size_in_bytes(self.sector_size)
    }
}

impl std::fmt::Display for IbmIdam {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[C: {} H: {} S: {} B: {} CRC: {:04X}]",
            self.cylinder,
            self.side,
            self.sector,
            self.sector_size,
            self.crc()
        )
    }
}

/// Convert a sector size code to a length in bytes: `128 << code`.
pub fn sector_size_in_bytes(code: u8) -> Option<usize> {
    if (code as u32) < usize::BITS - 7 {
        Some(128usize << code)
    }
    else {
        None
    }
}

/// The state carried between records while decoding a single track.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DecoderState {
    last_idam: Option<IbmIdam>,
    idam_valid: bool,
}

impl DecoderState {
    pub fn new() -> Self {
        Default::default()
    }

    /// Return the most recently read ID record, whether or not its CRC was valid.
    pub fn last_idam(&self) -> Option<&IbmIdam> {
        self.last_idam.as_ref()
    }

    /// Return true if the last ID record had a valid CRC and has not yet been paired with data.
    pub fn idam_valid(&self) -> bool {
        self.idam_valid
    }

    /// Process a single record, returning the next state and any sector completed by it.
    pub fn step(self, record: &DecodedRecord, config: &DecoderConfig) -> (DecoderState, Option<DecodedSector>) {
        let Some(marker_byte) = record.marker() else {
            log::trace!("DecoderState::step(): Record has no address mark, ignoring");
            return (self, None);
        };

        match System34Marker::try_from(marker_byte) {
            Ok(System34Marker::Iam) => {
                // Track header. Ignore.
                (self, None)
            }
            Ok(System34Marker::Idam) => (self.read_idam(record, config), None),
            Ok(marker @ (System34Marker::Dam | System34Marker::Ddam)) => self.read_data(record, marker, config),
            Err(_) => {
                log::trace!("DecoderState::step(): Unknown address mark {:02X}, ignoring", marker_byte);
                (self, None)
            }
        }
    }

    fn read_idam(self, record: &DecodedRecord, config: &DecoderConfig) -> DecoderState {
        let Some(idam) = IbmIdam::from_bytes(record.body())
        else {
            log::debug!(
                "DecoderState::read_idam(): Short IDAM record ({} bytes), skipping",
                record.body().len()
            );
            return self.skip(config);
        };

        let crc_end = record.header_len() + IbmIdam::CRC_OFFSET + IBM_CRC_LEN;
        let (recorded_crc, calculated_crc) = System34Schema::crc16_bytes(&record.bytes()[..crc_end]);
        let idam_valid = calculated_crc == recorded_crc;

        log::trace!(
            "DecoderState::read_idam(): Sector ID: {} calculated CRC: {:04X} valid: {}",
            idam,
            calculated_crc,
            idam_valid
        );

        DecoderState {
            last_idam: Some(idam),
            idam_valid,
        }
    }

    fn read_data(
        self,
        record: &DecodedRecord,
        marker: System34Marker,
        config: &DecoderConfig,
    ) -> (DecoderState, Option<DecodedSector>) {
        let idam = match (self.idam_valid, self.last_idam) {
            (true, Some(idam)) => idam,
            _ => {
                log::trace!("DecoderState::read_data(): {:?} without a valid IDAM, skipping", marker);
                return (self, None);
            }
        };

        let available = record.body().len();
        let record_len = idam
            .sector_size_in_bytes()
            .and_then(|size| size.checked_add(IBM_DAM_LEN + IBM_CRC_LEN).map(|len| (size, len)));

        let size = match record_len {
            Some((size, len)) if len <= available => size,
            _ => {
                log::debug!(
                    "DecoderState::read_data(): {:?} for sector {} needs size code {} but only {} bytes are available, skipping",
                    marker,
                    idam.sector,
                    idam.sector_size,
                    available
                );
                return (self.skip(config), None);
            }
        };

        let bytes = record.bytes();
        let data_start = record.header_len() + IBM_DAM_LEN;
        let data_end = data_start + size;

        let (recorded_crc, calculated_crc) = System34Schema::crc16_bytes(&bytes[..data_end + IBM_CRC_LEN]);

        let status = if calculated_crc == recorded_crc {
            SectorStatus::Ok
        }
        else {
            log::warn!(
                "Data CRC error in sector {}: recorded {:04X} calculated {:04X}",
                idam,
                recorded_crc,
                calculated_crc
            );
            SectorStatus::BadChecksum
        };

        let sector = DecodedSector::new(
            status,
            idam.cylinder,
            idam.side,
            idam.sector as i16 - config.sector_id_base as i16,
            bytes[data_start..data_end].to_vec(),
        );
        log::trace!("DecoderState::read_data(): Decoded sector {}", sector);

        (
            DecoderState {
                last_idam: Some(idam),
                idam_valid: false,
            },
            Some(sector),
        )
    }

    /// Return the state that follows a record dropped as malformed.
    fn skip(self, config: &DecoderConfig) -> DecoderState {
        match config.pairing {
            PairingPolicy::Compatible => self,
            PairingPolicy::Strict => DecoderState {
                idam_valid: false,
                ..self
            },
        }
    }
}

pub struct System34Schema;

impl System34Schema {
    /// Decode a track's records into sectors, in the order their data records appear.
    pub fn decode_records<'a, I>(records: I, config: &DecoderConfig) -> Vec<DecodedSector>
    where
        I: IntoIterator<Item = &'a DecodedRecord>,
    {
        let (_, sectors) = records
            .into_iter()
            .fold((DecoderState::new(), Vec::new()), |(state, mut sectors), record| {
                let (next_state, sector) = state.step(record, config);
                sectors.extend(sector);
                (next_state, sectors)
            });
        sectors
    }

    /// Calculate a 16-bit CRC for the specified byte slice. The last two bytes of the slice
    /// should contain the recorded CRC.
    /// # Returns
    /// A tuple containing the CRC value recorded in the byte slice, and the calculated CRC value.
    pub fn crc16_bytes(data: &[u8]) -> (u16, u16) {
        let crc_start = data.len().saturating_sub(IBM_CRC_LEN);
        let recorded = match data.get(crc_start..) {
            Some([hi, lo]) => u16::from_be_bytes([*hi, *lo]),
            _ => 0,
        };
        let calculated = crc16(CCITT_POLY, &data[..crc_start]);
        (recorded, calculated)
    }
}
