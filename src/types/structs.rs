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

    structs.rs

    Defines common structs
*/

use crate::types::{PairingPolicy, SectorStatus};

/// Configuration for a System 34 track decoder. A decoder's configuration is fixed for its
/// lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    /// The sector number of the first sector on a track as recorded in the ID field. IBM PC
    /// disks number sectors from 1; some other formats number them from 0.
    pub sector_id_base: u8,
    /// What to do with a pending sector ID when a malformed record is skipped.
    pub pairing: PairingPolicy,
}

impl DecoderConfig {
    pub fn new(sector_id_base: u8) -> Self {
        Self {
            sector_id_base,
            ..Default::default()
        }
    }

    pub fn with_pairing(mut self, pairing: PairingPolicy) -> Self {
        self.pairing = pairing;
        self
    }
}

/// A sector decoded from a track, with the geometry reported by its ID record and the
/// integrity status of its data record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedSector {
    status: SectorStatus,
    cylinder: u8,
    side: u8,
    sector: i16,
    data: Vec<u8>,
}

impl DecodedSector {
    pub(crate) fn new(status: SectorStatus, cylinder: u8, side: u8, sector: i16, data: Vec<u8>) -> Self {
        Self {
            status,
            cylinder,
            side,
            sector,
            data,
        }
    }

    pub fn status(&self) -> SectorStatus {
        self.status
    }
    /// Return the cylinder number recorded in the sector ID.
    pub fn cylinder(&self) -> u8 {
        self.cylinder
    }
    /// Return the side (head) number recorded in the sector ID.
    pub fn side(&self) -> u8 {
        self.side
    }
    /// Return the logical sector number: the recorded sector number minus the decoder's
    /// configured sector base. This is negative if the recorded number was below the base.
    pub fn sector(&self) -> i16 {
        self.sector
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl std::fmt::Display for DecodedSector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[c:{:2} h:{} s:{:3}] {} bytes {}",
            self.cylinder,
            self.side,
            self.sector,
            self.data.len(),
            self.status
        )
    }
}
