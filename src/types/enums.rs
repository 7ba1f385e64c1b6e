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

    enums.rs

    Defines common enum types
*/
use std::{
    fmt,
    fmt::{Display, Formatter},
};

use strum::EnumIter;

/// The type of data encoding used by a track.
/// ibmtrack supports the two encodings defined by the IBM System 34 track format:
/// * Fm: Frequency Modulation encoding. Used by older 8" diskettes, and 'duplication mark' tracks
///   on some 3.5" and 5.25" diskettes.
/// * Mfm: Modified Frequency Modulation encoding. Used by almost all PC 5.25" and 3.5" diskettes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackDataEncoding {
    #[doc = "Frequency Modulation encoding. Used by older 8&quot; diskettes, and duplication tracks on some 5.25&quot; diskettes."]
    Fm,
    #[default]
    #[doc = "Modified Frequency Modulation encoding. Used by almost all 5.25&quot; and 3.5&quot; diskettes."]
    Mfm,
}

impl Display for TrackDataEncoding {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TrackDataEncoding::Fm => write!(f, "FM"),
            TrackDataEncoding::Mfm => write!(f, "MFM"),
        }
    }
}

impl std::str::FromStr for TrackDataEncoding {
    type Err = &'static str;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "fm" => Ok(TrackDataEncoding::Fm),
            "mfm" => Ok(TrackDataEncoding::Mfm),
            _ => Err("Invalid encoding; expected 'fm' or 'mfm'"),
        }
    }
}

/// The integrity status of a decoded sector.
/// A sector is only ever produced after its ID record passed its CRC check, so the status
/// reflects the CRC check of the data record alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectorStatus {
    Ok,
    BadChecksum,
}

impl SectorStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, SectorStatus::Ok)
    }
}

impl Display for SectorStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SectorStatus::Ok => write!(f, "OK"),
            SectorStatus::BadChecksum => write!(f, "BAD_CHECKSUM"),
        }
    }
}

/// Controls what happens to a pending sector ID when a record is skipped as malformed.
///
/// A sector ID that passed its CRC check stays pending until a data record consumes it. When
/// a following ID record is too short to parse, or a data record claims more bytes than it
/// holds, that record is dropped.
/// * `Compatible` leaves the pending ID in place, so it may pair with a later data record.
/// * `Strict` discards the pending ID whenever such a record is dropped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairingPolicy {
    #[default]
    Compatible,
    Strict,
}

impl Display for PairingPolicy {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PairingPolicy::Compatible => write!(f, "Compatible"),
            PairingPolicy::Strict => write!(f, "Strict"),
        }
    }
}
