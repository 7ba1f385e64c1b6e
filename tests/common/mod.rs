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
#![allow(dead_code)]

use bit_vec::BitVec;
use ibmtrack::{
    bitstream_codec::{FmRecordCodec, MfmRecordCodec},
    util::crc_ibm_3740,
    TrackDataEncoding,
};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A sector to be written to a synthetic track.
#[derive(Clone, Debug)]
pub struct TestSector {
    pub cylinder: u8,
    pub side: u8,
    pub sector: u8,
    pub size_code: u8,
    pub data: Vec<u8>,
    pub deleted: bool,
    pub bad_id_crc: bool,
    pub bad_data_crc: bool,
    pub omit_id: bool,
    pub omit_data: bool,
}

impl TestSector {
    pub fn new(cylinder: u8, side: u8, sector: u8, data: Vec<u8>) -> Self {
        let size_code = match data.len() {
            128 => 0,
            256 => 1,
            512 => 2,
            1024 => 3,
            _ => 0,
        };
        TestSector {
            cylinder,
            side,
            sector,
            size_code,
            data,
            deleted: false,
            bad_id_crc: false,
            bad_data_crc: false,
            omit_id: false,
            omit_data: false,
        }
    }

    fn id_record(&self) -> Vec<u8> {
        vec![0xFE, self.cylinder, self.side, self.sector, self.size_code]
    }

    fn data_record(&self) -> Vec<u8> {
        let mut record = vec![if self.deleted { 0xF8 } else { 0xFB }];
        record.extend_from_slice(&self.data);
        record
    }
}

pub fn random_payload(len: usize) -> Vec<u8> {
    (0..len).map(|_| rand::random::<u8>()).collect()
}

/// Append the CRC of `sync` followed by `record` to `record`, optionally corrupting it.
fn append_crc(sync: &[u8], record: &mut Vec<u8>, corrupt: bool) {
    let mut crc = crc_ibm_3740(sync, None);
    crc = crc_ibm_3740(record, Some(crc));
    if corrupt {
        crc ^= 0x5555;
    }
    record.extend_from_slice(&crc.to_be_bytes());
}

fn mfm_gap(bits: &mut BitVec, len: usize) {
    bits.extend(MfmRecordCodec::encode(&vec![0x4E; len], false).iter());
}

fn mfm_record(bits: &mut BitVec, mut record: Vec<u8>, bad_crc: bool) {
    append_crc(&[0xA1, 0xA1, 0xA1], &mut record, bad_crc);
    bits.extend(MfmRecordCodec::encode(&[0x00; 12], false).iter());
    MfmRecordCodec::encode_sync(bits);
    bits.extend(MfmRecordCodec::encode(&record, true).iter());
}

/// Build an MFM track bitstream holding the specified sectors in order.
pub fn build_mfm_track(sectors: &[TestSector]) -> BitVec {
    let mut bits = BitVec::new();
    mfm_gap(&mut bits, 80);
    for sector in sectors {
        if !sector.omit_id {
            mfm_record(&mut bits, sector.id_record(), sector.bad_id_crc);
        }
        mfm_gap(&mut bits, 22);
        if !sector.omit_data {
            mfm_record(&mut bits, sector.data_record(), sector.bad_data_crc);
        }
        mfm_gap(&mut bits, 54);
    }
    mfm_gap(&mut bits, 100);
    bits
}

fn fm_gap(bits: &mut BitVec, len: usize) {
    bits.extend(FmRecordCodec::encode(&vec![0xFF; len]).iter());
}

fn fm_record(bits: &mut BitVec, mut record: Vec<u8>, bad_crc: bool) {
    append_crc(&[], &mut record, bad_crc);
    bits.extend(FmRecordCodec::encode(&[0x00; 6]).iter());
    FmRecordCodec::encode_sync(bits, record[0], 0xC7);
    bits.extend(FmRecordCodec::encode(&record[1..]).iter());
}

/// Build an FM track bitstream holding the specified sectors in order.
pub fn build_fm_track(sectors: &[TestSector]) -> BitVec {
    let mut bits = BitVec::new();
    fm_gap(&mut bits, 40);
    bits.extend(FmRecordCodec::encode(&[0x00; 6]).iter());
    FmRecordCodec::encode_sync(&mut bits, 0xFC, 0xD7);
    fm_gap(&mut bits, 26);
    for sector in sectors {
        if !sector.omit_id {
            fm_record(&mut bits, sector.id_record(), sector.bad_id_crc);
        }
        fm_gap(&mut bits, 11);
        if !sector.omit_data {
            fm_record(&mut bits, sector.data_record(), sector.bad_data_crc);
        }
        fm_gap(&mut bits, 27);
    }
    fm_gap(&mut bits, 100);
    bits
}

pub fn build_track(encoding: TrackDataEncoding, sectors: &[TestSector]) -> BitVec {
    match encoding {
        TrackDataEncoding::Fm => build_fm_track(sectors),
        TrackDataEncoding::Mfm => build_mfm_track(sectors),
    }
}

/// Convert a bitstream into flux intervals, with `cell` seconds per bitcell. A small amount of
/// jitter is added to each interval.
pub fn bits_to_flux(bits: &BitVec, cell: f64, jitter: f64) -> Vec<f64> {
    let mut deltas = Vec::new();
    let mut cells = 0u32;
    for bit in bits.iter() {
        cells += 1;
        if bit {
            let noise = (rand::random::<f64>() * 2.0 - 1.0) * jitter;
            deltas.push(cells as f64 * cell + noise);
            cells = 0;
        }
    }
    deltas
}

/// A standard 9 sector, 512 byte per sector track with random payloads.
pub fn standard_sectors(cylinder: u8, side: u8) -> Vec<TestSector> {
    (1..=9)
        .map(|s| TestSector::new(cylinder, side, s, random_payload(512)))
        .collect()
}
