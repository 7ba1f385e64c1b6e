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

    src/raw_store.rs

    A simple container for raw flux captures, keyed by physical track and side.

    The container format is little-endian:

      magic:   b"IBMRAW"
      count:   u32, the number of entries
      entries: count * { track: u16, side: u8, len: u32, data: [u8; len] }

    Entry data is the capture in tick form, see [FluxCapture::from_ticks].

*/

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Seek, Write},
    path::Path,
};

use binrw::{binrw, BinRead, BinWrite};

use crate::{flux::FluxCapture, types::chs::DiskCh, IbmTrackError};

pub const RAW_STORE_MAGIC: &[u8; 6] = b"IBMRAW";

#[binrw]
#[derive(Debug)]
#[brw(little)]
struct RawStoreHeader {
    magic: [u8; 6],
    count: u32,
}

#[binrw]
#[derive(Debug)]
#[brw(little)]
struct RawStoreEntry {
    track: u16,
    side: u8,
    #[bw(calc = data.len() as u32)]
    len: u32,
    #[br(count = len as usize)]
    data: Vec<u8>,
}

/// A collection of raw track captures. Each physical (track, side) location holds at most one
/// capture; iteration is in track, then side order.
#[derive(Clone, Debug, Default)]
pub struct RawTrackStore {
    tracks: BTreeMap<DiskCh, Vec<u8>>,
}

impl RawTrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the capture for `ch`, replacing any capture already stored there.
    pub fn insert(&mut self, ch: impl Into<DiskCh>, data: Vec<u8>) -> Option<Vec<u8>> {
        self.tracks.insert(ch.into(), data)
    }

    pub fn get(&self, ch: impl Into<DiskCh>) -> Option<&[u8]> {
        self.tracks.get(&ch.into()).map(|data| data.as_slice())
    }

    /// Return the capture for `ch` as flux intervals, given the capture's sample tick period.
    pub fn capture(&self, ch: impl Into<DiskCh>, tick_period: f64) -> Option<FluxCapture> {
        self.get(ch).map(|data| FluxCapture::from_ticks(data, tick_period))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DiskCh, &[u8])> {
        self.tracks.iter().map(|(ch, data)| (*ch, data.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, IbmTrackError> {
        let header = RawStoreHeader::read(reader)?;
        if &header.magic != RAW_STORE_MAGIC {
            log::error!("RawTrackStore::read(): Bad signature: {:02X?}", header.magic);
            return Err(IbmTrackError::FormatParseError);
        }

        log::debug!("RawTrackStore::read(): Reading {} entries", header.count);
        let mut store = RawTrackStore::new();
        for _ in 0..header.count {
            let entry = RawStoreEntry::read(reader)?;
            let ch = DiskCh::new(entry.track, entry.side);
            log::trace!("RawTrackStore::read(): {} {} bytes", ch, entry.data.len());
            if store.insert(ch, entry.data).is_some() {
                log::warn!("RawTrackStore::read(): Duplicate entry for {}, keeping the last", ch);
            }
        }
        Ok(store)
    }

    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), IbmTrackError> {
        let count = u32::try_from(self.tracks.len()).map_err(|_| IbmTrackError::ParameterError)?;
        RawStoreHeader {
            magic: *RAW_STORE_MAGIC,
            count,
        }
        .write(writer)?;

        for (ch, data) in &self.tracks {
            if u32::try_from(data.len()).is_err() {
                log::error!("RawTrackStore::write(): Capture for {} is too large", ch);
                return Err(IbmTrackError::ParameterError);
            }
            RawStoreEntry {
                track: ch.c(),
                side: ch.h(),
                data: data.clone(),
            }
            .write(writer)?;
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, IbmTrackError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), IbmTrackError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_insert_replaces() {
        let mut store = RawTrackStore::new();
        assert!(store.is_empty());
        assert!(store.insert((0, 0), vec![1, 2, 3]).is_none());
        assert_eq!(store.insert((0, 0), vec![4]), Some(vec![1, 2, 3]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get((0, 0)), Some(&[4u8][..]));
        assert!(store.get((0, 1)).is_none());
    }

    #[test]
    fn test_iteration_order() {
        let mut store = RawTrackStore::new();
        store.insert((2, 0), vec![]);
        store.insert((0, 1), vec![]);
        store.insert((0, 0), vec![]);
        store.insert((1, 1), vec![]);
        let order: Vec<(u16, u8)> = store.iter().map(|(ch, _)| (ch.c(), ch.h())).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_layout() {
        let mut store = RawTrackStore::new();
        store.insert((1, 1), vec![0xAB, 0xCD]);
        let mut cursor = Cursor::new(Vec::new());
        store.write(&mut cursor).unwrap();

        let mut expected = b"IBMRAW".to_vec();
        expected.extend_from_slice(&[1, 0, 0, 0]);
        expected.extend_from_slice(&[1, 0, 1, 2, 0, 0, 0, 0xAB, 0xCD]);
        assert_eq!(cursor.into_inner(), expected);
    }

    #[test]
    fn test_entry_debug() {
        let mut cursor = Cursor::new(vec![2, 0, 1, 1, 0, 0, 0, 0x5A]);
        let entry = RawStoreEntry::read(&mut cursor).unwrap();
        assert_eq!(entry.data, vec![0x5A]);
        let text = format!("{:?}", entry);
        assert!(text.contains("track: 2"), "{}", text);
        assert!(!text.contains("len"), "{}", text);
    }

    #[test]
    fn test_read_write() {
        let mut store = RawTrackStore::new();
        store.insert((0, 0), vec![20, 40, 0xFF, 5]);
        store.insert((39, 1), vec![60; 100]);

        let mut cursor = Cursor::new(Vec::new());
        store.write(&mut cursor).unwrap();
        cursor.set_position(0);
        let restored = RawTrackStore::read(&mut cursor).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get((0, 0)), store.get((0, 0)));
        assert_eq!(restored.get((39, 1)), store.get((39, 1)));
    }

    #[test]
    fn test_bad_signature() {
        let mut cursor = Cursor::new(b"IBMRAX\0\0\0\0".to_vec());
        assert!(matches!(
            RawTrackStore::read(&mut cursor),
            Err(IbmTrackError::FormatParseError)
        ));
    }

    #[test]
    fn test_truncated_entry() {
        let mut bytes = b"IBMRAW".to_vec();
        bytes.extend_from_slice(&[1, 0, 0, 0]);
        bytes.extend_from_slice(&[0, 0, 0, 10, 0, 0, 0, 1, 2]);
        assert!(RawTrackStore::read(&mut Cursor::new(bytes)).is_err());
    }

    #[test]
    fn test_capture() {
        let mut store = RawTrackStore::new();
        store.insert((0, 0), vec![10, 20]);
        let capture = store.capture((0, 0), 1.0e-7).unwrap();
        assert_eq!(capture.len(), 2);
    }
}
