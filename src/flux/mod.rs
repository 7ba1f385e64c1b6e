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

//! The `flux` module converts captured flux transition timings into a track bitstream.
//!
//! Raw captures are stored as one byte per flux interval, counted in sample clock ticks. A
//! [FluxCapture] turns these into interval times; with a bitcell clock (see
//! [FluxCapture::guess_raw_clock] and [RecordCodec::guess_clock](crate::bitstream_codec::RecordCodec::guess_clock))
//! the intervals are resolved into bitcells by [flux_to_bitstream].

#[cfg(feature = "flux")]
mod histogram;

use bit_vec::BitVec;

#[cfg(feature = "flux")]
pub use histogram::FluxHistogram;

/// A tick byte of this value adds its ticks to the next interval without ending it.
pub const TICK_OVERFLOW: u8 = 0xFF;
/// The default sample clock tick of raw captures: 12MHz.
pub const DEFAULT_TICK_PERIOD: f64 = 1.0 / 12_000_000.0;

#[doc(hidden)]
#[macro_export]
macro_rules! format_us {
    ($value:expr) => {
        format!("{:.4}μs", $value * 1_000_000.0)
    };
}

/// The flux transition intervals of a single captured track, in seconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FluxCapture {
    deltas: Vec<f64>,
}

impl From<Vec<f64>> for FluxCapture {
    fn from(deltas: Vec<f64>) -> Self {
        FluxCapture { deltas }
    }
}

impl FluxCapture {
    /// Read a capture stored as one byte per flux interval, in units of `tick_period` seconds.
    /// A byte of [TICK_OVERFLOW] extends the current interval by 255 ticks.
    pub fn from_ticks(bytes: &[u8], tick_period: f64) -> Self {
        let mut deltas = Vec::with_capacity(bytes.len());
        let mut ticks: u64 = 0;

        for &byte in bytes {
            ticks += byte as u64;
            if byte != TICK_OVERFLOW && ticks > 0 {
                deltas.push(ticks as f64 * tick_period);
                ticks = 0;
            }
        }
        FluxCapture { deltas }
    }

    /// Store the capture as one byte per flux interval, in units of `tick_period` seconds.
    pub fn to_ticks(&self, tick_period: f64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.deltas.len());
        for delta in &self.deltas {
            let mut ticks = (delta / tick_period).round() as u64;
            while ticks >= TICK_OVERFLOW as u64 {
                bytes.push(TICK_OVERFLOW);
                ticks -= TICK_OVERFLOW as u64;
            }
            bytes.push(ticks as u8);
        }
        bytes
    }

    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Return the total time of the capture in seconds.
    pub fn total_time(&self) -> f64 {
        self.deltas.iter().sum()
    }

    /// Estimate the raw nominal bitcell period of the capture from its shortest common flux
    /// interval.
    #[cfg(feature = "flux")]
    pub fn guess_raw_clock(&self) -> Option<f64> {
        FluxHistogram::new(&self.deltas, 1.0).base_transition_time()
    }
}

/// Resolve flux intervals into bitcells using a fixed bitcell clock period. Each interval
/// covers the nearest whole number of bitcells (at least one); the last bitcell of an interval
/// holds the transition.
pub fn flux_to_bitstream(deltas: &[f64], clock: f64) -> BitVec {
    let mut bits = BitVec::new();
    if !(clock > 0.0) {
        log::warn!("flux_to_bitstream(): Invalid clock period {}", clock);
        return bits;
    }

    for &delta in deltas {
        let cells = ((delta / clock).round() as usize).max(1);
        bits.grow(cells - 1, false);
        bits.push(true);
    }

    log::debug!(
        "flux_to_bitstream(): Resolved {} transitions into {} bitcells at clock {}",
        deltas.len(),
        bits.len(),
        format_us!(clock)
    );
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f64 = 1.0e-7;

    #[test]
    fn test_flux_to_bitstream() {
        let clock = 2.0e-6;
        let bits = flux_to_bitstream(&[4.0e-6, 6.1e-6, 7.8e-6, 2.0e-6], clock);
        let expected: BitVec = [false, true, false, false, true, false, false, false, true, true]
            .into_iter()
            .collect();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_flux_to_bitstream_short_interval() {
        // A glitch shorter than half a bitcell still produces a transition.
        let bits = flux_to_bitstream(&[0.2e-6], 2.0e-6);
        assert_eq!(bits.len(), 1);
        assert!(bits[0]);
    }

    #[test]
    fn test_flux_to_bitstream_invalid_clock() {
        assert!(flux_to_bitstream(&[4.0e-6], 0.0).is_empty());
        assert!(flux_to_bitstream(&[4.0e-6], f64::NAN).is_empty());
    }

    #[test]
    fn test_from_ticks() {
        let capture = FluxCapture::from_ticks(&[20, 40, 0xFF, 5, 0, 60], TICK);
        let ticks: Vec<u64> = capture
            .deltas()
            .iter()
            .map(|d| (d / TICK).round() as u64)
            .collect();
        assert_eq!(ticks, vec![20, 40, 260, 60]);
    }

    #[test]
    fn test_to_ticks_overflow() {
        let capture = FluxCapture::from(vec![2.0e-6, 60.0e-6, 25.5e-6]);
        let bytes = capture.to_ticks(TICK);
        assert_eq!(bytes, vec![20, 0xFF, 0xFF, 90, 0xFF, 0]);

        let restored = FluxCapture::from_ticks(&bytes, TICK);
        assert_eq!(restored.len(), 3);
        assert!((restored.total_time() - capture.total_time()).abs() < 1.0e-9);
    }

    #[cfg(feature = "flux")]
    #[test]
    fn test_guess_raw_clock() {
        let mut deltas = Vec::new();
        for i in 0..2000 {
            deltas.push(if i % 3 == 0 { 4.0e-6 } else { 2.0e-6 });
        }
        let capture = FluxCapture::from(deltas);
        let clock = capture.guess_raw_clock().unwrap();
        assert!((clock - 2.0e-6).abs() < 0.1e-6, "clock was {}", clock);
    }
}
