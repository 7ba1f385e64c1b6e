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

//! This module defines a [FluxHistogram] structure which is used to estimate the nominal
//! bitcell period of a flux track so that its flux transitions may be resolved into bitcells.
//!
//! The shortest common flux interval on a track is one FM bitcell, or two MFM bitcells. The
//! [RecordCodec](crate::bitstream_codec::RecordCodec) for the track's encoding converts that
//! raw estimate into the clock actually used for decoding.

use histogram::{Bucket, Histogram};

pub struct FluxHistogram {
    histogram: Histogram,
    maxima: Vec<(u64, std::ops::RangeInclusive<u64>)>,
}

impl FluxHistogram {
    /// Produce a [FluxHistogram] over a fraction of the flux deltas in a track.
    /// # Arguments
    /// * `deltas` - A slice of flux delta times, in seconds
    /// * `fraction` - The fraction of the deltas to use in the histogram
    pub fn new(deltas: &[f64], fraction: f64) -> Self {
        // Max value power of 2^14 = 16384 (16us)
        // Grouping power of 3 produces sharp spikes without false maxima
        let mut histogram = Histogram::new(3, 14).expect("histogram parameters are constant");

        let take_count = (deltas.len() as f64 * fraction).round() as usize;
        log::debug!("FluxHistogram::new(): Taking {} flux deltas", take_count);
        for delta_ns in deltas.iter().take(take_count).map(|d| Self::delta_to_u64(*d)) {
            // Deltas beyond the histogram range are outliers and are not counted.
            _ = histogram.increment(delta_ns);
        }

        FluxHistogram {
            histogram,
            maxima: Vec::new(),
        }
    }

    fn delta_to_u64(value: f64) -> u64 {
        (value * 1_000_000_000.0) as u64
    }

    fn u64_to_delta(value: u64) -> f64 {
        value as f64 / 1_000_000_000.0
    }

    /// Locate local maxima in a histogram by bucket. Maxima holding less than `threshold` of
    /// all counted deltas are ignored.
    fn find_local_maxima(&mut self, threshold: Option<f64>) -> &Vec<(u64, std::ops::RangeInclusive<u64>)> {
        let mut peaks = vec![];
        let mut previous_bucket: Option<Bucket> = None;
        let mut current_bucket: Option<Bucket> = None;

        let total_count: u64 = self.histogram.into_iter().map(|bucket| bucket.count()).sum();
        let threshold = (total_count as f64 * threshold.unwrap_or(0.005)).round() as u64;

        for bucket in self.histogram.into_iter() {
            if let Some(curr) = current_bucket.as_ref() {
                let prev_count = previous_bucket.as_ref().map_or(0, |prev| prev.count());
                if curr.count() >= prev_count && curr.count() > bucket.count() && curr.count() >= threshold.max(1) {
                    peaks.push((curr.count(), curr.start()..=curr.end()));
                }
            }
            previous_bucket = current_bucket.take();
            current_bucket = Some(bucket.clone());
        }

        self.maxima = peaks;
        &self.maxima
    }

    /// Return the shortest significant flux interval, taken as the middle of the first peak,
    /// or None if the histogram has no peaks.
    pub fn base_transition_time(&mut self) -> Option<f64> {
        if self.maxima.is_empty() {
            self.find_local_maxima(None);
        }

        let Some((_, first_peak)) = self.maxima.first()
        else {
            log::warn!("FluxHistogram::base_transition_time(): No peaks found");
            return None;
        };

        let range_median = (first_peak.start() + first_peak.end()) / 2;

        // Convert back to seconds
        Some(Self::u64_to_delta(range_median))
    }
}
