/*
    ibmtool
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
use crate::args::*;
use bpaf::{construct, long, Parser};
use ibmtrack::{flux::DEFAULT_TICK_PERIOD, TrackDataEncoding};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct DecodeParams {
    pub(crate) in_file: PathBuf,
    pub(crate) encoding: TrackDataEncoding,
    pub(crate) base: u8,
    pub(crate) tick_ns: f64,
    pub(crate) strict: bool,
    pub(crate) dump: bool,
}

fn encoding_parser() -> impl Parser<TrackDataEncoding> {
    long("encoding")
        .short('e')
        .argument::<TrackDataEncoding>("ENCODING")
        .help("Specify the track encoding: fm or mfm")
}

fn base_parser() -> impl Parser<u8> {
    long("base")
        .argument::<u8>("BASE")
        .help("Specify the sector number of the first sector on a track. Defaults to 1")
        .fallback(1)
}

fn tick_parser() -> impl Parser<f64> {
    long("tick_ns")
        .argument::<f64>("TICK_NS")
        .help("Specify the sample tick period of the stored captures, in nanoseconds")
        .guard(|&tick| tick > 0.0, "Tick period must be greater than 0")
        .fallback(DEFAULT_TICK_PERIOD * 1_000_000_000.0)
}

fn strict_parser() -> impl Parser<bool> {
    long("strict")
        .help("Discard a pending ID record when a record that cannot be its partner is skipped")
        .switch()
}

fn dump_parser() -> impl Parser<bool> {
    long("dump").help("Hex dump the data of each decoded sector").switch()
}

pub(crate) fn decode_parser() -> impl Parser<DecodeParams> {
    let in_file = in_file_parser();
    let encoding = encoding_parser();
    let base = base_parser();
    let tick_ns = tick_parser();
    let strict = strict_parser();
    let dump = dump_parser();

    construct!(DecodeParams {
        in_file,
        encoding,
        base,
        tick_ns,
        strict,
        dump
    })
}
