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
pub mod args;

use anyhow::{bail, Error};
use std::io::{BufWriter, Write};

use crate::{args::GlobalOptions, read_store};
use ibmtrack::{DecodedSector, DecoderConfig, PairingPolicy, TrackDecoder};

pub(crate) fn run(global: &GlobalOptions, params: &args::DecodeParams) -> Result<(), Error> {
    let store = read_store(&params.in_file)?;
    if store.is_empty() {
        bail!("Track store {} contains no tracks", params.in_file.display());
    }

    let pairing = match params.strict {
        true => PairingPolicy::Strict,
        false => PairingPolicy::Compatible,
    };
    let decoder = TrackDecoder::new(params.encoding, DecoderConfig::new(params.base).with_pairing(pairing));
    let tick_period = params.tick_ns / 1_000_000_000.0;

    let mut buf = BufWriter::new(std::io::stdout());
    let mut total_sectors = 0;
    let mut total_bad = 0;

    for (ch, _) in store.iter() {
        let Some(capture) = store.capture(ch, tick_period)
        else {
            continue;
        };

        let sectors = match decoder.decode_capture(&capture) {
            Ok(sectors) => sectors,
            Err(e) => {
                log::warn!("Track {}: {}", ch, e);
                writeln!(buf, "{} unable to decode: {}", ch, e)?;
                continue;
            }
        };

        if !global.silent {
            writeln!(buf, "{} {} sectors", ch, sectors.len())?;
        }
        for sector in &sectors {
            writeln!(buf, "  {}", sector)?;
            if params.dump {
                dump_sector(&mut buf, sector)?;
            }
        }
        total_sectors += sectors.len();
        total_bad += sectors.iter().filter(|s| !s.status().is_ok()).count();
    }

    if !global.silent {
        writeln!(buf, "{} sectors decoded, {} with bad checksums", total_sectors, total_bad)?;
    }
    buf.flush()?;
    Ok(())
}

fn dump_sector(out: &mut impl Write, sector: &DecodedSector) -> Result<(), Error> {
    for (row, chunk) in sector.data().chunks(16).enumerate() {
        write!(out, "    {:04X}:", row * 16)?;
        for byte in chunk {
            write!(out, " {:02X}", byte)?;
        }
        write!(out, "{}", "   ".repeat(16 - chunk.len()))?;
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        writeln!(out, "  {}", ascii)?;
    }
    Ok(())
}
