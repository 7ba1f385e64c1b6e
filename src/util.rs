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

    src/util.rs

    Checksum routines shared by the System 34 decoder.

*/

/// The CCITT polynomial, x^16 + x^12 + x^5 + 1.
pub const CCITT_POLY: u16 = 0x1021;

/// Calculate a non-reflected 16-bit CRC over `data` using the specified polynomial and initial
/// value, with no final XOR.
pub fn crc16_with(poly: u16, init: u16, data: &[u8]) -> u16 {
    let mut crc = init;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ poly;
            }
            else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Calculate a 16-bit CRC over `data` using the specified polynomial and the standard 0xFFFF
/// preset used by floppy disk controllers.
#[inline]
pub fn crc16(poly: u16, data: &[u8]) -> u16 {
    crc16_with(poly, 0xFFFF, data)
}

/// Calculate a CRC-16/IBM-3740 (also known as CRC-16/CCITT-FALSE) over `data`. An optional
/// starting value may be provided to continue a CRC over several slices.
#[inline]
pub fn crc_ibm_3740(data: &[u8], start: Option<u16>) -> u16 {
    crc16_with(CCITT_POLY, start.unwrap_or(0xFFFF), data)
}
