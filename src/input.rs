//! Raw little-endian sample input.

use std::io::{self, ErrorKind, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::{ComplexSample, Sample};

/// Read up to `block.len()` float32 symbols, returning how many arrived.
///
/// A value torn by end of stream is dropped.
pub fn read_symbol_block<R: Read>(
    reader: &mut R,
    block: &mut [Sample],
) -> io::Result<usize> {
    for (count, slot) in block.iter_mut().enumerate() {
        match reader.read_f32::<LittleEndian>() {
            Ok(value) => *slot = value,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(count),
            Err(err) => return Err(err),
        }
    }
    Ok(block.len())
}

/// Read up to `block.len()` interleaved float32 I/Q pairs.
///
/// A pair missing its quadrature half at end of stream is dropped.
pub fn read_iq_block<R: Read>(
    reader: &mut R,
    block: &mut [ComplexSample],
) -> io::Result<usize> {
    for (count, slot) in block.iter_mut().enumerate() {
        let re = match reader.read_f32::<LittleEndian>() {
            Ok(value) => value,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(count),
            Err(err) => return Err(err),
        };
        let im = match reader.read_f32::<LittleEndian>() {
            Ok(value) => value,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(count),
            Err(err) => return Err(err),
        };
        *slot = ComplexSample::new(re, im);
    }
    Ok(block.len())
}
