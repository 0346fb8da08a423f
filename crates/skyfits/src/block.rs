//! The 2880-byte block structure shared by headers and data units.

use alloc::vec::Vec;

/// Bytes per block. Every header and data unit occupies whole blocks.
pub const BLOCK_SIZE: usize = 2880;

/// Bytes per header record.
pub const CARD_SIZE: usize = 80;

pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Fill byte after the END record.
pub(crate) const HEADER_PAD_BYTE: u8 = b' ';

/// Fill byte after the last sample of a data unit.
pub(crate) const DATA_PAD_BYTE: u8 = 0;

/// `len` rounded up to a whole number of blocks.
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// The complete blocks of `data`; a trailing partial block is skipped.
pub fn blocks(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.chunks_exact(BLOCK_SIZE)
}

/// The 36 records of one block, numbered from 0.
pub fn records(block: &[u8]) -> impl Iterator<Item = (usize, &[u8; CARD_SIZE])> {
    block
        .chunks_exact(CARD_SIZE)
        .filter_map(|chunk| chunk.try_into().ok())
        .enumerate()
}

/// Zero-fill `data` up to the next block boundary.
pub fn pad_data_unit(data: &mut Vec<u8>) {
    data.resize(padded_len(data.len()), DATA_PAD_BYTE);
}
