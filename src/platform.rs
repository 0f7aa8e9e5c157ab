use crate::{portable, StateWords, BLOCK_LEN};
use arrayref::{array_mut_ref, array_ref};

/// The backend selected for the compression function.
///
/// The engine calls the compression function only through this type, so an
/// accelerated implementation of the same
/// `(state, block, counter, final flag) -> state` contract can be added as
/// a variant here without touching the buffering or finalization logic.
/// Only the portable software backend currently exists, and the engine
/// never assumes anything else is available.
#[derive(Clone, Copy, Debug)]
pub enum Platform {
    Portable,
}

impl Platform {
    pub fn detect() -> Self {
        // Runtime feature detection for accelerated backends goes here.
        Platform::Portable
    }

    pub fn compress_in_place(
        &self,
        h: &mut StateWords,
        block: &[u8; BLOCK_LEN],
        count: u128,
        last: bool,
    ) {
        match self {
            Platform::Portable => portable::compress_in_place(h, block, count, last),
        }
    }
}

// Byte-order conversion helpers. BLAKE2b is all little-endian.

pub fn words_from_le_bytes_128(bytes: &[u8; BLOCK_LEN]) -> [u64; 16] {
    let mut out = [0; 16];
    for (i, word) in out.iter_mut().enumerate() {
        *word = u64::from_le_bytes(*array_ref!(bytes, 8 * i, 8));
    }
    out
}

pub fn le_bytes_from_words_64(words: &StateWords) -> [u8; 64] {
    let mut out = [0; 64];
    for (i, word) in words.iter().enumerate() {
        *array_mut_ref!(out, 8 * i, 8) = word.to_le_bytes();
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_byte_order_round_trip() {
        let mut block = [0; BLOCK_LEN];
        crate::test::paint_test_input(&mut block);
        let words = words_from_le_bytes_128(&block);
        assert_eq!(u64::from_le_bytes(*array_ref!(block, 0, 8)), words[0]);
        let front: StateWords = *array_ref!(words, 0, 8);
        assert_eq!(&le_bytes_from_words_64(&front)[..], &block[..64]);
    }
}
