//! This is a deliberately simple BLAKE2b, written as close to the RFC 7693
//! pseudocode as possible. It buffers the entire input and does all of its
//! compression work in `finalize`, so there's no block-boundary bookkeeping
//! to get subtly wrong. The real implementation is tested against it.

const OUT_LEN: usize = 64;
const KEY_LEN: usize = 64;
const BLOCK_LEN: usize = 128;
const SALT_LEN: usize = 16;
const PERSONAL_LEN: usize = 16;

const IV: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

const SIGMA: [[usize; 16]; 12] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
];

fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

fn compress(h: &mut [u64; 8], block: &[u8; BLOCK_LEN], t: u128, last: bool) {
    let mut m = [0u64; 16];
    for (i, chunk) in block.chunks_exact(8).enumerate() {
        m[i] = u64::from_le_bytes(chunk.try_into().unwrap());
    }

    let mut v = [0u64; 16];
    v[..8].copy_from_slice(h);
    v[8..].copy_from_slice(&IV);
    v[12] ^= t as u64;
    v[13] ^= (t >> 64) as u64;
    if last {
        v[14] = !v[14];
    }

    for s in &SIGMA {
        g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

/// A reference hash state. It holds all of its input until `finalize`.
pub struct Hasher {
    h: [u64; 8],
    data: Vec<u8>,
    out_len: usize,
}

impl Hasher {
    /// Equivalent to `with_params(64, &[], &[], &[])`.
    pub fn new() -> Self {
        Self::with_params(OUT_LEN, &[], &[], &[])
    }

    /// Equivalent to `with_params(64, key, &[], &[])`.
    pub fn new_keyed(key: &[u8]) -> Self {
        Self::with_params(OUT_LEN, key, &[], &[])
    }

    /// Construct a hash state for any parameter set. Panics on out-of-range
    /// parameters; callers are tests that pass valid ones.
    pub fn with_params(out_len: usize, key: &[u8], salt: &[u8], personal: &[u8]) -> Self {
        assert!(out_len >= 1 && out_len <= OUT_LEN);
        assert!(key.len() <= KEY_LEN);
        assert!(salt.len() <= SALT_LEN);
        assert!(personal.len() <= PERSONAL_LEN);

        let mut h = IV;
        h[0] ^= 0x0101_0000 ^ ((key.len() as u64) << 8) ^ out_len as u64;
        let mut salt_block = [0u8; SALT_LEN];
        salt_block[..salt.len()].copy_from_slice(salt);
        let mut personal_block = [0u8; PERSONAL_LEN];
        personal_block[..personal.len()].copy_from_slice(personal);
        h[4] ^= u64::from_le_bytes(salt_block[..8].try_into().unwrap());
        h[5] ^= u64::from_le_bytes(salt_block[8..].try_into().unwrap());
        h[6] ^= u64::from_le_bytes(personal_block[..8].try_into().unwrap());
        h[7] ^= u64::from_le_bytes(personal_block[8..].try_into().unwrap());

        // In keyed mode the zero-padded key is the first message block.
        let mut data = Vec::new();
        if !key.is_empty() {
            data.resize(BLOCK_LEN, 0);
            data[..key.len()].copy_from_slice(key);
        }

        Self { h, data, out_len }
    }

    /// Add input to the hash state. This can be called any number of times.
    pub fn update(&mut self, input: &[u8]) {
        self.data.extend_from_slice(input);
    }

    /// Finalize the hash and write the result to `out`, truncated or
    /// zero-extended to `out.len()` bytes beyond the digest length.
    pub fn finalize(&self, out: &mut [u8]) {
        let mut h = self.h;
        let mut t: u128 = 0;
        let mut rest = &self.data[..];
        loop {
            if rest.len() > BLOCK_LEN {
                t += BLOCK_LEN as u128;
                compress(
                    &mut h,
                    rest[..BLOCK_LEN].try_into().unwrap(),
                    t,
                    false,
                );
                rest = &rest[BLOCK_LEN..];
            } else {
                // The last block is always compressed with the final flag,
                // even when it's full, and the empty message still gets one
                // all-zero final block.
                let mut block = [0u8; BLOCK_LEN];
                block[..rest.len()].copy_from_slice(rest);
                t += rest.len() as u128;
                compress(&mut h, &block, t, true);
                break;
            }
        }

        let mut digest = [0u8; OUT_LEN];
        for (i, word) in h.iter().enumerate() {
            digest[8 * i..8 * (i + 1)].copy_from_slice(&word.to_le_bytes());
        }
        let take = out.len().min(self.out_len);
        out[..take].copy_from_slice(&digest[..take]);
        for b in &mut out[take..] {
            *b = 0;
        }
    }
}
