//! An implementation of the BLAKE2b cryptographic hash function ([RFC
//! 7693]), supporting keyed hashing (MAC mode), salting, personalization,
//! and digest lengths from 1 to 64 bytes.
//!
//! # Examples
//!
//! ```
//! # fn main() -> Result<(), blake2b::Error> {
//! // Hash an input all at once.
//! let hash1 = blake2b::hash(b"foobarbaz");
//!
//! // Hash an input incrementally.
//! let mut hasher = blake2b::Hasher::new();
//! hasher.update(b"foo")?;
//! hasher.update(b"bar")?;
//! hasher.update(b"baz")?;
//! assert_eq!(hash1, hasher.finalize()?);
//!
//! // MAC mode, with a 32-byte output.
//! let mac = blake2b::hash_with(32, b"some key", &[], &[], b"a message")?;
//! assert_eq!(32, mac.as_bytes().len());
//!
//! // Print a hash as hex.
//! println!("{}", hash1);
//! # Ok(())
//! # }
//! ```
//!
//! # Cargo Features
//!
//! The `std` feature (the only feature enabled by default) is required for
//! the [`Write`] implementation on [`Hasher`]. With it disabled this crate
//! is `no_std`.
//!
//! [RFC 7693]: https://www.rfc-editor.org/rfc/rfc7693
//! [`Write`]: https://doc.rust-lang.org/std/io/trait.Write.html

#![cfg_attr(not(feature = "std"), no_std)]


// The compression function. The portable implementation is always available;
// platform-accelerated implementations of the same contract hook in through
// the platform module.
mod platform;
mod portable;

use arrayref::array_ref;
use arrayvec::ArrayString;
use core::cmp;
use core::fmt;
use platform::Platform;

/// The largest supported digest length, and the default, 64 bytes.
pub const OUT_LEN: usize = 64;

/// The largest supported key length, 64 bytes.
pub const KEY_LEN: usize = 64;

/// The number of bytes in a message block, 128.
pub const BLOCK_LEN: usize = 128;

/// The number of bytes in a salt, 16.
pub const SALT_LEN: usize = 16;

/// The number of bytes in a personalization string, 16.
pub const PERSONAL_LEN: usize = 16;

// The chained state is eight 64-bit words, serialized little-endian.
type StateWords = [u64; 8];

const IV: StateWords = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

// The message word schedule, one row per round. BLAKE2b runs twelve rounds
// over the ten distinct permutations, so rows ten and eleven repeat rows
// zero and one.
const MSG_SCHEDULE: [[usize; 16]; 12] = [
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

#[inline]
fn counter_low(count: u128) -> u64 {
    count as u64
}

#[inline]
fn counter_high(count: u128) -> u64 {
    (count >> 64) as u64
}

/// A finalized digest of 1 to 64 bytes, which provides constant-time
/// equality checking.
///
/// `Hash` stores its length, so digests of different lengths never compare
/// equal, and [`as_bytes`] returns exactly the number of bytes requested at
/// initialization. Byte slices don't provide constant-time equality
/// checking, which is often a security requirement for MACs, so `Hash`
/// doesn't implement [`Deref`] or [`AsRef`], to avoid situations where a
/// type conversion happens implicitly and the constant-time property is
/// accidentally lost.
///
/// `Hash` provides [`to_hex`] and [`from_hex`] for converting to and from
/// hexadecimal. It also implements [`Display`] and [`FromStr`].
///
/// [`as_bytes`]: #method.as_bytes
/// [`Deref`]: https://doc.rust-lang.org/stable/std/ops/trait.Deref.html
/// [`AsRef`]: https://doc.rust-lang.org/std/convert/trait.AsRef.html
/// [`to_hex`]: #method.to_hex
/// [`from_hex`]: #method.from_hex
/// [`Display`]: https://doc.rust-lang.org/std/fmt/trait.Display.html
/// [`FromStr`]: https://doc.rust-lang.org/std/str/trait.FromStr.html
#[derive(Clone, Copy)]
pub struct Hash {
    // Unused tail bytes are always zero, so two equal digests have equal
    // backing arrays.
    bytes: [u8; OUT_LEN],
    len: u8,
}

impl Hash {
    /// The raw bytes of the `Hash`, exactly the digest length requested at
    /// initialization. Note that byte slices don't provide constant-time
    /// equality checking, so if you need to compare hashes, prefer the
    /// `Hash` type.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// The digest length in bytes, 1 to 64.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Encode a `Hash` in lowercase hexadecimal.
    ///
    /// The returned [`ArrayString`] is a fixed capacity and doesn't allocate
    /// memory on the heap. Its length is twice the digest length. Note that
    /// [`ArrayString`] doesn't provide constant-time equality checking, so
    /// if you need to compare hashes, prefer the `Hash` type.
    ///
    /// [`ArrayString`]: https://docs.rs/arrayvec/0.7/arrayvec/struct.ArrayString.html
    pub fn to_hex(&self) -> ArrayString<{ 2 * OUT_LEN }> {
        let mut s = ArrayString::new();
        let table = b"0123456789abcdef";
        for &b in self.as_bytes() {
            s.push(table[(b >> 4) as usize] as char);
            s.push(table[(b & 0xf) as usize] as char);
        }
        s
    }

    /// Decode a `Hash` from hexadecimal. Both uppercase and lowercase ASCII
    /// bytes are supported.
    ///
    /// Any byte outside the ranges `'0'...'9'`, `'a'...'f'`, and `'A'...'F'`
    /// results in an error. An input length that is odd, zero, or more than
    /// 128 also results in an error.
    ///
    /// Note that `Hash` also implements `FromStr`, so `Hash::from_hex("...")`
    /// is equivalent to `"...".parse()`.
    pub fn from_hex(hex: impl AsRef<[u8]>) -> Result<Self, HexError> {
        fn hex_val(byte: u8) -> Result<u8, HexError> {
            match byte {
                b'A'..=b'F' => Ok(byte - b'A' + 10),
                b'a'..=b'f' => Ok(byte - b'a' + 10),
                b'0'..=b'9' => Ok(byte - b'0'),
                _ => Err(HexError(HexErrorInner::InvalidByte(byte))),
            }
        }
        let hex_bytes: &[u8] = hex.as_ref();
        if hex_bytes.is_empty() || hex_bytes.len() % 2 != 0 || hex_bytes.len() > OUT_LEN * 2 {
            return Err(HexError(HexErrorInner::InvalidLen(hex_bytes.len())));
        }
        let len = hex_bytes.len() / 2;
        let mut bytes = [0; OUT_LEN];
        for i in 0..len {
            bytes[i] = 16 * hex_val(hex_bytes[2 * i])? + hex_val(hex_bytes[2 * i + 1])?;
        }
        Ok(Hash {
            bytes,
            len: len as u8,
        })
    }
}

/// Converts a full-length digest. For shorter digests, use
/// [`from_hex`](#method.from_hex).
impl From<[u8; OUT_LEN]> for Hash {
    #[inline]
    fn from(bytes: [u8; OUT_LEN]) -> Self {
        Self {
            bytes,
            len: OUT_LEN as u8,
        }
    }
}

impl core::str::FromStr for Hash {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

/// This implementation is constant-time in the digest bytes.
impl PartialEq for Hash {
    #[inline]
    fn eq(&self, other: &Hash) -> bool {
        // The length is public; only the bytes are compared in constant
        // time. Unused tail bytes are zero on both sides.
        self.len == other.len && constant_time_eq::constant_time_eq_64(&self.bytes, &other.bytes)
    }
}

/// This implementation is constant-time if the target is the digest length.
impl PartialEq<[u8]> for Hash {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        constant_time_eq::constant_time_eq(self.as_bytes(), other)
    }
}

impl Eq for Hash {}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hex = self.to_hex();
        let hex: &str = hex.as_str();

        f.write_str(hex)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hex = self.to_hex();
        let hex: &str = hex.as_str();

        f.debug_tuple("Hash").field(&hex).finish()
    }
}

/// The error type for [`Hash::from_hex`].
///
/// The `.to_string()` representation of this error currently distinguishes
/// between bad length errors and bad character errors. This is to help with
/// logging and debugging, but it isn't a stable API detail, and it may
/// change at any time.
#[derive(Clone, Debug)]
pub struct HexError(HexErrorInner);

#[derive(Clone, Debug)]
enum HexErrorInner {
    InvalidByte(u8),
    InvalidLen(usize),
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            HexErrorInner::InvalidByte(byte) => {
                if byte < 128 {
                    write!(f, "invalid hex character: {:?}", byte as char)
                } else {
                    write!(f, "invalid hex character: 0x{:x}", byte)
                }
            }
            HexErrorInner::InvalidLen(len) => {
                write!(f, "expected an even count of 2 to 128 hex bytes, received {}", len)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HexError {}

/// The error type for parameter validation and hash state misuse.
///
/// All parameter validation happens at initialization; [`Hasher::update`]
/// and [`Hasher::finalize`] can only fail with [`AlreadyFinalized`].
///
/// [`AlreadyFinalized`]: enum.Error.html#variant.AlreadyFinalized
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested digest length was zero or more than 64 bytes.
    InvalidDigestLength(usize),
    /// The key was more than 64 bytes.
    KeyTooLong(usize),
    /// The salt was more than 16 bytes. Oversized salts are rejected rather
    /// than truncated.
    SaltTooLong(usize),
    /// The personalization string was more than 16 bytes. Oversized
    /// personalization strings are rejected rather than truncated.
    PersonalTooLong(usize),
    /// The hash state was used again after [`Hasher::finalize`].
    AlreadyFinalized,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidDigestLength(len) => {
                write!(f, "digest length {} is not between 1 and {}", len, OUT_LEN)
            }
            Error::KeyTooLong(len) => {
                write!(f, "key length {} exceeds the maximum of {}", len, KEY_LEN)
            }
            Error::SaltTooLong(len) => {
                write!(f, "salt length {} exceeds the maximum of {}", len, SALT_LEN)
            }
            Error::PersonalTooLong(len) => write!(
                f,
                "personalization length {} exceeds the maximum of {}",
                len, PERSONAL_LEN
            ),
            Error::AlreadyFinalized => write!(f, "hash state was already finalized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The default hash function: unkeyed BLAKE2b with a 64-byte digest.
///
/// For an incremental version that accepts multiple writes, see
/// [`Hasher::update`]. For keyed hashing, salts, personalization, or other
/// digest lengths, see [`keyed_hash`] and [`hash_with`].
pub fn hash(input: &[u8]) -> Hash {
    let mut hasher = Hasher::new();
    hasher.push(input);
    hasher.digest()
}

/// The keyed hash function, with a 64-byte digest.
///
/// This is suitable for use as a message authentication code, for example
/// to replace an HMAC instance. In that use case, the constant-time
/// equality checking provided by [`Hash`](struct.Hash.html) is almost
/// always a security requirement, and callers need to be careful not to
/// compare MACs as raw bytes.
///
/// Fails with [`Error::KeyTooLong`] if the key is more than 64 bytes.
pub fn keyed_hash(key: &[u8], input: &[u8]) -> Result<Hash, Error> {
    let mut hasher = Hasher::new_keyed(key)?;
    hasher.push(input);
    Ok(hasher.digest())
}

/// The fully parameterized hash function.
///
/// `digest_length` must be 1 to 64, `key` at most 64 bytes, and `salt` and
/// `personal` at most 16 bytes each; salt and personalization are
/// zero-padded to 16 bytes, so the empty slice means "absent". This is the
/// one-shot equivalent of [`Hasher::with_params`] followed by a single
/// [`update`](struct.Hasher.html#method.update) and
/// [`finalize`](struct.Hasher.html#method.finalize).
pub fn hash_with(
    digest_length: usize,
    key: &[u8],
    salt: &[u8],
    personal: &[u8],
    input: &[u8],
) -> Result<Hash, Error> {
    let mut hasher = Hasher::with_params(digest_length, key, salt, personal)?;
    hasher.push(input);
    Ok(hasher.digest())
}

/// An incremental hash state that can accept any number of writes.
///
/// The state is single-owner and entirely self-contained: two `Hasher`s
/// never share anything, so independent hash computations can run on
/// separate threads without synchronization.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), blake2b::Error> {
/// // Hash an input incrementally.
/// let mut hasher = blake2b::Hasher::new();
/// hasher.update(b"foo")?;
/// hasher.update(b"bar")?;
/// hasher.update(b"baz")?;
/// assert_eq!(hasher.finalize()?, blake2b::hash(b"foobarbaz"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Hasher {
    h: StateWords,
    // Counts compressed bytes only. Bytes sitting in buf are added either
    // when a block is flushed or at finalization.
    count: u128,
    buf: [u8; BLOCK_LEN],
    buf_len: u8,
    digest_length: u8,
    finalized: bool,
    platform: Platform,
}

impl Hasher {
    // Preconditions checked by the public constructors: digest_length is
    // 1..=64, key.len() <= 64.
    fn init(
        digest_length: u8,
        key: &[u8],
        salt: &[u8; SALT_LEN],
        personal: &[u8; PERSONAL_LEN],
    ) -> Self {
        // The parameter block, XORed into the IV per RFC 7693 section 2.5.
        // Byte 0 is the digest length, byte 1 the key length, bytes 2 and 3
        // fan-out and depth, both 1 in sequential mode. Salt occupies bytes
        // 32..48 and personalization bytes 48..64, so they land in words 4
        // through 7.
        let mut h = IV;
        h[0] ^= 0x0101_0000 ^ ((key.len() as u64) << 8) ^ digest_length as u64;
        h[4] ^= u64::from_le_bytes(*array_ref!(salt, 0, 8));
        h[5] ^= u64::from_le_bytes(*array_ref!(salt, 8, 8));
        h[6] ^= u64::from_le_bytes(*array_ref!(personal, 0, 8));
        h[7] ^= u64::from_le_bytes(*array_ref!(personal, 8, 8));

        // In keyed mode, the zero-padded key is staged as a full first
        // block. It is not compressed here: whether it's the final block
        // depends on whether any message input arrives, so it's flushed
        // lazily like any other block.
        let mut buf = [0; BLOCK_LEN];
        let mut buf_len = 0;
        if !key.is_empty() {
            buf[..key.len()].copy_from_slice(key);
            buf_len = BLOCK_LEN as u8;
        }

        Self {
            h,
            count: 0,
            buf,
            buf_len,
            digest_length,
            finalized: false,
            platform: Platform::detect(),
        }
    }

    /// Construct a new `Hasher` for the regular, unkeyed hash function with
    /// a 64-byte digest.
    pub fn new() -> Self {
        Self::init(OUT_LEN as u8, &[], &[0; SALT_LEN], &[0; PERSONAL_LEN])
    }

    /// Construct a new `Hasher` for the keyed hash function with a 64-byte
    /// digest. See [`keyed_hash`].
    ///
    /// [`keyed_hash`]: fn.keyed_hash.html
    pub fn new_keyed(key: &[u8]) -> Result<Self, Error> {
        if key.len() > KEY_LEN {
            return Err(Error::KeyTooLong(key.len()));
        }
        Ok(Self::init(
            OUT_LEN as u8,
            key,
            &[0; SALT_LEN],
            &[0; PERSONAL_LEN],
        ))
    }

    /// Construct a new `Hasher` for any parameter set. See [`hash_with`].
    ///
    /// [`hash_with`]: fn.hash_with.html
    pub fn with_params(
        digest_length: usize,
        key: &[u8],
        salt: &[u8],
        personal: &[u8],
    ) -> Result<Self, Error> {
        if digest_length == 0 || digest_length > OUT_LEN {
            return Err(Error::InvalidDigestLength(digest_length));
        }
        if key.len() > KEY_LEN {
            return Err(Error::KeyTooLong(key.len()));
        }
        if salt.len() > SALT_LEN {
            return Err(Error::SaltTooLong(salt.len()));
        }
        if personal.len() > PERSONAL_LEN {
            return Err(Error::PersonalTooLong(personal.len()));
        }
        let mut salt_block = [0; SALT_LEN];
        salt_block[..salt.len()].copy_from_slice(salt);
        let mut personal_block = [0; PERSONAL_LEN];
        personal_block[..personal.len()].copy_from_slice(personal);
        Ok(Self::init(
            digest_length as u8,
            key,
            &salt_block,
            &personal_block,
        ))
    }

    /// The digest length this `Hasher` was constructed with.
    #[inline]
    pub fn digest_length(&self) -> usize {
        self.digest_length as usize
    }

    /// Return the total number of bytes hashed so far, including the
    /// 128-byte key block in keyed mode.
    pub fn count(&self) -> u128 {
        self.count.wrapping_add(self.buf_len as u128)
    }

    fn push(&mut self, mut input: &[u8]) {
        while !input.is_empty() {
            // Flush a full buffer only once another byte needs to be
            // placed. The final block must be compressed with the final
            // flag set, and whether the block currently in the buffer is
            // final isn't known until either more input shows up here or
            // finalize is called.
            if self.buf_len as usize == BLOCK_LEN {
                self.count = self.count.wrapping_add(BLOCK_LEN as u128);
                self.platform
                    .compress_in_place(&mut self.h, &self.buf, self.count, false);
                self.buf_len = 0;
            }
            let want = BLOCK_LEN - self.buf_len as usize;
            let take = cmp::min(want, input.len());
            self.buf[self.buf_len as usize..][..take].copy_from_slice(&input[..take]);
            self.buf_len += take as u8;
            input = &input[take..];
        }
    }

    fn digest(&mut self) -> Hash {
        self.count = self.count.wrapping_add(self.buf_len as u128);
        // The buffer can hold stale bytes from an earlier, longer block.
        self.buf[self.buf_len as usize..].fill(0);
        self.platform
            .compress_in_place(&mut self.h, &self.buf, self.count, true);
        self.buf_len = 0;

        let state_bytes = platform::le_bytes_from_words_64(&self.h);
        let mut bytes = [0; OUT_LEN];
        bytes[..self.digest_length as usize]
            .copy_from_slice(&state_bytes[..self.digest_length as usize]);
        Hash {
            bytes,
            len: self.digest_length,
        }
    }

    /// Add input bytes to the hash state. You can call this any number of
    /// times, with any chunking of the input; the result depends only on
    /// the concatenation.
    ///
    /// Fails with [`Error::AlreadyFinalized`] after
    /// [`finalize`](#method.finalize) has been called.
    pub fn update(&mut self, input: &[u8]) -> Result<&mut Self, Error> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        self.push(input);
        Ok(self)
    }

    /// Finalize the hash state and return the digest.
    ///
    /// This is one-shot: the state is consumed, and any later call to
    /// [`update`](#method.update) or `finalize` fails with
    /// [`Error::AlreadyFinalized`].
    pub fn finalize(&mut self) -> Result<Hash, Error> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        self.finalized = true;
        Ok(self.digest())
    }
}

// Don't derive(Debug), because the state may be secret.
impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("digest_length", &self.digest_length)
            .field("finalized", &self.finalized)
            .field("platform", &self.platform)
            .finish()
    }
}

impl Default for Hasher {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl std::io::Write for Hasher {
    /// This is equivalent to [`update`](#method.update). It fails only if
    /// the state was already finalized.
    fn write(&mut self, input: &[u8]) -> std::io::Result<usize> {
        self.update(input)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        Ok(input.len())
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
