//! The base32 variant used by Nano account addresses.
//!
//! Symbols are packed most-significant bit first. When the input bit count
//! is not a multiple of the group size, zero bits are prepended rather than
//! appended, so a 32-byte public key becomes 52 symbols whose first symbol
//! only carries a single bit.

use thiserror::Error;
use tracing::trace;

/// The 32 symbols, in value order. `0`, `2`, `l` and `v` are excluded.
pub const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

const INVALID: u8 = 0xFF;

/// Reverse lookup table from ASCII byte to symbol value.
const INVERSE: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Errors that can occur while decoding base32 text.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Base32Error {
    /// A byte outside of [`ALPHABET`]
    #[error("invalid base32 byte 0x{byte:02x} at position {position}")]
    InvalidSymbol { byte: u8, position: usize },

    /// The leading padding bits were not zero
    #[error("non-zero padding bits")]
    NonZeroPadding,
}

pub trait ToNanoBase32 {
    fn to_nano_base32(&self) -> String;
}

impl<T: AsRef<[u8]>> ToNanoBase32 for T {
    fn to_nano_base32(&self) -> String {
        encode(self)
    }
}

pub trait FromNanoBase32: Sized {
    fn from_nano_base32<T: AsRef<[u8]>>(text: T) -> Result<Self, Base32Error>;
}

impl FromNanoBase32 for Vec<u8> {
    fn from_nano_base32<T: AsRef<[u8]>>(text: T) -> Result<Self, Base32Error> {
        decode(text)
    }
}

/// Encodes `input` into base32 text.
pub fn encode<T: AsRef<[u8]>>(input: T) -> String {
    let data = input.as_ref();
    let pad = (5 - (data.len() * 8) % 5) % 5;
    let mut result = String::with_capacity((data.len() * 8 + pad) / 5);

    // The padding is simply a head start of `pad` zero bits.
    let mut acc: u16 = 0;
    let mut bits = pad;
    for &byte in data {
        acc = (acc << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            result.push(ALPHABET[((acc >> bits) & 0x1F) as usize] as char);
            acc &= (1 << bits) - 1;
        }
    }
    result
}

/// Decodes base32 text into bytes.
///
/// # Errors
/// Returns [`Base32Error::InvalidSymbol`] for any byte outside of
/// [`ALPHABET`] and [`Base32Error::NonZeroPadding`] if the leading bits
/// that do not fit into a whole byte are set.
pub fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, Base32Error> {
    let text = input.as_ref();
    let pad = (text.len() * 5) % 8;
    let mut result = Vec::with_capacity(text.len() * 5 / 8);

    let mut acc: u16 = 0;
    let mut bits = 0;
    let mut skip = pad;
    for (position, &ch) in text.iter().enumerate() {
        let value = match INVERSE.get(ch as usize) {
            Some(&v) if v != INVALID => v,
            _ => {
                return Err(Base32Error::InvalidSymbol { byte: ch, position });
            }
        };
        acc = (acc << 5) | u16::from(value);
        bits += 5;

        if skip > 0 && bits >= skip {
            bits -= skip;
            skip = 0;
            if acc >> bits != 0 {
                trace!("leading padding bits set");
                return Err(Base32Error::NonZeroPadding);
            }
        }

        while skip == 0 && bits >= 8 {
            bits -= 8;
            result.push((acc >> bits) as u8);
            acc &= (1 << bits) - 1;
        }
    }
    Ok(result)
}
