//! A validator for Nano account addresses.
//!
//! An address is `<prefix>_<body>` where the 60-symbol body is a base32
//! public key (52 symbols) followed by a base32 checksum (8 symbols).
//!
//! This crate supports:
//! - Literal prefix matching against any set of allowed prefixes (`nano` and `xrb` by default).
//! - Checksum verification: BLAKE2b-40 of the public key, byte-reversed.
//! - Decoding an address into its public key, and encoding one back.
//! - A loosely typed entry point for untyped (JSON) callers, see [`input`].

use blake2::Blake2b;
use blake2::digest::Digest;
use blake2::digest::consts::U5;
use hex::encode as hex_encode;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

pub mod base32;
pub mod input;

pub use base32::{Base32Error, FromNanoBase32, ToNanoBase32};
pub use input::{InputError, is_valid_value, prefixes_from_value};

/// Prefixes accepted when the caller does not name any.
pub const DEFAULT_PREFIXES: [&str; 2] = ["nano", "xrb"];

/// Separates the prefix from the body.
pub const SEPARATOR: char = '_';

/// Body length in symbols: public key plus checksum.
pub const BODY_LENGTH: usize = PUBLIC_KEY_ENCODED_LENGTH + CHECKSUM_ENCODED_LENGTH;

/// 256 bits plus 4 leading padding bits, 5 bits per symbol.
pub const PUBLIC_KEY_ENCODED_LENGTH: usize = 52;

/// 40 bits, 5 bits per symbol.
pub const CHECKSUM_ENCODED_LENGTH: usize = 8;

/// Raw public key length (bytes).
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Raw checksum length (bytes).
pub const CHECKSUM_LENGTH: usize = 5;

/// The ordered set of prefixes an address may start with.
///
/// Every prefix is a literal: it is compared byte for byte, case-sensitive,
/// and never interpreted as a pattern. An empty set accepts no address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefixes(Vec<String>);

impl Prefixes {
    /// Builds a prefix set from anything iterable.
    #[must_use]
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Prefixes(prefixes.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for Prefixes {
    fn default() -> Self {
        Prefixes::new(DEFAULT_PREFIXES)
    }
}

/// A lone prefix is a one-element set.
impl From<&str> for Prefixes {
    fn from(prefix: &str) -> Self {
        Prefixes(vec![prefix.to_string()])
    }
}

impl From<String> for Prefixes {
    fn from(prefix: String) -> Self {
        Prefixes(vec![prefix])
    }
}

impl From<Vec<String>> for Prefixes {
    fn from(prefixes: Vec<String>) -> Self {
        Prefixes(prefixes)
    }
}

impl From<Vec<&str>> for Prefixes {
    fn from(prefixes: Vec<&str>) -> Self {
        Prefixes::new(prefixes)
    }
}

impl From<&[&str]> for Prefixes {
    fn from(prefixes: &[&str]) -> Self {
        Prefixes::new(prefixes.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Prefixes {
    fn from(prefixes: [&str; N]) -> Self {
        Prefixes::new(prefixes)
    }
}

impl From<&Prefixes> for Prefixes {
    fn from(prefixes: &Prefixes) -> Self {
        prefixes.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for Prefixes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Prefixes::new(iter)
    }
}

/// The checksum hash for `nano_address`: unkeyed BLAKE2b with a 5-byte digest.
pub struct Hasher;

impl Hasher {
    /// Digest length (bytes).
    pub const DIGEST_LENGTH: usize = CHECKSUM_LENGTH;

    /// Compute BLAKE2b-40(data).
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
        Blake2b::<U5>::digest(data).into()
    }
}

/// The checksum embedded in an address for `public_key`.
///
/// The digest is stored byte-reversed; skipping the reversal breaks every
/// real address.
#[must_use]
pub fn checksum(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> [u8; CHECKSUM_LENGTH] {
    let mut digest = Hasher::digest(public_key);
    digest.reverse();
    digest
}

/// Errors that can occur during address decoding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressDecodeError {
    /// No `_` anywhere in the address
    #[error("missing `_` separator")]
    MissingSeparator,

    /// The text before the body isn't one of the allowed prefixes
    #[error("unknown prefix: {0:?}")]
    UnknownPrefix(String),

    /// The body is not 60 symbols long
    #[error("invalid body length: got {got}, expected {BODY_LENGTH}")]
    InvalidLength { got: usize },

    /// The body does not start with `1` or `3`
    #[error("invalid leading character {0:?}, expected '1' or '3'")]
    InvalidLeadingCharacter(char),

    /// A body symbol outside the base32 alphabet
    #[error("invalid character {symbol:?} at body position {position}")]
    InvalidCharacter { symbol: char, position: usize },

    /// The embedded checksum doesn't match the public key
    #[error("invalid checksum: address has {expected}, public key hashes to {computed}")]
    InvalidChecksum { expected: String, computed: String },

    /// Base32 decoding failed
    #[error("base32 error: {0}")]
    Base32(#[from] Base32Error),
}

/// Checks the 60-symbol body grammar: `[13]` then 59 alphabet symbols.
fn check_body(body: &str) -> Result<(), AddressDecodeError> {
    let got = body.chars().count();
    if got != BODY_LENGTH {
        return Err(AddressDecodeError::InvalidLength { got });
    }

    let mut symbols = body.chars();
    match symbols.next() {
        Some('1' | '3') => {}
        Some(other) => return Err(AddressDecodeError::InvalidLeadingCharacter(other)),
        None => return Err(AddressDecodeError::InvalidLength { got }),
    }

    for (i, symbol) in symbols.enumerate() {
        if !symbol.is_ascii() || !base32::ALPHABET.contains(&(symbol as u8)) {
            return Err(AddressDecodeError::InvalidCharacter {
                symbol,
                position: i + 1,
            });
        }
    }
    Ok(())
}

/// Splits `address` into the matched prefix and the body.
///
/// Each prefix is tried in order as a literal. When several prefixes
/// are followed by `_`, the first one whose remainder is a well-formed
/// body wins; if none is, the first candidate's error is reported.
fn split_address<'a>(
    address: &'a str,
    prefixes: &Prefixes,
) -> Result<(&'a str, &'a str), AddressDecodeError> {
    let mut first_error = None;
    for prefix in prefixes.iter() {
        let Some(body) = address
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
        else {
            continue;
        };
        match check_body(body) {
            Ok(()) => return Ok((&address[..prefix.len()], body)),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(_) => {}
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    match address.split_once(SEPARATOR) {
        Some((unknown, _)) => Err(AddressDecodeError::UnknownPrefix(unknown.to_string())),
        None => Err(AddressDecodeError::MissingSeparator),
    }
}

/// Decodes the public key of a well-formed body and checks its checksum.
fn checked_public_key(body: &str) -> Result<[u8; PUBLIC_KEY_LENGTH], AddressDecodeError> {
    let (public_key_encoded, expected) = body.split_at(PUBLIC_KEY_ENCODED_LENGTH);

    let decoded = base32::decode(public_key_encoded)?;
    let public_key: [u8; PUBLIC_KEY_LENGTH] = decoded
        .try_into()
        .map_err(|d: Vec<u8>| AddressDecodeError::InvalidLength { got: d.len() })?;

    let computed = base32::encode(checksum(&public_key));
    trace!(expected, computed = computed.as_str(), "comparing checksums");
    if computed != expected {
        return Err(AddressDecodeError::InvalidChecksum {
            expected: expected.to_string(),
            computed,
        });
    }
    Ok(public_key)
}

/// Whether `address` has the shape `<prefix>_[13][alphabet]{59}` for one
/// of `prefixes`. The whole string must match; no checksum is computed.
#[must_use]
pub fn matches_syntax(address: &str, prefixes: &Prefixes) -> bool {
    split_address(address, prefixes).is_ok()
}

/// Whether the checksum of a syntactically valid address matches its
/// public key.
///
/// The body is taken as everything after the last `_`, so prefixes that
/// themselves contain `_` are handled. Anything that is not a well-formed
/// body yields `false`.
#[must_use]
pub fn verify_checksum(address: &str) -> bool {
    let body = match address.rsplit_once(SEPARATOR) {
        Some((_, body)) => body,
        None => return false,
    };
    if check_body(body).is_err() {
        return false;
    }
    match checked_public_key(body) {
        Ok(_) => true,
        Err(e) => {
            debug!("address rejected: {e}");
            false
        }
    }
}

/// Checks whether `address` is a valid Nano address for any of `prefixes`.
///
/// Malformed syntax and forged checksums are indistinguishable here: both
/// return `false`. Use [`decode_address`] to learn why an address was
/// rejected.
///
/// ```
/// assert!(nano_address::is_valid(
///     "ban_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4",
///     "ban",
/// ));
/// ```
#[must_use]
pub fn is_valid(address: &str, prefixes: impl Into<Prefixes>) -> bool {
    let prefixes = prefixes.into();
    if let Err(e) = split_address(address, &prefixes) {
        debug!("address rejected: {e}");
        return false;
    }
    verify_checksum(address)
}

/// [`is_valid`] with the default `nano` and `xrb` prefixes.
#[must_use]
pub fn is_valid_default(address: &str) -> bool {
    is_valid(address, Prefixes::default())
}

/// The decoded components of an address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAddress {
    /// The prefix the address matched
    pub prefix: String,
    /// The raw public key bytes
    pub public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl DecodedAddress {
    /// The hex representation of the public key
    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex_encode(self.public_key)
    }
}

impl fmt::Display for DecodedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_address(&self.prefix, &self.public_key))
    }
}

/// Decode an address string into its prefix and public key.
///
/// # Errors
/// Returns `AddressDecodeError` on any failure:
/// - No separator, or a prefix outside `prefixes`
/// - Wrong body length, leading symbol or alphabet
/// - Checksum mismatch
pub fn decode_address(
    address: &str,
    prefixes: &Prefixes,
) -> Result<DecodedAddress, AddressDecodeError> {
    let (prefix, body) = split_address(address, prefixes)?;
    let public_key = checked_public_key(body)?;
    Ok(DecodedAddress {
        prefix: prefix.to_string(),
        public_key,
    })
}

/// Encodes `public_key` as an address with the given prefix.
#[must_use]
pub fn encode_address(prefix: &str, public_key: &[u8; PUBLIC_KEY_LENGTH]) -> String {
    let mut address = String::with_capacity(prefix.len() + 1 + BODY_LENGTH);
    address.push_str(prefix);
    address.push(SEPARATOR);
    address.push_str(&base32::encode(public_key));
    address.push_str(&base32::encode(checksum(public_key)));
    address
}

/// A reusable validator bound to one prefix set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressValidator {
    prefixes: Prefixes,
}

impl AddressValidator {
    #[must_use]
    pub fn new(prefixes: impl Into<Prefixes>) -> Self {
        AddressValidator {
            prefixes: prefixes.into(),
        }
    }

    /// The allowed prefixes, in matching order.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        self.prefixes.as_slice()
    }

    #[must_use]
    pub fn is_valid(&self, address: &str) -> bool {
        is_valid(address, &self.prefixes)
    }

    /// # Errors
    /// See [`decode_address`].
    pub fn decode(&self, address: &str) -> Result<DecodedAddress, AddressDecodeError> {
        decode_address(address, &self.prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: [&str; 7] = [
        "3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4",
        "1stofnrxuz3cai7ze75o174bpm7scwj9jn3nxsn8ntzg784jf1gzn1jjdkou",
        "1q3hqecaw15cjt7thbtxu3pbzr1eihtzzpzxguoc37bj1wc5ffoh7w74gi6p",
        "3dmtrrws3pocycmbqwawk6xs7446qxa36fcncush4s1pejk16ksbmakis78m",
        "3hd4ezdgsp15iemx7h81in7xz5tpxi43b6b41zn3qmwiuypankocw3awes5k",
        "1awsn43we17c1oshdru4azeqjz9wii41dy8npubm4rg11so7dx3jtqgoeahy",
        "1anrzcuwe64rwxzcco8dkhpyxpi8kd7zsjc1oeimpc3ppca4mrjtwnqposrs",
    ];

    #[test]
    fn valid_addresses_with_default_prefixes() {
        for body in VALID {
            assert!(is_valid_default(&format!("nano_{body}")), "nano_{body}");
            assert!(is_valid_default(&format!("xrb_{body}")), "xrb_{body}");
        }
    }

    #[test]
    fn altered_checksum_is_rejected() {
        assert!(is_valid_default(
            "nano_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4"
        ));
        assert!(!is_valid_default(
            "nano_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjpsa"
        ));
    }

    #[test]
    fn custom_prefix() {
        let address = "ban_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4";
        assert!(is_valid(address, "ban"));
        assert!(is_valid(address, ["nano", "ban"]));
        assert!(!is_valid_default(address));
    }

    #[test]
    fn disallowed_prefix() {
        let address = "foo_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr3";
        assert!(!is_valid_default(address));
        assert!(is_valid(address, "foo"));
    }

    #[test]
    fn invalid_prefixes() {
        for address in [
            "_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr3",
            "foo_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr3",
            "NANO_3t6k35gi95xu6tergt6p69ck76ogmitsa8mnijtpxm9fkcm736xtoncuohr3",
        ] {
            assert!(!is_valid_default(address), "{address}");
        }
    }

    #[test]
    fn invalid_characters() {
        for address in [
            "xrb_3uip1jmeo4irjuua9xiyosq6fkgogwd6bf5uqopb1m6mfq6g3n8cna6h3tu0",
            "xrb_3uip1jmeo4irjuua9xiyosq6fkgogwd6bf5uqopb1m6mfq6g3n8cna6h3tu2",
            "xrb_3uip1jmeo4irjuua9xiyosq6fkgogwd6bf5uqopb1m6mfq6g3n8cna6h3tul",
            "xrb_3uip1jmeo4irjuua9xiyosq6fkgogwd6bf5uqopb1m6mfq6g3n8cna6h3tuv",
        ] {
            assert!(!is_valid_default(address), "{address}");
            assert!(matches!(
                decode_address(address, &Prefixes::default()),
                Err(AddressDecodeError::InvalidCharacter { position: 59, .. })
            ));
        }
    }

    #[test]
    fn invalid_casing() {
        for address in [
            "XRB_14CUEJFPR58EPNPXENIRUSIMSRBWXBECIN7A3IZQ1INJPTECC31QSJWQUOE6",
            "XRB_1NIABKX3GBXIT5J5YYQCPAS71DKFFGGBR6ZPD3HEUI8RPOOCM5XQBDWQ44OH",
            "nano_3ARG3ASGTIGAE3XCKABAAEWKX3BZSH7NWZ7JKMJOS79IHYAXWPHHM6QGJPS4",
        ] {
            assert!(!is_valid_default(address), "{address}");
        }
    }

    #[test]
    fn leading_symbol_must_be_one_or_three() {
        for address in [
            "xrb_03ezf4od79h1tgj9aiu4djzcmmguendtjfuhwfukhuucboua8cpoihmh8byo",
            "xrb_23ezf4od79h1tgj9aiu4djzcmmguendtjfuhwfukhuucboua8cpoihmh8byo",
            "xrb_43ezf4od79h1tgj9aiu4djzcmmguendtjfuhwfukhuucboua8cpoihmh8byo",
        ] {
            assert!(!is_valid_default(address), "{address}");
        }
        assert_eq!(
            decode_address(
                "xrb_43ezf4od79h1tgj9aiu4djzcmmguendtjfuhwfukhuucboua8cpoihmh8byo",
                &Prefixes::default()
            ),
            Err(AddressDecodeError::InvalidLeadingCharacter('4'))
        );
    }

    #[test]
    fn missing_separator() {
        for address in [
            "xrb35jjmmmh81kydepzeuf9oec8hzkay7msr6yxagzxpcht7thwa5bus5tomgz9",
            "xrb1ipx847tk8o46pwxt5qjdbncjqcbwcc1rrmqnkztrfjy5k7z4imsrata9est",
        ] {
            assert!(!is_valid_default(address), "{address}");
            assert_eq!(
                decode_address(address, &Prefixes::default()),
                Err(AddressDecodeError::MissingSeparator)
            );
        }
    }

    #[test]
    fn improper_length() {
        for address in [
            "xrb_11111111111111111111111111111111111111111111",
            "xrb_1111111111111111111111111111111111111111111111111111",
            "xrb_111111111111111111111111111111111111111111111111111111111111hifc8npp",
        ] {
            assert!(!is_valid_default(address), "{address}");
        }
        assert_eq!(
            decode_address("xrb_1111", &Prefixes::default()),
            Err(AddressDecodeError::InvalidLength { got: 4 })
        );
    }

    #[test]
    fn whitespace() {
        let address = "nano_3jwrszth46rk1mu7rmb4rhm54us8yg1gw3ipodftqtikf5yqdyr7471nsg1k";
        assert!(is_valid_default(address));
        for candidate in [
            format!(" {address}"),
            format!("{address} "),
            format!("\t{address}"),
            format!("\t{address}\t"),
            format!("{address}\n"),
            address.replacen('_', "_ ", 1),
            address.replacen('_', " _", 1),
        ] {
            assert!(!is_valid_default(&candidate), "{candidate:?}");
        }
    }

    #[test]
    fn zero_key() {
        let zero = [0u8; PUBLIC_KEY_LENGTH];
        let address = encode_address("nano", &zero);
        assert_eq!(
            address,
            "nano_1111111111111111111111111111111111111111111111111111hifc8npp"
        );
        assert!(is_valid_default(&address));
    }

    #[test]
    fn decode_reports_public_key() {
        let decoded = decode_address(
            "xrb_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4",
            &Prefixes::default(),
        )
        .unwrap();
        assert_eq!(decoded.prefix, "xrb");
        assert_eq!(
            decoded.public_key_hex(),
            "a30e0a32ed41c8607aa9212843392e853fcbcb4e7cb194e35c94f07f91de59ef"
        );
        assert_eq!(
            decoded.to_string(),
            "xrb_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4"
        );
    }

    #[test]
    fn decode_reports_checksum_mismatch() {
        let err = decode_address(
            "nano_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjpsa",
            &Prefixes::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AddressDecodeError::InvalidChecksum {
                expected: "m6qgjpsa".to_string(),
                computed: "m6qgjps4".to_string(),
            }
        );
    }

    #[test]
    fn checksum_is_reversed_digest() {
        let public_key: [u8; PUBLIC_KEY_LENGTH] =
            hex::decode("a30e0a32ed41c8607aa9212843392e853fcbcb4e7cb194e35c94f07f91de59ef")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(hex_encode(Hasher::digest(&public_key)), "22dbe82e99");
        assert_eq!(hex_encode(checksum(&public_key)), "992ee8db22");
        assert_eq!(base32::encode(checksum(&public_key)), "m6qgjps4");
    }

    #[test]
    fn prefixes_are_literal() {
        let address = "nano_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4";
        // As a pattern, `.*` would accept every prefix.
        assert!(!is_valid(address, ".*"));
        assert!(!is_valid(address, "na|no"));
        assert!(!is_valid(address, "n.no"));

        let dotted = address.replacen("nano", "n.no", 1);
        assert!(is_valid(dotted.as_str(), "n.no"));
    }

    #[test]
    fn prefix_containing_separator() {
        let address = "my_coin_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4";
        assert!(is_valid(address, "my_coin"));
        assert!(!is_valid(address, "my"));
        assert_eq!(
            decode_address(address, &Prefixes::from(["my", "my_coin"]))
                .unwrap()
                .prefix,
            "my_coin"
        );
    }

    #[test]
    fn empty_prefixes() {
        let address = "nano_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4";
        assert!(!is_valid(address, Vec::<String>::new()));

        let bare = "_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjps4";
        assert!(is_valid(bare, ""));
        assert!(!is_valid_default(bare));
    }

    #[test]
    fn syntax_without_checksum() {
        let forged = "nano_3arg3asgtigae3xckabaaewkx3bzsh7nwz7jkmjos79ihyaxwphhm6qgjpsa";
        assert!(matches_syntax(forged, &Prefixes::default()));
        assert!(!verify_checksum(forged));
        assert!(!matches_syntax("nano_3arg", &Prefixes::default()));
        assert!(!verify_checksum("nano_3arg"));
        assert!(!verify_checksum("no separator"));
    }

    #[test]
    fn validator_prefixes() {
        assert_eq!(AddressValidator::default().prefixes(), ["nano", "xrb"]);
        assert_eq!(
            AddressValidator::new(["foo", "bar", "baz"]).prefixes(),
            ["foo", "bar", "baz"]
        );
        assert_eq!(AddressValidator::new("foo").prefixes(), ["foo"]);
    }

    #[test]
    fn validator_checks_addresses() {
        let validator = AddressValidator::new(vec!["ban".to_string()]);
        let address = "ban_1stofnrxuz3cai7ze75o174bpm7scwj9jn3nxsn8ntzg784jf1gzn1jjdkou";
        assert!(validator.is_valid(address));
        assert!(validator.is_valid(address));
        assert_eq!(validator.decode(address).unwrap().prefix, "ban");
        assert!(matches!(
            validator.decode(&address.replacen("ban", "nano", 1)),
            Err(AddressDecodeError::UnknownPrefix(p)) if p == "nano"
        ));
    }
}
