//! Validated session names: service type and local peer name.
//!
//! Both types follow a sanitize-then-set contract: invalid characters are
//! stripped and overlong values are truncated, but an empty input (or an
//! input with no usable characters at all) is an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a service type, in characters.
pub const SERVICE_TYPE_MAX_LEN: usize = 15;

/// Maximum length of a local peer name, in UTF-8 bytes.
pub const PEER_NAME_MAX_BYTES: usize = 63;

/// Name validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("value must not be empty")]
    Empty,

    #[error("`{0}` contains no valid service type characters")]
    NoValidCharacters(String),
}

/// Text identifier of the service — effectively, the name of the "room".
///
/// Must be the same for all peers who want to join the session. At most 15
/// characters; valid characters are ASCII lowercase letters, digits, and the
/// hyphen. Construction lower-cases the input, strips everything else, and
/// truncates; truncation itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceType(String);

impl ServiceType {
    /// Sanitize `input` into a valid service type.
    pub fn new(input: &str) -> Result<Self, NameError> {
        if input.is_empty() {
            return Err(NameError::Empty);
        }

        let sanitized: String = input
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .take(SERVICE_TYPE_MAX_LEN)
            .collect();

        if sanitized.is_empty() {
            return Err(NameError::NoValidCharacters(input.to_string()));
        }

        Ok(Self(sanitized))
    }

    /// The sanitized service type string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServiceType {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ServiceType> for String {
    fn from(value: ServiceType) -> Self {
        value.0
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of the local peer, as displayed to peer browsers.
///
/// At most 63 bytes in UTF-8; longer inputs are truncated on a codepoint
/// boundary so the result is always valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerName(String);

impl PeerName {
    /// Truncate `input` to a valid peer name.
    pub fn new(input: &str) -> Result<Self, NameError> {
        if input.is_empty() {
            return Err(NameError::Empty);
        }
        Ok(Self(truncate_utf8(input, PEER_NAME_MAX_BYTES).to_string()))
    }

    /// The peer name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PeerName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PeerName> for String {
    fn from(value: PeerName) -> Self {
        value.0
    }
}

impl std::fmt::Display for PeerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Truncate `s` to at most `max_bytes` bytes without splitting a codepoint.
///
/// Backs off to the nearest character boundary, so the result is always
/// valid UTF-8 and never exceeds `max_bytes`.
#[must_use]
pub fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_sanitized() {
        let st = ServiceType::new("My Room_42!").unwrap();
        assert_eq!(st.as_str(), "myroom42");
    }

    #[test]
    fn service_type_truncated_to_15() {
        let st = ServiceType::new("abcdefghijklmnopqrstuvwxyz").unwrap();
        assert_eq!(st.as_str(), "abcdefghijklmno");
    }

    #[test]
    fn service_type_keeps_hyphens_and_digits() {
        let st = ServiceType::new("game-7").unwrap();
        assert_eq!(st.as_str(), "game-7");
    }

    #[test]
    fn service_type_empty_rejected() {
        assert_eq!(ServiceType::new(""), Err(NameError::Empty));
    }

    #[test]
    fn service_type_all_invalid_rejected() {
        assert!(matches!(
            ServiceType::new("!!! ???"),
            Err(NameError::NoValidCharacters(_))
        ));
    }

    #[test]
    fn peer_name_short_unchanged() {
        let name = PeerName::new("Alice").unwrap();
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn peer_name_empty_rejected() {
        assert_eq!(PeerName::new(""), Err(NameError::Empty));
    }

    #[test]
    fn peer_name_truncated_to_63_bytes() {
        let long = "x".repeat(100);
        let name = PeerName::new(&long).unwrap();
        assert_eq!(name.as_str().len(), PEER_NAME_MAX_BYTES);
    }

    #[test]
    fn truncate_utf8_backs_off_to_codepoint_boundary() {
        // "é" is 2 bytes; 62 ASCII bytes followed by "é" would put the
        // 63rd byte in the middle of the codepoint.
        let input = format!("{}é", "a".repeat(62));
        let truncated = truncate_utf8(&input, PEER_NAME_MAX_BYTES);
        assert_eq!(truncated, "a".repeat(62));
        assert!(truncated.len() <= PEER_NAME_MAX_BYTES);
        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
    }

    #[test]
    fn truncate_utf8_multibyte_only() {
        // Each "🎮" is 4 bytes; 63 / 4 leaves 3 spare bytes that must not
        // be filled with a partial codepoint.
        let input = "🎮".repeat(20);
        let truncated = truncate_utf8(&input, PEER_NAME_MAX_BYTES);
        assert_eq!(truncated.len(), 60);
        assert_eq!(truncated.chars().count(), 15);
    }

    #[test]
    fn truncate_utf8_exact_fit_untouched() {
        let input = "a".repeat(PEER_NAME_MAX_BYTES);
        assert_eq!(truncate_utf8(&input, PEER_NAME_MAX_BYTES), input);
    }
}
