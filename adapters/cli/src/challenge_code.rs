#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use unitfall_core::SessionConfig;

const CHALLENGE_DOMAIN: &str = "unitfall";
const CHALLENGE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded challenge payload.
pub(crate) const CHALLENGE_HEADER: &str = "unitfall:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Shareable bundle fixing a session's configuration and random seed.
///
/// Two players running the same challenge code see the same questions,
/// the same candidate sets and the same puzzle motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChallengeCode {
    /// Seed every deterministic stream in the session derives from.
    pub seed: u64,
    /// Session parameters the challenge runs under.
    pub config: SessionConfig,
}

impl ChallengeCode {
    /// Encodes the challenge into a single-line string suitable for sharing.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("challenge serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{CHALLENGE_HEADER}{FIELD_DELIMITER}{encoded}")
    }

    /// Decodes a challenge from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ChallengeCodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ChallengeCodeError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ChallengeCodeError::MissingPrefix)?;
        let version = parts.next().ok_or(ChallengeCodeError::MissingVersion)?;
        let payload = parts.next().ok_or(ChallengeCodeError::MissingPayload)?;

        if domain != CHALLENGE_DOMAIN {
            return Err(ChallengeCodeError::InvalidPrefix(domain.to_owned()));
        }
        if version != CHALLENGE_VERSION {
            return Err(ChallengeCodeError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ChallengeCodeError::InvalidEncoding)?;
        let decoded: Self =
            serde_json::from_slice(&bytes).map_err(ChallengeCodeError::InvalidPayload)?;

        Ok(decoded)
    }
}

/// Errors that can occur while decoding challenge code strings.
#[derive(Debug)]
pub(crate) enum ChallengeCodeError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded challenge.
    MissingPrefix,
    /// The encoded challenge did not contain a version segment.
    MissingVersion,
    /// The encoded challenge did not include the payload segment.
    MissingPayload,
    /// The encoded challenge used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded challenge used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ChallengeCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "challenge code was empty"),
            Self::MissingPrefix => write!(f, "challenge code is missing the prefix"),
            Self::MissingVersion => write!(f, "challenge code is missing the version"),
            Self::MissingPayload => write!(f, "challenge code is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "challenge prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "challenge version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode challenge payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse challenge payload: {error}")
            }
        }
    }
}

impl Error for ChallengeCodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use unitfall_core::{DifficultyTier, MeasurementFamily, PuzzleKind};

    #[test]
    fn round_trip_default_session() {
        let challenge = ChallengeCode {
            seed: 7,
            config: SessionConfig::default(),
        };

        let encoded = challenge.encode();
        assert!(encoded.starts_with(&format!("{CHALLENGE_HEADER}:")));

        let decoded = ChallengeCode::decode(&encoded).expect("challenge decodes");
        assert_eq!(challenge, decoded);
    }

    #[test]
    fn round_trip_customized_session() {
        let config = SessionConfig {
            family: MeasurementFamily::Weight,
            difficulty: DifficultyTier::new(2),
            slot_count: 6,
            puzzle: PuzzleKind::Conveyor,
            randomize_order: false,
            swap_interval: Duration::from_millis(2500),
            ..SessionConfig::default()
        };
        let challenge = ChallengeCode { seed: 42, config };

        let encoded = challenge.encode();
        let decoded = ChallengeCode::decode(&encoded).expect("challenge decodes");
        assert_eq!(challenge, decoded);
    }

    #[test]
    fn decoding_rejects_blank_input() {
        let error = ChallengeCode::decode("   ").expect_err("blank input is rejected");
        assert!(matches!(error, ChallengeCodeError::EmptyPayload));
    }

    #[test]
    fn decoding_rejects_foreign_prefixes() {
        let error =
            ChallengeCode::decode("acme:v1:e30").expect_err("foreign prefix is rejected");
        assert!(matches!(error, ChallengeCodeError::InvalidPrefix(prefix) if prefix == "acme"));
    }

    #[test]
    fn decoding_rejects_unknown_versions() {
        let error =
            ChallengeCode::decode("unitfall:v9:e30").expect_err("unknown version is rejected");
        assert!(
            matches!(error, ChallengeCodeError::UnsupportedVersion(version) if version == "v9")
        );
    }

    #[test]
    fn decoding_rejects_truncated_codes() {
        let error = ChallengeCode::decode("unitfall:v1").expect_err("payload must be present");
        assert!(matches!(error, ChallengeCodeError::MissingPayload));
    }

    #[test]
    fn decoding_rejects_corrupt_encodings() {
        let error =
            ChallengeCode::decode("unitfall:v1:!!!").expect_err("corrupt base64 is rejected");
        assert!(matches!(error, ChallengeCodeError::InvalidEncoding(_)));
    }

    #[test]
    fn decoding_rejects_mismatched_payloads() {
        let encoded = STANDARD_NO_PAD.encode(b"{\"seed\":1}");
        let code = format!("unitfall:v1:{encoded}");
        let error = ChallengeCode::decode(&code).expect_err("incomplete payload is rejected");
        assert!(matches!(error, ChallengeCodeError::InvalidPayload(_)));
    }
}
