//! Token protocol message formats
//!
//! Defines the message type tags, the textual SAS/GAS forms, and the request
//! frames:
//! - Type 1: Individual Token Request (18 bytes)
//! - Type 3: Individual Token Validation (82 bytes)
//! - Type 5: Group Token Request (4 + 80n bytes)
//! - Type 7: Group Token Validation (4 + 80n + 64 bytes)

use std::fmt;
use std::str::FromStr;

use crate::error::{FormatError, ProtocolError};

use super::codec::WireCodec;
use super::layout::{GroupTail, Layout};

/// Token protocol message types
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    IndividualTokenRequest = 1,
    IndividualTokenResponse = 2,
    IndividualTokenValidation = 3,
    IndividualTokenStatus = 4,
    GroupTokenRequest = 5,
    GroupTokenResponse = 6,
    GroupTokenValidation = 7,
    GroupTokenStatus = 8,
}

impl MessageType {
    pub const fn tag(self) -> i16 {
        self as i16
    }

    /// Check a decoded tag against this type
    pub fn check(self, got: i16) -> Result<(), ProtocolError> {
        if got == self.tag() {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedResponseType {
                expected: self.tag(),
                got,
            })
        }
    }
}

/// Signed Access String: `student_id:nonce:token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sas {
    pub student_id: String,
    pub nonce: i32,
    pub token: String,
}

impl Sas {
    pub fn new(student_id: impl Into<String>, nonce: i32, token: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            nonce,
            token: token.into(),
        }
    }

    /// Binary SAS: `student_id(12) | nonce(4) | token(64)`
    pub fn encode(&self, codec: &WireCodec) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::with_capacity(codec.descriptor().sas_len());
        buf.extend_from_slice(&codec.encode_student_id(&self.student_id)?);
        buf.extend_from_slice(&codec.encode_nonce(self.nonce));
        buf.extend_from_slice(&codec.encode_token(&self.token)?);
        Ok(buf)
    }
}

impl FromStr for Sas {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| FormatError::InvalidSas {
            sas: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split(':').collect();
        let [student_id, nonce, token] = parts.as_slice() else {
            return Err(invalid(format!(
                "expected 3 ':'-separated fields, got {}",
                parts.len()
            )));
        };

        let nonce = nonce
            .parse::<i32>()
            .map_err(|e| invalid(format!("nonce '{}': {}", nonce, e)))?;

        Ok(Self::new(*student_id, nonce, *token))
    }
}

impl fmt::Display for Sas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.student_id, self.nonce, self.token)
    }
}

/// Group Access String: `sas+sas+...+sas+group_token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gas {
    pub entries: Vec<Sas>,
    pub group_token: String,
}

impl Gas {
    /// Number of SAS entries (N)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cross-check N against a caller-supplied count
    pub fn expect_len(&self, expected: usize) -> Result<(), FormatError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(FormatError::CountMismatch {
                expected,
                got: self.len(),
            })
        }
    }
}

impl FromStr for Gas {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments: Vec<&str> = s.split('+').collect();
        // split always yields at least one segment
        let group_token = segments.pop().unwrap_or_default();

        if group_token.is_empty() {
            return Err(FormatError::InvalidGas {
                reason: "empty group token".to_string(),
            });
        }

        let entries = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                segment.parse::<Sas>().map_err(|e| FormatError::InvalidGas {
                    reason: format!("entry {}: {}", i + 1, e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            entries,
            group_token: group_token.to_string(),
        })
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sas in &self.entries {
            write!(f, "{}+", sas)?;
        }
        write!(f, "{}", self.group_token)
    }
}

/// Type 1: `type | student_id | nonce`
pub fn individual_token_request(
    codec: &WireCodec,
    student_id: &str,
    nonce: i32,
) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::with_capacity(Layout::individual_token_request().width(codec.descriptor()));
    buf.extend_from_slice(&codec.encode_type(MessageType::IndividualTokenRequest.tag()));
    buf.extend_from_slice(&codec.encode_student_id(student_id)?);
    buf.extend_from_slice(&codec.encode_nonce(nonce));
    Ok(buf)
}

/// Type 3: `type | student_id | nonce | token`
pub fn individual_token_validation(codec: &WireCodec, sas: &Sas) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::with_capacity(Layout::individual_token_response().width(codec.descriptor()));
    buf.extend_from_slice(&codec.encode_type(MessageType::IndividualTokenValidation.tag()));
    buf.extend_from_slice(&sas.encode(codec)?);
    Ok(buf)
}

/// Type 5: `type | n | SAS x n`
pub fn group_token_request(codec: &WireCodec, entries: &[Sas]) -> Result<Vec<u8>, FormatError> {
    let layout = Layout::group(entries.len(), GroupTail::Nothing);
    let mut buf = Vec::with_capacity(layout.width(codec.descriptor()));
    buf.extend_from_slice(&codec.encode_type(MessageType::GroupTokenRequest.tag()));
    buf.extend_from_slice(&codec.encode_count(entries.len())?);
    for sas in entries {
        buf.extend_from_slice(&sas.encode(codec)?);
    }
    Ok(buf)
}

/// Type 7: `type | n | SAS x n | group_token`
pub fn group_token_validation(codec: &WireCodec, gas: &Gas) -> Result<Vec<u8>, FormatError> {
    let layout = Layout::group(gas.len(), GroupTail::GroupToken);
    let mut buf = Vec::with_capacity(layout.width(codec.descriptor()));
    buf.extend_from_slice(&codec.encode_type(MessageType::GroupTokenValidation.tag()));
    buf.extend_from_slice(&codec.encode_count(gas.len())?);
    for sas in &gas.entries {
        buf.extend_from_slice(&sas.encode(codec)?);
    }
    buf.extend_from_slice(&codec.encode_group_token(&gas.group_token)?);
    Ok(buf)
}
