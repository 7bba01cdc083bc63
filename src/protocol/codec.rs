//! Wire codec
//!
//! Converts typed fields to and from their fixed-width big-endian encoding.
//! Encoding works field by field; decoding takes a whole frame and a
//! [`Layout`] and refuses any buffer whose size is not exactly the layout width.

use crate::error::{FormatError, ProtocolError};

use super::descriptor::ProtocolDescriptor;
use super::layout::{FieldKind, Layout};

/// One decoded wire field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    MessageType(i16),
    Count(i16),
    StudentId(String),
    Nonce(i32),
    Token(String),
    GroupToken(String),
    Status(i8),
    ErrorCode(i16),
}

/// Fields of a decoded frame, in layout order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    fields: Vec<FieldValue>,
}

impl Decoded {
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// The type tag, if the frame starts with one
    pub fn message_type(&self) -> Option<i16> {
        match self.fields.first() {
            Some(FieldValue::MessageType(tag)) => Some(*tag),
            _ => None,
        }
    }

    /// The trailing field, which carries the result of every exchange
    pub fn last(&self) -> Option<&FieldValue> {
        self.fields.last()
    }
}

/// Field encoder/decoder bound to a protocol descriptor
#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec {
    descriptor: ProtocolDescriptor,
}

impl WireCodec {
    pub const fn new(descriptor: ProtocolDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &ProtocolDescriptor {
        &self.descriptor
    }

    pub fn encode_type(&self, tag: i16) -> [u8; 2] {
        tag.to_be_bytes()
    }

    pub fn encode_nonce(&self, nonce: i32) -> [u8; 4] {
        nonce.to_be_bytes()
    }

    /// Encode the SAS count of a group frame
    pub fn encode_count(&self, n: usize) -> Result<[u8; 2], FormatError> {
        let n = i16::try_from(n).map_err(|_| FormatError::Encoding {
            field: FieldKind::Count.name(),
            reason: format!("{} does not fit in 16 bits", n),
        })?;
        Ok(n.to_be_bytes())
    }

    /// Encode a student id, right-padded with spaces to the id width.
    ///
    /// Ids already at or beyond the width are passed through unchanged. A
    /// longer id therefore grows the frame past its fixed layout (a 16-byte id
    /// makes a 22-byte type 1 request instead of 18), which the server will not
    /// parse as intended.
    pub fn encode_student_id(&self, student_id: &str) -> Result<Vec<u8>, FormatError> {
        let field = FieldKind::StudentId;
        ensure_ascii(field, student_id)?;

        let width = field.width(&self.descriptor);
        if student_id.len() > width {
            tracing::warn!(
                "Student id '{}' is {} bytes, longer than the {}-byte field",
                student_id,
                student_id.len(),
                width
            );
        }

        let mut buf = student_id.as_bytes().to_vec();
        if buf.len() < width {
            buf.resize(width, b' ');
        }
        Ok(buf)
    }

    pub fn encode_token(&self, token: &str) -> Result<Vec<u8>, FormatError> {
        self.encode_opaque(FieldKind::Token, token)
    }

    pub fn encode_group_token(&self, group_token: &str) -> Result<Vec<u8>, FormatError> {
        self.encode_opaque(FieldKind::GroupToken, group_token)
    }

    /// ASCII text into a fixed field, NUL padded
    fn encode_opaque(&self, field: FieldKind, value: &str) -> Result<Vec<u8>, FormatError> {
        ensure_ascii(field, value)?;

        let width = field.width(&self.descriptor);
        if value.len() > width {
            return Err(FormatError::Encoding {
                field: field.name(),
                reason: format!("{} bytes exceeds the {}-byte field", value.len(), width),
            });
        }

        let mut buf = value.as_bytes().to_vec();
        buf.resize(width, 0);
        Ok(buf)
    }

    /// Read the leading type tag without decoding the rest of the frame
    pub fn peek_type(&self, data: &[u8]) -> Result<i16, ProtocolError> {
        let kind = FieldKind::MessageType;
        let width = kind.width(&self.descriptor);
        let raw = data.get(..width).ok_or(ProtocolError::MalformedMessage {
            expected: width,
            got: data.len(),
        })?;
        Ok(i16::from_be_bytes(fixed(kind, raw)?))
    }

    /// Decode a full frame against `layout`
    pub fn decode(&self, layout: &Layout, data: &[u8]) -> Result<Decoded, ProtocolError> {
        let expected = layout.width(&self.descriptor);
        if data.len() != expected {
            return Err(ProtocolError::MalformedMessage {
                expected,
                got: data.len(),
            });
        }

        let mut fields = Vec::with_capacity(layout.fields().len());
        let mut offset = 0;
        for &kind in layout.fields() {
            let width = kind.width(&self.descriptor);
            let raw = &data[offset..offset + width];
            offset += width;

            let value = match kind {
                FieldKind::MessageType => FieldValue::MessageType(i16::from_be_bytes(fixed(kind, raw)?)),
                FieldKind::Count => FieldValue::Count(i16::from_be_bytes(fixed(kind, raw)?)),
                FieldKind::ErrorCode => FieldValue::ErrorCode(i16::from_be_bytes(fixed(kind, raw)?)),
                FieldKind::Nonce => FieldValue::Nonce(i32::from_be_bytes(fixed(kind, raw)?)),
                FieldKind::Status => FieldValue::Status(i8::from_be_bytes(fixed(kind, raw)?)),
                // Echoed ids are informational only
                FieldKind::StudentId => FieldValue::StudentId(String::from_utf8_lossy(raw).into_owned()),
                FieldKind::Token => FieldValue::Token(ascii_text(kind, raw)?),
                FieldKind::GroupToken => FieldValue::GroupToken(ascii_text(kind, raw)?),
            };
            fields.push(value);
        }

        Ok(Decoded { fields })
    }
}

fn ensure_ascii(field: FieldKind, value: &str) -> Result<(), FormatError> {
    if value.is_ascii() {
        Ok(())
    } else {
        Err(FormatError::Encoding {
            field: field.name(),
            reason: format!("'{}' contains non-ASCII characters", value),
        })
    }
}

fn fixed<const N: usize>(kind: FieldKind, raw: &[u8]) -> Result<[u8; N], ProtocolError> {
    raw.try_into().map_err(|_| ProtocolError::MalformedField {
        field: kind.name(),
        reason: format!("expected {} bytes, got {}", N, raw.len()),
    })
}

fn ascii_text(kind: FieldKind, raw: &[u8]) -> Result<String, ProtocolError> {
    if !raw.is_ascii() {
        return Err(ProtocolError::MalformedField {
            field: kind.name(),
            reason: "not ASCII".to_string(),
        });
    }
    // ASCII is valid UTF-8
    Ok(raw.iter().map(|&b| b as char).collect())
}
