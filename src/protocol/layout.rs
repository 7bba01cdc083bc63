//! Message layouts
//!
//! A layout is the ordered list of fields making up one frame. Individual
//! frames have a fixed shape; group frames are built for a runtime SAS count.
//!
//! ```text
//! individual response: type(2) | student_id(12) | nonce(4) | token(64)
//! group status:        type(2) | n(2) | [student_id(12) | nonce(4) | token(64)] x n |
//!                      group_token(64) | status(1)
//! ```

use super::descriptor::ProtocolDescriptor;

/// Kind of a single wire field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    MessageType,
    Count,
    StudentId,
    Nonce,
    Token,
    GroupToken,
    Status,
    ErrorCode,
}

impl FieldKind {
    /// Width of this field in bytes
    pub const fn width(self, d: &ProtocolDescriptor) -> usize {
        match self {
            Self::MessageType => d.type_len,
            Self::Count => d.count_len,
            Self::StudentId => d.student_id_len,
            Self::Nonce => d.nonce_len,
            Self::Token => d.token_len,
            Self::GroupToken => d.group_token_len,
            Self::Status => d.status_len,
            Self::ErrorCode => d.error_code_len,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::MessageType => "type",
            Self::Count => "n",
            Self::StudentId => "student_id",
            Self::Nonce => "nonce",
            Self::Token => "token",
            Self::GroupToken => "group_token",
            Self::Status => "status",
            Self::ErrorCode => "error_code",
        }
    }
}

/// What follows the SAS entries of a group frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupTail {
    /// Group token request (type 5)
    Nothing,
    /// Group token response and validation (types 6 and 7)
    GroupToken,
    /// Group token status (type 8)
    GroupTokenStatus,
}

/// Ordered field sequence of one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<FieldKind>,
}

impl Layout {
    pub fn new(fields: Vec<FieldKind>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldKind] {
        &self.fields
    }

    /// Total width in bytes
    pub fn width(&self, d: &ProtocolDescriptor) -> usize {
        self.fields.iter().map(|f| f.width(d)).sum()
    }

    /// `type | error_code`
    pub fn error_frame() -> Self {
        Self::new(vec![FieldKind::MessageType, FieldKind::ErrorCode])
    }

    /// `type | student_id | nonce` (type 1)
    pub fn individual_token_request() -> Self {
        Self::new(vec![
            FieldKind::MessageType,
            FieldKind::StudentId,
            FieldKind::Nonce,
        ])
    }

    /// `type | student_id | nonce | token` (types 2 and 3)
    pub fn individual_token_response() -> Self {
        Self::new(vec![
            FieldKind::MessageType,
            FieldKind::StudentId,
            FieldKind::Nonce,
            FieldKind::Token,
        ])
    }

    /// `type | student_id | nonce | token | status` (type 4)
    pub fn individual_token_status() -> Self {
        let mut layout = Self::individual_token_response();
        layout.fields.push(FieldKind::Status);
        layout
    }

    /// `type | n | SAS x n | tail` for any `n`
    pub fn group(n: usize, tail: GroupTail) -> Self {
        let mut fields = Vec::with_capacity(2 + 3 * n + 2);
        fields.push(FieldKind::MessageType);
        fields.push(FieldKind::Count);
        for _ in 0..n {
            fields.extend_from_slice(&[FieldKind::StudentId, FieldKind::Nonce, FieldKind::Token]);
        }
        match tail {
            GroupTail::Nothing => {}
            GroupTail::GroupToken => fields.push(FieldKind::GroupToken),
            GroupTail::GroupTokenStatus => {
                fields.push(FieldKind::GroupToken);
                fields.push(FieldKind::Status);
            }
        }
        Self::new(fields)
    }
}
