//! Protocol descriptor
//!
//! Single source of truth for every field width and frame size of the token
//! protocol. All multi-byte integers travel big-endian.

/// Immutable description of the wire protocol widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolDescriptor {
    /// Message type tag (i16)
    pub type_len: usize,
    /// SAS count in group messages (i16)
    pub count_len: usize,
    /// Space padded student id
    pub student_id_len: usize,
    /// Nonce (i32)
    pub nonce_len: usize,
    /// Individual token
    pub token_len: usize,
    /// Group token
    pub group_token_len: usize,
    /// Validation status (i8)
    pub status_len: usize,
    /// Error code carried by the error frame (i16)
    pub error_code_len: usize,
}

impl ProtocolDescriptor {
    /// The widths used by the deployed token server
    pub const STANDARD: Self = Self {
        type_len: 2,
        count_len: 2,
        student_id_len: 12,
        nonce_len: 4,
        token_len: 64,
        group_token_len: 64,
        status_len: 1,
        error_code_len: 2,
    };

    /// Binary SAS: student id + nonce + token
    pub const fn sas_len(&self) -> usize {
        self.student_id_len + self.nonce_len + self.token_len
    }

    /// Size of the error frame: type + error code.
    ///
    /// Any reply of exactly this size is treated as an error frame, even when a
    /// legitimate layout happens to share the size. The protocol does not
    /// disambiguate the two.
    pub const fn error_frame_len(&self) -> usize {
        self.type_len + self.error_code_len
    }

    /// Header shared by all group messages: type + n
    pub const fn group_header_len(&self) -> usize {
        self.type_len + self.count_len
    }
}

impl Default for ProtocolDescriptor {
    fn default() -> Self {
        Self::STANDARD
    }
}
