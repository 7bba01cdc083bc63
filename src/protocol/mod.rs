//! Token protocol implementation
//!
//! This module contains the wire-level components:
//! - Protocol descriptor (field widths)
//! - Frame layouts, including group layouts of any arity
//! - Field codec
//! - Message types, SAS/GAS text forms and request frames

pub mod codec;
pub mod descriptor;
pub mod layout;
pub mod messages;

pub use codec::{Decoded, FieldValue, WireCodec};
pub use descriptor::ProtocolDescriptor;
pub use layout::{FieldKind, GroupTail, Layout};
pub use messages::{Gas, MessageType, Sas};
