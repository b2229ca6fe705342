//! DNT column types.

use dnest_common::BinaryReader;

use crate::value::Value;
use crate::Result;

/// Column types used in the DNT schema.
///
/// The discriminants are the type tags stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColumnType {
    /// Length-prefixed EUC-KR string.
    Text = 1,
    /// 4-byte boolean record.
    Bool = 2,
    /// Unsigned 32-bit integer.
    UInt32 = 3,
    /// 32-bit floating point.
    Float = 4,
    /// Second float tag. Stored and decoded exactly like [`ColumnType::Float`].
    FloatAlt = 5,
}

impl ColumnType {
    /// Parse from a schema type tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Text),
            2 => Some(Self::Bool),
            3 => Some(Self::UInt32),
            4 => Some(Self::Float),
            5 => Some(Self::FloatAlt),
            _ => None,
        }
    }

    /// The tag this type is stored as.
    #[inline]
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// Size in bytes of one cell, or `None` for variable-length text.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Text => None,
            Self::Bool | Self::UInt32 | Self::Float | Self::FloatAlt => Some(4),
        }
    }

    /// Decode one cell of this type at the reader's position.
    pub fn decode(&self, reader: &mut BinaryReader<'_>) -> Result<Value> {
        let value = match self {
            Self::Text => Value::Text(reader.read_varchar()?),
            Self::Bool => Value::Bool(reader.read_padded_bool()?),
            Self::UInt32 => Value::UInt32(reader.read_u32()?),
            Self::Float | Self::FloatAlt => Value::Float(reader.read_f32()?),
        };
        Ok(value)
    }

    /// Get the string name for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Bool => "Bool",
            Self::UInt32 => "UInt32",
            Self::Float => "Float",
            Self::FloatAlt => "FloatAlt",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
