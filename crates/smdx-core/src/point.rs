//! Point types and the mapping from declared SMDX types to wire types
//!
//! SMDX declares each point with a type from a closed set. The `.model`
//! artifact uses a narrower vocabulary: accumulators and padding collapse to
//! their unsigned equivalents and strings carry their byte width.

use std::fmt;

/// Declared type of a point, as written in the `type` attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointType {
    String,
    Pad,
    Sunssf,
    Acc16,
    Uint16,
    Int16,
    Acc32,
    Uint32,
    Int32,
    Bitfield32,
    Float32,
    /// A type outside the SunSpec set, kept verbatim
    Other(String),
}

impl PointType {
    pub fn parse(s: &str) -> Self {
        match s {
            "string" => Self::String,
            "pad" => Self::Pad,
            "sunssf" => Self::Sunssf,
            "acc16" => Self::Acc16,
            "uint16" => Self::Uint16,
            "int16" => Self::Int16,
            "acc32" => Self::Acc32,
            "uint32" => Self::Uint32,
            "int32" => Self::Int32,
            "bitfield32" => Self::Bitfield32,
            "float32" => Self::Float32,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Pad => "pad",
            Self::Sunssf => "sunssf",
            Self::Acc16 => "acc16",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Acc32 => "acc32",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Bitfield32 => "bitfield32",
            Self::Float32 => "float32",
            Self::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Number of registers a point of this type occupies.
    ///
    /// `length` only matters for strings, where it is the declared register
    /// count. Unknown types have no defined width.
    pub fn register_count(&self, length: u32) -> Option<u32> {
        match self {
            Self::String => Some(length),
            Self::Pad | Self::Sunssf | Self::Acc16 | Self::Uint16 | Self::Int16 => Some(1),
            Self::Acc32 | Self::Uint32 | Self::Int32 | Self::Bitfield32 | Self::Float32 => Some(2),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for PointType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type token written to the `.model` artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireType {
    /// Fixed-width string, width in bytes
    String(u64),
    Uint16,
    Int16,
    Uint32,
    Int32,
    Sunssf,
    Bitfield32,
    Float32,
    Other(String),
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::String(bytes) => write!(f, "string.{}", bytes),
            WireType::Uint16 => f.write_str("uint16"),
            WireType::Int16 => f.write_str("int16"),
            WireType::Uint32 => f.write_str("uint32"),
            WireType::Int32 => f.write_str("int32"),
            WireType::Sunssf => f.write_str("sunssf"),
            WireType::Bitfield32 => f.write_str("bitfield32"),
            WireType::Float32 => f.write_str("float32"),
            WireType::Other(s) => f.write_str(s),
        }
    }
}

/// Map a declared point type to its wire type.
///
/// Strings report their width in bytes (two per register). Unknown types
/// pass through unchanged.
pub fn resolve_wire_type(point_type: &PointType, length: u32) -> WireType {
    match point_type {
        PointType::String => WireType::String(u64::from(length) * 2),
        PointType::Pad | PointType::Acc16 | PointType::Uint16 => WireType::Uint16,
        PointType::Acc32 | PointType::Uint32 => WireType::Uint32,
        PointType::Int16 => WireType::Int16,
        PointType::Int32 => WireType::Int32,
        PointType::Sunssf => WireType::Sunssf,
        PointType::Bitfield32 => WireType::Bitfield32,
        PointType::Float32 => WireType::Float32,
        PointType::Other(s) => WireType::Other(s.clone()),
    }
}

/// Canonical default value literal for a declared type.
///
/// Returns `None` for types outside the SunSpec set; callers decide how to
/// treat them (see [`crate::UnknownTypePolicy`]).
pub fn default_value(point_type: &PointType) -> Option<&'static str> {
    match point_type {
        PointType::String => Some("\"\""),
        PointType::Float32 => Some("0.0"),
        PointType::Pad
        | PointType::Sunssf
        | PointType::Acc16
        | PointType::Uint16
        | PointType::Int16
        | PointType::Acc32
        | PointType::Uint32
        | PointType::Int32
        | PointType::Bitfield32 => Some("0"),
        PointType::Other(_) => None,
    }
}

/// A single register field within a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub id: String,
    /// Register index within the owning block
    pub offset: u32,
    pub point_type: PointType,
    pub mandatory: bool,
    /// Register count, only meaningful for strings
    pub length: u32,
}

impl Point {
    pub fn wire_type(&self) -> WireType {
        resolve_wire_type(&self.point_type, self.length)
    }

    pub fn default_value(&self) -> Option<&'static str> {
        default_value(&self.point_type)
    }

    pub fn register_count(&self) -> Option<u32> {
        self.point_type.register_count(self.length)
    }
}
