//! smdx Core - SunSpec model definition parsing and register layout
//!
//! This crate turns SMDX model definitions into `.model` register layouts:
//! - Type mapping from declared point types to wire types and defaults
//! - Blocks of points ordered by register offset
//! - Model parsing, localized strings, and layout rendering
//! - Directory manifests of definition files

pub mod block;
pub mod convert;
pub mod document;
pub mod error;
pub mod manifest;
pub mod model;
pub mod point;

pub use block::{Block, BlockKind};
pub use convert::{convert_file, convert_str, ConvertOptions};
pub use document::{Document, Element};
pub use error::SmdxError;
pub use manifest::{md5_hex, scan, Manifest, ManifestConfig, ManifestEntry};
pub use model::{Model, PointStrings, UnknownTypePolicy, DEFAULT_LOCALE, DEFAULT_MODEL_NAME};
pub use point::{default_value, resolve_wire_type, Point, PointType, WireType};
