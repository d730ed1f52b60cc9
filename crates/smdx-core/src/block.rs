//! Blocks - contiguous register runs holding points keyed by offset

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::point::Point;

/// Block kind from the `type` attribute of `<block>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `norm`, the default when the attribute is absent
    Normal,
    Repeating,
    /// Any other kind, kept verbatim for the artifact
    Other(String),
}

impl BlockKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "" | "norm" => Self::Normal,
            "repeating" => Self::Repeating,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "norm",
            Self::Repeating => "repeating",
            Self::Other(s) => s,
        }
    }
}

impl Default for BlockKind {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block of registers and the points declared within it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Declared register count
    pub length: u32,
    pub kind: BlockKind,
    points: BTreeMap<u32, Point>,
}

impl Block {
    pub fn new(length: u32, kind: BlockKind) -> Self {
        Self {
            length,
            kind,
            points: BTreeMap::new(),
        }
    }

    /// Insert a point at its offset.
    ///
    /// A later point at an already used offset replaces the earlier one; the
    /// replaced point is returned.
    pub fn add_point(&mut self, point: Point) -> Option<Point> {
        let replaced = self.points.insert(point.offset, point);
        if let Some(ref old) = replaced {
            if let Some(new) = self.points.get(&old.offset) {
                warn!(
                    offset = old.offset,
                    replaced = %old.id,
                    by = %new.id,
                    "Duplicate point offset in block, keeping the later point"
                );
            }
        }
        replaced
    }

    /// Points in ascending offset order
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.points.values()
    }

    pub fn point_at(&self, offset: u32) -> Option<&Point> {
        self.points.get(&offset)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of the register widths of the declared points, or `None` when a
    /// point has a type of unknown width.
    pub fn point_registers(&self) -> Option<u64> {
        self.points
            .values()
            .try_fold(0u64, |acc, p| p.register_count().map(|n| acc + u64::from(n)))
    }

    /// `(declared, actual)` when the declared length disagrees with the points
    pub fn length_mismatch(&self) -> Option<(u32, u64)> {
        match self.point_registers() {
            Some(actual) if actual != u64::from(self.length) => Some((self.length, actual)),
            _ => None,
        }
    }

    /// Render the block body for the `.model` artifact.
    ///
    /// Returns the text and the register offset where the next block starts.
    /// The offset always advances by the declared length, not by the widths of
    /// the rendered points. Offsets are carried as `u64` so the sum of any
    /// number of `u32` block lengths is exact.
    pub fn render(&self, offset: u64) -> (String, u64) {
        let mut out = String::new();
        out.push_str(&format!("  # block type={}\n", self.kind));
        out.push_str(&format!("  # block length={}\n", self.length));

        for point in self.points.values() {
            out.push_str(&format!(
                "  {}: {} #{}\n",
                point.wire_type(),
                point.default_value().unwrap_or("0"),
                point.id
            ));
        }

        (out, offset + u64::from(self.length))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  ModelBlock (len={}, type={}) {{", self.length, self.kind)?;
        for point in self.points.values() {
            writeln!(f, "    {} {{", point.id)?;
            writeln!(f, "       id: {}", point.id)?;
            writeln!(f, "       offset: {}", point.offset)?;
            writeln!(f, "       point_type: {}", point.point_type)?;
            writeln!(f, "       mandatory: {}", point.mandatory)?;
            writeln!(f, "       length: {}", point.length)?;
            writeln!(f, "    }}")?;
        }
        writeln!(f, "  }}")
    }
}
