//! SunSpec model definitions (SMDX) and the `.model` register layout
//!
//! An SMDX document declares one model made of blocks of typed points, plus
//! a `<strings>` section with localized labels. [`Model`] reads that
//! structure and renders the flat register layout consumed by the SunSpec
//! test tooling.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::block::{Block, BlockKind};
use crate::document::{Document, Element};
use crate::error::SmdxError;
use crate::point::{Point, PointType};

/// Locale used when `<strings>` does not declare one
pub const DEFAULT_LOCALE: &str = "en";

/// Name written after `data` in the artifact unless overridden
pub const DEFAULT_MODEL_NAME: &str = "model_test";

/// How to treat points whose type is outside the SunSpec set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Fail the parse with [`SmdxError::UnknownPointType`]
    Reject,
    /// Keep the literal type and render a default of `0`
    Zero,
}

impl Default for UnknownTypePolicy {
    fn default() -> Self {
        Self::Reject
    }
}

/// Localized strings for one point, keyed by child tag (`label`, `description`, ...)
pub type PointStrings = BTreeMap<String, String>;

/// A parsed SMDX model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// SunSpec model number from `<model id="...">`
    pub map_id: String,
    pub label: String,
    pub description: String,
    pub notes: String,
    pub locale: String,
    blocks: Vec<Block>,
    point_strings: HashMap<String, PointStrings>,
}

impl Model {
    /// Parse a model from an SMDX string, rejecting unknown point types
    pub fn from_xml(xml: &str) -> Result<Self, SmdxError> {
        Self::from_xml_with(xml, UnknownTypePolicy::default())
    }

    pub fn from_xml_with(xml: &str, policy: UnknownTypePolicy) -> Result<Self, SmdxError> {
        let document = Document::from_xml(xml)?;
        Self::from_document(&document, policy)
    }

    /// Parse a model from an SMDX file
    pub fn from_file(path: &Path, policy: UnknownTypePolicy) -> Result<Self, SmdxError> {
        let document = Document::from_file(path)?;
        Self::from_document(&document, policy)
    }

    /// Build a model from a loaded document.
    ///
    /// Only the first `<model>` element is used; any others are ignored.
    pub fn from_document(document: &Document, policy: UnknownTypePolicy) -> Result<Self, SmdxError> {
        let model_el = document
            .first_element("model")
            .ok_or_else(|| SmdxError::MissingElement("model".to_string()))?;
        let map_id = required_attr(model_el, "id")?.to_string();

        let strings_el = document
            .first_element("strings")
            .ok_or_else(|| SmdxError::MissingElement("strings".to_string()))?;
        let locale = strings_el
            .attr_non_empty("locale")
            .unwrap_or(DEFAULT_LOCALE)
            .to_string();

        let model_strings = strings_el
            .first_descendant("model")
            .ok_or_else(|| SmdxError::MissingElement("strings/model".to_string()))?;
        let label = element_text(model_strings, "label")?;
        let description = element_text(model_strings, "description")?;
        let notes = element_text(model_strings, "notes")?;

        let mut point_strings = HashMap::new();
        for point_el in strings_el.descendants_named("point") {
            let id = required_attr(point_el, "id")?.to_string();
            let strings: PointStrings = point_el
                .child_elements()
                .map(|child| (child.name.clone(), child.text()))
                .collect();
            point_strings.insert(id, strings);
        }

        let mut blocks = Vec::new();
        for block_el in model_el.descendants_named("block") {
            blocks.push(parse_block(block_el, policy)?);
        }

        debug!(
            map_id = %map_id,
            blocks = blocks.len(),
            locale = %locale,
            "Parsed SMDX model"
        );

        Ok(Self {
            map_id,
            label,
            description,
            notes,
            locale,
            blocks,
            point_strings,
        })
    }

    /// Blocks in document order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Localized strings for a point id, if the document declares any
    pub fn point_strings(&self, id: &str) -> Option<&PointStrings> {
        self.point_strings.get(id)
    }

    /// Total register length: the sum of declared block lengths
    pub fn total_length(&self) -> u64 {
        self.blocks
            .iter()
            .map(|b| u64::from(b.length))
            .sum()
    }

    /// Render the `.model` register layout
    pub fn render(&self, model_name: &str) -> String {
        let mut model_len = 0u64;
        let mut bodies = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let (body, next) = block.render(model_len);
            model_len = next;
            bodies.push(body);
        }

        let mut out = format!("data {} {{\n", model_name);
        out.push_str(&format!("  #{}\n", self.label));
        out.push_str(&format!("  #{}\n", self.description));
        out.push_str(&format!("  #{}\n", self.notes));
        out.push_str(&format!("  {}\n", self.map_id));
        out.push_str(&format!("  {}\n", model_len));
        for body in bodies {
            out.push_str(&body);
        }
        out.push_str("}\n");
        out
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SunSpec map {} {{", self.map_id)?;
        writeln!(f, "  label: {}", self.label)?;
        writeln!(f, "  description: {}", self.description)?;
        writeln!(f, "  notes: {}", self.notes)?;
        for block in &self.blocks {
            write!(f, "{}", block)?;
        }
        writeln!(f, "}}")
    }
}

fn parse_block(block_el: &Element, policy: UnknownTypePolicy) -> Result<Block, SmdxError> {
    let length = required_u32(block_el, "len")?;
    let kind = BlockKind::parse(block_el.attr("type").unwrap_or(""));
    let mut block = Block::new(length, kind);

    for point_el in block_el.descendants_named("point") {
        block.add_point(parse_point(point_el, policy)?);
    }

    if let Some((declared, actual)) = block.length_mismatch() {
        warn!(
            declared,
            actual,
            kind = %block.kind,
            "Block length does not match its points, using declared length"
        );
    }

    Ok(block)
}

fn parse_point(point_el: &Element, policy: UnknownTypePolicy) -> Result<Point, SmdxError> {
    let id = required_attr(point_el, "id")?.to_string();
    let offset = required_u32(point_el, "offset")?;
    let point_type = PointType::parse(required_attr(point_el, "type")?);

    if !point_type.is_known() && policy == UnknownTypePolicy::Reject {
        return Err(SmdxError::UnknownPointType {
            id,
            point_type: point_type.to_string(),
        });
    }

    let length = if point_type == PointType::String {
        required_u32(point_el, "len")?
    } else {
        0
    };

    let mandatory = point_el
        .attr("mandatory")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Ok(Point {
        id,
        offset,
        point_type,
        mandatory,
        length,
    })
}

fn required_attr<'a>(element: &'a Element, attribute: &str) -> Result<&'a str, SmdxError> {
    element
        .attr(attribute)
        .ok_or_else(|| SmdxError::MissingAttribute {
            element: element.name.clone(),
            attribute: attribute.to_string(),
        })
}

fn required_u32(element: &Element, attribute: &str) -> Result<u32, SmdxError> {
    let value = required_attr(element, attribute)?;
    value
        .trim()
        .parse()
        .map_err(|_| SmdxError::InvalidAttribute {
            element: element.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}

fn element_text(parent: &Element, name: &str) -> Result<String, SmdxError> {
    parent
        .first_descendant(name)
        .map(Element::text)
        .ok_or_else(|| SmdxError::MissingElement(format!("{}/{}", parent.name, name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMON: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<sunSpecModels v="1">
  <model id="1" len="66" name="common">
    <block len="66">
      <point id="Mn" offset="0" type="string" len="16" mandatory="true" />
      <point id="Md" offset="16" type="string" len="16" mandatory="true" />
      <point id="Opt" offset="32" type="string" len="8" />
      <point id="Vr" offset="40" type="string" len="8" />
      <point id="SN" offset="48" type="string" len="16" mandatory="true" />
      <point id="DA" offset="64" type="uint16" />
      <point id="Pad" offset="65" type="pad" />
    </block>
  </model>
  <strings id="1" locale="en">
    <model>
      <label>Common</label>
      <description>All SunSpec compliant devices must include this as the first model</description>
      <notes></notes>
    </model>
    <point id="Mn">
      <label>Manufacturer</label>
      <description>Well known value registered with SunSpec for compliance</description>
      <notes></notes>
    </point>
    <point id="DA">
      <label>Device Address</label>
      <description>Modbus device address</description>
    </point>
  </strings>
</sunSpecModels>
"#;

    const MINIMAL: &str = r#"<sunSpecModels v="1">
  <model id="801">
    <block len="2">
      <point id="ID" offset="0" type="uint16" />
      <point id="L" offset="1" type="uint16" />
    </block>
  </model>
  <strings>
    <model>
      <label>Test</label>
      <description>Minimal model</description>
      <notes>none</notes>
    </model>
  </strings>
</sunSpecModels>"#;

    #[test]
    fn test_parse_common_model() {
        let model = Model::from_xml(COMMON).unwrap();
        assert_eq!(model.map_id, "1");
        assert_eq!(model.locale, "en");
        assert_eq!(model.label, "Common");
        assert_eq!(model.notes, "");
        assert_eq!(model.blocks().len(), 1);

        let block = &model.blocks()[0];
        assert_eq!(block.length, 66);
        assert_eq!(block.kind, BlockKind::Normal);
        assert_eq!(block.len(), 7);

        let mn = block.point_at(0).unwrap();
        assert_eq!(mn.id, "Mn");
        assert_eq!(mn.point_type, PointType::String);
        assert_eq!(mn.length, 16);
        assert!(mn.mandatory);

        let da = block.point_at(64).unwrap();
        assert_eq!(da.length, 0);
        assert!(!da.mandatory);
    }

    #[test]
    fn test_point_strings() {
        let model = Model::from_xml(COMMON).unwrap();
        let mn = model.point_strings("Mn").unwrap();
        assert_eq!(mn.get("label").map(String::as_str), Some("Manufacturer"));
        assert_eq!(mn.get("notes").map(String::as_str), Some(""));
        assert_eq!(mn.len(), 3);

        let da = model.point_strings("DA").unwrap();
        assert_eq!(da.len(), 2);
        assert!(model.point_strings("SN").is_none());
    }

    #[test]
    fn test_render_minimal() {
        let model = Model::from_xml(MINIMAL).unwrap();
        assert_eq!(model.locale, DEFAULT_LOCALE);
        assert_eq!(
            model.render(DEFAULT_MODEL_NAME),
            "data model_test {\n  #Test\n  #Minimal model\n  #none\n  801\n  2\n  # block type=norm\n  # block length=2\n  uint16: 0 #ID\n  uint16: 0 #L\n}\n"
        );
    }

    #[test]
    fn test_render_common() {
        let model = Model::from_xml(COMMON).unwrap();
        let text = model.render("common");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "data common {");
        assert_eq!(lines[1], "  #Common");
        assert_eq!(lines[3], "  #");
        assert_eq!(lines[4], "  1");
        assert_eq!(lines[5], "  66");
        assert_eq!(lines[8], "  string.32: \"\" #Mn");
        assert_eq!(lines[10], "  string.16: \"\" #Opt");
        assert_eq!(lines[13], "  uint16: 0 #DA");
        assert_eq!(lines[14], "  uint16: 0 #Pad");
        assert_eq!(lines[15], "}");
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = Model::from_xml(COMMON).unwrap().render("m");
        let b = Model::from_xml(COMMON).unwrap().render("m");
        assert_eq!(a, b);
    }

    #[test]
    fn test_total_length_uses_declared_lengths() {
        let xml = r#"<sunSpecModels>
  <model id="101">
    <block len="5">
      <point id="A" offset="0" type="uint16" />
    </block>
    <block len="3" type="repeating">
      <point id="B" offset="0" type="int32" />
      <point id="C" offset="2" type="sunssf" />
    </block>
  </model>
  <strings locale="">
    <model><label>L</label><description>D</description><notes>N</notes></model>
  </strings>
</sunSpecModels>"#;

        let model = Model::from_xml(xml).unwrap();
        assert_eq!(model.locale, "en");
        assert_eq!(model.total_length(), 8);
        assert_eq!(model.blocks()[0].length_mismatch(), Some((5, 1)));
        assert_eq!(model.blocks()[1].kind, BlockKind::Repeating);

        let text = model.render("m");
        assert!(text.contains("  101\n  8\n"));
        let first = text.find("# block type=norm").unwrap();
        let second = text.find("# block type=repeating").unwrap();
        assert!(first < second);
        assert!(text.contains("  int32: 0 #B\n  sunssf: 0 #C\n"));
    }

    #[test]
    fn test_total_length_beyond_u32() {
        let xml = r#"<sunSpecModels>
  <model id="9">
    <block len="4000000000"><point id="A" offset="0" type="uint16" /></block>
    <block len="4000000000"><point id="B" offset="0" type="uint16" /></block>
  </model>
  <strings><model><label/><description/><notes/></model></strings>
</sunSpecModels>"#;

        let model = Model::from_xml(xml).unwrap();
        assert_eq!(model.total_length(), 8_000_000_000);
        assert!(model.render("m").contains("  9\n  8000000000\n"));
    }

    #[test]
    fn test_cdata_excluded_from_label() {
        let xml = r#"<sunSpecModels>
  <model id="3"><block len="0"/></model>
  <strings><model><label>A<![CDATA[B]]></label><description/><notes/></model></strings>
</sunSpecModels>"#;

        let model = Model::from_xml(xml).unwrap();
        assert_eq!(model.label, "A");
    }

    #[test]
    fn test_points_sorted_by_offset() {
        let xml = r#"<sunSpecModels>
  <model id="5">
    <block len="4">
      <point id="Z" offset="3" type="float32" />
      <point id="Y" offset="1" type="acc32" />
      <point id="X" offset="0" type="acc16" />
    </block>
  </model>
  <strings><model><label/><description/><notes/></model></strings>
</sunSpecModels>"#;

        let text = Model::from_xml(xml).unwrap().render("m");
        assert!(text.ends_with("  uint16: 0 #X\n  uint32: 0 #Y\n  float32: 0.0 #Z\n}\n"));
    }

    #[test]
    fn test_duplicate_offset_later_wins() {
        let xml = r#"<sunSpecModels>
  <model id="5">
    <block len="1">
      <point id="Old" offset="0" type="uint16" />
      <point id="New" offset="0" type="int16" />
    </block>
  </model>
  <strings><model><label/><description/><notes/></model></strings>
</sunSpecModels>"#;

        let text = Model::from_xml(xml).unwrap().render("m");
        assert!(text.contains("  int16: 0 #New\n"));
        assert!(!text.contains("#Old"));
    }

    #[test]
    fn test_first_model_wins() {
        let xml = r#"<sunSpecModels>
  <model id="10"><block len="1"><point id="A" offset="0" type="uint16"/></block></model>
  <model id="11"><block len="7"><point id="B" offset="0" type="uint16"/></block></model>
  <strings><model><label/><description/><notes/></model></strings>
</sunSpecModels>"#;

        let model = Model::from_xml(xml).unwrap();
        assert_eq!(model.map_id, "10");
        assert_eq!(model.total_length(), 1);
    }

    #[test]
    fn test_missing_strings() {
        let xml = r#"<sunSpecModels><model id="1"><block len="1"/></model></sunSpecModels>"#;
        assert!(matches!(
            Model::from_xml(xml),
            Err(SmdxError::MissingElement(ref e)) if e == "strings"
        ));
    }

    #[test]
    fn test_missing_attributes() {
        let no_len = r#"<sunSpecModels>
  <model id="1"><block><point id="A" offset="0" type="uint16"/></block></model>
  <strings><model><label/><description/><notes/></model></strings>
</sunSpecModels>"#;
        assert!(matches!(
            Model::from_xml(no_len),
            Err(SmdxError::MissingAttribute { ref element, ref attribute })
                if element == "block" && attribute == "len"
        ));

        let string_no_len = r#"<sunSpecModels>
  <model id="1"><block len="4"><point id="S" offset="0" type="string"/></block></model>
  <strings><model><label/><description/><notes/></model></strings>
</sunSpecModels>"#;
        assert!(matches!(
            Model::from_xml(string_no_len),
            Err(SmdxError::MissingAttribute { ref attribute, .. }) if attribute == "len"
        ));

        let bad_offset = r#"<sunSpecModels>
  <model id="1"><block len="4"><point id="S" offset="x" type="uint16"/></block></model>
  <strings><model><label/><description/><notes/></model></strings>
</sunSpecModels>"#;
        assert!(matches!(
            Model::from_xml(bad_offset),
            Err(SmdxError::InvalidAttribute { ref value, .. }) if value == "x"
        ));
    }

    #[test]
    fn test_unknown_type_policy() {
        let xml = r#"<sunSpecModels>
  <model id="1"><block len="4"><point id="Mac" offset="0" type="eui48"/></block></model>
  <strings><model><label/><description/><notes/></model></strings>
</sunSpecModels>"#;

        assert!(matches!(
            Model::from_xml(xml),
            Err(SmdxError::UnknownPointType { ref id, ref point_type })
                if id == "Mac" && point_type == "eui48"
        ));

        let model = Model::from_xml_with(xml, UnknownTypePolicy::Zero).unwrap();
        assert!(model.render("m").contains("  eui48: 0 #Mac\n"));
    }

    #[test]
    fn test_display_summary() {
        let model = Model::from_xml(MINIMAL).unwrap();
        let summary = model.to_string();
        assert!(summary.starts_with("SunSpec map 801 {\n  label: Test\n"));
        assert!(summary.contains("  ModelBlock (len=2, type=norm) {\n    ID {\n"));
        assert!(summary.contains("       point_type: uint16\n"));
        assert!(summary.ends_with("}\n"));
    }
}
