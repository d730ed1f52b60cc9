//! File-level conversion from SMDX to a `.model` artifact

use std::path::Path;

use tracing::info;

use crate::error::SmdxError;
use crate::model::{Model, UnknownTypePolicy, DEFAULT_MODEL_NAME};

/// Options controlling a single conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Name written after `data` in the artifact
    pub model_name: String,
    pub unknown_types: UnknownTypePolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            unknown_types: UnknownTypePolicy::default(),
        }
    }
}

/// Convert an SMDX string to `.model` text
pub fn convert_str(xml: &str, options: &ConvertOptions) -> Result<String, SmdxError> {
    let model = Model::from_xml_with(xml, options.unknown_types)?;
    Ok(model.render(&options.model_name))
}

/// Convert the SMDX file at `input` and write the artifact to `output`.
///
/// The output file is only created once the whole layout has rendered, so a
/// failed parse leaves nothing behind.
pub fn convert_file(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<Model, SmdxError> {
    let model = Model::from_file(input, options.unknown_types)?;
    let text = model.render(&options.model_name);
    std::fs::write(output, text)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        map_id = %model.map_id,
        registers = model.total_length(),
        "Wrote model layout"
    );

    Ok(model)
}
