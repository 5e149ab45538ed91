//! Data-driven custom nodes parsed from JSON definition files
//!
//! A definition file looks like:
//!
//! ```json
//! {
//!   "name": "Wave",
//!   "category": "Procedural",
//!   "description": "Sine wave over time",
//!   "inputs": [
//!     { "name": "Value", "type": "float", "defaultValue": "0.0" },
//!     { "name": "Speed", "type": "float", "defaultValue": "1.0" }
//!   ],
//!   "outputs": [ { "name": "Result", "type": "float" } ],
//!   "code": "float {{Result_out}} = sin({{Value}} + Time * {{Speed}});"
//! }
//! ```
//!
//! `{{Pin}}` expands to the resolved expression of input `Pin` and
//! `{{Pin_out}}` to the variable name of output `Pin`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Deserialize;

use super::CustomNodeDefinition;
use crate::constants;
use crate::error::{CodegenError, DefinitionError};
use crate::nodes::{CodeWriter, NodeDescriptor, PinSpec};

/// Raw file layout before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefinitionFile {
    name: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    inputs: Vec<PinSpec>,
    #[serde(default)]
    outputs: Vec<PinSpec>,
    code: String,
}

fn default_category() -> String {
    "Custom".to_string()
}

/// Piece of a parsed code template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Input(usize),
    Output(usize),
}

/// Custom node parsed from a JSON document, optionally backed by a file
#[derive(Debug, Clone)]
pub struct JsonNodeDefinition {
    descriptor: NodeDescriptor,
    template: Vec<Segment>,
    path: Option<PathBuf>,
    modified: Option<SystemTime>,
}

impl JsonNodeDefinition {
    /// Parse and validate a definition from JSON text
    pub fn from_str(json: &str) -> Result<Self, DefinitionError> {
        let file: DefinitionFile = serde_json::from_str(json)?;
        if file.name.trim().is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if file.outputs.len() as u64 >= constants::node::OUTPUT_KEY_STRIDE {
            return Err(DefinitionError::TooManyOutputs(file.outputs.len()));
        }
        check_unique(&file.inputs)?;
        check_unique(&file.outputs)?;

        let template = parse_template(&file.code, &file.inputs, &file.outputs)?;
        let descriptor = NodeDescriptor::new(&file.name, &file.category)
            .with_description(&file.description)
            .with_inputs(file.inputs)
            .with_outputs(file.outputs);

        Ok(Self {
            descriptor,
            template,
            path: None,
            modified: None,
        })
    }

    /// Load a definition file, remembering its path and modification time
    pub fn from_file(path: &Path) -> Result<Self, DefinitionError> {
        // Stat before reading so a write racing the read shows up as a change
        let modified = fs::metadata(path)?.modified().ok();
        let json = fs::read_to_string(path)?;
        let mut definition = Self::from_str(&json)?;
        definition.path = Some(path.to_path_buf());
        definition.modified = modified;
        Ok(definition)
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check whether the backing file was modified since it was parsed
    ///
    /// A missing file, or one whose modification time cannot be read, is
    /// reported as unchanged.
    pub fn has_file_changed(&self) -> bool {
        let (Some(path), Some(recorded)) = (&self.path, self.modified) else {
            return false;
        };
        match fs::metadata(path).and_then(|metadata| metadata.modified()) {
            Ok(modified) => modified != recorded,
            Err(_) => false,
        }
    }

    /// Re-parse the backing file into a fresh definition
    ///
    /// `self` is never touched; the caller swaps the result in only on success.
    pub fn reloaded(&self) -> Result<Self, DefinitionError> {
        match &self.path {
            Some(path) => Self::from_file(path),
            None => Err(DefinitionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("definition '{}' has no backing file", self.name()),
            ))),
        }
    }
}

impl CustomNodeDefinition for JsonNodeDefinition {
    fn descriptor(&self) -> NodeDescriptor {
        self.descriptor.clone()
    }

    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        let mut code = String::new();
        for segment in &self.template {
            match segment {
                Segment::Text(text) => code.push_str(text),
                Segment::Input(index) => code.push_str(inputs.get(*index).map(String::as_str).unwrap_or_default()),
                Segment::Output(index) => code.push_str(&writer.output_name("custom", *index)),
            }
        }
        for line in code.lines().map(str::trim).filter(|line| !line.is_empty()) {
            writer.statement(line);
        }
        for index in 0..self.descriptor.outputs.len() {
            let variable = writer.output_name("custom", index);
            writer.bind_output(index, variable);
        }
        Ok(())
    }
}

fn check_unique(pins: &[PinSpec]) -> Result<(), DefinitionError> {
    let mut seen = HashSet::new();
    for pin in pins {
        if !seen.insert(pin.name.as_str()) {
            return Err(DefinitionError::DuplicatePin(pin.name.clone()));
        }
    }
    Ok(())
}

/// Split a code template into text and placeholder segments
///
/// Input names win over the `_out` suffix when both could match.
fn parse_template(code: &str, inputs: &[PinSpec], outputs: &[PinSpec]) -> Result<Vec<Segment>, DefinitionError> {
    let mut segments = Vec::new();
    let mut rest = code;

    while let Some(start) = rest.find("{{") {
        let Some(length) = rest[start + 2..].find("}}") else {
            break;
        };
        if start > 0 {
            segments.push(Segment::Text(rest[..start].to_string()));
        }
        let placeholder = &rest[start + 2..start + 2 + length];

        let segment = if let Some(index) = inputs.iter().position(|pin| pin.name == placeholder) {
            Segment::Input(index)
        } else if let Some(index) = placeholder
            .strip_suffix("_out")
            .and_then(|name| outputs.iter().position(|pin| pin.name == name))
        {
            Segment::Output(index)
        } else {
            return Err(DefinitionError::UnknownPlaceholder(placeholder.to_string()));
        };
        segments.push(segment);
        rest = &rest[start + 2 + length + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest.to_string()));
    }
    Ok(segments)
}
