//! Semantic input nodes

use serde::{Deserialize, Serialize};

use super::codegen::{self, CodeWriter, GenerateCode};
use super::factory::NodeDescriptor;
use super::pin::{PinSpec, PinType};
use crate::error::CodegenError;

/// Value an [`InputNode`] reads from the shader environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSemantic {
    Position,
    Normal,
    Uv,
    Color,
    Tangent,
    Bitangent,
    Time,
    CameraPosition,
    /// A named uniform or local supplied by the surrounding shader
    Custom,
}

impl InputSemantic {
    pub const ALL: [InputSemantic; 9] = [
        InputSemantic::Position,
        InputSemantic::Normal,
        InputSemantic::Uv,
        InputSemantic::Color,
        InputSemantic::Tangent,
        InputSemantic::Bitangent,
        InputSemantic::Time,
        InputSemantic::CameraPosition,
        InputSemantic::Custom,
    ];
}

/// Zero-cost source node: binds its single output to a semantic expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputNode {
    semantic: InputSemantic,
    custom_name: String,
}

impl InputNode {
    pub fn new(semantic: InputSemantic, custom_name: impl Into<String>) -> Self {
        Self {
            semantic,
            custom_name: custom_name.into(),
        }
    }

    pub fn semantic(&self) -> InputSemantic {
        self.semantic
    }

    pub fn custom_name(&self) -> &str {
        &self.custom_name
    }

    /// Expression the output is bound to
    pub fn expression(&self) -> &str {
        match self.semantic {
            InputSemantic::Position => "input.position",
            InputSemantic::Normal => "input.normal",
            InputSemantic::Uv => "input.texCoord",
            InputSemantic::Color => "input.color",
            InputSemantic::Tangent => "input.tangent",
            InputSemantic::Bitangent => "input.bitangent",
            InputSemantic::Time => "Time",
            InputSemantic::CameraPosition => "CameraPosition",
            InputSemantic::Custom => self.custom_name.as_str(),
        }
    }

    pub fn descriptor(&self) -> NodeDescriptor {
        let (name, pin, pin_type) = match self.semantic {
            InputSemantic::Position => ("Position", "Position", PinType::Vec3),
            InputSemantic::Normal => ("Normal", "Normal", PinType::Vec3),
            InputSemantic::Uv => ("UV", "UV", PinType::Vec2),
            InputSemantic::Color => ("Vertex Color", "Color", PinType::Vec4),
            InputSemantic::Tangent => ("Tangent", "Tangent", PinType::Vec3),
            InputSemantic::Bitangent => ("Bitangent", "Bitangent", PinType::Vec3),
            InputSemantic::Time => ("Time", "Time", PinType::Float),
            InputSemantic::CameraPosition => ("Camera Position", "Position", PinType::Vec3),
            InputSemantic::Custom => (self.custom_name.as_str(), self.custom_name.as_str(), PinType::Float),
        };
        NodeDescriptor::new(name, "Input").with_output(PinSpec::output(pin, pin_type))
    }
}

impl GenerateCode for InputNode {
    fn generate_code(&self, _inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        if self.semantic == InputSemantic::Custom && !codegen::is_identifier(&self.custom_name) {
            return Err(CodegenError::InvalidName {
                node: writer.node_id(),
                name: self.custom_name.clone(),
            });
        }
        writer.bind_output(0, self.expression());
        Ok(())
    }
}
