//! Semantic output nodes, the roots of code generation

use serde::{Deserialize, Serialize};

use super::codegen::{self, CodeWriter, GenerateCode, ShaderStage};
use super::factory::NodeDescriptor;
use super::pin::{PinSpec, PinType};
use crate::constants;
use crate::error::CodegenError;

/// Field of the stage output an [`OutputNode`] writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputSemantic {
    Color,
    Normal,
    Emission,
    Metallic,
    Roughness,
    AmbientOcclusion,
    /// Vertex stage: offset added to the object-space position
    PositionOffset,
    /// Extra float field declared on the fragment output structure
    Custom,
}

impl OutputSemantic {
    pub const ALL: [OutputSemantic; 8] = [
        OutputSemantic::Color,
        OutputSemantic::Normal,
        OutputSemantic::Emission,
        OutputSemantic::Metallic,
        OutputSemantic::Roughness,
        OutputSemantic::AmbientOcclusion,
        OutputSemantic::PositionOffset,
        OutputSemantic::Custom,
    ];

    pub fn stage(&self) -> ShaderStage {
        match self {
            OutputSemantic::PositionOffset => ShaderStage::Vertex,
            _ => ShaderStage::Fragment,
        }
    }
}

/// Sink node assigning its single input to an output field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNode {
    semantic: OutputSemantic,
    custom_name: String,
}

impl OutputNode {
    pub fn new(semantic: OutputSemantic, custom_name: impl Into<String>) -> Self {
        Self {
            semantic,
            custom_name: custom_name.into(),
        }
    }

    pub fn semantic(&self) -> OutputSemantic {
        self.semantic
    }

    pub fn custom_name(&self) -> &str {
        &self.custom_name
    }

    /// Stage whose generated code includes this node
    pub fn stage(&self) -> ShaderStage {
        self.semantic.stage()
    }

    /// Assignment target for the resolved input
    pub fn target(&self) -> String {
        let field = match self.semantic {
            OutputSemantic::Color => "color",
            OutputSemantic::Normal => "normal",
            OutputSemantic::Emission => "emission",
            OutputSemantic::Metallic => "metallic",
            OutputSemantic::Roughness => "roughness",
            OutputSemantic::AmbientOcclusion => "ao",
            OutputSemantic::PositionOffset => return constants::shader::LOCAL_POSITION_VAR.to_string(),
            OutputSemantic::Custom => self.custom_name.as_str(),
        };
        format!("{}.{}", constants::shader::OUTPUT_STRUCT_VAR, field)
    }

    pub fn descriptor(&self) -> NodeDescriptor {
        let (name, pin) = match self.semantic {
            OutputSemantic::Color => ("Color Output".to_string(), PinSpec::input("Color", PinType::Vec3, "float3(0,0,0)")),
            OutputSemantic::Normal => ("Normal Output".to_string(), PinSpec::input("Normal", PinType::Vec3, "float3(0,0,1)")),
            OutputSemantic::Emission => {
                ("Emission Output".to_string(), PinSpec::input("Emission", PinType::Vec3, "float3(0,0,0)"))
            }
            OutputSemantic::Metallic => ("Metallic Output".to_string(), PinSpec::input("Metallic", PinType::Float, "0.0")),
            OutputSemantic::Roughness => {
                ("Roughness Output".to_string(), PinSpec::input("Roughness", PinType::Float, "0.5"))
            }
            OutputSemantic::AmbientOcclusion => ("AO Output".to_string(), PinSpec::input("AO", PinType::Float, "1.0")),
            OutputSemantic::PositionOffset => {
                ("Position Offset Output".to_string(), PinSpec::input("Offset", PinType::Vec3, "float3(0,0,0)"))
            }
            OutputSemantic::Custom => (
                format!("{} Output", self.custom_name),
                PinSpec::input(&self.custom_name, PinType::Float, "0.0"),
            ),
        };
        NodeDescriptor::new(&name, "Output").with_input(pin)
    }
}

impl GenerateCode for OutputNode {
    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        if self.semantic == OutputSemantic::Custom
            && (!codegen::is_identifier(&self.custom_name)
                || constants::shader::BUILTIN_OUTPUT_FIELDS.contains(&self.custom_name.as_str()))
        {
            return Err(CodegenError::InvalidName {
                node: writer.node_id(),
                name: self.custom_name.clone(),
            });
        }
        let value = inputs.first().map(String::as_str).unwrap_or_default();
        let operator = match self.semantic {
            OutputSemantic::PositionOffset => "+=",
            _ => "=",
        };
        writer.statement(format!("{} {} {};", self.target(), operator, value));
        Ok(())
    }
}
