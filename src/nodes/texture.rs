//! Texture sampling node

use super::codegen::{CodeWriter, GenerateCode};
use super::factory::NodeDescriptor;
use super::pin::{PinSpec, PinType};
use crate::constants;
use crate::error::CodegenError;

/// Samples a 2D texture at a UV coordinate
///
/// Outputs, in order: RGBA, RGB, R, G, B, A. One sample statement is emitted;
/// the channel outputs are swizzles of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSampleNode {
    texture_name: String,
}

/// Swizzle suffix bound to each output index
const CHANNELS: [&str; 6] = ["", ".rgb", ".r", ".g", ".b", ".a"];

impl TextureSampleNode {
    pub fn new(texture_name: impl Into<String>) -> Self {
        Self {
            texture_name: texture_name.into(),
        }
    }

    /// Texture bound when the `Texture` input is left unconnected
    pub fn texture_name(&self) -> &str {
        &self.texture_name
    }

    pub fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::new("Texture Sample", "Texture")
            .with_inputs(vec![
                PinSpec::input("Texture", PinType::Sampler2D, &self.texture_name),
                PinSpec::input("UV", PinType::Vec2, "input.texCoord"),
            ])
            .with_outputs(vec![
                PinSpec::output("RGBA", PinType::Vec4),
                PinSpec::output("RGB", PinType::Vec3),
                PinSpec::output("R", PinType::Float),
                PinSpec::output("G", PinType::Float),
                PinSpec::output("B", PinType::Float),
                PinSpec::output("A", PinType::Float),
            ])
    }
}

impl Default for TextureSampleNode {
    fn default() -> Self {
        Self::new(constants::node::DEFAULT_TEXTURE_NAME)
    }
}

impl GenerateCode for TextureSampleNode {
    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        let (texture, uv) = match inputs {
            [texture, uv, ..] => (texture, uv),
            _ => return Ok(()),
        };
        let variable = writer.local_name("texture");
        writer.statement(format!(
            "float4 {} = {}.Sample({}Sampler, {});",
            variable, texture, texture, uv
        ));
        for (index, channel) in CHANNELS.iter().enumerate() {
            writer.bind_output(index, format!("{}{}", variable, channel));
        }
        Ok(())
    }
}
