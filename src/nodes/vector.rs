//! Vector constructor node

use super::codegen::{CodeWriter, GenerateCode};
use super::factory::NodeDescriptor;
use super::pin::{PinSpec, PinType};
use crate::constants;
use crate::error::{CodegenError, NodeError};

const COMPONENT_NAMES: [&str; 4] = ["X", "Y", "Z", "W"];

/// Builds a 2, 3 or 4 component vector from scalar inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorNode {
    components: u32,
}

impl VectorNode {
    pub fn new(components: u32) -> Result<Self, NodeError> {
        if !constants::node::VECTOR_ARITY_RANGE.contains(&components) {
            return Err(NodeError::InvalidVectorArity(components));
        }
        Ok(Self { components })
    }

    pub fn components(&self) -> u32 {
        self.components
    }

    pub fn descriptor(&self) -> NodeDescriptor {
        let inputs = COMPONENT_NAMES
            .iter()
            .take(self.components as usize)
            .map(|name| PinSpec::input(name, PinType::Float, "0.0"))
            .collect();
        NodeDescriptor::new(&format!("Vector{}", self.components), "Math")
            .with_inputs(inputs)
            .with_outputs(vec![PinSpec::output("Vector", PinType::vector(self.components))])
    }
}

impl GenerateCode for VectorNode {
    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        let variable = writer.local_name("vector");
        let ty = PinType::vector(self.components).shader_type();
        writer.statement(format!("{} {} = {}({});", ty, variable, ty, inputs.join(", ")));
        writer.bind_output(0, variable);
        Ok(())
    }
}
