//! Node descriptors and the factory for the built-in node families

use serde::{Deserialize, Serialize};

use super::input::{InputNode, InputSemantic};
use super::math::{MathNode, MathOperation};
use super::node::{NodeKind, ShaderNode};
use super::output::{OutputNode, OutputSemantic};
use super::pin::PinSpec;
use super::texture::TextureSampleNode;
use super::vector::VectorNode;
use crate::custom::CustomNodeManager;
use crate::error::{NodeError, RegistryError};

/// Name, category and pin layout of a node type
///
/// Built-in nodes derive one from their parameters; custom definitions
/// return one from [`CustomNodeDefinition::descriptor`](crate::custom::CustomNodeDefinition::descriptor).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<PinSpec>,
    #[serde(default)]
    pub outputs: Vec<PinSpec>,
}

impl NodeDescriptor {
    pub fn new(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    /// Builder pattern methods for fluent configuration
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<PinSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PinSpec>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_input(mut self, input: PinSpec) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: PinSpec) -> Self {
        self.outputs.push(output);
        self
    }
}

/// Creates nodes of every built-in family with their pins laid out
pub struct ShaderNodeFactory;

impl ShaderNodeFactory {
    pub fn create_math_node(operation: MathOperation) -> ShaderNode {
        let node = MathNode::new(operation);
        ShaderNode::new(node.descriptor(), NodeKind::Math(node))
    }

    /// Texture sample node reading [`DEFAULT_TEXTURE_NAME`](crate::constants::node::DEFAULT_TEXTURE_NAME)
    pub fn create_texture_sample_node() -> ShaderNode {
        Self::create_named_texture_sample_node(TextureSampleNode::default().texture_name())
    }

    pub fn create_named_texture_sample_node(texture_name: &str) -> ShaderNode {
        let node = TextureSampleNode::new(texture_name);
        ShaderNode::new(node.descriptor(), NodeKind::TextureSample(node))
    }

    /// Fails for component counts outside 2..=4
    pub fn create_vector_node(components: u32) -> Result<ShaderNode, NodeError> {
        let node = VectorNode::new(components)?;
        Ok(ShaderNode::new(node.descriptor(), NodeKind::Vector(node)))
    }

    /// `custom_name` is only used by [`InputSemantic::Custom`]
    pub fn create_input_node(semantic: InputSemantic, custom_name: &str) -> ShaderNode {
        let node = InputNode::new(semantic, custom_name);
        ShaderNode::new(node.descriptor(), NodeKind::Input(node))
    }

    /// `custom_name` is only used by [`OutputSemantic::Custom`]
    pub fn create_output_node(semantic: OutputSemantic, custom_name: &str) -> ShaderNode {
        let node = OutputNode::new(semantic, custom_name);
        ShaderNode::new(node.descriptor(), NodeKind::Output(node))
    }

    /// Instantiate a registered custom definition
    pub fn create_custom_node(manager: &CustomNodeManager, name: &str) -> Result<ShaderNode, RegistryError> {
        manager.create_node(name)
    }
}
