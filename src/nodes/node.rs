//! Shader node types and core node functionality

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec2;

use super::codegen::{CodeWriter, GenerateCode};
use super::factory::NodeDescriptor;
use super::input::InputNode;
use super::math::MathNode;
use super::output::OutputNode;
use super::pin::Pin;
use super::texture::TextureSampleNode;
use super::vector::VectorNode;
use crate::constants;
use crate::custom::CustomShaderNode;
use crate::error::CodegenError;

/// Unique identifier for a shader node
pub type NodeId = u32;

/// Process-wide id counter. Ids are never reused within a process.
static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

fn next_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// The operation a node performs, one variant per node family
///
/// The fixed families are closed; `Custom` forwards to a definition
/// registered with the [`CustomNodeManager`](crate::custom::CustomNodeManager).
#[derive(Debug, Clone)]
pub enum NodeKind {
    Math(MathNode),
    TextureSample(TextureSampleNode),
    Vector(VectorNode),
    Input(InputNode),
    Output(OutputNode),
    Custom(CustomShaderNode),
}

impl NodeKind {
    fn generator(&self) -> &dyn GenerateCode {
        match self {
            NodeKind::Math(node) => node,
            NodeKind::TextureSample(node) => node,
            NodeKind::Vector(node) => node,
            NodeKind::Input(node) => node,
            NodeKind::Output(node) => node,
            NodeKind::Custom(node) => node,
        }
    }
}

impl GenerateCode for NodeKind {
    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        self.generator().generate_code(inputs, writer)
    }
}

/// A typed unit of shader computation with input and output pins
///
/// Identity is the process-unique [`NodeId`]; nodes are deliberately not
/// `Clone` or `PartialEq`.
pub struct ShaderNode {
    id: NodeId,
    name: String,
    category: String,
    position: Vec2,
    size: Vec2,
    inputs: Vec<Pin>,
    outputs: Vec<Pin>,
    kind: NodeKind,
}

impl ShaderNode {
    /// Creates a new node with a fresh id and the pins listed in `descriptor`
    pub fn new(descriptor: NodeDescriptor, kind: NodeKind) -> Self {
        debug_assert!((descriptor.outputs.len() as u64) < constants::node::OUTPUT_KEY_STRIDE);
        let [width, height] = constants::node::DEFAULT_SIZE;
        Self {
            id: next_node_id(),
            inputs: descriptor.inputs.iter().map(|spec| spec.to_pin()).collect(),
            outputs: descriptor.outputs.iter().map(|spec| spec.to_pin()).collect(),
            name: descriptor.name,
            category: descriptor.category,
            position: Vec2::ZERO,
            size: Vec2::new(width, height),
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Editor position of the node
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Editor size of the node
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Sets the position and returns the node (builder style)
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn inputs(&self) -> &[Pin] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Pin] {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Option<&Pin> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&Pin> {
        self.outputs.get(index)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn input_mut(&mut self, index: usize) -> Option<&mut Pin> {
        self.inputs.get_mut(index)
    }

    pub(crate) fn output_mut(&mut self, index: usize) -> Option<&mut Pin> {
        self.outputs.get_mut(index)
    }

    /// Replace kind and pin layout in place, keeping id and editor layout.
    /// Pins come back disconnected; the owning graph resyncs them.
    pub(crate) fn rebind(&mut self, descriptor: NodeDescriptor, kind: NodeKind) {
        self.inputs = descriptor.inputs.iter().map(|spec| spec.to_pin()).collect();
        self.outputs = descriptor.outputs.iter().map(|spec| spec.to_pin()).collect();
        self.name = descriptor.name;
        self.category = descriptor.category;
        self.kind = kind;
    }
}

impl fmt::Debug for ShaderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("kind", &self.kind)
            .finish()
    }
}
