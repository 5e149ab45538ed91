//! Shader source generation from a node graph
//!
//! Generation walks backward from every output node of the requested stage,
//! emitting each reachable node once, after all nodes feeding its inputs.
//! Producers and consumers communicate only through the variable table,
//! keyed by [`OutputKey`].

use std::collections::HashMap;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use super::graph::ShaderGraph;
use super::node::{NodeId, NodeKind, ShaderNode};
use crate::constants;
use crate::error::CodegenError;

/// Composite key naming one output pin of one node: `node_id * STRIDE + output`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputKey(u64);

impl OutputKey {
    pub fn new(node: NodeId, output: usize) -> Self {
        debug_assert!((output as u64) < constants::node::OUTPUT_KEY_STRIDE);
        Self(u64::from(node) * constants::node::OUTPUT_KEY_STRIDE + output as u64)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Shader stage a piece of generated code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Formatting options for generated source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodegenOptions {
    pub indent_width: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            indent_width: constants::shader::DEFAULT_INDENT,
        }
    }
}

/// Capability shared by every node family: emit code for one node
///
/// `inputs` holds one resolved expression per input pin, either the variable
/// produced upstream or the pin's default literal.
pub trait GenerateCode {
    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError>;
}

/// Sink handed to a node while it generates code
///
/// Collects emitted statements and records the expressions bound to the
/// node's outputs under their [`OutputKey`].
pub struct CodeWriter<'a> {
    node_id: NodeId,
    indent: &'a str,
    code: &'a mut String,
    variables: &'a mut HashMap<OutputKey, String>,
}

impl<'a> CodeWriter<'a> {
    pub fn new(
        node_id: NodeId,
        indent: &'a str,
        code: &'a mut String,
        variables: &'a mut HashMap<OutputKey, String>,
    ) -> Self {
        Self {
            node_id,
            indent,
            code,
            variables,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Unique local name for this node: `<prefix>_<id>`
    pub fn local_name(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.node_id)
    }

    /// Unique name for one output of this node: `<prefix>_<id>_out<index>`
    pub fn output_name(&self, prefix: &str, index: usize) -> String {
        format!("{}_{}_out{}", prefix, self.node_id, index)
    }

    /// Append one statement line (indented, newline terminated)
    pub fn statement(&mut self, line: impl AsRef<str>) {
        self.code.push_str(self.indent);
        self.code.push_str(line.as_ref());
        self.code.push('\n');
    }

    /// Record the expression downstream nodes read from output `index`
    pub fn bind_output(&mut self, index: usize, expression: impl Into<String>) {
        self.variables
            .insert(OutputKey::new(self.node_id, index), expression.into());
    }

    pub fn is_bound(&self, index: usize) -> bool {
        self.variables.contains_key(&OutputKey::new(self.node_id, index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Dependency-first walk over the output roots of one stage
struct GraphWalker<'g> {
    graph: &'g ShaderGraph,
    indent: String,
    variables: HashMap<OutputKey, String>,
    visits: HashMap<NodeId, VisitState>,
    body: String,
}

impl<'g> GraphWalker<'g> {
    fn new(graph: &'g ShaderGraph, options: &CodegenOptions) -> Self {
        Self {
            graph,
            indent: " ".repeat(options.indent_width),
            variables: HashMap::new(),
            visits: HashMap::new(),
            body: String::new(),
        }
    }

    fn run(mut self, stage: ShaderStage) -> Result<String, CodegenError> {
        let roots: Vec<NodeId> = self
            .graph
            .nodes()
            .iter()
            .filter(|node| matches!(node.kind(), NodeKind::Output(output) if output.stage() == stage))
            .map(|node| node.id())
            .collect();
        debug!("Generating {:?} code for {} output node(s)", stage, roots.len());

        for root in roots {
            self.visit(root)?;
        }
        Ok(self.body)
    }

    fn visit(&mut self, id: NodeId) -> Result<(), CodegenError> {
        match self.visits.get(&id) {
            Some(VisitState::Done) => return Ok(()),
            Some(VisitState::InProgress) => {
                error!("Shader graph cycle detected at node {}", id);
                return Err(CodegenError::Cycle(id));
            }
            None => {}
        }
        self.visits.insert(id, VisitState::InProgress);

        let graph = self.graph;
        let node = graph.node(id).ok_or(CodegenError::NodeNotFound(id))?;

        for index in 0..node.inputs().len() {
            if let Some((source, _)) = graph.connection_source(id, index) {
                self.visit(source)?;
            }
        }

        let inputs = self.resolve_inputs(node)?;
        let mut writer = CodeWriter::new(id, &self.indent, &mut self.body, &mut self.variables);
        node.kind().generate_code(&inputs, &mut writer)?;

        if let Some(output) = (0..node.outputs().len()).find(|&index| !writer.is_bound(index)) {
            return Err(CodegenError::UnboundOutput { node: id, output });
        }

        self.visits.insert(id, VisitState::Done);
        Ok(())
    }

    fn resolve_inputs(&self, node: &ShaderNode) -> Result<Vec<String>, CodegenError> {
        node.inputs()
            .iter()
            .enumerate()
            .map(|(index, pin)| match self.graph.connection_source(node.id(), index) {
                Some((source, output)) => self
                    .variables
                    .get(&OutputKey::new(source, output))
                    .cloned()
                    .ok_or(CodegenError::MissingVariable { node: source, output }),
                None if pin.default_value.is_empty() => Err(CodegenError::UnresolvedInput {
                    node: node.id(),
                    pin: pin.name.clone(),
                }),
                None => Ok(pin.default_value.clone()),
            })
            .collect()
    }
}

/// Generate the statements for every node reachable from the stage's outputs
pub(crate) fn generate_body(
    graph: &ShaderGraph,
    stage: ShaderStage,
    options: &CodegenOptions,
) -> Result<String, CodegenError> {
    GraphWalker::new(graph, options).run(stage)
}

/// Check that `name` can stand alone as a shader identifier
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

pub(crate) fn common_code() -> String {
    let mut code = String::new();
    code.push_str("// Common uniforms\n");
    code.push_str("cbuffer PerFrameConstants : register(b0) {\n");
    code.push_str("    float4x4 World;\n");
    code.push_str("    float4x4 View;\n");
    code.push_str("    float4x4 Projection;\n");
    code.push_str("    float4x4 WorldViewProjection;\n");
    code.push_str("    float4x4 WorldInverseTranspose;\n");
    code.push_str("    float3 CameraPosition;\n");
    code.push_str("    float Time;\n");
    code.push_str("}\n\n");
    code
}

pub(crate) fn vertex_structures() -> String {
    let mut code = String::new();
    code.push_str("// Vertex shader input/output structures\n");
    code.push_str("struct VertexInput {\n");
    code.push_str("    float3 position : POSITION;\n");
    code.push_str("    float3 normal : NORMAL;\n");
    code.push_str("    float2 texCoord : TEXCOORD0;\n");
    code.push_str("    float4 color : COLOR0;\n");
    code.push_str("    float3 tangent : TANGENT;\n");
    code.push_str("    float3 bitangent : BINORMAL;\n");
    code.push_str("};\n\n");
    code.push_str("struct VertexOutput {\n");
    code.push_str("    float4 position : SV_POSITION;\n");
    code.push_str("    float3 worldPos : POSITION;\n");
    code.push_str("    float3 normal : NORMAL;\n");
    code.push_str("    float2 texCoord : TEXCOORD0;\n");
    code.push_str("    float4 color : COLOR0;\n");
    code.push_str("    float3 tangent : TANGENT;\n");
    code.push_str("    float3 bitangent : BINORMAL;\n");
    code.push_str("};\n\n");
    code
}

pub(crate) fn fragment_structures(custom_fields: &[&str]) -> String {
    let mut code = String::new();
    code.push_str("// Fragment shader output structure\n");
    code.push_str("struct FragmentOutput {\n");
    code.push_str("    float3 color;\n");
    code.push_str("    float3 normal;\n");
    code.push_str("    float3 emission;\n");
    code.push_str("    float metallic;\n");
    code.push_str("    float roughness;\n");
    code.push_str("    float ao;\n");
    for field in custom_fields {
        code.push_str(&format!("    float {};\n", field));
    }
    code.push_str("};\n\n");
    code
}
