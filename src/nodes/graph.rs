//! Shader graph data structures and operations

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use glam::Vec2;
use log::{debug, info, warn};

use super::codegen::{self, CodegenOptions, ShaderStage};
use super::factory::ShaderNodeFactory;
use super::input::InputSemantic;
use super::node::{NodeId, NodeKind, ShaderNode};
use super::output::OutputSemantic;
use crate::constants;
use crate::custom::{CustomNodeManager, CustomShaderNode};
use crate::error::{CodegenError, ShaderGraphError};

/// Directed edge from one node output to one node input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeConnection {
    pub source_node: NodeId,
    pub source_output: usize,
    pub target_node: NodeId,
    pub target_input: usize,
}

impl NodeConnection {
    /// Creates a new connection
    pub fn new(source_node: NodeId, source_output: usize, target_node: NodeId, target_input: usize) -> Self {
        Self {
            source_node,
            source_output,
            target_node,
            target_input,
        }
    }

    /// Check if either endpoint is the given node
    pub fn touches(&self, node: NodeId) -> bool {
        self.source_node == node || self.target_node == node
    }
}

/// A graph of shader nodes and the connections between their pins
///
/// Nodes are kept in insertion order so code generation is deterministic.
/// Connections refer to nodes by id; every id a connection names is present
/// in the node list, and each target input has at most one connection.
#[derive(Debug)]
pub struct ShaderGraph {
    name: String,
    nodes: Vec<ShaderNode>,
    index: HashMap<NodeId, usize>,
    connections: Vec<NodeConnection>,
    /// Creation time carried over from a loaded document
    created: Option<DateTime<Utc>>,
}

impl ShaderGraph {
    /// Creates a new empty shader graph
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            index: HashMap::new(),
            connections: Vec::new(),
            created: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// When the graph was first saved, if it came from a document
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub(crate) fn set_created(&mut self, created: DateTime<Utc>) {
        self.created = Some(created);
    }

    /// Adds a node to the graph and returns its ID
    pub fn add_node(&mut self, node: ShaderNode) -> Result<NodeId, ShaderGraphError> {
        if self.index.contains_key(&node.id()) {
            return Err(ShaderGraphError::DuplicateNode(node.id()));
        }
        Ok(self.push_node(node))
    }

    /// Removes a node and all its connections
    ///
    /// Pins on the surviving side of each removed connection are resynced.
    pub fn remove_node(&mut self, id: NodeId) -> Result<ShaderNode, ShaderGraphError> {
        let slot = *self.index.get(&id).ok_or(ShaderGraphError::NodeNotFound(id))?;

        let mut neighbours = Vec::new();
        self.connections.retain(|connection| {
            if !connection.touches(id) {
                return true;
            }
            let other = if connection.source_node == id {
                connection.target_node
            } else {
                connection.source_node
            };
            if !neighbours.contains(&other) {
                neighbours.push(other);
            }
            false
        });

        let node = self.nodes.remove(slot);
        self.reindex();
        for neighbour in neighbours {
            self.sync_pins(neighbour);
        }
        debug!("Removed node {} ('{}') from graph '{}'", id, node.name(), self.name);
        Ok(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&ShaderNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Mutable access for editor layout (position, size)
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ShaderNode> {
        let slot = *self.index.get(&id)?;
        self.nodes.get_mut(slot)
    }

    pub fn nodes(&self) -> &[ShaderNode] {
        &self.nodes
    }

    pub fn connections(&self) -> &[NodeConnection] {
        &self.connections
    }

    /// Adds a connection from `source`'s output to `target`'s input
    pub fn add_connection(
        &mut self,
        source: NodeId,
        source_output: usize,
        target: NodeId,
        target_input: usize,
    ) -> Result<(), ShaderGraphError> {
        if source == target {
            return Err(ShaderGraphError::SelfConnection(source));
        }
        let source_node = self.node(source).ok_or(ShaderGraphError::NodeNotFound(source))?;
        let target_node = self.node(target).ok_or(ShaderGraphError::NodeNotFound(target))?;
        if source_node.output(source_output).is_none() {
            return Err(ShaderGraphError::OutputOutOfRange {
                node: source,
                index: source_output,
            });
        }
        if target_node.input(target_input).is_none() {
            return Err(ShaderGraphError::InputOutOfRange {
                node: target,
                index: target_input,
            });
        }
        if self.connection_source(target, target_input).is_some() {
            return Err(ShaderGraphError::InputAlreadyConnected {
                node: target,
                index: target_input,
            });
        }

        self.connections
            .push(NodeConnection::new(source, source_output, target, target_input));
        self.sync_pins(source);
        self.sync_pins(target);
        debug!(
            "Connected {}:{} -> {}:{} in graph '{}'",
            source, source_output, target, target_input, self.name
        );
        Ok(())
    }

    /// Removes the connection feeding `target`'s input and returns it
    pub fn remove_connection(&mut self, target: NodeId, target_input: usize) -> Result<NodeConnection, ShaderGraphError> {
        let position = self
            .connections
            .iter()
            .position(|c| c.target_node == target && c.target_input == target_input)
            .ok_or(ShaderGraphError::ConnectionNotFound {
                node: target,
                index: target_input,
            })?;
        let connection = self.connections.remove(position);
        self.sync_pins(connection.source_node);
        self.sync_pins(connection.target_node);
        Ok(connection)
    }

    /// Source node and output index feeding `target`'s input, if connected
    pub fn connection_source(&self, target: NodeId, target_input: usize) -> Option<(NodeId, usize)> {
        self.connections
            .iter()
            .find(|c| c.target_node == target && c.target_input == target_input)
            .map(|c| (c.source_node, c.source_output))
    }

    /// Generate the fragment shader with default formatting
    pub fn generate_fragment_shader_code(&self) -> Result<String, CodegenError> {
        self.generate_fragment_shader_code_with(&CodegenOptions::default())
    }

    /// Generate the fragment shader: constants, structures and `PSMain`
    ///
    /// On error no source is returned; partial output is discarded.
    pub fn generate_fragment_shader_code_with(&self, options: &CodegenOptions) -> Result<String, CodegenError> {
        let body = codegen::generate_body(self, ShaderStage::Fragment, options)?;
        let indent = " ".repeat(options.indent_width);
        let custom_fields = self.custom_output_fields();

        let mut code = codegen::common_code();
        code.push_str(&codegen::vertex_structures());
        code.push_str(&codegen::fragment_structures(&custom_fields));
        code.push_str("float4 PSMain(VertexOutput input) : SV_TARGET {\n");
        code.push_str(&format!("{}FragmentOutput output;\n", indent));
        code.push_str(&format!("{}output.color = float3(0, 0, 0);\n", indent));
        code.push_str(&format!("{}output.normal = input.normal;\n", indent));
        code.push_str(&format!("{}output.emission = float3(0, 0, 0);\n", indent));
        code.push_str(&format!("{}output.metallic = 0.0;\n", indent));
        code.push_str(&format!("{}output.roughness = 0.5;\n", indent));
        code.push_str(&format!("{}output.ao = 1.0;\n", indent));
        for field in &custom_fields {
            code.push_str(&format!("{}output.{} = 0.0;\n", indent, field));
        }
        code.push('\n');
        code.push_str(&body);
        code.push_str(&format!("{}return float4(output.color, 1.0);\n", indent));
        code.push_str("}\n");

        info!("Generated fragment shader for graph '{}' ({} bytes)", self.name, code.len());
        Ok(code)
    }

    /// Generate the vertex shader with default formatting
    pub fn generate_vertex_shader_code(&self) -> Result<String, CodegenError> {
        self.generate_vertex_shader_code_with(&CodegenOptions::default())
    }

    /// Generate the vertex shader: constants, structures and `VSMain`
    ///
    /// Vertex-stage outputs (position offsets) are applied to
    /// `localPosition` before the transforms.
    pub fn generate_vertex_shader_code_with(&self, options: &CodegenOptions) -> Result<String, CodegenError> {
        let body = codegen::generate_body(self, ShaderStage::Vertex, options)?;
        let indent = " ".repeat(options.indent_width);
        let local = constants::shader::LOCAL_POSITION_VAR;

        let mut code = codegen::common_code();
        code.push_str(&codegen::vertex_structures());
        code.push_str("VertexOutput VSMain(VertexInput input) {\n");
        code.push_str(&format!("{}VertexOutput output;\n", indent));
        code.push_str(&format!("{}float3 {} = input.position;\n", indent, local));
        code.push_str(&body);
        code.push_str(&format!(
            "{}output.position = mul(float4({}, 1.0), WorldViewProjection);\n",
            indent, local
        ));
        code.push_str(&format!("{}output.worldPos = mul(float4({}, 1.0), World).xyz;\n", indent, local));
        code.push_str(&format!(
            "{}output.normal = normalize(mul(input.normal, (float3x3)WorldInverseTranspose));\n",
            indent
        ));
        code.push_str(&format!("{}output.texCoord = input.texCoord;\n", indent));
        code.push_str(&format!("{}output.color = input.color;\n", indent));
        code.push_str(&format!("{}output.tangent = input.tangent;\n", indent));
        code.push_str(&format!("{}output.bitangent = input.bitangent;\n", indent));
        code.push_str(&format!("{}return output;\n", indent));
        code.push_str("}\n");

        info!("Generated vertex shader for graph '{}' ({} bytes)", self.name, code.len());
        Ok(code)
    }

    /// Standard PBR material inputs wired straight to their outputs
    pub fn default_pbr() -> Self {
        let mut graph = Self::new("Default PBR");
        let channels = [
            ("Albedo", OutputSemantic::Color),
            ("Metallic", OutputSemantic::Metallic),
            ("Roughness", OutputSemantic::Roughness),
            ("AO", OutputSemantic::AmbientOcclusion),
        ];

        for (row, (name, semantic)) in channels.into_iter().enumerate() {
            let y = 100.0 * (row as f32 + 1.0);
            let input = ShaderNodeFactory::create_input_node(InputSemantic::Custom, name)
                .with_position(Vec2::new(100.0, y));
            let output = ShaderNodeFactory::create_output_node(semantic, "").with_position(Vec2::new(500.0, y));

            let source = graph.push_node(input);
            let target = graph.push_node(output);
            graph.connections.push(NodeConnection::new(source, 0, target, 0));
            graph.sync_pins(source);
            graph.sync_pins(target);
        }
        graph
    }

    /// Rebind custom nodes to the manager's current definitions
    ///
    /// Nodes whose definition changed get fresh pins; connections that no
    /// longer fit the new layout are dropped. Returns the number of rebound
    /// nodes.
    pub fn refresh_custom_nodes(&mut self, manager: &CustomNodeManager) -> usize {
        let mut refreshed = 0;
        for node in &mut self.nodes {
            let replacement = match node.kind() {
                NodeKind::Custom(custom) => match manager.get(custom.definition_name()) {
                    Some(definition) if !Arc::ptr_eq(&definition, custom.definition()) => Some(definition),
                    Some(_) => None,
                    None => {
                        warn!(
                            "Custom node definition '{}' is no longer registered; keeping node {}",
                            custom.definition_name(),
                            node.id()
                        );
                        None
                    }
                },
                _ => None,
            };

            if let Some(definition) = replacement {
                node.rebind(definition.descriptor(), NodeKind::Custom(CustomShaderNode::new(definition)));
                refreshed += 1;
            }
        }

        if refreshed > 0 {
            let nodes = &self.nodes;
            let index = &self.index;
            let before = self.connections.len();
            self.connections.retain(|c| {
                let source_fits = index
                    .get(&c.source_node)
                    .is_some_and(|&slot| c.source_output < nodes[slot].outputs().len());
                let target_fits = index
                    .get(&c.target_node)
                    .is_some_and(|&slot| c.target_input < nodes[slot].inputs().len());
                source_fits && target_fits
            });
            let ids: Vec<NodeId> = self.nodes.iter().map(ShaderNode::id).collect();
            for id in ids {
                self.sync_pins(id);
            }
            info!(
                "Refreshed {} custom node(s) in graph '{}', dropped {} connection(s)",
                refreshed,
                self.name,
                before - self.connections.len()
            );
        }
        refreshed
    }

    /// Field names declared by custom fragment outputs, first occurrence order
    fn custom_output_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for node in &self.nodes {
            if let NodeKind::Output(output) = node.kind() {
                if output.semantic() == OutputSemantic::Custom && !fields.contains(&output.custom_name()) {
                    fields.push(output.custom_name());
                }
            }
        }
        fields
    }

    fn push_node(&mut self, node: ShaderNode) -> NodeId {
        let id = node.id();
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id(), slot))
            .collect();
    }

    /// Recompute a node's pin flags from the connection table
    fn sync_pins(&mut self, id: NodeId) {
        let Some(&slot) = self.index.get(&id) else {
            return;
        };
        let connections = &self.connections;
        let node = &mut self.nodes[slot];

        for index in 0..node.inputs().len() {
            let connected = connections
                .iter()
                .any(|c| c.target_node == id && c.target_input == index);
            if let Some(pin) = node.input_mut(index) {
                pin.set_connected(connected);
            }
        }
        for index in 0..node.outputs().len() {
            let connected = connections
                .iter()
                .any(|c| c.source_node == id && c.source_output == index);
            if let Some(pin) = node.output_mut(index) {
                pin.set_connected(connected);
            }
        }
    }
}

impl Default for ShaderGraph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::math::MathOperation;

    fn add(graph: &mut ShaderGraph, node: ShaderNode) -> NodeId {
        graph.add_node(node).unwrap()
    }

    fn color_output(graph: &mut ShaderGraph) -> NodeId {
        add(graph, ShaderNodeFactory::create_output_node(OutputSemantic::Color, ""))
    }

    #[test]
    fn test_removed_node_can_be_re_added() {
        let mut graph = ShaderGraph::new("move");
        let first = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Add));
        let second = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Max));

        let node = graph.remove_node(first).unwrap();
        assert!(graph.node(first).is_none());
        assert_eq!(graph.node(second).unwrap().name(), "Max");

        assert_eq!(graph.add_node(node), Ok(first));
        let order: Vec<NodeId> = graph.nodes().iter().map(ShaderNode::id).collect();
        assert_eq!(order, vec![second, first]);
    }

    #[test]
    fn test_connection_uniqueness() {
        let mut graph = ShaderGraph::new("unique");
        let a = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Add));
        let b = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Sin));
        let out = color_output(&mut graph);

        graph.add_connection(a, 0, out, 0).unwrap();
        assert_eq!(
            graph.add_connection(b, 0, out, 0),
            Err(ShaderGraphError::InputAlreadyConnected { node: out, index: 0 })
        );
        assert_eq!(graph.connections().len(), 1);
        assert_eq!(graph.connection_source(out, 0), Some((a, 0)));
        assert!(!graph.node(b).unwrap().outputs()[0].is_connected());
    }

    #[test]
    fn test_connection_validation() {
        let mut graph = ShaderGraph::new("validation");
        let a = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Add));
        let out = color_output(&mut graph);

        assert_eq!(graph.add_connection(a, 0, a, 1), Err(ShaderGraphError::SelfConnection(a)));
        assert_eq!(
            graph.add_connection(a, 3, out, 0),
            Err(ShaderGraphError::OutputOutOfRange { node: a, index: 3 })
        );
        assert_eq!(
            graph.add_connection(a, 0, out, 1),
            Err(ShaderGraphError::InputOutOfRange { node: out, index: 1 })
        );
        assert_eq!(graph.add_connection(a, 0, 0, 0), Err(ShaderGraphError::NodeNotFound(0)));
        assert!(graph.connections().is_empty());
        assert_eq!(
            graph.remove_connection(out, 0),
            Err(ShaderGraphError::ConnectionNotFound { node: out, index: 0 })
        );
    }

    #[test]
    fn test_cascade_on_node_removal() {
        let mut graph = ShaderGraph::new("cascade");
        let x = add(&mut graph, ShaderNodeFactory::create_input_node(InputSemantic::Time, ""));
        let hub = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Multiply));
        let other = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Add));
        let out = color_output(&mut graph);
        let metal = add(&mut graph, ShaderNodeFactory::create_output_node(OutputSemantic::Metallic, ""));

        graph.add_connection(x, 0, hub, 0).unwrap();
        graph.add_connection(x, 0, other, 0).unwrap();
        graph.add_connection(hub, 0, out, 0).unwrap();
        graph.add_connection(hub, 0, metal, 0).unwrap();

        let removed = graph.remove_node(hub).unwrap();
        assert_eq!(removed.id(), hub);
        assert_eq!(graph.connections().len(), 1);
        assert!(graph.connections().iter().all(|c| !c.touches(hub)));
        assert!(!graph.node(out).unwrap().inputs()[0].is_connected());
        assert!(!graph.node(metal).unwrap().inputs()[0].is_connected());
        // x still feeds `other` through its fanned-out output
        assert!(graph.node(x).unwrap().outputs()[0].is_connected());
        assert_eq!(graph.remove_node(hub).unwrap_err(), ShaderGraphError::NodeNotFound(hub));
    }

    #[test]
    fn test_output_pin_stays_connected_while_fanned_out() {
        let mut graph = ShaderGraph::new("fanout");
        let time = add(&mut graph, ShaderNodeFactory::create_input_node(InputSemantic::Time, ""));
        let a = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Sin));
        let b = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Cos));
        graph.add_connection(time, 0, a, 0).unwrap();
        graph.add_connection(time, 0, b, 0).unwrap();

        graph.remove_connection(a, 0).unwrap();
        assert!(graph.node(time).unwrap().outputs()[0].is_connected());
        graph.remove_connection(b, 0).unwrap();
        assert!(!graph.node(time).unwrap().outputs()[0].is_connected());
    }

    #[test]
    fn test_generation_is_dependency_first_and_deterministic() {
        let mut graph = ShaderGraph::new("order");
        let out = color_output(&mut graph);
        let normalize = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Normalize));
        let normal = add(&mut graph, ShaderNodeFactory::create_input_node(InputSemantic::Normal, ""));
        graph.add_connection(normal, 0, normalize, 0).unwrap();
        graph.add_connection(normalize, 0, out, 0).unwrap();

        let first = graph.generate_fragment_shader_code().unwrap();
        let second = graph.generate_fragment_shader_code().unwrap();
        assert_eq!(first, second);

        let statement = format!("float3 math_{} = normalize(input.normal);", normalize);
        let assignment = format!("output.color = math_{};", normalize);
        let statement_at = first.find(&statement).unwrap();
        let assignment_at = first.find(&assignment).unwrap();
        assert!(statement_at < assignment_at);
        assert!(first.contains("float4 PSMain(VertexOutput input) : SV_TARGET {"));
        assert!(first.trim_end().ends_with('}'));
    }

    #[test]
    fn test_diamond_dependency_emits_once() {
        let mut graph = ShaderGraph::new("diamond");
        let time = add(&mut graph, ShaderNodeFactory::create_input_node(InputSemantic::Time, ""));
        let shared = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Sin));
        let left = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Abs));
        let right = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Cos));
        let join = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Add));
        let out = add(&mut graph, ShaderNodeFactory::create_output_node(OutputSemantic::Roughness, ""));

        graph.add_connection(time, 0, shared, 0).unwrap();
        graph.add_connection(shared, 0, left, 0).unwrap();
        graph.add_connection(shared, 0, right, 0).unwrap();
        graph.add_connection(left, 0, join, 0).unwrap();
        graph.add_connection(right, 0, join, 1).unwrap();
        graph.add_connection(join, 0, out, 0).unwrap();

        let code = graph.generate_fragment_shader_code().unwrap();
        let declaration = format!("float math_{} = sin(Time);", shared);
        assert_eq!(code.matches(&declaration).count(), 1);
        assert!(code.contains(&format!("float math_{} = math_{} + math_{};", join, left, right)));
    }

    #[test]
    fn test_default_value_fallback() {
        let mut graph = ShaderGraph::new("defaults");
        let divide = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Divide));
        let out = add(&mut graph, ShaderNodeFactory::create_output_node(OutputSemantic::Metallic, ""));
        graph.add_connection(divide, 0, out, 0).unwrap();

        let code = graph.generate_fragment_shader_code().unwrap();
        assert!(code.contains(&format!("float math_{} = 0.0 / 1.0;", divide)));
        assert!(code.contains(&format!("output.metallic = math_{};", divide)));
    }

    #[test]
    fn test_unreachable_nodes_are_not_emitted() {
        let mut graph = ShaderGraph::new("dead");
        let dead = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Tan));
        color_output(&mut graph);
        let code = graph.generate_fragment_shader_code().unwrap();
        assert!(!code.contains(&format!("math_{}", dead)));
        assert!(code.contains("output.color = float3(0,0,0);"));
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut graph = ShaderGraph::new("cycle");
        let a = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Add));
        let b = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Multiply));
        let out = color_output(&mut graph);
        graph.add_connection(a, 0, b, 0).unwrap();
        graph.add_connection(b, 0, a, 0).unwrap();
        graph.add_connection(b, 0, out, 0).unwrap();

        assert!(matches!(
            graph.generate_fragment_shader_code(),
            Err(CodegenError::Cycle(_))
        ));
    }

    #[test]
    fn test_vertex_stage_uses_position_offsets() {
        let mut graph = ShaderGraph::new("wave");
        let normal = add(&mut graph, ShaderNodeFactory::create_input_node(InputSemantic::Normal, ""));
        let offset = add(&mut graph, ShaderNodeFactory::create_output_node(OutputSemantic::PositionOffset, ""));
        graph.add_connection(normal, 0, offset, 0).unwrap();
        let color = color_output(&mut graph);

        let vertex = graph.generate_vertex_shader_code().unwrap();
        assert!(vertex.contains("    localPosition += input.normal;\n"));
        assert!(vertex.contains("VertexOutput VSMain(VertexInput input) {"));
        assert!(!vertex.contains("output.color = float3(0,0,0);"));

        let fragment = graph.generate_fragment_shader_code().unwrap();
        assert!(!fragment.contains("localPosition"));
        assert!(graph.node(color).is_some());
    }

    #[test]
    fn test_custom_output_declares_field() {
        let mut graph = ShaderGraph::new("custom field");
        add(&mut graph, ShaderNodeFactory::create_output_node(OutputSemantic::Custom, "rimLight"));
        let code = graph
            .generate_fragment_shader_code_with(&CodegenOptions { indent_width: 2 })
            .unwrap();
        assert!(code.contains("    float rimLight;\n"));
        assert!(code.contains("  output.rimLight = 0.0;\n\n"));
    }

    #[test]
    fn test_unusable_custom_names_fail_generation() {
        let mut graph = ShaderGraph::new("names");
        let unnamed = add(&mut graph, ShaderNodeFactory::create_input_node(InputSemantic::Custom, ""));
        let sum = add(&mut graph, ShaderNodeFactory::create_math_node(MathOperation::Add));
        let out = color_output(&mut graph);
        graph.add_connection(unnamed, 0, sum, 0).unwrap();
        graph.add_connection(sum, 0, out, 0).unwrap();
        assert_eq!(
            graph.generate_fragment_shader_code(),
            Err(CodegenError::InvalidName {
                node: unnamed,
                name: String::new()
            })
        );

        let mut graph = ShaderGraph::new("shadowed field");
        let shadow = add(&mut graph, ShaderNodeFactory::create_output_node(OutputSemantic::Custom, "roughness"));
        assert!(matches!(
            graph.generate_fragment_shader_code(),
            Err(CodegenError::InvalidName { node, .. }) if node == shadow
        ));
    }

    #[test]
    fn test_default_pbr_graph() {
        let graph = ShaderGraph::default_pbr();
        assert_eq!(graph.name(), "Default PBR");
        assert_eq!(graph.nodes().len(), 8);
        assert_eq!(graph.connections().len(), 4);
        assert!(graph.nodes().iter().all(|node| node.inputs().iter().all(|pin| pin.is_connected())));

        let code = graph.generate_fragment_shader_code().unwrap();
        assert!(code.contains("    output.color = Albedo;\n"));
        assert!(code.contains("    output.ao = AO;\n"));
    }
}
