//! Shader graph documents: saving and loading graphs as JSON
//!
//! Node ids are renumbered on load; the connection topology is preserved
//! through the ids stored in the document.

use std::collections::HashMap;
use std::path::Path;
use std::sync::PoisonError;

use chrono::{DateTime, Utc};
use glam::Vec2;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::factory::ShaderNodeFactory;
use super::graph::ShaderGraph;
use super::input::InputSemantic;
use super::math::MathOperation;
use super::node::{NodeId, NodeKind, ShaderNode};
use super::output::OutputSemantic;
use crate::constants;
use crate::custom::CustomNodeManager;
use crate::error::GraphFileError;

/// Save file data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphDocument {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    metadata: Option<DocumentMetadata>,
    name: String,
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    connections: Vec<ConnectionRecord>,
}

fn default_version() -> String {
    constants::file::FORMAT_VERSION.to_string()
}

/// Metadata for save files
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentMetadata {
    created: DateTime<Utc>,  // RFC 3339 timestamp
    modified: DateTime<Utc>, // RFC 3339 timestamp
    generator: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PositionRecord {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SizeRecord {
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    id: NodeId,
    name: String,
    category: String,
    position: PositionRecord,
    size: SizeRecord,
    #[serde(flatten)]
    kind: KindRecord,
}

/// Type-specific node parameters, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
enum KindRecord {
    MathNode {
        operation: MathOperation,
    },
    TextureSampleNode {
        #[serde(default = "default_texture_name")]
        texture_name: String,
    },
    VectorNode {
        components: u32,
    },
    InputNode {
        input_type: InputSemantic,
        #[serde(default)]
        custom_name: String,
    },
    OutputNode {
        output_type: OutputSemantic,
        #[serde(default)]
        custom_name: String,
    },
    CustomNode {
        definition: String,
    },
}

fn default_texture_name() -> String {
    constants::node::DEFAULT_TEXTURE_NAME.to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionRecord {
    source_node_id: NodeId,
    source_output_index: usize,
    target_node_id: NodeId,
    target_input_index: usize,
}

impl KindRecord {
    fn from_kind(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Math(node) => KindRecord::MathNode {
                operation: node.operation(),
            },
            NodeKind::TextureSample(node) => KindRecord::TextureSampleNode {
                texture_name: node.texture_name().to_string(),
            },
            NodeKind::Vector(node) => KindRecord::VectorNode {
                components: node.components(),
            },
            NodeKind::Input(node) => KindRecord::InputNode {
                input_type: node.semantic(),
                custom_name: node.custom_name().to_string(),
            },
            NodeKind::Output(node) => KindRecord::OutputNode {
                output_type: node.semantic(),
                custom_name: node.custom_name().to_string(),
            },
            NodeKind::Custom(node) => KindRecord::CustomNode {
                definition: node.definition_name().to_string(),
            },
        }
    }

    fn instantiate(&self, manager: &CustomNodeManager) -> Result<ShaderNode, GraphFileError> {
        let node = match self {
            KindRecord::MathNode { operation } => ShaderNodeFactory::create_math_node(*operation),
            KindRecord::TextureSampleNode { texture_name } => {
                ShaderNodeFactory::create_named_texture_sample_node(texture_name)
            }
            KindRecord::VectorNode { components } => ShaderNodeFactory::create_vector_node(*components)?,
            KindRecord::InputNode { input_type, custom_name } => {
                ShaderNodeFactory::create_input_node(*input_type, custom_name)
            }
            KindRecord::OutputNode { output_type, custom_name } => {
                ShaderNodeFactory::create_output_node(*output_type, custom_name)
            }
            KindRecord::CustomNode { definition } => manager
                .create_node(definition)
                .map_err(|_| GraphFileError::UnknownCustomNode(definition.clone()))?,
        };
        Ok(node)
    }
}

impl ShaderGraph {
    /// Serialize the graph into a pretty-printed JSON document
    pub fn to_json_string(&self) -> Result<String, GraphFileError> {
        let now = Utc::now();
        let document = GraphDocument {
            version: constants::file::FORMAT_VERSION.to_string(),
            metadata: Some(DocumentMetadata {
                created: self.created().unwrap_or(now),
                modified: now,
                generator: constants::file::GENERATOR.to_string(),
            }),
            name: self.name().to_string(),
            nodes: self
                .nodes()
                .iter()
                .map(|node| NodeRecord {
                    id: node.id(),
                    name: node.name().to_string(),
                    category: node.category().to_string(),
                    position: PositionRecord {
                        x: node.position().x,
                        y: node.position().y,
                    },
                    size: SizeRecord {
                        width: node.size().x,
                        height: node.size().y,
                    },
                    kind: KindRecord::from_kind(node.kind()),
                })
                .collect(),
            connections: self
                .connections()
                .iter()
                .map(|c| ConnectionRecord {
                    source_node_id: c.source_node,
                    source_output_index: c.source_output,
                    target_node_id: c.target_node,
                    target_input_index: c.target_input,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Rebuild a graph from a JSON document, resolving custom nodes in `manager`
    ///
    /// Any unknown node kind, dangling id or rejected connection fails the
    /// whole load.
    pub fn from_json_str(json: &str, manager: &CustomNodeManager) -> Result<ShaderGraph, GraphFileError> {
        let document: GraphDocument = serde_json::from_str(json)?;
        if document.version != constants::file::FORMAT_VERSION {
            return Err(GraphFileError::UnsupportedVersion(document.version));
        }

        let mut graph = ShaderGraph::new(&document.name);
        if let Some(metadata) = &document.metadata {
            graph.set_created(metadata.created);
        }
        let mut ids: HashMap<NodeId, NodeId> = HashMap::new();
        for record in &document.nodes {
            let mut node = record
                .kind
                .instantiate(manager)?
                .with_position(Vec2::new(record.position.x, record.position.y));
            node.set_size(Vec2::new(record.size.width, record.size.height));
            let id = graph.add_node(node)?;
            if ids.insert(record.id, id).is_some() {
                return Err(GraphFileError::DuplicateNodeId(record.id));
            }
            debug!("Loaded node {} as {}", record.id, id);
        }

        for record in &document.connections {
            let source = *ids
                .get(&record.source_node_id)
                .ok_or(GraphFileError::UnknownNodeId(record.source_node_id))?;
            let target = *ids
                .get(&record.target_node_id)
                .ok_or(GraphFileError::UnknownNodeId(record.target_node_id))?;
            graph.add_connection(source, record.source_output_index, target, record.target_input_index)?;
        }
        Ok(graph)
    }

    /// Save the graph to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), GraphFileError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json)?;
        info!("Saved shader graph '{}' to {}", self.name(), path.display());
        Ok(())
    }

    /// Load a graph from a file using the process-wide custom node registry
    pub fn load_from_file(path: &Path) -> Result<ShaderGraph, GraphFileError> {
        let manager = CustomNodeManager::global()
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Self::load_from_file_with(path, &manager)
    }

    /// Load a graph from a file, resolving custom nodes in `manager`
    pub fn load_from_file_with(path: &Path, manager: &CustomNodeManager) -> Result<ShaderGraph, GraphFileError> {
        let json = std::fs::read_to_string(path)?;
        let graph = Self::from_json_str(&json, manager)?;
        info!(
            "Loaded shader graph '{}' from {} ({} nodes, {} connections)",
            graph.name(),
            path.display(),
            graph.nodes().len(),
            graph.connections().len()
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShaderGraphError;

    fn sample_graph() -> ShaderGraph {
        let mut graph = ShaderGraph::new("Round Trip");
        let uv = graph
            .add_node(ShaderNodeFactory::create_input_node(InputSemantic::Uv, ""))
            .unwrap();
        let sample = graph
            .add_node(
                ShaderNodeFactory::create_named_texture_sample_node("Albedo").with_position(Vec2::new(40.0, 80.0)),
            )
            .unwrap();
        let vector = graph
            .add_node(ShaderNodeFactory::create_vector_node(3).unwrap())
            .unwrap();
        let scale = graph
            .add_node(ShaderNodeFactory::create_math_node(MathOperation::Multiply))
            .unwrap();
        let color = graph
            .add_node(ShaderNodeFactory::create_output_node(OutputSemantic::Color, ""))
            .unwrap();
        let rim = graph
            .add_node(ShaderNodeFactory::create_output_node(OutputSemantic::Custom, "rim"))
            .unwrap();
        graph.add_connection(uv, 0, sample, 1).unwrap();
        graph.add_connection(sample, 2, vector, 0).unwrap();
        graph.add_connection(sample, 5, scale, 0).unwrap();
        graph.add_connection(vector, 0, color, 0).unwrap();
        graph.add_connection(scale, 0, rim, 0).unwrap();
        graph
    }

    #[test]
    fn test_round_trip_through_file() {
        let graph = sample_graph();
        let dir = std::env::temp_dir().join(format!("elemental-graph-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("graph.json");

        graph.save_to_file(&path).unwrap();
        let loaded = ShaderGraph::load_from_file_with(&path, &CustomNodeManager::new()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded.name(), graph.name());
        assert_eq!(loaded.nodes().len(), graph.nodes().len());
        assert_eq!(loaded.connections().len(), graph.connections().len());
        for (original, copy) in graph.nodes().iter().zip(loaded.nodes()) {
            assert_eq!(original.name(), copy.name());
            assert_eq!(original.position(), copy.position());
            assert_eq!(original.size(), copy.size());
            assert_eq!(
                serde_json::to_value(KindRecord::from_kind(original.kind())).unwrap(),
                serde_json::to_value(KindRecord::from_kind(copy.kind())).unwrap()
            );
        }
        // Same topology means the same generated code modulo node ids
        let original_code = graph.generate_fragment_shader_code().unwrap();
        let loaded_code = loaded.generate_fragment_shader_code().unwrap();
        assert_eq!(original_code.lines().count(), loaded_code.lines().count());
    }

    #[test]
    fn test_document_layout() {
        let json = sample_graph().to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["nodes"][1]["type"], "TextureSampleNode");
        assert_eq!(value["nodes"][1]["textureName"], "Albedo");
        assert_eq!(value["nodes"][1]["position"]["x"], 40.0);
        assert_eq!(value["nodes"][2]["components"], 3);
        assert_eq!(value["nodes"][5]["customName"], "rim");
        assert!(value["connections"][0]["sourceOutputIndex"].is_number());
        assert!(value["metadata"]["created"].is_string());
    }

    #[test]
    fn test_creation_time_survives_resave() {
        let json = sample_graph().to_json_string().unwrap();
        let first: serde_json::Value = serde_json::from_str(&json).unwrap();

        let loaded = ShaderGraph::from_json_str(&json, &CustomNodeManager::new()).unwrap();
        let created = first["metadata"]["created"].as_str().unwrap();
        assert_eq!(loaded.created(), Some(created.parse::<DateTime<Utc>>().unwrap()));

        let resaved: serde_json::Value = serde_json::from_str(&loaded.to_json_string().unwrap()).unwrap();
        assert_eq!(resaved["metadata"]["created"], first["metadata"]["created"]);
        assert!(ShaderGraph::new("fresh").created().is_none());
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let dangling = r#"{
            "name": "broken",
            "nodes": [
                {"id": 7, "name": "Time", "category": "Input", "type": "InputNode",
                 "inputType": "Time", "position": {"x": 0, "y": 0}, "size": {"width": 200, "height": 150}}
            ],
            "connections": [
                {"sourceNodeId": 7, "sourceOutputIndex": 0, "targetNodeId": 9, "targetInputIndex": 0}
            ]
        }"#;
        let manager = CustomNodeManager::new();
        assert!(matches!(
            ShaderGraph::from_json_str(dangling, &manager),
            Err(GraphFileError::UnknownNodeId(9))
        ));

        let custom = r#"{
            "name": "custom",
            "nodes": [
                {"id": 1, "name": "Wave", "category": "Custom", "type": "CustomNode",
                 "definition": "Wave", "position": {"x": 0, "y": 0}, "size": {"width": 200, "height": 150}}
            ]
        }"#;
        assert!(matches!(
            ShaderGraph::from_json_str(custom, &manager),
            Err(GraphFileError::UnknownCustomNode(name)) if name == "Wave"
        ));
    }

    #[test]
    fn test_rejected_connection_fails_load() {
        let mut json: serde_json::Value = serde_json::from_str(&sample_graph().to_json_string().unwrap()).unwrap();
        let first = json["connections"][0].clone();
        json["connections"].as_array_mut().unwrap().push(first);
        let result = ShaderGraph::from_json_str(&json.to_string(), &CustomNodeManager::new());
        assert!(matches!(
            result,
            Err(GraphFileError::Graph(ShaderGraphError::InputAlreadyConnected { .. }))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let json = r#"{"version": "9.0", "name": "future", "nodes": []}"#;
        assert!(matches!(
            ShaderGraph::from_json_str(json, &CustomNodeManager::new()),
            Err(GraphFileError::UnsupportedVersion(version)) if version == "9.0"
        ));
    }
}
