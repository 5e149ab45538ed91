//! Error types for the shader graph, custom node SDK and render graph

use std::path::PathBuf;
use thiserror::Error;

use crate::nodes::NodeId;

/// Structural errors raised while editing a [`ShaderGraph`](crate::nodes::ShaderGraph)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderGraphError {
    #[error("node {0} already exists in the graph")]
    DuplicateNode(NodeId),
    #[error("node {0} does not exist in the graph")]
    NodeNotFound(NodeId),
    #[error("node {node} has no input pin {index}")]
    InputOutOfRange { node: NodeId, index: usize },
    #[error("node {node} has no output pin {index}")]
    OutputOutOfRange { node: NodeId, index: usize },
    #[error("input {index} of node {node} is already connected")]
    InputAlreadyConnected { node: NodeId, index: usize },
    #[error("input {index} of node {node} has no connection")]
    ConnectionNotFound { node: NodeId, index: usize },
    #[error("node {0} cannot be connected to itself")]
    SelfConnection(NodeId),
}

/// Failures while lowering a shader graph to source text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("cycle detected at node {0}")]
    Cycle(NodeId),
    #[error("node {0} referenced by a connection does not exist")]
    NodeNotFound(NodeId),
    #[error("input '{pin}' of node {node} is unconnected and has no default value")]
    UnresolvedInput { node: NodeId, pin: String },
    #[error("output {output} of node {node} has no generated variable")]
    MissingVariable { node: NodeId, output: usize },
    #[error("node {node} did not bind output {output}")]
    UnboundOutput { node: NodeId, output: usize },
    #[error("node {node} uses '{name}', which is not a usable shader identifier")]
    InvalidName { node: NodeId, name: String },
}

/// Invalid parameters passed to a node constructor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("vector nodes take 2 to 4 components, got {0}")]
    InvalidVectorArity(u32),
}

/// Failures while parsing a custom node definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to read definition file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse definition: {0}")]
    Json(#[from] serde_json::Error),
    #[error("definition name must not be empty")]
    EmptyName,
    #[error("pin name '{0}' is declared more than once")]
    DuplicatePin(String),
    #[error("code template references unknown placeholder '{{{{{0}}}}}'")]
    UnknownPlaceholder(String),
    #[error("definition declares {0} outputs, more than a node can expose")]
    TooManyOutputs(usize),
}

/// Failures raised by the [`CustomNodeManager`](crate::custom::CustomNodeManager)
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("custom node '{0}' is already registered")]
    DuplicateDefinition(String),
    #[error("custom node '{0}' is not registered")]
    DefinitionNotFound(String),
    #[error("directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Failures while saving or loading a shader graph document
#[derive(Debug, Error)]
pub enum GraphFileError {
    #[error("failed to access graph file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialize graph document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported graph document version '{0}'")]
    UnsupportedVersion(String),
    #[error("graph references unregistered custom node '{0}'")]
    UnknownCustomNode(String),
    #[error("connection references unknown node id {0}")]
    UnknownNodeId(u32),
    #[error("node id {0} appears more than once in the document")]
    DuplicateNodeId(u32),
    #[error(transparent)]
    Graph(#[from] ShaderGraphError),
    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Errors raised by the [`RenderGraph`](crate::render_graph::RenderGraph)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderGraphError {
    #[error("a pass named '{0}' already exists")]
    DuplicatePass(String),
    #[error("no pass named '{0}'")]
    PassNotFound(String),
    #[error("dependency cycle detected at pass '{0}'")]
    Cycle(String),
}

/// Failures while reading or writing an [`EngineConfig`](crate::config::EngineConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialize config: {0}")]
    Json(#[from] serde_json::Error),
}
