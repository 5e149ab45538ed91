//! Elemental core library
//!
//! Render pass scheduling, node-based shader graph compilation and the
//! custom node SDK that extends the shader graph with new node kinds.

pub mod config;
pub mod constants;
pub mod custom;
pub mod error;
pub mod nodes;
pub mod render_graph;

// Re-export commonly used types
pub use config::EngineConfig;
pub use custom::{CustomNodeDefinition, CustomNodeManager, CustomShaderNode, JsonNodeDefinition, NativeNodeDefinition};
pub use error::{
    CodegenError, ConfigError, DefinitionError, GraphFileError, NodeError, RegistryError, RenderGraphError,
    ShaderGraphError,
};
pub use nodes::{NodeConnection, NodeDescriptor, NodeId, PinSpec, PinType, ShaderGraph, ShaderNode, ShaderNodeFactory};
pub use render_graph::{RenderGraph, RenderPass};
