//! Node system - shader node data structures and code generation

// Core node system modules
pub mod codegen;
pub mod factory;
pub mod file;
pub mod graph;
pub mod node;
pub mod pin;

// Built-in node families
pub mod input;
pub mod math;
pub mod output;
pub mod texture;
pub mod vector;

// Re-export core types
pub use codegen::{CodeWriter, CodegenOptions, GenerateCode, OutputKey, ShaderStage};
pub use factory::{NodeDescriptor, ShaderNodeFactory};
pub use graph::{NodeConnection, ShaderGraph};
pub use node::{NodeId, NodeKind, ShaderNode};
pub use pin::{Pin, PinSpec, PinType};

// Re-export node families
pub use input::{InputNode, InputSemantic};
pub use math::{MathNode, MathOperation};
pub use output::{OutputNode, OutputSemantic};
pub use texture::TextureSampleNode;
pub use vector::VectorNode;
