//! Custom node SDK
//!
//! Extends the built-in node families with externally supplied node kinds.
//! A definition is registered once with a [`CustomNodeManager`] and can then
//! be instantiated by name as many times as needed.

pub mod json;
pub mod manager;
pub mod native;

use std::fmt;
use std::sync::Arc;

use crate::error::CodegenError;
use crate::nodes::{CodeWriter, GenerateCode, NodeDescriptor};

pub use json::JsonNodeDefinition;
pub use manager::CustomNodeManager;
pub use native::NativeNodeDefinition;

/// A node kind supplied from outside the built-in families
///
/// `descriptor().name` is the registry key and must be unique within a
/// manager. `generate_code` receives one resolved expression per input pin
/// and must bind every output through the writer.
pub trait CustomNodeDefinition: Send + Sync {
    fn descriptor(&self) -> NodeDescriptor;

    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError>;
}

/// Adapter placing a registered definition inside a shader graph
#[derive(Clone)]
pub struct CustomShaderNode {
    definition: Arc<dyn CustomNodeDefinition>,
    definition_name: String,
}

impl CustomShaderNode {
    pub fn new(definition: Arc<dyn CustomNodeDefinition>) -> Self {
        let definition_name = definition.descriptor().name;
        Self {
            definition,
            definition_name,
        }
    }

    /// Registry key of the wrapped definition
    pub fn definition_name(&self) -> &str {
        &self.definition_name
    }

    pub fn definition(&self) -> &Arc<dyn CustomNodeDefinition> {
        &self.definition
    }
}

impl GenerateCode for CustomShaderNode {
    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        self.definition.generate_code(inputs, writer)
    }
}

impl fmt::Debug for CustomShaderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomShaderNode")
            .field("definition", &self.definition_name)
            .finish()
    }
}
