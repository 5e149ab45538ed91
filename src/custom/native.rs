//! Natively defined custom nodes

use std::fmt;

use super::CustomNodeDefinition;
use crate::error::CodegenError;
use crate::nodes::{CodeWriter, NodeDescriptor, PinSpec};

type Generator = dyn Fn(&[String], &mut CodeWriter<'_>) -> Result<(), CodegenError> + Send + Sync;

/// Custom node whose code generation is a Rust closure fixed at registration
pub struct NativeNodeDefinition {
    descriptor: NodeDescriptor,
    generator: Box<Generator>,
}

impl NativeNodeDefinition {
    pub fn new<F>(name: &str, category: &str, generator: F) -> Self
    where
        F: Fn(&[String], &mut CodeWriter<'_>) -> Result<(), CodegenError> + Send + Sync + 'static,
    {
        Self {
            descriptor: NodeDescriptor::new(name, category),
            generator: Box::new(generator),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.descriptor.description = description.to_string();
        self
    }

    pub fn with_input(mut self, input: PinSpec) -> Self {
        self.descriptor.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: PinSpec) -> Self {
        self.descriptor.outputs.push(output);
        self
    }
}

impl CustomNodeDefinition for NativeNodeDefinition {
    fn descriptor(&self) -> NodeDescriptor {
        self.descriptor.clone()
    }

    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        (self.generator)(inputs, writer)
    }
}

impl fmt::Debug for NativeNodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeNodeDefinition")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
