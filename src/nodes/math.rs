//! Math operation nodes

use serde::{Deserialize, Serialize};

use super::codegen::{CodeWriter, GenerateCode};
use super::factory::NodeDescriptor;
use super::pin::{PinSpec, PinType};
use crate::error::CodegenError;

/// Operations supported by [`MathNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Dot,
    Cross,
    Normalize,
    Length,
    Power,
    Min,
    Max,
    Abs,
    Sin,
    Cos,
    Tan,
}

impl MathOperation {
    pub const ALL: [MathOperation; 15] = [
        MathOperation::Add,
        MathOperation::Subtract,
        MathOperation::Multiply,
        MathOperation::Divide,
        MathOperation::Dot,
        MathOperation::Cross,
        MathOperation::Normalize,
        MathOperation::Length,
        MathOperation::Power,
        MathOperation::Min,
        MathOperation::Max,
        MathOperation::Abs,
        MathOperation::Sin,
        MathOperation::Cos,
        MathOperation::Tan,
    ];

    /// Get a human-readable name for this operation
    pub fn display_name(&self) -> &'static str {
        match self {
            MathOperation::Add => "Add",
            MathOperation::Subtract => "Subtract",
            MathOperation::Multiply => "Multiply",
            MathOperation::Divide => "Divide",
            MathOperation::Dot => "Dot Product",
            MathOperation::Cross => "Cross Product",
            MathOperation::Normalize => "Normalize",
            MathOperation::Length => "Length",
            MathOperation::Power => "Power",
            MathOperation::Min => "Min",
            MathOperation::Max => "Max",
            MathOperation::Abs => "Absolute",
            MathOperation::Sin => "Sine",
            MathOperation::Cos => "Cosine",
            MathOperation::Tan => "Tangent",
        }
    }

    /// Type of the single result this operation produces
    pub fn result_type(&self) -> PinType {
        match self {
            MathOperation::Cross | MathOperation::Normalize => PinType::Vec3,
            _ => PinType::Float,
        }
    }

    fn inputs(&self) -> Vec<PinSpec> {
        const ZERO3: &str = "float3(0,0,0)";
        match self {
            MathOperation::Add
            | MathOperation::Subtract
            | MathOperation::Multiply
            | MathOperation::Min
            | MathOperation::Max => vec![
                PinSpec::input("A", PinType::Float, "0.0"),
                PinSpec::input("B", PinType::Float, "0.0"),
            ],
            MathOperation::Divide => vec![
                PinSpec::input("A", PinType::Float, "0.0"),
                PinSpec::input("B", PinType::Float, "1.0"),
            ],
            MathOperation::Dot | MathOperation::Cross => vec![
                PinSpec::input("A", PinType::Vec3, ZERO3),
                PinSpec::input("B", PinType::Vec3, ZERO3),
            ],
            MathOperation::Normalize | MathOperation::Length => {
                vec![PinSpec::input("Vector", PinType::Vec3, ZERO3)]
            }
            MathOperation::Power => vec![
                PinSpec::input("Base", PinType::Float, "0.0"),
                PinSpec::input("Exponent", PinType::Float, "1.0"),
            ],
            MathOperation::Abs | MathOperation::Sin | MathOperation::Cos | MathOperation::Tan => {
                vec![PinSpec::input("Value", PinType::Float, "0.0")]
            }
        }
    }

    /// Right-hand side of the generated assignment
    fn expression(&self, inputs: &[String]) -> String {
        let arg = |index: usize| inputs.get(index).map(String::as_str).unwrap_or_default();
        match self {
            MathOperation::Add => format!("{} + {}", arg(0), arg(1)),
            MathOperation::Subtract => format!("{} - {}", arg(0), arg(1)),
            MathOperation::Multiply => format!("{} * {}", arg(0), arg(1)),
            MathOperation::Divide => format!("{} / {}", arg(0), arg(1)),
            MathOperation::Dot => format!("dot({}, {})", arg(0), arg(1)),
            MathOperation::Cross => format!("cross({}, {})", arg(0), arg(1)),
            MathOperation::Normalize => format!("normalize({})", arg(0)),
            MathOperation::Length => format!("length({})", arg(0)),
            MathOperation::Power => format!("pow({}, {})", arg(0), arg(1)),
            MathOperation::Min => format!("min({}, {})", arg(0), arg(1)),
            MathOperation::Max => format!("max({}, {})", arg(0), arg(1)),
            MathOperation::Abs => format!("abs({})", arg(0)),
            MathOperation::Sin => format!("sin({})", arg(0)),
            MathOperation::Cos => format!("cos({})", arg(0)),
            MathOperation::Tan => format!("tan({})", arg(0)),
        }
    }
}

/// Node applying one [`MathOperation`] to its inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathNode {
    operation: MathOperation,
}

impl MathNode {
    pub fn new(operation: MathOperation) -> Self {
        Self { operation }
    }

    pub fn operation(&self) -> MathOperation {
        self.operation
    }

    pub fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::new(self.operation.display_name(), "Math")
            .with_inputs(self.operation.inputs())
            .with_outputs(vec![PinSpec::output("Result", self.operation.result_type())])
    }
}

impl GenerateCode for MathNode {
    fn generate_code(&self, inputs: &[String], writer: &mut CodeWriter<'_>) -> Result<(), CodegenError> {
        let variable = writer.local_name("math");
        writer.statement(format!(
            "{} {} = {};",
            self.operation.result_type().shader_type(),
            variable,
            self.operation.expression(inputs)
        ));
        writer.bind_output(0, variable);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::codegen::OutputKey;
    use std::collections::HashMap;

    fn emit(operation: MathOperation, inputs: &[&str]) -> String {
        let inputs: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
        let mut code = String::new();
        let mut variables = HashMap::new();
        let mut writer = CodeWriter::new(5, "", &mut code, &mut variables);
        MathNode::new(operation).generate_code(&inputs, &mut writer).unwrap();
        assert_eq!(variables.get(&OutputKey::new(5, 0)).map(String::as_str), Some("math_5"));
        code
    }

    #[test]
    fn test_binary_operators() {
        assert_eq!(emit(MathOperation::Add, &["a", "b"]), "float math_5 = a + b;\n");
        assert_eq!(emit(MathOperation::Divide, &["a", "b"]), "float math_5 = a / b;\n");
        assert_eq!(emit(MathOperation::Power, &["a", "2.0"]), "float math_5 = pow(a, 2.0);\n");
    }

    #[test]
    fn test_vector_intrinsics() {
        assert_eq!(emit(MathOperation::Cross, &["n", "t"]), "float3 math_5 = cross(n, t);\n");
        assert_eq!(emit(MathOperation::Normalize, &["n"]), "float3 math_5 = normalize(n);\n");
        assert_eq!(emit(MathOperation::Dot, &["n", "l"]), "float math_5 = dot(n, l);\n");
    }

    #[test]
    fn test_descriptor_pins() {
        for operation in MathOperation::ALL {
            let descriptor = MathNode::new(operation).descriptor();
            assert_eq!(descriptor.outputs.len(), 1);
            assert!(!descriptor.inputs.is_empty());
            assert!(descriptor.inputs.iter().all(|pin| !pin.default_value.is_empty()));
        }
        let divide = MathNode::new(MathOperation::Divide).descriptor();
        assert_eq!(divide.inputs[1].default_value, "1.0");
        assert_eq!(divide.name, "Divide");
    }
}
