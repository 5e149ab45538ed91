//! Pin types and functionality for node connections

use serde::{Deserialize, Serialize};

/// Value type carried by a pin
///
/// The serialized names are the type strings accepted in custom node
/// definition files. Any other string is rejected by the deserializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinType {
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "vec2")]
    Vec2,
    #[serde(rename = "vec3")]
    Vec3,
    #[serde(rename = "vec4")]
    Vec4,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "sampler2D")]
    Sampler2D,
    #[serde(rename = "matrix")]
    Matrix,
}

impl PinType {
    /// Shading-language type name used when declaring a variable of this type
    pub fn shader_type(&self) -> &'static str {
        match self {
            PinType::Float => "float",
            PinType::Vec2 => "float2",
            PinType::Vec3 => "float3",
            PinType::Vec4 => "float4",
            PinType::Int => "int",
            PinType::Bool => "bool",
            PinType::Sampler2D => "Texture2D",
            PinType::Matrix => "float4x4",
        }
    }

    /// Vector type with the given component count (scalars for anything else)
    pub fn vector(components: u32) -> Self {
        match components {
            2 => PinType::Vec2,
            3 => PinType::Vec3,
            4 => PinType::Vec4,
            _ => PinType::Float,
        }
    }
}

/// Represents a typed connection point on a shader node
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub name: String,
    pub pin_type: PinType,
    /// Source-language literal used when an input pin has no incoming connection
    pub default_value: String,
    is_connected: bool,
}

impl Pin {
    /// Creates a new disconnected pin
    pub fn new(name: impl Into<String>, pin_type: PinType, default_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pin_type,
            default_value: default_value.into(),
            is_connected: false,
        }
    }

    /// Whether a connection in the owning graph currently references this pin
    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Only the owning graph's connection table may change this flag.
    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.is_connected = connected;
    }
}

/// Pin declaration used by node definitions before a node is instantiated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub pin_type: PinType,
    #[serde(default)]
    pub default_value: String,
}

impl PinSpec {
    /// Create an input pin declaration with a default literal
    pub fn input(name: &str, pin_type: PinType, default_value: &str) -> Self {
        Self {
            name: name.to_string(),
            pin_type,
            default_value: default_value.to_string(),
        }
    }

    /// Create an output pin declaration
    pub fn output(name: &str, pin_type: PinType) -> Self {
        Self {
            name: name.to_string(),
            pin_type,
            default_value: String::new(),
        }
    }

    /// Instantiate a disconnected pin from this declaration
    pub fn to_pin(&self) -> Pin {
        Pin::new(self.name.clone(), self.pin_type, self.default_value.clone())
    }
}
