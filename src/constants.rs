//! Engine-wide constants and default values
//!
//! Centralized location for the hard-coded values shared by the shader graph,
//! the custom node SDK and the render graph.

/// Shader node constants
pub mod node {
    /// Default editor size of a freshly created node (width, height)
    pub const DEFAULT_SIZE: [f32; 2] = [200.0, 150.0];

    /// Multiplier used to build composite output keys (`node_id * STRIDE + output`).
    /// A node may therefore expose at most `OUTPUT_KEY_STRIDE - 1` outputs.
    pub const OUTPUT_KEY_STRIDE: u64 = 1000;

    /// Component counts accepted by the vector constructor node
    pub const VECTOR_ARITY_RANGE: std::ops::RangeInclusive<u32> = 2..=4;

    /// Default texture name used by texture sample nodes
    pub const DEFAULT_TEXTURE_NAME: &str = "MainTexture";
}

/// Graph file format constants
pub mod file {
    /// Current shader graph document version
    pub const FORMAT_VERSION: &str = "1.0";

    /// Generator string written into saved documents
    pub const GENERATOR: &str = concat!("elemental ", env!("CARGO_PKG_VERSION"));

    /// Extension of data-driven custom node definition files
    pub const CUSTOM_NODE_EXTENSION: &str = "json";
}

/// Generated shader source constants
pub mod shader {
    /// Name of the local struct every output node writes into
    pub const OUTPUT_STRUCT_VAR: &str = "output";

    /// Object-space position local that vertex offset outputs accumulate into
    pub const LOCAL_POSITION_VAR: &str = "localPosition";

    /// Fields every fragment output structure declares
    pub const BUILTIN_OUTPUT_FIELDS: [&str; 6] = ["color", "normal", "emission", "metallic", "roughness", "ao"];

    /// Default indentation inside generated entry points
    pub const DEFAULT_INDENT: usize = 4;
}

/// Configuration search locations
pub mod config {
    /// Directory below the user's home that holds custom node definitions
    pub const HOME_NODE_DIR: &str = ".elemental/nodes";

    /// Project-local custom node directory
    pub const LOCAL_NODE_DIR: &str = "./nodes";
}
