//! Render graph - passes ordered by the resources they read and write

pub mod graph;
pub mod pass;

pub use graph::RenderGraph;
pub use pass::RenderPass;
