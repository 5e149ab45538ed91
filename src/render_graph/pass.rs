//! Render passes and their declared resource usage

use std::collections::BTreeSet;
use std::fmt;

type PassCallback = dyn FnMut();

/// A unit of GPU work scheduled by the [`RenderGraph`](super::RenderGraph)
///
/// Resources are opaque names agreed on by convention between passes. The
/// scheduler only looks at which names a pass reads and writes.
pub struct RenderPass {
    name: String,
    callback: Option<Box<PassCallback>>,
    reads: BTreeSet<String>,
    writes: BTreeSet<String>,
    after: Vec<String>,
}

impl RenderPass {
    /// Creates a pass that runs `callback` when executed
    pub fn new<F>(name: &str, callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            ..Self::empty(name)
        }
    }

    /// Creates a pass without a callback; it still takes part in ordering
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            callback: None,
            reads: BTreeSet::new(),
            writes: BTreeSet::new(),
            after: Vec::new(),
        }
    }

    pub fn reads(mut self, resource: &str) -> Self {
        self.add_read_resource(resource);
        self
    }

    pub fn writes(mut self, resource: &str) -> Self {
        self.add_write_resource(resource);
        self
    }

    /// Require this pass to run after the named pass
    pub fn after(mut self, pass: &str) -> Self {
        if !self.after.iter().any(|name| name == pass) {
            self.after.push(pass.to_string());
        }
        self
    }

    pub fn add_read_resource(&mut self, resource: &str) {
        self.reads.insert(resource.to_string());
    }

    pub fn add_write_resource(&mut self, resource: &str) {
        self.writes.insert(resource.to_string());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_resources(&self) -> &BTreeSet<String> {
        &self.reads
    }

    pub fn write_resources(&self) -> &BTreeSet<String> {
        &self.writes
    }

    /// Passes explicitly required to run before this one
    pub fn explicit_dependencies(&self) -> &[String] {
        &self.after
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Run the pass callback, if any
    pub fn execute(&mut self) {
        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
    }
}

impl fmt::Debug for RenderPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPass")
            .field("name", &self.name)
            .field("reads", &self.reads)
            .field("writes", &self.writes)
            .field("after", &self.after)
            .field("has_callback", &self.has_callback())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_builder_collects_resources() {
        let pass = RenderPass::empty("Lighting")
            .reads("GBuffer")
            .reads("ShadowMap")
            .reads("GBuffer")
            .writes("LightBuffer")
            .after("Geometry")
            .after("Geometry");

        assert_eq!(pass.name(), "Lighting");
        assert_eq!(pass.read_resources().len(), 2);
        assert!(pass.write_resources().contains("LightBuffer"));
        assert_eq!(pass.explicit_dependencies(), ["Geometry".to_string()]);
        assert!(!pass.has_callback());
    }

    #[test]
    fn test_execute_runs_callback() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut pass = RenderPass::new("Blit", move || counter.set(counter.get() + 1));
        pass.execute();
        pass.execute();
        assert_eq!(calls.get(), 2);

        // Passes without a callback are a no-op
        RenderPass::empty("Idle").execute();
    }
}
