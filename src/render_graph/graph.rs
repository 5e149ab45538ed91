//! Pass scheduling from declared resource usage

use std::collections::HashMap;

use log::{debug, error, info};

use super::pass::RenderPass;
use crate::error::RenderGraphError;

/// DFS marking used by the topological sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Ordered set of render passes with inferred dependencies
///
/// Dependencies are inferred in pass declaration order:
/// - a reader runs after the latest earlier writer of the resource
/// - a writer runs after the latest earlier writer and after every earlier
///   reader of the resource
/// - a reader of a resource nobody wrote earlier also runs after a later
///   writer that consumes the reader's output; such a feedback loop is a
///   cycle and fails the build
///
/// Explicit [`RenderPass::after`] constraints are added on top. The cached
/// execution order is dropped whenever the pass set changes.
#[derive(Debug)]
pub struct RenderGraph {
    name: String,
    passes: Vec<RenderPass>,
    index: HashMap<String, usize>,
    /// Per pass slot: slots that must run first, deduplicated, first occurrence order
    dependencies: Vec<Vec<usize>>,
    /// Execution order cache, `None` until a successful build
    sorted: Option<Vec<usize>>,
}

impl RenderGraph {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passes: Vec::new(),
            index: HashMap::new(),
            dependencies: Vec::new(),
            sorted: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Append a pass; fails without mutation if the name is taken
    pub fn add_pass(&mut self, pass: RenderPass) -> Result<(), RenderGraphError> {
        if self.index.contains_key(pass.name()) {
            return Err(RenderGraphError::DuplicatePass(pass.name().to_string()));
        }
        debug!("Added pass '{}' to render graph '{}'", pass.name(), self.name);
        self.index.insert(pass.name().to_string(), self.passes.len());
        self.passes.push(pass);
        self.invalidate();
        Ok(())
    }

    /// Remove a pass by name and return it
    pub fn remove_pass(&mut self, name: &str) -> Result<RenderPass, RenderGraphError> {
        let slot = *self
            .index
            .get(name)
            .ok_or_else(|| RenderGraphError::PassNotFound(name.to_string()))?;
        let pass = self.passes.remove(slot);
        self.index = self
            .passes
            .iter()
            .enumerate()
            .map(|(slot, pass)| (pass.name().to_string(), slot))
            .collect();
        self.invalidate();
        debug!("Removed pass '{}' from render graph '{}'", name, self.name);
        Ok(pass)
    }

    pub fn pass(&self, name: &str) -> Option<&RenderPass> {
        self.index.get(name).map(|&slot| &self.passes[slot])
    }

    /// Passes in declaration order
    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    /// Recompute dependencies from scratch and sort the passes
    ///
    /// On failure the cached order is left empty.
    pub fn build_dependency_graph(&mut self) -> Result<(), RenderGraphError> {
        self.invalidate();

        let dependencies = self.infer_dependencies()?;
        let mut state = vec![VisitState::Unvisited; self.passes.len()];
        let mut order = Vec::with_capacity(self.passes.len());
        for slot in 0..self.passes.len() {
            if let Err(at) = visit(slot, &dependencies, &mut state, &mut order) {
                let pass = self.passes[at].name().to_string();
                error!("Dependency cycle in render graph '{}' at pass '{}'", self.name, pass);
                return Err(RenderGraphError::Cycle(pass));
            }
        }

        self.dependencies = dependencies;
        self.sorted = Some(order);
        info!(
            "Built render graph '{}': {}",
            self.name,
            self.sorted_pass_names().join(" -> ")
        );
        Ok(())
    }

    fn infer_dependencies(&self) -> Result<Vec<Vec<usize>>, RenderGraphError> {
        let count = self.passes.len();
        let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); count];
        // Read-after-write edges only: the passes whose output each pass consumes
        let mut consumes: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut readers: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut writers: HashMap<&str, Vec<usize>> = HashMap::new();
        for (slot, pass) in self.passes.iter().enumerate() {
            for resource in pass.read_resources() {
                readers.entry(resource.as_str()).or_default().push(slot);
            }
            for resource in pass.write_resources() {
                writers.entry(resource.as_str()).or_default().push(slot);
            }
        }

        let mut last_writer: HashMap<&str, usize> = HashMap::new();
        for (slot, pass) in self.passes.iter().enumerate() {
            for resource in pass.read_resources() {
                if let Some(&writer) = last_writer.get(resource.as_str()) {
                    push_unique(&mut dependencies[slot], writer);
                    push_unique(&mut consumes[slot], writer);
                }
            }
            for resource in pass.write_resources() {
                if let Some(&writer) = last_writer.get(resource.as_str()) {
                    push_unique(&mut dependencies[slot], writer);
                }
                for &reader in readers.get(resource.as_str()).into_iter().flatten() {
                    if reader < slot {
                        push_unique(&mut dependencies[slot], reader);
                    }
                }
            }
            for name in pass.explicit_dependencies() {
                let target = *self
                    .index
                    .get(name)
                    .ok_or_else(|| RenderGraphError::PassNotFound(name.clone()))?;
                push_unique(&mut dependencies[slot], target);
            }
            for resource in pass.write_resources() {
                last_writer.insert(resource.as_str(), slot);
            }
        }

        // A resource read before any pass writes it comes from a later writer.
        // If that writer consumes the reader's own output, the two feed each
        // other and the reader must also wait for the writer.
        for (slot, pass) in self.passes.iter().enumerate() {
            for resource in pass.read_resources() {
                let Some(sources) = writers.get(resource.as_str()) else {
                    continue;
                };
                if sources.iter().any(|&writer| writer < slot) {
                    continue;
                }
                for &writer in sources {
                    if writer != slot && consumes_output_of(writer, slot, &consumes) {
                        debug!(
                            "Pass '{}' reads '{}' fed back from pass '{}'",
                            pass.name(),
                            resource,
                            self.passes[writer].name()
                        );
                        push_unique(&mut dependencies[slot], writer);
                    }
                }
            }
        }
        Ok(dependencies)
    }

    /// Passes the named pass must run after, as of the last successful build
    pub fn dependencies(&self, name: &str) -> Option<Vec<&str>> {
        let slot = *self.index.get(name)?;
        let depends = self.dependencies.get(slot)?;
        Some(depends.iter().map(|&dep| self.passes[dep].name()).collect())
    }

    pub fn is_built(&self) -> bool {
        self.sorted.is_some()
    }

    /// Cached execution order; empty when not built
    pub fn sorted_pass_names(&self) -> Vec<&str> {
        self.sorted
            .iter()
            .flatten()
            .map(|&slot| self.passes[slot].name())
            .collect()
    }

    /// Group the built order into waves
    ///
    /// No pass depends on another pass of the same wave, so the members of a
    /// wave could run concurrently. Empty when not built.
    pub fn execution_levels(&self) -> Vec<Vec<&str>> {
        let Some(order) = &self.sorted else {
            return Vec::new();
        };

        let mut level = vec![0usize; self.passes.len()];
        let mut levels: Vec<Vec<&str>> = Vec::new();
        for &slot in order {
            let depth = self.dependencies[slot]
                .iter()
                .map(|&dep| level[dep] + 1)
                .max()
                .unwrap_or(0);
            level[slot] = depth;
            if levels.len() <= depth {
                levels.resize_with(depth + 1, Vec::new);
            }
            levels[depth].push(self.passes[slot].name());
        }
        levels
    }

    /// Run every pass in dependency order, building first if needed
    pub fn execute(&mut self) -> Result<(), RenderGraphError> {
        if self.sorted.is_none() {
            self.build_dependency_graph()?;
        }
        let order = self.sorted.clone().unwrap_or_default();

        for slot in order {
            let pass = &mut self.passes[slot];
            debug!("Executing pass '{}'", pass.name());
            pass.execute();
        }
        Ok(())
    }

    /// Shadow, geometry, lighting and post-processing passes
    pub fn create_default() -> Self {
        let mut graph = Self::new("Default Render Graph");
        let passes = [
            RenderPass::new("ShadowPass", || info!("Rendering shadow maps")).writes("ShadowMap"),
            RenderPass::new("GeometryPass", || info!("Rendering geometry"))
                .reads("ShadowMap")
                .writes("GBuffer"),
            RenderPass::new("LightingPass", || info!("Computing lighting"))
                .reads("GBuffer")
                .reads("ShadowMap")
                .writes("LightBuffer"),
            RenderPass::new("PostProcessPass", || info!("Applying post-processing"))
                .reads("LightBuffer")
                .writes("FinalImage"),
        ];
        for pass in passes {
            graph.push_pass(pass);
        }
        graph
    }

    fn push_pass(&mut self, pass: RenderPass) {
        self.index.insert(pass.name().to_string(), self.passes.len());
        self.passes.push(pass);
    }

    fn invalidate(&mut self) {
        self.dependencies.clear();
        self.sorted = None;
    }
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::new("Render Graph")
    }
}

fn push_unique(list: &mut Vec<usize>, slot: usize) {
    if !list.contains(&slot) {
        list.push(slot);
    }
}

/// Check whether `pass` transitively consumes data written by `source`
fn consumes_output_of(pass: usize, source: usize, consumes: &[Vec<usize>]) -> bool {
    let mut seen = vec![false; consumes.len()];
    let mut stack = vec![pass];
    while let Some(slot) = stack.pop() {
        if slot == source {
            return true;
        }
        if !std::mem::replace(&mut seen[slot], true) {
            stack.extend(&consumes[slot]);
        }
    }
    false
}

/// Depth-first post-order visit; returns the slot where a cycle closed
fn visit(slot: usize, dependencies: &[Vec<usize>], state: &mut [VisitState], order: &mut Vec<usize>) -> Result<(), usize> {
    match state[slot] {
        VisitState::Done => return Ok(()),
        VisitState::InProgress => return Err(slot),
        VisitState::Unvisited => {}
    }

    state[slot] = VisitState::InProgress;
    for &dep in &dependencies[slot] {
        visit(dep, dependencies, state, order)?;
    }
    state[slot] = VisitState::Done;
    order.push(slot);
    Ok(())
}
