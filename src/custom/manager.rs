//! Registry of custom node definitions

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use once_cell::sync::Lazy;

use super::{CustomNodeDefinition, CustomShaderNode, JsonNodeDefinition};
use crate::config::EngineConfig;
use crate::constants;
use crate::error::{DefinitionError, RegistryError};
use crate::nodes::{NodeKind, ShaderNode};

/// Process-wide registry shared by graph loading and the command line driver
static GLOBAL_MANAGER: Lazy<RwLock<CustomNodeManager>> = Lazy::new(|| RwLock::new(CustomNodeManager::new()));

/// Registered definition, keeping file-backed ones reloadable
#[derive(Clone)]
enum Registered {
    Native(Arc<dyn CustomNodeDefinition>),
    File(Arc<JsonNodeDefinition>),
}

impl Registered {
    fn shared(&self) -> Arc<dyn CustomNodeDefinition> {
        match self {
            Registered::Native(definition) => Arc::clone(definition),
            Registered::File(definition) => {
                let shared: Arc<dyn CustomNodeDefinition> = definition.clone();
                shared
            }
        }
    }
}

/// Name-keyed table of custom node definitions
///
/// Names are unique across native and file-backed definitions. Tests and
/// tools can build isolated managers; [`CustomNodeManager::global`] is the
/// shared instance.
pub struct CustomNodeManager {
    definitions: BTreeMap<String, Registered>,
    hot_reloading: bool,
}

impl CustomNodeManager {
    pub fn new() -> Self {
        Self {
            definitions: BTreeMap::new(),
            hot_reloading: false,
        }
    }

    /// Get the process-wide manager
    pub fn global() -> &'static RwLock<CustomNodeManager> {
        &GLOBAL_MANAGER
    }

    /// Register a definition; fails without mutation if the name is taken
    pub fn register(&mut self, definition: Arc<dyn CustomNodeDefinition>) -> Result<(), RegistryError> {
        let name = definition.descriptor().name;
        self.insert(name, Registered::Native(definition))
    }

    /// Register a parsed JSON definition so hot reloading can track its file
    pub fn register_json(&mut self, definition: JsonNodeDefinition) -> Result<(), RegistryError> {
        let name = definition.name().to_string();
        self.insert(name, Registered::File(Arc::new(definition)))
    }

    fn insert(&mut self, name: String, definition: Registered) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(DefinitionError::EmptyName.into());
        }
        if self.definitions.contains_key(&name) {
            warn!("Custom node definition '{}' already exists", name);
            return Err(RegistryError::DuplicateDefinition(name));
        }
        info!("Registered custom node definition '{}'", name);
        self.definitions.insert(name, definition);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<Arc<dyn CustomNodeDefinition>, RegistryError> {
        let removed = self
            .definitions
            .remove(name)
            .ok_or_else(|| RegistryError::DefinitionNotFound(name.to_string()))?;
        info!("Unregistered custom node definition '{}'", name);
        Ok(removed.shared())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CustomNodeDefinition>> {
        self.definitions.get(name).map(Registered::shared)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Instantiate a shader node from the named definition
    pub fn create_node(&self, name: &str) -> Result<ShaderNode, RegistryError> {
        let definition = self
            .get(name)
            .ok_or_else(|| RegistryError::DefinitionNotFound(name.to_string()))?;
        let descriptor = definition.descriptor();
        Ok(ShaderNode::new(descriptor, NodeKind::Custom(CustomShaderNode::new(definition))))
    }

    /// Register every JSON definition found in `directory`
    ///
    /// Files are visited in sorted path order. Files that fail to parse or
    /// collide with a registered name are logged and skipped. Returns the
    /// number of definitions registered.
    pub fn load_from_directory(&mut self, directory: &Path, recursive: bool) -> Result<usize, RegistryError> {
        if !directory.is_dir() {
            return Err(RegistryError::DirectoryNotFound(directory.to_path_buf()));
        }

        let mut files = Vec::new();
        collect_definition_files(directory, recursive, &mut files);
        files.sort();

        let mut count = 0;
        for path in files {
            match JsonNodeDefinition::from_file(&path) {
                Ok(definition) => match self.register_json(definition) {
                    Ok(()) => count += 1,
                    Err(e) => warn!("Skipping {}: {}", path.display(), e),
                },
                Err(e) => warn!("Failed to load custom node {}: {}", path.display(), e),
            }
        }
        info!("Loaded {} custom node definition(s) from {}", count, directory.display());
        Ok(count)
    }

    /// Reload file-backed definitions whose file changed since it was parsed
    ///
    /// Does nothing unless hot reloading is enabled. A definition is replaced
    /// only when the new file parses completely and keeps the same name.
    /// Returns the number of replaced definitions.
    pub fn check_for_changes(&mut self) -> usize {
        if !self.hot_reloading {
            return 0;
        }

        let mut replacements = Vec::new();
        for (name, registered) in &self.definitions {
            let Registered::File(definition) = registered else {
                continue;
            };
            if !definition.has_file_changed() {
                continue;
            }
            match definition.reloaded() {
                Ok(fresh) if fresh.name() == name => replacements.push((name.clone(), fresh)),
                Ok(fresh) => warn!(
                    "Reload of '{}' renamed it to '{}'; keeping the previous definition",
                    name,
                    fresh.name()
                ),
                Err(e) => warn!("Reload of '{}' failed, keeping the previous definition: {}", name, e),
            }
        }

        let count = replacements.len();
        for (name, fresh) in replacements {
            debug!("Hot reloaded custom node definition '{}'", name);
            self.definitions.insert(name, Registered::File(Arc::new(fresh)));
        }
        if count > 0 {
            info!("Hot reloaded {} custom node definition(s)", count);
        }
        count
    }

    pub fn set_hot_reloading_enabled(&mut self, enabled: bool) {
        self.hot_reloading = enabled;
    }

    pub fn is_hot_reloading_enabled(&self) -> bool {
        self.hot_reloading
    }

    /// Load the configured search directories and apply the hot reload flag
    ///
    /// Missing directories are skipped. Returns the number of definitions
    /// registered.
    pub fn apply_config(&mut self, config: &EngineConfig) -> usize {
        self.set_hot_reloading_enabled(config.hot_reload);
        let mut count = 0;
        for directory in &config.custom_node_dirs {
            match self.load_from_directory(directory, config.recursive_scan) {
                Ok(loaded) => count += loaded,
                Err(e) => debug!("Skipping custom node directory: {}", e),
            }
        }
        count
    }
}

impl Default for CustomNodeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_definition_files(directory: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read directory {}: {}", directory.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_definition_files(&path, recursive, files);
            }
        } else if path
            .extension()
            .is_some_and(|extension| extension == constants::file::CUSTOM_NODE_EXTENSION)
        {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::NativeNodeDefinition;
    use crate::nodes::{
        CodegenOptions, InputSemantic, OutputSemantic, PinSpec, PinType, ShaderGraph, ShaderNodeFactory,
    };
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("elemental-nodes-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn definition_json(name: &str, code: &str) -> String {
        format!(
            r#"{{
                "name": "{}",
                "category": "Test",
                "inputs": [{{"name": "In", "type": "float", "defaultValue": "0.5"}}],
                "outputs": [{{"name": "Out", "type": "float"}}],
                "code": "{}"
            }}"#,
            name, code
        )
    }

    fn touch_later(path: &Path) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(10))
            .unwrap();
    }

    fn doubler() -> Arc<dyn CustomNodeDefinition> {
        Arc::new(
            NativeNodeDefinition::new("Double", "Math", |inputs, writer| {
                let variable = writer.local_name("double");
                writer.statement(format!("float {} = {} * 2.0;", variable, inputs[0]));
                writer.bind_output(0, variable);
                Ok(())
            })
            .with_input(PinSpec::input("Value", PinType::Float, "1.0"))
            .with_output(PinSpec::output("Result", PinType::Float)),
        )
    }

    #[test]
    fn test_register_lookup_unregister() {
        let mut manager = CustomNodeManager::new();
        manager.register(doubler()).unwrap();
        assert!(matches!(
            manager.register(doubler()),
            Err(RegistryError::DuplicateDefinition(name)) if name == "Double"
        ));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.names(), vec!["Double"]);

        let node = manager.create_node("Double").unwrap();
        assert_eq!(node.name(), "Double");
        assert_eq!(node.inputs()[0].default_value, "1.0");

        manager.unregister("Double").unwrap();
        assert!(manager.is_empty());
        assert!(matches!(manager.create_node("Double"), Err(RegistryError::DefinitionNotFound(_))));
        assert!(matches!(manager.unregister("Double"), Err(RegistryError::DefinitionNotFound(_))));
    }

    #[test]
    fn test_custom_node_in_graph() {
        let mut manager = CustomNodeManager::new();
        manager.register(doubler()).unwrap();

        let mut graph = ShaderGraph::new("custom");
        let time = graph
            .add_node(ShaderNodeFactory::create_input_node(InputSemantic::Time, ""))
            .unwrap();
        let double = graph
            .add_node(ShaderNodeFactory::create_custom_node(&manager, "Double").unwrap())
            .unwrap();
        let out = graph
            .add_node(ShaderNodeFactory::create_output_node(OutputSemantic::Roughness, ""))
            .unwrap();
        graph.add_connection(time, 0, double, 0).unwrap();
        graph.add_connection(double, 0, out, 0).unwrap();

        let code = graph
            .generate_fragment_shader_code_with(&CodegenOptions::default())
            .unwrap();
        assert!(code.contains(&format!("    float double_{} = Time * 2.0;\n", double)));
        assert!(code.contains(&format!("    output.roughness = double_{};\n", double)));
    }

    #[test]
    fn test_unbound_output_is_an_error() {
        let mut manager = CustomNodeManager::new();
        manager
            .register(Arc::new(
                NativeNodeDefinition::new("Lazy", "Test", |_, _| Ok(()))
                    .with_output(PinSpec::output("Result", PinType::Float)),
            ))
            .unwrap();

        let mut graph = ShaderGraph::new("lazy");
        let lazy = graph.add_node(manager.create_node("Lazy").unwrap()).unwrap();
        let out = graph
            .add_node(ShaderNodeFactory::create_output_node(OutputSemantic::Metallic, ""))
            .unwrap();
        graph.add_connection(lazy, 0, out, 0).unwrap();
        assert_eq!(
            graph.generate_fragment_shader_code(),
            Err(crate::error::CodegenError::UnboundOutput { node: lazy, output: 0 })
        );
    }

    #[test]
    fn test_load_from_directory() {
        let dir = scratch_dir();
        fs::write(dir.join("a.json"), definition_json("Alpha", "float {{Out_out}} = {{In}};")).unwrap();
        fs::write(dir.join("broken.json"), "{ not json").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(
            dir.join("nested").join("b.json"),
            definition_json("Beta", "float {{Out_out}} = -{{In}};"),
        )
        .unwrap();

        let mut flat = CustomNodeManager::new();
        assert_eq!(flat.load_from_directory(&dir, false).unwrap(), 1);
        assert_eq!(flat.names(), vec!["Alpha"]);

        let mut deep = CustomNodeManager::new();
        assert_eq!(deep.load_from_directory(&dir, true).unwrap(), 2);
        assert_eq!(deep.names(), vec!["Alpha", "Beta"]);
        // Reloading the same directory collides with every registered name
        assert_eq!(deep.load_from_directory(&dir, true).unwrap(), 0);

        fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(
            deep.load_from_directory(&dir, false),
            Err(RegistryError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_hot_reload() {
        let dir = scratch_dir();
        let path = dir.join("glow.json");
        fs::write(&path, definition_json("Glow", "float {{Out_out}} = {{In}};")).unwrap();

        let mut manager = CustomNodeManager::new();
        manager.load_from_directory(&dir, false).unwrap();
        let before = manager.get("Glow").unwrap();

        fs::write(&path, definition_json("Glow", "float {{Out_out}} = {{In}} * 4.0;")).unwrap();
        touch_later(&path);
        // Disabled: nothing is polled
        assert_eq!(manager.check_for_changes(), 0);

        manager.set_hot_reloading_enabled(true);
        assert_eq!(manager.check_for_changes(), 1);
        let after = manager.get("Glow").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(manager.check_for_changes(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_reload_keeps_previous_definition() {
        let dir = scratch_dir();
        let path = dir.join("glow.json");
        fs::write(&path, definition_json("Glow", "float {{Out_out}} = {{In}};")).unwrap();

        let mut manager = CustomNodeManager::new();
        manager.set_hot_reloading_enabled(true);
        manager.load_from_directory(&dir, false).unwrap();
        let before = manager.get("Glow").unwrap();

        fs::write(&path, definition_json("Glow", "float {{Out_out}} = {{Missing}};")).unwrap();
        touch_later(&path);
        assert_eq!(manager.check_for_changes(), 0);
        assert!(Arc::ptr_eq(&before, &manager.get("Glow").unwrap()));

        fs::write(&path, definition_json("Renamed", "float {{Out_out}} = {{In}};")).unwrap();
        touch_later(&path);
        assert_eq!(manager.check_for_changes(), 0);
        assert!(manager.contains("Glow"));
        assert!(!manager.contains("Renamed"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_refresh_rebinds_graph_nodes() {
        let dir = scratch_dir();
        let path = dir.join("mix.json");
        let two_inputs = r#"{
            "name": "Mix",
            "inputs": [
                {"name": "A", "type": "float", "defaultValue": "0.0"},
                {"name": "B", "type": "float", "defaultValue": "1.0"}
            ],
            "outputs": [{"name": "Out", "type": "float"}],
            "code": "float {{Out_out}} = lerp({{A}}, {{B}}, 0.5);"
        }"#;
        fs::write(&path, two_inputs).unwrap();

        let mut manager = CustomNodeManager::new();
        manager.set_hot_reloading_enabled(true);
        manager.load_from_directory(&dir, false).unwrap();

        let mut graph = ShaderGraph::new("refresh");
        let time = graph
            .add_node(ShaderNodeFactory::create_input_node(InputSemantic::Time, ""))
            .unwrap();
        let mix = graph.add_node(manager.create_node("Mix").unwrap()).unwrap();
        let out = graph
            .add_node(ShaderNodeFactory::create_output_node(OutputSemantic::Metallic, ""))
            .unwrap();
        graph.add_connection(time, 0, mix, 1).unwrap();
        graph.add_connection(mix, 0, out, 0).unwrap();
        assert_eq!(graph.refresh_custom_nodes(&manager), 0);

        let one_input = r#"{
            "name": "Mix",
            "inputs": [{"name": "A", "type": "float", "defaultValue": "0.0"}],
            "outputs": [{"name": "Out", "type": "float"}],
            "code": "float {{Out_out}} = {{A}} * 0.5;"
        }"#;
        fs::write(&path, one_input).unwrap();
        touch_later(&path);
        assert_eq!(manager.check_for_changes(), 1);

        assert_eq!(graph.refresh_custom_nodes(&manager), 1);
        assert_eq!(graph.node(mix).unwrap().inputs().len(), 1);
        // Time fed input B, which no longer exists
        assert_eq!(graph.connections().len(), 1);
        assert!(!graph.node(time).unwrap().outputs()[0].is_connected());
        assert!(graph.node(mix).unwrap().outputs()[0].is_connected());

        let code = graph.generate_fragment_shader_code().unwrap();
        assert!(code.contains(&format!("float custom_{}_out0 = 0.0 * 0.5;", mix)));

        fs::remove_dir_all(&dir).unwrap();
    }
}
