//! Elemental - command line driver
//!
//! With no arguments, prints the default PBR fragment shader and runs the
//! default render graph once. Given a graph file, prints its generated source.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::PoisonError;

use clap::Parser;
use log::{error, info};

use elemental::{CustomNodeManager, EngineConfig, RenderGraph, ShaderGraph};

/// Compile shader graphs and schedule render passes
#[derive(Parser, Debug)]
#[command(name = "elemental", version, about)]
struct Args {
    /// Shader graph file to compile; omit to print the default PBR shader
    graph: Option<PathBuf>,

    /// Emit the vertex shader instead of the fragment shader
    #[arg(long)]
    vertex: bool,

    /// Directory of custom node definitions (repeatable)
    #[arg(long = "nodes", value_name = "DIR")]
    node_dirs: Vec<PathBuf>,

    /// Engine configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    for dir in &args.node_dirs {
        config.add_custom_node_dir(dir);
    }
    let options = config.codegen_options();

    let Some(path) = args.graph else {
        let graph = ShaderGraph::default_pbr();
        println!("{}", graph.generate_fragment_shader_code_with(&options)?);

        let mut render_graph = RenderGraph::create_default();
        render_graph.execute()?;
        info!("Executed passes: {}", render_graph.sorted_pass_names().join(", "));
        return Ok(());
    };

    let graph = {
        let mut manager = CustomNodeManager::global()
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let loaded = manager.apply_config(&config);
        info!("{} custom node definition(s) available", loaded);
        ShaderGraph::load_from_file_with(&path, &manager)?
    };

    let code = if args.vertex {
        graph.generate_vertex_shader_code_with(&options)?
    } else {
        graph.generate_fragment_shader_code_with(&options)?
    };
    println!("{}", code);
    Ok(())
}
