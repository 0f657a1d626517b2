use anyhow::Context;
use clap::{Parser, Subcommand};
use glimmer_assets::{FileImageDecoder, FileImporter, Model, SceneImporter, SceneNode};
use glimmer_camera::Movement;
use glimmer_gpu::{GpuDevice, RecordingDevice, RecordingProgram};
use glimmer_input::Action;
use glimmer_render::{Driver, FrameOutcome, ViewerConfig};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glimmer-cli", about = "Headless tools for glimmer scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Import a model file and report its node tree, meshes and textures
    Inspect {
        /// Model file (.obj, .gltf, .glb)
        path: PathBuf,
    },
    /// Run the frame driver without a window and report the camera
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f64,
        /// Hold the forward key for every frame
        #[arg(long)]
        forward: bool,
        /// Model to draw instead of the cube
        #[arg(long)]
        model: Option<PathBuf>,
        /// JSON viewer configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn print_tree(node: &SceneNode, depth: usize) {
    println!("{:indent$}{} meshes={:?}", "", node.name, node.meshes, indent = depth * 2);
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}

fn inspect(path: PathBuf) -> anyhow::Result<()> {
    let scene = FileImporter
        .import(&path)
        .with_context(|| format!("cannot import {}", path.display()))?;
    println!(
        "{}: meshes={} materials={} incomplete={}",
        path.display(),
        scene.meshes.len(),
        scene.materials.len(),
        scene.incomplete
    );
    if let Some(root) = &scene.root {
        print_tree(root, 1);
    }

    let recording = Rc::new(RecordingDevice::new());
    let device: Rc<dyn GpuDevice> = recording.clone();
    let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let model = Model::from_scene(&device, &scene, directory, &FileImageDecoder::default());
    for (i, mesh) in model.meshes().iter().enumerate() {
        println!(
            "mesh {i}: vertices={} triangles={} textures={}",
            mesh.vertices().len(),
            mesh.indices().len() / 3,
            mesh.textures().len()
        );
        for texture in mesh.textures() {
            let state = if texture.is_loaded() { "ok" } else { "missing" };
            println!("  {:?} {} [{state}]", texture.kind, texture.path.display());
        }
    }
    println!(
        "unique textures={} uploads={}",
        model.textures().len(),
        recording.texture_uploads()
    );
    Ok(())
}

/// Totals over a headless run.
#[derive(Debug, Default, PartialEq, Eq)]
struct RunTotals {
    frames: u32,
    draws: usize,
    meshes: usize,
}

/// Drive `frames` frames at `fps`. The recording log is counted and cleared
/// every frame so long runs stay flat in memory.
fn run_frames(
    driver: &mut Driver,
    recording: &RecordingDevice,
    program: &mut RecordingProgram,
    models: &[Model],
    actions: &[Action],
    frames: u32,
    fps: f64,
) -> RunTotals {
    let mut totals = RunTotals::default();
    for frame in 0..frames {
        recording.clear_log();
        let now = f64::from(frame) / fps;
        match driver.frame(now, actions, recording, program, models) {
            FrameOutcome::Continue(stats) => {
                tracing::debug!(frame, %stats, "frame");
                totals.frames += 1;
                totals.meshes += stats.meshes_drawn;
                totals.draws += recording.draw_count();
            }
            FrameOutcome::Exit => break,
        }
    }
    totals
}

fn simulate(
    frames: u32,
    fps: f64,
    forward: bool,
    model: Option<PathBuf>,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    anyhow::ensure!(fps > 0.0, "fps must be positive, got {fps}");
    let settings = match config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let recording = Rc::new(RecordingDevice::new());
    let device: Rc<dyn GpuDevice> = recording.clone();
    let decoder = FileImageDecoder::default();
    let models = vec![match model {
        Some(path) => Model::load(&device, &path, &FileImporter, &decoder),
        None => Model::cube(&device, &[], &decoder),
    }];

    let mut driver = Driver::new(&settings);
    let mut program = RecordingProgram::new();
    let actions: Vec<Action> = if forward {
        vec![Action::Move(Movement::Forward)]
    } else {
        Vec::new()
    };

    let totals = run_frames(
        &mut driver,
        &recording,
        &mut program,
        &models,
        &actions,
        frames,
        fps,
    );

    let camera = driver.camera();
    println!(
        "frames={} draws={} meshes={}",
        totals.frames, totals.draws, totals.meshes
    );
    println!(
        "camera position=({:.3}, {:.3}, {:.3}) yaw={:.1} pitch={:.1} zoom={:.1}",
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.yaw(),
        camera.pitch(),
        camera.zoom()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("glimmer-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("camera: {}", glimmer_camera::crate_info());
            println!("gpu: {}", glimmer_gpu::crate_info());
            println!("assets: {}", glimmer_assets::crate_info());
            println!("render: {}", glimmer_render::crate_info());
        }
        Commands::Inspect { path } => inspect(path)?,
        Commands::Simulate {
            frames,
            fps,
            forward,
            model,
            config,
        } => simulate(frames, fps, forward, model, config)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(frames: u32) -> (RunTotals, usize) {
        let recording = Rc::new(RecordingDevice::new());
        let device: Rc<dyn GpuDevice> = recording.clone();
        let models = vec![Model::cube(&device, &[], &FileImageDecoder::default())];
        let mut driver = Driver::new(&ViewerConfig::default());
        let mut program = RecordingProgram::new();
        let totals = run_frames(
            &mut driver,
            &recording,
            &mut program,
            &models,
            &[Action::Move(Movement::Forward)],
            frames,
            60.0,
        );
        (totals, recording.calls().len())
    }

    #[test]
    fn draws_are_summed_across_frames() {
        let (totals, _) = run(30);
        assert_eq!(
            totals,
            RunTotals {
                frames: 30,
                draws: 30,
                meshes: 30
            }
        );
    }

    #[test]
    fn call_log_holds_only_the_last_frame() {
        let (_, short) = run(3);
        let (_, long) = run(300);
        assert!(short > 0);
        assert_eq!(short, long);
    }

    #[test]
    fn quit_stops_the_run() {
        let recording = RecordingDevice::new();
        let mut driver = Driver::new(&ViewerConfig::default());
        let mut program = RecordingProgram::new();
        let totals = run_frames(
            &mut driver,
            &recording,
            &mut program,
            &[],
            &[Action::Quit],
            10,
            60.0,
        );
        assert_eq!(totals.frames, 0);
    }
}
