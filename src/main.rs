//! L-System Studio CLI
//!
//! CLI commands:
//! - render: Scene or preset to PNG
//! - dump: Scene or preset to a JSON vertex dump
//! - estimate: Symbol/vertex upper bounds per iteration
//! - produce: Print the produced string
//! - scene: Write a scene as YAML, ready to edit
//! - list: List built-in presets

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use lsystem_studio::config::{Limits, SceneConfig};
use lsystem_studio::export;
use lsystem_studio::logging;
use lsystem_studio::pipeline::Studio;
use lsystem_studio::presets::Preset;
use lsystem_studio::size::compute_max_size;
use lsystem_studio::{log_error, Color};

#[derive(Parser)]
#[command(name = "lsystem_studio")]
#[command(about = "Procedural line drawings from L-systems")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the scene comes from
#[derive(Args)]
struct SceneArgs {
    /// Built-in preset name (see `list`)
    #[arg(short, long, conflicts_with = "scene")]
    preset: Option<String>,

    /// Path to a YAML scene file
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Override the scene's iteration count
    #[arg(short = 'n', long)]
    iterations: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene to PNG
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file
        #[arg(short, long, default_value = "lsystem.png")]
        output: PathBuf,

        /// Image width and height in pixels
        #[arg(long, default_value = "1024")]
        size: u32,

        /// Background color as #rrggbb or #rrggbbaa
        #[arg(long, default_value = "#ffffff")]
        background: String,
    },

    /// Dump the painted vertex stream as JSON
    Dump {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file
        #[arg(short, long, default_value = "lsystem.json")]
        output: PathBuf,
    },

    /// Print size estimates for iterations 0..=n
    Estimate {
        #[command(flatten)]
        scene: SceneArgs,
    },

    /// Print the produced string
    Produce {
        #[command(flatten)]
        scene: SceneArgs,

        /// Also print the recursion count of every symbol
        #[arg(long)]
        recursion: bool,
    },

    /// Write the resolved scene as a YAML file
    Scene {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file
        #[arg(short, long, default_value = "scene.yaml")]
        output: PathBuf,
    },

    /// List built-in presets
    List,
}

fn main() {
    let cli = Cli::parse();
    let limits = Limits::load();

    let guard = match logging::init_logging(&limits.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = run(cli, limits);
    if let Err(e) = &result {
        log_error!(e);
        eprintln!("Error: {:#}", e);
    }
    // flush the log file before exiting
    drop(guard);
    if result.is_err() {
        std::process::exit(1);
    }
}

fn run(cli: Cli, limits: Limits) -> anyhow::Result<()> {
    tracing::info!("L-System Studio starting up");

    match cli.command {
        Commands::Render {
            scene,
            output,
            size,
            background,
        } => {
            let background = Color::from_hex(&background)
                .ok_or_else(|| anyhow!("Invalid background color: {}", background))?;
            let scene = load_scene(&scene)?;
            let mut studio = Studio::from_scene(&scene, limits);
            let drawing = studio.render()?;
            export::write_png(&drawing, &output, size, background)?;
            println!(
                "{} -> {} ({} vertices)",
                scene.name,
                output.display(),
                drawing.stream.len()
            );
        }

        Commands::Dump { scene, output } => {
            let scene = load_scene(&scene)?;
            let mut studio = Studio::from_scene(&scene, limits);
            let drawing = studio.render()?;
            export::write_json(&drawing, &scene.name, &output)?;
            println!(
                "{} -> {} ({} vertices)",
                scene.name,
                output.display(),
                drawing.stream.len()
            );
        }

        Commands::Estimate { scene } => {
            let scene = load_scene(&scene)?;
            print_estimates(&scene, &limits)?;
        }

        Commands::Produce { scene, recursion } => {
            let scene = load_scene(&scene)?;
            let studio = Studio::from_scene(&scene, limits);
            studio.check_size()?;

            let mut lsystem = studio.lsystem;
            let derivation = lsystem.produce(scene.parameters.iterations);
            println!("{}", derivation.string);
            if recursion {
                let counts: Vec<String> = derivation.recursion.iter().map(u8::to_string).collect();
                println!("{}", counts.join(" "));
                println!("max recursion: {}", derivation.max_recursion);
            }
        }

        Commands::Scene { scene, output } => {
            let scene = load_scene(&scene)?;
            scene.save(&output)?;
            println!("{} -> {}", scene.name, output.display());
        }

        Commands::List => list_presets(),
    }

    Ok(())
}

/// Resolve --preset / --scene and apply the iteration override
fn load_scene(args: &SceneArgs) -> anyhow::Result<SceneConfig> {
    let mut scene = match (&args.preset, &args.scene) {
        (Some(name), _) => Preset::from_name(name)
            .map(Preset::scene)
            .ok_or_else(|| anyhow!("Unknown preset: {} (try `list`)", name))?,
        (None, Some(path)) => {
            tracing::info!("Loading scene from {:?}", path);
            SceneConfig::load(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        (None, None) => {
            tracing::warn!("No scene given, using the dragon preset");
            Preset::Dragon.scene()
        }
    };

    if let Some(n) = args.iterations {
        scene.parameters.iterations = n;
    }
    tracing::debug!(
        "Scene '{}': axiom={}, {} rules, {} iterations",
        scene.name,
        scene.axiom,
        scene.rules.len(),
        scene.parameters.iterations
    );
    Ok(scene)
}

fn print_estimates(scene: &SceneConfig, limits: &Limits) -> anyhow::Result<()> {
    let lsystem = scene.lsystem();
    let map = scene.interpretation_map();

    println!("Size estimates for '{}':", scene.name);
    println!();
    println!("{:>5} {:>22} {:>22}", "n", "symbols", "vertices");
    for n in 0..=scene.parameters.iterations {
        let estimate = compute_max_size(&lsystem, &map, n)?;
        if estimate.overflow {
            println!("{:>5} {:>22} {:>22}", n, "overflow", "overflow");
            break;
        }
        let flag = if estimate.vertex_count > limits.max_vertices
            || estimate.symbol_count > limits.max_symbols
        {
            "  (over limit)"
        } else {
            ""
        };
        println!(
            "{:>5} {:>22} {:>22}{}",
            n, estimate.symbol_count, estimate.vertex_count, flag
        );
    }
    Ok(())
}

fn list_presets() {
    println!("Available presets ({}):", Preset::ALL.len());
    println!();
    for preset in Preset::ALL {
        let scene = preset.scene();
        println!(
            "  - {:<11} {} (default n = {})",
            preset.name(),
            preset.description(),
            scene.parameters.iterations
        );
    }
}
