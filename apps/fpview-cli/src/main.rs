use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use fpview_assets::{SolidTextureLoader, load_batch};
use fpview_common::{Key, Pose};
use fpview_frame::{FrameController, Phase};
use fpview_input::InputEvent;
use fpview_map::CellCoord;
use fpview_render::{DebugTextRenderer, Renderer};
use fpview_scene::SceneConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fpview-cli", about = "Headless tools for fpview scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene file (YAML); the built-in scene when omitted
    #[arg(long, global = true)]
    scene: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the map with the start position marked `@`
    Map,
    /// Run the frame loop headless with placeholder textures
    Simulate {
        /// Keys held for the whole run: forward, backward, left, right
        #[arg(long, value_delimiter = ',', value_parser = parse_key)]
        hold: Vec<Key>,
        /// Mouse movement in pixels delivered before the first tick
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        look_dx: f32,
        /// Number of ticks to run
        #[arg(short, long, default_value = "60")]
        ticks: u32,
        /// Milliseconds per tick
        #[arg(long, default_value = "16")]
        dt: f32,
        /// Make the named texture fail to load
        #[arg(long)]
        fail_texture: Option<String>,
        /// Print the final frame's draw list
        #[arg(long)]
        draws: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn parse_key(s: &str) -> Result<Key, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "forward" | "w" => Ok(Key::Forward),
        "backward" | "s" => Ok(Key::Backward),
        "left" | "a" => Ok(Key::Left),
        "right" | "d" => Ok(Key::Right),
        other => Err(format!("unknown key {other:?}")),
    }
}

fn load_scene(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(SceneConfig::builtin()?),
    }
}

fn pose_json(pose: &Pose) -> serde_json::Value {
    serde_json::json!({
        "x": pose.position.x,
        "y": pose.position.y,
        "facing_degrees": pose.facing.to_degrees(),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("fpview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", fpview_scene::crate_info());
            println!("render: {}", fpview_render::crate_info());
            println!("frame: {}", fpview_frame::crate_info());
        }
        Commands::Map => {
            let config = load_scene(cli.scene.as_ref())?;
            let map = config.grid()?;
            let start = CellCoord::containing(config.start.pose().position);
            for (y, row) in map.to_rows().into_iter().enumerate() {
                let line: String = row
                    .chars()
                    .enumerate()
                    .map(|(x, glyph)| {
                        if CellCoord::new(x as i32, y as i32) == start {
                            '@'
                        } else {
                            glyph
                        }
                    })
                    .collect();
                println!("{line}");
            }
            println!(
                "{}x{}, {} blocked, {} trees",
                map.width(),
                map.height(),
                map.blocked_count(),
                map.tree_cells().len()
            );
        }
        Commands::Simulate {
            hold,
            look_dx,
            ticks,
            dt,
            fail_texture,
            draws,
            json,
        } => {
            let config = load_scene(cli.scene.as_ref())?;
            let mut controller = FrameController::new(config, 1280, 720)?;

            let mut loader = SolidTextureLoader::new()
                .with_color("wall", [150, 80, 60, 255])
                .with_color("tree", [40, 120, 40, 255]);
            if let Some(name) = fail_texture {
                loader = loader.failing(name);
            }
            controller.on_textures(load_batch(&loader, &controller.texture_requests()));

            for key in &hold {
                controller.handle(InputEvent::KeyDown(*key));
            }
            controller.handle(InputEvent::MouseMove { dx: look_dx });

            let mut poses = vec![controller.pose()];
            for _ in 0..ticks {
                controller.handle(InputEvent::Tick { elapsed_ms: dt });
                poses.push(controller.pose());
            }

            let phase = match controller.phase() {
                Phase::Loading => "loading",
                Phase::Ready => "ready",
            };
            let error = controller.load_error().map(|e| e.to_string());

            if json {
                let out = serde_json::json!({
                    "phase": phase,
                    "error": error,
                    "ticks": controller.ticks(),
                    "poses": poses.iter().map(pose_json).collect::<Vec<_>>(),
                    "draws": controller.draw_calls().len(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("phase: {phase}");
                if let Some(error) = &error {
                    println!("error: {error}");
                }
                for (i, pose) in poses.iter().enumerate() {
                    println!(
                        "{i:>4}: ({:.3}, {:.3}) facing {:.1} deg",
                        pose.position.x,
                        pose.position.y,
                        pose.facing.to_degrees()
                    );
                }
                if draws {
                    print!("{}", DebugTextRenderer::new().render(&controller.draw_calls()));
                }
            }

            if controller.phase() == Phase::Loading {
                bail!("scene never left the loading phase");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn simulate_parses_held_keys() {
        let cli = Cli::try_parse_from([
            "fpview-cli",
            "simulate",
            "--hold",
            "forward,left",
            "--look-dx",
            "-25",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate { hold, look_dx, .. } => {
                assert_eq!(hold, vec![Key::Forward, Key::Left]);
                assert_eq!(look_dx, -25.0);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(Cli::try_parse_from(["fpview-cli", "simulate", "--hold", "jump"]).is_err());
    }
}
