#![deny(unsafe_code)]
//! CLI binary for the magnet-field visualizer.
//!
//! Subcommands:
//! - `render`: trace the scene and write a PNG
//! - `trace`: trace the scene and emit lines as JSON
//! - `sample`: print the field vector at one point
//! - `params`: print parameter defaults and schema
//!
//! Every scene-taking subcommand accepts the same pose options, and an
//! optional events file replayed through `Scene::apply` after posing.

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use glam::DVec2;
use log::info;
use magnet_field_core::{FieldLine, FieldParams, Scene, SceneEvent, Termination};
use magnet_field_render::{draw_scene, snapshot, Rgba, Style};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "magnet-field", about = "Bar magnet field-line visualizer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Pose and parameter options shared by every scene-taking subcommand.
#[derive(Args)]
struct SceneArgs {
    /// Parameter overrides as a JSON object (see `params`).
    #[arg(long, default_value = "{}")]
    params: String,

    /// Angle of magnet 0 in degrees.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    angle0: f64,

    /// Angle of magnet 1 in degrees.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    angle1: f64,

    /// Centre of magnet 0 as "x,y".
    #[arg(long)]
    pos0: Option<String>,

    /// Centre of magnet 1 as "x,y".
    #[arg(long)]
    pos1: Option<String>,

    /// Hide magnet 0.
    #[arg(long)]
    hide0: bool,

    /// Hide magnet 1.
    #[arg(long)]
    hide1: bool,

    /// JSON file with an array of UI events to replay after posing.
    #[arg(long)]
    events: Option<PathBuf>,
}

/// Colour overrides for `render`, each a hex string like "#333333".
#[derive(Args)]
struct StyleArgs {
    /// Canvas background colour.
    #[arg(long)]
    background: Option<String>,

    /// Field line colour.
    #[arg(long)]
    line_color: Option<String>,

    /// Arrowhead colour.
    #[arg(long)]
    arrow_color: Option<String>,

    /// Colour of every magnet's sink half.
    #[arg(long)]
    sink_color: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Trace every field line and write a PNG.
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        #[command(flatten)]
        style: StyleArgs,

        /// Output file path.
        #[arg(short, long, default_value = "field.png")]
        output: PathBuf,
    },
    /// Trace every field line and emit magnets and lines as JSON.
    Trace {
        #[command(flatten)]
        scene: SceneArgs,

        /// Write the JSON document here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the net field vector at a point.
    Sample {
        #[command(flatten)]
        scene: SceneArgs,

        /// Query point as "x,y".
        #[arg(long)]
        at: String,
    },
    /// Print parameter defaults and schema.
    Params,
}

/// Parses `"x,y"` into a point.
fn parse_point(s: &str) -> Result<DVec2, CliError> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| CliError::Input(format!("expected \"x,y\", got \"{s}\"")))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CliError::Input(format!("invalid coordinate \"{v}\" in \"{s}\"")))
    };
    Ok(DVec2::new(coord(x)?, coord(y)?))
}

fn read_events(path: &Path) -> Result<Vec<SceneEvent>, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::io("reading", path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid events file {}: {e}", path.display())))
}

fn build_scene(args: &SceneArgs) -> Result<Scene, CliError> {
    let overrides: Value = serde_json::from_str(&args.params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let mut scene = Scene::new(FieldParams::from_json(&overrides))?;

    let poses = [
        (args.angle0, args.pos0.as_deref(), args.hide0),
        (args.angle1, args.pos1.as_deref(), args.hide1),
    ];
    for (slot, (angle, pos, hidden)) in poses.into_iter().enumerate() {
        scene.set_angle(slot, angle)?;
        scene.set_visible(slot, !hidden)?;
        if let Some(pos) = pos {
            scene.set_position(slot, parse_point(pos)?)?;
        }
    }

    if let Some(path) = &args.events {
        let events = read_events(path)?;
        let count = events.len();
        let redraws = events
            .into_iter()
            .try_fold(0_usize, |n, event| scene.apply(event).map(|r| n + r as usize))?;
        info!("replayed {count} events from {} ({redraws} redraws)", path.display());
    }
    Ok(scene)
}

fn build_style(args: &StyleArgs) -> Result<Style, CliError> {
    let mut style = Style::default();
    let overrides = [
        (&args.background, &mut style.background),
        (&args.line_color, &mut style.line),
        (&args.arrow_color, &mut style.arrow),
        (&args.sink_color, &mut style.sink),
    ];
    for (hex, slot) in overrides {
        if let Some(hex) = hex {
            *slot = Rgba::from_hex(hex)?;
        }
    }
    Ok(style)
}

/// Line counts per termination kind.
fn termination_summary(lines: &[FieldLine]) -> Value {
    let count = |t: Termination| lines.iter().filter(|l| l.line.termination == t).count();
    json!({
        "lines": lines.len(),
        "arrows": lines.iter().filter(|l| l.line.arrow.is_some()).count(),
        "field_collapsed": count(Termination::FieldCollapsed),
        "out_of_bounds": count(Termination::OutOfBounds),
        "max_steps_reached": count(Termination::MaxStepsReached),
    })
}

fn print_summary(json_mode: bool, summary: &Value) -> Result<(), CliError> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else if let Some(map) = summary.as_object() {
        for (key, value) in map {
            println!("{key}: {value}");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Params => {
            let defaults = FieldParams::default().to_json();
            if cli.json {
                let info = json!({
                    "defaults": defaults,
                    "schema": FieldParams::schema(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let schema = FieldParams::schema();
                if let Some(map) = defaults.as_object() {
                    for (key, value) in map {
                        let about = schema[key]["description"].as_str().unwrap_or_default();
                        println!("  {key:<20} {value:<8} {about}");
                    }
                }
            }
        }
        Command::Sample { scene, at } => {
            let scene = build_scene(&scene)?;
            let point = parse_point(&at)?;
            let b = scene.sample(point);
            if cli.json {
                let info = json!({
                    "point": [point.x, point.y],
                    "field": [b.x, b.y],
                    "magnitude": b.length(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "B({}, {}) = ({:.6}, {:.6})  |B| = {:.6}",
                    point.x,
                    point.y,
                    b.x,
                    b.y,
                    b.length()
                );
            }
        }
        Command::Trace { scene, output } => {
            let scene = build_scene(&scene)?;
            let lines = scene.field_lines();
            let document = json!({
                "params": scene.params().to_json(),
                "magnets": scene.magnets(),
                "lines": lines,
            });
            match output {
                Some(path) => {
                    let text = serde_json::to_string(&document)?;
                    fs::write(&path, text)
                        .map_err(|e| CliError::io("writing", &path, e))?;
                    info!("wrote {} lines to {}", lines.len(), path.display());
                    print_summary(cli.json, &termination_summary(&lines))?;
                }
                None => println!("{}", serde_json::to_string_pretty(&document)?),
            }
        }
        Command::Render {
            scene,
            style,
            output,
        } => {
            let style = build_style(&style)?;
            let scene = build_scene(&scene)?;
            let lines = scene.field_lines();
            let raster = draw_scene(&scene, &lines, &style)?;
            snapshot::write_png(&raster, &output)?;
            info!(
                "rendered {}x{} scene -> {}",
                raster.width(),
                raster.height(),
                output.display()
            );
            let mut summary = termination_summary(&lines);
            summary["output"] = json!(output.display().to_string());
            print_summary(cli.json, &summary)?;
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
