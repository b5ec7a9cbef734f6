use std::path::PathBuf;
use std::time::Duration;

use canvas::ImageSize;
use clap::{Parser, Subcommand};
use sketchconfig::{parse_input_mode, parse_touch, InputMode, TouchSetting};

#[derive(Parser, Debug)]
#[command(
    name = "reefer",
    author,
    version,
    about = "Image and shader sketch that follows the pointer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Config file to load instead of the discovered one.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Image bound to `uTexture`.
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Vertex shader source.
    #[arg(long = "vertex", value_name = "PATH")]
    pub vertex_shader: Option<PathBuf>,

    /// Fragment shader source.
    #[arg(long = "fragment", value_name = "PATH")]
    pub fragment_shader: Option<PathBuf>,

    /// Window title.
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// How pointer events feed `uMouse`: `direct` or `drag-gated`.
    #[arg(long, value_name = "MODE", value_parser = parse_input_mode)]
    pub input: Option<InputMode>,

    /// Classify against this viewport width instead of the monitor's.
    #[arg(long, value_name = "PIXELS", value_parser = parse_viewport_width)]
    pub viewport_width: Option<f64>,

    /// Touch capability: `auto`, `on` or `off`.
    #[arg(long, value_name = "MODE", value_parser = parse_touch)]
    pub touch: Option<TouchSetting>,

    /// Hold `millis` at this value and only redraw on input.
    #[arg(long, value_name = "MILLISECONDS", value_parser = parse_freeze_ms)]
    pub freeze_ms: Option<f32>,

    /// Minimum spacing between animated frames (e.g. `16ms`, `33`).
    #[arg(long, value_name = "DURATION", value_parser = parse_frame_interval)]
    pub frame_interval: Option<Duration>,

    /// Let the desktop show through cleared pixels.
    #[arg(long)]
    pub transparent: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the canvas layout and starting uniforms without opening a window.
    Layout(LayoutArgs),
    /// Load the image and compile the shader pair, then exit.
    Check,
    /// Inspect configuration discovery.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct LayoutArgs {
    /// Image dimensions (e.g. `800x400`); defaults to probing the configured image.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_image_size)]
    pub image_size: Option<ImageSize>,

    /// Viewport width to classify against.
    #[arg(long, value_name = "PIXELS", value_parser = parse_viewport_width)]
    pub viewport_width: Option<f64>,

    /// Report the viewport as touch-capable.
    #[arg(long)]
    pub touch: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print which config file would be loaded and where it came from.
    Where,
    /// Print the effective configuration as TOML.
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_image_size(value: &str) -> Result<ImageSize, String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid image size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid image width '{width}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid image height '{height}'"))?;
    ImageSize::new(width, height).map_err(|err| err.to_string())
}

pub fn parse_viewport_width(value: &str) -> Result<f64, String> {
    let width: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid viewport width '{value}'"))?;
    if !width.is_finite() || width <= 0.0 {
        return Err("viewport width must be a positive number of pixels".to_string());
    }
    Ok(width)
}

pub fn parse_freeze_ms(value: &str) -> Result<f32, String> {
    let millis: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid millisecond value '{value}'"))?;
    if !millis.is_finite() || millis < 0.0 {
        return Err("frozen time must be a non-negative number of milliseconds".to_string());
    }
    Ok(millis)
}

pub fn parse_frame_interval(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    let interval = match trimmed.parse::<u64>() {
        Ok(millis) => Duration::from_millis(millis),
        Err(_) => humantime::parse_duration(trimmed)
            .map_err(|err| format!("invalid frame interval '{trimmed}': {err}"))?,
    };
    if interval.is_zero() {
        return Err("frame interval must be greater than zero".to_string());
    }
    Ok(interval)
}
