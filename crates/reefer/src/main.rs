mod bindings;
mod cli;
mod paths;
mod run;

use anyhow::{Context, Result};
use canvas::{FrameUniforms, Sketch, Viewport};
use cli::{Command, ConfigAction, LayoutArgs, RunArgs};
use renderer::{check_program, load_program_sources, probe_image_size, FALLBACK_VIEWPORT_WIDTH};
use sketchconfig::TouchSetting;

use bindings::{input_policy, layout_rules};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Layout(layout)) => run_layout(&cli.run, layout),
        Some(Command::Check) => run_check(&cli.run),
        Some(Command::Config(config_cmd)) => handle_config_command(&cli.run, config_cmd.action),
        None => run::run(cli.run),
    }
}

fn run_layout(args: &RunArgs, layout: LayoutArgs) -> Result<()> {
    let (_, config) = run::load_config(args)?;
    let image = match layout.image_size {
        Some(size) => size,
        None => probe_image_size(&config.image)?,
    };
    let viewport_width = layout
        .viewport_width
        .or(config.layout.viewport_width)
        .unwrap_or(FALLBACK_VIEWPORT_WIDTH);
    let has_touch = layout.touch || config.layout.touch == TouchSetting::On;

    let sketch = Sketch::new(
        image,
        Viewport::new(viewport_width, has_touch),
        layout_rules(&config.layout),
        input_policy(config.input),
    );
    let canvas = sketch.canvas();
    let frame = FrameUniforms::capture(&sketch, 0.0);

    println!("Viewport:          {viewport_width} (touch: {has_touch})");
    println!("Device:            {}", sketch.device());
    println!("Canvas:            {}x{}", canvas.width, canvas.height);
    println!(
        "uResolution:       {}, {}",
        frame.resolution[0], frame.resolution[1]
    );
    println!(
        "uImageResolution:  {}, {}",
        frame.image_resolution[0], frame.image_resolution[1]
    );
    println!("uMouse:            {}, {}", frame.mouse[0], frame.mouse[1]);
    Ok(())
}

fn run_check(args: &RunArgs) -> Result<()> {
    let (_, config) = run::load_config(args)?;
    let image = probe_image_size(&config.image)?;
    let sources = load_program_sources(&config.vertex_shader, &config.fragment_shader)?;
    check_program(&sources.vertex, &sources.fragment).with_context(|| {
        format!(
            "failed to compile {} and {}",
            sources.vertex_path.display(),
            sources.fragment_path.display()
        )
    })?;

    println!(
        "Image:     {} ({}x{})",
        config.image.display(),
        image.width(),
        image.height()
    );
    println!("Vertex:    {}", sources.vertex_path.display());
    println!("Fragment:  {}", sources.fragment_path.display());
    println!("Shader program compiled.");
    Ok(())
}

fn handle_config_command(args: &RunArgs, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Where => run_config_where(args),
        ConfigAction::Show => run_config_show(args),
    }
}

fn run_config_where(args: &RunArgs) -> Result<()> {
    let location = paths::ConfigPath::discover(args.config.as_deref())?;
    println!("Configuration file:");
    println!("  path:    {}", location.path().display());
    println!("  source:  {}", location.origin());
    println!(
        "  status:  {}",
        if location.path().exists() {
            "present"
        } else {
            "missing"
        }
    );
    Ok(())
}

fn run_config_show(args: &RunArgs) -> Result<()> {
    let (_, config) = run::load_config(args)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
