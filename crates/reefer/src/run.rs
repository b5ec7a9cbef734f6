use std::env;

use anyhow::{Context, Result};
use renderer::Renderer;
use sketchconfig::SketchConfig;
use tracing_subscriber::EnvFilter;

use crate::bindings::{apply_overrides, renderer_config};
use crate::cli::RunArgs;
use crate::paths::ConfigPath;

pub fn run(args: RunArgs) -> Result<()> {
    let (location, config) = load_config(&args)?;
    tracing::debug!(
        config = %location.path().display(),
        origin = %location.origin(),
        image = %config.image.display(),
        vertex = %config.vertex_shader.display(),
        fragment = %config.fragment_shader.display(),
        "resolved sketch config"
    );

    let cfg = renderer_config(&config, args.freeze_ms);
    let mut renderer = Renderer::new(cfg);
    renderer.run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Discovers and loads the config, then applies command-line overrides.
///
/// A missing file in the user config directory means built-in defaults,
/// with asset paths relative to the working directory.
pub fn load_config(args: &RunArgs) -> Result<(ConfigPath, SketchConfig)> {
    let location = ConfigPath::discover(args.config.as_deref())?;
    let mut config = if location.is_optional() && !location.path().exists() {
        tracing::debug!(
            path = %location.path().display(),
            "no config file found; using defaults"
        );
        SketchConfig::default()
    } else {
        SketchConfig::load(location.path()).with_context(|| {
            format!(
                "failed to load config from {} ({})",
                location.path().display(),
                location.origin()
            )
        })?
    };

    apply_overrides(&mut config, args);
    anchor_overrides(&mut config, args)?;
    config
        .validate()
        .context("configuration is invalid after applying command-line flags")?;
    Ok((location, config))
}

/// Paths given on the command line are relative to the working directory.
fn anchor_overrides(config: &mut SketchConfig, args: &RunArgs) -> Result<()> {
    let cwd = env::current_dir().context("failed to read working directory")?;
    for (flag, path) in [
        (&args.image, &mut config.image),
        (&args.vertex_shader, &mut config.vertex_shader),
        (&args.fragment_shader, &mut config.fragment_shader),
    ] {
        if flag.is_some() && path.is_relative() {
            *path = cwd.join(&*path);
        }
    }
    Ok(())
}
