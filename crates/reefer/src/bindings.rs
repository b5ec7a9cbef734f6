use canvas::{InputPolicy, LayoutRules};
use renderer::{RenderPolicy, RendererConfig, SurfaceAlpha, TouchCapability};
use sketchconfig::{InputMode, Layout, SketchConfig, TouchSetting};

use crate::cli::RunArgs;

/// Folds command-line overrides into the loaded config.
pub fn apply_overrides(config: &mut SketchConfig, args: &RunArgs) {
    if let Some(image) = &args.image {
        config.image = image.clone();
    }
    if let Some(vertex) = &args.vertex_shader {
        config.vertex_shader = vertex.clone();
    }
    if let Some(fragment) = &args.fragment_shader {
        config.fragment_shader = fragment.clone();
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(width) = args.viewport_width {
        config.layout.viewport_width = Some(width);
    }
    if let Some(touch) = args.touch {
        config.layout.touch = touch;
    }
    if let Some(interval) = args.frame_interval {
        config.frame_interval = Some(interval);
    }
    if args.transparent {
        config.transparent = true;
    }
}

pub fn layout_rules(layout: &Layout) -> LayoutRules {
    LayoutRules {
        mobile_breakpoint: layout.mobile_breakpoint,
        mobile_width: layout.mobile_width,
        desktop_width: layout.desktop_width,
    }
}

pub fn input_policy(mode: InputMode) -> InputPolicy {
    match mode {
        InputMode::Direct => InputPolicy::Direct,
        InputMode::DragGated => InputPolicy::DragGated,
    }
}

pub fn touch_capability(setting: TouchSetting) -> TouchCapability {
    match setting {
        TouchSetting::Auto => TouchCapability::Detect,
        TouchSetting::On => TouchCapability::Always,
        TouchSetting::Off => TouchCapability::Never,
    }
}

/// A frozen clock wins over the frame interval.
pub fn render_policy(config: &SketchConfig, freeze_ms: Option<f32>) -> RenderPolicy {
    match freeze_ms {
        Some(millis) => RenderPolicy::Still { millis },
        None => RenderPolicy::Animate {
            frame_interval: config.frame_interval,
        },
    }
}

pub fn surface_alpha(transparent: bool) -> SurfaceAlpha {
    if transparent {
        SurfaceAlpha::Transparent
    } else {
        SurfaceAlpha::Opaque
    }
}

pub fn renderer_config(config: &SketchConfig, freeze_ms: Option<f32>) -> RendererConfig {
    RendererConfig {
        title: config.title.clone(),
        image: config.image.clone(),
        vertex_shader: config.vertex_shader.clone(),
        fragment_shader: config.fragment_shader.clone(),
        layout: layout_rules(&config.layout),
        input: input_policy(config.input),
        touch: touch_capability(config.layout.touch),
        viewport_width: config.layout.viewport_width,
        surface_alpha: surface_alpha(config.transparent),
        policy: render_policy(config, freeze_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn stock_config_maps_to_stock_renderer() {
        let renderer = renderer_config(&SketchConfig::default(), None);
        let stock = RendererConfig::default();
        assert_eq!(renderer.image, stock.image);
        assert_eq!(renderer.vertex_shader, stock.vertex_shader);
        assert_eq!(renderer.fragment_shader, stock.fragment_shader);
        assert_eq!(renderer.layout, stock.layout);
        assert_eq!(renderer.input, stock.input);
        assert_eq!(renderer.touch, stock.touch);
        assert_eq!(renderer.surface_alpha, stock.surface_alpha);
        assert_eq!(renderer.policy, stock.policy);
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = SketchConfig::default();
        config.layout.viewport_width = Some(1400.0);
        let args = RunArgs {
            image: Some(PathBuf::from("other.png")),
            input: Some(InputMode::DragGated),
            viewport_width: Some(600.0),
            touch: Some(TouchSetting::On),
            transparent: true,
            ..RunArgs::default()
        };

        apply_overrides(&mut config, &args);
        assert_eq!(config.image, PathBuf::from("other.png"));
        assert_eq!(config.layout.viewport_width, Some(600.0));

        let renderer = renderer_config(&config, None);
        assert_eq!(renderer.input, InputPolicy::DragGated);
        assert_eq!(renderer.touch, TouchCapability::Always);
        assert_eq!(renderer.surface_alpha, SurfaceAlpha::Transparent);
        assert_eq!(renderer.viewport_width, Some(600.0));
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let mut config = SketchConfig::default();
        config.title = "Poster".to_string();
        config.transparent = true;
        apply_overrides(&mut config, &RunArgs::default());
        assert_eq!(config.title, "Poster");
        assert!(config.transparent);
    }

    #[test]
    fn freezing_time_selects_still_policy() {
        let config = SketchConfig {
            frame_interval: Some(Duration::from_millis(20)),
            ..SketchConfig::default()
        };
        assert_eq!(
            render_policy(&config, None),
            RenderPolicy::Animate {
                frame_interval: Some(Duration::from_millis(20))
            }
        );
        assert_eq!(
            render_policy(&config, Some(1200.0)),
            RenderPolicy::Still { millis: 1200.0 }
        );
    }
}
