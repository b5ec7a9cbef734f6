use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;
pub const CONFIG_FILE_NAME: &str = "reefer.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputMode {
    #[default]
    Direct,
    DragGated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchSetting {
    /// Assume no touch until the first touch event arrives.
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SketchConfig {
    pub version: u32,
    pub title: String,
    pub image: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub input: InputMode,
    #[serde(
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_interval: Option<Duration>,
    /// Let the desktop show through cleared pixels where the compositor allows.
    pub transparent: bool,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    pub mobile_breakpoint: f64,
    pub mobile_width: f64,
    pub desktop_width: f64,
    #[serde(deserialize_with = "deserialize_touch")]
    pub touch: TouchSetting,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport_width: Option<f64>,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            title: "Coming soon".to_string(),
            image: PathBuf::from("assets/images/coming-soon.png"),
            vertex_shader: PathBuf::from("assets/scripts/reefer.vert"),
            fragment_shader: PathBuf::from("assets/scripts/reefer.frag"),
            input: InputMode::default(),
            frame_interval: None,
            transparent: false,
            layout: Layout::default(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            mobile_width: 300.0,
            desktop_width: 500.0,
            touch: TouchSetting::default(),
            viewport_width: None,
        }
    }
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of milliseconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_millis(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_millis(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v / 1000.0)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serializer.serialize_str(&humantime::format_duration(*duration).to_string()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_touch<'de, D>(deserializer: D) -> Result<TouchSetting, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Flag(bool),
        Str(String),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Flag(true) => Ok(TouchSetting::On),
        Helper::Flag(false) => Ok(TouchSetting::Off),
        Helper::Str(raw) => parse_touch(&raw).map_err(de::Error::custom),
    }
}

pub fn parse_touch(raw: &str) -> Result<TouchSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "detect" => Ok(TouchSetting::Auto),
        "on" | "true" | "yes" => Ok(TouchSetting::On),
        "off" | "false" | "no" => Ok(TouchSetting::Off),
        other => Err(format!("invalid touch setting '{other}'; expected auto, on or off")),
    }
}

pub fn parse_input_mode(raw: &str) -> Result<InputMode, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "direct" => Ok(InputMode::Direct),
        "drag-gated" | "drag_gated" | "drag" => Ok(InputMode::DragGated),
        other => Err(format!(
            "invalid input mode '{other}'; expected direct or drag-gated"
        )),
    }
}

impl SketchConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SketchConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads a config file and anchors relative asset paths at its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.anchor_paths(base);
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn anchor_paths(&mut self, base: &Path) {
        for path in [
            &mut self.image,
            &mut self.vertex_shader,
            &mut self.fragment_shader,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        for (field, path) in [
            ("image", &self.image),
            ("vertex_shader", &self.vertex_shader),
            ("fragment_shader", &self.fragment_shader),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} path must not be empty")));
            }
        }

        if let Some(interval) = self.frame_interval {
            if interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "frame_interval must be greater than zero".into(),
                ));
            }
        }

        self.layout.validate()
    }
}

impl Layout {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("mobile_width", self.mobile_width),
            ("desktop_width", self.desktop_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "layout.{field} must be a positive number of pixels"
                )));
            }
        }

        if !self.mobile_breakpoint.is_finite() || self.mobile_breakpoint < 0.0 {
            return Err(ConfigError::Invalid(
                "layout.mobile_breakpoint must be >= 0".into(),
            ));
        }

        if let Some(width) = self.viewport_width {
            if !width.is_finite() || width <= 0.0 {
                return Err(ConfigError::Invalid(
                    "layout.viewport_width must be a positive number of pixels".into(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1
title = "Reefer"
image = "art/poster.png"
vertex_shader = "glsl/reefer.vert"
fragment_shader = "glsl/reefer.frag"
input = "drag-gated"
frame_interval = "20ms"
transparent = true

[layout]
mobile_breakpoint = 900
mobile_width = 320
desktop_width = 640
touch = true
viewport_width = 1400
"#;

    #[test]
    fn parses_sample_config() {
        let config = SketchConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.title, "Reefer");
        assert_eq!(config.input, InputMode::DragGated);
        assert_eq!(config.frame_interval, Some(Duration::from_millis(20)));
        assert!(config.transparent);
        assert_eq!(config.layout.mobile_breakpoint, 900.0);
        assert_eq!(config.layout.touch, TouchSetting::On);
        assert_eq!(config.layout.viewport_width, Some(1400.0));
    }

    #[test]
    fn empty_file_matches_stock_sketch() {
        let config = SketchConfig::from_toml_str("").unwrap();
        assert_eq!(config, SketchConfig::default());
        assert_eq!(config.layout.mobile_width, 300.0);
        assert_eq!(config.layout.desktop_width, 500.0);
        assert_eq!(config.layout.mobile_breakpoint, 768.0);
        assert_eq!(config.input, InputMode::Direct);
        assert_eq!(config.layout.touch, TouchSetting::Auto);
        assert!(!config.transparent);
    }

    #[test]
    fn numeric_frame_interval_is_milliseconds() {
        let config = SketchConfig::from_toml_str("frame_interval = 33").unwrap();
        assert_eq!(config.frame_interval, Some(Duration::from_millis(33)));
    }

    #[test]
    fn touch_accepts_strings() {
        let config = SketchConfig::from_toml_str("[layout]\ntouch = \"off\"").unwrap();
        assert_eq!(config.layout.touch, TouchSetting::Off);
        assert!(SketchConfig::from_toml_str("[layout]\ntouch = \"sometimes\"").is_err());
    }

    #[test]
    fn rejects_wrong_version() {
        let err = SketchConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_widths() {
        let err = SketchConfig::from_toml_str("[layout]\nmobile_width = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = SketchConfig::from_toml_str("[layout]\ndesktop_width = -5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_empty_paths_and_unknown_fields() {
        let err = SketchConfig::from_toml_str("image = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = SketchConfig::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rendered_config_parses_back() {
        let config = SketchConfig::from_toml_str(SAMPLE).unwrap();
        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("frame_interval = \"20ms\""));
        assert!(rendered.contains("touch = \"on\""));
        assert_eq!(SketchConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn load_anchors_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "image = \"poster.png\"\nvertex_shader = \"/abs/v.vert\"").unwrap();

        let config = SketchConfig::load(&path).unwrap();
        assert_eq!(config.image, dir.path().join("poster.png"));
        assert_eq!(config.vertex_shader, PathBuf::from("/abs/v.vert"));
        assert_eq!(
            config.fragment_shader,
            dir.path().join("assets/scripts/reefer.frag")
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SketchConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn input_mode_parser_accepts_aliases() {
        assert_eq!(parse_input_mode("Drag"), Ok(InputMode::DragGated));
        assert_eq!(parse_input_mode("direct"), Ok(InputMode::Direct));
        assert!(parse_input_mode("hover").is_err());
    }
}
