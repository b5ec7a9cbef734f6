use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;
use sketchconfig::CONFIG_FILE_NAME;

pub const ENV_CONFIG: &str = "REEFER_CONFIG";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Reefer";
const APPLICATION: &str = "reefer";

/// Where the config path was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Flag,
    Env,
    UserDir,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Flag => f.write_str("--config"),
            ConfigOrigin::Env => write!(f, "${ENV_CONFIG}"),
            ConfigOrigin::UserDir => f.write_str("user config directory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    path: PathBuf,
    origin: ConfigOrigin,
}

impl ConfigPath {
    /// `--config`, then `$REEFER_CONFIG`, then `reefer.toml` in the user
    /// config directory.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path.to_path_buf(), ConfigOrigin::Flag));
        }
        if let Some(path) = env_override(ENV_CONFIG) {
            return Ok(Self::new(path, ConfigOrigin::Env));
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self::new(
            project_dirs.config_dir().join(CONFIG_FILE_NAME),
            ConfigOrigin::UserDir,
        ))
    }

    fn new(path: PathBuf, origin: ConfigOrigin) -> Self {
        Self { path, origin }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> ConfigOrigin {
        self.origin
    }

    /// Only the user directory may be absent; a path someone named must exist.
    pub fn is_optional(&self) -> bool {
        self.origin == ConfigOrigin::UserDir
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.as_os_str().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }

        fn clear(key: &'static str) -> Self {
            let previous = env::var_os(key);
            env::remove_var(key);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn flag_beats_environment() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _env = EnvGuard::set(ENV_CONFIG, &root.path().join("env.toml"));

        let flag = root.path().join("flag.toml");
        let found = ConfigPath::discover(Some(&flag)).unwrap();
        assert_eq!(found.path(), flag.as_path());
        assert_eq!(found.origin(), ConfigOrigin::Flag);
        assert!(!found.is_optional());
    }

    #[test]
    fn environment_beats_user_dir() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let env_path = root.path().join("env.toml");
        let _env = EnvGuard::set(ENV_CONFIG, &env_path);

        let found = ConfigPath::discover(None).unwrap();
        assert_eq!(found.path(), env_path.as_path());
        assert_eq!(found.origin(), ConfigOrigin::Env);
    }

    #[test]
    fn falls_back_to_user_config_dir() {
        let _guard = env_lock().lock().unwrap();
        let _env = EnvGuard::clear(ENV_CONFIG);

        let found = ConfigPath::discover(None).unwrap();
        assert_eq!(found.origin(), ConfigOrigin::UserDir);
        assert!(found.path().ends_with(CONFIG_FILE_NAME));
        assert!(found.is_optional());
    }
}
