//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Standard locations searched when no path is given, in order.
const CANDIDATES: [&str; 3] = [
    "infraplan.toml",
    ".infraplan.toml",
    ".config/infraplan.toml",
];

/// Loaded configuration and where it came from
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings were read from, `None` for built-in defaults
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path, the first standard location that
    /// exists, or built-in defaults.
    ///
    /// An explicit path that does not exist is an error; a missing standard
    /// location is not.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                let p = PathBuf::from(p);
                if !p.exists() {
                    return Err(Error::config_not_found(&p));
                }
                Some(p)
            }
            None => find_config_file(Path::new(".")),
        };

        match config_path {
            Some(p) => Self::from_file(&p),
            None => {
                tracing::debug!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read, parse and validate a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::from(e).with_context(format!("Failed to read config file {}", path.display()))
        })?;

        let schema = parse(&content)
            .map_err(|e| e.with_context(format!("In config file {}", path.display())))?;

        tracing::debug!(path = %path.display(), "loaded configuration");

        Ok(Self {
            schema,
            path: Some(path.to_path_buf()),
        })
    }
}

/// Parse and validate TOML configuration text
pub fn parse(content: &str) -> Result<ConfigSchema> {
    let schema: ConfigSchema = toml::from_str(content)?;
    schema.validate().map_err(|mut e| {
        if e.code == ErrorCode::InvalidConfigValue {
            e.code = ErrorCode::ConfigValidationError;
        }
        e
    })?;
    Ok(schema)
}

/// Find configuration file in standard locations under `root`
fn find_config_file(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|p| p.is_file())
}
