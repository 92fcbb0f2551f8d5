use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rolodex_core::domain::UserId;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "rolodex";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_OWNER: i64 = 1;
pub const DEFAULT_MAX_DISPLAYED_ERRORS: usize = 10;
pub const DEFAULT_API_KEY_ENV: &str = "ROLODEX_DIRECTORY_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DIRECTORY_URL_ENV: &str = "ROLODEX_DIRECTORY_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// User whose contacts commands act on when `--owner` is not given.
    pub owner: UserId,
    pub import: ImportConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub max_displayed_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub url: Option<String>,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl DirectoryConfig {
    /// The API key is never stored in the file, only named by it.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            owner: UserId::new(DEFAULT_OWNER),
            import: ImportConfig {
                max_displayed_errors: DEFAULT_MAX_DISPLAYED_ERRORS,
            },
            directory: DirectoryConfig {
                url: None,
                api_key_env: DEFAULT_API_KEY_ENV.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                user_agent: None,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid owner value: {0}")]
    InvalidOwner(i64),
    #[error("invalid import.max_displayed_errors value: {0}")]
    InvalidMaxDisplayedErrors(usize),
    #[error("invalid directory.timeout_secs value: {0}")]
    InvalidTimeout(u64),
    #[error("invalid directory.{field} value: {value:?}")]
    InvalidDirectoryValue { field: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    owner: Option<i64>,
    import: Option<ImportFile>,
    directory: Option<DirectoryFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportFile {
    max_displayed_errors: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryFile {
    url: Option<String>,
    api_key_env: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

/// Loads the config file (required when a path is given explicitly), then
/// applies environment overrides.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let config = load_file(config_path)?;
    Ok(apply_env(config, |key| env::var(key).ok()))
}

fn load_file(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(owner) = parsed.owner {
        if owner <= 0 {
            return Err(ConfigError::InvalidOwner(owner));
        }
        config.owner = UserId::new(owner);
    }

    if let Some(import) = parsed.import {
        if let Some(limit) = import.max_displayed_errors {
            if limit == 0 {
                return Err(ConfigError::InvalidMaxDisplayedErrors(limit));
            }
            config.import.max_displayed_errors = limit;
        }
    }

    if let Some(directory) = parsed.directory {
        if let Some(url) = directory.url {
            config.directory.url = Some(non_blank("url", url)?);
        }
        if let Some(api_key_env) = directory.api_key_env {
            config.directory.api_key_env = non_blank("api_key_env", api_key_env)?;
        }
        if let Some(timeout) = directory.timeout_secs {
            if timeout == 0 {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
            config.directory.timeout_secs = timeout;
        }
        if let Some(user_agent) = directory.user_agent {
            config.directory.user_agent = Some(non_blank("user_agent", user_agent)?);
        }
    }

    Ok(config)
}

fn apply_env<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(DIRECTORY_URL_ENV) {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            config.directory.url = Some(trimmed.to_string());
        }
    }
    config
}

fn non_blank(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidDirectoryValue { field, value });
    }
    Ok(trimmed.to_string())
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        apply_env, load_at_path, merge_config, AppConfig, ConfigError, ConfigFile, DirectoryFile,
        ImportFile, DEFAULT_API_KEY_ENV, DIRECTORY_URL_ENV,
    };
    use rolodex_core::domain::UserId;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.owner, UserId::new(1));
        assert_eq!(config.import.max_displayed_errors, 10);
        assert_eq!(config.directory.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.directory.timeout_secs, 30);
        assert_eq!(config.directory.url, None);
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            owner: Some(7),
            import: Some(ImportFile {
                max_displayed_errors: Some(3),
            }),
            directory: Some(DirectoryFile {
                url: Some(" https://admin.example.com ".to_string()),
                api_key_env: Some("ADMIN_API_KEY".to_string()),
                timeout_secs: Some(5),
                user_agent: None,
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.owner, UserId::new(7));
        assert_eq!(merged.import.max_displayed_errors, 3);
        assert_eq!(
            merged.directory.url.as_deref(),
            Some("https://admin.example.com")
        );
        assert_eq!(merged.directory.api_key_env, "ADMIN_API_KEY");
        assert_eq!(merged.directory.timeout_secs, 5);
    }

    #[test]
    fn merge_config_rejects_out_of_range_values() {
        let err = merge_config(ConfigFile {
            owner: Some(0),
            ..ConfigFile::default()
        })
        .expect_err("owner");
        assert!(matches!(err, ConfigError::InvalidOwner(0)));

        let err = merge_config(ConfigFile {
            import: Some(ImportFile {
                max_displayed_errors: Some(0),
            }),
            ..ConfigFile::default()
        })
        .expect_err("limit");
        assert!(matches!(err, ConfigError::InvalidMaxDisplayedErrors(0)));

        let err = merge_config(ConfigFile {
            directory: Some(DirectoryFile {
                timeout_secs: Some(0),
                ..DirectoryFile::default()
            }),
            ..ConfigFile::default()
        })
        .expect_err("timeout");
        assert!(matches!(err, ConfigError::InvalidTimeout(0)));
    }

    #[test]
    fn env_overrides_directory_url() {
        let config = apply_env(AppConfig::default(), |key| {
            (key == DIRECTORY_URL_ENV).then(|| "https://env.example.com".to_string())
        });
        assert_eq!(
            config.directory.url.as_deref(),
            Some("https://env.example.com")
        );

        let untouched = apply_env(AppConfig::default(), |_| Some("   ".to_string()));
        assert_eq!(untouched.directory.url, None);
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
        assert!(load_at_path(&missing, false).expect("optional").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "owner = 4\n[import]\nmax_displayed_errors = 20\n[directory]\nurl = \"https://admin.example.com/\"\ntimeout_secs = 10\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.owner, UserId::new(4));
        assert_eq!(config.import.max_displayed_errors, 20);
        assert_eq!(config.directory.timeout_secs, 10);
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "due_soon_days = 5\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn load_at_path_rejects_shared_files() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "owner = 2\n").expect("write config");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&path, perms).expect("chmod");

        let err = load_at_path(&path, true).expect_err("permissions");
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
