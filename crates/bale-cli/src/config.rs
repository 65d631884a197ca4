//! Local and global configuration.
//!
//! The local file (`.bale/config.yml`) carries per-workspace settings:
//! the ledger node, the network, the default part and envelope, and the
//! signing keys. The global file (`~/.baleconfig`) carries user-level
//! settings shared by every workspace. Both are plain YAML maps, edited
//! through `bale config` or by hand.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bale_types::{valid_uuid, ArtifactId};

const GLOBAL_CONFIG_FILE: &str = ".baleconfig";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not parseable configuration: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("configuration encoding: {0}")]
    Encode(#[from] serde_yaml::Error),

    #[error("'{0}' is not a configuration key")]
    UnknownKey(String),

    #[error("'{value}' is not a usable value for {key}")]
    InvalidValue { key: String, value: String },

    #[error("HOME is not set; cannot locate the global configuration")]
    NoHome,
}

/// Per-workspace settings.
///
/// UUID-valued keys are kept as strings: empty means unset, and values
/// are validated on `set` rather than on load, so a hand-edited file
/// never blocks unrelated commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// When the configured ledger node stops answering, let `push` ask
    /// the atlas directory for a replacement on its own.
    pub auto_synch: bool,
    pub envelope_uuid: String,
    pub ledger_address: String,
    pub ledger_network: String,
    pub org_uuid: String,
    pub part_uuid: String,
    pub private_key: String,
    pub public_key: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            auto_synch: true,
            envelope_uuid: String::new(),
            ledger_address: String::new(),
            ledger_network: String::new(),
            org_uuid: String::new(),
            part_uuid: String::new(),
            private_key: String::new(),
            public_key: String::new(),
        }
    }
}

impl LocalConfig {
    /// Every key `config --local` accepts, in display order.
    pub const KEYS: [&'static str; 8] = [
        "auto_synch",
        "envelope_uuid",
        "ledger_address",
        "ledger_network",
        "org_uuid",
        "part_uuid",
        "private_key",
        "public_key",
    ];

    /// Read the file at `path`; a missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The default envelope, when one is set and well-formed.
    pub fn envelope(&self) -> Option<ArtifactId> {
        ArtifactId::parse(&self.envelope_uuid).ok()
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "auto_synch" => Ok(self.auto_synch.to_string()),
            "envelope_uuid" => Ok(self.envelope_uuid.clone()),
            "ledger_address" => Ok(self.ledger_address.clone()),
            "ledger_network" => Ok(self.ledger_network.clone()),
            "org_uuid" => Ok(self.org_uuid.clone()),
            "part_uuid" => Ok(self.part_uuid.clone()),
            "private_key" => Ok(self.private_key.clone()),
            "public_key" => Ok(self.public_key.clone()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "auto_synch" => self.auto_synch = parse_bool(key, value)?,
            "envelope_uuid" => self.envelope_uuid = checked_uuid(key, value)?,
            "ledger_address" => self.ledger_address = value.to_string(),
            "ledger_network" => self.ledger_network = value.to_string(),
            "org_uuid" => self.org_uuid = checked_uuid(key, value)?,
            "part_uuid" => self.part_uuid = checked_uuid(key, value)?,
            "private_key" => self.private_key = value.to_string(),
            "public_key" => self.public_key = value.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// User-level settings shared by every workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub atlas_address: String,
    pub user_name: String,
    pub user_email: String,
}

impl GlobalConfig {
    /// Every key `config --global` accepts, in display order.
    pub const KEYS: [&'static str; 3] = ["atlas_address", "user_name", "user_email"];

    /// Read the file at `path`; a missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "atlas_address" => Ok(self.atlas_address.clone()),
            "user_name" => Ok(self.user_name.clone()),
            "user_email" => Ok(self.user_email.clone()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "atlas_address" => self.atlas_address = value.to_string(),
            "user_name" => self.user_name = value.to_string(),
            "user_email" => self.user_email = value.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Path of the user-level config file, `$HOME/.baleconfig`.
pub fn global_config_path() -> Result<PathBuf, ConfigError> {
    global_config_path_from(std::env::var_os("HOME"))
}

fn global_config_path_from(home: Option<OsString>) -> Result<PathBuf, ConfigError> {
    match home {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(GLOBAL_CONFIG_FILE)),
        _ => Err(ConfigError::NoHome),
    }
}

/// UUID-valued keys accept a well-formed UUID or the empty string,
/// which clears the setting.
fn checked_uuid(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() || valid_uuid(value) {
        Ok(value.to_string())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "9d274b22-d11c-4ed1-9ddc-6f1bf059a810";

    #[test]
    fn defaults_enable_auto_synch() {
        let config = LocalConfig::default();
        assert!(config.auto_synch);
        assert!(config.ledger_address.is_empty());
        assert_eq!(config.envelope(), None);
    }

    #[test]
    fn missing_file_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LocalConfig::load(&dir.path().join("config.yml")).unwrap();
        assert_eq!(config, LocalConfig::default());
    }

    #[test]
    fn values_roundtrip_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let mut config = LocalConfig::default();
        config.set("ledger_address", "147.11.176.111:818").unwrap();
        config.set("ledger_network", "zephyr-sc").unwrap();
        config.set("envelope_uuid", UUID).unwrap();
        config.set("auto_synch", "false").unwrap();
        config.save(&path).unwrap();

        let back = LocalConfig::load(&path).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.envelope(), Some(ArtifactId::parse(UUID).unwrap()));
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "ledger_network: zephyr-sc\n").unwrap();

        let config = LocalConfig::load(&path).unwrap();
        assert_eq!(config.ledger_network, "zephyr-sc");
        assert!(config.auto_synch);
        assert!(config.part_uuid.is_empty());
    }

    #[test]
    fn uuid_keys_validate_on_set() {
        let mut config = LocalConfig::default();
        for key in ["envelope_uuid", "org_uuid", "part_uuid"] {
            config.set(key, UUID).unwrap();
            assert_eq!(config.get(key).unwrap(), UUID);

            let err = config.set(key, "not-a-uuid").unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));

            // empty clears the setting
            config.set(key, "").unwrap();
            assert_eq!(config.get(key).unwrap(), "");
        }
    }

    #[test]
    fn auto_synch_parses_booleans_case_insensitively() {
        let mut config = LocalConfig::default();
        config.set("auto_synch", "FALSE").unwrap();
        assert!(!config.auto_synch);
        config.set("auto_synch", "True").unwrap();
        assert!(config.auto_synch);
        assert!(config.set("auto_synch", "maybe").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut config = LocalConfig::default();
        assert!(matches!(
            config.get("color_scheme").unwrap_err(),
            ConfigError::UnknownKey(_)
        ));
        assert!(matches!(
            config.set("color_scheme", "dark").unwrap_err(),
            ConfigError::UnknownKey(_)
        ));
    }

    #[test]
    fn every_listed_key_is_gettable() {
        let local = LocalConfig::default();
        for key in LocalConfig::KEYS {
            local.get(key).unwrap();
        }
        let global = GlobalConfig::default();
        for key in GlobalConfig::KEYS {
            global.get(key).unwrap();
        }
    }

    #[test]
    fn global_config_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".baleconfig");

        let mut config = GlobalConfig::default();
        config.set("atlas_address", "atlas.example.org:811").unwrap();
        config.set("user_name", "Robin").unwrap();
        config.save(&path).unwrap();

        let back = GlobalConfig::load(&path).unwrap();
        assert_eq!(back.atlas_address, "atlas.example.org:811");
        assert_eq!(back.user_name, "Robin");
        assert!(back.user_email.is_empty());
    }

    #[test]
    fn global_path_hangs_off_home() {
        let path = global_config_path_from(Some(OsString::from("/home/robin"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/robin/.baleconfig"));
    }

    #[test]
    fn missing_home_is_an_error() {
        assert!(matches!(
            global_config_path_from(None).unwrap_err(),
            ConfigError::NoHome
        ));
        assert!(matches!(
            global_config_path_from(Some(OsString::new())).unwrap_err(),
            ConfigError::NoHome
        ));
    }
}
