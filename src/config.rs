//! Agent settings for datastore-related paths.
//!
//! Settings are loaded from a TOML file at
//! `<config_dir>/guest-utils/config.toml` (platform-specific `<config_dir>`,
//! e.g. `~/.config` on Linux). The file names the active datastore and the
//! mount point of each datastore's data volume:
//!
//! ```toml
//! datastore = "mysql"
//!
//! [datastores.mysql]
//! mount_point = "/var/lib/mysql"
//!
//! [datastores.postgresql]
//! mount_point = "/var/lib/postgresql"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::debug;

use crate::paths::expand_tilde;

/// Directory under the active mount point holding instance config fragments.
const CONF_DIR_NAME: &str = "conf.d";

/// Top-level settings file structure.
///
/// All fields are optional so a partial file parses cleanly; accessors
/// report what is missing.
#[derive(Deserialize, Default, Debug)]
pub struct Settings {
    /// Name of the active datastore (e.g., `"mysql"`)
    pub datastore: Option<String>,

    /// Per-datastore settings, keyed by datastore name
    #[serde(default)]
    pub datastores: BTreeMap<String, DatastoreSettings>,
}

/// Settings for a single datastore.
#[derive(Deserialize, Default, Debug)]
pub struct DatastoreSettings {
    /// Mount point of the datastore's data volume
    pub mount_point: Option<PathBuf>,
}

impl Settings {
    /// Returns the path where the settings file is expected.
    ///
    /// `None` if the platform config directory cannot be determined.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("guest-utils").join("config.toml"))
    }

    /// Load settings from the default settings file location.
    ///
    /// A missing file yields default (empty) settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or contains
    /// invalid TOML.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file at {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file at {}", path.display()))
    }

    /// The mount point of the active datastore's data volume.
    ///
    /// # Errors
    ///
    /// Returns an error when no datastore is selected, the selected name has
    /// no entry, or its entry has no mount point.
    pub fn mount_point(&self) -> Result<&Path> {
        let name = self
            .datastore
            .as_deref()
            .ok_or_else(|| anyhow!("No active datastore is configured"))?;

        let datastore = self
            .datastores
            .get(name)
            .ok_or_else(|| anyhow!("Unknown datastore {name:?}"))?;

        datastore
            .mount_point
            .as_deref()
            .ok_or_else(|| anyhow!("Datastore {name:?} has no mount point configured"))
    }

    /// The config directory for database-related settings, created on first
    /// use.
    ///
    /// Files inside it are mainly consumed during instance rebuild.
    ///
    /// # Errors
    ///
    /// Returns an error when the mount point is not configured (see
    /// [`Settings::mount_point`]) or the directory cannot be created.
    pub fn conf_dir(&self) -> Result<PathBuf> {
        let conf_dir = expand_tilde(&self.mount_point()?.join(CONF_DIR_NAME));

        if !conf_dir.is_dir() {
            debug!("creating config directory {}", conf_dir.display());
            fs::create_dir_all(&conf_dir).with_context(|| {
                format!("Failed to create config directory {}", conf_dir.display())
            })?;
        }

        Ok(conf_dir)
    }
}
