//! Filesystem path construction helpers.

use std::path::{Path, PathBuf};

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
///
/// # Examples
///
/// ```
/// # use std::path::PathBuf;
/// # use guest_utils::paths::expand_tilde;
/// let absolute = PathBuf::from("/etc/mysql");
/// assert_eq!(expand_tilde(&absolute), PathBuf::from("/etc/mysql"));
/// ```
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

/// Build a path to a file in a given directory.
///
/// The file name is the base name joined with each extension by `.`, so
/// `build_file_path("/etc/mysql", "my", &["cnf", "bak"])` yields
/// `/etc/mysql/my.cnf.bak`. A leading `~` in the directory is expanded to
/// the user's home directory.
#[must_use]
pub fn build_file_path(base_dir: &Path, base_name: &str, extensions: &[&str]) -> PathBuf {
    let file_name = std::iter::once(base_name)
        .chain(extensions.iter().copied())
        .collect::<Vec<_>>()
        .join(".");
    expand_tilde(&base_dir.join(file_name))
}
