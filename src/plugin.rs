use crate::error::{SetupError, SetupResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

pub const PLUGINS_DIR: &str = "plugins";
pub const BSTATS_DIR: &str = "bStats";
pub const BSTATS_CONFIG: &str = "config.yml";

const BSTATS_DISABLED: &str = "enabled: false";

/// Copies each plugin into `plugins_dir` under its own file name, replacing any
/// plugin of the same name. Returns the destination paths.
#[instrument(level = "debug", skip(plugins))]
pub fn copy_plugins(plugins_dir: &Path, plugins: &[PathBuf]) -> SetupResult<Vec<PathBuf>> {
    fs::create_dir_all(plugins_dir).map_err(SetupError::io(plugins_dir))?;

    let mut copied = Vec::with_capacity(plugins.len());
    for plugin in plugins {
        let Some(name) = plugin.file_name() else {
            return Err(SetupError::Io {
                path: plugin.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "plugin path has no file name"),
            });
        };

        let dest = plugins_dir.join(name);
        println!("🔌 Adding plugin: {}", plugin.display());
        let bytes = fs::copy(plugin, &dest).map_err(SetupError::io(plugin))?;
        debug!(dest = %dest.display(), bytes);
        copied.push(dest);
    }

    Ok(copied)
}

/// Opts the server out of bStats unless a bStats config already exists.
/// Returns whether the config was written.
pub fn disable_bstats(plugins_dir: &Path) -> SetupResult<bool> {
    let bstats_dir = plugins_dir.join(BSTATS_DIR);
    fs::create_dir_all(&bstats_dir).map_err(SetupError::io(&bstats_dir))?;

    let config = bstats_dir.join(BSTATS_CONFIG);
    if config.exists() {
        return Ok(false);
    }

    fs::write(&config, BSTATS_DISABLED).map_err(SetupError::io(&config))?;
    println!("📊 Disabled bStats metrics");
    Ok(true)
}
