//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use mealkit_commerce::cart::{CartHandle, CartLedger};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, checked in order in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["mealkit.toml", ".mealkit.toml", "mealkit.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the config came from (or should go to), if any.
    pub config_path: Option<PathBuf>,
    /// Why the config file could not be loaded, when `config` holds defaults instead.
    pub load_error: Option<anyhow::Error>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file. A missing or unparsable file is an error.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let mut ctx = Self::load_lenient(config_path, output)?;
        match ctx.load_error.take() {
            Some(e) => Err(e),
            None => Ok(ctx),
        }
    }

    /// Load context, falling back to defaults when the config file is
    /// missing or broken. Used by the `config` commands so they can repair it.
    pub fn load_lenient(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::in_dir(cwd, config_path, output))
    }

    fn in_dir(cwd: PathBuf, config_path: Option<&str>, output: Output) -> Self {
        let config_path = match config_path {
            Some(path) => Some(resolve(&cwd, path)),
            None => find_config(&cwd),
        };

        let (config, load_error) = match &config_path {
            Some(path) => match CliConfig::load(path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    (config, None)
                }
                Err(e) => (CliConfig::default(), Some(e)),
            },
            None => (CliConfig::default(), None),
        };

        Self {
            config,
            config_path,
            load_error,
            output,
            cwd,
        }
    }

    /// A fresh cart using the configured currency and per-item limit.
    pub fn new_cart(&self) -> Result<CartHandle> {
        let ledger = CartLedger::new(self.config.currency()?)
            .with_max_per_item(self.config.store.max_per_item);
        Ok(CartHandle::new(ledger))
    }

    /// Where `config init` writes: the selected config file, else
    /// `mealkit.toml` in the working directory.
    pub fn init_target(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.cwd.join(CONFIG_NAMES[0]))
    }
}

/// Resolve a path relative to `cwd`.
fn resolve(cwd: &Path, path: &str) -> PathBuf {
    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        cwd.join(path)
    }
}

/// Find a config file in `start` or its ancestors.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
