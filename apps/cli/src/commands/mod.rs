pub mod cipher;
pub mod config;
pub mod demo;
pub mod interactive;
pub mod keys;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::config::Config;
use crate::session::Session;

/// Global context passed to all commands
pub struct Context {
    pub json_output: bool,
    pub config_path: Option<PathBuf>,
    pub api_key: Option<String>,
}

impl Context {
    pub fn config(&self) -> Result<Config> {
        Config::from_config(self.config_path.as_ref()).context("Failed to load configuration")
    }

    pub fn open_session(&self) -> Result<Session> {
        let config = self.config()?;
        Session::open(&config, self.api_key.as_deref())
    }
}
