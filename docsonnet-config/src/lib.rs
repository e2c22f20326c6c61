//! Shared configuration loader for the docsonnet tools.
//!
//! `defaults/docsonnet.default.toml` is compiled in, so a bare `docsonnet` run behaves the
//! same everywhere. On top of it [`Loader`] layers `docsonnet.toml` from the working
//! directory, an explicit `--config` file, and the `--format` flag, in that order.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use docsonnet::Opts;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/docsonnet.default.toml");

/// File picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "docsonnet.toml";

/// Top-level configuration consumed by docsonnet applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocsonnetConfig {
    pub jpath: Vec<PathBuf>,
    pub output: OutputConfig,
    pub log: LogConfig,
}

impl DocsonnetConfig {
    /// Extraction options described by this configuration
    pub fn opts(&self) -> Opts {
        Opts::new().jpaths(self.jpath.iter().cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Yaml,
    /// The extracted data, before it is turned into the typed model
    Raw,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

/// Builds a [`DocsonnetConfig`] from the embedded defaults plus whatever the user supplied.
///
/// Sources are layered in call order; later ones override earlier ones key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Picks up [`LOCAL_CONFIG_FILE`] in `dir` if there is one.
    pub fn discover(self, dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(LOCAL_CONFIG_FILE);
        self.layer(&path, false)
    }

    /// Layers a file the user asked for by name; building fails if it's missing.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Replaces the configured output format. Unknown names fail in [`Loader::build`].
    pub fn format(mut self, name: &str) -> Result<Self, ConfigError> {
        self.builder = self.builder.set_override("output.format", name)?;
        Ok(self)
    }

    pub fn build(self) -> Result<DocsonnetConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }
}
