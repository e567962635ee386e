//! Config resolution: built-in defaults → `vtkwrap.toml` → CLI flags,
//! lowest to highest precedence, mirroring the layering `seqc`'s `--config`
//! flag gives CLI overrides over a project file.

use crate::error::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The subset of job configuration a `vtkwrap.toml` project file may set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub hints: Option<PathBuf>,
    pub hierarchy: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl FileConfig {
    /// Loads `path` if it exists; a missing config file is not an error,
    /// since the file is optional at every precedence level above it.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| Error::Config(e.to_string()))
    }
}

/// The built-in defaults, lowest precedence.
fn default_output() -> PathBuf {
    PathBuf::from("out.xml")
}

/// The final, fully-resolved configuration for one `wrap` invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub hints: Option<PathBuf>,
    pub hierarchy: Option<PathBuf>,
    pub output: PathBuf,
}

impl ResolvedConfig {
    /// Layers `file` under the CLI-supplied overrides; a `Some` CLI value
    /// always wins, then a `Some` file value, then the built-in default.
    #[must_use]
    pub fn resolve(
        file: &FileConfig,
        cli_hints: Option<PathBuf>,
        cli_hierarchy: Option<PathBuf>,
        cli_output: Option<PathBuf>,
    ) -> Self {
        ResolvedConfig {
            hints: cli_hints.or_else(|| file.hints.clone()),
            hierarchy: cli_hierarchy.or_else(|| file.hierarchy.clone()),
            output: cli_output.or_else(|| file.output.clone()).unwrap_or_else(default_output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_overrides_file_value() {
        let file = FileConfig { output: Some(PathBuf::from("file.xml")), ..Default::default() };
        let resolved = ResolvedConfig::resolve(&file, None, None, Some(PathBuf::from("cli.xml")));
        assert_eq!(resolved.output, PathBuf::from("cli.xml"));
    }

    #[test]
    fn file_value_overrides_default() {
        let file = FileConfig { output: Some(PathBuf::from("file.xml")), ..Default::default() };
        let resolved = ResolvedConfig::resolve(&file, None, None, None);
        assert_eq!(resolved.output, PathBuf::from("file.xml"));
    }

    #[test]
    fn default_used_when_nothing_else_set() {
        let resolved = ResolvedConfig::resolve(&FileConfig::default(), None, None, None);
        assert_eq!(resolved.output, default_output());
    }

    #[test]
    fn missing_config_file_is_not_an_error() {
        let file = FileConfig::load(Path::new("/nonexistent/vtkwrap.toml")).unwrap();
        assert!(file.output.is_none());
    }
}
