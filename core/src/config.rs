use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,

    /// Shell used as `<shell> -c <command>`.
    pub shell: PathBuf,

    /// Variable through which the run command learns its feedback file path.
    pub feedback_var: String,

    /// Overrides the host temp root for the feedback directory.
    pub temp_root: Option<PathBuf>,

    /// Extra variables merged into the baseline environment.
    pub env: BTreeMap<String, String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            source_config_file: None,
            shell: PathBuf::from(Self::DEFAULT_SHELL),
            feedback_var: Self::DEFAULT_FEEDBACK_VAR.to_owned(),
            temp_root: None,
            env: BTreeMap::new(),
        }
    }
}

impl HarnessConfig {
    pub const FILENAME: &str = "autograde.toml";
    pub const DEFAULT_SHELL: &str = "/bin/sh";
    pub const DEFAULT_FEEDBACK_VAR: &str = "AUTOGRADER_FEEDBACK_PATH";

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// Loads the nearest config file, or the defaults when there is none.
    pub fn from_file_finding_in_ancestors_or_default(
        cur_dir: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        match Self::find_file_in_ancestors(cur_dir) {
            Some(path) => {
                log::debug!("Using config {:?}", path);
                Self::from_toml_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}
