//! Configuration loader: assembles sources in precedence order and deserializes.

use crate::config::merge::merge_policy;
use crate::config::sources::{global_file, local_file};
use crate::config::TokenmixConfig;
use config::ConfigError;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, `tokenmix.toml` in `working_dir`, then environment.
    pub fn load(working_dir: &Path) -> Result<TokenmixConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = local_file::add_to_builder(builder, working_dir)?;
        builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()
    }

    /// Defaults, the given file, then environment. The global and local files are skipped.
    pub fn load_from_file(path: &Path) -> Result<TokenmixConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = local_file::add_required_to_builder(builder, path)?;
        builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()
    }

    /// `load_from_file` when a path is given, `load` otherwise.
    pub fn resolve(explicit: Option<&Path>, working_dir: &Path) -> Result<TokenmixConfig, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => Self::load(working_dir),
        }
    }
}
