use std::path::Path;

use anyhow::{Context, Result};
use clinic_core::CalendarConfig;
use config::{Config, Environment, File};

/// Defaults, overlaid by the optional file, overlaid by `CLINIC_*` variables.
pub fn load_config(path: Option<&Path>) -> Result<CalendarConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }

    let settings = builder
        .add_source(Environment::with_prefix("CLINIC").try_parsing(true))
        .build()
        .context("cannot assemble configuration")?;

    settings
        .try_deserialize()
        .context("invalid calendar configuration")
}
