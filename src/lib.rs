pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::{toml_config::TomlConfig, RecordsJob};
pub use crate::core::{
    coalesce::{coalesce, coalesce_by, coalesce_or, coalesce_values},
    engine::CoalesceEngine,
    record::{coalesce_fields, RecordCoalescer},
};
pub use domain::{
    model::{CoalesceRule, Record},
    truthy::Truthy,
    value::Value,
};
pub use utils::error::{CoalesceError, Result};
