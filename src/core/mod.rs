pub mod coalesce;
pub mod engine;
pub mod record;

pub use crate::domain::model::{CoalesceRule, Record};
pub use crate::domain::truthy::Truthy;
pub use crate::domain::value::Value;
pub use crate::utils::error::Result;
