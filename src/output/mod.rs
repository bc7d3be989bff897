// Output generation module

pub mod diagrams;
pub mod templates;

pub use diagrams::*;
pub use templates::*;

use crate::error::Result;
use crate::model::RepositoryModel;

/// Serialize the model as pretty-printed JSON
pub fn to_json(model: &RepositoryModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}
