//! Configuration errors for material tables

use thiserror::Error;

/// Invalid material table or reaction rule. Always fatal at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("material id {id} is registered more than once")]
    DuplicateMaterial { id: u16 },

    #[error("material id 0 is reserved for air (empty, density 0.1)")]
    AirRedefined,

    #[error("unknown material id {id} referenced by {context}")]
    UnknownMaterial { id: u16, context: String },

    #[error("unknown material name '{0}'")]
    UnknownMaterialName(String),

    #[error("material {id} has invalid {property}: {value}")]
    InvalidProperty {
        id: u16,
        property: &'static str,
        value: f32,
    },

    #[error("failed to parse material table: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
