//! Attribute - typed dimension of a user/request profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Data type of a profile attribute.
///
/// Unknown wire values are rejected at the serde boundary; there is no
/// catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// True/false dimension.
    Boolean,
    /// Free-form string dimension.
    String,
    /// Integer-valued dimension.
    Number,
    /// Closed set of string options; requires at least one option.
    Enum,
}

/// A typed dimension of a user/request profile usable inside targeting
/// conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Unique identifier.
    pub id: u32,
    /// Unique attribute name; this is the symbol bound in compiled
    /// constraints.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Declared data type.
    pub data_type: DataType,
    /// Whether this attribute may be used for experiment bucketing.
    #[serde(default)]
    pub hash_attribute: bool,
    /// Allowed values when `data_type` is [`DataType::Enum`].
    #[serde(default)]
    pub enum_options: Vec<String>,
    /// Number of segments/parameters referencing this attribute.
    #[serde(default)]
    pub usage_count: i64,
    /// Creation timestamp, if known.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-update timestamp, if known.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Attribute {
    /// Create an attribute with the given id, name, and data type.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            data_type,
            hash_attribute: false,
            enum_options: Vec::new(),
            usage_count: 0,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    /// Validate structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is empty or if the
    /// attribute is enum-typed without declaring any options.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("attribute name must not be empty".into()));
        }
        if self.data_type == DataType::Enum && self.enum_options.is_empty() {
            return Err(Error::Validation(format!(
                "enum attribute '{}' must declare at least one option",
                self.name
            )));
        }
        Ok(())
    }
}
