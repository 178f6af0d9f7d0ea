use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::stage::Stage;

/// Template identifier, unique across the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

/// Property identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

macro_rules! id_impls {
    ($ty:ident) => {
        impl $ty {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                $ty(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                $ty(s)
            }
        }
    };
}

id_impls!(TemplateId);
id_impls!(PropertyId);

/// An email template owned by one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub owner_id: PropertyId,
    pub name: String,
    pub stage: Stage,
    /// Editable markup body
    pub source: String,
}

impl Template {
    /// Case-insensitive match on the (owner, stage, name) uniqueness key
    pub fn collides_with(&self, owner_id: &PropertyId, stage: Stage, name: &str) -> bool {
        &self.owner_id == owner_id
            && self.stage == stage
            && self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A managed hotel property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub location: String,
    pub image_url: String,
}

/// Input for the add-property flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub name: String,
    pub location: String,
    pub image_url: String,
}

impl NewProperty {
    /// All three fields are required
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Property name", &self.name)?;
        require("Location", &self.location)?;
        require("Image", &self.image_url)?;
        Ok(())
    }

    pub fn into_property(self, id: PropertyId) -> Property {
        Property {
            id,
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
        }
    }
}

/// Returns the trimmed value, or `EmptyField` if nothing is left
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(trimmed)
    }
}
