//! Mapping module: resolves document member accesses to backend locators.
//!
//! The translators only ever call [`DocumentMapping::resolve_locator`]. The
//! [`JsonbMapping`] provided here targets PostgreSQL documents stored in a
//! `jsonb` column.

use crate::expr::MemberAccess;
use crate::schema::DocumentSchema;
use crate::types::FieldType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("unknown document field '{0}'")]
    UnknownField(String),
    #[error("member access has an empty path")]
    EmptyPath,
    #[error("field '{field}' is declared as {declared} but accessed as {accessed}")]
    TypeMismatch {
        field: String,
        declared: String,
        accessed: String,
    },
}

/// Field locator resolution for one document type.
pub trait DocumentMapping: Send + Sync {
    fn resolve_locator(&self, member: &MemberAccess) -> Result<String, ResolutionError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    /// Keys are stored exactly as declared.
    #[default]
    AsIs,
    /// The first character of each key is lowercased.
    CamelCase,
}

impl Casing {
    pub fn apply(self, key: &str) -> String {
        match self {
            Casing::AsIs => key.to_string(),
            Casing::CamelCase => {
                let mut chars = key.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// SQL expression naming the document column, e.g. `d.data`.
    pub data_column: String,
    pub casing: Casing,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            data_column: "d.data".to_string(),
            casing: Casing::AsIs,
        }
    }
}

impl MappingConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Locators over a `jsonb` document column, checked against a schema.
#[derive(Debug, Clone)]
pub struct JsonbMapping {
    schema: DocumentSchema,
    config: MappingConfig,
}

impl JsonbMapping {
    pub fn new(schema: DocumentSchema, config: MappingConfig) -> Self {
        Self { schema, config }
    }

    fn quote_key(&self, key: &str) -> String {
        format!("'{}'", self.config.casing.apply(key).replace('\'', "''"))
    }
}

impl DocumentMapping for JsonbMapping {
    fn resolve_locator(&self, member: &MemberAccess) -> Result<String, ResolutionError> {
        let (last, parents) = member.path.split_last().ok_or(ResolutionError::EmptyPath)?;
        let ty = self
            .schema
            .field_at(&member.path)
            .ok_or_else(|| ResolutionError::UnknownField(member.dotted()))?;
        // The locator's arrow and cast follow the schema, so the access must agree.
        if member.ty != *ty {
            return Err(ResolutionError::TypeMismatch {
                field: member.dotted(),
                declared: ty.to_string(),
                accessed: member.ty.to_string(),
            });
        }

        let mut locator = self.config.data_column.clone();
        for segment in parents {
            locator.push_str(" -> ");
            locator.push_str(&self.quote_key(segment));
        }
        // Arrays stay jsonb so containment compares like with like.
        let arrow = if ty.is_array() { " -> " } else { " ->> " };
        locator.push_str(arrow);
        locator.push_str(&self.quote_key(last));

        Ok(match ty {
            FieldType::Int => format!("CAST({} as integer)", locator),
            FieldType::Float => format!("CAST({} as double precision)", locator),
            FieldType::Bool => format!("CAST({} as boolean)", locator),
            _ => locator,
        })
    }
}
