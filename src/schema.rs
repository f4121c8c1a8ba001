//! Schema module: declares the fields a document type exposes to queries.
//!
//! This module provides the DocumentSchema type and builder. Nested fields are
//! declared by their dotted path, e.g. `Address.City`.

use crate::types::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DocumentSchema {
    fields: HashMap<String, FieldType>,
    field_names: Vec<String>, // sorted
}

impl DocumentSchema {
    pub fn get_field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    /// Looks up a field by its path segments.
    pub fn field_at(&self, path: &[String]) -> Option<&FieldType> {
        self.fields.get(&path.join("."))
    }

    pub fn fields(&self) -> &HashMap<String, FieldType> {
        &self.fields
    }

    /// Field paths in sorted order.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn num_fields(&self) -> usize {
        self.field_names.len()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DocumentSchemaBuilder {
    fields: HashMap<String, FieldType>,
}

impl DocumentSchemaBuilder {
    pub fn new() -> Self {
        Self { fields: HashMap::new() }
    }

    pub fn field(mut self, path: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(path.into(), ty);
        self
    }

    pub fn build(self) -> DocumentSchema {
        let mut field_names: Vec<_> = self.fields.keys().cloned().collect();
        field_names.sort();
        DocumentSchema {
            fields: self.fields,
            field_names,
        }
    }
}
