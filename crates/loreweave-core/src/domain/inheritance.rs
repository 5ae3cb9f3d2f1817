//! Inheritance flattening.
//!
//! A model's effective field list is every base's flattened list, in `bases`
//! order, followed by its own fields. A later field with an existing name
//! takes over that name's slot, so the position is the first occurrence and
//! the content is the last.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::error::DomainError;
use super::schema::{FieldSchema, ModelSchema, SchemaSet};

/// Deepest base chain followed before giving up.
pub const MAX_INHERITANCE_DEPTH: usize = 256;

/// Flattens models of one schema, memoizing each result.
#[derive(Debug)]
pub struct InheritanceResolver<'s> {
    schema: &'s SchemaSet,
    resolved: HashMap<String, Vec<FieldSchema>>,
}

impl<'s> InheritanceResolver<'s> {
    pub fn new(schema: &'s SchemaSet) -> Self {
        Self {
            schema,
            resolved: HashMap::new(),
        }
    }

    /// Flattened field list of `model`.
    ///
    /// # Errors
    ///
    /// - `UnknownModel` if `model` is not in the schema
    /// - `InheritanceCycle` if the base chain loops back on itself or runs
    ///   past [`MAX_INHERITANCE_DEPTH`]
    pub fn flatten(&mut self, model: &str) -> Result<&[FieldSchema], DomainError> {
        if !self.schema.contains(model) {
            return Err(DomainError::UnknownModel {
                name: model.to_string(),
            });
        }
        let mut chain = Vec::new();
        self.resolve(model, &mut chain)?;
        Ok(self.resolved.get(model).map(Vec::as_slice).unwrap_or_default())
    }

    /// Flatten every model, in declaration order.
    ///
    /// Fails on the first cycle so that nothing downstream runs on a
    /// partially resolved schema.
    pub fn flatten_all(&mut self) -> Result<Vec<(&'s ModelSchema, Vec<FieldSchema>)>, DomainError> {
        let schema = self.schema;
        schema
            .iter()
            .map(|model| Ok((model, self.flatten(&model.name)?.to_vec())))
            .collect()
    }

    fn resolve(&mut self, name: &str, chain: &mut Vec<String>) -> Result<(), DomainError> {
        if self.resolved.contains_key(name) {
            return Ok(());
        }

        if let Some(start) = chain.iter().position(|n| n == name) {
            let mut cycle = chain[start..].to_vec();
            cycle.push(name.to_string());
            return Err(DomainError::InheritanceCycle { chain: cycle });
        }
        if chain.len() >= MAX_INHERITANCE_DEPTH {
            let mut runaway = chain.clone();
            runaway.push(name.to_string());
            return Err(DomainError::InheritanceCycle { chain: runaway });
        }

        let Some(model) = self.schema.get(name) else {
            return Ok(());
        };

        chain.push(name.to_string());
        let mut fields: Vec<FieldSchema> = Vec::new();

        for base in &model.bases {
            if !self.schema.contains(base) {
                trace!(model = name, base = %base, "base is not a model, skipping");
                continue;
            }
            self.resolve(base, chain)?;
            if let Some(inherited) = self.resolved.get(base) {
                for field in inherited {
                    merge(&mut fields, field.clone());
                }
            }
        }
        for field in &model.fields {
            merge(&mut fields, field.clone());
        }

        chain.pop();
        debug!(model = name, fields = fields.len(), "flattened model");
        self.resolved.insert(name.to_string(), fields);
        Ok(())
    }
}

fn merge(fields: &mut Vec<FieldSchema>, field: FieldSchema) {
    match fields.iter_mut().find(|f| f.name == field.name) {
        Some(slot) => *slot = field,
        None => fields.push(field),
    }
}
