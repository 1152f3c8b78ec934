//! Field schemas and transform steps used by the record loader.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{ModelError, TransformError};
use crate::value::{DataType, Value};

type TransformFn = dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync;

/// One step of a field's transform pipeline.
#[derive(Clone)]
pub struct Transform {
    name: String,
    func: Arc<TransformFn>,
}

impl Transform {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// # Errors
    ///
    /// Propagates the step's own error.
    pub fn apply(&self, value: Value) -> Result<Value, TransformError> {
        (self.func)(value)
    }

    /// Trims surrounding whitespace from string values.
    pub fn trim() -> Self {
        Self::new("trim", |value| {
            Ok(match value {
                Value::Str(s) => Value::Str(s.trim().to_string()),
                other => other,
            })
        })
    }

    /// Turns the empty string into null, so `filter_if_null` can drop it.
    pub fn empty_as_null() -> Self {
        Self::new("empty_as_null", |value| {
            Ok(if value.is_blank() { Value::Null } else { value })
        })
    }

    /// Reads `key` out of a nested map value. Null passes through.
    pub fn lookup_key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(format!("lookup_key({key})"), move |value| match value {
            Value::Null => Ok(Value::Null),
            Value::Map(mut map) => map
                .remove(&key)
                .ok_or_else(|| TransformError::MissingKey { key: key.clone() }),
            other => Err(TransformError::UnexpectedType {
                expected: "map",
                found: other.kind().to_string(),
            }),
        })
    }

    /// Splits a delimited string into a list of strings.
    pub fn split(separator: impl Into<String>) -> Self {
        let separator = separator.into();
        Self::new(format!("split({separator:?})"), move |value| match value {
            Value::Str(s) if s.is_empty() => Ok(Value::List(Vec::new())),
            Value::Str(s) => Ok(Value::List(
                s.split(separator.as_str()).map(Value::from).collect(),
            )),
            other => Ok(other),
        })
    }

    /// Replaces every value with `constant`.
    pub fn constant(constant: Value) -> Self {
        Self::new("constant", move |_| Ok(constant.clone()))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

/// Result of resolving one field of one input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    Keep(Value),
    /// The field was null and the schema filters such records out.
    DropRecord,
}

/// Definition of one output column of the record loader.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: String,
    target_type: Option<DataType>,
    transforms: Vec<Transform>,
    filter_if_null: bool,
    null_fill: Option<Value>,
}

impl FieldSchema {
    /// An untyped field with no transforms that fills nulls with the empty string.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_type: None,
            transforms: Vec::new(),
            filter_if_null: false,
            null_fill: Some(Value::Str(String::new())),
        }
    }

    pub fn typed(name: impl Into<String>, target_type: DataType) -> Self {
        Self::new(name).with_type(target_type)
    }

    #[must_use]
    pub fn with_type(mut self, target_type: DataType) -> Self {
        self.target_type = Some(target_type);
        self
    }

    /// Appends a step to the transform pipeline.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    #[must_use]
    pub fn with_transforms(mut self, transforms: impl IntoIterator<Item = Transform>) -> Self {
        self.transforms.extend(transforms);
        self
    }

    /// Drop the whole record when this field resolves to null.
    #[must_use]
    pub fn filter_if_null(mut self, enable: bool) -> Self {
        self.filter_if_null = enable;
        self
    }

    /// Value substituted for null; `None` keeps nulls as they are.
    #[must_use]
    pub fn with_null_fill(mut self, fill: Option<Value>) -> Self {
        self.null_fill = fill;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_type(&self) -> Option<DataType> {
        self.target_type
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn filters_null(&self) -> bool {
        self.filter_if_null
    }

    pub fn null_fill(&self) -> Option<&Value> {
        self.null_fill.as_ref()
    }

    /// Runs the transform pipeline left to right, then applies the null policy.
    ///
    /// # Errors
    ///
    /// Returns the first transform step error.
    pub fn resolve(&self, raw: Value) -> Result<FieldOutcome, TransformError> {
        let mut value = raw;
        for step in &self.transforms {
            value = step.apply(value)?;
        }
        if value.is_null() {
            if self.filter_if_null {
                return Ok(FieldOutcome::DropRecord);
            }
            if let Some(fill) = &self.null_fill {
                value = fill.clone();
            }
        }
        Ok(FieldOutcome::Keep(value))
    }
}

/// Checks that field names are unique within a schema list.
///
/// # Errors
///
/// Returns [`ModelError::DuplicateColumn`] for the first repeated name.
pub fn validate_fields(fields: &[FieldSchema]) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(ModelError::DuplicateColumn {
                column: field.name.clone(),
            });
        }
    }
    Ok(())
}

/// Untyped, transform-free fields over `names`.
pub fn plain_fields<S: AsRef<str>>(names: &[S]) -> Vec<FieldSchema> {
    names.iter().map(|name| FieldSchema::new(name.as_ref())).collect()
}
