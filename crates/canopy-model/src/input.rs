//! # Handler Input Fields
//!
//! The declared inputs of a handler leaf. The parameter collector in
//! `canopy-compile` turns these into the endpoint's parameter list;
//! locus inference for fields without an explicit annotation is policy
//! owned by the compiler, not by this declaration layer.

use serde::{Deserialize, Serialize};

use canopy_core::{Locus, Mutability};

/// Coarse shape of a field's type, used by locus inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    /// Scalar-like: numbers, strings, booleans, identifiers.
    Primitive,
    /// Structured: anything that would decode from a document body.
    Complex,
}

/// One declared input field of a handler node.
///
/// Built with the chainable setters; only name and shape are mandatory.
///
/// ```
/// use canopy_model::{FieldShape, InputField};
/// use canopy_core::Locus;
///
/// let field = InputField::new("user_id", FieldShape::Primitive)
///     .locus(Locus::Path);
/// assert!(field.is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    /// Declared field name; also the resolved parameter name.
    pub name: String,
    /// Coarse type shape.
    pub shape: FieldShape,
    /// Explicit locus annotation, if the author declared one.
    pub locus: Option<Locus>,
    /// Whether the declaration carries a default value.
    pub has_default: bool,
    /// Whether the declared type admits null/absence.
    pub nullable: bool,
    /// Whether the value may vary within one connection.
    pub mutability: Mutability,
}

impl InputField {
    /// A required, variable field with no explicit locus.
    pub fn new(name: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            shape,
            locus: None,
            has_default: false,
            nullable: false,
            mutability: Mutability::Variable,
        }
    }

    /// Annotate an explicit locus, overriding inference.
    pub fn locus(mut self, locus: Locus) -> Self {
        self.locus = Some(locus);
        self
    }

    /// Mark the field as carrying a default value.
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Mark the declared type as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Pin the value for the lifetime of a connection.
    pub fn connection_constant(mut self) -> Self {
        self.mutability = Mutability::ConnectionConstant;
        self
    }

    /// A field is required unless it has a default or is nullable.
    pub fn is_required(&self) -> bool {
        !self.has_default && !self.nullable
    }
}
