//! # Parameter Collector
//!
//! Turns a handler's declared input fields into the endpoint's parameter
//! list. Locus inference for fields without an explicit annotation is
//! deliberately a configurable policy rather than a fixed law; the
//! shipped default follows common REST conventions.

use std::fmt;

use canopy_core::{Locus, Necessity, Parameter};
use canopy_model::{FieldShape, HandlerNode, InputField};

use crate::error::CompileError;

/// Policy deciding the locus of a field with no explicit annotation.
#[derive(Clone, Copy)]
pub struct LocusPolicy {
    infer: fn(&InputField) -> Locus,
}

impl LocusPolicy {
    /// Policy from an inference function.
    pub fn new(infer: fn(&InputField) -> Locus) -> Self {
        Self { infer }
    }

    /// Infer the locus for `field`. Explicit annotations are handled by
    /// the collector before this is consulted.
    pub fn infer(&self, field: &InputField) -> Locus {
        (self.infer)(field)
    }
}

/// Default policy: a required field of complex shape decodes from the
/// request body; everything else (primitive shape, or optional) comes
/// from the query string.
impl Default for LocusPolicy {
    fn default() -> Self {
        Self::new(|field| {
            if field.is_required() && field.shape == FieldShape::Complex {
                Locus::Body
            } else {
                Locus::Query
            }
        })
    }
}

impl fmt::Debug for LocusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LocusPolicy")
    }
}

/// Collect the parameter list for one handler.
///
/// Necessity is `Optional` when the field declares a default or is
/// nullable, `Required` otherwise; mutability is taken as declared. Two
/// fields resolving to the same (name, locus) pair abort compilation
/// with both field positions named.
pub fn collect_parameters(
    handler: &HandlerNode,
    policy: &LocusPolicy,
) -> Result<Vec<Parameter>, CompileError> {
    let mut parameters: Vec<Parameter> = Vec::with_capacity(handler.inputs.len());

    for (index, field) in handler.inputs.iter().enumerate() {
        let locus = field.locus.unwrap_or_else(|| policy.infer(field));
        let necessity = if field.is_required() {
            Necessity::Required
        } else {
            Necessity::Optional
        };

        if let Some(first_index) = parameters
            .iter()
            .position(|p| p.name == field.name && p.locus == locus)
        {
            return Err(CompileError::DuplicateParameter {
                handler: handler.name.clone(),
                name: field.name.clone(),
                locus,
                first_index,
                second_index: index,
            });
        }

        parameters.push(Parameter::new(
            field.name.clone(),
            locus,
            necessity,
            field.mutability,
        ));
    }

    Ok(parameters)
}
