//! # Parameter Model
//!
//! The parameter record attached to a compiled endpoint: where the value
//! comes from (`Locus`), whether the caller must supply it (`Necessity`),
//! and whether it may change across messages of a long-lived connection
//! (`Mutability`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a parameter's value originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locus {
    /// Bound to a parameterized path segment.
    Path,
    /// Taken from the query string.
    Query,
    /// Taken from a request header.
    Header,
    /// Decoded from the request body.
    Body,
}

impl Locus {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a caller must supply the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Necessity {
    /// The request is rejected without it.
    Required,
    /// A default or null stands in when absent.
    Optional,
}

impl Necessity {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
        }
    }
}

impl fmt::Display for Necessity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the value may vary between messages of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    /// Fixed for the lifetime of a connection (e.g. a session token).
    ConnectionConstant,
    /// May differ on every message.
    Variable,
}

impl Mutability {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionConstant => "connection_constant",
            Self::Variable => "variable",
        }
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully resolved parameter of a compiled endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// The resolved parameter name.
    pub name: String,
    /// Where the value originates.
    pub locus: Locus,
    /// Whether the caller must supply it.
    pub necessity: Necessity,
    /// Whether it may vary within one connection.
    pub mutability: Mutability,
}

impl Parameter {
    /// Construct a parameter record.
    pub fn new(
        name: impl Into<String>,
        locus: Locus,
        necessity: Necessity,
        mutability: Mutability,
    ) -> Self {
        Self {
            name: name.into(),
            locus,
            necessity,
            mutability,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}, {})",
            self.name, self.locus, self.necessity, self.mutability
        )
    }
}
