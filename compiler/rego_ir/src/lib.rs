//! Rego IR - Syntax Tree Types
//!
//! This crate contains the data structures produced by the Rego parser:
//! - [`Location`] for source positions (row, column, offset, covered text)
//! - [`Term`] and [`Value`] for value-producing nodes
//! - [`Body`], [`Expr`] and friends for queries
//! - [`Head`] and [`Rule`] for rule definitions
//! - [`Statement`] for top-level module items
//! - [`Annotations`] for decoded `METADATA` comment blocks
//!
//! # Equality
//!
//! Structural equality on terms ignores locations: two occurrences of
//! `a.b.c` in different places compare equal. Locations are compared only
//! when comparing [`Location`] values directly.
//!
//! # Display
//!
//! Every node renders back to Rego-like source text, which is what the
//! parser uses in diagnostics (`rule head ref p.q invalid`) and what the
//! CLI prints.

mod annotations;
mod location;
mod query;
mod rule;
mod statement;
mod term;
pub mod visitor;

pub use annotations::{Annotations, AuthorAnnotation, RelatedResourceAnnotation, SchemaAnnotation};
pub use location::Location;
pub use query::{Body, Every, Expr, ExprTerms, SomeDecl, With};
pub use rule::{Head, Rule, RuleKeyword};
pub use statement::{Comment, Import, Package, Statement};
pub use term::{
    ArrayComprehension, Number, ObjectComprehension, Ref, SetComprehension, Term, Value, Var,
};

/// Prefix of generated wildcard variable names (`_` becomes `$0`, `$1`, ...).
pub const WILDCARD_PREFIX: &str = "$";

/// The source spelling of a wildcard variable.
pub const WILDCARD: &str = "_";

/// Names of the root documents a bare variable reference resolves into.
pub const ROOT_DOCUMENT_NAMES: [&str; 2] = ["data", "input"];

/// Root of the package namespace.
pub const DEFAULT_ROOT_DOCUMENT: &str = "data";

/// Root of `import future.keywords...` imports.
pub const FUTURE_ROOT_DOCUMENT: &str = "future";

/// Root of `import rego.v1`.
pub const REGO_ROOT_DOCUMENT: &str = "rego";

/// Root of schema references inside annotations.
pub const SCHEMA_ROOT_DOCUMENT: &str = "schema";

/// Operator name for `x in xs`.
pub const MEMBER: &str = "internal.member_2";

/// Operator name for `k, v in xs`.
pub const MEMBER_WITH_KEY: &str = "internal.member_3";
