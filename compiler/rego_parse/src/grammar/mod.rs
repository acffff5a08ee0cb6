//! Grammar productions.
//!
//! Each submodule adds productions to [`Parser`](crate::Parser) for one
//! family of constructs:
//!
//! - `statement`: `package` and `import`, and the checks on special imports
//! - `rule`: rule heads, bodies, `default` and `else`
//! - `query`: bodies, literals, `some`, `every`, `with`
//! - `expr`: binary operators, from `in` down to `*`
//! - `term`: primary terms, refs, calls and collections

mod expr;
mod query;
mod rule;
mod statement;
mod term;
