//! SMARTS substructure queries.
//!
//! Supports the atom and bond primitives used by descriptor definitions and
//! structural alert catalogs, including recursive `$()` environments, the full
//! operator precedence (`!`, `&`, `,`, `;`) and ring closures. Matching is a
//! backtracking subgraph search seeded from already-mapped neighbors.

mod matcher;
mod parser;
mod pattern;

pub use parser::SmartsError;
pub use pattern::{AtomExpr, AtomPrimitive, BondExpr, BondPrimitive, PatternBond, SmartsPattern};
