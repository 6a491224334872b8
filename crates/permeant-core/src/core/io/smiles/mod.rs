//! SMILES reading and canonical writing.
//!
//! The reader accepts the OpenSMILES organic subset, bracket atoms, branches, ring
//! closures and disconnected fragments. Stereo descriptors are parsed and dropped.

mod canonical;
mod parser;

pub use canonical::write_canonical;
pub use parser::{SmilesError, parse};
pub(crate) use parser::implicit_hydrogen_count;
