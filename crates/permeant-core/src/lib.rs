//! # Permeant Core Library
//!
//! Blood-brain-barrier permeability scoring for small molecules, from a SMILES string to a
//! probability with the physicochemical context a medicinal chemist needs to judge it.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that each concern can be
//! tested on its own.
//!
//! - **[`core`]: The Foundation.** Stateless chemistry: the molecular graph, SMILES reading
//!   and canonical writing, a SMARTS engine, descriptors, structural alert catalogs, Morgan
//!   fingerprints, the applicability reference set and the tree-ensemble classifier.
//!
//! - **[`engine`]: The Contracts.** Pipeline configuration, the startup error taxonomy,
//!   the per-molecule result record with its status, and progress reporting.
//!
//! - **[`workflows`]: The Public API.** The [`ScoringPipeline`](workflows::score::ScoringPipeline)
//!   loads its resources once and then scores any number of molecules, one independent run
//!   per input. Scoring never fails: every failure becomes a status on the result.
//!
//! ## Quick Start
//!
//! ```no_run
//! use permeant::engine::config::PipelineConfig;
//! use permeant::workflows::score::ScoringPipeline;
//!
//! let pipeline = ScoringPipeline::initialize(&PipelineConfig::default())?;
//! let result = pipeline.score("CC(=O)OC1=CC=CC=C1C(=O)O");
//! println!("{}: {:.3}", result.status, result.bbb_probability);
//! # Ok::<(), permeant::engine::error::EngineError>(())
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
