//! pdfmeld - merge ordered PDF inputs into a single document.
//!
//! The crate is one pipeline: resolve input specifiers (paths or glob
//! patterns) into concrete documents, transplant every page into a single
//! output in order, persist once, then hand the result to the platform
//! viewer. Any malformed input, unreadable source, or missing page aborts
//! the merge before anything is written.
//!
//! The three collaborators the orchestrator depends on are traits, so the
//! pipeline can be tested without touching real PDFs:
//!
//! - [`resolver::Resolver`] expands one specifier into ordered paths
//! - [`engine::DocumentEngine`] opens sources and accumulates the output
//! - [`fs_util::FileUtilities`] names generated outputs and opens viewers
//!
//! # Example
//!
//! ```no_run
//! use pdfmeld::engine::LopdfEngine;
//! use pdfmeld::fs_util::SystemFileUtilities;
//! use pdfmeld::merger::Merger;
//! use pdfmeld::resolver::GlobResolver;
//! use std::path::PathBuf;
//!
//! # fn example() -> pdfmeld::Result<()> {
//! let merger = Merger::new(
//!     GlobResolver::new(),
//!     SystemFileUtilities::headless(),
//!     LopdfEngine::new(),
//!     Some(PathBuf::from("merged.pdf")),
//! )?;
//!
//! let report = merger.merge(&["a.pdf".to_string(), "b.pdf".to_string()])?;
//! println!("wrote {} pages to {}", report.total_pages, report.output_path.display());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod cli;
pub mod engine;
pub mod error;
pub mod fs_util;
pub mod merger;
pub mod resolver;

pub use error::{ErrorKind, MergeError, Result};
pub use merger::{MergeReport, Merger};
