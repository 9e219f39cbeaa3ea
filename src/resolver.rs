//! Input specifier resolution.
//!
//! A specifier is either a direct path or a glob pattern. Resolution turns
//! one specifier into an ordered list of concrete paths; whether an empty
//! list is acceptable is the orchestrator's call, not the resolver's.

use std::path::PathBuf;

use crate::error::{MergeError, Result};

/// Expands one input specifier into an ordered list of concrete paths.
pub trait Resolver {
    /// Resolve a specifier.
    ///
    /// The returned order defines page-insertion order and must be
    /// deterministic. An empty list means the specifier matched nothing.
    fn resolve(&self, specifier: &str) -> Result<Vec<PathBuf>>;
}

/// Resolver backed by filesystem glob expansion.
///
/// Pattern examples:
/// - `"report.pdf"`
/// - `"./docs/*.pdf"`
/// - `"**/*.pdf"`
///
/// Matches come back in the sorted order the `glob` crate produces, so
/// resolution order is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct GlobResolver;

impl GlobResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for GlobResolver {
    fn resolve(&self, specifier: &str) -> Result<Vec<PathBuf>> {
        let entries = glob::glob(specifier).map_err(|source| MergeError::MalformedSpecifier {
            specifier: specifier.to_string(),
            source,
        })?;

        let mut resolved = Vec::new();
        for entry in entries {
            let path = entry.map_err(|source| MergeError::UnreadableMatch {
                specifier: specifier.to_string(),
                source,
            })?;
            resolved.push(path);
        }

        tracing::debug!(specifier, matches = resolved.len(), "resolved specifier");
        Ok(resolved)
    }
}
