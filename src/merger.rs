//! Merge orchestration.
//!
//! [`Merger`] drives the whole pipeline: validate the specifier list,
//! resolve each specifier into concrete paths, open each source, move its
//! pages into the output in order, persist once, then hand the result to
//! the viewer. The first invalid input, unreadable source, or missing
//! page aborts the call; nothing is written to the output path unless
//! every page made it across.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::engine::{DocumentEngine, OutputDocument, SourceDocument};
use crate::error::{MergeError, Result};
use crate::fs_util::FileUtilities;
use crate::resolver::Resolver;

/// Summary of a completed merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// Where the merged document was written.
    pub output_path: PathBuf,

    /// Number of source documents whose pages were transplanted.
    pub sources_merged: usize,

    /// Page count of the merged document.
    pub total_pages: usize,
}

/// Orchestrates one merge pipeline over injected collaborators.
///
/// The output path is fixed at construction: either the caller's choice
/// or a freshly generated temp path. Each [`merge`](Merger::merge) call
/// owns its own output document; no state crosses calls.
pub struct Merger<R, F, E> {
    resolver: R,
    file_utils: F,
    engine: E,
    output_path: PathBuf,
}

impl<R, F, E> Merger<R, F, E>
where
    R: Resolver,
    F: FileUtilities,
    E: DocumentEngine,
{
    /// Create a merger. With no explicit `output_path`, a unique
    /// "merged" temp path is generated once, up front.
    pub fn new(resolver: R, file_utils: F, engine: E, output_path: Option<PathBuf>) -> Result<Self> {
        let output_path = match output_path {
            Some(path) => path,
            None => file_utils.temp_output_path("merged")?,
        };

        Ok(Self {
            resolver,
            file_utils,
            engine,
            output_path,
        })
    }

    /// The path the merged document will be written to.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Merge every document named by `specifiers`, in order, into a
    /// single PDF at the configured output path.
    ///
    /// Page order in the output is: specifier order, then resolution
    /// order within a specifier, then original page order within a
    /// source. The first error aborts the call and nothing is persisted.
    /// A viewer failure after a successful save is logged, not returned.
    pub fn merge(&self, specifiers: &[String]) -> Result<MergeReport> {
        if specifiers.is_empty() {
            return Err(MergeError::EmptySpecifierList);
        }

        // Reject the whole list before any document is opened.
        for (position, specifier) in specifiers.iter().enumerate() {
            if specifier.trim().is_empty() {
                return Err(MergeError::BlankSpecifier { position });
            }
        }

        let mut output = self.engine.new_output();
        let mut sources_merged = 0;

        for (position, specifier) in specifiers.iter().enumerate() {
            if specifier.trim().is_empty() {
                return Err(MergeError::BlankSpecifier { position });
            }

            let paths = self.resolver.resolve(specifier)?;
            if paths.is_empty() {
                return Err(MergeError::NoMatches {
                    specifier: specifier.clone(),
                });
            }

            for path in &paths {
                if path.as_os_str().is_empty() {
                    return Err(MergeError::BlankResolvedPath {
                        specifier: specifier.clone(),
                    });
                }

                self.transplant(path, &mut output)?;
                sources_merged += 1;
            }
        }

        output.save_as(&self.output_path)?;

        let report = MergeReport {
            output_path: self.output_path.clone(),
            sources_merged,
            total_pages: output.page_count(),
        };
        tracing::info!(
            output = %report.output_path.display(),
            sources = report.sources_merged,
            pages = report.total_pages,
            "merge complete"
        );

        if let Err(err) = self.file_utils.present_document(&self.output_path) {
            tracing::warn!(error = %err, "could not open merged document in a viewer");
        }

        Ok(report)
    }

    /// Move every page of the source at `path` into `output`, in the
    /// source's original order. The source handle lives only for the
    /// duration of this call.
    fn transplant(&self, path: &Path, output: &mut E::Output) -> Result<()> {
        let source = self.engine.open_for_import(path)?;

        let page_count = source.page_count();
        if page_count == 0 {
            return Err(MergeError::EmptyDocument {
                path: path.to_path_buf(),
            });
        }

        for index in 0..page_count {
            let page = source.page(index).ok_or_else(|| MergeError::MissingPage {
                path: path.to_path_buf(),
                index,
            })?;
            output.append_page(page);
        }

        tracing::debug!(path = %path.display(), pages = page_count, "transplanted source");
        Ok(())
    }
}
