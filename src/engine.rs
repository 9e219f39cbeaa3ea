//! Document engine abstraction and its lopdf backing.
//!
//! The merge orchestrator only sees the three traits here: open a source
//! for import, pull pages out of it, append them to an output, save the
//! output. [`LopdfEngine`] implements them with `lopdf`; tests implement
//! them with stand-ins.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId, dictionary};

use crate::error::{MergeError, Result};

/// Factory for source and output documents.
pub trait DocumentEngine {
    /// Opaque page unit moved from a source into the output.
    type Page;
    type Source: SourceDocument<Page = Self::Page>;
    type Output: OutputDocument<Page = Self::Page>;

    /// Open a source document read-only.
    fn open_for_import(&self, path: &Path) -> Result<Self::Source>;

    /// Create a fresh, empty output document.
    fn new_output(&self) -> Self::Output;
}

/// An opened, read-only source document.
pub trait SourceDocument {
    type Page;

    fn page_count(&self) -> usize;

    /// Detach page `index` (zero-based, original order). `None` means the
    /// page the document claimed to have is not actually there.
    fn page(&self, index: usize) -> Option<Self::Page>;
}

/// The single accumulating output document.
pub trait OutputDocument {
    type Page;

    /// Append a page after all previously appended pages.
    fn append_page(&mut self, page: Self::Page);

    fn page_count(&self) -> usize;

    /// Persist the document. Must not disturb an existing file at `path`
    /// unless the whole write succeeds.
    fn save_as(&mut self, path: &Path) -> Result<()>;
}

/// Self-contained page extracted from a source document: the page
/// dictionary plus every object it transitively references, keyed by the
/// source's object ids.
pub struct PageBundle {
    id: ObjectId,
    objects: BTreeMap<ObjectId, Object>,
}

/// [`DocumentEngine`] backed by `lopdf`.
#[derive(Debug, Clone, Default)]
pub struct LopdfEngine;

impl LopdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentEngine for LopdfEngine {
    type Page = PageBundle;
    type Source = LopdfSource;
    type Output = LopdfOutput;

    fn open_for_import(&self, path: &Path) -> Result<LopdfSource> {
        let doc = Document::load(path).map_err(|err| MergeError::FailedToOpen {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        // get_pages is keyed by page number, so values come out in page order.
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        tracing::debug!(path = %path.display(), pages = pages.len(), "opened source document");
        Ok(LopdfSource { doc, pages })
    }

    fn new_output(&self) -> LopdfOutput {
        LopdfOutput::new()
    }
}

/// Read-only handle to one loaded source PDF.
#[derive(Debug)]
pub struct LopdfSource {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl SourceDocument for LopdfSource {
    type Page = PageBundle;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Option<PageBundle> {
        let id = *self.pages.get(index)?;

        let Ok(Object::Dictionary(dict)) = self.doc.get_object(id) else {
            return None;
        };

        // Drop the Parent link; the output re-parents the page into its
        // own tree. Keeping it would drag the whole source page tree
        // (and every sibling page) into the bundle.
        let mut dict = dict.clone();
        dict.remove(b"Parent");

        // Seed the map with the stripped dictionary before walking, so a
        // back-reference to the page (an annotation's /P, say) terminates
        // instead of re-importing the original dict and its Parent chain.
        let mut objects = BTreeMap::new();
        objects.insert(id, Object::Dictionary(dict.clone()));
        for (_, value) in dict.iter() {
            collect_referenced_objects(&self.doc, value, &mut objects);
        }

        Some(PageBundle { id, objects })
    }
}

/// Accumulating output PDF: a fresh catalog and page tree that grows one
/// page at a time.
pub struct LopdfOutput {
    doc: Document,
    pages_id: ObjectId,
    appended: usize,
}

impl LopdfOutput {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let catalog_id = doc.new_object_id();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Object::Array(vec![]),
                "Count" => 0,
            }),
        );
        doc.objects.insert(
            catalog_id,
            Object::Dictionary(dictionary! {
                "Type" => "Catalog",
                "Pages" => Object::Reference(pages_id),
            }),
        );
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            pages_id,
            appended: 0,
        }
    }
}

impl OutputDocument for LopdfOutput {
    type Page = PageBundle;

    fn append_page(&mut self, page: PageBundle) {
        // Shift incoming object ids above everything already present so
        // bundles from different sources cannot collide.
        let offset = self.doc.max_id;
        let mut highest = self.doc.max_id;

        for (old_id, mut object) in page.objects {
            shift_references(&mut object, offset);
            let new_id = (old_id.0 + offset, old_id.1);

            if old_id == page.id
                && let Object::Dictionary(dict) = &mut object
            {
                dict.set("Parent", Object::Reference(self.pages_id));
            }

            highest = highest.max(new_id.0);
            self.doc.objects.insert(new_id, object);
        }
        self.doc.max_id = highest;

        let page_id = (page.id.0 + offset, page.id.1);
        if let Ok(pages) = self.doc.get_object_mut(self.pages_id)
            && let Object::Dictionary(dict) = pages
        {
            if let Ok(Object::Array(kids)) = dict.get_mut(b"Kids") {
                kids.push(Object::Reference(page_id));
            }
            dict.set("Count", Object::Integer(self.appended as i64 + 1));
        }
        self.appended += 1;
    }

    fn page_count(&self) -> usize {
        self.appended
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.doc.compress();
        self.doc.renumber_objects();

        // Write beside the destination, rename only on success, so a
        // failed save leaves any existing file at `path` untouched.
        let staging = staging_path(path);

        let file = std::fs::File::create(&staging).map_err(|source| {
            MergeError::FailedToCreateOutput {
                path: staging.clone(),
                source,
            }
        })?;

        let mut writer = std::io::BufWriter::new(file);
        self.doc
            .save_to(&mut writer)
            .map_err(|err| {
                let _ = std::fs::remove_file(&staging);
                MergeError::FailedToWrite {
                    path: staging.clone(),
                    source: std::io::Error::other(err),
                }
            })?;
        writer.flush().map_err(|source| {
            let _ = std::fs::remove_file(&staging);
            MergeError::FailedToWrite {
                path: staging.clone(),
                source,
            }
        })?;

        std::fs::rename(&staging, path).map_err(|source| {
            let _ = std::fs::remove_file(&staging);
            MergeError::FailedToWrite {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!(path = %path.display(), pages = self.appended, "saved output document");
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Walk `obj` and copy every object it references out of `source`,
/// recursively, into `out`.
fn collect_referenced_objects(
    source: &Document,
    obj: &Object,
    out: &mut BTreeMap<ObjectId, Object>,
) {
    match obj {
        Object::Reference(id) => {
            if !out.contains_key(id)
                && let Ok(referenced) = source.get_object(*id)
            {
                out.insert(*id, referenced.clone());
                collect_referenced_objects(source, referenced, out);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                collect_referenced_objects(source, value, out);
            }
        }
        Object::Array(arr) => {
            for item in arr {
                collect_referenced_objects(source, item, out);
            }
        }
        Object::Stream(stream) => {
            collect_referenced_objects(source, &Object::Dictionary(stream.dict.clone()), out);
        }
        _ => {}
    }
}

/// Rewrite every reference inside `obj` by `offset`.
fn shift_references(obj: &mut Object, offset: u32) {
    match obj {
        Object::Reference(id) => id.0 += offset,
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                shift_references(value, offset);
            }
        }
        Object::Array(arr) => {
            for item in arr.iter_mut() {
                shift_references(item, offset);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                shift_references(value, offset);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Build a minimal valid PDF with `page_count` blank pages.
    fn build_test_document(page_count: usize) -> Document {
        let mut doc = Document::with_version("1.4");

        let pages_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(page_count);

        for _ in 0..page_count {
            let page_id = doc.new_object_id();
            doc.objects.insert(
                page_id,
                Object::Dictionary(dictionary! {
                    "Type" => "Page",
                    "Parent" => Object::Reference(pages_id),
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                }),
            );
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let catalog_id = doc.new_object_id();
        doc.objects.insert(
            catalog_id,
            Object::Dictionary(dictionary! {
                "Type" => "Catalog",
                "Pages" => Object::Reference(pages_id),
            }),
        );
        doc.trailer.set("Root", catalog_id);

        doc
    }

    fn write_test_pdf(dir: &TempDir, name: &str, page_count: usize) -> PathBuf {
        let path = dir.path().join(name);
        build_test_document(page_count).save(&path).unwrap();
        path
    }

    #[test]
    fn open_reports_page_count_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(&dir, "three.pdf", 3);

        let source = LopdfEngine::new().open_for_import(&path).unwrap();
        assert_eq!(source.page_count(), 3);
        assert!(source.page(0).is_some());
        assert!(source.page(2).is_some());
        assert!(source.page(3).is_none());
    }

    #[test]
    fn open_rejects_non_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = LopdfEngine::new().open_for_import(&path).unwrap_err();
        assert!(matches!(err, MergeError::FailedToOpen { .. }));
    }

    #[test]
    fn transplanted_pages_survive_a_round_trip() {
        let dir = TempDir::new().unwrap();
        let engine = LopdfEngine::new();

        let first = engine
            .open_for_import(&write_test_pdf(&dir, "a.pdf", 3))
            .unwrap();
        let second = engine
            .open_for_import(&write_test_pdf(&dir, "b.pdf", 2))
            .unwrap();

        let mut output = engine.new_output();
        for source in [&first, &second] {
            for index in 0..source.page_count() {
                output.append_page(source.page(index).unwrap());
            }
        }
        assert_eq!(output.page_count(), 5);

        let out_path = dir.path().join("merged.pdf");
        output.save_as(&out_path).unwrap();

        let reloaded = Document::load(&out_path).unwrap();
        assert_eq!(reloaded.get_pages().len(), 5);
    }

    #[test]
    fn page_with_annotation_back_reference_excludes_siblings() {
        let mut doc = build_test_document(3);
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let first = page_ids[0];

        // A text annotation whose /P points back at its own page.
        let annot_id = doc.new_object_id();
        doc.objects.insert(
            annot_id,
            Object::Dictionary(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Text",
                "P" => Object::Reference(first),
            }),
        );
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(first) {
            dict.set("Annots", vec![Object::Reference(annot_id)]);
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("annotated.pdf");
        doc.save(&path).unwrap();

        let source = LopdfEngine::new().open_for_import(&path).unwrap();
        let bundle = source.page(0).unwrap();

        assert!(bundle.objects.contains_key(&annot_id));
        for sibling in &page_ids[1..] {
            assert!(!bundle.objects.contains_key(sibling));
        }
        match bundle.objects.get(&bundle.id) {
            Some(Object::Dictionary(dict)) => assert!(!dict.has(b"Parent")),
            other => panic!("expected page dictionary, got {other:?}"),
        }
    }

    #[test]
    fn failed_rename_cleans_up_staging_file() {
        let dir = TempDir::new().unwrap();
        let engine = LopdfEngine::new();

        let source = engine
            .open_for_import(&write_test_pdf(&dir, "a.pdf", 1))
            .unwrap();
        let mut output = engine.new_output();
        output.append_page(source.page(0).unwrap());

        // A directory at the destination makes the final rename fail.
        let target = dir.path().join("taken.pdf");
        std::fs::create_dir(&target).unwrap();

        let err = output.save_as(&target).unwrap_err();
        assert!(matches!(err, MergeError::FailedToWrite { .. }));
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn failed_save_creates_no_destination_file() {
        let dir = TempDir::new().unwrap();
        let engine = LopdfEngine::new();

        let source = engine
            .open_for_import(&write_test_pdf(&dir, "a.pdf", 1))
            .unwrap();
        let mut output = engine.new_output();
        output.append_page(source.page(0).unwrap());

        // A destination inside a directory that does not exist fails at
        // staging-file creation, before the rename.
        let bad_target = dir.path().join("no-such-dir").join("out.pdf");
        let err = output.save_as(&bad_target).unwrap_err();
        assert!(matches!(err, MergeError::FailedToCreateOutput { .. }));
        assert!(!bad_target.exists());
    }
}
