//! In-process PDF handling on top of `lopdf`.

use std::collections::BTreeMap;

use bytes::Bytes;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];
const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("document {index} could not be parsed: {source}")]
    Load {
        index: usize,
        #[source]
        source: lopdf::Error,
    },
    #[error("page {page} of document {index} is not a dictionary")]
    MalformedPage { index: usize, page: u32 },
    #[error("failed to write merged document: {0}")]
    Save(String),
}

/// Number of pages in a PDF.
pub fn page_count(bytes: &[u8]) -> Result<usize, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|source| PdfError::Load { index: 0, source })?;
    Ok(doc.get_pages().len())
}

/// Concatenates `documents` into one PDF: document order first, then page
/// order within each document.
pub fn merge_pdfs(documents: &[Bytes]) -> Result<Vec<u8>, PdfError> {
    let mut next_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for (index, bytes) in documents.iter().enumerate() {
        let mut doc =
            Document::load_mem(bytes).map_err(|source| PdfError::Load { index, source })?;
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        for (page, page_id) in doc.get_pages() {
            let mut dict = doc
                .get_dictionary(page_id)
                .map_err(|_| PdfError::MalformedPage { index, page })?
                .clone();
            inherit_attributes(&doc, &mut dict);
            pages.push((page_id, dict));
        }

        for (id, object) in doc.objects {
            match type_name(&object) {
                Some(b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline") => {}
                _ => {
                    objects.insert(id, object);
                }
            }
        }
    }

    let pages_id = (next_id, 0);
    let catalog_id = (next_id + 1, 0);
    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let count = pages.len() as i64;
    for (id, mut dict) in pages {
        dict.set("Parent", pages_id);
        objects.insert(id, Object::Dictionary(dict));
    }
    objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        }),
    );

    let mut merged = Document::with_version("1.5");
    merged.objects = objects;
    merged.max_id = next_id + 1;
    merged.trailer.set("Root", catalog_id);
    merged.renumber_objects();
    merged.compress();

    let mut out = Vec::new();
    merged
        .save_to(&mut out)
        .map_err(|err| PdfError::Save(err.to_string()))?;
    Ok(out)
}

fn type_name(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").and_then(Object::as_name).ok()
}

/// Copies inheritable attributes down from the page's ancestors, since the
/// original page tree is discarded.
fn inherit_attributes(doc: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = parent {
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        depth += 1;
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}
