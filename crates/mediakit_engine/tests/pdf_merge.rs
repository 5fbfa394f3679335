mod common;

use bytes::Bytes;
use common::{labelled_pdf, page_labels};
use lopdf::{Document, Object};
use mediakit_engine::{merge_pdfs, page_count, PdfError};
use pretty_assertions::assert_eq;

#[test]
fn merge_preserves_document_then_page_order() {
    let documents = vec![
        Bytes::from(labelled_pdf(&["c1", "c2"])),
        Bytes::from(labelled_pdf(&["a1"])),
        Bytes::from(labelled_pdf(&["b1", "b2", "b3"])),
    ];
    let merged = merge_pdfs(&documents).unwrap();

    assert_eq!(
        page_labels(&merged),
        vec!["c1", "c2", "a1", "b1", "b2", "b3"]
    );
    assert_eq!(page_count(&merged).unwrap(), 6);
}

#[test]
fn merged_pages_inherit_media_box() {
    let documents = vec![
        Bytes::from(labelled_pdf(&["x"])),
        Bytes::from(labelled_pdf(&["y"])),
    ];
    let merged = merge_pdfs(&documents).unwrap();
    let doc = Document::load_mem(&merged).unwrap();

    for page_id in doc.get_pages().into_values() {
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").and_then(Object::as_array).unwrap();
        assert_eq!(media_box.len(), 4);
    }
}

#[test]
fn merge_of_nothing_is_an_empty_document() {
    let merged = merge_pdfs(&[]).unwrap();
    assert_eq!(page_count(&merged).unwrap(), 0);
}

#[test]
fn unreadable_input_names_its_position() {
    let documents = vec![
        Bytes::from(labelled_pdf(&["ok"])),
        Bytes::from_static(b"not a pdf"),
    ];
    let err = merge_pdfs(&documents).unwrap_err();
    assert!(matches!(err, PdfError::Load { index: 1, .. }), "{err}");
}
