#![allow(dead_code)]

use lopdf::{dictionary, Document, Object};
use mediakit_core::{Blob, JobRequest, ToolKind, ToolOptions};

/// A PDF whose pages carry a `Label` name, in page order.
pub fn labelled_pdf(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for label in labels {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Label" => *label,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Page labels of a PDF, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).unwrap();
            let label = page.get(b"Label").and_then(Object::as_name).unwrap();
            String::from_utf8_lossy(label).into_owned()
        })
        .collect()
}

pub fn pdf_blob(name: &str, labels: &[&str]) -> Blob {
    Blob::new(name, "application/pdf", labelled_pdf(labels))
}

pub fn blob(name: &str, mime: &str) -> Blob {
    Blob::new(name, mime, name.as_bytes().to_vec())
}

/// A request for `tool` with `settings` applied over the defaults.
pub fn request(tool: ToolKind, inputs: Vec<Blob>, settings: &[(&str, &str)]) -> JobRequest {
    let mut options = ToolOptions::defaults(tool);
    for (key, value) in settings {
        options.set(key, value).unwrap();
    }
    JobRequest {
        tool,
        inputs,
        options,
    }
}
