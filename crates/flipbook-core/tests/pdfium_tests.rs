#![cfg(feature = "pdfium")]

use flipbook_core::*;
use lopdf::{Dictionary, Document, Object, Stream};
use std::time::Duration;

fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"0 0 1 rg 100 100 200 200 re f".to_vec(),
        ));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Pdfium is a native library; these tests only run where it can be bound
fn pdfium_available() -> bool {
    match PdfiumSource::new().open(&DocumentRef::from_bytes(create_test_pdf(1))) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("Skipping pdfium test, library not available: {}", e);
            false
        }
    }
}

#[test]
fn test_pdfium_opens_and_renders() {
    if !pdfium_available() {
        return;
    }

    let source = PdfiumSource::new();
    let document = source
        .open(&DocumentRef::from_bytes(create_test_pdf(2)))
        .unwrap();
    assert_eq!(document.page_count(), 2);

    let page = document.render_page(1, ZoomLevel(100)).unwrap();
    assert!((610..=614).contains(&page.width), "width {}", page.width);
    assert!((790..=794).contains(&page.height), "height {}", page.height);
    assert_eq!(page.rgba.len(), (page.width * page.height * 4) as usize);
    assert_eq!(page.zoom, ZoomLevel(100));

    let larger = document.render_page(0, ZoomLevel(200)).unwrap();
    assert!(larger.width > page.width * 19 / 10);
}

#[test]
fn test_pdfium_rejects_garbage() {
    let source = PdfiumSource::new();
    let result = source.open(&DocumentRef::from_bytes(b"definitely not a pdf".to_vec()));
    assert!(matches!(result, Err(ViewerError::DocumentOpen(_))));
}

#[test]
fn test_pdfium_out_of_range_page() {
    if !pdfium_available() {
        return;
    }

    let document = PdfiumSource::new()
        .open(&DocumentRef::from_bytes(create_test_pdf(1)))
        .unwrap();
    assert!(matches!(
        document.render_page(5, ZoomLevel(100)),
        Err(ViewerError::PageRender { index: 5, .. })
    ));
}

#[tokio::test]
async fn test_viewer_loads_pdf_file() {
    if !pdfium_available() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.pdf");
    std::fs::write(&path, create_test_pdf(4)).unwrap();

    let mut viewer = Viewer::new(PdfiumSource::new(), ViewerOptions::default()).unwrap();
    viewer.open(DocumentRef::Path(path));
    tokio::time::timeout(Duration::from_secs(30), viewer.wait_until_settled())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(viewer.state().page_count, 4);
    assert!(viewer.state().book_ready);
    for slot in viewer.slots().iter() {
        let page = slot.page().unwrap();
        assert_eq!(page.zoom, ZoomLevel(150));
        assert!((916..=920).contains(&page.width), "width {}", page.width);
    }
}
