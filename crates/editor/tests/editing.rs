//! End-to-end tests: load, extract, edit and compile real documents

use editor::{
    edited_file_name, load_document, Action, CompileInput, Compiler, DrawingPath, EditorConfig,
    ExtractionLatch, PageDimensions, PageSource, PaginationPosition, Point, Session,
    StateRasters, Store, TextBlock, TextExtractor, Tool,
};
use lopdf::dictionary;
use pdf_core::{PdfReader, TextRun};
use pretty_assertions::assert_eq;

/// Build a document with one 600 x 800 page per content stream
///
/// `/F1` is bound to `base_font` on every page.
fn create_test_pdf(contents: &[&[u8]], base_font: &str) -> Vec<u8> {
    let mut doc = lopdf::Document::new();

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    });

    let mut page_ids = Vec::new();
    for content in contents {
        let contents_id = doc.add_object(lopdf::Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 600.into(), 800.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => contents_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => contents.len() as i64,
            "Kids" => page_ids.into_iter().map(lopdf::Object::from).collect::<Vec<_>>(),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn two_page_pdf() -> Vec<u8> {
    create_test_pdf(
        &[
            b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET",
            b"BT /F1 12 Tf 100 700 Td (Total) Tj ET",
        ],
        "Helvetica",
    )
}

fn runs(pdf: &[u8], page: usize) -> Vec<TextRun> {
    PdfReader::from_bytes(pdf)
        .unwrap()
        .page(page)
        .unwrap()
        .text_content()
        .unwrap()
        .runs
}

fn texts(runs: &[TextRun]) -> Vec<&str> {
    runs.iter().map(|run| run.text.as_str()).collect()
}

fn page_content(pdf: &[u8], page: u32) -> String {
    let doc = lopdf::Document::load_mem(pdf).unwrap();
    let page_id = doc.get_pages()[&page];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

/// Load, record dimensions at `scale` and extract every page
async fn open(pdf: &[u8], scale: f64) -> Store {
    let mut store = Store::new();
    let reader = load_document(&mut store, pdf, "report.pdf").unwrap();
    let extractor = TextExtractor::default();
    for number in 1..=reader.page_count() {
        let page = reader.page(number).unwrap();
        let viewport = page.viewport(scale);
        store.dispatch(Action::SetPageDimensions {
            page_index: page.page_index(),
            dimensions: PageDimensions {
                width: viewport.width,
                height: viewport.height,
                scale,
            },
        });
        extractor
            .extract_into(&page, &ExtractionLatch::new(), &mut store)
            .await;
    }
    store
}

#[tokio::test]
async fn test_extracts_runs_from_document() {
    let pdf = create_test_pdf(&[b"BT /F1 14 Tf 72 500 Td (Invoice) Tj ET"], "ABCDEF+Arial-BoldItalic");
    let reader = PdfReader::from_bytes(&pdf).unwrap();
    let page = reader.page(1).unwrap();

    let texts = TextExtractor::default().extract(&page).await;
    assert_eq!(texts.len(), 1);

    let text = &texts[0];
    assert_eq!(text.page_index, 0);
    assert_eq!(text.original_str, "Invoice");
    assert_eq!((text.pdf_x, text.pdf_y), (72.0, 500.0));
    assert_eq!(text.pdf_font_size, 14.0);
    assert_eq!(text.font_name, "F1");
    assert_eq!(text.css_font_family, "Arial");
    assert!(text.is_bold);
    assert!(text.is_italic);
    assert_eq!(text.color, "#000000");
    assert_eq!(text.id.len(), 32);
}

#[tokio::test]
async fn test_extraction_runs_once_per_page() {
    let pdf = two_page_pdf();
    let mut store = Store::new();
    let reader = load_document(&mut store, &pdf, "report.pdf").unwrap();
    let page = reader.page(1).unwrap();
    let latch = ExtractionLatch::new();
    let extractor = TextExtractor::default();

    assert_eq!(extractor.extract_into(&page, &latch, &mut store).await, 1);
    assert_eq!(extractor.extract_into(&page, &latch, &mut store).await, 0);
    assert_eq!(store.state().extracted_texts.len(), 1);
}

#[tokio::test]
async fn test_two_page_compile() {
    let pdf = two_page_pdf();
    let mut store = open(&pdf, 1.5).await;

    let hello = store.state().extracted_texts_on(0).next().unwrap().id.clone();
    store.dispatch(Action::UpdateExtractedText {
        id: hello,
        edited_str: "Howdy".to_string(),
    });
    store.dispatch(Action::AddTextBlock {
        block: TextBlock {
            text: "Note".to_string(),
            font_size: 24.0,
            ..TextBlock::at_click(1, Point::new(75.0, 150.0), 24.0, "#0000ff")
        },
    });
    store.dispatch(Action::SelectTool { tool: Tool::Draw });
    store.dispatch(Action::AddDrawing {
        drawing: DrawingPath {
            id: "ink".to_string(),
            page_index: 0,
            points: vec![Point::new(10.0, 10.0), Point::new(200.0, 200.0)],
            color: "#ff0000".to_string(),
            width: 3.0,
            opacity: 1.0,
        },
    });
    store.dispatch(Action::SetPaginationEnabled { enabled: true });
    assert_eq!(store.state().edit_count(), 3);

    let state = store.snapshot();
    let rasters = StateRasters::new(&state);
    let input = CompileInput::from_state(&state, &rasters).unwrap();
    let output = Compiler::default().compile(&input).unwrap();

    let first = runs(&output, 1);
    assert_eq!(texts(&first), vec!["Hello", "Howdy", "Page 1 / 2"]);
    assert_eq!(first[1].transform, [12.0, 0.0, 0.0, 12.0, 100.0, 700.0]);
    let footer = &first[2];
    let center = footer.transform[4] + footer.width / 2.0;
    assert!((center - 300.0).abs() < 1e-3);
    assert!((footer.transform[5] - 14.0).abs() < 1e-3);

    let first_content = page_content(&output, 1);
    assert!(first_content.contains("1 1 1 rg"));
    assert!(first_content.contains("600 0 0 800 0 0 cm"));
    assert!(first_content.contains("Do"));

    let second = runs(&output, 2);
    assert_eq!(texts(&second), vec!["Total", "Note", "Page 2 / 2"]);
    // (75, 150) display at scale 1.5, 24px -> 16pt
    let note = &second[1];
    assert!((note.transform[0] - 16.0).abs() < 1e-3);
    assert!((note.transform[4] - 50.0).abs() < 1e-3);
    assert!((note.transform[5] - 684.0).abs() < 1e-3);
    assert!(!page_content(&output, 2).contains("Do"));

    // The snapshot is untouched
    assert_eq!(state.pdf_data.as_deref(), Some(pdf.as_slice()));
}

#[tokio::test]
async fn test_block_and_ink_on_blank_document() {
    let pdf = create_test_pdf(&[b"", b""], "Helvetica");
    let mut store = open(&pdf, 1.0).await;

    store.dispatch(Action::AddTextBlock {
        block: TextBlock {
            text: "Hello".to_string(),
            ..TextBlock::at_click(0, Point::new(50.0, 50.0), 16.0, "#000000")
        },
    });
    store.dispatch(Action::AddDrawing {
        drawing: DrawingPath {
            id: "ink".to_string(),
            page_index: 1,
            points: vec![
                Point::new(10.0, 10.0),
                Point::new(60.0, 40.0),
                Point::new(120.0, 10.0),
            ],
            color: "#000000".to_string(),
            width: 3.0,
            opacity: 1.0,
        },
    });

    let state = store.snapshot();
    let rasters = StateRasters::new(&state);
    let input = CompileInput::from_state(&state, &rasters).unwrap();
    let output = Compiler::default().compile(&input).unwrap();

    assert_eq!(PdfReader::from_bytes(&output).unwrap().page_count(), 2);

    let first = runs(&output, 1);
    assert_eq!(texts(&first), vec!["Hello"]);
    // 800 - 50 - 16
    assert!((first[0].transform[4] - 50.0).abs() < 1e-3);
    assert!((first[0].transform[5] - 734.0).abs() < 1e-3);
    assert!(!page_content(&output, 1).contains("Do"));

    assert!(runs(&output, 2).is_empty());
    let second = page_content(&output, 2);
    assert!(second.contains("600 0 0 800 0 0 cm"));
    assert!(second.contains("Do"));
}

#[tokio::test]
async fn test_compile_without_edits_keeps_text() {
    let pdf = two_page_pdf();
    let store = open(&pdf, 1.0).await;
    let state = store.snapshot();
    let rasters = StateRasters::new(&state);
    let input = CompileInput::from_state(&state, &rasters).unwrap();
    let output = Compiler::default().compile(&input).unwrap();

    assert_eq!(texts(&runs(&output, 1)), vec!["Hello"]);
    assert_eq!(texts(&runs(&output, 2)), vec!["Total"]);
}

#[tokio::test]
async fn test_session_run() {
    let pdf = two_page_pdf();
    let session = Session::from_json(
        r##"{
            "textEdits": [
                { "pageIndex": 1, "find": "Total", "replace": "Sum", "style": { "color": "#ff0000" } }
            ],
            "actions": [
                { "type": "SET_PAGINATION_ENABLED", "enabled": true },
                { "type": "SET_PAGINATION_POSITION", "position": "bottom-right" }
            ]
        }"##,
    )
    .unwrap();

    let compiled = session.run(&pdf, "Report.PDF").await.unwrap();
    assert_eq!(compiled.file_name, "Report_edited.pdf");
    assert_eq!(compiled.edit_count, 1);

    let second = runs(&compiled.bytes, 2);
    assert_eq!(texts(&second), vec!["Total", "Sum", "Page 2 / 2"]);
    let right_edge = second[2].transform[4] + second[2].width;
    assert!((right_edge - 564.0).abs() < 1e-3);
    assert!(page_content(&compiled.bytes, 2).contains("1 0 0 rg"));
}

#[test]
fn test_session_rejects_bad_json() {
    assert!(Session::from_json("{ not json").is_err());
    let config = EditorConfig::from_json(r#"{ "eraserThreshold": 20 }"#).unwrap();
    assert_eq!(config.eraser_threshold, 20.0);
    assert_eq!(PaginationPosition::default(), PaginationPosition::BottomCenter);
    assert_eq!(edited_file_name("x.pdf"), "x_edited.pdf");
}
