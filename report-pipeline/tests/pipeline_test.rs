use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use ai_llm_service::{AiLlmError, ProviderError, ProviderErrorKind, error_handler::Provider};
use async_trait::async_trait;
use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};
use report_pipeline::{
    DATA_PLACEHOLDER, DocumentParser, FormatDispatcher, ModelClient, ParsedDocument,
    PipelineConfig, PipelineError, ReportPipeline, ReportRegistry, Submission, UploadedDocument,
};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::TempDir;

/* --- fakes --- */

enum Reply {
    Text(String),
    Slow(Duration),
    Fail(fn() -> AiLlmError),
}

struct FakeModel {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn answering(text: &str) -> Arc<Self> {
        Self::new(Reply::Text(text.to_string()))
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for FakeModel {
    async fn invoke(&self, prompt: &str) -> Result<String, AiLlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(t) => Ok(t.clone()),
            Reply::Slow(d) => {
                tokio::time::sleep(*d).await;
                Ok("<p>late</p>".into())
            }
            Reply::Fail(make) => Err(make()),
        }
    }
}

#[derive(Default)]
struct CountingParser {
    calls: AtomicUsize,
}

impl DocumentParser for CountingParser {
    fn format_name(&self) -> &'static str {
        "counting"
    }

    fn parse(&self, _bytes: &[u8]) -> report_pipeline::Result<ParsedDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ParsedDocument::Pages(Vec::new()))
    }
}

/* --- fixtures --- */

const TEMPLATE_HEAD: &str = "Build an HTML dashboard from this data:\n";
const TEMPLATE_TAIL: &str = "\nReturn only HTML.";

struct Fixture {
    _dir: TempDir,
    cfg: PipelineConfig,
}

fn fixture_with_template(template: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report_prompt.txt");
    std::fs::write(&path, template).unwrap();
    let cfg = PipelineConfig {
        template_path: path,
        ..PipelineConfig::default()
    };
    Fixture { _dir: dir, cfg }
}

fn fixture() -> Fixture {
    fixture_with_template(&format!("{TEMPLATE_HEAD}{DATA_PLACEHOLDER}{TEMPLATE_TAIL}"))
}

fn pipeline(cfg: PipelineConfig, model: Arc<FakeModel>) -> ReportPipeline {
    ReportPipeline::new(cfg, model, Arc::new(ReportRegistry::new()))
}

/// Extracts the JSON spliced between the fixed template head and tail.
fn injected_json(prompt: &str) -> serde_json::Value {
    let body = prompt
        .strip_prefix(TEMPLATE_HEAD)
        .and_then(|p| p.strip_suffix(TEMPLATE_TAIL))
        .expect("prompt keeps template text around the data");
    serde_json::from_str(body).unwrap()
}

fn sales_workbook() -> Vec<u8> {
    let mut wb = Workbook::new();
    {
        let ws = wb.add_worksheet();
        ws.set_name("Summary").unwrap();
        ws.write_string(0, 0, "Region").unwrap();
        ws.write_string(0, 1, "Revenue").unwrap();
        ws.write_string(1, 0, "North").unwrap();
        ws.write_number(1, 1, 1200.0).unwrap();
        ws.write_string(2, 0, "South").unwrap();
        // revenue left blank
    }
    {
        let ws = wb.add_worksheet();
        ws.set_name("Detail").unwrap();
        ws.write_string(0, 0, "Item").unwrap();
        ws.write_string(0, 1, "Qty").unwrap();
        ws.write_string(1, 0, "Widget").unwrap();
        ws.write_number(1, 1, 2.5).unwrap();
    }
    wb.save_to_buffer().unwrap()
}

fn dated_workbook() -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Log").unwrap();
    ws.write_string(0, 0, "When").unwrap();
    ws.write_string(0, 1, "Flag").unwrap();
    let date = ExcelDateTime::from_ymd(2024, 3, 5).unwrap();
    let format = Format::new().set_num_format("yyyy-mm-dd");
    ws.write_datetime_with_format(1, 0, &date, &format).unwrap();
    ws.write_boolean(1, 1, false).unwrap();
    wb.save_to_buffer().unwrap()
}

fn two_page_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in ["Quarterly   Revenue", "Operating Costs"] {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 2,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/* --- submissions --- */

#[tokio::test]
async fn text_submission_is_wrapped_as_text_input() {
    let fx = fixture();
    let model = FakeModel::answering("<div>ok</div>");
    let p = pipeline(fx.cfg.clone(), model.clone());

    p.run(Submission::Text("abc".into())).await.unwrap();

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        injected_json(&prompts[0]),
        serde_json::json!({"source": "text_input", "content": "abc"})
    );
}

#[tokio::test]
async fn unsupported_extension_never_reaches_parser_or_model() {
    let fx = fixture();
    let model = FakeModel::answering("<div/>");
    let counting = Arc::new(CountingParser::default());
    let p = pipeline(fx.cfg.clone(), model.clone())
        .with_dispatcher(FormatDispatcher::new(counting.clone(), counting.clone()));

    let doc = UploadedDocument::new("notes.docx", b"PK\x03\x04".to_vec());
    let err = p.run(Submission::Document(doc)).await.unwrap_err();

    assert!(matches!(err, PipelineError::UnsupportedFormat(ref ext) if ext == "docx"));
    assert!(err.to_string().contains("docx"));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    assert!(model.prompts().is_empty());
    assert!(p.registry().is_empty().await);
}

#[tokio::test]
async fn oversized_document_is_rejected_before_parsing() {
    let fx = fixture();
    let cfg = PipelineConfig {
        max_upload_bytes: 8,
        ..fx.cfg.clone()
    };
    let counting = Arc::new(CountingParser::default());
    let model = FakeModel::answering("<div/>");
    let p = pipeline(cfg, model.clone())
        .with_dispatcher(FormatDispatcher::new(counting.clone(), counting.clone()));

    let doc = UploadedDocument::new("big.xlsx", vec![0u8; 9]);
    let err = p.run(Submission::Document(doc)).await.unwrap_err();

    assert!(matches!(err, PipelineError::FileTooLarge { size: 9, limit: 8 }));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn corrupt_spreadsheet_is_a_parse_failure() {
    let fx = fixture();
    let model = FakeModel::answering("<div/>");
    let p = pipeline(fx.cfg.clone(), model.clone());

    let doc = UploadedDocument::new("broken.xlsx", b"not a zip archive".to_vec());
    let err = p.run(Submission::Document(doc)).await.unwrap_err();

    assert!(matches!(err, PipelineError::ParseFailure { format: "spreadsheet", .. }));
    assert!(model.prompts().is_empty());
}

/* --- parsing through the pipeline --- */

#[tokio::test]
async fn workbook_sheets_and_rows_keep_source_order() {
    let fx = fixture();
    let p = pipeline(fx.cfg.clone(), FakeModel::answering("<div/>"));

    let doc = UploadedDocument::new("Sales.XLSX", sales_workbook());
    let parsed = p.prepare(Submission::Document(doc)).await.unwrap();
    let json = serde_json::to_string(&parsed).unwrap();

    assert_eq!(
        json,
        r#"{"Summary":[{"Region":"North","Revenue":"1200"},{"Region":"South","Revenue":""}],"Detail":[{"Item":"Widget","Qty":"2.5"}]}"#
    );
}

#[tokio::test]
async fn date_and_boolean_cells_render_as_text() {
    let fx = fixture();
    let p = pipeline(fx.cfg.clone(), FakeModel::answering("<div/>"));

    let doc = UploadedDocument::new("log.xlsx", dated_workbook());
    let parsed = p.prepare(Submission::Document(doc)).await.unwrap();

    assert_eq!(
        serde_json::to_string(&parsed).unwrap(),
        r#"{"Log":[{"When":"2024-03-05 00:00:00","Flag":"False"}]}"#
    );
}

#[tokio::test]
async fn parsing_is_deterministic() {
    let fx = fixture();
    let model = FakeModel::answering("<div/>");
    let p = pipeline(fx.cfg.clone(), model.clone());
    let bytes = sales_workbook();

    for _ in 0..2 {
        let doc = UploadedDocument::new("sales.xlsx", bytes.clone());
        p.run(Submission::Document(doc)).await.unwrap();
    }

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn pdf_pages_are_labelled_and_normalized() {
    let fx = fixture();
    let p = pipeline(fx.cfg.clone(), FakeModel::answering("<div/>"));

    let doc = UploadedDocument::new("deck.pdf", two_page_pdf());
    let parsed = p.prepare(Submission::Document(doc)).await.unwrap();

    let ParsedDocument::Pages(pages) = parsed else {
        panic!("expected pages, got {parsed:?}");
    };
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].label, "page_1");
    assert_eq!(pages[1].label, "page_2");
    assert!(pages[0].text.contains("Revenue"));
    assert!(pages[1].text.contains("Costs"));
    for page in &pages {
        assert!(!page.text.contains("  "));
        assert_eq!(page.text.trim(), page.text);
    }
}

/* --- model output and registry --- */

#[tokio::test]
async fn fenced_reply_is_sanitized_and_retrievable() {
    let fx = fixture();
    let p = pipeline(
        fx.cfg.clone(),
        FakeModel::answering("```html\n<div>Report</div>\n```"),
    );

    let report = p.run(Submission::Text("q3 numbers".into())).await.unwrap();
    assert_eq!(&*report.html, "<div>Report</div>");

    let stored = p.report(&report.id.to_string()).await.unwrap();
    assert_eq!(&*stored, "<div>Report</div>");
}

#[tokio::test]
async fn each_run_gets_a_fresh_id() {
    let fx = fixture();
    let p = pipeline(fx.cfg.clone(), FakeModel::answering("<p>same</p>"));

    let a = p.run(Submission::Text("x".into())).await.unwrap();
    let b = p.run(Submission::Text("x".into())).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(p.registry().len().await, 2);
}

#[tokio::test]
async fn empty_reply_is_invalid_and_not_registered() {
    let fx = fixture();
    let p = pipeline(fx.cfg.clone(), FakeModel::answering("```html\n   \n```"));

    let err = p.run(Submission::Text("x".into())).await.unwrap_err();
    assert!(matches!(err, PipelineError::ModelResponseInvalid(_)));
    assert!(p.registry().is_empty().await);
}

#[tokio::test]
async fn whitespace_only_reply_is_invalid_and_not_registered() {
    let fx = fixture();
    let p = pipeline(fx.cfg.clone(), FakeModel::answering("   \n "));

    let err = p.run(Submission::Text("x".into())).await.unwrap_err();
    assert!(matches!(err, PipelineError::ModelResponseInvalid(_)));
    assert!(p.registry().is_empty().await);
}

#[tokio::test]
async fn undecodable_provider_reply_is_invalid_response() {
    let fx = fixture();
    let model = FakeModel::new(Reply::Fail(|| {
        AiLlmError::Provider(ProviderError::new(
            Provider::OpenRouter,
            ProviderErrorKind::EmptyChoices,
        ))
    }));
    let p = pipeline(fx.cfg.clone(), model);

    let err = p.run(Submission::Text("x".into())).await.unwrap_err();
    assert!(matches!(err, PipelineError::ModelResponseInvalid(_)));
}

#[tokio::test]
async fn provider_failure_is_invocation_failure() {
    let fx = fixture();
    let model = FakeModel::new(Reply::Fail(|| {
        AiLlmError::Provider(ProviderError::new(
            Provider::OpenRouter,
            ProviderErrorKind::MissingApiKey,
        ))
    }));
    let p = pipeline(fx.cfg.clone(), model);

    let err = p.run(Submission::Text("x".into())).await.unwrap_err();
    assert!(matches!(err, PipelineError::ModelInvocationFailure(_)));
    assert!(p.registry().is_empty().await);
}

#[tokio::test]
async fn slow_model_times_out() {
    let fx = fixture();
    let cfg = PipelineConfig {
        model_timeout: Duration::from_millis(50),
        ..fx.cfg.clone()
    };
    let p = pipeline(cfg, FakeModel::new(Reply::Slow(Duration::from_secs(5))));

    let err = p.run(Submission::Text("x".into())).await.unwrap_err();
    assert!(matches!(err, PipelineError::ModelTimeout(d) if d == Duration::from_millis(50)));
    assert!(p.registry().is_empty().await);
}

#[tokio::test]
async fn unknown_or_malformed_id_is_not_found() {
    let fx = fixture();
    let p = pipeline(fx.cfg.clone(), FakeModel::answering("<div/>"));

    for id in ["67e55044-10b1-426f-9247-bb680e5fe0c8", "nope"] {
        let err = p.report(id).await.unwrap_err();
        assert!(matches!(err, PipelineError::ReportNotFound(ref got) if got == id));
    }
}

/* --- template problems --- */

#[tokio::test]
async fn template_without_placeholder_stops_before_model() {
    let fx = fixture_with_template("Make a dashboard. No data slot here.");
    let model = FakeModel::answering("<div/>");
    let p = pipeline(fx.cfg.clone(), model.clone());

    let err = p.run(Submission::Text("x".into())).await.unwrap_err();
    assert!(matches!(err, PipelineError::PlaceholderMissing));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn missing_template_file_stops_before_model() {
    let cfg = PipelineConfig {
        template_path: "/definitely/missing/report_prompt.txt".into(),
        ..PipelineConfig::default()
    };
    let model = FakeModel::answering("<div/>");
    let p = pipeline(cfg, model.clone());

    let err = p.run(Submission::Text("x".into())).await.unwrap_err();
    assert!(matches!(err, PipelineError::TemplateUnavailable { .. }));
    assert!(model.prompts().is_empty());
}
