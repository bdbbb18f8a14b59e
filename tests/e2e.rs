//! End-to-end integration tests for thermo-extract.
//!
//! Most tests run both pipelines on generated fixtures: markdown text written
//! to a temp file, the PDF cascade over a `TableDocument` double, and small
//! report PDFs drawn with lopdf. Tests that open the sample reports in
//! `./test_cases/` are gated behind the `E2E_ENABLED` environment variable.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thermo_extract::pipeline::layout::{PageLayout, Table};
use thermo_extract::{
    extract_from_document, extract_markdown, extract_markdown_to_file, extract_pdf,
    extract_pdf_from_bytes, inspect, read_records, records_to_json, ExtractionConfig,
    ExtractionProgressCallback, Flavor, PageSelection, Phase, ProgressCallback, StageError,
    TableDocument, ThermoError, RECORD_KEYS,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Every record object carries exactly the twelve schema keys.
fn assert_schema(json: &str, context: &str) {
    let value: Value = serde_json::from_str(json).expect("output must be valid JSON");
    let array = value.as_array().expect("output must be a JSON array");
    for (i, item) in array.iter().enumerate() {
        let obj = item
            .as_object()
            .unwrap_or_else(|| panic!("[{context}] item {i} is not an object"));
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        let mut expected = RECORD_KEYS.to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected, "[{context}] item {i} has the wrong key set");
        for (key, v) in obj {
            assert!(
                v.is_string() || v.is_number(),
                "[{context}] item {i} key {key} is neither a number nor a string: {v}"
            );
        }
    }
    println!("[{context}] ✓  {} records, schema checks passed", array.len());
}

fn diag_value<'a>(diagnostics: &'a [String], key: &str) -> Option<&'a str> {
    diagnostics
        .iter()
        .find_map(|d| d.strip_prefix(key).and_then(|rest| rest.strip_prefix('=')))
}

/// In-memory stand-in for a loaded PDF.
#[derive(Default)]
struct MockDocument {
    ruled: Vec<Table>,
    stream: Vec<Table>,
    layout: Vec<Vec<Table>>,
    texts: Vec<Option<String>>,
}

impl TableDocument for MockDocument {
    fn page_count(&self) -> usize {
        self.texts.len()
    }

    fn extract_tables(&self, flavor: Flavor) -> Result<Vec<Table>, StageError> {
        Ok(match flavor {
            Flavor::Ruled => self.ruled.clone(),
            Flavor::Stream => self.stream.clone(),
        })
    }

    fn extract_page_tables(&self, page: usize, layout: PageLayout) -> Result<Vec<Table>, StageError> {
        if layout != PageLayout::LinesLines {
            return Ok(Vec::new());
        }
        Ok(self.layout.get(page).cloned().unwrap_or_default())
    }

    fn extract_page_text(&self, page: usize) -> Result<String, StageError> {
        self.texts
            .get(page)
            .cloned()
            .flatten()
            .ok_or(StageError::PageTextFailed {
                page: page + 1,
                detail: "no text layer".into(),
            })
    }
}

fn table(rows: &[&[&str]]) -> Table {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

// ── Markdown pipeline ────────────────────────────────────────────────────────

const ENTHALPY_MD: &str = "\
# Active Thermochemical Tables (excerpt)

Species Name    Formula   ΔfH(0 K)   ΔfH(298.15 K)   Uncertainty   Mass   CAS

Dihydrogen
H2 0 0 exact 2.01588 ± 0.00014 1333-74-0*1

Water
H2O -238.92 -241.83 ± 0.03 kJ/mol
18.0153 ± 0.0003 7732-18-5*2

Methylidyne
CH 592.3 596.1 ±0.1 kJ/mol 13.019 3315-37-9*11
";

#[tokio::test]
async fn test_markdown_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("enthalpy.md");
    let dst = dir.path().join("out").join("enthalpy.json");
    tokio::fs::write(&src, ENTHALPY_MD).await.unwrap();

    let out = extract_markdown_to_file(&src, &dst, &ExtractionConfig::default())
        .await
        .expect("markdown extraction should succeed");

    let names: Vec<_> = out
        .records
        .iter()
        .map(|r| r.common_name.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(names, vec!["Dihydrogen", "Water", "Methylidyne"]);
    assert_eq!(diag_value(&out.diagnostics, "start_anchor"), Some("sentinel"));

    let h2 = &out.records[0];
    assert_eq!(h2.structure.as_deref(), Some("H2"));
    assert_eq!(h2.uncertainty_value, None);
    assert_eq!(h2.molecular_mass, Some(2.01588));
    assert_eq!(h2.molecular_mass_uncertainty, Some(0.00014));
    assert_eq!(h2.cas_rn.as_deref(), Some("1333-74-0"));
    assert_eq!(h2.relative_rank, Some(1));

    let water = &out.records[1];
    assert_eq!(water.enthalpy_of_formation_0k, Some(-238.92));
    assert_eq!(water.enthalpy_of_formation_298k, Some(-241.83));
    assert_eq!(water.uncertainty_value, Some(0.03));
    assert_eq!(water.cas_rn.as_deref(), Some("7732-18-5"));

    let ch = &out.records[2];
    assert_eq!(ch.uncertainty_value, Some(0.1));
    assert_eq!(ch.relative_rank, Some(11));

    let json = tokio::fs::read_to_string(&dst).await.unwrap();
    assert_schema(&json, "markdown");
    assert!(json.contains("\"entropy_298K\": \"\""));

    let back = read_records(&dst).await.unwrap();
    assert_eq!(back, out.records);
}

#[tokio::test]
async fn test_markdown_header_fallback_and_custom_sentinel() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("table.md");
    let text = "Preamble\nSpecies Name  Formula\nOxygen\nO2 0 0 exact 31.998 7782-44-7*3\n";
    tokio::fs::write(&src, text).await.unwrap();

    let out = extract_markdown(&src, &ExtractionConfig::default()).await.unwrap();
    assert_eq!(diag_value(&out.diagnostics, "start_anchor"), Some("header"));
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].common_name.as_deref(), Some("Oxygen"));

    let config = ExtractionConfig::builder()
        .sentinel_species("Oxygen")
        .build()
        .unwrap();
    let out = extract_markdown(&src, &config).await.unwrap();
    assert_eq!(diag_value(&out.diagnostics, "start_anchor"), Some("sentinel"));
    assert_eq!(out.records[0].structure.as_deref(), Some("O2"));
}

#[tokio::test]
async fn test_markdown_missing_file_is_fatal() {
    let err = extract_markdown("/definitely/not/here.md", &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ThermoError::FileNotFound { .. }));
}

// ── PDF cascade over a document double ───────────────────────────────────────

#[test]
fn test_cascade_falls_through_to_text_scrape() {
    let doc = MockDocument {
        texts: vec![Some(
            "Standard thermodynamic properties\nCO2   -393.5   213.8   -394.4\nnotes only\n".into(),
        )],
        ..MockDocument::default()
    };

    let out = extract_from_document(&doc, &ExtractionConfig::default());
    assert_eq!(
        out.diagnostics,
        vec![
            "ruled_tables=0",
            "stream_tables=0",
            "layout_tables=0",
            "records_after_tables=0",
            "records_after_text_scrape=1",
        ]
    );
    assert!(out.stats.text_scraped);
    let co2 = &out.records[0];
    assert_eq!(co2.structure.as_deref(), Some("CO2"));
    assert_eq!(co2.enthalpy_of_formation_298k, Some(-393.5));
    assert_eq!(co2.entropy_298k, Some(213.8));
    assert_eq!(co2.gibbs_free_energy_298k, Some(-394.4));
    assert_eq!(co2.phase, None);

    assert_schema(&records_to_json(&out.records).unwrap(), "scrape");
}

#[test]
fn test_malformed_row_is_skipped() {
    let doc = MockDocument {
        ruled: vec![table(&[
            &["State", "Formula", "Enthalpy (kJ/mol)", "Entropy (J/mol K)"],
            &["g", "CO2", "-393.5", "213.8"],
            &["l", "H2O", "−285.8", "69.95"],
            &["s"],
            &["aq", "Na+", "-240.1", "59.0"],
        ])],
        texts: vec![None],
        ..MockDocument::default()
    };

    let out = extract_from_document(&doc, &ExtractionConfig::default());
    assert_eq!(out.records.len(), 3, "one of four data rows is malformed");
    assert_eq!(out.stats.skipped, 1);
    assert_eq!(out.stats.strategy.as_deref(), Some("ruled"));
    assert!(matches!(
        out.failures[0],
        StageError::RowSkipped { table: 0, row: 3, .. }
    ));
    assert_eq!(out.records[0].phase, Some(Phase::Gas));
    assert_eq!(out.records[2].phase, Some(Phase::Aqueous));
    assert_eq!(diag_value(&out.diagnostics, "records_after_tables"), Some("3"));
    assert_eq!(diag_value(&out.diagnostics, "records_after_text_scrape"), None);
}

#[test]
fn test_layout_tables_are_used_per_page() {
    let doc = MockDocument {
        layout: vec![
            vec![],
            vec![table(&[&["Species", "Enthalpy"], &["CH4", "-74.87"]])],
        ],
        texts: vec![Some(String::new()), Some(String::new())],
        ..MockDocument::default()
    };
    let out = extract_from_document(&doc, &ExtractionConfig::default());
    assert_eq!(out.stats.strategy.as_deref(), Some("page_layout"));
    assert_eq!(diag_value(&out.diagnostics, "layout_tables"), Some("1"));
    assert_eq!(out.records[0].structure.as_deref(), Some("CH4"));
}

#[test]
fn test_empty_document_yields_empty_array() {
    let doc = MockDocument::default();
    let out = extract_from_document(&doc, &ExtractionConfig::default());
    assert!(out.records.is_empty());
    assert!(out.failures.is_empty());
    for key in [
        "ruled_tables",
        "stream_tables",
        "layout_tables",
        "records_after_tables",
        "records_after_text_scrape",
    ] {
        assert_eq!(diag_value(&out.diagnostics, key), Some("0"), "{key}");
    }
    assert_eq!(records_to_json(&out.records).unwrap(), "[]");
}

#[test]
fn test_unreadable_page_is_noted_not_fatal() {
    let doc = MockDocument {
        texts: vec![None, Some("NH3   -45.9   192.8".into())],
        ..MockDocument::default()
    };
    let out = extract_from_document(&doc, &ExtractionConfig::default());
    assert_eq!(out.records.len(), 1);
    assert_eq!(diag_value(&out.diagnostics, "text_scrape_failed_pages"), Some("1"));
    assert!(matches!(out.failures[0], StageError::PageTextFailed { page: 1, .. }));
}

#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl ExtractionProgressCallback for EventLog {
    fn on_strategy_start(&self, strategy: &str) {
        self.0.lock().unwrap().push(format!("start:{strategy}"));
    }

    fn on_extraction_complete(&self, records: usize) {
        self.0.lock().unwrap().push(format!("done:{records}"));
    }
}

#[test]
fn test_progress_callback_sees_every_strategy() {
    let log = Arc::new(EventLog::default());
    let config = ExtractionConfig::builder()
        .progress_callback(log.clone() as ProgressCallback)
        .build()
        .unwrap();
    let doc = MockDocument {
        texts: vec![Some("O3   142.7   238.9".into())],
        ..MockDocument::default()
    };
    extract_from_document(&doc, &config);
    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            "start:ruled",
            "start:stream",
            "start:page_layout",
            "start:text_scrape",
            "done:1",
        ]
    );
}

// ── Generated report PDFs ────────────────────────────────────────────────────

/// Content stream of one US Letter page, in PDF user space (origin at the
/// bottom left, y grows upwards).
#[derive(Default)]
struct PageStream(String);

impl PageStream {
    fn text(&mut self, x: f64, y: f64, s: &str) -> &mut Self {
        self.0.push_str(&format!("BT /F1 10 Tf {x} {y} Td ({s}) Tj ET\n"));
        self
    }

    /// A fully ruled grid of 120 pt columns and 24 pt rows whose top-left
    /// corner sits at `(x0, y_top)`.
    fn ruled_table(&mut self, x0: f64, y_top: f64, rows: &[[&str; 3]]) -> &mut Self {
        let (col_w, row_h) = (120.0, 24.0);
        let x1 = x0 + col_w * 3.0;
        let y_bottom = y_top - row_h * rows.len() as f64;
        self.0.push_str("1 w\n");
        for r in 0..=rows.len() {
            let y = y_top - row_h * r as f64;
            self.0.push_str(&format!("{x0} {y} m {x1} {y} l S\n"));
        }
        for c in 0..=3 {
            let x = x0 + col_w * c as f64;
            self.0.push_str(&format!("{x} {y_top} m {x} {y_bottom} l S\n"));
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                self.text(x0 + col_w * c as f64 + 5.0, y_top - row_h * r as f64 - 16.0, cell);
            }
        }
        self
    }
}

/// A PDF with one page per stream, all sharing a Helvetica `/F1`.
fn report_pdf(pages: &[&PageStream]) -> Vec<u8> {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|page| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, page.0.clone().into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            Object::from(page_id)
        })
        .collect();
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("fixture PDF should serialise");
    buf
}

const OXIDES: [[&str; 3]; 3] = [
    ["Formula", "Enthalpy", "Entropy"],
    ["CO2", "-393.5", "213.8"],
    ["H2O", "-285.8", "69.9"],
];

const HYDRIDES: [[&str; 3]; 3] = [
    ["Formula", "Enthalpy", "Entropy"],
    ["CH4", "-74.87", "186.3"],
    ["NH3", "-45.9", "192.8"],
];

fn structures(out: &thermo_extract::ExtractionOutput) -> Vec<&str> {
    out.records
        .iter()
        .map(|r| r.structure.as_deref().unwrap_or(""))
        .collect()
}

#[tokio::test]
async fn test_titled_ruled_table_pdf() {
    let mut page = PageStream::default();
    page.text(72.0, 740.0, "Table 1. Standard thermodynamic properties")
        .ruled_table(72.0, 720.0, &OXIDES);

    let out = extract_pdf_from_bytes(&report_pdf(&[&page]), &ExtractionConfig::default())
        .await
        .expect("generated PDF should extract");

    assert_eq!(out.stats.strategy.as_deref(), Some("ruled"), "{}", out.diagnostics_line());
    assert_eq!(diag_value(&out.diagnostics, "ruled_tables"), Some("1"));
    assert_eq!(diag_value(&out.diagnostics, "records_after_tables"), Some("2"));
    assert_eq!(structures(&out), vec!["CO2", "H2O"]);
    assert_eq!(out.records[0].enthalpy_of_formation_298k, Some(-393.5));
    assert_eq!(out.records[1].entropy_298k, Some(69.9));
    assert_schema(&records_to_json(&out.records).unwrap(), "titled ruled table");
}

#[tokio::test]
async fn test_stacked_tables_between_title_and_footer() {
    let mut page = PageStream::default();
    page.text(72.0, 750.0, "Selected thermochemical data")
        .ruled_table(72.0, 720.0, &OXIDES)
        .text(72.0, 630.0, "Table 2. Hydrides")
        .ruled_table(72.0, 600.0, &HYDRIDES)
        .text(72.0, 60.0, "Page 1 of 1");

    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("stacked.pdf");
    tokio::fs::write(&src, report_pdf(&[&page])).await.unwrap();
    let src = src.to_str().unwrap();

    let out = extract_pdf(src, &ExtractionConfig::default()).await.unwrap();
    assert_eq!(out.stats.tables_found, 2, "{}", out.diagnostics_line());
    assert_eq!(diag_value(&out.diagnostics, "records_after_tables"), Some("4"));
    let mut found = structures(&out);
    found.sort_unstable();
    assert_eq!(found, vec!["CH4", "CO2", "H2O", "NH3"]);
    assert!(out.failures.is_empty(), "{:?}", out.failures);

    let previews = inspect(src, &ExtractionConfig::default(), 1, 2).await.unwrap();
    assert_eq!(previews[0].lines[0], "Selected thermochemical data");
}

#[tokio::test]
async fn test_unruled_columns_still_yield_records() {
    let mut page = PageStream::default();
    page.text(72.0, 750.0, "Table 3. Oxides without rulings");
    for (i, row) in OXIDES.iter().enumerate() {
        let y = 720.0 - 20.0 * i as f64;
        for (c, cell) in row.iter().enumerate() {
            page.text(72.0 + 130.0 * c as f64, y, cell);
        }
    }

    let out = extract_pdf_from_bytes(&report_pdf(&[&page]), &ExtractionConfig::default())
        .await
        .unwrap();
    assert_eq!(diag_value(&out.diagnostics, "ruled_tables"), Some("0"));
    assert_eq!(structures(&out), vec!["CO2", "H2O"], "{}", out.diagnostics_line());
    assert_eq!(out.records[0].enthalpy_of_formation_298k, Some(-393.5));
    assert_eq!(out.records[1].entropy_298k, Some(69.9));
}

#[tokio::test]
async fn test_page_selection_limits_generated_pdf() {
    let mut first = PageStream::default();
    first.ruled_table(72.0, 720.0, &OXIDES);
    let mut second = PageStream::default();
    second.ruled_table(72.0, 720.0, &HYDRIDES);

    let config = ExtractionConfig::builder()
        .pages(PageSelection::Single(2))
        .build()
        .unwrap();
    let out = extract_pdf_from_bytes(&report_pdf(&[&first, &second]), &config)
        .await
        .unwrap();
    assert_eq!(out.stats.units_scanned, 1);
    assert_eq!(structures(&out), vec!["CH4", "NH3"]);
}

// ── Sample reports ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_real_pdf_extraction() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("thermo_tables.pdf"));

    let out = extract_pdf(path.to_str().unwrap(), &ExtractionConfig::default())
        .await
        .expect("extract_pdf() should succeed");
    println!("{}", out.diagnostics_line());
    assert!(diag_value(&out.diagnostics, "ruled_tables").is_some());
    assert_schema(&records_to_json(&out.records).unwrap(), "thermo_tables.pdf");
}

#[tokio::test]
async fn test_real_pdf_inspect() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("thermo_tables.pdf"));

    let previews = inspect(path.to_str().unwrap(), &ExtractionConfig::default(), 3, 10)
        .await
        .expect("inspect() should succeed");
    assert!(!previews.is_empty());
    assert!(previews.iter().all(|p| p.lines.len() <= 10));
    for p in &previews {
        println!("=== PAGE {} ===", p.page_num);
        for line in &p.lines {
            println!("{line}");
        }
    }
}

#[tokio::test]
async fn test_text_file_rejected_as_pdf() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("not_a.pdf");
    tokio::fs::write(&src, ENTHALPY_MD).await.unwrap();
    let err = extract_pdf(src.to_str().unwrap(), &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ThermoError::NotAPdf { .. }));
}
