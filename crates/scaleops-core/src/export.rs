//! Document exporter.
//!
//! HTML and text are rendered here. PDF is delegated to an external
//! HTML-to-PDF render service; when it is unconfigured, not ready within its
//! timeout, or fails, the PDF request degrades to the HTML rendering instead
//! of failing the export.
//!
//! Filenames follow `{itemId}-{artifactType}-{YYYY-MM-DD}.{ext}`.

use std::io::{Cursor, Write};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use zip::write::SimpleFileOptions;

use crate::analysis::AnalysisResult;
use crate::answers::Answers;
use crate::config::{BandThresholds, RenderConfig};
use crate::error::{Result, ScaleOpsError};
use crate::types::ExportFormat;

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub item_id: String,
    pub project: String,
    pub answers: Answers,
    pub analysis: Option<AnalysisResult>,
    pub generated_at: DateTime<Utc>,
}

/// Which slice of the document to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Report,
    Worksheet,
    Analysis,
}

impl Part {
    pub fn artifact_type(self) -> &'static str {
        match self {
            Part::Report => "report",
            Part::Worksheet => "worksheet",
            Part::Analysis => "analysis",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Part::Report => "Assessment Report",
            Part::Worksheet => "Worksheet",
            Part::Analysis => "Analysis",
        }
    }

    fn has_answers(self) -> bool {
        matches!(self, Part::Report | Part::Worksheet)
    }

    fn has_analysis(self) -> bool {
        matches!(self, Part::Report | Part::Analysis)
    }
}

pub fn filename(item_id: &str, artifact_type: &str, date: NaiveDate, ext: &str) -> String {
    format!("{item_id}-{artifact_type}-{}.{ext}", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    /// Format actually produced.
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    /// Requested format when a fallback was used.
    pub fallback_from: Option<ExportFormat>,
}

// ---------------------------------------------------------------------------
// HTML / text rendering
// ---------------------------------------------------------------------------

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;color:#222}\
.good{color:#1b7f3b}.fair{color:#b26a00}.needs_work{color:#b3261e}\
table{border-collapse:collapse;width:100%}td,th{border:1px solid #ddd;padding:.4rem;text-align:left}";

pub fn render_html(doc: &ExportDocument, part: Part, bands: &BandThresholds) -> String {
    let mut out = String::with_capacity(4 * 1024);
    let title = format!("{} {}", doc.item_id, part.title());
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    out.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));
    out.push_str(&format!(
        "<h1>{}</h1>\n<p>{} · generated {}</p>\n",
        escape_html(&title),
        escape_html(&doc.project),
        doc.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    if part.has_answers() {
        out.push_str("<h2>Worksheet</h2>\n");
        if doc.answers.is_empty() {
            out.push_str("<p>No answers saved.</p>\n");
        }
        for answer in doc.answers.values() {
            out.push_str(&format!(
                "<h3>{}</h3>\n<p>{}</p>\n",
                escape_html(&answer.label),
                escape_html(&answer.value).replace('\n', "<br>")
            ));
        }
    }

    if part.has_analysis() {
        out.push_str("<h2>Analysis</h2>\n");
        match &doc.analysis {
            None => out.push_str("<p>No analysis yet.</p>\n"),
            Some(a) => {
                let band = bands.band(a.score);
                out.push_str(&format!(
                    "<p class=\"{}\"><strong>{}/100</strong> ({})</p>\n<p>{}</p>\n",
                    band.as_str(),
                    a.score,
                    band.label(),
                    escape_html(&a.summary)
                ));
                out.push_str("<table>\n<tr><th>Dimension</th><th>Points</th><th>Score</th><th>Feedback</th></tr>\n");
                for d in &a.dimensions {
                    out.push_str(&format!(
                        "<tr><td>{}</td><td>{}/{}</td><td class=\"{}\">{}%</td><td>{}</td></tr>\n",
                        escape_html(&d.name),
                        d.score,
                        d.max,
                        bands.band(d.percent()).as_str(),
                        d.percent(),
                        escape_html(&d.feedback)
                    ));
                }
                out.push_str("</table>\n");
                push_html_list(&mut out, "Strengths", &a.strengths);
                push_html_list(&mut out, "Areas to improve", &a.weaknesses);
            }
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn push_html_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("<h3>{heading}</h3>\n<ul>\n"));
    for item in items {
        out.push_str(&format!("<li>{}</li>\n", escape_html(item)));
    }
    out.push_str("</ul>\n");
}

pub fn render_text(doc: &ExportDocument, part: Part, bands: &BandThresholds) -> String {
    let mut out = String::new();
    let title = format!("{} {}", doc.item_id, part.title());
    out.push_str(&format!("{title}\n{}\n", "=".repeat(title.chars().count())));
    out.push_str(&format!(
        "{} · generated {}\n\n",
        doc.project,
        doc.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    if part.has_answers() {
        out.push_str("WORKSHEET\n\n");
        if doc.answers.is_empty() {
            out.push_str("No answers saved.\n\n");
        }
        for answer in doc.answers.values() {
            out.push_str(&format!("{}\n{}\n\n", answer.label, answer.value));
        }
    }

    if part.has_analysis() {
        out.push_str("ANALYSIS\n\n");
        match &doc.analysis {
            None => out.push_str("No analysis yet.\n"),
            Some(a) => {
                out.push_str(&format!(
                    "Score: {}/100 ({})\n{}\n\n",
                    a.score,
                    bands.band(a.score).label(),
                    a.summary
                ));
                for d in &a.dimensions {
                    out.push_str(&format!(
                        "- {}: {}/{} points ({}%) {}\n",
                        d.name,
                        d.score,
                        d.max,
                        d.percent(),
                        d.feedback
                    ));
                }
                if !a.strengths.is_empty() {
                    out.push_str("\nStrengths:\n");
                    for s in &a.strengths {
                        out.push_str(&format!("  + {s}\n"));
                    }
                }
                if !a.weaknesses.is_empty() {
                    out.push_str("\nAreas to improve:\n");
                    for w in &a.weaknesses {
                        out.push_str(&format!("  - {w}\n"));
                    }
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// PDF rendering
// ---------------------------------------------------------------------------

/// HTML to PDF. Failures are reported as [`ScaleOpsError::LibraryUnavailable`].
pub trait PdfRenderer: Send + Sync {
    /// Resolve once the renderer can take work, or fail after its timeout.
    fn ready(&self) -> Result<()>;
    fn render_pdf(&self, html: &str) -> Result<Vec<u8>>;
}

/// Remote render service: `GET {url}/health`, `POST {url}/render` (HTML in, PDF out).
pub struct RenderService {
    url: String,
    client: Client,
    ready_timeout: Duration,
}

impl RenderService {
    pub fn new(url: &str, timeout: Duration, ready_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScaleOpsError::LibraryUnavailable(e.to_string()))?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
            ready_timeout,
        })
    }

    pub fn from_config(config: &RenderConfig) -> Result<Option<Self>> {
        match &config.url {
            Some(url) => Ok(Some(Self::new(
                url,
                Duration::from_secs(config.timeout_secs),
                Duration::from_millis(config.ready_timeout_ms),
            )?)),
            None => Ok(None),
        }
    }
}

fn unavailable(e: impl std::fmt::Display) -> ScaleOpsError {
    ScaleOpsError::LibraryUnavailable(e.to_string())
}

impl PdfRenderer for RenderService {
    fn ready(&self) -> Result<()> {
        let res = self
            .client
            .get(format!("{}/health", self.url))
            .timeout(self.ready_timeout)
            .send()
            .map_err(unavailable)?;
        if !res.status().is_success() {
            return Err(unavailable(format!("health check returned {}", res.status())));
        }
        Ok(())
    }

    fn render_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let res = self
            .client
            .post(format!("{}/render", self.url))
            .header(CONTENT_TYPE, "text/html; charset=utf-8")
            .body(html.to_string())
            .send()
            .map_err(unavailable)?;
        if !res.status().is_success() {
            return Err(unavailable(format!("render returned {}", res.status())));
        }
        let bytes = res.bytes().map_err(unavailable)?;
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Exporter
// ---------------------------------------------------------------------------

pub struct Exporter {
    renderer: Option<Box<dyn PdfRenderer>>,
    bands: BandThresholds,
}

impl Exporter {
    pub fn new(renderer: Option<Box<dyn PdfRenderer>>, bands: BandThresholds) -> Self {
        Self { renderer, bands }
    }

    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let renderer = RenderService::from_config(&config.render)?
            .map(|r| Box::new(r) as Box<dyn PdfRenderer>);
        Ok(Self::new(renderer, config.bands))
    }

    pub fn export(&self, doc: &ExportDocument, format: ExportFormat) -> Result<ExportedFile> {
        let date = doc.generated_at.date_naive();
        let name = |part: Part, ext: &str| filename(&doc.item_id, part.artifact_type(), date, ext);

        let file = match format {
            ExportFormat::Pdf => self.pdf_or_fallback(doc, Part::Report),
            ExportFormat::Html => ExportedFile {
                filename: name(Part::Report, "html"),
                format,
                bytes: render_html(doc, Part::Report, &self.bands).into_bytes(),
                fallback_from: None,
            },
            ExportFormat::Text => ExportedFile {
                filename: name(Part::Report, "txt"),
                format,
                bytes: render_text(doc, Part::Report, &self.bands).into_bytes(),
                fallback_from: None,
            },
            ExportFormat::Docx => ExportedFile {
                filename: name(Part::Report, "docx"),
                format,
                bytes: render_text(doc, Part::Report, &self.bands).into_bytes(),
                fallback_from: None,
            },
            ExportFormat::Bundle => self.bundle(doc)?,
        };
        tracing::info!(
            item = %doc.item_id,
            file = %file.filename,
            fallback = file.fallback_from.is_some(),
            "exported"
        );
        Ok(file)
    }

    fn try_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| unavailable("no PDF renderer configured"))?;
        renderer.ready()?;
        renderer.render_pdf(html)
    }

    fn pdf_or_fallback(&self, doc: &ExportDocument, part: Part) -> ExportedFile {
        let date = doc.generated_at.date_naive();
        let html = render_html(doc, part, &self.bands);
        match self.try_pdf(&html) {
            Ok(bytes) => ExportedFile {
                filename: filename(&doc.item_id, part.artifact_type(), date, "pdf"),
                format: ExportFormat::Pdf,
                bytes,
                fallback_from: None,
            },
            Err(e) => {
                tracing::warn!(item = %doc.item_id, error = %e, "PDF unavailable, exporting HTML");
                ExportedFile {
                    filename: filename(&doc.item_id, part.artifact_type(), date, "html"),
                    format: ExportFormat::Html,
                    bytes: html.into_bytes(),
                    fallback_from: Some(ExportFormat::Pdf),
                }
            }
        }
    }

    fn bundle(&self, doc: &ExportDocument) -> Result<ExportedFile> {
        let date = doc.generated_at.date_naive();
        let mut parts = vec![Part::Worksheet];
        if doc.analysis.is_some() {
            parts.push(Part::Analysis);
        }
        let files: Vec<ExportedFile> = parts
            .into_iter()
            .map(|p| self.pdf_or_fallback(doc, p))
            .collect();

        let mut readme = format!(
            "{} export for {}\nGenerated {}\n\nContents:\n",
            doc.project,
            doc.item_id,
            doc.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        for f in &files {
            readme.push_str(&format!("  {}\n", f.filename));
        }
        if files.iter().any(|f| f.fallback_from.is_some()) {
            readme.push_str("\nPDF rendering was unavailable; documents are included as HTML.\n");
        }

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for f in &files {
            zip.start_file(f.filename.as_str(), options).map_err(zip_err)?;
            zip.write_all(&f.bytes)?;
        }
        zip.start_file("README.txt", options).map_err(zip_err)?;
        zip.write_all(readme.as_bytes())?;
        let bytes = zip.finish().map_err(zip_err)?.into_inner();

        Ok(ExportedFile {
            filename: filename(&doc.item_id, "bundle", date, "zip"),
            format: ExportFormat::Bundle,
            bytes,
            fallback_from: None,
        })
    }
}

fn zip_err(e: zip::result::ZipError) -> ScaleOpsError {
    ScaleOpsError::Io(std::io::Error::other(e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
