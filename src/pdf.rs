use crate::notes::{plain_text, Notebook};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use image::RgbaImage;
use lopdf::{Object, ObjectId};
use pdfium_render::prelude::{PdfPageIndex, PdfRenderConfig, Pdfium};
use printpdf::{BuiltinFont, Mm, PdfDocument as PrintDocument};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const PDF_MIME: &str = "application/pdf";
pub const DEFAULT_SCALE: f32 = 1.5;
pub const ZOOM_STEP: f32 = 1.2;
pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 8.0;

/// A4 portrait in points.
pub const A4_SIZE: (f32, f32) = (595.28, 841.89);
/// 10 mm in points.
pub const EXPORT_MARGIN: f32 = 28.35;
const MM_PER_PT: f32 = 25.4 / 72.0;
const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfError {
    NotPdf,
    Unreadable,
    NothingToExport,
}

impl std::fmt::Display for PdfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdfError::NotPdf => write!(f, "Please select a valid PDF file."),
            PdfError::Unreadable => write!(f, "Error loading PDF. The file may be damaged."),
            PdfError::NothingToExport => write!(f, "There are no notes to export."),
        }
    }
}

impl std::error::Error for PdfError {}

/// A file chosen by the user for import.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub path: Option<PathBuf>,
    /// MIME type reported by the picker, if any.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: Some(path.to_path_buf()),
            mime: None,
            bytes,
        })
    }

    fn mime(&self) -> Option<&str> {
        if let Some(m) = self.mime.as_deref() {
            return Some(m);
        }
        let ext = Path::new(&self.name).extension()?.to_str()?;
        ext.eq_ignore_ascii_case("pdf").then_some(PDF_MIME)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfDocument {
    pub name: String,
    pub path: Option<PathBuf>,
    bytes: Arc<[u8]>,
    page_count: usize,
    page_size: (f32, f32),
}

impl PdfDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Size of the first page's media box in points, A4 when none is declared.
    pub fn page_size(&self) -> (f32, f32) {
        self.page_size
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f as f32),
        _ => None,
    }
}

/// Walk up the page tree until a `/MediaBox` is found.
fn media_box(doc: &lopdf::Document, page: ObjectId) -> Option<(f32, f32)> {
    let mut id = page;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(obj) = dict.get(b"MediaBox") {
            let values = match obj {
                Object::Reference(r) => doc.get_object(*r).ok()?.as_array().ok()?,
                other => other.as_array().ok()?,
            };
            let nums: Vec<f32> = values.iter().filter_map(number).collect();
            let [x0, y0, x1, y1] = nums[..] else {
                return None;
            };
            let size = ((x1 - x0).abs(), (y1 - y0).abs());
            return (size.0 > 0.0 && size.1 > 0.0).then_some(size);
        }
        id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Accept exactly one PDF file.
pub fn import(mut files: Vec<SelectedFile>) -> Result<PdfDocument, PdfError> {
    if files.len() != 1 {
        return Err(PdfError::NotPdf);
    }
    let file = files.remove(0);
    if file.mime() != Some(PDF_MIME) || !file.bytes.starts_with(b"%PDF-") {
        return Err(PdfError::NotPdf);
    }
    let parsed = lopdf::Document::load_mem(&file.bytes).map_err(|e| {
        tracing::warn!(name = %file.name, "failed to parse PDF: {e}");
        PdfError::Unreadable
    })?;
    let pages = parsed.get_pages();
    let Some(&first) = pages.values().next() else {
        tracing::warn!(name = %file.name, "PDF has no pages");
        return Err(PdfError::Unreadable);
    };
    let page_count = pages.len();
    let page_size = media_box(&parsed, first).unwrap_or(A4_SIZE);
    tracing::info!(name = %file.name, page_count, "PDF loaded");
    Ok(PdfDocument {
        name: file.name,
        path: file.path,
        bytes: Arc::from(file.bytes),
        page_count,
        page_size,
    })
}

/// Produces a bitmap for one page of a document.
pub trait PageRenderer {
    fn render_page(&mut self, doc: &PdfDocument, page: usize, scale: f32) -> Result<RgbaImage>;
}

/// Rasterizes pages with the PDFium library, bound at runtime from the
/// system library path.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_system_library().context("load the PDFium library")?;
        tracing::info!("PDFium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_page(&mut self, doc: &PdfDocument, page: usize, scale: f32) -> Result<RgbaImage> {
        anyhow::ensure!(
            (1..=doc.page_count()).contains(&page),
            "page {page} out of range"
        );
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(doc.bytes(), None)
            .with_context(|| format!("open {}", doc.name))?;
        let index = PdfPageIndex::try_from(page - 1).context("page index")?;
        let pdf_page = document.pages().get(index)?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = pdf_page.render_with_config(&config)?;
        let width = u32::try_from(bitmap.width())?;
        let height = u32::try_from(bitmap.height())?;
        RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .context("bitmap size does not match its buffer")
    }
}

/// Navigation and zoom state of the PDF window.
#[derive(Debug, Clone)]
pub struct PdfViewer {
    document: Option<PdfDocument>,
    page: usize,
    scale: f32,
}

impl Default for PdfViewer {
    fn default() -> Self {
        Self {
            document: None,
            page: 1,
            scale: DEFAULT_SCALE,
        }
    }
}

impl PdfViewer {
    pub fn load(&mut self, document: PdfDocument) {
        self.document = Some(document);
        self.page = 1;
    }

    pub fn close(&mut self) {
        self.document = None;
        self.page = 1;
    }

    pub fn document(&self) -> Option<&PdfDocument> {
        self.document.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.document.as_ref().map_or(0, PdfDocument::page_count)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn next_page(&mut self) -> bool {
        if self.page < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 && self.document.is_some() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale * ZOOM_STEP).min(MAX_SCALE);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale / ZOOM_STEP).max(MIN_SCALE);
    }

    pub fn reset_zoom(&mut self) {
        self.scale = DEFAULT_SCALE;
    }

    pub fn label(&self) -> Option<String> {
        self.document
            .as_ref()
            .map(|d| format!("Page {} of {}", self.page, d.page_count()))
    }
}

/// Serializes text pages into a document.
pub trait DocumentWriter {
    /// File extension of the produced document.
    fn extension(&self) -> &str;
    fn write(&self, pages: &[String], out: &mut dyn Write) -> Result<()>;
}

/// Text-only PDF writer: Helvetica on A4 portrait, each input page starting
/// on a new sheet. Long pages continue onto further sheets.
#[derive(Debug, Clone)]
pub struct SimplePdfWriter {
    pub font_size: f32,
    pub line_height: f32,
}

impl Default for SimplePdfWriter {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            line_height: 14.0,
        }
    }
}

impl SimplePdfWriter {
    fn chars_per_line(&self) -> usize {
        // Helvetica averages about half an em per glyph.
        let usable = A4_SIZE.0 - 2.0 * EXPORT_MARGIN;
        ((usable / (self.font_size * 0.5)) as usize).max(1)
    }

    fn lines_per_sheet(&self) -> usize {
        let usable = A4_SIZE.1 - 2.0 * EXPORT_MARGIN;
        ((usable / self.line_height) as usize).max(1)
    }

    fn sheets(&self, pages: &[String]) -> Vec<Vec<String>> {
        let width = self.chars_per_line();
        let per_sheet = self.lines_per_sheet();
        let mut sheets = Vec::new();
        for page in pages {
            let lines: Vec<String> = page
                .lines()
                .flat_map(|line| wrap(line, width))
                .collect();
            if lines.is_empty() {
                sheets.push(Vec::new());
                continue;
            }
            for chunk in lines.chunks(per_sheet) {
                sheets.push(chunk.to_vec());
            }
        }
        sheets
    }
}

fn pt(value: f32) -> Mm {
    Mm(value * MM_PER_PT)
}

impl DocumentWriter for SimplePdfWriter {
    fn extension(&self) -> &str {
        "pdf"
    }

    fn write(&self, pages: &[String], out: &mut dyn Write) -> Result<()> {
        let (width, height) = (pt(A4_SIZE.0), pt(A4_SIZE.1));
        let (doc, first_page, first_layer) =
            PrintDocument::new("Padboard Notes", width, height, "Notes");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let top = A4_SIZE.1 - EXPORT_MARGIN - self.font_size;
        for (i, lines) in self.sheets(pages).iter().enumerate() {
            let (page, layer) = if i == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(width, height, "Notes")
            };
            let layer = doc.get_page(page).get_layer(layer);
            for (n, line) in lines.iter().enumerate() {
                let y = top - n as f32 * self.line_height;
                layer.use_text(line.as_str(), self.font_size, pt(EXPORT_MARGIN), pt(y), &font);
            }
        }
        let mut writer = BufWriter::new(out);
        doc.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let len = current.chars().count();
        if len > 0 && len + 1 + word.chars().count() > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
        while current.chars().count() > width {
            let head: String = current.chars().take(width).collect();
            current = current.chars().skip(width).collect();
            out.push(head);
        }
    }
    out.push(current);
    out
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("Padboard-Notes-{}.pdf", date.format("%Y-%m-%d"))
}

/// Write every notebook page as plain text into `dir`. Returns the file
/// written.
pub fn export_notes(
    notebook: &Notebook,
    dir: &Path,
    date: NaiveDate,
    writer: &dyn DocumentWriter,
) -> Result<PathBuf> {
    let pages: Vec<String> = notebook
        .pages()
        .iter()
        .map(|p| plain_text(&p.content))
        .collect();
    if pages.iter().all(|p| p.is_empty()) {
        return Err(PdfError::NothingToExport.into());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create export folder {}", dir.display()))?;
    let mut name = export_filename(date);
    if writer.extension() != "pdf" {
        name = format!("{}.{}", name.trim_end_matches(".pdf"), writer.extension());
    }
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path)
        .with_context(|| format!("create {}", path.display()))?;
    writer.write(&pages, &mut file)?;
    tracing::info!(path = %path.display(), pages = pages.len(), "notes exported");
    Ok(path)
}
