// Distributed under the MIT License

//! Adaptador de PDF: límite con el lector de documentos real. El
//! núcleo nunca rasteriza PDFs; consume tres iteradores (imágenes de
//! página, texto con caja envolvente, primitivas vectoriales) a través de
//! la capacidad [`PdfAdapter`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rectángulo en el espacio de página (unidades del documento, no píxeles).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageRect {
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    /// `true` si el punto `(x, y)` cae dentro del 40% x 30% inferior-derecho
    /// de la página (la cartela / title block habitual), usado por el
    /// detector de notación de escala para priorizar coincidencias.
    pub fn is_in_title_block(&self, x: f32, y: f32) -> bool {
        let tb_x0 = self.x0 + self.width() * 0.60;
        let tb_y0 = self.y0 + self.height() * 0.70;
        x >= tb_x0 && x <= self.x1 && y >= tb_y0 && y <= self.y1
    }
}

/// Raster de una página a un presupuesto de píxeles determinado.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page_index: usize,
    pub bytes: Vec<u8>,
    pub dpi: u32,
    pub long_side_px: u32,
    pub rect: PageRect,
}

/// Fragmento de texto con su caja envolvente en espacio de página.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub page_index: usize,
    pub text: String,
    pub rect: PageRect,
}

/// Primitivas vectoriales soportadas.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorPath {
    Line { p0: (f32, f32), p1: (f32, f32) },
    Polyline { points: Vec<(f32, f32)> },
    Rectangle { rect: PageRect },
    Arc { center: (f32, f32), radius: f32, start_deg: f32, end_deg: f32 },
}

#[derive(Debug, Clone)]
pub struct VectorEntry {
    pub page_index: usize,
    pub path: VectorPath,
}

/// Fallos críticos del adaptador de PDF.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PdfAdapterError {
    #[error("el documento está cifrado")]
    Encrypted,
    #[error("cabecera de PDF inválida")]
    InvalidHeader,
    #[error("el documento no tiene páginas")]
    ZeroPages,
    #[error("el documento tiene {0} páginas, por encima del máximo de 100")]
    TooManyPages(usize),
    #[error("tiempo de render de página agotado tras {0:?}")]
    PageRenderTimeout(Duration),
}

/// Documento fuente ya abierto y validado.
pub struct PdfDocument {
    pub page_count: usize,
    pub size_bytes: usize,
    pages: Vec<PageImage>,
    text_runs: Vec<TextRun>,
    vectors: Vec<VectorEntry>,
}

/// Umbral de aviso de archivo grande (20 MB), sobre el que se registra una
/// advertencia sin abortar la ejecución.
pub const LARGE_FILE_WARN_BYTES: usize = 20 * 1024 * 1024;
/// Límite duro de páginas por documento.
pub const MAX_PAGES: usize = 100;

impl PdfDocument {
    /// Construye un documento ya decodificado (usado por los tests y por la
    /// capa de orquestación, que entrega las páginas ya rasterizadas por el
    /// lector de PDF real). Aplica las mismas validaciones de `open`.
    pub fn from_parts(
        size_bytes: usize,
        pages: Vec<PageImage>,
        text_runs: Vec<TextRun>,
        vectors: Vec<VectorEntry>,
    ) -> Result<Self, PdfAdapterError> {
        if pages.is_empty() {
            return Err(PdfAdapterError::ZeroPages);
        }
        if pages.len() > MAX_PAGES {
            return Err(PdfAdapterError::TooManyPages(pages.len()));
        }
        if size_bytes >= LARGE_FILE_WARN_BYTES {
            log::warn!(
                "documento de {} bytes supera el umbral de aviso de {} bytes",
                size_bytes,
                LARGE_FILE_WARN_BYTES
            );
        }
        Ok(PdfDocument {
            page_count: pages.len(),
            size_bytes,
            pages,
            text_runs,
            vectors,
        })
    }

    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }

    pub fn text_runs_for_page(&self, page_index: usize) -> impl Iterator<Item = &TextRun> {
        self.text_runs.iter().filter(move |t| t.page_index == page_index)
    }

    pub fn vectors_for_page(&self, page_index: usize) -> impl Iterator<Item = &VectorEntry> {
        self.vectors.iter().filter(move |v| v.page_index == page_index)
    }
}
