//! Source document loading

use std::path::Path;

use crate::error::{Error, Result};

/// Text extracted from one page
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-indexed page number, when page boundaries are known
    pub number: Option<u32>,
    pub text: String,
}

/// A loaded source document, split into page-granular text where possible
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Source identifier (the file name)
    pub source: String,
    pub pages: Vec<PageText>,
    pub page_count: Option<u32>,
}

impl LoadedDocument {
    /// Full text of the document
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Loader for the corpus source document (PDF, with plain text accepted)
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load a document from disk
    pub fn load(path: &Path) -> Result<LoadedDocument> {
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .unwrap_or_else(|| path.display().to_string());
        let data = std::fs::read(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Self::load_pdf(source, &data),
            "txt" | "md" => Self::load_text(source, &data),
            other => Err(Error::chunking(format!(
                "unsupported source document type: '{other}'"
            ))),
        }
    }

    fn load_pdf(source: String, data: &[u8]) -> Result<LoadedDocument> {
        let page_count = lopdf::Document::load_mem(data)
            .ok()
            .map(|doc| doc.get_pages().len() as u32);

        // Primary extraction gives the best text quality but no page
        // boundaries; the per-page fallback trades quality for provenance.
        match pdf_extract::extract_text_from_mem(data) {
            Ok(text) if !normalize(&text).is_empty() => Ok(LoadedDocument {
                source,
                pages: vec![PageText {
                    number: None,
                    text: normalize(&text),
                }],
                page_count,
            }),
            Ok(_) => Self::load_pdf_by_pages(source, data, page_count),
            Err(e) => {
                tracing::warn!("primary PDF extraction failed: {e}, trying per-page extraction");
                Self::load_pdf_by_pages(source, data, page_count)
            }
        }
    }

    fn load_pdf_by_pages(
        source: String,
        data: &[u8],
        page_count: Option<u32>,
    ) -> Result<LoadedDocument> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::chunking(format!("failed to load PDF: {e}")))?;

        let mut pages = Vec::new();
        for (number, _object_id) in doc.get_pages() {
            match doc.extract_text(&[number]) {
                Ok(text) => {
                    let text = normalize(&text);
                    if !text.is_empty() {
                        pages.push(PageText {
                            number: Some(number),
                            text,
                        });
                    }
                }
                Err(e) => {
                    tracing::debug!(page = number, "could not extract page text: {e}");
                }
            }
        }

        if pages.is_empty() {
            return Err(Error::chunking(
                "no text content could be extracted from PDF",
            ));
        }

        Ok(LoadedDocument {
            source,
            pages,
            page_count,
        })
    }

    fn load_text(source: String, data: &[u8]) -> Result<LoadedDocument> {
        let text = String::from_utf8_lossy(data);
        let text = normalize(&text);
        if text.is_empty() {
            return Err(Error::chunking("source document contains no text"));
        }

        Ok(LoadedDocument {
            source,
            pages: vec![PageText { number: None, text }],
            page_count: None,
        })
    }
}

/// Strip null bytes and blank lines, trimming line edges
fn normalize(text: &str) -> String {
    text.replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
