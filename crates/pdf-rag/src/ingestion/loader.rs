//! PDF document source producing one text document per page

use async_trait::async_trait;
use std::path::Path;

use crate::config::SourceMode;
use crate::error::{Error, Result};
use crate::types::PageDocument;

/// Produces ordered page documents from a file
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Load the file at `path` into page documents, in page order
    async fn load(&self, path: &Path) -> Result<Vec<PageDocument>>;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Loads PDFs page by page with lopdf, falling back to pdf-extract
pub struct PdfLoader {
    source_mode: SourceMode,
}

impl PdfLoader {
    /// Create a new PDF loader
    pub fn new(source_mode: SourceMode) -> Self {
        Self { source_mode }
    }

    /// Source identifier recorded on every page of `path`
    pub fn source_id(&self, path: &Path) -> String {
        match self.source_mode {
            SourceMode::FileName => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string()),
            SourceMode::Path => path.to_string_lossy().to_string(),
        }
    }

    /// Parse PDF bytes into page documents tagged with `source`
    pub fn parse(source: &str, data: &[u8]) -> Result<Vec<PageDocument>> {
        let pages = match Self::extract_pages(data) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("lopdf could not read '{}': {}, trying pdf-extract", source, e);
                let text = pdf_extract::extract_text_from_mem(data)
                    .map_err(|e| Error::document_load(source, e.to_string()))?;
                vec![text]
            }
        };

        if pages.is_empty() {
            return Err(Error::document_load(source, "PDF has no pages"));
        }

        let pages: Vec<PageDocument> = pages
            .into_iter()
            .enumerate()
            .map(|(page, text)| PageDocument::new(source, page as u32, cleanup_text(&text)))
            .collect();

        if pages.iter().all(|p| p.content.is_empty()) {
            return Err(Error::document_load(
                source,
                "No text content could be extracted from PDF",
            ));
        }

        Ok(pages)
    }

    /// Extract text of every page in document order
    fn extract_pages(data: &[u8]) -> std::result::Result<Vec<String>, lopdf::Error> {
        let doc = lopdf::Document::load_mem(data)?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    tracing::debug!("Could not extract text of page {}: {}", page_number, e);
                    pages.push(String::new());
                }
            }
        }

        Ok(pages)
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new(SourceMode::default())
    }
}

#[async_trait]
impl DocumentSource for PdfLoader {
    async fn load(&self, path: &Path) -> Result<Vec<PageDocument>> {
        let source = self.source_id(path);
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::document_load(&source, e.to_string()))?;

        tracing::debug!("Loading '{}' ({} bytes)", source, data.len());

        // Parsing is CPU bound and may stall on odd fonts
        tokio::task::spawn_blocking(move || Self::parse(&source, &data))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

/// Strip NUL characters and surrounding whitespace from each line
fn cleanup_text(text: &str) -> String {
    text.replace('\0', "")
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Build an uncompressed PDF with one line of text per page
#[cfg(test)]
pub(crate) fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cleanup_text() {
        let cleaned = cleanup_text("  Title \0\n\n   body line  \n");
        assert_eq!(cleaned, "Title\n\nbody line");
    }

    #[test]
    fn test_source_id_modes() {
        let path = PathBuf::from("/srv/uploads/f.pdf");
        assert_eq!(PdfLoader::new(SourceMode::FileName).source_id(&path), "f.pdf");
        assert_eq!(
            PdfLoader::new(SourceMode::Path).source_id(&path),
            "/srv/uploads/f.pdf"
        );
    }

    #[test]
    fn test_parse_rejects_non_pdf() {
        let err = PdfLoader::parse("notes.pdf", b"plain text, not a pdf").unwrap_err();
        assert!(matches!(err, Error::DocumentLoad { ref source_id, .. } if source_id == "notes.pdf"));
    }

    #[test]
    fn test_parse_numbers_pages_from_zero() {
        let data = sample_pdf(&["alpha page", "beta page"]);
        let pages = PdfLoader::parse("f.pdf", &data).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 0);
        assert_eq!(pages[1].page, 1);
        assert!(pages[0].content.contains("alpha page"));
        assert!(pages[1].content.contains("beta page"));
        assert!(pages.iter().all(|p| p.source == "f.pdf"));
    }

    #[tokio::test]
    async fn test_load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.pdf");
        std::fs::write(&path, sample_pdf(&["only page"])).unwrap();

        let pages = PdfLoader::default().load(&path).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].source, "f.pdf");
        assert!(pages[0].content.contains("only page"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let loader = PdfLoader::default();
        let err = loader
            .load(Path::new("/definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DocumentLoad { .. }));
    }
}
