//! Plain-text extraction for uploaded files

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::FileType;

/// How long pdf-extract may spend on one document before the lopdf path is used
const PDF_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns uploaded bytes into plain text, dispatching on the filename
pub struct TextExtractor;

impl TextExtractor {
    /// Extract plain text from `data`.
    ///
    /// Only a PDF or DOCX that cannot be opened at all is an error. Pages or
    /// paragraphs without text contribute nothing, and undecodable bytes in
    /// text files are dropped.
    pub fn extract(filename: &str, data: &[u8]) -> Result<String> {
        let file_type = FileType::from_filename(filename);
        tracing::debug!("Extracting {} ({} bytes) as {}", filename, data.len(), file_type);

        match file_type {
            FileType::Pdf => Self::extract_pdf(filename, data),
            FileType::Docx => Self::extract_docx(filename, data),
            FileType::Text => Ok(decode_utf8_dropping_invalid(data)),
        }
    }

    /// Page texts concatenated in page order
    fn extract_pdf(filename: &str, data: &[u8]) -> Result<String> {
        let pages = Self::extract_pdf_pages_with_timeout(filename, data)?;
        Ok(pages.concat())
    }

    /// Run pdf-extract on its own thread; it can hang or panic on odd fonts
    fn extract_pdf_pages_with_timeout(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem_by_pages(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(PDF_EXTRACT_TIMEOUT) {
            Ok(Ok(pages)) => {
                let _ = handle.join();
                Ok(pages)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("pdf-extract failed on {}: {}, trying lopdf", filename, e);
                Self::extract_pdf_pages_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // The thread cannot be killed; it is left to finish on its own
                tracing::error!(
                    "pdf-extract timed out after {:?} on {}, trying lopdf",
                    PDF_EXTRACT_TIMEOUT,
                    filename
                );
                Self::extract_pdf_pages_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("pdf-extract thread crashed on {}, trying lopdf", filename);
                Self::extract_pdf_pages_fallback(filename, data)
            }
        }
    }

    /// Page-by-page extraction with lopdf; a failing or panicking page yields ""
    fn extract_pdf_pages_fallback(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let doc = panic::catch_unwind(|| lopdf::Document::load_mem(data))
            .map_err(|_| Error::extraction(filename, "lopdf panicked while loading the PDF"))?
            .map_err(|e| Error::extraction(filename, format!("Failed to load PDF: {}", e)))?;

        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page_number| {
                match panic::catch_unwind(AssertUnwindSafe(|| doc.extract_text(&[page_number]))) {
                    Ok(Ok(text)) => text,
                    Ok(Err(e)) => {
                        tracing::debug!("No text on page {} of {}: {}", page_number, filename, e);
                        String::new()
                    }
                    Err(_) => {
                        tracing::warn!("lopdf panicked on page {} of {}", page_number, filename);
                        String::new()
                    }
                }
            })
            .collect();

        Ok(pages)
    }

    /// Paragraph texts joined with newlines
    fn extract_docx(filename: &str, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;

        let paragraphs: Vec<String> = doc
            .document
            .children
            .into_iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(p) => Some(paragraph_text(&p.children)),
                // Tables, section breaks etc. are not body paragraphs
                _ => None,
            })
            .collect();

        Ok(paragraphs.join("\n"))
    }
}

fn paragraph_text(children: &[docx_rs::ParagraphChild]) -> String {
    let mut text = String::new();
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        docx_rs::RunChild::Text(t) => text.push_str(&t.text),
                        docx_rs::RunChild::Tab(_) => text.push('\t'),
                        docx_rs::RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            docx_rs::ParagraphChild::Hyperlink(link) => {
                text.push_str(&paragraph_text(&link.children));
            }
            _ => {}
        }
    }
    text
}

/// Decode UTF-8, skipping byte sequences that are not valid
fn decode_utf8_dropping_invalid(mut data: &[u8]) -> String {
    let mut text = String::with_capacity(data.len());
    loop {
        match std::str::from_utf8(data) {
            Ok(valid) => {
                text.push_str(valid);
                return text;
            }
            Err(e) => {
                let (valid, rest) = data.split_at(e.valid_up_to());
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => data = &rest[len..],
                    // Truncated sequence at the very end
                    None => return text,
                }
            }
        }
    }
}
