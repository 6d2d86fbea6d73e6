//! Attachments, embedded images, and MIME detection.

use std::fmt;
use std::path::Path;

use base64::prelude::*;
use serde::{Deserialize, Serialize};

/// A file carried by a message, either as an attachment or an inline image.
///
/// `content` is always the base64 encoding of the original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub content: String,
}

impl Attachment {
    /// Encode `bytes` into a new attachment record.
    pub fn encode(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: BASE64_STANDARD.encode(bytes),
        }
    }
}

/// Overrides for the name and MIME type of an attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachOptions {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl AttachOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Content-based MIME type detection.
pub trait MimeSniffer: Send + Sync + fmt::Debug {
    /// Best guess for the MIME type of `bytes`. Never fails.
    fn sniff(&self, bytes: &[u8]) -> String;
}

/// Default sniffer, backed by the `infer` signature database.
///
/// SVG is recognised from its markup first. Other unrecognised UTF-8 content is
/// `text/plain`, everything else `application/octet-stream`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicSniffer;

impl MimeSniffer for MagicSniffer {
    fn sniff(&self, bytes: &[u8]) -> String {
        // Ahead of `infer`, which reports an XML prolog as text/xml.
        if looks_like_svg(bytes) {
            return "image/svg+xml".to_string();
        }
        if let Some(kind) = infer::get(bytes) {
            return kind.mime_type().to_string();
        }
        if std::str::from_utf8(bytes).is_ok() {
            return "text/plain".to_string();
        }
        "application/octet-stream".to_string()
    }
}

const SVG_HEAD_LEN: usize = 256;

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_HEAD_LEN)];
    // The cut may split a multi-byte character; keep the valid prefix.
    let head = match std::str::from_utf8(head) {
        Ok(head) => head,
        Err(err) => match std::str::from_utf8(&head[..err.valid_up_to()]) {
            Ok(head) => head,
            Err(_) => return false,
        },
    };
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg")
        || ((head.starts_with("<?xml") || head.starts_with("<!DOCTYPE svg"))
            && head.contains("<svg"))
}

pub fn is_image_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// MIME type of a file: content sniffing first, falling back to the
/// extension when the content is not recognised.
pub fn file_mime_type(path: &Path, bytes: &[u8], sniffer: &dyn MimeSniffer) -> String {
    let sniffed = sniffer.sniff(bytes);
    if sniffed != "application/octet-stream" && sniffed != "text/plain" {
        return sniffed;
    }
    match mime_guess::from_path(path).first() {
        Some(guess) => guess.essence_str().to_string(),
        None => sniffed,
    }
}

/// Read a regular file fully. Missing files and directories yield `None`.
pub(crate) fn read_regular_file(path: &Path) -> Option<Vec<u8>> {
    if !path.exists() || path.is_dir() {
        tracing::trace!(
            target: "mandrill",
            "Skipping missing or non-file path {}",
            path.display()
        );
        return None;
    }
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::debug!(
                target: "mandrill",
                "Unable to read {}: {err}",
                path.display()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
    const BMP: &[u8] = b"BM\x3a\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00\
\x28\x00\x00\x00\x01\x00\x00\x00\x01\x00\x00\x00\x01\x00\x18\x00\
\x00\x00\x00\x00\x04\x00\x00\x00\x13\x0b\x00\x00\x13\x0b\x00\x00\
\x00\x00\x00\x00\x00\x00\x00\x00\xff\x00\x00\x00";

    #[test]
    fn test_sniff_known_signatures() {
        let sniffer = MagicSniffer;
        assert_eq!(sniffer.sniff(PNG), "image/png");
        assert_eq!(sniffer.sniff(b"\xff\xd8\xff\xe0\x00\x10JFIF"), "image/jpeg");
        assert_eq!(sniffer.sniff(b"%PDF-1.4\n%"), "application/pdf");
        assert_eq!(sniffer.sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_sniff_text_and_binary_fallbacks() {
        let sniffer = MagicSniffer;
        assert_eq!(sniffer.sniff(b"ancora un po"), "text/plain");
        assert_eq!(sniffer.sniff(&[0xc3, 0x28, 0xa0, 0xa1]), "application/octet-stream");
    }

    #[test]
    fn test_sniff_svg() {
        let sniffer = MagicSniffer;
        let svg = b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
        assert_eq!(sniffer.sniff(svg), "image/svg+xml");
    }

    #[test]
    fn test_sniff_svg_doctype() {
        let svg = b"<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\">\n<svg width=\"1\"/>";
        assert_eq!(MagicSniffer.sniff(svg), "image/svg+xml");
    }

    #[test]
    fn test_sniff_svg_with_multibyte_char_at_head_boundary() {
        let mut svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><!--".to_vec();
        svg.resize(SVG_HEAD_LEN - 1, b' ');
        // Two-byte character spanning the end of the inspected head.
        svg.extend_from_slice("\u{e9}--></svg>".as_bytes());
        assert_eq!(MagicSniffer.sniff(&svg), "image/svg+xml");
    }

    #[test]
    fn test_sniff_bmp() {
        assert_eq!(MagicSniffer.sniff(BMP), "image/bmp");
        assert!(is_image_type(&MagicSniffer.sniff(BMP)));
    }

    #[test]
    fn test_encode_is_base64() {
        let attachment = Attachment::encode("a.txt", "text/plain", b"this is some text");
        assert_eq!(attachment.content, "dGhpcyBpcyBzb21lIHRleHQ=");
        assert_eq!(attachment.mime_type, "text/plain");
    }

    #[test]
    fn test_attachment_serializes_type_key() {
        let attachment = Attachment::encode("a.png", "image/png", PNG);
        let value = serde_json::to_value(&attachment).unwrap();
        assert_eq!(value["type"], "image/png");
        assert_eq!(value["name"], "a.png");
    }

    #[test]
    fn test_file_mime_type_prefers_content() {
        let sniffer = MagicSniffer;
        let ty = file_mime_type(Path::new("picture.txt"), PNG, &sniffer);
        assert_eq!(ty, "image/png");
    }

    #[test]
    fn test_file_mime_type_falls_back_to_extension() {
        let sniffer = MagicSniffer;
        let ty = file_mime_type(Path::new("report.csv"), b"a,b\n1,2\n", &sniffer);
        assert_eq!(ty, "text/csv");
    }
}
