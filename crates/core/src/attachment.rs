use std::path::Path;

use crate::error::{AttachmentError, Result};

/// File extensions accepted as attachments
pub const ATTACHMENT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Text file content to be added to the conversation as context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self { name: name.into(), content: content.into() }
    }

    /// Decode raw bytes as UTF-8, replacing invalid sequences with U+FFFD
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self { name: name.into(), content: String::from_utf8_lossy(bytes).into_owned() }
    }

    /// Read a `.txt` or `.md` file from disk
    pub fn read(path: &Path) -> Result<Self> {
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ATTACHMENT_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
            .unwrap_or(false);

        if !supported {
            return Err(AttachmentError::UnsupportedType(path.to_path_buf()).into());
        }

        let bytes = std::fs::read(path).map_err(|source| AttachmentError::Io { path: path.to_path_buf(), source })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!(name = %name, bytes = bytes.len(), "attachment read");
        Ok(Self::from_bytes(name, &bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_from_bytes_valid_utf8() {
        let attachment = Attachment::from_bytes("notes.txt", "héllo wörld".as_bytes());
        assert_eq!(attachment.name, "notes.txt");
        assert_eq!(attachment.content, "héllo wörld");
    }

    #[test]
    fn test_from_bytes_replaces_invalid_sequences() {
        let bytes = [b'a', b'b', 0xff, 0xfe, b'c', 0xc3];
        let attachment = Attachment::from_bytes("broken.txt", &bytes);

        assert!(attachment.content.starts_with("ab"));
        assert!(attachment.content.contains('c'));
        assert!(attachment.content.contains('\u{FFFD}'));
        assert!(!attachment.content.contains("\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}"));
    }

    #[test]
    fn test_read_text_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.md");
        std::fs::write(&path, "# Title\nbody").unwrap();

        let attachment = Attachment::read(&path).unwrap();
        assert_eq!(attachment, Attachment::new("notes.md", "# Title\nbody"));
    }

    #[test]
    fn test_read_extension_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("README.MD");
        std::fs::write(&path, "hi").unwrap();

        assert!(Attachment::read(&path).is_ok());
    }

    #[test]
    fn test_read_invalid_utf8_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latin1.txt");
        std::fs::write(&path, [b'c', b'a', b'f', 0xe9]).unwrap();

        let attachment = Attachment::read(&path).unwrap();
        assert_eq!(attachment.content, "caf\u{FFFD}");
    }

    #[test]
    fn test_read_rejects_unsupported_type() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("image.png");
        std::fs::write(&path, [0u8; 4]).unwrap();

        let err = Attachment::read(&path).unwrap_err();
        assert!(matches!(err, Error::Attachment(AttachmentError::UnsupportedType(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.txt");

        let err = Attachment::read(&path).unwrap_err();
        assert!(matches!(err, Error::Attachment(AttachmentError::Io { .. })));
    }
}
