/// Largest document accepted for upload: 50 MiB.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Lowercase extensions (without the dot) the server can extract from.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["docx", "pdf"];

/// Problems detected locally, before anything is sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Неподдерживаемый формат файла. Разрешены только .docx и .pdf")]
    UnsupportedExtension { extension: Option<String> },
    #[error("Файл слишком большой. Максимальный размер: 50 МБ")]
    TooLarge { size_bytes: u64 },
    #[error("Выберите хотя бы одно поле")]
    EmptySelection,
}

/// Lowercased text after the last `.` of a file name, if there is one.
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Checks extension first, then size.
pub fn validate_file(name: &str, size_bytes: u64) -> Result<(), ValidationError> {
    let extension = file_extension(name);
    let allowed = extension
        .as_deref()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));
    if !allowed {
        return Err(ValidationError::UnsupportedExtension { extension });
    }
    if size_bytes > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge { size_bytes });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_docx_and_pdf_in_any_case() {
        assert_eq!(validate_file("report.docx", 10), Ok(()));
        assert_eq!(validate_file("REPORT.PDF", 10), Ok(()));
        assert_eq!(validate_file("archive.v2.Pdf", 10), Ok(()));
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(
            validate_file("notes.txt", 10),
            Err(ValidationError::UnsupportedExtension {
                extension: Some("txt".to_string())
            })
        );
        assert_eq!(
            validate_file("report.docx.exe", 10),
            Err(ValidationError::UnsupportedExtension {
                extension: Some("exe".to_string())
            })
        );
    }

    #[test]
    fn name_without_dot_is_rejected() {
        assert_eq!(
            validate_file("pdf", 10),
            Err(ValidationError::UnsupportedExtension { extension: None })
        );
        assert_eq!(
            validate_file("trailing.", 10),
            Err(ValidationError::UnsupportedExtension { extension: None })
        );
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert_eq!(validate_file("a.pdf", MAX_FILE_SIZE), Ok(()));
        assert_eq!(
            validate_file("a.pdf", MAX_FILE_SIZE + 1),
            Err(ValidationError::TooLarge {
                size_bytes: MAX_FILE_SIZE + 1
            })
        );
    }

    #[test]
    fn extension_is_checked_before_size() {
        let err = validate_file("huge.zip", MAX_FILE_SIZE * 2).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedExtension { .. }));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ValidationError::EmptySelection.to_string(),
            "Выберите хотя бы одно поле"
        );
        assert!(ValidationError::TooLarge { size_bytes: 1 }
            .to_string()
            .contains("50 МБ"));
    }
}
