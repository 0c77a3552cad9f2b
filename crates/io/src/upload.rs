// Upload name gate: only spreadsheet files reach the grid reader.

/// Accepted filename suffixes, matched case-sensitively.
pub const UPLOAD_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCheck {
    Accepted,
    MissingName,
    UnsupportedExtension,
}

pub fn check_upload_name(filename: &str) -> UploadCheck {
    if filename.is_empty() {
        return UploadCheck::MissingName;
    }
    if UPLOAD_EXTENSIONS.iter().any(|ext| filename.ends_with(ext)) {
        UploadCheck::Accepted
    } else {
        UploadCheck::UnsupportedExtension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreadsheet_names_are_accepted() {
        assert_eq!(check_upload_name("estoque.xlsx"), UploadCheck::Accepted);
        assert_eq!(check_upload_name("estoque fev.xls"), UploadCheck::Accepted);
    }

    #[test]
    fn empty_name_is_missing() {
        assert_eq!(check_upload_name(""), UploadCheck::MissingName);
    }

    #[test]
    fn other_extensions_are_rejected() {
        assert_eq!(check_upload_name("estoque.csv"), UploadCheck::UnsupportedExtension);
        assert_eq!(check_upload_name("estoque.xlsx.zip"), UploadCheck::UnsupportedExtension);
        assert_eq!(check_upload_name("xlsx"), UploadCheck::UnsupportedExtension);
        assert_eq!(check_upload_name("ESTOQUE.XLSX"), UploadCheck::UnsupportedExtension);
    }
}
