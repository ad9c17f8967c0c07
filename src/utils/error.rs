use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcademicError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("BibTeX file not found: {path}")]
    BibtexNotFound { path: String },

    #[error("BibTeX syntax error on line {line}: {message}")]
    BibtexSyntaxError { line: usize, message: String },

    #[error("Entry `{key}` is missing required field `{field}`")]
    MissingFieldError { key: String, field: String },

    #[error("Entry `{key}` has an invalid month: {value}")]
    InvalidMonthError { key: String, value: String },

    #[error("Entry key `{key}` has no characters usable in a folder name")]
    InvalidKeyError { key: String },

    #[error("Theme folder not found: {path}")]
    ThemeNotFound { path: String },

    #[error("Asset manifest error: {message}")]
    AssetManifestError { message: String },

    #[error("Asset download failed for {count} asset(s)")]
    AssetDownloadError { count: usize },

    #[error("Hugo binary not found: {binary}")]
    HugoNotFound { binary: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required argument: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Network,
    Input,
    Configuration,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AcademicError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AcademicError::IoError(_) => ErrorCategory::Io,
            AcademicError::HttpError(_) | AcademicError::AssetDownloadError { .. } => {
                ErrorCategory::Network
            }
            AcademicError::BibtexNotFound { .. }
            | AcademicError::BibtexSyntaxError { .. }
            | AcademicError::MissingFieldError { .. }
            | AcademicError::InvalidMonthError { .. }
            | AcademicError::InvalidKeyError { .. }
            | AcademicError::ThemeNotFound { .. }
            | AcademicError::AssetManifestError { .. } => ErrorCategory::Input,
            AcademicError::TomlParseError(_)
            | AcademicError::TomlSerializeError(_)
            | AcademicError::ConfigValidationError { .. }
            | AcademicError::InvalidConfigValueError { .. }
            | AcademicError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AcademicError::HugoNotFound { .. } => ErrorCategory::External,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AcademicError::MissingFieldError { .. }
            | AcademicError::InvalidMonthError { .. }
            | AcademicError::InvalidKeyError { .. } => ErrorSeverity::Low,
            AcademicError::HttpError(_) | AcademicError::AssetDownloadError { .. } => {
                ErrorSeverity::Medium
            }
            AcademicError::IoError(_) | AcademicError::TomlSerializeError(_) => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AcademicError::BibtexNotFound { .. } => {
                "Please check the path to your BibTeX file and re-run".to_string()
            }
            AcademicError::ThemeNotFound { path } => format!(
                "Could not detect the Academic theme folder at `{}`",
                path
            ),
            AcademicError::HugoNotFound { binary } => {
                format!("Could not run `{}`", binary)
            }
            AcademicError::AssetDownloadError { count } => {
                format!("{} asset(s) could not be downloaded", count)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check file permissions and available disk space",
            ErrorCategory::Network => "Check your network connection and retry",
            ErrorCategory::Input => match self {
                AcademicError::ThemeNotFound { .. } => {
                    "Run this command from the root of your website folder with the Academic theme installed"
                }
                AcademicError::InvalidMonthError { .. } => {
                    "Please update the entry with a valid month"
                }
                AcademicError::InvalidKeyError { .. } => {
                    "Give the entry a citation key containing letters or digits"
                }
                _ => "Fix the input file and re-run the import",
            },
            ErrorCategory::Configuration => {
                "Review your command line arguments and academic.toml"
            }
            ErrorCategory::External => "Install Hugo or set [hugo] binary in academic.toml",
        }
    }
}

impl ErrorSeverity {
    /// Process exit code for a run that ended with an error of this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, AcademicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bibtex_not_found_is_high_severity_input_error() {
        let err = AcademicError::BibtexNotFound {
            path: "missing.bib".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.user_friendly_message(),
            "Please check the path to your BibTeX file and re-run"
        );
    }

    #[test]
    fn test_entry_level_errors_are_low_severity() {
        let err = AcademicError::InvalidMonthError {
            key: "smith2019".to_string(),
            value: "Smarch".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(
            err.recovery_suggestion(),
            "Please update the entry with a valid month"
        );
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        assert_eq!(ErrorSeverity::Low.exit_code(), 0);
        assert_eq!(ErrorSeverity::High.exit_code(), 1);
        assert_eq!(ErrorSeverity::Medium.exit_code(), 2);
        assert_eq!(ErrorSeverity::Critical.exit_code(), 3);

        let missing_bibtex = AcademicError::BibtexNotFound {
            path: "refs.bib".to_string(),
        };
        assert_eq!(missing_bibtex.severity().exit_code(), 1);
        let failed_downloads = AcademicError::AssetDownloadError { count: 2 };
        assert_eq!(failed_downloads.severity().exit_code(), 2);
    }

    #[test]
    fn test_io_error_conversion() {
        let err: AcademicError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
