use crate::utils::error::{AcademicError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_relative_dir, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_CONFIG_FILE: &str = "academic.toml";

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// Optional `academic.toml` in the site root. Every key has a default, so an
/// empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicConfig {
    pub import: ImportSection,
    pub assets: AssetsSection,
    pub hugo: HugoSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub publication_dir: String,
    pub featured: bool,
    pub overwrite: bool,
    pub normalize: bool,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            publication_dir: "publication".to_string(),
            featured: false,
            overwrite: false,
            normalize: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    pub theme_dir: String,
    pub concurrent_downloads: usize,
    pub timeout_seconds: u64,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            theme_dir: "themes/academic".to_string(),
            concurrent_downloads: 4,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HugoSection {
    pub binary: String,
}

impl Default for HugoSection {
    fn default() -> Self {
        Self {
            binary: "hugo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub format: LogFormat,
}

impl AcademicConfig {
    /// Loads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AcademicError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, otherwise `academic.toml` in `site_dir` if it
    /// exists, otherwise the defaults.
    pub fn discover(path: Option<&Path>, site_dir: &Path) -> Result<Self> {
        match path {
            Some(explicit) => Self::from_file(explicit),
            None => {
                let candidate = site_dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    tracing::debug!("Using configuration from {}", candidate.display());
                    Self::from_file(candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for AcademicConfig {
    fn validate(&self) -> Result<()> {
        validate_relative_dir("import.publication_dir", &self.import.publication_dir)?;
        validate_relative_dir("assets.theme_dir", &self.assets.theme_dir)?;
        validate_positive_number(
            "assets.concurrent_downloads",
            self.assets.concurrent_downloads,
            1,
        )?;
        validate_positive_number(
            "assets.timeout_seconds",
            self.assets.timeout_seconds as usize,
            1,
        )?;
        validate_non_empty_string("hugo.binary", &self.hugo.binary)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AcademicConfig::from_toml_str("").unwrap();
        assert_eq!(config, AcademicConfig::default());
        assert_eq!(config.import.publication_dir, "publication");
        assert_eq!(config.assets.theme_dir, "themes/academic");
        assert_eq!(config.hugo.binary, "hugo");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = AcademicConfig::from_toml_str(
            r#"
[import]
publication_dir = "papers"
featured = true
normalize = true

[assets]
theme_dir = "themes/starter"
concurrent_downloads = 8
timeout_seconds = 5

[hugo]
binary = "hugo-extended"

[logging]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.import.publication_dir, "papers");
        assert!(config.import.featured);
        assert!(!config.import.overwrite);
        assert!(config.import.normalize);
        assert_eq!(config.assets.concurrent_downloads, 8);
        assert_eq!(config.assets.timeout_seconds, 5);
        assert_eq!(config.hugo.binary, "hugo-extended");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ACADEMIC_TEST_PUB_DIR", "talks");

        let config = AcademicConfig::from_toml_str(
            r#"
[import]
publication_dir = "${ACADEMIC_TEST_PUB_DIR}"
"#,
        )
        .unwrap();
        assert_eq!(config.import.publication_dir, "talks");

        std::env::remove_var("ACADEMIC_TEST_PUB_DIR");
    }

    #[test]
    fn test_unset_env_var_is_left_as_is() {
        let config = AcademicConfig::from_toml_str(
            r#"
[hugo]
binary = "${ACADEMIC_TEST_SURELY_UNSET}"
"#,
        )
        .unwrap();
        assert_eq!(config.hugo.binary, "${ACADEMIC_TEST_SURELY_UNSET}");
    }

    #[test]
    fn test_config_validation() {
        let config = AcademicConfig::from_toml_str(
            r#"
[assets]
concurrent_downloads = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = AcademicConfig::from_toml_str(
            r#"
[assets]
timeout_seconds = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = AcademicConfig::from_toml_str(
            r#"
[import]
publication_dir = "../elsewhere"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result = AcademicConfig::from_toml_str("[import\npublication_dir = 1");
        assert!(matches!(result, Err(AcademicError::TomlParseError(_))));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[import]\npublication_dir = \"file-test\"\n")
            .unwrap();

        let config = AcademicConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.import.publication_dir, "file-test");
    }

    #[test]
    fn test_discover() {
        let site = TempDir::new().unwrap();
        let config = AcademicConfig::discover(None, site.path()).unwrap();
        assert_eq!(config, AcademicConfig::default());

        std::fs::write(
            site.path().join(DEFAULT_CONFIG_FILE),
            "[hugo]\nbinary = \"my-hugo\"\n",
        )
        .unwrap();
        let config = AcademicConfig::discover(None, site.path()).unwrap();
        assert_eq!(config.hugo.binary, "my-hugo");

        assert!(AcademicConfig::discover(Some(&site.path().join("missing.toml")), site.path()).is_err());
    }
}
