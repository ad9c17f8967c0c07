use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed BibTeX entry. Field names are lower-case; `BTreeMap` keeps them
/// in the sorted order the citation writer emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub key: String,
    pub entry_type: String,
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    pub fn new(key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entry_type: entry_type.into().to_lowercase(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Bibliography {
    pub entries: Vec<BibEntry>,
    pub strings: BTreeMap<String, String>,
    pub preambles: Vec<String>,
    pub comments: Vec<String>,
    pub errors: Vec<SyntaxIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicationType {
    Uncategorized = 0,
    ConferencePaper = 1,
    JournalArticle = 2,
    Preprint = 3,
    Report = 4,
    Book = 5,
    BookSection = 6,
    Thesis = 7,
    Patent = 8,
}

impl PublicationType {
    pub fn from_entry_type(entry_type: &str) -> Self {
        match entry_type.to_lowercase().as_str() {
            "article" => PublicationType::JournalArticle,
            "book" => PublicationType::Book,
            "conference" | "inproceedings" => PublicationType::ConferencePaper,
            "inbook" | "incollection" => PublicationType::BookSection,
            "manual" | "report" | "techreport" => PublicationType::Report,
            "mastersthesis" | "phdthesis" | "thesis" => PublicationType::Thesis,
            "patent" => PublicationType::Patent,
            "unpublished" => PublicationType::Preprint,
            _ => PublicationType::Uncategorized,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// TOML front matter of a publication page. Field order is the order Hugo
/// users see in `index.md`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    #[serde(rename = "publishDate")]
    pub publish_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    pub publication_types: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub featured: bool,
    pub publication: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pdf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

/// Everything needed to write one page bundle.
#[derive(Debug, Clone)]
pub struct PublicationBundle {
    pub key: String,
    pub bundle_dir: String,
    pub front_matter: FrontMatter,
    pub markdown: String,
    pub citation: String,
}

impl PublicationBundle {
    pub fn markdown_path(&self) -> String {
        format!("{}/index.md", self.bundle_dir)
    }

    pub fn cite_path(&self) -> String {
        format!("{}/cite.bib", self.bundle_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub bundles: Vec<PublicationBundle>,
    pub failures: Vec<EntryFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<EntryFailure>,
    pub dry_run: bool,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.skipped.len() + self.failed.len()
    }
}
