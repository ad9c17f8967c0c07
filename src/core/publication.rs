//! Turns a BibTeX entry into a Hugo publication page bundle.

use crate::core::names::clean_authors;
use crate::core::slug::slugify;
use crate::core::writer::write_entry;
use crate::domain::model::{BibEntry, FrontMatter, PublicationBundle, PublicationType};
use crate::utils::error::{AcademicError, Result};
use chrono::{DateTime, Utc};

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub publication_dir: String,
    pub featured: bool,
    pub normalize: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            publication_dir: "publication".to_string(),
            featured: false,
            normalize: false,
        }
    }
}

/// RFC 3339 timestamp with microseconds, as Hugo expects in `publishDate`.
pub fn publish_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Converts a BibTeX/BibLaTeX month (`3`, `03`, `mar`, `March`) to `MM`.
pub fn month_to_number(month: &str) -> Option<String> {
    let month = month.trim();
    if !month.is_empty() && month.len() <= 2 && month.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("{:0>2}", month));
    }

    let abbr: String = month
        .chars()
        .take(3)
        .enumerate()
        .flat_map(|(i, c)| {
            if i == 0 {
                c.to_uppercase().collect::<Vec<_>>()
            } else {
                c.to_lowercase().collect::<Vec<_>>()
            }
        })
        .collect();

    MONTH_ABBR
        .iter()
        .position(|m| *m == abbr)
        .map(|index| format!("{:02}", index + 1))
}

/// Resolves `YYYY-MM-DD` from the `date`, `month` and `year` fields.
pub fn resolve_date(entry: &BibEntry) -> Result<String> {
    let mut year = String::new();
    let mut month = "01".to_string();
    let mut day = "01".to_string();

    if let Some(date) = entry.get("date") {
        let parts: Vec<&str> = date.split('-').collect();
        match parts.as_slice() {
            [y, m, d] => {
                year = y.to_string();
                month = m.to_string();
                day = d.to_string();
            }
            [y, m] => {
                year = y.to_string();
                month = m.to_string();
            }
            [y] => year = y.to_string(),
            _ => {}
        }
    }

    if let Some(raw_month) = entry.get("month") {
        if month == "01" {
            month = month_to_number(raw_month).ok_or_else(|| AcademicError::InvalidMonthError {
                key: entry.key.clone(),
                value: raw_month.to_string(),
            })?;
        }
    }

    if year.is_empty() {
        if let Some(raw_year) = entry.get("year") {
            year = raw_year.to_string();
        }
    }

    if year.is_empty() {
        tracing::error!("Invalid date for entry `{}`.", entry.key);
    }

    Ok(format!("{}-{}-{}", year, month, day))
}

/// Splits `keywords` into tags; `normalize` gives each tag a capital first
/// letter and lower-case rest.
pub fn clean_tags(keywords: &str, normalize: bool) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(|tag| {
            if normalize {
                capitalize(tag)
            } else {
                tag.to_string()
            }
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Reads the `featured` flag from an entry's comma separated `options` field.
pub fn featured_from_options(options: &str, default: bool) -> bool {
    for option in options.split(',') {
        match option.split_once('=') {
            Some((name, value)) if name.trim() == "featured" => {
                return match parse_bool(value) {
                    Some(flag) => flag,
                    None => {
                        tracing::warn!("Could not parse options field: {}", option.trim());
                        default
                    }
                };
            }
            Some(_) => {}
            None if option.trim() == "featured" => return true,
            None => {}
        }
    }
    default
}

/// Name of the venue, italicised in Markdown.
pub fn publication_name(entry: &BibEntry) -> String {
    ["booktitle", "journal", "publisher", "institution"]
        .iter()
        .find_map(|field| entry.get(field))
        .map(|venue| format!("*{}*", venue))
        .unwrap_or_default()
}

pub fn build_front_matter(
    entry: &BibEntry,
    options: &TransformOptions,
    publish_date: &str,
) -> Result<FrontMatter> {
    let title = entry
        .get("title")
        .ok_or_else(|| AcademicError::MissingFieldError {
            key: entry.key.clone(),
            field: "title".to_string(),
        })?;

    let authors = entry
        .get("author")
        .or_else(|| entry.get("editor"))
        .map(clean_authors);

    let featured = match entry.get("options") {
        Some(opts) => featured_from_options(opts, options.featured),
        None => options.featured,
    };

    let pub_type = PublicationType::from_entry_type(&entry.entry_type);

    Ok(FrontMatter {
        title: title.to_string(),
        date: resolve_date(entry)?,
        publish_date: publish_date.to_string(),
        authors,
        publication_types: vec![pub_type.code().to_string()],
        abstract_text: entry.get("abstract").unwrap_or_default().to_string(),
        featured,
        publication: publication_name(entry),
        tags: entry
            .get("keywords")
            .map(|keywords| clean_tags(keywords, options.normalize)),
        url_pdf: entry.get("url").map(str::to_string),
        doi: entry.get("doi").map(str::to_string),
    })
}

/// `index.md` content: TOML front matter between `+++` fences.
pub fn render_markdown(front_matter: &FrontMatter) -> Result<String> {
    let toml = toml::to_string(front_matter)?;
    Ok(format!("+++\n{}+++\n\n", toml))
}

pub fn build_bundle(
    entry: &BibEntry,
    options: &TransformOptions,
    publish_date: &str,
) -> Result<PublicationBundle> {
    let slug = slugify(&entry.key, true);
    if !slug.chars().any(char::is_alphanumeric) {
        return Err(AcademicError::InvalidKeyError {
            key: entry.key.clone(),
        });
    }

    let front_matter = build_front_matter(entry, options, publish_date)?;
    let markdown = render_markdown(&front_matter)?;
    let bundle_dir = format!(
        "content/{}/{}",
        options.publication_dir.trim_matches('/'),
        slug
    );

    Ok(PublicationBundle {
        key: entry.key.clone(),
        bundle_dir,
        front_matter,
        markdown,
        citation: write_entry(entry),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn book() -> BibEntry {
        BibEntry::new("Bigetti2019", "book")
            .with_field("title", "The title of the book")
            .with_field("author", "Bigetti, Nelson")
            .with_field("year", "2019")
            .with_field("abstract", "Paragraph one.\n\nParagraph two.")
            .with_field("keywords", "tag1, Tag with spaces, MixedCase")
    }

    #[test]
    fn test_month_to_number() {
        assert_eq!(month_to_number("3").as_deref(), Some("03"));
        assert_eq!(month_to_number("11").as_deref(), Some("11"));
        assert_eq!(month_to_number("mar").as_deref(), Some("03"));
        assert_eq!(month_to_number("September").as_deref(), Some("09"));
        assert_eq!(month_to_number(" DECEMBER ").as_deref(), Some("12"));
        assert_eq!(month_to_number("Smarch"), None);
        assert_eq!(month_to_number("ja"), None);
    }

    #[test]
    fn test_resolve_date_from_date_field() {
        let entry = BibEntry::new("k", "article").with_field("date", "2020-05-17");
        assert_eq!(resolve_date(&entry).unwrap(), "2020-05-17");

        let entry = BibEntry::new("k", "article").with_field("date", "2020-05");
        assert_eq!(resolve_date(&entry).unwrap(), "2020-05-01");
    }

    #[test]
    fn test_resolve_date_from_year_and_month() {
        let entry = BibEntry::new("k", "article")
            .with_field("year", "2018")
            .with_field("month", "August");
        assert_eq!(resolve_date(&entry).unwrap(), "2018-08-01");
    }

    #[test]
    fn test_date_month_wins_over_month_field() {
        let entry = BibEntry::new("k", "article")
            .with_field("date", "2018-04")
            .with_field("month", "aug");
        assert_eq!(resolve_date(&entry).unwrap(), "2018-04-01");
    }

    #[test]
    fn test_missing_year_still_produces_a_date() {
        let entry = BibEntry::new("k", "misc");
        assert_eq!(resolve_date(&entry).unwrap(), "-01-01");
    }

    #[test]
    fn test_invalid_month_is_an_error() {
        let entry = BibEntry::new("k", "misc")
            .with_field("year", "2018")
            .with_field("month", "Smarch");
        assert!(matches!(
            resolve_date(&entry),
            Err(AcademicError::InvalidMonthError { .. })
        ));
    }

    #[test]
    fn test_clean_tags() {
        assert_eq!(
            clean_tags("tag1, Tag with spaces, MixedCase", true),
            vec!["Tag1", "Tag with spaces", "Mixedcase"]
        );
        assert_eq!(clean_tags(" a ,b,, ", false), vec!["a", "b"]);
    }

    #[test]
    fn test_featured_from_options() {
        assert!(featured_from_options("featured", false));
        assert!(featured_from_options("other, featured", false));
        assert!(featured_from_options("featured=true", false));
        assert!(!featured_from_options("featured = false", true));
        assert!(featured_from_options("featured=maybe", true));
        assert!(!featured_from_options("other=1", false));
    }

    #[test]
    fn test_publication_name_precedence() {
        let entry = BibEntry::new("k", "inproceedings")
            .with_field("journal", "J")
            .with_field("booktitle", "Proc. of Things");
        assert_eq!(publication_name(&entry), "*Proc. of Things*");

        let entry = BibEntry::new("k", "techreport").with_field("institution", "MIT");
        assert_eq!(publication_name(&entry), "*MIT*");

        assert_eq!(publication_name(&BibEntry::new("k", "misc")), "");
    }

    #[test]
    fn test_build_front_matter() {
        let options = TransformOptions {
            normalize: true,
            ..TransformOptions::default()
        };
        let fm = build_front_matter(&book(), &options, "2024-01-01T00:00:00.000000Z").unwrap();
        assert_eq!(fm.title, "The title of the book");
        assert_eq!(fm.date, "2019-01-01");
        assert_eq!(fm.authors, Some(vec!["Nelson Bigetti".to_string()]));
        assert_eq!(fm.publication_types, vec!["5"]);
        assert_eq!(fm.abstract_text, "Paragraph one.\n\nParagraph two.");
        assert!(!fm.featured);
        assert_eq!(fm.publication, "");
        assert_eq!(
            fm.tags,
            Some(vec![
                "Tag1".to_string(),
                "Tag with spaces".to_string(),
                "Mixedcase".to_string()
            ])
        );
        assert_eq!(fm.url_pdf, None);
    }

    #[test]
    fn test_editor_used_when_no_author() {
        let entry = BibEntry::new("k", "proceedings")
            .with_field("title", "Proceedings")
            .with_field("editor", "Lovelace, Ada");
        let fm = build_front_matter(&entry, &TransformOptions::default(), "t").unwrap();
        assert_eq!(fm.authors, Some(vec!["Ada Lovelace".to_string()]));
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let entry = BibEntry::new("notitle", "misc");
        assert!(matches!(
            build_front_matter(&entry, &TransformOptions::default(), "t"),
            Err(AcademicError::MissingFieldError { .. })
        ));
    }

    #[test]
    fn test_markdown_round_trips_through_toml() {
        let fm = build_front_matter(&book(), &TransformOptions::default(), "t").unwrap();
        let markdown = render_markdown(&fm).unwrap();
        assert!(markdown.starts_with("+++\ntitle = \"The title of the book\"\n"));
        assert!(markdown.ends_with("+++\n\n"));

        let body = markdown
            .trim_start_matches("+++\n")
            .trim_end_matches("+++\n\n");
        let parsed: FrontMatter = toml::from_str(body).unwrap();
        assert_eq!(parsed, fm);
    }

    #[test]
    fn test_build_bundle_paths() {
        let options = TransformOptions {
            publication_dir: "papers/".to_string(),
            ..TransformOptions::default()
        };
        let bundle = build_bundle(&book(), &options, "t").unwrap();
        assert_eq!(bundle.bundle_dir, "content/papers/bigetti-2019");
        assert_eq!(bundle.markdown_path(), "content/papers/bigetti-2019/index.md");
        assert_eq!(bundle.cite_path(), "content/papers/bigetti-2019/cite.bib");
        assert!(bundle.citation.starts_with("@book{Bigetti2019,\n"));
    }

    #[test]
    fn test_key_without_usable_characters_is_an_error() {
        let entry = BibEntry::new("?!/", "misc").with_field("title", "Punctuation only");
        let result = build_bundle(&entry, &TransformOptions::default(), "t");
        assert!(matches!(
            result,
            Err(AcademicError::InvalidKeyError { ref key }) if key == "?!/"
        ));

        let entry = BibEntry::new("._:", "misc").with_field("title", "Separators only");
        assert!(build_bundle(&entry, &TransformOptions::default(), "t").is_err());
    }

    #[test]
    fn test_publish_timestamp_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(publish_timestamp(now), "2024-03-09T14:05:07.000000Z");
    }
}
