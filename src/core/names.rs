//! BibTeX personal-name handling.

/// Parts of a name in BibTeX terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub first: Vec<String>,
    pub von: Vec<String>,
    pub last: Vec<String>,
    pub jr: Vec<String>,
}

impl NameParts {
    /// `First von Last`, with `, Jr` appended when present.
    pub fn display(&self) -> String {
        let mut fullname = self
            .first
            .iter()
            .chain(&self.von)
            .chain(&self.last)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if !self.jr.is_empty() {
            fullname.push_str(", ");
            fullname.push_str(&self.jr.join(" "));
        }
        fullname
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidName {
    pub name: String,
    pub reason: &'static str,
}

fn is_lowercase_word(word: &str) -> bool {
    word.chars()
        .find(|c| c.is_alphabetic())
        .map(char::is_lowercase)
        .unwrap_or(false)
}

fn words(part: &str) -> Vec<String> {
    part.split_whitespace().map(str::to_string).collect()
}

/// Splits `von Last` into its two pieces. The final word is always last.
fn split_von_last(mut words: Vec<String>) -> (Vec<String>, Vec<String>) {
    if words.len() <= 1 {
        return (Vec::new(), words);
    }
    let boundary = words[..words.len() - 1]
        .iter()
        .rposition(|w| is_lowercase_word(w));
    match boundary {
        Some(end) => {
            let last = words.split_off(end + 1);
            (words, last)
        }
        None => (Vec::new(), words),
    }
}

/// Splits a single name in one of the forms `First von Last`,
/// `von Last, First` or `von Last, Jr, First`.
pub fn split_name(name: &str) -> Result<NameParts, InvalidName> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InvalidName {
            name: name.to_string(),
            reason: "empty name",
        });
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if parts.len() > 3 {
        return Err(InvalidName {
            name: name.to_string(),
            reason: "too many commas",
        });
    }
    if parts.iter().take(1).any(|p| p.is_empty()) {
        return Err(InvalidName {
            name: name.to_string(),
            reason: "missing last name",
        });
    }

    if parts.len() == 1 {
        let mut all = words(parts[0]);
        if all.len() == 1 {
            return Ok(NameParts {
                last: all,
                ..NameParts::default()
            });
        }
        let candidates = &all[..all.len() - 1];
        let von_start = candidates.iter().position(|w| is_lowercase_word(w));
        return Ok(match von_start {
            None => {
                let last = all.split_off(all.len() - 1);
                NameParts {
                    first: all,
                    last,
                    ..NameParts::default()
                }
            }
            Some(start) => {
                let end = candidates
                    .iter()
                    .rposition(|w| is_lowercase_word(w))
                    .unwrap_or(start);
                let last = all.split_off(end + 1);
                let von = all.split_off(start);
                NameParts {
                    first: all,
                    von,
                    last,
                    jr: Vec::new(),
                }
            }
        });
    }

    let (von, last) = split_von_last(words(parts[0]));
    let (jr, first) = if parts.len() == 3 {
        (words(parts[1]), words(parts[2]))
    } else {
        (Vec::new(), words(parts[1]))
    };
    Ok(NameParts {
        first,
        von,
        last,
        jr,
    })
}

/// Converts a BibTeX `author`/`editor` value into `First von Last` names.
pub fn clean_authors(author_str: &str) -> Vec<String> {
    let flattened = author_str
        .replace('\n', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    flattened
        .split(" and ")
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(|author| match split_name(author) {
            Ok(parts) => parts.display(),
            Err(invalid) => {
                tracing::warn!(
                    "Could not split author name `{}` ({}), keeping it as-is",
                    invalid.name,
                    invalid.reason
                );
                author.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_last() {
        let parts = split_name("Donald E. Knuth").unwrap();
        assert_eq!(parts.first, vec!["Donald", "E."]);
        assert_eq!(parts.last, vec!["Knuth"]);
        assert!(parts.von.is_empty());
    }

    #[test]
    fn test_first_von_last() {
        let parts = split_name("Ludwig van der Beethoven").unwrap();
        assert_eq!(parts.first, vec!["Ludwig"]);
        assert_eq!(parts.von, vec!["van", "der"]);
        assert_eq!(parts.last, vec!["Beethoven"]);
    }

    #[test]
    fn test_last_comma_first() {
        let parts = split_name("Bigetti, Nelson").unwrap();
        assert_eq!(parts.display(), "Nelson Bigetti");

        let parts = split_name("de la Fontaine, Jean").unwrap();
        assert_eq!(parts.von, vec!["de", "la"]);
        assert_eq!(parts.last, vec!["Fontaine"]);
        assert_eq!(parts.display(), "Jean de la Fontaine");
    }

    #[test]
    fn test_jr_form() {
        let parts = split_name("King, Jr, Martin Luther").unwrap();
        assert_eq!(parts.jr, vec!["Jr"]);
        assert_eq!(parts.display(), "Martin Luther King, Jr");
    }

    #[test]
    fn test_single_word() {
        assert_eq!(split_name("Aristotle").unwrap().display(), "Aristotle");
    }

    #[test]
    fn test_invalid_names() {
        assert!(split_name("a, b, c, d").is_err());
        assert!(split_name("   ").is_err());
        assert!(split_name(", First").is_err());
    }

    #[test]
    fn test_clean_authors() {
        let authors = clean_authors("Bigetti, Nelson and\n  Ada Lovelace and van Rossum, Guido");
        assert_eq!(
            authors,
            vec!["Nelson Bigetti", "Ada Lovelace", "Guido van Rossum"]
        );
    }

    #[test]
    fn test_clean_authors_keeps_invalid_names() {
        let authors = clean_authors("a, b, c, d and Ada Lovelace");
        assert_eq!(authors, vec!["a, b, c, d", "Ada Lovelace"]);
    }
}
