//! BibTeX reader.
//!
//! Accepts `@type{key, field = value}` and `@type(key, ...)` entries, `@string`
//! macros, `@preamble` and `@comment` blocks. Values may be braced, quoted,
//! numeric or macro references joined with `#`. A malformed entry is recorded
//! in [`Bibliography::errors`] and parsing resumes at the next `@`.

use crate::core::latex::latex_to_unicode;
use crate::domain::model::{BibEntry, Bibliography, SyntaxIssue};
use std::collections::BTreeMap;

const COMMON_STRINGS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Fields whose content is a locator, not prose. They skip LaTeX conversion.
const VERBATIM_FIELDS: [&str; 4] = ["url", "doi", "eprint", "file"];

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Predefine the `jan` … `dec` month macros.
    pub common_strings: bool,
    /// Convert LaTeX markup in field values to Unicode.
    pub convert_latex: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            common_strings: true,
            convert_latex: true,
        }
    }
}

/// Parses with [`ParseOptions::default`].
pub fn parse_bibtex(input: &str) -> Bibliography {
    BibtexParser::new(ParseOptions::default()).parse(input)
}

#[derive(Debug, Clone, Default)]
pub struct BibtexParser {
    options: ParseOptions,
}

type ParseResult<T> = std::result::Result<T, String>;

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char, context: &str) -> ParseResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected '{}' {}, found '{}'", expected, context, c)),
            None => Err(format!("expected '{}' {}, found end of input", expected, context)),
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || "{}()=,#\"@%~".contains(c) {
                break;
            }
            ident.push(c);
            self.bump();
        }
        ident
    }

    /// Reads up to the brace that closes an already consumed `{`, keeping
    /// nested braces in the result. As in BibTeX, `\{` and `\}` count towards
    /// the nesting like any other brace.
    fn read_braced(&mut self) -> ParseResult<String> {
        let mut depth = 0usize;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('{') => {
                    depth += 1;
                    out.push('{');
                }
                Some('}') if depth == 0 => return Ok(out),
                Some('}') => {
                    depth -= 1;
                    out.push('}');
                }
                Some(c) => out.push(c),
                None => return Err("unterminated braced value".to_string()),
            }
        }
    }

    /// Reads up to the closing `"` at brace depth zero. A `"` inside a value
    /// must be wrapped in braces, e.g. `{\"o}`.
    fn read_quoted(&mut self) -> ParseResult<String> {
        let mut depth = 0usize;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') if depth == 0 => return Ok(out),
                Some('{') => {
                    depth += 1;
                    out.push('{');
                }
                Some('}') => {
                    depth = depth.saturating_sub(1);
                    out.push('}');
                }
                Some(c) => out.push(c),
                None => return Err("unterminated quoted value".to_string()),
            }
        }
    }

    fn read_until_close(&mut self, close: char) -> ParseResult<String> {
        let mut depth = 0usize;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == close && depth == 0 => return Ok(out),
                Some('{') => {
                    depth += 1;
                    out.push('{');
                }
                Some('}') => {
                    depth = depth.saturating_sub(1);
                    out.push('}');
                }
                Some(c) => out.push(c),
                None => return Err(format!("missing closing '{}'", close)),
            }
        }
    }
}

impl BibtexParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn parse(&self, input: &str) -> Bibliography {
        let mut bib = Bibliography::default();
        let mut cursor = Cursor {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
        };

        loop {
            match cursor.peek() {
                None => break,
                Some('@') => {
                    let line = cursor.line;
                    cursor.bump();
                    if let Err(message) = self.parse_block(&mut cursor, &mut bib) {
                        tracing::warn!("BibTeX syntax error on line {}: {}", line, message);
                        bib.errors.push(SyntaxIssue { line, message });
                    }
                }
                Some('%') => cursor.skip_line(),
                Some(_) => {
                    cursor.bump();
                }
            }
        }

        if self.options.convert_latex {
            for entry in &mut bib.entries {
                for (name, value) in entry.fields.iter_mut() {
                    if !VERBATIM_FIELDS.contains(&name.as_str()) {
                        *value = latex_to_unicode(value);
                    }
                }
            }
        }

        bib
    }

    fn parse_block(&self, cursor: &mut Cursor, bib: &mut Bibliography) -> ParseResult<()> {
        cursor.skip_whitespace();
        let block_type = cursor.read_identifier().to_lowercase();
        if block_type.is_empty() {
            return Err("missing entry type after '@'".to_string());
        }

        cursor.skip_whitespace();
        let close = match cursor.bump() {
            Some('{') => '}',
            Some('(') => ')',
            Some(c) => {
                return Err(format!(
                    "expected '{{' or '(' after @{}, found '{}'",
                    block_type, c
                ))
            }
            None => return Err(format!("unexpected end of input after @{}", block_type)),
        };

        match block_type.as_str() {
            "comment" => {
                let comment = cursor.read_until_close(close)?;
                bib.comments.push(comment.trim().to_string());
            }
            "preamble" => {
                let value = self.parse_value(cursor, &bib.strings)?;
                cursor.skip_whitespace();
                cursor.expect(close, "to end @preamble")?;
                bib.preambles.push(value);
            }
            "string" => {
                cursor.skip_whitespace();
                let name = cursor.read_identifier().to_lowercase();
                if name.is_empty() {
                    return Err("missing @string name".to_string());
                }
                cursor.skip_whitespace();
                cursor.expect('=', "after @string name")?;
                let value = self.parse_value(cursor, &bib.strings)?;
                cursor.skip_whitespace();
                if cursor.peek() == Some(',') {
                    cursor.bump();
                    cursor.skip_whitespace();
                }
                cursor.expect(close, "to end @string")?;
                bib.strings.insert(name, value);
            }
            _ => {
                let entry = self.parse_entry(cursor, &block_type, close, &bib.strings)?;
                bib.entries.push(entry);
            }
        }
        Ok(())
    }

    fn parse_entry(
        &self,
        cursor: &mut Cursor,
        entry_type: &str,
        close: char,
        strings: &BTreeMap<String, String>,
    ) -> ParseResult<BibEntry> {
        cursor.skip_whitespace();
        let mut key = String::new();
        while let Some(c) = cursor.peek() {
            if c == ',' || c == close || c.is_whitespace() {
                break;
            }
            key.push(c);
            cursor.bump();
        }
        if key.is_empty() {
            return Err(format!("missing citation key in @{} entry", entry_type));
        }
        cursor.skip_whitespace();
        if !matches!(cursor.peek(), Some(c) if c == ',' || c == close) {
            return Err(format!("expected ',' after citation key `{}`", key));
        }

        let mut entry = BibEntry::new(key, entry_type);
        loop {
            cursor.skip_whitespace();
            match cursor.peek() {
                Some(c) if c == close => {
                    cursor.bump();
                    break;
                }
                Some(',') => {
                    cursor.bump();
                    continue;
                }
                Some(_) => {}
                None => return Err(format!("unterminated entry `{}`", entry.key)),
            }

            let name = cursor.read_identifier().to_lowercase();
            if name.is_empty() {
                let found = cursor.peek().map(String::from).unwrap_or_default();
                return Err(format!(
                    "unexpected character '{}' in entry `{}`",
                    found, entry.key
                ));
            }
            cursor.skip_whitespace();
            cursor.expect('=', &format!("after field `{}`", name))?;
            let value = normalize_lines(&self.parse_value(cursor, strings)?);

            if entry.fields.insert(name.clone(), value).is_some() {
                tracing::warn!(
                    "Duplicate field `{}` in entry `{}`, keeping the last value",
                    name,
                    entry.key
                );
            }

            cursor.skip_whitespace();
            match cursor.peek() {
                Some(c) if c == ',' || c == close => {}
                Some(c) => {
                    return Err(format!(
                        "expected ',' or '{}' after field `{}`, found '{}'",
                        close, name, c
                    ))
                }
                None => return Err(format!("unterminated entry `{}`", entry.key)),
            }
        }
        Ok(entry)
    }

    fn parse_value(
        &self,
        cursor: &mut Cursor,
        strings: &BTreeMap<String, String>,
    ) -> ParseResult<String> {
        let mut value = String::new();
        loop {
            cursor.skip_whitespace();
            match cursor.peek() {
                Some('{') => {
                    cursor.bump();
                    value.push_str(&cursor.read_braced()?);
                }
                Some('"') => {
                    cursor.bump();
                    value.push_str(&cursor.read_quoted()?);
                }
                Some(c) if c.is_ascii_digit() => {
                    while let Some(d) = cursor.peek().filter(char::is_ascii_digit) {
                        value.push(d);
                        cursor.bump();
                    }
                }
                Some(c) if !"}),=#\"@".contains(c) => {
                    let name = cursor.read_identifier();
                    if name.is_empty() {
                        return Err(format!("unexpected character '{}' in value", c));
                    }
                    value.push_str(&self.resolve_macro(&name, strings));
                }
                Some(c) => return Err(format!("unexpected character '{}' in value", c)),
                None => return Err("unexpected end of input in value".to_string()),
            }

            cursor.skip_whitespace();
            if cursor.peek() == Some('#') {
                cursor.bump();
            } else {
                return Ok(value);
            }
        }
    }

    fn resolve_macro(&self, name: &str, strings: &BTreeMap<String, String>) -> String {
        let lower = name.to_lowercase();
        if let Some(value) = strings.get(&lower) {
            return value.clone();
        }
        if self.options.common_strings {
            if let Some((_, month)) = COMMON_STRINGS.iter().find(|(abbr, _)| *abbr == lower) {
                return (*month).to_string();
            }
        }
        tracing::warn!("Undefined string `{}`, keeping it literally", name);
        name.to_string()
    }
}

/// Trims every line of a value while keeping its line breaks.
fn normalize_lines(value: &str) -> String {
    if !value.contains('\n') {
        return value.trim().to_string();
    }
    value
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_article() {
        let bib = parse_bibtex(
            r#"@Article{Smith2019,
  Author = {Smith, John},
  title = "A {GPU} study",
  year = 2019,
  journal = {Journal of Things},
}"#,
        );
        assert!(bib.errors.is_empty());
        assert_eq!(bib.entries.len(), 1);
        let entry = &bib.entries[0];
        assert_eq!(entry.key, "Smith2019");
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.get("author"), Some("Smith, John"));
        assert_eq!(entry.get("title"), Some("A GPU study"));
        assert_eq!(entry.get("year"), Some("2019"));
        assert_eq!(entry.get("journal"), Some("Journal of Things"));
    }

    #[test]
    fn test_parenthesised_entry() {
        let bib = parse_bibtex("@misc(note1, title = {Note})");
        assert_eq!(bib.entries.len(), 1);
        assert_eq!(bib.entries[0].get("title"), Some("Note"));
    }

    #[test]
    fn test_string_macros_and_concatenation() {
        let bib = parse_bibtex(
            r#"@string{acm = "ACM Press"}
@book{b1, title = {T}, publisher = acm # { New York}, month = jun}"#,
        );
        let entry = &bib.entries[0];
        assert_eq!(entry.get("publisher"), Some("ACM Press New York"));
        assert_eq!(entry.get("month"), Some("June"));
        assert_eq!(bib.strings.get("acm").map(String::as_str), Some("ACM Press"));
    }

    #[test]
    fn test_common_strings_can_be_disabled() {
        let parser = BibtexParser::new(ParseOptions {
            common_strings: false,
            convert_latex: true,
        });
        let bib = parser.parse("@misc{m, month = jan}");
        assert_eq!(bib.entries[0].get("month"), Some("jan"));
    }

    #[test]
    fn test_comments_and_preamble_produce_no_entries() {
        let bib = parse_bibtex(
            r#"% a line comment with an @ sign
@comment{ignored {nested} text}
@preamble{ "\newcommand{\noop}[1]{}" }
Free text between entries.
@misc{only, title = {Only}}"#,
        );
        assert!(bib.errors.is_empty(), "{:?}", bib.errors);
        assert_eq!(bib.entries.len(), 1);
        assert_eq!(bib.comments, vec!["ignored {nested} text"]);
        assert_eq!(bib.preambles.len(), 1);
    }

    #[test]
    fn test_multiline_values_keep_line_breaks() {
        let bib = parse_bibtex(
            "@book{b, abstract = {Paragraph one.\n\n    Paragraph two.\n\n    Paragraph three.}}",
        );
        assert_eq!(
            bib.entries[0].get("abstract"),
            Some("Paragraph one.\n\nParagraph two.\n\nParagraph three.")
        );
    }

    #[test]
    fn test_latex_is_converted_except_in_locators() {
        let bib = parse_bibtex(
            r#"@article{a, author = {M{\"u}ller, Hans}, url = {https://example.com/~hans/a--b.pdf}}"#,
        );
        let entry = &bib.entries[0];
        assert_eq!(entry.get("author"), Some("Müller, Hans"));
        assert_eq!(entry.get("url"), Some("https://example.com/~hans/a--b.pdf"));
    }

    #[test]
    fn test_malformed_entry_is_reported_and_parsing_resumes() {
        let bib = parse_bibtex(
            "@article{good1, title = {One}}\n@article{bad, title {Missing equals}}\n@article{good2, title = {Two}}",
        );
        assert_eq!(bib.entries.len(), 2);
        assert_eq!(bib.entries[0].key, "good1");
        assert_eq!(bib.entries[1].key, "good2");
        assert_eq!(bib.errors.len(), 1);
        assert_eq!(bib.errors[0].line, 2);
    }

    #[test]
    fn test_unterminated_entry_is_an_error() {
        let bib = parse_bibtex("@article{open, title = {never closed");
        assert!(bib.entries.is_empty());
        assert_eq!(bib.errors.len(), 1);
    }

    #[test]
    fn test_escaped_braces_count_towards_nesting() {
        let bib = parse_bibtex(r"@misc{ok, title = {Rock \{and\} Roll}}");
        assert!(bib.errors.is_empty(), "{:?}", bib.errors);
        assert_eq!(bib.entries[0].get("title"), Some("Rock {and} Roll"));

        let bib = parse_bibtex("@misc{bad, title = {a \\} b}}\n@misc{next, title = {Next}}");
        assert_eq!(bib.errors.len(), 1);
        assert_eq!(bib.entries.len(), 1);
        assert_eq!(bib.entries[0].key, "next");
    }

    #[test]
    fn test_duplicate_field_keeps_last_value() {
        let bib = parse_bibtex("@misc{d, title = {First}, title = {Second}}");
        assert_eq!(bib.entries[0].get("title"), Some("Second"));
    }

    #[test]
    fn test_undefined_macro_is_kept() {
        let bib = parse_bibtex("@misc{u, publisher = unknownpress}");
        assert_eq!(bib.entries[0].get("publisher"), Some("unknownpress"));
    }

    #[test]
    fn test_nonstandard_types_are_kept() {
        let bib = parse_bibtex("@dataset{ds, title = {Data}}");
        assert_eq!(bib.entries[0].entry_type, "dataset");
    }
}
