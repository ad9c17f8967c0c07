use crate::domain::model::BibEntry;

const INDENT: &str = " ";

/// Renders one entry as a standalone citation, fields sorted by name:
///
/// ```text
/// @article{key,
///  author = {...},
///  title = {...}
/// }
///
/// ```
pub fn write_entry(entry: &BibEntry) -> String {
    let mut out = format!("@{}{{{}", entry.entry_type, entry.key);
    for (name, value) in &entry.fields {
        out.push_str(&format!(",\n{}{} = {{{}}}", INDENT, name, value));
    }
    out.push_str("\n}\n\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_sorted() {
        let entry = BibEntry::new("Smith2019", "article")
            .with_field("title", "Deep things")
            .with_field("author", "John Smith")
            .with_field("year", "2019");
        assert_eq!(
            write_entry(&entry),
            "@article{Smith2019,\n author = {John Smith},\n title = {Deep things},\n year = {2019}\n}\n\n"
        );
    }

    #[test]
    fn test_entry_without_fields() {
        let entry = BibEntry::new("empty", "misc");
        assert_eq!(write_entry(&entry), "@misc{empty\n}\n\n");
    }
}
