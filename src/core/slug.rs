use regex::Regex;
use std::sync::LazyLock;

static NON_DIGIT_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\D+)(\d+)").expect("valid regex"));
static DIGIT_NON_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(\D+)").expect("valid regex"));
static REPEATED_HYPHENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("valid regex"));

/// Turns a citation key into a URL-friendly folder name, e.g.
/// `Smith2019DeepLearning` becomes `smith-2019-deep-learning`.
pub fn slugify(s: &str, lower: bool) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if matches!(c, '.' | '_' | ':') { '-' } else { c })
        .collect();

    let delimited = NON_DIGIT_DIGIT.replace_all(&replaced, "${1}-${2}");
    let delimited = DIGIT_NON_DIGIT.replace_all(&delimited, "${1}-${2}");
    let delimited = split_camel_case(&delimited);

    let kept: String = delimited
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();
    let collapsed = REPEATED_HYPHENS.replace_all(kept.trim(), "-");

    if lower {
        collapsed.to_lowercase()
    } else {
        collapsed.into_owned()
    }
}

/// Inserts `-` before an ASCII capital that follows a lowercase letter, or
/// that is not the first character and is followed by a lowercase letter.
fn split_camel_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let after_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let before_lower = i > 0 && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if after_lower || before_lower {
                out.push('-');
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_and_numbers() {
        assert_eq!(slugify("Smith2019DeepLearning", true), "smith-2019-deep-learning");
        assert_eq!(slugify("smith2019paper", true), "smith-2019-paper");
        assert_eq!(slugify("a1b2", true), "a-1-b-2");
    }

    #[test]
    fn test_symbols_become_hyphens() {
        assert_eq!(slugify("doe.j_2020:ml", true), "doe-j-2020-ml");
        assert_eq!(slugify("key/with spaces!", true), "keywithspaces");
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(slugify("ABCDef", true), "abc-def");
        assert_eq!(slugify("NASA", true), "nasa");
    }

    #[test]
    fn test_consecutive_hyphens_collapse() {
        assert_eq!(slugify("a--b___c", true), "a-b-c");
    }

    #[test]
    fn test_keep_case() {
        assert_eq!(slugify("Smith2019", false), "Smith-2019");
    }

    #[test]
    fn test_leading_capital_is_not_delimited() {
        assert_eq!(slugify("Book", true), "book");
    }
}
