//! Text folding and term matching shared by the classifier, scorer and gap matcher.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercases and strips diacritics: `"Indústria"` → `"industria"`.
#[must_use]
pub fn fold(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase()
}

/// Folds and joins several fields into one searchable blob.
#[must_use]
pub fn fold_joined(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts.iter().filter(|p| !p.trim().is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&fold(part.trim()));
    }
    out
}

/// Whether `term` occurs in `haystack` without being glued to a neighbouring word.
///
/// Both inputs must already be folded. Boundaries are only enforced on the sides
/// of `term` that end in an alphanumeric character, so URL fragments such as
/// `"/blog"` or `"linkedin.com/in/"` still match inside links.
#[must_use]
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let check_left = term.chars().next().is_some_and(char::is_alphanumeric);
    let check_right = term.chars().next_back().is_some_and(char::is_alphanumeric);

    let mut from = 0;
    while let Some(offset) = haystack.get(from..).and_then(|rest| rest.find(term)) {
        let start = from.saturating_add(offset);
        let end = start.saturating_add(term.len());
        let left_ok = !check_left
            || haystack.get(..start).and_then(|s| s.chars().next_back()).is_none_or(|c| !c.is_alphanumeric());
        let right_ok = !check_right
            || haystack.get(end..).and_then(|s| s.chars().next()).is_none_or(|c| !c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        let step = haystack.get(start..).and_then(|s| s.chars().next()).map_or(1, char::len_utf8);
        from = start.saturating_add(step);
    }
    false
}

/// Whether any of `terms` occurs in `haystack` (see [`contains_term`]).
#[must_use]
pub fn contains_any(haystack: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| contains_term(haystack, t))
}

/// Words longer than `min_len` characters, folded.
#[must_use]
pub fn significant_words(s: &str, min_len: usize) -> Vec<String> {
    fold(s)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > min_len)
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold("Indústria"), "industria");
        assert_eq!(fold("SÃO PAULO"), "sao paulo");
        assert_eq!(fold("Comércio Exterior"), "comercio exterior");
    }

    #[test]
    fn fold_joined_skips_blank_parts() {
        assert_eq!(fold_joined(&["Vaga", "  ", "Empresa"]), "vaga empresa");
    }

    #[test]
    fn term_respects_word_boundaries() {
        assert!(contains_term("curso de excel", "curso"));
        assert!(!contains_term("recursos humanos", "curso"));
        assert!(!contains_term("concurso publico", "curso"));
        assert!(contains_term("acme ltda.", "ltda"));
    }

    #[test]
    fn term_allows_url_fragments() {
        assert!(contains_term("https://acme.com/blog/post", "/blog"));
        assert!(contains_term("https://br.linkedin.com/in/fulano", "linkedin.com/in/"));
    }

    #[test]
    fn term_finds_later_occurrence() {
        assert!(contains_term("recurso e curso", "curso"));
    }

    #[test]
    fn empty_term_never_matches() {
        assert!(!contains_term("anything", ""));
    }

    #[test]
    fn significant_words_filters_short() {
        assert_eq!(significant_words("Gestão de ERP Industrial", 3), vec!["gestao", "industrial"]);
    }
}
