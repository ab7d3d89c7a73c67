use globset::{Glob, GlobSet, GlobSetBuilder};
use std::sync::OnceLock;

const EXCLUDED_DOMAINS_ENV: &str = "LEADMATCH_EXCLUDED_DOMAINS";
static BASE_PATTERNS: OnceLock<Vec<String>> = OnceLock::new();

/// Domains that never appear among competitor results.
///
/// A plain pattern such as `acme.com.br` excludes the domain and all of its
/// subdomains; glob patterns (`*.gov.br`) are used as given.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    matcher: GlobSet,
}

impl DomainFilter {
    /// Patterns from `LEADMATCH_EXCLUDED_DOMAINS`, read once per process.
    pub fn base_patterns() -> &'static [String] {
        BASE_PATTERNS.get_or_init(|| {
            Self::split_patterns(std::env::var(EXCLUDED_DOMAINS_ENV).ok().as_deref())
        })
    }

    /// Process-wide patterns merged with per-request ones.
    pub fn with_extra<'a, I>(extra: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::from_patterns(Self::base_patterns().iter().map(String::as_str).chain(extra))
    }

    pub fn is_excluded(&self, domain: &str) -> bool {
        let domain = domain.trim().to_lowercase();
        let domain = domain.strip_prefix("www.").unwrap_or(&domain);
        self.matcher.is_match(domain)
    }

    fn split_patterns(raw: Option<&str>) -> Vec<String> {
        raw.map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
    }

    pub fn from_patterns<'a, I>(patterns: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut added = 0usize;

        for pattern in patterns {
            let pattern = normalize_pattern(pattern);
            if pattern.is_empty() {
                continue;
            }
            let expanded = if pattern.contains(['*', '?', '[']) {
                vec![pattern]
            } else {
                vec![format!("*.{pattern}"), pattern]
            };
            for p in expanded {
                match Glob::new(&p) {
                    Ok(glob) => {
                        builder.add(glob);
                        added = added.saturating_add(1);
                    },
                    Err(e) => tracing::warn!(pattern = %p, error = %e, "ignoring invalid domain pattern"),
                }
            }
        }

        if added == 0 {
            return None;
        }

        let matcher = builder.build().ok()?;
        Some(Self { matcher })
    }
}

/// Accepts bare domains as well as URLs: `https://www.acme.com.br/x` → `acme.com.br`.
fn normalize_pattern(pattern: &str) -> String {
    let lower = pattern.trim().to_lowercase();
    let without_scheme =
        lower.strip_prefix("https://").or_else(|| lower.strip_prefix("http://")).unwrap_or(&lower);
    let host = without_scheme.split('/').next().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_owned()
}

#[cfg(test)]
mod tests {
    use super::DomainFilter;

    #[test]
    fn plain_domain_excludes_subdomains() {
        let filter = DomainFilter::from_patterns(["acme.com.br"]).expect("filter");
        assert!(filter.is_excluded("acme.com.br"));
        assert!(filter.is_excluded("loja.acme.com.br"));
        assert!(filter.is_excluded("www.acme.com.br"));
        assert!(!filter.is_excluded("notacme.com.br"));
    }

    #[test]
    fn glob_pattern_is_used_verbatim() {
        let filter = DomainFilter::from_patterns(["*.gov.br"]).expect("filter");
        assert!(filter.is_excluded("receita.fazenda.gov.br"));
        assert!(!filter.is_excluded("acme.com.br"));
    }

    #[test]
    fn url_patterns_are_reduced_to_host() {
        let filter = DomainFilter::from_patterns(["https://www.Wikipedia.org/wiki"]).expect("filter");
        assert!(filter.is_excluded("pt.wikipedia.org"));
    }

    #[test]
    fn empty_patterns_yield_none() {
        assert!(DomainFilter::from_patterns(["", "  "]).is_none());
    }

    #[test]
    fn env_value_is_split_on_commas() {
        let patterns = DomainFilter::split_patterns(Some(" a.com , ,*.b.com"));
        assert_eq!(patterns, vec!["a.com", "*.b.com"]);
        assert!(DomainFilter::split_patterns(None).is_empty());
    }
}
