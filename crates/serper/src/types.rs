use serde::{Deserialize, Serialize};

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub q: String,
    pub num: u32,
    pub gl: String,
    pub hl: String,
}

impl SearchRequest {
    /// Brazilian, Portuguese-language search.
    pub fn new(query: impl Into<String>, num: u32) -> Self {
        Self { q: query.into(), num, gl: "br".to_owned(), hl: "pt-br".to_owned() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub organic: Vec<OrganicResult>,
}

/// Keeps the well-formed entries of `organic`; an entry missing `title` or
/// `link` is dropped instead of failing the whole response.
fn skip_malformed<'de, D>(deserializer: D) -> Result<Vec<OrganicResult>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Deserialize::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<OrganicResult>(entry) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed organic result");
                None
            },
        })
        .collect())
}

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    /// 1-based rank as reported by the engine.
    #[serde(default)]
    pub position: Option<u32>,
}
