//! Competitor discovery: search, classify, score, filter and rank.

use std::collections::HashMap;
use std::sync::LazyLock;

use leadmatch_core::constants::{DEFAULT_MAX_RESULTS, MAX_RESULTS_CAP, MAX_SCORED_PRODUCTS};
use leadmatch_core::score::{compare_rank, rank_candidates, score_result};
use leadmatch_core::{
    DomainFilter, KeywordSets, ScoredCandidate, TargetProfile, classify_with, extract_domain,
    normalize_website,
};
use leadmatch_serper::{OrganicResult, SearchRequest, SerperClient, SerperError};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

const NEGATIVE_TERMS: &str = "-vagas -emprego -curso -blog";
const SOURCE: &str = "serper";
/// Results requested per wanted candidate; filtering drops a share of them.
const OVERFETCH_FACTOR: usize = 2;
const SERPER_MAX_NUM: u32 = 100;

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static TITLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+[-|–—]\s+").unwrap());

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorSearchRequest {
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl CompetitorSearchRequest {
    /// `maxResults`, defaulted and capped.
    pub fn limit(&self) -> usize {
        self.max_results.filter(|n| *n > 0).unwrap_or(DEFAULT_MAX_RESULTS).min(MAX_RESULTS_CAP)
    }

    pub fn query(&self) -> String {
        let mut parts: Vec<&str> = vec![self.industry.trim()];
        let products = self.products.iter().map(|p| p.trim()).filter(|p| !p.is_empty());
        parts.extend(products.take(MAX_SCORED_PRODUCTS));
        if let Some(location) = self.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            parts.push(location);
        }
        parts.push(NEGATIVE_TERMS);
        parts.join(" ")
    }

    fn profile(&self) -> TargetProfile {
        TargetProfile { industry: self.industry.trim().to_owned(), products: self.products.clone() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorSearchResponse {
    pub success: bool,
    pub candidates: Vec<ScoredCandidate>,
    /// Organic results returned by the search provider.
    pub total: usize,
    /// Results dropped by domain, type or duplicate filtering.
    pub filtered: usize,
}

/// Display name from a result title: the text before the first ` - `, ` | ` or dash separator.
pub fn display_name(title: &str, domain: &str) -> String {
    let head = TITLE_SEPARATOR.split(title.trim()).next().unwrap_or_default().trim();
    if head.is_empty() { domain.to_owned() } else { head.to_owned() }
}

pub struct CompetitorService {
    serper: Option<SerperClient>,
    keywords: &'static KeywordSets,
}

impl CompetitorService {
    #[must_use]
    pub fn new(serper: Option<SerperClient>) -> Self {
        Self { serper, keywords: KeywordSets::global() }
    }

    /// Service backed by the Serper client configured in the environment, if any.
    #[must_use]
    pub fn from_env() -> Self {
        let serper = match SerperClient::from_env() {
            Ok(client) => {
                tracing::info!(base_url = client.base_url(), "Serper client configured");
                Some(client)
            },
            Err(e) => {
                tracing::warn!("Competitor search disabled: {}", e);
                None
            },
        };
        Self::new(serper)
    }

    pub fn is_configured(&self) -> bool {
        self.serper.is_some()
    }

    pub async fn search(
        &self,
        request: &CompetitorSearchRequest,
    ) -> Result<CompetitorSearchResponse, ServiceError> {
        if request.industry.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Parâmetro obrigatório: industry".to_owned()));
        }
        let serper = self
            .serper
            .as_ref()
            .ok_or_else(|| ServiceError::NotConfigured(SerperError::MissingApiKey.to_string()))?;

        let limit = request.limit();
        let query = request.query();
        let num = u32::try_from(limit.saturating_mul(OVERFETCH_FACTOR))
            .unwrap_or(SERPER_MAX_NUM)
            .min(SERPER_MAX_NUM);
        let results = serper.search(&SearchRequest::new(&query, num)).await.map_err(|e| {
            tracing::error!(query = %query, error = %e, "competitor search failed");
            e
        })?;

        let filter = DomainFilter::with_extra(request.exclude_domains.iter().map(String::as_str));
        let total = results.len();
        let mut candidates = self.score_results(request, filter.as_ref(), &results);
        let kept = candidates.len();
        rank_candidates(&mut candidates);
        candidates.truncate(limit);

        tracing::info!(
            query = %query,
            total,
            kept,
            returned = candidates.len(),
            "competitor search finished"
        );
        Ok(CompetitorSearchResponse {
            success: true,
            candidates,
            total,
            filtered: total.saturating_sub(kept),
        })
    }

    /// Scores every usable result, keeping the best-ranked candidate per domain.
    fn score_results(
        &self,
        request: &CompetitorSearchRequest,
        filter: Option<&DomainFilter>,
        results: &[OrganicResult],
    ) -> Vec<ScoredCandidate> {
        let profile = request.profile();
        let mut by_domain: HashMap<String, usize> = HashMap::new();
        let mut candidates: Vec<ScoredCandidate> = Vec::with_capacity(results.len());

        for (idx, result) in results.iter().enumerate() {
            let Some(domain) = extract_domain(Some(result.link.as_str())) else {
                tracing::debug!(link = %result.link, "result without domain");
                continue;
            };
            if filter.is_some_and(|f| f.is_excluded(&domain)) {
                tracing::debug!(domain = %domain, "excluded domain");
                continue;
            }
            let business_type =
                classify_with(self.keywords, &result.title, &result.snippet, &result.link);
            if business_type.is_excluded() {
                tracing::debug!(domain = %domain, %business_type, "non-company result");
                continue;
            }

            let position = result
                .position
                .unwrap_or_else(|| u32::try_from(idx.saturating_add(1)).unwrap_or(u32::MAX));
            let scores = score_result(
                self.keywords,
                &profile,
                &result.title,
                &result.snippet,
                position,
                business_type,
            );
            let candidate = ScoredCandidate {
                name: display_name(&result.title, &domain),
                website: normalize_website(Some(result.link.as_str()))
                    .unwrap_or_else(|| result.link.clone()),
                domain: domain.clone(),
                description: result.snippet.clone(),
                relevancia: scores.relevancia,
                similarity_score: scores.similarity,
                business_type,
                source: SOURCE.to_owned(),
                position,
            };

            match by_domain.get(&domain).copied() {
                Some(existing) => {
                    if let Some(slot) = candidates.get_mut(existing)
                        && compare_rank(&candidate, slot).is_lt()
                    {
                        *slot = candidate;
                    }
                },
                None => {
                    by_domain.insert(domain, candidates.len());
                    candidates.push(candidate);
                },
            }
        }
        candidates
    }
}
