//! Product gap analysis: runs the gap matcher and assembles the sales-facing answer.

use std::collections::HashSet;

use leadmatch_core::Catalog;
use leadmatch_core::text::fold;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ServiceError;

const BENCHMARK_TOP: usize = 3;
const UNKNOWN_CATEGORY: &str = "Outro";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductGapRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub cnae: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub employees: Option<u32>,
    #[serde(default)]
    pub detected_products: Vec<String>,
    /// Passed through untouched to downstream enrichment.
    #[serde(default)]
    pub detected_evidences: Vec<Value>,
    #[serde(default)]
    pub competitors: Vec<CompetitorRef>,
    #[serde(default)]
    pub similar_companies: Vec<SimilarCompany>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimilarCompany {
    #[serde(default, alias = "detectedProducts")]
    pub detected_products: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SalesStrategy {
    CrossSell,
    NewSale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInUse {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opportunity {
    pub name: String,
    pub category: String,
    pub priority: Priority,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesApproach {
    pub strategy: SalesStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_displacement: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StackSuggestion {
    pub core: Vec<String>,
    pub complementary: Vec<String>,
    pub future_expansion: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchmarkOpportunity {
    pub name: String,
    pub category: String,
    pub adoption_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductGapResponse {
    pub success: bool,
    pub company_name: String,
    /// Catalog sector the input resolved to.
    pub sector: String,
    pub products_in_use: Vec<ProductInUse>,
    pub primary_opportunities: Vec<Opportunity>,
    pub relevant_opportunities: Vec<Opportunity>,
    pub estimated_potential: String,
    pub sales_approach: SalesApproach,
    pub stack_suggestion: StackSuggestion,
    pub benchmark_opportunities: Vec<BenchmarkOpportunity>,
}

/// `count / total` as a rounded percentage.
fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = count.saturating_mul(100).saturating_add(total / 2) / total;
    u32::try_from(pct).unwrap_or(100)
}

fn format_potential((min, max): (u32, u32)) -> String {
    format!("R$ {min}K-{max}K ARR")
}

pub struct GapService {
    catalog: &'static Catalog,
}

impl Default for GapService {
    fn default() -> Self {
        Self::new()
    }
}

impl GapService {
    #[must_use]
    pub fn new() -> Self {
        Self { catalog: Catalog::global() }
    }

    pub fn analyze(&self, request: &ProductGapRequest) -> Result<ProductGapResponse, ServiceError> {
        let catalog = self.catalog;
        if catalog.categories.is_empty() {
            return Err(ServiceError::NotConfigured("catálogo de produtos indisponível".to_owned()));
        }
        let sector_input = request.sector.as_deref().unwrap_or_default();
        let detected: Vec<&str> = request
            .detected_products
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        let detected_keys: HashSet<String> = detected.iter().map(|p| fold(p)).collect();
        let is_detected = |product: &str| detected_keys.contains(&fold(product.trim()));

        let gaps = catalog.gaps(sector_input, &detected);
        let products_in_use = self.products_in_use(&detected);

        let opportunity = |name: &String, priority: Priority| {
            let reason = match priority {
                Priority::High => format!("Prioritário para o setor {}", gaps.sector),
                Priority::Medium => format!("Relevante para o setor {}", gaps.sector),
            };
            Opportunity { name: name.clone(), category: self.category_name(name), priority, reason }
        };
        let primary_opportunities: Vec<Opportunity> =
            gaps.primary_gaps.iter().map(|p| opportunity(p, Priority::High)).collect();
        let relevant_opportunities: Vec<Opportunity> =
            gaps.relevant_gaps.iter().map(|p| opportunity(p, Priority::Medium)).collect();

        let potential = gaps
            .primary_gaps
            .iter()
            .chain(&gaps.relevant_gaps)
            .filter_map(|p| catalog.arr_range(p))
            .fold((0u32, 0u32), |(lo, hi), (min, max)| {
                (lo.saturating_add(min), hi.saturating_add(max))
            });

        let stack_suggestion =
            self.stack_suggestion(request, &gaps.primary_gaps, &gaps.relevant_gaps, &is_detected);
        let strategy = if products_in_use.is_empty() {
            SalesStrategy::NewSale
        } else {
            SalesStrategy::CrossSell
        };
        let sales_approach = sales_approach(
            strategy,
            products_in_use.len(),
            stack_suggestion.core.len().saturating_add(stack_suggestion.complementary.len()),
            &request.competitors,
        );
        let benchmark_opportunities = self.benchmark(&request.similar_companies, &is_detected);

        tracing::info!(
            company = %request.company_name,
            sector = %gaps.sector,
            in_use = products_in_use.len(),
            primary = primary_opportunities.len(),
            relevant = relevant_opportunities.len(),
            "product gaps computed"
        );
        Ok(ProductGapResponse {
            success: true,
            company_name: request.company_name.clone(),
            sector: gaps.sector.clone(),
            products_in_use,
            primary_opportunities,
            relevant_opportunities,
            estimated_potential: format_potential(potential),
            sales_approach,
            stack_suggestion,
            benchmark_opportunities,
        })
    }

    fn category_name(&self, product: &str) -> String {
        self.catalog
            .category_of(product)
            .map_or_else(|| UNKNOWN_CATEGORY.to_owned(), |c| c.name.clone())
    }

    /// Detected products that belong to the catalog, in catalog spelling.
    fn products_in_use(&self, detected: &[&str]) -> Vec<ProductInUse> {
        let mut seen = HashSet::new();
        detected
            .iter()
            .filter_map(|p| {
                let name = self.catalog.canonical_name(p)?;
                seen.insert(name.to_owned()).then(|| ProductInUse {
                    name: name.to_owned(),
                    category: self.category_name(name),
                })
            })
            .collect()
    }

    fn stack_suggestion(
        &self,
        request: &ProductGapRequest,
        primary_gaps: &[String],
        relevant_gaps: &[String],
        is_detected: &dyn Fn(&str) -> bool,
    ) -> StackSuggestion {
        let catalog = self.catalog;
        let sector = request.sector.as_deref().unwrap_or_default();
        let erp_category = catalog.category_of(&catalog.core_erp.default).map(|c| c.name.as_str());
        let is_erp = |p: &str| {
            erp_category.is_some()
                && catalog.category_of(p).map(|c| c.name.as_str()) == erp_category
        };

        let mut core = Vec::new();
        let has_erp = request.detected_products.iter().any(|p| is_erp(p));
        if !has_erp {
            core.push(catalog.core_erp(request.employees, sector).to_owned());
        }
        core.extend(primary_gaps.iter().filter(|p| !is_erp(p)).cloned());

        let complementary: Vec<String> = relevant_gaps.to_vec();
        let suggested: HashSet<String> = core.iter().chain(&complementary).map(|p| fold(p)).collect();
        let future_expansion = catalog
            .future_expansion
            .iter()
            .filter(|p| !is_detected(p) && !suggested.contains(&fold(p)))
            .cloned()
            .collect();

        StackSuggestion { core, complementary, future_expansion }
    }

    /// Most adopted products among similar companies that this company lacks.
    fn benchmark(
        &self,
        similar: &[SimilarCompany],
        is_detected: &dyn Fn(&str) -> bool,
    ) -> Vec<BenchmarkOpportunity> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for company in similar {
            let mut seen = HashSet::new();
            let products = company.detected_products.iter().map(|p| p.trim());
            for product in products.filter(|p| !p.is_empty()) {
                let name = self.catalog.canonical_name(product).unwrap_or(product).to_owned();
                if !seen.insert(fold(&name)) {
                    continue;
                }
                match counts.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, count)) => *count = count.saturating_add(1),
                    None => counts.push((name, 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .filter(|(name, _)| !is_detected(name))
            .take(BENCHMARK_TOP)
            .map(|(name, count)| BenchmarkOpportunity {
                category: self.category_name(&name),
                adoption_percentage: percentage(count, similar.len()),
                name,
            })
            .collect()
    }
}

fn sales_approach(
    strategy: SalesStrategy,
    in_use: usize,
    recommended: usize,
    competitors: &[CompetitorRef],
) -> SalesApproach {
    let names: Vec<&str> =
        competitors.iter().map(|c| c.name.trim()).filter(|n| !n.is_empty()).collect();
    let competitor_displacement =
        (!names.is_empty()).then(|| format!("Substitui {}", names.join(", ")));
    let summary = match strategy {
        SalesStrategy::CrossSell => format!(
            "Cliente TOTVS: {in_use} produtos em uso. Oportunidade de cross-sell de {recommended} produtos."
        ),
        SalesStrategy::NewSale => {
            format!("Prospect novo: stack inicial com {recommended} produtos recomendados.")
        },
    };
    SalesApproach { strategy, competitor_displacement, summary }
}
