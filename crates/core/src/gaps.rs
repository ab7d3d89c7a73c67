//! Product catalog, segment priority matrix and the gap matcher.
//!
//! The catalog is data (`data/catalog.json`, replaceable through
//! `LEADMATCH_CATALOG_PATH`). Gaps are a binary presence check per product:
//! no ranking happens here.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::env_config::resolve_config_file;
use crate::error::{CoreError, Result};
use crate::text::{contains_term, fold};

const CATALOG_PATH_ENV: &str = "LEADMATCH_CATALOG_PATH";
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

static CATALOG: LazyLock<Catalog> = LazyLock::new(Catalog::load);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub name: String,
    pub products: Vec<String>,
    /// Annual recurring revenue range in thousands of BRL for one product of this category.
    pub arr_range_k: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorPriority {
    pub name: String,
    pub primary: Vec<String>,
    pub relevant: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRule {
    #[serde(default)]
    pub min_employees: Option<u32>,
    #[serde(default)]
    pub max_employees: Option<u32>,
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRule {
    pub terms: Vec<String>,
    pub product: String,
}

/// How the core ERP is picked for a company with no ERP in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreErpRules {
    pub default: String,
    pub large_company: EmployeeRule,
    pub small_company: EmployeeRule,
    /// Checked after the size rules; a sector match overrides them.
    pub by_sector: Vec<SectorRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<ProductCategory>,
    pub sectors: Vec<SectorPriority>,
    pub default_sector: String,
    pub core_erp: CoreErpRules,
    pub future_expansion: Vec<String>,
    #[serde(skip)]
    by_product: HashMap<String, usize>,
}

/// Output of the gap matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapResult {
    /// Catalog sector the input resolved to.
    pub sector: String,
    pub primary_gaps: Vec<String>,
    pub relevant_gaps: Vec<String>,
}

impl Catalog {
    pub fn global() -> &'static Self {
        &CATALOG
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(raw)?;
        catalog.indexed()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    fn load() -> Self {
        if let Some(path) = resolve_config_file(CATALOG_PATH_ENV, "catalog.json") {
            match Self::from_path(&path) {
                Ok(catalog) => {
                    tracing::info!(path = %path.display(), "loaded product catalog");
                    return catalog;
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load product catalog, using built-in"
                    );
                },
            }
        }
        Self::builtin().unwrap_or_else(|e| {
            tracing::error!(error = %e, "built-in product catalog is invalid");
            Self::empty()
        })
    }

    fn empty() -> Self {
        let none = || EmployeeRule { min_employees: None, max_employees: None, product: String::new() };
        Self {
            categories: Vec::new(),
            sectors: Vec::new(),
            default_sector: String::new(),
            core_erp: CoreErpRules {
                default: String::new(),
                large_company: none(),
                small_company: none(),
                by_sector: Vec::new(),
            },
            future_expansion: Vec::new(),
            by_product: HashMap::new(),
        }
    }

    /// Builds the product index and checks the catalog is self-consistent.
    fn indexed(mut self) -> Result<Self> {
        let mut by_product = HashMap::new();
        for (idx, category) in self.categories.iter().enumerate() {
            let (min, max) = category.arr_range_k;
            if min > max {
                return Err(CoreError::InvalidCatalog(format!(
                    "category {} has an inverted ARR range",
                    category.name
                )));
            }
            for product in &category.products {
                if let Some(prev) = by_product.insert(fold(product), idx) {
                    let other = self.categories.get(prev).map_or("", |c| c.name.as_str());
                    return Err(CoreError::InvalidCatalog(format!(
                        "product {product} listed in both {other} and {}",
                        category.name
                    )));
                }
            }
        }
        self.by_product = by_product;

        for sector in &self.sectors {
            for product in sector.primary.iter().chain(&sector.relevant) {
                if !self.contains(product) {
                    return Err(CoreError::InvalidCatalog(format!(
                        "sector {} names unknown product {product}",
                        sector.name
                    )));
                }
            }
        }
        if !self.sectors.iter().any(|s| s.name == self.default_sector) {
            return Err(CoreError::InvalidCatalog(format!(
                "default sector {} is not in the priority matrix",
                self.default_sector
            )));
        }

        let rules = &self.core_erp;
        let erp_products = std::iter::once(&rules.default)
            .chain([&rules.large_company.product, &rules.small_company.product])
            .chain(rules.by_sector.iter().map(|r| &r.product));
        for product in erp_products {
            if !self.contains(product) {
                return Err(CoreError::InvalidCatalog(format!("core ERP rule names unknown product {product}")));
            }
        }
        if let Some(product) = self.future_expansion.iter().find(|p| !self.contains(p)) {
            return Err(CoreError::InvalidCatalog(format!(
                "future expansion names unknown product {product}"
            )));
        }
        Ok(self)
    }

    pub fn contains(&self, product: &str) -> bool {
        self.by_product.contains_key(&fold(product.trim()))
    }

    pub fn category_of(&self, product: &str) -> Option<&ProductCategory> {
        self.by_product.get(&fold(product.trim())).and_then(|idx| self.categories.get(*idx))
    }

    /// Catalog spelling of `product`, if it is a catalog product.
    pub fn canonical_name(&self, product: &str) -> Option<&str> {
        let key = fold(product.trim());
        self.category_of(product)?.products.iter().find(|p| fold(p) == key).map(String::as_str)
    }

    pub fn arr_range(&self, product: &str) -> Option<(u32, u32)> {
        self.category_of(product).map(|c| c.arr_range_k)
    }

    /// First sector whose folded name contains, or is contained in, the folded
    /// input as whole words. Blank or unmatched input resolves to the default sector.
    pub fn match_sector(&self, sector: &str) -> Option<&SectorPriority> {
        let needle = fold(sector.trim());
        if !needle.is_empty() {
            let found = self.sectors.iter().find(|s| {
                let key = fold(&s.name);
                contains_term(&key, &needle) || contains_term(&needle, &key)
            });
            if found.is_some() {
                return found;
            }
        }
        self.sectors.iter().find(|s| s.name == self.default_sector)
    }

    /// `primary − detected` and `relevant − detected`, in catalog order.
    pub fn gaps<S: AsRef<str>>(&self, sector: &str, detected: &[S]) -> GapResult {
        let detected: Vec<String> = detected.iter().map(|p| fold(p.as_ref().trim())).collect();
        let missing = |products: &[String]| -> Vec<String> {
            products.iter().filter(|p| !detected.contains(&fold(p))).cloned().collect()
        };
        match self.match_sector(sector) {
            Some(priority) => GapResult {
                sector: priority.name.clone(),
                primary_gaps: missing(&priority.primary),
                relevant_gaps: missing(&priority.relevant),
            },
            None => GapResult {
                sector: self.default_sector.clone(),
                primary_gaps: Vec::new(),
                relevant_gaps: Vec::new(),
            },
        }
    }

    /// Core ERP for a company with no ERP in use: size rules first, sector rules override.
    pub fn core_erp(&self, employees: Option<u32>, sector: &str) -> &str {
        let rules = &self.core_erp;
        let mut choice = rules.default.as_str();
        if let Some(count) = employees {
            if rules.large_company.min_employees.is_some_and(|min| count >= min) {
                choice = &rules.large_company.product;
            } else if rules.small_company.max_employees.is_some_and(|max| count <= max) {
                choice = &rules.small_company.product;
            }
        }
        let folded = fold(sector);
        if let Some(rule) =
            rules.by_sector.iter().find(|r| r.terms.iter().any(|t| folded.contains(&fold(t))))
        {
            choice = &rule.product;
        }
        choice
    }
}
