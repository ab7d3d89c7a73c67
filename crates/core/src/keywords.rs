//! Keyword tables driving the classifier and the similarity scorer.
//!
//! The tables are data: a built-in JSON file is embedded at compile time and
//! can be replaced at runtime through `LEADMATCH_KEYWORDS_PATH` (or
//! `<config dir>/leadmatch/keywords.json`). Every keyword is folded on load so
//! matching never has to care about case or accents.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::env_config::resolve_config_file;
use crate::error::{CoreError, Result};
use crate::model::BusinessType;
use crate::text::fold;

const KEYWORDS_PATH_ENV: &str = "LEADMATCH_KEYWORDS_PATH";
const BUILTIN_KEYWORDS: &str = include_str!("../data/keywords.json");

static KEYWORDS: LazyLock<KeywordSets> = LazyLock::new(KeywordSets::load);

/// Non-company categories in resolution priority order.
pub const NON_COMPANY_PRIORITY: [BusinessType; 5] = [
    BusinessType::Vaga,
    BusinessType::Artigo,
    BusinessType::Educacional,
    BusinessType::Associacao,
    BusinessType::Perfil,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSets {
    pub vaga: Vec<String>,
    pub artigo: Vec<String>,
    pub educacional: Vec<String>,
    pub associacao: Vec<String>,
    pub perfil: Vec<String>,
    pub company: Vec<String>,
    /// Generic B2B services vocabulary for the scorer's vocabulary bonus.
    pub business_vocabulary: Vec<String>,
    /// Corporate words granting the flat legal-entity bonus.
    pub legal_suffixes: Vec<String>,
}

impl KeywordSets {
    pub fn global() -> &'static Self {
        &KEYWORDS
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_KEYWORDS)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let sets: Self = serde_json::from_str(raw)?;
        sets.folded().validated()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    fn load() -> Self {
        if let Some(path) = resolve_config_file(KEYWORDS_PATH_ENV, "keywords.json") {
            match Self::from_path(&path) {
                Ok(sets) => {
                    tracing::info!(path = %path.display(), "loaded keyword sets");
                    return sets;
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load keyword sets, using built-in"
                    );
                },
            }
        }
        Self::builtin().unwrap_or_else(|e| {
            tracing::error!(error = %e, "built-in keyword sets are invalid");
            Self::default()
        })
    }

    /// Keywords of one category. `Empresa` yields the company list; `Outro` has none.
    pub fn category(&self, business_type: BusinessType) -> &[String] {
        match business_type {
            BusinessType::Vaga => &self.vaga,
            BusinessType::Artigo => &self.artigo,
            BusinessType::Educacional => &self.educacional,
            BusinessType::Associacao => &self.associacao,
            BusinessType::Perfil => &self.perfil,
            BusinessType::Empresa => &self.company,
            BusinessType::Outro => &[],
        }
    }

    fn folded(self) -> Self {
        let fold_all = |list: Vec<String>| -> Vec<String> {
            let mut out: Vec<String> = Vec::with_capacity(list.len());
            for keyword in list {
                let folded = fold(keyword.trim());
                if !folded.is_empty() && !out.contains(&folded) {
                    out.push(folded);
                }
            }
            out
        };
        Self {
            vaga: fold_all(self.vaga),
            artigo: fold_all(self.artigo),
            educacional: fold_all(self.educacional),
            associacao: fold_all(self.associacao),
            perfil: fold_all(self.perfil),
            company: fold_all(self.company),
            business_vocabulary: fold_all(self.business_vocabulary),
            legal_suffixes: fold_all(self.legal_suffixes),
        }
    }

    fn validated(self) -> Result<Self> {
        if self.company.is_empty() {
            return Err(CoreError::InvalidKeywords("company list is empty".to_owned()));
        }
        if self.business_vocabulary.is_empty() {
            return Err(CoreError::InvalidKeywords("business_vocabulary list is empty".to_owned()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sets_parse() {
        let sets = KeywordSets::builtin().unwrap();
        assert!(sets.vaga.contains(&"vaga".to_owned()));
        assert_eq!(sets.business_vocabulary.len(), 12);
        assert!(sets.legal_suffixes.contains(&"ltda".to_owned()));
    }

    #[test]
    fn keywords_are_folded_and_deduplicated() {
        let raw = r#"{
            "vaga": ["Vagas", "vagas", "  "],
            "artigo": [], "educacional": [], "associacao": [], "perfil": [],
            "company": ["Indústria"],
            "business_vocabulary": ["Gestão"],
            "legal_suffixes": []
        }"#;
        let sets = KeywordSets::from_json(raw).unwrap();
        assert_eq!(sets.vaga, vec!["vagas"]);
        assert_eq!(sets.company, vec!["industria"]);
        assert_eq!(sets.business_vocabulary, vec!["gestao"]);
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        let raw = r#"{
            "vaga": [], "artigo": [], "educacional": [], "associacao": [], "perfil": [],
            "company": ["ltda"], "business_vocabulary": [], "legal_suffixes": []
        }"#;
        assert!(matches!(KeywordSets::from_json(raw), Err(CoreError::InvalidKeywords(_))));
    }

    #[test]
    fn missing_category_is_a_parse_error() {
        assert!(matches!(
            KeywordSets::from_json(r#"{"vaga": []}"#),
            Err(CoreError::Serialization(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = KeywordSets::from_path(Path::new("/nonexistent/leadmatch/keywords.json"));
        assert!(matches!(err, Err(CoreError::Io(_))));
    }
}
