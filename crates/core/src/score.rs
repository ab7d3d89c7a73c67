//! Similarity scoring and ranking of competitor candidates.
//!
//! Scores are additive: each signal contributes independently so weak matches
//! stack instead of gating one another.

use std::cmp::Ordering;

use crate::constants::MAX_SCORED_PRODUCTS;
use crate::keywords::KeywordSets;
use crate::model::{BusinessType, ScoredCandidate, TargetProfile};
use crate::text::{contains_term, fold, fold_joined, significant_words};

const INDUSTRY_EXACT_POINTS: f64 = 30.0;
const INDUSTRY_PARTIAL_POINTS: f64 = 20.0;
const PRODUCT_EXACT_POINTS: f64 = 8.0;
const PRODUCT_PARTIAL_POINTS: f64 = 4.0;
const VOCABULARY_POINTS: f64 = 20.0;
const LEGAL_SUFFIX_POINTS: f64 = 10.0;

const INDUSTRY_IN_TITLE_BONUS: f64 = 8.0;
const INDUSTRY_IN_SNIPPET_BONUS: f64 = 5.0;
const PRODUCT_IN_TITLE_BONUS: f64 = 6.0;
const PRODUCT_IN_SNIPPET_BONUS: f64 = 4.0;

const POSITION_WEIGHT: f64 = 0.25;
const SIMILARITY_WEIGHT: f64 = 0.5;
const POSITION_STEP: f64 = 3.0;

/// Words shorter than this (inclusive) do not count towards partial matches.
const MIN_WORD_LEN: usize = 3;

/// Target profile with every term folded once up front.
#[derive(Debug, Clone)]
struct FoldedProfile {
    industry: String,
    industry_words: Vec<String>,
    products: Vec<(String, Vec<String>)>,
}

impl FoldedProfile {
    fn new(profile: &TargetProfile) -> Self {
        let industry = fold(profile.industry.trim());
        let industry_words = significant_words(&industry, MIN_WORD_LEN);
        let products = profile
            .products
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .take(MAX_SCORED_PRODUCTS)
            .map(|p| (fold(p), significant_words(p, MIN_WORD_LEN)))
            .collect();
        Self { industry, industry_words, products }
    }
}

fn word_fraction(text: &str, words: &[String]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let found = words.iter().filter(|w| text.contains(w.as_str())).count();
    ratio(found, words.len())
}

#[allow(clippy::cast_precision_loss, reason = "keyword counts are tiny")]
fn ratio(found: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { found as f64 / total as f64 }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to 0..=100 before the cast"
)]
fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// `similarityScore` of a result against the target profile, 0..=100.
pub fn similarity_score(profile: &TargetProfile, title: &str, snippet: &str) -> u8 {
    similarity_score_with(KeywordSets::global(), profile, title, snippet)
}

pub fn similarity_score_with(
    sets: &KeywordSets,
    profile: &TargetProfile,
    title: &str,
    snippet: &str,
) -> u8 {
    let profile = FoldedProfile::new(profile);
    let text = fold_joined(&[title, snippet]);
    clamp_percent(raw_similarity(sets, &profile, &text))
}

fn raw_similarity(sets: &KeywordSets, profile: &FoldedProfile, text: &str) -> f64 {
    let mut score = 0.0;

    if !profile.industry.is_empty() {
        score += if text.contains(&profile.industry) {
            INDUSTRY_EXACT_POINTS
        } else {
            word_fraction(text, &profile.industry_words) * INDUSTRY_PARTIAL_POINTS
        };
    }

    for (product, words) in &profile.products {
        score += if text.contains(product.as_str()) {
            PRODUCT_EXACT_POINTS
        } else {
            word_fraction(text, words) * PRODUCT_PARTIAL_POINTS
        };
    }

    let vocabulary_hits =
        sets.business_vocabulary.iter().filter(|k| contains_term(text, k)).count();
    score += ratio(vocabulary_hits, sets.business_vocabulary.len()) * VOCABULARY_POINTS;

    if sets.legal_suffixes.iter().any(|k| contains_term(text, k)) {
        score += LEGAL_SUFFIX_POINTS;
    }

    score
}

/// Direct title/snippet bonuses, at most 23 points.
pub fn keyword_bonus(profile: &TargetProfile, title: &str, snippet: &str) -> f64 {
    bonus(&FoldedProfile::new(profile), &fold(title), &fold(snippet))
}

fn bonus(profile: &FoldedProfile, title: &str, snippet: &str) -> f64 {
    let mut bonus = 0.0;
    if !profile.industry.is_empty() {
        if title.contains(&profile.industry) {
            bonus += INDUSTRY_IN_TITLE_BONUS;
        }
        if snippet.contains(&profile.industry) {
            bonus += INDUSTRY_IN_SNIPPET_BONUS;
        }
    }
    if profile.products.iter().any(|(p, _)| title.contains(p.as_str())) {
        bonus += PRODUCT_IN_TITLE_BONUS;
    }
    if profile.products.iter().any(|(p, _)| snippet.contains(p.as_str())) {
        bonus += PRODUCT_IN_SNIPPET_BONUS;
    }
    bonus
}

/// Blends search position, similarity and bonuses, minus the type penalty. Clamped to 0..=100.
pub fn relevancia(position: u32, similarity: u8, bonus: f64, business_type: BusinessType) -> u8 {
    let position_score = (100.0 - f64::from(position) * POSITION_STEP).max(0.0);
    clamp_percent(
        position_score * POSITION_WEIGHT + f64::from(similarity) * SIMILARITY_WEIGHT + bonus
            - business_type.penalty(),
    )
}

/// Both scores for one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scores {
    pub similarity: u8,
    pub relevancia: u8,
}

/// Scores a search result in one pass.
pub fn score_result(
    sets: &KeywordSets,
    profile: &TargetProfile,
    title: &str,
    snippet: &str,
    position: u32,
    business_type: BusinessType,
) -> Scores {
    let folded = FoldedProfile::new(profile);
    let title = fold(title);
    let snippet = fold(snippet);
    let text = fold_joined(&[&title, &snippet]);
    let similarity = clamp_percent(raw_similarity(sets, &folded, &text));
    let bonus = bonus(&folded, &title, &snippet);
    Scores { similarity, relevancia: relevancia(position, similarity, bonus, business_type) }
}

/// Orders candidates: companies first, then `relevancia` desc, then `similarityScore` desc.
pub fn rank_candidates(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(compare_rank);
}

pub fn compare_rank(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    let a_company = a.business_type == BusinessType::Empresa;
    let b_company = b.business_type == BusinessType::Empresa;
    b_company
        .cmp(&a_company)
        .then_with(|| b.relevancia.cmp(&a.relevancia))
        .then_with(|| b.similarity_score.cmp(&a.similarity_score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets() -> KeywordSets {
        KeywordSets::builtin().unwrap()
    }

    fn profile(industry: &str, products: &[&str]) -> TargetProfile {
        TargetProfile {
            industry: industry.to_owned(),
            products: products.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    fn candidate(name: &str, kind: BusinessType, relevancia: u8, similarity: u8) -> ScoredCandidate {
        ScoredCandidate {
            name: name.to_owned(),
            website: format!("https://{name}.com.br"),
            domain: format!("{name}.com.br"),
            description: String::new(),
            relevancia,
            similarity_score: similarity,
            business_type: kind,
            source: "serper".to_owned(),
            position: 1,
        }
    }

    #[test]
    fn exact_industry_scores_thirty() {
        let p = profile("Comércio Exterior", &[]);
        let score = similarity_score_with(&sets(), &p, "Especialistas em comercio exterior", "");
        assert_eq!(score, 30);
    }

    #[test]
    fn partial_industry_scores_word_fraction() {
        let p = profile("Logística Integrada", &[]);
        let score = similarity_score_with(&sets(), &p, "Soluções em logística", "");
        // half the industry words (10) plus one vocabulary word of twelve (~1.67)
        assert_eq!(score, 12);
    }

    #[test]
    fn products_score_eight_each() {
        let p = profile("", &["despacho aduaneiro", "frete internacional"]);
        let score =
            similarity_score_with(&sets(), &p, "Despacho aduaneiro e frete internacional", "");
        assert_eq!(score, 16);
    }

    #[test]
    fn only_five_products_count() {
        let p = profile("", &["aa1", "aa2", "aa3", "aa4", "aa5", "aa6"]);
        let score = similarity_score_with(&sets(), &p, "aa1 aa2 aa3 aa4 aa5 aa6", "");
        assert_eq!(score, 40);
    }

    #[test]
    fn legal_suffix_adds_ten() {
        let p = profile("", &[]);
        assert_eq!(similarity_score_with(&sets(), &p, "Acme Ltda", ""), 10);
        assert_eq!(similarity_score_with(&sets(), &p, "Acme", ""), 0);
    }

    #[test]
    fn similarity_is_capped_at_hundred() {
        let sets = sets();
        let vocabulary = sets.business_vocabulary.join(" ");
        let p = profile("logistica", &["p1", "p2", "p3", "p4", "p5"]);
        let title = format!("logistica p1 p2 p3 p4 p5 ltda {vocabulary}");
        assert_eq!(similarity_score_with(&sets, &p, &title, ""), 100);
    }

    #[test]
    fn bonus_tops_out_at_twenty_three() {
        let p = profile("logística", &["frete"]);
        assert_eq!(keyword_bonus(&p, "Logística e frete", "logistica com frete"), 23.0);
        assert_eq!(keyword_bonus(&p, "Acme", "nada"), 0.0);
    }

    #[test]
    fn relevancia_blends_position_and_similarity() {
        // (100 - 3) * 0.25 + 80 * 0.5 + 8 = 72.25
        assert_eq!(relevancia(1, 80, 8.0, BusinessType::Empresa), 72);
    }

    #[test]
    fn relevancia_applies_penalty_and_clamps() {
        assert_eq!(relevancia(1, 20, 0.0, BusinessType::Vaga), 0);
        assert_eq!(relevancia(40, 0, 0.0, BusinessType::Outro), 0);
        assert_eq!(relevancia(0, 100, 23.0, BusinessType::Empresa), 98);
        assert_eq!(relevancia(1, 100, 100.0, BusinessType::Empresa), 100);
    }

    #[test]
    fn scores_are_bounded() {
        let sets = sets();
        let p = profile("Tecnologia", &["erp", "crm", "bi"]);
        for (title, snippet) in [
            ("", ""),
            ("Tecnologia ERP CRM BI Ltda", "tecnologia erp crm bi gestão soluções serviços"),
            ("Vaga ERP", "emprego"),
        ] {
            for position in [0, 1, 10, 50, 1000] {
                for kind in [BusinessType::Empresa, BusinessType::Vaga, BusinessType::Educacional] {
                    let s = score_result(&sets, &p, title, snippet, position, kind);
                    assert!(s.similarity <= 100);
                    assert!(s.relevancia <= 100);
                }
            }
        }
    }

    #[test]
    fn ranking_puts_companies_first() {
        let mut list = vec![
            candidate("outro", BusinessType::Outro, 90, 90),
            candidate("b", BusinessType::Empresa, 50, 10),
            candidate("a", BusinessType::Empresa, 50, 40),
            candidate("c", BusinessType::Empresa, 70, 0),
        ];
        rank_candidates(&mut list);
        let names: Vec<_> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b", "outro"]);
    }
}
