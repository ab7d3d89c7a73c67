use crate::keywords::{KeywordSets, NON_COMPANY_PRIORITY};
use crate::model::BusinessType;
use crate::text::{contains_any, fold_joined};

/// Classifies a search result by keyword membership.
///
/// Non-company keywords are checked first, so a result matching both lists
/// is never reported as a company.
pub fn classify(title: &str, snippet: &str, url: &str) -> BusinessType {
    classify_with(KeywordSets::global(), title, snippet, url)
}

pub fn classify_with(sets: &KeywordSets, title: &str, snippet: &str, url: &str) -> BusinessType {
    let text = fold_joined(&[title, snippet, url]);

    if let Some(kind) =
        NON_COMPANY_PRIORITY.into_iter().find(|kind| contains_any(&text, sets.category(*kind)))
    {
        return kind;
    }
    if contains_any(&text, &sets.company) {
        return BusinessType::Empresa;
    }
    BusinessType::Outro
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets() -> KeywordSets {
        KeywordSets::builtin().unwrap()
    }

    #[test]
    fn job_posting_is_vaga() {
        let kind = classify_with(
            &sets(),
            "Vaga de Analista de Comércio Exterior - Empresa XYZ",
            "",
            "https://xyz.com.br/carreiras",
        );
        assert_eq!(kind, BusinessType::Vaga);
        assert!(kind.is_excluded());
    }

    #[test]
    fn vaga_outranks_other_non_company_types() {
        let kind = classify_with(&sets(), "Curso e vagas de logística", "blog do setor", "");
        assert_eq!(kind, BusinessType::Vaga);
    }

    #[test]
    fn article_urls_are_artigo() {
        let kind = classify_with(&sets(), "Como reduzir custos", "", "https://acme.com.br/blog/custos");
        assert_eq!(kind, BusinessType::Artigo);
    }

    #[test]
    fn courses_are_educacional() {
        let kind = classify_with(&sets(), "Curso de Comércio Exterior", "Aprenda importação", "");
        assert_eq!(kind, BusinessType::Educacional);
    }

    #[test]
    fn associations_are_associacao() {
        let kind = classify_with(&sets(), "Associação Brasileira de Máquinas", "", "https://abimaq.org.br");
        assert_eq!(kind, BusinessType::Associacao);
    }

    #[test]
    fn linkedin_profiles_are_perfil() {
        let kind = classify_with(&sets(), "Fulano de Tal", "", "https://br.linkedin.com/in/fulano");
        assert_eq!(kind, BusinessType::Perfil);
    }

    #[test]
    fn company_keywords_give_empresa() {
        let kind = classify_with(
            &sets(),
            "Acme Logística Ltda",
            "Consultoria em comércio exterior",
            "https://acme.com.br",
        );
        assert_eq!(kind, BusinessType::Empresa);
    }

    #[test]
    fn non_company_wins_over_company() {
        let kind = classify_with(&sets(), "Acme Ltda - Trabalhe Conosco", "", "");
        assert_eq!(kind, BusinessType::Vaga);
    }

    #[test]
    fn unmatched_text_is_outro() {
        assert_eq!(classify_with(&sets(), "Página inicial", "", "https://x.com"), BusinessType::Outro);
    }

    #[test]
    fn word_boundaries_prevent_false_courses() {
        let kind = classify_with(&sets(), "Acme Recursos Humanos Ltda", "", "");
        assert_eq!(kind, BusinessType::Empresa);
    }
}
