use anyhow::Result;
use leadmatch_core::score::similarity_score;
use leadmatch_core::{Catalog, TargetProfile, classify};

pub(crate) fn run_classify(title: &str, snippet: &str, url: &str) {
    println!("{}", classify(title, snippet, url));
}

pub(crate) fn run_score(industry: String, products: Vec<String>, title: &str, snippet: &str) {
    let profile = TargetProfile { industry, products };
    println!("{}", similarity_score(&profile, title, snippet));
}

pub(crate) fn run_gaps(sector: &str, detected: &[String]) -> Result<()> {
    let gaps = Catalog::global().gaps(sector, detected);
    println!("{}", serde_json::to_string_pretty(&gaps)?);
    Ok(())
}
