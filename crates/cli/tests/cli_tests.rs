use assert_cmd::Command;
use predicates::prelude::*;

fn leadmatch() -> Command {
    let mut cmd = Command::cargo_bin("leadmatch").unwrap();
    cmd.env_remove("DATABASE_URL").env_remove("SERPER_API_KEY");
    cmd
}

#[test]
fn test_cli_help() {
    leadmatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Company deduplication"));
}

#[test]
fn test_cli_serve_help() {
    leadmatch().arg("serve").arg("--help").assert().success().stdout(predicate::str::contains("port"));
}

#[test]
fn test_cli_classify_job_posting() {
    leadmatch()
        .args(["classify", "--title", "Vagas de analista de comércio exterior"])
        .assert()
        .success()
        .stdout("vaga\n");
}

#[test]
fn test_cli_score_prints_integer() {
    leadmatch()
        .args([
            "score",
            "--industry",
            "comércio exterior",
            "--product",
            "importação",
            "--title",
            "Trade Consult - Comércio Exterior e Importação",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\d{1,3}\n$").unwrap());
}

#[test]
fn test_cli_gaps_json() {
    leadmatch()
        .args(["gaps", "--sector", "Varejo", "--detected", "Winthor", "--detected", "TOTVS Pay"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"primaryGaps\"").and(predicate::str::contains("PIX Integrado")));
}

#[test]
fn test_cli_import_from_stdin() {
    let rows = r#"[
        {"Razão Social": "Acme Ltda", "CNPJ": "11.222.333/0001-44"},
        {"Razão Social": "Acme Filial", "CNPJ": "11222333000144"}
    ]"#;
    leadmatch()
        .args(["import", "--file", "-", "--tenant", "t1", "--icp", "icp1", "--source", "csv"])
        .write_stdin(rows)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"insertedCount\": 1"));
}

#[test]
fn test_cli_import_rejects_non_array() {
    leadmatch()
        .args(["import", "--file", "-", "--tenant", "t1", "--icp", "icp1", "--source", "csv"])
        .write_stdin("{}")
        .assert()
        .failure();
}
