//! Binary-driven integration tests: drive the compiled `syl` CLI against
//! a real SQLite database in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn syl_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("syl");
    path
}

const ALPHA_MD: &str = "# Cell Biology\n\n\
Mitosis is the process by which a eukaryotic cell separates its chromosomes into two identical sets of nuclei.\n\n\
The mitochondria produce usable energy for the cell through respiration and oxidative phosphorylation.\n";

const BETA_MD: &str = "# European History\n\n\
The French Revolution began in 1789 and reshaped the political landscape of the entire continent.\n\n\
The Congress of Vienna later attempted to restore the old order across the European monarchies.\n";

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(files_dir.join("alpha.md"), ALPHA_MD).unwrap();
    fs::write(files_dir.join("beta.md"), BETA_MD).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/syllabus.sqlite"

[retrieval]
similarity_threshold = 0.5
semantic_limit = 8
"#,
        root.display()
    );

    let config_path = config_dir.join("syllabus.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_syl(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = syl_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run syl binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn file_path(config_path: &Path, name: &str) -> String {
    let root = config_path.parent().unwrap().parent().unwrap();
    root.join("files").join(name).display().to_string()
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_syl(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/syllabus.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_syl(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_syl(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_ingest_reports_chunk_count() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    let (stdout, stderr, success) =
        run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);
    assert!(
        success,
        "ingest failed: stdout={}, stderr={}",
        stdout, stderr
    );
    // The heading-only section is below the minimum viable size; the two
    // paragraphs chunk.
    assert!(stdout.contains("chunks: 2"), "got: {}", stdout);
    assert!(stdout.contains("key: doc_"));
    assert!(stdout.contains("namespace: user_42"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_reingest_is_idempotent() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    let (out1, _, _) = run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);
    let (out2, _, _) = run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);

    // Same content key both times.
    let key = |out: &str| {
        out.lines()
            .find(|l| l.trim().starts_with("key:"))
            .and_then(|l| l.split("key:").nth(1))
            .map(|s| s.trim().to_string())
            .expect("ingest output should contain a key")
    };
    assert_eq!(key(&out1), key(&out2));

    // And exactly one stored item.
    let (list_out, _, _) = run_syl(&config_path, &["list", "--user", "42"]);
    let rows = list_out.lines().filter(|l| l.contains("doc_")).count();
    assert_eq!(rows, 1, "expected one item, got: {}", list_out);
}

#[test]
fn test_search_finds_owned_content() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);

    let (stdout, _, success) = run_syl(
        &config_path,
        &["search", "mitosis chromosomes", "--user", "42"],
    );
    assert!(success, "search failed");
    assert!(stdout.contains("doc_"), "got: {}", stdout);
    assert!(stdout.contains("--- Sources ---"));
}

#[test]
fn test_search_never_leaks_across_tenants() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);

    let (stdout, _, success) = run_syl(
        &config_path,
        &["search", "mitosis chromosomes", "--user", "99"],
    );
    assert!(success);
    assert!(
        stdout.contains("No relevant sources found."),
        "got: {}",
        stdout
    );
}

#[test]
fn test_space_content_is_shared_with_members_only() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    run_syl(
        &config_path,
        &["ingest", &alpha, "--user", "42", "--space", "bio-101"],
    );

    // Another member of the space sees the content...
    let (stdout, _, _) = run_syl(
        &config_path,
        &["search", "mitosis chromosomes", "--user", "99", "--space", "bio-101"],
    );
    assert!(stdout.contains("doc_"), "got: {}", stdout);

    // ...but the contributor's personal corpus does not contain it.
    let (stdout, _, _) = run_syl(
        &config_path,
        &["search", "mitosis chromosomes", "--user", "42"],
    );
    assert!(
        stdout.contains("No relevant sources found."),
        "got: {}",
        stdout
    );
}

#[test]
fn test_keyword_search_is_tenant_scoped() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    let beta = file_path(&config_path, "beta.md");
    run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);
    run_syl(&config_path, &["ingest", &beta, "--user", "42"]);

    let (stdout, _, success) = run_syl(&config_path, &["keyword", "mitosis", "--user", "42"]);
    assert!(success);
    assert!(stdout.contains("alpha.md"), "got: {}", stdout);
    assert!(!stdout.contains("beta.md"), "got: {}", stdout);

    let (stdout, _, _) = run_syl(&config_path, &["keyword", "mitosis", "--user", "99"]);
    assert!(
        stdout.contains("No relevant sources found."),
        "got: {}",
        stdout
    );
}

#[test]
fn test_keyword_results_capped_at_five() {
    let (tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let files_dir = tmp.path().join("files");
    for i in 0..7 {
        let path = files_dir.join(format!("entropy-{i}.md"));
        fs::write(
            &path,
            "Entropy always increases in an isolated thermodynamic system over time.\n",
        )
        .unwrap();
        run_syl(
            &config_path,
            &["ingest", path.to_str().unwrap(), "--user", "42"],
        );
    }

    let (stdout, _, success) = run_syl(&config_path, &["keyword", "entropy", "--user", "42"]);
    assert!(success);
    let result_lines = stdout.lines().filter(|l| l.contains("hits)")).count();
    assert_eq!(result_lines, 5, "got: {}", stdout);
}

#[test]
fn test_remove_cascades_to_search() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    let (ingest_out, _, _) = run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);
    let key = ingest_out
        .lines()
        .find(|l| l.trim().starts_with("key:"))
        .and_then(|l| l.split("key:").nth(1))
        .map(|s| s.trim().to_string())
        .expect("ingest output should contain a key");

    let (stdout, stderr, success) = run_syl(&config_path, &["remove", &key, "--user", "42"]);
    assert!(
        success,
        "remove failed: stdout={}, stderr={}",
        stdout, stderr
    );
    assert!(stdout.contains("chunks deleted: 2"), "got: {}", stdout);

    let (stdout, _, _) = run_syl(
        &config_path,
        &["search", "mitosis chromosomes", "--user", "42"],
    );
    assert!(stdout.contains("No relevant sources found."));

    let (stdout, _, _) = run_syl(&config_path, &["keyword", "mitosis", "--user", "42"]);
    assert!(stdout.contains("No relevant sources found."));
}

#[test]
fn test_remove_rejects_malformed_keys() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let (_, stderr, success) = run_syl(&config_path, &["remove", "chunk_9", "--user", "42"]);
    assert!(!success, "malformed key should fail");
    assert!(
        stderr.contains("invalid content key"),
        "got stderr: {}",
        stderr
    );
}

#[test]
fn test_scrape_errors_when_disabled() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let (_, stderr, success) = run_syl(
        &config_path,
        &["scrape", "https://example.edu/syllabus", "--user", "42"],
    );
    assert!(!success, "scrape should fail without an endpoint");
    assert!(
        stderr.contains("scraper is disabled"),
        "got stderr: {}",
        stderr
    );
}

#[test]
fn test_search_answer_errors_when_completion_disabled() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);

    let (_, stderr, success) = run_syl(
        &config_path,
        &["search", "mitosis chromosomes", "--user", "42", "--answer"],
    );
    assert!(!success, "--answer should fail without a provider");
    assert!(
        stderr.contains("completion provider is disabled"),
        "got stderr: {}",
        stderr
    );
}

#[test]
fn test_list_empty_namespace() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let (stdout, _, success) = run_syl(&config_path, &["list", "--user", "42"]);
    assert!(success);
    assert!(stdout.contains("No content ingested"), "got: {}", stdout);
}

#[test]
fn test_search_deterministic() {
    let (_tmp, config_path) = setup_test_env();
    run_syl(&config_path, &["init"]);

    let alpha = file_path(&config_path, "alpha.md");
    let beta = file_path(&config_path, "beta.md");
    run_syl(&config_path, &["ingest", &alpha, "--user", "42"]);
    run_syl(&config_path, &["ingest", &beta, "--user", "42"]);

    let (out1, _, _) = run_syl(&config_path, &["search", "cell energy", "--user", "42"]);
    let (out2, _, _) = run_syl(&config_path, &["search", "cell energy", "--user", "42"]);
    assert_eq!(out1, out2, "search results should be deterministic");
}
