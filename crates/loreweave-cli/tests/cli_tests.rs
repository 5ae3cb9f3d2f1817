//! End-to-end tests for the `loreweave` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/models.py")
}

/// A command isolated from the user's config, `.env` and generator settings.
fn loreweave(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("loreweave");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .env_remove("NO_COLOR")
        .env_remove("VLLM_SERVER_URL")
        .env_remove("VLLM_API_KEY")
        .env_remove("VLLM_MODEL");
    cmd
}

fn files_under(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                files.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    files.sort();
    files
}

/// Every needle occurs in `text`, in the given order.
fn assert_in_order(text: &str, needles: &[&str]) {
    let positions: Vec<usize> = needles
        .iter()
        .map(|n| text.find(n).unwrap_or_else(|| panic!("{n} missing from {text}")))
        .collect();
    assert!(positions.is_sorted(), "out of order: {needles:?} in {text}");
}

// ── basics ────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("convert"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn shell_completions() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loreweave"));
}

// ── generate ──────────────────────────────────────────────────────────────────

#[test]
fn generate_writes_every_format_and_mode() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .arg("generate")
        .arg(fixture())
        .args(["-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("16 template(s) for 3 model(s)"));

    let files = files_under(&dir.path().join("out"));
    assert_eq!(files.len(), 16, "{files:#?}");
    for format in ["yaml", "json"] {
        for mode in ["structural", "annotated"] {
            assert!(files.contains(&format!("{format}/{mode}/models_all.{format}")));
            for model in ["entity", "item", "character"] {
                assert!(files.contains(&format!("{format}/{mode}/sheets/{model}.{format}")));
            }
        }
    }
}

#[test]
fn generate_defaults_to_configured_templates_dir() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["generate", "--yaml"])
        .arg(fixture())
        .assert()
        .success();

    let files = files_under(&dir.path().join("lore/templates"));
    assert_eq!(files.len(), 8);
    assert!(files.iter().all(|f| f.starts_with("yaml/")));
}

#[test]
fn structural_json_template_is_flattened_in_order() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["generate", "--json", "-o", "out"])
        .arg(fixture())
        .assert()
        .success();

    let text = fs::read_to_string(dir.path().join("out/json/structural/sheets/item.json")).unwrap();
    assert_in_order(&text, &["\"name\"", "\"summary\"", "\"weight\"", "\"tags\""]);

    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    let item = &doc["Item"];
    assert_eq!(item["name"], "<str>");
    assert_eq!(item["weight"], 1.0);
    assert_eq!(item["tags"], serde_json::json!([]));
}

#[test]
fn annotated_template_carries_descriptions() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["generate", "--json", "-o", "out"])
        .arg(fixture())
        .assert()
        .success();

    let text = fs::read_to_string(dir.path().join("out/json/annotated/models_all.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(doc["Character"]["__description__"], "A person in the world.");
    assert_eq!(doc["Character"]["inventory__description__"], "Carried items");
    assert_eq!(doc["Character"]["inventory"], "<list>");
    assert_eq!(doc["Character"]["relations"], serde_json::json!({}));
}

#[test]
fn generate_is_deterministic() {
    let dir = TempDir::new().unwrap();
    for out in ["a", "b"] {
        loreweave(&dir)
            .args(["generate", "-o", out])
            .arg(fixture())
            .assert()
            .success();
    }

    for file in files_under(&dir.path().join("a")) {
        let a = fs::read(dir.path().join("a").join(&file)).unwrap();
        let b = fs::read(dir.path().join("b").join(&file)).unwrap();
        assert_eq!(a, b, "{file} differs between runs");
    }
}

#[test]
fn unknown_format_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["generate", "-f", "yaml", "-f", "xml", "-o", "out"])
        .arg(fixture())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported format 'xml'"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn inheritance_cycle_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("loop.py"),
        "class A(B):\n    x: int\n\nclass B(A):\n    y: int\n",
    )
    .unwrap();

    loreweave(&dir)
        .args(["generate", "loop.py", "-o", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Inheritance cycle detected"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn missing_input_is_not_found() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["generate", "nowhere.py"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nowhere.py"));
}

#[test]
fn syntax_error_reports_position() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.py"), "class Broken(\n    x: int\n").unwrap();

    loreweave(&dir)
        .args(["generate", "bad.py", "-o", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn unreachable_generator_fails_after_templates_are_written() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["generate", "--yaml", "-o", "out"])
        .arg(fixture())
        .args(["--endpoint", "http://127.0.0.1:9/v1", "--timeout", "2"])
        .args(["--prompt", "a", "misty", "harbour"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Content generation failed"));

    assert!(dir.path().join("out/yaml/annotated/models_all.yaml").exists());
    assert!(!dir.path().join("out/generated_content.yaml").exists());
}

#[test]
fn unknown_sheet_is_not_found() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["generate", "-o", "out"])
        .arg(fixture())
        .args(["--sheet", "Dragon", "--prompt", "wyrm"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Dragon"));
}

#[test]
fn quiet_generate_prints_nothing() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["-q", "generate", "-o", "out"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ── inspect ───────────────────────────────────────────────────────────────────

#[test]
fn inspect_table_shows_flattened_fields() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .arg("inspect")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Character(Entity)"))
        .stdout(predicate::str::contains("age: int = 30"))
        .stdout(predicate::str::contains("name: str"));
}

#[test]
fn inspect_json_for_one_model() {
    let dir = TempDir::new().unwrap();
    let output = loreweave(&dir)
        .arg("inspect")
        .arg(fixture())
        .args(["--model", "Item", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let models: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(models.as_array().unwrap().len(), 1);
    assert_eq!(models[0]["name"], "Item");
    assert_eq!(models[0]["own_fields"], 2);
    assert_eq!(models[0]["fields"].as_array().unwrap().len(), 4);
}

#[test]
fn inspect_unknown_model_is_not_found() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .arg("inspect")
        .arg(fixture())
        .args(["--model", "Ghost"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Ghost"));
}

// ── convert ───────────────────────────────────────────────────────────────────

#[test]
fn convert_directory_to_markdown() {
    let dir = TempDir::new().unwrap();
    let lore = dir.path().join("lore");
    fs::create_dir_all(lore.join("places")).unwrap();
    fs::write(
        lore.join("places/harbour.yaml"),
        "name: Misthaven\nregion:\n  climate: wet\nsights:\n  - lighthouse\n  - fish market\n",
    )
    .unwrap();
    fs::write(lore.join("notes.txt"), "not yaml").unwrap();

    loreweave(&dir)
        .args(["convert", "lore", "-o", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted 1 document(s)"));

    let markdown = fs::read_to_string(dir.path().join("docs/harbour.md")).unwrap();
    assert!(markdown.starts_with("# name\n\nMisthaven\n\n"));
    assert!(markdown.contains("## climate\n\nwet"));
    assert!(markdown.contains("- lighthouse\n- fish market\n"));
}

#[test]
fn convert_with_stamp_to_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("hero.yaml"), "sheet_type: character\nname: Ada\n").unwrap();

    loreweave(&dir)
        .args(["convert", "hero.yaml", "-f", "json", "-o", "out", "--stamp"])
        .assert()
        .success();

    let text = fs::read_to_string(dir.path().join("out/hero.json")).unwrap();
    assert_in_order(
        &text,
        &["\"version\"", "\"sheet_type\"", "\"last_modified\"", "\"name\""],
    );

    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["version"], "1.0");
    assert_eq!(doc["sheet_type"], "character");
}

#[test]
fn convert_reports_bad_documents() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("good.yaml"), "a: 1\n").unwrap();
    fs::write(dir.path().join("list.yaml"), "- a\n- b\n").unwrap();

    loreweave(&dir)
        .args(["convert", ".", "-f", "json", "-o", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("1 of 2 document(s) could not be converted"));

    assert!(dir.path().join("out/good.json").exists());
}

#[test]
fn convert_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.yaml"), "a: 1\n").unwrap();

    loreweave(&dir)
        .args(["convert", "a.yaml", "-f", "pdf"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported format 'pdf'"));
}

// ── config ────────────────────────────────────────────────────────────────────

#[test]
fn config_reads_environment_overrides() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .env("LOREWEAVE__GENERATOR__MODEL", "tiny-llama")
        .args(["config", "get", "generator.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("generator.model = tiny-llama"));
}

#[test]
fn config_file_from_flag() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("custom.toml");
    fs::write(&file, "[output]\ntemplates_dir = \"elsewhere\"\n").unwrap();

    loreweave(&dir)
        .arg("--config")
        .arg(&file)
        .args(["config", "get", "output.templates_dir"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere"));
}

#[test]
fn unknown_config_key_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["config", "get", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn missing_config_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    loreweave(&dir)
        .args(["--config", "absent.toml", "config", "list"])
        .assert()
        .code(4);
}
