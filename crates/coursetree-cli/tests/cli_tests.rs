//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn coursetree(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("coursetree").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("COURSETREE_REPOSITORY_ROOT")
        .env_remove("RUST_LOG");
    cmd
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

const ROOT_METADATA: &str = r#"type = "section"
id = "course"
name = "Course"

[[contents]]
type = "explanation"
id = "intro"
name = "Introduction"
documentation = { en = "intro.md" }

[contents.topics]
introduces = ["loops"]

[[contents]]
type = "section"
id = "basics"
name = "Basics"

[[contents.contents]]
type = "link"
location = "good"

[[contents.contents]]
type = "link"
location = "bad"

[[contents]]
type = "link"
location = "bonus"
tags = ["extra"]
available_by_default = false
"#;

fn exercise_metadata(id: &str, name: &str, extra: &str) -> String {
    format!(
        "type = \"exercise\"\nid = \"{id}\"\nname = \"{name}\"\ndifficulty = 2\n\
         documentation = {{ en = \"assignment.md\" }}\n\
         judge = {{ type = \"pytest\", file = \"tests.sh\" }}\n{extra}"
    )
}

/// A course with one passing and one failing exercise, plus a bonus
/// exercise hidden behind a tagged link. Judges run `sh tests.sh`.
fn course() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("course");

    write(&root.join("metadata.toml"), ROOT_METADATA);
    write(&root.join("intro.md"), "# Loops\n\nRepeat after me.\n");
    write(
        &root.join("good/metadata.toml"),
        &exercise_metadata("good", "Good", "[topics]\nmust_come_after = [\"loops\"]\n"),
    );
    write(&root.join("good/assignment.md"), "Do it well.\n");
    write(&root.join("good/tests.sh"), "exit 0\n");
    write(
        &root.join("bad/metadata.toml"),
        &exercise_metadata("bad", "Bad", ""),
    );
    write(&root.join("bad/assignment.md"), "Do it badly.\n");
    write(&root.join("bad/tests.sh"), "exit 1\n");
    write(
        &root.join("bonus/metadata.toml"),
        &exercise_metadata("bonus", "Bonus", ""),
    );
    write(&root.join("bonus/tests.sh"), "exit 0\n");

    write(
        &dir.path().join("coursetree.toml"),
        "repository_root = \"course\"\n\
         judgment_cache = \"state/cache.json\"\n\
         language_priorities = [\"en\"]\n\
         cache_delay = 0.0\n\
         judge_program = \"sh\"\n",
    );
    dir
}

#[test]
fn tree_prints_outline() {
    let dir = course();
    coursetree(dir.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("Course"))
        .stdout(predicate::str::contains("Introduction [intro] (explanation)"))
        .stdout(predicate::str::contains("Good [basics,good] (exercise, difficulty 2)"))
        .stdout(predicate::str::contains("Bonus").not());
}

#[test]
fn tree_follows_tagged_links() {
    let dir = course();
    coursetree(dir.path())
        .args(["tree", "--tags", "extra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bonus [bonus]"));

    coursetree(dir.path())
        .args(["tree", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bonus [bonus]"))
        .stdout(predicate::str::contains("Bad [basics,bad]"));
}

#[test]
fn show_prints_documentation() {
    let dir = course();
    coursetree(dir.path())
        .args(["show", "intro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Repeat after me."));

    coursetree(dir.path())
        .args(["show", "basics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no documentation"));
}

#[test]
fn check_passes_for_ordered_topics() {
    let dir = course();
    coursetree(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Topic order is consistent"));
}

#[test]
fn check_reports_violations() {
    let dir = course();
    write(
        &dir.path().join("course/bad/metadata.toml"),
        &exercise_metadata("bad", "Bad", "[topics]\nintroduces = [\"loops\"]\n"),
    );

    coursetree(dir.path())
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "basics,bad introduces loops, but it was already introduced earlier",
        ))
        .stderr(predicate::str::contains("1 topic order violation(s) found"));
}

#[test]
fn topics_lists_constraints() {
    let dir = course();
    coursetree(dir.path())
        .arg("topics")
        .assert()
        .success()
        .stdout(predicate::str::contains("intro"))
        .stdout(predicate::str::contains("basics,good"))
        .stdout(predicate::str::contains("loops"));
}

#[test]
fn judge_writes_cache_and_status_reads_it() {
    let dir = course();
    coursetree(dir.path())
        .arg("judge")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 1 failed"));

    let cache = std::fs::read_to_string(dir.path().join("state/cache.json")).unwrap();
    let cache: serde_json::Value = serde_json::from_str(&cache).unwrap();
    assert_eq!(
        cache,
        serde_json::json!({ "basics,bad": "fail", "basics,good": "pass" })
    );

    coursetree(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 1 failed, 0 not judged"));

    coursetree(dir.path())
        .args(["judge", "--only-unknown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to judge"));
}

#[test]
fn judge_subtree_only() {
    let dir = course();
    coursetree(dir.path())
        .args(["judge", "basics,good"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 0 failed"));

    coursetree(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 0 failed, 1 not judged"));
}

#[test]
fn judge_unknown_path_fails() {
    let dir = course();
    coursetree(dir.path())
        .args(["judge", "basics,missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist in the content tree"));
}

#[test]
fn cache_path_and_clear() {
    let dir = course();
    let cache = dir.path().join("state/cache.json");

    coursetree(dir.path())
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("state/cache.json"));

    write(&cache, "{}");
    coursetree(dir.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!cache.exists());

    coursetree(dir.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cache"));
}

#[test]
fn root_option_overrides_settings() {
    let dir = course();
    coursetree(dir.path())
        .args(["tree", "--root", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn invalid_metadata_is_reported() {
    let dir = course();
    write(
        &dir.path().join("course/good/metadata.toml"),
        &exercise_metadata("good", "Good", "").replace("difficulty = 2", "difficulty = 42"),
    );

    coursetree(dir.path())
        .arg("tree")
        .assert()
        .failure()
        .stderr(predicate::str::contains("difficulty 42"));
}

#[test]
fn explicit_config_must_exist() {
    let dir = course();
    coursetree(dir.path())
        .args(["--config", "missing.toml", "tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("settings file not found"));
}

#[test]
fn init_creates_starter_course() {
    let dir = TempDir::new().unwrap();

    coursetree(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created coursetree.toml"))
        .stdout(predicate::str::contains("Created course/metadata.toml"));

    assert!(dir.path().join("course/hello/tests.py").exists());

    coursetree(dir.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello [hello]"));

    coursetree(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
