//! The `coursetree init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    for (path, content) in STARTER_FILES {
        write_if_missing(Path::new(path), content)?;
    }

    println!("\nNext steps:");
    println!("  1. Run: coursetree tree");
    println!("  2. Run: coursetree judge");
    println!("  3. Run: coursetree status");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

const STARTER_FILES: &[(&str, &str)] = &[
    ("coursetree.toml", SAMPLE_SETTINGS),
    ("course/metadata.toml", COURSE_METADATA),
    ("course/intro.md", INTRO),
    ("course/hello/metadata.toml", EXERCISE_METADATA),
    ("course/hello/assignment.md", ASSIGNMENT),
    ("course/hello/student.py", STUDENT),
    ("course/hello/tests.py", TESTS),
];

const SAMPLE_SETTINGS: &str = r#"# coursetree settings

repository_root = "course"
judgment_cache = ".coursetree/judgment-cache.json"
language_priorities = ["en"]

# Seconds to wait after a verdict changes before the cache is written.
cache_delay = 1.0

# Test runner used by pytest judges, e.g. "python -m pytest".
judge_program = "pytest"
"#;

const COURSE_METADATA: &str = r#"type = "section"
id = "course"
name = "Example Course"

[[contents]]
type = "explanation"
id = "intro"
name = "Introduction"
documentation = { en = "intro.md" }

[contents.topics]
introduces = ["functions"]

[[contents]]
type = "link"
location = "hello"
tags = ["basics"]
"#;

const INTRO: &str = "# Introduction\n\nFunctions are defined with `def`.\n";

const EXERCISE_METADATA: &str = r#"type = "exercise"
id = "hello"
name = "Hello"
difficulty = 1
documentation = { en = "assignment.md" }
judge = { type = "pytest", file = "tests.py" }

[topics]
must_come_after = ["functions"]
"#;

const ASSIGNMENT: &str =
    "# Hello\n\nWrite a function `greet(name)` in `student.py` that returns `Hello, <name>!`.\n";

const STUDENT: &str = "def greet(name):\n    raise NotImplementedError()\n";

const TESTS: &str = r#"from student import greet


def test_greet():
    assert greet("World") == "Hello, World!"
"#;
