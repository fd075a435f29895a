use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use coursetree_core::builder::build_tree;
use coursetree_core::parser::{load_everything, load_metadata, METADATA_FILE};
use coursetree_core::traits::{Judge, JudgeMetadata};
use coursetree_core::{ContentNode, Judgment};
use coursetree_runner::{wait_all, CachingService, JudgingService, Worker};

const COURSE: &str = r#"
type = "section"
id = "course"
name = "Course"

[[contents]]
type = "exercise"
id = "A"
name = "Passing"
difficulty = 1
documentation = { en = "a.md" }
judge = { type = "pytest", file = "pass.py" }

[[contents]]
type = "exercise"
id = "B"
name = "Failing"
difficulty = 3
documentation = { en = "b.md" }
judge = { type = "pytest", file = "fail.py" }
"#;

struct ScriptedJudge {
    verdict: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Judge for ScriptedJudge {
    async fn run(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict
    }
}

/// Loads the course in `dir`, with judges that pass for `pass.py` and fail
/// otherwise.
fn load_course(dir: &Path, calls: &Arc<AtomicUsize>) -> ContentNode {
    let metadata = load_metadata(dir, &load_everything(false))
        .unwrap()
        .unwrap();
    let factory = |_: &Path, judge: &JudgeMetadata| -> anyhow::Result<Arc<dyn Judge>> {
        let JudgeMetadata::Pytest { file } = judge;
        Ok(Arc::new(ScriptedJudge {
            verdict: file == "pass.py",
            calls: Arc::clone(calls),
        }))
    };
    build_tree(metadata, &["en".to_string()], &factory).unwrap()
}

fn judgment_of(root: &ContentNode, id: &str) -> Judgment {
    root.exercises()
        .find(|exercise| exercise.tree_path().to_string() == id)
        .unwrap()
        .judgment()
}

fn read_cache(path: &Path) -> BTreeMap<String, String> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn judged_tree_is_cached() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(METADATA_FILE), COURSE).unwrap();
    let cache_path = dir.path().join("cache").join("judgments.json");
    let calls = Arc::new(AtomicUsize::new(0));

    let root = load_course(dir.path(), &calls);
    let worker = Worker::start().unwrap();
    let cache =
        CachingService::with_location(&root, &worker, &cache_path, Duration::from_millis(50));
    let judging = JudgingService::new(worker.clone());

    let results = wait_all(judging.judge_recursively(&root, false)).await;
    assert_eq!(results.len(), 2);
    assert_eq!(judgment_of(&root, "A"), Judgment::Pass);
    assert_eq!(judgment_of(&root, "B"), Judgment::Fail);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let deadline = Instant::now() + Duration::from_secs(5);
    let written = loop {
        if cache_path.is_file() {
            let written = read_cache(&cache_path);
            if written.len() == 2 {
                break written;
            }
        }
        assert!(Instant::now() < deadline, "cache was never written");
        tokio::time::sleep(Duration::from_millis(10)).await;
    };
    assert!(cache.flush_count() >= 1);
    assert_eq!(written["A"], "pass");
    assert_eq!(written["B"], "fail");
}

#[test]
fn cached_judgments_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(METADATA_FILE), COURSE).unwrap();
    let cache_path = dir.path().join("judgments.json");
    let calls = Arc::new(AtomicUsize::new(0));

    {
        let root = load_course(dir.path(), &calls);
        let worker = Worker::start().unwrap();
        let cache = CachingService::with_location(
            &root,
            &worker,
            &cache_path,
            Duration::from_secs(3600),
        );
        let judging = JudgingService::new(worker.clone());
        for handle in judging.judge_recursively(&root, false) {
            handle.wait_blocking();
        }
        cache.flush_now().unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let root = load_course(dir.path(), &calls);
    let worker = Worker::start().unwrap();
    let cache = CachingService::with_location(&root, &worker, &cache_path, Duration::ZERO);

    assert_eq!(judgment_of(&root, "A"), Judgment::Pass);
    assert_eq!(judgment_of(&root, "B"), Judgment::Fail);
    assert_eq!(cache.snapshot().len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let judging = JudgingService::new(worker);
    assert!(judging.judge_recursively(&root, true).is_empty());
}
