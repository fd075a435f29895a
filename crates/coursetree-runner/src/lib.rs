//! coursetree-runner: Judging and verdict caching.
//!
//! Runs exercise judges on a dedicated background worker and keeps the
//! on-disk judgment cache in sync with the content tree.

pub mod caching;
pub mod factory;
pub mod judging;
pub mod pytest;
pub mod worker;

pub use caching::{clear_cache, CachingService};
pub use factory::{create_judge, RunnerJudgeFactory};
pub use judging::{wait_all, JudgeHandle, JudgingService};
pub use pytest::PytestJudge;
pub use worker::Worker;
