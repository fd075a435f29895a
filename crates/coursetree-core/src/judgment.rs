//! Judgment state of an exercise.
//!
//! The judgment is the only part of the content tree that changes after
//! construction. It is written by the judging worker and read from any
//! thread, so it lives in an atomic cell rather than a plain field.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::RwLock;

/// Verdict on an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Judgment {
    #[default]
    Unknown,
    Pass,
    Fail,
}

impl Judgment {
    pub fn from_verdict(passed: bool) -> Self {
        if passed {
            Judgment::Pass
        } else {
            Judgment::Fail
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Judgment::Unknown => "unknown",
            Judgment::Pass => "pass",
            Judgment::Fail => "fail",
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Judgment::Unknown => 0,
            Judgment::Pass => 1,
            Judgment::Fail => 2,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Judgment::Pass,
            2 => Judgment::Fail,
            _ => Judgment::Unknown,
        }
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Judgment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(Judgment::Unknown),
            "pass" => Ok(Judgment::Pass),
            "fail" => Ok(Judgment::Fail),
            other => Err(format!("unknown judgment: {other}")),
        }
    }
}

/// Callback invoked with the new judgment after every write.
pub type JudgmentObserver = Box<dyn Fn(Judgment) + Send + Sync>;

/// Atomically replaceable judgment with change observers.
///
/// Observers fire on every `set`, including writes that do not change the
/// value. They run on the writing thread.
pub struct JudgmentCell {
    value: AtomicU8,
    observers: RwLock<Vec<JudgmentObserver>>,
}

impl JudgmentCell {
    pub fn new(initial: Judgment) -> Self {
        Self {
            value: AtomicU8::new(initial.to_bits()),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn get(&self) -> Judgment {
        Judgment::from_bits(self.value.load(Ordering::Acquire))
    }

    pub fn set(&self, judgment: Judgment) {
        self.value.store(judgment.to_bits(), Ordering::Release);
        let observers = self
            .observers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for observer in observers.iter() {
            observer(judgment);
        }
    }

    pub fn observe(&self, observer: JudgmentObserver) {
        self.observers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(observer);
    }
}

impl Default for JudgmentCell {
    fn default() -> Self {
        Self::new(Judgment::Unknown)
    }
}

impl fmt::Debug for JudgmentCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JudgmentCell")
            .field("value", &self.get())
            .finish_non_exhaustive()
    }
}
