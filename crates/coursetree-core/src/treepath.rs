//! Tree paths identify a node by the ids of the sections leading to it.

use std::fmt;
use std::ops::Div;
use std::str::FromStr;
use std::sync::Arc;

/// Delimiter between segments in the textual form of a path.
pub const DELIMITER: char = ',';

/// Whether `segment` survives a display/parse round trip as a single segment.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(DELIMITER)
}

/// Immutable sequence of segments; the root is the empty path.
///
/// Segments are shared, so cloning a path is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath {
    segments: Arc<[String]>,
}

impl TreePath {
    /// The root path.
    pub fn root() -> Self {
        Self {
            segments: Arc::from(Vec::new()),
        }
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.to_vec();
        segments.push(segment.into());
        Self {
            segments: segments.into(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, `None` for the root.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for TreePath {
    fn default() -> Self {
        Self::root()
    }
}

impl<S: Into<String>> Div<S> for &TreePath {
    type Output = TreePath;

    fn div(self, segment: S) -> TreePath {
        self.child(segment)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{DELIMITER}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            Ok(Self::root())
        } else {
            Ok(Self::new(s.split(DELIMITER)))
        }
    }
}
