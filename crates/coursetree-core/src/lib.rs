//! coursetree-core: Content tree model, metadata loading, and navigation.
//!
//! This crate defines the content tree (sections, exercises, explanations),
//! the metadata format it is built from, the navigator used to move through
//! it, and the `Judge` trait that the runner crate implements.

pub mod builder;
pub mod config;
pub mod error;
pub mod judgment;
pub mod model;
pub mod navigator;
pub mod parser;
pub mod topics;
pub mod traits;
pub mod treepath;

pub use error::ContentError;
pub use judgment::Judgment;
pub use model::{ContentNode, Exercise, Explanation, Section};
pub use navigator::ContentNavigator;
pub use treepath::TreePath;
