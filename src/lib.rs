//! Method-level change mining for git repositories.
//!
//! Attributes every added and removed line of every commit-to-commit diff to
//! the method declaration that encloses it, resolving each side against the
//! file version it belongs to, and sums the hits over a commit range.

pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod join;
pub mod model;
pub mod parser;
pub mod repo;
pub mod report;
pub mod walker;

#[cfg(test)]
pub(crate) mod testkit;

pub use aggregate::{analyze_range, ChangeCounts, ChangeRow};
pub use config::{AnalysisConfig, CountMode};
pub use error::{Error, Result};
pub use index::MethodIndex;
pub use parser::{CSharpParser, SourceParser};
pub use repo::{GitRepository, RepositoryProvider};
