// src/model.rs

use std::fmt;

/// Identity of a method inside one file: its name plus the ordered list of
/// declared parameter types. Spans are not part of the key; a method that
/// moved between commits keeps its identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodKey {
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl MethodKey {
    pub fn new(name: impl Into<String>, parameter_types: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parameter_types,
        }
    }

    /// `Name(T1, T2)`, the text used in every output row and as join key.
    pub fn signature(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameter_types.join(", "))
    }
}

/// One method declaration in one version of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub file_path: String,
    pub key: MethodKey,
    /// Zero-based, inclusive.
    pub start_line: usize,
    /// Zero-based, inclusive. Never smaller than `start_line`.
    pub end_line: usize,
}

impl MethodDescriptor {
    pub fn new(file_path: impl Into<String>, key: MethodKey, start_line: usize, end_line: usize) -> Self {
        Self {
            file_path: file_path.into(),
            key,
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    pub fn length_in_lines(&self) -> usize {
        self.end_line - self.start_line
    }

    pub fn signature(&self) -> String {
        self.key.signature()
    }
}

/// Which side of a diff a changed line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    /// Present in the newer commit only; resolved against `to`.
    Added,
    /// Present in the older commit only; resolved against `from`.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedLine {
    pub path: String,
    pub line_number: usize,
    pub side: Side,
}

/// Full hex id of a commit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First ten characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(10) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two adjacent commits of a walked range, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPair {
    pub from: CommitId,
    pub to: CommitId,
}

impl CommitPair {
    /// The commit whose tree holds the text for lines on `side`.
    pub fn commit_for(&self, side: Side) -> &CommitId {
        match side {
            Side::Added => &self.to,
            Side::Removed => &self.from,
        }
    }
}

/// Per-path hunks of a commit-to-commit diff, with zero-based line numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    pub path: String,
    pub hunks: Vec<Hunk>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    pub added_lines: Vec<usize>,
    pub removed_lines: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub method: MethodDescriptor,
    pub length_in_lines: usize,
}

impl From<MethodDescriptor> for CatalogEntry {
    fn from(method: MethodDescriptor) -> Self {
        let length_in_lines = method.length_in_lines();
        Self {
            method,
            length_in_lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub file_path: String,
    pub method: String,
    pub combined_value: f64,
}

/// A contributor seen in the head history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub commits: usize,
    /// Seconds since the epoch of the newest commit by this author.
    pub last_seen: i64,
}
