// src/testkit.rs
//
// In-memory collaborators for unit tests: a repository that serves canned
// history, file text and diffs, and a parser that reads spans straight out
// of the "source" text.

use crate::error::{Error, Result};
use crate::model::{CommitId, FileDiff, Hunk};
use crate::parser::{ParsedMethod, SourceParser};
use crate::repo::RepositoryProvider;
use std::collections::HashMap;

/// Parses one declaration per line, `Name(T1, T2) start-end`. Other lines
/// are ignored; a line reading `!error` fails the parse.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpanParser;

impl SourceParser for SpanParser {
    fn parse_methods(&self, path: &str, text: &str) -> Result<Vec<ParsedMethod>> {
        let mut methods = Vec::new();
        for line in text.lines().map(str::trim) {
            if line == "!error" {
                return Err(Error::Parse {
                    path: path.to_string(),
                    reason: "requested failure".to_string(),
                });
            }
            if let Some(method) = parse_decl(line) {
                methods.push(method);
            }
        }
        Ok(methods)
    }
}

fn parse_decl(line: &str) -> Option<ParsedMethod> {
    let (signature, span) = line.rsplit_once(' ')?;
    let (start, end) = span.split_once('-')?;
    let (name, rest) = signature.split_once('(')?;
    let params = rest.strip_suffix(')')?;
    let parameter_types = params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    Some(ParsedMethod {
        name: name.to_string(),
        parameter_types,
        start_line: start.parse().ok()?,
        end_line: end.parse().ok()?,
    })
}

pub fn commit(id: &str) -> CommitId {
    CommitId::new(id)
}

pub fn file_diff(path: &str, added: &[usize], removed: &[usize]) -> FileDiff {
    FileDiff {
        path: path.to_string(),
        hunks: vec![Hunk {
            added_lines: added.to_vec(),
            removed_lines: removed.to_vec(),
        }],
    }
}

/// Canned repository. History is kept newest first, like a walk from HEAD.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    history: Vec<CommitId>,
    files: HashMap<(CommitId, String), String>,
    diffs: HashMap<(CommitId, CommitId), Vec<FileDiff>>,
}

impl MemoryRepository {
    /// `ids` oldest first; the last one is HEAD.
    pub fn with_history(ids: &[&str]) -> Self {
        Self {
            history: ids.iter().rev().map(|id| commit(id)).collect(),
            ..Self::default()
        }
    }

    pub fn file(mut self, commit_id: &str, path: &str, text: &str) -> Self {
        self.files
            .insert((commit(commit_id), path.to_string()), text.to_string());
        self
    }

    pub fn diff(mut self, from: &str, to: &str, files: Vec<FileDiff>) -> Self {
        self.diffs.insert((commit(from), commit(to)), files);
        self
    }
}

impl RepositoryProvider for MemoryRepository {
    fn resolve_commit(&self, spec: &str) -> Result<CommitId> {
        let id = if spec == "HEAD" {
            self.history.first().cloned()
        } else {
            self.history.iter().find(|c| c.as_str() == spec).cloned()
        };
        id.ok_or_else(|| Error::UnknownCommit {
            spec: spec.to_string(),
            reason: "no such commit".to_string(),
        })
    }

    fn history_from_head(&self) -> Result<Vec<CommitId>> {
        Ok(self.history.clone())
    }

    fn file_text_at(&self, commit_id: &CommitId, path: &str) -> Result<Option<String>> {
        Ok(self
            .files
            .get(&(commit_id.clone(), path.to_string()))
            .cloned())
    }

    fn diff(&self, from: &CommitId, to: &CommitId) -> Result<Vec<FileDiff>> {
        Ok(self
            .diffs
            .get(&(from.clone(), to.clone()))
            .cloned()
            .unwrap_or_default())
    }
}
