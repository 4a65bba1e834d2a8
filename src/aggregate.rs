// src/aggregate.rs

use crate::config::{AnalysisConfig, CountMode};
use crate::error::Result;
use crate::extract::extract_changes;
use crate::index::MethodIndex;
use crate::model::{CommitPair, MethodKey};
use crate::parser::SourceParser;
use crate::repo::RepositoryProvider;
use crate::walker::{commit_pairs, commit_range};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Change hits per file and method.
///
/// Owns all of its data; merging moves counts out of the partial and adds
/// them into `self`, so no two maps ever share state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeCounts {
    files: BTreeMap<String, BTreeMap<MethodKey, u64>>,
}

/// One output row of the aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRow {
    pub file_path: String,
    pub method: MethodKey,
    pub count: u64,
}

impl ChangeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: &str, method: MethodKey, hits: u64) {
        if hits == 0 {
            return;
        }
        *self
            .files
            .entry(path.to_string())
            .or_default()
            .entry(method)
            .or_insert(0) += hits;
    }

    /// Sum `other` into `self`, key by key.
    pub fn merge(&mut self, other: ChangeCounts) {
        for (path, methods) in other.files {
            let target = self.files.entry(path).or_default();
            for (method, hits) in methods {
                *target.entry(method).or_insert(0) += hits;
            }
        }
    }

    pub fn merged(mut self, other: ChangeCounts) -> Self {
        self.merge(other);
        self
    }

    pub fn get(&self, path: &str, method: &MethodKey) -> u64 {
        self.files
            .get(path)
            .and_then(|m| m.get(method))
            .copied()
            .unwrap_or(0)
    }

    pub fn file(&self, path: &str) -> Option<&BTreeMap<MethodKey, u64>> {
        self.files.get(path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of distinct (file, method) keys.
    pub fn len(&self) -> usize {
        self.files.values().map(BTreeMap::len).sum()
    }

    pub fn total(&self) -> u64 {
        self.files.values().flat_map(BTreeMap::values).sum()
    }

    /// Rows by descending count; ties by file, then signature.
    pub fn rows(&self) -> Vec<ChangeRow> {
        let mut rows: Vec<ChangeRow> = self
            .files
            .iter()
            .flat_map(|(path, methods)| {
                methods.iter().map(move |(method, &count)| ChangeRow {
                    file_path: path.clone(),
                    method: method.clone(),
                    count,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.file_path.cmp(&b.file_path))
                .then_with(|| a.method.cmp(&b.method))
        });
        rows
    }
}

/// Attribute every changed line of one commit pair to its method.
///
/// Each side is resolved against its own file version: removed lines
/// against `pair.from`, added lines against `pair.to`. Lines outside any
/// method are dropped.
pub fn aggregate_pair<R, P>(
    repo: &R,
    parser: &P,
    config: &AnalysisConfig,
    pair: &CommitPair,
) -> Result<ChangeCounts>
where
    R: RepositoryProvider + ?Sized,
    P: SourceParser + ?Sized,
{
    let mut partial = ChangeCounts::new();

    for file in extract_changes(repo, config, pair)? {
        let mut touched: BTreeSet<MethodKey> = BTreeSet::new();

        for side in &file.sides {
            let index = MethodIndex::build(parser, &file.path, &side.text)?;
            for &line in &side.lines {
                let Some(method) = index.resolve(line) else {
                    continue;
                };
                match config.count_mode {
                    CountMode::Lines => partial.record(&file.path, method.key.clone(), 1),
                    CountMode::Pairs => {
                        touched.insert(method.key.clone());
                    }
                }
            }
        }

        for method in touched {
            partial.record(&file.path, method, 1);
        }
    }

    debug!(
        "{}..{}: {} hits over {} methods",
        pair.from.short(),
        pair.to.short(),
        partial.total(),
        partial.len()
    );
    Ok(partial)
}

/// Aggregate every pair and sum the partials.
///
/// Pairs are independent, so with `config.parallel` they are processed on
/// the rayon pool and the partials are reduced in whatever order they finish.
pub fn aggregate_pairs<R, P>(
    repo: &R,
    parser: &P,
    config: &AnalysisConfig,
    pairs: &[CommitPair],
) -> Result<ChangeCounts>
where
    R: RepositoryProvider + ?Sized,
    P: SourceParser + ?Sized,
{
    let bar = progress_bar(config, pairs.len());

    let totals = if config.parallel {
        pairs
            .par_iter()
            .progress_with(bar.clone())
            .map(|pair| aggregate_pair(repo, parser, config, pair))
            .try_reduce(ChangeCounts::new, |acc, partial| Ok(acc.merged(partial)))?
    } else {
        let mut totals = ChangeCounts::new();
        for pair in pairs {
            totals.merge(aggregate_pair(repo, parser, config, pair)?);
            bar.inc(1);
        }
        totals
    };

    bar.finish_and_clear();
    Ok(totals)
}

/// Walk `oldest..=latest` on the head history and aggregate the changes of
/// every consecutive pair.
pub fn analyze_range<R, P>(
    repo: &R,
    parser: &P,
    config: &AnalysisConfig,
    oldest: &str,
    latest: &str,
) -> Result<ChangeCounts>
where
    R: RepositoryProvider + ?Sized,
    P: SourceParser + ?Sized,
{
    let oldest = repo.resolve_commit(oldest)?;
    let latest = repo.resolve_commit(latest)?;
    let commits = commit_range(repo, &oldest, &latest)?;
    let pairs = commit_pairs(&commits);
    info!(
        "Analyzing {} commits ({} pairs) from {} to {}",
        commits.len(),
        pairs.len(),
        oldest.short(),
        latest.short()
    );

    let counts = aggregate_pairs(repo, parser, config, &pairs)?;
    info!(
        "Attributed {} changes to {} methods in {} files",
        counts.total(),
        counts.len(),
        counts.files.len()
    );
    Ok(counts)
}

fn progress_bar(config: &AnalysisConfig, len: usize) -> ProgressBar {
    if !config.show_progress {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})") {
        bar.set_style(style);
    }
    bar.set_message("Analyzing commit pairs");
    bar
}
