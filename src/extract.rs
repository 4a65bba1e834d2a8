// src/extract.rs

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::model::{ChangedLine, CommitPair, FileDiff, Side};
use crate::repo::RepositoryProvider;
use tracing::trace;

/// The changed lines of one side of one file, together with the file text
/// of that side they have to be resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideChanges {
    pub side: Side,
    pub text: String,
    pub lines: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub sides: Vec<SideChanges>,
}

/// Flatten the hunks of one file diff into tagged lines.
pub fn changed_lines(file: &FileDiff) -> Vec<ChangedLine> {
    let mut lines = Vec::new();
    for hunk in &file.hunks {
        lines.extend(hunk.removed_lines.iter().map(|&n| ChangedLine {
            path: file.path.clone(),
            line_number: n,
            side: Side::Removed,
        }));
        lines.extend(hunk.added_lines.iter().map(|&n| ChangedLine {
            path: file.path.clone(),
            line_number: n,
            side: Side::Added,
        }));
    }
    lines
}

/// Diff `pair` and collect, for every source file it touches, the changed
/// lines of each side along with that side's text.
///
/// Removed lines are paired with the text at `pair.from`, added lines with
/// the text at `pair.to`. A side whose file does not exist in its commit
/// (added or deleted file) is left out.
pub fn extract_changes<R: RepositoryProvider + ?Sized>(
    repo: &R,
    config: &AnalysisConfig,
    pair: &CommitPair,
) -> Result<Vec<ChangedFile>> {
    let mut changed = Vec::new();

    for file in repo.diff(&pair.from, &pair.to)? {
        if !config.is_source_file(&file.path) {
            trace!("skipping non-source path {}", file.path);
            continue;
        }

        let lines = changed_lines(&file);
        let mut sides = Vec::new();
        for side in [Side::Removed, Side::Added] {
            let numbers: Vec<usize> = lines
                .iter()
                .filter(|l| l.side == side)
                .map(|l| l.line_number)
                .collect();
            if numbers.is_empty() {
                continue;
            }

            match repo.file_text_at(pair.commit_for(side), &file.path)? {
                Some(text) => sides.push(SideChanges {
                    side,
                    text,
                    lines: numbers,
                }),
                None => trace!(
                    "{} has no content at {}, skipping {:?} lines",
                    file.path,
                    pair.commit_for(side).short(),
                    side
                ),
            }
        }

        if !sides.is_empty() {
            changed.push(ChangedFile {
                path: file.path,
                sides,
            });
        }
    }

    Ok(changed)
}
