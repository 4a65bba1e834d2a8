// src/walker.rs

use crate::error::{Error, Result};
use crate::model::{CommitId, CommitPair};
use crate::repo::RepositoryProvider;
use tracing::debug;

/// Commits from `oldest` to `latest`, both inclusive, oldest first.
///
/// The head history is walked backward starting at `latest` until `oldest`
/// shows up. If `latest` is not on the head history, or `oldest` is not an
/// ancestor reached by that walk, the range does not exist and
/// `RangeNotFound` is returned instead of a partial sequence.
pub fn commit_range<R: RepositoryProvider + ?Sized>(
    repo: &R,
    oldest: &CommitId,
    latest: &CommitId,
) -> Result<Vec<CommitId>> {
    let not_found = || Error::RangeNotFound {
        oldest: oldest.to_string(),
        latest: latest.to_string(),
    };

    let history = repo.history_from_head()?;
    let start = history.iter().position(|c| c == latest).ok_or_else(not_found)?;
    let len = history[start..]
        .iter()
        .position(|c| c == oldest)
        .ok_or_else(not_found)?;

    let mut range: Vec<CommitId> = history[start..=start + len].to_vec();
    range.reverse();
    debug!(
        "range {}..{} spans {} commits",
        oldest.short(),
        latest.short(),
        range.len()
    );
    Ok(range)
}

/// Consecutive commits of a walked range as (from, to) pairs.
pub fn commit_pairs(commits: &[CommitId]) -> Vec<CommitPair> {
    commits
        .windows(2)
        .map(|w| CommitPair {
            from: w[0].clone(),
            to: w[1].clone(),
        })
        .collect()
}

/// The first commit on the head history, used when no lower bound is given.
pub fn root_commit<R: RepositoryProvider + ?Sized>(repo: &R) -> Result<Option<CommitId>> {
    Ok(repo.history_from_head()?.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{commit, MemoryRepository};

    fn repo() -> MemoryRepository {
        MemoryRepository::with_history(&["c1", "c2", "c3", "c4"])
    }

    #[test]
    fn test_range_is_oldest_first_and_inclusive() {
        let range = commit_range(&repo(), &commit("c2"), &commit("c4")).unwrap();
        assert_eq!(range, vec![commit("c2"), commit("c3"), commit("c4")]);
    }

    #[test]
    fn test_equal_endpoints_yield_single_commit_and_no_pairs() {
        let range = commit_range(&repo(), &commit("c1"), &commit("c1")).unwrap();
        assert_eq!(range, vec![commit("c1")]);
        assert!(commit_pairs(&range).is_empty());
    }

    #[test]
    fn test_reversed_bounds_are_not_found() {
        let result = commit_range(&repo(), &commit("c4"), &commit("c2"));
        assert!(matches!(result, Err(Error::RangeNotFound { .. })));
    }

    #[test]
    fn test_unknown_bounds_are_not_found() {
        let result = commit_range(&repo(), &commit("zz"), &commit("c3"));
        assert!(matches!(result, Err(Error::RangeNotFound { .. })));

        let result = commit_range(&repo(), &commit("c1"), &commit("zz"));
        assert!(matches!(result, Err(Error::RangeNotFound { .. })));
    }

    #[test]
    fn test_pairs_zip_consecutive_commits() {
        let pairs = commit_pairs(&[commit("c1"), commit("c2"), commit("c3")]);
        assert_eq!(
            pairs,
            vec![
                CommitPair {
                    from: commit("c1"),
                    to: commit("c2"),
                },
                CommitPair {
                    from: commit("c2"),
                    to: commit("c3"),
                },
            ]
        );
    }

    #[test]
    fn test_root_commit() {
        assert_eq!(root_commit(&repo()).unwrap(), Some(commit("c1")));
        assert_eq!(root_commit(&MemoryRepository::default()).unwrap(), None);
    }
}
