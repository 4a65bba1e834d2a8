// src/repo.rs

use crate::error::{Error, Result};
use crate::model::{Author, CommitId, FileDiff, Hunk};
use git2::{DiffFormat, DiffOptions, ErrorCode, ObjectType, Oid, Repository, Sort};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything the history pipeline needs from version control.
pub trait RepositoryProvider: Sync {
    /// Resolve a commit id, abbreviation or revspec (`HEAD~2`, a branch name).
    fn resolve_commit(&self, spec: &str) -> Result<CommitId>;

    /// Commits reachable from HEAD along first parents, newest first.
    fn history_from_head(&self) -> Result<Vec<CommitId>>;

    /// Text of `path` as of `commit`, or `None` when the path does not exist there.
    fn file_text_at(&self, commit: &CommitId, path: &str) -> Result<Option<String>>;

    /// Per-path hunks between the trees of `from` and `to`.
    fn diff(&self, from: &CommitId, to: &CommitId) -> Result<Vec<FileDiff>>;
}

/// libgit2-backed provider.
///
/// `git2::Repository` is not `Sync`, so a fresh handle is opened for every
/// operation; the provider itself only holds the path and can be shared by
/// rayon workers. Content is read from blobs, the working tree is never touched.
#[derive(Debug, Clone)]
pub struct GitRepository {
    repo_path: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `path` (any subdirectory works).
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)?;
        let repo_path = repo.path().to_path_buf();
        debug!("Opened git repository at {}", repo_path.display());
        Ok(Self { repo_path })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn open_repo(&self) -> Result<Repository> {
        Ok(Repository::open(&self.repo_path)?)
    }

    fn find_commit<'r>(&self, repo: &'r Repository, id: &CommitId) -> Result<git2::Commit<'r>> {
        let oid = Oid::from_str(id.as_str())?;
        Ok(repo.find_commit(oid)?)
    }

    /// Distinct authors over the head history, ordered by name then email.
    pub fn authors(&self) -> Result<Vec<Author>> {
        let repo = self.open_repo()?;
        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;

        let mut authors: BTreeMap<(String, String), Author> = BTreeMap::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            let signature = commit.author();
            let name = signature.name().unwrap_or("Unknown").to_string();
            let email = signature.email().unwrap_or("").to_string();
            let seconds = commit.time().seconds();

            let author = authors
                .entry((name.clone(), email.clone()))
                .or_insert_with(|| Author {
                    name,
                    email,
                    commits: 0,
                    last_seen: seconds,
                });
            author.commits += 1;
            author.last_seen = author.last_seen.max(seconds);
        }

        Ok(authors.into_values().collect())
    }
}

impl RepositoryProvider for GitRepository {
    fn resolve_commit(&self, spec: &str) -> Result<CommitId> {
        let repo = self.open_repo()?;
        let commit = repo
            .revparse_single(spec)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| Error::UnknownCommit {
                spec: spec.to_string(),
                reason: e.message().to_string(),
            })?;
        Ok(CommitId::new(commit.id().to_string()))
    }

    fn history_from_head(&self) -> Result<Vec<CommitId>> {
        let repo = self.open_repo()?;
        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.simplify_first_parent()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(CommitId::new(oid?.to_string()));
        }
        Ok(commits)
    }

    fn file_text_at(&self, commit: &CommitId, path: &str) -> Result<Option<String>> {
        let repo = self.open_repo()?;
        let tree = self.find_commit(&repo, commit)?.tree()?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }

        let blob = repo.find_blob(entry.id())?;
        Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
    }

    fn diff(&self, from: &CommitId, to: &CommitId) -> Result<Vec<FileDiff>> {
        let repo = self.open_repo()?;
        let old_tree = self.find_commit(&repo, from)?.tree()?;
        let new_tree = self.find_commit(&repo, to)?.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.context_lines(0);
        diff_opts.ignore_filemode(true);
        diff_opts.include_untracked(false);

        let diff = repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))?;

        // Paths in delta order; hunks keyed by their header position.
        let mut order: Vec<String> = Vec::new();
        let mut files: HashMap<String, (FileDiff, Option<(u32, u32)>)> = HashMap::new();

        diff.print(DiffFormat::Patch, |delta, hunk, line| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().replace('\\', "/"));
            let Some(path) = path else {
                return true;
            };

            let (file, current_hunk) = files.entry(path.clone()).or_insert_with(|| {
                order.push(path.clone());
                (
                    FileDiff {
                        path,
                        hunks: Vec::new(),
                    },
                    None,
                )
            });

            let Some(hunk) = hunk else {
                return true;
            };
            let position = (hunk.old_start(), hunk.new_start());
            if *current_hunk != Some(position) {
                file.hunks.push(Hunk::default());
                *current_hunk = Some(position);
            }
            let Some(target) = file.hunks.last_mut() else {
                return true;
            };

            // git numbers lines from 1; everything downstream is zero-based.
            match line.origin() {
                '+' => {
                    if let Some(n) = line.new_lineno() {
                        target.added_lines.push(n as usize - 1);
                    }
                }
                '-' => {
                    if let Some(n) = line.old_lineno() {
                        target.removed_lines.push(n as usize - 1);
                    }
                }
                _ => {}
            }
            true
        })?;

        Ok(order
            .into_iter()
            .filter_map(|path| files.remove(&path).map(|(file, _)| file))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn commit_file(repo: &Repository, dir: &Path, name: &str, content: &str) -> Oid {
        std::fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "update", &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_history_is_newest_first() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = commit_file(&repo, dir.path(), "a.txt", "one\n");
        let second = commit_file(&repo, dir.path(), "a.txt", "two\n");

        let provider = GitRepository::open(dir.path()).unwrap();
        let history = provider.history_from_head().unwrap();
        assert_eq!(
            history,
            vec![CommitId::new(second.to_string()), CommitId::new(first.to_string())]
        );
        assert_eq!(
            provider.resolve_commit("HEAD").unwrap(),
            CommitId::new(second.to_string())
        );
        assert_eq!(
            provider.resolve_commit("HEAD~1").unwrap(),
            CommitId::new(first.to_string())
        );
    }

    #[test]
    fn test_unknown_commit() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, dir.path(), "a.txt", "one\n");

        let provider = GitRepository::open(dir.path()).unwrap();
        let result = provider.resolve_commit("no-such-branch");
        assert!(matches!(result, Err(Error::UnknownCommit { .. })));
    }

    #[test]
    fn test_file_text_at_reads_blob_per_commit() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = commit_file(&repo, dir.path(), "a.txt", "one\n");
        let second = commit_file(&repo, dir.path(), "a.txt", "two\n");

        let provider = GitRepository::open(dir.path()).unwrap();
        let first = CommitId::new(first.to_string());
        let second = CommitId::new(second.to_string());

        assert_eq!(provider.file_text_at(&first, "a.txt").unwrap().as_deref(), Some("one\n"));
        assert_eq!(provider.file_text_at(&second, "a.txt").unwrap().as_deref(), Some("two\n"));
        assert_eq!(provider.file_text_at(&second, "missing.txt").unwrap(), None);
    }

    #[test]
    fn test_diff_reports_zero_based_lines() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = commit_file(&repo, dir.path(), "a.txt", "a\nb\nc\nd\n");
        let second = commit_file(&repo, dir.path(), "a.txt", "a\nB\nc\nd\ne\n");

        let provider = GitRepository::open(dir.path()).unwrap();
        let diff = provider
            .diff(&CommitId::new(first.to_string()), &CommitId::new(second.to_string()))
            .unwrap();

        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "a.txt");
        let added: Vec<usize> = diff[0].hunks.iter().flat_map(|h| h.added_lines.clone()).collect();
        let removed: Vec<usize> = diff[0].hunks.iter().flat_map(|h| h.removed_lines.clone()).collect();
        assert_eq!(added, vec![1, 4]);
        assert_eq!(removed, vec![1]);
        assert_eq!(diff[0].hunks.len(), 2);
    }

    #[test]
    fn test_authors_are_distinct() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, dir.path(), "a.txt", "one\n");
        commit_file(&repo, dir.path(), "a.txt", "two\n");

        let provider = GitRepository::open(dir.path()).unwrap();
        let authors = provider.authors().unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name, "Test User");
        assert_eq!(authors[0].email, "test@example.com");
        assert_eq!(authors[0].commits, 2);
    }
}
