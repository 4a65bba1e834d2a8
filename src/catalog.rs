// src/catalog.rs

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::index::MethodIndex;
use crate::model::CatalogEntry;
use crate::parser::SourceParser;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Every method of every source file under `root`, longest first.
///
/// File paths in the entries are relative to `root` and use `/`. Equal
/// lengths keep the walk order (files by name, methods by declaration).
pub fn scan<P: SourceParser + ?Sized>(
    root: &Path,
    parser: &P,
    config: &AnalysisConfig,
) -> Result<Vec<CatalogEntry>> {
    let files = source_files(root, config)?;
    debug!("Found {} source files under {}", files.len(), root.display());

    let per_file: Vec<Vec<CatalogEntry>> = files
        .par_iter()
        .map(|path| scan_file(root, path, parser))
        .collect::<Result<_>>()?;

    let entries = rank(per_file.into_iter().flatten().collect());
    info!("Cataloged {} methods in {} files", entries.len(), files.len());
    Ok(entries)
}

/// Stable sort by descending length.
pub fn rank(mut entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    entries.sort_by(|a, b| b.length_in_lines.cmp(&a.length_in_lines));
    entries
}

fn scan_file<P: SourceParser + ?Sized>(
    root: &Path,
    path: &Path,
    parser: &P,
) -> Result<Vec<CatalogEntry>> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let relative = relative_path(root, path);

    let index = MethodIndex::build(parser, &relative, &text)?;
    Ok(index.into_methods().into_iter().map(CatalogEntry::from).collect())
}

fn source_files(root: &Path, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_git_dir(e))
    {
        let entry = entry?;
        if entry.file_type().is_file() && config.is_source_file(&entry.path().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
