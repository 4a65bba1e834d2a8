// src/config.rs

use std::path::Path;

pub const DEFAULT_EXTENSIONS: &[&str] = &["cs"];

/// How changed lines turn into counts.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CountMode {
    /// One hit per changed line attributed to a method
    #[default]
    Lines,
    /// One hit per method per commit pair, however many of its lines changed
    Pairs,
}

/// Knobs shared by the history and catalog pipelines.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Lower-case file extensions, without the dot.
    pub extensions: Vec<String>,
    pub count_mode: CountMode,
    pub parallel: bool,
    pub show_progress: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            count_mode: CountMode::default(),
            parallel: true,
            show_progress: false,
        }
    }
}

impl AnalysisConfig {
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if !extensions.is_empty() {
            self.extensions = extensions;
        }
        self
    }

    /// Whether `path` looks like a source file we can parse.
    pub fn is_source_file(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.extensions.iter().any(|x| *x == e)
            })
            .unwrap_or(false)
    }
}
