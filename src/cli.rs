// src/cli.rs

use crate::aggregate::analyze_range;
use crate::catalog;
use crate::config::{AnalysisConfig, CountMode};
use crate::error::Error;
use crate::index::{find_method_owner, MethodIndex};
use crate::join::{join, Dataset};
use crate::parser::CSharpParser;
use crate::repo::{GitRepository, RepositoryProvider};
use crate::report;
use crate::walker::root_commit;
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Method-level change mining for git repositories", long_about = None)]
pub struct Args {
    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", env = "METHOD_CHURN_LOG")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the methods declared in a source file with their spans
    Methods {
        /// Source file to parse
        file: PathBuf,
    },

    /// Find the method that owns a (zero-based) line of a source file
    Owner {
        /// Source file to parse
        file: PathBuf,
        /// Zero-based line number
        line: usize,
    },

    /// Count changed lines per method across a commit range
    Changes {
        /// Path to the git repository to analyze
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,

        /// Oldest commit of the range (defaults to the first commit on HEAD)
        #[arg(long)]
        from: Option<String>,

        /// Latest commit of the range
        #[arg(long, default_value = "HEAD")]
        to: String,

        /// How changed lines are counted
        #[arg(long, value_enum, default_value_t = CountMode::Lines)]
        count: CountMode,

        /// Process commit pairs one at a time, in history order
        #[arg(long)]
        sequential: bool,

        /// Hide the progress bar
        #[arg(long)]
        quiet: bool,

        #[command(flatten)]
        filter: SourceFilter,

        #[command(flatten)]
        output: OutputTarget,
    },

    /// Inventory every method under a directory, longest first
    Catalog {
        /// Directory to scan
        #[arg(default_value = ".")]
        root: PathBuf,

        #[command(flatten)]
        filter: SourceFilter,

        #[command(flatten)]
        output: OutputTarget,
    },

    /// Multiply the values of two `file;method;value` tables on matching keys
    Join {
        left: PathBuf,
        right: PathBuf,

        #[command(flatten)]
        output: OutputTarget,
    },

    /// List distinct commit authors on HEAD
    Authors {
        /// Path to the git repository
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,

        /// Also print commit count and date of the newest commit
        #[arg(long)]
        stats: bool,
    },
}

#[derive(ClapArgs, Debug)]
pub struct SourceFilter {
    /// File extensions treated as source files
    #[arg(long = "ext", env = "METHOD_CHURN_EXT", value_delimiter = ',', default_value = "cs")]
    pub extensions: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct OutputTarget {
    /// Write rows to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl OutputTarget {
    fn writer(&self) -> Result<Box<dyn Write>> {
        Ok(match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout().lock())),
        })
    }
}

pub fn run(args: Args) -> Result<()> {
    let parser = CSharpParser;

    match args.command {
        Command::Methods { file } => {
            let text = read_source(&file)?;
            let index = MethodIndex::build(&parser, &display_path(&file), &text)?;
            let mut out = BufWriter::new(io::stdout().lock());
            report::write_methods(&mut out, index.methods())?;
            out.flush()?;
        }
        Command::Owner { file, line } => {
            let text = read_source(&file)?;
            let owner = find_method_owner(&parser, &display_path(&file), &text, line)?;
            report::write_owner(&mut io::stdout().lock(), line, owner.as_ref())?;
        }
        Command::Changes {
            repo,
            from,
            to,
            count,
            sequential,
            quiet,
            filter,
            output,
        } => {
            let config = AnalysisConfig {
                count_mode: count,
                parallel: !sequential,
                show_progress: !quiet,
                ..AnalysisConfig::default()
            }
            .with_extensions(&filter.extensions);

            let provider = GitRepository::open(&repo)
                .with_context(|| format!("Failed to open repository at {}", repo.display()))?;
            let from = match from {
                Some(from) => from,
                None => root_commit(&provider)?
                    .map(|c| c.to_string())
                    .context("Repository has no commits on HEAD")?,
            };
            info!("Analyzing {} from {} to {}", repo.display(), from, to);

            let counts = analyze_range(&provider, &parser, &config, &from, &to)?;
            let mut out = output.writer()?;
            report::write_changes(&mut out, &counts)?;
            out.flush()?;
        }
        Command::Catalog {
            root,
            filter,
            output,
        } => {
            let config = AnalysisConfig::default().with_extensions(&filter.extensions);
            let entries = catalog::scan(&root, &parser, &config)?;
            let mut out = output.writer()?;
            report::write_catalog(&mut out, &entries)?;
            out.flush()?;
        }
        Command::Join {
            left,
            right,
            output,
        } => {
            let left = Dataset::read(&left)?;
            let right = Dataset::read(&right)?;
            let rows = join(&left, &right);
            info!("Joined {} rows ({} x {} inputs)", rows.len(), left.len(), right.len());
            let mut out = output.writer()?;
            report::write_joined(&mut out, &rows)?;
            out.flush()?;
        }
        Command::Authors { repo, stats } => {
            let provider = GitRepository::open(&repo)
                .with_context(|| format!("Failed to open repository at {}", repo.display()))?;
            // Fails early with a clear message on an empty repository.
            provider.resolve_commit("HEAD")?;
            let authors = provider.authors()?;
            let mut out = io::stdout().lock();
            if stats {
                report::write_author_stats(&mut out, &authors)?;
            } else {
                report::write_authors(&mut out, &authors)?;
            }
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
