//! CLI for the chainfix assertion rewriter.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chainfix::prelude::*;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "chainfix")]
#[command(author, version, about = "Rewrites legacy fluent assertion chains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report old-style assertion chains without changing files
    Check {
        /// File or directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Glob pattern to include
        #[arg(short, long)]
        include: Option<String>,

        /// Glob pattern to exclude
        #[arg(long)]
        exclude: Option<String>,

        /// Emit findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite old-style assertion chains in place
    Fix {
        /// File or directory to fix
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Glob pattern to include
        #[arg(short, long)]
        include: Option<String>,

        /// Glob pattern to exclude
        #[arg(long)]
        exclude: Option<String>,

        /// Preview changes as a diff without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// List the built-in rule catalog
    Rules,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            path,
            include,
            exclude,
            json,
        } => cmd_check(path, include, exclude, json),
        Commands::Fix {
            path,
            include,
            exclude,
            dry_run,
        } => cmd_fix(path, include, exclude, dry_run),
        Commands::Rules => cmd_rules(),
    }
}

fn finder(include: Option<String>, exclude: Option<String>) -> SourceFinder {
    let mut finder = SourceFinder::new();
    if let Some(include) = include {
        finder = finder.include(include);
    }
    if let Some(exclude) = exclude {
        finder = finder.exclude(exclude);
    }
    finder
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    diagnostics: Vec<Diagnostic>,
    failures: Vec<RuleFailure>,
}

fn cmd_check(
    path: PathBuf,
    include: Option<String>,
    exclude: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let files = finder(include, exclude)
        .collect(&path)
        .context("Failed to collect source files")?;
    let analyzer = Analyzer::new();

    let mut reports = Vec::new();
    let mut findings = 0;

    for file in files {
        let source =
            fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
        let analysis = analyzer
            .analyze(&source)
            .with_context(|| format!("Failed to analyze {}", file.display()))?;

        if analysis.diagnostics.is_empty() && analysis.failures.is_empty() {
            continue;
        }

        findings += analysis.diagnostics.len();

        if json {
            reports.push(FileReport {
                file: file.display().to_string(),
                diagnostics: analysis.diagnostics,
                failures: analysis.failures,
            });
        } else {
            for diagnostic in &analysis.diagnostics {
                println!(
                    "{}:{}:{}: [{}] {}",
                    file.display(),
                    diagnostic.line,
                    diagnostic.column,
                    diagnostic.rule,
                    diagnostic.message
                );
                println!("  found:   {}", diagnostic.matched);
                println!("  suggest: {}", diagnostic.replacement);
            }
            for failure in &analysis.failures {
                eprintln!(
                    "{}:{}: rule '{}' failed: {}",
                    file.display(),
                    failure.line,
                    failure.rule,
                    failure.error
                );
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if findings == 0 {
        println!("No old-style assertion chains found");
    }

    Ok(if findings > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_fix(
    path: PathBuf,
    include: Option<String>,
    exclude: Option<String>,
    dry_run: bool,
) -> Result<ExitCode> {
    let files = finder(include, exclude)
        .collect(&path)
        .context("Failed to collect source files")?;
    let analyzer = Analyzer::new();

    let mut summary = DiffSummary::default();
    let mut modified = 0;

    for file in files {
        let source =
            fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
        let outcome = analyzer
            .fix(&source)
            .with_context(|| format!("Failed to fix {}", file.display()))?;

        for failure in &outcome.failures {
            eprintln!(
                "{}:{}: rule '{}' failed: {}",
                file.display(),
                failure.line,
                failure.rule,
                failure.error
            );
        }

        if !outcome.is_modified() {
            continue;
        }

        modified += 1;
        summary.merge(&DiffSummary::from_diff(&source, &outcome.fixed));

        if dry_run {
            println!("{}", chainfix::diff::render(&source, &outcome.fixed, &file, true));
        } else {
            fs::write(&file, &outcome.fixed)
                .with_context(|| format!("Failed to write {}", file.display()))?;
        }
    }

    if dry_run {
        println!("{summary}");
    } else {
        println!("Modified {modified} file(s)");
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_rules() -> Result<ExitCode> {
    for rule in builtin_rules() {
        print!("{}", rule.id);
        if let Some(url) = rule.help_url() {
            print!(" ({url})");
        }
        println!();
        println!("  {}", rule.message);
    }
    Ok(ExitCode::SUCCESS)
}
