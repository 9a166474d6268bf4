//! tabmark CLI - convert HTML tables in Markdown documents

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use tabmark::{
    convert_file, convert_files, CleanupPreset, ConversionStats, ConvertOptions, ConvertResult,
    TableMode,
};

#[derive(Parser)]
#[command(name = "tabmark")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Render HTML tables in Markdown as text tables or Excel worksheets",
    long_about = None
)]
struct Cli {
    /// Source documents (.md, .mmd, .markdown)
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Text cleanup preset
    #[arg(long, value_enum, default_value = "standard")]
    cleanup: CleanupLevel,

    /// Skip text cleanup entirely
    #[arg(long, conflicts_with = "cleanup")]
    no_cleanup: bool,

    /// Table routing
    #[arg(long, value_enum, default_value = "auto")]
    tables: TableRouting,

    /// Longest row (in characters) still rendered as a text table
    #[arg(long, value_name = "CHARS", env = "TABMARK_MAX_ROW_CHARS")]
    max_row_chars: Option<usize>,

    /// Convert files one at a time
    #[arg(long)]
    sequential: bool,

    /// Print a JSON summary instead of status lines
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Entity and line-ending normalization only
    Minimal,
    /// Entities, empty tags and backslash escapes (default)
    Standard,
    /// Everything, plus Markdown tidying and Unicode normalization
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TableRouting {
    /// Text tables where possible, worksheets otherwise
    Auto,
    /// Every table becomes a worksheet
    Spreadsheet,
}

impl From<TableRouting> for TableMode {
    fn from(routing: TableRouting) -> Self {
        match routing {
            TableRouting::Auto => TableMode::Auto,
            TableRouting::Spreadsheet => TableMode::Spreadsheet,
        }
    }
}

impl Cli {
    fn convert_options(&self) -> ConvertOptions {
        let mut render = tabmark::RenderOptions::new().with_table_mode(self.tables.into());
        render = if self.no_cleanup {
            render.without_cleanup()
        } else {
            render.with_cleanup_preset(self.cleanup.into())
        };
        if let Some(chars) = self.max_row_chars {
            render = render.with_max_inline_row_chars(chars);
        }

        let options = ConvertOptions::new().with_render_options(render);
        if self.sequential {
            options.sequential()
        } else {
            options
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(0) => {}
        Ok(failed) => {
            eprintln!(
                "{}: {} of {} file(s) failed",
                "Error".red().bold(),
                failed,
                cli.files.len()
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Convert every file and report; returns the number of failures.
fn run(cli: &Cli) -> Result<usize, Box<dyn std::error::Error>> {
    let options = cli.convert_options();
    let results = if options.parallel {
        convert_parallel(&cli.files, &cli.output, &options, !cli.json)?
    } else {
        convert_sequential(&cli.files, &cli.output, &options, !cli.json)?
    };

    let failed = results.iter().filter(|r| r.is_err()).count();
    if cli.json {
        print_json(&cli.files, &results)?;
    } else {
        print_summary(&cli.files, &results);
    }
    Ok(failed)
}

fn progress_bar(len: usize, visible: bool) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn convert_sequential(
    files: &[PathBuf],
    output: &Path,
    options: &ConvertOptions,
    show_progress: bool,
) -> Result<Vec<tabmark::Result<ConvertResult>>, Box<dyn std::error::Error>> {
    let pb = progress_bar(files.len(), show_progress)?;
    let mut results = Vec::with_capacity(files.len());
    for file in files {
        pb.set_message(file.display().to_string());
        results.push(convert_file(file, output, options));
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(results)
}

fn convert_parallel(
    files: &[PathBuf],
    output: &Path,
    options: &ConvertOptions,
    show_progress: bool,
) -> Result<Vec<tabmark::Result<ConvertResult>>, Box<dyn std::error::Error>> {
    let pb = progress_bar(files.len(), show_progress)?;
    pb.set_message("Converting...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    let results = convert_files(files, output, options);
    pb.set_position(files.len() as u64);
    pb.finish_and_clear();
    Ok(results)
}

fn print_summary(files: &[PathBuf], results: &[tabmark::Result<ConvertResult>]) {
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(result) => {
                let output = result
                    .output
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "{} {} {} {}",
                    "✓".green().bold(),
                    file.display(),
                    "→".dimmed(),
                    output
                );
                println!(
                    "  {} {} table(s): {} inline, {} worksheet(s), {} merged range(s)",
                    "├─".dimmed(),
                    result.stats.table_count,
                    result.stats.inline_table_count,
                    result.stats.sheet_count,
                    result.stats.merged_range_count
                );
                match result.workbook {
                    Some(ref workbook) => {
                        println!("  {} {}", "└─".dimmed(), workbook.display())
                    }
                    None => println!("  {} no workbook", "└─".dimmed()),
                }
                for warning in &result.warnings {
                    println!("  {} {}", "Warning:".yellow().bold(), warning);
                }
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red().bold(), file.display(), e);
            }
        }
    }

    if results.len() > 1 {
        let totals = batch_totals(results);
        println!(
            "{} {} table(s) in {} file(s): {} inline, {} worksheet(s), {} warning(s)",
            "Total:".bold(),
            totals.table_count,
            results.iter().filter(|r| r.is_ok()).count(),
            totals.inline_table_count,
            totals.sheet_count,
            totals.warning_count
        );
    }
}

/// Combined statistics of every successful conversion.
fn batch_totals(results: &[tabmark::Result<ConvertResult>]) -> ConversionStats {
    let mut totals = ConversionStats::new();
    for result in results.iter().flatten() {
        totals.merge(&result.stats);
    }
    totals
}

fn print_json(
    files: &[PathBuf],
    results: &[tabmark::Result<ConvertResult>],
) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<serde_json::Value> = files
        .iter()
        .zip(results)
        .map(|(file, result)| match result {
            Ok(result) => json!({
                "source": file,
                "output": result.output,
                "workbook": result.workbook,
                "sheets": result.sheets,
                "stats": result.stats,
                "warnings": result.warnings,
            }),
            Err(e) => json!({
                "source": file,
                "error": e.to_string(),
            }),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
