//! pdf-outline CLI - heading outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::batch::{collect_inputs, run_batch_with_progress};
use pdf_outline::render::{to_json, to_json_tree, to_text};
use pdf_outline::{BatchOptions, BatchReport, JsonFormat, OutlineExtractor, OutlineOptions};

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract heading outlines from PDF documents", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Directory with .pdf and .layout files
    #[arg(value_name = "INPUT_DIR", env = "PDF_OUTLINE_INPUT", default_value = "input")]
    input: PathBuf,

    /// Directory receiving one JSON outline per document
    #[arg(value_name = "OUTPUT_DIR", env = "PDF_OUTLINE_OUTPUT", default_value = "output")]
    output: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract outlines for every document in a directory
    Batch {
        /// Input directory
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        /// Worker threads (default: available cores, at most 8)
        #[arg(short = 'j', long, default_value = "0")]
        workers: usize,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,

        /// Process documents and pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Keep URLs, dates and copyright lines as heading candidates
        #[arg(long)]
        no_boilerplate_filter: bool,
    },

    /// Extract the outline of a single document
    File {
        /// Input .pdf or .layout file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Nest entries under their parent headings
        #[arg(long, conflicts_with = "text")]
        tree: bool,

        /// Print an indented plain-text outline instead of JSON
        #[arg(long)]
        text: bool,
    },

    /// Write the extracted page layout of a document as a .layout dump
    Dump {
        /// Input .pdf or .layout file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show font statistics of a document
    Info {
        /// Input .pdf or .layout file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch {
            input,
            output,
            workers,
            compact,
            sequential,
            no_boilerplate_filter,
        }) => {
            let mut options = BatchOptions::new(input, output)
                .with_workers(workers)
                .with_outline_options(
                    OutlineOptions::default().with_boilerplate_filter(!no_boilerplate_filter),
                );
            if compact {
                options = options.compact();
            }
            if sequential {
                options = options.sequential();
            }
            cmd_batch(&options)
        }
        Some(Commands::File {
            input,
            output,
            compact,
            tree,
            text,
        }) => cmd_file(&input, output.as_deref(), compact, tree, text),
        Some(Commands::Dump { input, output }) => cmd_dump(&input, output.as_deref()),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_batch(&BatchOptions::new(cli.input, cli.output)),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_batch(options: &BatchOptions) -> Result<(), Box<dyn std::error::Error>> {
    log::debug!("Batch options: {:?}", options);
    let total = collect_inputs(&options.input_dir)?.len();
    if total == 0 {
        fs::create_dir_all(&options.output_dir)?;
        println!(
            "{} no .pdf or .layout files in {}",
            "Nothing to do:".yellow(),
            options.input_dir.display()
        );
        return Ok(());
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let report = run_batch_with_progress(options, |doc| {
        if let Some(name) = doc.input.file_name() {
            pb.set_message(name.to_string_lossy().to_string());
        }
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    print_batch_summary(&report, &options.output_dir);
    Ok(())
}

fn print_batch_summary(report: &BatchReport, output_dir: &Path) {
    println!(
        "{} {} of {} documents in {:.2?}",
        "Done!".green().bold(),
        report.succeeded(),
        report.total(),
        report.elapsed
    );
    println!("{}: {}", "Output".bold(), output_dir.display());

    if report.failed() > 0 {
        println!("\n{}", "Skipped:".yellow().bold());
        let failed: Vec<_> = report.documents.iter().filter(|d| !d.is_success()).collect();
        for (i, doc) in failed.iter().enumerate() {
            let branch = if i + 1 == failed.len() { "└─" } else { "├─" };
            println!(
                "  {} {} ({})",
                branch.dimmed(),
                doc.input.display(),
                doc.error.as_deref().unwrap_or_default()
            );
        }
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_file(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    tree: bool,
    text: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient: one bad page should not lose the whole outline
    let outline = OutlineExtractor::new().lenient().extract(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let content = if text {
        to_text(&outline)
    } else if tree {
        to_json_tree(&outline, format)?
    } else {
        to_json(&outline, format)?
    };

    write_or_print(output, &content)
}

fn cmd_dump(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let dump = OutlineExtractor::new().lenient().dump(input)?;
    write_or_print(output, &dump.to_json()?)
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let kind = pdf_outline::detect_input(input)?;
    let analysis = OutlineExtractor::new().lenient().analyze(input)?;
    let stats = &analysis.stats;

    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), kind);
    println!("{}: {}", "Pages".bold(), stats.page_count);
    if !analysis.outline.title.is_empty() {
        println!("{}: {}", "Title".bold(), analysis.outline.title);
    }

    println!();
    println!("{}", "Font Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Fragments".bold(), stats.fragment_count);
    match stats.body_size {
        Some(size) => println!("{}: {:.1}pt", "Body size".bold(), size),
        None => println!("{}: -", "Body size".bold()),
    }
    if let Some(size) = stats.title_size {
        println!("{}: {:.1}pt", "Title size".bold(), size);
    }

    let levels = ["H1", "H2", "H3", "H4"];
    for (rank, size) in stats.candidate_sizes.iter().enumerate() {
        let level = levels[rank.min(levels.len() - 1)];
        println!("  {} {:.1}pt", format!("{}:", level).dimmed(), size);
    }
    if stats.is_degenerate() {
        println!("  {}", "single font size, no heading candidates".yellow());
    }

    println!("{}: {}", "Heading fragments".bold(), stats.heading_fragments);
    println!("{}: {}", "Filtered as noise".bold(), stats.vetoed);
    println!("{}: {}", "Outline entries".bold(), analysis.outline.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdf-outline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Heading outline extraction from PDF font statistics");
    println!();
    println!("License: MIT");
}
