use clap::Parser;
use colored::*;
use fastlink::api;
use fastlink::batch::{self, BatchReport};
use fastlink::error::{FastLinkError, Result};
use fastlink::model::{FileRecord, RecordSet};
use fastlink::sorter;
use fastlink::split;
use fastlink::store::{self, RecordStore};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { link } => handle_parse(link),
        Commands::Generate { file } => handle_generate(&file),
        Commands::Validate { link } => handle_validate(&link),
        Commands::Merge { files, output } => handle_merge(&files, &output),
        Commands::Sort { file, natural } => handle_sort(&file, natural),
        Commands::SplitCount { file, size, output } => handle_split_count(&file, size, output),
        Commands::SplitFolder {
            file,
            level,
            output,
        } => handle_split_folder(&file, level, output),
        Commands::FilterExt {
            file,
            extensions,
            output,
        } => handle_filter_ext(&file, &extensions, &output),
        Commands::Info { file } => handle_info(&file),
        Commands::Dirs { file, select } => handle_dirs(&file, select),
        Commands::Ingest { links, into } => handle_ingest(&links, &into),
    }
}

fn handle_parse(link: Option<String>) -> Result<()> {
    let text = match link {
        Some(l) => l,
        None => read_stdin()?,
    };
    let parsed = api::parse_link(text.trim())?;
    print_records(&parsed.records);
    let total: u64 = parsed.records.iter().map(|r| r.size).sum();
    println!(
        "{}",
        format!(
            "{} file(s), {} total",
            parsed.records.len(),
            format_size(total)
        )
        .dimmed()
    );
    if parsed.skipped > 0 {
        println!(
            "{}",
            format!("Skipped {} malformed segment(s).", parsed.skipped).yellow()
        );
    }
    Ok(())
}

fn handle_generate(file: &Path) -> Result<()> {
    let set = api::load(file)?;
    if set.is_empty() {
        return Err(FastLinkError::Empty("document has no files".into()));
    }
    println!("{}", api::generate_link(&set.files));
    Ok(())
}

fn handle_validate(link: &str) -> Result<()> {
    api::validate_link_format(link)?;
    println!("{}", "Link structure looks valid.".green());
    Ok(())
}

fn handle_merge(files: &[PathBuf], output: &Path) -> Result<()> {
    let mut inputs = Vec::new();
    for path in files {
        if path.is_dir() {
            inputs.extend(store::json_files_in_dir(path));
        } else {
            inputs.push(path.clone());
        }
    }
    for path in &inputs {
        if let Err(e) = store::is_valid_json_file(path) {
            eprintln!(
                "{}",
                format!("Skipping {}: {}", path.display(), e).yellow()
            );
        }
    }

    let (merged, added) = api::merge(&inputs);
    let Some(mut merged) = merged else {
        return Err(FastLinkError::Empty(
            "no files found in the given documents".into(),
        ));
    };
    api::save(output, &mut merged)?;
    println!(
        "{}",
        format!(
            "Merged {} file(s) from {} document(s) into {}",
            added,
            inputs.len(),
            output.display()
        )
        .green()
    );
    Ok(())
}

fn handle_sort(file: &Path, natural: bool) -> Result<()> {
    if natural {
        let mut set = api::load(file)?;
        sorter::sort_natural(&mut set.files);
        api::save(file, &mut set)?;
        println!("{}", "Sorted in natural display order.".green());
        return Ok(());
    }
    if sorter::sort_file_in_place(file)? {
        println!("{}", "Sorted by path.".green());
    } else {
        println!("{}", "Already sorted; file untouched.".dimmed());
    }
    Ok(())
}

fn handle_split_count(file: &Path, size: usize, output: Option<PathBuf>) -> Result<()> {
    let set = api::load(file)?;
    let chunks = api::split_by_count(&set, size)?;
    write_chunks(file, &chunks, output)
}

fn handle_split_folder(file: &Path, level: usize, output: Option<PathBuf>) -> Result<()> {
    let set = api::load(file)?;
    let chunks = api::split_by_folder(&set, level)?;
    write_chunks(file, &chunks, output)
}

fn write_chunks(source: &Path, chunks: &[RecordSet], output: Option<PathBuf>) -> Result<()> {
    let dir = match output {
        Some(d) => d,
        None => source.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chunk".to_string());

    for (i, chunk) in chunks.iter().enumerate() {
        let path = dir.join(format!("{}_part{}.json", stem, i + 1));
        store::save_set(&path, chunk)?;
        println!(
            "  {} ({} file(s), {})",
            path.display(),
            chunk.total_files_count,
            format_size(chunk.total_size)
        );
    }
    println!(
        "{}",
        format!("Wrote {} chunk(s) to {}", chunks.len(), dir.display()).green()
    );
    Ok(())
}

fn handle_filter_ext(file: &Path, extensions: &[String], output: &Path) -> Result<()> {
    let set = api::load(file)?;
    let before = set.files.len();
    let mut filtered = api::filter_by_extension(&set, extensions);
    let removed = before - filtered.files.len();
    api::save(output, &mut filtered)?;
    println!(
        "{}",
        format!(
            "Removed {} file(s); {} remain in {}",
            removed,
            filtered.files.len(),
            output.display()
        )
        .green()
    );
    Ok(())
}

fn handle_info(file: &Path) -> Result<()> {
    let set = api::load(file)?;
    let report = split::analyze_structure(&set);
    println!("Files:     {}", report.file_count);
    println!("Size:      {}", format_size(report.total_size));
    println!("Max depth: {}", report.max_depth);
    if let Some(common) = set.common_path.as_deref().filter(|c| !c.is_empty()) {
        println!("Base path: {}", common);
    }
    if !report.tree.is_empty() {
        println!();
        print!("{}", report.tree);
    }
    Ok(())
}

fn handle_dirs(file: &Path, select: Option<String>) -> Result<()> {
    let set = api::load(file)?;

    if let Some(selector) = select {
        let matched = api::filter_records(&set.files, &selector);
        if matched.is_empty() {
            println!("No files under '{}'.", selector);
            return Ok(());
        }
        print_records(&matched);
        println!(
            "{}",
            format!("{} file(s) under '{}'", matched.len(), selector).dimmed()
        );
        return Ok(());
    }

    let index = api::directory_index(&set);
    for option in index.menu_options() {
        println!("{}", option.value.bold());
        for child in &option.children {
            println!("  {}", child.value);
        }
    }
    Ok(())
}

fn handle_ingest(links: &Path, into: &Path) -> Result<()> {
    let text = if links == Path::new("-") {
        read_stdin()?
    } else {
        std::fs::read_to_string(links)?
    };

    let mut store = if into.exists() {
        RecordStore::load(into)?
    } else {
        let mut store = RecordStore::new();
        store.create_new();
        store
    };

    let cancel = AtomicBool::new(false);
    let report = batch::ingest_links(&mut store, &text, &cancel, |done, total| {
        println!("{}", format!("  processed {}/{} link(s)", done, total).dimmed());
    })?;

    if into.exists() {
        let bak = store::backup_file(into)?;
        println!(
            "{}",
            format!("Backed up existing document to {}", bak.display()).dimmed()
        );
    }
    store.save(into)?;
    print_batch_report(&report, into);
    Ok(())
}

fn print_batch_report(report: &BatchReport, target: &Path) {
    println!(
        "{}",
        format!(
            "Parsed {}/{} link(s), added {} file(s) to {}",
            report.parsed_links,
            report.total_links,
            report.files_added,
            target.display()
        )
        .green()
    );
    if !report.failures.is_empty() {
        println!(
            "{}",
            format!("{} link(s) failed to parse:", report.failures.len()).yellow()
        );
        for failure in report.failures.iter().take(5) {
            println!("  {}", failure.yellow());
        }
        if report.failures.len() > 5 {
            println!(
                "  {}",
                format!("... and {} more", report.failures.len() - 5).yellow()
            );
        }
    }
}

const PATH_COLUMN_WIDTH: usize = 60;

fn print_records(records: &[FileRecord]) {
    for rec in records {
        let path = &rec.path;
        let padding = PATH_COLUMN_WIDTH.saturating_sub(path.width());
        println!(
            "  {}{}  {:>10}",
            path,
            " ".repeat(padding),
            format_size(rec.size).dimmed()
        );
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
