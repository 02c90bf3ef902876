//! uncooked - inspect fixed-layout binary game-data tables
//!
//! Usage:
//!   uncooked dump <file> --layout "code:i32,name:str32" [--count N]  - Decode records and print them as a table
//!   uncooked csv <file> --columns N [--delimiter ,]                  - Parse a delimited file and print rows
//!   uncooked find <file> <pattern>                                   - Search for a byte pattern (?? = wildcard)
//!   uncooked cache-info <cache_file>                                 - Show tables in a saved store cache

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use uncooked::progress::ProgressSink;
use uncooked::schema::{FieldKind, FieldLayout, RecordSchema};
use uncooked::tableset::{Cache, CacheOutcome, StringLookups, TableSet};
use uncooked::{buffer, decode_records, DelimitedOptions, DelimitedReader};

#[derive(Parser)]
#[command(name = "uncooked")]
#[command(version = "0.1.0")]
#[command(about = "Inspect fixed-layout binary game-data tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode fixed-size records from a binary file and print them
    Dump {
        /// Path to the binary file
        file: PathBuf,
        /// Record layout, e.g. "code:i32,flags:u16,name:str32"
        #[arg(short, long)]
        layout: String,
        /// Number of records to decode (default: as many as fit)
        #[arg(short, long)]
        count: Option<usize>,
        /// Byte offset of the first record
        #[arg(short, long, default_value = "0")]
        offset: usize,
    },
    /// Parse a delimited text file and print its rows
    Csv {
        /// Path to the delimited file
        file: PathBuf,
        /// Declared number of columns per row
        #[arg(short, long)]
        columns: usize,
        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
        /// Skip the first (header) row
        #[arg(long)]
        skip_header: bool,
        /// Skip malformed rows instead of aborting
        #[arg(long)]
        skip_bad_rows: bool,
    },
    /// Search a file for a byte pattern; "??" matches any byte
    Find {
        /// Path to the file to search
        file: PathBuf,
        /// Hex byte pattern, e.g. "DE AD ?? EF"
        pattern: String,
    },
    /// Show the tables and relations stored in a cache file
    CacheInfo {
        /// Path to the cache file
        cache_file: PathBuf,
    },
}

/// Progress sink backed by an indicatif bar.
struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    fn new() -> Self {
        BarProgress { bar: None }
    }
}

impl ProgressSink for BarProgress {
    fn stage(&mut self, text: &str) {
        println!("{}", text);
    }

    fn rows(&mut self, current: u64, total: u64) {
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            bar
        });
        bar.set_position(current);
    }
}

/// Parse a layout string like "code:i32,flags:u16,name:str32" into a schema.
fn parse_layout(name: &str, layout: &str) -> Result<RecordSchema> {
    let mut fields = Vec::new();
    for part in layout.split(',') {
        let (field_name, kind) = part
            .split_once(':')
            .with_context(|| format!("field '{}' is not name:kind", part))?;
        let kind = match kind.trim() {
            "i32" => FieldKind::Int32,
            "u32" => FieldKind::UInt32,
            "u16" => FieldKind::UInt16,
            "f32" => FieldKind::Float,
            other => {
                if let Some(n) = other.strip_prefix("str") {
                    FieldKind::Str(n.parse().with_context(|| format!("bad str length in '{}'", part))?)
                } else if let Some(n) = other.strip_prefix("bytes") {
                    FieldKind::Bytes(n.parse().with_context(|| format!("bad bytes length in '{}'", part))?)
                } else {
                    bail!("unknown field kind '{}' (expected i32/u32/u16/f32/strN/bytesN)", other);
                }
            }
        };
        fields.push(FieldLayout::new(field_name.trim(), kind));
    }
    if fields.is_empty() {
        bail!("layout is empty");
    }
    Ok(RecordSchema::new(name, fields))
}

/// Parse a hex pattern like "DE AD ?? EF" into bytes, "??" as the wildcard.
fn parse_pattern(pattern: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        if token == "??" {
            bytes.push(buffer::WILDCARD);
        } else {
            bytes.push(
                u8::from_str_radix(token, 16)
                    .with_context(|| format!("bad hex byte '{}'", token))?,
            );
        }
    }
    if bytes.is_empty() {
        bail!("pattern is empty");
    }
    Ok(bytes)
}

fn print_table(table: &uncooked::Table, limit: usize) {
    let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
    println!("{}", names.join(" | "));
    for row in table.rows().iter().take(limit) {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", cells.join(" | "));
    }
    if table.row_count() > limit {
        println!("... and {} more rows", table.row_count() - limit);
    }
}

fn cmd_dump(file: &PathBuf, layout: &str, count: Option<usize>, offset: usize) -> Result<()> {
    let table_name = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dump".to_string());
    let schema = parse_layout(&table_name, layout)?;

    let data = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let available = data.len().saturating_sub(offset);
    let count = count.unwrap_or(available / schema.row_width());

    let mut cursor = offset;
    let records = decode_records(&schema, &data, &mut cursor, count)
        .with_context(|| format!("Failed to decode {} records of {} bytes", count, schema.row_width()))?;

    let mut set = TableSet::new();
    let mut progress = BarProgress::new();
    set.load_table(&schema, &records, &StringLookups::default(), &mut progress)?;
    if let Some(bar) = progress.bar.take() {
        bar.finish_and_clear();
    }

    if let Some(table) = set.get_table(&table_name) {
        println!(
            "{}: {} records of {} bytes\n",
            table_name,
            table.row_count(),
            schema.row_width()
        );
        print_table(table, 50);
    }
    Ok(())
}

fn cmd_csv(
    file: &PathBuf,
    columns: usize,
    delimiter: char,
    skip_header: bool,
    skip_bad_rows: bool,
) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let mut opts = DelimitedOptions::csv(columns);
    opts.delimiter = delimiter as u8;
    opts.skip_header = skip_header;

    let mut reader = DelimitedReader::new(&data, opts);
    let mut printed = 0usize;
    while let Some(row) = reader.next_row() {
        match row {
            Ok(fields) => {
                println!("{}", fields.join(" | "));
                printed += 1;
            }
            Err(e) if skip_bad_rows => eprintln!("Warning: {}", e),
            Err(e) => return Err(e.into()),
        }
    }
    println!("\n{} rows", printed);
    Ok(())
}

fn cmd_find(file: &PathBuf, pattern: &str) -> Result<()> {
    let needle = parse_pattern(pattern)?;
    let data = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    match buffer::find_pattern(&data, &needle) {
        Some(offset) => println!("Found at offset 0x{:08x} ({})", offset, offset),
        None => println!("Not found"),
    }
    Ok(())
}

fn cmd_cache_info(cache_file: &PathBuf) -> Result<()> {
    let cache = Cache::new(cache_file);
    match cache.load()? {
        CacheOutcome::Restored(set) => {
            println!("Cache: {}", cache_file.display());
            println!("Tables: {}", set.table_count());
            let mut names: Vec<&String> = set.table_names().collect();
            names.sort();
            for name in names {
                if let Some(table) = set.get_table(name) {
                    println!(
                        "  {} ({} columns, {} rows)",
                        name,
                        table.columns().len(),
                        table.row_count()
                    );
                }
            }
            println!("Relations: {}", set.relations().len());
            for relation in set.relations() {
                println!(
                    "  {} -> {}.{}",
                    relation.name, relation.parent_table, relation.parent_column
                );
            }
        }
        CacheOutcome::Stale => println!("Cache is stale and must be regenerated"),
        CacheOutcome::Missing => println!("No cache file at {}", cache_file.display()),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Dump {
            file,
            layout,
            count,
            offset,
        } => cmd_dump(file, layout, *count, *offset),
        Commands::Csv {
            file,
            columns,
            delimiter,
            skip_header,
            skip_bad_rows,
        } => cmd_csv(file, *columns, *delimiter, *skip_header, *skip_bad_rows),
        Commands::Find { file, pattern } => cmd_find(file, pattern),
        Commands::CacheInfo { cache_file } => cmd_cache_info(cache_file),
    }
}
