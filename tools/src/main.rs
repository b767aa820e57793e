use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cmap_tools::{
    autotile_level, decode_map_json, encode_map_json, encode_map_xml, find_level,
    format_tile_grid, format_tree_pretty, inspect_map, InspectReport,
};
use codec::{DecodeOptions, EncodeOptions, TableLenWidth};
use glob::Pattern;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cmap-tools",
    version,
    about = "cmap map inspection, conversion and autotiling tools"
)]
struct Cli {
    /// Log decoder and autotiler activity.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Read and write the string table length as 4 bytes.
    #[arg(long, global = true)]
    wide_table: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize map files.
    Inspect {
        /// A map file, or a directory of map files.
        path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected maps.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected maps (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode a map file into JSON or an indented tree.
    Decode {
        /// Path to the map file.
        map_file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Encode a JSON map tree or an XML map export into a map file.
    Encode {
        /// JSON produced by `decode --format json`, or a `.xml` map export.
        input: PathBuf,
        /// Output map file.
        out: PathBuf,
        /// Package name; defaults to the one in the JSON, or the XML file stem.
        #[arg(long)]
        package: Option<String>,
    },
    /// Run the autotiler over a level's tile layer.
    Autotile {
        /// Path to the map file.
        map_file: PathBuf,
        /// Tileset rules XML.
        #[arg(long)]
        rules: PathBuf,
        /// Level name; defaults to the first level.
        #[arg(long)]
        level: Option<String>,
        /// Tile layer to read.
        #[arg(long, value_enum, default_value_t = Layer::Solids)]
        layer: Layer,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Pretty)]
        format: DecodeFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Layer {
    Solids,
    Bg,
}

impl Layer {
    const fn element_name(self) -> &'static str {
        match self {
            Self::Solids => "solids",
            Self::Bg => "bg",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let width = if cli.wide_table {
        TableLenWidth::Wide
    } else {
        TableLenWidth::Short
    };
    let decode_options = DecodeOptions::default().with_table_len_width(width);

    match cli.command {
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
        } => {
            if path.is_dir() {
                let entries = collect_map_entries(&path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    let bytes = read_map(&entry.path)?;
                    match inspect_map(&bytes, &decode_options) {
                        Ok(report) => print_inspect_report(&report),
                        Err(err) => println!("error: {err:#}"),
                    }
                }
            } else {
                let bytes = read_map(&path)?;
                let report = inspect_map(&bytes, &decode_options)?;
                print_inspect_report(&report);
            }
        }
        Command::Decode { map_file, format } => {
            let bytes = read_map(&map_file)?;
            match format {
                DecodeFormat::Json => {
                    let output = decode_map_json(&bytes, &decode_options)?;
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    let map = codec::decode_map(&bytes, &decode_options).context("decode map")?;
                    println!("package: {}", map.package);
                    print!("{}", format_tree_pretty(&map.root));
                }
            }
        }
        Command::Encode {
            input,
            out,
            package,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("read {}", input.display()))?;
            let options = EncodeOptions::default().with_table_len_width(width);
            let bytes = if is_xml(&input) {
                let package = package.unwrap_or_else(|| file_stem(&input));
                encode_map_xml(&text, &package, &options)?
            } else {
                encode_map_json(&text, package.as_deref(), &options)?
            };
            fs::write(&out, &bytes).with_context(|| format!("write map {}", out.display()))?;
            println!("wrote {} ({} bytes)", out.display(), bytes.len());
        }
        Command::Autotile {
            map_file,
            rules,
            level,
            layer,
            format,
        } => {
            let xml = fs::read_to_string(&rules)
                .with_context(|| format!("read rules {}", rules.display()))?;
            let autotiler = autotile::Autotiler::from_xml(&xml).context("load rules")?;
            let bytes = read_map(&map_file)?;
            let map = codec::decode_map(&bytes, &decode_options).context("decode map")?;
            let level = find_level(&map.root, level.as_deref())?;
            let grid = autotile_level(level, layer.element_name(), &autotiler)?;
            if format == DecodeFormat::Json {
                let json = serde_json::to_string_pretty(&grid).context("serialize json")?;
                println!("{json}");
            } else {
                println!(
                    "level {:?} {}: {}x{} tiles, {} occupied",
                    level.attr("name", ""),
                    layer.element_name(),
                    grid.width,
                    grid.height,
                    grid.occupied()
                );
                print!("{}", format_tile_grid(&grid));
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn is_xml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_map(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read map {}", path.display()))
}

struct MapEntry {
    path: PathBuf,
    size: u64,
}

fn collect_map_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<MapEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(MapEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(mut entries: Vec<MapEntry>, sort: Option<InspectSort>) -> Vec<MapEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}

fn print_inspect_report(report: &InspectReport) {
    let magic = if report.magic_matched {
        "ok"
    } else {
        "MISMATCH"
    };
    println!("package: {:?} magic: {magic}", report.package);
    println!(
        "size: {} bytes strings: {} elements: {} levels: {}",
        report.byte_len, report.string_count, report.element_count, report.level_count
    );
    if report.trailing_bytes > 0 {
        println!("trailing: {} bytes after the root element", report.trailing_bytes);
    }
}
