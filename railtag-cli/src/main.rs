use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use railtag::crc::{checksum_window, clear_checksum, crc30_cdma, Crc30, CrcParams};
use railtag::layout::{Field, Layout, CHECKSUM_SLOT};
use railtag::reference::reference_vectors;
use railtag::types::Page;
use railtag::{FieldSource, TagEncoder, TagKind};
use tracing::{debug, info, warn};

mod report;
mod sheet;

/// Railway RFID tag encoding CLI
#[derive(Parser)]
#[command(name = "railtag", version)]
struct Cli {
    /// Log filter, e.g. "info" or "railtag=trace" (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode every tag in a sheet
    Encode {
        /// Sheet file (.toml with [[tag]] tables or .json with a "tags" array)
        sheet: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value = "terminal")]
        format: OutputFormat,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
        /// Print all eight bytes of every page
        #[arg(long)]
        full_pages: bool,
    },
    /// Show the bit layout of a tag variant
    Layout {
        /// Tag variant: nt, aline or adj
        #[arg(long)]
        kind: TagKind,
    },
    /// Compute the CRC-30 of raw bytes
    Crc {
        /// Input bytes as hex
        hex: String,
        /// Which engine to run
        #[arg(long, value_enum, default_value = "table")]
        engine: Engine,
        /// TOML file with custom CRC parameters for the table engine
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Re-encode the built-in reference vectors
    Verify,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Terminal,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    Table,
    Bytewise,
    Both,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::Encode {
            sheet,
            format,
            pretty,
            full_pages,
        } => cmd_encode(&sheet, format, pretty, full_pages),
        Command::Layout { kind } => cmd_layout(kind),
        Command::Crc {
            hex,
            engine,
            params,
        } => cmd_crc(&hex, engine, params.as_deref()),
        Command::Verify => cmd_verify(),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{level}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn cmd_encode(path: &Path, format: OutputFormat, pretty: bool, full_pages: bool) -> Result<()> {
    let rows = sheet::load_sheet(path)?;
    info!(sheet = %path.display(), tags = rows.len(), "loaded sheet");

    let encoder = TagEncoder::new().context("building tag encoder")?;
    let records: Vec<_> = rows.iter().filter_map(|r| r.record.clone().ok()).collect();
    let mut encoded = encoder.encode_batch(&records).into_iter();

    let mut tags = Vec::with_capacity(rows.len());
    for row in &rows {
        let report = match &row.record {
            Err(err) => {
                warn!(column = %row.column, "skipping tag: {err}");
                report::TagReport::failed(&row.column, None, err)
            }
            Ok(record) => match encoded.next() {
                Some(Ok(tag)) => {
                    report::TagReport::encoded(&row.column, record.unique_id(), &tag, full_pages)
                }
                Some(Err(err)) => {
                    warn!(column = %row.column, "encoding failed: {err}");
                    report::TagReport::failed(&row.column, Some(record.kind()), err)
                }
                None => anyhow::bail!("encoder returned fewer results than records"),
            },
        };
        tags.push(report);
    }

    let full = report::FullReport::from_tags(tags);
    match format {
        OutputFormat::Terminal => report::print_terminal(&full),
        OutputFormat::Json => println!("{}", report::to_json(&full, pretty)),
    }

    anyhow::ensure!(
        full.all_encoded(),
        "{} of {} tags failed to encode",
        full.failed,
        full.total
    );
    Ok(())
}

fn cmd_layout(kind: TagKind) -> Result<()> {
    let layout = Layout::for_kind(kind);
    layout
        .validate()
        .with_context(|| format!("{kind} layout is inconsistent"))?;

    println!("Variant:       {} (tag type {})", kind.name(), kind.canonical_code());
    println!("Insertions:    {}", layout.fields.len());
    println!();
    println!(
        "{:>3} {:<24} {:>4} {:>9} {:>5} {:>5}",
        "Key", "Field", "Page", "Bits", "Width", "Shift"
    );
    println!("{}", "-".repeat(56));

    let fields = layout.distinct_fields();
    for spec in layout.fields.iter().chain(std::iter::once(&CHECKSUM_SLOT)) {
        let bits = spec.page_bits()?;
        println!(
            "{:>3} {:<24} {:>4} {:>9} {:>5} {:>5}",
            field_key(&fields, spec.field),
            format!("{:?}", spec.field),
            spec.page,
            format!("{}{}-{}{}", spec.page, bits.start, spec.page, bits.end - 1),
            spec.width,
            spec.shift,
        );
    }

    println!();
    println!("Bit map (bit 63 first, '.' unused):");
    for page in [Page::X, Page::Y] {
        let mut map = String::with_capacity(72);
        for bit in (0..64u32).rev() {
            let owner = layout
                .fields
                .iter()
                .chain(std::iter::once(&CHECKSUM_SLOT))
                .filter(|s| s.page == page)
                .find(|s| s.page_bits().is_ok_and(|r| r.contains(&bit)));
            map.push(owner.map_or('.', |s| field_key(&fields, s.field)));
            if bit % 8 == 0 && bit != 0 {
                map.push(' ');
            }
        }
        println!("  {page}: {map}");
    }
    Ok(())
}

/// Single-character key for the bit map: fields in table order, then `#` for
/// the checksum.
fn field_key(fields: &[Field], field: Field) -> char {
    const KEYS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if field == Field::Checksum {
        return '#';
    }
    fields
        .iter()
        .position(|f| *f == field)
        .and_then(|i| KEYS.get(i))
        .map_or('?', |&k| k as char)
}

fn cmd_crc(hex_input: &str, engine: Engine, params_path: Option<&Path>) -> Result<()> {
    let cleaned: String = hex_input.chars().filter(|c| !c.is_whitespace()).collect();
    let data = hex::decode(cleaned.trim_start_matches("0x"))
        .with_context(|| format!("invalid hex input '{hex_input}'"))?;

    let custom = match params_path {
        Some(path) => {
            anyhow::ensure!(
                engine == Engine::Table,
                "--params only applies to the table engine"
            );
            Some(load_crc_params(path)?)
        }
        None => None,
    };
    let table = custom.as_ref().unwrap_or_else(|| Crc30::cdma());
    let digits = table.params().order.div_ceil(4) as usize;
    debug!(bytes = data.len(), params = ?table.params(), "computing crc");

    let table_value = table.checksum(&data);
    let bytewise_value = crc30_cdma(&data);
    match engine {
        Engine::Table => println!("table:    0x{table_value:0digits$x}"),
        Engine::Bytewise => println!("bytewise: 0x{bytewise_value:0digits$x}"),
        Engine::Both => {
            println!("table:    0x{table_value:0digits$x}");
            println!("bytewise: 0x{bytewise_value:0digits$x}");
            anyhow::ensure!(
                table_value == bytewise_value,
                "engines disagree on {} bytes",
                data.len()
            );
        }
    }
    Ok(())
}

/// Load and validate a CRC parameter table.
fn load_crc_params(path: &Path) -> Result<Crc30> {
    let toml_str =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let params: CrcParams =
        toml::from_str(&toml_str).with_context(|| format!("parsing {}", path.display()))?;
    Crc30::new(params).with_context(|| format!("invalid CRC parameters in {}", path.display()))
}

fn cmd_verify() -> Result<()> {
    let encoder = TagEncoder::new().context("building tag encoder")?;
    let vectors = reference_vectors();
    let mut failures = 0;

    for v in &vectors {
        let tag = encoder
            .encode(&v.record)
            .with_context(|| format!("encoding {}", v.name))?;
        let window_crc = crc30_cdma(&checksum_window(&tag.page_x, &clear_checksum(&tag.page_y)));

        if v.matches(&tag) && encoder.check(&tag) && window_crc == v.checksum {
            println!("PASS: {:<24} {} {}", v.name, v.kind(), tag.checksum_hex());
        } else {
            failures += 1;
            println!(
                "FAIL: {:<24} {}\n  expected {} {} {:08x}\n  got      {} {} {}",
                v.name,
                v.record.kind(),
                hex::encode(v.page_x),
                hex::encode(v.page_y),
                v.checksum,
                tag.page_x_hex(),
                tag.page_y_hex(),
                tag.checksum_hex(),
            );
        }
    }

    anyhow::ensure!(
        failures == 0,
        "{failures} of {} reference vectors failed",
        vectors.len()
    );
    println!("All {} reference vectors match.", vectors.len());
    Ok(())
}
