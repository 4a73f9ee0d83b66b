/// Report generation: terminal and JSON output for encoded tag sheets.
use railtag::types::PageBytes;
use railtag::{EncodedTag, TagKind};

/// Bytes kept when trailing zero bytes are trimmed from a page.
const COMPACT_FLOOR: usize = 6;

/// Outcome for a single tag column.
#[derive(Debug, serde::Serialize)]
pub struct TagReport {
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TagKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TagReport {
    pub fn encoded(column: &str, unique_id: u32, tag: &EncodedTag, full_pages: bool) -> Self {
        Self {
            column: column.to_string(),
            kind: Some(tag.kind),
            unique_id: Some(unique_id),
            page_x: Some(render_page(tag.kind, &tag.page_x, full_pages)),
            page_y: Some(render_page(tag.kind, &tag.page_y, full_pages)),
            checksum: Some(tag.checksum_hex()),
            error: None,
        }
    }

    pub fn failed(column: &str, kind: Option<TagKind>, error: impl ToString) -> Self {
        Self {
            column: column.to_string(),
            kind,
            unique_id: None,
            page_x: None,
            page_y: None,
            checksum: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Full report across a sheet.
#[derive(Debug, serde::Serialize)]
pub struct FullReport {
    pub tags: Vec<TagReport>,
    pub total: usize,
    pub encoded: usize,
    pub failed: usize,
}

impl FullReport {
    pub fn from_tags(tags: Vec<TagReport>) -> Self {
        let total = tags.len();
        let encoded = tags.iter().filter(|t| t.is_ok()).count();
        Self {
            tags,
            total,
            encoded,
            failed: total - encoded,
        }
    }

    pub fn all_encoded(&self) -> bool {
        self.failed == 0
    }
}

/// Lowercase hex with trailing `00` bytes dropped, keeping at least six bytes.
pub fn compact_hex(page: &PageBytes) -> String {
    let used = page
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |i| i + 1)
        .max(COMPACT_FLOOR);
    hex::encode(&page[..used])
}

/// NT and AdjT pages are compacted unless `full_pages`; AlineT pages never are.
pub fn render_page(kind: TagKind, page: &PageBytes, full_pages: bool) -> String {
    if full_pages || kind == TagKind::Aline {
        hex::encode(page)
    } else {
        compact_hex(page)
    }
}

/// Print a terminal table of encoded tags.
pub fn print_terminal(report: &FullReport) {
    println!(
        "{:<12} {:<7} {:>6} {:<17} {:<17} {:<8}",
        "Column", "Kind", "UID", "Page X", "Page Y", "CRC"
    );
    println!("{}", "-".repeat(72));

    for t in &report.tags {
        let kind = t.kind.map(|k| k.name()).unwrap_or("?");
        match &t.error {
            None => println!(
                "{:<12} {:<7} {:>6} {:<17} {:<17} {:<8}",
                truncate(&t.column, 12),
                kind,
                t.unique_id.unwrap_or_default(),
                t.page_x.as_deref().unwrap_or_default(),
                t.page_y.as_deref().unwrap_or_default(),
                t.checksum.as_deref().unwrap_or_default(),
            ),
            Some(err) => println!("{:<12} {:<7} FAILED: {}", truncate(&t.column, 12), kind, err),
        }
    }

    println!("{}", "-".repeat(72));
    println!(
        "Total: {} | Encoded: {} | Failed: {}",
        report.total, report.encoded, report.failed
    );
}

pub fn to_json(report: &FullReport, pretty: bool) -> String {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    json.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
