use std::sync::OnceLock;

use regex::Regex;

use crate::model::LineItem;

fn line_item_re() -> &'static Regex {
    static LINE_ITEM_RE: OnceLock<Regex> = OnceLock::new();
    LINE_ITEM_RE.get_or_init(|| {
        Regex::new(r"(?i)^qty:\s*([0-9]*\.?[0-9]+)\s*-\s*(.+)$").expect("valid line item regex")
    })
}

/// Lazily extracts line items from a `labor_to_do` field, one per line.
///
/// Each line is trimmed and must follow the `Qty: <number> - <description>`
/// shape (the `Qty` token is case-insensitive). Blank lines and lines not
/// matching the shape produce no item: legacy and malformed lines are
/// silently dropped rather than reported as errors. The iterator borrows the
/// input and can be rebuilt to restart.
pub fn line_items(labor_to_do: &str) -> impl Iterator<Item = LineItem> + '_ {
    labor_to_do
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
}

/// Collects the extracted items into the order they appear in the text.
pub fn extract_line_items(labor_to_do: &str) -> Vec<LineItem> {
    line_items(labor_to_do).collect()
}

fn parse_line(line: &str) -> Option<LineItem> {
    let captures = line_item_re().captures(line)?;
    let quantity: f64 = captures.get(1)?.as_str().parse().ok()?;
    let description = captures.get(2)?.as_str().trim();
    if description.is_empty() {
        return None;
    }
    Some(LineItem {
        quantity,
        description: description.to_string(),
    })
}
