use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::ColumnMap;

/// Maps one raw row onto the canonical field set.
///
/// Header cells are trimmed and matched exactly against the column map;
/// unmapped columns are dropped here rather than threaded through. Textual
/// values are trimmed, and an absent or blank cell becomes an explicit
/// `None` so downstream code never conflates "empty" with "unset". Values
/// in date-bearing columns are converted to canonical form, or `None` when
/// they do not describe a real date.
pub fn normalize_row(
    header: &[String],
    row: &[String],
    map: &ColumnMap,
) -> BTreeMap<String, Option<String>> {
    let mut fields = BTreeMap::new();

    for (index, column) in header.iter().enumerate() {
        let Some(field) = map.field_for(column.trim()) else {
            continue;
        };

        let cell = row
            .get(index)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty());

        let value = if map.is_date_field(field) {
            cell.and_then(parse_sheet_date)
        } else {
            cell.map(str::to_string)
        };

        fields.insert(field.to_string(), value);
    }

    fields
}

/// Converts a source-formatted `M/D/YY` or `M/D/YYYY` date to `YYYY-MM-DD`.
///
/// Two-digit years are read as `2000 + YY`. Anything else, including dates
/// that do not exist on the calendar, yields `None` — downstream consumers
/// treat that as "unknown", never as a default date.
pub fn parse_sheet_date(raw: &str) -> Option<String> {
    let mut parts = raw.trim().splitn(3, '/');
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let year_text = parts.next()?.trim();
    let year: u32 = year_text.parse().ok()?;

    let year = match year_text.len() {
        2 => 2000 + year,
        4 => year,
        _ => return None,
    };

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    Some(date.format("%Y-%m-%d").to_string())
}
