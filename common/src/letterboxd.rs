//! Letterboxd export reader
//!
//! Reads the CSV files produced by Letterboxd's data export (`diary.csv`,
//! `watched.csv`, `ratings.csv`) into [`ImportRow`]s. Column names vary
//! between files, so every field is looked up through a list of aliases.

use crate::error::{Error, Result};
use chrono::NaiveDate;

const TITLE_COLUMNS: &[&str] = &["Name", "Title"];
const YEAR_COLUMNS: &[&str] = &["Year"];
const URI_COLUMNS: &[&str] = &["Letterboxd URI", "Letterboxd URL", "Letterboxd Uri"];
const WATCHED_COLUMNS: &[&str] = &["Watched Date", "Date"];
const RATING_COLUMNS: &[&str] = &["Rating"];
const TAGS_COLUMNS: &[&str] = &["Tags"];
const REWATCH_COLUMNS: &[&str] = &["Rewatch"];

/// Accepted watched-date patterns, tried in order
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"];

/// Prefix of every external id minted by the importer
pub const EXTERNAL_ID_PREFIX: &str = "letterboxd:";

/// Longest external id the diary stores, in characters
pub const EXTERNAL_ID_MAX_LEN: usize = 128;

/// One parsed export row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRow {
    pub title: String,
    /// Release year (not the watched year)
    pub year: Option<i32>,
    /// `Year` column as written, used in fallback external ids
    pub year_text: String,
    pub uri: Option<String>,
    pub watched: Option<NaiveDate>,
    /// 1..=10 scale
    pub rating: Option<i32>,
    pub tags: Option<String>,
    pub rewatch: bool,
}

impl ImportRow {
    /// Build a row from a record. Rows without a title yield `None`.
    pub fn from_record(record: &ExportRecord<'_>) -> Option<Self> {
        let title = record.first_of(TITLE_COLUMNS).trim().to_string();
        if title.is_empty() {
            return None;
        }

        let year_text = record.first_of(YEAR_COLUMNS).trim().to_string();
        let uri = non_empty(record.first_of(URI_COLUMNS));
        let tags = non_empty(record.first_of(TAGS_COLUMNS));

        Some(Self {
            year: year_text.parse().ok(),
            year_text,
            uri,
            watched: parse_watched_date(record.first_of(WATCHED_COLUMNS)),
            rating: map_rating(record.first_of(RATING_COLUMNS)),
            tags,
            rewatch: is_rewatch(record.first_of(REWATCH_COLUMNS)),
            title,
        })
    }

    /// `letterboxd:{uri}`, or `letterboxd:{title}:{year}` when the export has no URI.
    ///
    /// The URI or title is cut so the id fits [`EXTERNAL_ID_MAX_LEN`]; the
    /// `:{year}` suffix is always kept.
    pub fn external_id(&self) -> String {
        let prefix_len = EXTERNAL_ID_PREFIX.chars().count();
        match &self.uri {
            Some(uri) => {
                let room = EXTERNAL_ID_MAX_LEN.saturating_sub(prefix_len);
                format!("{}{}", EXTERNAL_ID_PREFIX, truncate_chars(uri, room))
            }
            None => {
                let suffix = format!(":{}", self.year_text);
                let room = EXTERNAL_ID_MAX_LEN.saturating_sub(prefix_len + suffix.chars().count());
                format!("{}{}{}", EXTERNAL_ID_PREFIX, truncate_chars(&self.title, room), suffix)
            }
        }
    }

    /// Tags and the rewatch flag folded into a review line
    pub fn review(&self) -> Option<String> {
        let mut bits = Vec::new();
        if let Some(tags) = &self.tags {
            bits.push(format!("Tags: {}", tags));
        }
        if self.rewatch {
            bits.push("Rewatch".to_string());
        }

        if bits.is_empty() {
            None
        } else {
            Some(bits.join(" • "))
        }
    }
}

/// Parsed CSV export: header row plus data rows
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Data rows in file order
    pub fn records(&self) -> impl Iterator<Item = ExportRecord<'_>> {
        self.rows.iter().map(|values| ExportRecord {
            headers: &self.headers,
            values,
        })
    }
}

/// A data row viewed through the header row
#[derive(Debug, Clone, Copy)]
pub struct ExportRecord<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> ExportRecord<'a> {
    /// Value of the named column; missing trailing cells read as `None`.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.values.get(index).map(String::as_str)
    }

    /// First non-empty value among the aliases, or `""`
    pub fn first_of(&self, columns: &[&str]) -> &'a str {
        columns
            .iter()
            .filter_map(|c| self.get(c))
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }
}

/// Parse a whole export file.
///
/// The first record is the header row. A leading UTF-8 BOM is ignored.
pub fn parse_export(text: &str) -> Result<ExportTable> {
    let mut records = parse_csv(text).into_iter();
    let headers: Vec<String> = records
        .next()
        .ok_or_else(|| Error::Parse("export is empty: no header row".to_string()))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    if !headers.iter().any(|h| TITLE_COLUMNS.contains(&h.as_str())) {
        return Err(Error::Parse(format!(
            "no title column (expected one of {:?}), found {:?}",
            TITLE_COLUMNS, headers
        )));
    }

    Ok(ExportTable {
        headers,
        rows: records.collect(),
    })
}

/// Split CSV text into records.
///
/// Quoted fields may contain commas, newlines and doubled quotes (`""`).
/// Blank lines are skipped.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    // last line without a trailing newline
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push(record);
    }
}

/// Parse a watched date. The first matching pattern wins.
///
/// `"01/15/2023"`, `"01/15/23"` and `"2023-01-15"` all give 2023-01-15.
pub fn parse_watched_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS.iter().find_map(|format| {
        // %Y would otherwise accept "23" as the year 23
        if *format == "%m/%d/%Y" && value.rsplit('/').next().map(str::len) != Some(4) {
            return None;
        }
        NaiveDate::parse_from_str(value, format).ok()
    })
}

/// Map a 0.5–5.0 star rating to 1..=10.
///
/// Non-positive or unparseable values mean "no rating".
pub fn map_rating(value: &str) -> Option<i32> {
    let stars: f64 = value.trim().parse().ok()?;
    if !stars.is_finite() || stars <= 0.0 {
        return None;
    }
    Some((stars * 2.0).round_ties_even() as i32)
}

/// Any value starting with `y`/`Y` marks a rewatch
pub fn is_rewatch(value: &str) -> bool {
    value.trim().to_lowercase().starts_with('y')
}

/// Release year embedded at the end of a `letterboxd:{title}:{year}` id
pub fn year_from_external_id(external_id: &str) -> Option<i32> {
    if !external_id.starts_with(EXTERNAL_ID_PREFIX) {
        return None;
    }
    let last = external_id.rsplit(':').next()?;
    if last.is_empty() || !last.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    last.parse().ok()
}

fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
