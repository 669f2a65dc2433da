//! Front-matter parsing

use chrono::{DateTime, Local, NaiveDateTime};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::Value;

use crate::error::LoadError;

/// Front-matter fields, in source order
pub type FrontMatter = IndexMap<String, Value>;

lazy_static! {
    /// `---` line, optional YAML block, `---` line, then the body
    static ref FRONT_MATTER_RE: Regex =
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z")
            .expect("front-matter pattern is valid");
}

/// A raw document split into front-matter and body
#[derive(Debug)]
pub struct ParsedDocument<'a> {
    pub front_matter: FrontMatter,
    pub body: &'a str,
    /// `InvalidFormat` when the delimiters are missing, `Deserialize` when the
    /// block was found but was not a YAML mapping
    pub error: Option<LoadError>,
}

impl<'a> ParsedDocument<'a> {
    /// Split `raw` into its front-matter block and body.
    ///
    /// Never fails outright: without delimiters the whole text is the body,
    /// and a malformed block becomes an empty mapping.
    pub fn parse(raw: &'a str) -> Self {
        let Some(captures) = FRONT_MATTER_RE.captures(raw) else {
            return Self {
                front_matter: FrontMatter::new(),
                body: raw,
                error: Some(LoadError::InvalidFormat),
            };
        };

        let block = captures.get(1).map_or("", |m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());

        match parse_yaml_mapping(block) {
            Ok(front_matter) => Self {
                front_matter,
                body,
                error: None,
            },
            Err(e) => {
                tracing::warn!("Failed to parse YAML front-matter, using empty: {}", e);
                Self {
                    front_matter: FrontMatter::new(),
                    body,
                    error: Some(LoadError::Deserialize(e)),
                }
            }
        }
    }

    /// True when the delimiters were found
    pub fn is_well_formed(&self) -> bool {
        !matches!(self.error, Some(LoadError::InvalidFormat))
    }
}

/// Deserialize a YAML document that must be a mapping (or empty)
pub fn parse_yaml_mapping(yaml: &str) -> Result<FrontMatter, String> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::new());
    }

    match serde_yaml::from_str::<Value>(yaml).map_err(|e| e.to_string())? {
        Value::Null => Ok(FrontMatter::new()),
        Value::Mapping(mapping) => Ok(mapping
            .into_iter()
            .filter_map(|(k, v)| key_to_string(k).map(|k| (k, v)))
            .collect()),
        other => Err(format!("expected a mapping, found {}", kind_of(&other))),
    }
}

/// Mapping keys are usually strings, but YAML allows numbers and booleans too
fn key_to_string(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Parse a date string in various formats
pub(crate) fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.and_local_timezone(Local).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0)?.and_local_timezone(Local).earliest();
        }
    }

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    None
}
