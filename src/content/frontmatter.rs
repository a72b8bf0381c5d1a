//! Frontmatter parsing for content documents.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::ContentError;

const FENCE: &str = "---";

/// Metadata block at the top of a content file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Display title
    pub title: String,

    /// Publication date
    #[serde(alias = "publishedAt", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,

    /// Last significant edit
    #[serde(
        default,
        alias = "updatedAt",
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<NaiveDate>,

    /// One-line summary for listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Cover image (local path or Unsplash URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Drafts are hidden from listings
    #[serde(default)]
    pub draft: bool,

    /// Any keys not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Split a document into its frontmatter and body.
///
/// The first line must be `---`; the block runs until the next line that is
/// exactly `---`. A leading BOM and CRLF line endings are tolerated. A single
/// blank line directly after the closing fence is dropped from the body.
pub fn parse_document(raw: &str) -> Result<(Frontmatter, String), ContentError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = raw.split_inclusive('\n');

    let first = lines.next().ok_or(ContentError::MissingFrontmatter)?;
    if first.trim_end() != FENCE {
        return Err(ContentError::MissingFrontmatter);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;

    for line in lines {
        if line.trim_end() == FENCE {
            let yaml = &raw[yaml_start..offset];
            let body = &raw[offset + line.len()..];
            let body = body
                .strip_prefix("\r\n")
                .or_else(|| body.strip_prefix('\n'))
                .unwrap_or(body);

            let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;
            return Ok((frontmatter, body.to_string()));
        }
        offset += line.len();
    }

    Err(ContentError::UnterminatedFrontmatter)
}

/// Parse `YYYY-MM-DD`, RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS` timestamp
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s)))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
        None => Ok(None),
    }
}
