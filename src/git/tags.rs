//! Date-based version tags.

use std::fmt;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::PublishError;
use crate::git::Vcs;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Publish version of the form `v<YYYY-MM-DD>.<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    date: NaiveDate,
    sequence: u32,
}

impl Version {
    /// Creates a version for `date` with the given 1-based sequence number.
    pub const fn new(date: NaiveDate, sequence: u32) -> Self {
        Self { date, sequence }
    }

    /// Calendar day of the version.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Tag glob that matches every version of `date`.
    pub fn tag_pattern(date: NaiveDate) -> String {
        format!("v{}.*", date.format(DATE_FORMAT))
    }

    /// Parses a tag name.
    ///
    /// Only canonical names are accepted: a zero-padded date and a positive
    /// sequence without leading zeros.
    pub fn parse(tag: &str) -> Option<Self> {
        let rest = tag.strip_prefix('v')?;
        let (date_part, sequence_part) = rest.split_once('.')?;

        if date_part.len() != 10 {
            return None;
        }
        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()?;

        if sequence_part.is_empty()
            || sequence_part.starts_with('0')
            || !sequence_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let sequence = sequence_part.parse().ok()?;

        Some(Self { date, sequence })
    }

    /// Returns the version that follows this one on the same day, or `None`
    /// when the sequence number would overflow.
    pub fn next(&self) -> Option<Self> {
        self.sequence.checked_add(1).map(|sequence| Self {
            date: self.date,
            sequence,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.date.format(DATE_FORMAT), self.sequence)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Allocates the next free version for `today`.
///
/// Tags are listed on every call so that a version tagged earlier in the
/// same session is observed. A listing failure is returned as-is; no version
/// is guessed.
pub fn allocate_version(vcs: &dyn Vcs, today: NaiveDate) -> Result<Version> {
    let pattern = Version::tag_pattern(today);
    let tags = vcs
        .list_tags(&pattern)
        .map_err(|e| PublishError::TagListing(format!("{e:#}")))?;

    let latest = tags
        .iter()
        .filter_map(|tag| {
            let parsed = Version::parse(tag).filter(|v| v.date() == today);
            if parsed.is_none() {
                debug!(tag = %tag, "Ignoring non-canonical version tag");
            }
            parsed
        })
        .max();

    let version = match latest {
        None => Version::new(today, 1),
        Some(latest) => latest
            .next()
            .ok_or_else(|| PublishError::VersionsExhausted(latest.to_string()))?,
    };
    debug!(%version, existing = tags.len(), "Allocated version");
    Ok(version)
}
