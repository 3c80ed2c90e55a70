//! Commit types and the commit record written for each published category.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::data::Category;
use crate::git::Version;

/// Semantic commit type used as the subject prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    /// New content.
    Feat,
    /// Correction of previously published content.
    Fix,
    /// Documentation-only change.
    Docs,
    /// Restructuring without new content.
    Refactor,
    /// Housekeeping.
    Chore,
    /// Rendered visualizations.
    Viz,
    /// Exploratory analysis.
    Explore,
    /// Model training work.
    Model,
    /// Model evaluation work.
    Eval,
}

impl CommitType {
    /// All commit types accepted from the operator.
    pub const ALL: [Self; 9] = [
        Self::Feat,
        Self::Fix,
        Self::Docs,
        Self::Refactor,
        Self::Chore,
        Self::Viz,
        Self::Explore,
        Self::Model,
        Self::Eval,
    ];

    /// Returns the conventional prefix string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Docs => "docs",
            Self::Refactor => "refactor",
            Self::Chore => "chore",
            Self::Viz => "viz",
            Self::Explore => "explore",
            Self::Model => "model",
            Self::Eval => "eval",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                anyhow::anyhow!("Unknown commit type '{}'. Expected one of: {}", s, known.join(", "))
            })
    }
}

/// Everything recorded about one category publish.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRecord {
    /// Semantic commit type.
    pub commit_type: CommitType,
    /// One-line summary.
    pub summary: String,
    /// Published category.
    pub category: Category,
    /// Version tag assigned to the publish.
    pub version: Version,
    /// When the publish happened.
    pub timestamp: DateTime<FixedOffset>,
    /// Base names of the published artifacts.
    pub artifacts: Vec<String>,
}

impl CommitRecord {
    /// Subject line: `type(category): summary`.
    pub fn subject(&self) -> String {
        format!("{}({}): {}", self.commit_type, self.category, self.summary)
    }

    /// Full commit message body.
    pub fn message(&self) -> String {
        let mut message = self.subject();
        message.push_str("\n\n");
        message.push_str(&format!("Category: {}\n", self.category));
        message.push_str(&format!("Version: {}\n", self.version));
        message.push_str(&format!("Published: {}\n", self.timestamp.to_rfc3339()));
        message.push_str("Artifacts:\n");
        for name in &self.artifacts {
            message.push_str(&format!("- {name}\n"));
        }
        message
    }

    /// Annotation stored on the version tag.
    pub fn tag_message(&self) -> String {
        format!("Publish {} ({})", self.version, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn record() -> CommitRecord {
        let offset = FixedOffset::east_opt(0).unwrap();
        CommitRecord {
            commit_type: CommitType::Viz,
            summary: "publish 2 results visualizations".to_string(),
            category: Category::ResultsVisualization,
            version: Version::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), 2),
            timestamp: offset.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
            artifacts: vec!["sales_dashboard".to_string(), "forecast".to_string()],
        }
    }

    #[test]
    fn commit_message_layout() {
        insta::assert_snapshot!(record().message().trim_end(), @r"
        viz(results_visualization): publish 2 results visualizations

        Category: results_visualization
        Version: v2024-03-09.2
        Published: 2024-03-09T14:05:00+00:00
        Artifacts:
        - sales_dashboard
        - forecast
        ");
    }

    #[test]
    fn tag_message_names_version_and_category() {
        assert_eq!(
            record().tag_message(),
            "Publish v2024-03-09.2 (results_visualization)"
        );
    }

    #[test]
    fn commit_type_parsing_is_case_insensitive() {
        assert_eq!("VIZ".parse::<CommitType>().unwrap(), CommitType::Viz);
        assert_eq!(" eval ".parse::<CommitType>().unwrap(), CommitType::Eval);
        assert!("style".parse::<CommitType>().is_err());
    }
}
