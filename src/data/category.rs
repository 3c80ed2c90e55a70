//! Fixed category taxonomy for analysis artifacts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Workflow stage an artifact belongs to.
///
/// The set is closed. Paths that do not name one of these directories fall
/// into [`Category::DEFAULT`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Data exploration and feature engineering.
    ExploratoryAnalysis,
    /// Building and tuning forecasting models.
    ModelTraining,
    /// Model assessment and comparison.
    ModelEvaluation,
    /// Dashboards, charts and rendered reports.
    ResultsVisualization,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [
        Self::ExploratoryAnalysis,
        Self::ModelTraining,
        Self::ModelEvaluation,
        Self::ResultsVisualization,
    ];

    /// Category assigned to paths outside any known category directory.
    pub const DEFAULT: Self = Self::ExploratoryAnalysis;

    /// Returns the directory name used for this category.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::ExploratoryAnalysis => "exploratory_analysis",
            Self::ModelTraining => "model_training",
            Self::ModelEvaluation => "model_evaluation",
            Self::ResultsVisualization => "results_visualization",
        }
    }

    /// Looks up a category by its exact directory name.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }

    /// Classifies the first path segment below the staging root.
    ///
    /// Total: every input, including a missing segment, maps to a category.
    pub fn classify_segment(segment: Option<&str>) -> Self {
        match segment.and_then(Self::from_dir_name) {
            Some(category) => category,
            None => Self::DEFAULT,
        }
    }

    /// Heading used in generated documentation.
    pub const fn title(self) -> &'static str {
        match self {
            Self::ExploratoryAnalysis => "🧭 Exploratory Analysis",
            Self::ModelTraining => "🛠️ Model Training",
            Self::ModelEvaluation => "📊 Model Evaluation",
            Self::ResultsVisualization => "📈 Results Visualization",
        }
    }

    /// One-line description used in generated documentation.
    pub const fn description(self) -> &'static str {
        match self {
            Self::ExploratoryAnalysis => {
                "Initial data exploration and feature engineering using retail sales time series data."
            }
            Self::ModelTraining => {
                "Building and refining time series forecasting models using statistical and ML techniques."
            }
            Self::ModelEvaluation => {
                "Comprehensive model assessment using forecasting metrics and diagnostic analysis."
            }
            Self::ResultsVisualization => {
                "Interactive visualizations and dashboards for model results and business insights."
            }
        }
    }

    /// Objectives listed in the category README.
    pub const fn objectives(self) -> &'static [&'static str] {
        match self {
            Self::ExploratoryAnalysis => &[
                "Perform comprehensive data quality checks and profiling",
                "Identify temporal patterns, trends, and seasonality",
                "Engineer features for time series forecasting models",
            ],
            Self::ModelTraining => &[
                "Train Prophet and other forecasting models",
                "Optimize hyperparameters for best performance",
                "Implement cross-validation for time series data",
            ],
            Self::ModelEvaluation => &[
                "Compare models using MAPE, RMSE, and other forecasting metrics",
                "Analyze residuals and forecast accuracy patterns",
                "Select optimal model for production deployment",
            ],
            Self::ResultsVisualization => &[
                "Create interactive Plotly dashboards for stakeholders",
                "Visualize forecast results and confidence intervals",
                "Generate business-ready reports and presentations",
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dir_name(s.trim()).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|c| c.dir_name()).collect();
            anyhow::anyhow!("Unknown category '{}'. Expected one of: {}", s, known.join(", "))
        })
    }
}
