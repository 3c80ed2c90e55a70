//! Suggested commit type and summary for a category publish.

use crate::data::{Artifact, ArtifactKind, Category, CommitType};

/// Advisory commit type and summary. The operator may override both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Suggested commit type.
    pub commit_type: CommitType,
    /// Suggested one-line summary.
    pub summary: String,
}

/// Suggests a commit type and summary from the category and its artifacts.
pub fn classify(category: Category, artifacts: &[Artifact]) -> Suggestion {
    Suggestion {
        commit_type: suggested_type(category, artifacts),
        summary: default_summary(category, artifacts.len()),
    }
}

fn suggested_type(category: Category, artifacts: &[Artifact]) -> CommitType {
    match category {
        Category::ExploratoryAnalysis => CommitType::Explore,
        Category::ModelTraining => CommitType::Model,
        Category::ModelEvaluation => CommitType::Eval,
        Category::ResultsVisualization => {
            if artifacts
                .iter()
                .any(|a| a.kind == ArtifactKind::RenderedOutput)
            {
                CommitType::Viz
            } else {
                CommitType::Feat
            }
        }
    }
}

fn default_summary(category: Category, count: usize) -> String {
    let (verb, singular, plural) = match category {
        Category::ExploratoryAnalysis => (
            "add",
            "exploratory analysis notebook",
            "exploratory analysis notebooks",
        ),
        Category::ModelTraining => ("add", "model training notebook", "model training notebooks"),
        Category::ModelEvaluation => ("add", "model evaluation report", "model evaluation reports"),
        Category::ResultsVisualization => (
            "publish",
            "results visualization",
            "results visualizations",
        ),
    };

    if count == 1 {
        format!("{verb} {singular}")
    } else {
        format!("{verb} {count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn artifact(relative: &str, kind: ArtifactKind) -> Artifact {
        let root = Path::new("/stage");
        Artifact::new(root, &root.join(relative), kind).unwrap()
    }

    #[test]
    fn visualization_with_rendered_output_is_viz() {
        let artifacts = vec![
            artifact("results_visualization/a.ipynb", ArtifactKind::Document),
            artifact("results_visualization/a.html", ArtifactKind::RenderedOutput),
        ];
        let suggestion = classify(Category::ResultsVisualization, &artifacts);
        assert_eq!(suggestion.commit_type, CommitType::Viz);
        assert_eq!(suggestion.summary, "publish 2 results visualizations");
    }

    #[test]
    fn visualization_with_only_documents_is_feat() {
        let artifacts = vec![artifact(
            "results_visualization/a.ipynb",
            ArtifactKind::Document,
        )];
        let suggestion = classify(Category::ResultsVisualization, &artifacts);
        assert_eq!(suggestion.commit_type, CommitType::Feat);
        assert_eq!(suggestion.summary, "publish results visualization");
    }

    #[test]
    fn other_categories_follow_the_table() {
        let one = vec![artifact("x.ipynb", ArtifactKind::Document)];
        assert_eq!(
            classify(Category::ExploratoryAnalysis, &one),
            Suggestion {
                commit_type: CommitType::Explore,
                summary: "add exploratory analysis notebook".to_string(),
            }
        );
        assert_eq!(classify(Category::ModelTraining, &one).commit_type, CommitType::Model);

        let three = vec![one[0].clone(), one[0].clone(), one[0].clone()];
        assert_eq!(
            classify(Category::ModelEvaluation, &three),
            Suggestion {
                commit_type: CommitType::Eval,
                summary: "add 3 model evaluation reports".to_string(),
            }
        );
    }
}
