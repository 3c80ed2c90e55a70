//! Display formatting for publish results.

use crate::data::Category;
use crate::git::ORIGIN;
use crate::publish::{CategoryOutcome, OutcomeStatus, SessionReport};

/// Truncates a commit hash to [`SHORT_HASH_LEN`](crate::git::SHORT_HASH_LEN) characters.
pub(crate) fn truncate_hash(hash: &str) -> &str {
    let len = crate::git::SHORT_HASH_LEN;
    if hash.len() > len {
        &hash[..len]
    } else {
        hash
    }
}

/// Returns an emoji icon for an outcome.
pub(crate) const fn outcome_icon(outcome: &CategoryOutcome) -> &'static str {
    match outcome {
        CategoryOutcome::Skipped => "\u{23ed}\u{fe0f} ",
        _ => match outcome.status() {
            OutcomeStatus::Success => "\u{2705}",
            OutcomeStatus::Partial => "\u{26a0}\u{fe0f} ",
            OutcomeStatus::Failed => "\u{274c}",
        },
    }
}

/// Formats one category's outcome as a single summary line.
pub(crate) fn format_outcome(category: Category, outcome: &CategoryOutcome) -> String {
    let icon = outcome_icon(outcome);
    match outcome {
        CategoryOutcome::Published {
            version,
            commit,
            degraded,
        } => {
            let mut line = format!(
                "{icon} {category}: published {version} ({})",
                truncate_hash(commit)
            );
            if !degraded.is_empty() {
                line.push_str(&format!(" - not rendered: {}", degraded.join(", ")));
            }
            line
        }
        CategoryOutcome::Unchanged => format!("{icon} {category}: up to date"),
        CategoryOutcome::Skipped => format!("{icon} {category}: skipped"),
        CategoryOutcome::Partial {
            version,
            commit,
            reason,
        } => format!(
            "{icon} {category}: committed {} but tag {version} was not pushed ({reason}). \
             Push it with `git push {ORIGIN} {version}`",
            truncate_hash(commit)
        ),
        CategoryOutcome::Failed { stage, reason } => {
            format!("{icon} {category}: failed while {stage}: {reason}")
        }
        CategoryOutcome::NotAttempted => format!(
            "{icon} {category}: not attempted; an earlier category left an unpushed local commit"
        ),
    }
}

/// Formats the totals line printed after the per-category lines.
pub(crate) fn format_totals(report: &SessionReport) -> String {
    format!(
        "\u{1f4ca} {} succeeded, {} partial, {} failed",
        report.count(OutcomeStatus::Success),
        report.count(OutcomeStatus::Partial),
        report.count(OutcomeStatus::Failed)
    )
}
