//! Column resolution for subscriber exports with inconsistent headers.
//!
//! Each role owns a ranked list of acceptance rules. Rules are tried in
//! order, and within a rule headers are scanned left to right; the first
//! header accepted wins.

use serde::Serialize;

use crate::error::PipelineError;

/// What a column is needed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    Subscribers,
}

/// One way a header can qualify for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRule {
    /// Header equals this name exactly (after trimming).
    Exact(&'static str),
    /// Header contains any of these substrings, ignoring case.
    Contains(&'static [&'static str]),
}

const DATE_RULES: &[ColumnRule] = &[
    ColumnRule::Exact("Date"),
    ColumnRule::Contains(&["date", "time"]),
];

const SUBSCRIBER_RULES: &[ColumnRule] = &[
    ColumnRule::Exact("Subscribers"),
    ColumnRule::Contains(&["subscriber", "sub", "followers"]),
];

impl ColumnRole {
    #[must_use]
    pub fn rules(self) -> &'static [ColumnRule] {
        match self {
            ColumnRole::Date => DATE_RULES,
            ColumnRole::Subscribers => SUBSCRIBER_RULES,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ColumnRole::Date => "date column (a header containing 'date' or 'time')",
            ColumnRole::Subscribers => {
                "subscriber column (a header containing 'subscriber', 'sub' or 'followers')"
            }
        }
    }
}

impl ColumnRule {
    #[must_use]
    pub fn accepts(self, header: &str) -> bool {
        let header = header.trim();
        match self {
            ColumnRule::Exact(name) => header == name,
            ColumnRule::Contains(needles) => {
                let lower = header.to_lowercase();
                needles.iter().any(|needle| lower.contains(needle))
            }
        }
    }
}

/// A header chosen for a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub index: usize,
    pub name: String,
    pub rule: ColumnRule,
}

impl ResolvedColumn {
    /// `true` when the header matched the role's canonical name.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        matches!(self.rule, ColumnRule::Exact(_))
    }
}

/// The pair of columns a subscriber series is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesColumns {
    pub date: ResolvedColumn,
    pub value: ResolvedColumn,
}

/// Pick the column for `role`, never returning the index in `exclude`.
///
/// # Errors
///
/// Returns [`PipelineError::InputFormat`] listing the available headers if
/// no rule accepts any header.
pub fn resolve_column(
    headers: &[String],
    role: ColumnRole,
    exclude: Option<usize>,
) -> Result<ResolvedColumn, PipelineError> {
    role.rules()
        .iter()
        .find_map(|&rule| {
            headers
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != exclude)
                .find(|(_, header)| rule.accepts(header))
                .map(|(index, header)| ResolvedColumn {
                    index,
                    name: header.trim().to_string(),
                    rule,
                })
        })
        .ok_or_else(|| {
            PipelineError::InputFormat(format!(
                "no {} found; available columns: [{}]",
                role.describe(),
                headers.join(", ")
            ))
        })
}

/// Resolve both the date and subscriber columns of a series header.
///
/// # Errors
///
/// Returns [`PipelineError::InputFormat`] if either role has no candidate.
pub fn resolve_series_columns(headers: &[String]) -> Result<SeriesColumns, PipelineError> {
    let date = resolve_column(headers, ColumnRole::Date, None)?;
    let value = resolve_column(headers, ColumnRole::Subscribers, Some(date.index))?;

    if date.is_canonical() && value.is_canonical() {
        tracing::debug!("subscriber series uses canonical column names");
    } else {
        tracing::info!(
            date_column = %date.name,
            value_column = %value.name,
            "resolved subscriber columns by name heuristics"
        );
    }

    Ok(SeriesColumns { date, value })
}
