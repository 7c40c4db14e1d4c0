//! Data quality issues collected during shaping.
//!
//! Issues are reported, never fatal: the offending rows stay in the derived
//! tables so the final report gives full visibility instead of silently
//! shrinking the output.

use std::fmt;

use serde::Serialize;

/// A single observed data quality problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// A recipe or review references an author id with no resolvable name.
    UnresolvedAuthor { author_id: i64, relation: String },
    /// Alignment produced an ingredient name with no dimension match.
    UnresolvedIngredient { recipe_id: i64, name: String },
    /// A review was modified before it was submitted.
    ReviewDatesOutOfOrder { review_id: i64 },
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedAuthor {
                author_id,
                relation,
            } => write!(f, "{relation}: author {author_id} has no resolved name"),
            Self::UnresolvedIngredient { recipe_id, name } => {
                write!(f, "recipe {recipe_id}: ingredient {name:?} not in dimension")
            }
            Self::ReviewDatesOutOfOrder { review_id } => {
                write!(f, "review {review_id}: modified before submitted")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_display_names_the_offending_row() {
        let issue = DataQualityIssue::UnresolvedAuthor {
            author_id: 42,
            relation: "recipes".to_string(),
        };
        assert_eq!(issue.to_string(), "recipes: author 42 has no resolved name");
    }

    #[test]
    fn issue_serializes_with_kind_tag() {
        let issue = DataQualityIssue::UnresolvedIngredient {
            recipe_id: 7,
            name: "saffron".to_string(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "unresolved_ingredient");
        assert_eq!(json["recipe_id"], 7);
    }
}
