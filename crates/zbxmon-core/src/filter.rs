// ── Problem visibility filtering ──
//
// One predicate shared by every surface. The foreground list and the
// cached widget view run the same two flags over the same records, so
// the two can never disagree about what is visible.

use serde::{Deserialize, Serialize};

use crate::model::Problem;

/// User filter preferences.
///
/// Both flags widen the view: `true` shows the matching problems,
/// `false` hides them. The default hides acknowledged and suppressed
/// problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFilter {
    pub show_acknowledged: bool,
    pub show_in_maintenance: bool,
}

impl ProblemFilter {
    /// The filter that hides nothing.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            show_acknowledged: true,
            show_in_maintenance: true,
        }
    }

    /// Whether `problem` passes this filter.
    #[must_use]
    pub fn visible(self, problem: &Problem) -> bool {
        (self.show_acknowledged || !problem.is_acknowledged())
            && (self.show_in_maintenance || !problem.is_suppressed())
    }

    /// The visible subset, preserving input order.
    #[must_use]
    pub fn apply<'a>(self, problems: &'a [Problem]) -> Vec<&'a Problem> {
        problems.iter().filter(|p| self.visible(p)).collect()
    }

    /// Total-vs-visible counts for a collection. The total always
    /// counts the unfiltered input.
    #[must_use]
    pub fn counts(self, problems: &[Problem]) -> FilterCounts {
        FilterCounts {
            total: problems.len(),
            visible: problems.iter().filter(|p| self.visible(p)).count(),
        }
    }
}

/// Count pair backing displays like `"3 of 7 problems"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCounts {
    pub total: usize,
    pub visible: usize,
}

impl FilterCounts {
    #[must_use]
    pub fn all_visible(self) -> bool {
        self.visible == self.total
    }
}

// ── Tests ───────────────────────────────────────────────────────────
