use std::collections::BTreeSet;

use tracing::{debug, info};

/// Best-effort problems met while walking axioms. None of them stop a run;
/// they are summarized once it ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Textual forms of expressions and axioms no rule consumed.
    pub unhandled: BTreeSet<String>,
    /// Subclass axioms where the term was not the atomic subclass side.
    pub direction_mismatches: usize,
    /// Equivalence statements whose other side was not an intersection.
    pub missing_intersections: usize,
    /// Existential restrictions skipped on foreign terms.
    pub skipped_restrictions: usize,
}

impl Diagnostics {
    pub fn unhandled(&mut self, description: impl ToString) {
        self.unhandled.insert(description.to_string());
    }

    pub fn merge(&mut self, other: Self) {
        self.unhandled.extend(other.unhandled);
        self.direction_mismatches += other.direction_mismatches;
        self.missing_intersections += other.missing_intersections;
        self.skipped_restrictions += other.skipped_restrictions;
    }

    /// Logs the counts at info level and each unhandled shape at debug level.
    pub fn summarize(&self) {
        info!(
            unhandled = self.unhandled.len(),
            direction_mismatches = self.direction_mismatches,
            missing_intersections = self.missing_intersections,
            skipped_restrictions = self.skipped_restrictions,
            "axiom diagnostics"
        );
        for description in &self.unhandled {
            debug!(expression = %description, "unhandled expression");
        }
    }
}
