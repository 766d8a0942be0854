use tracing::debug;

use crate::table::Table;

/// Password check guarding one column. Plain string equality; it hides data
/// from casual viewers and nothing more.
#[derive(Debug, Clone)]
pub struct AccessGate {
    secret: String,
    column: String,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            column: column.into(),
        }
    }

    pub fn check(&self, candidate: &str) -> bool {
        candidate == self.secret
    }

    /// The table to display: unchanged when `candidate` matches, otherwise
    /// without the restricted column.
    pub fn view(&self, table: &Table, candidate: Option<&str>) -> Table {
        let unlocked = candidate.is_some_and(|c| self.check(c));
        debug!(column = %self.column, unlocked, "restricted column");
        if unlocked {
            table.clone()
        } else {
            table.without_column(&self.column)
        }
    }
}
