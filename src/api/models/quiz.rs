//! Quiz question records.

use serde::{Deserialize, Serialize};

/// A quiz question. Options are stored comma-separated and split on the
/// way out, matching how content editors enter them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub question: String,
    pub options: String,
    pub correct_answer: String,
}

impl Quiz {
    pub fn options_list(&self) -> Vec<String> {
        self.options.split(',').map(|s| s.to_string()).collect()
    }
}
