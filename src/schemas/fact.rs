use serde::Serialize;

use crate::core::time::format_offset;
use crate::db::models::Fact;

#[derive(Debug, Serialize)]
pub(crate) struct FactResponse {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) created_at: String,
}

impl From<Fact> for FactResponse {
    fn from(fact: Fact) -> Self {
        Self {
            id: fact.id.to_string(),
            text: fact.text,
            created_at: format_offset(fact.created_at),
        }
    }
}
