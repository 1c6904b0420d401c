use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsQuery {
    #[serde(default)]
    pub(crate) limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseItem {
    pub(crate) question: String,
    pub(crate) choice: String,
    pub(crate) correct: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) short_id: String,
    pub(crate) created_at: String,
    pub(crate) score: i32,
    pub(crate) total: i32,
    pub(crate) responses: Vec<ResponseItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultsResponse {
    pub(crate) attempts: Vec<AttemptResponse>,
    pub(crate) limit: i64,
}
