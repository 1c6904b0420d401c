pub(crate) mod errors;
pub(crate) mod grading;
pub(crate) mod question_source;
pub(crate) mod quiz;
pub(crate) mod results;
