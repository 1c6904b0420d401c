pub(crate) mod errors;
pub(crate) mod facts;
pub(crate) mod handlers;
pub(crate) mod quiz;
pub(crate) mod results;
pub(crate) mod router;
