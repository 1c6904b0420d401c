pub(crate) mod attempts;
pub(crate) mod facts;
pub(crate) mod health;
pub(crate) mod questions;
