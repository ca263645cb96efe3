pub mod cascade;
pub mod common;
pub mod complete;
pub mod context;
pub mod status;
pub mod transition;
pub mod validate;
