pub mod collation;
pub mod document;
pub mod email;
pub mod query;
