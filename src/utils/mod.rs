//! Helpers shared by the providers: URL grammar and value parsing.

pub mod parse;
pub mod url;
