pub mod models;
pub mod parse;
pub mod paths;
