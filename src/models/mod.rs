pub mod posting;
pub mod query;
