pub mod embedding;
pub mod job;
pub mod similarity;
pub mod user;
pub mod validation;
