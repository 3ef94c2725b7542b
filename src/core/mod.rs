pub mod corpus;
pub mod document;
