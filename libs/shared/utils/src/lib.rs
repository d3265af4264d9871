pub mod capability;
pub mod extractor;
pub mod jwt;
