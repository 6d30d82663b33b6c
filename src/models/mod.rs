pub mod common;
pub mod matching;
pub mod profile;
pub mod slot;
