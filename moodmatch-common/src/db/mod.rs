//! Database creation shared by the moodmatch crates

pub mod init;

pub use init::*;
