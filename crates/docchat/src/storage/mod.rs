//! Storage module for persistent data
//!
//! SQLite holds the extracted text; raw uploads go to a plain directory.

mod database;
mod uploads;

pub use database::DocumentDb;
pub use uploads::UploadDir;
