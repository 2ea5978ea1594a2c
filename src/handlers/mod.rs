// HTTP request handlers for the file-serving API

pub mod files;
pub mod health;
