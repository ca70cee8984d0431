pub mod db;
pub mod error;
pub mod gemini;
pub mod matcher;
pub mod models;
pub mod service;
