//! Storage abstractions for service layer
//!
//! Contains the reusable file-backed map store that the catalog persists
//! through; anything that saves a small map as JSON lives here.

pub mod json_map_store;
