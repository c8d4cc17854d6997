//! Integration tests for the notes tree store

mod common;
mod external_store;
mod forest_properties;
mod internal_store;
mod persistence;
