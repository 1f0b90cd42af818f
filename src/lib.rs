//! Ladle - A recipe sharing backend
//!
//! This library provides the core functionality for the Ladle recipe service.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
