//! # PhotoSense Common Library
//!
//! Shared code for the PhotoSense web service including:
//! - Image metadata and collection types
//! - Smart-collection aggregation and selection
//! - Gallery filtering, search, and sorting
//! - User identity helpers
//! - Configuration loading

pub mod collections;
pub mod config;
pub mod error;
pub mod gallery;
pub mod model;
pub mod user;

pub use error::{Error, Result};
pub use model::{CollectionKind, CollectionSummary, ImageRecord};
