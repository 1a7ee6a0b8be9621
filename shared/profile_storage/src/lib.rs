//! Profile storage for Creatorino
//!
//! This crate provides the `DynamoDB` backed profile table shared by the services
//! that read or mutate user profiles.

pub mod profile;

pub use profile::{Profile, ProfileAttribute, ProfileStorage, ProfileStorageError, ProfileStorageResult};
