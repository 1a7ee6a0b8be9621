//! Creatorino avatar service
//!
//! Accepts base64 images from authenticated creators, stores a large and a small square
//! rendition in object storage and points the creator's profile at them.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

/// Avatar ingestion workflow
pub mod avatar;

/// Object storage for avatar renditions
pub mod avatar_storage;

/// Identity & Access service client
pub mod identity;

/// Base64 decoding and square renditions
pub mod image_processing;

/// HTTP middleware
pub mod middleware;

/// Profile store seam
pub mod profiles;

/// API routes
pub mod routes;

/// HTTP server
pub mod server;

/// Configuration and shared API types
pub mod types;
