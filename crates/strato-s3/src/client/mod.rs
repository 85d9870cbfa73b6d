//! Backend connection settings.
//!
//! This module provides the configuration of the backend connection:
//! endpoint resolution (host/port/protocol triple or verbatim URL string),
//! credentials with masking for logs, addressing style, and the health
//! check interval. The settings are immutable after service construction
//! and fully determine how the backend client is built.

mod s3_config;
mod s3_credentials;

pub use s3_config::S3Config;
pub use s3_credentials::S3Credentials;
