//! Object storage service facade.
//!
//! [`S3Service`] owns a configured backend, a recurring reachability probe
//! and the bucket/object actions exposed to callers. Construction only
//! validates configuration; [`S3Service::start`] performs the first
//! reachability check and arms the probe.

mod health;
mod listing;
#[cfg(test)]
mod mock;
mod s3_service;

pub use health::DEFAULT_PING_TIMEOUT;
pub use s3_service::{DEFAULT_PRESIGNED_EXPIRES, S3Service};
