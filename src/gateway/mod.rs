//! Capabilities consumed by the dispatchers: launching workers and listing artifacts

pub mod ecs;
pub mod launch;
pub mod listing;
pub mod s3;

pub use ecs::EcsLaunchGateway;
pub use launch::{DryRunLaunchGateway, LaunchAck, LaunchGateway};
pub use listing::{ListingPage, ObjectListing};
pub use s3::S3ObjectListing;

#[cfg(test)]
pub(crate) mod fakes;
