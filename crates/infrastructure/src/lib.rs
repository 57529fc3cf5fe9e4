//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_activity_repository;
mod in_memory_activity_repository;

pub use http_activity_repository::{
    ActivityActorReference, ActivityActorResponse, ActivityDetailsResponse, ActivityEntryResponse,
    ActivityListResponse, HttpActivityRepository,
};
pub use in_memory_activity_repository::InMemoryActivityRepository;
