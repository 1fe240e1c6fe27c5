//! Data transfer objects for the HTTP surface.

pub mod request;
pub mod response;
