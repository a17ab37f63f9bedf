//! Business logic services for the application layer.

pub mod expiry_sweeper;
pub mod host_resolver;
pub mod shortener_service;

pub use expiry_sweeper::run_expiry_sweeper;
pub use host_resolver::HostResolver;
pub use shortener_service::{HealthReport, ServiceStats, ShortenedUrl, ShortenerService};
