//! Service layer
//!
//! Business logic shared by the HTTP handlers and the CLI. Every service gets
//! its collaborators through its constructor.

mod analytics_service;
pub mod code_generator;
pub mod geoip;
mod link_service;
mod resolver;

pub use analytics_service::{AnalyticsService, LinkStats};
pub use code_generator::{ALPHABET, generate_code};
pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider, Location};
pub use link_service::{CreateLinkRequest, LinkService};
pub use resolver::{LinkResolver, ResolvedLink};
