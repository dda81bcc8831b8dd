//! Client code for marquee.
//!
//! This crate provides the catalog HTTP transport, the caching gateway on top
//! of it, and the controllers views use to page through lists, search, and
//! show a single record.

pub mod controller;
pub mod gateway;
pub mod http;

pub use controller::{
    DebouncedSearchController, DetailController, DetailState, InFlightToken, ListState, PaginatedListController,
    RequestSlot,
};
pub use gateway::{CachedResponse, Catalog, CatalogGateway, GatewayCache, ImageUrls};
pub use http::{HttpClient, HttpConfig};
