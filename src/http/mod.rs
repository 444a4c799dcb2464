//! Route composition for the HTTP surface.

pub mod routes;

pub use routes::RouteModule;
