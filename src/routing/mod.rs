//! Routing module
//!
//! Provides path pattern matching and method-aware route table lookup.

mod matcher;

pub use matcher::{match_route, Route, RouteMatch};
