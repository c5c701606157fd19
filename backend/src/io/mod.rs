//! # IO Module
//!
//! Interface layer between HTTP clients and the farm domain.
//!
//! Handlers translate JSON requests into [`FarmService`](crate::domain::FarmService)
//! calls and map [`FarmError`](crate::domain::FarmError) values to status codes.
//! No business rule lives here.
//!
//! ## Status Mapping
//!
//! - **400**: form validation failure (with per-field flags) or an empty date filter
//! - **401**: no user signed in
//! - **404**: unknown record id
//! - **409**: lot still referenced by cattle (with the head count)
//! - **202**: lot deletion that still needs confirmation
//! - **500**: storage failure while loading a session

pub mod rest;

pub use rest::api_router;
