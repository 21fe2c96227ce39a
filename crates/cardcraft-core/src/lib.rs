//! Core types and trait definitions for cardcraft.
//!
//! This crate is free of HTTP and database dependencies. The vCard codec, the
//! store backends and the API all depend on it.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures instead.
#![allow(async_fn_in_trait)]

pub mod card;
pub mod error;
pub mod event;
pub mod record;
pub mod shortcode;
pub mod store;

pub use error::{Error, Result};
