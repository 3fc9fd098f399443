//! A compressed-prefix-tree (radix tree) URL route recognizer.
//!
//! Routes are plain byte strings that may contain parameter segments, written
//! `{name}`, and a single trailing catch-all segment, written `{*name}`. A literal
//! `{` or `}` is written doubled, `{{` / `}}`.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn core::error::Error>> {
//! use radix_router::Router;
//!
//! let mut router = Router::new();
//! router.insert("/home", "Welcome!")?;
//! router.insert("/users/{id}", "A user")?;
//! router.insert("/static/{*path}", "A static asset")?;
//!
//! let matched = router.at("/users/1")?;
//! assert_eq!(*matched.value, "A user");
//! assert_eq!(matched.params.get("id"), Some("1"));
//! # Ok(())
//! # }
//! ```
//!
//! # Parameters
//!
//! [`Router::at`] returns a [`Params`] list alongside the matched value. Looking a
//! name up returns the first binding registered under it; most routes bind each
//! name once, so this rarely matters in practice.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
mod escape;
mod params;
mod router;
mod tree;

pub use error::{InsertError, MatchError, MergeError};
pub use params::{Param, Params, ParamsIntoIter};
pub use router::{Match, Router};

pub use radix_router_unsafe::bytes::BytesStr;

use alloc::{string::String, vec::Vec};
