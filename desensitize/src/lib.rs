//! Declarative masking of sensitive strings across in-memory object graphs.
//!
//! Annotate types with `#[derive(Desensitize)]` and `#[sensitive(...)]`, then
//! hand any value to [`acquire_or_original`]. The engine walks the value,
//! classifies everything it reaches into a [`Node`], and masks string leaves
//! according to per-attribute rules:
//!
//! - `#[sensitive]` on a type marks its attributes as subject to masking.
//! - `#[sensitive(Email)]` masks a string, or every string of a container.
//! - `#[sensitive(map(keys = [..], strategies = [..]))]` masks map values by key.
//! - `#[sensitive(flex(keys = [..], target = "..", strategies = [..]))]` picks
//!   the strategy for a sibling attribute from this attribute's value.
//! - `#[sensitive(null)]` clears the attribute; primitives are never cleared.
//! - `#[sensitive(skip)]` leaves the attribute alone entirely.
//!
//! Unmarked types are opaque unless the caller names them as a
//! [`WrapperClass`] for one call.
//!
//! ```ignore
//! use desensitize::{acquire_or_original, Desensitize};
//!
//! #[derive(Clone, Desensitize)]
//! #[sensitive]
//! struct Login {
//!     #[sensitive(Username)]
//!     user: String,
//!     #[sensitive(Password)]
//!     password: String,
//! }
//!
//! let login = acquire_or_original(Login { user: "alice".into(), password: "pw".into() });
//! assert_eq!(login.user, "a****");
//! ```
//!
//! What this crate does not do:
//! - serialize or deserialize values
//! - load configuration or perform I/O (the optional `slog` integration only
//!   emits through a logger you supply)
//!
//! Masking algorithms live behind [`StrategyTable`]; [`DefaultStrategyTable`]
//! is the built-in one.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use desensitize_derive::Desensitize;

#[allow(unused_extern_crates)]
extern crate self as desensitize;

// Module declarations
mod descriptor;
mod engine;
mod error;
mod node;
mod policy;
mod strategy;
#[cfg(feature = "slog")]
pub mod slog;

// Re-exports
pub use descriptor::{
    AttributeDescriptor, AttributeRule, EntityDescriptor, Introspect, KeyedStrategies,
    WrapperClass,
};
pub use engine::{
    acquire, acquire_in_place, acquire_or_original, acquire_or_original_with, Desensitizable,
    Desensitizer, DEFAULT_MAX_DEPTH,
};
pub use error::DesensitizeError;
pub use node::{
    ArrayNode, CollectionNode, MapKey, MapNode, Node, SensitiveValue, VisitElement, VisitEntry,
    Walk,
};
pub use policy::{KeepConfig, TailConfig, TextPolicy, HIDDEN_PLACEHOLDER};
pub use strategy::{DefaultStrategyTable, MaskingStrategy, StrategyTable};
