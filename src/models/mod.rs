//! Domain models for ardoq-sync.
//!
//! # Core Concepts
//!
//! ## Local hierarchy
//!
//! - [`Node`]: A flat, kind-tagged record fetched from the architecture repository,
//!   with an open bag of descriptive attributes.
//! - [`Domain`], [`Initiative`], [`Epic`], [`Feature`], [`UserStory`]: The typed
//!   five-level tree reconstructed from a flat node list. Each level can only hold
//!   children of the next kind down, so the shape is checked by the compiler.
//!
//! ## Remote replicas
//!
//! - [`RemoteWorkItem`]: The identity issued by the work-tracking system for a created item.
//! - [`SyncedWorkItem`]: A created item correlated back to the local node it came from.
//! - [`SyncSummary`]: Per-run counts of attempted, created and failed items by kind.

mod node;
mod summary;
mod sync;
mod tree;
mod work_item;

pub use node::*;
pub use summary::*;
pub use sync::*;
pub use tree::*;
pub use work_item::*;
