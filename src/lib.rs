//! Replicates an Ardoq Domain → Initiative → Epic → Feature → User Story
//! hierarchy into Azure DevOps work items.
//!
//! - [`hierarchy`] rebuilds the typed tree from a flat node list.
//! - [`sync`] walks that tree, creating remote items and streaming progress
//!   through a [`progress::ProgressSink`].
//! - [`api`] exposes both over HTTP, with sync progress as server-sent events.

pub mod api;
pub mod ardoq;
pub mod config;
pub mod devops;
pub mod hierarchy;
pub mod models;
pub mod progress;
pub mod sync;
pub mod tree_render;
