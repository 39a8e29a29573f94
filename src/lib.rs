#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod cache;
mod core;
mod discovery;
mod error;
mod graph;
#[cfg(feature = "logging")]
pub mod logging;
mod manager;
mod registry;
mod report;
mod resolver;
mod resource;

pub use crate::cache::{Dependencies, ResourceCache};
pub use crate::core::{ArcStr, ResourceId};
pub use crate::discovery::{Discovery, METADATA_EXTENSION, discover};
pub use crate::error::*;
pub use crate::graph::{DependencyGraph, Node};
pub use crate::manager::{Config, Options, ResourceManager};
pub use crate::registry::Registry;
pub use crate::report::PassReport;
pub use crate::resolver::LoadMode;
pub use crate::resource::{ResourceDescriptor, TYPE_SEPARATOR};
