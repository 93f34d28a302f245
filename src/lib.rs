//! hash-configure - build configuration generator for the hash C library
//!
//! This crate turns a set of command-line options (build mode, toolchain
//! overrides, feature toggles) into a `build.ninja` file consumed by the
//! ninja build executor. It never compiles anything itself: resolution
//! produces a consistent set of toolchain variables and flags, the target
//! registry decides which outputs get build edges, and the emitter writes
//! the graph in a single pass.

pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod generate;
pub mod ninja;
pub mod resolve;
pub mod targets;

pub use config::{BuildMode, Options};
pub use diagnostic::{Advisory, InvalidOptionError};
pub use generate::{generate, GenerateMeta};
pub use resolve::{resolve, BuildConfig};
pub use targets::{resolve_targets, ResolvedTarget, TargetSet};
