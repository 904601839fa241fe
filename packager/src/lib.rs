//! Plugin release packager library.
//!
//! This crate provides the core functionality for turning a plugin source
//! checkout into a release: version discovery, the external build, release
//! tree assembly, metadata stamping and optional archiving. It is used by the
//! `make-release` CLI binary and can be consumed programmatically for testing
//! or custom release workflows.
//!
//! # Modules
//!
//! - [`assembler`] - Release tree cleanup and assembly
//! - [`builder`] - External build invocation and artifact checks
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - TOML release configuration and path resolution
//! - [`error`] - Semantic error types and exit codes
//! - [`executor`] - External command execution seam
//! - [`naming`] - Release and archive naming
//! - [`output`] - Operator-facing progress lines
//! - [`packaging`] - Archive creation and the archiver implementations
//! - [`pipeline`] - Stage orchestration and dry-run plan
//! - [`stamper`] - Version stamping of the metadata file
//! - [`structure`] - Release tree layout and ordering validation
//! - [`version`] - Version records and version-line parsing

pub mod assembler;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod naming;
pub mod output;
pub mod packaging;
pub mod pipeline;
pub mod stamper;
pub mod structure;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod version;
