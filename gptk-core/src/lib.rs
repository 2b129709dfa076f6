//! # gptk core
//!
//! Filtering and bulk-action engine for a photo library reached through a
//! private RPC endpoint.
//!
//! A run reads candidates from one collection, narrows them through the
//! filter chain, optionally keeps only near-duplicate groups, and applies one
//! bulk action under bounded concurrency:
//!
//! - [`paginate`] and [`sources`]: page loops, including date-bounded
//!   library scans that stop or skip early
//! - [`filters`]: validation and the ordered filter chain with its
//!   enrichment pass
//! - [`batch`]: chunked execution against a rate-limited service
//! - [`albums`]: capacity-aware album adds and order restoration
//! - [`similarity`]: thumbnail download, difference hashing and greedy
//!   grouping
//! - [`toolkit`]: the orchestrator and its run/cancel state
//!
//! The remote service sits behind [`api::PhotosApi`]. [`api::memory`]
//! implements it over an in-process snapshot.
//!
//! ```no_run
//! use std::{path::Path, sync::Arc};
//!
//! use gptk_core::{
//!     Action, RunRequest, Toolkit, ToolkitConfig,
//!     api::memory::{InMemoryPhotosApi, LibrarySnapshot},
//!     similarity::HttpThumbnails,
//! };
//! use gptk_model::{Filter, Source};
//!
//! async fn archive_old_favorites() -> Result<(), Box<dyn std::error::Error>> {
//!     let snapshot = LibrarySnapshot::load(Path::new("library.json"))?;
//!     let toolkit = Toolkit::new(
//!         Arc::new(InMemoryPhotosApi::new(snapshot)),
//!         Arc::new(HttpThumbnails::new()?),
//!         ToolkitConfig::default(),
//!     );
//!
//!     let filter = Filter {
//!         higher_boundary_date: Some("2015-12-31".into()),
//!         ..Filter::default()
//!     };
//!     let report = toolkit
//!         .run(RunRequest::preview(Source::Favorites, filter).with_action(Action::Archive))
//!         .await?;
//!     println!("archived {} of {} items", report.affected, report.matched);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Bulk actions and their dispatch
pub mod actions;

/// Album adds with overflow and order restoration
pub mod albums;

/// Port to the remote service and its in-memory implementation
pub mod api;

/// Chunked execution under a concurrency ceiling
pub mod batch;

pub mod config;

/// Error types
pub mod error;

/// Validation and the filter chain
pub mod filters;

pub mod paginate;

/// Run and cancellation state
pub mod run_state;

/// Near-duplicate grouping
pub mod similarity;

pub mod sources;

/// Orchestrator
pub mod toolkit;

pub mod window;

pub use actions::Action;
pub use config::{ConcurrencyLimits, SimilarityConfig, ToolkitConfig};
pub use error::{ConfigError, Result, ToolkitError};
pub use run_state::{RunGuard, RunState};
pub use toolkit::{RunOutcome, RunReport, RunRequest, Toolkit};
