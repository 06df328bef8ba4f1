//! # fastlink
//!
//! A UI-agnostic library for 123 cloud-drive "instant link" collections,
//! with a CLI client. The core is the link codec and the JSON record-set
//! engine; any interactive surface (the CLI here, a desktop window
//! elsewhere) is a caller of [`api`] and owns no logic of its own.
//!
//! ## Layers
//!
//! ```text
//! CLI (args.rs + main.rs, the binary)
//!   - parses arguments, formats terminal output, owns exit codes
//!        │
//!        ▼
//! API facade (api.rs)
//!   - the collaborator surface: load/save, parse/generate,
//!     merge/split/filter, directory index
//!        │
//!        ▼
//! Core modules
//!   - link:     FSLink/FLCP codec
//!   - schema:   three-shape document normalization
//!   - store:    RecordStore ownership, persistence, merging
//!   - sorter:   path order and natural display order
//!   - split:    bounded partitioning and structure analysis
//!   - dirindex: two-level directory filter index
//!   - batch:    batched link ingestion for worker threads
//! ```
//!
//! Core functions take plain arguments and return `Result` values; they
//! never print, never exit, and never assume a terminal. Expected
//! conditions (bad input, missing file, empty parse) come back as
//! [`error::FastLinkError`] values, with
//! [`error::FastLinkError::Empty`] distinguishing "nothing to do" from
//! hard failures.
//!
//! `RecordStore` is not internally synchronized; callers serialize access
//! to one store (the CLI is single-threaded, a GUI would use one owner
//! thread or a mutex).

pub mod api;
pub mod batch;
pub mod dirindex;
pub mod error;
pub mod link;
pub mod model;
pub mod schema;
pub mod sorter;
pub mod split;
pub mod store;
