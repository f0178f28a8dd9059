#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report feed computation for the map and list views.
//!
//! Everything here is a pure transformation over a report snapshot:
//!
//! 1. [`filter`] narrows reports by type and recency window
//! 2. [`proximity`] attaches a distance label relative to the user
//! 3. [`view::FeedView`] owns the latest snapshot, filter state, and user
//!    position and recomputes the output whenever any of them changes
//!
//! The current time is always passed in explicitly so results are
//! deterministic for a given `now`.

pub mod filter;
pub mod proximity;
pub mod time_window;
pub mod view;

pub use filter::{FilterState, TypeFilter};
pub use proximity::RankedReport;
pub use time_window::{RelativeAge, WindowKind};
pub use view::{FeedSnapshot, FeedView};
