//! # Paramdeck Engine
//!
//! The non-UI core of the parameter panel.
//!
//! ## Key Features
//!
//! - **Command building**: typed [`ParameterCommand`]s rendered into the exact
//!   text the remote interpreter expects, including grouped targets
//! - **Candidate discovery**: [`CandidateScanner`] walks a remote workflow and
//!   joins concurrent component fetches into one [`CandidateSet`]
//! - **Row feed**: [`ParameterFeed`] delivers authoritative parameter
//!   snapshots out of band
//!
//! ## Usage
//!
//! ```rust
//! use paramdeck_engine::{CommandBuilder, FalsyPolicy};
//!
//! let builder = CommandBuilder::new(FalsyPolicy::TextPresence);
//! let command = builder.add_from_text(" a.x , a.y ", None, None, None, None, Some("grp1"));
//! assert_eq!(
//!     command.to_command_text("top.driver"),
//!     "top.driver.add_parameter(('a.x','a.y',),name='grp1');"
//! );
//! ```
//!
//! [`CandidateSet`]: paramdeck_types::CandidateSet

pub mod command;
pub mod feed;
#[cfg(any(test, feature = "test-stubs"))]
pub mod memory;
pub mod scanner;

pub use command::{CommandBuilder, CommandText, FalsyPolicy, ParameterCommand};
pub use feed::{FeedRefresher, FeedUpdate, ParameterFeed};
pub use scanner::{CandidateScanner, ScanError, ScanOutcome, ScanReport, candidates_for};
