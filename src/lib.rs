//! # timeword
//!
//! Natural-language time input interpretation for countdown timers.
//!
//! Converts loosely-formatted human input ("5", "5:30 pm", "next Friday",
//! "3 days 2 hours", "until Jan 1") into a duration or an absolute point in
//! time, and renders durations and moments back into natural phrases. All
//! resolution is computed against a caller-supplied reference moment — no
//! system clock access — so every function here is pure, deterministic,
//! and safe to call from any thread.
//!
//! ## Modules
//!
//! - [`duration`] — duration lexing ("2h 30m", "1.5 days", bare minutes)
//! - [`moment`] — moment lexing ("Friday", "Jan 1", "noon") against a reference
//! - [`resolve`] — duration-vs-moment ambiguity resolution
//! - [`format`] — natural-phrase rendering of durations and moments
//! - [`error`] — error types
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use timeword::{resolve, TimerInput};
//!
//! let reference = NaiveDate::from_ymd_opt(2024, 3, 1)
//!     .unwrap()
//!     .and_hms_opt(8, 0, 0)
//!     .unwrap();
//!
//! // Duration reading wins for bare numbers: "5" is five minutes.
//! match resolve("5", reference).unwrap() {
//!     TimerInput::Duration(d) => assert_eq!(d.whole_seconds(), 300),
//!     TimerInput::Moment(_) => unreachable!(),
//! }
//!
//! // "until" forces the moment reading: five o'clock this afternoon.
//! match resolve("until 5", reference).unwrap() {
//!     TimerInput::Moment(m) => assert_eq!(m.to_string(), "2024-03-01 17:00:00"),
//!     TimerInput::Duration(_) => unreachable!(),
//! }
//! ```

pub mod duration;
pub mod error;
pub mod format;
pub mod moment;
pub mod resolve;

pub use duration::{parse_duration, ParsedDuration};
pub use error::{ParseError, Result};
pub use format::{format_duration, format_duration_short, format_moment};
pub use moment::{parse_moment, parse_moment_with_options, FormatLocale, MomentOptions};
pub use resolve::{resolve, resolve_with_options, TimerInput};
