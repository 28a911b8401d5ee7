//! # availability-engine
//!
//! Deterministic availability and scheduling computation.
//!
//! Given a provider's busy intervals, business-hour policy and a requested
//! duration, the engine computes bookable slots. It also expands recurrence
//! rules into concrete occurrence dates and performs DST-correct timezone
//! conversion. Everything is synchronous and CPU-bound; nothing is persisted.
//!
//! ## Quick start
//!
//! ```rust
//! use availability_engine::{BusinessHoursSpec, SchedulingEngine, SlotQuery};
//! use chrono::{TimeZone, Utc};
//!
//! let engine = SchedulingEngine::new();
//! let query = SlotQuery::new(
//!     Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2026, 3, 16, 17, 0, 0).unwrap(),
//!     60,
//! );
//! let slots = engine
//!     .find_available_slots(&query, &[], &BusinessHoursSpec::always_open(), "UTC")
//!     .unwrap();
//! assert_eq!(slots.len(), 8);
//! ```
//!
//! ## Modules
//!
//! - [`timezone`]: Timezone validation cache, instant/wall-clock conversion
//! - [`dst`]: DST transition policies for composing wall-clock times
//! - [`interval`]: Half-open interval algebra: overlap, duration, buffer expansion
//! - [`recurrence`]: Daily/weekly/monthly rules → occurrence dates
//! - [`expander`]: RFC 5545 RRULE strings → occurrence dates
//! - [`business_hours`]: Weekly open-hours policy
//! - [`slots`]: Fixed-length slot search and next-slot lookup
//! - [`conflict`]: Accept-time conflict detection
//! - [`freebusy`]: Free gaps between merged busy periods
//! - [`engine`]: [`SchedulingEngine`], the public facade
//! - [`config`]: Engine-wide defaults
//! - [`error`]: Error types

pub mod business_hours;
pub mod config;
pub mod conflict;
pub mod dst;
pub mod engine;
pub mod error;
pub mod expander;
pub mod freebusy;
pub mod interval;
pub mod recurrence;
pub mod slots;
pub mod timezone;

pub use business_hours::{BusinessHoursSpec, DayHours};
pub use config::EngineConfig;
pub use conflict::{find_conflicts, Conflict};
pub use dst::DstPolicy;
pub use engine::SchedulingEngine;
pub use error::{Result, SchedulingError};
pub use expander::expand_rrule_dates;
pub use interval::{AvailableSlot, BusyInterval, TimeInterval};
pub use recurrence::{RecurrenceRule, RecurrenceType};
pub use slots::{find_available_slots, next_available_slot, SlotQuery};
pub use timezone::{ConvertedDatetime, TimeZoneRegistry};
