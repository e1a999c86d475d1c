//! Parlor chat relay server library.
//!
//! Clients join under a display name, exchange short text messages and observe
//! presence/typing state of other connected clients. The core is a session
//! registry that enforces one live connection per display name, and an event
//! broadcaster that fans events out to the right audience.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
