//! # fh-stage: FortuneHall Notice System
//!
//! Defines every message the game core sends to the presentation layer.
//! The core never asks presentation anything back; it only emits NOTICES.
//!
//! ## Philosophy
//!
//! All five games pass through the same semantic moments:
//! - Round starts → Outcome lands → Round resolved → Wallet updated
//!
//! Animation length is a presentation concern; notices only carry a
//! timestamp (ms from round start) telling the presenter *when* to show them.

pub mod event;
pub mod notice;
pub mod presenter;
pub mod taxonomy;
pub mod trace;

pub use event::*;
pub use notice::*;
pub use presenter::*;
pub use taxonomy::*;
pub use trace::*;
