// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

//! 4.H Scoring Engine and 4.I Arbiter: both are pure functions with zero
//! I/O, so the determinism property of `spec.md` §4.H can be asserted
//! directly in unit tests.

pub mod arbiter;
pub mod engine;

pub use arbiter::{decide_linkage, CandidateIdentity, HubCandidate, LinkageDecision};
pub use engine::score;
