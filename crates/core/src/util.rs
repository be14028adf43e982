// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod clock {
    //! Thin alias over the workspace's timestamp type, kept in its own
    //! module so call sites never depend on `jiff` directly (mirrors the
    //! teacher's `util::clock` wrapper around its own time crate).

    pub type Timestamp = jiff::Timestamp;

    #[must_use]
    pub fn now() -> Timestamp {
        Timestamp::now()
    }
}

pub use clock::Timestamp;
