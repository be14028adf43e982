// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.C File Organizer — template grammar, destination path calculation,
//! and safe, retrying, collision-avoiding moves.

mod mv;
mod template;

pub use mv::{execute_move, MoveError};
pub use template::{calculate_path, validate_template, OrganizerCandidate, TemplateError, TokenRegistry};

/// All mutation methods fail closed unless the relevant policy flag is
/// explicitly set (`spec.md` §4.C "Guard").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrganizerPolicy {
    pub auto_organize: bool,
    pub write_back: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("refused: {operation} requires the corresponding policy flag to be enabled")]
pub struct PolicyRefused {
    pub operation: &'static str,
}

impl OrganizerPolicy {
    pub fn guard_move(&self) -> Result<(), PolicyRefused> {
        self.auto_organize
            .then_some(())
            .ok_or(PolicyRefused { operation: "move" })
    }

    pub fn guard_tag_write(&self) -> Result<(), PolicyRefused> {
        self.write_back
            .then_some(())
            .ok_or(PolicyRefused {
                operation: "tag write-back",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_is_refused_without_auto_organize() {
        let policy = OrganizerPolicy::default();
        assert!(policy.guard_move().is_err());
    }

    #[test]
    fn move_is_allowed_once_flagged() {
        let policy = OrganizerPolicy {
            auto_organize: true,
            write_back: false,
        };
        assert!(policy.guard_move().is_ok());
        assert!(policy.guard_tag_write().is_err());
    }
}
