// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The identity anchor grouping related [`Work`](crate::work::Work)s (e.g.
//! "The Hobbit" across formats, translations, and editions).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hub {
    pub id: EntityUid,
    pub display_name: String,
    pub franchise: Option<String>,
    pub wikidata_qid: Option<String>,
}

impl Hub {
    /// Case-insensitive comparison key for the display-name uniqueness
    /// invariant.
    #[must_use]
    pub fn display_name_key(&self) -> String {
        self.display_name.to_lowercase()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HubInvalidity {
    DisplayNameEmpty,
}

impl Validate for Hub {
    type Invalidity = HubInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.display_name.trim().is_empty(),
                Self::Invalidity::DisplayNameEmpty,
            )
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(display_name: &str) -> Hub {
        Hub {
            id: EntityUid::new(),
            display_name: display_name.to_owned(),
            franchise: None,
            wikidata_qid: None,
        }
    }

    #[test]
    fn display_name_key_is_case_insensitive() {
        assert_eq!(hub("The Hobbit").display_name_key(), hub("THE HOBBIT").display_name_key());
    }

    #[test]
    fn empty_display_name_is_invalid() {
        assert!(hub("   ").validate().is_err());
        assert!(hub("The Hobbit").validate().is_ok());
    }
}
