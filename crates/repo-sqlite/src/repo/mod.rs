// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

mod claim;
mod edition;
mod hub;
mod media_asset;
mod person;
mod profile;
mod provider_config;
mod transaction_log;
mod work;
