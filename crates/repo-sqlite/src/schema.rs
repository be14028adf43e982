// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    hubs (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        entity_uid -> Text,
        display_name -> Text,
        display_name_key -> Text,
        franchise -> Nullable<Text>,
        wikidata_qid -> Nullable<Text>,
    }
}

diesel::table! {
    works (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        entity_uid -> Text,
        hub_uid -> Text,
    }
}

diesel::table! {
    editions (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        entity_uid -> Text,
        work_uid -> Text,
        format -> Text,
        edition_label -> Text,
    }
}

diesel::table! {
    media_assets (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        entity_uid -> Text,
        edition_uid -> Text,
        content_hash -> Text,
        media_type -> Text,
        current_path -> Text,
        file_size_bytes -> BigInt,
        retired -> Bool,
        missing_scan_count -> Integer,
    }
}

diesel::table! {
    persons (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        entity_uid -> Text,
        name -> Text,
        role -> Text,
        wikidata_qid -> Nullable<Text>,
        headshot_url -> Nullable<Text>,
        biography -> Nullable<Text>,
        enriched_at_ms -> Nullable<BigInt>,
    }
}

diesel::table! {
    metadata_claims (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        claim_uid -> Text,
        entity_kind -> Text,
        entity_id -> Text,
        field_key -> Text,
        value -> Text,
        provider_name -> Text,
        observed_at_ms -> BigInt,
        is_user_locked -> Bool,
    }
}

diesel::table! {
    canonical_values (entity_id, field_key) {
        entity_kind -> Text,
        entity_id -> Text,
        field_key -> Text,
        value -> Text,
        last_scored_at_ms -> BigInt,
        is_conflicted -> Bool,
    }
}

diesel::table! {
    profiles (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        entity_uid -> Text,
        display_name -> Text,
        role -> Text,
        is_seed -> Bool,
    }
}

diesel::table! {
    provider_config (name) {
        name -> Text,
        enabled -> Bool,
        default_weight -> Double,
        field_weights -> Text,
        domain -> Text,
        capability_tags -> Text,
        base_url -> Text,
    }
}

diesel::table! {
    transaction_log (row_id) {
        row_id -> BigInt,
        occurred_at_ms -> BigInt,
        action -> Text,
        entity_id -> Nullable<Text>,
        detail -> Text,
    }
}
