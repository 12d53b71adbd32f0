// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side identifiers for objects created before the server confirms them.

use rand::Rng;

use crate::clock::ClockSource;
use crate::user::UserId;

/// Upper bound (inclusive) of the random component.
pub const NONCE_MAX: u32 = 100_000;

/// Placeholder used in place of the user id when nobody is signed in.
const ANONYMOUS: &str = "null";

/// Build an ID from its parts.
/// Format: {user_id}-{millis}-{nonce}
pub fn format_id(user_id: Option<&UserId>, now_ms: u64, nonce: u32) -> String {
    let user = user_id.map(UserId::as_str).unwrap_or(ANONYMOUS);
    format!("{}-{}-{}", user, now_ms, nonce)
}

/// Generate a locally-unique ID for the given user.
///
/// Collisions need the same user, the same millisecond and the same nonce.
/// Not suitable where unpredictability matters.
pub fn generate_id<C: ClockSource>(user_id: Option<&UserId>, clock: &C) -> String {
    let nonce = rand::thread_rng().gen_range(1..=NONCE_MAX);
    format_id(user_id, clock.now_ms(), nonce)
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
