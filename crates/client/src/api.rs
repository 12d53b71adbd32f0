// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrappers for the remote operations.
//!
//! Each method maps to one remote operation and goes through
//! [`CredentialedClient::call`], so the credential is attached and the call is
//! queued while offline like any other.

use serde_json::Value;
use wb_core::{Params, RpcError, RpcResult, UserId};

use crate::client::CredentialedClient;
use crate::transport::{ready, ResponseFuture, Transport};

/// Rejects empty identifiers before anything is sent.
fn require_id(name: &str, value: &str) -> RpcResult<()> {
    if value.is_empty() {
        return Err(RpcError::validation(format!("{name} must not be empty")));
    }
    Ok(())
}

impl<T: Transport> CredentialedClient<T> {
    /// Like [`call`](Self::call), but fails without sending when any of
    /// `ids` is empty.
    fn call_with_ids(&self, operation: &str, ids: &[(&str, &str)], params: Params) -> ResponseFuture {
        for (name, value) in ids {
            if let Err(err) = require_id(name, value) {
                return ready(Err(err));
            }
        }
        self.call(operation, params)
    }

    // Core

    pub fn api_version(&self) -> ResponseFuture {
        self.call_bare("wobble.api_version")
    }

    pub fn list_methods(&self) -> ResponseFuture {
        self.call_bare("system.listMethods")
    }

    /// Notifications newer than `next_timestamp` (the value returned by the
    /// previous poll, 0 for everything).
    pub fn get_notifications(&self, next_timestamp: u64) -> ResponseFuture {
        self.call("get_notifications", Params::new().with("next_timestamp", next_timestamp))
    }

    // User

    /// Who am I.
    pub fn user_get(&self) -> ResponseFuture {
        self.call_bare("user_get")
    }

    pub fn user_change_password(&self, password: &str) -> ResponseFuture {
        self.call("user_change_password", Params::new().with("password", password))
    }

    pub fn user_change_name(&self, name: &str) -> ResponseFuture {
        self.call("user_change_name", Params::new().with("name", name))
    }

    // Contacts

    pub fn contact_add(&self, email: &str) -> ResponseFuture {
        self.call_with_ids(
            "user_add_contact",
            &[("contact_email", email)],
            Params::new().with("contact_email", email),
        )
    }

    pub fn contacts_get(&self) -> ResponseFuture {
        self.call_bare("user_get_contacts")
    }

    pub fn contact_remove(&self, contact_id: &UserId) -> ResponseFuture {
        self.call_with_ids(
            "user_remove_contact",
            &[("contact_id", contact_id.as_str())],
            Params::new().with("contact_id", contact_id.as_str()),
        )
    }

    // Topics

    /// Create a topic with a client-chosen id (see
    /// [`generate_id`](Self::generate_id)).
    pub fn topics_create(&self, id: &str) -> ResponseFuture {
        self.call_with_ids("topics_create", &[("id", id)], Params::new().with("id", id))
    }

    pub fn topic_get_details(&self, topic_id: &str) -> ResponseFuture {
        self.call_with_ids("topic_get_details", &[("topic_id", topic_id)], Params::new().with("id", topic_id))
    }

    /// List topics; `archived` selects the archived ones instead of the
    /// active ones.
    pub fn topics_list(&self, archived: bool) -> ResponseFuture {
        self.call("topics_list", Params::new().with("archived", archived))
    }

    pub fn topic_add_user(&self, topic_id: &str, contact_id: &UserId) -> ResponseFuture {
        self.topic_member("topic_add_user", topic_id, contact_id)
    }

    pub fn topic_remove_user(&self, topic_id: &str, contact_id: &UserId) -> ResponseFuture {
        self.topic_member("topic_remove_user", topic_id, contact_id)
    }

    fn topic_member(&self, operation: &str, topic_id: &str, contact_id: &UserId) -> ResponseFuture {
        self.call_with_ids(
            operation,
            &[("topic_id", topic_id), ("contact_id", contact_id.as_str())],
            Params::new().with("topic_id", topic_id).with("contact_id", contact_id.as_str()),
        )
    }

    pub fn topic_set_archived(&self, topic_id: &str, archived: bool) -> ResponseFuture {
        self.call_with_ids(
            "topic_set_archived",
            &[("topic_id", topic_id)],
            Params::new().with("topic_id", topic_id).with("archived", archived),
        )
    }

    pub fn topic_remove_message(&self, topic_id: &str, message_id: &str) -> ResponseFuture {
        self.call_with_ids(
            "topic_remove_message",
            &[("topic_id", topic_id), ("message_id", message_id)],
            Params::new().with("topic_id", topic_id).with("message_id", message_id),
        )
    }

    // Posts

    pub fn post_change_read(&self, topic_id: &str, post_id: &str, read: bool) -> ResponseFuture {
        self.call_with_ids(
            "post_change_read",
            &[("topic_id", topic_id), ("post_id", post_id)],
            post_params(topic_id, post_id).with("read", read),
        )
    }

    pub fn post_change_lock(&self, topic_id: &str, post_id: &str, lock: bool) -> ResponseFuture {
        self.call_with_ids(
            "post_change_lock",
            &[("topic_id", topic_id), ("post_id", post_id)],
            post_params(topic_id, post_id).with("lock", lock),
        )
    }

    /// Create a post. `parent_post_id` is `None` for the topic's root post.
    pub fn post_create(
        &self,
        topic_id: &str,
        post_id: &str,
        parent_post_id: Option<&str>,
        intended_reply: bool,
    ) -> ResponseFuture {
        if let Some(parent) = parent_post_id {
            if let Err(err) = require_id("parent_post_id", parent) {
                return ready(Err(err));
            }
        }
        let parent = parent_post_id.map_or(Value::Null, Value::from);

        self.call_with_ids(
            "post_create",
            &[("topic_id", topic_id), ("post_id", post_id)],
            post_params(topic_id, post_id)
                .with("parent_post_id", parent)
                .with("intended_reply", intended_reply),
        )
    }

    /// Replace a post's content. `revision_no` is the revision the edit is
    /// based on.
    pub fn post_edit(
        &self,
        topic_id: &str,
        post_id: &str,
        content: &str,
        revision_no: u64,
    ) -> ResponseFuture {
        self.call_with_ids(
            "post_edit",
            &[("topic_id", topic_id), ("post_id", post_id)],
            post_params(topic_id, post_id).with("content", content).with("revision_no", revision_no),
        )
    }

    pub fn post_delete(&self, topic_id: &str, post_id: &str) -> ResponseFuture {
        self.call_with_ids(
            "post_delete",
            &[("topic_id", topic_id), ("post_id", post_id)],
            post_params(topic_id, post_id),
        )
    }
}

fn post_params(topic_id: &str, post_id: &str) -> Params {
    Params::new().with("topic_id", topic_id).with("post_id", post_id)
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
