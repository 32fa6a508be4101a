//! ChatTransport trait definition.
//!
//! A transport publishes a [`Dashboard`] as a single photo message and edits
//! it in place afterwards. Implementations map their native failures onto
//! [`ProviderErrorCode`](crate::error::ProviderErrorCode); in particular an
//! edit that changes nothing must surface as `NotModified` and an edit or
//! pin of a deleted message as `NotFound`.

use std::fmt;

use raidwatch_core::Dashboard;
use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;
use crate::source::BoxFuture;

/// Identifier of a published message within its chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publishes and maintains a dashboard message.
pub trait ChatTransport: Send + Sync {
    /// Returns the name of this transport (used in logs).
    fn name(&self) -> &str;

    /// Checks that the transport is usable and returns a description of the
    /// account it acts as.
    ///
    /// An `AuthenticationFailed` error means the credentials are wrong and
    /// retrying is pointless. The default implementation performs no check.
    fn verify(&self) -> BoxFuture<'_, ProviderResult<String>> {
        let name = self.name().to_string();
        Box::pin(async move { Ok(name) })
    }

    /// Sends the dashboard as a new photo message and returns its id.
    fn send_photo<'a>(&'a self, dashboard: &'a Dashboard) -> BoxFuture<'a, ProviderResult<MessageId>>;

    /// Replaces the photo and caption of an existing message.
    fn edit_photo<'a>(
        &'a self,
        message_id: MessageId,
        dashboard: &'a Dashboard,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Pins a message without notifying chat members.
    fn pin_message(&self, message_id: MessageId) -> BoxFuture<'_, ProviderResult<()>>;
}
