//! Port abstraction for notifying recipients about new swap requests.
//!
//! Delivery is best-effort: the lifecycle service logs and swallows failures
//! so a broken notification channel never blocks request creation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::swap::SwapRequest;

/// Failures raised by swap notifier adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapNotifierError {
    /// The notification could not be delivered.
    #[error("swap notification delivery failed: {message}")]
    Delivery {
        /// Adapter-supplied failure detail.
        message: String,
    },
}

impl SwapNotifierError {
    /// Build a `Delivery` error from any displayable message.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

/// Driven port for new-request notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapNotifier: Send + Sync {
    /// Tell the recipient a new swap request was created.
    async fn swap_requested(&self, swap: &SwapRequest) -> Result<(), SwapNotifierError>;
}

/// Fixture notifier that accepts every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSwapNotifier;

#[async_trait]
impl SwapNotifier for FixtureSwapNotifier {
    async fn swap_requested(&self, _swap: &SwapRequest) -> Result<(), SwapNotifierError> {
        Ok(())
    }
}
