//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The expected path is `pending → paid → processing → shipped → delivered`,
/// with `cancelled` reachable from any non-terminal state. Staff move orders
/// between non-terminal states freely (including backwards, to correct
/// mistakes); `delivered` and `cancelled` are terminal and frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Paid,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The snake_case wire name, as stored and sent over APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Spanish display label shown to staff and customers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Paid => "Pagado",
            Self::Processing => "En preparación",
            Self::Shipped => "Enviado",
            Self::Delivered => "Entregado",
            Self::Cancelled => "Cancelado",
        }
    }

    /// Terminal statuses never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Check whether an administrative transition to `to` is allowed.
    ///
    /// Non-terminal orders may move to any other status, in either
    /// direction. Terminal orders are frozen. Writing the current status
    /// again is rejected as a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError`] when the transition is rejected.
    pub fn validate_transition(self, to: Self) -> Result<(), StatusTransitionError> {
        if self.is_terminal() {
            return Err(StatusTransitionError::Terminal { from: self });
        }
        if self == to {
            return Err(StatusTransitionError::SameStatus { status: self });
        }
        Ok(())
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Rejected status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StatusTransitionError {
    /// The order is already in the requested status.
    #[error("order is already {status}")]
    SameStatus { status: OrderStatus },

    /// The order reached a terminal status and is frozen.
    #[error("order is {from} and can no longer change status")]
    Terminal { from: OrderStatus },
}
