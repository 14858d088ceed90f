pub mod bout;
pub mod checkout;
pub mod event;
pub mod notification;
pub mod offer;
pub mod payment;
pub mod profile;

pub use bout::Bout;
pub use checkout::CheckoutSession;
pub use event::Event;
pub use notification::Notification;
pub use offer::Offer;
pub use payment::Payment;
pub use profile::Profile;

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// A bout's corner: red or blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" => Some(Side::Red),
            "blue" => Some(Side::Blue),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Red => "red",
            Side::Blue => "blue",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Closed profile role. The upstream store holds roles as free text in
/// varying case; normalization happens exactly once, here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Fighter,
    Coach,
    Gym,
    Promotion,
    Admin,
}

impl Role {
    pub fn from_store_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fighter" => Some(Role::Fighter),
            "coach" => Some(Role::Coach),
            "gym" => Some(Role::Gym),
            "promotion" => Some(Role::Promotion),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Only coaches and gyms may send bout offers.
    pub fn can_send_offers(self) -> bool {
        matches!(self, Role::Coach | Role::Gym)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Fighter => "fighter",
            Role::Coach => "coach",
            Role::Gym => "gym",
            Role::Promotion => "promotion",
            Role::Admin => "admin",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// OfferStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
}

impl OfferStatus {
    pub fn from_store_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OfferStatus::Pending),
            "accepted" => Some(OfferStatus::Accepted),
            "declined" => Some(OfferStatus::Declined),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Declined => "declined",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resolution decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Decline,
}

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BoutOffer,
    BoutAssigned,
    OfferAccepted,
    OfferDeclined,
    EventBoutMatched,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::BoutOffer => "bout_offer",
            NotificationType::BoutAssigned => "bout_assigned",
            NotificationType::OfferAccepted => "offer_accepted",
            NotificationType::OfferDeclined => "offer_declined",
            NotificationType::EventBoutMatched => "event_bout_matched",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
