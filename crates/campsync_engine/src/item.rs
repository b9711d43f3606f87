//! Queue identity and item model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// The named queues the engine knows about, one per domain and channel.
///
/// Queues are created implicitly on first enqueue and never destroyed; an
/// empty queue is simply an empty persisted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueKind {
    /// Guest messages written by staff while offline.
    GuestMessages,
    /// Store point-of-sale orders.
    PosOrders,
    /// Self-service kiosk check-ins.
    KioskCheckIns,
    /// Guest-portal store orders.
    PortalOrders,
    /// Activity session bookings.
    ActivityBookings,
}

impl QueueKind {
    /// Every queue the flush engine drains, in a stable order.
    pub const ALL: [QueueKind; 5] = [
        QueueKind::GuestMessages,
        QueueKind::PosOrders,
        QueueKind::KioskCheckIns,
        QueueKind::PortalOrders,
        QueueKind::ActivityBookings,
    ];

    /// Stable key addressing this queue's persisted slot.
    #[must_use]
    pub fn storage_key(&self) -> &'static str {
        match self {
            QueueKind::GuestMessages => "guest-messages",
            QueueKind::PosOrders => "pos-orders",
            QueueKind::KioskCheckIns => "kiosk-check-ins",
            QueueKind::PortalOrders => "portal-orders",
            QueueKind::ActivityBookings => "activity-bookings",
        }
    }

    /// Human label used by the presentation layer.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            QueueKind::GuestMessages => "Guest messages",
            QueueKind::PosOrders => "POS orders",
            QueueKind::KioskCheckIns => "Kiosk check-ins",
            QueueKind::PortalOrders => "Portal orders",
            QueueKind::ActivityBookings => "Activity bookings",
        }
    }

    /// Parses a storage key back into a queue kind.
    #[must_use]
    pub fn from_storage_key(key: &str) -> Option<QueueKind> {
        QueueKind::ALL.into_iter().find(|k| k.storage_key() == key)
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// The domain payload carried by a queued action.
///
/// A tagged union over the known payload shapes; every item in a given
/// queue holds the variant matching that queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QueuePayload {
    /// A message from staff to a guest on a reservation thread.
    GuestMessage {
        /// Reservation the message belongs to.
        reservation_id: String,
        /// Guest the message is addressed to.
        guest_id: String,
        /// Message body.
        content: String,
    },
    /// A store point-of-sale order rung up at the front desk.
    PosOrder {
        /// Owning campground; orders cannot be attributed without it.
        campground_id: Option<String>,
        /// Opaque order body forwarded to the POS API.
        order: serde_json::Value,
    },
    /// A kiosk self-service check-in.
    KioskCheckIn {
        /// Reservation being checked in.
        reservation_id: String,
        /// Total of upsells accepted during check-in.
        upsell_total: f64,
    },
    /// A guest-portal store order.
    PortalOrder {
        /// Owning campground; orders cannot be attributed without it.
        campground_id: Option<String>,
        /// Opaque order body forwarded to the store API.
        order: serde_json::Value,
    },
    /// An activity session booking; the raw body is normalized at submit
    /// time.
    ActivityBooking {
        /// Activity session being booked.
        session_id: String,
        /// Raw booking body as captured by the UI.
        booking: serde_json::Value,
    },
}

impl QueuePayload {
    /// The queue this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> QueueKind {
        match self {
            QueuePayload::GuestMessage { .. } => QueueKind::GuestMessages,
            QueuePayload::PosOrder { .. } => QueueKind::PosOrders,
            QueuePayload::KioskCheckIn { .. } => QueueKind::KioskCheckIns,
            QueuePayload::PortalOrder { .. } => QueueKind::PortalOrders,
            QueuePayload::ActivityBooking { .. } => QueueKind::ActivityBookings,
        }
    }
}

/// One queued action awaiting delivery to a remote domain API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Opaque id assigned at enqueue time, stable for the item's lifetime.
    /// Doubles as the idempotency key sent with the remote call.
    pub id: Uuid,
    /// Domain payload.
    pub payload: QueuePayload,
    /// True once the item needs a human decision; conflicted items are
    /// excluded from automatic flushes.
    #[serde(default)]
    pub conflict: bool,
    /// Number of failed submission attempts so far; feeds backoff.
    #[serde(default)]
    pub attempts: u32,
    /// Earliest time (epoch ms) a future flush should try again.
    #[serde(default)]
    pub next_attempt_at: Option<u64>,
    /// Human-readable description of the most recent failure.
    #[serde(default)]
    pub last_error: Option<String>,
    /// When the item was enqueued (epoch ms).
    pub enqueued_at: u64,
}

impl QueueItem {
    /// Creates a fresh item around a payload.
    #[must_use]
    pub fn new(payload: QueuePayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            conflict: false,
            attempts: 0,
            next_attempt_at: None,
            last_error: None,
            enqueued_at: now_ms(),
        }
    }

    /// True if an automatic flush may submit this item at `now`.
    #[must_use]
    pub fn eligible_at(&self, now: u64) -> bool {
        !self.conflict && self.next_attempt_at.is_none_or(|at| at <= now)
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn storage_keys_round_trip() {
        for kind in QueueKind::ALL {
            assert_eq!(QueueKind::from_storage_key(kind.storage_key()), Some(kind));
        }
        assert_eq!(QueueKind::from_storage_key("unknown"), None);
    }

    #[test]
    fn payload_kind_matches_queue() {
        let payload = QueuePayload::PosOrder {
            campground_id: Some("cg-1".into()),
            order: json!({"total": 12.5}),
        };
        assert_eq!(payload.kind(), QueueKind::PosOrders);
    }

    #[test]
    fn new_item_is_eligible() {
        let item = QueueItem::new(QueuePayload::GuestMessage {
            reservation_id: "res-1".into(),
            guest_id: "guest-1".into(),
            content: "hello".into(),
        });
        assert!(!item.conflict);
        assert!(item.eligible_at(now_ms()));
    }

    #[test]
    fn conflicted_item_is_never_eligible() {
        let mut item = QueueItem::new(QueuePayload::KioskCheckIn {
            reservation_id: "res-2".into(),
            upsell_total: 0.0,
        });
        item.conflict = true;
        assert!(!item.eligible_at(u64::MAX));
    }

    #[test]
    fn backoff_marker_defers_eligibility() {
        let mut item = QueueItem::new(QueuePayload::KioskCheckIn {
            reservation_id: "res-3".into(),
            upsell_total: 5.0,
        });
        item.next_attempt_at = Some(1_000);
        assert!(!item.eligible_at(999));
        assert!(item.eligible_at(1_000));
    }

    #[test]
    fn item_serde_round_trip_with_defaults() {
        // Older persisted items lack the newer bookkeeping fields.
        let raw = json!({
            "id": Uuid::new_v4(),
            "payload": {
                "kind": "guest-message",
                "reservation_id": "r",
                "guest_id": "g",
                "content": "hi"
            },
            "enqueued_at": 1u64
        });
        let item: QueueItem = serde_json::from_value(raw).unwrap();
        assert!(!item.conflict);
        assert_eq!(item.attempts, 0);
        assert_eq!(item.next_attempt_at, None);
    }
}
