//! Domain submission adapters.
//!
//! One adapter per action kind. Each validates or normalizes a queued item
//! and maps it onto the matching remote call, then classifies the result:
//! delivered, worth retrying later, or stuck until a human decides.

use crate::api::{
    ApiError, BookingRequest, CampreservApi, CheckInRequest, GuestMessageRequest, OrderRequest,
    SessionContext,
};
use crate::item::{QueueItem, QueuePayload};

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The remote call succeeded; the item can be dropped.
    Delivered,
    /// The call failed for a reason that may resolve itself; requeue.
    Transient(String),
    /// The item can never succeed as-is; flag it for a human decision.
    Conflict(String),
}

/// Submits one queued item through the adapter matching its payload.
pub fn submit_item(
    item: &QueueItem,
    api: &dyn CampreservApi,
    session: &dyn SessionContext,
) -> SubmitOutcome {
    match &item.payload {
        QueuePayload::GuestMessage {
            reservation_id,
            guest_id,
            content,
        } => classify(api.send_guest_message(&GuestMessageRequest {
            idempotency_key: item.id,
            reservation_id: reservation_id.clone(),
            guest_id: guest_id.clone(),
            content: content.clone(),
            sender_role: "guest".into(),
        })),

        QueuePayload::PosOrder {
            campground_id,
            order,
        } => match campground_id {
            // An order cannot be attributed to a tenant without its
            // campground; don't even attempt the call.
            None => SubmitOutcome::Conflict("Missing campground ID".into()),
            Some(campground_id) => classify(api.create_pos_order(&OrderRequest {
                idempotency_key: item.id,
                campground_id: campground_id.clone(),
                order: order.clone(),
            })),
        },

        QueuePayload::KioskCheckIn {
            reservation_id,
            upsell_total,
        } => classify(api.perform_check_in(&CheckInRequest {
            idempotency_key: item.id,
            reservation_id: reservation_id.clone(),
            upsell_total: *upsell_total,
            // Tokens rotate between enqueue and flush, so read the current
            // one rather than anything stored on the item.
            device_token: session.device_token(),
        })),

        QueuePayload::PortalOrder {
            campground_id,
            order,
        } => match campground_id {
            None => SubmitOutcome::Conflict("Missing campground ID".into()),
            Some(campground_id) => classify(api.create_portal_order(&OrderRequest {
                idempotency_key: item.id,
                campground_id: campground_id.clone(),
                order: order.clone(),
            })),
        },

        QueuePayload::ActivityBooking {
            session_id,
            booking,
        } => match normalize_booking(item, session_id, booking) {
            Ok(request) => classify(api.book_activity(&request)),
            // An unparseable payload can never succeed on retry.
            Err(reason) => SubmitOutcome::Conflict(reason),
        },
    }
}

/// Normalizes a raw activity booking body into a [`BookingRequest`].
///
/// The raw body is whatever the capturing UI wrote; only a string guest id
/// and a whole-number quantity make it submittable.
pub fn normalize_booking(
    item: &QueueItem,
    session_id: &str,
    booking: &serde_json::Value,
) -> Result<BookingRequest, String> {
    let guest_id = booking
        .get("guestId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Booking payload missing guest ID".to_string())?;

    let quantity = booking
        .get("quantity")
        .ok_or_else(|| "Booking payload missing quantity".to_string())?
        .as_u64()
        .ok_or_else(|| "Booking payload quantity is not a whole number".to_string())?;

    let reservation_id = booking
        .get("reservationId")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(BookingRequest {
        idempotency_key: item.id,
        session_id: session_id.to_string(),
        guest_id: guest_id.to_string(),
        quantity: quantity as u32,
        reservation_id,
    })
}

fn classify(result: Result<(), ApiError>) -> SubmitOutcome {
    match result {
        Ok(()) => SubmitOutcome::Delivered,
        Err(e) if e.is_transient() => SubmitOutcome::Transient(e.to_string()),
        Err(e) => SubmitOutcome::Conflict(e.to_string()),
    }
}
