//! FM Transportes status catalog.
//!
//! The carrier reports shipment progress as numeric status codes. This module is
//! the single table mapping those codes to human-readable descriptions and to the
//! set of terminal ("final") outcomes. Persistence and aggregation code only ever
//! asks the catalog; no other module hard-codes a status meaning.

/// Status code the carrier assigns when an order is first registered.
///
/// Also used as the derived status of a shipment with no tracking events yet.
pub const STATUS_CREATED: i32 = 0;

/// Description returned for codes missing from the catalog.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// Codes after which no further movement is expected.
///
/// Delivered, returned, lost and cancelled.
pub const FINAL_STATUSES: [i32; 4] = [5, 6, 7, 8];

const CATALOG: [(i32, &str); 13] = [
    (0, "Order created"),
    (1, "Picking"),
    (2, "Collected"),
    (3, "In transit"),
    (4, "Out for delivery"),
    (5, "Delivered"),
    (6, "Returned"),
    (7, "Lost"),
    (8, "Cancelled"),
    (9, "Awaiting pickup"),
    (10, "First delivery attempt"),
    (11, "Second delivery attempt"),
    (12, "Third delivery attempt"),
];

/// Human-readable description of a carrier status code.
///
/// Returns [`UNKNOWN_DESCRIPTION`] for codes the catalog does not know.
///
/// # Examples
///
/// ```
/// use fm_tracking_core::status::describe;
///
/// assert_eq!(describe(5), "Delivered");
/// assert_eq!(describe(99), "Unknown");
/// ```
#[must_use]
pub fn describe(code: i32) -> &'static str {
    CATALOG
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(UNKNOWN_DESCRIPTION, |(_, description)| description)
}

/// Whether a status code is terminal.
///
/// # Examples
///
/// ```
/// use fm_tracking_core::status::is_final;
///
/// assert!(is_final(5));
/// assert!(!is_final(3));
/// ```
#[must_use]
pub fn is_final(code: i32) -> bool {
    FINAL_STATUSES.contains(&code)
}
