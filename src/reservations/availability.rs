// Availability checking
//
// Decides whether a candidate stay conflicts with existing bookings. The
// repository fetches every stay referencing a candidate room; the overlap
// rule itself lives here so it can be tested without a database.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::reservations::models::BookedStay;

/// Half-open interval overlap: [a_start, a_end) and [b_start, b_end) overlap
/// iff `a_start < b_end AND a_end > b_start`
///
/// The check-out day is never considered occupied, so a guest can check in on
/// the same calendar day another checks out.
pub fn intervals_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Return the distinct display names of rooms that are already booked for a
/// period overlapping [check_in, check_out), in first-seen order
///
/// `exclude_reservation` skips a reservation's own stays so an update is
/// never in conflict with itself. An empty result means the candidate stay
/// can be booked.
pub fn conflicting_room_names(
    stays: &[BookedStay],
    room_ids: &[Uuid],
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_reservation: Option<Uuid>,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for stay in stays {
        if Some(stay.reservation_id) == exclude_reservation {
            continue;
        }
        if !room_ids.contains(&stay.room_id) {
            continue;
        }
        if !intervals_overlap(
            check_in,
            check_out,
            stay.check_in_date,
            stay.check_out_date,
        ) {
            continue;
        }
        if !names.contains(&stay.room_name) {
            names.push(stay.room_name.clone());
        }
    }

    names
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    proptest! {
        // Overlap is symmetric: overlaps(A, B) == overlaps(B, A)
        #[test]
        fn prop_overlap_symmetry(
            a1 in 0i64..365,
            a_len in 1i64..60,
            b1 in 0i64..365,
            b_len in 1i64..60,
        ) {
            let (a_start, a_end) = (day(a1), day(a1 + a_len));
            let (b_start, b_end) = (day(b1), day(b1 + b_len));

            prop_assert_eq!(
                intervals_overlap(a_start, a_end, b_start, b_end),
                intervals_overlap(b_start, b_end, a_start, a_end)
            );
        }

        // Back-to-back intervals never overlap (half-open rule)
        #[test]
        fn prop_adjacent_intervals_never_overlap(
            a1 in 0i64..365,
            a_len in 1i64..60,
            b_len in 1i64..60,
        ) {
            let (a_start, a_end) = (day(a1), day(a1 + a_len));

            prop_assert!(!intervals_overlap(a_start, a_end, a_end, day(a1 + a_len + b_len)));
            prop_assert!(!intervals_overlap(a_end, day(a1 + a_len + b_len), a_start, a_end));
        }

        // An interval always overlaps itself
        #[test]
        fn prop_interval_overlaps_itself(a1 in 0i64..365, a_len in 1i64..60) {
            let (start, end) = (day(a1), day(a1 + a_len));
            prop_assert!(intervals_overlap(start, end, start, end));
        }
    }
}
