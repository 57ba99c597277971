//! Pure balance computation
//!
//! Side-effect-free recomputation of the running balance sequence. These
//! functions take the feeds as plain slices and hold no state, so repeated
//! calls with unchanged inputs produce identical output.

use std::collections::HashMap;

use rust_decimal::Decimal;

use sangha_types::{Donation, MeetingId, MeetingRecord, SpendingEdits};

/// Sum of all donation amounts.
pub fn donation_total(donations: &[Donation]) -> Decimal {
    donations.iter().map(|d| d.amount).sum()
}

/// Recompute the running balance after each meeting from scratch.
///
/// Meetings are replayed in ascending `(date, created_at)` order, starting
/// from the donation total and deducting each meeting's itemized spending in
/// turn. Returns a map of meeting id to the balance after that meeting.
pub fn running_balances(
    donations: &[Donation],
    meetings: &[MeetingRecord],
) -> HashMap<MeetingId, Decimal> {
    let mut ordered: Vec<&MeetingRecord> = meetings.iter().collect();
    ordered.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));

    let mut total = donation_total(donations);
    let mut balances = HashMap::with_capacity(ordered.len());

    for meeting in ordered {
        total -= meeting.spendings();
        balances.insert(meeting.id, total);
    }

    balances
}

/// The balance to display for a selected meeting.
///
/// Only the latest meeting's unsaved edits perturb the live organizational
/// balance; earlier meetings are already baked into history, so their
/// selection always shows the last persisted snapshot. The preview is
/// transient and never persisted.
pub fn live_balance(
    is_latest: bool,
    pending_edits: Option<&SpendingEdits>,
    persisted_balance: Decimal,
) -> Decimal {
    match pending_edits {
        Some(edits) if is_latest => persisted_balance - edits.total(),
        _ => persisted_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use sangha_types::DonationId;

    fn donation(amount: Decimal) -> Donation {
        Donation {
            id: DonationId::new(),
            name: "donor".to_string(),
            amount,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn meeting(date: &str, food: Decimal, preacher: Decimal, other: Decimal) -> MeetingRecord {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        MeetingRecord {
            id: MeetingId::new(),
            name: "meeting".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_amount: dec!(500),
            food,
            preacher,
            other,
            total_spendings: food + preacher + other,
            balance: dec!(500) - (food + preacher + other),
            account_balance: dec!(0),
            created_at,
            modified_at: created_at,
            modified_by: "test".to_string(),
            editable: false,
            version: 0,
        }
    }

    #[test]
    fn replays_spendings_in_date_order() {
        let donations = vec![donation(dec!(1000)), donation(dec!(500))];
        // Given out of order on purpose.
        let later = meeting("2024-03-01", dec!(200), dec!(0), dec!(0));
        let earlier = meeting("2024-02-01", dec!(100), dec!(50), dec!(20));
        let meetings = vec![later.clone(), earlier.clone()];

        let balances = running_balances(&donations, &meetings);

        assert_eq!(balances[&earlier.id], dec!(1330));
        assert_eq!(balances[&later.id], dec!(1130));
    }

    #[test]
    fn is_deterministic_and_idempotent() {
        let donations = vec![donation(dec!(750.25))];
        let meetings = vec![
            meeting("2024-02-01", dec!(10), dec!(20), dec!(30)),
            meeting("2024-02-15", dec!(5.50), dec!(0), dec!(0)),
        ];

        let first = running_balances(&donations, &meetings);
        let second = running_balances(&donations, &meetings);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_meetings_yield_empty_map() {
        let donations = vec![donation(dec!(1000))];
        assert!(running_balances(&donations, &[]).is_empty());
    }

    #[test]
    fn live_balance_previews_only_the_latest_meeting() {
        let edits = SpendingEdits {
            food: dec!(100),
            preacher: dec!(50),
            other: dec!(20),
        };

        assert_eq!(live_balance(true, Some(&edits), dec!(1500)), dec!(1330));
        assert_eq!(live_balance(false, Some(&edits), dec!(1500)), dec!(1500));
        assert_eq!(live_balance(true, None, dec!(1500)), dec!(1500));
    }
}
