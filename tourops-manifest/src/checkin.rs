use serde::Serialize;
use std::collections::HashMap;

use crate::passengers::PassengerRow;
use crate::ManifestError;

/// Check-in flags for the passengers of the departure on screen.
///
/// Owned by one console session and thrown away when another departure is
/// selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckInMap(HashMap<String, bool>);

impl CheckInMap {
    /// Every row starts out not checked in
    pub fn for_passengers(rows: &[PassengerRow]) -> Self {
        Self(rows.iter().map(|r| (r.id.clone(), false)).collect())
    }

    pub fn is_checked_in(&self, passenger_id: &str) -> bool {
        self.0.get(passenger_id).copied().unwrap_or(false)
    }

    /// Flip one passenger. Returns the new state.
    pub fn toggle(&mut self, passenger_id: &str) -> Result<bool, ManifestError> {
        let flag = self
            .0
            .get_mut(passenger_id)
            .ok_or_else(|| ManifestError::UnknownPassenger(passenger_id.to_string()))?;
        *flag = !*flag;
        Ok(*flag)
    }

    /// Check everyone in. Returns how many flags actually changed.
    pub fn mark_all_present(&mut self) -> usize {
        let mut changed = 0;
        for flag in self.0.values_mut().filter(|f| !**f) {
            *flag = true;
            changed += 1;
        }
        changed
    }

    pub fn checked_in_count(&self) -> usize {
        self.0.values().filter(|f| **f).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Blocking yes/no prompt put in front of bulk or irreversible operator actions
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answer collected before the call, e.g. a `confirm` flag in a request body
#[derive(Debug, Clone, Copy)]
pub struct Preconfirmed(pub bool);

impl Confirm for Preconfirmed {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourops_shared::Masked;

    fn row(id: &str, seat: u32) -> PassengerRow {
        PassengerRow {
            id: id.to_string(),
            name: id.to_uppercase(),
            booking_id: "b".to_string(),
            booking_display_id: "TB0001".to_string(),
            phone: Masked::from("0"),
            payment_status: "PAID".to_string(),
            seat_number: seat,
            emergency_contact: None,
        }
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let rows = vec![row("a", 1), row("b", 2)];
        let mut map = CheckInMap::for_passengers(&rows);
        let original = map.clone();

        assert!(map.toggle("a").unwrap());
        assert!(map.is_checked_in("a"));
        assert!(!map.toggle("a").unwrap());
        assert_eq!(map, original);
    }

    #[test]
    fn test_unknown_passenger_is_rejected() {
        let mut map = CheckInMap::for_passengers(&[row("a", 1)]);
        assert!(matches!(map.toggle("ghost"), Err(ManifestError::UnknownPassenger(_))));
        assert_eq!(map.checked_in_count(), 0);
    }

    #[test]
    fn test_mark_all_present() {
        let rows = vec![row("a", 1), row("b", 2), row("c", 3)];
        let mut map = CheckInMap::for_passengers(&rows);
        map.toggle("b").unwrap();

        assert_eq!(map.mark_all_present(), 2);
        assert!(rows.iter().all(|r| map.is_checked_in(&r.id)));
        assert_eq!(map.mark_all_present(), 0);
    }

    #[test]
    fn test_confirm_impls() {
        assert!(Preconfirmed(true).confirm("Mark all present?"));
        assert!(!Preconfirmed(false).confirm("Mark all present?"));
        let decline = |_: &str| false;
        assert!(!decline.confirm("Start tour?"));
    }
}
