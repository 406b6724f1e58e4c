use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tourops_shared::{Booking, Package};

/// Prefix base when a package has neither code nor title
const DEFAULT_PREFIX: &str = "TB";
const PREFIX_SUFFIX: &str = "000";
const INITIAL_PADDING: char = 'X';

/// Position of a booking within its package, plus the derived display id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSequence {
    pub sequence: usize,
    pub display_id: String,
}

/// Display ids keyed by booking id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayIds(HashMap<String, BookingSequence>);

impl DisplayIds {
    pub fn get(&self, booking_id: &str) -> Option<&BookingSequence> {
        self.0.get(booking_id)
    }

    pub fn display_id(&self, booking_id: &str) -> Option<&str> {
        self.0.get(booking_id).map(|s| s.display_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Assigns per-package booking sequence numbers.
///
/// Must be fed every booking of a package, not only one departure's, otherwise
/// the numbers shift depending on which departure is being looked at.
pub struct BookingSequencer {
    packages: HashMap<String, Package>,
}

impl BookingSequencer {
    pub fn new(packages: &[Package]) -> Self {
        Self {
            packages: packages
                .iter()
                .map(|p| (p.id.clone(), p.clone()))
                .collect(),
        }
    }

    pub fn assign(&self, bookings: &[Booking]) -> DisplayIds {
        let mut by_package: BTreeMap<&str, Vec<&Booking>> = BTreeMap::new();
        for booking in bookings {
            by_package
                .entry(booking.package_id.as_str())
                .or_default()
                .push(booking);
        }

        let mut ids = HashMap::with_capacity(bookings.len());
        for (package_id, mut group) in by_package {
            // stable: equal timestamps keep input order
            group.sort_by_key(|b| b.created_at);

            let prefix = display_prefix(self.packages.get(package_id));
            for (index, booking) in group.into_iter().enumerate() {
                let sequence = index + 1;
                ids.insert(
                    booking.id.clone(),
                    BookingSequence {
                        sequence,
                        display_id: format!("{}{}", prefix, sequence),
                    },
                );
            }
        }

        DisplayIds(ids)
    }
}

/// Display id prefix for a package: explicit code, else title initials, always
/// followed by `000`.
pub fn display_prefix(package: Option<&Package>) -> String {
    let Some(package) = package else {
        return format!("{}{}", DEFAULT_PREFIX, PREFIX_SUFFIX);
    };

    let code = package.code.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let title = package.title.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let base = match (code, title) {
        (Some(code), _) => code.to_uppercase(),
        (None, Some(title)) => title_initials(title),
        (None, None) => DEFAULT_PREFIX.to_string(),
    };

    format!("{}{}", base, PREFIX_SUFFIX)
}

fn title_initials(title: &str) -> String {
    let mut initials: String = title
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    while initials.chars().count() < 2 {
        initials.push(INITIAL_PADDING);
    }
    initials
}
