use std::collections::{BTreeMap, BTreeSet};

use serde_derive::{Deserialize, Serialize};

use crate::model::{Offering, OfferingSelection};

/// Per-offering selection state of one booking, keyed by offering id.
///
/// The mandatory and package-included id sets are remembered from the last
/// [`OfferingLedger::reconcile`] so that `toggle` can honour them.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OfferingLedger {
    entries: BTreeMap<i32, OfferingSelection>,
    mandatory_ids: BTreeSet<i32>,
    package_ids: BTreeSet<i32>,
}

impl OfferingLedger {
    pub fn new() -> OfferingLedger {
        OfferingLedger::default()
    }

    pub fn get(&self, offering_id: i32) -> Option<&OfferingSelection> {
        self.entries.get(&offering_id)
    }

    pub fn selections(&self) -> impl Iterator<Item = &OfferingSelection> {
        self.entries.values()
    }

    pub fn is_mandatory(&self, offering_id: i32) -> bool {
        self.mandatory_ids.contains(&offering_id)
    }

    pub fn is_package_included(&self, offering_id: i32) -> bool {
        self.package_ids.contains(&offering_id)
    }

    pub fn toggle(&mut self, offering: &Offering, selected: bool) {
        if !selected {
            if self.is_mandatory(offering.id) || offering.is_mandatory {
                return;
            }
            self.entries.remove(&offering.id);
            return;
        }
        let included = self.is_package_included(offering.id);
        let quantity = self
            .entries
            .get(&offering.id)
            .map(|e| e.quantity)
            .unwrap_or(0)
            .max(1);
        self.entries.insert(
            offering.id,
            OfferingSelection {
                offering: offering.clone(),
                quantity,
                included,
            },
        );
    }

    /// Returns whether anything changed. Quantities are held to at least one
    /// and to the offering's per-booking cap when it has one.
    pub fn set_quantity(&mut self, offering_id: i32, quantity: u32) -> bool {
        let Some(entry) = self.entries.get_mut(&offering_id) else {
            return false;
        };
        let mut quantity = quantity.max(1);
        if let Some(cap) = entry.offering.max_quantity_per_booking {
            quantity = quantity.min(cap.max(1));
        }
        if entry.quantity == quantity {
            return false;
        }
        entry.quantity = quantity;
        true
    }

    /// Brings the ledger in line with the current mandatory catalog and the
    /// active package. Run after every change to either.
    pub fn reconcile(&mut self, mandatory: &[Offering], package_included: &[Offering]) {
        self.mandatory_ids = mandatory.iter().map(|o| o.id).collect();
        self.package_ids = package_included.iter().map(|o| o.id).collect();

        for offering in mandatory {
            self.entries
                .entry(offering.id)
                .or_insert_with(|| OfferingSelection {
                    offering: offering.clone(),
                    quantity: 1,
                    included: false,
                });
        }

        for offering in package_included {
            match self.entries.get_mut(&offering.id) {
                Some(entry) => {
                    entry.included = true;
                    entry.quantity = entry.quantity.max(1);
                }
                None => {
                    self.entries.insert(
                        offering.id,
                        OfferingSelection {
                            offering: offering.clone(),
                            quantity: 1,
                            included: true,
                        },
                    );
                }
            }
        }

        let package_ids = &self.package_ids;
        for entry in self.entries.values_mut() {
            if entry.included && !package_ids.contains(&entry.offering.id) {
                entry.included = false;
            }
        }
    }

    /// Swaps partial offerings (package payloads only carry ids) for the
    /// catalog's full record so prices and names are known.
    pub fn refresh_from_catalog(&mut self, catalog: &[Offering]) {
        for offering in catalog {
            if let Some(entry) = self.entries.get_mut(&offering.id) {
                entry.offering = offering.clone();
            }
        }
    }
}
