//! Lot lifecycle rules.
//!
//! A lot cannot be deleted while any cattle record still names it. Deleting
//! an unreferenced lot takes two steps: the first request only reports that
//! confirmation is needed, the confirmed request removes it.

use shared::{Cattle, Lot};

use super::error::{FarmError, FarmResult};

/// Decision for a deletion request that passed the in-use guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotDeletionDecision {
    AwaitConfirmation,
    Delete,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LotService;

impl LotService {
    pub fn new() -> Self {
        Self
    }

    /// Number of cattle whose lot field equals the lot's name
    pub fn cattle_in_lot(&self, lot: &Lot, cattle: &[Cattle]) -> usize {
        cattle.iter().filter(|animal| animal.lot == lot.name).count()
    }

    /// Guard shared by every place a lot can be deleted from
    pub fn check_deletion(
        &self,
        lot: &Lot,
        cattle: &[Cattle],
        confirmed: bool,
    ) -> FarmResult<LotDeletionDecision> {
        let count = self.cattle_in_lot(lot, cattle);
        if count > 0 {
            return Err(FarmError::LotInUse {
                lot: lot.name.clone(),
                count,
            });
        }

        Ok(if confirmed {
            LotDeletionDecision::Delete
        } else {
            LotDeletionDecision::AwaitConfirmation
        })
    }
}
