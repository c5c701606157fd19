//! In-memory collections owned by a signed-in session.

use shared::{Buyer, Cattle, Employee, FarmRecord, Lot, Sale, Supply};

/// All six collections in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FarmCollections {
    pub cattle: Vec<Cattle>,
    pub buyers: Vec<Buyer>,
    pub supplies: Vec<Supply>,
    pub employees: Vec<Employee>,
    pub sales: Vec<Sale>,
    pub lots: Vec<Lot>,
}

/// Maps a record type to its slot in [`FarmCollections`]
pub trait CollectionSlot: FarmRecord {
    /// Singular label used in user messages
    const LABEL: &'static str;

    fn slot(collections: &FarmCollections) -> &Vec<Self>;

    fn slot_mut(collections: &mut FarmCollections) -> &mut Vec<Self>;
}

/// Records that can be removed without a referential guard.
/// Lots are deliberately excluded; they go through the lot deletion guard.
pub trait FreelyDeletable: CollectionSlot {}

macro_rules! collection_slot {
    ($record:ty, $field:ident, $label:literal) => {
        impl CollectionSlot for $record {
            const LABEL: &'static str = $label;

            fn slot(collections: &FarmCollections) -> &Vec<Self> {
                &collections.$field
            }

            fn slot_mut(collections: &mut FarmCollections) -> &mut Vec<Self> {
                &mut collections.$field
            }
        }
    };
}

collection_slot!(Cattle, cattle, "Cattle");
collection_slot!(Buyer, buyers, "Buyer");
collection_slot!(Supply, supplies, "Supply");
collection_slot!(Employee, employees, "Employee");
collection_slot!(Sale, sales, "Sale");
collection_slot!(Lot, lots, "Lot");

impl FreelyDeletable for Cattle {}
impl FreelyDeletable for Buyer {}
impl FreelyDeletable for Supply {}
impl FreelyDeletable for Employee {}
impl FreelyDeletable for Sale {}
