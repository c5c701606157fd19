use shared::{CollectionKind, FieldErrors};

/// Errors surfaced by the farm domain
///
/// Save failures after a mutation are not errors: the mutation stands and the
/// collection is flagged as pending sync instead.
#[derive(Debug, thiserror::Error)]
pub enum FarmError {
    #[error("Fill in all required fields")]
    Validation(FieldErrors),
    #[error("Select at least a day, month or year to filter")]
    EmptyFilter,
    #[error("Lot '{lot}' still has {count} head of cattle assigned")]
    LotInUse { lot: String, count: usize },
    #[error("{kind} record not found: {id}")]
    NotFound { kind: CollectionKind, id: String },
    #[error("No user is signed in")]
    NoSession,
    #[error("Storage failure: {0}")]
    Persistence(#[source] anyhow::Error),
}

pub type FarmResult<T> = Result<T, FarmError>;
