//! Farm service: the application state object for a signed-in session.
//!
//! This service owns the in-memory collections, routes every mutation through
//! the validation rules, persists the affected collection and recomputes the
//! derived views on demand.
//!
//! ## Key Responsibilities
//!
//! - **Session lifecycle**: collections are loaded on session start and dropped on session end
//! - **CRUD**: create, full-replacement update and delete for every collection
//! - **Lot guard**: lots are only deleted through the in-use check
//! - **Views**: date-filtered cattle and sales views, dashboard and report bundles
//! - **Sync tracking**: collections whose last save failed are kept as pending sync
//!
//! ## Persistence Model
//!
//! Memory is updated first and the whole collection is saved afterwards. A
//! failed save is logged and flagged, never rolled back, so the user keeps
//! seeing their change while `pending_sync` reports the gap. Saves are
//! serialized so collections reach storage in mutation order. Stored entries
//! that no longer decode are kept aside and written back with every save.

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use shared::{
    Buyer, Cattle, CollectionKind, DashboardSummary, DatePattern, Employee, FarmRecord, FarmReport,
    Lot, LotDeletionOutcome, Sale, SaleFormEdit, SaleFormState, Severity, Supply,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{error, info, warn};

use crate::domain::collections::{CollectionSlot, FarmCollections, FreelyDeletable};
use crate::domain::date_filter::DateFilter;
use crate::domain::error::{FarmError, FarmResult};
use crate::domain::lot_service::{LotDeletionDecision, LotService};
use crate::domain::notifications::NotificationSink;
use crate::domain::report_service::ReportService;
use crate::domain::validation::{self, RecordForm};
use crate::storage::{FarmRepository, SessionProvider, UserSession};

#[derive(Default)]
struct FarmState {
    collections: FarmCollections,
    cattle_filter: DateFilter,
    sales_filter: DateFilter,
    pending_sync: BTreeSet<CollectionKind>,
    /// Stored entries that failed to decode, written back on every save
    unreadable: BTreeMap<CollectionKind, Vec<Value>>,
}

/// Service for managing the farm records of the signed-in user
#[derive(Clone)]
pub struct FarmService {
    repository: FarmRepository,
    session: UserSession,
    notifier: Arc<dyn NotificationSink>,
    reports: ReportService,
    lots: LotService,
    state: Arc<RwLock<FarmState>>,
    save_lock: Arc<Mutex<()>>,
}

impl FarmService {
    pub fn new(
        repository: FarmRepository,
        session: UserSession,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            session,
            notifier,
            reports: ReportService::new(),
            lots: LotService::new(),
            state: Arc::new(RwLock::new(FarmState::default())),
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Sign `user_id` in and load all six collections.
    ///
    /// Holds the save lock for the whole switch. State is cleared before the
    /// user changes.
    pub async fn start_session(&self, user_id: &str) -> FarmResult<()> {
        info!("Starting session for user {}", user_id);
        let _save_guard = self.save_lock.lock().await;

        *self.state.write().await = FarmState::default();
        self.session.start(user_id);

        match self.load_state().await {
            Ok(loaded) => {
                *self.state.write().await = loaded;
                Ok(())
            }
            Err(e) => {
                error!("Failed to load collections for user {}: {:#}", user_id, e);
                self.session.end();
                Err(FarmError::Persistence(e))
            }
        }
    }

    /// Drop all in-memory state and sign out
    pub async fn end_session(&self) {
        let _save_guard = self.save_lock.lock().await;
        let mut state = self.state.write().await;
        let pending = state.pending_sync.len();
        if pending > 0 {
            warn!("Ending session with {} collections not synced", pending);
        }
        *state = FarmState::default();
        self.session.end();
    }

    pub fn current_user(&self) -> Option<String> {
        self.session.current_user_id()
    }

    async fn load_state(&self) -> anyhow::Result<FarmState> {
        let mut state = FarmState::default();
        self.load_into::<Cattle>(&mut state).await?;
        self.load_into::<Buyer>(&mut state).await?;
        self.load_into::<Supply>(&mut state).await?;
        self.load_into::<Employee>(&mut state).await?;
        self.load_into::<Sale>(&mut state).await?;
        self.load_into::<Lot>(&mut state).await?;

        let c = &state.collections;
        info!(
            "Loaded {} cattle, {} buyers, {} supplies, {} employees, {} sales, {} lots",
            c.cattle.len(),
            c.buyers.len(),
            c.supplies.len(),
            c.employees.len(),
            c.sales.len(),
            c.lots.len()
        );
        Ok(state)
    }

    async fn load_into<T: CollectionSlot>(&self, state: &mut FarmState) -> anyhow::Result<()> {
        let loaded = self.repository.load::<T>().await?;
        *T::slot_mut(&mut state.collections) = loaded.records;
        if !loaded.unreadable.is_empty() {
            warn!("Keeping {} unreadable {} records aside", loaded.unreadable.len(), T::KIND);
            state.unreadable.insert(T::KIND, loaded.unreadable);
        }
        Ok(())
    }

    fn require_session(&self) -> FarmResult<String> {
        self.session.current_user_id().ok_or(FarmError::NoSession)
    }

    /// Take the save lock on behalf of the signed-in user. Fails when the
    /// session changed while waiting for the lock.
    async fn lock_for_save(&self) -> FarmResult<MutexGuard<'_, ()>> {
        let user_id = self.require_session()?;
        let guard = self.save_lock.lock().await;
        if self.session.current_user_id().as_deref() != Some(user_id.as_str()) {
            warn!("Session changed while a save for {} was waiting", user_id);
            return Err(FarmError::NoSession);
        }
        Ok(guard)
    }

    /// All records of a collection in insertion order
    pub async fn list<T: CollectionSlot>(&self) -> FarmResult<Vec<T>> {
        self.require_session()?;
        let state = self.state.read().await;
        Ok(T::slot(&state.collections).clone())
    }

    pub async fn get<T: CollectionSlot>(&self, id: &str) -> FarmResult<T> {
        self.require_session()?;
        let state = self.state.read().await;
        T::slot(&state.collections)
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    /// Validate `form` and append the resulting record
    pub async fn create<F>(&self, form: &F) -> FarmResult<F::Record>
    where
        F: RecordForm,
        F::Record: CollectionSlot,
    {
        self.require_session()?;
        let record = form
            .build(shared::generate_record_id(), Utc::now())
            .map_err(|errors| self.reject(errors))?;

        self.insert(record, F::CREATED_MESSAGE).await
    }

    /// Replace every field of an existing record with the form's values
    pub async fn update<F>(&self, id: &str, form: &F) -> FarmResult<F::Record>
    where
        F: RecordForm,
        F::Record: CollectionSlot,
    {
        let _save_guard = self.lock_for_save().await?;

        let (updated, snapshot) = {
            let mut state = self.state.write().await;
            let records = <F::Record as CollectionSlot>::slot_mut(&mut state.collections);
            let position = records
                .iter()
                .position(|record| record.id() == id)
                .ok_or_else(|| not_found::<F::Record>(id))?;

            let updated = form
                .apply_to(&records[position])
                .map_err(|errors| self.reject(errors))?;
            records[position] = updated.clone();
            (updated, records.clone())
        };

        self.persist(snapshot).await;
        self.notifier.notify(
            Severity::Success,
            &format!("{} updated", <F::Record as CollectionSlot>::LABEL),
        );
        Ok(updated)
    }

    /// Remove a record from any collection except lots
    pub async fn delete<T: FreelyDeletable>(&self, id: &str) -> FarmResult<T> {
        let _save_guard = self.lock_for_save().await?;

        let (removed, snapshot) = {
            let mut state = self.state.write().await;
            let records = T::slot_mut(&mut state.collections);
            let position = records
                .iter()
                .position(|record| record.id() == id)
                .ok_or_else(|| not_found::<T>(id))?;
            let removed = records.remove(position);
            (removed, records.clone())
        };

        self.persist(snapshot).await;
        self.notifier
            .notify(Severity::Success, &format!("{} removed", T::LABEL));
        Ok(removed)
    }

    /// Delete a lot through the in-use guard.
    ///
    /// Both the inline lot list and the lot management dialog call this.
    pub async fn delete_lot(&self, lot_id: &str, confirmed: bool) -> FarmResult<LotDeletionOutcome> {
        let _save_guard = self.lock_for_save().await?;

        let (lot, snapshot) = {
            let mut state = self.state.write().await;
            let position = state
                .collections
                .lots
                .iter()
                .position(|lot| lot.id == lot_id)
                .ok_or_else(|| not_found::<Lot>(lot_id))?;

            let decision = self
                .lots
                .check_deletion(&state.collections.lots[position], &state.collections.cattle, confirmed);
            match decision {
                Err(e) => {
                    warn!("Refusing to delete lot {}: {}", lot_id, e);
                    self.notifier.notify(Severity::Error, &e.to_string());
                    return Err(e);
                }
                Ok(LotDeletionDecision::AwaitConfirmation) => {
                    let lot = state.collections.lots[position].clone();
                    return Ok(LotDeletionOutcome::ConfirmationRequired { lot });
                }
                Ok(LotDeletionDecision::Delete) => {
                    let lot = state.collections.lots.remove(position);
                    (lot, state.collections.lots.clone())
                }
            }
        };

        self.persist(snapshot).await;
        self.notifier
            .notify(Severity::Success, &format!("Lot '{}' removed", lot.name));
        Ok(LotDeletionOutcome::Deleted { lot })
    }

    /// Apply a user edit to the sale form, clearing that field's error flag
    pub fn edit_sale_form(&self, form_state: &mut SaleFormState, edit: SaleFormEdit) {
        validation::apply_sale_edit(form_state, edit);
    }

    /// Submit the sale form. On failure the form keeps its values and gets the
    /// new flags; on success the sale is appended and the form is reset.
    pub async fn submit_sale(&self, form_state: &mut SaleFormState, today: NaiveDate) -> FarmResult<Sale> {
        self.require_session()?;
        let sale = match form_state.form.build(shared::generate_record_id(), Utc::now()) {
            Ok(sale) => sale,
            Err(errors) => {
                form_state.errors = errors.clone();
                return Err(self.reject(errors));
            }
        };

        let sale = self.insert(sale, <shared::SaleForm as RecordForm>::CREATED_MESSAGE).await?;
        validation::reset_sale_form(form_state, today);
        Ok(sale)
    }

    async fn insert<T: CollectionSlot>(&self, record: T, message: &str) -> FarmResult<T> {
        let _save_guard = self.lock_for_save().await?;

        let snapshot = {
            let mut state = self.state.write().await;
            let records = T::slot_mut(&mut state.collections);
            records.push(record.clone());
            records.clone()
        };

        self.persist(snapshot).await;
        self.notifier.notify(Severity::Success, message);
        Ok(record)
    }

    fn reject(&self, errors: shared::FieldErrors) -> FarmError {
        let error = FarmError::Validation(errors);
        self.notifier.notify(Severity::Warning, &error.to_string());
        error
    }

    /// Save a whole collection; failures leave memory as is and flag the kind
    async fn persist<T: CollectionSlot>(&self, snapshot: Vec<T>) {
        let preserved = self
            .state
            .read()
            .await
            .unreadable
            .get(&T::KIND)
            .cloned()
            .unwrap_or_default();
        let result = self.repository.save(&snapshot, &preserved).await;
        let mut state = self.state.write().await;

        match result {
            Ok(()) => {
                state.pending_sync.remove(&T::KIND);
            }
            Err(e) => {
                error!("Failed to save {} ({} records): {:#}", T::KIND, snapshot.len(), e);
                state.pending_sync.insert(T::KIND);
                self.notifier.notify(
                    Severity::Warning,
                    &format!("{} changes are not synced yet", T::LABEL),
                );
            }
        }
    }

    /// Collections whose in-memory state is ahead of storage
    pub async fn pending_sync(&self) -> Vec<CollectionKind> {
        self.state.read().await.pending_sync.iter().copied().collect()
    }

    /// Save every pending collection again; returns what is still pending
    pub async fn retry_pending_sync(&self) -> FarmResult<Vec<CollectionKind>> {
        let _save_guard = self.lock_for_save().await?;

        for kind in self.pending_sync().await {
            info!("Retrying sync of {}", kind);
            match kind {
                CollectionKind::Cattle => self.persist_current::<Cattle>().await,
                CollectionKind::Buyers => self.persist_current::<Buyer>().await,
                CollectionKind::Supplies => self.persist_current::<Supply>().await,
                CollectionKind::Employees => self.persist_current::<Employee>().await,
                CollectionKind::Sales => self.persist_current::<Sale>().await,
                CollectionKind::Lots => self.persist_current::<Lot>().await,
            }
        }

        Ok(self.pending_sync().await)
    }

    async fn persist_current<T: CollectionSlot>(&self) {
        let snapshot = T::slot(&self.state.read().await.collections).clone();
        self.persist(snapshot).await;
    }

    /// Activate the cattle view filter and return the filtered view
    pub async fn apply_cattle_filter(&self, pattern: DatePattern) -> FarmResult<Vec<Cattle>> {
        self.require_session()?;
        let mut state = self.state.write().await;
        if let Err(e) = state.cattle_filter.apply(pattern) {
            self.notifier.notify(Severity::Warning, &e.to_string());
            return Err(e);
        }
        Ok(state.cattle_filter.filter(&state.collections.cattle))
    }

    pub async fn clear_cattle_filter(&self) -> FarmResult<Vec<Cattle>> {
        self.require_session()?;
        let mut state = self.state.write().await;
        state.cattle_filter.clear();
        Ok(state.collections.cattle.clone())
    }

    /// Cattle under the current filter, or all cattle when no filter is active
    pub async fn cattle_view(&self) -> FarmResult<Vec<Cattle>> {
        self.require_session()?;
        let state = self.state.read().await;
        Ok(state.cattle_filter.filter(&state.collections.cattle))
    }

    pub async fn apply_sales_filter(&self, pattern: DatePattern) -> FarmResult<Vec<Sale>> {
        self.require_session()?;
        let mut state = self.state.write().await;
        if let Err(e) = state.sales_filter.apply(pattern) {
            self.notifier.notify(Severity::Warning, &e.to_string());
            return Err(e);
        }
        Ok(state.sales_filter.filter(&state.collections.sales))
    }

    pub async fn clear_sales_filter(&self) -> FarmResult<Vec<Sale>> {
        self.require_session()?;
        let mut state = self.state.write().await;
        state.sales_filter.clear();
        Ok(state.collections.sales.clone())
    }

    pub async fn sales_view(&self) -> FarmResult<Vec<Sale>> {
        self.require_session()?;
        let state = self.state.read().await;
        Ok(state.sales_filter.filter(&state.collections.sales))
    }

    pub async fn dashboard(&self, today: NaiveDate) -> FarmResult<DashboardSummary> {
        self.require_session()?;
        let state = self.state.read().await;
        let c = &state.collections;
        Ok(self
            .reports
            .dashboard(&c.cattle, &c.buyers, &c.supplies, &c.sales, &c.lots, today))
    }

    pub async fn farm_report(&self, today: NaiveDate) -> FarmResult<FarmReport> {
        self.require_session()?;
        let state = self.state.read().await;
        let c = &state.collections;
        Ok(self
            .reports
            .farm_report(&c.cattle, &c.buyers, &c.employees, &c.supplies, &c.sales, &c.lots, today))
    }
}

fn not_found<T: CollectionSlot>(id: &str) -> FarmError {
    FarmError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}
