//! Ledger service: the single owner of the live ledger
//!
//! Every write runs under one async mutex. The operation is applied to a
//! staged copy; with auto-save on, the copy is persisted before it replaces
//! the live ledger, so a failed save leaves both the ledger and the backing
//! store as they were.

use std::sync::Arc;

use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    BudgetRecord, DistributionInput, InflowRecord, LedgerSnapshot, PurchaseInput, TableKind,
};
use tokio::sync::Mutex;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{DistributionOutcome, Ledger};
use crate::storage::{self, workbook, LedgerSource};

struct Session {
    ledger: Ledger,
    /// Revision last written to or read from the source
    persisted_revision: u64,
}

/// Ledger service shared by all handlers
#[derive(Clone)]
pub struct LedgerService {
    session: Arc<Mutex<Session>>,
    source: Arc<LedgerSource>,
    auto_save: bool,
}

/// Revision and persistence state of the live ledger
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStatus {
    pub source: String,
    pub writable: bool,
    pub auto_save: bool,
    pub revision: u64,
    pub persisted_revision: u64,
    /// True when the live ledger has changes the source does not
    pub dirty: bool,
    pub budget_year: i32,
    pub inflow_rows: usize,
    pub outflow_rows: usize,
    pub budget_rows: usize,
}

impl LedgerService {
    pub fn new(ledger: Ledger, source: LedgerSource, auto_save: bool) -> Self {
        let auto_save = if auto_save && !source.is_writable() {
            tracing::warn!("{} is read-only; auto-save disabled", source);
            false
        } else {
            auto_save
        };

        Self {
            session: Arc::new(Mutex::new(Session {
                persisted_revision: ledger.revision(),
                ledger,
            })),
            source: Arc::new(source),
            auto_save,
        }
    }

    /// Load the ledger from `source` and wrap it in a service
    pub async fn load(source: LedgerSource, auto_save: bool) -> LedgerResult<Self> {
        let ledger = storage::load_ledger(&source).await?;
        Ok(Self::new(ledger, source, auto_save))
    }

    pub fn source(&self) -> &LedgerSource {
        &self.source
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    pub async fn status(&self) -> LedgerStatus {
        let session = self.session.lock().await;
        self.status_of(&session)
    }

    fn status_of(&self, session: &Session) -> LedgerStatus {
        let ledger = &session.ledger;
        LedgerStatus {
            source: self.source.to_string(),
            writable: self.source.is_writable(),
            auto_save: self.auto_save,
            revision: ledger.revision(),
            persisted_revision: session.persisted_revision,
            dirty: ledger.revision() != session.persisted_revision,
            budget_year: ledger.budget_year(),
            inflow_rows: ledger.inflow().len(),
            outflow_rows: ledger.outflow().len(),
            budget_rows: ledger.budget().len(),
        }
    }

    pub async fn revision(&self) -> u64 {
        self.session.lock().await.ledger.revision()
    }

    /// Copy of the current ledger for read-only use outside the lock
    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.session.lock().await.ledger.snapshot()
    }

    /// Rows of one table as JSON
    pub async fn table(&self, table: TableKind) -> LedgerResult<serde_json::Value> {
        let session = self.session.lock().await;
        Ok(serde_json::to_value(session.ledger.get(table))?)
    }

    pub async fn available_items(&self) -> Vec<InflowRecord> {
        let session = self.session.lock().await;
        session
            .ledger
            .available_items()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn purchase(&self, input: PurchaseInput) -> LedgerResult<InflowRecord> {
        let now = Local::now().naive_local();
        self.commit(move |ledger| ledger.purchase(input, now)).await
    }

    pub async fn distribute(&self, input: DistributionInput) -> LedgerResult<DistributionOutcome> {
        let today = Local::now().date_naive();
        self.commit(move |ledger| ledger.distribute(input, today)).await
    }

    pub async fn delete_purchase(&self, item_id: &str) -> LedgerResult<InflowRecord> {
        self.commit(|ledger| ledger.delete_purchase(item_id)).await
    }

    pub async fn set_budget(&self, event_type: &str, amount: Decimal) -> LedgerResult<BudgetRecord> {
        self.commit(|ledger| ledger.set_budget(event_type, amount))
            .await
    }

    pub async fn remove_budget(&self, event_type: &str) -> LedgerResult<BudgetRecord> {
        self.commit(|ledger| ledger.remove_budget(event_type)).await
    }

    /// Discard the live ledger and read the source again
    pub async fn reload(&self) -> LedgerResult<LedgerStatus> {
        let mut session = self.session.lock().await;
        let mut ledger = storage::load_ledger(&self.source).await?;
        ledger.continue_after(session.ledger.revision());

        session.persisted_revision = ledger.revision();
        session.ledger = ledger;
        tracing::info!("Reloaded ledger at revision {}", session.ledger.revision());
        Ok(self.status_of(&session))
    }

    /// Replace the live ledger with an uploaded workbook
    pub async fn replace_from_workbook(&self, bytes: Vec<u8>) -> LedgerResult<LedgerStatus> {
        let sheets = tokio::task::spawn_blocking(move || workbook::read_bytes(&bytes))
            .await
            .map_err(|e| LedgerError::Internal(format!("workbook task failed: {}", e)))??;
        let imported = Ledger::from_sheets(&sheets)?;

        let mut session = self.session.lock().await;
        let mut staged = imported;
        staged.continue_after(session.ledger.revision());
        self.persist_and_swap(&mut session, staged).await?;

        tracing::info!(
            "Imported workbook: {} inflow, {} outflow, {} budget rows",
            session.ledger.inflow().len(),
            session.ledger.outflow().len(),
            session.ledger.budget().len()
        );
        Ok(self.status_of(&session))
    }

    /// Current ledger as `.xlsx` bytes
    pub async fn export_workbook(&self) -> LedgerResult<Vec<u8>> {
        let sheets = self.session.lock().await.ledger.to_sheets();
        tokio::task::spawn_blocking(move || workbook::to_bytes(&sheets))
            .await
            .map_err(|e| LedgerError::Internal(format!("workbook task failed: {}", e)))?
    }

    /// Persist the live ledger now, regardless of auto-save
    pub async fn save(&self) -> LedgerResult<LedgerStatus> {
        if !self.source.is_writable() {
            return Err(LedgerError::ReadOnlySource(self.source.to_string()));
        }
        let mut session = self.session.lock().await;
        storage::save_ledger(&self.source, &session.ledger).await?;
        session.persisted_revision = session.ledger.revision();
        Ok(self.status_of(&session))
    }

    /// Apply `op` to a staged copy and swap it in if it changed anything
    async fn commit<T, F>(&self, op: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut Ledger) -> LedgerResult<T>,
    {
        let mut session = self.session.lock().await;
        let mut staged = session.ledger.clone();
        let result = op(&mut staged)?;

        if staged.revision() != session.ledger.revision() {
            self.persist_and_swap(&mut session, staged).await?;
        }
        Ok(result)
    }

    async fn persist_and_swap(&self, session: &mut Session, staged: Ledger) -> LedgerResult<()> {
        if self.auto_save {
            storage::save_ledger(&self.source, &staged).await?;
            session.persisted_revision = staged.revision();
        }
        session.ledger = staged;
        Ok(())
    }
}
