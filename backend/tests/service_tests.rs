//! Ledger service tests
//!
//! Concurrency, idempotency and auto-save behaviour of the shared service.

use inventory_ledger_backend::{
    services::LedgerService,
    storage::{load_ledger, LedgerSource},
    Ledger, LedgerError,
};
use rust_decimal::Decimal;
use shared::{DistributionInput, PurchaseInput};

fn purchase(id: &str, quantity: i64) -> PurchaseInput {
    PurchaseInput {
        item_id: Some(id.to_string()),
        item_type: "S".to_string(),
        item_name: "Lanyard".to_string(),
        cost_per_item: Decimal::new(150, 2),
        quantity,
        vendor_name: "Acme".to_string(),
        ..Default::default()
    }
}

fn distribution(id: &str, quantity: i64) -> DistributionInput {
    DistributionInput {
        item_id: id.to_string(),
        quantity,
        event_type: "Open House".to_string(),
        event_name: "Fall Open House".to_string(),
        department: "Admissions".to_string(),
        ..Default::default()
    }
}

fn in_memory_service() -> LedgerService {
    let dir = std::env::temp_dir().join("inventory-ledger-unused");
    LedgerService::new(Ledger::new(), LedgerSource::CsvDirectory(dir), false)
}

#[tokio::test]
async fn test_concurrent_distributions_exactly_one_succeeds() {
    let service = in_memory_service();
    service.purchase(purchase("I1", 10)).await.unwrap();

    let a = tokio::spawn({
        let service = service.clone();
        async move { service.distribute(distribution("I1", 6)).await }
    });
    let b = tokio::spawn({
        let service = service.clone();
        async move { service.distribute(distribution("I1", 6)).await }
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let shortages = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::InsufficientStock { .. })))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(shortages, 1);

    let snapshot = service.snapshot().await;
    assert_eq!(snapshot.find_item("I1").unwrap().quantity_left, 4);
    assert_eq!(snapshot.outflow.len(), 1);
}

#[tokio::test]
async fn test_many_concurrent_single_unit_distributions() {
    let service = in_memory_service();
    service.purchase(purchase("I1", 25)).await.unwrap();

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.distribute(distribution("I1", 1)).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 25);
    let snapshot = service.snapshot().await;
    assert_eq!(snapshot.find_item("I1").unwrap().quantity_left, 0);
}

#[tokio::test]
async fn test_double_submit_is_absorbed() {
    let service = in_memory_service();
    service.purchase(purchase("I1", 10)).await.unwrap();

    let mut input = distribution("I1", 3);
    input.request_id = Some("form-7".to_string());

    let first = service.distribute(input.clone()).await.unwrap();
    let second = service.distribute(input).await.unwrap();

    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(second.quantity_left, 7);
    assert_eq!(service.snapshot().await.outflow.len(), 1);
}

#[tokio::test]
async fn test_auto_save_persists_every_write() {
    let dir = tempfile::tempdir().unwrap();
    let source = LedgerSource::Snapshot(dir.path().join("ledger.json"));
    let service = LedgerService::new(Ledger::new(), source.clone(), true);

    service.purchase(purchase("I1", 10)).await.unwrap();
    service.distribute(distribution("I1", 4)).await.unwrap();

    let status = service.status().await;
    assert!(!status.dirty);
    assert_eq!(status.persisted_revision, status.revision);

    let on_disk = load_ledger(&source).await.unwrap();
    assert_eq!(on_disk.find_item("I1").unwrap().quantity_left, 6);
    assert_eq!(on_disk.revision(), status.revision);
}

#[tokio::test]
async fn test_failed_save_leaves_ledger_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the CSV directory should be
    let blocker = dir.path().join("ledger");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let service = LedgerService::new(Ledger::new(), LedgerSource::CsvDirectory(blocker), true);

    let err = service.purchase(purchase("I1", 10)).await.unwrap_err();
    assert!(matches!(err, LedgerError::Io(_)));

    let snapshot = service.snapshot().await;
    assert!(snapshot.inflow.is_empty());
    assert_eq!(snapshot.revision, 0);
}

#[tokio::test]
async fn test_manual_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let source = LedgerSource::CsvDirectory(dir.path().join("ledger"));
    let service = LedgerService::new(Ledger::new(), source, false);

    service.purchase(purchase("I1", 10)).await.unwrap();
    assert!(service.status().await.dirty);

    let saved = service.save().await.unwrap();
    assert!(!saved.dirty);

    service.purchase(purchase("I2", 1)).await.unwrap();
    let reloaded = service.reload().await.unwrap();

    // The unsaved purchase is discarded; revisions keep increasing
    assert_eq!(reloaded.inflow_rows, 1);
    assert!(reloaded.revision > saved.revision);
    assert!(!reloaded.dirty);
}

#[tokio::test]
async fn test_read_only_source_disables_auto_save() {
    let source = LedgerSource::PublicSheet("https://sheets.example/export?sheet=".to_string());
    let service = LedgerService::new(Ledger::new(), source, true);
    assert!(!service.auto_save());

    // Writes still apply in memory
    service.purchase(purchase("I1", 1)).await.unwrap();
    assert!(matches!(
        service.save().await,
        Err(LedgerError::ReadOnlySource(_))
    ));
}

#[tokio::test]
async fn test_workbook_import_and_export() {
    let source = in_memory_service();
    source.purchase(purchase("I1", 10)).await.unwrap();
    source.distribute(distribution("I1", 2)).await.unwrap();
    let bytes = source.export_workbook().await.unwrap();

    let target = in_memory_service();
    target.purchase(purchase("OLD", 1)).await.unwrap();
    let before = target.revision().await;
    let status = target.replace_from_workbook(bytes).await.unwrap();

    assert!(status.revision > before);
    let snapshot = target.snapshot().await;
    assert!(snapshot.find_item("OLD").is_none());
    assert_eq!(snapshot.find_item("I1").unwrap().quantity_left, 8);

    let err = target.replace_from_workbook(b"garbage".to_vec()).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidUpload(_)));
    assert!(target.snapshot().await.find_item("I1").is_some());
}
