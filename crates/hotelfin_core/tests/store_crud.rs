use hotelfin_core::db::open_db_in_memory;
use hotelfin_core::{
    by_project, portfolio, Action, CapabilitySet, InMemoryLedgerRepository, LedgerRepository,
    LedgerSnapshot, LedgerStore, LedgerStoreError, Permission, ProjectDraft, ProjectIcon,
    ProjectPatch, SqliteLedgerRepository, TransactionDraft, TransactionFilter, TransactionPatch,
};
use hotelfin_core::model::project::Project;
use hotelfin_core::model::transaction::{Transaction, TransactionValidationError};
use hotelfin_core::RepoResult;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::thread;
use std::time::Duration;
use uuid::Uuid;

fn admin() -> CapabilitySet {
    CapabilitySet::super_privileged()
}

fn project_draft(name: &str) -> ProjectDraft {
    ProjectDraft {
        name: name.to_string(),
        icon: ProjectIcon::Hotel,
        ..ProjectDraft::default()
    }
}

fn transaction_draft(
    date: &str,
    kind: &str,
    amount: Decimal,
    project: Option<Uuid>,
) -> TransactionDraft {
    TransactionDraft {
        date: date.to_string(),
        kind: kind.to_string(),
        amount,
        note: String::new(),
        project,
    }
}

fn deleting_project_cascades_its_transactions<R: LedgerRepository>(store: &LedgerStore<R>) {
    let caps = admin();
    let p1 = store.create_project(&caps, project_draft("Seaside Lodge")).unwrap();
    let p2 = store.create_project(&caps, project_draft("City Hotel")).unwrap();

    for (kind, amount) in [("income", dec!(1000)), ("expense", dec!(400)), ("investment", dec!(50))] {
        store
            .create_transaction(&caps, transaction_draft("2024-01-01", kind, amount, Some(p1.id)))
            .unwrap();
    }
    let kept = store
        .create_transaction(&caps, transaction_draft("2024-01-02", "income", dec!(70), Some(p2.id)))
        .unwrap();
    let general = store
        .create_transaction(&caps, transaction_draft("2024-01-03", "expense", dec!(5), None))
        .unwrap();

    let removed = store.delete_project(&caps, p1.id).unwrap();
    assert_eq!(removed, 3);

    let remaining = store.list_transactions().unwrap();
    assert!(by_project(&remaining, p1.id).is_zero());
    assert_eq!(portfolio(&remaining).net, dec!(65));
    let ids: Vec<Uuid> = remaining.iter().map(|transaction| transaction.id).collect();
    assert_eq!(ids, vec![kept.id, general.id]);

    assert!(store.get_project(p1.id).unwrap().is_none());
    let err = store.delete_project(&caps, p1.id).unwrap_err();
    assert!(matches!(err, LedgerStoreError::ProjectNotFound(id) if id == p1.id));
}

#[test]
fn cascade_delete_in_memory() {
    deleting_project_cascades_its_transactions(&LedgerStore::new(InMemoryLedgerRepository::new()));
}

#[test]
fn cascade_delete_sqlite() {
    let conn = open_db_in_memory().unwrap();
    deleting_project_cascades_its_transactions(&LedgerStore::new(SqliteLedgerRepository::new(
        &conn,
    )));
}

#[test]
fn sqlite_round_trips_records_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = LedgerStore::new(SqliteLedgerRepository::new(&conn));
    let caps = admin();

    let project = store.create_project(&caps, project_draft("  Alpine Spa  ")).unwrap();
    assert_eq!(project.name, "Alpine Spa");

    let mut draft = transaction_draft("2024/03/05", "Expense", dec!(12.50), Some(project.id));
    draft.note = "towels, \"premium\"".to_string();
    let first = store.create_transaction(&caps, draft).unwrap();
    let second = store
        .create_transaction(&caps, transaction_draft("2024-03-01", "income", dec!(300), None))
        .unwrap();

    let loaded = store.get_transaction(first.id).unwrap().unwrap();
    assert_eq!(loaded, first);
    assert_eq!(loaded.date_key(), "2024-03-05");
    assert_eq!(loaded.amount, dec!(12.5));

    let listed: Vec<Uuid> = store
        .list_transactions()
        .unwrap()
        .into_iter()
        .map(|transaction| transaction.id)
        .collect();
    assert_eq!(listed, vec![first.id, second.id]);
    assert_eq!(store.list_projects().unwrap(), vec![project]);
}

#[test]
fn forbidden_writes_leave_the_store_unchanged() {
    let store = LedgerStore::new(InMemoryLedgerRepository::new());
    let project = store.create_project(&admin(), project_draft("Harbor Inn")).unwrap();
    let before = store.snapshot().unwrap();

    let clerk = CapabilitySet::new().with(Permission::ViewReports);

    let err = store
        .create_project(&clerk, project_draft("Shadow Project"))
        .unwrap_err();
    assert!(matches!(err, LedgerStoreError::Forbidden(Action::CreateProject)));

    let err = store
        .create_transaction(
            &clerk,
            transaction_draft("2024-01-01", "income", dec!(10), Some(project.id)),
        )
        .unwrap_err();
    assert!(matches!(err, LedgerStoreError::Forbidden(Action::CreateTransaction)));

    let err = store.delete_project(&clerk, project.id).unwrap_err();
    assert!(matches!(err, LedgerStoreError::Forbidden(Action::DeleteProject)));

    let err = store.backup(&clerk).unwrap_err();
    assert!(matches!(err, LedgerStoreError::Forbidden(Action::TakeBackup)));

    assert_eq!(store.snapshot().unwrap(), before);
    assert!(store
        .export_report_csv(&clerk, &TransactionFilter::default())
        .is_ok());
}

#[test]
fn transaction_with_unknown_project_is_rejected() {
    let store = LedgerStore::new(InMemoryLedgerRepository::new());
    let ghost = Uuid::new_v4();

    let err = store
        .create_transaction(&admin(), transaction_draft("2024-01-01", "income", dec!(1), Some(ghost)))
        .unwrap_err();
    assert!(matches!(err, LedgerStoreError::UnknownProjectReference(id) if id == ghost));
    assert!(store.list_transactions().unwrap().is_empty());
}

#[test]
fn invalid_drafts_are_rejected_before_writing() {
    let store = LedgerStore::new(InMemoryLedgerRepository::new());
    let caps = admin();

    let err = store
        .create_transaction(&caps, transaction_draft("2024-01-01", "income", dec!(0), None))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerStoreError::InvalidTransaction(TransactionValidationError::NonPositiveAmount(_))
    ));

    let err = store
        .create_transaction(&caps, transaction_draft("someday", "income", dec!(5), None))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerStoreError::InvalidTransaction(TransactionValidationError::InvalidDate(_))
    ));

    let err = store
        .create_transaction(&caps, transaction_draft("2024-01-01", "transfer", dec!(5), None))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerStoreError::InvalidTransaction(TransactionValidationError::UnknownKind(_))
    ));

    let err = store.create_project(&caps, project_draft("   ")).unwrap_err();
    assert!(matches!(err, LedgerStoreError::InvalidProject(_)));

    assert!(store.list_transactions().unwrap().is_empty());
    assert!(store.list_projects().unwrap().is_empty());
}

#[test]
fn updates_patch_in_place_and_revalidate() {
    let store = LedgerStore::new(InMemoryLedgerRepository::new());
    let caps = admin();
    let project = store.create_project(&caps, project_draft("Lake House")).unwrap();
    let entry = store
        .create_transaction(&caps, transaction_draft("2024-02-02", "income", dec!(90), None))
        .unwrap();

    let renamed = store
        .update_project(
            &caps,
            project.id,
            ProjectPatch {
                name: Some("Lake House II".to_string()),
                icon: Some(ProjectIcon::Pool),
                ..ProjectPatch::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.id, project.id);
    assert_eq!(renamed.created_at, project.created_at);
    assert_eq!(renamed.icon, ProjectIcon::Pool);

    let patched = store
        .update_transaction(
            &caps,
            entry.id,
            TransactionPatch {
                amount: Some(dec!(95)),
                note: Some("late checkout".to_string()),
            },
        )
        .unwrap();
    assert_eq!(patched.date, entry.date);
    assert_eq!(patched.amount, dec!(95));

    let err = store
        .update_transaction(
            &caps,
            entry.id,
            TransactionPatch {
                amount: Some(dec!(-1)),
                note: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, LedgerStoreError::InvalidTransaction(_)));
    assert_eq!(store.get_transaction(entry.id).unwrap().unwrap().amount, dec!(95));

    store.delete_transaction(&caps, entry.id).unwrap();
    let err = store.delete_transaction(&caps, entry.id).unwrap_err();
    assert!(matches!(err, LedgerStoreError::TransactionNotFound(id) if id == entry.id));
}

#[test]
fn backup_restores_into_an_equal_snapshot() {
    let store = LedgerStore::new(InMemoryLedgerRepository::new());
    let caps = admin();
    let project = store.create_project(&caps, project_draft("Dune Resort")).unwrap();
    store
        .create_transaction(&caps, transaction_draft("2024-07-01", "income", dec!(1200.75), Some(project.id)))
        .unwrap();
    store
        .create_transaction(&caps, transaction_draft("2024-07-02", "investment", dec!(8000), None))
        .unwrap();

    let json = store.backup(&caps).unwrap();
    let restored = LedgerSnapshot::from_json(&json).unwrap();
    assert_eq!(restored, store.snapshot().unwrap());

    let copy = LedgerStore::new(
        InMemoryLedgerRepository::from_records(restored.projects, restored.transactions).unwrap(),
    );
    assert_eq!(copy.snapshot().unwrap(), store.snapshot().unwrap());
}

#[test]
fn export_report_labels_orphaned_entries_as_archived() {
    let project = ProjectDraft {
        name: "Old Motel".to_string(),
        ..ProjectDraft::default()
    };
    let store = LedgerStore::new(InMemoryLedgerRepository::new());
    let caps = admin();
    let created = store.create_project(&caps, project).unwrap();
    let snapshot = store.snapshot().unwrap();

    let orphan = Transaction::from_draft(transaction_draft(
        "2024-01-10",
        "income",
        dec!(40),
        Some(Uuid::new_v4()),
    ))
    .unwrap();
    let seeded = LedgerStore::new(
        InMemoryLedgerRepository::from_records(snapshot.projects, vec![orphan]).unwrap(),
    );
    seeded
        .create_transaction(&caps, transaction_draft("2024-01-11", "expense", dec!(15), Some(created.id)))
        .unwrap();

    let csv = seeded
        .export_report_csv(&caps, &TransactionFilter::default())
        .unwrap();
    assert!(csv.starts_with("\"Transaction Log\"\n"));
    assert!(csv.contains("\"2024-01-11\",\"expense\",\"Old Motel\",\"\",\"15\",\"25\"\n"));
    assert!(csv.contains("\"2024-01-10\",\"income\",\"Archived\",\"\",\"40\",\"40\"\n"));
    assert!(csv.ends_with("\"Portfolio Total\"\n\"Income\",\"Expense\",\"Investment\",\"Net\"\n\"40\",\"15\",\"0\",\"25\"\n"));
}

/// Memory repository whose point reads stall, widening any gap between a
/// store's read and its following write.
struct SlowReadRepository {
    inner: InMemoryLedgerRepository,
}

impl SlowReadRepository {
    const READ_DELAY: Duration = Duration::from_millis(50);

    fn new() -> Self {
        Self {
            inner: InMemoryLedgerRepository::new(),
        }
    }
}

impl LedgerRepository for SlowReadRepository {
    fn insert_project(&self, project: &Project) -> RepoResult<Uuid> {
        self.inner.insert_project(project)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        self.inner.update_project(project)
    }

    fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        let project = self.inner.get_project(id);
        thread::sleep(Self::READ_DELAY);
        project
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.inner.list_projects()
    }

    fn delete_project_cascade(&self, id: Uuid) -> RepoResult<usize> {
        self.inner.delete_project_cascade(id)
    }

    fn insert_transaction(&self, transaction: &Transaction) -> RepoResult<Uuid> {
        self.inner.insert_transaction(transaction)
    }

    fn update_transaction(&self, transaction: &Transaction) -> RepoResult<()> {
        self.inner.update_transaction(transaction)
    }

    fn get_transaction(&self, id: Uuid) -> RepoResult<Option<Transaction>> {
        let transaction = self.inner.get_transaction(id);
        thread::sleep(Self::READ_DELAY);
        transaction
    }

    fn list_transactions(&self) -> RepoResult<Vec<Transaction>> {
        self.inner.list_transactions()
    }

    fn delete_transaction(&self, id: Uuid) -> RepoResult<()> {
        self.inner.delete_transaction(id)
    }
}

#[test]
fn concurrent_patches_on_one_transaction_both_apply() {
    let store = LedgerStore::new(SlowReadRepository::new());
    let caps = admin();
    let entry = store
        .create_transaction(&caps, transaction_draft("2024-09-01", "income", dec!(100), None))
        .unwrap();

    thread::scope(|scope| {
        let amount_patch = scope.spawn(|| {
            store.update_transaction(
                &caps,
                entry.id,
                TransactionPatch {
                    amount: Some(dec!(500)),
                    note: None,
                },
            )
        });
        let note_patch = scope.spawn(|| {
            store.update_transaction(
                &caps,
                entry.id,
                TransactionPatch {
                    amount: None,
                    note: Some("paid".to_string()),
                },
            )
        });
        amount_patch.join().unwrap().unwrap();
        note_patch.join().unwrap().unwrap();
    });

    let stored = store.get_transaction(entry.id).unwrap().unwrap();
    assert_eq!(stored.amount, dec!(500));
    assert_eq!(stored.note, "paid");
}

#[test]
fn create_racing_project_delete_never_leaves_a_dangling_reference() {
    let store = LedgerStore::new(SlowReadRepository::new());
    let caps = admin();
    let project = store.create_project(&caps, project_draft("Pier Hostel")).unwrap();

    let (created, removed) = thread::scope(|scope| {
        let create = scope.spawn(|| {
            store.create_transaction(
                &caps,
                transaction_draft("2024-09-02", "expense", dec!(20), Some(project.id)),
            )
        });
        let delete = scope.spawn(|| store.delete_project(&caps, project.id));
        (create.join().unwrap(), delete.join().unwrap().unwrap())
    });

    match created {
        Ok(_) => assert_eq!(removed, 1),
        Err(err) => {
            assert!(matches!(err, LedgerStoreError::UnknownProjectReference(id) if id == project.id));
            assert_eq!(removed, 0);
        }
    }
    assert!(store.list_projects().unwrap().is_empty());
    assert!(store.list_transactions().unwrap().is_empty());
}
