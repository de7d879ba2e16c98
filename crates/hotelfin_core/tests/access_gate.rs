use hotelfin_core::{allow, Action, CapabilitySet, Permission};

#[test]
fn bare_and_namespaced_keys_resolve_to_one_permission() {
    let bare = CapabilitySet::from_flags([("add_project", true)]);
    let namespaced = CapabilitySet::from_flags([("finance.add_project", true)]);

    assert!(allow(&bare, Action::CreateProject));
    assert!(allow(&namespaced, Action::CreateProject));
    assert_eq!(bare, namespaced);
}

#[test]
fn namespaced_value_wins_regardless_of_order() {
    let namespaced_last =
        CapabilitySet::from_flags([("add_transaction", true), ("finance.add_transaction", false)]);
    let namespaced_first =
        CapabilitySet::from_flags([("finance.add_transaction", false), ("add_transaction", true)]);

    assert!(!allow(&namespaced_last, Action::CreateTransaction));
    assert!(!allow(&namespaced_first, Action::CreateTransaction));
}

#[test]
fn super_admin_bypasses_every_check() {
    let set = CapabilitySet::from_flags([("super_admin", true), ("add_project", false)]);
    assert!(set.is_super_privileged());
    assert!(allow(&set, Action::CreateProject));
    assert!(allow(&set, Action::ManagePersonnel));
    assert!(allow(&CapabilitySet::super_privileged(), Action::TakeBackup));
}

#[test]
fn super_admin_false_does_not_grant() {
    let set = CapabilitySet::from_flags([("super_admin", false)]);
    assert!(!set.is_super_privileged());
    assert!(!allow(&set, Action::ViewReports));
}

#[test]
fn mismatched_and_unknown_keys_are_ignored() {
    let set = CapabilitySet::from_flags([
        ("system.add_project", true),
        ("finance.take_backup", true),
        ("teleport", true),
        ("Finance.Add-Project", true),
    ]);

    assert!(!allow(&set, Action::CreateProject));
    assert!(!allow(&set, Action::TakeBackup));
    assert_eq!(set, CapabilitySet::new());
}

#[test]
fn each_action_checks_its_own_permission() {
    let set = CapabilitySet::from_flags([
        ("view_reports", true),
        ("system.take_backup", true),
        ("personnel.manage_personnel", true),
    ]);

    assert!(allow(&set, Action::ViewReports));
    assert!(allow(&set, Action::TakeBackup));
    assert!(allow(&set, Action::ManagePersonnel));
    assert!(!allow(&set, Action::DeleteProject));
    assert!(!allow(&set, Action::UpdateTransaction));
    assert_eq!(Action::DeleteTransaction.permission(), Permission::DeleteTransaction);
}
