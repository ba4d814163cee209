//! Integration tests for stamped and scope-checked writes.

mod helpers;

use carescope_core::error::ErrorKind;
use carescope_core::traits::entity::Entity;
use carescope_core::types::filter::FilterField;
use carescope_core::types::predicate::Predicate;
use carescope_entity::{
    Encounter, EncounterKind, Patient, PatientStatus, Prescription, PrescriptionStatus,
};
use carescope_tenant::{ContextStore, TenantContext};

use helpers::TestApp;

#[tokio::test]
async fn test_create_stamps_active_tenant() {
    let app = TestApp::new();

    let created = ContextStore::scope(app.h1_clinician(), async {
        app.patients().create(Patient::new("MRN-9", "Katherine Johnson")).await
    })
    .await
    .unwrap();

    assert_eq!(created.organization_id, Some(app.o1));
    assert_eq!(created.hospital_id, Some(app.h1));
    assert_eq!(app.db.len(Patient::TABLE), 4);
}

#[tokio::test]
async fn test_create_never_overwrites_organization() {
    let app = TestApp::new();
    let mut patient = Patient::new("MRN-10", "Dorothy Vaughan");
    patient.organization_id = Some(app.o2);

    let created = ContextStore::scope(app.h1_clinician(), async {
        app.patients().create(patient).await
    })
    .await
    .unwrap();

    assert_eq!(created.organization_id, Some(app.o2));
    assert_eq!(created.hospital_id, Some(app.h1));
}

#[tokio::test]
async fn test_create_stamps_department_relation_only() {
    let app = TestApp::new();
    let rx = Prescription::issue(app.p2.id, "IBU", "200mg");

    let created = ContextStore::scope(app.department_staff(app.d2), async {
        app.prescriptions().create(rx).await
    })
    .await
    .unwrap();
    assert_eq!(created.department_id, Some(app.d2));

    // Hospital and organization reach prescriptions through the department
    // row and are never stamped.
    let unstamped = ContextStore::scope(app.h1_clinician(), async {
        app.prescriptions()
            .create(Prescription::issue(app.p1.id, "IBU", "200mg"))
            .await
    })
    .await
    .unwrap();
    assert_eq!(unstamped.department_id, None);
}

#[tokio::test]
async fn test_create_without_context_leaves_ids_unset() {
    let app = TestApp::new();

    let created = app
        .encounters()
        .create(Encounter::open(app.p1.id, EncounterKind::Emergency))
        .await
        .unwrap();

    assert_eq!(created.organization_id, None);
    assert_eq!(created.hospital_id, None);
    assert_eq!(created.department_id, None);
}

#[tokio::test]
async fn test_duplicate_create_is_conflict() {
    let app = TestApp::new();

    let err = ContextStore::scope(TenantContext::system(), async {
        app.patients().create(app.p1.clone()).await
    })
    .await
    .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_update_in_scope() {
    let app = TestApp::new();
    let discharged = Patient {
        status: PatientStatus::Discharged,
        ..app.p1.clone()
    };

    let updated = ContextStore::scope(app.hospital_staff([app.h1]), async {
        app.patients().update(discharged).await
    })
    .await
    .unwrap();

    assert_eq!(updated.status, PatientStatus::Discharged);
}

#[tokio::test]
async fn test_update_out_of_scope_is_not_found() {
    let app = TestApp::new();
    let renamed = Patient {
        full_name: "Someone Else".to_string(),
        ..app.p2.clone()
    };

    let err = ContextStore::scope(app.hospital_staff([app.h1]), async {
        app.patients().update(renamed).await
    })
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let stored = ContextStore::scope(TenantContext::system(), async {
        app.patients().find_by_id(app.p2.id).await
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(stored.full_name, "Alan Turing");
}

#[tokio::test]
async fn test_update_cannot_move_row_to_another_tenant() {
    let app = TestApp::new();
    let moved = Patient {
        organization_id: Some(app.o2),
        hospital_id: Some(app.h3),
        ..app.p1.clone()
    };

    let err = ContextStore::scope(app.hospital_staff([app.h1]), async {
        app.patients().update(moved).await
    })
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let stored = ContextStore::scope(TenantContext::system(), async {
        app.patients().find_by_id(app.p1.id).await
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(stored.organization_id, Some(app.o1));
    assert_eq!(stored.hospital_id, Some(app.h1));
}

#[tokio::test]
async fn test_update_keeps_stored_ids_for_unset_fields() {
    let app = TestApp::new();
    let ctx = TenantContext::builder()
        .active_organization(app.o1)
        .active_hospital(app.h2)
        .permit_hospitals([app.h1, app.h2])
        .build()
        .unwrap();
    let detached = Patient {
        organization_id: None,
        hospital_id: None,
        status: PatientStatus::Discharged,
        ..app.p1.clone()
    };

    let updated = ContextStore::scope(ctx, async { app.patients().update(detached).await })
        .await
        .unwrap();

    assert_eq!(updated.status, PatientStatus::Discharged);
    assert_eq!(updated.organization_id, Some(app.o1));
    assert_eq!(updated.hospital_id, Some(app.h1));
}

#[tokio::test]
async fn test_update_with_empty_context_is_not_found() {
    let app = TestApp::new();

    let err = ContextStore::scope(TenantContext::empty(), async {
        app.patients().update(app.p1.clone()).await
    })
    .await
    .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_respects_scope() {
    let app = TestApp::new();

    ContextStore::scope(app.hospital_staff([app.h1]), async {
        let err = app.patients().delete_by_id(app.p2.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        app.patients().delete_by_id(app.p1.id).await.unwrap();
        assert!(app.patients().find_by_id(app.p1.id).await.unwrap().is_none());
    })
    .await;

    assert_eq!(app.db.len(Patient::TABLE), 2);
}

#[tokio::test]
async fn test_delete_where_only_touches_visible_rows() {
    let app = TestApp::new();
    let amoxicillin: Predicate = FilterField::eq("drug_code", "AMOX").into();

    let removed = ContextStore::scope(app.hospital_staff([app.h2]), async {
        app.prescriptions().delete_where(amoxicillin.clone()).await
    })
    .await
    .unwrap();
    assert_eq!(removed, 1);

    let removed = ContextStore::scope(TenantContext::empty(), async {
        app.prescriptions().delete_where(amoxicillin).await
    })
    .await
    .unwrap();
    assert_eq!(removed, 0);

    assert_eq!(app.db.len(Prescription::TABLE), 2);
}

#[tokio::test]
async fn test_domain_writes_go_through_scope() {
    let app = TestApp::new();

    ContextStore::scope(app.department_staff(app.d1), async {
        let closed = app.encounters().close(app.e1.id).await.unwrap();
        assert!(!closed.is_open());
        assert!(app.encounters().close(app.e2.id).await.unwrap_err().is_not_found());

        let cancelled = app.prescriptions().cancel(app.rx1.id).await.unwrap();
        assert_eq!(cancelled.status, PrescriptionStatus::Cancelled);
        assert!(app.prescriptions().cancel(app.rx2.id).await.unwrap_err().is_not_found());
    })
    .await;
}
