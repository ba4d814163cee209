//! Shared fixture for the scoped repository integration tests.
//!
//! Two organizations, three hospitals, three departments, and clinical rows
//! spread across them, all held in a [`MemoryDatabase`].

#![allow(dead_code)]

use std::sync::Arc;

use carescope_core::config::ScopeConfig;
use carescope_core::types::id::{DepartmentId, HospitalId, OrganizationId};
use carescope_database::repositories::{
    DepartmentRepository, DrugCatalogRepository, EncounterRepository, HospitalRepository,
    PatientRepository, PrescriptionRepository, ReferralRepository,
};
use carescope_database::{MemoryDatabase, MemoryEntityStore, ScopeEnforcer};
use carescope_entity::{
    Department, DrugCatalogEntry, Encounter, EncounterKind, Hospital, Patient, Prescription,
    Referral, clinical_registry,
};
use carescope_tenant::TenantContext;

/// In-memory world with one repository per record type.
pub struct TestApp {
    pub db: MemoryDatabase,
    pub enforcer: ScopeEnforcer,

    pub o1: OrganizationId,
    pub o2: OrganizationId,
    pub h1: HospitalId,
    pub h2: HospitalId,
    pub h3: HospitalId,
    pub d1: DepartmentId,
    pub d2: DepartmentId,
    pub d3: DepartmentId,

    pub p1: Patient,
    pub p2: Patient,
    pub p3: Patient,
    pub rx1: Prescription,
    pub rx2: Prescription,
    pub rx3: Prescription,
    pub e1: Encounter,
    pub e2: Encounter,
    pub r1: Referral,
    pub r2: Referral,
}

impl TestApp {
    pub fn new() -> Self {
        let db = MemoryDatabase::new();
        let registry = clinical_registry().expect("registry");
        let enforcer = ScopeEnforcer::new(Arc::new(registry), &ScopeConfig::default());

        let (o1, o2) = (OrganizationId::new(), OrganizationId::new());

        let hospital = |name: &str, code: &str, org: OrganizationId| {
            Hospital::new(name, code).in_organization(org)
        };
        let hospitals = [
            hospital("North General", "NG", o1),
            hospital("South General", "SG", o1),
            hospital("Harbor Clinic", "HC", o2),
        ];
        let (h1, h2, h3) = (hospitals[0].id, hospitals[1].id, hospitals[2].id);

        let departments = [
            Department::new("Cardiology").in_hospital(o1, h1).with_specialty("cardiology"),
            Department::new("Oncology").in_hospital(o1, h2).with_specialty("oncology"),
            Department::new("Emergency").in_hospital(o2, h3),
        ];
        let (d1, d2, d3) = (departments[0].id, departments[1].id, departments[2].id);

        let p1 = Patient::new("MRN-1", "Ada Lovelace").at_hospital(o1, h1);
        let p2 = Patient::new("MRN-2", "Alan Turing").at_hospital(o1, h2);
        let p3 = Patient::new("MRN-3", "Grace Hopper").at_hospital(o2, h3);

        let rx1 = Prescription::issue(p1.id, "AMOX", "500mg tid").from_department(d1);
        let rx2 = Prescription::issue(p2.id, "AMOX", "250mg bid").from_department(d2);
        let rx3 = Prescription::issue(p3.id, "IBU", "400mg prn").from_department(d3);

        let mut e1 = Encounter::open(p1.id, EncounterKind::Inpatient);
        e1.organization_id = Some(o1);
        e1.hospital_id = Some(h1);
        e1.department_id = Some(d1);
        let mut e2 = Encounter::open(p2.id, EncounterKind::Outpatient);
        e2.organization_id = Some(o1);
        e2.hospital_id = Some(h2);
        e2.department_id = Some(d2);

        let r1 = Referral::send(p1.id, h2, "Oncology consult").from_hospital(o1, h1);
        let r2 = Referral::send(p3.id, h1, "Cardiac workup").from_hospital(o2, h3);

        db.seed_entities(&hospitals);
        db.seed_entities(&departments);
        db.seed_entities(&[p1.clone(), p2.clone(), p3.clone()]);
        db.seed_entities(&[rx1.clone(), rx2.clone(), rx3.clone()]);
        db.seed_entities(&[e1.clone(), e2.clone()]);
        db.seed_entities(&[r1.clone(), r2.clone()]);
        db.seed_entities(&[
            DrugCatalogEntry::new("AMOX", "Amoxicillin"),
            DrugCatalogEntry::new("IBU", "Ibuprofen"),
        ]);

        Self {
            db,
            enforcer,
            o1,
            o2,
            h1,
            h2,
            h3,
            d1,
            d2,
            d3,
            p1,
            p2,
            p3,
            rx1,
            rx2,
            rx3,
            e1,
            e2,
            r1,
            r2,
        }
    }

    fn store<E: carescope_core::traits::entity::Entity>(&self) -> MemoryEntityStore<E> {
        self.db.store::<E>()
    }

    pub fn hospitals(&self) -> HospitalRepository<MemoryEntityStore<Hospital>> {
        HospitalRepository::new(self.store(), self.enforcer.clone())
    }

    pub fn departments(&self) -> DepartmentRepository<MemoryEntityStore<Department>> {
        DepartmentRepository::new(self.store(), self.enforcer.clone())
    }

    pub fn patients(&self) -> PatientRepository<MemoryEntityStore<Patient>> {
        PatientRepository::new(self.store(), self.enforcer.clone())
    }

    pub fn encounters(&self) -> EncounterRepository<MemoryEntityStore<Encounter>> {
        EncounterRepository::new(self.store(), self.enforcer.clone())
    }

    pub fn prescriptions(&self) -> PrescriptionRepository<MemoryEntityStore<Prescription>> {
        PrescriptionRepository::new(self.store(), self.enforcer.clone())
    }

    pub fn referrals(&self) -> ReferralRepository<MemoryEntityStore<Referral>> {
        ReferralRepository::new(self.store(), self.enforcer.clone())
    }

    pub fn catalog(&self) -> DrugCatalogRepository<MemoryEntityStore<DrugCatalogEntry>> {
        DrugCatalogRepository::new(self.store(), self.enforcer.clone())
    }

    /// Context permitted exactly the given hospitals, nothing else.
    pub fn hospital_staff(&self, hospitals: impl IntoIterator<Item = HospitalId>) -> TenantContext {
        TenantContext::builder()
            .permit_hospitals(hospitals)
            .build()
            .expect("valid context")
    }

    /// Context working in `h1` of `o1`.
    pub fn h1_clinician(&self) -> TenantContext {
        TenantContext::builder()
            .active_organization(self.o1)
            .active_hospital(self.h1)
            .permit_hospitals([self.h1])
            .build()
            .expect("valid context")
    }

    /// Context permitted a single department.
    pub fn department_staff(&self, department: DepartmentId) -> TenantContext {
        TenantContext::builder()
            .permit_departments([department])
            .build()
            .expect("valid context")
    }
}
