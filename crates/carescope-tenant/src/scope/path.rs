//! Attribute paths from a record type to its tenant levels.

use std::fmt;

use serde::Serialize;

use carescope_core::types::tenant::TenantLevel;

use crate::entity::EntityShape;

/// How a record type reaches one tenant level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScopePath {
    /// The tenant id is a column of the record's own table.
    Direct { column: &'static str },
    /// A many-to-one relation to the tenant row; its foreign key is compared.
    Relation {
        relation: &'static str,
        column: &'static str,
    },
    /// A relation to the `via` level whose row carries the `target` id.
    Nested {
        column: &'static str,
        via: TenantLevel,
        target: TenantLevel,
    },
    /// The type cannot reach this level.
    NotApplicable,
}

impl ScopePath {
    /// Whether the level participates in filtering.
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    /// Whether the stamping hook may write this level's id on the record.
    pub fn is_stampable(&self) -> bool {
        matches!(self, Self::Direct { .. } | Self::Relation { .. })
    }

    /// Dotted attribute path, e.g. `department.hospital.id`.
    pub fn attribute_path(&self, level: TenantLevel) -> Option<String> {
        match self {
            Self::Direct { .. } => Some(level.field_name().to_string()),
            Self::Relation { relation, .. } => Some(format!("{relation}.id")),
            Self::Nested { via, target, .. } => Some(format!(
                "{}.{}.id",
                via.relation_name(),
                target.relation_name()
            )),
            Self::NotApplicable => None,
        }
    }

    /// Short kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Relation { .. } => "relation",
            Self::Nested { .. } => "nested",
            Self::NotApplicable => "n/a",
        }
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct { column } => write!(f, "{column}"),
            Self::Relation { relation, column } => write!(f, "{relation}.id ({column})"),
            Self::Nested {
                column,
                via,
                target,
            } => write!(
                f,
                "{}.{}.id ({column})",
                via.relation_name(),
                target.relation_name()
            ),
            Self::NotApplicable => f.write_str("-"),
        }
    }
}

/// One way a level might be reachable, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCandidate {
    /// `<level>Id`
    Field,
    /// `<level>.id`
    Relation,
    /// `<via>.<level>.id`
    Through(TenantLevel),
}

const ORGANIZATION_CANDIDATES: &[PathCandidate] = &[
    PathCandidate::Field,
    PathCandidate::Relation,
    PathCandidate::Through(TenantLevel::Hospital),
    PathCandidate::Through(TenantLevel::Department),
];

const HOSPITAL_CANDIDATES: &[PathCandidate] = &[
    PathCandidate::Field,
    PathCandidate::Relation,
    PathCandidate::Through(TenantLevel::Department),
];

const DEPARTMENT_CANDIDATES: &[PathCandidate] = &[PathCandidate::Field, PathCandidate::Relation];

/// Ordered candidates for a level.
pub fn candidates(level: TenantLevel) -> &'static [PathCandidate] {
    match level {
        TenantLevel::Organization => ORGANIZATION_CANDIDATES,
        TenantLevel::Hospital => HOSPITAL_CANDIDATES,
        TenantLevel::Department => DEPARTMENT_CANDIDATES,
    }
}

/// Resolve the path to `level`: the first candidate the shape declares.
///
/// A two-hop candidate needs a relation to the `via` level; the `via` row is
/// assumed to carry the target id in the conventional column.
pub fn resolve_path(level: TenantLevel, shape: &EntityShape) -> ScopePath {
    for candidate in candidates(level) {
        let resolved = match *candidate {
            PathCandidate::Field => shape
                .field_column(level)
                .map(|column| ScopePath::Direct { column }),
            PathCandidate::Relation => {
                shape
                    .relation_column(level)
                    .map(|column| ScopePath::Relation {
                        relation: level.relation_name(),
                        column,
                    })
            }
            PathCandidate::Through(via) => {
                shape
                    .relation_column(via)
                    .map(|column| ScopePath::Nested {
                        column,
                        via,
                        target: level,
                    })
            }
        };
        if let Some(path) = resolved {
            return path;
        }
    }
    ScopePath::NotApplicable
}
