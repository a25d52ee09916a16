use crate::node::Entity;
use convert_case::{Case, Casing};
use derive_more::Display;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// MethodKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum MethodKind {
    Delete,
    Exists,
    FindAll,
    FindByFields,
    FindByKey,
    Insert,
    Update,
}

impl MethodKind {
    /// Every method kind a backend capability table can declare.
    pub const ALL: &'static [Self] = &[
        Self::Delete,
        Self::Exists,
        Self::FindAll,
        Self::FindByFields,
        Self::FindByKey,
        Self::Insert,
        Self::Update,
    ];
}

///
/// ReturnShape
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ReturnShape {
    One,
    Many,
    Bool,
    Unit,
}

///
/// MethodPlan
///
/// One planned repository operation. `parameters` holds field names in
/// the order the generated signature takes them.
///

#[derive(Clone, Debug, Serialize)]
pub struct MethodPlan {
    pub kind: MethodKind,
    pub name: String,
    pub parameters: Vec<String>,
    pub returns: ReturnShape,
}

///
/// PlanError
///

#[derive(Debug, ThisError)]
pub enum PlanError {
    #[error(
        "entity '{entity}': methods '{first}' and '{second}' collide on normalized signature '{normalized}'"
    )]
    AmbiguousMethodSignature {
        entity: String,
        normalized: String,
        first: String,
        second: String,
    },
}

/// Derive the full method set for a validated entity.
///
/// Emission order is fixed and follows declaration order throughout:
/// key lookup, full scan, key existence check, one finder per unique
/// non-key field, then insert/update/delete. Update is planned only
/// when the entity has at least one non-key column. Regenerating from a
/// reordered field list changes the output on purpose; this derivation
/// is deterministic but not idempotent under field reordering.
pub fn plan_methods(entity: &Entity) -> Result<Vec<MethodPlan>, PlanError> {
    let entity_pascal = entity.name.to_case(Case::Pascal);
    let key_names: Vec<String> = entity.key_fields.clone();

    let mut plans = vec![
        MethodPlan {
            kind: MethodKind::FindByKey,
            name: finder_name("findBy", &key_names),
            parameters: key_names.clone(),
            returns: ReturnShape::One,
        },
        MethodPlan {
            kind: MethodKind::FindAll,
            name: "findAll".to_string(),
            parameters: Vec::new(),
            returns: ReturnShape::Many,
        },
        MethodPlan {
            kind: MethodKind::Exists,
            name: finder_name("existsBy", &key_names),
            parameters: key_names.clone(),
            returns: ReturnShape::Bool,
        },
    ];

    // one single-field finder per unique non-key field, declaration order
    for field in entity.fields.iter() {
        if field.constraints.unique && !entity.is_key(&field.name) {
            plans.push(MethodPlan {
                kind: MethodKind::FindByFields,
                name: finder_name("findBy", std::slice::from_ref(&field.name)),
                parameters: vec![field.name.clone()],
                returns: ReturnShape::One,
            });
        }
    }

    plans.push(MethodPlan {
        kind: MethodKind::Insert,
        name: format!("insert{entity_pascal}"),
        parameters: entity
            .insert_columns()
            .iter()
            .map(|f| f.name.clone())
            .collect(),
        returns: ReturnShape::Unit,
    });
    // an all-key entity has no settable columns, so no update is planned
    if !entity.non_key_columns().is_empty() {
        plans.push(MethodPlan {
            kind: MethodKind::Update,
            name: format!("update{entity_pascal}"),
            parameters: entity.fields.iter().map(|f| f.name.clone()).collect(),
            returns: ReturnShape::Unit,
        });
    }
    plans.push(MethodPlan {
        kind: MethodKind::Delete,
        name: format!("delete{entity_pascal}"),
        parameters: key_names,
        returns: ReturnShape::Unit,
    });

    check_ambiguity(entity, &plans)?;

    Ok(plans)
}

/// `findBy`/`existsBy` naming: fields joined by `And`, declaration order.
fn finder_name(prefix: &str, fields: &[String]) -> String {
    let joined = fields
        .iter()
        .map(|f| f.to_case(Case::Pascal))
        .collect::<Vec<_>>()
        .join("And");

    format!("{prefix}{joined}")
}

// Two plans whose names collide after case folding would generate
// identically-shaped methods; that is a hard gate, never a tie-break.
fn check_ambiguity(entity: &Entity, plans: &[MethodPlan]) -> Result<(), PlanError> {
    let mut by_normalized: BTreeMap<String, &str> = BTreeMap::new();

    for plan in plans {
        let normalized = plan.name.to_lowercase();
        if let Some(first) = by_normalized.insert(normalized.clone(), &plan.name) {
            return Err(PlanError::AmbiguousMethodSignature {
                entity: entity.name.clone(),
                normalized,
                first: first.to_string(),
                second: plan.name.clone(),
            });
        }
    }

    Ok(())
}

///
/// TESTS
///
