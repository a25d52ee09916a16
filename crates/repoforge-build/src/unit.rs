//! Final assembly: fragments plus scaffold boilerplate become one
//! generated source unit per (entity, backend) pair. Method order is the
//! planner's emission order, never sorted, so regeneration diffs stay
//! minimal and predictable.

use crate::backend::{CodeFragment, EmitError, UnitScaffold};
use convert_case::{Case, Casing};
use quote::quote;
use repoforge_schema::node::Entity;

const HEADER: &str = "// @generated by repoforge. Do not edit.";

///
/// GeneratedUnit
///

#[derive(Clone, Debug)]
pub struct GeneratedUnit {
    pub entity: String,
    pub backend: &'static str,
    pub file_name: String,
    pub source: String,
}

/// Render one source unit from a backend's fragments.
///
/// The only failure here is a malformed fragment, which indicates a
/// defect in an upstream stage rather than bad user input.
pub fn assemble(
    entity: &Entity,
    backend: &'static str,
    scaffold: &UnitScaffold,
    fragments: &[CodeFragment],
) -> Result<GeneratedUnit, EmitError> {
    for fragment in fragments {
        if fragment.tokens.is_empty() {
            return Err(EmitError::Internal(format!(
                "empty fragment '{}' for '{}' on backend '{}'",
                fragment.method, entity.name, backend
            )));
        }
    }

    let UnitScaffold {
        struct_ident,
        client_field,
        client_bound,
        imports,
    } = scaffold;
    let methods = fragments.iter().map(|f| &f.tokens);

    let tokens = quote! {
        #imports

        pub struct #struct_ident<C: #client_bound> {
            #client_field: C,
        }

        impl<C: #client_bound> #struct_ident<C> {
            pub fn new(#client_field: C) -> Self {
                Self { #client_field }
            }

            #(#methods)*
        }
    };

    Ok(GeneratedUnit {
        entity: entity.name.clone(),
        backend,
        file_name: unit_file_name(&entity.name, backend),
        source: format!("{HEADER}\n#![allow(non_snake_case)]\n\n{tokens}\n"),
    })
}

/// Deterministic output naming: entity snake case + backend identifier.
#[must_use]
pub fn unit_file_name(entity: &str, backend: &str) -> String {
    format!("{}_{backend}.rs", entity.to_case(Case::Snake))
}

///
/// TESTS
///
