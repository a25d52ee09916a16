//! Relational emitter. Statements are built once at generation time and
//! embedded as string literals with positional `?` bindings; values are
//! never interpolated into statement text.

use crate::{
    backend::{Backend, CodeFragment, EmitError, UnitScaffold},
    rust_ty,
};
use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use repoforge_schema::{
    node::{Entity, Field},
    plan::{MethodKind, MethodPlan},
    registry::{Capability, SQL},
};

///
/// SqlBackend
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SqlBackend;

impl Backend for SqlBackend {
    fn capability(&self) -> &'static Capability {
        &SQL
    }

    fn emit(&self, entity: &Entity, plan: &MethodPlan) -> Result<CodeFragment, EmitError> {
        self.require_shape(entity, plan)?;

        let tokens = match plan.kind {
            MethodKind::FindByKey | MethodKind::FindByFields => find_one(entity, plan),
            MethodKind::FindAll => find_all(entity, plan),
            MethodKind::Exists => exists(entity, plan),
            MethodKind::Insert => insert(entity, plan),
            MethodKind::Update => update(entity, plan),
            MethodKind::Delete => delete(entity, plan),
        };

        Ok(CodeFragment::new(&plan.name, plan.kind, tokens))
    }

    fn emit_setup(&self, entity: &Entity) -> Result<CodeFragment, EmitError> {
        let sql = create_table_sql(entity)?;
        let tokens = quote! {
            pub fn setup(&self) -> Result<(), ::repoforge_runtime::StoreError> {
                self.client.execute(#sql, &[])?;
                Ok(())
            }
        };

        Ok(CodeFragment::setup(tokens))
    }

    fn scaffold(&self, entity: &Entity) -> UnitScaffold {
        let entity_ty = rust_ty::entity_ident(entity);
        let struct_ident = format_ident!("{}SqlRepository", entity.name.to_case(Case::Pascal));

        UnitScaffold {
            struct_ident,
            client_field: format_ident!("client"),
            client_bound: quote!(::repoforge_runtime::sql::SqlClient),
            imports: quote!(use crate::entities::#entity_ty;),
        }
    }
}

// ---------------------------------------------------------------------
// method bodies
// ---------------------------------------------------------------------

fn find_one(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sql = select_sql(entity, &plan.parameters);
    let (sig, binds) = signature(entity, plan);
    let entity_ty = rust_ty::entity_ident(entity);

    quote! {
        #sig {
            let row = self.client.query_opt(#sql, &[#(&#binds),*])?;
            row.map(|row| #entity_ty::from_row(&row)).transpose()
        }
    }
}

fn find_all(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sql = select_sql(entity, &[]);
    let (sig, _) = signature(entity, plan);
    let entity_ty = rust_ty::entity_ident(entity);

    quote! {
        #sig {
            let rows = self.client.query_all(#sql, &[])?;
            rows.iter().map(#entity_ty::from_row).collect()
        }
    }
}

fn exists(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} LIMIT 1",
        quote_ident(&entity.name),
        where_eq(&keyed_fields(entity, &plan.parameters)),
    );
    let (sig, binds) = signature(entity, plan);

    quote! {
        #sig {
            let row = self.client.query_opt(#sql, &[#(&#binds),*])?;
            Ok(row.is_some())
        }
    }
}

fn insert(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sql = insert_sql(entity);
    let (sig, binds) = signature(entity, plan);

    // auto-generated keys are absent from the column list and read back
    // through the driver's generated-key mechanism
    let execute = if entity.has_generated_key() {
        quote!(self.client.execute_returning_key(#sql, &[#(&#binds),*])?;)
    } else {
        quote!(self.client.execute(#sql, &[#(&#binds),*])?;)
    };

    quote! {
        #sig {
            #execute
            Ok(())
        }
    }
}

fn update(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sql = update_sql(entity);
    let (sig, _) = signature(entity, plan);

    // bind order follows the statement: SET columns first, key columns last
    let binds: Vec<_> = entity
        .non_key_columns()
        .into_iter()
        .chain(entity.key_columns())
        .map(|f| format_ident!("{}", f.name))
        .collect();

    quote! {
        #sig {
            self.client.execute(#sql, &[#(&#binds),*])?;
            Ok(())
        }
    }
}

fn delete(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        quote_ident(&entity.name),
        where_eq(&keyed_fields(entity, &plan.parameters)),
    );
    let (sig, binds) = signature(entity, plan);

    quote! {
        #sig {
            self.client.execute(#sql, &[#(&#binds),*])?;
            Ok(())
        }
    }
}

fn signature(entity: &Entity, plan: &MethodPlan) -> (TokenStream, Vec<proc_macro2::Ident>) {
    let name = format_ident!("{}", plan.name);
    let params = rust_ty::params(entity, plan);
    let ret = rust_ty::return_type(entity, plan);

    let args = params.iter().map(|(ident, ty)| quote!(#ident: #ty));
    let binds = params.iter().map(|(ident, _)| ident.clone()).collect();

    (quote!(pub fn #name(&self, #(#args),*) -> #ret), binds)
}

// ---------------------------------------------------------------------
// statement builders
// ---------------------------------------------------------------------

/// The single escaping routine used for every table and column
/// identifier: ANSI double quotes, embedded quotes doubled.
#[must_use]
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn keyed_fields<'a>(entity: &'a Entity, names: &[String]) -> Vec<&'a Field> {
    names
        .iter()
        .filter_map(|name| entity.fields.get(name))
        .collect()
}

fn column_list(fields: &[&Field]) -> String {
    fields
        .iter()
        .map(|f| quote_ident(&f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Equality conjunction in the given field order.
fn where_eq(fields: &[&Field]) -> String {
    fields
        .iter()
        .map(|f| format!("{} = ?", quote_ident(&f.name)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub(crate) fn select_sql(entity: &Entity, filter: &[String]) -> String {
    let columns: Vec<&Field> = entity.fields.iter().collect();
    let mut sql = format!(
        "SELECT {} FROM {}",
        column_list(&columns),
        quote_ident(&entity.name)
    );

    if !filter.is_empty() {
        let filter_fields = keyed_fields(entity, filter);
        sql.push_str(" WHERE ");
        sql.push_str(&where_eq(&filter_fields));
    }

    sql
}

pub(crate) fn insert_sql(entity: &Entity) -> String {
    let columns = entity.insert_columns();
    let placeholders = vec!["?"; columns.len()].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&entity.name),
        column_list(&columns),
        placeholders
    )
}

pub(crate) fn update_sql(entity: &Entity) -> String {
    let sets = entity
        .non_key_columns()
        .iter()
        .map(|f| format!("{} = ?", quote_ident(&f.name)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {} WHERE {}",
        quote_ident(&entity.name),
        sets,
        where_eq(&entity.key_columns())
    )
}

pub(crate) fn create_table_sql(entity: &Entity) -> Result<String, EmitError> {
    let mut clauses = Vec::new();

    for field in entity.fields.iter() {
        // validation gates unsupported types before emission
        let native = SQL.types.native_for(field).ok_or_else(|| {
            EmitError::Internal(format!(
                "unvalidated field '{}.{}' reached the SQL emitter",
                entity.name, field.name
            ))
        })?;

        let null = if field.nullable { "" } else { " NOT NULL" };
        clauses.push(format!("{} {native}{null}", quote_ident(&field.name)));
    }

    clauses.push(format!(
        "PRIMARY KEY ({})",
        column_list(&entity.key_columns())
    ));
    for field in entity.fields.iter() {
        if field.constraints.unique && !entity.is_key(&field.name) {
            clauses.push(format!("UNIQUE ({})", quote_ident(&field.name)));
        }
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(&entity.name),
        clauses.join(", ")
    ))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use repoforge_schema::{
        node::{FieldConstraints, FieldList},
        plan::ReturnShape,
        types::{AbstractType, ScalarType},
    };

    fn user() -> Entity {
        Entity {
            name: "User".to_string(),
            fields: FieldList::new(vec![
                Field {
                    name: "id".to_string(),
                    ty: AbstractType::Scalar(ScalarType::Int),
                    nullable: false,
                    constraints: FieldConstraints {
                        auto_generated: true,
                        ..FieldConstraints::default()
                    },
                },
                Field {
                    name: "email".to_string(),
                    ty: AbstractType::Scalar(ScalarType::Text),
                    nullable: false,
                    constraints: FieldConstraints {
                        unique: true,
                        ..FieldConstraints::default()
                    },
                },
                Field {
                    name: "name".to_string(),
                    ty: AbstractType::Scalar(ScalarType::Text),
                    nullable: true,
                    constraints: FieldConstraints::default(),
                },
            ]),
            key_fields: vec!["id".to_string()],
        }
    }

    #[test]
    fn quotes_every_identifier() {
        assert_eq!(quote_ident("User"), "\"User\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn select_by_key_binds_positionally() {
        let sql = select_sql(&user(), &["id".to_string()]);
        assert_eq!(
            sql,
            "SELECT \"id\", \"email\", \"name\" FROM \"User\" WHERE \"id\" = ?"
        );
    }

    #[test]
    fn insert_excludes_auto_generated_key() {
        let sql = insert_sql(&user());
        assert_eq!(sql, "INSERT INTO \"User\" (\"email\", \"name\") VALUES (?, ?)");
    }

    #[test]
    fn update_sets_non_key_columns_by_key() {
        let sql = update_sql(&user());
        assert_eq!(
            sql,
            "UPDATE \"User\" SET \"email\" = ?, \"name\" = ? WHERE \"id\" = ?"
        );
    }

    #[test]
    fn create_table_carries_key_and_unique_clauses() {
        let sql = create_table_sql(&user()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"User\" (\
             \"id\" int NOT NULL, \
             \"email\" text NOT NULL, \
             \"name\" text, \
             PRIMARY KEY (\"id\"), \
             UNIQUE (\"email\"))"
        );
    }

    #[test]
    fn exists_probe_stops_at_the_first_row() {
        let plan = MethodPlan {
            kind: MethodKind::Exists,
            name: "existsById".to_string(),
            parameters: vec!["id".to_string()],
            returns: ReturnShape::Bool,
        };

        let tokens = exists(&user(), &plan).to_string();
        assert!(tokens.contains(r#"SELECT 1 FROM \"User\" WHERE \"id\" = ? LIMIT 1"#));
    }

    #[test]
    fn composite_key_where_is_a_conjunction() {
        let order = Entity {
            name: "Order".to_string(),
            fields: FieldList::new(vec![
                Field {
                    name: "userId".to_string(),
                    ty: AbstractType::Scalar(ScalarType::Int),
                    nullable: false,
                    constraints: FieldConstraints::default(),
                },
                Field {
                    name: "productId".to_string(),
                    ty: AbstractType::Scalar(ScalarType::Int),
                    nullable: false,
                    constraints: FieldConstraints::default(),
                },
            ]),
            key_fields: vec!["userId".to_string(), "productId".to_string()],
        };

        let sql = select_sql(&order, &order.key_fields);
        assert!(sql.ends_with("WHERE \"userId\" = ? AND \"productId\" = ?"));
    }
}
