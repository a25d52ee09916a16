//! Document-store emitter. The (composite) key maps to the document's
//! native `_id`; all non-key fields map to top-level document fields by
//! name, and filters compose equality predicates conjunctively in field
//! order.

use crate::{
    backend::{Backend, CodeFragment, EmitError, UnitScaffold},
    rust_ty,
};
use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use repoforge_schema::{
    node::Entity,
    plan::{MethodKind, MethodPlan},
    registry::{Capability, DOCUMENT},
};

///
/// DocumentBackend
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentBackend;

impl Backend for DocumentBackend {
    fn capability(&self) -> &'static Capability {
        &DOCUMENT
    }

    fn emit(&self, entity: &Entity, plan: &MethodPlan) -> Result<CodeFragment, EmitError> {
        self.require_shape(entity, plan)?;

        let tokens = match plan.kind {
            MethodKind::FindByKey => find_by_key(entity, plan),
            MethodKind::FindByFields => find_by_fields(entity, plan),
            MethodKind::FindAll => find_all(entity, plan),
            MethodKind::Exists => exists(entity, plan),
            MethodKind::Insert => insert(entity, plan),
            MethodKind::Update => update(entity, plan),
            MethodKind::Delete => delete(entity, plan),
        };

        Ok(CodeFragment::new(&plan.name, plan.kind, tokens))
    }

    fn emit_setup(&self, entity: &Entity) -> Result<CodeFragment, EmitError> {
        let collection_name = entity.name.as_str();
        let indexes = entity.fields.iter().filter_map(|field| {
            (field.constraints.unique && !entity.is_key(&field.name)).then(|| {
                let name = field.name.as_str();
                quote!(self.collection.create_unique_index(&[#name])?;)
            })
        });

        let tokens = quote! {
            pub fn setup(&self) -> Result<(), ::repoforge_runtime::StoreError> {
                self.collection.create_if_absent(#collection_name)?;
                #(#indexes)*
                Ok(())
            }
        };

        Ok(CodeFragment::setup(tokens))
    }

    fn scaffold(&self, entity: &Entity) -> UnitScaffold {
        let entity_ty = rust_ty::entity_ident(entity);
        let struct_ident = format_ident!("{}DocumentRepository", entity.name.to_case(Case::Pascal));

        UnitScaffold {
            struct_ident,
            client_field: format_ident!("collection"),
            client_bound: quote!(::repoforge_runtime::document::DocumentCollection),
            imports: quote!(use crate::entities::#entity_ty;),
        }
    }
}

fn doc_path() -> TokenStream {
    quote!(::repoforge_runtime::document::Document)
}

/// Key encoding: a single key field binds `_id` directly; a composite
/// key becomes a nested `_id` sub-document with fields in key
/// declaration order, the deterministic form every key-addressed method
/// shares.
pub(crate) fn key_filter(entity: &Entity) -> TokenStream {
    let doc = doc_path();
    let keys = entity.key_columns();

    if let [single] = keys.as_slice() {
        let ident = format_ident!("{}", single.name);
        return quote! {
            let mut filter = #doc::new();
            filter.append("_id", &#ident);
        };
    }

    let appends = keys.iter().map(|field| {
        let name = field.name.as_str();
        let ident = format_ident!("{}", field.name);
        quote!(key.append(#name, &#ident);)
    });

    quote! {
        let mut filter = #doc::new();
        let mut key = #doc::new();
        #(#appends)*
        filter.append("_id", &key);
    }
}

fn find_by_key(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sig = signature(entity, plan);
    let filter = key_filter(entity);
    let entity_ty = rust_ty::entity_ident(entity);

    quote! {
        #sig {
            #filter
            let found = self.collection.find_one(&filter)?;
            found.map(|doc| #entity_ty::from_document(&doc)).transpose()
        }
    }
}

fn find_by_fields(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sig = signature(entity, plan);
    let doc = doc_path();
    let entity_ty = rust_ty::entity_ident(entity);

    // equality predicates, conjunctive, in parameter field order
    let appends = plan.parameters.iter().map(|name| {
        let lit = name.as_str();
        let ident = format_ident!("{name}");
        quote!(filter.append(#lit, &#ident);)
    });

    quote! {
        #sig {
            let mut filter = #doc::new();
            #(#appends)*
            let found = self.collection.find_one(&filter)?;
            found.map(|doc| #entity_ty::from_document(&doc)).transpose()
        }
    }
}

fn find_all(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sig = signature(entity, plan);
    let entity_ty = rust_ty::entity_ident(entity);

    quote! {
        #sig {
            let docs = self.collection.find_all()?;
            docs.iter().map(#entity_ty::from_document).collect()
        }
    }
}

fn exists(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sig = signature(entity, plan);
    let filter = key_filter(entity);

    quote! {
        #sig {
            #filter
            Ok(self.collection.exists(&filter)?)
        }
    }
}

fn insert(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sig = signature(entity, plan);
    let doc = doc_path();

    // non-key fields map to top-level document fields by name
    let appends = plan.parameters.iter().filter_map(|name| {
        if entity.is_key(name) {
            return None;
        }
        let lit = name.as_str();
        let ident = format_ident!("{name}");
        Some(quote!(doc.append(#lit, &#ident);))
    });

    let (id_encoding, insert_call) = if entity.has_generated_key() {
        // validation guarantees a generated key is the entire key, so
        // identifier minting delegates wholly to the store
        (
            quote!(),
            quote!(self.collection.insert_generating_id(&doc)?;),
        )
    } else {
        (id_append(entity), quote!(self.collection.insert_one(&doc)?;))
    };

    quote! {
        #sig {
            let mut doc = #doc::new();
            #id_encoding
            #(#appends)*
            #insert_call
            Ok(())
        }
    }
}

// `_id` encoding on the inserted document itself, mirroring key_filter.
fn id_append(entity: &Entity) -> TokenStream {
    let doc = doc_path();
    let keys = entity.key_columns();

    if let [single] = keys.as_slice() {
        let ident = format_ident!("{}", single.name);
        return quote!(doc.append("_id", &#ident););
    }

    let appends = keys.iter().map(|field| {
        let name = field.name.as_str();
        let ident = format_ident!("{}", field.name);
        quote!(key.append(#name, &#ident);)
    });

    quote! {
        let mut key = #doc::new();
        #(#appends)*
        doc.append("_id", &key);
    }
}

fn update(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sig = signature(entity, plan);
    let doc = doc_path();
    let filter = key_filter(entity);

    let appends = entity.non_key_columns().into_iter().map(|field| {
        let lit = field.name.as_str();
        let ident = format_ident!("{}", field.name);
        quote!(doc.append(#lit, &#ident);)
    });

    quote! {
        #sig {
            #filter
            let mut doc = #doc::new();
            #(#appends)*
            self.collection.replace_one(&filter, &doc)?;
            Ok(())
        }
    }
}

fn delete(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let sig = signature(entity, plan);
    let filter = key_filter(entity);

    quote! {
        #sig {
            #filter
            self.collection.delete_one(&filter)?;
            Ok(())
        }
    }
}

fn signature(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let name = format_ident!("{}", plan.name);
    let params = rust_ty::params(entity, plan);
    let ret = rust_ty::return_type(entity, plan);
    let args = params.iter().map(|(ident, ty)| quote!(#ident: #ty));

    quote!(pub fn #name(&self, #(#args),*) -> #ret)
}

///
/// TESTS
///
