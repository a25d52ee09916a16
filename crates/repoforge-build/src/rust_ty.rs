//! Abstract type -> generated Rust parameter/return type tokens.
//!
//! Storage-native tokens live in the schema crate's registry; this is
//! the third leg, the Rust surface of the generated repository methods.
//! Opaque runtime value types resolve under `::repoforge_runtime::types`.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use repoforge_schema::{
    node::Entity,
    plan::{MethodPlan, ReturnShape},
    types::{AbstractType, ScalarType},
};

#[must_use]
pub fn rust_type(ty: &AbstractType) -> TokenStream {
    match ty {
        AbstractType::Scalar(kind) => scalar_type(*kind),
        AbstractType::List(item) => {
            let inner = rust_type(item);
            quote!(Vec<#inner>)
        }
        AbstractType::Ref(name) => {
            let ident = format_ident!("{name}");
            quote!(#ident)
        }
    }
}

/// The generated struct ident for an entity.
#[must_use]
pub fn entity_ident(entity: &Entity) -> Ident {
    format_ident!("{}", entity.name)
}

/// Parameter list for a planned method: `(ident, rust type)` pairs in
/// plan parameter order.
#[must_use]
pub fn params(entity: &Entity, plan: &MethodPlan) -> Vec<(Ident, TokenStream)> {
    plan.parameters
        .iter()
        .filter_map(|name| entity.fields.get(name))
        .map(|field| (format_ident!("{}", field.name), rust_type(&field.ty)))
        .collect()
}

/// Full generated return type for a planned method.
#[must_use]
pub fn return_type(entity: &Entity, plan: &MethodPlan) -> TokenStream {
    let entity_ty = entity_ident(entity);

    match plan.returns {
        ReturnShape::One => quote!(Result<Option<#entity_ty>, ::repoforge_runtime::StoreError>),
        ReturnShape::Many => quote!(Result<Vec<#entity_ty>, ::repoforge_runtime::StoreError>),
        ReturnShape::Bool => quote!(Result<bool, ::repoforge_runtime::StoreError>),
        ReturnShape::Unit => quote!(Result<(), ::repoforge_runtime::StoreError>),
    }
}

fn scalar_type(kind: ScalarType) -> TokenStream {
    match kind {
        ScalarType::Bool => quote!(bool),
        ScalarType::Bytes => quote!(Vec<u8>),
        ScalarType::Double => quote!(f64),
        ScalarType::Float => quote!(f32),
        ScalarType::GeoPoint => quote!(::repoforge_runtime::types::GeoPoint),
        ScalarType::Int => quote!(i32),
        ScalarType::Long => quote!(i64),
        ScalarType::Text => quote!(String),
        ScalarType::Timestamp => quote!(::repoforge_runtime::types::Timestamp),
        ScalarType::Uuid => quote!(::repoforge_runtime::types::Uuid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_types_nest() {
        let ty = AbstractType::List(Box::new(AbstractType::Ref("Order".to_string())));
        assert_eq!(rust_type(&ty).to_string(), "Vec < Order >");
    }
}
