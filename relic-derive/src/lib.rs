//! Derive macros for `relic`'s layout traits.
//!
//! `#[derive(Flat)]` checks that the struct has a defined layout and
//! demands `Flat` of every field; `#[derive(Record)]` additionally
//! checks that the first field is a `Header`.

use quote::quote;
use syn;
use synstructure::decl_derive;

decl_derive!([Flat] => derive_flat);
decl_derive!([Record] => derive_record);

fn has_defined_repr(s: &synstructure::Structure) -> bool {
    s.ast().attrs.iter().any(|attr| match attr.parse_meta() {
        Ok(syn::Meta::List(list)) if list.path.is_ident("repr") => {
            list.nested.iter().any(|nested| match nested {
                syn::NestedMeta::Meta(syn::Meta::Path(path)) => {
                    path.is_ident("C") || path.is_ident("transparent")
                }
                _ => false,
            })
        }
        _ => false,
    })
}

fn field_types(s: &synstructure::Structure) -> Vec<syn::Type> {
    let data = match &s.ast().data {
        syn::Data::Struct(data) => data,
        syn::Data::Enum(_) => {
            panic!("only structs can be flat; enum discriminants have invalid bit patterns")
        }
        syn::Data::Union(_) => panic!("unions not supported"),
    };
    match &data.fields {
        syn::Fields::Named(fields) => fields.named.iter().map(|f| f.ty.clone()).collect(),
        syn::Fields::Unnamed(fields) => fields.unnamed.iter().map(|f| f.ty.clone()).collect(),
        syn::Fields::Unit => vec![],
    }
}

fn derive_flat(mut s: synstructure::Structure) -> proc_macro2::TokenStream {
    if !has_defined_repr(&s) {
        panic!("Flat requires #[repr(C)] or #[repr(transparent)]");
    }
    // every field must be flat, concrete or not
    s.add_bounds(synstructure::AddBounds::None);
    for ty in field_types(&s) {
        s.add_where_predicate(syn::parse_quote! { #ty: ::relic::Flat });
    }
    s.gen_impl(quote! {
        gen unsafe impl ::relic::Flat for @Self {}
    })
}

fn derive_record(mut s: synstructure::Structure) -> proc_macro2::TokenStream {
    if !has_defined_repr(&s) {
        panic!("Record requires #[repr(C)]");
    }
    let fields = field_types(&s);
    let leads_with_header = fields.first().map_or(false, |ty| match ty {
        syn::Type::Path(path) => path
            .path
            .segments
            .last()
            .map_or(false, |segment| segment.ident == "Header"),
        _ => false,
    });
    if !leads_with_header {
        panic!("the first field of a Record must be a relic::Header");
    }
    s.add_bounds(synstructure::AddBounds::None);
    s.add_where_predicate(syn::parse_quote! { Self: ::relic::Flat });
    s.gen_impl(quote! {
        gen unsafe impl ::relic::Record for @Self {}
    })
}
