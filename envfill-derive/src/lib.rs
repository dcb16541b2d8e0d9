mod field;

use darling::{
    FromDeriveInput,
    ast::{Data, Fields},
};
use proc_macro2::{Literal, TokenStream};
use quote::{ToTokens, quote};
use syn::{DeriveInput, Generics, Ident, parse_macro_input};

use crate::field::EnvFieldReceiver;

const SHAPE_ERROR: &str = "FromEnv can only be derived for structs with named fields";

#[proc_macro_derive(FromEnv, attributes(env))]
pub fn derive_from_env(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive(input) {
        Ok(output) => output.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn impl_derive(input: DeriveInput) -> darling::Result<TokenStream> {
    // Checked before darling sees the input so that every wrong shape gets
    // the same message, spanned at the type name.
    if !matches!(
        &input.data,
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(_),
            ..
        })
    ) {
        return Err(darling::Error::custom(SHAPE_ERROR).with_span(&input.ident));
    }

    let receiver = FromEnvReceiver::from_derive_input(&input)?;

    receiver.validate()?;

    Ok(receiver.to_token_stream())
}

#[derive(FromDeriveInput)]
#[darling(supports(struct_named))]
struct FromEnvReceiver {
    pub ident: Ident,
    pub generics: Generics,
    pub data: Data<(), EnvFieldReceiver>,
}

struct ConstTokens {
    crate_path: TokenStream,
    private_path: TokenStream,
}

impl ToTokens for FromEnvReceiver {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let consts = ConstTokens {
            crate_path: quote!(::envfill),
            private_path: quote!(::envfill::__private),
        };
        let private_path = &consts.private_path;

        let impl_from_env = self.impl_from_env(&consts);

        let derive = quote! {
            const _: () = {
                #[allow(unused_imports)]
                use #private_path::dispatch::*;

                #impl_from_env
            };
        };

        tokens.extend(derive);
    }
}

impl FromEnvReceiver {
    fn validate(&self) -> darling::Result<()> {
        if self.generics.params.is_empty() {
            Ok(())
        } else {
            let err = darling::Error::custom("FromEnv cannot be derived for generic structs")
                .with_span(&self.ident);
            Err(err)
        }
    }

    fn impl_from_env(&self, consts: &ConstTokens) -> TokenStream {
        let struct_name = &self.ident;
        let crate_path = &consts.crate_path;
        let private_path = &consts.private_path;

        let descriptors = self.get_fields().iter().map(|field| {
            let name = field.name();
            let key = field.key();
            let eligible = field.is_eligible();

            quote! {
                #crate_path::FieldDescriptor::new(#name, #key, #eligible)
            }
        });

        // The probe carries one reference more than the highest priority
        // impl in `dispatch`, see the module docs there.
        let decode_arms = self.eligible_fields().map(|(index, field)| {
            let ident = &field.ident;
            let ty = &field.ty;

            quote! {
                #index => (&&&&&&&#private_path::Probe::<#ty>::new())
                    .decode_into(&mut self.#ident, raw),
            }
        });

        let decoder_arms = self.eligible_fields().map(|(index, field)| {
            let ty = &field.ty;

            quote! {
                #index => ::core::option::Option::Some(
                    (&&&&&&&#private_path::Probe::<#ty>::new()).decoder()
                ),
            }
        });

        quote! {
            #[automatically_derived]
            #[allow(unused_variables, clippy::needless_borrow)]
            impl #crate_path::FromEnv for #struct_name {
                const FIELDS: &'static [#crate_path::FieldDescriptor] = &[
                    #(#descriptors,)*
                ];

                fn decode_field(
                    &mut self,
                    index: usize,
                    raw: &str,
                ) -> #crate_path::ParseResult<()> {
                    match index {
                        #(#decode_arms)*
                        _ => ::core::result::Result::Err(#private_path::unknown_field(index)),
                    }
                }

                fn decoder(index: usize) -> ::core::option::Option<#crate_path::Decoder> {
                    match index {
                        #(#decoder_arms)*
                        _ => ::core::option::Option::None,
                    }
                }
            }
        }
    }

    /// Eligible fields with their position in the descriptor table.
    fn eligible_fields(&self) -> impl Iterator<Item = (Literal, &EnvFieldReceiver)> {
        self.get_fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| field.is_eligible())
            .map(|(index, field)| (Literal::usize_unsuffixed(index), field))
    }

    fn get_fields(&self) -> &Fields<EnvFieldReceiver> {
        let Data::Struct(fields) = &self.data else {
            unreachable!("shape is checked before parsing");
        };

        fields
    }
}
