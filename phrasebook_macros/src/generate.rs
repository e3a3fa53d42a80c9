//! Code generation for message proxies.
//!
//! For a trait `T` the macro emits a `TProxy` struct holding a
//! `MessageResolver` plus one field per nested section, an implementation
//! of `SectionProxy` wiring those fields up, and an implementation of `T`
//! whose methods package their arguments and delegate to the resolver.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::parse::{MethodModel, ReturnShape, TraitModel};

fn proxy_ident(trait_ident: &syn::Ident) -> syn::Ident {
    format_ident!("{trait_ident}Proxy")
}

fn args_expr(method: &MethodModel) -> TokenStream {
    let mut args = quote! { ::phrasebook::MessageArgs::new() };
    for parameter in &method.parameters {
        let placeholder = &parameter.placeholder;
        let binding = &parameter.binding;
        args = if parameter.is_replace {
            quote! { #args.replace(#placeholder, #binding) }
        } else {
            quote! { #args.format(#placeholder, #binding) }
        };
    }
    args
}

fn method_impl(method: &MethodModel) -> TokenStream {
    let sig = &method.sig;
    let key = &method.key;
    match &method.shape {
        ReturnShape::Single => {
            let args = args_expr(method);
            quote! {
                #sig {
                    self.resolver.message(#key, &#args)
                }
            }
        }
        ReturnShape::List => {
            let args = args_expr(method);
            quote! {
                #sig {
                    self.resolver.message_list(#key, &#args)
                }
            }
        }
        ReturnShape::Section(_) => {
            let field = &sig.ident;
            quote! {
                #sig {
                    &self.#field
                }
            }
        }
    }
}

pub(crate) fn expand(item: &syn::ItemTrait, model: &TraitModel) -> TokenStream {
    let trait_ident = &item.ident;
    let vis = &item.vis;
    let proxy = proxy_ident(trait_ident);

    let mut field_defs = Vec::new();
    let mut field_inits = Vec::new();
    for method in &model.methods {
        let ReturnShape::Section(section_trait) = &method.shape else {
            continue;
        };
        let field = &method.sig.ident;
        let section_proxy = proxy_ident(section_trait);
        let key = &method.key;
        field_defs.push(quote! { #field: #section_proxy });
        field_inits.push(quote! {
            #field: <#section_proxy as ::phrasebook::SectionProxy>::from_resolver(
                resolver.section(#key),
            )
        });
    }

    let method_impls = model.methods.iter().map(method_impl);

    quote! {
        #item

        #[derive(Debug)]
        #vis struct #proxy {
            resolver: ::phrasebook::MessageResolver,
            #(#field_defs,)*
        }

        impl ::phrasebook::SectionProxy for #proxy {
            fn from_resolver(resolver: ::phrasebook::MessageResolver) -> Self {
                Self {
                    #(#field_inits,)*
                    resolver,
                }
            }
        }

        impl #trait_ident for #proxy {
            #(#method_impls)*
        }
    }
}
