//! Procedural macros for `phrasebook`.
//!
//! The [`macro@messages`] attribute derives a typed message proxy from a
//! trait definition. The proxy model (message keys, placeholder mappings,
//! call arity, nested sections) is derived entirely at expansion time;
//! malformed definitions fail the build, never a call.

use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemTrait, parse_macro_input};

mod generate;
mod naming;
mod parse;

/// Derives a message proxy from a trait.
///
/// Every method without a default body maps to one message key: an
/// explicit `#[msg(key = "...")]` override, or the method identifier
/// re-joined by the configured naming scheme
/// (`#[messages(rename_all = "...")]`, default `snake_case`). Parameters
/// map to placeholders the same way (`#[msg(name = "...")]` overrides);
/// a parameter of type `Text` is passed as a styled replacement, anything
/// else as a formatter argument. A method returning `Message` resolves a
/// single message, `Vec<Message>` a message list, and `&dyn OtherTrait`
/// exposes a nested section scoped under the method's key.
#[proc_macro_attribute]
pub fn messages(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as parse::MacroArgs);
    let mut trait_item = parse_macro_input!(item as ItemTrait);
    match parse::trait_model(&mut trait_item, &args) {
        Ok(model) => generate::expand(&trait_item, &model).into(),
        Err(error) => {
            let compile_error = error.to_compile_error();
            quote! {
                #trait_item
                #compile_error
            }
            .into()
        }
    }
}
