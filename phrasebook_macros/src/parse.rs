//! Parsing of the proxy model from a trait definition.
//!
//! The model is derived exactly once, at expansion time: message keys and
//! placeholder names from identifiers (or `#[msg(...)]` overrides), call
//! arity from the return type shape, nested sections from `&dyn Trait`
//! accessors. Everything that cannot be classified is a compile error;
//! nothing is deferred to call time.

use quote::format_ident;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;

use crate::naming::NamingScheme;

/// Arguments of the `#[messages(...)]` attribute itself.
pub(crate) struct MacroArgs {
    pub scheme: NamingScheme,
}

impl Parse for MacroArgs {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Self {
                scheme: NamingScheme::default(),
            });
        }
        let ident: syn::Ident = input.parse()?;
        if ident != "rename_all" {
            return Err(syn::Error::new(
                ident.span(),
                "expected `rename_all = \"...\"`",
            ));
        }
        input.parse::<syn::Token![=]>()?;
        let value: syn::LitStr = input.parse()?;
        let scheme = NamingScheme::parse(&value.value()).ok_or_else(|| {
            syn::Error::new(value.span(), "expected \"snake_case\" or \"kebab-case\"")
        })?;
        Ok(Self { scheme })
    }
}

/// Options collected from `#[msg(...)]` helper attributes.
#[derive(Default)]
struct MsgAttrs {
    key: Option<String>,
    name: Option<String>,
    section: bool,
}

fn extract_msg_attrs(attrs: &mut Vec<syn::Attribute>) -> syn::Result<MsgAttrs> {
    let mut out = MsgAttrs::default();
    let mut kept = Vec::new();
    for attr in attrs.drain(..) {
        if !attr.path().is_ident("msg") {
            kept.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                out.key = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("name") {
                out.name = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("section") {
                out.section = true;
                Ok(())
            } else {
                Err(meta.error("unknown `msg` option; expected `key`, `name` or `section`"))
            }
        })?;
    }
    *attrs = kept;
    Ok(out)
}

/// Call arity classified from a method's return type.
pub(crate) enum ReturnShape {
    /// Returns `Message`: a single-message call.
    Single,
    /// Returns `Vec<Message>`: a list call.
    List,
    /// Returns `&dyn Trait`: a nested section accessor.
    Section(syn::Ident),
}

pub(crate) struct ParameterModel {
    pub binding: syn::Ident,
    pub placeholder: String,
    pub is_replace: bool,
}

pub(crate) struct MethodModel {
    pub sig: syn::Signature,
    pub key: String,
    pub shape: ReturnShape,
    pub parameters: Vec<ParameterModel>,
}

pub(crate) struct TraitModel {
    pub methods: Vec<MethodModel>,
}

/// Derives the proxy model, stripping `#[msg(...)]` attributes from the
/// trait as it goes.
pub(crate) fn trait_model(item: &mut syn::ItemTrait, args: &MacroArgs) -> syn::Result<TraitModel> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new(
            item.generics.span(),
            "#[messages] traits must not be generic",
        ));
    }

    let mut methods = Vec::new();
    for entry in &mut item.items {
        let syn::TraitItem::Fn(method) = entry else {
            return Err(syn::Error::new(
                entry.span(),
                "#[messages] traits may only contain methods",
            ));
        };
        // Methods with a default body pass through unproxied.
        if method.default.is_some() {
            continue;
        }
        methods.push(method_model(method, args.scheme)?);
    }
    Ok(TraitModel { methods })
}

fn method_model(method: &mut syn::TraitItemFn, scheme: NamingScheme) -> syn::Result<MethodModel> {
    let attrs = extract_msg_attrs(&mut method.attrs)?;
    let method_span = method.sig.span();

    if method.sig.asyncness.is_some() {
        return Err(syn::Error::new(method_span, "message methods must not be async"));
    }
    if !method.sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            method_span,
            "message methods must not be generic",
        ));
    }

    let mut inputs = method.sig.inputs.iter_mut();
    match inputs.next() {
        Some(syn::FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new(
                method_span,
                "message methods must take `&self`",
            ));
        }
    }

    let mut parameters = Vec::new();
    for (index, input) in inputs.enumerate() {
        let syn::FnArg::Typed(pat_type) = input else {
            return Err(syn::Error::new(input.span(), "unsupported parameter"));
        };
        let overrides = extract_msg_attrs(&mut pat_type.attrs)?;
        parameters.push(parameter_model(pat_type, index, &overrides, scheme)?);
    }

    let key = attrs
        .key
        .unwrap_or_else(|| scheme.apply(&method.sig.ident.to_string()));

    let shape = classify_return(&method.sig, attrs.section)?;
    if matches!(shape, ReturnShape::Section(_)) && !parameters.is_empty() {
        return Err(syn::Error::new(
            method_span,
            "section accessors take no parameters",
        ));
    }

    // The generated impl re-emits the signature with plain identifier
    // patterns so dispatch can reference every argument.
    let mut sig = method.sig.clone();
    let bindings: Vec<&syn::Ident> = parameters.iter().map(|p| &p.binding).collect();
    for (input, binding) in sig.inputs.iter_mut().skip(1).zip(bindings) {
        if let syn::FnArg::Typed(pat_type) = input {
            pat_type.pat = Box::new(syn::parse_quote!(#binding));
        }
    }

    Ok(MethodModel {
        sig,
        key,
        shape,
        parameters,
    })
}

fn parameter_model(
    pat_type: &syn::PatType,
    index: usize,
    overrides: &MsgAttrs,
    scheme: NamingScheme,
) -> syn::Result<ParameterModel> {
    let named = match &*pat_type.pat {
        syn::Pat::Ident(pat) => Some(pat.ident.clone()),
        _ => None,
    };
    let placeholder = match (&overrides.name, &named) {
        (Some(name), _) => name.clone(),
        (None, Some(ident)) => scheme.apply(&ident.to_string()),
        (None, None) => {
            return Err(syn::Error::new(
                pat_type.span(),
                "parameter needs an identifier or a #[msg(name = \"...\")] override",
            ));
        }
    };
    let binding = named.unwrap_or_else(|| format_ident!("__arg{}", index));
    Ok(ParameterModel {
        binding,
        placeholder,
        is_replace: type_is_text(&pat_type.ty),
    })
}

fn type_is_text(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Text" && segment.arguments.is_none())
}

fn type_is_message(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Message" && segment.arguments.is_none())
}

fn vec_of_message(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    if segment.ident != "Vec" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return false;
    };
    let mut args = arguments.args.iter();
    match (args.next(), args.next()) {
        (Some(syn::GenericArgument::Type(inner)), None) => type_is_message(inner),
        _ => false,
    }
}

fn dyn_trait_ident(ty: &syn::Type) -> Option<syn::Ident> {
    let syn::Type::Reference(reference) = ty else {
        return None;
    };
    let syn::Type::TraitObject(object) = &*reference.elem else {
        return None;
    };
    let mut bounds = object.bounds.iter();
    let (Some(syn::TypeParamBound::Trait(bound)), None) = (bounds.next(), bounds.next()) else {
        return None;
    };
    bound.path.segments.last().map(|segment| segment.ident.clone())
}

fn classify_return(sig: &syn::Signature, section: bool) -> syn::Result<ReturnShape> {
    let syn::ReturnType::Type(_, ty) = &sig.output else {
        return Err(syn::Error::new(
            sig.span(),
            "message methods must return Message, Vec<Message>, or &dyn SectionTrait",
        ));
    };
    if let Some(ident) = dyn_trait_ident(ty) {
        return Ok(ReturnShape::Section(ident));
    }
    if section {
        return Err(syn::Error::new(
            sig.span(),
            "#[msg(section)] accessors must return `&dyn SectionTrait`",
        ));
    }
    if type_is_message(ty) {
        return Ok(ReturnShape::Single);
    }
    if vec_of_message(ty) {
        return Ok(ReturnShape::List);
    }
    Err(syn::Error::new(
        sig.span(),
        "message methods must return Message, Vec<Message>, or &dyn SectionTrait",
    ))
}
