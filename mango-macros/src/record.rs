use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    DataStruct, DeriveInput, Fields, Ident, LitStr, Result, Token,
    ext::IdentExt,
    meta::ParseNestedMeta,
};

const OBJECT_ID_KEY: &str = "_id";

struct IdField<'a> {
    ident: &'a Ident,
    key: String,
}

pub(crate) fn expand(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let fields = match &data.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record can only be derived for structs with named fields",
            ));
        }
    };

    let mut collection = name.to_string().to_lowercase();
    let mut rename_all: Option<LitStr> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("record") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    collection = meta.value()?.parse::<LitStr>()?.value();
                    Ok(())
                } else {
                    Err(meta.error("Unknown record attribute, expected `collection`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    rename_all = Some(serialized_name(&meta)?);
                    Ok(())
                } else {
                    skip(&meta)
                }
            })?;
        }
    }

    let mut id_field: Option<IdField> = None;

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        let mut marked = false;
        let mut renamed: Option<String> = None;

        for attr in &field.attrs {
            if attr.path().is_ident("record") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("id") {
                        marked = true;
                        Ok(())
                    } else {
                        Err(meta.error("Unknown record field attribute, expected `id`"))
                    }
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        renamed = Some(serialized_name(&meta)?.value());
                        Ok(())
                    } else {
                        skip(&meta)
                    }
                })?;
            }
        }

        let key = match renamed {
            Some(key) => key,
            None => apply_rename_all(&ident.unraw().to_string(), rename_all.as_ref())?,
        };

        if !marked && key != OBJECT_ID_KEY {
            continue;
        }

        if let Some(existing) = &id_field {
            return Err(syn::Error::new_spanned(
                ident,
                format!(
                    "Multiple identifier fields: `{}` and `{}`. A record has at most one field \
                     marked #[record(id)] or renamed to \"_id\"",
                    existing.ident, ident
                ),
            ));
        }

        id_field = Some(IdField { ident, key });
    }

    let id_impl = match id_field {
        Some(IdField { ident, key }) => quote! {
            fn id_key() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(#key)
            }

            fn id(&self) -> ::std::string::String {
                ::mango::record::IdentifierField::to_identifier(&self.#ident)
            }

            fn set_id(&mut self, id: ::std::string::String) {
                self.#ident = ::mango::record::IdentifierField::from_identifier(id);
            }

            fn clear_id(&mut self) {
                self.#ident = ::core::default::Default::default();
            }
        },
        None => quote! {
            fn id_key() -> ::core::option::Option<&'static str> {
                ::core::option::Option::None
            }

            fn id(&self) -> ::std::string::String {
                ::std::string::String::new()
            }

            fn set_id(&mut self, _id: ::std::string::String) {}

            fn clear_id(&mut self) {}
        },
    };

    Ok(quote! {
        impl #impl_generics ::mango::record::Record for #name #ty_generics #where_clause {
            fn collection_name() -> &'static str {
                #collection
            }

            #id_impl
        }
    })
}

/// Reads `name = "..."` or `name(serialize = "...", deserialize = "...")`, keeping the
/// serialized name since that is the key written to documents.
fn serialized_name(meta: &ParseNestedMeta) -> Result<LitStr> {
    if meta.input.peek(Token![=]) {
        return meta.value()?.parse();
    }

    let mut serialized = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            serialized = Some(inner.value()?.parse::<LitStr>()?);
            Ok(())
        } else {
            skip(&inner)
        }
    })?;

    serialized.ok_or_else(|| meta.error("expected `serialize = \"...\"`"))
}

/// Consumes a serde attribute this macro has no interest in.
fn skip(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream>()?;
    }

    Ok(())
}

fn apply_rename_all(field: &str, rule: Option<&LitStr>) -> Result<String> {
    let Some(rule) = rule else {
        return Ok(field.to_string());
    };

    let pascal = || {
        field
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<String>()
    };

    Ok(match rule.value().as_str() {
        "lowercase" | "snake_case" => field.to_lowercase(),
        "UPPERCASE" | "SCREAMING_SNAKE_CASE" => field.to_uppercase(),
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.to_uppercase().replace('_', "-"),
        "PascalCase" => pascal(),
        "camelCase" => {
            let pascal = pascal();
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        other => {
            return Err(syn::Error::new_spanned(
                rule,
                format!("Unsupported rename_all rule `{other}`"),
            ));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_str(input: DeriveInput) -> Result<String> {
        let syn::Data::Struct(data) = &input.data else {
            unreachable!("tests only pass structs");
        };
        expand(&input, data).map(|tokens| tokens.to_string())
    }

    #[test]
    fn serde_rename_to_object_id_marks_the_identifier() {
        let output = expand_str(parse_quote! {
            struct Space {
                #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
                id: String,
                name: String,
            }
        })
        .unwrap();

        assert!(output.contains("Some (\"_id\")"));
        assert!(output.contains("self . id"));
        assert!(output.contains("\"space\""));
    }

    #[test]
    fn record_id_uses_the_serde_key() {
        let output = expand_str(parse_quote! {
            #[serde(rename_all = "camelCase")]
            #[record(collection = "people")]
            struct Person {
                #[record(id)]
                person_key: String,
            }
        })
        .unwrap();

        assert!(output.contains("Some (\"personKey\")"));
        assert!(output.contains("\"people\""));
    }

    #[test]
    fn substring_matches_are_not_identifiers() {
        let output = expand_str(parse_quote! {
            struct Holder {
                #[serde(rename = "_identifierHolder")]
                holder: String,
            }
        })
        .unwrap();

        assert!(output.contains("None"));
    }

    #[test]
    fn multiple_identifiers_are_rejected() {
        let err = expand_str(parse_quote! {
            struct Twice {
                #[serde(rename = "_id")]
                id: String,
                #[record(id)]
                other: String,
            }
        })
        .unwrap_err();

        assert!(err.to_string().contains("Multiple identifier fields"));
    }

    #[test]
    fn tuple_structs_are_rejected() {
        assert!(expand_str(parse_quote! { struct Pair(String, String); }).is_err());
    }

    #[test]
    fn rename_all_rules() {
        let rule: LitStr = parse_quote!("PascalCase");
        assert_eq!(apply_rename_all("found_time", Some(&rule)).unwrap(), "FoundTime");

        let rule: LitStr = parse_quote!("SCREAMING-KEBAB-CASE");
        assert_eq!(apply_rename_all("found_time", Some(&rule)).unwrap(), "FOUND-TIME");

        let rule: LitStr = parse_quote!("shouting");
        assert!(apply_rename_all("found_time", Some(&rule)).is_err());
    }
}
