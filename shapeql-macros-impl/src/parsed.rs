//! Parses `#[derive(Selection)]` input into [`PStruct`].

use core::result::Result;

use proc_macro2::{Ident, Span, TokenStream, TokenTree};
use quote::quote_spanned;
use unsynn::*;

use crate::RenameRule;

// ============================================================================
// UNSYNN TYPE DEFINITIONS
// ============================================================================

keyword! {
    KStruct = "struct";
    KPub = "pub";
    KGraphql = "graphql";
    KRenameAll = "rename_all";
    KEmbed = "embed";
    KFlatten = "flatten";
    KSkip = "skip";
}

operator! {
    /// Represents the '=' operator.
    Eq = "=";
    /// Represents the ':' operator.
    Col = ":";
    /// Opens a generic argument list.
    Lt = "<";
    /// Closes a generic argument list.
    Gt = ">";
    /// Kept whole so its `>` never closes a generic argument list.
    Arrow = "->";
}

unsynn! {
    /// A struct with named fields: `pub struct Viewer { ... }`
    struct StructDef {
        attrs: Vec<OuterAttr>,
        _vis: Option<Visibility>,
        _kw_struct: KStruct,
        name: Ident,
        body: BraceGroupContaining<CommaDelimitedVec<FieldDef>>,
    }

    /// `pub`, `pub(crate)`, `pub(super)`, ...
    struct Visibility {
        _pub: KPub,
        _restriction: Option<ParenthesisGroup>,
    }

    /// Outer attribute: `#[...]`, parsed as [`AttrBody`] in a second step
    struct OuterAttr {
        _pound: Pound,
        content: BracketGroup,
    }

    /// A named field: `#[graphql("login")] pub login: String`
    struct FieldDef {
        attrs: Vec<OuterAttr>,
        _vis: Option<Visibility>,
        name: Ident,
        _colon: Col,
        _ty: FieldType,
    }

    /// Type tokens, up to the comma that ends the field
    struct FieldType {
        tokens: Any<Cons<Except<Comma>, AngleTokenTree>>,
    }

    /// One token tree, or a whole `<...>` run including its commas
    enum AngleTokenTree {
        Arrow(Arrow),
        Angle(AngleGroup),
        Tree(TokenTree),
    }

    /// `<` ... `>`
    struct AngleGroup {
        _lt: Lt,
        items: Any<Cons<Except<Gt>, AngleTokenTree>>,
        _gt: Gt,
    }

    /// What's inside `#[...]`: ours, or somebody else's
    enum AttrBody {
        Graphql(GraphqlAttr),
        Other(Cons<Except<KGraphql>, Any<TokenTree>>),
    }

    /// `graphql(...)`
    struct GraphqlAttr {
        _kw: KGraphql,
        args: ParenthesisGroup,
    }

    /// Comma-separated `graphql(...)` arguments
    struct GraphqlArgs {
        args: CommaDelimitedVec<GraphqlArg>,
    }

    /// One `graphql(...)` argument
    enum GraphqlArg {
        /// `rename_all = "camelCase"`
        RenameAll(RenameAllArg),
        /// `"... on User"`
        Tag(LiteralString),
        /// `embed`
        Embed(KEmbed),
        /// `flatten`, same as `embed`
        Flatten(KFlatten),
        /// `skip`
        Skip(KSkip),
        /// Anything else; reported as an error
        Unknown(TokenTree),
    }

    /// `rename_all = "..."`
    struct RenameAllArg {
        _kw: KRenameAll,
        _eq: Eq,
        rule: LiteralString,
    }
}

// ============================================================================
// PARSED STRUCTURES
// ============================================================================

/// A parsed struct with named fields.
#[derive(Debug)]
pub struct PStruct {
    /// The struct's identifier
    pub name: Ident,
    /// Fields in declaration order
    pub fields: Vec<PField>,
}

/// A parsed struct field.
#[derive(Debug)]
pub struct PField {
    /// The identifier used to access the field (may be raw, `r#type`)
    pub ident: Ident,
    /// The declared name after `rename_all`, without any `r#` prefix
    pub name: String,
    /// GraphQL tag from `#[graphql("...")]`
    pub tag: Option<String>,
    /// `#[graphql(embed)]` / `#[graphql(flatten)]`
    pub embedded: bool,
    /// `#[graphql(skip)]`
    pub skip: bool,
}

/// An error with the span it should be reported at.
#[derive(Debug)]
pub struct Error {
    span: Span,
    message: String,
}

impl Error {
    fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Expands to a `compile_error!` pointing at the offending tokens.
    pub fn to_compile_error(&self) -> TokenStream {
        let message = &self.message;
        quote_spanned! {self.span=> ::core::compile_error!(#message); }
    }
}

enum Arg {
    Tag(String),
    Embed,
    Skip,
    RenameAll(RenameRule),
}

impl PStruct {
    /// Parses the derive input.
    pub fn parse(input: TokenStream) -> Result<Self, Error> {
        let mut iter = input.to_token_iter();
        let parsed: StructDef = iter.parse().map_err(|_| {
            Error::new(
                Span::call_site(),
                "`Selection` can only be derived for structs with named fields",
            )
        })?;

        let mut rename_all = None;
        for attr in &parsed.attrs {
            for (arg, span) in graphql_args(attr)? {
                match arg {
                    Arg::RenameAll(rule) => rename_all = Some(rule),
                    _ => {
                        return Err(Error::new(
                            span,
                            "only `rename_all` is supported on structs",
                        ));
                    }
                }
            }
        }

        let fields = parsed
            .body
            .content
            .iter()
            .map(|field| PField::from_def(&field.value, rename_all))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PStruct {
            name: parsed.name.clone(),
            fields,
        })
    }
}

impl PField {
    fn from_def(def: &FieldDef, rename_all: Option<RenameRule>) -> Result<Self, Error> {
        let mut tag = None;
        let mut embedded = false;
        let mut skip = false;
        for attr in &def.attrs {
            for (arg, span) in graphql_args(attr)? {
                match arg {
                    Arg::Tag(t) => {
                        if tag.replace(t).is_some() {
                            return Err(Error::new(span, "duplicate GraphQL tag"));
                        }
                    }
                    Arg::Embed => embedded = true,
                    Arg::Skip => skip = true,
                    Arg::RenameAll(_) => {
                        return Err(Error::new(span, "`rename_all` belongs on the struct"));
                    }
                }
            }
        }

        let raw = def.name.to_string();
        let raw = raw.strip_prefix("r#").unwrap_or(&raw);
        let name = match rename_all {
            Some(rule) => rule.apply(raw),
            None => raw.to_owned(),
        };

        Ok(PField {
            ident: def.name.clone(),
            name,
            tag,
            embedded,
            skip,
        })
    }
}

/// Extracts the arguments of a `graphql(...)` attribute; other attributes
/// yield nothing.
fn graphql_args(attr: &OuterAttr) -> Result<Vec<(Arg, Span)>, Error> {
    let group = &attr.content.0;
    let stream = group.stream();
    let mut iter = stream.to_token_iter();
    let body: AttrBody = iter
        .parse()
        .map_err(|_| Error::new(group.span(), "expected `graphql(...)`"))?;
    let AttrBody::Graphql(graphql) = body else {
        return Ok(Vec::new());
    };
    if let Some(tt) = iter.next() {
        return Err(Error::new(tt.span(), "expected `graphql(...)`"));
    }

    let group = &graphql.args.0;
    let stream = group.stream();
    let mut iter = stream.to_token_iter();
    let args: GraphqlArgs = iter
        .parse()
        .map_err(|e| Error::new(group.span(), e.to_string()))?;

    let span = group.span();
    let mut parsed = Vec::new();
    for arg in args.args.iter() {
        let arg = match &arg.value {
            GraphqlArg::Tag(lit) => Arg::Tag(string_value(lit, span)?),
            GraphqlArg::Embed(_) | GraphqlArg::Flatten(_) => Arg::Embed,
            GraphqlArg::Skip(_) => Arg::Skip,
            GraphqlArg::RenameAll(rename) => {
                let rule = string_value(&rename.rule, span)?;
                match RenameRule::parse(&rule) {
                    Some(rule) => Arg::RenameAll(rule),
                    None => {
                        return Err(Error::new(
                            span,
                            format!(
                                "unknown rename rule `{rule}`, expected one of `camelCase`, `PascalCase`, `snake_case`"
                            ),
                        ));
                    }
                }
            }
            GraphqlArg::Unknown(tt) => {
                return Err(Error::new(tt.span(), "unknown `graphql` attribute argument"));
            }
        };
        parsed.push((arg, span));
    }
    if let Some(tt) = iter.next() {
        return Err(Error::new(tt.span(), "unexpected token in `graphql(...)`"));
    }
    Ok(parsed)
}

/// The text of a plain string literal. `LiteralString::value()` keeps the
/// quotes.
fn string_value(lit: &LiteralString, span: Span) -> Result<String, Error> {
    let value = lit.value();
    let Some(text) = value
        .strip_prefix('"')
        .and_then(|text| text.strip_suffix('"'))
    else {
        return Err(Error::new(span, "expected a plain string literal"));
    };
    if text.contains('\\') {
        return Err(Error::new(
            span,
            "escape sequences are not supported in GraphQL tags",
        ));
    }
    Ok(text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn parses_fields_and_tags() {
        let input = quote! {
            #[derive(Selection)]
            #[graphql(rename_all = "camelCase")]
            pub struct Repository {
                /// The name
                pub name_with_owner: String,
                #[graphql("stargazers(first: 10)")]
                pub(crate) stars: Stargazers,
                #[graphql("... on Fork")]
                fork: Option<Fork>,
                #[graphql(embed)]
                common: Common,
                #[graphql(skip)]
                cache: std::collections::HashMap<String, Vec<u8>>,
                r#type: String,
            }
        };

        let parsed = PStruct::parse(input).unwrap();
        assert_eq!(parsed.name, "Repository");

        let names: Vec<_> = parsed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["nameWithOwner", "stars", "fork", "common", "cache", "type"]
        );

        assert_eq!(parsed.fields[1].tag.as_deref(), Some("stargazers(first: 10)"));
        assert_eq!(parsed.fields[2].tag.as_deref(), Some("... on Fork"));
        assert!(parsed.fields[3].embedded);
        assert!(parsed.fields[4].skip);
        assert_eq!(parsed.fields[5].ident.to_string(), "r#type");
    }

    #[test]
    fn generic_arguments_do_not_split_fields() {
        let input = quote! {
            struct Hooks {
                a: Option<fn(u8, u8) -> Vec<u8>>,
                b: Vec<(u8, Option<Vec<u8>>)>,
                c: ::std::collections::BTreeMap<String, Vec<u32>>,
                d: u32,
            }
        };
        let parsed = PStruct::parse(input).unwrap();
        let names: Vec<_> = parsed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn rejects_tuple_structs() {
        let err = PStruct::parse(quote! { struct Id(String); }).unwrap_err();
        assert_eq!(
            err.message(),
            "`Selection` can only be derived for structs with named fields"
        );
    }

    #[test]
    fn rejects_unknown_arguments() {
        let err = PStruct::parse(quote! {
            struct Viewer {
                #[graphql(alias)]
                login: String,
            }
        })
        .unwrap_err();
        assert_eq!(err.message(), "unknown `graphql` attribute argument");

        let err = PStruct::parse(quote! {
            struct Viewer {
                #[graphql(embed = true)]
                base: Base,
            }
        })
        .unwrap_err();
        assert_eq!(err.message(), "unexpected token in `graphql(...)`");

        let err = PStruct::parse(quote! {
            #[graphql(rename_all = "kebab-case")]
            struct Viewer {
                login: String,
            }
        })
        .unwrap_err();
        assert!(err.message().starts_with("unknown rename rule `kebab-case`"));
    }

    #[test]
    fn tags_are_plain_strings() {
        let err = PStruct::parse(quote! {
            struct Viewer {
                #[graphql("a\"b")]
                login: String,
            }
        })
        .unwrap_err();
        assert_eq!(
            err.message(),
            "escape sequences are not supported in GraphQL tags"
        );
    }

    #[test]
    fn other_attributes_are_ignored() {
        let parsed = PStruct::parse(quote! {
            #[derive(Debug, Default)]
            #[serde(rename_all = "camelCase")]
            struct Viewer {
                #[doc = "login"]
                #[allow(dead_code)]
                login: String,
            }
        })
        .unwrap();
        assert_eq!(parsed.fields[0].name, "login");
        assert_eq!(parsed.fields[0].tag, None);
    }
}
