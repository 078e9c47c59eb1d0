//! Interpretation of GraphQL selection tags.
//!
//! A tag is the piece of GraphQL query text a field stands for, e.g.
//! `user(login: $login)`, `avatar: avatarUrl(size: 72)`, `__typename` or
//! `... on Organization`.

use crate::TYPENAME;

/// What a GraphQL tag says about a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag<'a> {
    /// A selected field, addressed by this JSON key
    Named(&'a str),
    /// The `__typename` meta field
    Typename,
    /// An inline fragment or fragment spread
    Fragment {
        /// `Type` in `... on Type`; `None` for unconditional fragments
        on: Option<&'a str>,
    },
}

impl<'a> Tag<'a> {
    /// Parses a tag.
    ///
    /// Arguments and directives are ignored. For aliased selections
    /// (`alias: field`) the alias is kept, since that is the key the server
    /// uses in the response.
    pub fn parse(tag: &'a str) -> Self {
        let tag = tag.trim();

        if let Some(rest) = tag.strip_prefix("...") {
            return Tag::Fragment {
                on: type_condition(rest),
            };
        }

        if tag == TYPENAME {
            return Tag::Typename;
        }

        let mut name = tag;
        for sep in ['(', ':', '@'] {
            if let Some(idx) = name.find(sep) {
                name = &name[..idx];
            }
        }
        Tag::Named(name.trim())
    }
}

fn type_condition(fragment: &str) -> Option<&str> {
    let cond = fragment.trim_start().strip_prefix("on")?;
    if !cond.starts_with(char::is_whitespace) {
        return None;
    }
    let cond = cond.trim_start();
    let end = cond
        .find(|c: char| c.is_whitespace() || c == '@' || c == '{')
        .unwrap_or(cond.len());
    let cond = &cond[..end];
    (!cond.is_empty()).then_some(cond)
}
