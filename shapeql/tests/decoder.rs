use std::borrow::Cow;
use std::collections::VecDeque;

use eyre::Result;
use shapeql::{
    DecodeError, DecodeOptions, Decoder, JsonTokenizer, Selection, Token, TokenSource, from_slice,
    from_slice_into,
};

#[derive(Debug, Default, PartialEq, Selection)]
struct Node {
    #[graphql("__typename")]
    typename: String,
    #[graphql("... on Issue")]
    issue: IssueFields,
    #[graphql("... on PullRequest")]
    pull: PullFields,
}

#[derive(Debug, Default, PartialEq, Selection)]
struct IssueFields {
    number: u32,
}

#[derive(Debug, Default, PartialEq, Selection)]
struct PullFields {
    number: u32,
    merged: bool,
}

/// Tokens built by hand, as a transport that already parsed the body would
/// hand them over.
struct Replay {
    tokens: VecDeque<Token<'static>>,
}

impl Replay {
    fn new(tokens: impl IntoIterator<Item = Token<'static>>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

impl TokenSource<'static> for Replay {
    fn next_token(&mut self) -> Result<Option<Token<'static>>, DecodeError> {
        Ok(self.tokens.pop_front())
    }
}

fn key(k: &'static str) -> Token<'static> {
    Token::Key(Cow::Borrowed(k))
}

#[test]
fn custom_token_source() -> Result<()> {
    shapeql_testhelpers::setup();

    let mut decoder = Decoder::new(Replay::new([
        Token::ObjectStart,
        key("__typename"),
        Token::String("PullRequest".into()),
        key("number"),
        Token::Number("7".into()),
        key("merged"),
        Token::Bool(true),
        Token::ObjectEnd,
    ]));

    let mut node = Node::default();
    decoder.decode(&mut node)?;
    decoder.finish()?;

    assert_eq!(node.typename, "PullRequest");
    assert_eq!(node.pull, PullFields { number: 7, merged: true });
    assert_eq!(node.issue, IssueFields::default());
    Ok(())
}

#[test]
fn custom_sources_report_trailing_tokens() {
    shapeql_testhelpers::setup();

    let mut decoder = Decoder::new(Replay::new([Token::Null, Token::Null]));
    let mut value: Option<u8> = Some(1);
    decoder.decode(&mut value).unwrap();
    assert_eq!(value, None);

    let err = decoder.finish().err().expect("trailing token");
    assert_eq!(err.code(), "shapeql::trailing_data");
    assert_eq!(err.span, None);
}

#[test]
fn malformed_token_streams() {
    shapeql_testhelpers::setup();

    let mut decoder = Decoder::new(Replay::new([Token::ObjectStart, Token::Null]));
    let err = decoder.decode(&mut Node::default()).unwrap_err();
    insta::assert_snapshot!(err, @"unexpected token: got `null`, expected an object key or `}`");

    let mut decoder = Decoder::new(Replay::new([Token::ObjectStart, key("number"), key("x")]));
    let err = decoder.decode(&mut IssueFields::default()).unwrap_err();
    insta::assert_snapshot!(err, @r#"unexpected token: got key "x", expected a value"#);
}

#[test]
fn several_documents_from_one_decoder() -> Result<()> {
    shapeql_testhelpers::setup();

    let input = br#"
        {"__typename": "Issue", "number": 1}
        {"__typename": "PullRequest", "number": 2, "merged": false}
    "#;
    let mut decoder = Decoder::from_slice(input);

    let mut first = Node::default();
    decoder.decode(&mut first)?;
    let mut second = Node::default();
    decoder.decode(&mut second)?;
    decoder.finish()?;

    assert_eq!(first.issue.number, 1);
    assert_eq!(first.pull.number, 0);
    assert_eq!(second.issue.number, 0);
    assert_eq!(second.pull.number, 2);
    Ok(())
}

#[test]
fn decoder_without_pruning() -> Result<()> {
    shapeql_testhelpers::setup();

    let mut decoder = Decoder::new(JsonTokenizer::new(br#"{"__typename": "Issue", "number": 5}"#))
        .with_options(DecodeOptions::new().prune(false));
    assert!(!decoder.options().prune);

    let mut node = Node::default();
    decoder.decode(&mut node)?;

    assert_eq!(node.issue.number, 5);
    assert_eq!(node.pull.number, 5);
    Ok(())
}

#[test]
fn decoding_into_existing_values() -> Result<()> {
    shapeql_testhelpers::setup();

    let mut node: Node = from_slice(br#"{"__typename": "Issue", "number": 3}"#)?;
    assert_eq!(node.issue.number, 3);

    // Fields the document doesn't mention are left alone, then pruned again.
    from_slice_into(br#"{"__typename": "PullRequest", "merged": true}"#, &mut node)?;
    assert_eq!(node.typename, "PullRequest");
    assert!(node.pull.merged);
    assert_eq!(node.issue, IssueFields::default());
    Ok(())
}
