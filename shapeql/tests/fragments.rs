use eyre::Result;
use shapeql::{DecodeOptions, Selection, from_str, from_str_with_options, prune};

#[derive(Debug, Default, PartialEq, Selection)]
struct Actor {
    #[graphql("__typename")]
    typename: String,
    login: String,
    #[graphql("... on User")]
    user: UserFields,
    #[graphql("... on Bot")]
    bot: BotFields,
}

#[derive(Debug, Default, PartialEq, Selection)]
#[graphql(rename_all = "camelCase")]
struct UserFields {
    name: String,
    followers_count: u32,
}

#[derive(Debug, Default, PartialEq, Selection)]
struct BotFields {
    id: String,
    name: String,
}

const BOTH: &str = r#"{
    "__typename": "User",
    "login": "octocat",
    "name": "The Octocat",
    "followersCount": 3938,
    "id": "MDQ6VXNlcjU4MzIzMQ=="
}"#;

#[test]
fn fragments_share_the_enclosing_object() -> Result<()> {
    shapeql_testhelpers::setup();

    let actor: Actor = from_str_with_options(BOTH, &DecodeOptions::new().prune(false))?;

    assert_eq!(actor.typename, "User");
    assert_eq!(actor.login, "octocat");
    assert_eq!(actor.user.name, "The Octocat");
    assert_eq!(actor.user.followers_count, 3938);
    assert_eq!(actor.bot.name, "The Octocat");
    assert_eq!(actor.bot.id, "MDQ6VXNlcjU4MzIzMQ==");
    Ok(())
}

#[test]
fn non_matching_fragments_are_cleared() -> Result<()> {
    shapeql_testhelpers::setup();

    let actor: Actor = from_str(BOTH)?;

    assert_eq!(actor.login, "octocat");
    assert_eq!(
        actor.user,
        UserFields {
            name: "The Octocat".into(),
            followers_count: 3938,
        }
    );
    assert_eq!(actor.bot, BotFields::default());
    Ok(())
}

#[test]
fn no_typename_keeps_every_fragment() -> Result<()> {
    shapeql_testhelpers::setup();

    let actor: Actor = from_str(r#"{"name": "Hubot", "id": "B1"}"#)?;

    assert_eq!(actor.user.name, "Hubot");
    assert_eq!(actor.bot.name, "Hubot");
    assert_eq!(actor.bot.id, "B1");
    Ok(())
}

#[test]
fn unrelated_typename_keeps_every_fragment() -> Result<()> {
    shapeql_testhelpers::setup();

    let actor: Actor = from_str(r#"{"__typename": "Mannequin", "name": "M", "id": "X"}"#)?;

    assert_eq!(actor.user.name, "M");
    assert_eq!(actor.bot.name, "M");
    Ok(())
}

#[test]
fn pruning_is_idempotent() -> Result<()> {
    shapeql_testhelpers::setup();

    let mut actor: Actor = from_str(BOTH)?;
    let before = format!("{actor:?}");
    prune(&mut actor);
    prune(&mut actor);
    assert_eq!(format!("{actor:?}"), before);
    Ok(())
}

#[test]
fn unconditional_fragments_are_never_cleared() -> Result<()> {
    shapeql_testhelpers::setup();

    #[derive(Debug, Default, Selection)]
    struct Node {
        #[graphql("__typename")]
        typename: String,
        #[graphql("...NodeFields")]
        common: Common,
        #[graphql("... @include(if: $withUser)")]
        extra: Common,
        #[graphql("... on User")]
        user: UserFields,
        #[graphql("... on Bot")]
        bot: BotFields,
    }

    #[derive(Debug, Default, Selection)]
    struct Common {
        id: String,
    }

    let node: Node = from_str(r#"{"__typename": "Bot", "id": "B1", "name": "Hubot"}"#)?;

    assert_eq!(node.common.id, "B1");
    assert_eq!(node.extra.id, "B1");
    assert_eq!(node.bot.id, "B1");
    assert_eq!(node.bot.name, "Hubot");
    assert_eq!(node.user, UserFields::default());
    Ok(())
}

#[test]
fn fragments_inside_fragments() -> Result<()> {
    shapeql_testhelpers::setup();

    #[derive(Debug, Default, Selection)]
    struct Search {
        #[graphql("__typename")]
        typename: String,
        #[graphql("... on Repository")]
        repository: RepositoryFields,
    }

    #[derive(Debug, Default, Selection)]
    struct RepositoryFields {
        name: String,
        #[graphql("... on Starrable")]
        starrable: Starrable,
    }

    #[derive(Debug, Default, Selection)]
    struct Starrable {
        #[graphql("stargazerCount")]
        stars: u32,
    }

    let search: Search = from_str(
        r#"{"__typename": "Repository", "name": "shapeql", "stargazerCount": 12}"#,
    )?;

    assert_eq!(search.repository.name, "shapeql");
    assert_eq!(search.repository.starrable.stars, 12);
    Ok(())
}

#[test]
fn optional_fragments_are_allocated() -> Result<()> {
    shapeql_testhelpers::setup();

    #[derive(Debug, Default, Selection)]
    struct Owner {
        #[graphql("__typename")]
        typename: Option<String>,
        #[graphql("... on Organization")]
        organization: Option<OrganizationFields>,
        #[graphql("... on User")]
        user: Option<UserFields>,
    }

    #[derive(Debug, Default, Selection)]
    struct OrganizationFields {
        name: String,
    }

    let owner: Owner = from_str(r#"{"__typename": "Organization", "name": "rust-lang"}"#)?;

    // Without a confirmed type, every optional fragment stays allocated.
    let owner: Owner = from_str(r#"{"__typename": "Mannequin"}"#)?;
    assert!(owner.organization.is_some());
    assert!(owner.user.is_some());

    let owner: Owner = from_str(r#"{"name": "rust-lang"}"#)?;
    assert_eq!(owner.organization.map(|o| o.name).as_deref(), Some("rust-lang"));
    assert_eq!(owner.user.map(|u| u.name).as_deref(), Some("rust-lang"));

    assert_eq!(owner.typename.as_deref(), Some("Organization"));
    assert_eq!(owner.organization.map(|o| o.name).as_deref(), Some("rust-lang"));
    assert!(owner.user.is_none());
    Ok(())
}

#[test]
fn pruning_reaches_into_sequences_and_surviving_fragments() -> Result<()> {
    shapeql_testhelpers::setup();

    #[derive(Debug, Default, Selection)]
    struct Timeline {
        items: Vec<Item>,
    }

    #[derive(Debug, Default, Selection)]
    struct Item {
        #[graphql("__typename")]
        typename: String,
        #[graphql("... on IssueComment")]
        comment: CommentFields,
        #[graphql("... on LabeledEvent")]
        labeled: LabeledFields,
    }

    #[derive(Debug, Default, Selection)]
    struct CommentFields {
        author: Option<Actor>,
    }

    #[derive(Debug, Default, Selection)]
    struct LabeledFields {
        author: Option<Actor>,
        label: String,
    }

    let timeline: Timeline = from_str(
        r#"{"items": [
            {"__typename": "IssueComment", "author": {"__typename": "Bot", "name": "dependabot", "id": "B7"}},
            {"__typename": "LabeledEvent", "label": "bug", "author": {"__typename": "User", "name": "Ana", "followersCount": 1}}
        ]}"#,
    )?;

    let [first, second] = &timeline.items[..] else {
        panic!("expected two items, got {}", timeline.items.len());
    };

    assert!(first.labeled.author.is_none());
    let author = first.comment.author.as_ref().expect("comment author");
    assert_eq!(author.bot.name, "dependabot");
    assert_eq!(author.user, UserFields::default());

    assert!(second.comment.author.is_none());
    assert_eq!(second.labeled.label, "bug");
    let author = second.labeled.author.as_ref().expect("event author");
    assert_eq!(author.user.name, "Ana");
    assert_eq!(author.bot, BotFields::default());
    Ok(())
}

#[test]
fn embedded_structs_share_the_namespace() -> Result<()> {
    shapeql_testhelpers::setup();

    #[derive(Debug, Default, Selection)]
    struct Issue {
        title: String,
        #[graphql(embed)]
        timestamps: Timestamps,
    }

    #[derive(Debug, Default, Selection)]
    #[graphql(rename_all = "camelCase")]
    struct Timestamps {
        created_at: String,
        updated_at: String,
    }

    let issue: Issue = from_str(
        r#"{"title": "Crash", "createdAt": "2024-03-01", "updatedAt": "2024-03-02"}"#,
    )?;
    assert_eq!(issue.title, "Crash");
    assert_eq!(issue.timestamps.created_at, "2024-03-01");
    assert_eq!(issue.timestamps.updated_at, "2024-03-02");

    // The embedded struct is not addressed by its own name.
    assert!(from_str::<Issue>(r#"{"timestamps": {"createdAt": ""}}"#).is_err());
    Ok(())
}

#[test]
fn keys_unknown_to_every_branch_fail() {
    shapeql_testhelpers::setup();

    let err = from_str::<Actor>(r#"{"email": "x"}"#).unwrap_err();
    insta::assert_snapshot!(err, @"unknown field `email` (looked up in 3 branches)");
}
