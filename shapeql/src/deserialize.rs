//! The decode driver.
//!
//! One JSON value is decoded into several destinations at once: the target
//! itself, and every fragment or embedded struct found in the objects it
//! contains. Each destination is tracked by a [`Branch`], a stack of paths
//! with one entry per JSON container opened since the branch was created.
//! All branches see the same tokens and move in lock-step.

use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

use shapeql_core::{Leaf, Poke, Reflect};
use tracing::{debug, trace};

use crate::error::{DecodeError, DecodeErrorKind, Result, Span};
use crate::options::DecodeOptions;
use crate::path::{Path, PathStep, deref_mut};
use crate::prune::prune;
use crate::resolve::{discover, field_index};
use crate::tokenizer::{JsonTokenizer, Token, TokenSource};

/// Kind of JSON container currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// A cursor into one subtree of the target.
///
/// `None` entries stand for keys or elements that have no place in this
/// subtree; everything nested under them is ignored by this branch.
#[derive(Debug)]
struct Branch {
    stack: Vec<Option<Path>>,
}

impl Branch {
    fn current(&self) -> Option<&Path> {
        self.stack.last().and_then(Option::as_ref)
    }
}

/// State of one decode call.
struct Runner<'o> {
    options: &'o DecodeOptions,
    branches: Vec<Branch>,
    containers: Vec<Container>,
    last_span: Option<Span>,
}

impl<'o> Runner<'o> {
    fn new(options: &'o DecodeOptions) -> Self {
        Self {
            options,
            branches: vec![Branch {
                stack: vec![Some(Path::root())],
            }],
            containers: Vec::new(),
            last_span: None,
        }
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError {
            kind,
            span: self.last_span,
        }
    }

    fn next<'de, S: TokenSource<'de>>(
        &mut self,
        source: &mut S,
        expected: &'static str,
    ) -> Result<Token<'de>> {
        let token = source.next_token()?;
        self.last_span = source.span();
        match token {
            Some(token) => {
                trace!(depth = self.containers.len(), "token {token}");
                Ok(token)
            }
            None => Err(self.error(DecodeErrorKind::UnexpectedEof { expected })),
        }
    }

    /// Consumes tokens until the top-level value is complete.
    fn run<'de, S: TokenSource<'de>>(
        &mut self,
        source: &mut S,
        root: &mut dyn Reflect,
    ) -> Result<()> {
        while !self.branches.is_empty() {
            let mut token = self.next(source, "a value")?;

            match self.containers.last() {
                Some(Container::Object) => match token {
                    Token::ObjectEnd => {
                        self.close();
                        continue;
                    }
                    Token::Key(key) => {
                        self.enter_field(root, &key)?;
                        token = self.next(source, "an object value")?;
                    }
                    other => {
                        return Err(self.error(DecodeErrorKind::UnexpectedToken {
                            got: other.to_string(),
                            expected: "an object key or `}`",
                        }));
                    }
                },
                Some(Container::Array) => {
                    if token == Token::ArrayEnd {
                        self.close();
                        continue;
                    }
                    self.enter_element(root)?;
                }
                None => {}
            }

            self.value(root, token)?;
        }
        Ok(())
    }

    fn value(&mut self, root: &mut dyn Reflect, token: Token<'_>) -> Result<()> {
        let leaf = match token {
            Token::ObjectStart => return self.open_object(root),
            Token::ArrayStart => return self.open_array(root),
            Token::Null => Leaf::Null,
            Token::Bool(b) => Leaf::Bool(b),
            Token::Number(n) => Leaf::Number(n),
            Token::String(s) => Leaf::String(s),
            other @ (Token::Key(_) | Token::ObjectEnd | Token::ArrayEnd) => {
                return Err(self.error(DecodeErrorKind::UnexpectedToken {
                    got: other.to_string(),
                    expected: "a value",
                }));
            }
        };

        for branch in &self.branches {
            let Some(path) = branch.current() else {
                continue;
            };
            let Some(node) = path.resolve(root) else {
                continue;
            };
            trace!("writing {leaf} to {path} ({})", node.shape());
            write_leaf(node, &leaf).map_err(|kind| self.error(kind))?;
        }
        self.pop_all();
        Ok(())
    }

    fn check_depth(&self) -> Result<()> {
        if self.containers.len() >= self.options.max_depth {
            return Err(self.error(DecodeErrorKind::DepthLimitExceeded {
                max: self.options.max_depth,
            }));
        }
        Ok(())
    }

    fn open_object(&mut self, root: &mut dyn Reflect) -> Result<()> {
        self.check_depth()?;
        self.containers.push(Container::Object);

        let mut seeds = Vec::new();
        for branch in &self.branches {
            let Some(path) = branch.current() else {
                continue;
            };
            if let Some(node) = path.resolve(root) {
                if let Poke::Option(opt) = node.poke() {
                    opt.get_or_insert_default();
                }
            }
            seeds.push(path.clone());
        }

        let found = discover(root, &seeds);
        if !found.is_empty() {
            debug!(
                count = found.len(),
                active = self.branches.len(),
                "opening fragment branches"
            );
        }
        self.branches.extend(found.into_iter().map(|path| Branch {
            stack: vec![Some(path)],
        }));
        Ok(())
    }

    fn open_array(&mut self, root: &mut dyn Reflect) -> Result<()> {
        self.check_depth()?;
        self.containers.push(Container::Array);

        for branch in &self.branches {
            let Some(path) = branch.current() else {
                continue;
            };
            let Some(node) = path.resolve(root) else {
                continue;
            };
            if let Poke::Option(opt) = node.poke() {
                if opt.value().is_none() && opt.inner_shape().is_list() {
                    opt.get_or_insert_default();
                }
            }
            if let Some(Poke::List(list)) = deref_mut(node).map(|n| n.poke()) {
                list.clear();
            }
        }
        Ok(())
    }

    fn enter_field(&mut self, root: &mut dyn Reflect, key: &str) -> Result<()> {
        let mut matched = false;
        for branch in &mut self.branches {
            let next = branch.current().and_then(|path| {
                let node = path.resolve(root).and_then(deref_mut)?;
                let index = field_index(node.shape().fields(), key)?;
                Some(path.child(PathStep::Field(index)))
            });
            matched |= next.is_some();
            branch.stack.push(next);
        }

        if !matched {
            return Err(self.error(DecodeErrorKind::UnknownField {
                field: key.to_string(),
                branches: self.branches.len(),
            }));
        }
        Ok(())
    }

    fn enter_element(&mut self, root: &mut dyn Reflect) -> Result<()> {
        let mut matched = false;
        for branch in &mut self.branches {
            let next = branch.current().and_then(|path| {
                let node = path.resolve(root).and_then(deref_mut)?;
                match node.poke() {
                    Poke::List(list) => {
                        let index = list.push_default();
                        Some(path.child(PathStep::Index(index)))
                    }
                    _ => None,
                }
            });
            matched |= next.is_some();
            branch.stack.push(next);
        }

        if !matched {
            return Err(self.error(DecodeErrorKind::NoSequence {
                branches: self.branches.len(),
            }));
        }
        Ok(())
    }

    /// Pops one level from every branch and retires the empty ones.
    fn pop_all(&mut self) {
        let before = self.branches.len();
        for branch in &mut self.branches {
            branch.stack.pop();
        }
        self.branches.retain(|branch| !branch.stack.is_empty());

        let retired = before - self.branches.len();
        if retired > 0 {
            debug!(retired, active = self.branches.len(), "retiring branches");
        }
    }

    fn close(&mut self) {
        self.pop_all();
        self.containers.pop();
    }
}

/// Stores a scalar in a destination.
fn write_leaf(node: &mut dyn Reflect, leaf: &Leaf<'_>) -> core::result::Result<(), DecodeErrorKind> {
    let shape = node.shape();
    match node.poke() {
        Poke::Scalar(_) if leaf.is_null() => Ok(()),
        Poke::Scalar(scalar) => Ok(scalar.set_leaf(leaf)?),
        Poke::Option(opt) => {
            if leaf.is_null() {
                opt.set_none();
                Ok(())
            } else {
                write_leaf(opt.get_or_insert_default(), leaf)
            }
        }
        Poke::Struct(_) if leaf.is_null() => Ok(()),
        Poke::List(list) if leaf.is_null() => {
            list.clear();
            Ok(())
        }
        Poke::Struct(_) | Poke::List(_) => Err(DecodeErrorKind::TypeMismatch {
            expected: shape,
            got: leaf.kind(),
        }),
    }
}

/// Decodes GraphQL responses from a [`TokenSource`].
///
/// This is the lower-level API behind [`from_str`](crate::from_str) and
/// friends, for callers that bring their own tokens.
pub struct Decoder<'de, S> {
    source: S,
    options: DecodeOptions,
    _marker: PhantomData<&'de ()>,
}

impl<'de> Decoder<'de, JsonTokenizer<'de>> {
    /// Creates a decoder reading a JSON document from memory.
    pub fn from_slice(input: &'de [u8]) -> Self {
        Self::new(JsonTokenizer::new(input))
    }
}

impl<'de, S: TokenSource<'de>> Decoder<'de, S> {
    /// Creates a decoder with default options.
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: DecodeOptions::default(),
            _marker: PhantomData,
        }
    }

    /// Replaces the decoding options.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// The options in use.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes the next value into `target`, then prunes fragments unless
    /// pruning is disabled.
    ///
    /// Does not look past the end of the value; call
    /// [`finish`](Self::finish) to make sure nothing follows it.
    pub fn decode(&mut self, target: &mut dyn Reflect) -> Result<()> {
        self.drive(target)?;
        if self.options.prune {
            prune(target);
        }
        Ok(())
    }

    /// Decodes the next value into `target` without pruning.
    pub(crate) fn drive(&mut self, target: &mut dyn Reflect) -> Result<()> {
        debug!(target_shape = %target.shape(), "decoding");
        Runner::new(&self.options).run(&mut self.source, target)
    }

    /// Checks that the input has been fully consumed, and returns the
    /// token source.
    pub fn finish(mut self) -> Result<S> {
        match self.source.next_token()? {
            None => Ok(self.source),
            Some(token) => Err(DecodeError {
                kind: DecodeErrorKind::TrailingData {
                    token: token.to_string(),
                },
                span: self.source.span(),
            }),
        }
    }
}
