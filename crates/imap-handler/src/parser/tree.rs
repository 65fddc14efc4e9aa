//! Token tree builder.
//!
//! A single forward pass over the attribute part of a response line. Each
//! character is dispatched on the current [`State`]; composites (lists and
//! sections) live in an arena of [`Node`]s addressed by index, while a leaf
//! token is buffered in its state until a terminator decides its final kind
//! and the finished node is pushed.

use crate::options::Options;
use crate::syntax::{CharClass, is_atom_char};
use crate::{Error, Result};

/// Index of a node in the arena.
pub(crate) type NodeId = usize;

/// The synthetic root every tree starts with.
pub(crate) const ROOT: NodeId = 0;

/// Node types of the token tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Tree,
    List,
    String,
    Literal,
    Atom,
    Sequence,
    Section,
    Partial,
}

/// One node of the token tree.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) value: String,
    pub(crate) children: Vec<NodeId>,
    /// Where construction resumes once this node closes.
    pub(crate) parent: Option<NodeId>,
    pub(crate) closed: bool,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// A fully built token tree.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    end: usize,
}

impl Tree {
    /// Returns the node with the given id.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Returns the position just past the last character of the input.
    pub(crate) const fn end_position(&self) -> usize {
        self.end
    }
}

/// Read-only facts about the line the tree is built for.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Context {
    /// The command was OK, NO, BAD, PREAUTH or BYE, so a `[` at the top level
    /// opens a response code.
    pub(crate) status_response: bool,
}

/// A leaf token being accumulated.
#[derive(Debug)]
struct Pending {
    start: usize,
    value: String,
}

impl Pending {
    const fn new(start: usize) -> Self {
        Self {
            start,
            value: String::new(),
        }
    }

    fn seeded(start: usize, c: char) -> Self {
        Self {
            start,
            value: c.to_string(),
        }
    }
}

/// A sequence set being accumulated.
#[derive(Debug)]
struct PendingSequence {
    token: Pending,
    /// Re-typed from a number, so the set already counts as closed.
    from_number: bool,
}

/// A `{n}` literal being read.
#[derive(Debug)]
struct PendingLiteral {
    start: usize,
    declared_length: Option<usize>,
    allow_nonsync: bool,
    body_started: bool,
    consumed: usize,
    value: String,
}

impl PendingLiteral {
    const fn new(start: usize) -> Self {
        Self {
            start,
            declared_length: None,
            allow_nonsync: false,
            body_started: false,
            consumed: 0,
            value: String::new(),
        }
    }
}

/// Tokenizer state between characters.
#[derive(Debug)]
enum State {
    /// Expecting the start of a new element.
    Normal,
    Atom(Pending),
    Sequence(PendingSequence),
    String(Pending),
    Literal(PendingLiteral),
    Partial(Pending),
}

/// Builds the token tree for `input`, the attribute part of a line that
/// starts at character `offset` of the full line.
pub(crate) fn build(input: &str, offset: usize, context: Context, options: Options) -> Result<Tree> {
    let mut builder = TreeBuilder::new(input, offset, context, options);
    builder.run()?;
    Ok(Tree {
        end: builder.end_position(),
        nodes: builder.nodes,
    })
}

struct TreeBuilder {
    chars: Vec<char>,
    offset: usize,
    context: Context,
    options: Options,
    nodes: Vec<Node>,
    current: NodeId,
}

impl TreeBuilder {
    fn new(input: &str, offset: usize, context: Context, options: Options) -> Self {
        let root = Node {
            kind: NodeKind::Tree,
            value: String::new(),
            children: Vec::new(),
            parent: None,
            closed: false,
            start: offset,
            end: offset,
        };
        Self {
            chars: input.chars().collect(),
            offset,
            context,
            options,
            nodes: vec![root],
            current: ROOT,
        }
    }

    fn run(&mut self) -> Result<()> {
        let mut state = State::Normal;
        let mut i = 0;

        while i < self.chars.len() {
            let c = self.chars[i];
            state = match state {
                State::Normal => self.normal(c, &mut i)?,
                State::Atom(token) => self.atom(token, c, &mut i)?,
                State::Sequence(sequence) => self.sequence(sequence, c, &mut i)?,
                State::String(token) => self.string(token, c, &mut i)?,
                State::Literal(literal) => self.literal(literal, c, &mut i)?,
                State::Partial(token) => self.partial(token, c, &mut i)?,
            };
            i += 1;
        }

        self.finish(state)
    }

    fn normal(&mut self, c: char, i: &mut usize) -> Result<State> {
        let position = self.position(*i);

        match c {
            '"' => Ok(State::String(Pending::new(position))),
            '(' => {
                self.open(NodeKind::List, position);
                Ok(State::Normal)
            }
            ')' | ']' => {
                self.close_composite(c, position)?;
                self.skip_space(i);
                Ok(State::Normal)
            }
            '<' if *i > 0 && self.chars[*i - 1] == ']' => Ok(State::Partial(Pending::new(position))),
            '{' => Ok(State::Literal(PendingLiteral::new(position))),
            '*' => Ok(State::Sequence(PendingSequence {
                token: Pending::seeded(position, c),
                from_number: false,
            })),
            ' ' => Ok(State::Normal),
            '[' if self.context.status_response && self.current == ROOT => {
                self.response_code(i)?;
                Ok(State::Normal)
            }
            // `\` leads system flags, `%` is the LIST wildcard
            _ if is_atom_char(c) || c == '\\' || c == '%' => {
                Ok(State::Atom(Pending::seeded(position, c)))
            }
            _ => Err(Error::UnexpectedChar { position, found: c }),
        }
    }

    /// Opens the `[...]` response code of a status response.
    fn response_code(&mut self, i: &mut usize) -> Result<()> {
        let position = self.position(*i);
        tracing::trace!(position, "response code");

        self.push_leaf(NodeKind::Atom, String::new(), position, position);
        self.open(NodeKind::Section, position);

        // RFC 2221 REFERRAL carries an IMAP URL that is not a valid atom, so
        // everything up to the closing bracket is taken verbatim.
        if !self.lookahead_eq_ignore_case(*i + 1, "REFERRAL ") {
            return Ok(());
        }

        let keyword_start = *i + 1;
        self.push_leaf(
            NodeKind::Atom,
            "REFERRAL".to_string(),
            self.position(keyword_start),
            self.position(keyword_start + 7),
        );

        let url_start = *i + 10;
        let Some(close) = (url_start..self.chars.len()).find(|&j| self.chars[j] == ']') else {
            return Err(Error::UnexpectedEndOfInput {
                position: self.end_position(),
            });
        };
        let url: String = self.chars[url_start..close].iter().collect();
        tracing::trace!(position = self.position(url_start), "REFERRAL payload");
        self.push_leaf(
            NodeKind::Atom,
            url,
            self.position(url_start),
            self.position(close).saturating_sub(1),
        );

        self.close_current(self.position(close));
        *i = close;
        self.skip_space(i);
        Ok(())
    }

    fn atom(&mut self, mut token: Pending, c: char, i: &mut usize) -> Result<State> {
        let position = self.position(*i);

        match c {
            ' ' => {
                self.push_leaf(NodeKind::Atom, token.value, token.start, position - 1);
                Ok(State::Normal)
            }
            ')' if self.current_kind() == NodeKind::List => {
                self.push_leaf(NodeKind::Atom, token.value, token.start, position - 1);
                self.close_current(position);
                self.skip_space(i);
                Ok(State::Normal)
            }
            ']' if self.current_kind() == NodeKind::Section => {
                self.push_leaf(NodeKind::Atom, token.value, token.start, position - 1);
                self.close_current(position);
                self.skip_space(i);
                Ok(State::Normal)
            }
            // digits followed by a range operator are a sequence set
            ',' | ':' if token.value.chars().all(|d| d.is_ascii_digit()) => {
                token.value.push(c);
                Ok(State::Sequence(PendingSequence {
                    token,
                    from_number: true,
                }))
            }
            '[' => {
                let upper = token.value.to_ascii_uppercase();
                if upper != "BODY" && upper != "BODY.PEEK" {
                    return Err(Error::UnexpectedSectionStart { position });
                }
                self.push_leaf(NodeKind::Atom, token.value, token.start, position - 1);
                self.open(NodeKind::Section, position);
                Ok(State::Normal)
            }
            _ => {
                let allowed = c != '<'
                    && token.value != "\\*"
                    && (is_atom_char(c) || c == ']' || (c == '*' && token.value == "\\"));
                if !allowed {
                    return Err(Error::UnexpectedChar { position, found: c });
                }
                token.value.push(c);
                Ok(State::Atom(token))
            }
        }
    }

    fn sequence(&mut self, sequence: PendingSequence, c: char, i: &mut usize) -> Result<State> {
        let PendingSequence {
            mut token,
            from_number,
        } = sequence;
        let position = self.position(*i);
        let last = token.value.chars().last();

        match c {
            ' ' => {
                if !ends_with_bound(&token.value) {
                    return Err(Error::UnexpectedWhitespace { position });
                }
                self.push_leaf(NodeKind::Sequence, token.value, token.start, position - 1);
                return Ok(State::Normal);
            }
            ']' if self.current_kind() == NodeKind::Section => {
                if !ends_with_bound(&token.value) {
                    return Err(Error::UnexpectedChar { position, found: c });
                }
                self.push_leaf(NodeKind::Sequence, token.value, token.start, position - 1);
                self.close_current(position);
                self.skip_space(i);
                return Ok(State::Normal);
            }
            ':' => {
                if !matches!(last, Some(l) if l.is_ascii_digit() || l == '*') {
                    return Err(Error::UnexpectedChar { position, found: c });
                }
            }
            '*' => {
                if !matches!(last, Some(',' | ':')) {
                    return Err(Error::UnexpectedChar { position, found: c });
                }
            }
            ',' => {
                if !ends_with_bound(&token.value) {
                    return Err(Error::UnexpectedChar { position, found: c });
                }
            }
            _ if CharClass::Digit.contains(c) => {
                // nothing but a separator may follow a wildcard
                if last == Some('*') {
                    return Err(Error::UnexpectedChar { position, found: c });
                }
            }
            _ => return Err(Error::UnexpectedChar { position, found: c }),
        }

        token.value.push(c);
        Ok(State::Sequence(PendingSequence { token, from_number }))
    }

    fn string(&mut self, mut token: Pending, c: char, i: &mut usize) -> Result<State> {
        match c {
            '"' => {
                let position = self.position(*i);
                self.push_leaf(NodeKind::String, token.value, token.start, position);
                self.skip_space(i);
                return Ok(State::Normal);
            }
            '\\' => {
                *i += 1;
                let Some(&escaped) = self.chars.get(*i) else {
                    return Err(Error::UnexpectedEndOfInput {
                        position: self.end_position(),
                    });
                };
                token.value.push(escaped);
            }
            // no class check: servers put arbitrary bytes in quoted text
            _ => token.value.push(c),
        }
        Ok(State::String(token))
    }

    fn literal(&mut self, mut literal: PendingLiteral, c: char, i: &mut usize) -> Result<State> {
        let position = self.position(*i);

        if literal.body_started {
            if c == '\0' {
                return Err(Error::UnexpectedChar { position, found: c });
            }
            literal.value.push(c);
            literal.consumed += 1;
            if literal
                .declared_length
                .is_some_and(|length| literal.consumed >= length)
            {
                self.push_leaf(NodeKind::Literal, literal.value, literal.start, position);
                self.skip_space(i);
                return Ok(State::Normal);
            }
            return Ok(State::Literal(literal));
        }

        match c {
            '+' if self.options.literal_plus
                && literal.declared_length.is_some()
                && !literal.allow_nonsync =>
            {
                literal.allow_nonsync = true;
            }
            '}' => {
                let Some(length) = literal.declared_length else {
                    return Err(Error::UnexpectedChar { position, found: c });
                };
                *i += self.literal_line_break(*i)?;
                literal.body_started = true;
                tracing::trace!(
                    length,
                    nonsync = literal.allow_nonsync,
                    position,
                    "literal announced"
                );

                if length == 0 {
                    let end = self.position(*i);
                    self.push_leaf(NodeKind::Literal, String::new(), literal.start, end);
                    self.skip_space(i);
                    return Ok(State::Normal);
                }
            }
            _ => {
                let Some(digit) = c.to_digit(10) else {
                    return Err(Error::UnexpectedChar { position, found: c });
                };
                literal.declared_length = match literal.declared_length {
                    None => Some(digit as usize),
                    Some(0) => return Err(Error::InvalidLiteralLength { position }),
                    Some(n) => Some(
                        n.checked_mul(10)
                            .and_then(|n| n.checked_add(digit as usize))
                            .ok_or(Error::InvalidLiteralLength { position })?,
                    ),
                };
            }
        }
        Ok(State::Literal(literal))
    }

    /// Returns how many characters the line break after the `}` at `i`
    /// spans: `\n` or `\r\n`.
    fn literal_line_break(&self, i: usize) -> Result<usize> {
        match (self.chars.get(i + 1).copied(), self.chars.get(i + 2).copied()) {
            (Some('\n'), _) => Ok(1),
            (Some('\r'), Some('\n')) => Ok(2),
            (Some('\r'), Some(found)) => Err(Error::UnexpectedChar {
                position: self.position(i + 2),
                found,
            }),
            (Some('\r') | None, _) => Err(Error::UnexpectedEndOfInput {
                position: self.end_position(),
            }),
            (Some(found), _) => Err(Error::UnexpectedChar {
                position: self.position(i + 1),
                found,
            }),
        }
    }

    fn partial(&mut self, mut token: Pending, c: char, i: &mut usize) -> Result<State> {
        let position = self.position(*i);

        match c {
            '>' => {
                // an empty `<>` has no start offset
                if token.value.is_empty() || token.value.ends_with('.') {
                    return Err(Error::InvalidPartial { position });
                }
                self.push_leaf(NodeKind::Partial, token.value, token.start, position);
                self.skip_space(i);
                return Ok(State::Normal);
            }
            '.' => {
                if token.value.is_empty() || token.value.contains('.') {
                    return Err(Error::UnexpectedChar { position, found: c });
                }
            }
            _ if CharClass::Digit.contains(c) => {
                // no leading zeros in either bound
                if token.value == "0" || token.value.ends_with(".0") {
                    return Err(Error::InvalidPartial { position });
                }
            }
            _ => return Err(Error::UnexpectedChar { position, found: c }),
        }

        token.value.push(c);
        Ok(State::Partial(token))
    }

    /// Flushes the final state and checks that every composite was closed.
    fn finish(&mut self, state: State) -> Result<()> {
        let end = self.end_position();

        match state {
            State::Normal => {}
            State::Atom(token) => {
                self.push_leaf(NodeKind::Atom, token.value, token.start, end.saturating_sub(1));
            }
            State::Sequence(PendingSequence {
                token,
                from_number: true,
            }) => {
                self.push_leaf(NodeKind::Sequence, token.value, token.start, end.saturating_sub(1));
            }
            // a trailing bare `*` is a mailbox pattern, not a sequence set
            State::Sequence(PendingSequence { token, .. }) if token.value == "*" => {
                tracing::trace!(position = token.start, "trailing wildcard taken as atom");
                self.push_leaf(NodeKind::Atom, token.value, token.start, token.start);
            }
            State::Sequence(_) | State::String(_) | State::Literal(_) | State::Partial(_) => {
                return Err(Error::UnexpectedEndOfInput { position: end });
            }
        }

        if self.current != ROOT {
            return Err(Error::UnexpectedEndOfInput { position: end });
        }
        self.nodes[ROOT].closed = true;
        self.nodes[ROOT].end = end;
        Ok(())
    }

    /// Opens a composite under the current node and descends into it.
    fn open(&mut self, kind: NodeKind, start: usize) {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            value: String::new(),
            children: Vec::new(),
            parent: Some(self.current),
            closed: false,
            start,
            end: start,
        });
        self.nodes[self.current].children.push(id);
        self.current = id;
    }

    /// Appends a finished leaf to the current node.
    fn push_leaf(&mut self, kind: NodeKind, value: String, start: usize, end: usize) {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            value,
            children: Vec::new(),
            parent: Some(self.current),
            closed: true,
            start,
            end,
        });
        self.nodes[self.current].children.push(id);
    }

    /// Closes the current composite and returns to its parent.
    fn close_current(&mut self, end: usize) {
        let node = &mut self.nodes[self.current];
        node.closed = true;
        node.end = end;
        tracing::trace!(kind = ?node.kind, start = node.start, end = node.end, "closed");
        self.current = node.parent.unwrap_or(ROOT);
    }

    /// Closes the current list on `)` or section on `]`.
    fn close_composite(&mut self, terminator: char, position: usize) -> Result<()> {
        let expected = if terminator == ')' {
            NodeKind::List
        } else {
            NodeKind::Section
        };
        if self.current_kind() != expected {
            return Err(Error::UnexpectedTerminator {
                position,
                terminator,
            });
        }
        self.close_current(position);
        Ok(())
    }

    fn current_kind(&self) -> NodeKind {
        self.nodes[self.current].kind
    }

    /// Consumes one space following a terminator.
    fn skip_space(&self, i: &mut usize) {
        if self.chars.get(*i + 1) == Some(&' ') {
            *i += 1;
        }
    }

    fn lookahead_eq_ignore_case(&self, from: usize, expected: &str) -> bool {
        let mut chars = self.chars.iter().skip(from);
        expected
            .chars()
            .all(|e| chars.next().is_some_and(|c| c.eq_ignore_ascii_case(&e)))
    }

    const fn position(&self, i: usize) -> usize {
        self.offset + i
    }

    fn end_position(&self) -> usize {
        self.offset + self.chars.len()
    }
}

/// Returns true if a sequence set may end here: after a number, or after a
/// `*` that closes a range.
fn ends_with_bound(value: &str) -> bool {
    let mut rev = value.chars().rev();
    match rev.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('*') => rev.next() == Some(':'),
        _ => false,
    }
}
