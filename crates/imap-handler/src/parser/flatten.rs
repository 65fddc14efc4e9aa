//! Attribute flattener.
//!
//! Walks a closed token tree and produces the public [`Attribute`] values.

use crate::types::{Attribute, Partial};
use crate::{Error, Result};

use super::tree::{NodeId, NodeKind, ROOT, Tree};

/// Converts the children of the tree root into attributes.
pub(crate) fn flatten(tree: &Tree) -> Result<Vec<Attribute>> {
    let mut attributes = Vec::new();
    walk_children(tree, ROOT, &mut attributes)?;
    Ok(attributes)
}

fn walk_children(tree: &Tree, id: NodeId, branch: &mut Vec<Attribute>) -> Result<()> {
    for &child in &tree.node(id).children {
        walk(tree, child, branch)?;
    }
    Ok(())
}

fn walk(tree: &Tree, id: NodeId, branch: &mut Vec<Attribute>) -> Result<()> {
    let node = tree.node(id);

    if !node.closed {
        return Err(Error::UnexpectedEndOfInput {
            position: tree.end_position(),
        });
    }

    match node.kind {
        NodeKind::String => branch.push(Attribute::QuotedString(node.value.clone())),
        NodeKind::Literal => branch.push(Attribute::Literal(node.value.clone())),
        NodeKind::Sequence => branch.push(Attribute::SequenceSet(node.value.clone())),
        NodeKind::Atom if node.value.eq_ignore_ascii_case("NIL") => branch.push(Attribute::Null),
        NodeKind::Atom => branch.push(Attribute::atom(node.value.clone())),
        NodeKind::List => {
            let mut items = Vec::with_capacity(node.children.len());
            walk_children(tree, id, &mut items)?;
            branch.push(Attribute::List(items));
        }
        NodeKind::Section => {
            let mut items = Vec::with_capacity(node.children.len());
            walk_children(tree, id, &mut items)?;
            match branch.last_mut() {
                Some(Attribute::Atom { section, .. }) => *section = Some(items),
                _ => {
                    return Err(Error::UnexpectedSectionStart {
                        position: node.start,
                    });
                }
            }
        }
        NodeKind::Partial => {
            let range = parse_partial(&node.value, node.start)?;
            match branch.last_mut() {
                Some(Attribute::Atom {
                    section: Some(_),
                    partial,
                    ..
                }) => *partial = Some(range),
                _ => {
                    return Err(Error::InvalidPartial {
                        position: node.start,
                    });
                }
            }
        }
        NodeKind::Tree => walk_children(tree, id, branch)?,
    }

    Ok(())
}

/// Parses `start` or `start.end`, requiring `end >= start`.
fn parse_partial(value: &str, position: usize) -> Result<Partial> {
    let invalid = || Error::InvalidPartial { position };

    let (start, end) = match value.split_once('.') {
        Some((start, end)) => (start, Some(end)),
        None => (value, None),
    };
    let start: u64 = start.parse().map_err(|_| invalid())?;

    match end {
        Some(end) => {
            let end: u64 = end.parse().map_err(|_| invalid())?;
            if end < start {
                return Err(invalid());
            }
            Ok(Partial::new(start, end))
        }
        None => Ok(Partial::origin(start)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::parser::tree::{Context, build};

    fn flatten_str(input: &str) -> Result<Vec<Attribute>> {
        let tree = build(input, 0, Context::default(), Options::default())?;
        flatten(&tree)
    }

    #[test]
    fn test_scalars() {
        let attrs = flatten_str("ATOM \"quoted\" {3}\r\nlit 1:2 NIL nil").unwrap();
        assert_eq!(
            attrs,
            vec![
                Attribute::atom("ATOM"),
                Attribute::quoted("quoted"),
                Attribute::literal("lit"),
                Attribute::sequence_set("1:2"),
                Attribute::Null,
                Attribute::Null,
            ]
        );
    }

    #[test]
    fn test_nested_lists() {
        let attrs = flatten_str("(a (b (c)) d)").unwrap();
        assert_eq!(
            attrs,
            vec![Attribute::list(vec![
                Attribute::atom("a"),
                Attribute::list(vec![
                    Attribute::atom("b"),
                    Attribute::list(vec![Attribute::atom("c")]),
                ]),
                Attribute::atom("d"),
            ])]
        );
    }

    #[test]
    fn test_section_and_partial_attach_to_atom() {
        let attrs = flatten_str("BODY[HEADER.FIELDS (DATE FROM)]<0.2048> x").unwrap();
        assert_eq!(
            attrs,
            vec![
                Attribute::Atom {
                    value: "BODY".to_string(),
                    section: Some(vec![
                        Attribute::atom("HEADER.FIELDS"),
                        Attribute::list(vec![Attribute::atom("DATE"), Attribute::atom("FROM")]),
                    ]),
                    partial: Some(Partial::new(0, 2048)),
                },
                Attribute::atom("x"),
            ]
        );
    }

    #[test]
    fn test_empty_section() {
        let attrs = flatten_str("BODY[]").unwrap();
        assert_eq!(attrs, vec![Attribute::atom_with_section("BODY", vec![])]);
    }

    #[test]
    fn test_partial_order() {
        let err = flatten_str("BODY[]<10.5>").unwrap_err();
        assert_eq!(err, Error::InvalidPartial { position: 6 });

        let attrs = flatten_str("BODY[]<5.5>").unwrap();
        assert_eq!(attrs[0].partial(), Some(Partial::new(5, 5)));

        let attrs = flatten_str("BODY[]<42>").unwrap();
        assert_eq!(attrs[0].partial(), Some(Partial::origin(42)));
    }

    #[test]
    fn test_parse_partial_overflow() {
        let err = parse_partial("99999999999999999999", 3).unwrap_err();
        assert_eq!(err, Error::InvalidPartial { position: 3 });
    }
}
