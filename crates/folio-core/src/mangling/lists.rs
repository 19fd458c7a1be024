//! Grouping list items under list nodes

use crate::tree::{NodeKind, Payload, SyntacticTree};
use tracing::debug;

/// Wraps runs of `PARAGRAPH_AS_LIST_ITEM_WITH_TRIPLE_HYPHEN_` into
/// `_LIST_WITH_TRIPLE_HYPHEN` nodes.
pub fn aggregate_lists(tree: &SyntacticTree) -> SyntacticTree {
    debug!("Aggregating lists");
    aggregate(
        tree,
        NodeKind::ParagraphAsListItemWithTripleHyphen,
        NodeKind::ListWithTripleHyphen,
    )
}

/// Turns raw embedded list items into `_EMBEDDED_LIST_WITH_HYPHEN` lists of
/// `_EMBEDDED_LIST_ITEM`, at every depth.
///
/// A list gathers consecutive items of the same kind, skipping the whitespace and line
/// breaks between them; a lone item still gets its own list. The width of the
/// whitespace before an item is its indentation: a deeper item opens a nested list, a
/// shallower one closes it.
pub fn aggregate_embedded_lists(tree: &SyntacticTree) -> SyntacticTree {
    debug!("Aggregating embedded lists");
    embed(tree, 0)
}

/// `indent` is the indentation of `tree` itself, which its first child inherits.
fn embed(tree: &SyntacticTree, indent: usize) -> SyntacticTree {
    if tree.child_count() == 0 {
        return tree.clone();
    }

    let source = tree.children();
    let mut children: Vec<SyntacticTree> = Vec::with_capacity(source.len());
    let mut index = 0;
    while index < source.len() {
        let child = &source[index];
        let child_indent = children.last().map_or(indent, whitespace_width);
        match child.kind().and_then(embedded_list_wrapper) {
            Some(wrapper) => {
                let (items, next) = gobble(source, index, child_indent);
                let mut position = 0;
                while position < items.len() {
                    let base = items[position].0;
                    children.push(nest(&items, &mut position, base, wrapper));
                }
                index = next;
            }
            None => {
                children.push(embed(child, child_indent));
                index += 1;
            }
        }
    }
    tree.adopt(children)
}

fn embedded_list_wrapper(item: NodeKind) -> Option<NodeKind> {
    match item {
        NodeKind::EmbeddedListItemWithHyphen => Some(NodeKind::EmbeddedListWithHyphen),
        _ => None,
    }
}

fn whitespace_width(tree: &SyntacticTree) -> usize {
    if tree.is(NodeKind::Whitespace) {
        tree.first_text().map_or(0, |text| text.chars().count())
    } else {
        0
    }
}

/// Collects the items of the run starting at `start` with their indentation. Returns
/// the index of the first sibling left out; separators met on the way are consumed.
fn gobble(
    siblings: &[SyntacticTree],
    start: usize,
    first_indent: usize,
) -> (Vec<(usize, SyntacticTree)>, usize) {
    let kind = siblings[start].kind();
    let mut items = vec![(first_indent, siblings[start].clone())];
    let mut indent = first_indent;
    let mut cursor = start + 1;
    while let Some(sibling) = siblings.get(cursor) {
        if sibling.is(NodeKind::Whitespace) {
            indent = whitespace_width(sibling);
        } else if sibling.is(NodeKind::LineBreak) {
            indent = 0;
        } else if sibling.kind() == kind {
            items.push((indent, sibling.clone()));
        } else {
            break;
        }
        cursor += 1;
    }
    (items, cursor)
}

/// Builds the list of items at `indent` from `position` on, recursing into deeper
/// items and stopping at the first shallower one.
fn nest(
    items: &[(usize, SyntacticTree)],
    position: &mut usize,
    indent: usize,
    wrapper: NodeKind,
) -> SyntacticTree {
    let location = items.get(*position).and_then(|(_, item)| item.location().cloned());
    let mut members = Vec::new();
    while let Some((item_indent, item)) = items.get(*position) {
        if *item_indent == indent {
            members.push(SyntacticTree::new(
                Payload::Kind(NodeKind::EmbeddedListItem),
                item.children().to_vec(),
                item.location().cloned(),
            ));
            *position += 1;
        } else if *item_indent > indent {
            members.push(nest(items, position, *item_indent, wrapper));
        } else {
            break;
        }
    }
    SyntacticTree::new(Payload::Kind(wrapper), members, location)
}

/// Replaces every maximal run of two or more consecutive `item` children by one
/// `wrapper` node holding the run, at every depth. Existing wrappers are left as they
/// are, which makes the pass idempotent.
fn aggregate(tree: &SyntacticTree, item: NodeKind, wrapper: NodeKind) -> SyntacticTree {
    if tree.child_count() == 0 || tree.is(wrapper) {
        return tree.clone();
    }

    let mut children = Vec::with_capacity(tree.child_count());
    let mut run: Vec<SyntacticTree> = Vec::new();
    for child in tree.children() {
        let child = aggregate(child, item, wrapper);
        if child.is(item) {
            run.push(child);
        } else {
            flush(&mut run, &mut children, wrapper);
            children.push(child);
        }
    }
    flush(&mut run, &mut children, wrapper);
    tree.adopt(children)
}

fn flush(run: &mut Vec<SyntacticTree>, children: &mut Vec<SyntacticTree>, wrapper: NodeKind) {
    match run.len() {
        0 => {}
        1 => children.append(run),
        _ => children.push(SyntacticTree::node(wrapper, std::mem::take(run))),
    }
}
