//! Identifiers derived from titles
//!
//! A title is first flattened to plain text the way a text renderer would print it,
//! with delimited blocks wrapped in `_`. The text is then cleaned into something usable
//! as an identifier or a tag: punctuation becomes `_`, words after the first get
//! camel-cased, and every character outside `[0-9a-zA-Z_-]` goes away.

use crate::tree::{NodeKind, SyntacticTree};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| regex(r"[,.;?!:]+"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| regex(r" +"));
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| regex(r"-+"));
static LOW_LINES: LazyLock<Regex> = LazyLock::new(|| regex(r"_+"));
static SPACE_AROUND_LOW_LINE: LazyLock<Regex> = LazyLock::new(|| regex(r" _|_ "));
// The leading space is part of the match and disappears with camel-casing.
static WORD_BUT_FIRST: LazyLock<Regex> =
    LazyLock::new(|| regex(r" ([0-9a-zA-Z]+(?:-[0-9a-zA-Z]+)*)"));
static LEADING: LazyLock<Regex> = LazyLock::new(|| regex(r"\A-*_*"));
static TRAILING: LazyLock<Regex> = LazyLock::new(|| regex(r"-*_*\z"));
static MIXED_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| regex(r"-_|_-"));
static FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| regex(r"[^0-9a-zA-Z\-_]+"));
static NOT_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| regex(r"[^0-9a-zA-Z]+"));

fn regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(error) => unreachable!("invalid built-in pattern {pattern}: {error}"),
    }
}

/// Identifier text for a title tree (usually a `LEVEL_TITLE`). May be empty.
pub fn to_implicit_identifier(title: &SyntacticTree) -> String {
    let mut text = String::new();
    textualize(title, &mut text);
    clean_for_tag(&text)
}

fn textualize(tree: &SyntacticTree, buffer: &mut String) {
    let Some(kind) = tree.kind() else {
        buffer.push_str(tree.text());
        return;
    };
    match kind {
        NodeKind::Whitespace | NodeKind::LineBreak => buffer.push(' '),
        NodeKind::ApostropheWordmate => buffer.push('\''),
        _ if kind.is_punctuation_sign() => buffer.push_str(sign(kind)),
        NodeKind::BlockOfLiteralInsideGraveAccents
        | NodeKind::BlockOfLiteralInsideGraveAccentPairs => {
            let mut literal = String::new();
            textualize_children(tree, &mut literal);
            separate(buffer);
            buffer.push_str(&NOT_ALPHANUMERIC.replace_all(&literal, "-"));
        }
        NodeKind::BlockInsideParenthesis
        | NodeKind::BlockInsideSquareBrackets
        | NodeKind::BlockInsideDoubleQuotes
        | NodeKind::BlockInsideSolidusPairs
        | NodeKind::BlockInsideHyphenPairs
        | NodeKind::BlockInsideTwoHyphensThenHyphenLowLine => {
            separate(buffer);
            buffer.push('_');
            textualize_children(tree, buffer);
            buffer.push('_');
        }
        NodeKind::Word | NodeKind::ExtendedWord => {
            separate(buffer);
            textualize_children(tree, buffer);
        }
        _ => textualize_children(tree, buffer),
    }
}

fn textualize_children(tree: &SyntacticTree, buffer: &mut String) {
    for child in tree.children() {
        textualize(child, buffer);
    }
}

/// Words are separated by one space unless something already separates them.
fn separate(buffer: &mut String) {
    if !buffer.is_empty() && !buffer.ends_with([' ', '\'', '_']) {
        buffer.push(' ');
    }
}

fn sign(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::SignComma => ",",
        NodeKind::SignFullstop => ".",
        NodeKind::SignEllipsis => "...",
        NodeKind::SignQuestionmark => "?",
        NodeKind::SignExclamationmark => "!",
        NodeKind::SignSemicolon => ";",
        NodeKind::SignColon => ":",
        _ => "",
    }
}

/// Turns free text into a string usable as an identifier or a tag.
pub fn clean_for_tag(text: &str) -> String {
    let text = PUNCTUATION.replace_all(text, "_");
    let text: String = text.chars().map(strip_diacritic).collect();
    let text = collapse(&text);
    let text = SPACE_AROUND_LOW_LINE.replace_all(&text, "_");
    let text = WORD_BUT_FIRST.replace_all(&text, |captures: &Captures| {
        capitalize(&captures[1])
    });
    let text = LEADING.replace(&text, "");
    let text = TRAILING.replace(&text, "");
    let text = collapse(&text);
    let text = MIXED_SEPARATORS.replace_all(&text, "_");
    FORBIDDEN.replace_all(&text, "").into_owned()
}

fn collapse(text: &str) -> String {
    let text = SPACES.replace_all(text, " ");
    let text = HYPHENS.replace_all(&text, "-");
    LOW_LINES.replace_all(&text, "_").into_owned()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn strip_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(children: Vec<SyntacticTree>) -> SyntacticTree {
        SyntacticTree::node(NodeKind::LevelTitle, children)
    }

    #[test]
    fn test_single_word() {
        assert_eq!(to_implicit_identifier(&title(vec![SyntacticTree::word("z")])), "z");
    }

    #[test]
    fn test_words_are_camel_cased() {
        let tree = title(vec![
            SyntacticTree::word("hello"),
            SyntacticTree::word("big"),
            SyntacticTree::word("world"),
        ]);
        assert_eq!(to_implicit_identifier(&tree), "helloBigWorld");
    }

    #[test]
    fn test_punctuation_and_blocks() {
        let tree = title(vec![
            SyntacticTree::word("Why"),
            SyntacticTree::leaf(NodeKind::SignQuestionmark),
            SyntacticTree::node(
                NodeKind::BlockInsideParenthesis,
                vec![SyntacticTree::word("aside")],
            ),
        ]);
        assert_eq!(to_implicit_identifier(&tree), "Why_aside");
    }

    #[test]
    fn test_clean_for_tag() {
        assert_eq!(clean_for_tag("Été, déjà!"), "Ete_deja");
        assert_eq!(clean_for_tag("--a  b--"), "aB");
        assert_eq!(clean_for_tag("x -_ y"), "x_y");
        assert_eq!(clean_for_tag("   "), "");
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(to_implicit_identifier(&title(Vec::new())), "");
    }
}
