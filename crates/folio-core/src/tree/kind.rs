//! The closed vocabulary of node kinds
//!
//! Kinds whose name ends with `_` come straight from the grammar and usually carry
//! text children. Kinds whose name starts with `_` are synthesized by the passes.

use std::fmt;

/// How a node kind reacts to tag filtering and identifier resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagBehavior {
    /// Kept whole when tagged, dropped otherwise.
    Terminal,
    /// Kept whole when tagged, otherwise reduced to its tagged descendants.
    Scope,
    /// Always kept, children filtered.
    Traversable,
    /// Never looked into.
    NonTraversable,
}

macro_rules! node_kinds {
    ($($variant:ident => $name:literal, $behavior:ident, $punctuation:literal;)+) => {
        /// Semantic tag carried by a kind node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum NodeKind {
            $($variant,)+
        }

        impl NodeKind {
            /// Every kind, in declaration order
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant,)+];

            /// Canonical name, as written in tree notation
            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $name,)+
                }
            }

            /// Parses a canonical name.
            pub fn from_name(name: &str) -> Option<NodeKind> {
                match name {
                    $($name => Some(NodeKind::$variant),)+
                    _ => None,
                }
            }

            pub fn tag_behavior(self) -> TagBehavior {
                match self {
                    $(NodeKind::$variant => TagBehavior::$behavior,)+
                }
            }

            pub fn is_punctuation_sign(self) -> bool {
                match self {
                    $(NodeKind::$variant => $punctuation,)+
                }
            }
        }
    };
}

node_kinds! {
    Opus => "OPUS", Traversable, false;
    Novella => "NOVELLA", Traversable, false;
    Part => "PART", Traversable, false;
    ParagraphsInsideAngledBracketPairs => "PARAGRAPHS_INSIDE_ANGLED_BRACKET_PAIRS", Scope, false;
    LevelIntroducer => "LEVEL_INTRODUCER_", NonTraversable, false;
    LevelIntroducerIndent => "LEVEL_INTRODUCER_INDENT_", NonTraversable, false;
    LevelTitle => "LEVEL_TITLE", NonTraversable, false;
    ExtendedWord => "EXTENDED_WORD_", NonTraversable, false;
    BlockInsideParenthesis => "BLOCK_INSIDE_PARENTHESIS", NonTraversable, false;
    BlockInsideSquareBrackets => "BLOCK_INSIDE_SQUARE_BRACKETS", NonTraversable, false;
    BlockInsideDoubleQuotes => "BLOCK_INSIDE_DOUBLE_QUOTES", NonTraversable, false;
    BlockInsideSolidusPairs => "BLOCK_INSIDE_SOLIDUS_PAIRS", NonTraversable, false;
    BlockInsideHyphenPairs => "BLOCK_INSIDE_HYPHEN_PAIRS", NonTraversable, false;
    BlockInsideTwoHyphensThenHyphenLowLine => "BLOCK_INSIDE_TWO_HYPHENS_THEN_HYPHEN_LOW_LINE", NonTraversable, false;
    BlockOfLiteralInsideGraveAccents => "BLOCK_OF_LITERAL_INSIDE_GRAVE_ACCENTS", NonTraversable, false;
    BlockOfLiteralInsideGraveAccentPairs => "BLOCK_OF_LITERAL_INSIDE_GRAVE_ACCENT_PAIRS", NonTraversable, false;
    BlockAfterTilde => "BLOCK_AFTER_TILDE", NonTraversable, false;
    Subblock => "SUBBLOCK", NonTraversable, false;
    LinesOfLiteral => "LINES_OF_LITERAL", NonTraversable, false;
    ParagraphRegular => "PARAGRAPH_REGULAR", Terminal, false;
    ParagraphAsListItemWithTripleHyphen => "PARAGRAPH_AS_LIST_ITEM_WITH_TRIPLE_HYPHEN_", Terminal, false;
    WordAfterCircumflexAccent => "WORD_AFTER_CIRCUMFLEX_ACCENT", NonTraversable, false;
    UrlLiteral => "URL_LITERAL", NonTraversable, false;
    RasterImage => "RASTER_IMAGE", NonTraversable, false;
    VectorImage => "VECTOR_IMAGE", NonTraversable, false;
    ResourceLocation => "RESOURCE_LOCATION", NonTraversable, false;
    EmbeddedListItemWithHyphen => "EMBEDDED_LIST_ITEM_WITH_HYPHEN_", NonTraversable, false;
    Cell => "CELL", NonTraversable, false;
    CellRow => "CELL_ROW", NonTraversable, false;
    CellRowsWithVerticalLine => "CELL_ROWS_WITH_VERTICAL_LINE", Terminal, false;
    Word => "WORD_", NonTraversable, false;
    Whitespace => "WHITESPACE_", NonTraversable, false;
    LineBreak => "LINE_BREAK_", NonTraversable, false;
    Tag => "TAG", NonTraversable, false;
    AbsoluteIdentifier => "ABSOLUTE_IDENTIFIER", NonTraversable, false;
    RelativeIdentifier => "RELATIVE_IDENTIFIER", NonTraversable, false;
    CompositeIdentifier => "COMPOSITE_IDENTIFIER", NonTraversable, false;
    PunctuationSign => "PUNCTUATION_SIGN", NonTraversable, false;
    ApostropheWordmate => "APOSTROPHE_WORDMATE", NonTraversable, false;
    SignComma => "SIGN_COMMA", NonTraversable, true;
    SignFullstop => "SIGN_FULLSTOP", NonTraversable, true;
    SignEllipsis => "SIGN_ELLIPSIS", NonTraversable, true;
    SignQuestionmark => "SIGN_QUESTIONMARK", NonTraversable, true;
    SignExclamationmark => "SIGN_EXCLAMATIONMARK", NonTraversable, true;
    SignSemicolon => "SIGN_SEMICOLON", NonTraversable, true;
    SignColon => "SIGN_COLON", NonTraversable, true;
    CommandInsert => "COMMAND_INSERT_", NonTraversable, false;
    CommandInsertCreateLevel => "COMMAND_INSERT_CREATELEVEL_", NonTraversable, false;
    CommandInsertNoHead => "COMMAND_INSERT_NOHEAD_", NonTraversable, false;
    CommandInsertLevelAbove => "COMMAND_INSERT_LEVELABOVE_", NonTraversable, false;
    CommandInsertRecurse => "COMMAND_INSERT_RECURSE_", NonTraversable, false;
    CommandInsertSort => "COMMAND_INSERT_SORT_", NonTraversable, false;
    CommandInsertStyle => "COMMAND_INSERT_STYLE_", NonTraversable, false;
    CommandMapStylesheet => "COMMAND_MAPSTYLESHEET_", NonTraversable, false;
    CommandMapStylesheetAssignment => "COMMAND_MAPSTYLESHEET_ASSIGNMENT_", NonTraversable, false;
    Style => "_STYLE", NonTraversable, false;
    Level => "_LEVEL", Scope, false;
    ListWithTripleHyphen => "_LIST_WITH_TRIPLE_HYPHEN", Traversable, false;
    ParagraphAsListItem => "_PARAGRAPH_AS_LIST_ITEM", NonTraversable, false;
    EmbeddedListWithHyphen => "_EMBEDDED_LIST_WITH_HYPHEN", NonTraversable, false;
    EmbeddedListItem => "_EMBEDDED_LIST_ITEM", NonTraversable, false;
    MetaTimestamp => "_META_TIMESTAMP", NonTraversable, false;
    Meta => "_META", NonTraversable, false;
    SourceLocation => "_LOCATION", NonTraversable, false;
    WordCount => "_WORD_COUNT", NonTraversable, false;
    Tags => "_TAGS", NonTraversable, false;
    ImageWidth => "_IMAGE_WIDTH", NonTraversable, false;
    ImageHeight => "_IMAGE_HEIGHT", NonTraversable, false;
    Url => "_URL", NonTraversable, false;
    Placeholder => "_PLACEHOLDER_", NonTraversable, false;
    ZeroWidthSpace => "_ZERO_WIDTH_SPACE", NonTraversable, false;
    PreservedWhitespace => "_PRESERVED_WHITESPACE", NonTraversable, false;
    ImplicitIdentifier => "_IMPLICIT_IDENTIFIER", NonTraversable, false;
    ExplicitIdentifier => "_EXPLICIT_IDENTIFIER", NonTraversable, false;
    ImplicitTag => "_IMPLICIT_TAG", NonTraversable, false;
    PromotedTag => "_PROMOTED_TAG", NonTraversable, false;
    ExplicitTag => "_EXPLICIT_TAG", NonTraversable, false;
    CollidingExplicitIdentifier => "_COLLIDING_EXPLICIT_IDENTIFIER", NonTraversable, false;
}

impl NodeKind {
    /// Kinds that may carry an identifier: everything the passes descend into.
    pub fn is_identifier_bearing(self) -> bool {
        self.tag_behavior() != TagBehavior::NonTraversable
    }

    /// Kinds that count as content next to a level when deciding whether an
    /// inclusion is a bare level.
    pub fn is_paragraphoid(self) -> bool {
        matches!(
            self,
            NodeKind::ParagraphRegular
                | NodeKind::ParagraphAsListItemWithTripleHyphen
                | NodeKind::ParagraphsInsideAngledBracketPairs
                | NodeKind::ListWithTripleHyphen
                | NodeKind::LinesOfLiteral
                | NodeKind::CellRowsWithVerticalLine
                | NodeKind::EmbeddedListWithHyphen
                | NodeKind::RasterImage
                | NodeKind::VectorImage
        )
    }

    /// Children of a level that describe the level rather than belong to its content.
    pub fn is_level_decoration(self) -> bool {
        matches!(
            self,
            NodeKind::LevelTitle
                | NodeKind::LevelIntroducer
                | NodeKind::LevelIntroducerIndent
                | NodeKind::AbsoluteIdentifier
                | NodeKind::ImplicitIdentifier
                | NodeKind::ExplicitIdentifier
                | NodeKind::CollidingExplicitIdentifier
                | NodeKind::ImplicitTag
                | NodeKind::ExplicitTag
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
