//! Error types for level document parsing and loading.

use thiserror::Error;

/// Errors produced while turning level text into a [`LevelDocument`](crate::document::LevelDocument).
///
/// Every variant is terminal: the parser never returns a partially built document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The underlying XML was not well formed.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document ended before an element was closed.
    #[error("unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    /// A required child element is absent.
    #[error("missing required element <{element}> in {context}")]
    MissingElement {
        /// The missing element name.
        element: &'static str,
        /// Where the element was expected.
        context: String,
    },

    /// A required attribute is absent.
    #[error("missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        /// The missing attribute name.
        attribute: &'static str,
        /// The element that should carry it.
        element: String,
    },

    /// A numeric field could not be parsed.
    #[error("malformed number '{value}' for '{attribute}' on <{element}>")]
    MalformedNumber {
        /// The attribute (or `data` for tile data) holding the value.
        attribute: &'static str,
        /// The element containing the value.
        element: String,
        /// The offending text.
        value: String,
    },

    /// The map orientation is neither `orthogonal` nor `isometric`.
    #[error("unsupported map orientation '{0}'")]
    UnsupportedOrientation(String),

    /// Tile layer data uses an encoding this parser does not read (e.g. base64).
    #[error("unsupported tile data encoding '{0}'")]
    UnsupportedEncoding(String),

    /// A polygon point is not an `x,y` pair.
    #[error("malformed polygon point '{0}'")]
    MalformedPoint(String),
}

/// A global tile id that no tileset range covers (including the empty id 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("global tile id {0} is outside every tileset range")]
pub struct GidOutOfRange(pub u32);
