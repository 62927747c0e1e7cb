use crate::record::{Record, RecordKey};
use serde::{Deserialize, Serialize};

/// Position of the next scan: either the start of the table or an
/// exclusive start key echoed back by the previous page. The token is
/// opaque to the engine and passed to the store verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub enum Cursor {
    /// Start of table (no exclusive start key).
    #[default]
    Start,

    /// Resume strictly after this key.
    At(RecordKey),
}

impl Cursor {
    pub fn is_start(&self) -> bool {
        matches!(self, Cursor::Start)
    }

    pub fn key(&self) -> Option<&RecordKey> {
        match self {
            Cursor::Start => None,
            Cursor::At(key) => Some(key),
        }
    }
}

/// One page of a table scan.
///
/// End of table is signalled by an absent `next_cursor`, never by an empty
/// record list: a page whose items were all filtered out server-side comes
/// back empty while the cursor is still present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub records: Vec<Record>,
    pub next_cursor: Option<RecordKey>,
}

impl FetchResult {
    pub fn reached_end(&self) -> bool {
        self.next_cursor.is_none()
    }

    /// An empty page that must not be treated as terminal.
    pub fn is_empty_continuation(&self) -> bool {
        self.records.is_empty() && self.next_cursor.is_some()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AttrValue;

    #[test]
    fn default_cursor_is_start_of_table() {
        assert!(Cursor::default().is_start());
        assert!(Cursor::default().key().is_none());
    }

    #[test]
    fn empty_page_with_cursor_is_not_terminal() {
        let key = RecordKey::from_iter([("PK".to_string(), AttrValue::S("x".to_string()))]);
        let page = FetchResult {
            records: Vec::new(),
            next_cursor: Some(key),
        };

        assert!(page.is_empty_continuation());
        assert!(!page.reached_end());
    }

    #[test]
    fn absent_cursor_is_terminal_even_with_records() {
        let page = FetchResult {
            records: vec![Record::new()],
            next_cursor: None,
        };

        assert!(page.reached_end());
        assert!(!page.is_empty_continuation());
    }
}
