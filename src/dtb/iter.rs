// ABOUTME: Depth-tracking cursor over the direct children of a node
// ABOUTME: Rebuilds nesting from the flat token stream without materialising a tree

use super::block::Block;
use super::error::DtbError;
use super::parser::DeviceTree;
use super::tokens::DtbToken;
use core::iter::FusedIterator;

/// What a [`Cursor`] should yield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Child nodes
    Node,
    /// Properties
    Property,
}

impl MatchKind {
    /// Token a matching block must carry
    pub fn token(self) -> DtbToken {
        match self {
            MatchKind::Node => DtbToken::BeginNode,
            MatchKind::Property => DtbToken::Property,
        }
    }

    /// Depth a matching block sits at, relative to its parent's header
    ///
    /// A child node's own start token lifts the depth to 1, while the parent's
    /// properties are seen at depth 0.
    pub fn depth(self) -> i32 {
        match self {
            MatchKind::Node => 1,
            MatchKind::Property => 0,
        }
    }
}

/// Iterator over the direct child nodes or the properties of one node
///
/// Grandchildren and their properties are skipped over by counting nesting
/// depth. The cursor ends when the parent's scope closes or the stream ends.
///
/// Use [`try_next`](Cursor::try_next) to tell a corrupted blob apart from the
/// end of the scope. The [`Iterator`] impl stops at the first decode error
/// instead and keeps it available through [`error`](Cursor::error).
#[derive(Debug, Clone)]
pub struct Cursor<'t, 'a> {
    tree: &'t DeviceTree<'a>,
    kind: MatchKind,
    depth: i32,
    offset: usize,
    done: bool,
    error: Option<DtbError>,
}

impl<'t, 'a> Cursor<'t, 'a> {
    /// Start right after the header of `parent`
    pub fn new(tree: &'t DeviceTree<'a>, parent: &Block<'a>, kind: MatchKind) -> Self {
        Self {
            tree,
            kind,
            depth: 0,
            offset: parent.end,
            done: false,
            error: None,
        }
    }

    /// What this cursor yields
    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// Structure offset of the next token to decode
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The decode error that ended iteration, if any
    pub fn error(&self) -> Option<DtbError> {
        self.error
    }

    /// Advance to the next matching block
    ///
    /// `Ok(None)` means the scope is exhausted; an error means the token
    /// stream is malformed. Either way the cursor stays finished afterwards.
    pub fn try_next(&mut self) -> Result<Option<Block<'a>>, DtbError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.done {
            return Ok(None);
        }

        loop {
            let block = match self.tree.decode(self.offset) {
                Ok(block) => block,
                Err(err) => {
                    self.error = Some(err);
                    return Err(err);
                }
            };
            if block.token == DtbToken::End {
                self.done = true;
                return Ok(None);
            }

            self.offset = block.end;
            self.depth += block.nesting_delta();
            if self.depth < 0 {
                // Parent's end token
                self.done = true;
                return Ok(None);
            }

            if self.depth == self.kind.depth() && block.token == self.kind.token() {
                return Ok(Some(block));
            }
        }
    }

    /// Advance to the next matching block whose name starts with `prefix`
    pub fn try_next_matching_prefix(
        &mut self,
        prefix: &str,
    ) -> Result<Option<Block<'a>>, DtbError> {
        while let Some(block) = self.try_next()? {
            if block.name.starts_with(prefix) {
                return Ok(Some(block));
            }
        }
        Ok(None)
    }

    /// Like [`try_next_matching_prefix`](Cursor::try_next_matching_prefix),
    /// ending on decode errors
    pub fn next_matching_prefix(&mut self, prefix: &str) -> Option<Block<'a>> {
        if self.error.is_some() {
            return None;
        }
        self.try_next_matching_prefix(prefix)
            .unwrap_or_else(|err| self.swallow(err))
    }

    /// Consume the cursor, keeping only blocks whose name starts with `prefix`
    pub fn with_prefix<'p>(self, prefix: &'p str) -> WithPrefix<'t, 'a, 'p> {
        WithPrefix {
            cursor: self,
            prefix,
        }
    }

    fn swallow(&self, err: DtbError) -> Option<Block<'a>> {
        log::warn!("DTB iteration stopped early: {err}");
        None
    }
}

impl<'a> Iterator for Cursor<'_, 'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() {
            return None;
        }
        self.try_next().unwrap_or_else(|err| self.swallow(err))
    }
}

impl FusedIterator for Cursor<'_, '_> {}

/// Cursor adapter returned by [`Cursor::with_prefix`]
#[derive(Debug, Clone)]
pub struct WithPrefix<'t, 'a, 'p> {
    cursor: Cursor<'t, 'a>,
    prefix: &'p str,
}

impl<'t, 'a> WithPrefix<'t, 'a, '_> {
    /// The decode error that ended iteration, if any
    pub fn error(&self) -> Option<DtbError> {
        self.cursor.error()
    }

    /// Give back the underlying cursor
    pub fn into_inner(self) -> Cursor<'t, 'a> {
        self.cursor
    }
}

impl<'a> Iterator for WithPrefix<'_, 'a, '_> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.error.is_some() {
            return None;
        }
        self.cursor.next_matching_prefix(self.prefix)
    }
}

impl FusedIterator for WithPrefix<'_, '_, '_> {}
