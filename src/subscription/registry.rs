use crate::subscription::messages::Message;
use crate::subscription::pattern::glob_match;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use bytes::Bytes;
use core::cell::RefCell;
use core::fmt::{Debug, Formatter};

/// Callback invoked for every message of a subscribed channel or pattern
///
/// One handler may be shared by all identifiers of a single subscribe call.
pub type Handler<'a> = Rc<RefCell<dyn FnMut(&Message) + 'a>>;

/// Namespace of a subscription identifier
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Kind {
    /// Exact channel name (SUBSCRIBE)
    Channel,
    /// Glob-style pattern (PSUBSCRIBE)
    Pattern,
}

/// Confirmed subscriptions of one connection
///
/// Entries are only created or removed when Redis confirms the corresponding command,
/// so an identifier is present if and only if the server considers the connection subscribed.
#[derive(Default)]
pub struct Registry<'a> {
    channels: BTreeMap<Bytes, Handler<'a>>,
    patterns: BTreeMap<Bytes, Handler<'a>>,
}

impl<'a> Registry<'a> {
    pub fn new() -> Self {
        Self {
            channels: BTreeMap::new(),
            patterns: BTreeMap::new(),
        }
    }

    /// Registers the channel, an existing handler is replaced
    pub fn add_channel(&mut self, name: Bytes, handler: Handler<'a>) {
        self.channels.insert(name, handler);
    }

    /// Registers the pattern, an existing handler is replaced
    pub fn add_pattern(&mut self, pattern: Bytes, handler: Handler<'a>) {
        self.patterns.insert(pattern, handler);
    }

    pub fn insert(&mut self, kind: Kind, name: Bytes, handler: Handler<'a>) {
        match kind {
            Kind::Channel => self.add_channel(name, handler),
            Kind::Pattern => self.add_pattern(name, handler),
        }
    }

    /// Removes the identifier. Unknown identifiers are ignored.
    pub fn remove(&mut self, kind: Kind, name: &[u8]) -> Option<Handler<'a>> {
        self.entries_mut(kind).remove(name)
    }

    /// Removes all identifiers of the given kind
    pub fn remove_all(&mut self, kind: Kind) {
        self.entries_mut(kind).clear();
    }

    /// Returns the handler of the channel itself plus the handlers of all matching patterns
    pub fn match_channel(&self, name: &[u8]) -> Vec<Handler<'a>> {
        self.channels
            .get(name)
            .into_iter()
            .chain(
                self.patterns
                    .iter()
                    .filter(|(pattern, _)| glob_match(pattern, name))
                    .map(|(_, handler)| handler),
            )
            .cloned()
            .collect()
    }

    pub fn channel_handler(&self, name: &[u8]) -> Option<Handler<'a>> {
        self.channels.get(name).cloned()
    }

    /// Handler of the exact pattern string
    pub fn pattern_handler(&self, pattern: &[u8]) -> Option<Handler<'a>> {
        self.patterns.get(pattern).cloned()
    }

    pub fn contains(&self, kind: Kind, name: &[u8]) -> bool {
        self.entries(kind).contains_key(name)
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.entries(kind).len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Drops every subscription without server confirmation
    pub fn clear(&mut self) {
        self.channels.clear();
        self.patterns.clear();
    }

    fn entries(&self, kind: Kind) -> &BTreeMap<Bytes, Handler<'a>> {
        match kind {
            Kind::Channel => &self.channels,
            Kind::Pattern => &self.patterns,
        }
    }

    fn entries_mut(&mut self, kind: Kind) -> &mut BTreeMap<Bytes, Handler<'a>> {
        match kind {
            Kind::Channel => &mut self.channels,
            Kind::Pattern => &mut self.patterns,
        }
    }
}

impl Debug for Registry<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .field("patterns", &self.patterns.keys().collect::<Vec<_>>())
            .finish()
    }
}
