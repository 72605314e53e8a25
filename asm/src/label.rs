use crate::token::Pos;
use indexmap::IndexMap;

// name -> (where it was defined, byte offset)
#[derive(Debug)]
pub struct Labels {
    labels: IndexMap<String, (Pos, u16)>,
}

impl Labels {
    pub fn new() -> Self {
        Labels {
            labels: IndexMap::new(),
        }
    }

    /// Returns the previous definition if the name was already taken.
    pub fn insert(&mut self, name: String, pos: Pos, addr: u16) -> Option<(Pos, u16)> {
        self.labels.insert(name, (pos, addr))
    }

    pub fn get_val(&self, name: &str) -> Option<u16> {
        self.labels.get(name).map(|(_, addr)| *addr)
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::new()
    }
}
