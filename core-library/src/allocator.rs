//! Track id allocation

use std::collections::BTreeSet;

use crate::error::{LibraryError, Result};
use crate::models::TrackId;

/// In-use set of track ids
///
/// Built from the live index. Every id handed out is recorded immediately,
/// so repeated calls before the next rebuild never collide.
#[derive(Debug, Clone, Default)]
pub struct TrackIdAllocator {
    in_use: BTreeSet<u16>,
}

impl TrackIdAllocator {
    pub fn from_ids(ids: impl IntoIterator<Item = TrackId>) -> Self {
        Self {
            in_use: ids.into_iter().map(TrackId::get).collect(),
        }
    }

    pub fn is_in_use(&self, id: TrackId) -> bool {
        self.in_use.contains(&id.0)
    }

    pub fn len(&self) -> usize {
        self.in_use.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_use.is_empty()
    }

    /// Smallest positive id not yet in use, which is then marked in use
    pub fn next_id(&mut self) -> Result<TrackId> {
        let mut candidate: u32 = 1;
        for &used in self.in_use.range(1..) {
            if u32::from(used) != candidate {
                break;
            }
            candidate += 1;
        }

        let id = u16::try_from(candidate).map_err(|_| LibraryError::IdSpaceExhausted)?;
        self.in_use.insert(id);
        Ok(TrackId(id))
    }
}
