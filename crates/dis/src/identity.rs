use std::fmt;

use serde::{Deserialize, Serialize};

pub const ALL_SITES: u16 = 0xFFFF;
pub const ALL_APPLIC: u16 = 0xFFFF;
pub const ALL_ENTITIES: u16 = 0xFFFF;
pub const NO_SITE: u16 = 0;
pub const NO_APPLIC: u16 = 0;
pub const NO_ENTITY: u16 = 0;

/// Who this federate is within an exercise.
///
/// Peers on the same multicast group must not share a site/application pair;
/// nothing here checks that, the exercise plan does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub site_id: u16,
    pub application_id: u16,
    pub exercise_id: u8,
}

impl Identity {
    pub const fn new(site_id: u16, application_id: u16, exercise_id: u8) -> Self {
        Self {
            site_id,
            application_id,
            exercise_id,
        }
    }

    pub fn entity(&self, entity: u16) -> EntityId {
        EntityId::new(self.site_id, self.application_id, entity)
    }

    /// The simulation management entity that originates Start/Stop PDUs.
    pub fn management_entity(&self) -> EntityId {
        self.entity(NO_ENTITY)
    }

    pub fn owns(&self, id: &EntityId) -> bool {
        id.site == self.site_id && id.application == self.application_id
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(2, 1, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EntityId {
    pub site: u16,
    pub application: u16,
    pub entity: u16,
}

impl EntityId {
    pub const ALL: Self = Self::new(ALL_SITES, ALL_APPLIC, ALL_ENTITIES);

    pub const fn new(site: u16, application: u16, entity: u16) -> Self {
        Self {
            site,
            application,
            entity,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.site, self.application, self.entity)
    }
}
