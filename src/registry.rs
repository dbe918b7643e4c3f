//! Entity registry — single source of truth for declared entities.
//!
//! One name-keyed map covers both kinds, so a lookup by name is always
//! unambiguous: declaring a name that already exists under the other kind
//! is rejected instead of silently shadowing it. The map is ordered, which
//! keeps retry scans and test output deterministic.
//!
//! The registry validates declarations at the boundary and enforces a fixed
//! entity budget; the registration gate itself lives in the
//! [`SyncEngine`](crate::app::service::SyncEngine).

use std::collections::BTreeMap;

use crate::config::RedeclarePolicy;
use crate::entity::{Entity, EntityKind, EntityProfile, SensorDataType, StateValue};
use crate::error::{DeclareError, StateError};

/// Outcome of processing a registration acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// First matching ack — the entity just became registered.
    Registered(EntityKind),
    /// Duplicate ack for an already-registered entity. Idempotent no-op.
    AlreadyRegistered,
    /// No entity declared under that name. Expected with a shared broker.
    Unknown,
}

pub struct EntityRegistry {
    entities: BTreeMap<String, Entity>,
    max_entities: usize,
    redeclare: RedeclarePolicy,
}

impl EntityRegistry {
    pub fn new(max_entities: usize, redeclare: RedeclarePolicy) -> Self {
        Self {
            entities: BTreeMap::new(),
            max_entities,
            redeclare,
        }
    }

    // ── Declaration ───────────────────────────────────────────

    pub fn declare_actuator(&mut self, name: &str, level: u16) -> Result<(), DeclareError> {
        if level == 0 {
            return Err(DeclareError::ZeroLevel);
        }
        self.declare(name, Entity::new_actuator(name, level))
    }

    pub fn declare_sensor(
        &mut self,
        name: &str,
        data_type: SensorDataType,
    ) -> Result<(), DeclareError> {
        self.declare(name, Entity::new_sensor(name, data_type))
    }

    fn declare(&mut self, name: &str, fresh: Entity) -> Result<(), DeclareError> {
        if name.is_empty() {
            return Err(DeclareError::EmptyName);
        }
        if let Some(existing) = self.entities.get_mut(name) {
            if existing.kind() != fresh.kind() {
                return Err(DeclareError::KindConflict);
            }
            // Same-kind redeclaration: `Preserve` keeps the handshake and
            // state alive as long as the declared capability is unchanged.
            let unchanged = match (existing.profile(), fresh.profile()) {
                (
                    EntityProfile::Actuator { level: a, .. },
                    EntityProfile::Actuator { level: b, .. },
                ) => a == b,
                (
                    EntityProfile::Sensor { data_type: a, .. },
                    EntityProfile::Sensor { data_type: b, .. },
                ) => a == b,
                _ => false,
            };
            if !(self.redeclare == RedeclarePolicy::Preserve && unchanged) {
                *existing = fresh;
            }
            return Ok(());
        }
        if self.entities.len() >= self.max_entities {
            return Err(DeclareError::RegistryFull);
        }
        self.entities.insert(name.to_owned(), fresh);
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    /// Entities in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ── Protocol mutations ────────────────────────────────────

    /// Process a registration ack for `name`.
    pub fn mark_registered(&mut self, name: &str) -> AckOutcome {
        match self.entities.get_mut(name) {
            None => AckOutcome::Unknown,
            Some(entity) if entity.registered() => AckOutcome::AlreadyRegistered,
            Some(entity) => {
                entity.mark_registered();
                AckOutcome::Registered(entity.kind())
            }
        }
    }

    /// Kind-checked state write. The engine enforces the registration gate
    /// before calling this.
    pub fn set_state(&mut self, name: &str, value: StateValue) -> Result<(), StateError> {
        self.entities
            .get_mut(name)
            .ok_or(StateError::UnknownEntity)?
            .apply_state(value)
    }

    /// Forget every acknowledgment and retry timestamp, so the normal retry
    /// path re-announces all entities. Used after a transport reconnect.
    pub fn reset_registrations(&mut self) {
        for entity in self.entities.values_mut() {
            entity.clear_registration();
        }
    }
}
