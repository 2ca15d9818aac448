//! Fixed-capacity entity pools
//!
//! Every slot is allocated up front and recycled. Capacities are small
//! (a handful per kind), so acquisition is a linear scan for the first
//! inactive slot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Kinds of scrolling entity the simulation spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    HealthItem,
    FeverItem,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Obstacle => "obstacle",
            EntityKind::HealthItem => "health item",
            EntityKind::FeverItem => "fever item",
        }
    }
}

/// Stable reference to one pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    pub kind: EntityKind,
    pub index: usize,
}

/// One pooled entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PooledEntity {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct EntityPool {
    kind: EntityKind,
    slots: Vec<PooledEntity>,
}

impl EntityPool {
    /// Pre-allocate `capacity` inactive entities
    pub fn new(kind: EntityKind, capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| PooledEntity {
                kind,
                pos: Vec2::ZERO,
                active: false,
            })
            .collect();
        Self { kind, slots }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|e| e.active).count()
    }

    /// Activate the first free slot at `pos`. `None` when every slot is in use.
    pub fn acquire(&mut self, pos: Vec2) -> Option<EntityHandle> {
        let index = self.slots.iter().position(|e| !e.active)?;
        let slot = &mut self.slots[index];
        slot.pos = pos;
        slot.active = true;
        Some(EntityHandle {
            kind: self.kind,
            index,
        })
    }

    /// Deactivate a slot. Releasing twice, or a handle from another pool, does nothing.
    pub fn release(&mut self, handle: EntityHandle) {
        if handle.kind != self.kind {
            return;
        }
        if let Some(slot) = self.slots.get_mut(handle.index) {
            slot.active = false;
        }
    }

    /// The entity behind `handle`, if it is still active
    pub fn get(&self, handle: EntityHandle) -> Option<&PooledEntity> {
        if handle.kind != self.kind {
            return None;
        }
        self.slots.get(handle.index).filter(|e| e.active)
    }

    pub fn is_active(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Snapshot of active entities, in slot order
    pub fn active_entities(&self) -> Vec<(EntityHandle, Vec2)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(index, e)| {
                (
                    EntityHandle {
                        kind: self.kind,
                        index,
                    },
                    e.pos,
                )
            })
            .collect()
    }

    /// Scroll every active entity left by `dx`; entities past `despawn_x`
    /// release themselves. Returns how many were released.
    pub fn advance(&mut self, dx: f32, despawn_x: f32) -> usize {
        let mut released = 0;
        for slot in self.slots.iter_mut().filter(|e| e.active) {
            slot.pos.x -= dx;
            if slot.pos.x < despawn_x {
                slot.active = false;
                released += 1;
            }
        }
        released
    }

    /// Active entities within `reach` of `point` on both axes
    pub fn overlapping(&self, point: Vec2, reach: Vec2) -> Vec<EntityHandle> {
        self.active_entities()
            .into_iter()
            .filter(|(_, pos)| {
                let d = (*pos - point).abs();
                d.x <= reach.x && d.y <= reach.y
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Deactivate every slot
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
    }
}
