use bevy::prelude::*;

/// Health component for any entity that can take damage
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub current: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Which side fired a damaging body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
}

/// Capability of bodies that hurt whatever they hit
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Damaging {
    pub amount: f32,
    pub faction: Faction,
}

impl Damaging {
    /// Enemies only take damage from bodies fired by the other side
    pub fn hurts(&self, victim: Faction) -> bool {
        self.faction != victim
    }
}
