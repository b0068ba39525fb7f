//! Coarse box overlap queries between bodies.

use bevy::prelude::*;

use crate::combat::Damaging;

/// Axis-aligned box body centred on the entity's translation
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    pub half_extents: Vec3,
}

impl Hitbox {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    pub fn cube(half: f32) -> Self {
        Self::new(Vec3::splat(half))
    }
}

/// Marker for walkable bodies the player can stand on
#[derive(Component)]
pub struct Ground;

/// Touching boxes count as overlapping so a body resting on the ground keeps its contact.
pub fn overlaps(a_pos: Vec3, a: &Hitbox, b_pos: Vec3, b: &Hitbox) -> bool {
    let diff = (a_pos - b_pos).abs();
    let reach = a.half_extents + b.half_extents;
    diff.x <= reach.x && diff.y <= reach.y && diff.z <= reach.z
}

/// One overlapping body found by [`contacts`]
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub entity: Entity,
    pub damaging: Option<Damaging>,
}

/// Every candidate overlapping `body`, in candidate order. The body never contacts itself.
pub fn contacts<'a>(
    body: Entity,
    position: Vec3,
    hitbox: &Hitbox,
    candidates: impl IntoIterator<Item = (Entity, &'a Transform, &'a Hitbox, Option<&'a Damaging>)>,
) -> Vec<Contact> {
    candidates
        .into_iter()
        .filter(|(entity, _, _, _)| *entity != body)
        .filter(|(_, transform, other, _)| overlaps(position, hitbox, transform.translation, other))
        .map(|(entity, _, _, damaging)| Contact {
            entity,
            damaging: damaging.copied(),
        })
        .collect()
}

/// Height of the highest ground surface under an overlapping body
pub fn ground_contact<'a>(
    position: Vec3,
    hitbox: &Hitbox,
    grounds: impl IntoIterator<Item = (&'a Transform, &'a Hitbox)>,
) -> Option<f32> {
    grounds
        .into_iter()
        .filter(|(transform, ground)| overlaps(position, hitbox, transform.translation, ground))
        .map(|(transform, ground)| transform.translation.y + ground.half_extents.y)
        .reduce(f32::max)
}
