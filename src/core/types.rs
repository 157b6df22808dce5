//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for entities (agents, stimulus sources, props)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short form is plenty for log lines
        let s = self.0.simple().to_string();
        write!(f, "{}", &s[..8])
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// 2D position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }

    /// Step from `self` toward `target` by at most `max_step`, never overshooting
    pub fn step_toward(&self, target: Vec2, max_step: f32) -> Self {
        let delta = target - *self;
        if delta.length() <= max_step {
            target
        } else {
            *self + delta.normalize() * max_step
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_id_hash() {
        use std::collections::HashMap;
        let id = EntityId::new();
        let mut map: HashMap<EntityId, &str> = HashMap::new();
        map.insert(id, "wolf");
        assert_eq!(map.get(&id), Some(&"wolf"));
    }

    #[test]
    fn test_entity_id_display_is_short() {
        let id = EntityId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    #[test]
    fn test_vec2_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_toward_does_not_overshoot() {
        let start = Vec2::new(0.0, 0.0);
        let target = Vec2::new(1.0, 0.0);
        assert_eq!(start.step_toward(target, 5.0), target);

        let partial = start.step_toward(Vec2::new(10.0, 0.0), 2.0);
        assert!((partial.x - 2.0).abs() < 1e-6);
        assert!(partial.y.abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vec2::default().normalize(), Vec2::default());
    }
}
