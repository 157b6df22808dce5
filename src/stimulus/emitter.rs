//! Emitters - timed, located broadcasts of a perceptual signal

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Vec2};

/// Unique identifier for emitters, monotonically increasing per registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmitterId(pub u64);

/// Kind tag for a stimulus; brains filter on these through their interest mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StimulusKind {
    Sound,
    Sight,
    Smell,
    Danger,
    Food,
    Alarm,
}

#[derive(Debug, Clone)]
pub struct Emitter {
    pub id: EmitterId,
    pub kind: StimulusKind,
    pub source: EntityId,
    pub position: Vec2,
    pub radius: f32,
    /// Total lifetime in ticks; <= 0 means it lives until deleted
    pub duration: i32,
    /// Only meaningful when `duration > 0`
    pub remaining: i32,
    /// Track the source's position each update
    pub dynamic_source: bool,
}

impl Emitter {
    pub fn is_timed(&self) -> bool {
        self.duration > 0
    }

    pub fn is_expired(&self) -> bool {
        self.is_timed() && self.remaining <= 0
    }

    /// Distance from `point` rounded to the nearest whole unit
    pub fn rounded_distance(&self, point: Vec2) -> f32 {
        point.distance(&self.position).round()
    }

    /// Whether the signal reaches `point`
    pub fn reaches(&self, point: Vec2) -> bool {
        self.rounded_distance(point) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter(radius: f32, duration: i32) -> Emitter {
        Emitter {
            id: EmitterId(1),
            kind: StimulusKind::Sound,
            source: EntityId::new(),
            position: Vec2::new(0.0, 0.0),
            radius,
            duration,
            remaining: duration,
            dynamic_source: false,
        }
    }

    #[test]
    fn test_reach_uses_rounded_distance() {
        let e = emitter(5.0, 0);
        // 5.4 rounds to 5, inside; 5.6 rounds to 6, outside
        assert!(e.reaches(Vec2::new(5.4, 0.0)));
        assert!(!e.reaches(Vec2::new(5.6, 0.0)));
    }

    #[test]
    fn test_infinite_emitter_never_expires() {
        let mut e = emitter(1.0, 0);
        e.remaining = -100;
        assert!(!e.is_timed());
        assert!(!e.is_expired());
    }

    #[test]
    fn test_timed_emitter_expires_at_zero() {
        let mut e = emitter(1.0, 3);
        assert!(!e.is_expired());
        e.remaining = 0;
        assert!(e.is_expired());
    }
}
