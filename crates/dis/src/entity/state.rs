use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::appearance::Appearance;
use super::catalog::CONTAINER_SHIP_MEDIUM;
use crate::error::EncodingError;
use crate::geo::Geodetic;

/// Orientation relative to the local North-East-Down frame, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Attitude {
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }
}

/// Body rates in radians per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AngularVelocity {
    pub yaw_rate: f32,
    pub pitch_rate: f32,
    pub roll_rate: f32,
}

impl AngularVelocity {
    pub const fn new(yaw_rate: f32, pitch_rate: f32, roll_rate: f32) -> Self {
        Self {
            yaw_rate,
            pitch_rate,
            roll_rate,
        }
    }
}

/// Kinematic and identifying state of one simulated entity at one instant.
///
/// `linear_velocity` is `(u, v, w)` in the body frame: surge forward, sway
/// to starboard, heave down. The codec rotates it into the ECEF frame DIS
/// puts on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityState {
    pub position: Geodetic,
    pub attitude: Attitude,
    pub linear_velocity: Vec3,
    pub angular_velocity: AngularVelocity,
    pub entity_type: String,
    pub marking: String,
    pub appearance: Appearance,
}

impl EntityState {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            position: Geodetic::default(),
            attitude: Attitude::default(),
            linear_velocity: Vec3::ZERO,
            angular_velocity: AngularVelocity::default(),
            entity_type: entity_type.into(),
            marking: String::new(),
            appearance: Appearance::default(),
        }
    }

    pub fn with_position(mut self, latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        self.position = Geodetic::new(latitude_deg, longitude_deg, altitude_m);
        self
    }

    pub fn with_attitude(mut self, yaw: f32, pitch: f32, roll: f32) -> Self {
        self.attitude = Attitude::new(yaw, pitch, roll);
        self
    }

    pub fn with_velocity(mut self, u: f32, v: f32, w: f32) -> Self {
        self.linear_velocity = Vec3::new(u, v, w);
        self
    }

    pub fn with_rates(mut self, yaw_rate: f32, pitch_rate: f32, roll_rate: f32) -> Self {
        self.angular_velocity = AngularVelocity::new(yaw_rate, pitch_rate, roll_rate);
        self
    }

    pub fn with_marking(mut self, marking: impl Into<String>) -> Self {
        self.marking = marking.into();
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn validate(&self) -> Result<(), EncodingError> {
        let checks: [(&'static str, bool); 4] = [
            ("position", self.position.is_finite()),
            (
                "attitude",
                self.attitude.yaw.is_finite()
                    && self.attitude.pitch.is_finite()
                    && self.attitude.roll.is_finite(),
            ),
            ("linear velocity", self.linear_velocity.is_finite()),
            (
                "angular velocity",
                self.angular_velocity.yaw_rate.is_finite()
                    && self.angular_velocity.pitch_rate.is_finite()
                    && self.angular_velocity.roll_rate.is_finite(),
            ),
        ];

        match checks.into_iter().find(|(_, ok)| !ok) {
            Some((field, _)) => Err(EncodingError::NonFinite { field }),
            None => Ok(()),
        }
    }
}

impl Default for EntityState {
    fn default() -> Self {
        Self::new(CONTAINER_SHIP_MEDIUM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let state = EntityState::new("generic_ship_container_class_small")
            .with_position(57.66, 12.44, 0.0)
            .with_attitude(0.3, 0.0, 0.0)
            .with_velocity(2.0, 0.0, 0.0)
            .with_marking("Hi Reto");

        assert_eq!(state.position.latitude_deg, 57.66);
        assert_eq!(state.attitude.yaw, 0.3);
        assert_eq!(state.linear_velocity, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(state.marking, "Hi Reto");
        assert!(state.validate().is_ok());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let state = EntityState::default().with_velocity(f32::NAN, 0.0, 0.0);
        match state.validate() {
            Err(EncodingError::NonFinite { field }) => assert_eq!(field, "linear velocity"),
            other => panic!("expected NonFinite, got {other:?}"),
        }

        let state = EntityState::default().with_position(f64::INFINITY, 0.0, 0.0);
        assert!(matches!(
            state.validate(),
            Err(EncodingError::NonFinite { field: "position" })
        ));
    }
}
