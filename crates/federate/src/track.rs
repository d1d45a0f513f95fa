use emsn_dis::geo::WGS84_A;
use emsn_dis::{EntityState, Geodetic};

use crate::config::ShipConfig;

/// Straight-line (or constant-turn) sailing on a locally flat sea.
#[derive(Debug, Clone)]
pub struct ShipTrack {
    ship: ShipConfig,
}

impl ShipTrack {
    pub fn new(ship: ShipConfig) -> Self {
        Self { ship }
    }

    pub fn entity_id(&self) -> u16 {
        self.ship.entity_id
    }

    /// State `elapsed_secs` after the start position.
    pub fn state_at(&self, elapsed_secs: f64) -> EntityState {
        let ship = &self.ship;
        let heading = (ship.heading_deg + ship.turn_rate_deg_s * elapsed_secs).to_radians();
        let distance = ship.speed_mps * elapsed_secs;

        // Average heading over the leg keeps constant turns close to an arc.
        let mean_heading =
            (ship.heading_deg + ship.turn_rate_deg_s * elapsed_secs / 2.0).to_radians();
        let north = distance * mean_heading.cos();
        let east = distance * mean_heading.sin();

        let latitude = ship.latitude_deg + (north / WGS84_A).to_degrees();
        let longitude = ship.longitude_deg
            + (east / (WGS84_A * ship.latitude_deg.to_radians().cos())).to_degrees();

        EntityState {
            position: Geodetic::new(latitude, longitude, 0.0),
            entity_type: ship.entity_type.clone(),
            marking: ship.marking.clone(),
            appearance: ship.appearance,
            ..EntityState::default()
        }
        .with_attitude(wrap_pi(heading) as f32, 0.0, 0.0)
        .with_velocity(ship.speed_mps as f32, 0.0, 0.0)
        .with_rates(ship.turn_rate_deg_s.to_radians() as f32, 0.0, 0.0)
    }
}

fn wrap_pi(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    if wrapped > std::f64::consts::PI {
        wrapped - std::f64::consts::TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_the_configured_position() {
        let track = ShipTrack::new(ShipConfig::default());
        let state = track.state_at(0.0);
        assert_eq!(state.position.latitude_deg, 57.66);
        assert_eq!(state.position.longitude_deg, 12.44);
        assert!((state.attitude.yaw - 0.3).abs() < 1e-6);
        assert_eq!(state.linear_velocity.x, 2.0);
        assert_eq!(state.marking, "Hi Reto");
    }

    #[test]
    fn sails_north() {
        let track = ShipTrack::new(ShipConfig {
            heading_deg: 0.0,
            speed_mps: 10.0,
            ..ShipConfig::default()
        });
        let state = track.state_at(100.0);
        let metres_north = (state.position.latitude_deg - 57.66).to_radians() * WGS84_A;
        assert!((metres_north - 1000.0).abs() < 1e-6);
        assert!((state.position.longitude_deg - 12.44).abs() < 1e-12);
    }

    #[test]
    fn heading_wraps() {
        let track = ShipTrack::new(ShipConfig {
            heading_deg: 350.0,
            turn_rate_deg_s: 2.0,
            ..ShipConfig::default()
        });
        let yaw = track.state_at(10.0).attitude.yaw as f64;
        assert!((yaw - 10f64.to_radians()).abs() < 1e-6);
    }
}
