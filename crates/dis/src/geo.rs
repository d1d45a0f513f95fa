//! WGS84 geodesy for the DIS world coordinate system.
//!
//! DIS places entities in an Earth-centred, Earth-fixed (ECEF) frame and
//! expresses orientation as Z-Y-X Euler angles (psi, theta, phi) relative to
//! the ECEF axes. Simulators on the maritime side think in latitude,
//! longitude and heading relative to the local North-East-Down (NED) frame.
//! Everything in this module converts between the two.

use std::f64::consts::FRAC_PI_2;

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis in metres.
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in metres.
pub const WGS84_B: f64 = 6_356_752.314_2;

const E2: f64 = 1.0 - (WGS84_B * WGS84_B) / (WGS84_A * WGS84_A);
const MAX_ITERATIONS: usize = 32;
const LATITUDE_TOLERANCE: f64 = 1e-12;
/// Below this `cos(y)` the Z and X rotations share an axis.
const GIMBAL_LOCK_COS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Geodetic {
    pub const fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude_deg.is_finite()
            && self.longitude_deg.is_finite()
            && self.altitude_m.is_finite()
    }
}

fn prime_vertical_radius(sin_lat: f64) -> f64 {
    WGS84_A / (1.0 - E2 * sin_lat * sin_lat).sqrt()
}

pub fn geodetic_to_ecef(position: &Geodetic) -> DVec3 {
    let lat = position.latitude_deg.to_radians();
    let lon = position.longitude_deg.to_radians();
    let h = position.altitude_m;

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    let n = prime_vertical_radius(sin_lat);

    DVec3::new(
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - E2) + h) * sin_lat,
    )
}

pub fn ecef_to_geodetic(xyz: DVec3) -> Geodetic {
    let p = (xyz.x * xyz.x + xyz.y * xyz.y).sqrt();
    let lon = xyz.y.atan2(xyz.x);

    let mut lat = xyz.z.atan2(p * (1.0 - E2));
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = lat.sin();
        let n = prime_vertical_radius(sin_lat);
        let next = (xyz.z + E2 * n * sin_lat).atan2(p);
        let converged = (next - lat).abs() < LATITUDE_TOLERANCE;
        lat = next;
        if converged {
            break;
        }
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    // Valid at the poles, where p / cos(lat) is not.
    let h = p * cos_lat + xyz.z * sin_lat - WGS84_A * (1.0 - E2 * sin_lat * sin_lat).sqrt();

    Geodetic::new(lat.to_degrees(), lon.to_degrees(), h)
}

/// North, east and down unit vectors (ECEF) as the columns of a matrix.
pub fn ned_frame(latitude_deg: f64, longitude_deg: f64) -> DMat3 {
    let (sin_lat, cos_lat) = latitude_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = longitude_deg.to_radians().sin_cos();

    let north = DVec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    let east = DVec3::new(-sin_lon, cos_lon, 0.0);
    let down = DVec3::new(-cos_lat * cos_lon, -cos_lat * sin_lon, -sin_lat);

    DMat3::from_cols(north, east, down)
}

/// Intrinsic Z-Y-X rotation (yaw about z, then pitch about y, then roll about x).
pub fn rotation_zyx(z: f64, y: f64, x: f64) -> DMat3 {
    DMat3::from_rotation_z(z) * DMat3::from_rotation_y(y) * DMat3::from_rotation_x(x)
}

/// Inverse of [`rotation_zyx`], returned as `(z, y, x)`.
///
/// When the x axis is rotated onto ±z only `z - x` (or `z + x`) is defined;
/// `x` is then reported as zero and the whole turn goes into `z`.
pub fn euler_zyx(m: &DMat3) -> DVec3 {
    // Column-major: x_axis.y is row 1 of column 0.
    let r00 = m.x_axis.x;
    let r10 = m.x_axis.y;
    let r20 = m.x_axis.z;
    let r21 = m.y_axis.z;
    let r22 = m.z_axis.z;

    let cos_y = r00.hypot(r10);
    if cos_y < GIMBAL_LOCK_COS {
        // With x = 0 the y axis is (-sin z, cos z, 0).
        let z = (-m.y_axis.x).atan2(m.y_axis.y);
        let y = if r20 > 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 };
        return DVec3::new(z, y, 0.0);
    }

    let z = r10.atan2(r00);
    let y = (-r20).atan2(cos_y);
    let x = r21.atan2(r22);
    DVec3::new(z, y, x)
}

/// Body-to-ECEF rotation for an entity at `position` with the given
/// NED-relative yaw, pitch and roll (radians).
pub fn body_to_ecef(position: &Geodetic, yaw: f64, pitch: f64, roll: f64) -> DMat3 {
    ned_frame(position.latitude_deg, position.longitude_deg) * rotation_zyx(yaw, pitch, roll)
}

/// NED-relative attitude to DIS orientation `(psi, theta, phi)`.
pub fn attitude_to_dis(position: &Geodetic, yaw: f64, pitch: f64, roll: f64) -> DVec3 {
    euler_zyx(&body_to_ecef(position, yaw, pitch, roll))
}

/// DIS orientation back to NED-relative `(yaw, pitch, roll)`.
pub fn attitude_from_dis(position: &Geodetic, psi: f64, theta: f64, phi: f64) -> DVec3 {
    let ned = ned_frame(position.latitude_deg, position.longitude_deg);
    euler_zyx(&(ned.transpose() * rotation_zyx(psi, theta, phi)))
}
