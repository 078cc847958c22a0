//! Euler rotation composition
//!
//! Baked rotations fold a node's pre/post rotation offsets through its
//! declared rotation order: the exported value is the XYZ-order Euler triple
//! of `pre · Euler(order, sampled) · post`. This module owns that matrix
//! arithmetic. Angles are degrees at the API boundary (the authored
//! convention), radians internally.

use glam::{DMat3, DVec3};

/// One of the six orderings in which X/Y/Z Euler rotations compose into a
/// rotation matrix. `Xyz` means the X rotation is applied first, then Y,
/// then Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationOrder {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

/// Builds the rotation matrix for `degrees` composed in `order`.
///
/// Column-vector convention: applying X first, then Y, then Z yields
/// `Mz · My · Mx`.
#[must_use]
pub fn matrix_from_euler(order: RotationOrder, degrees: DVec3) -> DMat3 {
    let r = DVec3::new(
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    );
    let mx = DMat3::from_rotation_x(r.x);
    let my = DMat3::from_rotation_y(r.y);
    let mz = DMat3::from_rotation_z(r.z);
    match order {
        RotationOrder::Xyz => mz * my * mx,
        RotationOrder::Xzy => my * mz * mx,
        RotationOrder::Yxz => mz * mx * my,
        RotationOrder::Yzx => mx * mz * my,
        RotationOrder::Zxy => my * mx * mz,
        RotationOrder::Zyx => mx * my * mz,
    }
}

/// Extracts the XYZ-order Euler triple (degrees) from a rotation matrix,
/// i.e. angles such that `Mz · My · Mx` rebuilds `m`.
///
/// Near the Y gimbal pole (`|sin y| ≈ 1`), X and Z become coupled; Z is
/// pinned to zero and the whole twist lands on X.
#[must_use]
pub fn euler_xyz_degrees(m: &DMat3) -> DVec3 {
    // m.col(c)[r]: x_axis is column 0.
    let sy = -m.x_axis.z;
    if sy.abs() < 1.0 - 1e-9 {
        let y = sy.asin();
        let x = m.y_axis.z.atan2(m.z_axis.z);
        let z = m.x_axis.y.atan2(m.x_axis.x);
        DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    } else {
        let y = std::f64::consts::FRAC_PI_2.copysign(sy);
        let x = (-m.z_axis.y).atan2(m.y_axis.y);
        DVec3::new(x.to_degrees(), y.to_degrees(), 0.0)
    }
}

/// The full composition used for node poses and baked rotation frames:
/// XYZ-order Euler degrees of `pre · Euler(order, degrees) · post`.
#[must_use]
pub fn compose(pre: &DMat3, order: RotationOrder, degrees: DVec3, post: &DMat3) -> DVec3 {
    euler_xyz_degrees(&(*pre * matrix_from_euler(order, degrees) * *post))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn mat_approx(a: &DMat3, b: &DMat3) -> bool {
        (a.x_axis - b.x_axis).length() < EPSILON
            && (a.y_axis - b.y_axis).length() < EPSILON
            && (a.z_axis - b.z_axis).length() < EPSILON
    }

    #[test]
    fn xyz_round_trip() {
        let angles = DVec3::new(10.0, 20.0, 30.0);
        let m = matrix_from_euler(RotationOrder::Xyz, angles);
        let back = euler_xyz_degrees(&m);
        assert!((back - angles).length() < 1e-9, "got {back}");
    }

    #[test]
    fn extraction_rebuilds_matrix_for_all_orders() {
        let angles = DVec3::new(10.0, 20.0, 30.0);
        for order in [
            RotationOrder::Xyz,
            RotationOrder::Xzy,
            RotationOrder::Yxz,
            RotationOrder::Yzx,
            RotationOrder::Zxy,
            RotationOrder::Zyx,
        ] {
            let m = matrix_from_euler(order, angles);
            let xyz = euler_xyz_degrees(&m);
            let rebuilt = matrix_from_euler(RotationOrder::Xyz, xyz);
            assert!(mat_approx(&m, &rebuilt), "order {order:?}: {xyz}");
        }
    }

    #[test]
    fn order_decides_application_sequence() {
        // Zyx applies Z first: a point on +X should first swing to +Y.
        let m = matrix_from_euler(RotationOrder::Zyx, DVec3::new(0.0, 0.0, 90.0));
        let p = m * DVec3::X;
        assert!((p - DVec3::Y).length() < EPSILON, "got {p}");
    }

    #[test]
    fn gimbal_pole_pins_z() {
        let m = matrix_from_euler(RotationOrder::Xyz, DVec3::new(25.0, 90.0, 0.0));
        let xyz = euler_xyz_degrees(&m);
        assert!((xyz.y - 90.0).abs() < 1e-6);
        assert!((xyz.z).abs() < 1e-6);
        let rebuilt = matrix_from_euler(RotationOrder::Xyz, xyz);
        assert!(mat_approx(&m, &rebuilt));
    }

    #[test]
    fn compose_folds_pre_rotation() {
        // pre = Rz(90), sampled = Rx(45): expected XYZ euler (45, 0, 90).
        let pre = matrix_from_euler(RotationOrder::Xyz, DVec3::new(0.0, 0.0, 90.0));
        let out = compose(
            &pre,
            RotationOrder::Xyz,
            DVec3::new(45.0, 0.0, 0.0),
            &DMat3::IDENTITY,
        );
        assert!((out - DVec3::new(45.0, 0.0, 90.0)).length() < 1e-9, "got {out}");
    }
}
