//! Reusable crystals and jump networks.

use latkmc_core::{CrystalData, GroupOp, Jump, JumpNetwork, Tensor3, Vec3};
use nalgebra::Matrix3;

/// The 48 signed permutation matrices of the cubic point group `Oh`,
/// identity first.
pub fn cubic_point_group() -> Vec<Matrix3<i32>> {
    const PERMS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let mut ops = Vec::with_capacity(48);
    for perm in PERMS {
        for signs in 0..8 {
            let mut m = Matrix3::zeros();
            for (row, &col) in perm.iter().enumerate() {
                m[(row, col)] = if signs & (1 << row) == 0 { 1 } else { -1 };
            }
            ops.push(m);
        }
    }
    ops
}

/// Cartesian point-group operations re-expressed in the lattice coordinates
/// of `lattice`: `L⁻¹ R L`, rounded.
fn to_lattice_coords(cartesian: &[Matrix3<i32>], lattice: &Tensor3) -> Vec<Matrix3<i32>> {
    let inverse = lattice.try_inverse().unwrap();
    cartesian
        .iter()
        .map(|r| (inverse * r.map(f64::from) * lattice).map(|x| x.round() as i32))
        .collect()
}

fn single_site_crystal(lattice: Tensor3) -> CrystalData {
    let ops = to_lattice_coords(&cubic_point_group(), &lattice)
        .into_iter()
        .map(|rot| GroupOp::new(rot, Vec3::zeros(), vec![vec![0]]))
        .collect();
    CrystalData::new(
        lattice,
        vec![vec![Vec3::zeros()]],
        vec![vec![vec![0]]],
        vec![vec![ops]],
    )
    .unwrap()
}

/// Simple cubic crystal with lattice constant `a`.
pub fn simple_cubic(a: f64) -> CrystalData {
    single_site_crystal(Tensor3::identity() * a)
}

/// Nearest-neighbor jumps of simple cubic: one class, ordered
/// `+x, -x, +y, -y, +z, -z`.
pub fn simple_cubic_jumps(a: f64) -> JumpNetwork {
    let class = [Vec3::x(), Vec3::y(), Vec3::z()]
        .into_iter()
        .flat_map(|v| [Jump::new(0, 0, v * a), Jump::new(0, 0, -v * a)])
        .collect();
    JumpNetwork::new(vec![class])
}

/// Only the `+x` and `-x` jumps of simple cubic.
pub fn line_jumps(a: f64) -> JumpNetwork {
    JumpNetwork::new(vec![vec![
        Jump::new(0, 0, Vec3::x() * a),
        Jump::new(0, 0, -Vec3::x() * a),
    ]])
}

/// Primitive FCC lattice with cubic lattice constant `a`.
pub fn fcc(a: f64) -> CrystalData {
    let h = 0.5 * a;
    single_site_crystal(Tensor3::new(0.0, h, h, h, 0.0, h, h, h, 0.0))
}

/// Nearest-neighbor jumps of FCC: one class of twelve `a/2 <110>` jumps,
/// each followed by its reverse.
pub fn fcc_jumps(a: f64) -> JumpNetwork {
    let h = 0.5 * a;
    let class = [
        Vec3::new(h, h, 0.0),
        Vec3::new(h, -h, 0.0),
        Vec3::new(h, 0.0, h),
        Vec3::new(h, 0.0, -h),
        Vec3::new(0.0, h, h),
        Vec3::new(0.0, h, -h),
    ]
    .into_iter()
    .flat_map(|v| [Jump::new(0, 0, v), Jump::new(0, 0, -v)])
    .collect();
    JumpNetwork::new(vec![class])
}

/// Unit cubic cell with site A at the origin and site B at `x/2`, each its
/// own Wyckoff class. The point group of each site is the 16 operations
/// that keep the x axis: sign flips of every axis and the `y <-> z` swap.
pub fn two_site_chain() -> CrystalData {
    let basis = vec![Vec3::zeros(), Vec3::new(0.5, 0.0, 0.0)];
    let mut about_a = Vec::new();
    let mut about_b = Vec::new();
    for rot in cubic_point_group() {
        if rot[(0, 0)] == 0 {
            continue;
        }
        let flip = f64::from(rot[(0, 0)]);
        about_a.push(GroupOp::new(rot, Vec3::zeros(), vec![vec![0, 1]]));
        // Keep x = 1/2 fixed: x -> flip*x + (1 - flip)/2.
        about_b.push(GroupOp::new(
            rot,
            Vec3::new(0.5 * (1.0 - flip), 0.0, 0.0),
            vec![vec![0, 1]],
        ));
    }
    CrystalData::new(
        Tensor3::identity(),
        vec![basis],
        vec![vec![vec![0], vec![1]]],
        vec![vec![about_a, about_b]],
    )
    .unwrap()
}

/// Jumps of [`two_site_chain`]:
///
/// - class 0: A <-> B along x (`+x/2` and `-x/2`, both directions);
/// - class 1: A -> A along `+y, -y, +z, -z`;
/// - class 2: B -> B along `+y, -y, +z, -z`.
pub fn two_site_chain_jumps() -> JumpNetwork {
    let half = Vec3::new(0.5, 0.0, 0.0);
    let side = |s: usize| {
        vec![
            Jump::new(s, s, Vec3::y()),
            Jump::new(s, s, -Vec3::y()),
            Jump::new(s, s, Vec3::z()),
            Jump::new(s, s, -Vec3::z()),
        ]
    };
    JumpNetwork::new(vec![
        vec![
            Jump::new(0, 1, half),
            Jump::new(0, 1, -half),
            Jump::new(1, 0, -half),
            Jump::new(1, 0, half),
        ],
        side(0),
        side(1),
    ])
}
