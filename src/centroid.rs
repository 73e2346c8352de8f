use glam::DVec3;

/// Returns the geometric center of a set of atom positions.
///
/// Here, center refers to mean position. This can be understood as a center of mass where all
/// atoms are considered to have the same weight.
///
/// Invariant: `atoms` is not empty. Callers must treat an empty occurrence as "not found" rather
/// than asking for its center.
pub fn centroid(atoms: &[DVec3]) -> DVec3 {
    debug_assert!(!atoms.is_empty(), "the centroid of zero atoms is undefined");
    atoms.iter().sum::<DVec3>() / atoms.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_atoms() {
        let atoms = [DVec3::new(1.0, 2.0, 3.0), DVec3::new(3.0, 4.0, 5.0)];
        assert_eq!(centroid(&atoms), DVec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn single_atom() {
        let atom = DVec3::new(-12.5, 0.25, 7.0);
        assert_eq!(centroid(&[atom]), atom);
    }

    #[test]
    fn triangle() {
        let atoms = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(1.0, 3.0, 0.0),
        ];
        assert_eq!(centroid(&atoms), DVec3::new(1.0, 1.0, 0.0));
    }
}
