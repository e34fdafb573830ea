//! Radial control-volume mesh for spherical particle diffusion.

use cf_core::linspace;

use crate::error::{CellError, CellResult};

/// Node-centered radial mesh over a spherical particle.
///
/// `r` holds the node positions from the particle center (`r[0] = 0`) to
/// the surface (`r[nr-1] = radius`). Each node `k` owns the control
/// volume between the inner face `rm[k]` and the outer face `rp[k]`;
/// interior faces sit halfway between neighboring nodes, the innermost
/// face at the center and the outermost face at the surface. Faces tile
/// the particle exactly: `rp[k] == rm[k+1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialMesh {
    r: Vec<f64>,
    rm: Vec<f64>,
    rp: Vec<f64>,
}

impl RadialMesh {
    pub fn new(radius: f64, nr: usize) -> CellResult<Self> {
        if !(radius > 0.0) {
            return Err(CellError::Mesh {
                what: "particle radius must be positive",
            });
        }
        if nr < 3 {
            return Err(CellError::Mesh {
                what: "radial mesh needs at least 3 nodes",
            });
        }

        let r = linspace(0.0, radius, nr);

        let mut rm = Vec::with_capacity(nr);
        let mut rp = Vec::with_capacity(nr);
        rm.push(0.0);
        for k in 1..nr {
            rm.push(0.5 * (r[k - 1] + r[k]));
        }
        for k in 0..nr - 1 {
            rp.push(rm[k + 1]);
        }
        rp.push(radius);

        Ok(Self { r, rm, rp })
    }

    pub fn nr(&self) -> usize {
        self.r.len()
    }

    /// Node positions [m].
    pub fn r(&self) -> &[f64] {
        &self.r
    }

    /// Inner control-volume face per node [m].
    pub fn rm(&self) -> &[f64] {
        &self.rm
    }

    /// Outer control-volume face per node [m].
    pub fn rp(&self) -> &[f64] {
        &self.rp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_tile_the_particle() {
        let mesh = RadialMesh::new(10e-6, 7).unwrap();
        assert_eq!(mesh.rm()[0], 0.0);
        assert_eq!(mesh.rp()[mesh.nr() - 1], 10e-6);
        for k in 0..mesh.nr() - 1 {
            assert_eq!(mesh.rp()[k], mesh.rm()[k + 1]);
        }
    }

    #[test]
    fn nodes_span_center_to_surface() {
        let mesh = RadialMesh::new(5e-6, 11).unwrap();
        assert_eq!(mesh.r()[0], 0.0);
        assert_eq!(mesh.r()[10], 5e-6);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(RadialMesh::new(0.0, 5).is_err());
        assert!(RadialMesh::new(-1e-6, 5).is_err());
        assert!(RadialMesh::new(1e-6, 2).is_err());
    }
}
