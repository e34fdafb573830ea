//! Flat state-vector layout.
//!
//! Maps each named quantity to its index (or index range) in the
//! solver's flat state vector. The layout is produced once by
//! [`LayoutBuilder`] at simulation construction and is immutable
//! afterwards; optional features (the per-electrode hysteresis state)
//! contribute their slot during the single allocation pass instead of
//! shifting an already-built map.
//!
//! Block order: anode `[x_Li(0..nr), phi_ed, hyst?]`, electrolyte
//! `[phi_el]`, cathode `[hyst?, x_Li(0..nr), phi_ed]`. The hysteresis
//! slot trails the anode block and leads the cathode block.

use std::ops::Range;

use crate::error::{CellError, CellResult};

/// Index assignments for one electrode block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElectrodeLayout {
    /// First index owned by this block
    pub start: usize,
    /// Per-radial-node intercalation fractions, innermost node first
    pub li: Range<usize>,
    /// Electrode (solid-phase) potential
    pub phi_ed: usize,
    /// Hysteresis state, when the feature is enabled
    pub hyst: Option<usize>,
    /// One past the last index owned by this block
    pub end: usize,
}

impl ElectrodeLayout {
    /// Index of the surface (outermost) intercalation node.
    pub fn li_surface(&self) -> usize {
        self.li.end - 1
    }

    fn contains(&self, i: usize) -> bool {
        i >= self.start && i < self.end
    }
}

/// Complete simulation-wide index map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateLayout {
    pub anode: ElectrodeLayout,
    /// Electrolyte potential
    pub phi_el: usize,
    pub cathode: ElectrodeLayout,
    n: usize,
}

impl StateLayout {
    /// Total state-vector length.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Per-index flag: `true` for algebraic rows (the three potentials),
    /// `false` for differential rows (intercalation and hysteresis).
    pub fn algebraic(&self) -> Vec<bool> {
        let mut id = vec![false; self.n];
        id[self.anode.phi_ed] = true;
        id[self.phi_el] = true;
        id[self.cathode.phi_ed] = true;
        id
    }

    /// All assigned indices in block order; used to check the partition
    /// invariant.
    fn assigned(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.n);
        for block in [&self.anode, &self.cathode] {
            out.extend(block.li.clone());
            out.push(block.phi_ed);
            if let Some(h) = block.hyst {
                out.push(h);
            }
        }
        out.push(self.phi_el);
        out
    }

    fn check_bijection(&self) -> CellResult<()> {
        let mut seen = self.assigned();
        seen.sort_unstable();
        if seen.len() != self.n || seen.iter().enumerate().any(|(i, &v)| i != v) {
            return Err(CellError::Layout {
                what: "index ranges do not partition the state vector",
            });
        }
        if !self.anode.contains(self.anode.phi_ed)
            || !self.cathode.contains(self.cathode.phi_ed)
        {
            return Err(CellError::Layout {
                what: "electrode potential outside its block",
            });
        }
        Ok(())
    }
}

/// Single-pass allocator for [`StateLayout`].
#[derive(Clone, Debug, Default)]
pub struct LayoutBuilder {
    anode: Option<BlockSpec>,
    cathode: Option<BlockSpec>,
}

#[derive(Clone, Copy, Debug)]
struct BlockSpec {
    nr: usize,
    hysteresis: bool,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anode(mut self, nr: usize, hysteresis: bool) -> Self {
        self.anode = Some(BlockSpec { nr, hysteresis });
        self
    }

    pub fn cathode(mut self, nr: usize, hysteresis: bool) -> Self {
        self.cathode = Some(BlockSpec { nr, hysteresis });
        self
    }

    pub fn build(self) -> CellResult<StateLayout> {
        let an = self.anode.ok_or(CellError::Layout {
            what: "anode block not specified",
        })?;
        let ca = self.cathode.ok_or(CellError::Layout {
            what: "cathode block not specified",
        })?;
        if an.nr < 3 || ca.nr < 3 {
            return Err(CellError::Layout {
                what: "electrode blocks need at least 3 radial nodes",
            });
        }

        let mut next = 0usize;

        // Anode: intercalation profile, potential, optional hysteresis.
        let an_start = next;
        let an_li = next..next + an.nr;
        next += an.nr;
        let an_phi = next;
        next += 1;
        let an_hyst = if an.hysteresis {
            let h = next;
            next += 1;
            Some(h)
        } else {
            None
        };
        let an_end = next;

        // Electrolyte potential sits between the electrode blocks.
        let phi_el = next;
        next += 1;

        // Cathode: optional hysteresis leads the block.
        let ca_start = next;
        let ca_hyst = if ca.hysteresis {
            let h = next;
            next += 1;
            Some(h)
        } else {
            None
        };
        let ca_li = next..next + ca.nr;
        next += ca.nr;
        let ca_phi = next;
        next += 1;
        let ca_end = next;

        let layout = StateLayout {
            anode: ElectrodeLayout {
                start: an_start,
                li: an_li,
                phi_ed: an_phi,
                hyst: an_hyst,
                end: an_end,
            },
            phi_el,
            cathode: ElectrodeLayout {
                start: ca_start,
                li: ca_li,
                phi_ed: ca_phi,
                hyst: ca_hyst,
                end: ca_end,
            },
            n: next,
        };
        layout.check_bijection()?;
        Ok(layout)
    }
}
