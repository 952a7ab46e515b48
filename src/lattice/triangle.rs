// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Triad detection over the lattice.
//!
//! Every node is tested against four local three-node patterns. A pattern
//! is accepted only when the edge set joins all three pairs; accepted
//! triples are deduplicated by their sorted coordinates.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::{Coord, Lattice, Projection};
use crate::music::PitchClass;

/// Apex direction of a triangle once projected to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Orientation {
    /// Apex above the base: a minor triad
    Up,
    /// Apex below the base: a major triad
    Down,
}

/// Local patterns as offsets from the anchor node, with the orientation
/// each produces when it closes.
const PATTERNS: [([(i32, i32); 2], Orientation); 4] = [
    ([(1, 0), (1, -1)], Orientation::Down),
    ([(0, 1), (1, -1)], Orientation::Down),
    ([(-1, 0), (-1, 1)], Orientation::Up),
    ([(0, -1), (-1, 1)], Orientation::Up),
];

/// Three mutually adjacent lattice nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Triangle {
    /// Sorted, so equal triangles compare equal
    pub nodes: [Coord; 3],
    /// Orientation of the pattern that found this triangle
    pub orientation: Orientation,
}

impl Triangle {
    fn new(mut nodes: [Coord; 3], orientation: Orientation) -> Self {
        nodes.sort();
        Self { nodes, orientation }
    }

    /// Pitch classes of the three vertices
    pub fn pitch_classes(&self, lattice: &Lattice) -> Vec<PitchClass> {
        self.nodes
            .iter()
            .filter_map(|&c| lattice.node(c).map(|n| n.pc))
            .collect()
    }

    /// Orientation derived from projected vertical positions
    pub fn projected_orientation(&self, projection: &Projection) -> Orientation {
        let ys: Vec<f32> = self.nodes.iter().map(|&c| projection.position(c).1).collect();
        // The apex is the vertex whose height differs from the other two
        let same = |a: f32, b: f32| (a - b).abs() < 1e-3;
        let (apex, base) = if same(ys[0], ys[1]) {
            (ys[2], ys[0])
        } else if same(ys[0], ys[2]) {
            (ys[1], ys[0])
        } else {
            (ys[0], ys[1])
        };
        if apex > base {
            Orientation::Down
        } else {
            Orientation::Up
        }
    }

    /// Root of the triad, if the three pitch classes form a major or minor triad
    pub fn root(&self, lattice: &Lattice) -> Option<PitchClass> {
        let pcs = self.pitch_classes(lattice);
        pcs.iter().copied().find(|&root| {
            let third = if self.orientation == Orientation::Down { 4 } else { 3 };
            pcs.contains(&root.transpose(third)) && pcs.contains(&root.transpose(7))
        })
    }

    pub fn is_major(&self) -> bool {
        self.orientation == Orientation::Down
    }
}

/// Find every triangle in a lattice whose edges are already built
pub(super) fn detect(lattice: &Lattice) -> Vec<Triangle> {
    let mut seen: HashSet<[Coord; 3]> = HashSet::new();
    let mut triangles = Vec::new();

    for node in lattice.nodes() {
        let anchor = node.coord;
        for (offsets, orientation) in PATTERNS {
            let b = anchor.offset(offsets[0].0, offsets[0].1);
            let c = anchor.offset(offsets[1].0, offsets[1].1);
            let closed = lattice.are_neighbors(anchor, b)
                && lattice.are_neighbors(anchor, c)
                && lattice.are_neighbors(b, c);
            if !closed {
                continue;
            }
            let triangle = Triangle::new([anchor, b, c], orientation);
            if seen.insert(triangle.nodes) {
                triangles.push(triangle);
            }
        }
    }

    debug!(count = triangles.len(), "triangles detected");
    triangles
}
