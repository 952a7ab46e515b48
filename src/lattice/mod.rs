// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tonnetz lattice construction.
//!
//! Nodes live on an integer grid addressed by `(i, j)`. Stepping `+i` is a
//! major third, stepping `+j` is a minor third downward, and `(+1, -1)`
//! combines both into a perfect fifth. The lattice is built once per
//! configuration and is read-only afterwards; scale membership only
//! filters its triangles.

pub mod triangle;

pub use triangle::{Orientation, Triangle};

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::music::{Gamme, PitchClass};

/// Lattice coordinate; the identity of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub i: i32,
    pub j: i32,
}

impl Coord {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    pub fn offset(self, di: i32, dj: i32) -> Self {
        Self::new(self.i + di, self.j + dj)
    }

    /// Position along the vertical (i + j) diagonal
    pub fn level(self) -> i32 {
        self.i + self.j
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// Harmonic relation carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    MajorThird,
    MinorThird,
    PerfectFifth,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 3] = [EdgeKind::MajorThird, EdgeKind::MinorThird, EdgeKind::PerfectFifth];

    /// Positive generator vector for this relation
    pub fn generator(self) -> (i32, i32) {
        match self {
            EdgeKind::MajorThird => (1, 0),
            EdgeKind::MinorThird => (0, 1),
            EdgeKind::PerfectFifth => (1, -1),
        }
    }

    /// Which relation a coordinate offset represents, in either direction
    pub fn from_offset(di: i32, dj: i32) -> Option<Self> {
        EdgeKind::ALL.into_iter().find(|kind| {
            let (gi, gj) = kind.generator();
            (di, dj) == (gi, gj) || (di, dj) == (-gi, -gj)
        })
    }
}

/// Lattice dimensions and the pitch class sitting at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Half-extent along the i axis
    pub h_extent: u32,
    /// Half-extent of the i + j diagonal
    pub v_extent: u32,
    /// Pitch class at (0, 0)
    pub start_pc: PitchClass,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            h_extent: 6,
            v_extent: 3,
            start_pc: PitchClass::C,
        }
    }
}

/// A lattice vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Node {
    pub coord: Coord,
    pub pc: PitchClass,
}

/// Pitch class at a coordinate: +4 semitones per i, -3 per j
pub fn pitch_class_at(start_pc: PitchClass, coord: Coord) -> PitchClass {
    start_pc.transpose(4 * coord.i - 3 * coord.j)
}

/// Undirected edge between two adjacent nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub a: Coord,
    pub b: Coord,
    pub kind: EdgeKind,
}

/// Screen mapping for lattice coordinates. Screen y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Horizontal distance between neighbours on the same level
    pub spacing: f32,
    pub zoom: f32,
    pub pan: (f32, f32),
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            spacing: 60.0,
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl Projection {
    /// Screen position of a coordinate
    pub fn position(&self, coord: Coord) -> (f32, f32) {
        let half = self.spacing / 2.0;
        let row = half * 3f32.sqrt();
        let x = (coord.i - coord.j) as f32 * half;
        let y = coord.level() as f32 * row;
        (x * self.zoom + self.pan.0, y * self.zoom + self.pan.1)
    }
}

/// The Tonnetz graph: nodes, edges, neighbour index and triangles
#[derive(Debug, Clone)]
pub struct Lattice {
    config: LatticeConfig,
    nodes: HashMap<Coord, Node>,
    /// Generation order, so iteration is deterministic
    order: Vec<Coord>,
    edges: Vec<Edge>,
    neighbors: HashMap<Coord, HashSet<Coord>>,
    triangles: Vec<Triangle>,
}

impl Lattice {
    /// Build the full lattice for a configuration
    pub fn new(config: LatticeConfig) -> Self {
        let h = config.h_extent as i32;
        let v = config.v_extent as i32;

        let mut nodes = HashMap::new();
        let mut order = Vec::new();
        for i in -h..=h {
            for j in (-v - i)..=(v - i) {
                let coord = Coord::new(i, j);
                nodes.insert(
                    coord,
                    Node {
                        coord,
                        pc: pitch_class_at(config.start_pc, coord),
                    },
                );
                order.push(coord);
            }
        }

        let mut lattice = Self {
            config,
            nodes,
            order,
            edges: Vec::new(),
            neighbors: HashMap::new(),
            triangles: Vec::new(),
        };
        lattice.build_edges();
        lattice.triangles = triangle::detect(&lattice);

        info!(
            nodes = lattice.nodes.len(),
            edges = lattice.edges.len(),
            triangles = lattice.triangles.len(),
            "lattice built"
        );
        lattice
    }

    fn build_edges(&mut self) {
        for &coord in &self.order {
            for kind in EdgeKind::ALL {
                let (di, dj) = kind.generator();
                let other = coord.offset(di, dj);
                if !self.nodes.contains_key(&other) {
                    continue;
                }
                self.edges.push(Edge {
                    a: coord,
                    b: other,
                    kind,
                });
                self.neighbors.entry(coord).or_default().insert(other);
                self.neighbors.entry(other).or_default().insert(coord);
            }
        }
    }

    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// Nodes in generation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(|c| self.nodes.get(c))
    }

    pub fn node(&self, coord: Coord) -> Option<&Node> {
        self.nodes.get(&coord)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Whether an edge joins two coordinates
    pub fn are_neighbors(&self, a: Coord, b: Coord) -> bool {
        self.neighbors.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Every triangle of the lattice, independent of any scale
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangles whose three pitch classes all belong to the scale
    pub fn triangles_in_scale<'a>(&'a self, gamme: &'a Gamme) -> impl Iterator<Item = &'a Triangle> + 'a {
        self.triangles.iter().filter(move |t| {
            t.nodes
                .iter()
                .all(|&c| self.nodes.get(&c).is_some_and(|n| gamme.contains(n.pc)))
        })
    }
}
