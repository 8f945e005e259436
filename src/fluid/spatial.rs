//! Spatial hashing for efficient neighbor search.
//!
//! Particles are bucketed into square cells of side `radius`. Each cell is
//! hashed into a fixed-size key table; the (particle, key) entries are sorted
//! by key so that every bucket is a contiguous run, and a start-index table
//! maps each key to the first entry of its run. A neighbor query visits the
//! 3x3 block of cells around the sample point and scans each run.
//!
//! Distinct cells may share a key, so queries return a superset of the true
//! neighbors. Callers filter by exact distance.

use bevy::prelude::*;
use rayon::prelude::*;

/// Marks a key with no particles in the start-index table.
pub const UNSET: u32 = u32::MAX;

/// Hash multiplier for the cell x coordinate.
pub const HASH_K1: u32 = 15823;
/// Hash multiplier for the cell y coordinate.
pub const HASH_K2: u32 = 9737333;

/// Offsets of the 3x3 cell neighborhood, center included.
pub const CELL_OFFSETS: [IVec2; 9] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

/// Grid cell containing `point`. Coordinates are truncated toward zero.
#[inline]
pub fn position_to_cell(point: Vec2, radius: f32) -> IVec2 {
    IVec2::new((point.x / radius) as i32, (point.y / radius) as i32)
}

/// Wrapping multiplicative hash of a cell coordinate.
#[inline]
pub fn hash_cell(cell: IVec2) -> u32 {
    let a = (cell.x as u32).wrapping_mul(HASH_K1);
    let b = (cell.y as u32).wrapping_mul(HASH_K2);
    a.wrapping_add(b)
}

/// Slot of `hash` in a table of `table_size` keys.
#[inline]
pub fn key_from_hash(hash: u32, table_size: u32) -> u32 {
    hash % table_size
}

/// One particle's slot in the sorted lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpatialEntry {
    pub index: u32,
    pub key: u32,
}

/// Sorted spatial hash over a set of particle positions.
///
/// Rebuilt from scratch every step; nothing survives between builds.
#[derive(Clone, Debug, Default)]
pub struct SpatialLookup {
    table_size: u32,
    radius: f32,
    entries: Vec<SpatialEntry>,
    start_indices: Vec<u32>,
}

impl SpatialLookup {
    /// Create an empty lookup with `table_size` keys.
    pub fn new(table_size: u32) -> Self {
        Self {
            table_size: table_size.max(1),
            radius: 1.0,
            entries: Vec::new(),
            start_indices: vec![UNSET; table_size.max(1) as usize],
        }
    }

    /// Change the number of keys. Takes effect on the next build.
    pub fn resize(&mut self, table_size: u32) {
        self.table_size = table_size.max(1);
        self.start_indices.clear();
        self.start_indices.resize(self.table_size as usize, UNSET);
        self.entries.clear();
    }

    pub fn table_size(&self) -> u32 {
        self.table_size
    }

    /// Cell size used by the last build.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> &[SpatialEntry] {
        &self.entries
    }

    /// Key -> first entry position, `UNSET` for empty keys.
    pub fn start_indices(&self) -> &[u32] {
        &self.start_indices
    }

    /// Table key of a cell.
    #[inline]
    pub fn cell_key(&self, cell: IVec2) -> u32 {
        key_from_hash(hash_cell(cell), self.table_size)
    }

    /// Bucket every particle and index the sorted buckets.
    pub fn build(&mut self, positions: &[Vec2], radius: f32) {
        self.radius = radius;
        let table_size = self.table_size;

        positions
            .par_iter()
            .enumerate()
            .map(|(i, &p)| SpatialEntry {
                index: i as u32,
                key: key_from_hash(hash_cell(position_to_cell(p, radius)), table_size),
            })
            .collect_into_vec(&mut self.entries);

        self.start_indices.par_iter_mut().for_each(|s| *s = UNSET);

        self.entries.par_sort_unstable_by_key(|e| e.key);

        let entries = &self.entries;
        let starts: Vec<(u32, u32)> = entries
            .par_iter()
            .enumerate()
            .filter_map(|(i, e)| {
                let prev = if i == 0 { UNSET } else { entries[i - 1].key };
                (e.key != prev).then_some((e.key, i as u32))
            })
            .collect();

        for (key, start) in starts {
            self.start_indices[key as usize] = start;
        }
    }

    /// Visit every candidate neighbor of `point`: all particles whose key
    /// matches one of the 3x3 cells around it. Each key is scanned once even
    /// when several of the nine cells hash to it.
    pub fn for_each_candidate(&self, point: Vec2, mut f: impl FnMut(usize)) {
        if self.entries.is_empty() {
            return;
        }

        let center = position_to_cell(point, self.radius);
        let mut visited = [UNSET; 9];

        for (slot, offset) in CELL_OFFSETS.iter().enumerate() {
            let key = self.cell_key(center.wrapping_add(*offset));
            if visited[..slot].contains(&key) {
                continue;
            }
            visited[slot] = key;

            let start = self.start_indices[key as usize];
            if start == UNSET {
                continue;
            }

            for entry in &self.entries[start as usize..] {
                if entry.key != key {
                    break;
                }
                f(entry.index as usize);
            }
        }
    }

    /// Candidate neighbor indices of `point`.
    pub fn candidates(&self, point: Vec2) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_candidate(point, |j| out.push(j));
        out
    }

    /// Neighbors strictly within `radius` of `point`, with their distances.
    pub fn neighbors_within(
        &self,
        point: Vec2,
        positions: &[Vec2],
        radius: f32,
    ) -> Vec<(usize, f32)> {
        let radius_sq = radius * radius;
        let mut neighbors = Vec::new();
        self.for_each_candidate(point, |j| {
            let dist_sq = (positions[j] - point).length_squared();
            if dist_sq < radius_sq {
                neighbors.push((j, dist_sq.sqrt()));
            }
        });
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_to_cell_truncates() {
        assert_eq!(position_to_cell(Vec2::new(0.5, 0.5), 1.0), IVec2::ZERO);
        assert_eq!(position_to_cell(Vec2::new(1.5, 2.5), 1.0), IVec2::new(1, 2));
        assert_eq!(position_to_cell(Vec2::new(-0.5, -1.5), 1.0), IVec2::new(0, -1));
        assert_eq!(position_to_cell(Vec2::new(70.0, 35.0), 35.0), IVec2::new(2, 1));
    }

    #[test]
    fn test_hash_constants() {
        assert_eq!(hash_cell(IVec2::new(1, 0)), 15823);
        assert_eq!(hash_cell(IVec2::new(0, 1)), 9737333);
        assert_eq!(hash_cell(IVec2::new(2, 3)), 2 * 15823 + 3 * 9737333);
        // Negative coordinates wrap instead of panicking
        assert_eq!(
            hash_cell(IVec2::new(-1, 0)),
            0u32.wrapping_sub(15823)
        );
        assert_eq!(key_from_hash(hash_cell(IVec2::new(2, 3)), 100), (2 * 15823 + 3 * 9737333) % 100);
    }

    #[test]
    fn test_start_indices_point_at_runs() {
        let positions = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.1, 0.1),
            Vec2::new(5.0, 5.0),
            Vec2::new(9.5, 1.0),
        ];
        let mut lookup = SpatialLookup::new(64);
        lookup.build(&positions, 1.0);

        let entries = lookup.entries();
        assert_eq!(entries.len(), positions.len());
        assert!(entries.windows(2).all(|w| w[0].key <= w[1].key));

        for (key, &start) in lookup.start_indices().iter().enumerate() {
            if start == UNSET {
                assert!(entries.iter().all(|e| e.key != key as u32));
            } else {
                let start = start as usize;
                assert_eq!(entries[start].key, key as u32);
                assert!(start == 0 || entries[start - 1].key != key as u32);
            }
        }
    }

    #[test]
    fn test_query_finds_close_particles() {
        let positions = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.1, 0.1),
            Vec2::new(5.0, 5.0),
        ];
        let mut lookup = SpatialLookup::new(1000);
        lookup.build(&positions, 1.0);

        let neighbors = lookup.neighbors_within(Vec2::ZERO, &positions, 0.5);
        let indices: Vec<usize> = neighbors.iter().map(|&(j, _)| j).collect();
        assert!(indices.contains(&0));
        assert!(indices.contains(&1));
        assert!(!indices.contains(&2));
    }

    #[test]
    fn test_query_matches_brute_force() {
        let radius = 3.0;
        let positions: Vec<Vec2> = (0..200)
            .map(|i| {
                let t = i as f32;
                Vec2::new((t * 7.31).rem_euclid(40.0) - 5.0, (t * 3.17).rem_euclid(30.0))
            })
            .collect();
        let mut lookup = SpatialLookup::new(positions.len() as u32);
        lookup.build(&positions, radius);

        for (i, &p) in positions.iter().enumerate() {
            let mut found: Vec<usize> = lookup
                .neighbors_within(p, &positions, radius)
                .into_iter()
                .map(|(j, _)| j)
                .collect();
            found.sort_unstable();

            let expected: Vec<usize> = positions
                .iter()
                .enumerate()
                .filter(|(_, &q)| (q - p).length_squared() < radius * radius)
                .map(|(j, _)| j)
                .collect();

            assert_eq!(found, expected, "neighbors of particle {i}");
        }
    }

    #[test]
    fn test_each_particle_is_its_own_candidate() {
        let positions: Vec<Vec2> = (0..50)
            .map(|i| Vec2::new(i as f32 * 13.0, (i % 7) as f32 * 11.0))
            .collect();
        let mut lookup = SpatialLookup::new(50);
        lookup.build(&positions, 35.0);

        for (i, &p) in positions.iter().enumerate() {
            assert!(lookup.candidates(p).contains(&i));
        }
    }

    #[test]
    fn test_colliding_keys_not_visited_twice() {
        // A single-slot table puts every cell on the same key
        let positions = vec![Vec2::new(0.5, 0.5), Vec2::new(10.0, 10.0)];
        let mut lookup = SpatialLookup::new(1);
        lookup.build(&positions, 1.0);

        let mut candidates = lookup.candidates(Vec2::new(0.5, 0.5));
        candidates.sort_unstable();
        assert_eq!(candidates, vec![0, 1]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let positions: Vec<Vec2> = (0..100)
            .map(|i| Vec2::new((i * 37 % 600) as f32, (i * 53 % 600) as f32))
            .collect();
        let mut lookup = SpatialLookup::new(100);
        lookup.build(&positions, 35.0);
        let first = lookup.start_indices().to_vec();
        lookup.build(&positions, 35.0);
        assert_eq!(lookup.start_indices(), first.as_slice());
    }

    #[test]
    fn test_empty_lookup_has_no_candidates() {
        let lookup = SpatialLookup::new(16);
        assert!(lookup.candidates(Vec2::ZERO).is_empty());
    }
}
