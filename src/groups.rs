//! Per-particle-group base colors.

use glam::Vec3;

/// Grayscale color per particle group, built once from the scene's group ids.
///
/// Group `i` of `n` gets intensity `i / n`, so group 0 is black and higher
/// ids are progressively lighter. Lookups wrap modulo the table size; if the
/// scene later grows more groups than were present at construction, the
/// extra ids alias onto existing colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupColorTable {
    colors: Vec<Vec3>,
}

impl GroupColorTable {
    /// Color returned when the table is empty.
    pub const FALLBACK: Vec3 = Vec3::ZERO;

    /// Build the table from the per-particle group ids.
    pub fn build(groups: &[usize]) -> Self {
        let num_groups = groups.iter().copied().max().map_or(0, |max| max + 1);
        let colors = (0..num_groups)
            .map(|i| Vec3::splat(i as f32 / num_groups as f32))
            .collect();
        Self { colors }
    }

    /// Number of groups the table was built for.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the table has no colors.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Base color of a group. Ids wrap modulo the table size.
    pub fn color_of(&self, group: usize) -> Vec3 {
        if self.colors.is_empty() {
            return Self::FALLBACK;
        }
        self.colors[group % self.colors.len()]
    }

    /// All colors in group order.
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_max_id() {
        let table = GroupColorTable::build(&[2, 0, 2, 1]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.color_of(0), Vec3::ZERO);
        assert_eq!(table.color_of(1), Vec3::splat(1.0 / 3.0));
        assert_eq!(table.color_of(2), Vec3::splat(2.0 / 3.0));
    }

    #[test]
    fn test_lower_ids_are_darker() {
        let table = GroupColorTable::build(&[0, 1, 2, 3]);
        assert!(table.color_of(0).x < table.color_of(3).x);
        for i in 0..3 {
            assert!(table.color_of(i).x < table.color_of(i + 1).x);
        }
    }

    #[test]
    fn test_wraparound() {
        let table = GroupColorTable::build(&[0, 1, 2, 3]);
        for i in 0..4 {
            assert_eq!(table.color_of(i), table.color_of(i + 4));
        }
    }

    #[test]
    fn test_sparse_ids_still_span_max() {
        // Unused ids below the max still get a slot.
        let table = GroupColorTable::build(&[4]);
        assert_eq!(table.len(), 5);
        assert_eq!(table.color_of(4), Vec3::splat(0.8));
    }

    #[test]
    fn test_empty_table_falls_back() {
        let table = GroupColorTable::build(&[]);
        assert!(table.is_empty());
        assert_eq!(table.color_of(7), GroupColorTable::FALLBACK);
    }
}
