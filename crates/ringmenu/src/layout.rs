//! Angular layout of a single ring.
//!
//! Each pair of neighbouring items is joined by a gap that behaves like a
//! spring (the series combination of the springs found between them, or an
//! implicit unit spring of rest length `2π / N`). The solver picks the gap
//! lengths minimising the total spring energy subject to:
//!
//! - the gaps closing the circle (`Σ g = 2π`),
//! - each gravity group's item centroid sitting on its target angle.
//!
//! The constraints are linear in the gaps, so the optimum is found in closed
//! form with Lagrange multipliers: every gap moves away from its rest length
//! by its compliance (`1 / k`) times a combination of the multipliers. Gaps
//! that would turn negative are pinned to zero and the system is solved
//! again, which keeps items in slot order.

use crate::geometry::{angle_difference, normalize_angle};
use crate::ring::{GravityGroup, Slot};
use crate::spring::Gap;
use std::f64::consts::TAU;

/// Angular distances below this are treated as equal when hit-testing.
pub const TIE_EPSILON: f64 = 1e-9;

const PIVOT_EPSILON: f64 = 1e-12;
const NEGATIVE_GAP_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RingLayout {
    radius: f64,
    angles: Vec<f64>,
    gaps: Vec<f64>,
    item_slots: Vec<usize>,
}

impl RingLayout {
    /// Layout with explicit item angles; gaps are derived from consecutive angles.
    pub fn from_angles(radius: f64, angles: impl IntoIterator<Item = f64>) -> Self {
        let angles: Vec<f64> = angles.into_iter().map(normalize_angle).collect();
        let n = angles.len();
        let gaps = (0..n)
            .map(|i| {
                let next = angles[(i + 1) % n];
                if n == 1 {
                    TAU
                } else {
                    (next - angles[i]).rem_euclid(TAU)
                }
            })
            .collect();
        Self {
            radius,
            item_slots: (0..n).collect(),
            angles,
            gaps,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn angle(&self, item: usize) -> Option<f64> {
        self.angles.get(item).copied()
    }

    /// Angular distance from item `item` to the next one, counter-clockwise.
    pub fn gap(&self, item: usize) -> Option<f64> {
        self.gaps.get(item).copied()
    }

    pub fn slot_of(&self, item: usize) -> Option<usize> {
        self.item_slots.get(item).copied()
    }

    /// Item closest to `angle` along the shortest arc. Ties go to the lower index.
    pub fn nearest(&self, angle: f64) -> Option<usize> {
        self.angles
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &a)| {
                let d = angle_difference(angle, a);
                match best {
                    Some((_, best_d)) if d >= best_d - TIE_EPSILON => best,
                    _ => Some((i, d)),
                }
            })
            .map(|(i, _)| i)
    }
}

/// Gravity group translated to item indices.
#[derive(Debug, Clone)]
struct Target {
    angle: f64,
    items: std::ops::Range<usize>,
}

impl Target {
    /// Coefficient of gap `j` in the centroid of this group, relative to item 0.
    fn weight(&self, gap: usize) -> f64 {
        let after = self.items.end.saturating_sub(self.items.start.max(gap + 1));
        after as f64 / self.items.len() as f64
    }
}

pub(crate) fn solve(slots: &[Slot], groups: &[GravityGroup], radius: f64) -> RingLayout {
    let item_slots: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.is_item().then_some(i))
        .collect();
    let n = item_slots.len();
    if n == 0 {
        return RingLayout {
            radius,
            ..RingLayout::default()
        };
    }

    let gaps = collect_gaps(slots, &item_slots);
    let mut targets = collect_targets(groups, &item_slots);
    if targets.is_empty() {
        // every group covers springs only; fall back to the ring's first declared angle
        let angle = groups.first().map_or(0.0, |g| g.angle);
        targets.push(Target {
            angle,
            items: 0..n,
        });
    }

    let lengths = loop {
        match solve_gaps(&gaps, &targets) {
            Some(lengths) => break lengths,
            None if targets.len() > 1 => {
                let dropped = targets.pop();
                log::warn!(
                    "Gravity constraints cannot be met; dropping group at {:?}",
                    dropped.map(|t| t.angle)
                );
            }
            None => break vec![TAU / n as f64; n],
        }
    };

    let anchor = &targets[0];
    let offset: f64 = lengths
        .iter()
        .enumerate()
        .map(|(j, g)| anchor.weight(j) * g)
        .sum();
    let start = anchor.angle - offset;

    let mut angles = Vec::with_capacity(n);
    let mut acc = start;
    for g in &lengths {
        angles.push(normalize_angle(acc));
        acc += g;
    }

    log::debug!(
        "Ring layout: {} items, {} gravity targets, start {:.4}",
        n,
        targets.len(),
        start
    );

    RingLayout {
        radius,
        angles,
        gaps: lengths,
        item_slots,
    }
}

fn collect_gaps(slots: &[Slot], item_slots: &[usize]) -> Vec<Gap> {
    let n = item_slots.len();
    (0..n)
        .map(|j| {
            let from = item_slots[j] + 1;
            let between: Vec<&Slot> = if j + 1 < n {
                slots[from..item_slots[j + 1]].iter().collect()
            } else {
                slots[from..].iter().chain(&slots[..item_slots[0]]).collect()
            };
            Gap::from_springs(between.into_iter().filter_map(Slot::as_spring), n)
                .unwrap_or_else(|| Gap::implicit(n))
        })
        .collect()
}

fn collect_targets(groups: &[GravityGroup], item_slots: &[usize]) -> Vec<Target> {
    groups
        .iter()
        .filter_map(|g| {
            let first = item_slots.partition_point(|&s| s < g.range.start);
            let end = item_slots.partition_point(|&s| s < g.range.end);
            (first < end).then(|| Target {
                angle: g.angle,
                items: first..end,
            })
        })
        .collect()
}

/// Gap lengths honouring every target, or `None` when the targets are infeasible.
fn solve_gaps(gaps: &[Gap], targets: &[Target]) -> Option<Vec<f64>> {
    let n = gaps.len();
    let anchor = &targets[0];

    // row 0 closes the circle, row a fixes the centroid of target a relative to target 0
    let mut rows = vec![vec![1.0; n]];
    let mut rhs = vec![TAU];
    for t in &targets[1..] {
        rows.push((0..n).map(|j| t.weight(j) - anchor.weight(j)).collect());
        rhs.push((t.angle - anchor.angle).rem_euclid(TAU));
    }

    let mut pinned = vec![false; n];
    loop {
        let lengths = solve_free(gaps, &rows, &rhs, &pinned)?;

        let mut changed = false;
        for (j, &g) in lengths.iter().enumerate() {
            if !pinned[j] && g < -NEGATIVE_GAP_EPSILON {
                pinned[j] = true;
                changed = true;
            }
        }
        if !changed {
            return Some(lengths.into_iter().map(|g| g.max(0.0)).collect());
        }
        if pinned.iter().all(|&p| p) {
            return None;
        }
    }
}

fn solve_free(gaps: &[Gap], rows: &[Vec<f64>], rhs: &[f64], pinned: &[bool]) -> Option<Vec<f64>> {
    let m = rows.len();
    let free = move || (0..gaps.len()).filter(move |&j| !pinned[j]);

    let mut matrix = vec![vec![0.0; m]; m];
    let mut vector = rhs.to_vec();
    for s in 0..m {
        for r in 0..m {
            matrix[s][r] = free()
                .map(|j| rows[s][j] * rows[r][j] * gaps[j].compliance)
                .sum();
        }
        vector[s] -= free().map(|j| rows[s][j] * gaps[j].rest).sum::<f64>();
    }

    let multipliers = gaussian_elimination(matrix, vector)?;

    Some(
        (0..gaps.len())
            .map(|j| {
                if pinned[j] {
                    0.0
                } else {
                    let force: f64 = (0..m).map(|s| multipliers[s] * rows[s][j]).sum();
                    gaps[j].rest + gaps[j].compliance * force
                }
            })
            .collect(),
    )
}

fn gaussian_elimination(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::ring::Ring;
    use crate::spring::Spring;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-9;

    fn ring_with_items(n: usize) -> Ring {
        let mut ring = Ring::default();
        for i in 0..n {
            ring.add_item(Item::with_text(format!("item {}", i)));
        }
        ring
    }

    /// Centroid of consecutive items, unwrapped from the first one.
    fn centroid(layout: &RingLayout, items: std::ops::Range<usize>) -> f64 {
        let first = layout.angle(items.start).unwrap();
        let mut acc = 0.0;
        let mut sum = 0.0;
        for i in items.clone() {
            if i > items.start {
                acc += (layout.angle(i).unwrap() - layout.angle(i - 1).unwrap()).rem_euclid(TAU);
            }
            sum += acc;
        }
        first + sum / items.len() as f64
    }

    fn assert_ordered(layout: &RingLayout) {
        let total: f64 = (0..layout.len()).map(|i| layout.gap(i).unwrap()).sum();
        assert!((total - TAU).abs() < EPS, "gaps sum to {}", total);
        for i in 0..layout.len() {
            assert!(layout.gap(i).unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_uniform_spacing() {
        for n in 1..=9 {
            let layout = ring_with_items(n).layout();
            assert_eq!(layout.len(), n);
            for i in 0..n {
                let next = layout.angle((i + 1) % n).unwrap();
                let gap = (next - layout.angle(i).unwrap()).rem_euclid(TAU);
                let expected = if n == 1 { 0.0 } else { TAU / n as f64 };
                assert!((gap - expected).abs() < EPS, "n={} i={} gap={}", n, i, gap);
            }
        }
    }

    #[test]
    fn test_springs_with_default_rest_keep_uniform_spacing() {
        let mut ring = Ring::default();
        ring.add_item(Item::with_text("a"));
        ring.add_spring_with_elasticity(0.1).unwrap();
        ring.add_item(Item::with_text("b"));
        ring.add_item(Item::with_text("c"));
        ring.add_spring_with_elasticity(5.0).unwrap();

        let layout = ring.layout();
        for i in 0..3 {
            assert!((layout.gap(i).unwrap() - TAU / 3.0).abs() < EPS);
        }
    }

    #[test]
    fn test_single_item_sits_at_zero() {
        let layout = ring_with_items(1).layout();
        assert_eq!(layout.angles(), &[0.0]);
    }

    #[test]
    fn test_empty_ring_has_no_layout() {
        let mut ring = Ring::default();
        ring.add_spring(Spring::default());
        assert!(ring.layout().is_empty());
        assert!(Ring::default().layout().is_empty());
    }

    #[test]
    fn test_whole_ring_gravity_centers_items() {
        let mut ring = ring_with_items(3);
        ring.set_gravity_angle(PI / 2.0).unwrap();
        let layout = ring.layout();

        // middle item points at the target
        assert!((layout.angle(1).unwrap() - PI / 2.0).abs() < EPS);
        assert!(angle_difference(centroid(&layout, 0..3), PI / 2.0) < EPS);
    }

    #[test]
    fn test_layout_is_pure() {
        let mut ring = ring_with_items(5);
        ring.add_spring(Spring::new(0.2, 3.0).unwrap());
        ring.add_gravity_group(1.0, 0..2).unwrap();
        ring.add_gravity_group(4.0, 3..6).unwrap();
        assert_eq!(ring.layout(), ring.layout());
    }

    #[test]
    fn test_stiffness_shares_slack() {
        let mut ring = Ring::default();
        ring.add_item(Item::with_text("a"));
        ring.add_spring(Spring::new(0.5, 0.1).unwrap());
        ring.add_item(Item::with_text("b"));
        ring.add_spring(Spring::new(0.5, 10.0).unwrap());
        ring.add_item(Item::with_text("c"));
        ring.add_spring(Spring::new(0.5, 1.0).unwrap());

        let layout = ring.layout();
        let lambda = (TAU - 1.5) / (10.0 + 0.1 + 1.0);
        assert!((layout.gap(0).unwrap() - (0.5 + 10.0 * lambda)).abs() < EPS);
        assert!((layout.gap(1).unwrap() - (0.5 + 0.1 * lambda)).abs() < EPS);
        assert!((layout.gap(2).unwrap() - (0.5 + lambda)).abs() < EPS);
        assert_ordered(&layout);
    }

    #[test]
    fn test_overlong_rest_lengths_never_cross() {
        let mut ring = Ring::default();
        for rest in [5.0, 0.1, 3.0] {
            ring.add_item(Item::with_text("x"));
            ring.add_spring(Spring::new(rest, 1.0).unwrap());
        }

        let layout = ring.layout();
        assert_ordered(&layout);
        assert_eq!(layout.gap(1), Some(0.0));
        assert!((layout.gap(0).unwrap() - layout.gap(2).unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_multiple_groups_reach_targets() {
        let mut ring = ring_with_items(6);
        ring.add_gravity_group(0.0, 0..2).unwrap();
        ring.add_gravity_group(PI / 2.0, 2..4).unwrap();
        ring.add_gravity_group(PI, 4..6).unwrap();

        let layout = ring.layout();
        assert_ordered(&layout);
        assert!(angle_difference(centroid(&layout, 0..2), 0.0) < EPS);
        assert!(angle_difference(centroid(&layout, 2..4), PI / 2.0) < EPS);
        assert!(angle_difference(centroid(&layout, 4..6), PI) < EPS);
    }

    #[test]
    fn test_compatible_groups_keep_uniform_spacing() {
        let mut ring = ring_with_items(6);
        ring.add_gravity_group(PI / 2.0, 0..3).unwrap();
        ring.add_gravity_group(3.0 * PI / 2.0, 3..6).unwrap();

        let layout = ring.layout();
        let expected = [
            PI / 6.0,
            PI / 2.0,
            5.0 * PI / 6.0,
            7.0 * PI / 6.0,
            3.0 * PI / 2.0,
            11.0 * PI / 6.0,
        ];
        for (a, e) in layout.angles().iter().zip(expected) {
            assert!(angle_difference(*a, e) < EPS, "{} != {}", a, e);
        }
    }

    #[test]
    fn test_soft_gap_absorbs_group_tension() {
        let mut ring = Ring::default();
        ring.add_item(Item::with_text("a"));
        ring.add_item(Item::with_text("b"));
        ring.add_spring_with_elasticity(0.05).unwrap();
        ring.add_item(Item::with_text("c"));
        ring.add_item(Item::with_text("d"));
        // slots: a b ~ c d
        ring.add_gravity_group(0.0, 0..2).unwrap();
        ring.add_gravity_group(3.0 * PI / 4.0, 3..5).unwrap();

        let layout = ring.layout();
        assert_ordered(&layout);
        assert!(angle_difference(centroid(&layout, 0..2), 0.0) < EPS);
        assert!(angle_difference(centroid(&layout, 2..4), 3.0 * PI / 4.0) < EPS);

        // the soft gap takes most of the strain
        let rest = TAU / 4.0;
        let soft = (layout.gap(1).unwrap() - rest).abs();
        let inner = (layout.gap(0).unwrap() - rest).abs();
        assert!(layout.gap(1).unwrap() > 0.0);
        assert!(soft > 2.0 * inner);
    }

    #[test]
    fn test_group_of_springs_only_is_ignored() {
        let mut ring = ring_with_items(2);
        ring.add_spring(Spring::default());
        ring.add_gravity_group(PI, 2..3).unwrap();
        ring.add_gravity_group(PI / 2.0, 0..1).unwrap();

        let layout = ring.layout();
        assert!((layout.angle(0).unwrap() - PI / 2.0).abs() < EPS);
    }

    #[test]
    fn test_nearest_item() {
        let layout = RingLayout::from_angles(100.0, [0.0, PI / 2.0, PI, 3.0 * PI / 2.0]);

        assert_eq!(layout.nearest(PI / 2.0 + 0.01), Some(1));
        assert_eq!(layout.nearest(-0.01), Some(0));
        assert_eq!(layout.nearest(TAU - 0.01), Some(0));
        // equidistant: lower index wins
        assert_eq!(layout.nearest(PI / 4.0), Some(0));
        assert_eq!(layout.nearest(5.0 * PI / 4.0), Some(2));
        assert_eq!(layout.nearest(7.0 * PI / 4.0), Some(0));

        assert_eq!(RingLayout::default().nearest(1.0), None);
    }
}
