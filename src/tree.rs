//! Procedural tree geometry
//!
//! Turns habit history into something drawable: a recursively generated
//! branch skeleton, green leaves hung off the outer twigs (one per completed
//! day in the display window) and fallen leaves on the ground (one per day
//! explicitly marked as missed).
//!
//! Coordinates follow screen conventions: x grows to the right and y grows
//! downward, so a branch pointing "up" (90°) ends at a *smaller* y. Renderers
//! with a y-up axis must flip.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::model::{window_start, Habit};

/// Branches shorter than this are not generated
pub const MIN_BRANCH_LENGTH: f32 = 8.0;
/// Child length relative to its parent
pub const LENGTH_DECAY: f32 = 0.68;
/// Child thickness relative to its parent
pub const THICKNESS_DECAY: f32 = 0.65;
/// Thickness never shrinks below this
pub const MIN_THICKNESS: f32 = 1.5;
/// Distance from a twig's tip to the leaf hung on it
pub const LEAF_OFFSET: f32 = 18.0;
/// Horizontal spacing of fallen leaves on the ground
pub const FALLEN_SPACING: f32 = 40.0;

const TWIG_MAX_THICKNESS: f32 = 6.0;
const TWIG_MAX_DEPTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One generated segment of the skeleton
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Branch {
    pub start: Point,
    pub end: Point,
    pub thickness: f32,
    /// Direction in degrees, 0 = +x, counter-clockwise
    pub angle: f32,
    /// Recursion depth remaining when this segment was emitted
    pub depth: u32,
}

impl Branch {
    /// Thin, shallow segments near the crown can bear leaves
    pub fn is_twig(&self) -> bool {
        self.thickness < TWIG_MAX_THICKNESS && self.depth <= TWIG_MAX_DEPTH
    }

    pub fn tone(&self) -> BranchTone {
        BranchTone::for_thickness(self.thickness)
    }
}

/// Bark shade bucket, darkest for the trunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BranchTone {
    Trunk,
    Bough,
    Limb,
    Twig,
}

impl BranchTone {
    pub fn for_thickness(thickness: f32) -> Self {
        if thickness > 18.0 {
            BranchTone::Trunk
        } else if thickness > 10.0 {
            BranchTone::Bough
        } else if thickness > 5.0 {
            BranchTone::Limb
        } else {
            BranchTone::Twig
        }
    }
}

/// Parameters of one recursive generation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchSeed {
    pub origin: Point,
    pub angle: f32,
    pub depth: u32,
    pub length: f32,
    pub thickness: f32,
    /// Angle added and subtracted for the two children
    pub spread: f32,
}

impl BranchSeed {
    fn child(&self, origin: Point, angle: f32) -> Self {
        Self {
            origin,
            angle,
            depth: self.depth - 1,
            length: self.length * LENGTH_DECAY,
            thickness: (self.thickness * THICKNESS_DECAY).max(MIN_THICKNESS),
            spread: self.spread,
        }
    }
}

/// Generate the skeleton grown from `seed`, parent before children and the
/// clockwise child before the counter-clockwise one.
///
/// Stops when the depth runs out or the segment would be shorter than
/// [`MIN_BRANCH_LENGTH`]; at most `2^depth - 1` segments are produced.
pub fn generate_branches(seed: &BranchSeed) -> Vec<Branch> {
    if seed.depth == 0 || seed.length < MIN_BRANCH_LENGTH {
        return Vec::new();
    }

    let radians = seed.angle.to_radians();
    let end = Point::new(
        seed.origin.x + radians.cos() * seed.length,
        // y grows downward
        seed.origin.y - radians.sin() * seed.length,
    );

    let mut branches = vec![Branch {
        start: seed.origin,
        end,
        thickness: seed.thickness,
        angle: seed.angle,
        depth: seed.depth,
    }];
    branches.extend(generate_branches(&seed.child(end, seed.angle - seed.spread)));
    branches.extend(generate_branches(&seed.child(end, seed.angle + seed.spread)));
    branches
}

/// Shape of the generated tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub depth: u32,
    pub angle_spread: f32,
    pub trunk_thickness: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            depth: 8,
            angle_spread: 28.0,
            trunk_thickness: 28.0,
        }
    }
}

/// Drawing area the tree is laid out in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLayout {
    pub width: f32,
    pub height: f32,
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 410.0,
        }
    }
}

impl TreeLayout {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Ground line, where the trunk starts
    pub fn bottom_y(&self) -> f32 {
        self.height - 5.0
    }

    /// Seed for a trunk standing at the bottom centre and pointing up
    pub fn seed(&self, params: &TreeParams) -> BranchSeed {
        let tree_height = self.height * 0.82;
        BranchSeed {
            origin: Point::new(self.width / 2.0, self.bottom_y()),
            angle: 90.0,
            depth: params.depth,
            length: tree_height * 0.38,
            thickness: params.trunk_thickness,
            spread: params.angle_spread,
        }
    }
}

/// One habit-day worth of leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafData {
    pub id: String,
    /// `true` hangs on the tree, `false` lies on the ground
    pub is_active: bool,
    pub emoji: String,
}

/// Leaves for every explicit record in the trailing `days_to_show` days,
/// habit by habit, oldest day first. Days without a record grow nothing.
pub fn collect_leaves(habits: &[Habit], days_to_show: u32, today: NaiveDate) -> Vec<LeafData> {
    let start = window_start(days_to_show, today);

    habits
        .iter()
        .flat_map(|habit| {
            habit
                .completions
                .range(start..=today)
                .map(move |(date, &done)| LeafData {
                    id: format!("{}-{}", habit.id, date),
                    is_active: done,
                    emoji: habit.emoji.clone(),
                })
        })
        .collect()
}

/// A leaf positioned in the drawing area
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedLeaf {
    pub position: Point,
    /// Degrees
    pub rotation: f32,
    /// Index of the leaf in the list it was placed from
    pub slot: usize,
}

/// Branches eligible to carry a leaf
pub fn twig_candidates(branches: &[Branch]) -> Vec<&Branch> {
    branches.iter().filter(|b| b.is_twig()).collect()
}

/// Hang up to `active_count` leaves on randomly chosen twigs.
///
/// Each twig carries at most one leaf; leaves beyond the number of twigs are
/// not placed.
pub fn place_leaves<R: Rng + ?Sized>(
    branches: &[Branch],
    active_count: usize,
    rng: &mut R,
) -> Vec<PlacedLeaf> {
    let mut candidates = twig_candidates(branches);
    candidates.shuffle(rng);

    candidates
        .into_iter()
        .take(active_count)
        .enumerate()
        .map(|(i, twig)| {
            let radians = twig.angle.to_radians();
            let jitter = ((i * 23) % 30) as f32 - 15.0;
            PlacedLeaf {
                position: Point::new(
                    twig.end.x + radians.cos() * LEAF_OFFSET,
                    twig.end.y - radians.sin() * LEAF_OFFSET,
                ),
                rotation: twig.angle - 90.0 + jitter,
                slot: i,
            }
        })
        .collect()
}

/// Lay `count` fallen leaves in staggered rows along the ground.
///
/// Rows that would fall outside the drawing area are dropped.
pub fn place_fallen(count: usize, layout: &TreeLayout) -> Vec<PlacedLeaf> {
    let per_row = (((layout.width - 100.0) / FALLEN_SPACING) as usize).max(1);
    let bottom = layout.bottom_y();

    (0..count)
        .filter_map(|i| {
            let row = i / per_row;
            let col = i % per_row;
            let shift = if row % 2 == 1 { FALLEN_SPACING / 2.0 } else { 0.0 };
            let jitter = ((i * 17) % 15) as f32 - 7.0;
            let x = 50.0 + col as f32 * FALLEN_SPACING + shift + jitter;
            let y = bottom - 25.0 + row as f32 * 12.0;
            (y >= 10.0 && y < layout.height - 10.0).then(|| PlacedLeaf {
                position: Point::new(x, y),
                rotation: ((i * 47) % 360) as f32,
                slot: i,
            })
        })
        .collect()
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct TreeScene {
    /// Thickest first, so thin twigs paint over the trunk
    pub branches: Vec<Branch>,
    pub active: Vec<LeafData>,
    pub fallen: Vec<LeafData>,
    pub leaves: Vec<PlacedLeaf>,
    pub fallen_leaves: Vec<PlacedLeaf>,
}

impl TreeScene {
    pub fn build<R: Rng + ?Sized>(
        habits: &[Habit],
        days_to_show: u32,
        today: NaiveDate,
        layout: &TreeLayout,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let (active, fallen): (Vec<_>, Vec<_>) = collect_leaves(habits, days_to_show, today)
            .into_iter()
            .partition(|leaf| leaf.is_active);

        let mut branches = generate_branches(&layout.seed(params));
        let leaves = place_leaves(&branches, active.len(), rng);
        let fallen_leaves = place_fallen(fallen.len(), layout);
        branches.sort_by(|a, b| b.thickness.total_cmp(&a.thickness));

        log::debug!(
            "tree scene: {} branches, {}/{} leaves placed, {}/{} fallen shown",
            branches.len(),
            leaves.len(),
            active.len(),
            fallen_leaves.len(),
            fallen.len()
        );

        Self {
            branches,
            active,
            fallen,
            leaves,
            fallen_leaves,
        }
    }

    /// Completed days that found no free twig
    pub fn dropped_leaves(&self) -> usize {
        self.active.len() - self.leaves.len()
    }

    pub fn is_bare(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seed(depth: u32, length: f32) -> BranchSeed {
        BranchSeed {
            origin: Point::new(100.0, 200.0),
            angle: 90.0,
            depth,
            length,
            thickness: 28.0,
            spread: 28.0,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_depth_zero_produces_nothing() {
        assert!(generate_branches(&seed(0, 100.0)).is_empty());
    }

    #[test]
    fn test_depth_one_produces_single_branch() {
        let branches = generate_branches(&seed(1, 100.0));
        assert_eq!(branches.len(), 1);
        let trunk = branches[0];
        assert_eq!(trunk.depth, 1);
        assert!(approx(trunk.end.x, 100.0));
        // Pointing up means a smaller y on screen
        assert!(approx(trunk.end.y, 100.0));
    }

    #[test]
    fn test_short_segments_are_not_generated() {
        assert!(generate_branches(&seed(5, 7.9)).is_empty());
    }

    #[test]
    fn test_children_spread_and_shrink() {
        let branches = generate_branches(&seed(2, 100.0));
        assert_eq!(branches.len(), 3);
        let (left, right) = (branches[1], branches[2]);
        assert!(approx(left.angle, 62.0));
        assert!(approx(right.angle, 118.0));
        assert_eq!(left.start, branches[0].end);
        assert!(approx(left.thickness, 28.0 * THICKNESS_DECAY));
        assert!(left.end.x > left.start.x);
        assert!(right.end.x < right.start.x);
    }

    #[test]
    fn test_thickness_floor() {
        let mut s = seed(8, 1000.0);
        s.thickness = 2.0;
        let branches = generate_branches(&s);
        assert!(branches.iter().all(|b| b.thickness >= MIN_THICKNESS));
    }

    #[test]
    fn test_full_tree_is_bounded() {
        let layout = TreeLayout::default();
        let branches = generate_branches(&layout.seed(&TreeParams::default()));
        assert!(branches.len() <= 255);
        assert!(!branches.is_empty());
        assert!(approx(branches[0].start.x, 300.0));
        assert!(approx(branches[0].start.y, layout.bottom_y()));
    }

    #[test]
    fn test_length_floor_prunes_small_trees() {
        let layout = TreeLayout::new(200.0, 60.0);
        let branches = generate_branches(&layout.seed(&TreeParams::default()));
        assert!(branches.len() < 255);
    }

    #[test]
    fn test_twig_candidates() {
        let branches = generate_branches(&TreeLayout::default().seed(&TreeParams::default()));
        let twigs = twig_candidates(&branches);
        assert!(!twigs.is_empty());
        assert!(twigs.iter().all(|b| b.thickness < 6.0 && b.depth <= 4));
        assert!(branches.iter().any(|b| !b.is_twig()));
    }

    #[test]
    fn test_place_leaves_zero_and_overflow() {
        let branches = generate_branches(&TreeLayout::default().seed(&TreeParams::default()));
        let capacity = twig_candidates(&branches).len();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(place_leaves(&branches, 0, &mut rng).is_empty());
        assert_eq!(place_leaves(&branches, capacity + 50, &mut rng).len(), capacity);
        assert!(place_leaves(&[], 10, &mut rng).is_empty());
    }

    #[test]
    fn test_place_leaves_is_reproducible_with_seed() {
        let branches = generate_branches(&TreeLayout::default().seed(&TreeParams::default()));
        let a = place_leaves(&branches, 12, &mut StdRng::seed_from_u64(42));
        let b = place_leaves(&branches, 12, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_leaf_sits_beyond_twig_tip() {
        let twig = Branch {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 0.0),
            thickness: 2.0,
            angle: 0.0,
            depth: 1,
        };
        let leaves = place_leaves(&[twig], 1, &mut StdRng::seed_from_u64(1));
        assert_eq!(leaves.len(), 1);
        assert!(approx(leaves[0].position.x, 10.0 + LEAF_OFFSET));
        assert!(approx(leaves[0].position.y, 0.0));
        assert!(approx(leaves[0].rotation, -90.0 - 15.0));
    }

    #[test]
    fn test_fallen_leaf_grid() {
        let layout = TreeLayout::new(600.0, 410.0);
        let fallen = place_fallen(13, &layout);
        assert_eq!(fallen.len(), 13);
        assert!(approx(fallen[0].position.x, 43.0));
        assert!(approx(fallen[0].position.y, layout.bottom_y() - 25.0));
        assert!(approx(fallen[1].position.x, 85.0));
        // 12 per row, second row shifted by half a slot
        assert!(approx(fallen[12].position.x, 72.0));
        assert!(approx(fallen[12].position.y, layout.bottom_y() - 13.0));
        assert!(approx(fallen[3].rotation, 141.0));
    }

    #[test]
    fn test_fallen_rows_below_the_area_are_dropped() {
        let layout = TreeLayout::new(600.0, 410.0);
        // Third row lands at height - 6, outside the area
        assert_eq!(place_fallen(100, &layout).len(), 24);
        let narrow = TreeLayout::new(50.0, 410.0);
        assert_eq!(place_fallen(3, &narrow).len(), 2);
    }

    #[test]
    fn test_collect_leaves_window_and_order() {
        let mut read = Habit::new("Read", "📚", day(0));
        read.completions.insert(day(0), true);
        read.completions.insert(day(8), false);
        read.completions.insert(day(9), true);
        let mut run = Habit::new("Run", "🏃", day(0));
        run.completions.insert(day(9), true);

        let leaves = collect_leaves(&[read.clone(), run.clone()], 7, day(9));
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0].id, format!("{}-2024-03-09", read.id));
        assert!(!leaves[0].is_active);
        assert!(leaves[1].is_active);
        assert_eq!(leaves[2].emoji, "🏃");
    }

    #[test]
    fn test_collect_leaves_huge_window_reaches_whole_history() {
        let mut read = Habit::new("Read", "📚", day(0));
        read.completions.insert(day(-400), true);
        read.completions.insert(day(3), false);

        let leaves = collect_leaves(&[read], u32::MAX, day(3));
        assert_eq!(leaves.len(), 2);
        assert!(leaves[0].is_active);
    }

    #[test]
    fn test_scene_build() {
        let mut read = Habit::new("Read", "📚", day(0));
        for d in 0..5 {
            read.completions.insert(day(d), true);
        }
        read.completions.insert(day(5), false);

        let scene = TreeScene::build(
            &[read],
            14,
            day(6),
            &TreeLayout::default(),
            &TreeParams::default(),
            &mut StdRng::seed_from_u64(3),
        );
        assert_eq!(scene.active.len(), 5);
        assert_eq!(scene.leaves.len(), 5);
        assert_eq!(scene.fallen_leaves.len(), 1);
        assert_eq!(scene.dropped_leaves(), 0);
        assert!(scene
            .branches
            .windows(2)
            .all(|w| w[0].thickness >= w[1].thickness));
    }

    #[test]
    fn test_branch_tone() {
        assert_eq!(BranchTone::for_thickness(28.0), BranchTone::Trunk);
        assert_eq!(BranchTone::for_thickness(11.0), BranchTone::Bough);
        assert_eq!(BranchTone::for_thickness(6.0), BranchTone::Limb);
        assert_eq!(BranchTone::for_thickness(5.0), BranchTone::Twig);
    }

    proptest! {
        #[test]
        fn prop_leaves_never_exceed_twigs(count in 0usize..600, seed_value in any::<u64>(), depth in 0u32..10) {
            let params = TreeParams { depth, ..TreeParams::default() };
            let branches = generate_branches(&TreeLayout::default().seed(&params));
            let capacity = twig_candidates(&branches).len();
            let placed = place_leaves(&branches, count, &mut StdRng::seed_from_u64(seed_value));
            prop_assert_eq!(placed.len(), count.min(capacity));
        }

        #[test]
        fn prop_branch_count_bounded_by_depth(depth in 0u32..10, length in 0.0f32..400.0) {
            let branches = generate_branches(&seed(depth, length));
            prop_assert!(branches.len() < (1usize << depth));
        }
    }
}
