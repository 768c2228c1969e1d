// wayfinder_core/src/planning/astar.rs

use crate::types::GridCell;
use num_traits::Zero;
use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
    ops::Add,
};

// Type aliases for clarity
type Node = GridCell;

/// An entry of the open set. Ordered so that `BinaryHeap` pops the lowest
/// `f`, then the lowest `h`, then the earliest pushed entry.
#[derive(Debug, Copy, Clone)]
struct OpenItem<C> {
    node: Node,
    f: C,
    h: C,
    seq: u64,
}

impl<C: Ord> Eq for OpenItem<C> {}
impl<C: Ord> PartialEq for OpenItem<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<C: Ord> Ord for OpenItem<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl<C: Ord> PartialOrd for OpenItem<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Generic A* search from `start` to `goal`.
///
/// `heuristic` must be admissible and consistent for the returned path to be
/// shortest. `get_neighbors` yields each successor with its move cost.
/// Returns the node sequence from start to goal inclusive, or `None` when the
/// open set runs dry.
pub fn plan<C, H, FN, IT>(start: &Node, goal: &Node, heuristic: H, get_neighbors: &mut FN) -> Option<Vec<Node>>
where
    C: Zero + Ord + Copy + Add<Output = C>,
    H: Fn(&Node) -> C,
    FN: FnMut(&Node) -> IT,
    IT: IntoIterator<Item = (Node, C)>,
{
    let mut open_set = BinaryHeap::new();
    let mut g_score: HashMap<Node, C> = HashMap::new();
    let mut came_from: HashMap<Node, Node> = HashMap::new();
    let mut closed_set: HashSet<Node> = HashSet::new();
    let mut seq = 0u64;

    let h_start = heuristic(start);
    g_score.insert(*start, C::zero());
    open_set.push(OpenItem {
        node: *start,
        f: h_start,
        h: h_start,
        seq,
    });

    while let Some(current) = open_set.pop() {
        if current.node == *goal {
            return Some(reconstruct_path(&came_from, current.node));
        }

        // Stale heap entries are skipped instead of decreased in place.
        if !closed_set.insert(current.node) {
            continue;
        }

        let current_g = g_score[&current.node];
        for (neighbor, move_cost) in get_neighbors(&current.node) {
            if closed_set.contains(&neighbor) {
                continue;
            }

            let tentative_g = current_g + move_cost;
            let improved = g_score.get(&neighbor).map_or(true, |&g| tentative_g < g);
            if improved {
                g_score.insert(neighbor, tentative_g);
                came_from.insert(neighbor, current.node);
                let h = heuristic(&neighbor);
                seq += 1;
                open_set.push(OpenItem {
                    node: neighbor,
                    f: tentative_g + h,
                    h,
                    seq,
                });
            }
        }
    }

    None // No path found
}

/// Walks predecessors back from `goal` and reverses to get start -> goal order.
fn reconstruct_path(came_from: &HashMap<Node, Node>, goal: Node) -> Vec<Node> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&parent) = came_from.get(&current) {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}
