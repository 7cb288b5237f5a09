//! Traversal and layout math used by the selection and arrangement
//! commands. Everything here is pure: callers pass the visible edges or
//! positions and apply the result.

use crate::graph::{Edge, Position};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Upstream,
    Downstream,
    Both,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlignEdge {
    Left,
    Right,
    Top,
    Bottom,
    /// Mean x of the selection.
    CenterHorizontal,
    /// Mean y of the selection.
    CenterVertical,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistributeAxis {
    Horizontal,
    Vertical,
}

/// Every node reachable from `start` along `edges` in `direction`,
/// `start` included.
pub fn linked_closure<'a, I>(start: &HashSet<Uuid>, edges: I, direction: LinkDirection) -> HashSet<Uuid>
where
    I: IntoIterator<Item = &'a Edge>,
{
    let mut adjacency: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for edge in edges {
        if matches!(direction, LinkDirection::Downstream | LinkDirection::Both) {
            adjacency.entry(edge.source).or_default().push(edge.target);
        }
        if matches!(direction, LinkDirection::Upstream | LinkDirection::Both) {
            adjacency.entry(edge.target).or_default().push(edge.source);
        }
    }

    let mut reached = start.clone();
    let mut queue: VecDeque<Uuid> = start.iter().copied().collect();
    while let Some(id) = queue.pop_front() {
        for next in adjacency.get(&id).into_iter().flatten() {
            if reached.insert(*next) {
                queue.push_back(*next);
            }
        }
    }
    reached
}

/// Shortest path from `from` to `to`, treating edges as undirected.
///
/// Neighbours are visited in edge order, so among equally short paths the
/// one through the first-discovered predecessors wins.
pub fn shortest_path<'a, I>(from: Uuid, to: Uuid, edges: I) -> Option<Vec<Uuid>>
where
    I: IntoIterator<Item = &'a Edge>,
{
    if from == to {
        return Some(vec![from]);
    }
    let mut adjacency: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for edge in edges {
        adjacency.entry(edge.source).or_default().push(edge.target);
        adjacency.entry(edge.target).or_default().push(edge.source);
    }

    let mut previous: HashMap<Uuid, Uuid> = HashMap::new();
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(id) = queue.pop_front() {
        for next in adjacency.get(&id).into_iter().flatten() {
            if !visited.insert(*next) {
                continue;
            }
            previous.insert(*next, id);
            if *next == to {
                let mut path = vec![to];
                let mut cursor = to;
                while let Some(prev) = previous.get(&cursor) {
                    path.push(*prev);
                    cursor = *prev;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(*next);
        }
    }
    None
}

/// New positions for aligning `positions` on `edge`. Fewer than two nodes
/// is a no-op (`None`).
pub fn align(positions: &[(Uuid, Position)], edge: AlignEdge) -> Option<Vec<(Uuid, Position)>> {
    if positions.len() < 2 {
        return None;
    }
    let xs = positions.iter().map(|(_, p)| p.x);
    let ys = positions.iter().map(|(_, p)| p.y);
    let count = positions.len() as f32;
    let target = match edge {
        AlignEdge::Left => xs.fold(f32::INFINITY, f32::min),
        AlignEdge::Right => xs.fold(f32::NEG_INFINITY, f32::max),
        AlignEdge::Top => ys.fold(f32::INFINITY, f32::min),
        AlignEdge::Bottom => ys.fold(f32::NEG_INFINITY, f32::max),
        AlignEdge::CenterHorizontal => xs.sum::<f32>() / count,
        AlignEdge::CenterVertical => ys.sum::<f32>() / count,
    };
    let horizontal = matches!(edge, AlignEdge::Left | AlignEdge::Right | AlignEdge::CenterHorizontal);
    Some(
        positions
            .iter()
            .map(|(id, p)| {
                let moved = if horizontal {
                    Position::new(target, p.y)
                } else {
                    Position::new(p.x, target)
                };
                (*id, moved)
            })
            .collect(),
    )
}

/// Evenly space `positions` along `axis` between the two extremes. Fewer
/// than three nodes is a no-op (`None`). The end nodes keep their place.
pub fn distribute(positions: &[(Uuid, Position)], axis: DistributeAxis) -> Option<Vec<(Uuid, Position)>> {
    if positions.len() < 3 {
        return None;
    }
    let key = |p: &Position| match axis {
        DistributeAxis::Horizontal => p.x,
        DistributeAxis::Vertical => p.y,
    };
    let mut sorted = positions.to_vec();
    sorted.sort_by(|a, b| key(&a.1).total_cmp(&key(&b.1)));

    let first = key(&sorted[0].1);
    let last = key(&sorted[sorted.len() - 1].1);
    let step = (last - first) / (sorted.len() - 1) as f32;
    let end = sorted.len() - 1;
    Some(
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, (id, p))| {
                if i == 0 || i == end {
                    return (id, p);
                }
                let along = first + step * i as f32;
                let moved = match axis {
                    DistributeAxis::Horizontal => Position::new(along, p.y),
                    DistributeAxis::Vertical => Position::new(p.x, along),
                };
                (id, moved)
            })
            .collect(),
    )
}

/// Whether segments `a1-a2` and `b1-b2` cross. Touching at an endpoint or
/// running collinear does not count.
pub fn segments_cross(a1: Position, a2: Position, b1: Position, b2: Position) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Sign tells which side of `from-to` the point lies on.
fn orientation(from: Position, to: Position, point: Position) -> f32 {
    (point.x - from.x) * (to.y - from.y) - (to.x - from.x) * (point.y - from.y)
}

pub fn distance_to_segment(point: Position, a: Position, b: Position) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (point.x - a.x).hypot(point.y - a.y);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    (point.x - (a.x + t * dx)).hypot(point.y - (a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKind;

    fn link(source: Uuid, target: Uuid) -> Edge {
        Edge {
            id: Uuid::new_v4(),
            source,
            source_port: "out".into(),
            target,
            target_port: "in".into(),
            kind: EdgeKind::Data,
        }
    }

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn closure_respects_direction() {
        let n = ids(4);
        // 0 -> 1 -> 2, 3 -> 1
        let edges = vec![link(n[0], n[1]), link(n[1], n[2]), link(n[3], n[1])];
        let start = HashSet::from([n[1]]);

        let down = linked_closure(&start, &edges, LinkDirection::Downstream);
        assert_eq!(down, HashSet::from([n[1], n[2]]));
        let up = linked_closure(&start, &edges, LinkDirection::Upstream);
        assert_eq!(up, HashSet::from([n[0], n[1], n[3]]));
        let both = linked_closure(&start, &edges, LinkDirection::Both);
        assert_eq!(both.len(), 4);
        assert_eq!(linked_closure(&both, &edges, LinkDirection::Both), both);
    }

    #[test]
    fn shortest_path_ignores_direction() {
        let n = ids(4);
        // a -> x, y -> x, y -> b
        let edges = vec![link(n[0], n[1]), link(n[2], n[1]), link(n[2], n[3])];
        assert_eq!(shortest_path(n[0], n[3], &edges), Some(n.clone()));
        assert_eq!(shortest_path(n[0], Uuid::new_v4(), &edges), None);
    }

    #[test]
    fn shortest_path_prefers_first_discovered() {
        let n = ids(4);
        // two routes of equal length: 0-1-3 and 0-2-3
        let edges = vec![link(n[0], n[1]), link(n[0], n[2]), link(n[2], n[3]), link(n[1], n[3])];
        assert_eq!(shortest_path(n[0], n[3], &edges), Some(vec![n[0], n[1], n[3]]));
    }

    #[test]
    fn align_left_snaps_to_minimum() {
        let n = ids(3);
        let positions = vec![
            (n[0], Position::new(10.0, 1.0)),
            (n[1], Position::new(50.0, 2.0)),
            (n[2], Position::new(30.0, 3.0)),
        ];
        let aligned = align(&positions, AlignEdge::Left).unwrap();
        assert!(aligned.iter().all(|(_, p)| p.x == 10.0));
        assert_eq!(aligned[2].1.y, 3.0);
        assert!(align(&positions[..1], AlignEdge::Left).is_none());
    }

    #[test]
    fn distribute_keeps_ends() {
        let n = ids(3);
        let positions = vec![
            (n[0], Position::new(0.0, 0.0)),
            (n[1], Position::new(90.0, 0.0)),
            (n[2], Position::new(30.0, 0.0)),
        ];
        let spread: HashMap<_, _> = distribute(&positions, DistributeAxis::Horizontal)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(spread[&n[0]].x, 0.0);
        assert_eq!(spread[&n[1]].x, 90.0);
        assert_eq!(spread[&n[2]].x, 45.0);
        assert!(distribute(&positions[..2], DistributeAxis::Horizontal).is_none());
    }

    #[test]
    fn crossing_needs_a_proper_intersection() {
        let p = Position::new;
        assert!(segments_cross(p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0)));
        assert!(!segments_cross(p(0.0, 0.0), p(10.0, 0.0), p(0.0, 5.0), p(10.0, 5.0)));
        // shared endpoint
        assert!(!segments_cross(p(0.0, 0.0), p(10.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)));
    }

    #[test]
    fn distance_clamps_to_segment_ends() {
        let p = Position::new;
        assert_eq!(distance_to_segment(p(5.0, 3.0), p(0.0, 0.0), p(10.0, 0.0)), 3.0);
        assert_eq!(distance_to_segment(p(13.0, 4.0), p(0.0, 0.0), p(10.0, 0.0)), 5.0);
        assert_eq!(distance_to_segment(p(3.0, 4.0), p(0.0, 0.0), p(0.0, 0.0)), 5.0);
    }
}
