//! Bounded multi-goal A* over the tile grid.
//! This module exists so navigation rules are reusable across simulation systems.
//! It does not own goal selection or path following.

use super::*;

/// Most nodes a single search may expand before giving up for this tick.
pub const MAX_EXPANSIONS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    /// Tiles to walk, excluding the start unless the start is itself a goal.
    Found(Vec<TilePos>),
    /// Every reachable tile inside the window was searched.
    Unreachable,
    /// The expansion cap was hit; try again later.
    Exhausted,
}

/// Searches from `start` to the nearest of `goals` with unit step cost, 4-connected,
/// inside the bounding box of start and goals grown by `padding` tiles. `passable` is
/// not consulted for the start tile.
pub fn find_path(
    start: TilePos,
    goals: &BTreeSet<TilePos>,
    padding: i32,
    mut passable: impl FnMut(TilePos) -> bool,
) -> PathOutcome {
    if goals.is_empty() {
        return PathOutcome::Unreachable;
    }
    if goals.contains(&start) {
        return PathOutcome::Found(vec![start]);
    }

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (start.x, start.x, start.y, start.y);
    for goal in goals {
        min_x = min_x.min(goal.x);
        max_x = max_x.max(goal.x);
        min_y = min_y.min(goal.y);
        max_y = max_y.max(goal.y);
    }
    let in_window = |pos: TilePos| {
        pos.x >= min_x - padding
            && pos.x <= max_x + padding
            && pos.y >= min_y - padding
            && pos.y <= max_y + padding
    };
    let heuristic =
        |pos: TilePos| goals.iter().map(|goal| pos.manhattan(*goal)).min().unwrap_or(u32::MAX);

    let mut open_set = BTreeSet::new();
    let mut g_score = BTreeMap::new();
    let mut came_from = BTreeMap::new();
    let h = heuristic(start);
    open_set.insert(OpenNode { f: h, h, y: start.y, x: start.x });
    g_score.insert(start, 0u32);

    let mut expansions = 0;
    while let Some(current) = open_set.pop_first() {
        let pos = TilePos::new(current.x, current.y);
        if goals.contains(&pos) {
            return PathOutcome::Found(reconstruct_path(&came_from, start, pos));
        }
        expansions += 1;
        if expansions > MAX_EXPANSIONS {
            return PathOutcome::Exhausted;
        }
        let current_g = g_score.get(&pos).copied().unwrap_or(u32::MAX);
        for neighbor in pos.neighbors() {
            if !in_window(neighbor) || !passable(neighbor) {
                continue;
            }
            let tentative = current_g.saturating_add(1);
            if tentative < g_score.get(&neighbor).copied().unwrap_or(u32::MAX) {
                came_from.insert(neighbor, pos);
                g_score.insert(neighbor, tentative);
                let h = heuristic(neighbor);
                open_set.insert(OpenNode { f: tentative + h, h, y: neighbor.y, x: neighbor.x });
            }
        }
    }
    PathOutcome::Unreachable
}

fn reconstruct_path(
    came_from: &BTreeMap<TilePos, TilePos>,
    start: TilePos,
    goal: TilePos,
) -> Vec<TilePos> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from.get(&current).copied() {
        if previous == start {
            break;
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < 10 && pos.y < 10
    }

    #[test]
    fn straight_line_on_open_ground() {
        let goals = BTreeSet::from([TilePos::new(4, 0)]);
        let outcome = find_path(TilePos::new(0, 0), &goals, 4, open);
        assert_eq!(
            outcome,
            PathOutcome::Found(vec![
                TilePos::new(1, 0),
                TilePos::new(2, 0),
                TilePos::new(3, 0),
                TilePos::new(4, 0)
            ])
        );
    }

    #[test]
    fn nearest_of_several_goals_wins() {
        let goals = BTreeSet::from([TilePos::new(9, 9), TilePos::new(0, 2)]);
        match find_path(TilePos::new(0, 0), &goals, 4, open) {
            PathOutcome::Found(path) => assert_eq!(path.last(), Some(&TilePos::new(0, 2))),
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn routes_around_a_wall() {
        let wall = |pos: TilePos| open(pos) && !(pos.x == 2 && pos.y < 3);
        let goals = BTreeSet::from([TilePos::new(4, 0)]);
        match find_path(TilePos::new(0, 0), &goals, 4, wall) {
            PathOutcome::Found(path) => {
                assert!(path.iter().all(|pos| wall(*pos)));
                assert_eq!(path.len(), 10);
            }
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn sealed_goal_is_unreachable_and_huge_search_exhausts() {
        let goals = BTreeSet::from([TilePos::new(5, 5)]);
        let sealed = |pos: TilePos| open(pos) && pos != TilePos::new(5, 5);
        assert_eq!(find_path(TilePos::new(0, 0), &goals, 1, sealed), PathOutcome::Unreachable);

        let far = BTreeSet::from([TilePos::new(200, 200)]);
        let everywhere_but_goal = |pos: TilePos| pos != TilePos::new(200, 200);
        assert_eq!(
            find_path(TilePos::new(0, 0), &far, 4, everywhere_but_goal),
            PathOutcome::Exhausted
        );
    }

    #[test]
    fn start_on_goal_returns_the_start() {
        let goals = BTreeSet::from([TilePos::new(3, 3)]);
        assert_eq!(
            find_path(TilePos::new(3, 3), &goals, 4, |_| false),
            PathOutcome::Found(vec![TilePos::new(3, 3)])
        );
    }
}
