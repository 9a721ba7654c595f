use std::collections::{BTreeSet, VecDeque};

/// marks the bonds lying on at least one cycle. these are exactly the bonds
/// that are not bridges, found with an iterative version of Tarjan's
/// lowlink search over the adjacency list
pub(super) fn ring_bonds(
    adjacency: &[Vec<(usize, usize)>],
    nbonds: usize,
) -> Vec<bool> {
    let n = adjacency.len();
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0; n];
    let mut in_ring = vec![true; nbonds];
    let mut timer = 0;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        // (atom, bond used to reach it, next adjacency entry to visit)
        let mut stack: Vec<(usize, Option<usize>, usize)> =
            vec![(root, None, 0)];
        while let Some(top) = stack.last_mut() {
            let (v, parent_bond) = (top.0, top.1);
            if let Some(&(w, bond)) = adjacency[v].get(top.2) {
                top.2 += 1;
                if Some(bond) == parent_bond {
                    continue;
                }
                if disc[w] == usize::MAX {
                    disc[w] = timer;
                    low[w] = timer;
                    timer += 1;
                    stack.push((w, Some(bond), 0));
                } else {
                    low[v] = low[v].min(disc[w]);
                }
                continue;
            }
            stack.pop();
            if let (Some(bond), Some(&(u, _, _))) = (parent_bond, stack.last())
            {
                low[u] = low[u].min(low[v]);
                if low[v] > disc[u] {
                    in_ring[bond] = false;
                }
            }
        }
    }
    in_ring
}

/// the shortest cycle through each ring bond, as sorted bond indices with
/// repeats removed. together they cover every ring bond
pub(super) fn smallest_cycles(
    adjacency: &[Vec<(usize, usize)>],
    ends: &[(usize, usize)],
    in_ring: &[bool],
) -> Vec<Vec<usize>> {
    let mut cycles = BTreeSet::new();
    for (bond, &(start, goal)) in ends.iter().enumerate() {
        if !in_ring[bond] {
            continue;
        }
        if let Some(mut path) =
            shortest_path(adjacency, in_ring, start, goal, bond)
        {
            path.push(bond);
            path.sort_unstable();
            cycles.insert(path);
        }
    }
    cycles.into_iter().collect()
}

/// breadth-first search for the bonds of a shortest path from `start` to
/// `goal` over ring bonds other than `skip`
fn shortest_path(
    adjacency: &[Vec<(usize, usize)>],
    in_ring: &[bool],
    start: usize,
    goal: usize,
    skip: usize,
) -> Option<Vec<usize>> {
    // (previous atom, bond) each atom was reached through
    let mut came_from: Vec<Option<(usize, usize)>> = vec![None; adjacency.len()];
    let mut visited = vec![false; adjacency.len()];
    visited[start] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        if v == goal {
            let mut path = Vec::new();
            let mut at = goal;
            while let Some((prev, bond)) = came_from[at] {
                path.push(bond);
                at = prev;
            }
            return Some(path);
        }
        for &(w, bond) in &adjacency[v] {
            if bond == skip || !in_ring[bond] || visited[w] {
                continue;
            }
            visited[w] = true;
            came_from[w] = Some((v, bond));
            queue.push_back(w);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(n: usize, bonds: &[(usize, usize)]) -> Vec<Vec<(usize, usize)>> {
        let mut adj = vec![Vec::new(); n];
        for (i, &(a, b)) in bonds.iter().enumerate() {
            adj[a].push((b, i));
            adj[b].push((a, i));
        }
        adj
    }

    #[test]
    fn chain() {
        let bonds = [(0, 1), (1, 2), (2, 3)];
        let got = ring_bonds(&adjacency(4, &bonds), bonds.len());
        assert_eq!(got, vec![false; 3]);
    }

    #[test]
    fn fused_and_linked() {
        // two fused rings (naphthalene-like skeleton) linked to a cyclopropane
        // through a two-atom chain
        let bonds = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 0),
            (4, 6),
            (6, 7),
            (7, 8),
            (8, 9),
            (9, 3),
            (8, 10),
            (10, 11),
            (11, 12),
            (12, 13),
            (13, 14),
            (14, 12),
        ];
        let adj = adjacency(15, &bonds);
        let got = ring_bonds(&adj, bonds.len());
        let mut want = vec![true; 11];
        want.extend([false, false, false, true, true, true]);
        assert_eq!(got, want);

        let got = smallest_cycles(&adj, &bonds, &want);
        assert_eq!(
            got,
            vec![
                vec![0, 1, 2, 3, 4, 5],
                vec![3, 6, 7, 8, 9, 10],
                vec![14, 15, 16],
            ]
        );
    }

    #[test]
    fn disconnected() {
        let bonds = [(0, 1), (1, 2), (2, 0), (3, 4)];
        let got = ring_bonds(&adjacency(6, &bonds), bonds.len());
        assert_eq!(got, vec![true, true, true, false]);
    }
}
