//! Graph view of the open cells
//!
//! Independent of the solvers: used to check that generated mazes are
//! perfect and to cross-check solver output against a shortest path.

use petgraph::algo::{astar, connected_components};
use petgraph::graph::NodeIndex;
use petgraph::{Graph, Undirected};

use crate::grid::{Grid, Point};

/// Undirected graph of open cells, with edges between orthogonal neighbours
pub struct PassageGraph {
    /// Weights of the nodes are the grid points
    graph: Graph<Point, (), Undirected>,
    /// Node index of each cell, row-major, `None` for walls
    nodes: Vec<Option<NodeIndex>>,
    width: usize,
}

impl PassageGraph {
    pub fn new(grid: &Grid) -> Self {
        let mut graph = Graph::new_undirected();
        let mut nodes = vec![None; grid.len()];
        let width = grid.width();

        for point in grid.open_cells() {
            let node_a = Self::get_or_create_node(point, width, &mut nodes, &mut graph);
            // Only look right and down, the graph is undirected
            for (dy, dx) in [(1, 0), (0, 1)] {
                let other = Point::new(point.y + dy, point.x + dx);
                if grid.is_open(other) {
                    let node_b = Self::get_or_create_node(other, width, &mut nodes, &mut graph);
                    graph.add_edge(node_a, node_b, ());
                }
            }
        }

        Self {
            graph,
            nodes,
            width,
        }
    }

    /// Get node index from `nodes`, or create a new node in `graph`.
    fn get_or_create_node(
        point: Point,
        width: usize,
        nodes: &mut [Option<NodeIndex>],
        graph: &mut Graph<Point, (), Undirected>,
    ) -> NodeIndex {
        let slot = &mut nodes[point.y * width + point.x];
        *slot.get_or_insert_with(|| graph.add_node(point))
    }

    fn node(&self, point: Point) -> Option<NodeIndex> {
        if point.x >= self.width {
            return None;
        }
        self.nodes
            .get(point.y * self.width + point.x)
            .copied()
            .flatten()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Spanning tree check: connected, and exactly one edge fewer than nodes.
    pub fn is_perfect(&self) -> bool {
        let nodes = self.graph.node_count();
        nodes > 0 && connected_components(&self.graph) == 1 && self.graph.edge_count() == nodes - 1
    }

    /// Cells of a shortest path from `from` to `to`, both included.
    ///
    /// `None` if either end is a wall or `to` is unreachable.
    pub fn shortest_path(&self, from: Point, to: Point) -> Option<Vec<Point>> {
        let source = self.node(from)?;
        let target = self.node(to)?;
        let (_, path) = astar(&self.graph, source, |n| n == target, |_| 1usize, |_| 0)?;
        Some(path.into_iter().map(|n| self.graph[n]).collect())
    }
}

/// Summary of a maze layout
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MazeStats {
    pub open_cells: usize,
    /// Open cells with exactly one open neighbour
    pub dead_ends: usize,
    /// Open cells with three or more open neighbours
    pub junctions: usize,
    pub perfect: bool,
}

impl MazeStats {
    pub fn of(grid: &Grid) -> Self {
        let mut stats = MazeStats {
            open_cells: 0,
            dead_ends: 0,
            junctions: 0,
            perfect: PassageGraph::new(grid).is_perfect(),
        };
        for point in grid.open_cells() {
            stats.open_cells += 1;
            match grid.open_neighbors(point) {
                1 => stats.dead_ends += 1,
                3.. => stats.junctions += 1,
                _ => (),
            }
        }
        stats
    }
}
