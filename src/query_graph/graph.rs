//! The query graph: a directed graph over typed nodes and edges with the
//! derived views the translation engine consumes.
//!
//! Nodes are interned by structural identity, so connecting two independently
//! constructed `Relation("Students")` instances targets one graph node. At
//! most one edge exists per ordered node pair; reconnecting a pair is a no-op.
//! The graph is built once by a collaborator and is read-only during
//! translation; every derived view is recomputed on demand.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::edge::Edge;
use super::errors::GraphError;
use super::node::Node;
use super::vocabulary::Operator;

const DEFAULT_REFERENCE_DISTANCE_THRESHOLD: usize = 4;

pub struct QueryGraph {
    pub name: String,
    reference_distance_threshold: usize,
    graph: DiGraph<Node, Edge>,
    node_indices: HashMap<Node, NodeIndex>,
}

impl QueryGraph {
    pub fn new(name: impl Into<String>) -> Self {
        QueryGraph {
            name: name.into(),
            reference_distance_threshold: DEFAULT_REFERENCE_DISTANCE_THRESHOLD,
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
        }
    }

    /// Overrides the distance threshold of reference-point condition 4.
    pub fn with_reference_distance_threshold(mut self, threshold: usize) -> Self {
        self.reference_distance_threshold = threshold;
        self
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn index_of(&self, node: &Node) -> Option<NodeIndex> {
        self.node_indices.get(node).copied()
    }

    pub fn node_at(&self, ix: NodeIndex) -> &Node {
        &self.graph[ix]
    }

    pub fn label_of(&self, ix: NodeIndex) -> &str {
        self.graph[ix].label()
    }

    fn add_node_if_absent(&mut self, node: &Node) -> NodeIndex {
        if let Some(&ix) = self.node_indices.get(node) {
            return ix;
        }
        let ix = self.graph.add_node(node.clone());
        self.node_indices.insert(node.clone(), ix);
        ix
    }

    /// Adds the single directed edge for the ordered pair, interning both
    /// endpoints. Reconnecting an existing pair is a no-op.
    pub fn connect(&mut self, src: &Node, edge: Edge, dst: &Node) {
        let s = self.add_node_if_absent(src);
        let d = self.add_node_if_absent(dst);
        if self.graph.find_edge(s, d).is_none() {
            self.graph.add_edge(s, d, edge);
        }
    }

    pub fn bidirectional_connect(&mut self, a: &Node, edge: Edge, b: &Node) {
        self.connect(a, edge.clone(), b);
        self.connect(b, edge, a);
    }

    /// Marks `attribute` as projected by `relation`. Stored attribute→relation.
    pub fn connect_membership(&mut self, relation: &Node, attribute: &Node) -> Result<(), GraphError> {
        if !relation.is_relation() || !attribute.is_attribute() {
            return Err(GraphError::InvariantViolation(format!(
                "membership requires an attribute and a relation, got '{}' of '{}'",
                attribute.label(),
                relation.label()
            )));
        }
        self.connect(attribute, Edge::membership(), relation);
        Ok(())
    }

    /// Usually relation→attribute; attribute→relation in correlation cases.
    pub fn connect_selection(&mut self, src: &Node, dst: &Node) -> Result<(), GraphError> {
        let well_formed = (src.is_relation() && dst.is_attribute())
            || (src.is_attribute() && dst.is_relation());
        if !well_formed {
            return Err(GraphError::InvariantViolation(format!(
                "selection must link a relation and an attribute, got '{}' and '{}'",
                src.label(),
                dst.label()
            )));
        }
        self.connect(src, Edge::selection(), dst);
        Ok(())
    }

    /// Destination kind decides the predicate's nature: a value makes it a
    /// selection predicate, an attribute or function a join/correlation one.
    pub fn connect_predicate(
        &mut self,
        src: &Node,
        dst: &Node,
        operator: Operator,
    ) -> Result<(), GraphError> {
        if !src.is_attribute() && !src.is_function() {
            return Err(GraphError::InvariantViolation(format!(
                "predicate source must be an attribute or function, got '{}'",
                src.label()
            )));
        }
        if src.is_relation() || dst.is_relation() {
            return Err(GraphError::InvariantViolation(
                "predicate endpoints cannot be relations".to_string(),
            ));
        }
        self.connect(src, Edge::predicate(operator), dst);
        Ok(())
    }

    pub fn connect_transformation(&mut self, src: &Node, dst: &Node) -> Result<(), GraphError> {
        let well_formed = (src.is_function() && dst.is_attribute())
            || (src.is_attribute() && dst.is_function());
        if !well_formed {
            return Err(GraphError::InvariantViolation(format!(
                "transformation must link an attribute and a function, got '{}' and '{}'",
                src.label(),
                dst.label()
            )));
        }
        self.connect(src, Edge::Transformation, dst);
        Ok(())
    }

    /// `src` is the relation for the first grouped attribute; further grouped
    /// attributes chain attribute→attribute.
    pub fn connect_grouping(&mut self, src: &Node, attribute: &Node) -> Result<(), GraphError> {
        if !attribute.is_attribute() || src.is_value() || src.is_function() {
            return Err(GraphError::InvariantViolation(format!(
                "grouping must point at an attribute, got '{}' group by '{}'",
                src.label(),
                attribute.label()
            )));
        }
        self.connect(src, Edge::grouping(), attribute);
        Ok(())
    }

    pub fn connect_having(&mut self, relation: &Node, attribute: &Node) -> Result<(), GraphError> {
        if !relation.is_relation() || !attribute.is_attribute() {
            return Err(GraphError::InvariantViolation(format!(
                "having must link a relation and an attribute, got '{}' and '{}'",
                relation.label(),
                attribute.label()
            )));
        }
        self.connect(relation, Edge::having(), attribute);
        Ok(())
    }

    /// Relation→attribute, or attribute→attribute for several sort columns.
    pub fn connect_order(&mut self, src: &Node, attribute: &Node) -> Result<(), GraphError> {
        if !attribute.is_attribute() || src.is_value() || src.is_function() {
            return Err(GraphError::InvariantViolation(format!(
                "order must point at an attribute, got '{}' order by '{}'",
                src.label(),
                attribute.label()
            )));
        }
        self.connect(src, Edge::order(), attribute);
        Ok(())
    }

    /// Detailed join through the two attributes' equality predicate.
    pub fn connect_join(
        &mut self,
        relation1: &Node,
        attribute1: &Node,
        attribute2: &Node,
        relation2: &Node,
    ) -> Result<(), GraphError> {
        self.connect_selection(relation1, attribute1)?;
        self.connect_selection(attribute1, relation1)?;
        self.connect_predicate(attribute1, attribute2, Operator::Equal)?;
        self.connect_predicate(attribute2, attribute1, Operator::Equal)?;
        self.connect_selection(relation2, attribute2)?;
        self.connect_selection(attribute2, relation2)?;
        Ok(())
    }

    /// Collapsed relation↔relation join with a phrase per direction.
    pub fn connect_simplified_join(
        &mut self,
        relation1: &Node,
        relation2: &Node,
        label1: impl Into<String>,
        label2: impl Into<String>,
    ) -> Result<(), GraphError> {
        if !relation1.is_relation() || !relation2.is_relation() {
            return Err(GraphError::InvariantViolation(format!(
                "simplified join must link two relations, got '{}' and '{}'",
                relation1.label(),
                relation2.label()
            )));
        }
        self.connect(relation1, Edge::join(label1), relation2);
        self.connect(relation2, Edge::join(label2), relation1);
        Ok(())
    }

    // --- traversal helpers -------------------------------------------------

    /// Outgoing edges in insertion order. petgraph iterates adjacency
    /// newest-first, so the collected list is reversed.
    pub fn out_edges(&self, ix: NodeIndex) -> Vec<(NodeIndex, &Edge)> {
        let mut edges: Vec<(NodeIndex, &Edge)> = self
            .graph
            .edges_directed(ix, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect();
        edges.reverse();
        edges
    }

    /// Incoming edges in insertion order.
    pub fn in_edges(&self, ix: NodeIndex) -> Vec<(NodeIndex, &Edge)> {
        let mut edges: Vec<(NodeIndex, &Edge)> = self
            .graph
            .edges_directed(ix, Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
            .collect();
        edges.reverse();
        edges
    }

    pub fn edge_between(&self, src: NodeIndex, dst: NodeIndex) -> Option<&Edge> {
        self.graph.find_edge(src, dst).map(|e| &self.graph[e])
    }

    pub fn has_path(&self, src: NodeIndex, dst: NodeIndex) -> bool {
        has_path_connecting(&self.graph, src, dst, None)
    }

    /// Directed shortest-path length in edge count, `None` when unreachable.
    pub fn shortest_path_length(&self, src: NodeIndex, dst: NodeIndex) -> Option<usize> {
        if src == dst {
            return Some(0);
        }
        let mut distances: HashMap<NodeIndex, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        distances.insert(src, 0);
        queue.push_back(src);
        while let Some(current) = queue.pop_front() {
            let next = distances[&current] + 1;
            for neighbor in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if neighbor == dst {
                    return Some(next);
                }
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, next);
                    queue.push_back(neighbor);
                }
            }
        }
        None
    }

    // --- derived views -----------------------------------------------------

    /// All relation nodes in insertion order.
    pub fn relations(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&ix| self.graph[ix].is_relation())
            .collect()
    }

    /// Relations with no outgoing path to any other relation.
    pub fn leaf_relations(&self) -> Vec<NodeIndex> {
        let relations = self.relations();
        relations
            .iter()
            .copied()
            .filter(|&r| {
                relations
                    .iter()
                    .all(|&other| other == r || !self.has_path(r, other))
            })
            .collect()
    }

    /// Relations contributing at least one projected attribute.
    pub fn primary_relations(&self) -> Result<Vec<NodeIndex>, GraphError> {
        let mut primaries = Vec::new();
        for r in self.relations() {
            if !self.projected_attributes(r)?.is_empty() {
                primaries.push(r);
            }
        }
        Ok(primaries)
    }

    /// Relations whose every incident edge is a selection used purely to
    /// reach a join predicate, i.e. relations that only connect others.
    pub fn secondary_relations(&self) -> Vec<NodeIndex> {
        self.relations()
            .into_iter()
            .filter(|&r| {
                let incident: Vec<(NodeIndex, NodeIndex)> = self
                    .out_edges(r)
                    .iter()
                    .map(|(dst, _)| (r, *dst))
                    .chain(self.in_edges(r).iter().map(|(src, _)| (*src, r)))
                    .collect();
                incident
                    .iter()
                    .all(|&(src, dst)| self.is_selection_for_join(src, dst))
            })
            .collect()
    }

    fn is_predicate_for_join(&self, src: NodeIndex, dst: NodeIndex) -> bool {
        self.graph[src].is_attribute()
            && self.graph[dst].is_attribute()
            && self
                .edge_between(src, dst)
                .map(Edge::is_predicate)
                .unwrap_or(false)
    }

    fn is_selection_for_join(&self, src: NodeIndex, dst: NodeIndex) -> bool {
        let is_selection = self
            .edge_between(src, dst)
            .map(Edge::is_selection)
            .unwrap_or(false);
        if !is_selection {
            return false;
        }
        let (attribute, relation) = if self.graph[src].is_attribute() && self.graph[dst].is_relation()
        {
            (src, dst)
        } else if self.graph[src].is_relation() && self.graph[dst].is_attribute() {
            (dst, src)
        } else {
            return false;
        };
        self.out_edges(attribute)
            .iter()
            .filter(|(next, _)| *next != relation)
            .all(|(next, _)| self.is_predicate_for_join(attribute, *next))
    }

    /// Attributes projected by `relation` (incoming membership edges), in
    /// insertion order.
    pub fn projected_attributes(&self, relation: NodeIndex) -> Result<Vec<NodeIndex>, GraphError> {
        let mut attributes = Vec::new();
        for (src, edge) in self.in_edges(relation) {
            if edge.is_membership() {
                if !self.graph[src].is_attribute() {
                    return Err(GraphError::InvariantViolation(format!(
                        "membership source '{}' is not an attribute",
                        self.graph[src].label()
                    )));
                }
                attributes.push(src);
            }
        }
        Ok(attributes)
    }

    /// The aggregate function applied to `attribute` through a transformation
    /// edge, if any. More than one is a structural-invariant violation.
    pub fn aggregate_of(&self, attribute: NodeIndex) -> Result<Option<NodeIndex>, GraphError> {
        let mut functions: Vec<NodeIndex> = Vec::new();
        let incoming = self.in_edges(attribute);
        let outgoing = self.out_edges(attribute);
        let linked = incoming
            .iter()
            .chain(outgoing.iter())
            .filter(|(_, edge)| edge.is_transformation())
            .map(|(other, _)| *other);
        for other in linked {
            if self.graph[other].is_function() && !functions.contains(&other) {
                functions.push(other);
            }
        }
        match functions.len() {
            0 => Ok(None),
            1 => Ok(Some(functions[0])),
            _ => Err(GraphError::InvariantViolation(format!(
                "attribute '{}' has more than one aggregate function",
                self.graph[attribute].label()
            ))),
        }
    }

    /// The relation an attribute belongs to, reached through a membership or
    /// selection edge in either direction. Functions resolve through their
    /// transformed attribute.
    pub fn owning_relation(&self, ix: NodeIndex) -> Option<NodeIndex> {
        match &self.graph[ix] {
            Node::Attribute(_) => {
                for (dst, edge) in self.out_edges(ix) {
                    if (edge.is_membership() || edge.is_selection()) && self.graph[dst].is_relation()
                    {
                        return Some(dst);
                    }
                }
                for (src, edge) in self.in_edges(ix) {
                    if (edge.is_membership() || edge.is_selection()) && self.graph[src].is_relation()
                    {
                        return Some(src);
                    }
                }
                None
            }
            Node::Function(_) => {
                let linked_attribute = self
                    .out_edges(ix)
                    .iter()
                    .chain(self.in_edges(ix).iter())
                    .filter(|(_, edge)| edge.is_transformation())
                    .map(|(other, _)| *other)
                    .find(|&other| self.graph[other].is_attribute());
                linked_attribute.and_then(|a| self.owning_relation(a))
            }
            _ => None,
        }
    }

    /// Anchor relations of the sentence, chosen by four conditions evaluated
    /// in fixed priority order over insertion-ordered relations:
    /// 1. relations with projected attributes,
    /// 2. branching points (more than one first hop toward other relations),
    /// 3. leaf relations,
    /// 4. relations farther than the distance threshold from every reference
    ///    point accepted so far.
    pub fn reference_points(&self) -> Result<Vec<NodeIndex>, GraphError> {
        let relations = self.relations();
        let mut points: Vec<NodeIndex> = Vec::new();

        for &r in &relations {
            if !self.projected_attributes(r)?.is_empty() {
                points.push(r);
            }
        }

        for &r in &relations {
            if points.contains(&r) {
                continue;
            }
            let others: Vec<NodeIndex> =
                relations.iter().copied().filter(|&o| o != r).collect();
            if others.len() < 2 {
                continue;
            }
            if self.branching_first_hops(r, &others) > 1 {
                points.push(r);
            }
        }

        let leaves = self.leaf_relations();
        for &r in &relations {
            if !points.contains(&r) && leaves.contains(&r) {
                points.push(r);
            }
        }

        for &r in &relations {
            if points.contains(&r) {
                continue;
            }
            let min_distance = points
                .iter()
                .filter_map(|&p| self.shortest_path_length(r, p))
                .min();
            match min_distance {
                Some(d) if d <= self.reference_distance_threshold => {}
                _ => points.push(r),
            }
        }

        Ok(points)
    }

    /// Count of distinct first-hop neighbors of `r` that start a path to some
    /// other relation without passing back through `r`.
    fn branching_first_hops(&self, r: NodeIndex, others: &[NodeIndex]) -> usize {
        self.out_edges(r)
            .iter()
            .filter(|(first, _)| self.reaches_relation_avoiding(*first, r, others))
            .count()
    }

    fn reaches_relation_avoiding(
        &self,
        start: NodeIndex,
        avoid: NodeIndex,
        targets: &[NodeIndex],
    ) -> bool {
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            if targets.contains(&current) {
                return true;
            }
            if current == avoid {
                continue;
            }
            for neighbor in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if neighbor != avoid && seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        false
    }

    /// Primary relations minimizing the maximum shortest-path distance to
    /// every other relation; ties broken by the greater number of projected
    /// attributes. All tied winners are returned, in insertion order.
    pub fn query_subjects(&self) -> Result<Vec<NodeIndex>, GraphError> {
        let relations = self.relations();
        let mut scored: Vec<(NodeIndex, usize, usize)> = Vec::new();
        for pr in self.primary_relations()? {
            let eccentricity = relations
                .iter()
                .filter(|&&other| other != pr)
                .map(|&other| self.shortest_path_length(pr, other).unwrap_or(usize::MAX))
                .max()
                .unwrap_or(usize::MAX);
            let projected = self.projected_attributes(pr)?.len();
            scored.push((pr, eccentricity, projected));
        }
        let Some(best_distance) = scored.iter().map(|&(_, d, _)| d).min() else {
            return Ok(Vec::new());
        };
        let most_projected = scored
            .iter()
            .filter(|&&(_, d, _)| d == best_distance)
            .map(|&(_, _, p)| p)
            .max()
            .unwrap_or(0);
        Ok(scored
            .into_iter()
            .filter(|&(_, d, p)| d == best_distance && p == most_projected)
            .map(|(r, _, _)| r)
            .collect())
    }
}
