//! The multiple-reference-points translation engine.
//!
//! Translation is a depth-first walk of the query graph from a chosen start
//! relation, usually the query subject. The walk keeps a stack of traversed
//! hops; whenever it lands on a reference point the stack drains into typed
//! clause fragments, so every join and condition ends up attached to the
//! reference point the final sentence anchors it to. Grouping, having and
//! ordering chains are recorded out of band and rendered as trailing
//! sentences.

use std::collections::{HashSet, VecDeque};

use log::{debug, info, trace};
use petgraph::graph::NodeIndex;

use crate::query_graph::{Edge, GraphError, Node, QueryGraph};

use super::clause_builder::{ClauseBuilder, NodeRef};
use super::errors::TranslateError;

/// Single-use translation engine. Holds the traversal state for one sentence;
/// [`MrpTranslator::translate`] consumes it so stale state can never leak
/// into a second run.
pub struct MrpTranslator<'g> {
    graph: &'g QueryGraph,
    reference_points: Vec<NodeIndex>,
    visited: HashSet<NodeIndex>,
    path: VecDeque<(NodeIndex, NodeIndex)>,
    group_by: Vec<String>,
    having_clauses: Vec<String>,
    order_by: Vec<NodeIndex>,
}

/// Translates the graph into one English sentence, starting the walk at
/// `start`.
pub fn translate(graph: &QueryGraph, start: &Node) -> Result<String, TranslateError> {
    MrpTranslator::new(graph)?.translate(start)
}

/// Like [`translate`], starting from the graph's own query subject.
pub fn translate_from_subject(graph: &QueryGraph) -> Result<String, TranslateError> {
    let subjects = graph.query_subjects()?;
    let Some(&subject) = subjects.first() else {
        return Err(GraphError::InvariantViolation(
            "graph has no query subject to start from".to_string(),
        )
        .into());
    };
    MrpTranslator::new(graph)?.translate_index(subject)
}

impl<'g> MrpTranslator<'g> {
    pub fn new(graph: &'g QueryGraph) -> Result<Self, TranslateError> {
        let reference_points = graph.reference_points()?;
        debug!(
            "'{}': {} reference points over {} nodes",
            graph.name,
            reference_points.len(),
            graph.node_count()
        );
        Ok(MrpTranslator {
            graph,
            reference_points,
            visited: HashSet::new(),
            path: VecDeque::new(),
            group_by: Vec::new(),
            having_clauses: Vec::new(),
            order_by: Vec::new(),
        })
    }

    pub fn translate(self, start: &Node) -> Result<String, TranslateError> {
        let start_ix = self
            .graph
            .index_of(start)
            .ok_or_else(|| GraphError::UnknownNode(start.label().to_string()))?;
        self.translate_index(start_ix)
    }

    fn translate_index(mut self, start: NodeIndex) -> Result<String, TranslateError> {
        info!(
            "translating '{}' from '{}'",
            self.graph.name,
            self.graph.label_of(start)
        );
        let builder = self.visit(start, None, None)?;
        let mut text = format!("Find {}", builder.render());
        if !self.group_by.is_empty() {
            text.push_str(". Create group according to ");
            text.push_str(&self.group_by.join(" and "));
        }
        if !self.having_clauses.is_empty() {
            if self.group_by.is_empty() {
                return Err(TranslateError::HavingWithoutGrouping(
                    self.having_clauses.join(" and "),
                ));
            }
            text.push_str(". Consider only groups whose ");
            text.push_str(&self.having_clauses.join(" and "));
        }
        if !self.order_by.is_empty() {
            let labels: Vec<&str> = self
                .order_by
                .iter()
                .map(|&ix| self.graph.label_of(ix))
                .collect();
            text.push_str(" order by ");
            text.push_str(&labels.join(" and "));
        }
        text.push('.');
        Ok(tidy_sentence(&text))
    }

    /// One step of the walk. Returns the clause fragments contributed by `v`
    /// and everything reached through it.
    fn visit(
        &mut self,
        v: NodeIndex,
        reference_point: Option<NodeIndex>,
        parent: Option<NodeIndex>,
    ) -> Result<ClauseBuilder, TranslateError> {
        let g = self.graph;
        trace!("visit '{}'", g.label_of(v));
        let mut builder = ClauseBuilder::new();
        self.visited.insert(v);
        if let Some(p) = parent {
            if g.has_path(p, v) {
                self.path.push_back((p, v));
            }
        }

        let mut next_rp = reference_point;
        if self.reference_points.contains(&v) {
            let prev_rp = reference_point;
            next_rp = Some(v);
            self.arrive_at_reference_point(&mut builder, v, prev_rp)?;
        }

        let mut scheduled: Vec<NodeIndex> = Vec::new();
        for (dst, edge) in g.out_edges(v) {
            match edge {
                Edge::Grouping { .. } => {
                    if !self.visited.contains(&dst) {
                        self.record_grouping_chain(v, dst);
                    }
                }
                Edge::Order { .. } => {
                    if !self.visited.contains(&dst) {
                        self.record_order_chain(dst);
                    }
                }
                Edge::Having { .. } => {
                    if !self.visited.contains(&dst) {
                        self.record_having(dst)?;
                    }
                }
                _ if self.visited.contains(&dst) => {
                    // A visited attribute may still lead on to a relation the
                    // walk has not reached, e.g. through a shared join chain.
                    if edge.is_selection() {
                        if let Some(found) = self.skip_to_unvisited_relation(dst)? {
                            scheduled.push(found);
                        }
                    }
                }
                _ => scheduled.push(dst),
            }
        }

        while let Some(child) = scheduled.pop() {
            if self.visited.contains(&child) {
                continue;
            }
            let child_builder = self.visit(child, next_rp, Some(v))?;
            builder.combine(child_builder);
        }
        Ok(builder)
    }

    /// Drains the hop stack into clause fragments once the walk reaches a
    /// reference point. Projecting reference points pull the stack toward
    /// themselves (newest hop first); bare connectors hand their hops to the
    /// previous reference point in discovery order.
    fn arrive_at_reference_point(
        &mut self,
        builder: &mut ClauseBuilder,
        v: NodeIndex,
        prev_rp: Option<NodeIndex>,
    ) -> Result<(), TranslateError> {
        let g = self.graph;
        let projected = g.projected_attributes(v)?;
        for &attr in &projected {
            let aggregate = g.aggregate_of(attr)?;
            let aggregate_phrase = aggregate.map(|f| g.label_of(f).to_string());
            builder.add_projection(self.node_ref(v), g.label_of(attr), aggregate_phrase);
            self.visited.insert(attr);
            if let Some(f) = aggregate {
                self.visited.insert(f);
            }
        }

        if self.path.is_empty() {
            return self.collect_restrictions(builder, v, v);
        }

        if !projected.is_empty() {
            while let Some((x, y)) = self.path.pop_back() {
                if !g.node_at(y).is_relation() {
                    continue;
                }
                let label = g
                    .edge_between(y, x)
                    .or_else(|| g.edge_between(x, y))
                    .map(|e| e.label().to_string())
                    .unwrap_or_default();
                builder.add_join_condition(
                    self.node_ref(v),
                    self.node_ref(y),
                    label,
                    self.node_ref(x),
                    true,
                );
                if prev_rp != Some(y) {
                    self.collect_restrictions(builder, v, y)?;
                }
            }
        } else {
            let anchor = prev_rp.unwrap_or(v);
            while let Some((x, y)) = self.path.pop_front() {
                if !g.node_at(y).is_relation() {
                    continue;
                }
                let label = g
                    .edge_between(x, y)
                    .map(|e| e.label().to_string())
                    .unwrap_or_default();
                builder.add_join_condition(
                    self.node_ref(anchor),
                    self.node_ref(x),
                    label,
                    self.node_ref(y),
                    false,
                );
                if prev_rp != Some(y) {
                    self.collect_restrictions(builder, anchor, y)?;
                }
            }
        }
        Ok(())
    }

    /// Turns every selection predicate hanging off `relation` into a
    /// condition fragment keyed to `rp`. Predicates against another
    /// relation's attribute are either a correlation back into an
    /// already-described relation ("its ...") or an unsupported nested
    /// subquery.
    fn collect_restrictions(
        &mut self,
        builder: &mut ClauseBuilder,
        rp: NodeIndex,
        relation: NodeIndex,
    ) -> Result<(), TranslateError> {
        let g = self.graph;
        for (attr, edge) in g.out_edges(relation) {
            if !edge.is_selection() || !g.node_at(attr).is_attribute() {
                continue;
            }
            for (operand, predicate) in g.out_edges(attr) {
                let Some(operator) = predicate.operator() else {
                    continue;
                };
                match g.node_at(operand) {
                    Node::Value(_) => {
                        builder.add_selection(
                            self.node_ref(rp),
                            self.node_ref(relation),
                            g.label_of(attr),
                            operator.phrase(),
                            g.label_of(operand),
                        );
                        self.visited.insert(attr);
                        self.visited.insert(operand);
                    }
                    Node::Attribute(_) | Node::Function(_) => {
                        // Symmetric predicates are join plumbing; the hop
                        // stack already covers them.
                        let symmetric = g
                            .edge_between(operand, attr)
                            .map(Edge::is_predicate)
                            .unwrap_or(false);
                        if symmetric {
                            continue;
                        }
                        let owner = g.owning_relation(operand);
                        match owner {
                            Some(o) if o == relation || self.visited.contains(&o) => {
                                builder.add_selection(
                                    self.node_ref(rp),
                                    self.node_ref(relation),
                                    g.label_of(attr),
                                    operator.phrase(),
                                    format!("its {}", g.label_of(operand)),
                                );
                                self.visited.insert(attr);
                                self.visited.insert(operand);
                            }
                            _ => {
                                return Err(TranslateError::UnsupportedFeature(format!(
                                    "condition on '{}' compares against '{}' of a relation \
                                     outside the sentence (nested subquery)",
                                    g.label_of(attr),
                                    g.label_of(operand)
                                )));
                            }
                        }
                    }
                    Node::Relation(_) => {
                        return Err(GraphError::InvariantViolation(format!(
                            "predicate from '{}' targets relation '{}'",
                            g.label_of(attr),
                            g.label_of(operand)
                        ))
                        .into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks a single-successor chain of unvisited nodes from a visited
    /// attribute, looking for the relation it connects on to.
    fn skip_to_unvisited_relation(
        &self,
        start: NodeIndex,
    ) -> Result<Option<NodeIndex>, TranslateError> {
        let g = self.graph;
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut current = start;
        loop {
            if !seen.insert(current) {
                return Ok(None);
            }
            let unvisited: Vec<NodeIndex> = g
                .out_edges(current)
                .iter()
                .map(|(dst, _)| *dst)
                .filter(|dst| !self.visited.contains(dst))
                .collect();
            match unvisited.len() {
                0 => return Ok(None),
                1 => {
                    let next = unvisited[0];
                    if g.node_at(next).is_relation() {
                        return Ok(Some(next));
                    }
                    current = next;
                }
                _ => {
                    return Err(GraphError::InvariantViolation(format!(
                        "'{}' branches to several unvisited nodes",
                        g.label_of(current)
                    ))
                    .into());
                }
            }
        }
    }

    /// Records a `relation group by a1 group by a2 ...` chain. Grouped
    /// attributes are consumed here, not traversed.
    fn record_grouping_chain(&mut self, relation: NodeIndex, first: NodeIndex) {
        let g = self.graph;
        let relation_label = g.label_of(relation).to_string();
        let mut current = first;
        loop {
            self.visited.insert(current);
            let text = if relation_label.is_empty() {
                g.label_of(current).to_string()
            } else {
                format!("{} of {}", g.label_of(current), relation_label)
            };
            self.group_by.push(text);
            let next = g
                .out_edges(current)
                .iter()
                .find(|(_, e)| matches!(e, Edge::Grouping { .. }))
                .map(|(dst, _)| *dst);
            match next {
                Some(n) if !self.visited.contains(&n) => current = n,
                _ => break,
            }
        }
    }

    fn record_order_chain(&mut self, first: NodeIndex) {
        let g = self.graph;
        let mut current = first;
        loop {
            self.visited.insert(current);
            self.order_by.push(current);
            let next = g
                .out_edges(current)
                .iter()
                .find(|(_, e)| matches!(e, Edge::Order { .. }))
                .map(|(dst, _)| *dst);
            match next {
                Some(n) if !self.visited.contains(&n) => current = n,
                _ => break,
            }
        }
    }

    /// Records a having condition: the attribute's aggregate (if any)
    /// compared against a literal.
    fn record_having(&mut self, attr: NodeIndex) -> Result<(), TranslateError> {
        let g = self.graph;
        self.visited.insert(attr);
        let aggregate = g.aggregate_of(attr)?;
        let predicate_source = match aggregate {
            Some(f) => {
                self.visited.insert(f);
                f
            }
            None => attr,
        };
        let predicate = g
            .out_edges(predicate_source)
            .iter()
            .find_map(|(dst, e)| e.operator().map(|op| (*dst, op)));
        let Some((operand, operator)) = predicate else {
            return Err(GraphError::InvariantViolation(format!(
                "having attribute '{}' carries no predicate",
                g.label_of(attr)
            ))
            .into());
        };
        if !g.node_at(operand).is_value() {
            return Err(TranslateError::UnsupportedFeature(format!(
                "having condition on '{}' compares against a non-literal operand",
                g.label_of(attr)
            )));
        }
        self.visited.insert(operand);
        let mut text = String::new();
        if let Some(f) = aggregate {
            text.push_str(g.label_of(f));
            text.push(' ');
        }
        text.push_str(&format!(
            "{} {} {}",
            g.label_of(attr),
            operator.phrase(),
            g.label_of(operand)
        ));
        self.having_clauses.push(text);
        Ok(())
    }

    fn node_ref(&self, ix: NodeIndex) -> NodeRef {
        let node = self.graph.node_at(ix);
        NodeRef::new(node.signature(), node.label())
    }
}

/// Collapses space runs and drops spaces left behind by empty labels before
/// punctuation.
fn tidy_sentence(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == ' ' && out.ends_with(' ') {
            continue;
        }
        if (ch == ',' || ch == '.') && out.ends_with(' ') {
            out.pop();
        }
        out.push(ch);
    }
    out.trim().to_string()
}
