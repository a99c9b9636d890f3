//! Accumulates typed clause fragments during traversal and renders them into
//! one English body once the walk is complete.
//!
//! Fragments are keyed by reference point so that everything said about one
//! anchor relation (its projections, the joins that reach it, the conditions
//! restricting it) renders as a single contiguous segment, in the order the
//! traversal discovered it.

use log::debug;

/// A rendered handle on a graph node: its identity key plus display label.
/// Labels may legitimately be empty (connector relations), so matching always
/// goes through the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub key: String,
    pub label: String,
}

impl NodeRef {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        NodeRef {
            key: key.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct ProjectionEntry {
    relation: NodeRef,
    attribute: String,
    aggregate: Option<String>,
}

#[derive(Debug, Clone)]
struct SelectionEntry {
    reference_point: NodeRef,
    relation: NodeRef,
    attribute: String,
    operator_phrase: String,
    value: String,
}

#[derive(Debug, Clone)]
struct JoinEntry {
    reference_point: NodeRef,
    relation1: NodeRef,
    edge_label: String,
    relation2: NodeRef,
    /// True when relation1 is itself the reference point the entry belongs
    /// to; false for connector hops keyed to the previous reference point.
    owner_has_projection: bool,
}

/// Clause accumulator. One builder instance exists per traversal; child
/// traversals merge into their parent with [`ClauseBuilder::combine`].
#[derive(Debug, Default)]
pub struct ClauseBuilder {
    projections: Vec<ProjectionEntry>,
    selections: Vec<SelectionEntry>,
    join_conditions: Vec<JoinEntry>,
    /// Fully pre-rendered fragments, appended verbatim after the segments.
    sentences: Vec<String>,
}

impl ClauseBuilder {
    pub fn new() -> Self {
        ClauseBuilder::default()
    }

    pub fn add_projection(
        &mut self,
        relation: NodeRef,
        attribute: impl Into<String>,
        aggregate: Option<String>,
    ) {
        self.projections.push(ProjectionEntry {
            relation,
            attribute: attribute.into(),
            aggregate,
        });
    }

    pub fn add_selection(
        &mut self,
        reference_point: NodeRef,
        relation: NodeRef,
        attribute: impl Into<String>,
        operator_phrase: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.selections.push(SelectionEntry {
            reference_point,
            relation,
            attribute: attribute.into(),
            operator_phrase: operator_phrase.into(),
            value: value.into(),
        });
    }

    pub fn add_join_condition(
        &mut self,
        reference_point: NodeRef,
        relation1: NodeRef,
        edge_label: impl Into<String>,
        relation2: NodeRef,
        owner_has_projection: bool,
    ) {
        self.join_conditions.push(JoinEntry {
            reference_point,
            relation1,
            edge_label: edge_label.into(),
            relation2,
            owner_has_projection,
        });
    }

    pub fn add_sentence(&mut self, sentence: impl Into<String>) {
        self.sentences.push(sentence.into());
    }

    /// Appends every fragment of `other`, preserving its internal order.
    pub fn combine(&mut self, other: ClauseBuilder) {
        self.projections.extend(other.projections);
        self.selections.extend(other.selections);
        self.join_conditions.extend(other.join_conditions);
        self.sentences.extend(other.sentences);
    }

    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
            && self.selections.is_empty()
            && self.join_conditions.is_empty()
            && self.sentences.is_empty()
    }

    /// Renders all accumulated fragments. Each pass picks the next anchor
    /// (the first remaining projection's relation, else the first remaining
    /// selection's or join's reference point), drains everything keyed to it
    /// and emits one segment; segments join with ", and also".
    pub fn render(mut self) -> String {
        let mut segments: Vec<String> = Vec::new();

        while !self.projections.is_empty()
            || !self.selections.is_empty()
            || !self.join_conditions.is_empty()
        {
            let target = if let Some(p) = self.projections.first() {
                p.relation.clone()
            } else if let Some(s) = self.selections.first() {
                s.reference_point.clone()
            } else {
                let j = &self.join_conditions[0];
                if j.owner_has_projection {
                    j.relation1.clone()
                } else {
                    j.reference_point.clone()
                }
            };
            debug!("rendering segment for '{}'", target.key);

            let mut segment = String::new();

            let projected: Vec<ProjectionEntry> =
                drain_where(&mut self.projections, |p| p.relation.key == target.key);
            if !projected.is_empty() {
                let phrases: Vec<String> = projected
                    .iter()
                    .map(|p| match &p.aggregate {
                        Some(agg) => format!("{} {}", agg, p.attribute),
                        None => p.attribute.clone(),
                    })
                    .collect();
                segment.push_str("the ");
                segment.push_str(&join_by_comma_and(&phrases));
                if !target.label.is_empty() {
                    segment.push_str(" of ");
                    segment.push_str(&target.label);
                }
            }

            let joins: Vec<JoinEntry> = drain_where(&mut self.join_conditions, |j| {
                if j.owner_has_projection {
                    j.relation1.key == target.key
                } else {
                    j.reference_point.key == target.key
                }
            });
            for (i, j) in joins.iter().enumerate() {
                segment.push_str(if i == 0 { " in which " } else { " and " });
                segment.push_str(&format!(
                    "{} {} {}",
                    j.relation1.label, j.edge_label, j.relation2.label
                ));
            }

            let mut conditions: Vec<SelectionEntry> =
                drain_where(&mut self.selections, |s| {
                    s.reference_point.key == target.key
                });
            // Conditions on other relations read first, then the reference
            // point's own.
            conditions.sort_by_key(|s| s.relation.key == target.key);
            for (i, s) in conditions.iter().enumerate() {
                segment.push_str(if i == 0 { " where " } else { " and " });
                let cross = s.relation.key != target.key && !s.relation.label.is_empty();
                if cross {
                    segment.push_str(&format!(
                        "{} of {} {} {}",
                        s.attribute, s.relation.label, s.operator_phrase, s.value
                    ));
                } else {
                    segment.push_str(&format!(
                        "{} {} {}",
                        s.attribute, s.operator_phrase, s.value
                    ));
                }
            }

            segments.push(segment);
        }

        let body = segments.join(", and also ");
        if self.sentences.is_empty() {
            body
        } else if body.is_empty() {
            self.sentences.join(", and ")
        } else {
            format!("{}, and {}", body, self.sentences.join(", and "))
        }
    }
}

/// Stable drain of every element matching the predicate.
fn drain_where<T>(items: &mut Vec<T>, mut matches: impl FnMut(&T) -> bool) -> Vec<T> {
    let mut drained = Vec::new();
    let mut i = 0;
    while i < items.len() {
        if matches(&items[i]) {
            drained.push(items.remove(i));
        } else {
            i += 1;
        }
    }
    drained
}

/// Natural-language list: "a", "a and b", "a, b, and c".
pub fn join_by_comma_and(items: &[String]) -> String {
    match items.len() {
        0 => String::new(),
        1 => items[0].clone(),
        2 => format!("{} and {}", items[0], items[1]),
        _ => {
            let head = &items[..items.len() - 1];
            format!("{}, and {}", head.join(", "), items[items.len() - 1])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(key: &str) -> NodeRef {
        NodeRef::new(key, key)
    }

    #[test]
    fn comma_and_lists() {
        let items: Vec<String> = ["gpa", "name"].iter().map(|s| s.to_string()).collect();
        assert_eq!(join_by_comma_and(&items[..1]), "gpa");
        assert_eq!(join_by_comma_and(&items), "gpa and name");
        let three: Vec<String> = ["grade", "year", "term"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(join_by_comma_and(&three), "grade, year, and term");
    }

    #[test]
    fn projection_only_segment() {
        let mut b = ClauseBuilder::new();
        b.add_projection(node("movies"), "title", None);
        assert_eq!(b.render(), "the title of movies");
    }

    #[test]
    fn aggregate_prefixes_attribute() {
        let mut b = ClauseBuilder::new();
        b.add_projection(node("history"), "grade", Some("maximum".to_string()));
        b.add_projection(node("history"), "year", None);
        assert_eq!(b.render(), "the maximum grade and year of history");
    }

    #[test]
    fn selection_renders_after_joins() {
        let mut b = ClauseBuilder::new();
        b.add_projection(node("students"), "name", None);
        b.add_join_condition(
            node("students"),
            node("students"),
            "have taken",
            NodeRef::new("history", ""),
            true,
        );
        b.add_selection(node("students"), node("students"), "class", "is", "2011");
        assert_eq!(
            b.render(),
            "the name of students in which students have taken  where class is 2011"
        );
    }

    #[test]
    fn cross_relation_condition_comes_first_with_of_phrase() {
        let mut b = ClauseBuilder::new();
        b.add_projection(node("courses"), "title", None);
        b.add_selection(node("courses"), node("courses"), "level", "is", "graduate");
        b.add_selection(
            node("courses"),
            node("departments"),
            "name",
            "is",
            "CS",
        );
        assert_eq!(
            b.render(),
            "the title of courses where name of departments is CS and level is graduate"
        );
    }

    #[test]
    fn separate_reference_points_join_with_and_also() {
        let mut b = ClauseBuilder::new();
        b.add_projection(node("students"), "name", None);
        b.add_projection(node("comments"), "description", None);
        assert_eq!(
            b.render(),
            "the name of students, and also the description of comments"
        );
    }

    #[test]
    fn empty_relation_label_omits_of_phrase() {
        let mut b = ClauseBuilder::new();
        b.add_projection(node("courses"), "title", None);
        b.add_selection(
            node("courses"),
            NodeRef::new("coursesched", ""),
            "term",
            "is",
            "spring",
        );
        assert_eq!(b.render(), "the title of courses where term is spring");
    }

    #[test]
    fn pre_rendered_sentences_append_after_segments() {
        let mut b = ClauseBuilder::new();
        b.add_projection(node("movies"), "title", None);
        b.add_sentence("actors appear in them");
        assert_eq!(b.render(), "the title of movies, and actors appear in them");
    }

    #[test]
    fn combine_preserves_child_order() {
        let mut parent = ClauseBuilder::new();
        parent.add_projection(node("a"), "x", None);
        let mut child = ClauseBuilder::new();
        child.add_projection(node("b"), "y", None);
        child.add_projection(node("b"), "z", None);
        parent.combine(child);
        assert_eq!(
            parent.render(),
            "the x of a, and also the y and z of b"
        );
    }
}
