//! Shared query-graph fixtures modeled on a university course-review schema.

use queryspeak::{FunctionKind, Node, Operator, QueryGraph};

/// Select-project-join query over seven relations: course titles together
/// with student, comment and instructor details, restricted to CS courses
/// offered in spring.
pub fn course_review_query() -> QueryGraph {
    let comments = Node::relation("Comments", "comments");
    let students = Node::relation("Students", "students");
    let student_history = Node::relation("StudentHistory", "");
    let departments = Node::relation("Departments", "departments");
    let courses = Node::relation("Courses", "courses");
    let course_sched = Node::relation("CourseSched", "");
    let instructors = Node::relation("Instructors", "instructors");

    let text = Node::attribute("text", "description");
    let rating = Node::attribute("rating", "rating");
    let gpa = Node::attribute("gpa", "gpa");
    let s_name = Node::attribute("s_name", "name");
    let class = Node::attribute("class", "class");
    let term = Node::attribute("term", "term");
    let i_name = Node::attribute("i_name", "name");
    let d_name = Node::attribute("d_name", "name");
    let title = Node::attribute("title", "title");

    let v3 = Node::value("3");
    let v2011 = Node::value("2011");
    let v_spring = Node::value("spring");
    let v_cs = Node::value("CS");

    let mut g = QueryGraph::new("course reviews");
    g.connect_membership(&comments, &text).expect("membership");
    g.connect_selection(&comments, &rating).expect("selection");
    g.connect_predicate(&rating, &v3, Operator::GreaterThan)
        .expect("predicate");
    g.connect_simplified_join(&comments, &students, "are given by", "gave")
        .expect("join");
    g.connect_membership(&students, &gpa).expect("membership");
    g.connect_membership(&students, &s_name).expect("membership");
    g.connect_selection(&students, &class).expect("selection");
    g.connect_predicate(&class, &v2011, Operator::Equal)
        .expect("predicate");
    g.connect_simplified_join(&courses, &course_sched, "are taught by", "")
        .expect("join");
    g.connect_selection(&course_sched, &term).expect("selection");
    g.connect_predicate(&term, &v_spring, Operator::Equal)
        .expect("predicate");
    g.connect_simplified_join(&course_sched, &instructors, "", "teach")
        .expect("join");
    g.connect_membership(&instructors, &i_name).expect("membership");
    g.connect_simplified_join(&courses, &departments, "are offered", "offer")
        .expect("join");
    g.connect_selection(&departments, &d_name).expect("selection");
    g.connect_predicate(&d_name, &v_cs, Operator::Equal)
        .expect("predicate");
    g.connect_simplified_join(&students, &student_history, "have taken", "")
        .expect("join");
    g.connect_simplified_join(&student_history, &courses, "", "taken by")
        .expect("join");
    g.connect_membership(&courses, &title).expect("membership");
    g
}

/// Aggregation query: maximum grade per year and term, restricted to groups
/// with an average grade above 3.
pub fn grade_summary_query() -> QueryGraph {
    let history = Node::relation("StudentHistory", "student history");

    let grade_p = Node::attribute("grade_p", "grade");
    let year_g = Node::attribute("year_g", "year");
    let term_g = Node::attribute("term_g", "term");
    let year_p = Node::attribute("year_p", "year");
    let term_p = Node::attribute("term_p", "term");
    let grade_h = Node::attribute("grade_h", "grade");

    let max = Node::function(FunctionKind::Max);
    let avg = Node::function(FunctionKind::Avg);
    let v3 = Node::value("3");

    let mut g = QueryGraph::new("grade summary");
    g.connect_membership(&history, &grade_p).expect("membership");
    g.connect_transformation(&max, &grade_p)
        .expect("transformation");
    g.connect_grouping(&history, &year_g).expect("grouping");
    g.connect_grouping(&year_g, &term_g).expect("grouping");
    g.connect_membership(&history, &year_p).expect("membership");
    g.connect_membership(&history, &term_p).expect("membership");
    g.connect_having(&history, &grade_h).expect("having");
    g.connect_transformation(&grade_h, &avg)
        .expect("transformation");
    g.connect_predicate(&avg, &v3, Operator::GreaterThan)
        .expect("predicate");
    g
}

/// Same shape as [`grade_summary_query`] but without any grouping, which
/// makes the having condition unanswerable.
pub fn having_without_grouping_query() -> QueryGraph {
    let history = Node::relation("StudentHistory", "student history");
    let grade_p = Node::attribute("grade_p", "grade");
    let grade_h = Node::attribute("grade_h", "grade");
    let avg = Node::function(FunctionKind::Avg);
    let v3 = Node::value("3");

    let mut g = QueryGraph::new("having without grouping");
    g.connect_membership(&history, &grade_p).expect("membership");
    g.connect_having(&history, &grade_h).expect("having");
    g.connect_transformation(&grade_h, &avg)
        .expect("transformation");
    g.connect_predicate(&avg, &v3, Operator::GreaterThan)
        .expect("predicate");
    g
}

/// Correlation query: one relation compared against its own attribute.
pub fn over_budget_movies_query() -> QueryGraph {
    let movies = Node::relation("Movies", "movies");
    let title = Node::attribute("title", "title");
    let budget = Node::attribute("budget", "budget");
    let revenue = Node::attribute("revenue", "revenue");

    let mut g = QueryGraph::new("over-budget movies");
    g.connect_membership(&movies, &title).expect("membership");
    g.connect_selection(&movies, &budget).expect("selection");
    g.connect_predicate(&budget, &revenue, Operator::GreaterThan)
        .expect("predicate");
    g.connect_selection(&movies, &revenue).expect("selection");
    g
}

/// Projection with a sort attribute.
pub fn ordered_movies_query() -> QueryGraph {
    let movies = Node::relation("Movies", "movies");
    let title = Node::attribute("title", "title");
    let year = Node::attribute("year", "year");

    let mut g = QueryGraph::new("ordered movies");
    g.connect_membership(&movies, &title).expect("membership");
    g.connect_order(&movies, &year).expect("order");
    g
}

/// Membership test against an attribute of a relation the sentence never
/// describes, i.e. a nested subquery.
pub fn nested_membership_query() -> QueryGraph {
    let students = Node::relation("Students", "students");
    let enrollments = Node::relation("Enrollments", "enrollments");
    let name = Node::attribute("name", "name");
    let sid = Node::attribute("sid", "id");
    let e_sid = Node::attribute("e_sid", "student id");

    let mut g = QueryGraph::new("nested membership");
    g.connect_membership(&students, &name).expect("membership");
    g.connect_selection(&students, &sid).expect("selection");
    g.connect_predicate(&sid, &e_sid, Operator::NotIn)
        .expect("predicate");
    g.connect_selection(&enrollments, &e_sid).expect("selection");
    g
}
