use queryspeak::{translate, translate_from_subject, GraphError, Node, TranslateError};

use super::fixtures;
use super::init_logging;

#[test]
fn select_project_join_query_reads_reference_point_by_reference_point() -> anyhow::Result<()> {
    init_logging();
    let g = fixtures::course_review_query();
    let sentence = translate(&g, &Node::relation("Courses", "courses"))?;
    assert_eq!(
        sentence,
        "Find the title of courses in which courses taken by and courses are offered departments \
         and courses are taught by where name of departments is CS and term is spring, \
         and also the gpa and name of students in which students have taken where class is 2011, \
         and also the description of comments in which comments are given by students \
         where rating is greater than 3, \
         and also the name of instructors in which instructors teach."
    );
    Ok(())
}

#[test]
fn query_subject_of_course_review_graph_is_courses() {
    init_logging();
    let g = fixtures::course_review_query();
    let subjects = g.query_subjects().expect("query subjects");
    assert_eq!(subjects.len(), 1);
    assert_eq!(g.label_of(subjects[0]), "courses");
}

#[test]
fn translate_from_subject_matches_explicit_start() {
    init_logging();
    let g = fixtures::course_review_query();
    let explicit = translate(&g, &Node::relation("Courses", "courses")).expect("translation");
    let implicit = translate_from_subject(&g).expect("translation");
    assert_eq!(explicit, implicit);
}

#[test]
fn grouping_and_having_render_as_trailing_sentences() -> anyhow::Result<()> {
    init_logging();
    let g = fixtures::grade_summary_query();
    let sentence = translate(&g, &Node::relation("StudentHistory", "student history"))?;
    assert_eq!(
        sentence,
        "Find the maximum grade, year, and term of student history. \
         Create group according to year of student history and term of student history. \
         Consider only groups whose average grade is greater than 3."
    );
    Ok(())
}

#[test]
fn having_without_grouping_is_rejected() {
    init_logging();
    let g = fixtures::having_without_grouping_query();
    let err = translate(&g, &Node::relation("StudentHistory", "student history"))
        .expect_err("having without grouping must fail");
    assert!(matches!(err, TranslateError::HavingWithoutGrouping(_)));
}

#[test]
fn correlated_condition_reads_as_its_attribute() {
    init_logging();
    let g = fixtures::over_budget_movies_query();
    let sentence = translate(&g, &Node::relation("Movies", "movies")).expect("translation");
    assert_eq!(
        sentence,
        "Find the title of movies where budget is greater than its revenue."
    );
}

#[test]
fn order_attribute_renders_after_the_body() {
    init_logging();
    let g = fixtures::ordered_movies_query();
    let sentence = translate(&g, &Node::relation("Movies", "movies")).expect("translation");
    assert_eq!(sentence, "Find the title of movies order by year.");
}

#[test]
fn nested_subquery_is_reported_as_unsupported() {
    init_logging();
    let g = fixtures::nested_membership_query();
    let err = translate(&g, &Node::relation("Students", "students"))
        .expect_err("nested subquery must fail");
    assert!(matches!(err, TranslateError::UnsupportedFeature(_)));
}

#[test]
fn unknown_start_node_is_reported() {
    init_logging();
    let g = fixtures::ordered_movies_query();
    let err = translate(&g, &Node::relation("Actors", "actors"))
        .expect_err("unknown start must fail");
    assert!(matches!(
        err,
        TranslateError::Graph(GraphError::UnknownNode(_))
    ));
}

#[test]
fn translation_is_deterministic_across_runs() {
    init_logging();
    let first = translate(
        &fixtures::course_review_query(),
        &Node::relation("Courses", "courses"),
    )
    .expect("translation");
    let second = translate(
        &fixtures::course_review_query(),
        &Node::relation("Courses", "courses"),
    )
    .expect("translation");
    assert_eq!(first, second);
}

#[test]
fn reference_points_cover_every_projecting_relation() {
    init_logging();
    let g = fixtures::course_review_query();
    let points = g.reference_points().expect("reference points");
    let labels: Vec<&str> = points.iter().map(|&ix| g.label_of(ix)).collect();
    for projecting in ["comments", "students", "courses", "instructors"] {
        assert!(
            labels.contains(&projecting),
            "'{projecting}' missing from {labels:?}"
        );
    }
    // The two unlabeled connector relations qualify as branching points.
    assert_eq!(points.len(), 6);
}
