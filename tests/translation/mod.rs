//! End-to-end translation tests: build a query graph, translate it, compare
//! the full English sentence.

mod fixtures;
mod mrp_tests;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
