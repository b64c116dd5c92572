use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    /// Ranking queries served, by target (comment, post) and mode.
    pub static ref RANKING_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ranking_queries_total",
        "Total ranking queries segmented by target, mode and result",
        &["target", "mode", "result"]
    )
    .expect("failed to register ranking_queries_total");

    /// Gateway time spent per ranking query.
    pub static ref RANKING_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "ranking_query_duration_seconds",
        "Ranking query duration segmented by target and mode",
        &["target", "mode"]
    )
    .expect("failed to register ranking_query_duration_seconds");

    /// Row size of returned ranking pages.
    pub static ref RANKING_PAGE_SIZE: HistogramVec = register_histogram_vec!(
        "ranking_page_rows",
        "Number of rows returned per ranking page",
        &["target"],
        vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]
    )
    .expect("failed to register ranking_page_rows");
}

pub fn record_query(target: &str, mode: &str, ok: bool, elapsed_secs: f64) {
    let result = if ok { "success" } else { "error" };
    RANKING_QUERIES_TOTAL
        .with_label_values(&[target, mode, result])
        .inc();
    RANKING_QUERY_DURATION_SECONDS
        .with_label_values(&[target, mode])
        .observe(elapsed_secs);
}

pub fn record_page(target: &str, rows: usize) {
    RANKING_PAGE_SIZE
        .with_label_values(&[target])
        .observe(rows as f64);
}
