use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Writes by entity (user, post, comment, reaction) and outcome.
    pub static ref ENTITY_WRITES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "entity_writes_total",
        "Entity writes segmented by entity and result",
        &["entity", "result"]
    )
    .expect("failed to register entity_writes_total");
}

pub fn record_write(entity: &str, ok: bool) {
    let result = if ok { "success" } else { "error" };
    ENTITY_WRITES_TOTAL
        .with_label_values(&[entity, result])
        .inc();
}
