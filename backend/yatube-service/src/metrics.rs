//! Prometheus metrics for yatube-service.
//!
//! Collectors register with the default registry on first use; `/metrics`
//! renders everything in text format.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Posts published through the create form.
    pub static ref POSTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "yatube_posts_created_total",
        "Posts created"
    )
    .expect("failed to register yatube_posts_created_total");

    /// Comments added to posts.
    pub static ref COMMENTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "yatube_comments_created_total",
        "Comments created"
    )
    .expect("failed to register yatube_comments_created_total");

    /// Index page cache lookups by outcome (hit/miss/error).
    pub static ref INDEX_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "yatube_index_cache_events_total",
        "Index page cache lookups segmented by outcome",
        &["event"]
    )
    .expect("failed to register yatube_index_cache_events_total");
}

pub fn record_cache_event(event: &str) {
    INDEX_CACHE_EVENTS.with_label_values(&[event]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn exposes_registered_counters() {
        POSTS_CREATED_TOTAL.inc();
        record_cache_event("miss");

        let resp = serve_metrics().await;
        assert!(resp.status().is_success());
        let body = to_bytes(resp.into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("yatube_posts_created_total"));
        assert!(body.contains("yatube_index_cache_events_total{event=\"miss\"}"));
    }
}
