//! Prometheus metrics: a process-wide registry plus the domain counters
//! the dashboards actually watch.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

pub struct ApiMetrics {
    registry: Registry,
    pub ratings_submitted: Counter,
    pub comments_created: Counter,
    pub comments_removed: Counter,
    pub favorites_toggled: Counter,
}

impl ApiMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let ratings_submitted = Counter::default();
        registry.register(
            "brewlog_ratings_submitted",
            "Quick ratings accepted (insert or upsert)",
            ratings_submitted.clone(),
        );

        let comments_created = Counter::default();
        registry.register(
            "brewlog_comments_created",
            "Comments accepted",
            comments_created.clone(),
        );

        let comments_removed = Counter::default();
        registry.register(
            "brewlog_comments_removed",
            "Comments soft-deleted",
            comments_removed.clone(),
        );

        let favorites_toggled = Counter::default();
        registry.register(
            "brewlog_favorites_toggled",
            "Favorite toggles applied",
            favorites_toggled.clone(),
        );

        Self {
            registry,
            ratings_submitted,
            comments_created,
            comments_removed,
            favorites_toggled,
        }
    }

    /// OpenMetrics text exposition.
    pub fn render(&self) -> String {
        let mut buffer = String::new();
        if let Err(err) = encode(&mut buffer, &self.registry) {
            tracing::warn!(%err, "metrics encoding failed");
        }
        buffer
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_the_exposition() {
        let metrics = ApiMetrics::new();
        metrics.ratings_submitted.inc();
        let text = metrics.render();
        assert!(text.contains("brewlog_ratings_submitted_total 1"));
    }
}
