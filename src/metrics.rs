use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::lexicon::Lexicon;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and expose static gauges with the
    /// lexicon dimensions.
    pub fn init(lexicon: &Lexicon) -> Self {
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!("sentify_analyses_total", "Texts analyzed by the local engine.");
        describe_counter!("sentify_ai_hits_total", "Analyses where the AI adapter answered.");

        gauge!("sentify_lexicon_words").set(lexicon.word_count() as f64);
        gauge!("sentify_lexicon_phrases").set(lexicon.phrase_count() as f64);
        gauge!("sentify_lexicon_emoticons").set(lexicon.emoticon_count() as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
