//! Query construction
//!
//! Builds complete query_range URLs from a metric's PromQL template, a pod
//! id and a time window. Templates are parsed once into literal segments
//! and explicit pod-matcher placeholders, so substitution cannot corrupt
//! unrelated parts of the query text.

use crate::metrics::MetricDefinition;
use crate::window::TimeWindow;

/// Placeholder value marking a pod-matching predicate in a raw template.
const PLACEHOLDER: &str = "POD_NAME";

/// Labels a placeholder may bind, e.g. `pod_name=POD_NAME`.
const POD_LABELS: [&str; 2] = ["pod_name", "pod"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    /// A `label=POD_NAME` predicate, rendered as a regex-equality clause.
    PodMatcher { label: &'static str },
}

/// A PromQL template parsed into literal and placeholder parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    parts: Vec<TemplatePart>,
}

impl QueryTemplate {
    /// Parse a raw template, locating every `label=POD_NAME` token.
    pub fn parse(raw: &str) -> Self {
        let mut parts = Vec::new();
        let mut rest = raw;
        loop {
            let next = POD_LABELS
                .iter()
                .filter_map(|label| {
                    let token = format!("{label}={PLACEHOLDER}");
                    rest.find(&token).map(|at| (at, *label, token.len()))
                })
                .min_by_key(|(at, _, _)| *at);
            match next {
                Some((at, label, token_len)) => {
                    if at > 0 {
                        parts.push(TemplatePart::Literal(rest[..at].to_string()));
                    }
                    parts.push(TemplatePart::PodMatcher { label });
                    rest = &rest[at + token_len..];
                }
                None => {
                    if !rest.is_empty() {
                        parts.push(TemplatePart::Literal(rest.to_string()));
                    }
                    break;
                }
            }
        }
        Self { parts }
    }

    /// Render the template with every placeholder bound to the given
    /// pod-matching regex.
    pub fn render(&self, pod_matcher: &str) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                TemplatePart::Literal(text) => text.clone(),
                TemplatePart::PodMatcher { label } => format!("{label}=~'{pod_matcher}'"),
            })
            .collect()
    }
}

/// One fetch unit of work: a (pod, metric) pair and its prepared URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTask {
    pub pod_id: String,
    pub metric: String,
    pub url: String,
}

/// Regex matching the underlying container names for a pod id.
///
/// Ids carry a fixed 3-character prefix that the container naming scheme
/// omits; it is stripped before embedding. This is a convention of the
/// external id-generation scheme, not a general rule.
pub fn pod_matcher_regex(pod_id: &str) -> String {
    let stripped = pod_id.get(3..).unwrap_or("");
    format!("anaconda-app-{stripped}-.*")
}

// Minimal, template-specific escaping the upstream endpoint expects:
// whitespace runs collapse to single spaces, spaces become %20 and double
// quotes %22. Not general URL encoding.
fn encode_query(query: &str) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(' ', "%20").replace('"', "%22")
}

/// Serialize a complete query_range URL for one (pod, metric) pair.
pub fn build_url(
    base_api: &str,
    metric: &MetricDefinition,
    pod_id: &str,
    window: &TimeWindow,
    step: &str,
) -> String {
    let query = metric.template().render(&pod_matcher_regex(pod_id));
    format!(
        "{}/query_range?query={}&start={}&end={}&step={}",
        base_api.trim_end_matches('/'),
        encode_query(&query),
        window.start_param(),
        window.end_param(),
        step
    )
}

/// Build the fetch task for one (pod, metric) pair.
pub fn build_task(
    base_api: &str,
    metric: &MetricDefinition,
    pod_id: &str,
    window: &TimeWindow,
    step: &str,
) -> QueryTask {
    QueryTask {
        pod_id: pod_id.to_string(),
        metric: metric.name().to_string(),
        url: build_url(base_api, metric, pod_id, window, step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricRegistry;
    use chrono::DateTime;

    fn fixed_window() -> TimeWindow {
        TimeWindow {
            start: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
            end: DateTime::from_timestamp(1_600_010_800, 0).unwrap(),
        }
    }

    #[test]
    fn test_parse_splits_on_placeholder() {
        let template = QueryTemplate::parse("metric{pod_name=POD_NAME, other=\"x\"}");
        assert_eq!(
            template.parts,
            vec![
                TemplatePart::Literal("metric{".to_string()),
                TemplatePart::PodMatcher { label: "pod_name" },
                TemplatePart::Literal(", other=\"x\"}".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_pod_label_variant() {
        let template = QueryTemplate::parse("rate(x{pod=POD_NAME}[1m])");
        assert_eq!(
            template.render("anaconda-app-123-.*"),
            "rate(x{pod=~'anaconda-app-123-.*'}[1m])"
        );
    }

    #[test]
    fn test_render_substitutes_regex_clause() {
        let template = QueryTemplate::parse("x{pod_name=POD_NAME}");
        assert_eq!(
            template.render("anaconda-app-123-.*"),
            "x{pod_name=~'anaconda-app-123-.*'}"
        );
    }

    #[test]
    fn test_pod_matcher_strips_prefix() {
        assert_eq!(pod_matcher_regex("abc123"), "anaconda-app-123-.*");
        assert_eq!(pod_matcher_regex("ab"), "anaconda-app--.*");
    }

    #[test]
    fn test_url_is_deterministic() {
        let registry = MetricRegistry::builtin();
        let metric = registry.get("cpu_usage").unwrap();
        let window = fixed_window();
        let first = build_url("https://api.example.com", metric, "abc123", &window, "10s");
        let second = build_url("https://api.example.com", metric, "abc123", &window, "10s");
        assert_eq!(first, second);
    }

    #[test]
    fn test_url_has_no_unencoded_whitespace_or_quotes() {
        let registry = MetricRegistry::builtin();
        let window = fixed_window();
        for name in registry.names() {
            let metric = registry.get(name).unwrap();
            let url = build_url("https://api.example.com", metric, "abc123", &window, "10s");
            assert!(!url.contains(' '), "url for {} contains a space", name);
            assert!(!url.contains('\n'), "url for {} contains a newline", name);
            assert!(!url.contains('"'), "url for {} contains a quote", name);
        }
    }

    #[test]
    fn test_url_shape() {
        let registry = MetricRegistry::builtin();
        let metric = registry.get("memory_usage").unwrap();
        let url = build_url("https://api.example.com/", metric, "abc123", &fixed_window(), "10s");
        assert!(url.starts_with("https://api.example.com/query_range?query=sum%20by(container_name)"));
        assert!(url.contains("pod_name=~'anaconda-app-123-.*'"));
        assert!(url.contains("job=%22kubelet%22"));
        assert!(url.contains("&start=2020-09-13T12:26:40.000000Z"));
        assert!(url.contains("&end=2020-09-13T15:26:40.000000Z"));
        assert!(url.ends_with("&step=10s"));
    }

    #[test]
    fn test_builtin_templates_all_contain_a_matcher() {
        let registry = MetricRegistry::builtin();
        for name in registry.names() {
            let rendered = registry
                .get(name)
                .unwrap()
                .template()
                .render("anaconda-app-123-.*");
            assert!(
                rendered.contains("=~'anaconda-app-123-.*'"),
                "template {} did not bind the pod matcher",
                name
            );
            assert!(!rendered.contains(PLACEHOLDER));
        }
    }
}
