//! Wire types for the explore and multiline endpoints.
//!
//! Both endpoints prefix their JSON body with an anti-hijacking guard
//! (`)]}'` or `)]}',`); [`strip_json_guard`] removes it before parsing.

use serde::Deserialize;

/// Drops everything before the first `{`.
///
/// Bodies without a `{` are returned unchanged so the JSON parser reports a
/// meaningful error.
#[must_use]
pub fn strip_json_guard(body: &str) -> &str {
    body.find('{').map_or(body, |start| &body[start..])
}

// ---------------------------------------------------------------------------
// explore
// ---------------------------------------------------------------------------

/// Response of `/trends/api/explore`: `{ "widgets": [ ... ] }`.
#[derive(Debug, Deserialize)]
pub struct ExploreResponse {
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// One widget descriptor. Only the `TIMESERIES` widget is used.
#[derive(Debug, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Opaque request object echoed back to the widget data endpoint.
    #[serde(default)]
    pub request: Option<serde_json::Value>,
}

impl ExploreResponse {
    /// The interest-over-time widget, when present with a token and request.
    #[must_use]
    pub fn timeseries_widget(&self) -> Option<(&str, &serde_json::Value)> {
        self.widgets
            .iter()
            .find(|w| w.id == "TIMESERIES")
            .and_then(|w| Some((w.token.as_deref()?, w.request.as_ref()?)))
    }
}

// ---------------------------------------------------------------------------
// widgetdata/multiline
// ---------------------------------------------------------------------------

/// Response of `/trends/api/widgetdata/multiline`: `{ "default": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct MultilineResponse {
    pub default: MultilineData,
}

#[derive(Debug, Deserialize)]
pub struct MultilineData {
    #[serde(rename = "timelineData", default)]
    pub timeline_data: Vec<TimelinePoint>,
}

/// One sample; `value` holds one score per requested keyword.
#[derive(Debug, Deserialize)]
pub struct TimelinePoint {
    /// Unix seconds, sent as a string.
    pub time: String,
    #[serde(default)]
    pub value: Vec<u32>,
    #[serde(rename = "isPartial", default)]
    pub is_partial: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_json_guard_removes_prefix() {
        assert_eq!(strip_json_guard(")]}'\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_json_guard(")]}',\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn strip_json_guard_leaves_plain_body() {
        assert_eq!(strip_json_guard("not json"), "not json");
    }

    #[test]
    fn timeseries_widget_requires_token_and_request() {
        let explore: ExploreResponse = serde_json::from_value(serde_json::json!({
            "widgets": [
                { "id": "GEO_MAP", "token": "geo", "request": {} },
                { "id": "TIMESERIES", "token": null, "request": {} }
            ]
        }))
        .expect("parse");
        assert!(explore.timeseries_widget().is_none());
    }

    #[test]
    fn timeline_point_defaults_partial_flag() {
        let point: TimelinePoint =
            serde_json::from_value(serde_json::json!({ "time": "1686441600", "value": [45] }))
                .expect("parse");
        assert!(!point.is_partial);
        assert_eq!(point.value, vec![45]);
    }
}
