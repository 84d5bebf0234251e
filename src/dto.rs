use brew_macro::dto;
use serde_json::Value;

use crate::service;

pub const DEFAULT_NUM_RESULTS: u32 = 10;

pub const QUERY_REQUIRED: &str = "query parameter is required";
pub const NUM_RESULTS_INVALID: &str = "num_results must be a positive integer";
pub const GENERATE_FIELDS_REQUIRED: &str = "profile, tone, and yourContext are required";

/// Raw `/api/search` query string, before validation.
#[dto(request, clone)]
#[derive(Default)]
pub struct SearchParams {
    pub query: Option<String>,
    #[serde(alias = "numResults")]
    pub num_results: Option<String>,
}

/// Validated search, also the query string sent to upstream `GET /search`.
#[dto(request, clone)]
#[derive(PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub num_results: u32,
}

impl SearchParams {
    pub fn validate(self) -> service::Result<SearchRequest> {
        let query = match self.query {
            Some(query) if !query.trim().is_empty() => query,
            _ => return Err(service::Error::Validation(QUERY_REQUIRED.into())),
        };

        let num_results = match self.num_results.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_NUM_RESULTS,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(service::Error::Validation(NUM_RESULTS_INVALID.into())),
            },
        };

        Ok(SearchRequest { query, num_results })
    }
}

#[dto(request, clone)]
#[derive(Default)]
pub struct ListProfilesParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

/// Raw `/api/generate-message` body. Every field is optional so that missing
/// ones surface as a validation error rather than a deserialization failure.
#[dto(request, clone)]
#[derive(Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMessageBody {
    #[serde(default)]
    pub profile: Option<Value>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub your_context: Option<String>,
}

#[dto(request, clone)]
#[derive(PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMessageRequest {
    /// Opaque to the gateway; upstream defines its shape.
    pub profile: Value,
    pub tone: String,
    pub your_context: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl GenerateMessageBody {
    pub fn validate(self) -> service::Result<GenerateMessageRequest> {
        let profile = self.profile.filter(Value::is_object);
        match (profile, non_blank(self.tone), non_blank(self.your_context)) {
            (Some(profile), Some(tone), Some(your_context)) => Ok(GenerateMessageRequest {
                profile,
                tone,
                your_context,
            }),
            _ => Err(service::Error::Validation(GENERATE_FIELDS_REQUIRED.into())),
        }
    }
}

impl GenerateMessageRequest {
    pub fn profile_name(&self) -> Option<&str> {
        self.profile.get("name").and_then(Value::as_str)
    }
}

#[dto(response, clone)]
#[derive(PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: Box<str>,
    pub message: Box<str>,
    pub upstream_url: Box<str>,
}

impl HealthResponse {
    pub fn ok(upstream_url: &str) -> Self {
        Self {
            status: "OK".into(),
            message: "Brew API is running!".into(),
            upstream_url: upstream_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(query: Option<&str>, num_results: Option<&str>) -> SearchParams {
        SearchParams {
            query: query.map(Into::into),
            num_results: num_results.map(Into::into),
        }
    }

    fn assert_validation(result: service::Result<impl std::fmt::Debug>, expected: &str) {
        match result {
            Err(service::Error::Validation(message)) => assert_eq!(&*message, expected),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn search_defaults_to_ten_results() {
        let request = params(Some("data scientist"), None).validate().unwrap();
        assert_eq!(
            request,
            SearchRequest {
                query: "data scientist".into(),
                num_results: 10,
            }
        );
    }

    #[test]
    fn search_keeps_query_verbatim() {
        let request = params(Some("  rust  "), Some("3")).validate().unwrap();
        assert_eq!(request.query, "  rust  ");
        assert_eq!(request.num_results, 3);
    }

    #[test]
    fn search_requires_query() {
        assert_validation(params(None, None).validate(), QUERY_REQUIRED);
        assert_validation(params(Some(""), None).validate(), QUERY_REQUIRED);
        assert_validation(params(Some(" \t "), Some("5")).validate(), QUERY_REQUIRED);
    }

    #[test]
    fn search_rejects_non_positive_counts() {
        for raw in ["0", "-3", "ten", "2.5"] {
            assert_validation(params(Some("x"), Some(raw)).validate(), NUM_RESULTS_INVALID);
        }
    }

    #[test]
    fn generate_requires_all_fields() {
        let complete = || GenerateMessageBody {
            profile: Some(json!({ "name": "B" })),
            tone: Some("casual".into()),
            your_context: Some("engineer".into()),
        };

        assert!(complete().validate().is_ok());
        assert_validation(
            GenerateMessageBody { profile: None, ..complete() }.validate(),
            GENERATE_FIELDS_REQUIRED,
        );
        assert_validation(
            GenerateMessageBody { profile: Some(Value::Null), ..complete() }.validate(),
            GENERATE_FIELDS_REQUIRED,
        );
        assert_validation(
            GenerateMessageBody { profile: Some(json!("B")), ..complete() }.validate(),
            GENERATE_FIELDS_REQUIRED,
        );
        assert_validation(
            GenerateMessageBody { tone: Some(" ".into()), ..complete() }.validate(),
            GENERATE_FIELDS_REQUIRED,
        );
        assert_validation(
            GenerateMessageBody { your_context: None, ..complete() }.validate(),
            GENERATE_FIELDS_REQUIRED,
        );
    }

    #[test]
    fn generate_request_uses_camel_case_on_the_wire() {
        let body: GenerateMessageBody = serde_json::from_value(json!({
            "profile": { "name": "B", "position": "Engineer" },
            "tone": "casual",
            "yourContext": "engineer",
        }))
        .unwrap();
        let request = body.validate().unwrap();
        assert_eq!(request.profile_name(), Some("B"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "profile": { "name": "B", "position": "Engineer" },
                "tone": "casual",
                "yourContext": "engineer",
            })
        );
    }

    #[test]
    fn health_response_shape() {
        assert_eq!(
            serde_json::to_value(HealthResponse::ok("http://127.0.0.1:8000")).unwrap(),
            json!({
                "status": "OK",
                "message": "Brew API is running!",
                "upstreamUrl": "http://127.0.0.1:8000",
            })
        );
    }
}
