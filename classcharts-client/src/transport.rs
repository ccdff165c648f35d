//! HTTP transport shared by both personas

use crate::error::{ApiError, ClassChartsError};
use crate::options::Query;
use crate::session::Session;
use reqwest::header::{AUTHORIZATION, COOKIE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use zeroize::Zeroize;

/// One call against an API base (`apiv2parent` or `apiv2student`)
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub method: Method,
    /// Slash-separated path below the API base, e.g. `homeworks/42`
    pub path: String,
    pub query: Query,
    pub form: Option<Query>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Query::new(),
            form: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Query::new(),
            form: None,
        }
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn form(mut self, form: Query) -> Self {
        self.form = Some(form);
        self
    }

    /// Overwrite form values in place; forms carry passwords
    fn wipe_form(&mut self) {
        if let Some(form) = &mut self.form {
            for (_, value) in form.iter_mut() {
                value.zeroize();
            }
        }
    }
}

impl Drop for ApiRequest {
    fn drop(&mut self) {
        self.wipe_form();
    }
}

/// Blocking HTTP client bound to one ClassCharts site
#[derive(Clone, Debug)]
pub(crate) struct Transport {
    client: reqwest::blocking::Client,
    base_url: reqwest::Url,
}

impl Transport {
    pub fn new(client: reqwest::blocking::Client, base_url: reqwest::Url) -> Self {
        Self { client, base_url }
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }

    /// Build `<base>/<segments...>` from the site root
    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<reqwest::Url, ClassChartsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClassChartsError::ClientInit("Cannot modify base URL path".to_string()))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    /// Post a login form without any session material
    ///
    /// The caller inspects the raw response, since success is a redirect.
    /// The form borrows the caller's secrets instead of copying them.
    pub fn post_login(
        &self,
        persona: &str,
        form: &[(&str, &str)],
    ) -> Result<reqwest::blocking::Response, ClassChartsError> {
        let url = self.url([persona, "login"])?;
        log::debug!("POST {}", url.path());
        Ok(self.client.post(url).form(form).send()?)
    }

    /// Create a sensitive `Authorization` header value from a session id
    ///
    /// The temporary string is zeroized after use.
    fn create_auth_header(session_id: &str) -> Result<HeaderValue, ClassChartsError> {
        let mut auth_string = format!("Basic {}", session_id);
        let header_value = HeaderValue::from_bytes(auth_string.as_bytes())
            .map_err(|_| ClassChartsError::ClientInit("Invalid session ID format".to_string()));
        auth_string.zeroize();

        let mut sensitive_header = header_value?;
        sensitive_header.set_sensitive(true);
        Ok(sensitive_header)
    }

    fn create_cookie_header(session: &Session) -> Result<Option<HeaderValue>, ClassChartsError> {
        if session.auth_cookies.is_empty() {
            return Ok(None);
        }
        let mut cookie_string = session
            .auth_cookies
            .iter()
            .map(|cookie| cookie.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let header_value = HeaderValue::from_bytes(cookie_string.as_bytes())
            .map_err(|_| ClassChartsError::ClientInit("Invalid session cookie format".to_string()));
        cookie_string.zeroize();

        let mut sensitive_header = header_value?;
        sensitive_header.set_sensitive(true);
        Ok(Some(sensitive_header))
    }

    /// Issue an authenticated request and decode its JSON body
    ///
    /// Single attempt; no retries.
    pub fn execute<T: DeserializeOwned>(
        &self,
        api_base: &str,
        session: &Session,
        request: &ApiRequest,
    ) -> Result<T, ClassChartsError> {
        let url = self.url(std::iter::once(api_base).chain(request.path.split('/')))?;
        log::debug!("{} {}", request.method, url.path());

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, Self::create_auth_header(&session.session_id)?);

        if let Some(cookie_header) = Self::create_cookie_header(session)? {
            builder = builder.header(COOKIE, cookie_header);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;

        Ok(parse_payload(status, &body)?)
    }
}

/// `success` of `0` or `false`
fn is_upstream_failure(value: &Value) -> bool {
    match value.get("success") {
        Some(Value::Bool(success)) => !success,
        Some(success) => success.as_i64() == Some(0),
        None => false,
    }
}

/// Drop `null` object members so they decode like missing keys
///
/// Every payload struct defaults missing fields, so an upstream `null` ends
/// up as the field's default (`None` for optional fields).
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Decode a response body, surfacing upstream failures first
///
/// A `success: 0` (or `false`) payload wins over the HTTP status, because
/// ClassCharts reports its own error message that way.
pub(crate) fn parse_payload<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let malformed = |source| ApiError::MalformedPayload {
        body: body.to_string(),
        source,
    };

    let mut value: Value = serde_json::from_str(body).map_err(malformed)?;

    if is_upstream_failure(&value) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return Err(ApiError::Upstream(message.to_string()));
    }

    if !status.is_success() {
        return Err(ApiError::InvalidStatus { status });
    }

    strip_nulls(&mut value);
    serde_json::from_value(value).map_err(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityResponse, BadgesResponse, HomeworksResponse, LessonsResponse};
    use proptest::prelude::*;

    #[test]
    fn test_parse_success_payload() {
        let body = r#"{"success": 1, "data": [{"id": 3, "name": "Star"}], "meta": []}"#;
        let response: BadgesResponse = parse_payload(StatusCode::OK, body).unwrap();

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].name, "Star");
    }

    #[test]
    fn test_upstream_error_message_is_surfaced() {
        let body = r#"{"success": 0, "error": "Session expired", "data": {}, "meta": {}}"#;
        let err = parse_payload::<Value>(StatusCode::OK, body).unwrap_err();

        assert!(matches!(&err, ApiError::Upstream(message) if message == "Session expired"));
        assert_eq!(err.to_string(), "Session expired");
    }

    #[test]
    fn test_upstream_error_without_message() {
        let err = parse_payload::<Value>(StatusCode::OK, r#"{"success": 0}"#).unwrap_err();
        assert!(matches!(&err, ApiError::Upstream(message) if message == "Unknown error"));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = parse_payload::<Value>(StatusCode::OK, "<html>Not JSON</html>").unwrap_err();

        assert!(matches!(&err, ApiError::MalformedPayload { body, .. } if body == "<html>Not JSON</html>"));
        assert!(err.to_string().starts_with("Error parsing JSON. Returned response:"));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let body = r#"{"success": 1, "data": {"not": "a list"}, "meta": []}"#;
        let err = parse_payload::<BadgesResponse>(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, ApiError::MalformedPayload { .. }));
    }

    #[test]
    fn test_upstream_error_with_boolean_flag() {
        let body = r#"{"success": false, "error": "disabled"}"#;
        let err = parse_payload::<BadgesResponse>(StatusCode::OK, body).unwrap_err();
        assert!(matches!(&err, ApiError::Upstream(message) if message == "disabled"));

        let body = r#"{"success": true, "data": [], "meta": []}"#;
        let response: BadgesResponse = parse_payload(StatusCode::OK, body).unwrap();
        assert_eq!(response.success, 1);
    }

    #[test]
    fn test_null_members_decode_as_defaults() {
        let body = r#"{"success": 1, "error": null,
            "data": [{"lesson_name": "Break", "is_break": true, "room_name": null,
                      "teacher_name": null, "note": null, "pupil_note_raw": null}],
            "meta": {"dates": null, "periods": [{"number": "1", "start_time": null}]}}"#;
        let lessons: LessonsResponse = parse_payload(StatusCode::OK, body).unwrap();
        assert_eq!(lessons.data[0].lesson_name, "Break");
        assert_eq!(lessons.data[0].room_name, "");
        assert!(lessons.meta.dates.is_empty());
        assert_eq!(lessons.meta.periods[0].start_time, "");

        let body = r#"{"success": 1,
            "data": [{"id": 1, "reason": null, "badges": null, "polarity": null,
                      "style": {"border_color": null}}],
            "meta": {"last_id": null}}"#;
        let activity: ActivityResponse = parse_payload(StatusCode::OK, body).unwrap();
        assert_eq!(activity.data[0].id, 1);
        assert_eq!(activity.data[0].reason, "");
        assert!(activity.data[0].polarity.is_none());

        let body = r#"{"success": 1,
            "data": [{"id": 9, "title": null, "description": null,
                      "status": {"ticked": null, "state": null, "attachments": null}}],
            "meta": {"display_type": null}}"#;
        let homeworks: HomeworksResponse = parse_payload(StatusCode::OK, body).unwrap();
        assert_eq!(homeworks.data[0].title, "");
        assert!(homeworks.data[0].status.attachments.is_empty());
    }

    #[test]
    fn test_form_values_are_wiped() {
        let mut request = ApiRequest::post("password").form(vec![("new", "hunter2".to_string())]);
        request.wipe_form();
        assert_eq!(request.form, Some(vec![("new", String::new())]));
    }

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::post("purchase/9").form(vec![("pupil_id", "4".to_string())]);

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "purchase/9");
        assert!(request.query.is_empty());
        assert_eq!(request.form, Some(vec![("pupil_id", "4".to_string())]));
    }

    #[test]
    fn test_auth_header_is_sensitive() {
        let header = Transport::create_auth_header("abc123").unwrap();

        assert!(header.is_sensitive());
        assert_eq!(header.to_str().unwrap(), "Basic abc123");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        // Property: a well-formed success envelope with an error status is an InvalidStatus
        #[test]
        fn prop_error_status_with_success_envelope(
            status_code in prop::sample::select(vec![400u16, 401, 403, 404, 429, 500, 502, 503]),
        ) {
            let status = StatusCode::from_u16(status_code).unwrap();
            let result = parse_payload::<Value>(status, r#"{"success": 1, "data": [], "meta": []}"#);

            match result {
                Err(ApiError::InvalidStatus { status }) => prop_assert_eq!(status.as_u16(), status_code),
                other => prop_assert!(false, "Expected InvalidStatus, got {:?}", other),
            }
        }

        // Property: success 0 is reported as upstream error whatever the status
        #[test]
        fn prop_upstream_error_wins_over_status(
            status_code in prop::sample::select(vec![200u16, 400, 401, 403, 500]),
            message in "[A-Za-z ]{1,40}",
        ) {
            let status = StatusCode::from_u16(status_code).unwrap();
            let body = serde_json::json!({"success": 0, "error": message}).to_string();
            let result = parse_payload::<Value>(status, &body);

            prop_assert!(matches!(result, Err(ApiError::Upstream(ref m)) if *m == message));
        }
    }
}
