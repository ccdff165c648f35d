//! `Set-Cookie` parsing for the login handshake

use std::collections::HashMap;

/// Split `Set-Cookie` header values into their `name=value` pairs
///
/// Attributes after the first `;` are dropped. Header values folded into one
/// line with `,` are split apart again; the fragments that folding leaves
/// behind (e.g. the tail of an `Expires` date) carry no `=` and are skipped.
pub(crate) fn cookie_pairs<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    headers
        .into_iter()
        .flat_map(|header| header.split(','))
        .filter_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            pair.contains('=').then(|| pair.to_string())
        })
        .collect()
}

/// Parse `Set-Cookie` header values into a name to value map
///
/// Names and values are percent-decoded. A value that does not decode to
/// valid UTF-8 is kept as sent.
pub(crate) fn parse_cookies<'a>(headers: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    cookie_pairs(headers)
        .iter()
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (decode(name).trim_start().to_string(), decode(value)))
        .collect()
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_attributes_are_dropped() {
        let cookies = parse_cookies(["student_session_credentials=abc; path=/; HttpOnly"]);

        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["student_session_credentials"], "abc");
    }

    #[test]
    fn test_percent_encoded_json_is_decoded() {
        let header = "parent_session_credentials=%7B%22session_id%22%3A%22xyz%22%7D; path=/";
        let cookies = parse_cookies([header]);

        assert_eq!(cookies["parent_session_credentials"], r#"{"session_id":"xyz"}"#);
    }

    #[test]
    fn test_folded_headers_with_expires() {
        let header = "a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT; path=/, b=2; path=/";
        let cookies = parse_cookies([header]);

        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn test_multiple_header_values() {
        let pairs = cookie_pairs(["a=1; path=/", "b=2; secure", "garbage"]);

        assert_eq!(pairs, vec!["a=1".to_string(), "b=2".to_string()]);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let cookies = parse_cookies(["token=abc==; path=/"]);

        assert_eq!(cookies["token"], "abc==");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        // Property: whatever attributes follow the pair, only the pair survives
        #[test]
        fn prop_attributes_never_leak(
            name in "[a-z_]{1,16}",
            value in "[A-Za-z0-9]{0,24}",
            attrs in prop::collection::vec("[A-Za-z]{1,8}(=[A-Za-z0-9/]{1,8})?", 0..4),
        ) {
            let mut header = format!("{}={}", name, value);
            for attr in &attrs {
                header.push_str("; ");
                header.push_str(attr);
            }

            let cookies = parse_cookies([header.as_str()]);

            prop_assert_eq!(cookies.len(), 1);
            prop_assert_eq!(cookies.get(&name), Some(&value));
        }
    }
}
