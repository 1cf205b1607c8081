//! Verify path resolution against JSON test vectors stored in `test-vectors/`.
//!
//! Each case gives a base URL, ordered segments and query pairs, and either
//! the exact URL expected or the error kind expected. Every case is resolved twice, through the free
//! resolver and through a client, and both must be byte-identical.

use rest_core::path::{append_query, parse_base, resolve};
use rest_core::{ApiError, Client, ClientConfig};

fn strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn path_test_vectors() {
    let raw = include_str!("../../test-vectors/paths.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let base = case["base"].as_str().unwrap();
        let segments = strings(&case["segments"]);
        let query: Vec<(String, String)> = case["query"]
            .as_array()
            .unwrap()
            .iter()
            .map(|pair| {
                let pair = strings(pair);
                (pair[0].clone(), pair[1].clone())
            })
            .collect();
        let query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let parsed = parse_base(base).unwrap();
        let client = Client::new(ClientConfig::new(base, "sk_test")).unwrap();

        if let Some(kind) = case["error"].as_str() {
            assert_eq!(kind, "InvalidSegment", "{name}: unknown error kind");
            let err = resolve(&parsed, &segments).unwrap_err();
            assert!(matches!(err, ApiError::InvalidSegment(_)), "{name}: resolver");
            let err = client.url_for(&segments, &query).unwrap_err();
            assert!(matches!(err, ApiError::InvalidSegment(_)), "{name}: client");
            continue;
        }
        let expected = case["expected"].as_str().unwrap();

        // Free resolver
        let mut url = resolve(&parsed, &segments).unwrap();
        append_query(&mut url, &query);
        assert_eq!(url.as_str(), expected, "{name}: resolver");

        // Through a client, twice
        let first = client.url_for(&segments, &query).unwrap();
        let second = client.url_for(&segments, &query).unwrap();
        assert_eq!(first.as_str(), expected, "{name}: client");
        assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes(), "{name}: idempotent");
    }
}
