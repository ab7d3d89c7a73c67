#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::client::SerperClient;
    use crate::error::SerperError;
    use crate::retry::RetryPolicy;
    use crate::types::SearchRequest;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default()
            .with_initial_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(5))
    }

    fn create_client(server: &MockServer) -> SerperClient {
        SerperClient::new("test-key".to_owned(), &server.uri())
            .unwrap()
            .with_retry_policy(fast_policy())
    }

    fn ok_body() -> serde_json::Value {
        serde_json::json!({
            "organic": [
                {
                    "title": "Acme Logística - Soluções em comércio exterior",
                    "link": "https://www.acme.com.br/",
                    "snippet": "Consultoria em importação",
                    "position": 1
                },
                { "title": "Sem snippet", "link": "https://beta.com.br" }
            ]
        })
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let server = MockServer::start().await;
        let client = create_client(&server);

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "test-key"))
            .and(body_partial_json(serde_json::json!({"q": "logística", "gl": "br", "hl": "pt-br"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let results = client.search(&SearchRequest::new("logística", 10)).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].position, Some(1));
        assert_eq!(results[1].snippet, "");
        assert_eq!(results[1].position, None);
    }

    #[tokio::test]
    async fn test_missing_organic_is_empty() {
        let server = MockServer::start().await;
        let client = create_client(&server);

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let results = client.search(&SearchRequest::new("x", 10)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_retry_on_429_then_success() {
        let server = MockServer::start().await;
        let client = create_client(&server);

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let results = client.search(&SearchRequest::new("x", 10)).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_retry_on_503_then_success() {
        let server = MockServer::start().await;
        let client = create_client(&server);

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let results = client.search(&SearchRequest::new("x", 10)).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_no_retry_on_401() {
        let server = MockServer::start().await;
        let client = create_client(&server);

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.search(&SearchRequest::new("x", 10)).await.unwrap_err();
        assert!(matches!(err, SerperError::HttpStatus { code: 401, .. }));
        let err_msg = err.to_string();
        assert!(err_msg.contains("401"));
        assert!(err_msg.contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_all_retries_exhausted() {
        let server = MockServer::start().await;
        let client = create_client(&server);

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client.search(&SearchRequest::new("x", 10)).await.unwrap_err();
        assert!(matches!(err, SerperError::RetriesExhausted(_)));
        let err_msg = err.to_string();
        assert!(err_msg.contains("503"));
        assert!(err_msg.contains("Service Unavailable"));
    }

    #[tokio::test]
    async fn test_attempts_follow_policy() {
        let server = MockServer::start().await;
        let client = SerperClient::new("test-key".to_owned(), &server.uri())
            .unwrap()
            .with_retry_policy(fast_policy().with_max_attempts(5));

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .expect(5)
            .mount(&server)
            .await;

        assert!(client.search(&SearchRequest::new("x", 10)).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_retried() {
        let server = MockServer::start().await;
        let client = create_client(&server);

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.search(&SearchRequest::new("x", 10)).await.unwrap_err();
        assert!(matches!(err, SerperError::JsonParse { .. }));
    }

    #[test]
    fn debug_masks_api_key() {
        let client = SerperClient::new("secret-key".to_owned(), "http://localhost/").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert_eq!(client.base_url(), "http://localhost");
    }
}
