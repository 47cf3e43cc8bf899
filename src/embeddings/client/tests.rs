use super::*;
use crate::config::{DEFAULT_API_VERSION, EmbeddingConfig};

fn test_config() -> EmbeddingConfig {
    EmbeddingConfig {
        endpoint: Url::parse("https://example.openai.azure.com/").expect("valid url"),
        api_key: "secret".to_string(),
        api_version: DEFAULT_API_VERSION.to_string(),
        deployment: "ada-002".to_string(),
    }
}

#[test]
fn builds_deployment_url_with_api_version() {
    let client = EmbeddingClient::new(&test_config()).expect("can create client");

    assert_eq!(client.url.path(), "/openai/deployments/ada-002/embeddings");
    assert_eq!(client.url.query(), Some("api-version=2023-05-15"));
}

#[test]
fn builder_methods() {
    let client = EmbeddingClient::new(&test_config())
        .expect("can create client")
        .with_timeout(std::time::Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn response_with_missing_data_field_decodes_to_empty() {
    let response: EmbedResponse =
        serde_json::from_str(r#"{"object": "list"}"#).expect("defensive decode");
    assert!(response.data.is_empty());
}

#[test]
fn response_decodes_embedding_vector() {
    let response: EmbedResponse = serde_json::from_str(
        r#"{"object":"list","data":[{"object":"embedding","embedding":[0.1,-0.2,0.3],"index":0}]}"#,
    )
    .expect("response decodes");

    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].embedding, vec![0.1, -0.2, 0.3]);
}
