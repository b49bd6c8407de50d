//! Integration tests for the HTTP job API client against a mock server.

use jobdeck_client::{ClientConfig, HttpJobApi};
use jobdeck_core::{FetchError, JobApi};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpJobApi {
    HttpJobApi::new(ClientConfig::new(format!("{}/api/data", server.uri())))
        .expect("Failed to create client")
}

#[tokio::test]
async fn test_search_sends_query_param_and_decodes_items() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "public": true,
        "sorted": false,
        "jobItems": [
            {
                "id": 1,
                "badgeLetters": "RE",
                "title": "React Engineer",
                "company": "Acme",
                "daysAgo": 2,
                "relevanceScore": 91
            },
            {
                "id": 2,
                "badgeLetters": "FE",
                "title": "Frontend Dev",
                "company": "Globex",
                "daysAgo": 11,
                "relevanceScore": 40
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(query_param("search", "react"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let items = api_for(&mock_server).search("react").await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, 1);
    assert_eq!(items[1].company, "Globex");
}

#[tokio::test]
async fn test_search_encodes_spaces_in_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(query_param("search", "senior rust"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "jobItems": [] })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let items = api_for(&mock_server).search("senior rust").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_job_item_fetches_by_id() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "public": true,
        "jobItem": {
            "id": 77,
            "title": "Platform Engineer",
            "daysAgo": 5,
            "relevanceScore": 60,
            "description": "Build things",
            "qualifications": ["Rust", "Tokio"],
            "reviews": ["Great team"],
            "duration": "Full-Time",
            "location": "Remote",
            "salary": "$150,000+",
            "coverImgURL": "https://img.example/77.png",
            "companyURL": "https://acme.example"
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/data/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let item = api_for(&mock_server).job_item(77).await.unwrap();

    assert_eq!(item.id, 77);
    assert_eq!(item.qualifications.len(), 2);
    assert_eq!(item.cover_img_url, "https://img.example/77.png");
}

#[tokio::test]
async fn test_non_2xx_surfaces_description_as_remote_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data/999"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "description": "Job item not found" })),
        )
        .mount(&mock_server)
        .await;

    let err = api_for(&mock_server).job_item(999).await.unwrap_err();

    assert_eq!(
        err,
        FetchError::Remote {
            status: 404,
            description: "Job item not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_non_2xx_without_json_body_uses_status_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let err = api_for(&mock_server).search("rust").await.unwrap_err();

    match err {
        FetchError::Remote {
            status,
            description,
        } => {
            assert_eq!(status, 503);
            assert_eq!(description, "Service Unavailable");
        }
        other => panic!("Expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": "nope" })),
        )
        .mount(&mock_server)
        .await;

    let err = api_for(&mock_server).search("rust").await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Port 1 is reserved and never bound in the test environment.
    let api = HttpJobApi::new(ClientConfig::new("http://127.0.0.1:1").with_timeout_seconds(2))
        .expect("Failed to create client");

    let err = api.search("rust").await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "got {:?}", err);
}
