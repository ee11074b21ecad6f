//! Integration tests for the IBM Cloud HTTP adapters using wiremock
//!
//! These tests drive the search and tagging adapters against mocked
//! endpoints, checking request shapes, pagination and error handling.

use ibmtag::ibm::auth::IbmCredentials;
use ibmtag::ibm::client::{Endpoints, IbmClient};
use ibmtag::ibm::http::{format_api_error, IbmHttpClient};
use ibmtag::ibm::search::GlobalSearch;
use ibmtag::ibm::service::{SearchRequest, SearchService, TaggingService};
use ibmtag::ibm::tagging::GlobalTagging;
use ibmtag::inventory::{load_resources, ResourceRef, SearchOptions, Selector};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> IbmClient {
    IbmClient::new(
        IbmCredentials::bearer("test-token"),
        IbmHttpClient::default(),
        Endpoints {
            search_url: server.uri(),
            tagging_url: server.uri(),
        },
    )
}

fn refs(ids: &[&str]) -> Vec<ResourceRef> {
    ids.iter()
        .map(|id| ResourceRef {
            resource_id: id.to_string(),
        })
        .collect()
}

mod search_tests {
    use super::*;

    /// Test a single search page is parsed with its cursor
    #[tokio::test]
    async fn test_search_sends_query_and_limit() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/resources/search"))
            .and(query_param("limit", "1000"))
            .and(bearer_token("test-token"))
            .and(header_exists("X-Request-ID"))
            .and(body_string_contains("\"query\":\"*\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "db1", "crn": "crn:1", "type": "resource-instance"}],
                "search_cursor": "next-1"
            })))
            .mount(&server)
            .await;

        let search = GlobalSearch::new(client_for(&server));
        let page = search
            .search(&SearchRequest {
                query: "*".to_string(),
                fields: vec!["name".to_string()],
                limit: 1000,
                cursor: None,
            })
            .await
            .expect("Search should succeed");

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("next-1"));
    }

    /// Test the loader follows search_cursor until it disappears
    #[tokio::test]
    async fn test_loader_paginates_with_cursor() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/resources/search"))
            .and(body_string_contains("\"search_cursor\":\"page-2\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "web-2", "crn": "crn:web-2", "type": "resource-instance"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v3/resources/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"name": "web-1", "crn": "crn:web-1", "type": "resource-instance"},
                    {"name": "api-1", "crn": "crn:api-1", "type": "resource-instance"}
                ],
                "search_cursor": "page-2"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let search = GlobalSearch::new(client_for(&server));
        let resources = load_resources(&search, &Selector::parse("substr:web"), &SearchOptions::default())
            .await
            .expect("Load should succeed");

        let names: Vec<&str> = resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["web-1", "web-2"]);
    }

    /// Test a failing search aborts the load
    #[tokio::test]
    async fn test_search_error_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/resources/search"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errors": [{"code": "not_authorized", "message": "Invalid token"}]
            })))
            .mount(&server)
            .await;

        let search = GlobalSearch::new(client_for(&server));
        let err = load_resources(&search, &Selector::parse("all"), &SearchOptions::default())
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("401"));
    }
}

mod tagging_tests {
    use super::*;

    /// Test attach posts resources and tag names in one call
    #[tokio::test]
    async fn test_attach_body_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/tags/attach"))
            .and(query_param("tag_type", "user"))
            .and(body_json(json!({
                "resources": [{"resource_id": "crn:1"}, {"resource_id": "crn:2"}],
                "tag_names": ["env:prod", "team"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"resource_id": "crn:1", "is_error": false},
                    {"resource_id": "crn:2", "is_error": false}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tagging = GlobalTagging::new(client_for(&server).with_tag_type(Some("user".to_string())));
        tagging
            .attach_tags(&["env:prod".to_string(), "team".to_string()], &refs(&["crn:1", "crn:2"]))
            .await
            .expect("Attach should succeed");
    }

    /// Test per-resource errors in a 200 response are surfaced
    #[tokio::test]
    async fn test_detach_partial_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/tags/detach"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"resource_id": "crn:9", "is_error": true}]
            })))
            .mount(&server)
            .await;

        let tagging = GlobalTagging::new(client_for(&server));
        let err = tagging
            .detach_tags(&["env".to_string()], &refs(&["crn:9"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("crn:9"));
    }

    /// Test list tags pages with offset until total_count is reached
    #[tokio::test]
    async fn test_list_tags_paginates_by_offset() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/tags"))
            .and(query_param("attached_to", "crn:v1:x"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 3,
                "offset": 0,
                "items": [{"name": "env:prod"}, {"name": "team:a"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/tags"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 3,
                "offset": 2,
                "items": [{"name": "owner"}]
            })))
            .mount(&server)
            .await;

        let tagging = GlobalTagging::new(client_for(&server));
        let tags = tagging.list_tags("crn:v1:x").await.expect("List should succeed");

        assert_eq!(tags, vec!["env:prod", "team:a", "owner"]);
    }

    /// Test delete-unused returns the service count
    #[tokio::test]
    async fn test_delete_unused_tags() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v3/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 12,
                "errors": false,
                "items": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tagging = GlobalTagging::new(client_for(&server));
        assert_eq!(tagging.delete_unused_tags().await.unwrap(), 12);
    }

    /// Test rate limiting (429) surfaces as an error
    #[tokio::test]
    async fn test_rate_limit_429() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/tags"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let tagging = GlobalTagging::new(client_for(&server));
        let err = tagging
            .list_tags("crn:v1:bluemix:public:kms:us-south:a/4031c2403e:key1::")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("429"));
        assert_eq!(
            format_api_error(&err),
            "Rate limit exceeded. Please try again later."
        );
    }
}

mod auth_tests {
    use super::*;

    /// Test API key exchange and token caching
    #[tokio::test]
    async fn test_api_key_exchange_is_cached() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .and(body_string_contains("apikey=my-key"))
            .and(body_string_contains("grant_type=urn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "iam-token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v3/tags"))
            .and(bearer_token("iam-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_count": 0})))
            .expect(2)
            .mount(&server)
            .await;

        let http = IbmHttpClient::default();
        let credentials = IbmCredentials::api_key("my-key", &server.uri(), http.clone());
        let client = IbmClient::new(
            credentials,
            http,
            Endpoints {
                search_url: server.uri(),
                tagging_url: server.uri(),
            },
        );

        let tagging = GlobalTagging::new(client);
        tagging.delete_unused_tags().await.unwrap();
        tagging.delete_unused_tags().await.unwrap();
    }

    /// Test a rejected API key fails the call
    #[tokio::test]
    async fn test_api_key_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errorCode": "BXNIM0415E",
                "errorMessage": "Provided API key could not be found."
            })))
            .mount(&server)
            .await;

        let http = IbmHttpClient::default();
        let credentials = IbmCredentials::api_key("bad", &server.uri(), http);
        let err = credentials.get_token().await.unwrap_err();
        assert!(format!("{:#}", err).contains("IAM token"));
    }
}
