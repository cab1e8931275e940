use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use flickrview_explorer::{RemoteEndpoint, RemoteError};
use flickrview_server::{AppState, router};
use flickrview_types::Person;
use flickrview_util::{InMemoryPersonStore, JsonPersonStore, PersonStore};
use indexmap::IndexMap;
use serde_json::{Value, json};
use tower::ServiceExt;

type Call = (String, IndexMap<String, String>);

/// Canned Flickr: known descriptors and per-method answers.
#[derive(Default)]
struct FakeFlickr {
    descriptors: HashMap<String, Value>,
    answers: HashMap<String, Result<Value, RemoteError>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeFlickr {
    fn describing(mut self, operation: &str, arguments: Value) -> Self {
        self.descriptors.insert(
            operation.to_string(),
            json!({"method": {"description": {"_content": "Get information about a user."}}, "arguments": {"argument": arguments}, "stat": "ok"}),
        );
        self
    }

    fn answering(mut self, operation: &str, answer: Result<Value, RemoteError>) -> Self {
        self.answers.insert(operation.to_string(), answer);
        self
    }

    fn calls_to(&self, operation: &str) -> Vec<IndexMap<String, String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == operation)
            .map(|(_, arguments)| arguments.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteEndpoint for FakeFlickr {
    async fn describe(&self, operation: &str) -> Result<Value, RemoteError> {
        self.descriptors.get(operation).cloned().ok_or_else(|| RemoteError::Status {
            code: 112,
            message: format!("Method \"flickr.{operation}\" not found"),
        })
    }

    async fn dispatch(&self, operation: &str, arguments: &IndexMap<String, String>) -> Result<Value, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), arguments.clone()));
        self.answers.get(operation).cloned().unwrap_or_else(|| {
            Err(RemoteError::Status {
                code: 1,
                message: "not found".into(),
            })
        })
    }
}

fn photo(id: &str, owner: &str, views: u64) -> Value {
    json!({"id": id, "owner": owner, "secret": "s3cr", "server": "65535", "farm": 66, "title": format!("photo {id}"), "views": views.to_string()})
}

fn people_get_info() -> FakeFlickr {
    FakeFlickr::default().describing(
        "people.getInfo",
        json!([
            {"name": "api_key", "optional": 0, "_content": "Your API application key."},
            {"name": "user_id", "optional": 0, "_content": "The NSID of the user to fetch information about."}
        ]),
    )
}

fn person_answers(flickr: FakeFlickr) -> FakeFlickr {
    flickr
        .answering(
            "people.getInfo",
            Ok(json!({"person": {"nsid": "12345@N00", "realname": {"_content": "Ann Smith"}}, "stat": "ok"})),
        )
        .answering(
            "people.getPublicPhotos",
            Ok(json!({"photos": {"photo": [photo("1", "12345@N00", 3), photo("2", "12345@N00", 90)]}, "stat": "ok"})),
        )
}

struct Harness {
    flickr: Arc<FakeFlickr>,
    people: Arc<InMemoryPersonStore>,
    authenticated_user: Option<String>,
}

impl Harness {
    fn new(flickr: FakeFlickr) -> Self {
        Self {
            flickr: Arc::new(flickr),
            people: Arc::new(InMemoryPersonStore::new()),
            authenticated_user: None,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let state = AppState::new(self.flickr.clone(), self.people.clone(), self.authenticated_user.clone());
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&self, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

#[tokio::test]
async fn explorer_get_renders_reflected_fields() {
    let harness = Harness::new(people_get_info());
    let (status, body) = harness.get("/explore/people.getInfo").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"name="user_id""#));
    assert!(body.contains("The NSID of the user to fetch information about."));
    assert!(body.contains(r#"name="user_id" value="" required"#));
    assert!(!body.contains(r#"name="api_key" value="" required"#));
}

#[tokio::test]
async fn explorer_unknown_method_is_404_without_form() {
    let harness = Harness::new(people_get_info());
    let (status, body) = harness.get("/explore/people.getNothing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.contains(r#"<form method="post""#));
    assert!(body.contains("people.getNothing"));
}

#[tokio::test]
async fn explorer_post_forwards_non_empty_arguments() {
    let harness = Harness::new(people_get_info().answering(
        "people.getInfo",
        Ok(json!({"person": {"id": "abc", "username": {"_content": "ann"}}, "stat": "ok"})),
    ));
    let (status, body) = harness.post_form("/explore/people.getInfo", "user_id=abc&api_key=").await;

    assert_eq!(status, StatusCode::OK);
    let calls = harness.flickr.calls_to("people.getInfo");
    assert_eq!(calls.len(), 1);
    let forwarded: Vec<_> = calls[0].iter().map(|(name, value)| (name.as_str(), value.as_str())).collect();
    assert_eq!(forwarded, [("user_id", "abc")]);
    assert!(body.contains("Result"));
    assert!(body.contains("&quot;ann&quot;"));
}

#[tokio::test]
async fn explorer_post_without_required_field_shows_inline_error() {
    let harness = Harness::new(people_get_info());
    let (status, body) = harness.post_form("/explore/people.getInfo", "").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("This field is required."));
    assert!(harness.flickr.calls_to("people.getInfo").is_empty());
}

#[tokio::test]
async fn explorer_remote_failure_renders_502() {
    let harness = Harness::new(people_get_info().answering(
        "people.getInfo",
        Err(RemoteError::Status {
            code: 1,
            message: "User not found".into(),
        }),
    ));
    let (status, body) = harness.post_form("/explore/people.getInfo", "user_id=nobody").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("User not found (code 1)"));
    assert!(body.contains(r#"value="nobody""#));
    assert_eq!(harness.flickr.calls_to("people.getInfo").len(), 1);
}

#[tokio::test]
async fn people_lookup_caches_fresh_records() {
    let harness = Harness::new(person_answers(FakeFlickr::default()));

    let (status, body) = harness.get("/people?user_id_or_url=12345%40N00").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Ann Smith"));
    assert!(body.contains("1_s3cr_z.jpg"));
    assert!(body.contains("/people/12345@N00/top"));
    assert!(harness.people.get("12345@N00").unwrap().is_some());

    let (status, _) = harness.get("/people?user_id_or_url=12345%40N00").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.flickr.calls_to("people.getInfo").len(), 1);
}

#[tokio::test]
async fn stale_person_is_refreshed() {
    let harness = Harness::new(person_answers(FakeFlickr::default()));
    let mut stale = Person::new("12345@N00", json!({"realname": {"_content": "Old Name"}}), json!([]));
    stale.updated_at = Utc::now() - Duration::days(2);
    harness.people.seed(stale);

    let (status, body) = harness.get("/people?user_id_or_url=12345%40N00").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Ann Smith"));
    assert_eq!(harness.flickr.calls_to("people.getInfo").len(), 1);
    assert!(!harness.people.get("12345@N00").unwrap().unwrap().needs_update());
}

#[tokio::test]
async fn username_lookup_resolves_through_flickr() {
    let harness = Harness::new(person_answers(FakeFlickr::default()).answering(
        "people.findByUsername",
        Ok(json!({"user": {"id": "12345@N00", "nsid": "12345@N00", "username": {"_content": "ann"}}, "stat": "ok"})),
    ));

    let (status, _) = harness.get("/people?user_id_or_url=ann").await;

    assert_eq!(status, StatusCode::OK);
    let lookups = harness.flickr.calls_to("people.findByUsername");
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0]["username"], "ann");
    assert_eq!(harness.flickr.calls_to("people.getInfo")[0]["user_id"], "12345@N00");
}

#[tokio::test]
async fn unknown_username_is_404() {
    let harness = Harness::new(FakeFlickr::default());
    let (status, _) = harness.get("/people?user_id_or_url=nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_people_form_is_reported_inline() {
    let harness = Harness::new(FakeFlickr::default());
    let (status, body) = harness.get("/people?user_id_or_url=ann&per_page=0").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Enter a whole number of at least 1."));
    assert!(harness.flickr.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn index_shows_empty_people_form() {
    let harness = Harness::new(FakeFlickr::default());
    let (status, body) = harness.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"name="user_id_or_url""#));
}

#[tokio::test]
async fn top_view_lists_most_viewed_first() {
    let harness = Harness::new(person_answers(FakeFlickr::default()));
    let (status, body) = harness.get("/people/12345@N00/top").await;

    assert_eq!(status, StatusCode::OK);
    let most_viewed = body.find("2_s3cr_z.jpg").unwrap();
    let least_viewed = body.find("1_s3cr_z.jpg").unwrap();
    assert!(most_viewed < least_viewed);
    assert_eq!(harness.flickr.calls_to("people.getPublicPhotos")[0]["extras"], "views");
}

#[tokio::test]
async fn group_pool_route_passes_both_ids() {
    let harness = Harness::new(FakeFlickr::default().answering(
        "groups.pools.getPhotos",
        Ok(json!({"photos": {"photo": [photo("7", "12345@N00", 1)]}, "stat": "ok"})),
    ));
    let (status, body) = harness.get("/people/12345@N00/34427469792@N01").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("7_s3cr_z.jpg"));
    let calls = harness.flickr.calls_to("groups.pools.getPhotos");
    assert_eq!(calls[0]["group_id"], "34427469792@N01");
    assert_eq!(calls[0]["user_id"], "12345@N00");
}

#[tokio::test]
async fn favusers_needs_an_account() {
    let harness = Harness::new(FakeFlickr::default());
    let (status, _) = harness.get("/favusers").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn favusers_counts_owners() {
    let mut harness = Harness::new(FakeFlickr::default().answering(
        "favorites.getList",
        Ok(json!({"photos": {"photo": [
            photo("1", "b@N01", 0),
            photo("2", "a@N01", 0),
            photo("3", "b@N01", 0)
        ]}, "stat": "ok"})),
    ));
    harness.authenticated_user = Some("me@N01".into());

    let (status, body) = harness.get("/favusers").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.find("b@N01").unwrap() < body.find("a@N01").unwrap());
    assert_eq!(harness.flickr.calls_to("favorites.getList")[0]["user_id"], "me@N01");
}

#[tokio::test]
async fn interesting_upstream_failure_is_502() {
    let harness = Harness::new(FakeFlickr::default().answering(
        "interestingness.getList",
        Err(RemoteError::Transport("connection refused".into())),
    ));
    let (status, body) = harness.get("/interesting").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("connection refused"));
}

#[tokio::test]
async fn own_photo_views_need_an_account() {
    let harness = Harness::new(FakeFlickr::default());
    for uri in ["/favs", "/popular"] {
        let (status, body) = harness.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body.contains("flickrview auth"), "{uri}");
    }
    assert!(harness.flickr.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn own_favs_list_the_authenticated_account() {
    let mut harness = Harness::new(FakeFlickr::default().answering(
        "favorites.getPublicList",
        Ok(json!({"photos": {"photo": [photo("7", "b@N01", 0)]}, "stat": "ok"})),
    ));
    harness.authenticated_user = Some("me@N01".into());

    let (status, body) = harness.get("/favs").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("7_s3cr_z.jpg"));
    assert_eq!(harness.flickr.calls_to("favorites.getPublicList")[0]["user_id"], "me@N01");
}

#[tokio::test]
async fn own_popular_searches_the_authenticated_account() {
    let mut harness = Harness::new(FakeFlickr::default().answering(
        "photos.search",
        Ok(json!({"photos": {"photo": [photo("8", "me@N01", 12)]}, "stat": "ok"})),
    ));
    harness.authenticated_user = Some("me@N01".into());

    let (status, _) = harness.get("/popular/").await;

    assert_eq!(status, StatusCode::OK);
    let searches = harness.flickr.calls_to("photos.search");
    assert_eq!(searches[0]["user_id"], "me@N01");
    assert_eq!(searches[0]["sort"], "interestingness-desc");
}

#[tokio::test]
async fn trailing_slash_reaches_the_same_view() {
    let harness = Harness::new(person_answers(FakeFlickr::default()).answering(
        "interestingness.getList",
        Ok(json!({"photos": {"photo": [photo("9", "c@N01", 0)]}, "stat": "ok"})),
    ));

    let (status, body) = harness.get("/interesting/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("9_s3cr_z.jpg"));

    let (status, _) = harness.get("/people/12345@N00/top/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn people_lookup_persists_to_the_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.json");
    let store = Arc::new(JsonPersonStore::new(path.clone()).unwrap());
    let flickr = Arc::new(person_answers(FakeFlickr::default()));
    let state = AppState::new(flickr.clone(), store, None);

    let request = Request::builder()
        .uri("/people?user_id_or_url=12345%40N00")
        .body(Body::empty())
        .unwrap();
    let response = router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reopened = JsonPersonStore::new(path).unwrap();
    let person = reopened.get("12345@N00").unwrap().unwrap();
    assert!(!person.needs_update());
    assert_eq!(flickr.calls_to("people.getInfo").len(), 1);
}
