use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderValue;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tinyurl_web::{configure, ApiController, AppConfig};

fn controller() -> web::Data<ApiController> {
    web::Data::new(ApiController::in_memory(&AppConfig::default()))
}

fn create_request(user: &str, payload: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/urls")
        .insert_header(("X-User-Id", user))
        .set_json(payload)
}

fn get_as(user: &str, uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(("X-User-Id", user))
}

fn delete_as(user: &str, uri: &str) -> test::TestRequest {
    test::TestRequest::delete()
        .uri(uri)
        .insert_header(("X-User-Id", user))
}

async fn json(resp: ServiceResponse) -> (StatusCode, Value) {
    let status = resp.status();
    (status, test::read_body_json(resp).await)
}

#[actix_web::test]
async fn test_create_redirect_and_stats() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;

    let req = create_request(
        "alice",
        json!({"longUrl": "https://example.com/docs", "customAlias": "docs"}),
    )
    .to_request();
    let (status, body) = json(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["alias"], "docs");
    assert_eq!(body["shortUrl"], "https://tiny.url/docs");
    assert_eq!(body["longUrl"], "https://example.com/docs");
    assert_eq!(body["active"], true);
    assert!(body["id"].as_str().is_some());

    let req = test::TestRequest::get().uri("/docs").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "https://example.com/docs"
    );

    let req = get_as("alice", "/urls/docs/stats").to_request();
    let (status, stats) = json(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["alias"], "docs");
    assert_eq!(stats["totalRedirects"], 1);
    assert_eq!(stats["periodRedirects"], 1);
    assert_eq!(stats["uniqueVisitors"], 0);
    assert_eq!(stats["timeSeries"].as_array().unwrap().len(), 1);
    assert_eq!(stats["timeSeries"][0]["redirectCount"], 1);
    assert!(stats["lastRedirectAt"].is_string());
}

#[actix_web::test]
async fn test_generated_alias() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    let req = create_request("alice", json!({"longUrl": "https://example.com"})).to_request();
    let (status, body) = json(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::CREATED);
    let alias = body["alias"].as_str().unwrap();
    assert_eq!(alias.len(), 7);
    assert!(alias.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[actix_web::test]
async fn test_create_validation_and_conflict() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;

    let req = create_request("alice", json!({"longUrl": "ftp://example.com"})).to_request();
    let (status, body) = json(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let payload = json!({"longUrl": "https://example.com", "customAlias": "taken"});
    let req = create_request("alice", payload.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    let req = create_request("bob", payload).to_request();
    let (status, body) = json(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let req = test::TestRequest::post()
        .uri("/urls")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_delete_twice_then_redirect_is_gone() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    let req = create_request(
        "alice",
        json!({"longUrl": "https://example.com", "customAlias": "bye"}),
    )
    .to_request();
    test::call_service(&app, req).await;

    let resp = test::call_service(&app, delete_as("alice", "/urls/bye").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, delete_as("alice", "/urls/bye").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get().uri("/bye").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let (status, body) = json(test::call_service(&app, get_as("alice", "/urls/bye").to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);
}

#[actix_web::test]
async fn test_other_users_are_forbidden() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    let req = create_request(
        "alice",
        json!({"longUrl": "https://example.com", "customAlias": "private"}),
    )
    .to_request();
    test::call_service(&app, req).await;

    let (status, body) = json(test::call_service(&app, get_as("bob", "/urls/private").to_request()).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let resp = test::call_service(&app, delete_as("bob", "/urls/private").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(&app, get_as("bob", "/urls/private/stats").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri("/urls/private")
        .insert_header(("X-User-Id", "bob"))
        .set_json(json!({"longUrl": "https://evil.example"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_unknown_and_expired_aliases() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;

    let (status, body) = json(test::call_service(&app, get_as("alice", "/urls/nope").to_request()).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let req = test::TestRequest::get().uri("/nope").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = create_request(
        "alice",
        json!({
            "longUrl": "https://example.com",
            "customAlias": "stale",
            "expiresAt": "2000-01-01T00:00:00Z"
        }),
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/stale").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_update_changes_destination() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    let req = create_request(
        "alice",
        json!({"longUrl": "https://example.com/old", "customAlias": "moving"}),
    )
    .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::patch()
        .uri("/urls/moving")
        .insert_header(("X-User-Id", "alice"))
        .set_json(json!({"longUrl": "https://example.com/new"}))
        .to_request();
    let (status, body) = json(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["longUrl"], "https://example.com/new");

    let req = test::TestRequest::get().uri("/moving").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("location").unwrap(), "https://example.com/new");

    let req = test::TestRequest::patch()
        .uri("/urls/moving")
        .insert_header(("X-User-Id", "alice"))
        .set_json(json!({"longUrl": "mailto:someone@example.com"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_listing_paginates() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    for alias in ["one", "two", "three"] {
        let req = create_request(
            "alice",
            json!({"longUrl": format!("https://example.com/{}", alias), "customAlias": alias}),
        )
        .to_request();
        test::call_service(&app, req).await;
    }
    let req = create_request("bob", json!({"longUrl": "https://example.com/bob"})).to_request();
    test::call_service(&app, req).await;

    let resp = test::call_service(&app, get_as("alice", "/urls?page=0&pageSize=2").to_request()).await;
    assert_eq!(resp.headers().get("X-Total-Count").unwrap(), "3");
    let (status, body) = json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["page"], 0);
    assert_eq!(body["pageSize"], 2);
    assert_eq!(body["totalItems"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["nextPage"], 1);

    let (_, body) = json(test::call_service(&app, get_as("alice", "/urls?page=1&pageSize=2").to_request()).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert!(body.get("nextPage").is_none());

    let (_, body) = json(test::call_service(&app, get_as("alice", "/urls?search=tw").to_request()).await).await;
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["data"][0]["alias"], "two");

    let (status, body) = json(test::call_service(&app, get_as("alice", "/urls?pageSize=0").to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[actix_web::test]
async fn test_stats_range_validation() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    let req = create_request(
        "alice",
        json!({"longUrl": "https://example.com", "customAlias": "ranged"}),
    )
    .to_request();
    test::call_service(&app, req).await;

    let uri = "/urls/ranged/stats?rangeStart=2024-02-01T00:00:00Z&rangeEnd=2024-01-01T00:00:00Z";
    let (status, body) = json(test::call_service(&app, get_as("alice", uri).to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let uri = "/urls/ranged/stats?rangeStart=2024-01-01T00:00:00Z&rangeEnd=2024-02-01T00:00:00Z";
    let (status, body) = json(test::call_service(&app, get_as("alice", uri).to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["periodRedirects"], 0);
    assert_eq!(body["timeSeries"], json!([]));
}

#[actix_web::test]
async fn test_missing_user_header_uses_default_user() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    let req = test::TestRequest::post()
        .uri("/urls")
        .set_json(json!({"longUrl": "https://example.com", "customAlias": "anon"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/urls/anon").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let resp = test::call_service(&app, get_as("alice", "/urls/anon").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_health_is_not_an_alias() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, web::Bytes::from_static(b"OK"));
}

#[actix_web::test]
async fn test_unreadable_user_header_is_rejected() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;
    let req = test::TestRequest::post()
        .uri("/urls")
        .insert_header(("X-User-Id", HeaderValue::from_bytes(b"al\xffice").unwrap()))
        .set_json(json!({"longUrl": "https://example.com", "customAlias": "bytes"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/urls/bytes").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_destination_is_stored_in_normalized_form() {
    let app = test::init_service(App::new().configure(configure(controller()))).await;

    let req = create_request(
        "alice",
        json!({"longUrl": "https://example.com/a\nb", "customAlias": "newline"}),
    )
    .to_request();
    let (status, body) = json(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["longUrl"], "https://example.com/ab");

    let req = test::TestRequest::get().uri("/newline").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("location").unwrap(), "https://example.com/ab");

    let req = create_request(
        "alice",
        json!({"longUrl": "https://example.com/café", "customAlias": "accent"}),
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/accent").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "https://example.com/caf%C3%A9"
    );
}
