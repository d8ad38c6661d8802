//! End-to-end HTTP scenarios running the real domain services over the
//! in-memory adapters.

mod support;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::{Value, json};

use blog_backend::domain::UserId;
use blog_backend::inbound::http::configure_api;
use blog_backend::inbound::http::session_config::{SESSION_COOKIE_NAME, session_middleware};
use blog_backend::inbound::http::validation::configure_extractors;
use blog_backend::{TRACE_ID_HEADER, Trace};

use support::InMemoryStore;

const PASSWORD: &str = "Secr3t!";

async fn app(
    store: &InMemoryStore,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(support::http_state(store)))
            .configure(configure_extractors)
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session_middleware(&support::test_session_settings()))
                    .configure(configure_api),
            ),
    )
    .await
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

async fn register<S, B>(app: &S, user_name: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(json!({
            "email": format!("{user_name}@example.org"),
            "firstName": "Ada",
            "lastName": "Lovelace",
            "userName": user_name,
            "password": PASSWORD,
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id: String = test::read_body_json(res).await;
    id
}

struct Login {
    user_id: String,
    token: String,
    cookie: Cookie<'static>,
}

async fn login<S, B>(app: &S, user_name: &str) -> Login
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({
            "email": format!("{user_name}@example.org"),
            "password": PASSWORD,
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .expect("session cookie")
        .into_owned();
    let body: Value = test::read_body_json(res).await;
    Login {
        user_id: body["userId"].as_str().expect("user id").to_owned(),
        token: body["accessToken"].as_str().expect("token").to_owned(),
        cookie,
    }
}

async fn signed_up<S, B>(app: &S, user_name: &str) -> Login
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    register(app, user_name).await;
    login(app, user_name).await
}

async fn create_post<S, B>(app: &S, token: &str, payload: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(token))
        .set_json(payload)
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    test::read_body_json(res).await
}

fn post_body(title: &str) -> Value {
    json!({ "title": title, "summary": "A short summary", "body": "Some words." })
}

#[actix_web::test]
async fn register_login_and_fetch_profile() {
    let store = InMemoryStore::default();
    let app = app(&store).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(json!({
            "email": "ada@example.org",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "userName": "ada",
            "password": PASSWORD,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
        .to_owned();
    let id: String = test::read_body_json(res).await;
    assert_eq!(location, format!("/api/v1/users/{id}"));

    let session = login(&app, "ada").await;
    assert_eq!(session.user_id, id);
    assert!(!session.token.is_empty());

    let res = test::call_service(&app, test::TestRequest::get().uri(&location).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["userName"], "ada");
    assert_eq!(body["roles"], json!(["author"]));
    assert!(body.get("email").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[rstest]
#[case("ada", StatusCode::CONFLICT)]
#[case("grace", StatusCode::CREATED)]
#[actix_web::test]
async fn registration_rejects_taken_user_names(#[case] user_name: &str, #[case] expected: StatusCode) {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    register(&app, "ada").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(json!({
            "email": "second@example.org",
            "firstName": "Second",
            "lastName": "Account",
            "userName": user_name,
            "password": PASSWORD,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn wrong_password_is_unauthorised() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    register(&app, "ada").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "ada@example.org", "password": "Wr0ng!!" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn emails_that_grow_when_normalised_are_rejected() {
    let store = InMemoryStore::default();
    let app = app(&store).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(json!({
            "email": format!("{}@example.org", "ß".repeat(200)),
            "firstName": "Ada",
            "lastName": "Lovelace",
            "userName": "ada",
            "password": PASSWORD,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "email");
    assert_eq!(body["details"]["code"], "too_long");
}

#[actix_web::test]
async fn user_name_availability_tracks_registrations() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    register(&app, "ada").await;

    for (name, expected) in [("ada", false), ("grace", true)] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{name}/available"))
            .to_request();
        let available: bool = test::call_and_read_body_json(&app, req).await;
        assert_eq!(available, expected, "availability of {name}");
    }
}

#[actix_web::test]
async fn cookie_session_authenticates_until_logout() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let session = signed_up(&app, "ada").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .cookie(session.cookie.clone())
        .set_json(post_body("Cookie post"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/logout")
        .cookie(session.cookie.clone())
        .insert_header(bearer(&session.token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.token_count(), 0);

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&session.token))
        .set_json(post_body("After logout"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/logout")
        .insert_header(bearer(&session.token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn anonymous_writes_are_rejected() {
    let store = InMemoryStore::default();
    let app = app(&store).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .set_json(post_body("Nobody"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn post_lifecycle_respects_ownership() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let owner = signed_up(&app, "ada").await;
    let other = signed_up(&app, "grace").await;

    let post = create_post(&app, &owner.token, post_body("Hello")).await;
    let post_id = post["id"].as_str().expect("post id").to_owned();
    assert_eq!(post["userId"], owner.user_id.as_str());
    assert_eq!(post["authorId"], Value::Null);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/posts/{post_id}"))
        .insert_header(bearer(&other.token))
        .set_json(post_body("Hijacked"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/posts/{post_id}"))
        .insert_header(bearer(&owner.token))
        .set_json(post_body("Hello again"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{post_id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["title"], "Hello again");
    assert_ne!(fetched["updatedAt"], fetched["createdAt"]);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/posts/{post_id}"))
        .insert_header(bearer(&other.token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admins_may_delete_any_post() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let owner = signed_up(&app, "ada").await;
    let admin = signed_up(&app, "root").await;
    store.grant_admin(&UserId::new(&admin.user_id).expect("admin id"));

    let post = create_post(&app, &owner.token, post_body("Doomed")).await;
    let post_id = post["id"].as_str().expect("post id");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/posts/{post_id}"))
        .insert_header(bearer(&admin.token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{post_id}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn comments_follow_their_post() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let owner = signed_up(&app, "ada").await;
    let reader = signed_up(&app, "grace").await;
    let post = create_post(&app, &owner.token, post_body("Discuss")).await;
    let post_id = post["id"].as_str().expect("post id").to_owned();

    let mut comment_ids = Vec::new();
    for text in ["First!", "Second thoughts"] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{post_id}/comments"))
            .insert_header(bearer(&reader.token))
            .set_json(json!({ "body": text }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let comment: Value = test::read_body_json(res).await;
        assert_eq!(comment["postId"], post_id.as_str());
        assert_eq!(comment["userId"], reader.user_id.as_str());
        comment_ids.push(comment["id"].as_str().expect("comment id").to_owned());
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{post_id}/comments"))
        .to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    let bodies: Vec<&str> = listed.iter().filter_map(|c| c["body"].as_str()).collect();
    assert_eq!(bodies, ["First!", "Second thoughts"]);

    let first = comment_ids.first().expect("first comment");
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comments/{first}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["body"], "First!");

    // The post owner moderates comments on their post.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/comments/{first}"))
        .insert_header(bearer(&owner.token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.comment_count(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/posts/{post_id}"))
        .insert_header(bearer(&owner.token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.comment_count(), 0);
}

#[actix_web::test]
async fn commenting_on_a_missing_post_is_not_found() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let reader = signed_up(&app, "grace").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6/comments")
        .insert_header(bearer(&reader.token))
        .set_json(json!({ "body": "Hello?" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_an_author_uncredits_their_posts() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let writer = signed_up(&app, "ada").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/authors")
        .insert_header(bearer(&writer.token))
        .set_json(json!({ "name": "Mary Shelley" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let author: Value = test::read_body_json(res).await;
    let author_id = author["id"].as_str().expect("author id").to_owned();

    let req = test::TestRequest::post()
        .uri("/api/v1/authors")
        .insert_header(bearer(&writer.token))
        .set_json(json!({ "name": "mary  shelley" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let namesake: Value = test::read_body_json(res).await;
    assert_eq!(namesake["webUrl"], author["webUrl"]);
    assert_ne!(namesake["id"], author["id"]);

    let mut payload = post_body("Frankenstein");
    payload["authorId"] = json!(author_id);
    let post = create_post(&app, &writer.token, payload).await;
    assert_eq!(post["authorId"], author_id.as_str());
    let post_id = post["id"].as_str().expect("post id").to_owned();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/authors/{author_id}"))
        .insert_header(bearer(&writer.token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{post_id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["authorId"], Value::Null);
    assert_eq!(fetched["title"], "Frankenstein");
}

#[actix_web::test]
async fn stale_concurrency_stamp_is_a_conflict() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let session = signed_up(&app, "ada").await;
    let uri = format!("/api/v1/users/{}", session.user_id);

    let before: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let stamp = before["concurrencyStamp"].clone();

    let update = |first_name: &str| {
        test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(&session.token))
            .set_json(json!({
                "firstName": first_name,
                "lastName": "Lovelace",
                "userName": "ada",
                "concurrencyStamp": stamp,
            }))
            .to_request()
    };

    let res = test::call_service(&app, update("Augusta")).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(&app, update("Countess")).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let after: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(after["firstName"], "Augusta");
    assert_ne!(after["concurrencyStamp"], stamp);
}

#[actix_web::test]
async fn avatar_upload_is_served_back() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let session = signed_up(&app, "ada").await;
    let image = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{}/avatar", session.user_id))
        .insert_header(bearer(&session.token))
        .insert_header((CONTENT_TYPE, "image/png"))
        .set_payload(image.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}/avatar", session.user_id))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    let bytes = test::read_body(res).await;
    assert_eq!(bytes.as_ref(), image.as_slice());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", session.user_id))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        profile["avatarUrl"],
        format!("/api/v1/users/{}/avatar", session.user_id).as_str()
    );
}

#[actix_web::test]
async fn avatar_form_upload_replaces_the_image() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let session = signed_up(&app, "ada").await;
    let image = [0xff, 0xd8, 0xff, 0xe0];

    let mut body = Vec::new();
    body.extend_from_slice(b"--form-boundary\r\n");
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"me.jpg\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(&image);
    body.extend_from_slice(b"\r\n--form-boundary--\r\n");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{}/avatar", session.user_id))
        .cookie(session.cookie.clone())
        .insert_header((CONTENT_TYPE, "multipart/form-data; boundary=form-boundary"))
        .set_payload(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}/avatar", session.user_id))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(
        res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/jpeg")
    );
    assert_eq!(test::read_body(res).await.as_ref(), image.as_slice());
}

#[actix_web::test]
async fn unsupported_avatar_type_is_rejected() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let session = signed_up(&app, "ada").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{}/avatar", session.user_id))
        .insert_header(bearer(&session.token))
        .insert_header((CONTENT_TYPE, "text/plain"))
        .set_payload("not an image")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn not_found_errors_carry_the_trace_id() {
    let store = InMemoryStore::default();
    let app = app(&store).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .expect("trace id header")
        .to_owned();
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["traceId"], header.as_str());
}

#[rstest]
#[case(None, 10, true)]
#[case(Some(10), 2, false)]
#[case(Some(20), 0, false)]
#[actix_web::test]
async fn posts_are_paged_newest_first(
    #[case] offset: Option<i64>,
    #[case] expected_items: usize,
    #[case] expected_more: bool,
) {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let writer = signed_up(&app, "ada").await;
    for n in 0..12 {
        create_post(&app, &writer.token, post_body(&format!("Post {n}"))).await;
    }

    let uri = offset.map_or_else(
        || "/api/v1/posts".to_owned(),
        |value| format!("/api/v1/posts?offset={value}"),
    );
    let page: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let items = page["items"].as_array().expect("items");
    assert_eq!(items.len(), expected_items);
    assert_eq!(page["total"], 12);
    assert_eq!(page["pageSize"], 10);
    assert_eq!(page["hasMore"], expected_more);
    if offset.is_none() {
        assert_eq!(items.first().map(|p| &p["title"]), Some(&json!("Post 11")));
    }
}

#[actix_web::test]
async fn negative_offsets_are_rejected() {
    let store = InMemoryStore::default();
    let app = app(&store).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts?offset=-1")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn user_posts_pair_profile_with_posts() {
    let store = InMemoryStore::default();
    let app = app(&store).await;
    let ada = signed_up(&app, "ada").await;
    let grace = signed_up(&app, "grace").await;
    create_post(&app, &ada.token, post_body("Mine")).await;
    create_post(&app, &grace.token, post_body("Theirs")).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}/posts", ada.user_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["userName"], "ada");
    assert_eq!(body["posts"]["total"], 1);
    assert_eq!(body["posts"]["items"][0]["title"], "Mine");
}
