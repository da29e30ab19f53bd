use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use blog_server::infrastructure::storage::Storage;
use blog_server::presentation::flash::FLASH_COOKIE;
use blog_server::presentation::utils::{CookieSettings, SESSION_COOKIE};
use blog_server::server::{AppState, build_app};
use uuid::Uuid;

async fn state_with_admin() -> AppState {
    let state = AppState::new(Storage::in_memory(), CookieSettings::default()).unwrap();
    state.auth.ensure_user("admin", "admin").await.unwrap();
    state
}

fn login_request(username: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login")
        .set_form([("username", username), ("password", password)])
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

fn cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

async fn body_text<B: actix_web::body::MessageBody>(resp: ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

#[actix_web::test]
async fn anonymous_new_post_redirects_to_login() {
    let app = test::init_service(build_app(state_with_admin().await)).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/post/new").to_request()).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
}

#[actix_web::test]
async fn every_write_route_is_guarded() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let id = Uuid::new_v4();

    let requests = [
        TestRequest::get().uri("/dashboard"),
        TestRequest::get().uri("/logout"),
        TestRequest::get().uri(&format!("/post/edit/{id}")),
        TestRequest::post()
            .uri(&format!("/post/edit/{id}"))
            .set_form([("title", "t"), ("content", "c")]),
        TestRequest::post()
            .uri("/post/new")
            .set_form([("title", "t"), ("content", "c")]),
        TestRequest::post().uri(&format!("/post/delete/{id}")),
    ];

    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/login");
    }
}

#[actix_web::test]
async fn login_then_new_post_form_is_shown() {
    let app = test::init_service(build_app(state_with_admin().await)).await;

    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/dashboard");
    let session = cookie(&resp, SESSION_COOKIE).expect("session cookie");
    assert_eq!(session.http_only(), Some(true));

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/post/new").cookie(session).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains(r#"action="/post/new""#));
    assert!(body.contains("Signed in as admin"));
}

#[actix_web::test]
async fn wrong_password_rerenders_form_with_message() {
    let app = test::init_service(build_app(state_with_admin().await)).await;

    let resp = test::call_service(&app, login_request("admin", "wrong").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie(&resp, SESSION_COOKIE).is_none());
    let body = body_text(resp).await;
    assert!(body.contains("Incorrect username or password!"));
    assert!(body.contains(r#"value="admin""#));
}

#[actix_web::test]
async fn created_post_redirects_to_its_page() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/post/new")
            .cookie(session.clone())
            .set_form([("title", "Hello"), ("content", "World")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let target = location(&resp);
    let id = target.strip_prefix("/post/").expect("redirect to post view");
    assert!(Uuid::parse_str(id).is_ok());
    let flash = cookie(&resp, FLASH_COOKIE).expect("flash cookie");

    let resp = test::call_service(
        &app,
        TestRequest::get().uri(&target).cookie(flash).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = cookie(&resp, FLASH_COOKIE).expect("flash is cleared once shown");
    assert_eq!(cleared.value(), "");

    let body = body_text(resp).await;
    assert!(body.contains("Hello"));
    assert!(body.contains("World"));
    assert!(body.contains("New post added successfully!"));
}

#[actix_web::test]
async fn double_submit_creates_two_posts() {
    let state = state_with_admin().await;
    let app = test::init_service(build_app(state.clone())).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    let mut targets = Vec::new();
    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            TestRequest::post()
                .uri("/post/new")
                .cookie(session.clone())
                .set_form([("title", "Same"), ("content", "Same")])
                .to_request(),
        )
        .await;
        targets.push(location(&resp));
    }

    assert_ne!(targets[0], targets[1]);
    assert_eq!(state.posts.list_posts().await.unwrap().len(), 2);
}

#[actix_web::test]
async fn unknown_and_malformed_post_ids_are_not_found() {
    let app = test::init_service(build_app(state_with_admin().await)).await;

    for uri in [format!("/post/{}", Uuid::new_v4()), "/post/not-a-uuid".to_string()] {
        let resp = test::call_service(&app, TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn edit_updates_and_redirects_to_post() {
    let state = state_with_admin().await;
    let post = state
        .posts
        .create_post("Draft".into(), "first version".into())
        .await
        .unwrap();
    let app = test::init_service(build_app(state)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/post/edit/{}", post.id))
            .cookie(session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("first version"));

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri(&format!("/post/edit/{}", post.id))
            .cookie(session)
            .set_form([("title", "Final"), ("content", "second version")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/post/{}", post.id));

    let resp = test::call_service(
        &app,
        TestRequest::get().uri(&format!("/post/{}", post.id)).to_request(),
    )
    .await;
    let body = body_text(resp).await;
    assert!(body.contains("Final"));
    assert!(body.contains("second version"));
    assert!(!body.contains("first version"));
}

#[actix_web::test]
async fn editing_unknown_post_is_not_found() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();
    let id = Uuid::new_v4();

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/post/edit/{id}"))
            .cookie(session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri(&format!("/post/edit/{id}"))
            .cookie(session)
            .set_form([("title", "t"), ("content", "c")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_removes_post_and_redirects_home() {
    let state = state_with_admin().await;
    let post = state
        .posts
        .create_post("Doomed".into(), "bye".into())
        .await
        .unwrap();
    let app = test::init_service(build_app(state)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri(&format!("/post/delete/{}", post.id))
            .cookie(session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let resp = test::call_service(
        &app,
        TestRequest::get().uri(&format!("/post/{}", post.id)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri(&format!("/post/delete/{}", post.id))
            .cookie(session)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_requires_post_method() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/post/delete/{}", Uuid::new_v4()))
            .cookie(session)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn missing_form_fields_are_bad_requests() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/post/new")
            .cookie(session)
            .set_form([("title", "no content")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn logout_unbinds_the_session() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/logout")
            .cookie(session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert_eq!(cookie(&resp, SESSION_COOKIE).unwrap().value(), "");

    // replaying the old cookie must not work either
    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/dashboard")
            .cookie(session)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
}

#[actix_web::test]
async fn index_and_dashboard_list_posts_in_insertion_order() {
    let state = state_with_admin().await;
    for title in ["Alpha", "Bravo", "Charlie"] {
        state
            .posts
            .create_post(title.into(), "body".into())
            .await
            .unwrap();
    }
    let app = test::init_service(build_app(state)).await;

    let body = body_text(
        test::call_service(&app, TestRequest::get().uri("/").to_request()).await,
    )
    .await;
    let positions: Vec<usize> = ["Alpha", "Bravo", "Charlie"]
        .iter()
        .map(|t| body.find(t).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(body.contains(r#"href="/login""#));

    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();
    let body = body_text(
        test::call_service(
            &app,
            TestRequest::get()
                .uri("/dashboard")
                .cookie(session)
                .to_request(),
        )
        .await,
    )
    .await;
    assert!(body.contains("Charlie"));
    assert!(body.contains("/post/delete/"));
}

#[actix_web::test]
async fn garbage_session_cookie_is_anonymous() {
    let app = test::init_service(build_app(state_with_admin().await)).await;

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/dashboard")
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-session"))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
}

#[actix_web::test]
async fn health_and_request_id() {
    let app = test::init_service(build_app(state_with_admin().await)).await;

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/health")
            .insert_header(("x-request-id", "abc-123"))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
    assert!(resp.headers().contains_key("server-timing"));
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn not_found_page_keeps_the_site_layout() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    for uri in ["/post/not-a-uuid", "/no/such/page"] {
        let resp = test::call_service(
            &app,
            TestRequest::get().uri(uri).cookie(session.clone()).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        let body = body_text(resp).await;
        assert!(body.contains("404 Not Found"), "{uri}");
        assert!(body.contains("Signed in as admin"), "{uri}");
    }
}

#[actix_web::test]
async fn rejected_input_renders_error_template() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();
    let long_title = "x".repeat(101);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/post/new")
            .cookie(session)
            .set_form([("title", long_title.as_str()), ("content", "body")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_text(resp).await;
    assert!(body.contains("400 Bad Request"));
    assert!(body.contains("title must be at most 100 characters"));
    assert!(body.contains(r#"href="/logout""#));
}

#[actix_web::test]
async fn malformed_ids_on_guarded_routes_are_not_found() {
    let app = test::init_service(build_app(state_with_admin().await)).await;
    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let session = cookie(&resp, SESSION_COOKIE).unwrap();

    let requests = [
        TestRequest::get().uri("/post/edit/not-a-uuid"),
        TestRequest::post()
            .uri("/post/edit/not-a-uuid")
            .set_form([("title", "t"), ("content", "c")]),
        TestRequest::post().uri("/post/delete/not-a-uuid"),
    ];

    for req in requests {
        let resp = test::call_service(&app, req.cookie(session.clone()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn logging_in_again_replaces_the_old_session() {
    let state = state_with_admin().await;
    let app = test::init_service(build_app(state.clone())).await;

    let resp = test::call_service(&app, login_request("admin", "admin").to_request()).await;
    let first = cookie(&resp, SESSION_COOKIE).unwrap();

    let resp = test::call_service(
        &app,
        login_request("admin", "admin")
            .cookie(first.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let second = cookie(&resp, SESSION_COOKIE).unwrap();
    assert_ne!(first.value(), second.value());

    let first_id = Uuid::parse_str(first.value()).unwrap();
    assert!(state.auth.current_user(first_id).await.unwrap().is_none());

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/dashboard").cookie(first).to_request(),
    )
    .await;
    assert_eq!(location(&resp), "/login");

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/dashboard").cookie(second).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}
