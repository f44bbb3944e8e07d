use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use actix_web_flash_messages::{storage::CookieMessageStore, FlashMessagesFramework};
use pretty_assertions::assert_eq;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tasktracker::routes;

fn test_key() -> Key {
    Key::from(&[7u8; 64])
}

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

macro_rules! init_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .wrap(
                    FlashMessagesFramework::builder(
                        CookieMessageStore::builder(test_key()).build(),
                    )
                    .build(),
                )
                .wrap(SessionMiddleware::new(
                    CookieSessionStore::default(),
                    test_key(),
                ))
                .configure(routes::config),
        )
        .await
    };
}

/// Folds a response's Set-Cookie headers into a cookie jar the way a browser
/// would: replace by name, drop cleared cookies.
fn update_jar<B>(jar: &mut Vec<Cookie<'static>>, resp: &ServiceResponse<B>) {
    for cookie in resp.response().cookies() {
        let cookie = cookie.into_owned();
        jar.retain(|c| c.name() != cookie.name());
        if !cookie.value().is_empty() {
            jar.push(cookie);
        }
    }
}

fn with_cookies(mut req: test::TestRequest, jar: &[Cookie<'static>]) -> test::TestRequest {
    for cookie in jar {
        req = req.cookie(cookie.clone());
    }
    req
}

/// Registers an account and returns the browser-equivalent cookie jar.
async fn register_user<S, B>(app: &S, email: &str, name: &str, password: &str) -> Vec<Cookie<'static>>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register/")
        .set_form([
            ("full_name", name),
            ("email", email),
            ("password1", password),
            ("password2", password),
        ])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        StatusCode::SEE_OTHER,
        "registration should redirect"
    );
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let mut jar = Vec::new();
    update_jar(&mut jar, &resp);
    jar
}

fn assert_redirects_to<B>(resp: &ServiceResponse<B>, location: &str) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), location);
}

#[actix_rt::test]
async fn test_register_creates_user_and_authenticated_session() {
    let pool = test_pool().await;
    let app = init_app!(pool);

    let mut jar = register_user(&app, "alice@EXAMPLE.com", "Alice", "Xy9!aaaa").await;

    // Email stored with its domain lower-cased.
    let email: String = sqlx::query_scalar("SELECT email FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(email, "alice@example.com");

    // The session authenticates the dashboard and the welcome flash shows.
    let req = with_cookies(test::TestRequest::get().uri("/"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    update_jar(&mut jar, &resp);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("My tasks"));
    assert!(body.contains("Alice"));
    assert!(body.contains("Account created, welcome!"));
}

#[actix_rt::test]
async fn test_register_duplicate_email_rerenders_with_field_error() {
    let pool = test_pool().await;
    let app = init_app!(pool);

    register_user(&app, "alice@example.com", "Alice", "Xy9!aaaa").await;

    let req = test::TestRequest::post()
        .uri("/register/")
        .set_form([
            ("full_name", "Imposter"),
            ("email", "alice@EXAMPLE.com"),
            ("password1", "Xy9!aaaa"),
            ("password2", "Xy9!aaaa"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("A user with this email already exists."));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[actix_rt::test]
async fn test_register_validation_failures_rerender() {
    let pool = test_pool().await;
    let app = init_app!(pool);

    // Mismatched passwords.
    let req = test::TestRequest::post()
        .uri("/register/")
        .set_form([
            ("full_name", "Alice"),
            ("email", "alice@example.com"),
            ("password1", "Xy9!aaaa"),
            ("password2", "different"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("The two password fields do not match."));

    // Invalid email syntax.
    let req = test::TestRequest::post()
        .uri("/register/")
        .set_form([
            ("full_name", "Alice"),
            ("email", "not-an-email"),
            ("password1", "Xy9!aaaa"),
            ("password2", "Xy9!aaaa"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Enter a valid email address."));

    // All-numeric password.
    let req = test::TestRequest::post()
        .uri("/register/")
        .set_form([
            ("full_name", "Alice"),
            ("email", "alice@example.com"),
            ("password1", "12345678"),
            ("password2", "12345678"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Password cannot be entirely numeric."));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[test_log::test(actix_rt::test)]
async fn test_login_and_wrong_credentials() {
    let pool = test_pool().await;
    let app = init_app!(pool);

    register_user(&app, "alice@example.com", "Alice", "Xy9!aaaa").await;

    // Fresh "browser": no cookies. Correct credentials log in.
    let req = test::TestRequest::post()
        .uri("/login/")
        .set_form([("email", "alice@example.com"), ("password", "Xy9!aaaa")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_redirects_to(&resp, "/");
    let mut jar = Vec::new();
    update_jar(&mut jar, &resp);

    let req = with_cookies(test::TestRequest::get().uri("/"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Wrong password re-renders the form; no session is created.
    let req = test::TestRequest::post()
        .uri("/login/")
        .set_form([("email", "alice@example.com"), ("password", "wrong")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Please enter a correct email and password."));

    // Unknown email gets the same message.
    let req = test::TestRequest::post()
        .uri("/login/")
        .set_form([("email", "nobody@example.com"), ("password", "Xy9!aaaa")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Please enter a correct email and password."));
}

#[actix_rt::test]
async fn test_login_page_redirects_authenticated_users() {
    let pool = test_pool().await;
    let app = init_app!(pool);

    let jar = register_user(&app, "alice@example.com", "Alice", "Xy9!aaaa").await;

    let req = with_cookies(test::TestRequest::get().uri("/login/"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_redirects_to(&resp, "/");
}

#[actix_rt::test]
async fn test_logout_ends_session() {
    let pool = test_pool().await;
    let app = init_app!(pool);

    let mut jar = register_user(&app, "alice@example.com", "Alice", "Xy9!aaaa").await;

    let req = with_cookies(test::TestRequest::get().uri("/logout/"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_redirects_to(&resp, "/login/");
    update_jar(&mut jar, &resp);

    // The dashboard is protected again.
    let req = with_cookies(test::TestRequest::get().uri("/"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_redirects_to(&resp, "/login/");
}

#[actix_rt::test]
async fn test_protected_routes_redirect_anonymous_requests() {
    let pool = test_pool().await;
    let app = init_app!(pool);

    for uri in ["/", "/tasks/", "/tasks/new/", "/users/", "/account/delete/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_redirects_to(&resp, "/login/");
    }
}

#[actix_rt::test]
async fn test_account_delete_cascades_and_ends_session() {
    let pool = test_pool().await;
    let app = init_app!(pool);

    let mut jar = register_user(&app, "alice@example.com", "Alice", "Xy9!aaaa").await;

    for title in ["One", "Two"] {
        let req = with_cookies(test::TestRequest::post().uri("/tasks/new/"), &jar)
            .set_form([
                ("title", title),
                ("description", ""),
                ("priority", "medium"),
                ("status", "todo"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_redirects_to(&resp, "/");
    }

    // The confirmation page renders first.
    let req = with_cookies(test::TestRequest::get().uri("/account/delete/"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = with_cookies(test::TestRequest::post().uri("/account/delete/"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_redirects_to(&resp, "/register/");
    update_jar(&mut jar, &resp);

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
    assert_eq!(tasks, 0);

    // The session is gone too.
    let req = with_cookies(test::TestRequest::get().uri("/"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_redirects_to(&resp, "/login/");
}
