//! Per-session request serialization.
//!
//! tower-sessions loads the record on first access and writes the whole
//! record back after the handler returns. Two overlapping requests on one
//! session each save their own copy and the later save wins, so concurrent
//! cart edits would be lost. This layer sits outside the session layer and
//! holds a per-session lock across load, handler and save.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header::COOKIE,
    middleware::Next,
    response::Response,
};
use moka::future::Cache;
use tokio::sync::Mutex;
use tower_sessions::cookie::Cookie;

use super::session::SESSION_COOKIE_NAME;

/// Locks unused for this long are dropped.
const LOCK_IDLE_SECONDS: u64 = 10 * 60;

const MAX_TRACKED_SESSIONS: u64 = 100_000;

/// Paths that never touch the session.
const UNLOCKED_PREFIXES: &[&str] = &["/static/", "/health"];

/// One async mutex per session cookie.
#[derive(Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder()
                .max_capacity(MAX_TRACKED_SESSIONS)
                .time_to_idle(Duration::from_secs(LOCK_IDLE_SECONDS))
                .build(),
        }
    }

    async fn lock_for(&self, session_key: &str) -> Arc<Mutex<()>> {
        self.locks
            .get_with(session_key.to_string(), async { Arc::new(Mutex::new(())) })
            .await
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw value of the session cookie, if the request carries one.
fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| Cookie::split_parse(header))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Run requests that share a session cookie one at a time.
///
/// Requests without a cookie get a fresh session and need no lock.
pub async fn serialize_session_requests(
    State(locks): State<SessionLocks>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if UNLOCKED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return next.run(request).await;
    }

    let Some(key) = session_cookie(&request) else {
        return next.run(request).await;
    };

    let lock = locks.lock_for(&key).await;
    let _guard = lock.lock().await;
    next.run(request).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware::from_fn_with_state, routing::post};
    use sinocoffee_core::{Cart, MenuItemId, NewCartLine, Price};
    use tower::ServiceExt;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::session_store::{self, SessionStore};
    use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

    use crate::routes::cart;
    use crate::routes::context::{load_cart, save_cart};

    /// Memory store whose loads and saves take as long as a database round trip.
    #[derive(Debug, Clone, Default)]
    struct SlowStore(MemoryStore);

    const LATENCY: Duration = Duration::from_millis(5);

    #[async_trait::async_trait]
    impl SessionStore for SlowStore {
        async fn create(&self, record: &mut Record) -> session_store::Result<()> {
            tokio::time::sleep(LATENCY).await;
            self.0.create(record).await
        }

        async fn save(&self, record: &Record) -> session_store::Result<()> {
            tokio::time::sleep(LATENCY).await;
            self.0.save(record).await
        }

        async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
            tokio::time::sleep(LATENCY).await;
            self.0.load(id).await
        }

        async fn delete(&self, id: &Id) -> session_store::Result<()> {
            self.0.delete(id).await
        }
    }

    fn line(name: &str) -> NewCartLine {
        NewCartLine {
            item_id: MenuItemId::generate(),
            name: name.to_string(),
            unit_price: Price::from_cents(450),
            image: None,
        }
    }

    fn app(a: NewCartLine, b: NewCartLine) -> Router {
        let seed = move |session: Session| {
            let (a, b) = (a.clone(), b.clone());
            async move {
                let mut cart = Cart::default();
                cart.add(a);
                cart.add(b);
                save_cart(&session, &cart).await.unwrap();
            }
        };
        let lines = |session: Session| async move { load_cart(&session).await.len().to_string() };

        Router::new()
            .route("/seed", post(seed))
            .route("/lines", post(lines))
            .route("/cart/remove", post(cart::remove))
            .layer(
                SessionManagerLayer::new(SlowStore::default())
                    .with_name(SESSION_COOKIE_NAME)
                    .with_secure(false),
            )
            .layer(from_fn_with_state(
                SessionLocks::new(),
                serialize_session_requests,
            ))
    }

    fn post_with_cookie(uri: &str, cookie: &str, body: String) -> Request {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(COOKIE, cookie)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_removals_on_one_session_both_apply() {
        for _ in 0..10 {
            let (a, b) = (line("Latte"), line("Mocha"));
            let (a_id, b_id) = (a.item_id, b.item_id);
            let app = app(a, b);

            let seeded = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/seed")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            let set_cookie = seeded.headers().get("set-cookie").unwrap().to_str().unwrap();
            let cookie = set_cookie.split(';').next().unwrap().to_string();

            let (first, second) = tokio::join!(
                app.clone().oneshot(post_with_cookie(
                    "/cart/remove",
                    &cookie,
                    format!("item_id={a_id}")
                )),
                app.clone().oneshot(post_with_cookie(
                    "/cart/remove",
                    &cookie,
                    format!("item_id={b_id}")
                )),
            );
            assert!(first.unwrap().status().is_success());
            assert!(second.unwrap().status().is_success());

            let remaining = app
                .oneshot(post_with_cookie("/lines", &cookie, String::new()))
                .await
                .unwrap();
            let body = axum::body::to_bytes(remaining.into_body(), usize::MAX)
                .await
                .unwrap();
            assert_eq!(&body[..], b"0");
        }
    }

    #[test]
    fn test_session_cookie_is_found_among_others() {
        let request = Request::builder()
            .uri("/cart")
            .header(COOKIE, "theme=dark; sc_session=abc123; other=1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_cookie(&request).as_deref(), Some("abc123"));

        let bare = Request::builder().uri("/cart").body(Body::empty()).unwrap();
        assert_eq!(session_cookie(&bare), None);
    }
}
