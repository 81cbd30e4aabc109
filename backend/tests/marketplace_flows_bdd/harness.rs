//! Server harness and shared world for marketplace flow scenarios.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The `WorldFixture` ensures the server
//! is stopped even if a test panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use rstest::fixture;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use backend::Trace;
use backend::domain::admin_service::{AdminCommandService, AdminQueryService};
use backend::domain::directory_service::{DirectoryCommandService, DirectoryQueryService};
use backend::domain::ports::FixtureSwapNotifier;
use backend::domain::rating_service::{RatingCommandService, RatingQueryService};
use backend::domain::swap_service::{SwapCommandService, SwapQueryService};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::http::{auth, swaps, users};
use backend::outbound::persistence::{
    MemoryRatingRepository, MemorySwapRepository, MemoryUserRepository,
};
use backend::outbound::security::SaltedSha256CredentialHasher;

pub(crate) struct MarketWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    /// Session cookie pair per member handle ("requester", "recipient", ...).
    pub(crate) cookies: HashMap<String, String>,
    /// Member id per handle, as returned by registration.
    pub(crate) member_ids: HashMap<String, String>,
    pub(crate) swap_id: Option<String>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<MarketWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

pub(crate) fn shutdown(world: SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so we lock the
    // world while calling `block_on`. The future must not try to lock it.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

fn test_session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(2)))
        .build()
}

/// Wire the real domain services over the in-memory repository trio.
fn memory_http_state() -> HttpState {
    let user_repo = Arc::new(MemoryUserRepository::new());
    let swap_repo = Arc::new(MemorySwapRepository::new());
    let rating_repo = Arc::new(MemoryRatingRepository::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = Arc::new(SaltedSha256CredentialHasher::new());

    let directory = Arc::new(DirectoryCommandService::new(
        Arc::clone(&user_repo),
        hasher,
        Arc::clone(&clock),
    ));

    HttpState::new(HttpStatePorts {
        login: Arc::clone(&directory) as _,
        directory,
        directory_query: Arc::new(DirectoryQueryService::new(
            Arc::clone(&user_repo),
            Arc::clone(&rating_repo),
        )),
        swaps: Arc::new(SwapCommandService::new(
            Arc::clone(&user_repo),
            Arc::clone(&swap_repo),
            Arc::new(FixtureSwapNotifier),
            Arc::clone(&clock),
        )),
        swaps_query: Arc::new(SwapQueryService::new(
            Arc::clone(&swap_repo),
            Arc::clone(&user_repo),
        )),
        ratings: Arc::new(RatingCommandService::new(
            Arc::clone(&user_repo),
            Arc::clone(&swap_repo),
            Arc::clone(&rating_repo),
            Arc::clone(&clock),
        )),
        ratings_query: Arc::new(RatingQueryService::new(Arc::clone(&rating_repo))),
        admin: Arc::new(AdminCommandService::new(
            Arc::clone(&user_repo),
            Arc::clone(&rating_repo),
            clock,
        )),
        admin_query: Arc::new(AdminQueryService::new(user_repo, swap_repo, rating_repo)),
    })
}

async fn spawn_market_server(http_state: HttpState) -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let http_data = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .wrap(test_session_middleware(key.clone()))
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(users::search_directory)
            .service(users::get_profile)
            .service(swaps::create_swap)
            .service(swaps::list_swaps)
            .service(swaps::get_swap)
            .service(swaps::accept_swap)
            .service(swaps::reject_swap)
            .service(swaps::cancel_swap)
            .service(swaps::complete_swap)
            .service(swaps::rate_swap);

        App::new().app_data(http_data.clone()).wrap(Trace).service(api)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn create_runtime_and_local() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    (runtime, local)
}

#[fixture]
pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = create_runtime_and_local();
    let http_state = memory_http_state();

    let (base_url, server) = local
        .block_on(&runtime, async { spawn_market_server(http_state).await })
        .expect("server should start");

    let world = Rc::new(RefCell::new(MarketWorld {
        runtime,
        local,
        base_url,
        server,
        cookies: HashMap::new(),
        member_ids: HashMap::new(),
        swap_id: None,
        last_status: None,
        last_body: None,
        last_trace_id: None,
    }));

    WorldFixture { world }
}
