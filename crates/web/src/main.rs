use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_core::advisor::Advisor;
use folio_core::domain::persona::PersonaCatalog;
use folio_core::storage::ReportWriter;

mod error;
mod render;
mod session;

use error::ApiError;
use render::Flash;
use session::{SessionLimits, Sessions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = folio_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let catalog = Arc::new(PersonaCatalog::builtin());
    let advisor = Advisor::from_settings(&settings, catalog.clone())?;

    let state = AppState {
        sessions: Sessions::new(catalog, SessionLimits::from_env()),
        advisor: Arc::new(advisor),
        reports: ReportWriter::new(settings.reports_dir()),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "questionnaire listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    sessions: Sessions,
    advisor: Arc<Advisor>,
    reports: ReportWriter,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show))
        .route("/next", post(next))
        .route("/back", post(back))
        .route("/reset", post(reset))
        .route("/save", post(save))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn show(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, wizard, created) = state
        .sessions
        .get_or_create(session::session_id(&headers))
        .await;

    let html = Html(render::page(&wizard, None));
    if created {
        ([(SET_COOKIE, session::session_cookie(id))], html).into_response()
    } else {
        html.into_response()
    }
}

async fn next(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let id = session::session_id(&headers).ok_or(ApiError::NoSession)?;

    let outcome = state
        .sessions
        .update(id, |w| {
            let input = session::step_input(w.step(), &fields);
            match w.advance(input) {
                Ok(_) => Ok(w.begin_results()),
                Err(err) => Err(render::page(w, Some(&Flash::Error(err.to_string())))),
            }
        })
        .await
        .ok_or(ApiError::NoSession)?;

    let (ticket, answers) = match outcome {
        Ok(Some(claim)) => claim,
        Ok(None) => return Ok(Redirect::to("/").into_response()),
        Err(html) => return Ok(Html(html).into_response()),
    };

    // The session lock is not held while providers are called.
    let advisor = state.advisor.clone();
    let joined = tokio::spawn(async move { advisor.recommend(&answers).await }).await;

    let stored = state
        .sessions
        .update(id, |w| match joined {
            Ok(view) => Ok(w.finish_results(ticket, view)),
            Err(err) => {
                w.abandon_results(ticket);
                Err(err)
            }
        })
        .await
        .ok_or(ApiError::NoSession)?
        .map_err(|e| anyhow::anyhow!("results pipeline aborted: {e}"))?;

    if !stored {
        tracing::info!(session = %id, "discarding results for answers the session has moved away from");
    }

    Ok(Redirect::to("/").into_response())
}

async fn back(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, ApiError> {
    let id = session::session_id(&headers).ok_or(ApiError::NoSession)?;
    state
        .sessions
        .update(id, |w| w.retreat())
        .await
        .ok_or(ApiError::NoSession)?;
    Ok(Redirect::to("/"))
}

async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, ApiError> {
    let id = session::session_id(&headers).ok_or(ApiError::NoSession)?;
    state
        .sessions
        .update(id, |w| w.reset())
        .await
        .ok_or(ApiError::NoSession)?;
    Ok(Redirect::to("/"))
}

async fn save(State(state): State<AppState>, headers: HeaderMap) -> Result<Html<String>, ApiError> {
    let id = session::session_id(&headers).ok_or(ApiError::NoSession)?;

    let (persona_key, markdown) = state
        .sessions
        .update(id, |w| {
            w.results()
                .map(|view| (w.answers().persona_key.clone(), view.to_markdown()))
        })
        .await
        .ok_or(ApiError::NoSession)?
        .ok_or(ApiError::NoResults)?;

    let outcome = state.reports.save(&persona_key, &markdown).await;
    let flash = if outcome.is_saved() {
        Flash::Info(outcome.message())
    } else {
        Flash::Error(outcome.message())
    };

    let html = state
        .sessions
        .update(id, |w| render::page(w, Some(&flash)))
        .await
        .ok_or(ApiError::NoSession)?;
    Ok(Html(html))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &folio_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
