use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use folio_core::domain::persona::PersonaCatalog;
use folio_core::wizard::{Step, StepInput, Wizard};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "folio_session";

const DEFAULT_IDLE_SECS: u64 = 30 * 60;
const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    /// Sessions untouched for longer than this are dropped.
    pub idle: Duration,
    /// Oldest session is dropped to make room past this count.
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(DEFAULT_IDLE_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl SessionLimits {
    pub fn from_env() -> Self {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("SESSION_IDLE_SECS") {
            if let Ok(n) = s.parse::<u64>() {
                out.idle = Duration::from_secs(n);
            }
        }

        if let Ok(s) = std::env::var("SESSION_MAX") {
            if let Ok(n) = s.parse::<usize>() {
                out.max_sessions = n.max(1);
            }
        }

        out
    }
}

struct Entry {
    wizard: Wizard,
    touched: Instant,
}

/// One wizard per browser session, in memory only.
#[derive(Clone)]
pub struct Sessions {
    catalog: Arc<PersonaCatalog>,
    limits: SessionLimits,
    wizards: Arc<Mutex<HashMap<Uuid, Entry>>>,
}

impl Sessions {
    pub fn new(catalog: Arc<PersonaCatalog>, limits: SessionLimits) -> Self {
        Self {
            catalog,
            limits,
            wizards: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Existing session for `id`, or a fresh one under a new id.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Wizard, bool) {
        let mut wizards = self.wizards.lock().await;
        let now = Instant::now();
        self.evict_idle(&mut wizards, now);

        if let Some(id) = id {
            if let Some(entry) = wizards.get_mut(&id) {
                entry.touched = now;
                return (id, entry.wizard.clone(), false);
            }
        }

        while wizards.len() >= self.limits.max_sessions {
            let Some(oldest) = wizards
                .iter()
                .min_by_key(|(_, e)| e.touched)
                .map(|(id, _)| *id)
            else {
                break;
            };
            wizards.remove(&oldest);
            tracing::debug!(session = %oldest, "session cap reached; dropped oldest session");
        }

        let id = Uuid::new_v4();
        let wizard = Wizard::new(self.catalog.clone());
        wizards.insert(
            id,
            Entry {
                wizard: wizard.clone(),
                touched: now,
            },
        );
        tracing::debug!(session = %id, live = wizards.len(), "new wizard session");
        (id, wizard, true)
    }

    /// Runs `f` against the session's wizard. `None` when the session is unknown or expired.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Wizard) -> R) -> Option<R> {
        let mut wizards = self.wizards.lock().await;
        let now = Instant::now();
        self.evict_idle(&mut wizards, now);

        wizards.get_mut(&id).map(|entry| {
            entry.touched = now;
            f(&mut entry.wizard)
        })
    }

    fn evict_idle(&self, wizards: &mut HashMap<Uuid, Entry>, now: Instant) {
        let before = wizards.len();
        wizards.retain(|_, e| now.duration_since(e.touched) < self.limits.idle);
        let dropped = before - wizards.len();
        if dropped > 0 {
            tracing::debug!(dropped, "expired idle sessions");
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.wizards.lock().await.len()
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Builds the input for `step` from posted form fields. Blank single-choice values count as untouched.
pub fn step_input(step: Step, fields: &[(String, String)]) -> StepInput {
    let single = |name: &str| {
        fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    match step {
        Step::Persona => StepInput::Persona(single("persona")),
        Step::Scenario => StepInput::Scenario(single("scenario").unwrap_or_default()),
        Step::Risk => StepInput::Risk(single("risk")),
        Step::Holding => StepInput::Holding(single("holding")),
        Step::Industries => StepInput::Industries(
            fields
                .iter()
                .filter(|(k, _)| k == "industry")
                .map(|(_, v)| v.clone())
                .collect(),
        ),
        Step::Review | Step::Results => StepInput::Confirm,
    }
}
