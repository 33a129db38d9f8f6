/*!
Stub du endpoint `/status` pour tests sans vraie flotte d'hôtes

Serveur axum lié à un port éphémère sur 127.0.0.1. Chaque hôte enregistré
répond sur `<n'importe quel préfixe>/<host>/status` avec le corps configuré
(segment `<host>` décodé, `h%231` -> `h#1`).
Le stub compte les requêtes par hôte et le pic de requêtes simultanées.
*/

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use parking_lot::Mutex;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;

/// Réponse servie pour un hôte donné
#[derive(Debug, Clone)]
pub struct StubHost {
    pub status: StatusCode,
    pub body: String,
    pub delay: Option<Duration>,
}

#[derive(Clone, Default)]
struct StubState {
    hosts: Arc<Mutex<HashMap<String, StubHost>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    paths: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

/// Serveur de status simulé. Arrêté quand il est droppé.
pub struct StatusStub {
    addr: SocketAddr,
    state: StubState,
    server: JoinHandle<()>,
}

impl StatusStub {
    /// Démarre le stub sur un port libre
    pub async fn start() -> Result<Self> {
        let state = StubState::default();
        let app = Router::new().fallback(serve_status).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("[stub] server stopped: {}", e);
            }
        });

        debug!("[stub] listening on http://{addr}");
        Ok(Self { addr, state, server })
    }

    /// URL racine à passer comme base URL (`http://127.0.0.1:<port>`)
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// L'hôte répond 200 avec ce JSON
    pub fn set_json(&self, host: &str, value: Value) {
        self.set_body(host, StatusCode::OK, value.to_string());
    }

    /// L'hôte répond avec un corps brut (JSON invalide, HTML, ...)
    pub fn set_body(&self, host: &str, status: StatusCode, body: impl Into<String>) {
        let mut hosts = self.state.hosts.lock();
        let delay = hosts.get(host).and_then(|h| h.delay);
        hosts.insert(
            host.to_string(),
            StubHost {
                status,
                body: body.into(),
                delay,
            },
        );
    }

    /// Retarde la réponse de l'hôte (à appeler après `set_json`/`set_body`)
    pub fn set_delay(&self, host: &str, delay: Duration) {
        if let Some(stub) = self.state.hosts.lock().get_mut(host) {
            stub.delay = Some(delay);
        }
    }

    /// Nombre de requêtes reçues pour un hôte
    pub fn hits(&self, host: &str) -> usize {
        self.state.hits.lock().get(host).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().values().sum()
    }

    /// Chemins demandés, dans l'ordre d'arrivée
    pub fn requested_paths(&self) -> Vec<String> {
        self.state.paths.lock().clone()
    }

    /// Pic de requêtes servies en même temps
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for StatusStub {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// `.../<host>/status` -> `<host>` décodé
fn host_from_path(path: &str) -> Option<String> {
    let rest = path.strip_suffix("/status")?;
    let segment = rest.rsplit('/').next().filter(|host| !host.is_empty())?;
    Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
}

async fn serve_status(State(state): State<StubState>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    state.paths.lock().push(path.clone());

    let Some(host) = host_from_path(&path) else {
        return (StatusCode::NOT_FOUND, "404 page not found").into_response();
    };
    *state.hits.lock().entry(host.clone()).or_insert(0) += 1;

    let stub = state.hosts.lock().get(&host).cloned();
    let Some(stub) = stub else {
        debug!("[stub] unknown host {}", host);
        return (StatusCode::NOT_FOUND, "404 page not found").into_response();
    };

    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak_in_flight.fetch_max(current, Ordering::SeqCst);
    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body,
    )
        .into_response()
}
