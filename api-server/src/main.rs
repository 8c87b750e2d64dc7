mod config;
mod handlers;
mod response;
mod store;
mod types;

use std::{
    fs,
    path::Path,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use zigzagzog_core::{Ledger, SnapshotLedger};

pub(crate) use config::*;
pub(crate) use store::CommitmentStore;
pub(crate) use types::*;

use handlers::{
    commitment_hash, delete_commitment, elimination, game_and_round_state, game_end, game_view,
    get_commitment, health, ping, put_commitment, rounds,
};
use response::json_payload_error;

pub(crate) fn now_unix_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

pub(crate) fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis().min(u128::from(u64::MAX)) as u64)
        .unwrap_or(0)
}

fn load_ledger(path: &Path) -> Result<SnapshotLedger, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("failed to read ledger snapshot {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("failed to parse ledger snapshot {}: {e}", path.display()))
}

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(json_payload_error)
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ping", web::get().to(ping))
        .route("/health", web::get().to(health))
        .route("/api/elimination", web::post().to(elimination))
        .route("/api/game-end", web::post().to(game_end))
        .route(
            "/api/game-and-round-state",
            web::post().to(game_and_round_state),
        )
        .route("/api/rounds", web::post().to(rounds))
        .route("/api/commitments/hash", web::post().to(commitment_hash))
        .route(
            "/api/commitments/{contract}/{player}/{game}/{round}",
            web::put().to(put_commitment),
        )
        .route(
            "/api/commitments/{contract}/{player}/{game}/{round}",
            web::get().to(get_commitment),
        )
        .route(
            "/api/commitments/{contract}/{player}/{game}/{round}",
            web::delete().to(delete_commitment),
        )
        .route(
            "/api/games/{game}/players/{player}",
            web::get().to(game_view),
        );
}

fn spawn_commitment_sweep_task(store: Arc<CommitmentStore>, ttl_secs: u64, sweep_secs: u64) {
    tokio::spawn(async move {
        let sweep = Duration::from_secs(sweep_secs);
        loop {
            tokio::time::sleep(sweep).await;
            match store.sweep(ttl_secs) {
                Ok(0) => {}
                Ok(swept) => tracing::info!(swept, "swept expired pending reveals"),
                Err(e) => tracing::error!("commitment sweep failed: {e}"),
            }
        }
    });
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env();

    let commitments = CommitmentStore::open(&config.data_dir).map_err(std::io::Error::other)?;

    let ledger = match &config.ledger_snapshot_path {
        Some(path) => {
            let ledger = load_ledger(path).map_err(std::io::Error::other)?;
            tracing::info!(
                path = %path.display(),
                current_game = ledger.current_game_number().unwrap_or_default(),
                games = ledger.games.len(),
                "loaded ledger snapshot"
            );
            Some(Arc::new(ledger))
        }
        None => {
            tracing::warn!("LEDGER_SNAPSHOT_PATH not set; game views are unavailable");
            None
        }
    };

    tracing::info!(
        "starting zerve: bind_addr={} data_dir={} chain_id={} max_commitments={} commitment_ttl_secs={}",
        config.bind_addr,
        config.data_dir.display(),
        config.chain_id,
        config.max_commitments,
        config.commitment_ttl_secs
    );

    let state = AppState {
        commitments: Arc::new(commitments),
        ledger,
        chain_id: config.chain_id,
        max_commitments: config.max_commitments,
        commitment_ttl_secs: config.commitment_ttl_secs,
    };
    spawn_commitment_sweep_task(
        state.commitments.clone(),
        config.commitment_ttl_secs,
        config.commitment_sweep_secs,
    );

    let json_limit = config.json_limit_bytes;
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config(json_limit))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(config.bind_addr)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as awtest};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    const CONTRACT: &str = "0x2222222222222222222222222222222222222222";
    const PLAYER: &str = "0x1111111111111111111111111111111111111111";

    fn test_state(ledger: Option<SnapshotLedger>) -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let state = AppState {
            commitments: Arc::new(CommitmentStore::open(dir.path()).unwrap()),
            ledger: ledger.map(Arc::new),
            chain_id: DEFAULT_CHAIN_ID,
            max_commitments: DEFAULT_MAX_COMMITMENTS,
            commitment_ttl_secs: DEFAULT_COMMITMENT_TTL_SECS,
        };
        (state, dir)
    }

    fn fixture_ledger() -> SnapshotLedger {
        load_ledger(Path::new("../test-fixtures/game-snapshot.json")).unwrap()
    }

    macro_rules! test_app {
        ($state:expr) => {
            awtest::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .app_data(json_config(DEFAULT_JSON_LIMIT_BYTES))
                    .configure(routes),
            )
            .await
        };
    }

    fn commitment_uri(round: u64) -> String {
        format!("/api/commitments/{CONTRACT}/{PLAYER}/7/{round}")
    }

    #[actix_web::test]
    async fn ping_reports_ok() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let req = awtest::TestRequest::get().uri("/ping").to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[actix_web::test]
    async fn health_reports_cache_and_ledger() {
        let (state, _dir) = test_state(Some(fixture_ledger()));
        let app = test_app!(state);

        let req = awtest::TestRequest::get().uri("/health").to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["service"], "zerve");
        assert_eq!(body["stored_commitments"], 0);
        assert_eq!(body["ledger_loaded"], true);
        assert_eq!(body["current_game_number"], 7);
    }

    #[actix_web::test]
    async fn elimination_applies_tie_breaks() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/elimination")
            .set_json(json!({ "circles": 5, "squares": 5, "triangles": 3 }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], "CircleEliminated");
        assert_eq!(body["survivors"], json!(["square", "triangle"]));

        let req = awtest::TestRequest::post()
            .uri("/api/elimination")
            .set_json(json!({ "circles": 4, "squares": 4, "triangles": 4 }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], "NothingEliminated");
        assert_eq!(body["survivors"], Value::Null);
    }

    #[actix_web::test]
    async fn game_end_reports_single_survivor() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/game-end")
            .set_json(json!({
                "revealed": { "circles": 0, "squares": 3, "triangles": 3 },
                "player_counts": { "circles": 0, "squares": 1, "triangles": 1 },
                "last_revealed": { "square": PLAYER, "triangle": PLAYER },
                "player_revealed": { "circles": 0, "squares": 3, "triangles": 0 }
            }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["elimination"], "SquareEliminated");
        assert_eq!(body["will_end"], true);
        assert_eq!(body["reason"], "single_surviving_player");
    }

    #[actix_web::test]
    async fn game_and_round_state_resolves_reveal_phase() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let start = 1_700_000_000_000u64;
        let req = awtest::TestRequest::post()
            .uri("/api/game-and-round-state")
            .set_json(json!({
                "game_state": {
                    "game_number": 3,
                    "round_number": 2,
                    "game_timestamp_ms": start,
                    "round_timestamp_ms": start
                },
                "constants": {
                    "play_cost": 1000,
                    "commit_duration_ms": 60000,
                    "reveal_duration_ms": 30000
                },
                "reveal_state": {
                    "revealed": { "circles": 5, "squares": 1, "triangles": 1 },
                    "player_counts": { "circles": 3, "squares": 1, "triangles": 1 }
                },
                "now_ms": start + 70_000
            }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["phase"], "reveal");
        assert_eq!(body["state"]["time_left_ms"], 20_000);
        assert_eq!(body["state"]["has_game_ended"], false);
        assert_eq!(body["game_end_reason"], "too_few_surviving_plays");
    }

    #[actix_web::test]
    async fn rounds_projects_entering_plays() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/rounds")
            .set_json(json!({
                "purchased_plays": 5,
                "rounds": [
                    {
                        "round_number": 1,
                        "player_revealed": true,
                        "player_shapes": { "circles": 2, "squares": 2, "triangles": 1 },
                        "total_shapes": { "circles": 9, "squares": 4, "triangles": 5 }
                    },
                    {
                        "round_number": 2,
                        "player_revealed": true,
                        "player_shapes": { "circles": 1, "squares": 2, "triangles": 0 },
                        "total_shapes": { "circles": 3, "squares": 4, "triangles": 2 }
                    }
                ]
            }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["entering_plays"], json!([5, 3]));
        assert_eq!(body["next_round_plays"], 1);
        assert_eq!(body["rounds"][1]["elimination_result"], "SquareEliminated");
    }

    #[actix_web::test]
    async fn rounds_rejects_gaps() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/rounds")
            .set_json(json!({
                "purchased_plays": 5,
                "rounds": [{
                    "round_number": 2,
                    "total_shapes": { "circles": 1, "squares": 0, "triangles": 0 }
                }]
            }))
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["error_code"], "invalid_round_sequence");
    }

    #[actix_web::test]
    async fn commitment_hash_uses_default_chain() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let payload = json!({
            "contract": CONTRACT,
            "nonce": "0x2a",
            "game_number": 7,
            "round_number": 1,
            "shapes": { "circles": 1, "squares": 0, "triangles": 2 }
        });
        let req = awtest::TestRequest::post()
            .uri("/api/commitments/hash")
            .set_json(&payload)
            .to_request();
        let defaulted: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(defaulted["chain_id"], DEFAULT_CHAIN_ID);

        let mut explicit = payload.clone();
        explicit["chain_id"] = json!(DEFAULT_CHAIN_ID);
        let req = awtest::TestRequest::post()
            .uri("/api/commitments/hash")
            .set_json(&explicit)
            .to_request();
        let same: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(defaulted["hash"], same["hash"]);

        explicit["chain_id"] = json!(1);
        let req = awtest::TestRequest::post()
            .uri("/api/commitments/hash")
            .set_json(&explicit)
            .to_request();
        let other: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_ne!(defaulted["hash"], other["hash"]);
    }

    #[actix_web::test]
    async fn commitment_cache_lifecycle() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let put = || {
            awtest::TestRequest::put()
                .uri(&commitment_uri(1))
                .set_json(json!({
                    "nonce": "0x2a",
                    "shapes": { "circles": 0, "squares": 2, "triangles": 0 }
                }))
                .to_request()
        };
        let resp = awtest::call_service(&app, put()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = awtest::read_body_json(resp).await;
        assert!(created["cache_key"]
            .as_str()
            .unwrap_or_default()
            .starts_with("commitment_"));

        let resp = awtest::call_service(&app, put()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = awtest::TestRequest::get().uri(&commitment_uri(1)).to_request();
        let fetched: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched["commitment"]["hash"], created["commitment"]["hash"]);
        assert_eq!(fetched["commitment"]["commitment"]["shapes"]["squares"], 2);

        let req = awtest::TestRequest::delete()
            .uri(&commitment_uri(1))
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = awtest::TestRequest::get().uri(&commitment_uri(1)).to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["error_code"], "commitment_not_found");
    }

    #[actix_web::test]
    async fn commitment_rejects_empty_selection_and_bad_address() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let req = awtest::TestRequest::put()
            .uri(&commitment_uri(1))
            .set_json(json!({
                "nonce": "0x2a",
                "shapes": { "circles": 0, "squares": 0, "triangles": 0 }
            }))
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["error_code"], "empty_selection");

        let req = awtest::TestRequest::get()
            .uri(&format!("/api/commitments/not-an-address/{PLAYER}/7/1"))
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["error_code"], "invalid_address");
    }

    #[actix_web::test]
    async fn malformed_body_gets_json_error() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/elimination")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"circles\": -1}")
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "invalid_json");
    }

    #[actix_web::test]
    async fn game_view_requires_ledger() {
        let (state, _dir) = test_state(None);
        let app = test_app!(state);

        let req = awtest::TestRequest::get()
            .uri(&format!("/api/games/7/players/{PLAYER}"))
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["error_code"], "ledger_unavailable");
    }

    #[actix_web::test]
    async fn game_view_reads_snapshot() {
        let (state, _dir) = test_state(Some(fixture_ledger()));
        let app = test_app!(state);

        let now_ms = 1_760_001_200_000u64 + 400_000;
        let req = awtest::TestRequest::get()
            .uri(&format!("/api/games/7/players/{PLAYER}?now_ms={now_ms}"))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["game_and_round_state"]["is_reveal_phase"], true);
        assert_eq!(body["entering_plays"], json!([6, 3, 2]));
        assert_eq!(body["game_end_reason"], "too_few_surviving_plays");

        let req = awtest::TestRequest::get()
            .uri(&format!("/api/games/99/players/{PLAYER}"))
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["error_code"], "game_not_found");
    }
}
