use std::str::FromStr;

use actix_web::{
    http::StatusCode,
    web::{Data, Json, Path, Query},
    HttpResponse, Responder,
};
use alloy_primitives::Address;
use zigzagzog_core::rounds::next_round_plays;
use zigzagzog_core::{
    eliminate, entering_plays, game_end_reason, read_game_view, resolve_game_and_round_state,
    zigzagzog_domain, Commitment, CommitmentKey, Ledger, RoundRevealState, RoundState,
    ShapeCounts,
};

use crate::response::{json_error_with_code, ledger_error};
use crate::store::PutResult;
use crate::{
    now_unix_ms, now_unix_s, AppState, CommitmentHashRequest, CommitmentHashResponse,
    CommitmentResponse, EliminationResponse, GameAndRoundStateRequest, GameAndRoundStateResponse,
    GameEndResponse, GameViewQuery, HealthResponse, PutCommitmentRequest, RoundsRequest,
    RoundsResponse, StoredCommitment,
};

/// Returns `(error_message, error_code)` on failure.
pub(crate) fn parse_address(value: &str, field: &str) -> Result<Address, (String, &'static str)> {
    Address::from_str(value.trim())
        .map_err(|err| (format!("invalid {field} address {value}: {err}"), "invalid_address"))
}

/// Returns `(error_message, error_code)` on failure.
pub(crate) fn validate_selection(shapes: &ShapeCounts) -> Result<(), (String, &'static str)> {
    if shapes.is_empty() {
        return Err((
            "a commitment must select at least one shape".to_string(),
            "empty_selection",
        ));
    }
    Ok(())
}

/// Returns `(error_message, error_code)` on failure.
pub(crate) fn validate_round_sequence(
    round_numbers: impl IntoIterator<Item = u64>,
) -> Result<(), (String, &'static str)> {
    for (expected, actual) in (1u64..).zip(round_numbers) {
        if actual != expected {
            return Err((
                format!("rounds must be numbered 1, 2, 3, ...: expected {expected}, got {actual}"),
                "invalid_round_sequence",
            ));
        }
    }
    Ok(())
}

fn commitment_key(
    (contract, player, game_number, round_number): (String, String, u64, u64),
) -> Result<CommitmentKey, (String, &'static str)> {
    Ok(CommitmentKey {
        contract: parse_address(&contract, "contract")?,
        player: parse_address(&player, "player")?,
        game_number,
        round_number,
    })
}

fn store_error(context: &str, err: String) -> HttpResponse {
    tracing::error!("{context} failed: {err}");
    json_error_with_code(
        StatusCode::INTERNAL_SERVER_ERROR,
        "commitment store error",
        Some("internal_error"),
    )
}

pub(crate) async fn ping() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub(crate) async fn health(state: Data<AppState>) -> impl Responder {
    let stored_commitments = match state.commitments.count() {
        Ok(count) => count,
        Err(e) => return store_error("health check", e),
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "zerve",
        version: env!("CARGO_PKG_VERSION"),
        chain_id: state.chain_id,
        stored_commitments,
        max_commitments: state.max_commitments,
        commitment_ttl_secs: state.commitment_ttl_secs,
        ledger_loaded: state.ledger.is_some(),
        current_game_number: state
            .ledger
            .as_ref()
            .and_then(|ledger| ledger.current_game_number().ok()),
    })
}

pub(crate) async fn elimination(body: Json<ShapeCounts>) -> impl Responder {
    let counts = body.into_inner();
    let result = eliminate(&counts);
    HttpResponse::Ok().json(EliminationResponse {
        success: true,
        counts,
        result,
        survivors: result.survivors(),
    })
}

pub(crate) async fn game_end(body: Json<RoundRevealState>) -> impl Responder {
    let reason = game_end_reason(&body);
    HttpResponse::Ok().json(GameEndResponse {
        success: true,
        elimination: body.elimination(),
        will_end: reason.is_some(),
        reason,
    })
}

pub(crate) async fn game_and_round_state(body: Json<GameAndRoundStateRequest>) -> impl Responder {
    let req = body.into_inner();
    let now_ms = req.now_ms.unwrap_or_else(now_unix_ms);
    let reason = game_end_reason(&req.reveal_state);
    let state =
        resolve_game_and_round_state(&req.game_state, &req.constants, reason.is_some(), now_ms);

    HttpResponse::Ok().json(GameAndRoundStateResponse {
        success: true,
        now_ms,
        phase: state.phase(),
        state,
        game_end_reason: reason,
    })
}

pub(crate) async fn rounds(body: Json<RoundsRequest>) -> impl Responder {
    let req = body.into_inner();
    if let Err((msg, code)) = validate_round_sequence(req.rounds.iter().map(|r| r.round_number)) {
        return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code));
    }

    let rounds: Vec<RoundState> = req
        .rounds
        .iter()
        .map(|round| {
            RoundState::from_tallies(
                round.round_number,
                round.player_committed,
                round.player_revealed,
                round.player_shapes,
                round.total_shapes,
            )
        })
        .collect();

    HttpResponse::Ok().json(RoundsResponse {
        success: true,
        entering_plays: entering_plays(req.purchased_plays, &rounds),
        next_round_plays: next_round_plays(req.purchased_plays, &rounds),
        rounds,
    })
}

pub(crate) async fn commitment_hash(
    state: Data<AppState>,
    body: Json<CommitmentHashRequest>,
) -> impl Responder {
    let req = body.into_inner();
    if let Err((msg, code)) = validate_selection(&req.shapes) {
        return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code));
    }

    let chain_id = req.chain_id.unwrap_or(state.chain_id);
    let commitment = Commitment {
        nonce: req.nonce,
        game_number: req.game_number,
        round_number: req.round_number,
        shapes: req.shapes,
    };
    HttpResponse::Ok().json(CommitmentHashResponse {
        success: true,
        chain_id,
        hash: commitment.signing_hash(&zigzagzog_domain(chain_id, req.contract)),
    })
}

pub(crate) async fn put_commitment(
    state: Data<AppState>,
    path: Path<(String, String, u64, u64)>,
    body: Json<PutCommitmentRequest>,
) -> impl Responder {
    let key = match commitment_key(path.into_inner()) {
        Ok(key) => key,
        Err((msg, code)) => return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code)),
    };
    let req = body.into_inner();
    if let Err((msg, code)) = validate_selection(&req.shapes) {
        return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code));
    }

    let chain_id = req.chain_id.unwrap_or(state.chain_id);
    let commitment = Commitment {
        nonce: req.nonce,
        game_number: key.game_number,
        round_number: key.round_number,
        shapes: req.shapes,
    };
    let entry = StoredCommitment {
        key,
        chain_id,
        hash: commitment.signing_hash(&zigzagzog_domain(chain_id, key.contract)),
        commitment,
        created_at_unix_s: now_unix_s(),
    };

    match state.commitments.put(&entry, state.max_commitments) {
        Ok(result) => {
            let status = match result {
                PutResult::Inserted => StatusCode::CREATED,
                PutResult::Replaced => StatusCode::OK,
            };
            tracing::info!(cache_key = %key, ?result, "stored pending reveal");
            HttpResponse::build(status).json(CommitmentResponse {
                success: true,
                cache_key: key.to_string(),
                commitment: entry,
            })
        }
        Err(e) => store_error("put_commitment", e),
    }
}

pub(crate) async fn get_commitment(
    state: Data<AppState>,
    path: Path<(String, String, u64, u64)>,
) -> impl Responder {
    let key = match commitment_key(path.into_inner()) {
        Ok(key) => key,
        Err((msg, code)) => return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code)),
    };

    match state.commitments.get(&key) {
        Ok(Some(entry)) => HttpResponse::Ok().json(CommitmentResponse {
            success: true,
            cache_key: key.to_string(),
            commitment: entry,
        }),
        Ok(None) => json_error_with_code(
            StatusCode::NOT_FOUND,
            format!("no pending reveal for {key}"),
            Some("commitment_not_found"),
        ),
        Err(e) => store_error("get_commitment", e),
    }
}

pub(crate) async fn delete_commitment(
    state: Data<AppState>,
    path: Path<(String, String, u64, u64)>,
) -> impl Responder {
    let key = match commitment_key(path.into_inner()) {
        Ok(key) => key,
        Err((msg, code)) => return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code)),
    };

    match state.commitments.delete(&key) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "cache_key": key.to_string(),
        })),
        Ok(false) => json_error_with_code(
            StatusCode::NOT_FOUND,
            format!("no pending reveal for {key}"),
            Some("commitment_not_found"),
        ),
        Err(e) => store_error("delete_commitment", e),
    }
}

pub(crate) async fn game_view(
    state: Data<AppState>,
    path: Path<(u64, String)>,
    query: Query<GameViewQuery>,
) -> impl Responder {
    let Some(ledger) = state.ledger.as_ref() else {
        return json_error_with_code(
            StatusCode::SERVICE_UNAVAILABLE,
            "no ledger snapshot is configured (set LEDGER_SNAPSHOT_PATH)",
            Some("ledger_unavailable"),
        );
    };
    let (game_number, player) = path.into_inner();
    let player = match parse_address(&player, "player") {
        Ok(player) => player,
        Err((msg, code)) => return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code)),
    };
    let now_ms = query.now_ms.unwrap_or_else(now_unix_ms);

    match read_game_view(ledger.as_ref(), Some(game_number), player, now_ms) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(err) => ledger_error(&err),
    }
}
