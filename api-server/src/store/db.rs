use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use rusqlite::{params, Connection, OptionalExtension};
use zigzagzog_core::{Commitment, CommitmentKey, ShapeCounts};

use super::*;

impl CommitmentStore {
    pub(super) fn upsert_row(
        conn: &Connection,
        cache_key: &str,
        entry: &StoredCommitment,
    ) -> Result<(), String> {
        let shapes = entry.commitment.shapes;
        let game_number = to_sql("game_number", entry.key.game_number)?;
        let round_number = to_sql("round_number", entry.key.round_number)?;
        conn.execute(
            "INSERT OR REPLACE INTO pending_reveals (
                cache_key, contract, player, game_number, round_number,
                chain_id, nonce, circles, squares, triangles, hash, created_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
            params![
                cache_key,
                entry.key.contract.to_string(),
                entry.key.player.to_string(),
                game_number,
                round_number,
                to_sql("chain_id", entry.chain_id)?,
                entry.commitment.nonce.to_string(),
                to_sql("circles", shapes.circles)?,
                to_sql("squares", shapes.squares)?,
                to_sql("triangles", shapes.triangles)?,
                entry.hash.to_string(),
                to_sql("created_at", entry.created_at_unix_s)?,
            ],
        )
        .map_err(|e| format!("insert commitment failed: {e}"))?;
        Ok(())
    }

    pub fn get(&self, key: &CommitmentKey) -> Result<Option<StoredCommitment>, String> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT contract, player, game_number, round_number, chain_id, nonce,
                        circles, squares, triangles, hash, created_at
                 FROM pending_reveals WHERE cache_key = ?1",
                params![key.to_string()],
                |row| {
                    Ok(RawCommitmentRow {
                        contract: row.get(0)?,
                        player: row.get(1)?,
                        game_number: row.get(2)?,
                        round_number: row.get(3)?,
                        chain_id: row.get(4)?,
                        nonce: row.get(5)?,
                        circles: row.get(6)?,
                        squares: row.get(7)?,
                        triangles: row.get(8)?,
                        hash: row.get(9)?,
                        created_at: row.get(10)?,
                    })
                },
            )
            .optional()
            .map_err(|e| format!("get commitment failed: {e}"))?;

        row.map(row_to_commitment).transpose()
    }
}

/// SQLite integers are signed; values past `i64::MAX` are rejected.
fn to_sql(column: &str, value: u64) -> Result<i64, String> {
    i64::try_from(value).map_err(|_| format!("{column} {value} does not fit in SQLite"))
}

fn from_sql(column: &str, value: i64) -> Result<u64, String> {
    u64::try_from(value).map_err(|_| format!("bad {column} in db: {value}"))
}

struct RawCommitmentRow {
    contract: String,
    player: String,
    game_number: i64,
    round_number: i64,
    chain_id: i64,
    nonce: String,
    circles: i64,
    squares: i64,
    triangles: i64,
    hash: String,
    created_at: i64,
}

fn row_to_commitment(r: RawCommitmentRow) -> Result<StoredCommitment, String> {
    let contract =
        Address::from_str(&r.contract).map_err(|e| format!("bad contract in db: {e}"))?;
    let player = Address::from_str(&r.player).map_err(|e| format!("bad player in db: {e}"))?;
    let nonce = U256::from_str(&r.nonce).map_err(|e| format!("bad nonce in db: {e}"))?;
    let hash = B256::from_str(&r.hash).map_err(|e| format!("bad hash in db: {e}"))?;

    let game_number = from_sql("game_number", r.game_number)?;
    let round_number = from_sql("round_number", r.round_number)?;

    Ok(StoredCommitment {
        key: CommitmentKey {
            contract,
            player,
            game_number,
            round_number,
        },
        chain_id: from_sql("chain_id", r.chain_id)?,
        commitment: Commitment {
            nonce,
            game_number,
            round_number,
            shapes: ShapeCounts::new(
                from_sql("circles", r.circles)?,
                from_sql("squares", r.squares)?,
                from_sql("triangles", r.triangles)?,
            ),
        },
        hash,
        created_at_unix_s: from_sql("created_at", r.created_at)?,
    })
}
