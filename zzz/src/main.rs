use std::path::PathBuf;

use alloy_primitives::U256;
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zigzagzog_core::constants::RECENT_GAMES_DEFAULT;
use zigzagzog_core::ledger::{read_game_state, read_recent_games, read_rounds};
use zigzagzog_core::rounds::entering_plays;
use zigzagzog_core::{
    eliminate, game_end_reason, read_game_view, zigzagzog_domain, Commitment, CommitmentKey,
    Ledger, RoundRevealState, ShapeCounts,
};

mod cache;
mod util;

use cache::{PendingCache, PendingReveal};
use util::{load_snapshot, now_ms, parse_address, parse_u256, read_json};

#[derive(Parser, Debug)]
#[command(name = "zzz")]
#[command(about = "ZigZagZog client: round resolution, game views and commitments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the zzz version
    Version,
    /// Resolve which shape a round's reveal totals eliminate
    Elimination {
        #[arg(long, default_value_t = 0)]
        circles: u64,
        #[arg(long, default_value_t = 0)]
        squares: u64,
        #[arg(long, default_value_t = 0)]
        triangles: u64,
    },
    /// Evaluate the game-end rules against a round reveal state (JSON)
    GameEnd {
        #[arg(long)]
        reveal_state: PathBuf,
    },
    /// Full game view for a player from a ledger snapshot
    View {
        #[arg(long)]
        ledger: PathBuf,
        #[arg(long)]
        player: String,
        /// Defaults to the current game
        #[arg(long)]
        game: Option<u64>,
        /// Defaults to the wall clock
        #[arg(long)]
        now_ms: Option<u64>,
    },
    /// Round history with entering and surviving plays
    Rounds {
        #[arg(long)]
        ledger: PathBuf,
        #[arg(long)]
        player: String,
        #[arg(long)]
        game: Option<u64>,
    },
    /// Games the player bought into among the most recent game numbers
    Recent {
        #[arg(long)]
        ledger: PathBuf,
        #[arg(long)]
        player: String,
        #[arg(long, default_value_t = RECENT_GAMES_DEFAULT)]
        limit: u64,
    },
    /// Commitment hashing and the pending-reveal cache
    Sig {
        #[command(subcommand)]
        command: SigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SigCommand {
    /// Print the EIP-712 hash of a shape selection
    Hash {
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        nonce: String,
    },
    /// Hash a selection under a fresh random nonce and cache it for the reveal
    Commit {
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        player: String,
        #[arg(long, default_value = "zzz-pending.json")]
        cache: PathBuf,
    },
    /// Show (and optionally drop) a cached pending reveal
    Pending {
        #[arg(long, default_value = "zzz-pending.json")]
        cache: PathBuf,
        #[arg(long)]
        zzz: String,
        #[arg(long)]
        player: String,
        #[arg(long)]
        game: u64,
        #[arg(long)]
        round: u64,
        #[arg(long, default_value_t = false)]
        remove: bool,
    },
}

#[derive(Args, Debug)]
struct Selection {
    #[arg(long, default_value_t = 1)]
    chain_id: u64,
    /// ZigZagZog contract address
    #[arg(long)]
    zzz: String,
    #[arg(long)]
    game: u64,
    #[arg(long)]
    round: u64,
    #[arg(long, default_value_t = 0)]
    circles: u64,
    #[arg(long, default_value_t = 0)]
    squares: u64,
    #[arg(long, default_value_t = 0)]
    triangles: u64,
}

impl Selection {
    fn commitment(&self, nonce: U256) -> Result<Commitment> {
        let shapes = ShapeCounts::new(self.circles, self.squares, self.triangles);
        if shapes.is_empty() {
            return Err(anyhow!("select at least one shape"));
        }
        Ok(Commitment {
            nonce,
            game_number: self.game,
            round_number: self.round,
            shapes,
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::Version => {
            println!("zzz {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Elimination {
            circles,
            squares,
            triangles,
        } => {
            let counts = ShapeCounts::new(circles, squares, triangles);
            let result = eliminate(&counts);
            println!("counts={counts}");
            println!("result={result}");
            match result.survivors() {
                Some([first, second]) => println!("survivors={first},{second}"),
                None => println!("survivors=circle,square,triangle"),
            }
        }
        Commands::GameEnd { reveal_state } => {
            let state: RoundRevealState = read_json(&reveal_state)?;
            let reason = game_end_reason(&state);
            println!("elimination={}", state.elimination());
            println!("will_end={}", reason.is_some());
            if let Some(reason) = reason {
                println!("reason={reason}");
            }
        }
        Commands::View {
            ledger,
            player,
            game,
            now_ms: at,
        } => {
            let ledger = load_snapshot(&ledger)?;
            let player = parse_address(&player)?;
            let at = match at {
                Some(at) => at,
                None => now_ms()?,
            };
            let view = read_game_view(&ledger, game, player, at)?;
            tracing::info!(
                game = view.game_state.game_number,
                phase = %view.game_and_round_state.phase(),
                "resolved game view"
            );
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Rounds {
            ledger,
            player,
            game,
        } => {
            let ledger = load_snapshot(&ledger)?;
            let player = parse_address(&player)?;
            let game_number = match game {
                Some(game) => game,
                None => ledger.current_game_number()?,
            };
            let state = read_game_state(&ledger, game_number, player)?;
            let rounds = read_rounds(&ledger, game_number, state.round_number, player)?;
            let purchased = ledger.purchased_plays(game_number, player)?;
            let entering = entering_plays(purchased, &rounds);

            println!("game={game_number}");
            println!("purchased={purchased}");
            for (round, entered) in rounds.iter().zip(entering) {
                println!(
                    "round={} entering={} revealed={} result={} surviving={}",
                    round.round_number,
                    entered,
                    round.player_revealed,
                    round.elimination_result,
                    round.surviving_plays
                );
            }
        }
        Commands::Recent {
            ledger,
            player,
            limit,
        } => {
            let ledger = load_snapshot(&ledger)?;
            let player = parse_address(&player)?;
            let games = read_recent_games(&ledger, player, limit)?;
            if games.is_empty() {
                println!("no games among the last {limit}");
            }
            for game in games {
                println!(
                    "game={} round={} purchased={} surviving={} cashed_out={}",
                    game.game_number,
                    game.round_number,
                    game.purchased_plays,
                    game.surviving_plays,
                    game.cashed_out
                );
            }
        }
        Commands::Sig { command } => run_sig(command)?,
    }

    Ok(())
}

fn run_sig(command: SigCommand) -> Result<()> {
    match command {
        SigCommand::Hash { selection, nonce } => {
            let contract = parse_address(&selection.zzz)?;
            let commitment = selection.commitment(parse_u256(&nonce)?)?;
            let hash = commitment.signing_hash(&zigzagzog_domain(selection.chain_id, contract));
            println!("{hash}");
        }
        SigCommand::Commit {
            selection,
            player,
            cache,
        } => {
            let contract = parse_address(&selection.zzz)?;
            let player = parse_address(&player)?;
            let nonce = U256::from_be_bytes(rand::random::<[u8; 32]>());
            let commitment = selection.commitment(nonce)?;
            let hash = commitment.signing_hash(&zigzagzog_domain(selection.chain_id, contract));
            let key = CommitmentKey {
                contract,
                player,
                game_number: selection.game,
                round_number: selection.round,
            };

            let mut pending = PendingCache::load(&cache)?;
            let replaced = pending.insert(
                &key,
                PendingReveal {
                    chain_id: selection.chain_id,
                    commitment,
                    hash,
                    created_at_ms: now_ms()?,
                },
            );
            pending
                .save(&cache)
                .with_context(|| format!("failed storing pending reveal {key}"))?;
            if replaced.is_some() {
                tracing::warn!(%key, "replaced an earlier pending reveal");
            }
            tracing::info!(%key, plays = commitment.total_plays(), "cached pending reveal");

            println!("key={key}");
            println!("nonce={nonce}");
            println!("hash={hash}");
            println!("cache={}", cache.display());
        }
        SigCommand::Pending {
            cache,
            zzz,
            player,
            game,
            round,
            remove,
        } => {
            let key = CommitmentKey {
                contract: parse_address(&zzz)?,
                player: parse_address(&player)?,
                game_number: game,
                round_number: round,
            };
            let mut pending = PendingCache::load(&cache)?;
            let reveal = if remove {
                pending.remove(&key)
            } else {
                pending.get(&key).cloned()
            };
            let reveal = reveal.ok_or_else(|| anyhow!("no pending reveal for {key}"))?;
            println!("{}", serde_json::to_string_pretty(&reveal)?);
            if remove {
                pending.save(&cache)?;
                tracing::info!(%key, "dropped pending reveal");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(circles: u64, squares: u64, triangles: u64) -> Selection {
        Selection {
            chain_id: 1,
            zzz: "0x2222222222222222222222222222222222222222".to_string(),
            game: 7,
            round: 3,
            circles,
            squares,
            triangles,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn empty_selection_is_refused() {
        let err = selection(0, 0, 0)
            .commitment(U256::from(1u64))
            .unwrap_err();
        assert!(err.to_string().contains("at least one shape"));
        assert!(selection(0, 1, 0)
            .commitment(U256::from(1u64))
            .is_ok());
    }

    #[test]
    fn parses_nested_sig_commands() {
        let cli = Cli::try_parse_from([
            "zzz",
            "sig",
            "hash",
            "--chain-id",
            "13746",
            "--zzz",
            "0x2222222222222222222222222222222222222222",
            "--game",
            "7",
            "--round",
            "3",
            "--circles",
            "2",
            "--nonce",
            "0x2a",
        ])
        .unwrap();
        match cli.command {
            Commands::Sig {
                command: SigCommand::Hash { selection, nonce },
            } => {
                assert_eq!(selection.chain_id, 13_746);
                assert_eq!(selection.circles, 2);
                assert_eq!(selection.squares, 0);
                assert_eq!(nonce, "0x2a");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn recent_limit_defaults_to_ten() {
        let cli = Cli::try_parse_from([
            "zzz",
            "recent",
            "--ledger",
            "snapshot.json",
            "--player",
            "0x1111111111111111111111111111111111111111",
        ])
        .unwrap();
        match cli.command {
            Commands::Recent { limit, .. } => assert_eq!(limit, 10),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
