//! The UCI (Universal Chess Interface) command loop: the external
//! collaborator that turns stdin lines into calls against [`crate::board`]
//! and [`crate::search`], and turns search progress back into `info` /
//! `bestmove` lines on stdout.
//!
//! This module deliberately owns a plain [`Board`] and
//! [`TranspositionTable`] rather than going through [`crate::engine::
//! Session`]: a UCI `go` must run on a background thread so `stop` can be
//! read from stdin while the search is in flight, and the search core's
//! `&mut TranspositionTable` borrow makes that table impossible to share
//! across the thread boundary without locking it on every node. Each `go`
//! therefore hands its search thread a fresh table sized from the last
//! `setoption name Hash`; continuity of transposition entries holds within
//! one `go`'s iterative deepening, not across separate `go` commands. A
//! library caller wanting a long-lived shared table should use
//! [`crate::engine::Session`] instead.

use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::board::{make_move_uci, Board};
use crate::config;
use crate::search::{self, TimeControl};
use crate::search_control;
use crate::transposition_table::TranspositionTable;
use crate::types::Move;
use crate::uci_info::{self, Info};

const ENGINE_NAME: &str = "chess_core";
const ENGINE_AUTHOR: &str = "chess_core contributors";

/// Apply a `position [startpos|fen ...] [moves ...]` command to `board`.
/// Malformed FEN or an illegal move in the `moves` list is reported to
/// stderr and otherwise ignored, per the collaborator's error-handling
/// contract (the core assumes a valid position; this layer surfaces the
/// complaint).
pub fn parse_position_command(board: &mut Board, parts: &[&str]) {
    let mut i = 1;
    if parts.get(i) == Some(&"startpos") {
        *board = Board::new();
        i += 1;
    } else if parts.get(i) == Some(&"fen") {
        let fen_parts: Vec<&str> = parts[i + 1..]
            .iter()
            .take_while(|&&p| p != "moves")
            .copied()
            .collect();
        let fen = fen_parts.join(" ");
        match Board::try_from_fen(&fen) {
            Ok(parsed) => *board = parsed,
            Err(e) => {
                eprintln!("info string invalid fen '{fen}': {e}");
                #[cfg(feature = "logging")]
                log::warn!("rejected fen '{fen}': {e}");
            }
        }
        i += 1 + fen_parts.len();
    }

    if parts.get(i) == Some(&"moves") {
        i += 1;
        while i < parts.len() {
            if make_move_uci(board, parts[i]).is_err() {
                eprintln!("info string illegal move in position command: {}", parts[i]);
                #[cfg(feature = "logging")]
                log::warn!("illegal move in position command: {}", parts[i]);
            }
            i += 1;
        }
    }
}

struct GoRequest {
    depth: Option<u32>,
    movetime: Option<Duration>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: u64,
    binc: u64,
    movestogo: Option<u64>,
    nodes: Option<u64>,
    infinite: bool,
    perft_depth: Option<u32>,
}

fn parse_go_command(parts: &[&str]) -> GoRequest {
    let mut req = GoRequest {
        depth: None,
        movetime: None,
        wtime: None,
        btime: None,
        winc: 0,
        binc: 0,
        movestogo: None,
        nodes: None,
        infinite: false,
        perft_depth: None,
    };

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                req.depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "movetime" => {
                req.movetime = parts
                    .get(i + 1)
                    .and_then(|s| s.parse().ok())
                    .map(Duration::from_millis);
                i += 2;
            }
            "wtime" => {
                req.wtime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "btime" => {
                req.btime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "winc" => {
                req.winc = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "binc" => {
                req.binc = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "movestogo" => {
                req.movestogo = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "nodes" => {
                req.nodes = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "infinite" | "ponder" => {
                req.infinite = true;
                i += 1;
            }
            "perft" => {
                req.perft_depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "mate" => {
                // Mate search is a depth-limited search in practice; treat
                // "mate N" as a request to search N*2 plies deep.
                req.depth = parts
                    .get(i + 1)
                    .and_then(|s| s.parse::<u32>().ok())
                    .map(|n| n * 2);
                i += 2;
            }
            _ => i += 1,
        }
    }
    req
}

/// A budget + depth pair resolved from a [`GoRequest`] and the side to move.
struct SearchPlan {
    depth: Option<u32>,
    budget: Option<Duration>,
}

fn resolve_plan(req: &GoRequest, board: &Board) -> SearchPlan {
    if req.infinite {
        return SearchPlan {
            depth: req.depth,
            budget: Some(Duration::from_secs(3600)),
        };
    }
    if let Some(movetime) = req.movetime {
        return SearchPlan {
            depth: req.depth,
            budget: Some(movetime),
        };
    }
    if req.depth.is_some() && req.wtime.is_none() && req.btime.is_none() {
        return SearchPlan {
            depth: req.depth,
            budget: None,
        };
    }

    let remaining = if board.side_to_move() == crate::types::Color::White {
        req.wtime
    } else {
        req.btime
    };
    let increment = if board.side_to_move() == crate::types::Color::White {
        req.winc
    } else {
        req.binc
    };

    match remaining {
        Some(remaining_ms) => {
            let budget = search::allocate_budget(TimeControl {
                remaining_ms,
                increment_ms: increment,
                moves_to_go: req.movestogo,
            });
            SearchPlan {
                depth: req.depth,
                budget: Some(budget),
            }
        }
        None => SearchPlan {
            depth: req.depth.or(Some(6)),
            budget: None,
        },
    }
}

/// Run the UCI command loop against stdin/stdout until `quit` or EOF.
pub fn run() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut board = Board::new();
    let mut hash_mb = config::search::DEFAULT_TT_MB;

    let mut search_thread: Option<JoinHandle<()>> = None;

    let (info_tx, info_rx) = uci_info::channel();
    let printer = thread::spawn(move || {
        let stdout = io::stdout();
        while let Ok(info) = info_rx.recv() {
            let mut lock = stdout.lock();
            writeln!(lock, "{}", info.to_uci_line()).ok();
            lock.flush().ok();
        }
    });

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };

        #[cfg(feature = "logging")]
        log::trace!("uci: received {line}");

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "uci" => {
                println!("id name {ENGINE_NAME}");
                println!("id author {ENGINE_AUTHOR}");
                println!(
                    "option name Hash type spin default {} min 1 max 32768",
                    config::search::DEFAULT_TT_MB
                );
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "setoption" => {
                if let Some(name_idx) = parts.iter().position(|&p| p == "name") {
                    if let Some(value_idx) = parts.iter().position(|&p| p == "value") {
                        let name = parts[name_idx + 1..value_idx].join(" ");
                        let value = parts[value_idx + 1..].join(" ");
                        if name.eq_ignore_ascii_case("Hash") {
                            if let Ok(mb) = value.parse::<usize>() {
                                hash_mb = mb.max(1);
                                #[cfg(feature = "logging")]
                                log::info!("hash table resized to {hash_mb} MB");
                            } else {
                                eprintln!("info string invalid Hash value '{value}'");
                                #[cfg(feature = "logging")]
                                log::warn!("rejected setoption Hash value '{value}'");
                            }
                        }
                    }
                }
            }
            "ucinewgame" => {
                board = Board::new();
                search_control::reset();
            }
            "position" => parse_position_command(&mut board, &parts),
            "go" => {
                if let Some(handle) = search_thread.take() {
                    search_control::set_stop(true);
                    let _ = handle.join();
                }

                let req = parse_go_command(&parts);

                if let Some(depth) = req.perft_depth {
                    let start = Instant::now();
                    let nodes = crate::board::perft(&board, depth);
                    println!("info string perft({depth}) = {nodes} nodes in {:?}", start.elapsed());
                } else {
                    let plan = resolve_plan(&req, &board);
                    search_control::reset();
                    if let Some(n) = req.nodes {
                        search_control::set_node_limit(n);
                    }

                    let board_clone = board.clone();
                    let mut tt = TranspositionTable::new(hash_mb);
                    let tx = info_tx.clone();

                    let handle = thread::spawn(move || {
                        let mut b = board_clone;
                        let start = Instant::now();

                        let (best_move, _score) = match (plan.depth, plan.budget) {
                            (Some(depth), None) => {
                                search::search_fixed_depth(&mut b, &mut tt, depth)
                            }
                            (depth, Some(budget)) => {
                                let max_depth = depth.unwrap_or(100);
                                search::search_timed(&mut b, &mut tt, budget, max_depth, |progress| {
                                    let info = Info::from_progress(progress, start.elapsed().as_millis());
                                    let _ = tx.send(info);
                                })
                            }
                            (None, None) => search::search_fixed_depth(&mut b, &mut tt, 6),
                        };

                        match best_move {
                            Some(mv) => println!("bestmove {mv}"),
                            None => println!("bestmove 0000"),
                        }
                    });
                    search_thread = Some(handle);
                }
            }
            "stop" => {
                search_control::set_stop(true);
                if let Some(handle) = search_thread.take() {
                    let _ = handle.join();
                }
            }
            "ponderhit" => {
                // Pondering itself is out of scope for this core (it would
                // require speculatively searching the opponent's predicted
                // reply); an in-flight "go ponder" search already runs as a
                // plain long search and keeps going until `stop`, so there
                // is nothing additional to switch here.
            }
            "quit" => break,
            _ => {}
        }

        stdout.flush().ok();
    }

    search_control::set_stop(true);
    if let Some(handle) = search_thread.take() {
        let _ = handle.join();
    }
    // Dropping the last `Sender` closes the printer thread's channel so its
    // `recv` loop ends and can be joined.
    drop(info_tx);
    let _ = printer.join();
}

/// Format a move the way `bestmove`/`pv` lines do: UCI long algebraic
/// notation (e.g. `e2e4`, `e7e8q`).
#[must_use]
pub fn format_uci_move(mv: &Move) -> String {
    mv.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_startpos_with_moves() {
        let mut board = Board::new();
        let parts = ["position", "startpos", "moves", "e2e4", "e7e5"];
        parse_position_command(&mut board, &parts);
        assert_eq!(board.side_to_move(), crate::types::Color::White);
    }

    #[test]
    fn parses_fen_position() {
        let mut board = Board::new();
        let parts = [
            "position", "fen", "8/8/8/8/8/8/8/K6k", "w", "-", "-", "0", "1",
        ];
        parse_position_command(&mut board, &parts);
        assert_eq!(board.all_occupancy().popcount(), 2);
    }

    #[test]
    fn invalid_move_in_moves_list_is_ignored_not_panicking() {
        let mut board = Board::new();
        let parts = ["position", "startpos", "moves", "a1a1"];
        parse_position_command(&mut board, &parts);
        assert_eq!(board.side_to_move(), crate::types::Color::White);
    }

    #[test]
    fn go_with_explicit_depth_and_no_time_control_has_no_budget() {
        let req = GoRequest {
            depth: Some(4),
            movetime: None,
            wtime: None,
            btime: None,
            winc: 0,
            binc: 0,
            movestogo: None,
            nodes: None,
            infinite: false,
            perft_depth: None,
        };
        let plan = resolve_plan(&req, &Board::new());
        assert_eq!(plan.depth, Some(4));
        assert!(plan.budget.is_none());
    }

    #[test]
    fn go_with_depth_and_wtime_still_computes_a_budget() {
        let req = GoRequest {
            depth: Some(4),
            movetime: None,
            wtime: Some(1),
            btime: Some(1),
            winc: 0,
            binc: 0,
            movestogo: None,
            nodes: None,
            infinite: false,
            perft_depth: None,
        };
        let plan = resolve_plan(&req, &Board::new());
        assert_eq!(plan.depth, Some(4));
        assert!(plan.budget.is_some());
    }

    #[test]
    fn go_with_wtime_computes_a_budget() {
        let req = GoRequest {
            depth: None,
            movetime: None,
            wtime: Some(60_000),
            btime: Some(60_000),
            winc: 0,
            binc: 0,
            movestogo: None,
            nodes: None,
            infinite: false,
            perft_depth: None,
        };
        let plan = resolve_plan(&req, &Board::new());
        assert!(plan.budget.is_some());
    }
}
