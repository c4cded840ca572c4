//! Drives the `chess_core_uci` binary over real stdin/stdout pipes, the way
//! a GUI would, to check the protocol handshake and a `bestmove` response.

use std::io::Write;
use std::process::{Command, Stdio};

use chess_core::board::Board;
use chess_core::uci::parse_position_command;

#[test]
fn uci_handshake_and_movetime_search_return_a_legal_bestmove() {
    let exe = env!("CARGO_BIN_EXE_chess_core_uci");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn chess_core_uci");

    let input = b"uci\nisready\nposition startpos moves e2e4\ngo movetime 100\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("uciok"));
    assert!(stdout.contains("readyok"));

    let bestmove_line = stdout
        .lines()
        .filter(|line| line.starts_with("bestmove"))
        .last()
        .expect("no bestmove line in output");
    let mv_str = bestmove_line
        .split_whitespace()
        .nth(1)
        .expect("bestmove line missing a move");
    assert_ne!(mv_str, "0000", "engine returned a null move");

    let mut board = Board::new();
    parse_position_command(&mut board, &["position", "startpos", "moves", "e2e4"]);
    let legal = board
        .generate_moves()
        .iter()
        .any(|m| m.to_string() == mv_str);
    assert!(legal, "bestmove {mv_str} is not legal in the searched position");
}

#[test]
fn depth_search_completes_synchronously_before_quit() {
    let exe = env!("CARGO_BIN_EXE_chess_core_uci");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn chess_core_uci");

    let input = b"position startpos\ngo depth 3\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.lines().any(|l| l.starts_with("bestmove")));
}
