//! UCI entry point: `chess_core_uci` reads UCI commands on stdin and writes
//! `info`/`bestmove` lines to stdout. All engine logic lives in the
//! `chess_core` library crate; this binary is a thin shim.

fn main() {
    chess_core::uci::run();
}
