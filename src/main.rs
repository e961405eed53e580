use std::io::{stdin, stdout, BufRead, Write};

mod advisory;
mod chess_board;
mod perft;

use clap::arg;
use clap::command;
use clap::Command;

use tabled::settings::Style;
use tabled::Table;
use tabled::Tabled;

use tracing_subscriber::EnvFilter;

use advisory::AdvisoryClient;
use chess_board::fen::INITIAL_POSITION;
use chess_board::{ChessBoard, Colour, GameOutcome, PieceKind};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = command!()
        .propagate_version(true)
        .subcommand(
            Command::new("play")
                .about("Play a game in the terminal")
                .arg(
                    arg!(
                    -f --fen <FEN> "Starting position"
                            )
                    .default_value(INITIAL_POSITION),
                )
                .arg(arg!(
                    -c --computer "Let the advisory service play Black"
                )),
        )
        .subcommand(
            Command::new("perft")
                .about("Count legal move paths per first move")
                .arg(
                    arg!(
                    -f --fen <FEN> "Board position"
                            )
                    .default_value(INITIAL_POSITION),
                )
                .arg(
                    arg!(
                    -x --depth <d> "depth"
                            )
                    .default_value("3")
                    .value_parser(clap::value_parser!(u8)),
                ),
        )
        .subcommand(
            Command::new("fen")
                .about("Print the position string after a move sequence")
                .arg(
                    arg!(
                    -m --moves <moves> "List of moves"
                            )
                    .num_args(0..)
                    .value_parser(clap::value_parser!(String)),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("play", arg_matches)) => {
            let fen = arg_matches.get_one::<String>("fen").unwrap();
            play(fen, arg_matches.get_flag("computer"));
        }
        Some(("perft", arg_matches)) => {
            let fen = arg_matches.get_one::<String>("fen").unwrap();
            let depth = *arg_matches.get_one::<u8>("depth").unwrap();
            run_perft(fen, depth);
        }
        Some(("fen", arg_matches)) => {
            let moves = arg_matches
                .get_many::<String>("moves")
                .unwrap_or_default()
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>();
            print_fen(moves);
        }
        None => {
            play(INITIAL_POSITION, false);
        }
        _ => unreachable!("Exhausted list of subcommands"),
    }
}

fn play(fen: &str, computer: bool) {
    let mut board = match ChessBoard::from_fen(fen) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Invalid position: {}", e);
            return;
        }
    };
    let advisor = computer.then(AdvisoryClient::new);
    let mut lines = stdin().lock().lines();

    loop {
        println!("{}", board.render_to_string());
        if board.check_state().is_in_check() {
            println!("{:?} is in check", board.side_to_move());
        }
        match board.outcome() {
            GameOutcome::Checkmate => {
                println!("checkmate");
                return;
            }
            GameOutcome::Stalemate => {
                println!("stalemate");
                return;
            }
            GameOutcome::Ongoing => {}
        }

        if let (Some(client), Colour::Black) = (&advisor, board.side_to_move()) {
            let mv = match client.best_move(&board.to_fen()) {
                Ok(mv) => mv,
                Err(e) => {
                    eprintln!("Advisory request failed: {}", e);
                    return;
                }
            };
            println!(
                "advisory plays {}{}",
                mv.from.as_algebraic(),
                mv.to.as_algebraic()
            );
            if let Err(e) = board.apply_move(mv.from, mv.to, mv.promotion) {
                eprintln!("Advisory move rejected: {}", e);
                return;
            }
            continue;
        }

        print!("{:?} to move (e.g. e2e4, e7e8q, quit)> ", board.side_to_move());
        stdout().flush().unwrap();
        let line = match lines.next() {
            Some(Ok(line)) => line.trim().to_string(),
            _ => return,
        };
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            return;
        }

        let mv = match advisory::parse_move(&line) {
            Ok(mv) => mv,
            Err(_) => {
                println!("Moves look like e2e4 or e7e8q");
                continue;
            }
        };
        if needs_promotion_kind(&board, mv.from, mv.to) && mv.promotion.is_none() {
            println!("That pawn promotes: add a piece letter, e.g. {}q", line);
            continue;
        }
        if let Err(e) = board.apply_move(mv.from, mv.to, mv.promotion) {
            println!("{}", e);
        }
    }
}

/// A pawn landing on the far rank needs the promotion parameter; the engine
/// accepts the move either way, so the loop enforces it for human input.
fn needs_promotion_kind(
    board: &ChessBoard,
    from: chess_board::Coords,
    to: chess_board::Coords,
) -> bool {
    matches!(
        board.piece_at(from),
        Some(piece) if piece.kind == PieceKind::Pawn && (to.row == 0 || to.row == 7)
    )
}

#[derive(Tabled)]
struct PerftRow {
    first_move: String,
    nodes: u64,
}

fn run_perft(fen: &str, depth: u8) {
    println!("Perft for {} with depth {}", fen, depth);
    let board = match ChessBoard::from_fen(fen) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Invalid position: {}", e);
            return;
        }
    };
    if depth == 0 {
        println!("\nNodes searched: 1");
        return;
    }

    let mut rows = Vec::new();
    for (&from, destinations) in board.legal_moves() {
        for &to in destinations {
            for promotion in perft::promotion_choices(&board, from, to) {
                let mut next = board.clone();
                next.apply_move(from, to, promotion)
                    .expect("generated moves must be legal");
                let label = match promotion {
                    Some(kind) => format!(
                        "{}{}{}",
                        from.as_algebraic(),
                        to.as_algebraic(),
                        kind.letter()
                    ),
                    None => format!("{}{}", from.as_algebraic(), to.as_algebraic()),
                };
                rows.push(PerftRow {
                    first_move: label,
                    nodes: perft::perft(&next, depth - 1),
                });
            }
        }
    }
    rows.sort_by(|a, b| a.first_move.cmp(&b.first_move));

    let total: u64 = rows.iter().map(|row| row.nodes).sum();
    println!("{}", Table::new(rows).with(Style::modern()));
    println!("\nNodes searched: {}", total);
}

fn print_fen(moves: Vec<&String>) {
    let mut board = ChessBoard::new();
    for mv in moves {
        let parsed = match advisory::parse_move(mv) {
            Ok(parsed) => parsed,
            Err(_) => {
                eprintln!("Unreadable move: {} (expected e2e4 or e7e8q)", mv);
                return;
            }
        };
        if let Err(e) = board.apply_move(parsed.from, parsed.to, parsed.promotion) {
            eprintln!("Move {} rejected: {}", mv, e);
            return;
        }
    }
    println!("{}", board.to_fen());
}
