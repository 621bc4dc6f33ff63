use std::io::{self, BufRead, Write};
use std::str::FromStr;

use board_game_traits::{Color, GameResult};
use clap::{Arg, Command};
use log::{debug, error, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use tablut::board::{Board, Move};
use tablut::error::TablutError;
use tablut::search::{Ai, AiSettings};


/// Who picks the moves for one side
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PlayerKind {
    Manual,
    Auto,
    Random,
}

impl FromStr for PlayerKind {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "manual" => Ok(PlayerKind::Manual),
            "auto" => Ok(PlayerKind::Auto),
            "random" => Ok(PlayerKind::Random),
            _ => Err(format!("Unknown player \"{}\"", input)),
        }
    }
}

struct Game {
    board: Board,
    move_limit: Option<usize>,
    base_depth: u32,
    white: PlayerKind,
    black: PlayerKind,
    white_ai: Ai,
    black_ai: Ai,
    rng: SmallRng,
}

impl Game {
    fn new(
        base_depth: u32,
        move_limit: Option<usize>,
        seed: u64,
        white: PlayerKind,
        black: PlayerKind,
    ) -> Result<Self, TablutError> {
        let mut game = Game {
            board: Board::default(),
            move_limit,
            base_depth,
            white,
            black,
            white_ai: Ai::default(),
            black_ai: Ai::default(),
            rng: SmallRng::seed_from_u64(seed),
        };
        game.reset()?;
        Ok(game)
    }

    /// Starts a new game, keeping the players and the move limit
    fn reset(&mut self) -> Result<(), TablutError> {
        self.board.init();
        if let Some(limit) = self.move_limit {
            self.board.set_move_limit(limit)?;
        }
        self.white_ai = Ai::new(self.settings_for(self.white));
        self.black_ai = Ai::new(self.settings_for(self.black));
        Ok(())
    }

    fn settings_for(&self, kind: PlayerKind) -> AiSettings {
        AiSettings::default()
            .base_depth(self.base_depth)
            .random_play(kind == PlayerKind::Random)
    }

    fn set_player(&mut self, color: Color, kind: PlayerKind) {
        let settings = self.settings_for(kind);
        match color {
            Color::White => {
                self.white = kind;
                self.white_ai = Ai::new(settings);
            }
            Color::Black => {
                self.black = kind;
                self.black_ai = Ai::new(settings);
            }
        }
        info!("{} is now played by {:?}", color, kind);
    }

    fn player(&self, color: Color) -> PlayerKind {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Lets the computer move until the game is over, or a manual player is to move
    fn play_computer_moves(&mut self) -> Result<(), TablutError> {
        while self.board.winner().is_none() && self.player(self.board.turn()) != PlayerKind::Manual
        {
            let side = self.board.turn();
            let ai = match side {
                Color::White => &mut self.white_ai,
                Color::Black => &mut self.black_ai,
            };
            match ai.find_move(&self.board, &mut self.rng)? {
                Some(mv) => {
                    self.board.try_make_move(mv)?;
                    println!("{} played {}", side, mv);
                    println!("{:?}", self.board);
                }
                None => {
                    warn!("{} found no move\n{:?}", side, self.board);
                    break;
                }
            }
        }
        Ok(())
    }

    fn print_status(&self) {
        match self.board.game_result() {
            None => println!("{} to move:", self.board.turn()),
            Some(GameResult::WhiteWin) => println!("White won! Type new to play again."),
            Some(GameResult::BlackWin) => println!("Black won! Type new to play again."),
            Some(GameResult::Draw) => println!("The game was drawn! Type new to play again."),
        }
    }

    /// Runs one command. Returns `false` when the driver should exit.
    fn handle_command(&mut self, words: &[&str]) -> Result<bool, TablutError> {
        match words {
            ["quit"] | ["exit"] => return Ok(false),
            ["new"] => {
                self.reset()?;
                println!("{:?}", self.board);
            }
            ["undo"] => {
                self.board.undo();
                // Take back the computer's reply as well, so the manual player is to move again
                if self.player(self.board.turn()) != PlayerKind::Manual
                    && self.player(!self.board.turn()) == PlayerKind::Manual
                {
                    self.board.undo();
                }
                println!("{:?}", self.board);
            }
            ["dump"] => println!("{}", self.board.encoded_board()),
            ["limit", limit] => {
                let limit = parse_number(limit)?;
                self.board.set_move_limit(limit as usize)?;
                self.move_limit = Some(limit as usize);
            }
            ["seed", seed] => {
                self.rng = SmallRng::seed_from_u64(parse_number(seed)?);
            }
            [kind @ ("auto" | "manual" | "random"), color] => {
                let color = parse_color(color)?;
                let kind = PlayerKind::from_str(kind).map_err(TablutError::InvalidConfiguration)?;
                self.set_player(color, kind);
            }
            [mv] => {
                let mv = Move::from_string(mv)?;
                self.board.try_make_move(mv)?;
                println!("{:?}", self.board);
            }
            _ => {
                return Err(TablutError::InvalidConfiguration(format!(
                    "Unknown command \"{}\"",
                    words.join(" ")
                )))
            }
        }
        Ok(true)
    }
}

fn parse_number(input: &str) -> Result<u64, TablutError> {
    input
        .parse()
        .map_err(|_| TablutError::InvalidConfiguration(format!("Expected a number, got \"{}\"", input)))
}

fn parse_color(input: &str) -> Result<Color, TablutError> {
    match input {
        "white" => Ok(Color::White),
        "black" => Ok(Color::Black),
        _ => Err(TablutError::InvalidConfiguration(format!(
            "Expected white or black, got \"{}\"",
            input
        ))),
    }
}

fn player_arg(name: &'static str, env: &'static str, default: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .env(env)
        .help(format!("Who plays {}", name))
        .num_args(1)
        .default_value(default)
        .value_parser(["manual", "auto", "random"])
}

fn main() -> io::Result<()> {
    let matches = Command::new("Tablut")
        .version("0.1")
        .about("Play Tablut against the computer, or watch it play itself")
        .arg(
            Arg::new("seed")
                .long("seed")
                .env("SEED")
                .help("Seed for the computer's random choices")
                .num_args(1)
                .default_value("0")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("moveLimit")
                .long("move-limit")
                .env("MOVE_LIMIT")
                .value_name("MOVES")
                .help("Maximum number of moves for each side. The side that reaches it loses.")
                .num_args(1)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("depth")
                .long("depth")
                .env("DEPTH")
                .help("Search depth in plies before the endgame")
                .num_args(1)
                .default_value("2")
                .value_parser(clap::value_parser!(u32).range(1..=6)),
        )
        .arg(
            Arg::new("logfile")
                .short('l')
                .long("log-file")
                .env("LOGFILE")
                .value_name("tablut.log")
                .help("Name of debug logfile")
                .num_args(1),
        )
        .arg(player_arg("white", "WHITE", "auto"))
        .arg(player_arg("black", "BLACK", "manual"))
        .get_matches();

    let log_dispatcher = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });

    let logger = if let Some(log_file) = matches.get_one::<String>("logfile") {
        log_dispatcher
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Trace)
                    .chain(fern::log_file(log_file)?),
            )
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Warn)
                    .chain(io::stderr()),
            )
    } else {
        log_dispatcher
            .level(log::LevelFilter::Warn)
            .chain(io::stderr())
    };
    logger
        .apply()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let seed = matches.get_one::<u64>("seed").copied().unwrap_or_default();
    let depth = matches.get_one::<u32>("depth").copied().unwrap_or(2);
    let move_limit = matches
        .get_one::<u64>("moveLimit")
        .map(|limit| *limit as usize);
    let player = |name: &str| {
        matches
            .get_one::<String>(name)
            .and_then(|kind| PlayerKind::from_str(kind).ok())
            .unwrap_or(PlayerKind::Manual)
    };

    let mut game = match Game::new(depth, move_limit, seed, player("white"), player("black")) {
        Ok(game) => game,
        Err(err) => {
            error!("{}", err);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, err.to_string()));
        }
    };
    debug!(
        "Starting game with depth {}, seed {}, move limit {:?}",
        depth, seed, move_limit
    );
    println!("{:?}", game.board);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if let Err(err) = game.play_computer_moves() {
            error!("{}", err);
            println!("Error: {}", err);
        }
        game.print_status();
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        match game.handle_command(&words) {
            Ok(true) => (),
            Ok(false) => break,
            Err(err) => {
                warn!("Command \"{}\" failed: {}", line.trim(), err);
                println!("{}, try again.", err);
            }
        }
    }
    Ok(())
}
