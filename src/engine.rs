//! Move-engine adapter: FEN in, UCI best move out.
//!
//! [`UciEngine`] drives an external engine executable (Stockfish or any
//! UCI-speaking program) over piped stdin/stdout: one handshake at startup,
//! then strictly one `position fen` / `go movetime` exchange per query.
//! The child is told to quit and is reaped on drop, on every exit path.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::board::{PieceKind, Square};
use crate::error::GambitError;

/// A move in UCI notation: source square, destination square, optional
/// promotion piece. Beyond its two squares the planner treats it as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl UciMove {
    /// Parses four-or-five-character UCI move text such as `e2e4` or `e7e8q`.
    ///
    /// # Errors
    /// [`GambitError::MalformedMove`] when the text is not a valid square
    /// pair with an optional promotion letter.
    pub fn parse(text: &str) -> Result<Self, GambitError> {
        let malformed = || GambitError::MalformedMove(text.to_string());

        if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
            return Err(malformed());
        }
        let from = Square::parse(&text[0..2]).ok_or_else(malformed)?;
        let to = Square::parse(&text[2..4]).ok_or_else(malformed)?;
        let promotion = match text.as_bytes().get(4) {
            None => None,
            Some(b'q') => Some(PieceKind::Queen),
            Some(b'r') => Some(PieceKind::Rook),
            Some(b'b') => Some(PieceKind::Bishop),
            Some(b'n') => Some(PieceKind::Knight),
            Some(_) => return Err(malformed()),
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl std::fmt::Display for UciMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            let c = match kind {
                PieceKind::Queen => 'q',
                PieceKind::Rook => 'r',
                PieceKind::Bishop => 'b',
                PieceKind::Knight => 'n',
                _ => unreachable!("promotion is restricted at parse time"),
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Anything that can turn a FEN position into a best move.
pub trait MoveEngine {
    /// Returns the engine's best move for the given position.
    fn best_move(&mut self, fen: &str) -> Result<UciMove, GambitError>;
}

/// Options applied once at engine startup.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Search threads.
    pub threads: u32,
    /// Engine skill level (Stockfish convention, 20 = full strength).
    pub skill_level: u32,
    /// Per-query think time in milliseconds.
    pub movetime_ms: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 2,
            skill_level: 20,
            movetime_ms: 2000,
        }
    }
}

/// A UCI engine subprocess.
#[derive(Debug)]
pub struct UciEngine {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    movetime_ms: u64,
}

impl UciEngine {
    /// Spawns the engine at `path` and performs the UCI handshake.
    ///
    /// # Errors
    /// [`GambitError::EngineStart`] when the process cannot be spawned,
    /// [`GambitError::EngineProtocol`] when the handshake goes wrong.
    pub fn spawn(path: &Path, options: &EngineOptions) -> Result<Self, GambitError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| GambitError::EngineStart {
                path: path.to_path_buf(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .map(BufWriter::new)
            .ok_or_else(|| GambitError::EngineProtocol("no stdin handle".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| GambitError::EngineProtocol("no stdout handle".to_string()))?;

        let mut engine = Self {
            child,
            stdin,
            stdout,
            movetime_ms: options.movetime_ms,
        };

        engine.send("uci")?;
        engine.wait_for("uciok")?;
        engine.send(&format!("setoption name Threads value {}", options.threads))?;
        engine.send(&format!(
            "setoption name Skill Level value {}",
            options.skill_level
        ))?;
        engine.send("isready")?;
        engine.wait_for("readyok")?;

        Ok(engine)
    }

    fn send(&mut self, command: &str) -> Result<(), GambitError> {
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads lines until one equals `token`, discarding everything else.
    fn wait_for(&mut self, token: &str) -> Result<(), GambitError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.stdout.read_line(&mut line)?;
            if read == 0 {
                return Err(GambitError::EngineProtocol(format!(
                    "engine closed its output before sending '{}'",
                    token
                )));
            }
            if line.trim() == token {
                return Ok(());
            }
        }
    }
}

impl MoveEngine for UciEngine {
    fn best_move(&mut self, fen: &str) -> Result<UciMove, GambitError> {
        self.send(&format!("position fen {}", fen))?;
        self.send(&format!("go movetime {}", self.movetime_ms))?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = self.stdout.read_line(&mut line)?;
            if read == 0 {
                return Err(GambitError::EngineProtocol(
                    "engine closed its output before sending 'bestmove'".to_string(),
                ));
            }
            let line = line.trim();
            // `info ...` search chatter is skipped; only the final line matters.
            if let Some(rest) = line.strip_prefix("bestmove") {
                let Some(text) = rest.split_whitespace().next() else {
                    return Err(GambitError::EngineProtocol(
                        "bestmove line carried no move".to_string(),
                    ));
                };
                if text == "(none)" {
                    return Err(GambitError::NoBestMove);
                }
                return UciMove::parse(text);
            }
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.child.wait();
    }
}
