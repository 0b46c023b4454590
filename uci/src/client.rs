use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use arrayvec::ArrayVec;
use chess::ChessMove;
use evaluation::{EngineError, Evaluation, Evaluator, RankedMove, MAX_PLY};
use oracle::Position;

use super::commands::{EngineRequest, EngineResponse};
use super::decoder::Decoder;
use super::encoder::Encoder;
use super::process::EngineProcess;

/// Engine handshake is allowed more slack than a single evaluation.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace period for draining a search we gave up on.
const RESYNC_TIMEOUT: Duration = Duration::from_secs(2);

/// MultiPV window requested from the engine: how many ranked moves come
/// back per evaluation. Moves outside the window are treated as pruned.
const RANKED_LINES: usize = 8;

/// Consecutive protocol violations tolerated before the engine is
/// declared unavailable.
const PROTOCOL_STRIKE_LIMIT: u32 = 3;

/// Synchronous client for one external engine process.
///
/// Requests are serialized by `&mut self`; results are cached per
/// (position key, depth) until `clear_cache`, which callers invoke
/// between top-level searches.
pub struct EvalClient {
    process: EngineProcess,
    encoder: Encoder,
    decoder: Decoder,
    timeout: Duration,
    cache: AHashMap<(u64, u8), Evaluation>,
    protocol_strikes: u32,
}

impl EvalClient {
    /// Spawn the engine at `path` and complete the UCI handshake.
    pub fn connect(path: &Path, timeout: Duration) -> Result<Self, EngineError> {
        let process = EngineProcess::spawn(path)?;

        let mut client = Self {
            process,
            encoder: Encoder,
            decoder: Decoder,
            timeout,
            cache: AHashMap::new(),
            protocol_strikes: 0,
        };

        client.handshake()?;
        Ok(client)
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        self.send(&EngineRequest::Uci)?;
        self.wait_for(|r| matches!(r, EngineResponse::UciOk))?;

        self.send(&EngineRequest::SetOption {
            name: "MultiPV".to_string(),
            value: RANKED_LINES.to_string(),
        })?;

        self.send(&EngineRequest::IsReady)?;
        self.wait_for(|r| matches!(r, EngineResponse::ReadyOk))?;

        Ok(())
    }

    /// Reset engine state between unrelated runs.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.send(&EngineRequest::NewGame)?;
        self.send(&EngineRequest::IsReady)?;
        self.wait_for(|r| matches!(r, EngineResponse::ReadyOk))
    }

    /// Discard cached evaluations. Called at the end of each top-level
    /// search invocation; nothing persists across searches.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn send(&mut self, request: &EngineRequest) -> Result<(), EngineError> {
        let line = self.encoder.encode(request);
        self.process.send(&line)
    }

    fn wait_for(
        &mut self,
        accept: impl Fn(&EngineResponse) -> bool,
    ) -> Result<(), EngineError> {
        let deadline = Instant::now() + HANDSHAKE_TIMEOUT;

        loop {
            let line = self.process.recv_deadline(deadline)?;
            if let Ok(response) = self.decoder.decode(&line) {
                if accept(&response) {
                    return Ok(());
                }
            }
        }
    }

    /// One `position` + `go depth` round trip. On timeout or a protocol
    /// violation the engine is resynced (stop + drain) so the next
    /// request starts clean.
    fn run_go(&mut self, fen: &str, depth: u8) -> Result<Evaluation, EngineError> {
        self.send(&EngineRequest::Position {
            fen: fen.to_string(),
        })?;
        self.send(&EngineRequest::Go { depth })?;

        let deadline = Instant::now() + self.timeout;

        // Latest (score, move) per MultiPV slot; later lines are deeper
        // and overwrite earlier ones. Slots beyond the requested window
        // are ignored.
        let mut slots: ArrayVec<Option<(i32, String)>, RANKED_LINES> = ArrayVec::new();

        loop {
            let line = match self.process.recv_deadline(deadline) {
                Ok(line) => line,
                Err(EngineError::Timeout(_)) => {
                    self.resync();
                    return Err(EngineError::Timeout(self.timeout));
                }
                Err(e) => return Err(e),
            };

            match self.decoder.decode(&line) {
                Ok(EngineResponse::Info(info)) => {
                    if let (Some(score), Some(mv)) = (info.score, info.pv_move) {
                        let index = info.multipv.unwrap_or(1).saturating_sub(1) as usize;
                        if index < RANKED_LINES {
                            while slots.len() <= index {
                                slots.push(None);
                            }
                            slots[index] = Some((score.to_cp(), mv));
                        }
                    }
                }
                Ok(EngineResponse::BestMove { mv, .. }) => {
                    return self.finalize(slots, mv);
                }
                Ok(_) => {}
                Err(e) => {
                    self.resync();
                    return Err(self.strike(e));
                }
            }
        }
    }

    fn finalize(
        &mut self,
        slots: ArrayVec<Option<(i32, String)>, RANKED_LINES>,
        best: Option<String>,
    ) -> Result<Evaluation, EngineError> {
        let mut ranked = Vec::with_capacity(slots.len());
        for (score_cp, mv) in slots.into_iter().flatten() {
            let mv = self.parse_move(&mv)?;
            ranked.push(RankedMove { mv, score_cp });
        }

        let best_move = match best {
            Some(mv) => Some(self.parse_move(&mv)?),
            None => None,
        };

        Ok(Evaluation {
            score_cp: ranked.first().map(|r| r.score_cp).unwrap_or(0),
            best_move,
            ranked,
        })
    }

    fn parse_move(&mut self, text: &str) -> Result<ChessMove, EngineError> {
        ChessMove::from_str(text)
            .map_err(|_| self.strike(EngineError::Protocol(format!("bad move text '{}'", text))))
    }

    fn strike(&mut self, error: EngineError) -> EngineError {
        if matches!(error, EngineError::Protocol(_)) {
            self.protocol_strikes += 1;
            if self.protocol_strikes >= PROTOCOL_STRIKE_LIMIT {
                return EngineError::Unavailable(format!(
                    "{} consecutive protocol violations",
                    self.protocol_strikes
                ));
            }
        }
        error
    }

    /// Best-effort: stop an abandoned search and drain its output so the
    /// next request does not consume a stale bestmove.
    fn resync(&mut self) {
        if self.send(&EngineRequest::Stop).is_err() {
            return;
        }

        let deadline = Instant::now() + RESYNC_TIMEOUT;
        while let Ok(line) = self.process.recv_deadline(deadline) {
            if line.starts_with("bestmove") {
                break;
            }
        }
    }
}

impl Evaluator for EvalClient {
    /// Evaluate with the requested depth clamped to the global ply cap.
    /// A timeout is retried once at half depth before surfacing.
    fn evaluate(&mut self, position: &Position, max_ply: u8) -> Result<Evaluation, EngineError> {
        let depth = max_ply.min(MAX_PLY).max(1);

        let key = (position.key(), depth);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let fen = position.fen();
        let evaluation = match self.run_go(&fen, depth) {
            Ok(evaluation) => evaluation,
            Err(EngineError::Timeout(_)) => {
                let reduced = (depth / 2).max(1);
                log::warn!(
                    "evaluation of {} timed out at depth {}, retrying at depth {}",
                    fen,
                    depth,
                    reduced
                );
                self.run_go(&fen, reduced)?
            }
            Err(e) => return Err(e),
        };

        self.protocol_strikes = 0;
        self.cache.insert(key, evaluation.clone());

        Ok(evaluation)
    }
}
