use evaluation::EngineError;

use super::commands::{EngineResponse, InfoLine, Score};
use super::NULL_MOVE;

pub struct Decoder;

impl Decoder {
    pub fn decode(&self, line: &str) -> Result<EngineResponse, EngineError> {
        let line = line.trim();

        match line {
            "uciok" => Ok(EngineResponse::UciOk),
            "readyok" => Ok(EngineResponse::ReadyOk),

            _ if line.starts_with("info") => self.decode_info(line),
            _ if line.starts_with("bestmove") => self.decode_bestmove(line),

            _ => Ok(EngineResponse::Unknown(line.to_string())),
        }
    }

    fn decode_info(&self, line: &str) -> Result<EngineResponse, EngineError> {
        // A score keyword with an unparseable kind or value is a protocol
        // violation; an info line without a score (currmove chatter, string
        // output) is just skipped by the caller.
        let score = match extract_score(line) {
            Ok(score) => score,
            Err(()) => return Err(EngineError::Protocol(line.to_string())),
        };

        Ok(EngineResponse::Info(InfoLine {
            depth: extract_numeric_param(line, "depth").map(|d| d as u8),
            multipv: extract_numeric_param(line, "multipv").map(|n| n as u32),
            score,
            pv_move: extract_token_after(line, "pv").map(str::to_string),
        }))
    }

    fn decode_bestmove(&self, line: &str) -> Result<EngineResponse, EngineError> {
        let mut tokens = line.split_whitespace();
        tokens.next(); // "bestmove"

        let Some(mv) = tokens.next() else {
            return Err(EngineError::Protocol(line.to_string()));
        };

        let mv = if mv == NULL_MOVE {
            None
        } else {
            Some(mv.to_string())
        };

        let ponder = match (tokens.next(), tokens.next()) {
            (Some("ponder"), Some(p)) => Some(p.to_string()),
            _ => None,
        };

        Ok(EngineResponse::BestMove { mv, ponder })
    }
}

fn extract_numeric_param(line: &str, param: &str) -> Option<u64> {
    line.split_whitespace()
        .collect::<Vec<&str>>()
        .windows(2)
        .find(|w| w[0] == param)
        .and_then(|w| w[1].parse().ok())
}

fn extract_token_after<'a>(line: &'a str, param: &str) -> Option<&'a str> {
    line.split_whitespace()
        .collect::<Vec<&str>>()
        .windows(2)
        .find(|w| w[0] == param)
        .map(|w| w[1])
}

/// Ok(None) when the line carries no score, Err(()) when it carries a
/// malformed one.
fn extract_score(line: &str) -> Result<Option<Score>, ()> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let Some(at) = tokens.iter().position(|&t| t == "score") else {
        return Ok(None);
    };

    let kind = tokens.get(at + 1).ok_or(())?;
    let value = tokens.get(at + 2).ok_or(())?;

    match *kind {
        "cp" => Ok(Some(Score::Centipawns(value.parse().map_err(|_| ())?))),
        "mate" => Ok(Some(Score::Mate(value.parse().map_err(|_| ())?))),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_responses() {
        assert!(matches!(
            Decoder.decode("uciok").unwrap(),
            EngineResponse::UciOk
        ));
        assert!(matches!(
            Decoder.decode("readyok").unwrap(),
            EngineResponse::ReadyOk
        ));
    }

    #[test]
    fn test_banners_are_unknown() {
        assert!(matches!(
            Decoder.decode("id name Stockfish 16").unwrap(),
            EngineResponse::Unknown(_)
        ));
        assert!(matches!(
            Decoder
                .decode("option name Hash type spin default 16 min 1 max 33554432")
                .unwrap(),
            EngineResponse::Unknown(_)
        ));
    }

    #[test]
    fn test_info_with_cp_score() {
        let line = "info depth 8 seldepth 10 multipv 1 score cp 34 nodes 12345 nps 99999 pv e2e4 e7e5";
        let EngineResponse::Info(info) = Decoder.decode(line).unwrap() else {
            panic!("Expected Info")
        };

        assert_eq!(info.depth, Some(8));
        assert_eq!(info.multipv, Some(1));
        assert_eq!(info.score, Some(Score::Centipawns(34)));
        assert_eq!(info.pv_move.as_deref(), Some("e2e4"));
    }

    #[test]
    fn test_info_with_mate_score() {
        let line = "info depth 5 multipv 2 score mate -3 pv h7h8q";
        let EngineResponse::Info(info) = Decoder.decode(line).unwrap() else {
            panic!("Expected Info")
        };

        assert_eq!(info.score, Some(Score::Mate(-3)));
        assert_eq!(info.multipv, Some(2));
        assert_eq!(info.pv_move.as_deref(), Some("h7h8q"));
    }

    #[test]
    fn test_info_without_score_is_kept_but_empty() {
        let line = "info depth 12 currmove e2e4 currmovenumber 1";
        let EngineResponse::Info(info) = Decoder.decode(line).unwrap() else {
            panic!("Expected Info")
        };

        assert!(info.score.is_none());
        assert!(info.pv_move.is_none());
    }

    #[test]
    fn test_malformed_score_is_protocol_error() {
        assert!(matches!(
            Decoder.decode("info depth 8 score cp abc pv e2e4"),
            Err(EngineError::Protocol(_))
        ));
        assert!(matches!(
            Decoder.decode("info depth 8 score banana 12"),
            Err(EngineError::Protocol(_))
        ));
    }

    #[test]
    fn test_bestmove() {
        let EngineResponse::BestMove { mv, ponder } =
            Decoder.decode("bestmove e2e4 ponder e7e5").unwrap()
        else {
            panic!("Expected BestMove")
        };

        assert_eq!(mv.as_deref(), Some("e2e4"));
        assert_eq!(ponder.as_deref(), Some("e7e5"));
    }

    #[test]
    fn test_bestmove_none() {
        let EngineResponse::BestMove { mv, ponder } =
            Decoder.decode("bestmove (none)").unwrap()
        else {
            panic!("Expected BestMove")
        };

        assert!(mv.is_none());
        assert!(ponder.is_none());
    }

    #[test]
    fn test_bare_bestmove_is_protocol_error() {
        assert!(matches!(
            Decoder.decode("bestmove"),
            Err(EngineError::Protocol(_))
        ));
    }
}
