//! Request boundary: FEN in, SAN move (or an error) out.
//!
//! Each request builds its own `Position`, searches it, and throws it away.
//! Failures are reported once, here, and never leave a move half-applied.

use std::panic::{self, AssertUnwindSafe};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::position::Position;
use crate::search::{self, SearchState};
use crate::types::{check_depth, EngineConfig, Score, SearchResult, SearchVariant};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub fen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<SearchVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u8>,
}

impl Request {
    pub fn new(fen: impl Into<String>) -> Self {
        Self {
            fen: fen.into(),
            ..Self::default()
        }
    }
}

/// Either `move` plus diagnostics, or `error` alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub best_move: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP-style status, not part of the JSON body
    #[serde(skip)]
    pub status: u16,
}

impl Response {
    pub fn from_error(err: &EngineError) -> Self {
        Self {
            error: Some(err.to_string()),
            status: err.status_code(),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Move selection front door. Holds the defaults and the reusable search
/// state; never holds a position between requests.
pub struct Engine {
    config: EngineConfig,
    state: SearchState,
    rng: StdRng,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: SearchState::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Same as `new`, with a reproducible random-move variant.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self {
            config,
            state: SearchState::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        let variant = request.variant.unwrap_or(self.config.variant);
        let depth = request.depth.unwrap_or_else(|| {
            if request.variant.is_some() {
                variant.default_depth()
            } else {
                self.config.depth()
            }
        });
        info!(%variant, depth, fen = %request.fen, "handling request");

        match self.best_move(&request.fen, variant, depth) {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, status = err.status_code(), "request failed");
                Response::from_error(&err)
            }
        }
    }

    /// Parses `fen`, runs `variant` at `depth` and encodes the result.
    /// `depth` must be in `1..=MAX_DEPTH` unless the variant does no search.
    pub fn best_move(&mut self, fen: &str, variant: SearchVariant, depth: u8) -> EngineResult<Response> {
        let mut pos = Position::from_fen(fen)?;
        let depth = match variant {
            SearchVariant::Random => 0,
            SearchVariant::Minimax | SearchVariant::AlphaBeta => check_depth(depth)?,
        };

        let (state, rng) = (&mut self.state, &mut self.rng);
        let result = contained(&mut pos, |pos| search::search(pos, state, variant, depth, rng))?;

        Ok(Response {
            best_move: Some(pos.san(result.best_move.clone())),
            score: Some(result.score),
            depth: Some(result.depth),
            nodes: Some(result.nodes),
            time_ms: Some(result.elapsed.as_millis() as u64),
            error: None,
            status: 200,
        })
    }
}

/// Runs `run` on `pos`, turning a panic or a position left with moves pushed
/// into `Internal`. `pos` is back at its root afterwards either way.
fn contained<F>(pos: &mut Position, run: F) -> EngineResult<SearchResult>
where
    F: FnOnce(&mut Position) -> EngineResult<SearchResult>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(&mut *pos)));

    if pos.ply() != 0 {
        let ply = pos.ply();
        pos.unwind();
        return Err(EngineError::Internal(format!("search left the position {ply} plies deep")));
    }

    outcome.map_err(|payload| EngineError::Internal(panic_message(payload.as_ref())))?
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "search panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_DEPTH;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn engine() -> Engine {
        Engine::with_seed(EngineConfig::default(), 3)
    }

    #[test]
    fn test_empty_fen_has_no_move() {
        let response = engine().handle(&Request::new(""));
        assert_eq!(response.best_move, None);
        assert_eq!(response.error.as_deref(), Some("FEN string is required"));
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_malformed_fen_is_reported() {
        let response = engine().handle(&Request::new("rnbqkbnr/pppppppp/8/8 w"));
        assert!(response.best_move.is_none());
        assert!(response.error.unwrap().starts_with("Invalid FEN"));
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_checkmated_input() {
        let response = engine().handle(&Request::new(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        ));
        assert_eq!(response.best_move, None);
        assert_eq!(response.error.as_deref(), Some("Checkmate"));
    }

    #[test]
    fn test_stalemated_input() {
        let response = engine().handle(&Request::new("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"));
        assert_eq!(response.error.as_deref(), Some("Stalemate"));
    }

    #[test]
    fn test_mate_in_one_is_san_encoded() {
        let response = engine().handle(&Request::new(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        ));
        assert!(response.is_ok());
        assert_eq!(response.best_move.as_deref(), Some("Qxf7#"));
        assert_eq!(response.depth, Some(3));
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_request_overrides_config() {
        let mut engine = engine();
        let request = Request {
            fen: STARTPOS.to_string(),
            variant: Some(SearchVariant::Minimax),
            depth: None,
        };
        let response = engine.handle(&request);
        assert_eq!(response.depth, Some(2));
        assert_eq!(response.nodes, Some(420));

        let request = Request { depth: Some(1), ..request };
        let response = engine.handle(&request);
        assert_eq!(response.depth, Some(1));
        assert_eq!(response.score, Some(0));
    }

    #[test]
    fn test_configured_depth_applies_to_bare_requests() {
        let config = EngineConfig { variant: SearchVariant::AlphaBeta, depth: Some(1) };
        let mut engine = Engine::with_seed(config, 0);
        let response = engine.handle(&Request::new(STARTPOS));
        assert_eq!(response.depth, Some(1));
        assert_eq!(response.nodes, Some(20));
    }

    #[test]
    fn test_random_variant_returns_a_legal_san() {
        let mut engine = engine();
        let request = Request {
            fen: STARTPOS.to_string(),
            variant: Some(SearchVariant::Random),
            depth: None,
        };
        let response = engine.handle(&request);
        let san = response.best_move.unwrap();
        let pos = Position::default();
        assert!(pos.legal_moves().into_iter().any(|m| pos.san(m) == san), "{san} not legal");
    }

    #[test]
    fn test_error_json_has_no_move_field() {
        let response = engine().handle(&Request::new(""));
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"error":"FEN string is required"}"#);
    }

    #[test]
    fn test_request_json_defaults() {
        let request: Request = serde_json::from_str(r#"{"fen": "8/8/8/8/8/8/8/8 w - - 0 1"}"#).unwrap();
        assert_eq!(request.variant, None);
        assert_eq!(request.depth, None);
        let request: Request = serde_json::from_str(r#"{"variant": "minimax", "depth": 4}"#).unwrap();
        assert_eq!(request.fen, "");
        assert_eq!(request.variant, Some(SearchVariant::Minimax));
        assert_eq!(request.depth, Some(4));
    }

    #[test]
    fn test_depth_out_of_range_is_rejected() {
        let mut engine = engine();
        for depth in [0, MAX_DEPTH + 1, 255] {
            let request = Request { depth: Some(depth), ..Request::new(STARTPOS) };
            let response = engine.handle(&request);
            assert_eq!(response.best_move, None, "depth {depth}");
            assert_eq!(response.status, 400);
            assert!(response.error.unwrap().starts_with("Depth must be between 1 and"));
        }

        let request: Request = serde_json::from_str(&format!(r#"{{"fen": "{STARTPOS}", "depth": 255}}"#)).unwrap();
        assert_eq!(engine.handle(&request).status, 400);

        let request = Request { depth: Some(MAX_DEPTH), ..Request::new("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1") };
        let response = engine.handle(&request);
        assert_eq!(response.depth, Some(MAX_DEPTH));
        assert_eq!(response.best_move.as_deref(), Some("exd5"));
    }

    #[test]
    fn test_random_variant_ignores_depth() {
        let request = Request {
            fen: STARTPOS.to_string(),
            variant: Some(SearchVariant::Random),
            depth: Some(200),
        };
        let response = engine().handle(&request);
        assert!(response.is_ok());
        assert_eq!(response.depth, Some(0));
    }

    #[test]
    fn test_search_panic_becomes_internal_error() {
        let mut pos = Position::default();
        let mv = pos.legal_moves()[0].clone();
        let err = contained(&mut pos, |p| -> EngineResult<SearchResult> {
            let _child = p.apply(mv);
            panic!("lost track of the board");
        })
        .unwrap_err();

        assert_eq!(err, EngineError::Internal("lost track of the board".to_string()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(Response::from_error(&err).best_move, None);
        assert_eq!(pos.ply(), 0);
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn test_unpopped_moves_become_internal_error() {
        let mut pos = Position::default();
        let mv = pos.legal_moves()[0].clone();
        let err = contained(&mut pos, |p| {
            p.push(mv);
            Err(EngineError::NoLegalMoves)
        })
        .unwrap_err();

        assert_eq!(err, EngineError::Internal("search left the position 1 plies deep".to_string()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(pos.ply(), 0);
        assert_eq!(pos.board(), Position::default().board());
    }

    #[test]
    fn test_contained_passes_search_errors_through() {
        let mut pos = Position::default();
        let err = contained(&mut pos, |_| Err(EngineError::NoLegalMoves)).unwrap_err();
        assert_eq!(err, EngineError::NoLegalMoves);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload = panic::catch_unwind(|| -> u8 { panic!("rules engine blew up") }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "rules engine blew up");
        let payload = panic::catch_unwind(|| -> u8 { panic!("{} plies", 3) }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "3 plies");
    }
}
