//! Built-in experiment positions: a spread of openings, middlegames and
//! endgames so a default run exercises the search across game phases.

pub struct TestPosition {
    pub name: &'static str,
    pub fen: &'static str,
}

const SUITE: &[TestPosition] = &[
    TestPosition {
        name: "Standard",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    },
    TestPosition {
        name: "Sicilian",
        fen: "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
    },
    TestPosition {
        name: "Sicilian Najdorf",
        fen: "rnbqkb1r/1p2pppp/p2p1n2/8/3NP3/2N5/PPP2PPP/R1BQKB1R w KQkq - 0 6",
    },
    TestPosition {
        name: "Caro-Kann (advanced)",
        fen: "rnbqkbnr/pp2pppp/2p5/3pP3/3P4/8/PPP2PPP/RNBQKBNR b KQkq - 0 3",
    },
    TestPosition {
        name: "French Winawer",
        fen: "rnbqk1nr/ppp2ppp/4p3/3p4/1b1PP3/2N5/PPP2PPP/R1BQKBNR w KQkq - 2 4",
    },
    TestPosition {
        name: "Italian",
        fen: "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3",
    },
    TestPosition {
        name: "Ruy Lopez Berlin Defense",
        fen: "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    },
    TestPosition {
        name: "Queen's Gambit Declined: Slav",
        fen: "rnbqkbnr/pp2pppp/2p5/3p4/2PP4/8/PP2PPPP/RNBQKBNR w KQkq - 0 3",
    },
    TestPosition {
        name: "King's Indian Defense",
        fen: "rnbqkb1r/pppppp1p/5np1/8/2PP4/8/PP2PPPP/RNBQKBNR w KQkq - 0 3",
    },
    TestPosition {
        name: "Developed middlegame",
        fen: "r2q1rk1/pp2bppp/2n1pn2/2bp4/3P4/2N1PN2/PPQ1BPPP/R1B2RK1 w - - 0 10",
    },
    TestPosition {
        name: "Dragon middlegame",
        fen: "r1bq1rk1/pp2ppbp/2np1np1/8/2BNP3/2N1BP2/PPPQ2PP/R3K2R b KQ - 4 9",
    },
    TestPosition {
        name: "Rook endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    },
    TestPosition {
        name: "King and pawn endgame",
        fen: "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
    },
];

pub fn suite() -> Vec<String> {
    SUITE.iter().map(|p| p.fen.to_string()).collect()
}
