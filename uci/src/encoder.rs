use super::commands::EngineRequest;

pub struct Encoder;

impl Encoder {
    pub fn encode(&self, request: &EngineRequest) -> String {
        match request {
            EngineRequest::Uci => "uci".to_string(),
            EngineRequest::IsReady => "isready".to_string(),
            EngineRequest::NewGame => "ucinewgame".to_string(),
            EngineRequest::SetOption { name, value } => {
                format!("setoption name {} value {}", name, value)
            }
            EngineRequest::Position { fen } => format!("position fen {}", fen),
            EngineRequest::Go { depth } => format!("go depth {}", depth),
            EngineRequest::Stop => "stop".to_string(),
            EngineRequest::Quit => "quit".to_string(),
        }
    }
}
