use crate::{AnalysisSnapshot, EngineMessage};

/// Keywords that switch the value register while scanning an `info` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Time,
    Pv,
    Nps,
    Depth,
    Seldepth,
    Score,
    Nodes,
}

impl Keyword {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "time" => Some(Self::Time),
            "pv" => Some(Self::Pv),
            "nps" => Some(Self::Nps),
            "depth" => Some(Self::Depth),
            "seldepth" => Some(Self::Seldepth),
            "score" => Some(Self::Score),
            "nodes" => Some(Self::Nodes),
            _ => None,
        }
    }
}

/// Decode one line of engine output.
///
/// Never fails: anything that isn't a well-formed `bestmove` or an `info`
/// line comes back as [`EngineMessage::Unrecognized`] with the raw text.
pub fn parse_tei_message(line: &str) -> EngineMessage {
    let mut tokens = line.split_whitespace();

    match tokens.next() {
        Some("bestmove") => match tokens.next() {
            Some(mv) => EngineMessage::BestMove(mv.to_string()),
            None => EngineMessage::Unrecognized(line.to_string()),
        },
        Some("info") => EngineMessage::InfoUpdate(parse_info_line(tokens)),
        _ => EngineMessage::Unrecognized(line.to_string()),
    }
}

/// Scan the tokens after `info` left to right.
///
/// `pv` collects every value token until the next keyword; every other
/// keyword takes a single value and ignores the rest. Tokens seen before the
/// first keyword are dropped.
fn parse_info_line<'a>(tokens: impl Iterator<Item = &'a str>) -> AnalysisSnapshot {
    let mut info = AnalysisSnapshot::default();
    let mut current: Option<Keyword> = None;
    let mut value_taken = false;

    for token in tokens {
        if let Some(keyword) = Keyword::from_token(token) {
            current = Some(keyword);
            value_taken = false;
            continue;
        }

        let Some(keyword) = current else {
            continue;
        };

        match keyword {
            Keyword::Pv => {
                info.pv.push(token.to_string());
                continue;
            }
            _ if value_taken => continue,
            // `score cp 37`: skip the unit, the value follows
            Keyword::Score if token == "cp" => continue,
            Keyword::Score => info.score = token.parse().ok(),
            Keyword::Nps => info.nps = token.parse().ok(),
            Keyword::Time => info.time_ms = token.parse().ok(),
            Keyword::Depth => info.depth = token.parse().ok(),
            Keyword::Seldepth => info.seldepth = token.parse().ok(),
            Keyword::Nodes => info.nodes = token.parse().ok(),
        }
        value_taken = true;
    }

    info
}
