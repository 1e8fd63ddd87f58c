use kismet_core::diagram::DiagramKind;
use kismet_core::{parse_graph, Graph};

use crate::GenerateError;

/// Pull the outermost JSON object out of raw model output and validate it as
/// a graph. Either the whole graph parses or nothing is returned.
pub fn parse_blueprint(raw: &str) -> Result<Graph, GenerateError> {
    let json = extract_json_object(raw).ok_or(GenerateError::NoJson)?;
    Ok(parse_graph(json)?)
}

/// Slice from the first `{` to the last `}`; fences and chatter around it are ignored.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Strip markdown fences and leading chatter so the text starts at the
/// diagram header. Falls back to the trimmed text when no header is found.
pub fn parse_diagram(raw: &str, kind: DiagramKind) -> Result<String, GenerateError> {
    let body: Vec<&str> = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();
    let text = body.join("\n");
    let text = match text.find(kind.header()) {
        Some(at) => &text[at..],
        None => text.trim(),
    };
    let text = text.trim_end();
    if text.is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    Ok(text.to_string())
}
