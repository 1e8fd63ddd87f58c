use kismet_core::diagram::DiagramKind;
use kismet_core::PinType;

/// System prompt for blueprint generation: the exact JSON shape plus the
/// closed sets of node and pin types.
pub fn blueprint_system_prompt() -> String {
    let pin_types: Vec<&str> = PinType::ALL.iter().map(|t| t.as_str()).collect();

    let mut out = String::with_capacity(2048);
    out.push_str(
        "You generate Unreal Engine Blueprint visual scripting graphs.\n\
         Respond with ONE JSON object and nothing else. No prose, no markdown fences.\n\n\
         SHAPE:\n\
         {\"nodes\":[{\"id\":string,\"title\":string,\"type\":NODE_TYPE,\
         \"inputs\":[PIN],\"outputs\":[PIN],\"position\":{\"x\":number,\"y\":number}}],\n \
         \"edges\":[{\"id\":string,\"fromNodeId\":string,\"fromPinId\":string,\
         \"toNodeId\":string,\"toPinId\":string}]}\n\
         PIN = {\"id\":string,\"name\":string,\"type\":PIN_TYPE}\n\n\
         NODE_TYPE is one of:\n\
         - EVENT (e.g. BeginPlay, OnComponentHit, InputAction)\n\
         - FUNCTION (e.g. PrintString, SetActorLocation)\n\
         - CONTROL_FLOW (e.g. Branch, Delay, FlipFlop)\n\
         - VARIABLE (e.g. Get Player Health)\n\n",
    );
    out.push_str("PIN_TYPE is one of: ");
    out.push_str(&pin_types.join(", "));
    out.push_str(
        "\n\nRULES:\n\
         - Connect execution pins (EXEC) in sequence so control flow is explicit.\n\
         - Edges go from an output pin to an input pin; every id an edge names must exist.\n\
         - Node ids are unique; pin ids are unique within their node.\n\
         - Position nodes realistically from left to right, roughly 250 units apart \
         horizontally, branches spread vertically.\n",
    );
    out
}

pub fn blueprint_user_message(prompt: &str) -> String {
    format!(
        "Generate an Unreal Engine Blueprint visual scripting graph for the following requirement: \"{}\".",
        prompt.trim()
    )
}

pub fn diagram_system_prompt(kind: DiagramKind) -> String {
    format!(
        "You write Mermaid diagram source.\n\
         Respond with the diagram text only, starting with the line `{}`. \
         No prose, no markdown fences.\n\
         Keep identifiers short and valid for Mermaid; quote labels containing spaces or punctuation.",
        kind.header()
    )
}

pub fn diagram_user_message(kind: DiagramKind, prompt: &str) -> String {
    format!("Write a {} for: \"{}\".", kind.label(), prompt.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blueprint_prompt_lists_every_pin_type() {
        let prompt = blueprint_system_prompt();
        for t in PinType::ALL {
            assert!(prompt.contains(t.as_str()));
        }
        assert!(prompt.contains("CONTROL_FLOW"));
        assert!(prompt.contains("fromPinId"));
    }

    #[test]
    fn diagram_prompt_names_header() {
        assert!(diagram_system_prompt(DiagramKind::Flow).contains("`flowchart TD`"));
        assert!(diagram_user_message(DiagramKind::State, " doors ").ends_with("\"doors\"."));
    }
}
