//! Text diagram rendering (class, sequence, state and flow diagrams).
//!
//! Each render is isolated: the previous output is cleared first, the engine
//! gets a fresh render id, and a failure leaves a recoverable error view
//! instead of a half-drawn diagram.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub const RENDER_ERROR_MESSAGE: &str = "Error rendering diagram. Please check your syntax.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    #[serde(rename = "classDiagram")]
    Class,
    #[serde(rename = "sequenceDiagram")]
    Sequence,
    #[serde(rename = "stateDiagram")]
    State,
    #[serde(rename = "flowchart TD")]
    Flow,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 4] = [
        DiagramKind::Class,
        DiagramKind::Sequence,
        DiagramKind::State,
        DiagramKind::Flow,
    ];

    /// First line of a diagram of this kind.
    pub fn header(self) -> &'static str {
        match self {
            DiagramKind::Class => "classDiagram",
            DiagramKind::Sequence => "sequenceDiagram",
            DiagramKind::State => "stateDiagram",
            DiagramKind::Flow => "flowchart TD",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiagramKind::Class => "Class Diagram",
            DiagramKind::Sequence => "Sequence Diagram",
            DiagramKind::State => "State Diagram",
            DiagramKind::Flow => "Flowchart",
        }
    }

    pub fn starter_code(self) -> &'static str {
        match self {
            DiagramKind::Class => "classDiagram\n    class Actor {\n        +FVector Location\n        +BeginPlay()\n        +Tick(float DeltaTime)\n    }\n    class Pawn {\n        +PossessedBy(Controller NewController)\n    }\n    Actor <|-- Pawn",
            DiagramKind::Sequence => "sequenceDiagram\n    participant Player\n    participant Controller\n    participant Light\n    Player->>Controller: Press F\n    Controller->>Light: ToggleVisibility()\n    Light-->>Controller: Visible changed",
            DiagramKind::State => "stateDiagram\n    [*] --> Off\n    Off --> On: Press F\n    On --> Off: Press F",
            DiagramKind::Flow => "flowchart TD\n    A[BeginPlay] --> B{Is Light On?}\n    B -->|Yes| C[Turn Off]\n    B -->|No| D[Turn On]",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("diagram syntax error: {0}")]
    Syntax(String),
    #[error("rendering engine not ready: {0}")]
    NotReady(String),
    #[error("rendering engine failed: {0}")]
    Engine(String),
}

/// External engine turning diagram text into SVG.
pub trait DiagramEngine: Send + Sync {
    /// Block until fonts and layout support are available.
    fn ready(&self) -> Result<(), DiagramError> {
        Ok(())
    }

    /// Render `code`. `render_id` is unique per call and should become the
    /// root element id so concurrent renders never collide.
    fn render(&self, render_id: &str, code: &str) -> Result<String, DiagramError>;
}

impl<E: DiagramEngine + ?Sized> DiagramEngine for Arc<E> {
    fn ready(&self) -> Result<(), DiagramError> {
        (**self).ready()
    }

    fn render(&self, render_id: &str, code: &str) -> Result<String, DiagramError> {
        (**self).render(render_id, code)
    }
}

/// Stand-in used when no rendering engine was compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableEngine;

impl DiagramEngine for UnavailableEngine {
    fn ready(&self) -> Result<(), DiagramError> {
        Err(DiagramError::NotReady("built without a diagram engine".to_string()))
    }

    fn render(&self, _render_id: &str, _code: &str) -> Result<String, DiagramError> {
        self.ready().map(|()| String::new())
    }
}

/// The best engine this build carries.
pub fn default_engine() -> Arc<dyn DiagramEngine> {
    #[cfg(feature = "mermaid")]
    {
        Arc::new(MermaidEngine)
    }
    #[cfg(not(feature = "mermaid"))]
    {
        Arc::new(UnavailableEngine)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DiagramView {
    Empty,
    Rendering {
        id: String,
    },
    Rendered {
        id: String,
        svg: String,
    },
    /// Shown as an error panel with a retry action.
    Failed {
        id: String,
        message: String,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter, sans-serif".to_string(),
            font_size: "14px".to_string(),
        }
    }
}

pub struct DiagramRenderer<E> {
    engine: E,
    text_style: TextStyle,
    code: Option<String>,
    view: DiagramView,
}

impl<E: DiagramEngine> DiagramRenderer<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            text_style: TextStyle::default(),
            code: None,
            view: DiagramView::Empty,
        }
    }

    pub fn with_text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    pub fn view(&self) -> &DiagramView {
        &self.view
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Render new diagram text, replacing whatever was shown before.
    pub fn render(&mut self, code: &str) -> &DiagramView {
        self.code = Some(code.to_string());
        self.render_current()
    }

    /// Re-run the last render with a fresh id. No-op when nothing was rendered.
    pub fn retry(&mut self) -> &DiagramView {
        if self.code.is_none() {
            return &self.view;
        }
        self.render_current()
    }

    fn render_current(&mut self) -> &DiagramView {
        let id = format!("diagram-{}", Uuid::new_v4().simple());
        self.view = DiagramView::Rendering { id: id.clone() };
        let code = self.code.as_deref().unwrap_or_default();

        let result = self
            .engine
            .ready()
            .and_then(|()| self.engine.render(&id, code));

        self.view = match result {
            Ok(svg) => {
                debug!(id = %id, bytes = svg.len(), "diagram rendered");
                DiagramView::Rendered {
                    svg: normalize_text_styles(&svg, &self.text_style),
                    id,
                }
            }
            Err(e) => {
                warn!(id = %id, error = %e, "diagram failed to render");
                DiagramView::Failed {
                    id,
                    message: RENDER_ERROR_MESSAGE.to_string(),
                    detail: e.to_string(),
                }
            }
        };
        &self.view
    }
}

static TEXT_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<text\b[^>]*>").unwrap());
static FONT_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+font-(?:family|size)\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap());
static FONT_STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"font-(?:family|size)\s*:[^;'\x22]*;?\s*").unwrap());

/// Force one font family and size on every `<text>` element, whatever the
/// engine emitted for the particular diagram kind.
pub fn normalize_text_styles(svg: &str, style: &TextStyle) -> String {
    TEXT_TAG_RE
        .replace_all(svg, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            let stripped = FONT_ATTR_RE.replace_all(tag, "");
            let stripped = FONT_STYLE_RE.replace_all(&stripped, "");
            let rest = &stripped["<text".len()..];
            format!(
                r#"<text font-family="{}" font-size="{}"{}"#,
                style.font_family, style.font_size, rest
            )
        })
        .into_owned()
}

/// Engine backed by the `mermaid-rs-renderer` crate.
#[cfg(feature = "mermaid")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MermaidEngine;

#[cfg(feature = "mermaid")]
impl DiagramEngine for MermaidEngine {
    fn render(&self, render_id: &str, code: &str) -> Result<String, DiagramError> {
        use mermaid_rs_renderer::{config::LayoutConfig, layout::compute_layout, parser::parse_mermaid, render::render_svg, theme::Theme};

        let parsed = parse_mermaid(code).map_err(|e| DiagramError::Syntax(e.to_string()))?;
        let theme = Theme::modern();
        let config = LayoutConfig::default();
        let svg = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let layout = compute_layout(&parsed.graph, &theme, &config);
            render_svg(&layout, &theme, &config)
        }))
        .map_err(|_| DiagramError::Engine("layout panicked".to_string()))?;
        Ok(svg.replacen("<svg", &format!("<svg id=\"{}\"", render_id), 1))
    }
}
