//! External rendering of diagram sources
//!
//! DOT sources go to a Graphviz layout engine, Mermaid sources to the Mermaid
//! CLI (`mmdc`). Binaries are looked up on `PATH` with `which`.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sferd_core::DiagramFormat;
use tracing::{debug, info, warn};

/// Output format for rendered images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    /// File extension, also the Graphviz `-T` value
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            _ => bail!("Unknown output format: {}. Supported: svg, png, pdf", s),
        }
    }
}

/// Graphviz layout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// Hierarchical layout, the usual choice for ERDs
    #[default]
    Dot,
    /// Spring model layout
    Neato,
    /// Force-directed placement
    Fdp,
    /// Scalable force-directed placement
    Sfdp,
    /// Circular layout
    Circo,
    /// Radial layout
    Twopi,
}

impl LayoutEngine {
    /// Command name for this engine
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Neato => "neato",
            Self::Fdp => "fdp",
            Self::Sfdp => "sfdp",
            Self::Circo => "circo",
            Self::Twopi => "twopi",
        }
    }
}

impl std::fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

impl std::str::FromStr for LayoutEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dot" => Ok(Self::Dot),
            "neato" => Ok(Self::Neato),
            "fdp" => Ok(Self::Fdp),
            "sfdp" => Ok(Self::Sfdp),
            "circo" => Ok(Self::Circo),
            "twopi" => Ok(Self::Twopi),
            _ => bail!("Unknown layout engine: {}. Supported: dot, neato, fdp, sfdp, circo, twopi", s),
        }
    }
}

/// Turns a diagram source into an image file
pub trait Renderer {
    /// Tool name used in log and error messages
    fn name(&self) -> &str;

    /// Locate the tool binary.
    ///
    /// # Errors
    ///
    /// When the binary is not on `PATH`; the message carries install hints.
    fn check(&self) -> Result<PathBuf>;

    /// Render `source` into `output_file`.
    ///
    /// # Errors
    ///
    /// When the tool is missing, cannot be started, or exits non-zero.
    fn render(&self, source: &str, output_file: &Path, format: OutputFormat) -> Result<()>;
}

/// Graphviz command-line renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphvizRenderer {
    pub engine: LayoutEngine,
}

impl GraphvizRenderer {
    #[must_use]
    pub const fn new(engine: LayoutEngine) -> Self {
        Self { engine }
    }

    fn args(format: OutputFormat, output_file: &Path) -> Vec<String> {
        let mut args = vec![format!("-T{}", format.extension())];
        if format == OutputFormat::Png {
            args.push("-Gdpi=300".to_string());
        }
        args.push("-o".to_string());
        args.push(output_file.display().to_string());
        args
    }
}

impl Renderer for GraphvizRenderer {
    fn name(&self) -> &str {
        self.engine.command()
    }

    fn check(&self) -> Result<PathBuf> {
        which::which(self.engine.command()).map_err(|_| {
            anyhow::anyhow!(
                "Graphviz '{}' not found on PATH. Install with:\n  \
                 Ubuntu/Debian: sudo apt install graphviz\n  \
                 macOS: brew install graphviz\n  \
                 Windows: choco install graphviz\n  \
                 Or download from: https://graphviz.org/download/",
                self.engine
            )
        })
    }

    fn render(&self, source: &str, output_file: &Path, format: OutputFormat) -> Result<()> {
        let binary = self.check()?;
        debug!("Running {} -T{} -> {}", binary.display(), format, output_file.display());

        let mut child = Command::new(&binary)
            .args(Self::args(format, output_file))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn Graphviz '{}' process", self.engine))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .context("Failed to write DOT content to Graphviz stdin")?;
        }

        let result = child
            .wait_with_output()
            .context("Failed to wait for Graphviz process")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!("Graphviz rendering failed: {}", stderr.trim());
        }
        Ok(())
    }
}

/// Mermaid CLI (`mmdc`) renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidCliRenderer;

impl Renderer for MermaidCliRenderer {
    fn name(&self) -> &str {
        "mmdc"
    }

    fn check(&self) -> Result<PathBuf> {
        which::which("mmdc").map_err(|_| {
            anyhow::anyhow!(
                "Mermaid CLI 'mmdc' not found on PATH. Install with:\n  \
                 npm install -g @mermaid-js/mermaid-cli"
            )
        })
    }

    fn render(&self, source: &str, output_file: &Path, format: OutputFormat) -> Result<()> {
        let binary = self.check()?;

        let mut input = tempfile::Builder::new()
            .suffix(".mmd")
            .tempfile()
            .context("Failed to create temporary Mermaid input")?;
        input
            .write_all(source.as_bytes())
            .context("Failed to write temporary Mermaid input")?;
        input.flush()?;

        debug!("Running {} -i {} -o {}", binary.display(), input.path().display(), output_file.display());

        let result = Command::new(&binary)
            .arg("-i")
            .arg(input.path())
            .arg("-o")
            .arg(output_file)
            .arg("-e")
            .arg(format.extension())
            .stdin(Stdio::null())
            .output()
            .context("Failed to execute Mermaid CLI")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!("Mermaid rendering failed: {}", stderr.trim());
        }
        Ok(())
    }
}

/// Renderer matching the diagram language
#[must_use]
pub fn renderer_for(format: DiagramFormat, engine: LayoutEngine) -> Box<dyn Renderer> {
    match format {
        DiagramFormat::Dot => Box::new(GraphvizRenderer::new(engine)),
        DiagramFormat::Mermaid => Box::new(MermaidCliRenderer),
    }
}

/// Parse format names, accepting comma-separated lists.
///
/// # Errors
///
/// On the first unknown name. An empty list falls back to SVG.
pub fn parse_formats<S: AsRef<str>>(names: &[S]) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for name in names {
        for part in name.as_ref().split(',').filter(|p| !p.trim().is_empty()) {
            let format: OutputFormat = part.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
    }
    if formats.is_empty() {
        formats.push(OutputFormat::Svg);
    }
    Ok(formats)
}

/// Result of rendering one image format
#[derive(Debug)]
pub struct RenderOutcome {
    pub format: OutputFormat,
    pub path: PathBuf,
    pub error: Option<anyhow::Error>,
}

impl RenderOutcome {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Render `source` once per format into `images_dir/<filename>.<ext>`.
///
/// A failed format is logged and recorded; the others still run.
///
/// # Errors
///
/// When `images_dir` cannot be created, or when every format failed.
pub fn render_all(
    renderer: &dyn Renderer,
    source: &str,
    images_dir: &Path,
    filename: &str,
    formats: &[OutputFormat],
) -> Result<Vec<RenderOutcome>> {
    std::fs::create_dir_all(images_dir)
        .with_context(|| format!("Failed to create image directory: {}", images_dir.display()))?;

    let mut outcomes = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = images_dir.join(format!("{filename}.{}", format.extension()));
        let error = match renderer.render(source, &path, format) {
            Ok(()) => {
                info!("Rendered {} with {}: {}", format, renderer.name(), path.display());
                None
            }
            Err(e) => {
                warn!("Failed to render {} with {}: {:#}", format, renderer.name(), e);
                Some(e)
            }
        };
        outcomes.push(RenderOutcome { format, path, error });
    }

    if !outcomes.is_empty() && outcomes.iter().all(|o| !o.succeeded()) {
        bail!("All {} render(s) failed with {}", outcomes.len(), renderer.name());
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Writes the source to the output file unless the format is refused
    struct FakeRenderer {
        refuse: Vec<OutputFormat>,
        calls: RefCell<Vec<OutputFormat>>,
    }

    impl FakeRenderer {
        fn refusing(refuse: Vec<OutputFormat>) -> Self {
            Self {
                refuse,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Renderer for FakeRenderer {
        fn name(&self) -> &str {
            "fake"
        }

        fn check(&self) -> Result<PathBuf> {
            Ok(PathBuf::from("fake"))
        }

        fn render(&self, source: &str, output_file: &Path, format: OutputFormat) -> Result<()> {
            self.calls.borrow_mut().push(format);
            if self.refuse.contains(&format) {
                bail!("refused {format}");
            }
            std::fs::write(output_file, source)?;
            Ok(())
        }
    }

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!("svg".parse::<OutputFormat>(), Ok(OutputFormat::Svg)));
        assert!(matches!("PNG".parse::<OutputFormat>(), Ok(OutputFormat::Png)));
        assert!(matches!("pdf".parse::<OutputFormat>(), Ok(OutputFormat::Pdf)));
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_layout_engine_parsing_and_display() {
        assert!(matches!("neato".parse::<LayoutEngine>(), Ok(LayoutEngine::Neato)));
        assert!("invalid".parse::<LayoutEngine>().is_err());
        assert_eq!(LayoutEngine::Sfdp.to_string(), "sfdp");
        assert_eq!(LayoutEngine::default(), LayoutEngine::Dot);
    }

    #[test]
    fn test_parse_formats() {
        let formats = parse_formats(&["png,svg", "png", "pdf"]).unwrap();
        assert_eq!(formats, vec![OutputFormat::Png, OutputFormat::Svg, OutputFormat::Pdf]);
        assert_eq!(parse_formats::<&str>(&[]).unwrap(), vec![OutputFormat::Svg]);
        assert!(parse_formats(&["svg,bmp"]).is_err());
    }

    #[test]
    fn test_graphviz_args() {
        let out = Path::new("out/erd.png");
        assert_eq!(
            GraphvizRenderer::args(OutputFormat::Png, out),
            vec!["-Tpng", "-Gdpi=300", "-o", "out/erd.png"]
        );
        assert_eq!(
            GraphvizRenderer::args(OutputFormat::Svg, out),
            vec!["-Tsvg", "-o", "out/erd.png"]
        );
    }

    #[test]
    fn test_renderer_for() {
        assert_eq!(renderer_for(DiagramFormat::Dot, LayoutEngine::Fdp).name(), "fdp");
        assert_eq!(renderer_for(DiagramFormat::Mermaid, LayoutEngine::Dot).name(), "mmdc");
    }

    #[test]
    fn test_render_all_writes_each_format() {
        let temp = TempDir::new().unwrap();
        let images = temp.path().join("images");
        let renderer = FakeRenderer::refusing(vec![]);

        let outcomes = render_all(
            &renderer,
            "digraph G {}",
            &images,
            "erd",
            &[OutputFormat::Svg, OutputFormat::Png],
        )
        .unwrap();

        assert!(outcomes.iter().all(RenderOutcome::succeeded));
        assert!(images.join("erd.svg").exists());
        assert!(images.join("erd.png").exists());
    }

    #[test]
    fn test_render_all_tolerates_partial_failure() {
        let temp = TempDir::new().unwrap();
        let renderer = FakeRenderer::refusing(vec![OutputFormat::Pdf]);

        let outcomes = render_all(
            &renderer,
            "digraph G {}",
            temp.path(),
            "erd",
            &[OutputFormat::Pdf, OutputFormat::Svg],
        )
        .unwrap();

        assert_eq!(renderer.calls.borrow().len(), 2);
        assert!(!outcomes[0].succeeded());
        assert!(outcomes[1].succeeded());
    }

    #[test]
    fn test_render_all_fails_when_every_format_fails() {
        let temp = TempDir::new().unwrap();
        let renderer = FakeRenderer::refusing(vec![OutputFormat::Svg, OutputFormat::Png]);

        let result = render_all(
            &renderer,
            "digraph G {}",
            temp.path(),
            "erd",
            &[OutputFormat::Svg, OutputFormat::Png],
        );
        assert!(result.is_err());
    }
}
