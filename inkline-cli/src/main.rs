//! inkline CLI
//!
//! Lays out rich-text markup and prints the resulting chunk list, as a
//! table or as JSON.

mod font_metrics;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, anyhow, bail};
use clap::{Parser, ValueEnum};
use inkline_layout::{
    ApproximateFontMetrics, BitmapMeta, Chunk, ChunkContent, HorizontalAlign, LayoutContext,
    LayoutOptions, LayoutResult, MarkupLayout, Rgba, TextMetrics, TextStyle, WrapMode,
    dispatch_custom_styles,
};
use owo_colors::OwoColorize;
use serde::Serialize;

use font_metrics::FontdueMetrics;

/// inkline - lay out rich-text markup into positioned chunks
#[derive(Parser, Debug)]
#[command(name = "inkline")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Lay out a file with approximate metrics
    inkline notes.txt

    # Lay out a string, right-aligned in a 200px box
    inkline --markup 'hello {c:#ff0000}red{/c} world' --width 200 --align right

    # Use real fonts; {f:mono} selects the second face
    inkline --font default=DejaVuSans.ttf --font mono=DejaVuSansMono.ttf notes.txt

    # Register a 32x32 bitmap for {img:logo} and print JSON
    inkline --bitmap logo=32x32 --json --markup 'see {img:logo} here'
"#)]
struct Cli {
    /// Path to a markup file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Lay out this markup string instead of a file
    #[arg(long, value_name = "MARKUP")]
    markup: Option<String>,

    /// Line width in pixels
    #[arg(long, default_value = "400")]
    width: f32,

    /// Horizontal alignment of every line
    #[arg(long, value_enum, default_value_t = AlignArg::Left)]
    align: AlignArg,

    /// How long runs are broken across lines
    #[arg(long, value_enum, default_value_t = WrapArg::Word)]
    wrap: WrapArg,

    /// Treat newlines in the markup as nothing
    #[arg(long)]
    ignore_newlines: bool,

    /// Base font size in pixels
    #[arg(long, default_value = "16")]
    size: f32,

    /// Base text color
    #[arg(long, value_name = "#RRGGBB", default_value = "#ffffff")]
    color: String,

    /// Load a font face for {f:NAME}; the first one is the default face
    #[arg(long = "font", value_name = "NAME=PATH")]
    fonts: Vec<String>,

    /// Register a bitmap for {img:NAME}
    #[arg(long = "bitmap", value_name = "NAME=WxH")]
    bitmaps: Vec<String>,

    /// Token pool capacity
    #[arg(long, default_value = "1024")]
    max_tokens: usize,

    /// Chunk pool capacity
    #[arg(long, default_value = "2048")]
    max_chunks: usize,

    /// Print the chunk list as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlignArg {
    Left,
    Center,
    Right,
}

impl From<AlignArg> for HorizontalAlign {
    fn from(arg: AlignArg) -> Self {
        match arg {
            AlignArg::Left => Self::Left,
            AlignArg::Center => Self::Center,
            AlignArg::Right => Self::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WrapArg {
    None,
    Word,
    Character,
}

impl From<WrapArg> for WrapMode {
    fn from(arg: WrapArg) -> Self {
        match arg {
            WrapArg::None => Self::None,
            WrapArg::Word => Self::Word,
            WrapArg::Character => Self::Character,
        }
    }
}

/// A chunk with its text resolved, for JSON output.
#[derive(Serialize)]
struct ChunkRecord<'a> {
    #[serde(flatten)]
    chunk: &'a Chunk,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct Report<'a> {
    options: &'a LayoutOptions,
    result: LayoutResult,
    chunks: Vec<ChunkRecord<'a>>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let markup = load_markup(&cli)?;

    let base_color = Rgba::from_hex(&cli.color)
        .with_context(|| format!("invalid --color {:?}, expected #rrggbb", cli.color))?;
    let options = LayoutOptions {
        line_width: cli.width,
        align: cli.align.into(),
        wrap: cli.wrap.into(),
        ignore_newlines: cli.ignore_newlines,
        base_style: TextStyle {
            size: cli.size,
            color: base_color,
            ..TextStyle::default()
        },
    };

    let bitmaps = parse_bitmaps(&cli.bitmaps)?;
    let fontdue = if cli.fonts.is_empty() {
        None
    } else {
        Some(FontdueMetrics::load(&parse_fonts(&cli.fonts)?)?)
    };
    let metrics: &dyn TextMetrics = match &fontdue {
        Some(fonts) => fonts,
        None => &ApproximateFontMetrics,
    };

    let mut engine = MarkupLayout::new(cli.max_tokens, cli.max_chunks);
    let ctx = LayoutContext::new(metrics, &bitmaps);
    let result = engine
        .layout(&markup, &options, ctx)
        .map_err(|e| anyhow!("layout failed ({} error): {e}", e.category()))?;

    if cli.json {
        let report = Report {
            options: &options,
            result,
            chunks: engine
                .chunks()
                .iter()
                .map(|chunk| ChunkRecord {
                    chunk,
                    text: chunk.text(&markup),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_chunks(engine.chunks(), &markup);
        print_custom_runs(engine.chunks(), &markup);
        println!(
            "\n{} chunks, cursor at ({:.1}, {:.1})",
            result.chunk_count, result.cursor_x, result.cursor_y
        );
    }

    Ok(())
}

/// Read the markup from `--markup` or the positional file.
fn load_markup(cli: &Cli) -> anyhow::Result<String> {
    if let Some(ref markup) = cli.markup {
        Ok(markup.clone())
    } else if let Some(ref path) = cli.path {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        bail!("no input: pass a FILE or --markup '...'")
    }
}

/// Split `NAME=VALUE`.
fn split_pair<'s>(arg: &'s str, flag: &str) -> anyhow::Result<(&'s str, &'s str)> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => Ok((name, value)),
        _ => bail!("invalid {flag} {arg:?}, expected NAME=VALUE"),
    }
}

fn parse_fonts(args: &[String]) -> anyhow::Result<Vec<(String, PathBuf)>> {
    args.iter()
        .map(|arg| {
            let (name, path) = split_pair(arg, "--font")?;
            Ok((name.to_string(), PathBuf::from(path)))
        })
        .collect()
}

/// Parse `NAME=WxH` pairs. Each bitmap's texture handle is its position on
/// the command line.
fn parse_bitmaps(args: &[String]) -> anyhow::Result<HashMap<String, BitmapMeta>> {
    let mut bitmaps = HashMap::new();
    for (texture, arg) in (0_u64..).zip(args) {
        let (name, size) = split_pair(arg, "--bitmap")?;
        let parsed = size
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse::<f32>().ok()?, h.parse::<f32>().ok()?)));
        let Some((width, height)) = parsed else {
            bail!("invalid --bitmap size {size:?}, expected WxH");
        };
        let _ = bitmaps.insert(name.to_string(), BitmapMeta::new(texture, width, height));
    }
    Ok(bitmaps)
}

/// One line per chunk: index, line, position, width and payload.
fn print_chunks(chunks: &[Chunk], source: &str) {
    println!(
        "{}",
        format!(
            "{:>4} {:>4} {:>8} {:>8} {:>8}  {:<12} payload",
            "#", "line", "x", "y", "width", "type"
        )
        .bold()
    );
    for (index, chunk) in chunks.iter().enumerate() {
        let kind = chunk.chunk_type().to_string();
        let kind = format!("{kind:<12}");
        let kind = match chunk.content {
            ChunkContent::Text(_) => kind.green().to_string(),
            ChunkContent::Bitmap(_) => kind.magenta().to_string(),
            ChunkContent::Eof => kind.dimmed().to_string(),
            _ => kind.cyan().to_string(),
        };
        println!(
            "{index:>4} {:>4} {:>8.1} {:>8.1} {:>8.1}  {kind} {}",
            chunk.line_index,
            chunk.x_cursor,
            chunk.y_cursor,
            chunk.width,
            payload(chunk, source)
        );
    }
}

fn payload(chunk: &Chunk, source: &str) -> String {
    match chunk.content {
        ChunkContent::Eof => String::new(),
        ChunkContent::Text(span) => format!("{:?}", span.slice(source)),
        ChunkContent::Bitmap(meta) => format!(
            "texture {} ({}x{})",
            meta.texture, meta.width, meta.height
        ),
        ChunkContent::Size(size) => format!("{size}px"),
        ChunkContent::Color(c) => format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b),
        ChunkContent::Font(font) => format!("face {}", font.0),
        ChunkContent::Kerning(kerning) => format!("{kerning:+}px"),
        ChunkContent::UserCustom {
            enabled,
            style_name,
        } => format!(
            "{} {}",
            if enabled { "begin" } else { "end" },
            style_name.slice(source)
        ),
    }
}

/// List the text drawn under each custom style.
fn print_custom_runs(chunks: &[Chunk], source: &str) {
    let mut runs = Vec::new();
    let mut collect = |name: &str, text: &str, x: f32, y: f32| {
        runs.push(format!("  {name}: {text:?} at ({x:.1}, {y:.1})"));
    };
    if dispatch_custom_styles(chunks, source, &mut collect) == 0 {
        return;
    }
    println!("\n{}", "custom styles".bold());
    for run in runs {
        println!("{run}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkline_layout::{ChunkType, NoBitmaps};

    #[test]
    fn test_parse_bitmaps() {
        let args = vec!["logo=32x16".to_string(), "dot=4x4".to_string()];
        let bitmaps = parse_bitmaps(&args).unwrap();
        let logo = bitmaps["logo"];
        assert_eq!(logo.texture, 0);
        assert_eq!(logo.display_size(), (32.0, 16.0));
        assert_eq!(bitmaps["dot"].texture, 1);
    }

    #[test]
    fn test_parse_bitmaps_rejects_bad_sizes() {
        assert!(parse_bitmaps(&["logo=32".to_string()]).is_err());
        assert!(parse_bitmaps(&["logo=axb".to_string()]).is_err());
        assert!(parse_bitmaps(&["=4x4".to_string()]).is_err());
    }

    #[test]
    fn test_parse_fonts() {
        let fonts = parse_fonts(&["mono=/fonts/mono.ttf".to_string()]).unwrap();
        assert_eq!(fonts, vec![("mono".to_string(), PathBuf::from("/fonts/mono.ttf"))]);
        assert!(parse_fonts(&["mono".to_string()]).is_err());
    }

    #[test]
    fn test_payload_formatting() {
        let source = "hi";
        let mut engine = MarkupLayout::new(4, 4);
        let ctx = LayoutContext::new(&ApproximateFontMetrics, &NoBitmaps);
        let _ = engine.layout(source, &LayoutOptions::default(), ctx).unwrap();
        let text = engine.chunks()[0];
        assert_eq!(text.chunk_type(), ChunkType::Text);
        assert_eq!(payload(&text, source), "\"hi\"");
        let color = Chunk::marker(0.0, 0, ChunkContent::Color(Rgba::opaque(255, 0, 16)));
        assert_eq!(payload(&color, source), "#ff0010");
    }
}
