//! Integration tests for the layout pipeline.
//!
//! All tests use [`ApproximateFontMetrics`] at a base size of 10px, where
//! every character is 6px wide, ascent is 10px, descent 2px and a line of
//! text is 12px tall.

use std::collections::HashMap;

use inkline_common::warning::{clear_warnings, was_warned};
use inkline_common::{Pool, Span};
use inkline_layout::{
    ApproximateFontMetrics, BitmapMeta, BuildOptions, Chunk, ChunkContent, ChunkType,
    HorizontalAlign, LayoutContext, LayoutOptions, LayoutResult, MAX_STYLE_DEPTH, MarkupLayout,
    NoBitmaps, Rgba, TextStyle, WrapMode, build_chunks, dispatch_custom_styles, layout,
};
use inkline_markup::{ErrorCategory, MarkupError, TagType, Token};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

const EPSILON: f32 = 1e-3;

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

fn bitmaps() -> HashMap<String, BitmapMeta> {
    let mut bitmaps = HashMap::new();
    let _ = bitmaps.insert("apple".to_string(), BitmapMeta::new(7, 16.0, 16.0));
    bitmaps
}

/// Options for a `line_width`-wide layout at base size 10.
fn options(line_width: f32) -> LayoutOptions {
    LayoutOptions {
        line_width,
        base_style: TextStyle {
            size: 10.0,
            ..TextStyle::default()
        },
        ..LayoutOptions::default()
    }
}

/// Helper to lay out `input` into roomy pools.
fn run_with(input: &str, options: &LayoutOptions) -> Result<(Vec<Chunk>, LayoutResult), MarkupError> {
    let bitmaps = bitmaps();
    let ctx = LayoutContext::new(&ApproximateFontMetrics, &bitmaps);
    let mut tokens = Pool::with_capacity(256);
    let mut chunks = Pool::with_capacity(256);
    let result = layout(input, options, ctx, &mut tokens, &mut chunks)?;
    Ok((chunks.as_slice().to_vec(), result))
}

fn run(input: &str, options: &LayoutOptions) -> Vec<Chunk> {
    run_with(input, options).expect("layout should succeed").0
}

fn run_err(input: &str) -> MarkupError {
    run_with(input, &options(400.0)).expect_err("layout should fail")
}

/// Text of every text chunk, paired with its line.
fn texts<'s>(chunks: &[Chunk], source: &'s str) -> Vec<(&'s str, u32)> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.text(source).map(|text| (text, chunk.line_index)))
        .collect()
}

fn types(chunks: &[Chunk]) -> Vec<ChunkType> {
    chunks.iter().map(Chunk::chunk_type).collect()
}

#[test]
fn test_plain_text() {
    let (chunks, result) = run_with("hello", &options(400.0)).unwrap();
    assert_eq!(types(&chunks), vec![ChunkType::Text, ChunkType::Eof]);
    assert_eq!(result.chunk_count, 2);

    assert_close(chunks[0].x_cursor, 0.0);
    assert_close(chunks[0].y_cursor, 10.0);
    assert_close(chunks[0].width, 30.0);

    let eof = chunks[1];
    assert_close(eof.x_cursor, 30.0);
    assert_close(eof.width, 0.0);
    assert_close(result.cursor_x, 30.0);
    assert_close(result.cursor_y, 12.0);
}

#[test]
fn test_empty_input() {
    let chunks = run("", &options(400.0));
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].is_eof());
}

#[test]
fn test_style_markers_are_zero_width() {
    let input = "a{c:#ff0000}b{/c}c";
    let chunks = run(input, &options(400.0));
    assert_eq!(
        types(&chunks),
        vec![
            ChunkType::Text,
            ChunkType::Color,
            ChunkType::Text,
            ChunkType::Color,
            ChunkType::Text,
            ChunkType::Eof,
        ]
    );
    assert_eq!(chunks[1].content, ChunkContent::Color(Rgba::opaque(255, 0, 0)));
    assert_eq!(chunks[3].content, ChunkContent::Color(Rgba::WHITE));
    assert_close(chunks[1].width, 0.0);
    assert_close(chunks[1].x_cursor, 6.0);
    assert_close(chunks[4].x_cursor, 12.0);
}

#[test]
fn test_every_tag_type() {
    let input = "{s:20}{c:#000000}{f:mono}{k:1}{custom:wave}x{/custom}{/k}{/f}{/c}{/s}{img:apple}";
    let chunks = run(input, &options(400.0));
    assert_eq!(
        types(&chunks),
        vec![
            ChunkType::Size,
            ChunkType::Color,
            ChunkType::Font,
            ChunkType::Kerning,
            ChunkType::UserCustom,
            ChunkType::Text,
            ChunkType::UserCustom,
            ChunkType::Kerning,
            ChunkType::Font,
            ChunkType::Color,
            ChunkType::Size,
            ChunkType::Bitmap,
            ChunkType::Eof,
        ]
    );
    assert_eq!(chunks[2].content, ChunkContent::Font(inkline_layout::FontId(3)));
    assert_eq!(chunks[8].content, ChunkContent::Font(inkline_layout::FontId(0)));
    // 20px text with 1px kerning: 13px per character.
    assert_close(chunks[5].width, 13.0);
}

#[test]
fn test_mixed_sizes_share_a_baseline() {
    let input = "ab{s:20}CD{/s}ef";
    let (chunks, result) = run_with(input, &options(400.0)).unwrap();

    // The 20px run raises the ascent to 20 and the descent to 4.
    for chunk in chunks.iter().filter(|c| !c.is_eof()) {
        assert_close(chunk.y_cursor, 20.0);
    }
    let widths: Vec<_> = chunks
        .iter()
        .filter(|c| c.chunk_type() == ChunkType::Text)
        .map(|c| c.width)
        .collect();
    assert_eq!(widths.len(), 3);
    assert_close(widths[0], 12.0);
    assert_close(widths[1], 24.0);
    assert_close(widths[2], 12.0);
    assert_close(result.cursor_y, 24.0);
}

#[test]
fn test_newlines_advance_lines() {
    let input = "a\nb\n\nc";
    let (chunks, result) = run_with(input, &options(400.0)).unwrap();
    assert_eq!(texts(&chunks, input), vec![("a", 0), ("b", 1), ("c", 3)]);

    let ys: Vec<_> = chunks.iter().map(|c| c.y_cursor).collect();
    assert_close(ys[0], 10.0);
    assert_close(ys[1], 22.0);
    assert_close(ys[2], 46.0);

    let eof = chunks.last().unwrap();
    assert!(eof.is_eof());
    assert_eq!(eof.line_index, 3);
    assert_close(eof.y_cursor, 48.0);
    assert_close(result.cursor_y, 48.0);
    assert_close(result.cursor_x, 6.0);
}

#[test]
fn test_ignore_newlines() {
    let input = "a\nb";
    let options = LayoutOptions {
        ignore_newlines: true,
        ..options(400.0)
    };
    let chunks = run(input, &options);
    assert_eq!(texts(&chunks, input), vec![("a", 0), ("b", 0)]);
    assert_close(chunks[1].x_cursor, 6.0);
}

#[test]
fn test_word_wrap() {
    let input = "the quick brown fox jumps";
    let chunks = run(input, &options(61.0));
    assert_eq!(
        texts(&chunks, input),
        vec![("the quick", 0), ("brown fox", 1), ("jumps", 2)]
    );
    for chunk in &chunks {
        assert!(chunk.right() <= 61.0 + EPSILON);
        if !chunk.is_eof() {
            assert_close(chunk.x_cursor, 0.0);
        }
    }
    assert_close(chunks[1].y_cursor, 22.0);
}

#[test]
fn test_word_wrap_continues_mid_line() {
    let input = "aaaa{c:#000000}bbbb cccc{/c}";
    let chunks = run(input, &options(61.0));
    assert_eq!(
        texts(&chunks, input),
        vec![("aaaa", 0), ("bbbb", 0), ("cccc", 1)]
    );
    assert_close(chunks[2].x_cursor, 24.0);

    let close = chunks[4];
    assert_eq!(close.content, ChunkContent::Color(Rgba::WHITE));
    assert_eq!(close.line_index, 1);
    assert_close(close.x_cursor, 24.0);
}

#[test]
fn test_word_wrap_breaks_before_word() {
    let input = "aaaaaaa{c:#000000}bbbbbb";
    let chunks = run(input, &options(61.0));
    assert_eq!(texts(&chunks, input), vec![("aaaaaaa", 0), ("bbbbbb", 1)]);
}

#[test]
fn test_oversized_word_falls_back_to_characters() {
    let input = "abcdefghij";
    let chunks = run(input, &options(25.0));
    assert_eq!(
        texts(&chunks, input),
        vec![("abcd", 0), ("efgh", 1), ("ij", 2)]
    );
}

#[test]
fn test_wrap_none_overflows() {
    let input = "the quick brown fox";
    let options = LayoutOptions {
        wrap: WrapMode::None,
        ..options(30.0)
    };
    let chunks = run(input, &options);
    assert_eq!(texts(&chunks, input), vec![(input, 0)]);
    assert_close(chunks[0].width, 114.0);
}

#[test]
fn test_character_wrap() {
    let input = "abcdefgh";
    let options = LayoutOptions {
        wrap: WrapMode::Character,
        ..options(19.0)
    };
    let chunks = run(input, &options);
    assert_eq!(
        texts(&chunks, input),
        vec![("abc", 0), ("def", 1), ("gh", 2)]
    );
}

#[test]
fn test_right_alignment() {
    let input = "the quick brown fox jumps";
    let options = LayoutOptions {
        align: HorizontalAlign::Right,
        ..options(61.0)
    };
    let chunks = run(input, &options);
    for chunk in chunks.iter().filter(|c| c.chunk_type() == ChunkType::Text) {
        assert_close(chunk.right(), 61.0);
    }
}

#[test]
fn test_center_alignment() {
    let input = "the quick brown fox jumps";
    let options = LayoutOptions {
        align: HorizontalAlign::Center,
        ..options(61.0)
    };
    let chunks = run(input, &options);
    for chunk in chunks.iter().filter(|c| c.chunk_type() == ChunkType::Text) {
        let left_gap = chunk.x_cursor;
        let right_gap = 61.0 - chunk.right();
        assert_close(left_gap, right_gap);
    }
    // "jumps" is 30px wide.
    assert_close(chunks[2].x_cursor, 15.5);
}

#[test]
fn test_alignment_keeps_count_and_vertical_positions() {
    let input = "one two {s:20}three{/s}\nfour {img:apple} five six seven";
    let left = run(input, &options(80.0));
    for align in [HorizontalAlign::Center, HorizontalAlign::Right] {
        let aligned = run(input, &LayoutOptions { align, ..options(80.0) });
        assert_eq!(aligned.len(), left.len());
        for (a, b) in aligned.iter().zip(&left) {
            assert_eq!(a.line_index, b.line_index);
            assert_eq!(a.content, b.content);
            assert_close(a.y_cursor, b.y_cursor);
        }
    }
}

#[test]
fn test_line_index_never_decreases() {
    let input = "lorem ipsum {c:#ff0000}dolor sit{/c} amet\nconsectetur {s:30}adipiscing{/s} elit";
    let chunks = run(input, &options(90.0));
    assert!(chunks.windows(2).all(|w| w[0].line_index <= w[1].line_index));
    assert_eq!(chunks.iter().filter(|c| c.is_eof()).count(), 1);
    assert!(chunks.last().unwrap().is_eof());
}

#[test]
fn test_chunk_pool_too_small() {
    let ctx = LayoutContext::new(&ApproximateFontMetrics, &NoBitmaps);
    let mut tokens = Pool::with_capacity(16);
    let mut chunks = Pool::with_capacity(2);
    let result = layout(
        "a{c:#ff0000}b",
        &options(400.0),
        ctx,
        &mut tokens,
        &mut chunks,
    );
    assert_eq!(result, Err(MarkupError::OutOfMemory { capacity: 2 }));
    assert_eq!(
        result.unwrap_err().category(),
        ErrorCategory::Resource
    );
}

#[test]
fn test_chunk_pool_exact_fit() {
    let ctx = LayoutContext::new(&ApproximateFontMetrics, &NoBitmaps);
    let mut tokens = Pool::with_capacity(16);
    let mut chunks = Pool::with_capacity(4);
    let result = layout("a{c:#ff0000}b", &options(400.0), ctx, &mut tokens, &mut chunks);
    assert_eq!(result.map(|r| r.chunk_count), Ok(4));
}

#[test]
fn test_token_pool_too_small() {
    let ctx = LayoutContext::new(&ApproximateFontMetrics, &NoBitmaps);
    let mut tokens = Pool::with_capacity(1);
    let mut chunks = Pool::with_capacity(16);
    let result = layout("a\nb", &options(400.0), ctx, &mut tokens, &mut chunks);
    assert_eq!(result, Err(MarkupError::OutOfMemory { capacity: 1 }));
}

#[test]
fn test_value_errors() {
    assert_eq!(
        run_err("x{s:abc}y"),
        MarkupError::InvalidFontSize {
            span: Span::new(4, 7)
        }
    );
    assert!(matches!(run_err("{s:0}x"), MarkupError::InvalidFontSize { .. }));
    assert!(matches!(run_err("{c:red}x"), MarkupError::InvalidColor { .. }));
    assert!(matches!(run_err("{k:wide}x"), MarkupError::InvalidKerning { .. }));
    assert!(matches!(run_err("{img:pear}"), MarkupError::BitmapNotFound { .. }));
    assert!(matches!(run_err("{f:comic}x"), MarkupError::FontNotFound { .. }));

    for input in ["{s:0}", "{c:red}", "{k:wide}", "{img:pear}", "{f:comic}"] {
        assert_eq!(run_err(input).category(), ErrorCategory::Value, "{input}");
    }
}

#[test]
fn test_unmatched_close() {
    assert_eq!(
        run_err("a{/s}"),
        MarkupError::InvalidCloseTag {
            span: Span::new(3, 4)
        }
    );
    assert!(matches!(run_err("{c:#000000}a{/c}{/c}"), MarkupError::InvalidCloseTag { .. }));
    assert!(matches!(run_err("a{/custom}"), MarkupError::InvalidCloseTag { .. }));
}

#[test]
fn test_bitmap_close_is_a_no_op() {
    let chunks = run("a{img:apple}{/img}b", &options(400.0));
    assert_eq!(
        types(&chunks),
        vec![ChunkType::Text, ChunkType::Bitmap, ChunkType::Text, ChunkType::Eof]
    );
}

#[test]
fn test_same_axis_nesting_restores_each_level() {
    let input = "{s:20}a{s:30}b{/s}c{/s}d";
    let chunks = run(input, &options(400.0));
    let sizes: Vec<_> = chunks
        .iter()
        .filter_map(|c| match c.content {
            ChunkContent::Size(size) => Some(size),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![20.0, 30.0, 20.0, 10.0]);

    let widths: Vec<_> = chunks
        .iter()
        .filter(|c| c.chunk_type() == ChunkType::Text)
        .map(|c| c.width)
        .collect();
    assert_close(widths[0], 12.0);
    assert_close(widths[1], 18.0);
    assert_close(widths[2], 12.0);
    assert_close(widths[3], 6.0);
}

#[test]
fn test_style_stack_overflow() {
    let input = "{s:1}".repeat(MAX_STYLE_DEPTH + 1);
    let err = run_err(&input);
    assert_eq!(
        err,
        MarkupError::StyleStackOverflow {
            tag: TagType::Size,
            depth: MAX_STYLE_DEPTH
        }
    );
    assert_eq!(err.category(), ErrorCategory::Resource);

    let at_limit = "{k:1}".repeat(MAX_STYLE_DEPTH);
    assert!(run_with(&at_limit, &options(400.0)).is_ok());
}

#[test]
fn test_unclosed_scope_is_a_warning() {
    clear_warnings();
    let chunks = run("{c:#123456}{c:#654321}never closed{/c}", &options(400.0));
    assert!(chunks.last().unwrap().is_eof());
    assert!(was_warned(
        "Layout",
        "{c:...} opened 1 time(s) more than it was closed"
    ));
    assert!(!was_warned(
        "Layout",
        "{s:...} opened 1 time(s) more than it was closed"
    ));
}

#[test]
fn test_bitmap_sits_on_baseline() {
    let input = "a{img:apple}b";
    let (chunks, result) = run_with(input, &options(400.0)).unwrap();
    assert_eq!(
        types(&chunks),
        vec![ChunkType::Text, ChunkType::Bitmap, ChunkType::Text, ChunkType::Eof]
    );

    let bitmap = chunks[1];
    assert_close(bitmap.x_cursor, 6.0);
    assert_close(bitmap.width, 16.0);
    assert_close(bitmap.bounds.width(), 16.0);
    assert_close(bitmap.bounds.height(), 16.0);
    assert_close(bitmap.bounds.min_y, -16.0);
    assert_close(bitmap.bounds.max_y, 0.0);
    match bitmap.content {
        ChunkContent::Bitmap(meta) => assert_eq!(meta.texture, 7),
        other => panic!("expected a bitmap, got {other:?}"),
    }

    // The 16px bitmap is the tallest thing on the line.
    for chunk in &chunks[..3] {
        assert_close(chunk.y_cursor, 16.0);
    }
    assert_close(chunks[2].x_cursor, 22.0);
    assert_close(result.cursor_y, 18.0);
}

#[test]
fn test_bitmap_wraps_to_next_line() {
    let chunks = run("abcd{img:apple}", &options(30.0));
    let bitmap = chunks[1];
    assert_eq!(bitmap.chunk_type(), ChunkType::Bitmap);
    assert_eq!(bitmap.line_index, 1);
    assert_close(bitmap.x_cursor, 0.0);
    assert_close(bitmap.y_cursor, 28.0);
}

#[test]
fn test_bitmap_does_not_wrap_without_wrapping() {
    let options = LayoutOptions {
        wrap: WrapMode::None,
        ..options(30.0)
    };
    let chunks = run("abcd{img:apple}", &options);
    assert_eq!(chunks[1].line_index, 0);
    assert_close(chunks[1].x_cursor, 24.0);
}

#[test]
fn test_custom_markers_carry_style_name() {
    let input = "plain {custom:wave}wavy text{/custom} done";
    let chunks = run(input, &options(400.0));
    let markers: Vec<_> = chunks
        .iter()
        .filter_map(|c| match c.content {
            ChunkContent::UserCustom {
                enabled,
                style_name,
            } => Some((enabled, style_name.slice(input))),
            _ => None,
        })
        .collect();
    assert_eq!(markers, vec![(true, "wave"), (false, "wave")]);
}

#[test]
fn test_custom_style_replay() {
    let input = "plain {custom:wave}wavy text{/custom} done";
    let chunks = run(input, &options(400.0));

    let mut seen = Vec::new();
    let mut record = |name: &str, text: &str, x: f32, _y: f32| {
        seen.push((name.to_string(), text.to_string(), x));
    };
    let dispatched = dispatch_custom_styles(&chunks, input, &mut record);

    assert_eq!(dispatched, 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "wave");
    assert_eq!(seen[0].1, "wavy text");
    assert_close(seen[0].2, 36.0);
}

#[test]
fn test_nested_custom_style_replay() {
    let input = "{custom:a}x{custom:b}y{/custom}z{/custom}w";
    let chunks = run(input, &options(400.0));

    let mut seen = Vec::new();
    let mut record = |name: &str, text: &str, _x: f32, _y: f32| {
        seen.push(format!("{name}:{text}"));
    };
    let dispatched = dispatch_custom_styles(&chunks, input, &mut record);

    assert_eq!(dispatched, 3);
    assert_eq!(seen, vec!["a:x", "b:y", "a:z"]);
}

#[test]
fn test_malformed_token_streams() {
    let source = "s1";
    let ctx = LayoutContext::new(&ApproximateFontMetrics, &NoBitmaps);
    let build_options = BuildOptions {
        line_width: 100.0,
        wrap: WrapMode::Word,
        ignore_newlines: false,
        base_style: TextStyle::default(),
    };
    let mut pool = Pool::with_capacity(16);

    let prefix_then_text = [
        Token::tag_prefix(TagType::Size, Span::new(0, 1)),
        Token::text(Span::new(1, 2)),
    ];
    assert!(matches!(
        build_chunks(source, &prefix_then_text, build_options, ctx, &mut pool),
        Err(MarkupError::InvalidRichTextToken { .. })
    ));

    let lone_body = [Token::tag_body(Span::new(1, 2))];
    assert!(matches!(
        build_chunks(source, &lone_body, build_options, ctx, &mut pool),
        Err(MarkupError::InvalidTagPrefix { .. })
    ));

    let dangling_prefix = [Token::tag_prefix(TagType::Size, Span::new(0, 1))];
    assert!(matches!(
        build_chunks(source, &dangling_prefix, build_options, ctx, &mut pool),
        Err(MarkupError::InvalidRichTextToken { .. })
    ));
}

#[test]
fn test_layout_is_idempotent() {
    let input = "{s:20}Title{/s}\nbody text with {c:#00ff00}color{/c} and {img:apple} a bitmap";
    let bitmaps = bitmaps();
    let ctx = LayoutContext::new(&ApproximateFontMetrics, &bitmaps);
    let options = options(120.0);
    let mut engine = MarkupLayout::new(64, 64);

    let first_result = engine.layout(input, &options, ctx).unwrap();
    let first = engine.chunks().to_vec();

    let _ = engine.layout("something else entirely", &options, ctx).unwrap();
    let second_result = engine.layout(input, &options, ctx).unwrap();

    assert_eq!(first_result, second_result);
    assert_eq!(engine.chunks(), first.as_slice());
}

#[test]
fn test_markup_layout_recovers_after_error() {
    let ctx = LayoutContext::new(&ApproximateFontMetrics, &NoBitmaps);
    let options = options(400.0);
    let mut engine = MarkupLayout::new(16, 16);

    assert!(engine.layout("{s:big}x", &options, ctx).is_err());
    let result = engine.layout("fine", &options, ctx).unwrap();
    assert_eq!(result.chunk_count, 2);
    assert_eq!(engine.tokens().len(), 1);
}

#[quickcheck]
fn prop_word_wrapped_text_fits(words: Vec<String>) -> TestResult {
    // Words of at most 8 characters are 48px and always fit a 61px line.
    let words: Vec<String> = words
        .iter()
        .map(|w| w.chars().filter(char::is_ascii_lowercase).take(8).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return TestResult::discard();
    }
    let input = words.join(" ");
    let Ok((chunks, _)) = run_wide_pools(&input, &options(61.0)) else {
        return TestResult::failed();
    };
    let fits = chunks.iter().all(|c| c.right() <= 61.0 + EPSILON);
    let rejoined: Vec<&str> = chunks
        .iter()
        .filter_map(|c| c.text(&input))
        .flat_map(str::split_whitespace)
        .collect();
    TestResult::from_bool(fits && rejoined == words)
}

#[quickcheck]
fn prop_chunk_list_is_well_formed(text: String) -> TestResult {
    let input: String = text.chars().filter(|c| !matches!(c, '{' | '}')).collect();
    let Ok((chunks, result)) = run_wide_pools(&input, &options(61.0)) else {
        return TestResult::failed();
    };
    let monotonic = chunks.windows(2).all(|w| w[0].line_index <= w[1].line_index);
    let one_eof = chunks.iter().filter(|c| c.is_eof()).count() == 1;
    let eof_last = chunks.last().is_some_and(Chunk::is_eof);
    TestResult::from_bool(monotonic && one_eof && eof_last && result.chunk_count == chunks.len())
}

/// Like [`run_with`] but with pools sized for generated input.
fn run_wide_pools(
    input: &str,
    options: &LayoutOptions,
) -> Result<(Vec<Chunk>, LayoutResult), MarkupError> {
    let ctx = LayoutContext::new(&ApproximateFontMetrics, &NoBitmaps);
    let mut tokens = Pool::with_capacity(4096);
    let mut chunks = Pool::with_capacity(4096);
    let result = layout(input, options, ctx, &mut tokens, &mut chunks)?;
    Ok((chunks.as_slice().to_vec(), result))
}
