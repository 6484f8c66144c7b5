//! Styled text with a per-character visibility channel.
//!
//! Text is stored as grapheme clusters so that one animation step always
//! covers one user-perceived character, whatever the script.

use std::ops::Range;

use compact_str::CompactString;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use unicode_segmentation::UnicodeSegmentation;

use crate::color::{self, OPAQUE, TRANSPARENT};

/// One user-perceived character with its style and alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledGrapheme {
    symbol: CompactString,
    style: Style,
    alpha: f32,
}

impl StyledGrapheme {
    /// The grapheme cluster itself.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The original style. Animation never rewrites it.
    pub fn style(&self) -> Style {
        self.style
    }

    /// Visibility in `0.0..=1.0`.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns `true` if the grapheme has any visibility.
    pub fn is_visible(&self) -> bool {
        self.alpha > TRANSPARENT
    }

    /// Style to render with: the original style when opaque, hidden when
    /// transparent, otherwise the base colour blended toward the background.
    pub fn render_style(&self, fallback: Color, background: Color) -> Style {
        if self.alpha >= OPAQUE {
            return self.style;
        }
        if self.alpha <= TRANSPARENT {
            return self.style.add_modifier(Modifier::HIDDEN);
        }
        let base = self.style.fg.unwrap_or(fallback);
        let bg = self.style.bg.unwrap_or(background);
        self.style.fg(color::with_alpha(base, bg, self.alpha))
    }
}

/// A maximal stretch of graphemes sharing style and alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Grapheme index range covered by the run.
    pub range: Range<usize>,
    /// Concatenated content.
    pub content: String,
    /// Shared style.
    pub style: Style,
    /// Shared alpha.
    pub alpha: f32,
}

/// An ordered sequence of styled graphemes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledText {
    graphemes: Vec<StyledGrapheme>,
}

impl StyledText {
    /// Creates empty text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates unstyled, fully opaque text.
    pub fn raw(text: &str) -> Self {
        Self::styled(text, Style::default())
    }

    /// Creates fully opaque text with a single style.
    pub fn styled(text: &str, style: Style) -> Self {
        let mut styled = Self::new();
        styled.push_str(text, style);
        styled
    }

    /// Appends a segment. Graphemes are segmented per segment so style
    /// boundaries are never merged into one cluster.
    pub fn push_str(&mut self, text: &str, style: Style) -> &mut Self {
        self.graphemes
            .extend(text.graphemes(true).map(|symbol| StyledGrapheme {
                symbol: CompactString::from(symbol),
                style,
                alpha: OPAQUE,
            }));
        self
    }

    /// Builder form of [`StyledText::push_str`].
    pub fn with(mut self, text: &str, style: Style) -> Self {
        self.push_str(text, style);
        self
    }

    /// Number of graphemes.
    pub fn len(&self) -> usize {
        self.graphemes.len()
    }

    /// Returns `true` if there is nothing to animate.
    pub fn is_empty(&self) -> bool {
        self.graphemes.is_empty()
    }

    /// Grapheme at `index`.
    pub fn get(&self, index: usize) -> Option<&StyledGrapheme> {
        self.graphemes.get(index)
    }

    /// All graphemes in order.
    pub fn graphemes(&self) -> &[StyledGrapheme] {
        &self.graphemes
    }

    /// Full content regardless of visibility.
    pub fn content(&self) -> String {
        self.graphemes.iter().map(|g| g.symbol.as_str()).collect()
    }

    /// Content of the graphemes that are at least partly visible.
    pub fn visible_content(&self) -> String {
        self.graphemes
            .iter()
            .filter(|g| g.is_visible())
            .map(|g| g.symbol.as_str())
            .collect()
    }

    /// Alpha of every grapheme, in order.
    pub fn alphas(&self) -> Vec<f32> {
        self.graphemes.iter().map(|g| g.alpha).collect()
    }

    /// Sets the alpha of one grapheme. Returns `false` if out of range.
    pub fn set_alpha(&mut self, index: usize, alpha: f32) -> bool {
        match self.graphemes.get_mut(index) {
            Some(grapheme) => {
                grapheme.alpha = alpha.clamp(TRANSPARENT, OPAQUE);
                true
            }
            None => false,
        }
    }

    /// Sets the alpha of a range of graphemes, clipped to the text.
    pub fn set_alpha_range(&mut self, range: Range<usize>, alpha: f32) {
        let end = range.end.min(self.graphemes.len());
        let start = range.start.min(end);
        let alpha = alpha.clamp(TRANSPARENT, OPAQUE);
        for grapheme in &mut self.graphemes[start..end] {
            grapheme.alpha = alpha;
        }
    }

    /// Sets the alpha of the whole text.
    pub fn set_alpha_all(&mut self, alpha: f32) {
        self.set_alpha_range(0..self.graphemes.len(), alpha);
    }

    /// Applies `color` as foreground to the first occurrence of `needle`.
    ///
    /// Matching happens on grapheme boundaries. Returns `false` when the
    /// needle does not occur.
    pub fn colorize(&mut self, needle: &str, color: Color) -> bool {
        let Some(range) = self.find(needle) else {
            return false;
        };
        for grapheme in &mut self.graphemes[range] {
            grapheme.style = grapheme.style.fg(color);
        }
        true
    }

    /// Grapheme range of the first occurrence of `needle`.
    pub fn find(&self, needle: &str) -> Option<Range<usize>> {
        let pattern: Vec<&str> = needle.graphemes(true).collect();
        if pattern.is_empty() || pattern.len() > self.graphemes.len() {
            return None;
        }
        self.graphemes
            .windows(pattern.len())
            .position(|window| {
                window
                    .iter()
                    .zip(&pattern)
                    .all(|(g, p)| g.symbol.as_str() == *p)
            })
            .map(|start| start..start + pattern.len())
    }

    /// Coalesces adjacent graphemes with identical style and alpha.
    pub fn runs(&self) -> Vec<Run> {
        let mut runs: Vec<Run> = Vec::new();
        for (index, grapheme) in self.graphemes.iter().enumerate() {
            match runs.last_mut() {
                Some(run) if run.style == grapheme.style && run.alpha == grapheme.alpha => {
                    run.range.end = index + 1;
                    run.content.push_str(&grapheme.symbol);
                }
                _ => runs.push(Run {
                    range: index..index + 1,
                    content: grapheme.symbol.to_string(),
                    style: grapheme.style,
                    alpha: grapheme.alpha,
                }),
            }
        }
        runs
    }

    /// Converts to a renderable line.
    ///
    /// `fallback` stands in for graphemes without a foreground colour and
    /// `background` is what partially transparent glyphs blend toward.
    pub fn to_line(&self, fallback: Color, background: Color) -> Line<'static> {
        let spans: Vec<Span<'static>> = self
            .runs()
            .into_iter()
            .map(|run| {
                let style = self.graphemes[run.range.start].render_style(fallback, background);
                Span::styled(run.content, style)
            })
            .collect();
        Line::from(spans)
    }

    /// Like [`StyledText::to_line`], but breaks on newline graphemes.
    ///
    /// The newline itself is still one animation step; it just renders as a
    /// line break.
    pub fn to_text(&self, fallback: Color, background: Color) -> Text<'static> {
        let mut lines = vec![Line::default()];
        for run in self.runs() {
            let style = self.graphemes[run.range.start].render_style(fallback, background);
            for (index, part) in run.content.split('\n').enumerate() {
                if index > 0 {
                    lines.push(Line::default());
                }
                let part = part.trim_end_matches('\r');
                if !part.is_empty()
                    && let Some(line) = lines.last_mut()
                {
                    line.push_span(Span::styled(part.to_string(), style));
                }
            }
        }
        Text::from(lines)
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        Self::raw(text)
    }
}

impl From<String> for StyledText {
    fn from(text: String) -> Self {
        Self::raw(&text)
    }
}

impl From<&Line<'_>> for StyledText {
    fn from(line: &Line<'_>) -> Self {
        let mut styled = Self::new();
        for span in &line.spans {
            styled.push_str(&span.content, line.style.patch(span.style));
        }
        styled
    }
}

impl From<Line<'_>> for StyledText {
    fn from(line: Line<'_>) -> Self {
        Self::from(&line)
    }
}
