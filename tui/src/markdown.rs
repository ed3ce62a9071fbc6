//! Markdown Rendering
//!
//! Turns assistant markdown into styled, pre-wrapped ratatui lines.
//!
//! Lines are wrapped at a fixed width when the message arrives. Changing the
//! wrap width only affects messages rendered afterwards; existing log lines
//! are not reflowed.

use std::mem;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use thiserror::Error;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;

/// Narrowest width the renderer will lay out
pub const MIN_WRAP_WIDTH: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("wrap width {width} is below the minimum of {min}")]
    WidthTooSmall { width: usize, min: usize },
}

/// Markdown to styled lines at a configured wrap width
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    wrap_width: usize,
    theme: Theme,
}

impl MarkdownRenderer {
    pub fn new(wrap_width: usize, theme: Theme) -> Self {
        Self { wrap_width, theme }
    }

    pub fn wrap_width(&self) -> usize {
        self.wrap_width
    }

    pub fn set_wrap_width(&mut self, wrap_width: usize) {
        self.wrap_width = wrap_width;
    }

    /// Render `source` into lines no wider than the wrap width
    ///
    /// Code block lines are kept verbatim and may exceed it.
    pub fn render(&self, source: &str) -> Result<Vec<Line<'static>>, RenderError> {
        if self.wrap_width < MIN_WRAP_WIDTH {
            return Err(RenderError::WidthTooSmall {
                width: self.wrap_width,
                min: MIN_WRAP_WIDTH,
            });
        }

        let mut writer = LineWriter::new(self.wrap_width, &self.theme);
        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        for event in Parser::new_ext(source, options) {
            writer.event(event);
        }
        Ok(writer.finish())
    }
}

struct ListLevel {
    next_number: Option<u64>,
    marker_width: usize,
}

struct LineWriter<'t> {
    width: usize,
    theme: &'t Theme,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    line_open: bool,
    line_width: usize,
    prefix_width: usize,
    styles: Vec<Style>,
    lists: Vec<ListLevel>,
    pending_marker: Option<String>,
    quote_depth: usize,
    in_code_block: bool,
}

impl<'t> LineWriter<'t> {
    fn new(width: usize, theme: &'t Theme) -> Self {
        Self {
            width,
            theme,
            lines: Vec::new(),
            spans: Vec::new(),
            line_open: false,
            line_width: 0,
            prefix_width: 0,
            styles: Vec::new(),
            lists: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    self.code_text(&text);
                } else {
                    let style = self.style();
                    self.push_text(&text, style);
                }
            }
            Event::Code(code) => {
                let style = self.style().patch(self.theme.code);
                self.push_text(&code, style);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let style = self.style();
                self.push_text(&html.replace('\n', " "), style);
            }
            Event::SoftBreak => {
                let style = self.style();
                self.push_text(" ", style);
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.separate_block();
                self.ensure_line();
                let rule = "─".repeat(self.width.saturating_sub(self.line_width));
                self.push_raw(rule, self.theme.timestamp);
                self.flush();
            }
            Event::TaskListMarker(done) => {
                self.ensure_line();
                let marker = if done { "[x] " } else { "[ ] " };
                self.push_raw(marker.to_string(), self.theme.list_bullet);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.separate_block(),
            Tag::Heading { level, .. } => {
                self.separate_block();
                self.styles.push(self.theme.heading);
                self.ensure_line();
                self.push_raw(format!("{} ", "#".repeat(level as usize)), self.theme.heading);
            }
            Tag::BlockQuote { .. } => {
                self.separate_block();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.separate_block();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.separate_block();
                } else {
                    self.flush();
                }
                self.lists.push(ListLevel {
                    next_number: start,
                    marker_width: 0,
                });
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(ListLevel {
                        next_number: Some(n),
                        ..
                    }) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.pending_marker = Some(marker);
            }
            Tag::Emphasis => self.styles.push(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.styles.push(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self
                .styles
                .push(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { .. } => self.styles.push(self.theme.link),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush(),
            TagEnd::Heading(_) => {
                self.flush();
                self.styles.pop();
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.in_code_block = false;
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Item => {
                self.flush();
                self.pending_marker = None;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.styles.pop();
            }
            _ => {}
        }
    }

    fn style(&self) -> Style {
        self.styles
            .iter()
            .fold(self.theme.assistant, |acc, s| acc.patch(*s))
    }

    /// Blank line between top-level blocks
    fn separate_block(&mut self) {
        self.flush();
        if self.lists.is_empty() && self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn ensure_line(&mut self) {
        if self.line_open {
            return;
        }
        self.line_open = true;
        self.line_width = 0;

        if self.quote_depth > 0 {
            self.push_raw("│ ".repeat(self.quote_depth), self.theme.quote);
        }
        if let Some(depth) = self.lists.len().checked_sub(1) {
            let outer: usize = self.lists[..depth].iter().map(|l| l.marker_width).sum();
            let indent = " ".repeat(outer);
            if !indent.is_empty() {
                self.push_raw(indent, Style::default());
            }
            match self.pending_marker.take() {
                Some(marker) => {
                    self.lists[depth].marker_width = marker.width();
                    self.push_raw(marker, self.theme.list_bullet);
                }
                None => {
                    let hang = self.lists[depth].marker_width;
                    if hang > 0 {
                        self.push_raw(" ".repeat(hang), Style::default());
                    }
                }
            }
        }
        self.prefix_width = self.line_width;
    }

    fn push_raw(&mut self, text: String, style: Style) {
        self.line_width += text.width();
        self.spans.push(Span::styled(text, style));
    }

    fn flush(&mut self) {
        if self.line_open {
            let mut spans = mem::take(&mut self.spans);
            if let Some(last) = spans.last_mut() {
                let trimmed = last.content.trim_end().to_string();
                last.content = trimmed.into();
            }
            self.lines.push(Line::from(spans));
            self.line_open = false;
        }
    }

    /// Word-wrapped text
    fn push_text(&mut self, text: &str, style: Style) {
        for word in text.split_inclusive(' ') {
            self.ensure_line();
            let word_width = word.trim_end().width();
            if self.line_width + word_width > self.width && self.line_width > self.prefix_width {
                self.flush();
                self.ensure_line();
            }

            let word = if self.line_width == self.prefix_width {
                word.trim_start()
            } else {
                word
            };
            if word.is_empty() {
                continue;
            }

            if self.line_width + word.trim_end().width() > self.width {
                self.push_chars(word, style);
            } else {
                self.push_raw(word.to_string(), style);
            }
        }
    }

    /// Hard-split a word wider than the remaining space
    fn push_chars(&mut self, word: &str, style: Style) {
        let mut chunk = String::new();
        let mut chunk_width = 0;
        for ch in word.chars() {
            let w = ch.width().unwrap_or(0);
            let at_line_start = chunk.is_empty() && self.line_width == self.prefix_width;
            if self.line_width + chunk_width + w > self.width && !at_line_start {
                if !chunk.is_empty() {
                    self.push_raw(mem::take(&mut chunk), style);
                    chunk_width = 0;
                }
                self.flush();
                self.ensure_line();
            }
            chunk.push(ch);
            chunk_width += w;
        }
        if !chunk.is_empty() {
            self.push_raw(chunk, style);
        }
    }

    fn code_text(&mut self, text: &str) {
        for segment in text.split_inclusive('\n') {
            let content = segment.trim_end_matches('\n').replace('\t', "    ");
            self.ensure_line();
            if !content.is_empty() {
                self.push_raw(format!("  {content}"), self.theme.code);
            }
            if segment.ends_with('\n') {
                self.flush();
            }
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}
