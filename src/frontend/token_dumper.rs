use std::fmt::Write;

use crate::frontend::lexer::Spanned;
use crate::frontend::token::Token;

pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints source spelling instead of Debug
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const RED: &'static str = "\x1b[31m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Spanned]) {
        print!("{}", self.render(tokens));
    }

    /// One line per token: position, kind, then the token itself.
    pub fn render(&self, tokens: &[Spanned]) -> String {
        let mut out = String::new();
        for s in tokens {
            self.render_one(&mut out, s);
        }
        out
    }

    fn render_one(&self, out: &mut String, s: &Spanned) {
        let line = s.span.line;
        let col = s.span.col;

        let kind = Self::kind(&s.token);
        let colr = if self.color { Self::color(&s.token) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        let text = if self.show_debug_repr {
            format!("{:?}", s.token)
        } else {
            match &s.token {
                Token::Comment(c) => format!("COMMENT: {}", c.trim()),
                Token::Newline => "NEWLINE".to_string(),
                Token::Eof => "EOF".to_string(),
                t => t.to_string(),
            }
        };

        writeln!(
            out,
            "[{:02}:{:02}] {}{:<8} {}{}",
            line, col, colr, kind, text, reset
        )
        .ok();
    }

    fn kind(t: &Token) -> &'static str {
        match t {
            Token::Newline => "NEWLINE",
            Token::Comment(_) => "COMMENT",
            Token::Eof => "EOF",
            Token::Condition(_) => "COND",
            Token::Ident(_) => "IDENT",
            Token::Other(_) => "OTHER",
            _ => "KEYWORD",
        }
    }

    fn color(t: &Token) -> &'static str {
        match t {
            Token::Newline | Token::Comment(_) | Token::Eof => Self::DIM,
            Token::Condition(_) => Self::CYN,
            Token::Ident(_) => Self::YEL,
            Token::Other(_) => Self::RED,
            _ => Self::MAG,
        }
    }
}
