//! Indentation-aware lexer for Narratr.
//!
//! Mirrors the shape of a conventional hand-written lexer: a single
//! `Lexer::tokenize` pass over the source text that produces a flat token
//! stream with synthetic `Indent`/`Dedent`/`Newline` markers, the same layout
//! tokens a generated parser would expect from a lexer built atop a pattern
//! table (compare `lexan::LexiconIfce`) -- except here the patterns are fixed
//! by the one grammar this lexer serves, so they are matched directly rather
//! than through a generic longest-match table.

mod error;
mod location;
mod token;

pub use error::Error;
pub use location::Location;
pub use token::{Token, TokenKind};

/// Tokenizes `source` in its entirety, returning the flat token stream ending
/// with a single `TokenKind::EndMarker`, or the first lexical error
/// encountered (lexical errors are fatal, per the single-pass design).
pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(source).tokenize()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    indent_stack: Vec<usize>,
    paren_depth: i32,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            indent_stack: vec![0],
            paren_depth: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn loc(&self) -> Location {
        Location::new(self.line)
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>, location: Location) {
        self.tokens.push(Token::new(kind, lexeme, location));
    }

    fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        loop {
            self.consume_indentation()?;
            if self.peek().is_none() {
                break;
            }
            self.scan_line()?;
        }
        self.finish()?;
        Ok(self.tokens)
    }

    /// Handles indentation measurement at the start of a logical line. Blank
    /// lines and comment-only lines are skipped entirely: they never produce
    /// `Indent`/`Dedent`/`Newline` tokens. Does nothing while inside an open
    /// bracket pair, matching the common convention that layout is
    /// insignificant inside `( [ {`.
    fn consume_indentation(&mut self) -> Result<(), Error> {
        if self.paren_depth > 0 {
            return Ok(());
        }
        loop {
            let start = self.pos;
            let mut width = 0usize;
            while let Some(c) = self.peek() {
                match c {
                    ' ' => {
                        width += 1;
                        self.pos += 1;
                    }
                    '\t' => {
                        width += 1;
                        self.pos += 1;
                    }
                    _ => break,
                }
            }
            match self.peek() {
                None => {
                    self.pos = start;
                    return Ok(());
                }
                Some('\n') => {
                    self.pos += 1;
                    self.line += 1;
                    continue;
                }
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some(_) => {
                    self.apply_indent(width)?;
                    return Ok(());
                }
            }
        }
    }

    fn apply_indent(&mut self, width: usize) -> Result<(), Error> {
        let current = *self.indent_stack.last().unwrap();
        if width > current {
            self.indent_stack.push(width);
            self.push(TokenKind::Indent, "", self.loc());
        } else if width < current {
            while *self.indent_stack.last().unwrap() > width {
                self.indent_stack.pop();
                self.push(TokenKind::Dedent, "", self.loc());
            }
            if *self.indent_stack.last().unwrap() != width {
                return Err(Error::InconsistentDedent(self.loc()));
            }
        }
        Ok(())
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    /// Scans tokens until the end of the current logical line (a physical
    /// newline outside brackets), leaving the newline itself unconsumed so
    /// `tokenize`'s outer loop re-enters `consume_indentation`.
    fn scan_line(&mut self) -> Result<(), Error> {
        loop {
            match self.peek() {
                None => return Ok(()),
                Some(' ') | Some('\t') => {
                    self.pos += 1;
                }
                Some('#') => {
                    self.skip_comment();
                }
                Some('\n') => {
                    self.pos += 1;
                    if self.paren_depth == 0 {
                        self.push(TokenKind::Newline, "\n", self.loc());
                        self.line += 1;
                        return Ok(());
                    }
                    self.line += 1;
                }
                Some(_) => self.scan_token()?,
            }
        }
    }

    fn scan_token(&mut self) -> Result<(), Error> {
        let location = self.loc();
        let c = self.advance().expect("scan_token called at EOF");
        match c {
            '"' => self.scan_string(location),
            '$' => self.scan_sceneid(location),
            c if c.is_ascii_digit() => self.scan_number(c, location),
            c if c.is_alphabetic() || c == '_' => self.scan_ident(c, location),
            '{' => {
                // Braces delimit a scene block but carry no layout
                // significance of their own -- setup/action/cleanup suites
                // inside them are still indentation-sensitive, so unlike
                // `( [` a `{` does not suppress Newline/Indent/Dedent.
                self.push(TokenKind::LBrace, "{", location);
                Ok(())
            }
            '}' => {
                self.push(TokenKind::RBrace, "}", location);
                Ok(())
            }
            '(' => {
                self.paren_depth += 1;
                self.push(TokenKind::LParen, "(", location);
                Ok(())
            }
            ')' => {
                self.paren_depth -= 1;
                self.push(TokenKind::RParen, ")", location);
                Ok(())
            }
            '[' => {
                self.paren_depth += 1;
                self.push(TokenKind::LBracket, "[", location);
                Ok(())
            }
            ']' => {
                self.paren_depth -= 1;
                self.push(TokenKind::RBracket, "]", location);
                Ok(())
            }
            ':' => {
                self.push(TokenKind::Colon, ":", location);
                Ok(())
            }
            ',' => {
                self.push(TokenKind::Comma, ",", location);
                Ok(())
            }
            '.' => {
                self.push(TokenKind::Dot, ".", location);
                Ok(())
            }
            '+' => {
                self.push(TokenKind::Plus, "+", location);
                Ok(())
            }
            '-' => {
                self.push(TokenKind::Minus, "-", location);
                Ok(())
            }
            '*' => {
                self.push(TokenKind::Star, "*", location);
                Ok(())
            }
            '/' => {
                if self.peek() == Some('/') {
                    self.pos += 1;
                    self.push(TokenKind::SlashSlash, "//", location);
                } else {
                    self.push(TokenKind::Slash, "/", location);
                }
                Ok(())
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                    self.push(TokenKind::LessEq, "<=", location);
                } else {
                    self.push(TokenKind::Less, "<", location);
                }
                Ok(())
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                    self.push(TokenKind::GreaterEq, ">=", location);
                } else {
                    self.push(TokenKind::Greater, ">", location);
                }
                Ok(())
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                    self.push(TokenKind::EqEq, "==", location);
                    Ok(())
                } else {
                    Err(Error::UnexpectedChar('=', location))
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                    self.push(TokenKind::NotEq, "!=", location);
                    Ok(())
                } else {
                    Err(Error::UnexpectedChar('!', location))
                }
            }
            c => Err(Error::UnexpectedChar(c, location)),
        }
    }

    fn scan_string(&mut self, location: Location) -> Result<(), Error> {
        let mut lexeme = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => return Err(Error::UnterminatedString(location)),
                Some('"') => break,
                Some('\\') => {
                    // Escapes are preserved verbatim for later re-emission by
                    // the code generator; the lexer does not interpret them.
                    lexeme.push('\\');
                    match self.advance() {
                        None => return Err(Error::UnterminatedString(location)),
                        Some(escaped) => lexeme.push(escaped),
                    }
                }
                Some(c) => lexeme.push(c),
            }
        }
        self.push(TokenKind::StringLit(lexeme.clone()), lexeme, location);
        Ok(())
    }

    fn scan_sceneid(&mut self, location: Location) -> Result<(), Error> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(Error::UnexpectedChar('$', location));
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        let n: u32 = digits
            .parse()
            .map_err(|_| Error::MalformedNumber(format!("${}", digits), location))?;
        self.push(TokenKind::SceneId(n), format!("${}", digits), location);
        Ok(())
    }

    fn scan_number(&mut self, first: char, location: Location) -> Result<(), Error> {
        let start = self.pos - 1;
        let _ = first;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else {
                break;
            }
        }
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| Error::MalformedNumber(text.clone(), location))?;
            self.push(TokenKind::FloatLit(value), text, location);
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| Error::MalformedNumber(text.clone(), location))?;
            self.push(TokenKind::IntLit(value), text, location);
        }
        Ok(())
    }

    fn scan_ident(&mut self, first: char, location: Location) -> Result<(), Error> {
        let start = self.pos - 1;
        let _ = first;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let kind = keyword(&text).unwrap_or_else(|| TokenKind::Ident(text.clone()));
        self.push(kind, text, location);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        if !matches!(self.tokens.last().map(|t| t.kind()), Some(TokenKind::Newline) | None) {
            self.push(TokenKind::Newline, "", self.loc());
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(TokenKind::Dedent, "", self.loc());
        }
        self.push(TokenKind::EndMarker, "", self.loc());
        Ok(())
    }
}

fn keyword(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match text {
        "scene" => Scene,
        "item" => Item,
        "start" => Start,
        "setup" => Setup,
        "action" => Action,
        "cleanup" => Cleanup,
        "say" => Say,
        "exposition" => Exposition,
        "win" => Win,
        "lose" => Lose,
        "moves" => Moves,
        "moveto" => Moveto,
        "god" => God,
        "if" => If,
        "elif" => Elif,
        "else" => Else,
        "while" => While,
        "break" => Break,
        "continue" => Continue,
        "and" => And,
        "or" => Or,
        "not" => Not,
        "is" => Is,
        "true" => True,
        "false" => False,
        "left" => Left,
        "right" => Right,
        "up" => Up,
        "down" => Down,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|t| t.kind().clone())
            .collect()
    }

    #[test]
    fn keywords_and_sceneid() {
        let kinds = kinds("scene $1 {\n}\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Scene,
                TokenKind::SceneId(1),
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn indent_and_dedent_are_balanced() {
        let kinds = kinds("if true:\n    say \"hi\"\nsay \"bye\"\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::If,
                TokenKind::True,
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Say,
                TokenKind::StringLit("hi".to_string()),
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Say,
                TokenKind::StringLit("bye".to_string()),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn blank_lines_and_comments_produce_no_layout_tokens() {
        let kinds = kinds("\n# a comment\n\nsay \"hi\"\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Say,
                TokenKind::StringLit("hi".to_string()),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn inconsistent_dedent_is_an_error() {
        let err = tokenize("if true:\n        say \"hi\"\n    say \"bye\"\n").unwrap_err();
        assert!(matches!(err, Error::InconsistentDedent(_)));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("say \"hi\n").unwrap_err();
        assert!(matches!(err, Error::UnterminatedString(_)));
    }

    #[test]
    fn string_literal_preserves_escapes_verbatim() {
        let kinds = kinds(r#"say "a\"b"
"#);
        assert_eq!(
            kinds,
            vec![
                TokenKind::Say,
                TokenKind::StringLit("a\\\"b".to_string()),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn integer_division_and_float_literals() {
        let kinds = kinds("10 // 3\n1.5\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLit(10),
                TokenKind::SlashSlash,
                TokenKind::IntLit(3),
                TokenKind::Newline,
                TokenKind::FloatLit(1.5),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn brackets_suppress_layout_tokens() {
        let kinds = kinds("[1,\n2]\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::LBracket,
                TokenKind::IntLit(1),
                TokenKind::Comma,
                TokenKind::IntLit(2),
                TokenKind::RBracket,
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }
}
