//! Reader for a gate-level Verilog netlist subset.
//!
//! The supported grammar covers what an AND-gate netlist needs and nothing
//! more: a single module with port, `input`, `output` and `wire`
//! declarations, plus `assign` statements whose right-hand side is either a
//! (possibly `~`-negated) name or the `&` of two such operands. `//`
//! comments are skipped.
//!
//! Parsing is split from graph building: the parser fires named events on
//! a [`NetlistVisitor`], and [`AigBuilder`] is the visitor that turns the
//! events into graph mutators. Undefined names are not parse errors; the
//! builder reports them to the [`DiagnosticEngine`] and reads them as
//! constant 0.

use std::io::BufRead;

use hashbrown::HashMap;
use thiserror::Error;

use crate::aig::Aig;
use crate::diagnostics::{DiagnosticEngine, Severity};
use crate::signal::Signal;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// A named operand with an optional leading `~`.
#[derive(Debug, Copy, Clone)]
pub struct Operand<'a> {
    pub name: &'a str,
    pub complement: bool,
}

/// Receiver for netlist events, fired in file order.
pub trait NetlistVisitor {
    fn on_module(&mut self, _name: &str) {}
    fn on_inputs(&mut self, names: &[String]);
    fn on_outputs(&mut self, names: &[String]);
    fn on_wires(&mut self, _names: &[String]) {}
    fn on_and(&mut self, lhs: &str, a: Operand<'_>, b: Operand<'_>);
    fn on_assign(&mut self, lhs: &str, rhs: Operand<'_>);
    fn on_endmodule(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    LParen,
    RParen,
    Comma,
    Semi,
    Equals,
    Amp,
    Tilde,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "'{}'", name),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Semi => write!(f, "';'"),
            Token::Equals => write!(f, "'='"),
            Token::Amp => write!(f, "'&'"),
            Token::Tilde => write!(f, "'~'"),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn tokenize(reader: impl BufRead) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = index + 1;
        let code = line.split("//").next().unwrap_or("");

        let mut chars = code.chars().peekable();
        while let Some(c) = chars.next() {
            let token = match c {
                c if c.is_whitespace() => continue,
                '(' => Token::LParen,
                ')' => Token::RParen,
                ',' => Token::Comma,
                ';' => Token::Semi,
                '=' => Token::Equals,
                '&' => Token::Amp,
                '~' => Token::Tilde,
                c if is_ident_char(c) => {
                    let mut name = String::new();
                    name.push(c);
                    while let Some(&next) = chars.peek() {
                        if !is_ident_char(next) {
                            break;
                        }
                        name.push(next);
                        chars.next();
                    }
                    Token::Ident(name)
                }
                other => {
                    return Err(ParseError::Syntax {
                        line: lineno,
                        message: format!("unexpected character {:?}", other),
                    })
                }
            };
            tokens.push((token, lineno));
        }
    }
    Ok(tokens)
}

struct Parser<'v, V> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    visitor: &'v mut V,
}

impl<V: NetlistVisitor> Parser<'_, V> {
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(0, |(_, line)| *line)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            line: self.line(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.error(format!("expected {}, found {}", expected, token))),
            None => Err(self.error(format!("expected {}, found end of file", expected))),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            Some(token) => Err(self.error(format!("expected {}, found {}", what, token))),
            None => Err(self.error(format!("expected {}, found end of file", what))),
        }
    }

    /// `IDENT { "," IDENT } ";"`
    fn name_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_ident("a name")?];
        loop {
            match self.advance() {
                Some(Token::Comma) => names.push(self.expect_ident("a name")?),
                Some(Token::Semi) => return Ok(names),
                Some(token) => {
                    return Err(self.error(format!("expected ',' or ';', found {}", token)))
                }
                None => return Err(self.error("expected ',' or ';', found end of file")),
            }
        }
    }

    /// `[ "~" ] IDENT`
    fn operand(&mut self) -> Result<(String, bool), ParseError> {
        let complement = matches!(self.peek(), Some(Token::Tilde));
        if complement {
            self.advance();
        }
        Ok((self.expect_ident("an operand name")?, complement))
    }

    fn assign(&mut self) -> Result<(), ParseError> {
        let lhs = self.expect_ident("an assignment target")?;
        self.expect(Token::Equals)?;
        let (a_name, a_complement) = self.operand()?;

        if matches!(self.peek(), Some(Token::Amp)) {
            self.advance();
            let (b_name, b_complement) = self.operand()?;
            self.expect(Token::Semi)?;
            self.visitor.on_and(
                &lhs,
                Operand {
                    name: &a_name,
                    complement: a_complement,
                },
                Operand {
                    name: &b_name,
                    complement: b_complement,
                },
            );
        } else {
            self.expect(Token::Semi)?;
            self.visitor.on_assign(
                &lhs,
                Operand {
                    name: &a_name,
                    complement: a_complement,
                },
            );
        }
        Ok(())
    }

    fn module(&mut self) -> Result<(), ParseError> {
        match self.expect_ident("'module'")? {
            keyword if keyword == "module" => {}
            other => return Err(self.error(format!("expected 'module', found '{}'", other))),
        }
        let name = self.expect_ident("a module name")?;
        self.visitor.on_module(&name);

        // Port list: names only; directions come from the declarations.
        self.expect(Token::LParen)?;
        if !matches!(self.peek(), Some(Token::RParen)) {
            loop {
                self.expect_ident("a port name")?;
                match self.advance() {
                    Some(Token::Comma) => continue,
                    Some(Token::RParen) => break,
                    Some(token) => {
                        return Err(self.error(format!("expected ',' or ')', found {}", token)))
                    }
                    None => return Err(self.error("unterminated port list")),
                }
            }
        } else {
            self.advance();
        }
        self.expect(Token::Semi)?;

        loop {
            match self.expect_ident("a statement")?.as_str() {
                "input" => {
                    let names = self.name_list()?;
                    self.visitor.on_inputs(&names);
                }
                "output" => {
                    let names = self.name_list()?;
                    self.visitor.on_outputs(&names);
                }
                "wire" => {
                    let names = self.name_list()?;
                    self.visitor.on_wires(&names);
                }
                "assign" => self.assign()?,
                "endmodule" => {
                    self.visitor.on_endmodule();
                    return Ok(());
                }
                other => {
                    return Err(self.error(format!("unexpected statement '{}'", other)));
                }
            }
        }
    }
}

/// Parses a netlist, firing events on `visitor`.
pub fn read_netlist<V: NetlistVisitor>(
    reader: impl BufRead,
    visitor: &mut V,
) -> Result<(), ParseError> {
    let tokens = tokenize(reader)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        visitor,
    };
    parser.module()?;
    if parser.peek().is_some() {
        return Err(parser.error("trailing input after 'endmodule'"));
    }
    Ok(())
}

/// Visitor that builds an [`Aig`] from netlist events.
///
/// Inputs become PIs in declaration order; `&` assignments become AND
/// nodes; plain assignments are aliases. Output names are remembered and
/// resolved to `create_po` calls, in declaration order, at `endmodule`.
pub struct AigBuilder<'a> {
    aig: &'a mut Aig,
    diag: &'a DiagnosticEngine,
    signals: HashMap<String, Signal>,
    outputs: Vec<String>,
}

impl<'a> AigBuilder<'a> {
    pub fn new(aig: &'a mut Aig, diag: &'a DiagnosticEngine) -> Self {
        Self {
            aig,
            diag,
            signals: HashMap::new(),
            outputs: Vec::new(),
        }
    }

    fn resolve(&self, operand: Operand<'_>) -> Signal {
        match self.signals.get(operand.name) {
            Some(&signal) => signal ^ operand.complement,
            None => {
                self.diag.report(
                    Severity::Warning,
                    &format!("undefined signal {} read as constant 0", operand.name),
                );
                self.aig.get_constant(false) ^ operand.complement
            }
        }
    }
}

impl NetlistVisitor for AigBuilder<'_> {
    fn on_inputs(&mut self, names: &[String]) {
        for name in names {
            let signal = self.aig.create_pi();
            self.signals.insert(name.clone(), signal);
        }
    }

    fn on_outputs(&mut self, names: &[String]) {
        self.outputs.extend(names.iter().cloned());
    }

    fn on_and(&mut self, lhs: &str, a: Operand<'_>, b: Operand<'_>) {
        let a = self.resolve(a);
        let b = self.resolve(b);
        let signal = self.aig.create_and(a, b);
        self.signals.insert(lhs.to_string(), signal);
    }

    fn on_assign(&mut self, lhs: &str, rhs: Operand<'_>) {
        let signal = self.resolve(rhs);
        self.signals.insert(lhs.to_string(), signal);
    }

    fn on_endmodule(&mut self) {
        for name in std::mem::take(&mut self.outputs) {
            let signal = self.resolve(Operand {
                name: &name,
                complement: false,
            });
            self.aig.create_po(signal);
        }
    }
}
