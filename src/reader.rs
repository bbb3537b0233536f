use crate::{
    error::reader::*,
    instruction::{ControllerItem, Expr, Instruction, OpExpr},
    scanner::TokenKind,
    Blueprint, Value,
};
use logos::{Lexer, Logos};

/// A parenthesised form as it appears in an instruction, before it is shaped into an [Expr]
enum Form {
    Expr(Expr),
    Op(String),
}

#[derive(Clone)]
pub struct Reader<'src> {
    pub lexer: Lexer<'src, TokenKind>,
    pub current: Option<TokenKind>,
    pub slice: String,
}

impl<'s> Reader<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            lexer: TokenKind::lexer(source),
            current: None,
            slice: "".into(),
        }
    }

    /// Read a `(machine (registers ...) (controller ...))` description
    pub fn read(&mut self) -> ReaderResult<Blueprint> {
        self.consume(Some(TokenKind::LeftParen), "Expected '(' to open machine")?;
        self.keyword("machine")?;
        let registers = self.registers()?;
        let controller = self.controller()?;
        self.consume(Some(TokenKind::RightParen), "Expected ')' to close machine")?;
        self.consume(None, "Expected end of input after machine")?;
        Ok(Blueprint {
            registers,
            controller,
        })
    }

    /// Read a bare controller sequence, with no surrounding machine form
    pub fn read_controller(&mut self) -> ReaderResult<Vec<ControllerItem>> {
        let mut items = vec![];
        while self.peek().is_some() {
            items.push(self.item()?);
        }
        Ok(items)
    }

    /// Consume and return the next token if it exists
    fn next(&mut self) -> ReaderResult<Option<TokenKind>> {
        self.current = self.lexer.next();
        self.slice = self.lexer.slice().to_string();
        match self.current {
            Some(TokenKind::Error) => Err(ReaderError::BadToken(self.slice.clone())),
            _ => Ok(self.current.clone()),
        }
    }

    /// Get the next token without advancing
    fn peek(&self) -> Option<TokenKind> {
        self.lexer.clone().next()
    }

    /// Consume a token and expect it to equal `kind`
    fn consume(&mut self, kind: Option<TokenKind>, why: &'static str) -> ReaderResult {
        match self.next()? {
            k if k == kind => Ok(()),
            None => Err(ReaderError::EarlyEof),
            k => Err(ReaderError::ExpectedToken {
                reason: why,
                expected: kind,
                received: k,
                slice: self.slice.clone(),
            }),
        }
    }

    /// Consume the next token if it is `expected`
    fn tag(&mut self, expected: TokenKind) -> ReaderResult<bool> {
        if self.peek() == Some(expected) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn atom(&mut self, why: &'static str) -> ReaderResult<String> {
        self.consume(Some(TokenKind::Atom), why)?;
        Ok(self.slice.clone())
    }

    fn keyword(&mut self, word: &'static str) -> ReaderResult {
        let atom = self.atom("Expected a keyword")?;
        if atom == word {
            Ok(())
        } else {
            Err(ReaderError::UnknownForm(atom))
        }
    }

    fn registers(&mut self) -> ReaderResult<Vec<String>> {
        self.consume(Some(TokenKind::LeftParen), "Expected '(registers ...)'")?;
        self.keyword("registers")?;
        let mut names = vec![];
        while !self.tag(TokenKind::RightParen)? {
            names.push(self.atom("Expected a register name")?);
        }
        Ok(names)
    }

    fn controller(&mut self) -> ReaderResult<Vec<ControllerItem>> {
        self.consume(Some(TokenKind::LeftParen), "Expected '(controller ...)'")?;
        self.keyword("controller")?;
        let mut items = vec![];
        while !self.tag(TokenKind::RightParen)? {
            items.push(self.item()?);
        }
        Ok(items)
    }

    /// A label (bare atom) or an instruction (parenthesised form)
    fn item(&mut self) -> ReaderResult<ControllerItem> {
        match self.peek() {
            Some(TokenKind::Atom) => Ok(ControllerItem::Label(self.atom("Expected a label")?)),
            Some(TokenKind::LeftParen) => {
                self.next()?;
                Ok(ControllerItem::Instruction(self.instruction()?))
            }
            None => Err(ReaderError::EarlyEof),
            Some(_) => {
                self.next()?;
                Err(ReaderError::BadToken(self.slice.clone()))
            }
        }
    }

    fn instruction(&mut self) -> ReaderResult<Instruction> {
        let head = self.atom("Expected an instruction name")?;
        let instruction = match head.as_str() {
            "assign" => {
                let reg = self.atom("Expected a register name after 'assign'")?;
                let source = self.expression()?;
                Instruction::Assign { reg, source }
            }
            "test" => Instruction::Test {
                condition: self.expression()?,
            },
            "perform" => Instruction::Perform {
                action: self.expression()?,
            },
            "branch" => Instruction::Branch {
                target: self.expression()?,
            },
            "goto" | "go_to" => Instruction::GoTo {
                target: self.expression()?,
            },
            "save" => Instruction::Save {
                reg: self.atom("Expected a register name after 'save'")?,
            },
            "restore" => Instruction::Restore {
                reg: self.atom("Expected a register name after 'restore'")?,
            },
            _ => return Err(ReaderError::UnknownForm(head)),
        };
        self.consume(Some(TokenKind::RightParen), "Expected ')' after instruction")?;
        Ok(instruction)
    }

    /// Read either a single primitive form, or `(op name)` followed by its inputs
    fn expression(&mut self) -> ReaderResult<Expr> {
        match self.form()? {
            Form::Op(name) => {
                let mut operands = vec![];
                while self.peek() == Some(TokenKind::LeftParen) {
                    operands.push(match self.form()? {
                        Form::Expr(e) => e,
                        // Nested operations are rejected by the compiler with the whole instruction
                        Form::Op(op) => Expr::Op(OpExpr { op, operands: vec![] }),
                    });
                }
                Ok(Expr::Op(OpExpr { op: name, operands }))
            }
            Form::Expr(e) => Ok(e),
        }
    }

    fn form(&mut self) -> ReaderResult<Form> {
        self.consume(Some(TokenKind::LeftParen), "Expected '(' to open an expression")?;
        let head = self.atom("Expected 'const', 'reg', 'label' or 'op'")?;
        let form = match head.as_str() {
            "const" => Form::Expr(Expr::Constant(self.literal()?)),
            "reg" => Form::Expr(Expr::Reg(self.atom("Expected a register name")?)),
            "label" => Form::Expr(Expr::Label(self.atom("Expected a label name")?)),
            "op" => Form::Op(self.atom("Expected an operation name")?),
            _ => return Err(ReaderError::UnknownForm(head)),
        };
        self.consume(Some(TokenKind::RightParen), "Expected ')' after expression")?;
        Ok(form)
    }

    fn literal(&mut self) -> ReaderResult<Value> {
        match self.next()? {
            Some(TokenKind::Atom) => Ok(Value::from_atom(&self.slice)),
            Some(TokenKind::Str) => Ok(Value::VSymbol(self.slice.trim_matches('"').to_string())),
            None => Err(ReaderError::EarlyEof),
            received => Err(ReaderError::ExpectedToken {
                reason: "Expected a constant",
                expected: Some(TokenKind::Atom),
                received,
                slice: self.slice.clone(),
            }),
        }
    }
}

/// Read a machine description from source text
pub fn read(source: &str) -> ReaderResult<Blueprint> {
    Reader::new(source).read()
}
