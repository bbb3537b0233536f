use logos::Logos;

#[derive(PartialEq, Debug, Clone, Logos)]
pub enum TokenKind {
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,

    // Numbers, booleans and symbols are told apart by the reader
    #[regex(r#"[^ \t\r\n\f()";]+"#)]
    Atom,
    #[regex(r#""[^"]*""#)]
    Str,

    #[error]
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[regex(r";[^\n]*", logos::skip)]
    Error,
}
