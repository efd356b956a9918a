//! Print the tokens of a document read from stdin.
//!
//! Switches to value mode after `=` and back to key mode at each newline,
//! which is enough to see how most documents lex. Set `RUST_LOG=trace` to
//! see the lexer's own trace output.

use std::io::Read;

use kiln_tokenizer::{LexMode, Lexer, SourceView, TokenKind};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source).unwrap();

    let view = SourceView::new(&source);
    let mut lexer = Lexer::new(&view);
    let mut mode = LexMode::Key;
    loop {
        let token = lexer.next_token(mode);
        println!("{:?} {:?} {:?}", mode, token.kind, token.text);
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Equal => mode = LexMode::Value,
            TokenKind::NewLine => mode = LexMode::Key,
            _ => {}
        }
    }

    for diagnostic in lexer.drain_diagnostics() {
        eprintln!("{diagnostic}");
    }
}
