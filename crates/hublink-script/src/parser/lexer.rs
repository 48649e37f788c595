//! Tokenization of script lines using `nom`.
//!
//! Produces the [`Token`]s of a single script line. Blanks and `//`
//! comments are discarded between tokens.

use hublink_common::error::{HublinkError, Result};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, not_line_ending, space1},
    combinator::value,
    multi::many0,
    sequence::preceded,
};

/// A token of the script language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `add` keyword.
    Add,
    /// `set` keyword.
    Set,
    /// `bind` keyword.
    Bind,
    /// `remove` keyword.
    Remove,
    /// A bare word: dotted path, channel id, or type name.
    Word(String),
    /// A double-quoted string literal.
    StringLiteral(String),
    /// `:` type separator.
    Colon,
    /// `=` assignment.
    Equals,
}

fn skip_trivia(input: &str) -> IResult<&str, ()> {
    let comment = value((), preceded(tag("//"), not_line_ending));
    let ws = value((), space1);
    let (input, _) = many0(alt((ws, comment))).parse(input)?;
    Ok((input, ()))
}

/// Parses a double-quoted string literal with basic escape support.
fn string_literal(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('"')(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices();
    loop {
        match chars.next() {
            Some((idx, '"')) => {
                let remaining = &input[idx + 1..];
                return Ok((remaining, Token::StringLiteral(result)));
            }
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, '\\')) => result.push('\\'),
                Some((_, '"')) => result.push('"'),
                Some((_, c)) => {
                    result.push('\\');
                    result.push(c);
                }
                None => {
                    return Err(nom::Err::Failure(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Char,
                    )));
                }
            },
            Some((_, c)) => result.push(c),
            None => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Char,
                )));
            }
        }
    }
}

const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')
}

fn word_or_keyword(input: &str) -> IResult<&str, Token> {
    let (input, word) = take_while1(is_word_char)(input)?;
    let token = match word {
        "add" => Token::Add,
        "set" => Token::Set,
        "bind" => Token::Bind,
        "remove" => Token::Remove,
        _ => Token::Word(word.to_string()),
    };
    Ok((input, token))
}

fn symbol(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Colon, char(':')),
        value(Token::Equals, char('=')),
    ))
    .parse(input)
}

fn single_token(input: &str) -> IResult<&str, Token> {
    alt((string_literal, symbol, word_or_keyword)).parse(input)
}

/// Tokenizes one script line.
///
/// # Errors
///
/// Returns an error if the line contains characters that cannot be
/// tokenized or an unterminated string.
pub fn tokenize_line(line: &str, line_no: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut remaining = line;

    loop {
        let (rest, ()) = skip_trivia(remaining).map_err(|e| HublinkError::InvalidScript {
            line: line_no,
            message: format!("lexer error skipping blanks: {e}"),
        })?;
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        let (rest, token) = single_token(remaining).map_err(|e| HublinkError::InvalidScript {
            line: line_no,
            message: format!(
                "unexpected character at: \"{}\" ({e})",
                remaining.chars().take(20).collect::<String>()
            ),
        })?;
        tokens.push(token);
        remaining = rest;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keywords() {
        let tokens = tokenize_line("add set bind remove", 1).expect("should tokenize");
        assert_eq!(
            tokens,
            vec![Token::Add, Token::Set, Token::Bind, Token::Remove]
        );
    }

    #[test]
    fn tokenize_add_line() {
        let tokens =
            tokenize_line("add home1.heater : org.ah.Heater/1.0", 1).expect("should tokenize");
        assert_eq!(
            tokens,
            vec![
                Token::Add,
                Token::Word("home1.heater".into()),
                Token::Colon,
                Token::Word("org.ah.Heater/1.0".into()),
            ]
        );
    }

    #[test]
    fn tokenize_set_line_with_escapes() {
        let tokens =
            tokenize_line(r#"set n.c.label = "a \"b\" c""#, 1).expect("should tokenize");
        assert_eq!(
            tokens,
            vec![
                Token::Set,
                Token::Word("n.c.label".into()),
                Token::Equals,
                Token::StringLiteral(r#"a "b" c"#.into()),
            ]
        );
    }

    #[test]
    fn tokenize_skips_trailing_comment() {
        let tokens = tokenize_line("remove n.c // gone", 1).expect("should tokenize");
        assert_eq!(tokens, vec![Token::Remove, Token::Word("n.c".into())]);
    }

    #[test]
    fn tokenize_blank_line() {
        assert!(tokenize_line("   \t", 1).expect("should tokenize").is_empty());
    }

    #[test]
    fn tokenize_unterminated_string_fails() {
        let err = tokenize_line(r#"set n.c.a = "open"#, 4).unwrap_err();
        assert!(err.to_string().contains("line 4"), "got: {err}");
    }

    #[test]
    fn tokenize_error_on_invalid_char() {
        assert!(tokenize_line("add n.c @ T", 1).is_err());
    }
}
