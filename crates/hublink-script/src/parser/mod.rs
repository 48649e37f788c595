//! Script text parser built on `nom`.
//!
//! Reads the line-oriented script format back into a [`Script`] through
//! lexing, per-line parsing, and optional order validation.

pub mod lexer;
pub mod validator;

use hublink_common::error::{HublinkError, Result};
use hublink_common::types::{ChannelId, ComponentPath};

use self::lexer::Token;
use crate::script::{PortRef, Script, ScriptOp};

/// Cursor into the tokens of one line.
struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
}

impl<'a> TokenCursor<'a> {
    const fn new(tokens: &'a [Token], line: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
        }
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_word(&mut self) -> Result<String> {
        let line = self.line;
        match self.advance() {
            Some(Token::Word(s)) => Ok(s.clone()),
            other => Err(parse_err(line, format!("expected a name, got {other:?}"))),
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<()> {
        let line = self.line;
        match self.advance() {
            Some(tok) if tok == expected => Ok(()),
            other => Err(parse_err(
                line,
                format!("expected {expected:?}, got {other:?}"),
            )),
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        let line = self.line;
        match self.advance() {
            Some(Token::StringLiteral(s)) => Ok(s.clone()),
            other => Err(parse_err(
                line,
                format!("expected string literal, got {other:?}"),
            )),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(extra) => Err(parse_err(
                self.line,
                format!("unexpected trailing {extra:?}"),
            )),
        }
    }
}

const fn parse_err(line: usize, message: String) -> HublinkError {
    HublinkError::InvalidScript { line, message }
}

/// Parses script text into operations.
///
/// Blank lines and `//` comments are ignored. Validation of dependency
/// order is separate; see [`validator::validate`].
///
/// # Errors
///
/// Returns an error naming the first line that cannot be parsed.
pub fn parse_script(input: &str) -> Result<Script> {
    tracing::debug!(lines = input.lines().count(), "parsing script");
    let mut script = Script::new();
    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let tokens = lexer::tokenize_line(line, line_no)?;
        if tokens.is_empty() {
            continue;
        }
        let mut cursor = TokenCursor::new(&tokens, line_no);
        let op = parse_op(&mut cursor)?;
        cursor.expect_end()?;
        script.push(op);
    }
    Ok(script)
}

fn parse_op(cursor: &mut TokenCursor<'_>) -> Result<ScriptOp> {
    let line = cursor.line;
    match cursor.advance() {
        Some(Token::Add) => parse_add(cursor),
        Some(Token::Set) => parse_set(cursor),
        Some(Token::Bind) => parse_bind(cursor),
        Some(Token::Remove) => {
            let path = component_path(&cursor.expect_word()?, line)?;
            Ok(ScriptOp::Remove { path })
        }
        other => Err(parse_err(
            line,
            format!("expected add, set, bind, or remove, got {other:?}"),
        )),
    }
}

fn parse_add(cursor: &mut TokenCursor<'_>) -> Result<ScriptOp> {
    let target = cursor.expect_word()?;
    cursor.expect_token(&Token::Colon)?;
    let type_name = cursor.expect_word()?;
    if target.contains('.') {
        Ok(ScriptOp::AddComponent {
            path: component_path(&target, cursor.line)?,
            type_name,
        })
    } else {
        Ok(ScriptOp::AddChannel {
            channel: ChannelId::new(target),
            type_name,
        })
    }
}

fn parse_set(cursor: &mut TokenCursor<'_>) -> Result<ScriptOp> {
    let target = cursor.expect_word()?;
    cursor.expect_token(&Token::Equals)?;
    let value = cursor.expect_string()?;
    let (path, attribute) = member_path(&target, cursor.line)?;
    Ok(ScriptOp::SetAttribute {
        path,
        attribute,
        value,
    })
}

fn parse_bind(cursor: &mut TokenCursor<'_>) -> Result<ScriptOp> {
    let target = cursor.expect_word()?;
    let channel = cursor.expect_word()?;
    let (component, port) = member_path(&target, cursor.line)?;
    Ok(ScriptOp::Bind {
        port: PortRef::new(component, port),
        channel: ChannelId::new(channel),
    })
}

fn component_path(word: &str, line: usize) -> Result<ComponentPath> {
    match word.split_once('.') {
        Some((node, id)) if !node.is_empty() && !id.is_empty() && !id.contains('.') => {
            Ok(ComponentPath::new(node, id))
        }
        _ => Err(parse_err(
            line,
            format!("expected <node>.<id>, got \"{word}\""),
        )),
    }
}

fn member_path(word: &str, line: usize) -> Result<(ComponentPath, String)> {
    let mut parts = word.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(node), Some(id), Some(member))
            if !node.is_empty() && !id.is_empty() && !member.is_empty() =>
        {
            Ok((ComponentPath::new(node, id), member.to_string()))
        }
        _ => Err(parse_err(
            line,
            format!("expected <node>.<id>.<name>, got \"{word}\""),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_input() {
        let script = parse_script("").expect("should parse empty input");
        assert!(script.is_empty());
    }

    #[test]
    fn parse_start_script() {
        let input = "add home1.heater : org.activehome.Heater\n\
                     set home1.heater.target = \"21\"\n\
                     add chan_in_home1_light_a : AsyncBroadcast\n\
                     bind home1.light_a.in chan_in_home1_light_a\n\
                     bind home1.heater.out chan_in_home1_light_a\n";
        let script = parse_script(input).expect("should parse");
        assert_eq!(script.len(), 5);
        assert_eq!(
            script.ops()[0],
            ScriptOp::AddComponent {
                path: ComponentPath::new("home1", "heater"),
                type_name: "org.activehome.Heater".into(),
            }
        );
        assert!(matches!(
            &script.ops()[2],
            ScriptOp::AddChannel { channel, .. } if channel.as_str() == "chan_in_home1_light_a"
        ));
        assert!(matches!(
            &script.ops()[4],
            ScriptOp::Bind { port, .. } if port.port == "out"
        ));
    }

    #[test]
    fn parse_renders_back_identically() {
        let input = "add n.c : T\nset n.c.a = \"x \\\"y\\\"\"\nremove n.c\n";
        let script = parse_script(input).expect("should parse");
        assert_eq!(script.to_text(), input);
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let input = "// header\n\nremove home1.meter // old one\n";
        let script = parse_script(input).expect("should parse");
        assert_eq!(script.len(), 1);
    }

    #[test]
    fn parse_error_reports_line() {
        let input = "remove home1.meter\nbind home1.meter chan_x\n";
        let err = parse_script(input).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "got: {msg}");
    }

    #[test]
    fn parse_error_on_trailing_tokens() {
        assert!(parse_script("remove n.c extra").is_err());
    }

    #[test]
    fn parse_error_on_unknown_keyword() {
        assert!(parse_script("attach n.c grp").is_err());
    }

    #[test]
    fn parse_error_on_unquoted_value() {
        assert!(parse_script("set n.c.a = 5").is_err());
    }
}
