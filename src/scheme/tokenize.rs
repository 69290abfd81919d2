//! Quoting-aware splitting of `share:` argument strings.
//!
//! Descriptors arrive as a single string; the resolver consumes an
//! option/positional list. This splitter understands double and single
//! quotes and backslash escapes, enough for nested descriptors and paths
//! with spaces. It is not a shell.

use crate::error::Error;

/// Splits `input` into tokens. Unterminated quoting is a parameter error.
pub fn tokenize(input: &str) -> Result<Vec<String>, Error> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else if c == '\\' && q == '"' {
                    match chars.next() {
                        Some(escaped) => current.push(escaped),
                        None => return Err(Error::Parameter),
                    }
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    in_token = true;
                }
                '\\' => match chars.next() {
                    Some(escaped) => {
                        current.push(escaped);
                        in_token = true;
                    }
                    None => return Err(Error::Parameter),
                },
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(core::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(Error::Parameter);
    }
    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_split() {
        assert_eq!(
            tokenize("-l128 -t3 -pass pass:zed s1 s2").unwrap(),
            vec!["-l128", "-t3", "-pass", "pass:zed", "s1", "s2"]
        );
        assert_eq!(tokenize("   ").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_quoted_tokens() {
        assert_eq!(
            tokenize(r#"-pass "pass:two words" s1"#).unwrap(),
            vec!["-pass", "pass:two words", "s1"]
        );
        assert_eq!(
            tokenize(r#"'quoted one' rest"#).unwrap(),
            vec!["quoted one", "rest"]
        );
        // Adjacent quoted and bare text form one token.
        assert_eq!(tokenize(r#"share:"-t2 -l128""#).unwrap(), vec!["share:-t2 -l128"]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(tokenize(r#"a\ b c"#).unwrap(), vec!["a b", "c"]);
        assert_eq!(tokenize(r#""a\"b""#).unwrap(), vec![r#"a"b"#]);
    }

    #[test]
    fn test_unterminated_quote_rejected() {
        assert_eq!(tokenize(r#""open"#).unwrap_err(), Error::Parameter);
        assert_eq!(tokenize(r#"trailing\"#).unwrap_err(), Error::Parameter);
    }
}
