//! Path expression compiler.
//!
//! Compiles a minimal JSONPath subset — `$` followed by any number of
//! `.name`, `.*`, `[index]`, `[*]` — into an immutable [`PathQuery`].
//! Member names are stored as raw bytes so matching can compare them
//! directly against key spans in the document, without decoding or
//! allocating per evaluation.

use std::fmt;

use crate::PathParseError;

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Root,
    Member(Vec<u8>),
    WildcardMember,
    Index(u32),
    WildcardIndex,
}

/// A compiled, immutable path expression.
///
/// Compilation is pure: the same expression always yields an equal plan, and
/// a plan carries no evaluation state, so it can be shared freely across
/// threads and reused for any number of concurrent evaluations. Per-run
/// state lives in [`MatchState`](crate::MatchState) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    steps: Vec<Step>,
}

impl PathQuery {
    /// Compiles a path expression.
    pub fn compile(expr: &str) -> Result<Self, PathParseError> {
        Parser::new(expr).parse()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step {
                Step::Root => write!(f, "$")?,
                Step::Member(name) => write!(f, ".{}", String::from_utf8_lossy(name))?,
                Step::WildcardMember => write!(f, ".*")?,
                Step::Index(i) => write!(f, "[{i}]")?,
                Step::WildcardIndex => write!(f, "[*]")?,
            }
        }
        Ok(())
    }
}

struct Parser<'a> {
    expr: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(expr: &'a str) -> Self {
        Self {
            expr,
            bytes: expr.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expr(&self) -> String {
        self.expr.to_string()
    }

    fn unexpected(&self, pos: usize) -> PathParseError {
        PathParseError::UnexpectedChar {
            expr: self.expr(),
            pos,
            ch: self.expr[pos..].chars().next().unwrap_or('\0'),
        }
    }

    fn parse(mut self) -> Result<PathQuery, PathParseError> {
        if self.peek() != Some(b'$') {
            return Err(PathParseError::ExpectedRoot { expr: self.expr() });
        }
        self.pos += 1;

        let mut steps = vec![Step::Root];
        while let Some(byte) = self.peek() {
            match byte {
                b'.' => {
                    self.pos += 1;
                    steps.push(self.parse_member()?);
                }
                b'[' => {
                    steps.push(self.parse_bracket()?);
                }
                _ => return Err(self.unexpected(self.pos)),
            }
        }
        Ok(PathQuery { steps })
    }

    fn parse_member(&mut self) -> Result<Step, PathParseError> {
        if self.peek().is_none() {
            return Err(PathParseError::UnexpectedEnd { expr: self.expr() });
        }
        if self.peek() == Some(b'*') {
            self.pos += 1;
            // a wildcard must be followed by the next selector or the end
            match self.peek() {
                None | Some(b'.') | Some(b'[') => return Ok(Step::WildcardMember),
                _ => return Err(self.unexpected(self.pos)),
            }
        }

        let start = self.pos;
        while let Some(byte) = self.peek() {
            match byte {
                b'.' | b'[' => break,
                b']' | b'*' => return Err(self.unexpected(self.pos)),
                _ => self.pos += 1,
            }
        }
        if self.pos == start {
            return Err(PathParseError::EmptyMember {
                expr: self.expr(),
                pos: start,
            });
        }
        Ok(Step::Member(self.bytes[start..self.pos].to_vec()))
    }

    fn parse_bracket(&mut self) -> Result<Step, PathParseError> {
        let open = self.pos;
        self.pos += 1; // consume '['

        if self.peek() == Some(b'*') {
            self.pos += 1;
            return match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    Ok(Step::WildcardIndex)
                }
                Some(_) => Err(self.unexpected(self.pos)),
                None => Err(PathParseError::UnterminatedBracket {
                    expr: self.expr(),
                    pos: open,
                }),
            };
        }

        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                None => Err(PathParseError::UnterminatedBracket {
                    expr: self.expr(),
                    pos: open,
                }),
                Some(_) => Err(PathParseError::InvalidIndex {
                    expr: self.expr(),
                    pos: start,
                }),
            };
        }
        let index: u32 =
            self.expr[start..self.pos]
                .parse()
                .map_err(|_| PathParseError::InvalidIndex {
                    expr: self.expr(),
                    pos: start,
                })?;

        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                Ok(Step::Index(index))
            }
            Some(_) => Err(self.unexpected(self.pos)),
            None => Err(PathParseError::UnterminatedBracket {
                expr: self.expr(),
                pos: open,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_only() {
        let query = PathQuery::compile("$").unwrap();
        assert_eq!(query.steps(), [Step::Root]);
    }

    #[test]
    fn test_member_chain() {
        let query = PathQuery::compile("$.a.b").unwrap();
        assert_eq!(
            query.steps(),
            [
                Step::Root,
                Step::Member(b"a".to_vec()),
                Step::Member(b"b".to_vec()),
            ]
        );
    }

    #[test]
    fn test_all_step_kinds() {
        let query = PathQuery::compile("$.items[2].*[*]").unwrap();
        assert_eq!(
            query.steps(),
            [
                Step::Root,
                Step::Member(b"items".to_vec()),
                Step::Index(2),
                Step::WildcardMember,
                Step::WildcardIndex,
            ]
        );
    }

    #[test]
    fn test_equal_expressions_compile_equal() {
        assert_eq!(
            PathQuery::compile("$.a[0]").unwrap(),
            PathQuery::compile("$.a[0]").unwrap()
        );
    }

    #[test]
    fn test_display_round_trip() {
        for expr in ["$", "$.a.b", "$.items[2].*[*]", "$[0][1]"] {
            let query = PathQuery::compile(expr).unwrap();
            assert_eq!(query.to_string(), expr);
            assert_eq!(PathQuery::compile(&query.to_string()).unwrap(), query);
        }
    }

    #[test]
    fn test_utf8_member() {
        let query = PathQuery::compile("$.größe").unwrap();
        assert_eq!(
            query.steps(),
            [Step::Root, Step::Member("größe".as_bytes().to_vec())]
        );
    }

    #[test]
    fn test_missing_root() {
        assert!(matches!(
            PathQuery::compile("a.b"),
            Err(PathParseError::ExpectedRoot { .. })
        ));
    }

    #[test]
    fn test_unterminated_bracket() {
        assert!(matches!(
            PathQuery::compile("$.a[1"),
            Err(PathParseError::UnterminatedBracket { pos: 3, .. })
        ));
        assert!(matches!(
            PathQuery::compile("$[*"),
            Err(PathParseError::UnterminatedBracket { pos: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_index() {
        assert!(matches!(
            PathQuery::compile("$[]"),
            Err(PathParseError::InvalidIndex { .. })
        ));
        assert!(matches!(
            PathQuery::compile("$[x]"),
            Err(PathParseError::InvalidIndex { .. })
        ));
        assert!(matches!(
            PathQuery::compile("$[99999999999]"),
            Err(PathParseError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_empty_member() {
        assert!(matches!(
            PathQuery::compile("$.a..b"),
            Err(PathParseError::EmptyMember { .. })
        ));
    }

    #[test]
    fn test_trailing_dot() {
        assert!(matches!(
            PathQuery::compile("$."),
            Err(PathParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_unexpected_char() {
        assert!(matches!(
            PathQuery::compile("$x"),
            Err(PathParseError::UnexpectedChar { pos: 1, ch: 'x', .. })
        ));
        assert!(matches!(
            PathQuery::compile("$.a*"),
            Err(PathParseError::UnexpectedChar { .. })
        ));
    }
}
