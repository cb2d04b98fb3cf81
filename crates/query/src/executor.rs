//! Query executor: advances one or more compiled queries against a single
//! traversal pass.
//!
//! Batch evaluation exists so that N queries against the same document cost
//! one scan, not N. Matching is a small state machine per active nesting
//! branch; wildcard steps fork one branch per matching entry, bounded by the
//! container's declared child count.

use packpath_buffers::{BufferView, Span};

use crate::compiler::{PathQuery, Step};
use crate::token::Token;
use crate::traverse::{Entry, Traverser, Visitor};
use crate::{DocumentError, QueryError};

/// One matched value: a zero-copy span into the queried buffer, plus the
/// owning-array ordinal when the final step selected an array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub value_span: Span,
    pub index: Option<u32>,
}

/// Mutable per-evaluation cursor over one query's results.
///
/// Created fresh for each run; results are always in document order. Finding
/// no match is not an error — the state is simply empty.
#[derive(Debug, Default)]
pub struct MatchState {
    results: Vec<MatchResult>,
    cursor: usize,
}

impl MatchState {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    /// Selects the result the navigation accessors read from.
    pub fn move_to_result(&mut self, index: usize) -> Result<(), QueryError> {
        if index >= self.results.len() {
            return Err(QueryError::NoSuchResult {
                index,
                available: self.results.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }

    /// The currently selected result, if any result exists.
    pub fn current(&self) -> Option<&MatchResult> {
        self.results.get(self.cursor)
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|r| r.value_span)
    }
}

struct Branch {
    step: usize,
    depth: u32,
}

struct Pending {
    depth: u32,
    offset: usize,
    index: Option<u32>,
}

struct QueryRun<'p> {
    steps: &'p [Step],
    branches: Vec<Branch>,
    pending: Vec<Pending>,
    state: MatchState,
}

impl<'p> QueryRun<'p> {
    fn new(steps: &'p [Step]) -> Self {
        Self {
            steps,
            branches: vec![Branch { step: 0, depth: 0 }],
            pending: Vec::new(),
            state: MatchState::default(),
        }
    }

    fn advance(&mut self, buffer: BufferView<'_>, token: &Token, depth: u32, entry: Entry) {
        let mut spawned = Vec::new();
        for branch in &self.branches {
            if branch.depth != depth {
                continue;
            }
            let hit = match &self.steps[branch.step] {
                Step::Root => entry == Entry::Root,
                Step::Member(name) => {
                    matches!(entry, Entry::Key { name: span, .. }
                        if buffer.span_bytes(span) == name.as_slice())
                }
                Step::WildcardMember => matches!(entry, Entry::Key { .. }),
                Step::Index(i) => entry == Entry::Element(*i),
                Step::WildcardIndex => matches!(entry, Entry::Element(_)),
            };
            if !hit {
                continue;
            }

            let index = match entry {
                Entry::Element(ordinal) => Some(ordinal),
                _ => None,
            };
            if branch.step + 1 == self.steps.len() {
                // Fully matched. The match is the value at this exact path;
                // descendants are not consumed further.
                if token.is_container() {
                    // Container spans close when the traverser leaves them.
                    self.pending.push(Pending {
                        depth,
                        offset: token.span.offset,
                        index,
                    });
                } else {
                    self.state.results.push(MatchResult {
                        value_span: token.span,
                        index,
                    });
                }
            } else if token.is_container() {
                spawned.push(Branch {
                    step: branch.step + 1,
                    depth: depth + 1,
                });
            }
            // A scalar with steps left is a dead end: type mismatch on a
            // read path is a non-match, not an error.
        }
        self.branches.extend(spawned);
    }

    fn close_container(&mut self, depth: u32, end: usize) {
        // Branches spawned inside the closed subtree can never match again.
        self.branches.retain(|b| b.depth <= depth);
        while let Some(pending) = self.pending.last() {
            if pending.depth != depth {
                break;
            }
            let result = MatchResult {
                value_span: Span::new(pending.offset, end - pending.offset),
                index: pending.index,
            };
            self.pending.pop();
            self.state.results.push(result);
        }
    }
}

struct Matcher<'a, 'p> {
    buffer: BufferView<'a>,
    runs: Vec<QueryRun<'p>>,
}

impl Visitor for Matcher<'_, '_> {
    fn on_token(&mut self, token: &Token, depth: u32, entry: Entry) {
        for run in &mut self.runs {
            run.advance(self.buffer, token, depth, entry);
        }
    }

    fn on_container_end(&mut self, depth: u32, end: usize) {
        for run in &mut self.runs {
            run.close_container(depth, end);
        }
    }
}

/// Evaluates compiled queries against a raw document buffer.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Runs all queries in one shared traversal pass, returning one
    /// [`MatchState`] per query, in the given order.
    pub fn run(
        buffer: BufferView<'_>,
        plans: &[&PathQuery],
    ) -> Result<Vec<MatchState>, DocumentError> {
        let mut matcher = Matcher {
            buffer,
            runs: plans.iter().map(|p| QueryRun::new(p.steps())).collect(),
        };
        Traverser::traverse(buffer, &mut matcher)?;
        Ok(matcher.runs.into_iter().map(|r| r.state).collect())
    }

    /// Convenience wrapper for a single query.
    pub fn run_one(buffer: BufferView<'_>, plan: &PathQuery) -> Result<MatchState, DocumentError> {
        Ok(Self::run(buffer, &[plan])?.pop().unwrap_or_default())
    }
}
