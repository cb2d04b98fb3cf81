//! Document extractor: applies source→target mappings by grafting matched
//! source spans into a destination tree.
//!
//! All source queries are resolved in one shared executor pass, then each
//! mapping walks (and creates) destination containers along its target path.
//! Mappings apply in caller order, so a later mapping overwrites an earlier
//! one at the same target.

use packpath_buffers::{BufferView, Span};
use packpath_query::{PathQuery, QueryExecutor, Step};

use crate::error::MappingError;
use crate::tree::{BufferId, ContainerKind, DocumentTree, NodeId, NodePayload};

/// One segment of a target path; targets never contain wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSegment {
    Member(Vec<u8>),
    Index(u32),
}

/// A compiled write path: where in the destination a matched value lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    expr: String,
    segments: Vec<TargetSegment>,
}

impl TargetPath {
    /// Compiles a target expression. Reuses the query grammar, but wildcard
    /// steps are rejected: a target must name exactly one location.
    pub fn compile(expr: &str) -> Result<Self, MappingError> {
        let query = PathQuery::compile(expr)?;
        let mut segments = Vec::new();
        for step in query.steps() {
            match step {
                Step::Root => {}
                Step::Member(name) => segments.push(TargetSegment::Member(name.clone())),
                Step::Index(i) => segments.push(TargetSegment::Index(*i)),
                Step::WildcardMember | Step::WildcardIndex => {
                    return Err(MappingError::Conflict {
                        path: expr.to_string(),
                        detail: "wildcards are not allowed in a target path".to_string(),
                    })
                }
            }
        }
        Ok(Self {
            expr: expr.to_string(),
            segments,
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn segments(&self) -> &[TargetSegment] {
        &self.segments
    }
}

/// A source query paired with the target path its match is written to.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub source: PathQuery,
    pub target: TargetPath,
}

impl Mapping {
    pub fn new(source: PathQuery, target: TargetPath) -> Self {
        Self { source, target }
    }

    /// Compiles both sides from their expressions.
    pub fn parse(source: &str, target: &str) -> Result<Self, MappingError> {
        Ok(Self {
            source: PathQuery::compile(source)?,
            target: TargetPath::compile(target)?,
        })
    }
}

/// Applies mappings from a source buffer into a destination tree.
pub struct DocumentExtractor;

impl DocumentExtractor {
    /// Resolves every mapping's source query in one pass over `source`, then
    /// grafts the first match of each (document order) at its target path.
    ///
    /// A query with no matches contributes nothing. Grafted values stay
    /// zero-copy: the destination tree registers `source` as a backing
    /// buffer and span nodes reference into it.
    pub fn extract<'a>(
        source: BufferView<'a>,
        mappings: &[Mapping],
        dest: &mut DocumentTree<'a>,
    ) -> Result<(), MappingError> {
        let plans: Vec<&PathQuery> = mappings.iter().map(|m| &m.source).collect();
        let states = QueryExecutor::run(source, &plans)?;
        let buffer = dest.register_buffer(source.bytes());

        for (mapping, state) in mappings.iter().zip(&states) {
            if let Some(result) = state.results().first() {
                graft(dest, buffer, result.value_span, &mapping.target)?;
            }
        }
        Ok(())
    }

    /// Like [`extract`](Self::extract), but into a fresh empty map root.
    pub fn extract_to_new<'a>(
        source: BufferView<'a>,
        mappings: &[Mapping],
    ) -> Result<DocumentTree<'a>, MappingError> {
        let mut dest = DocumentTree::new_map_root();
        Self::extract(source, mappings, &mut dest)?;
        Ok(dest)
    }
}

fn graft(
    dest: &mut DocumentTree<'_>,
    buffer: BufferId,
    value: Span,
    target: &TargetPath,
) -> Result<(), MappingError> {
    // "$" replaces the destination root wholesale.
    let Some((last, path)) = target.segments().split_last() else {
        let node = dest.new_span_node(buffer, value);
        dest.set_root(node);
        return Ok(());
    };

    let mut node = dest.root();
    dest.mark_dirty(node);
    for (position, segment) in path.iter().enumerate() {
        let next_kind = kind_for(&path[position + 1..], last);
        node = descend(dest, node, segment, next_kind, target)?;
        dest.mark_dirty(node);
    }

    let graft = dest.new_span_node(buffer, value);
    match last {
        TargetSegment::Member(name) => {
            expect_kind(dest, node, ContainerKind::Map, target)?;
            match dest.child_by_name(node, name) {
                Some((position, _)) => dest.replace_child(node, position, graft),
                None => {
                    dest.set_name_owned(graft, name.clone());
                    dest.append_child(node, graft);
                }
            }
        }
        TargetSegment::Index(i) => {
            expect_kind(dest, node, ContainerKind::Array, target)?;
            let len = dest.children(node).len();
            match (*i as usize).cmp(&len) {
                std::cmp::Ordering::Less => dest.replace_child(node, *i as usize, graft),
                std::cmp::Ordering::Equal => dest.append_child(node, graft),
                std::cmp::Ordering::Greater => {
                    return Err(conflict(target, "array index beyond current length"))
                }
            }
        }
    }
    Ok(())
}

/// Steps into (creating if absent) the container named by one intermediate
/// target segment.
fn descend(
    dest: &mut DocumentTree<'_>,
    node: NodeId,
    segment: &TargetSegment,
    next_kind: ContainerKind,
    target: &TargetPath,
) -> Result<NodeId, MappingError> {
    match segment {
        TargetSegment::Member(name) => {
            expect_kind(dest, node, ContainerKind::Map, target)?;
            match dest.child_by_name(node, name) {
                Some((_, child)) => {
                    ensure_container(dest, child, target)?;
                    Ok(child)
                }
                None => {
                    let child = dest.new_synthetic(next_kind);
                    dest.set_name_owned(child, name.clone());
                    dest.append_child(node, child);
                    Ok(child)
                }
            }
        }
        TargetSegment::Index(i) => {
            expect_kind(dest, node, ContainerKind::Array, target)?;
            let len = dest.children(node).len();
            match (*i as usize).cmp(&len) {
                std::cmp::Ordering::Less => {
                    let child = dest.children(node)[*i as usize];
                    ensure_container(dest, child, target)?;
                    Ok(child)
                }
                std::cmp::Ordering::Equal => {
                    let child = dest.new_synthetic(next_kind);
                    dest.append_child(node, child);
                    Ok(child)
                }
                std::cmp::Ordering::Greater => {
                    Err(conflict(target, "array index beyond current length"))
                }
            }
        }
    }
}

/// Container kind a synthetic intermediate gets, decided by the segment that
/// will be resolved inside it.
fn kind_for(rest: &[TargetSegment], last: &TargetSegment) -> ContainerKind {
    match rest.first().unwrap_or(last) {
        TargetSegment::Member(_) => ContainerKind::Map,
        TargetSegment::Index(_) => ContainerKind::Array,
    }
}

fn ensure_container(
    dest: &DocumentTree<'_>,
    node: NodeId,
    target: &TargetPath,
) -> Result<(), MappingError> {
    match dest.node(node).payload {
        NodePayload::Container { .. } => Ok(()),
        NodePayload::Span { .. } => Err(conflict(target, "cannot descend through a value")),
    }
}

fn expect_kind(
    dest: &DocumentTree<'_>,
    node: NodeId,
    expected: ContainerKind,
    target: &TargetPath,
) -> Result<(), MappingError> {
    match dest.node(node).payload {
        NodePayload::Container { kind, .. } if kind == expected => Ok(()),
        NodePayload::Container { .. } => Err(conflict(
            target,
            match expected {
                ContainerKind::Map => "expected a map at this segment",
                ContainerKind::Array => "expected an array at this segment",
            },
        )),
        NodePayload::Span { .. } => Err(conflict(target, "cannot descend through a value")),
    }
}

fn conflict(target: &TargetPath, detail: &str) -> MappingError {
    MappingError::Conflict {
        path: target.expr().to_string(),
        detail: detail.to_string(),
    }
}
