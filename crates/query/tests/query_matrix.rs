//! End-to-end query behavior over wire-encoded documents.

use packpath_buffers::{BufferView, Span};
use packpath_query::{DocumentError, PathQuery, QueryExecutor, Step};
use serde_json::{json, Value};

/// Encodes a JSON value as canonical MessagePack (minimal headers, object
/// fields in insertion order). Test-only; production code never builds
/// documents from an object model.
fn pack(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    pack_into(value, &mut out);
    out
}

fn pack_into(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.push(0xc0),
        Value::Bool(false) => out.push(0xc2),
        Value::Bool(true) => out.push(0xc3),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if (0..=0x7f).contains(&i) || (-32..0).contains(&i) {
                    out.push(i as u8);
                } else {
                    out.push(0xd3);
                    out.extend_from_slice(&i.to_be_bytes());
                }
            } else {
                out.push(0xcb);
                out.extend_from_slice(&n.as_f64().unwrap().to_be_bytes());
            }
        }
        Value::String(s) => pack_str(s, out),
        Value::Array(items) => {
            if items.len() <= 0xf {
                out.push(0x90 | items.len() as u8);
            } else {
                out.push(0xdc);
                out.extend_from_slice(&(items.len() as u16).to_be_bytes());
            }
            for item in items {
                pack_into(item, out);
            }
        }
        Value::Object(fields) => {
            if fields.len() <= 0xf {
                out.push(0x80 | fields.len() as u8);
            } else {
                out.push(0xde);
                out.extend_from_slice(&(fields.len() as u16).to_be_bytes());
            }
            for (key, val) in fields {
                pack_str(key, out);
                pack_into(val, out);
            }
        }
    }
}

fn pack_str(s: &str, out: &mut Vec<u8>) {
    let bytes = s.as_bytes();
    if bytes.len() <= 0x1f {
        out.push(0xa0 | bytes.len() as u8);
    } else if bytes.len() <= 0xff {
        out.push(0xd9);
        out.push(bytes.len() as u8);
    } else {
        out.push(0xda);
        out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    }
    out.extend_from_slice(bytes);
}

fn span_bytes(doc: &[u8], span: Span) -> &[u8] {
    &doc[span.offset..span.end()]
}

#[test]
fn compile_produces_explicit_root_and_member_steps() {
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
fn member_query_returns_exact_value_bytes() {
    let doc = pack(&json!({"order": {"id": 42, "open": true}, "rest": [1, 2]}));
    let query = PathQuery::compile("$.order.id").unwrap();
    let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
    assert_eq!(state.len(), 1);
    assert_eq!(
        span_bytes(&doc, state.results()[0].value_span),
        pack(&json!(42))
    );
}

#[test]
fn container_query_returns_whole_subtree_bytes() {
    let doc = pack(&json!({"a": {"y": 2}, "b": 3}));
    let query = PathQuery::compile("$.a").unwrap();
    let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
    assert_eq!(
        span_bytes(&doc, state.results()[0].value_span),
        pack(&json!({"y": 2}))
    );
}

#[test]
fn wildcard_results_follow_document_order_and_declared_count() {
    let doc = pack(&json!({"zeta": 1, "alpha": 2, "mid": 3}));
    let query = PathQuery::compile("$.*").unwrap();
    let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
    // count equals the map's declared child count
    assert_eq!(state.len(), 3);
    // document order, not key order
    let values: Vec<Vec<u8>> = state
        .results()
        .iter()
        .map(|r| span_bytes(&doc, r.value_span).to_vec())
        .collect();
    assert_eq!(
        values,
        vec![pack(&json!(1)), pack(&json!(2)), pack(&json!(3))]
    );
}

#[test]
fn wildcard_index_enumerates_array_elements() {
    let doc = pack(&json!({"items": [{"sku": "a"}, {"sku": "b"}]}));
    let query = PathQuery::compile("$.items[*]").unwrap();
    let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
    assert_eq!(state.len(), 2);
    assert_eq!(
        span_bytes(&doc, state.results()[0].value_span),
        pack(&json!({"sku": "a"}))
    );
    assert_eq!(state.results()[1].index, Some(1));
}

#[test]
fn missing_member_yields_empty_results() {
    let doc = pack(&json!({"a": 1}));
    let query = PathQuery::compile("$.missing").unwrap();
    let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
    assert!(state.is_empty());
}

#[test]
fn descending_through_scalar_yields_empty_results() {
    let doc = pack(&json!({"a": 1}));
    let query = PathQuery::compile("$.a.b").unwrap();
    let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
    assert!(state.is_empty());
}

#[test]
fn long_member_names_use_byte_comparison() {
    let name = "a".repeat(40); // forces a str8 key on the wire
    let mut fields = serde_json::Map::new();
    fields.insert(name.clone(), json!(7));
    let doc = pack(&Value::Object(fields));
    let query = PathQuery::compile(&format!("$.{name}")).unwrap();
    let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
    assert_eq!(
        span_bytes(&doc, state.results()[0].value_span),
        pack(&json!(7))
    );
}

#[test]
fn batch_evaluation_matches_individual_runs() {
    let doc = pack(&json!({"a": {"b": 1}, "c": [true, null], "d": "x"}));
    let exprs = ["$.a.b", "$.c[1]", "$.d", "$.nope"];
    let plans: Vec<PathQuery> = exprs
        .iter()
        .map(|e| PathQuery::compile(e).unwrap())
        .collect();
    let refs: Vec<&PathQuery> = plans.iter().collect();
    let batch = QueryExecutor::run(BufferView::new(&doc), &refs).unwrap();

    for (plan, state) in plans.iter().zip(&batch) {
        let single = QueryExecutor::run_one(BufferView::new(&doc), plan).unwrap();
        assert_eq!(single.results(), state.results(), "plan {plan}");
    }
}

#[test]
fn truncated_document_is_fatal() {
    // outer map declares 3 entries but holds 2
    let mut doc = pack(&json!({"a": 1, "b": 2}));
    doc[0] = 0x83;
    let query = PathQuery::compile("$.a").unwrap();
    let err = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap_err();
    assert!(matches!(err, DocumentError::Truncated { .. }));
}

#[test]
fn deep_nesting() {
    let doc = pack(&json!({"a": {"b": {"c": {"d": [0, {"e": "deep"}]}}}}));
    let query = PathQuery::compile("$.a.b.c.d[1].e").unwrap();
    let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
    assert_eq!(
        span_bytes(&doc, state.results()[0].value_span),
        pack(&json!("deep"))
    );
}
