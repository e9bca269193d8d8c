//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::query::{encode, QueryOption, Stale};
use reqwest::Method;
use serde_json::json;

#[test]
fn empty_options() {
    let q = encode(&[]);
    assert_eq!(q.query_string, "");
    assert_eq!(q.method, Method::GET);
    assert!(q.body.is_none());
    assert!(!q.has_body());
}

#[test]
fn scalar_options_keep_input_order() {
    let q = encode(&[
        QueryOption::Limit(10),
        QueryOption::Descending(true),
        QueryOption::Skip(-3),
        QueryOption::IncludeDocs(false),
        QueryOption::GroupLevel(2),
    ]);
    assert_eq!(
        q.query_string,
        "?limit=10&descending=true&skip=-3&include_docs=false&group_level=2"
    );
    assert_eq!(q.method, Method::GET);

    let q = encode(&[QueryOption::IncludeDocs(false), QueryOption::Limit(10)]);
    assert_eq!(q.query_string, "?include_docs=false&limit=10");
}

#[test]
fn every_flag_name() {
    let q = encode(&[
        QueryOption::Conflicts(true),
        QueryOption::Group(true),
        QueryOption::Attachments(true),
        QueryOption::AttachmentEncodingInfo(true),
        QueryOption::InclusiveEnd(false),
        QueryOption::Reduce(false),
        QueryOption::UpdateSequence(true),
    ]);
    assert_eq!(
        q.query_string,
        "?conflicts=true&group=true&attachments=true&att_encoding_info=true\
         &inclusive_end=false&reduce=false&update_seq=true"
    );
}

#[test]
fn string_keys_are_escaped_and_quoted() {
    let q = encode(&[
        QueryOption::StartKey(json!("a b/c")),
        QueryOption::EndKey(json!("z")),
    ]);
    assert_eq!(q.query_string, "?startkey=\"a%20b%2Fc\"&endkey=\"z\"");
}

#[test]
fn array_keys_are_bracketed_without_quoting() {
    let q = encode(&[QueryOption::StartKey(json!(["a", 1, true]))]);
    assert_eq!(q.query_string, "?startkey=[a,1,true]");
    let q = encode(&[QueryOption::EndKey(json!([]))]);
    assert_eq!(q.query_string, "?endkey=[]");
}

#[test]
fn non_string_scalar_keys() {
    let q = encode(&[
        QueryOption::StartKey(json!(-5)),
        QueryOption::EndKey(json!(null)),
    ]);
    assert_eq!(q.query_string, "?startkey=-5&endkey=null");
}

#[test]
fn doc_ids_are_always_escaped_and_quoted() {
    let q = encode(&[
        QueryOption::StartKeyDocId("doc 1".to_string()),
        QueryOption::EndKeyDocId("doc&2".to_string()),
    ]);
    assert_eq!(
        q.query_string,
        "?startkey_docid=\"doc%201\"&endkey_docid=\"doc%262\""
    );
}

#[test]
fn stale_values() {
    assert_eq!(
        encode(&[QueryOption::Stale(Stale::Ok)]).query_string,
        "?stale=\"ok\""
    );
    assert_eq!(
        encode(&[QueryOption::Stale(Stale::UpdateAfter)]).query_string,
        "?stale=\"update_after\""
    );
}

#[test]
fn single_key_renders_like_start_key() {
    let single = encode(&[QueryOption::Keys(vec![json!("a")])]);
    let start = encode(&[QueryOption::StartKey(json!("a"))]);
    assert_eq!(
        single.query_string,
        start.query_string.replacen("startkey", "key", 1)
    );
    assert_eq!(single.query_string, "?key=\"a\"");
    assert_eq!(single.method, Method::GET);
    assert!(single.body.is_none());
}

#[test]
fn single_key_joins_other_fragments() {
    let q = encode(&[
        QueryOption::Limit(1),
        QueryOption::Keys(vec![json!(["x", 2])]),
        QueryOption::Reduce(false),
    ]);
    assert_eq!(q.query_string, "?limit=1&key=[x,2]&reduce=false");
}

#[test]
fn many_keys_switch_to_post() {
    let q = encode(&[QueryOption::Keys(vec![json!("a"), json!("b")])]);
    assert_eq!(q.query_string, "");
    assert_eq!(q.method, Method::POST);
    assert_eq!(q.body, Some(json!({"keys": ["a", "b"]})));
    assert!(q.has_body());

    let q = encode(&[
        QueryOption::IncludeDocs(true),
        QueryOption::Keys(vec![json!(1), json!([2, "x"]), json!({"k": "v"})]),
    ]);
    assert_eq!(q.query_string, "?include_docs=true");
    assert_eq!(q.method, Method::POST);
    assert_eq!(q.body, Some(json!({"keys": [1, [2, "x"], {"k": "v"}]})));
}

#[test]
fn empty_keys_are_ignored() {
    let q = encode(&[QueryOption::Keys(vec![])]);
    assert_eq!(q.query_string, "");
    assert_eq!(q.method, Method::GET);
    let q = encode(&[QueryOption::Keys(vec![]), QueryOption::Limit(2)]);
    assert_eq!(q.query_string, "?limit=2");
}

#[test]
fn object_keys_are_escaped_json() {
    let q = encode(&[QueryOption::StartKey(json!({"a": 1}))]);
    assert_eq!(q.query_string, "?startkey=%7B%22a%22%3A1%7D");
}

#[test]
fn unicode_and_reserved_characters() {
    let q = encode(&[QueryOption::StartKey(json!("café+\"?"))]);
    assert_eq!(q.query_string, "?startkey=\"caf%C3%A9%2B%22%3F\"");
}

#[test]
fn encode_is_deterministic() {
    let opts = vec![
        QueryOption::StartKey(json!(["2024", "01"])),
        QueryOption::Keys(vec![json!("k1"), json!("k2")]),
        QueryOption::Stale(Stale::Ok),
    ];
    assert_eq!(encode(&opts), encode(&opts));
}
