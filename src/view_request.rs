//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::query::{encode, QueryOption, Stale, ViewKey};
use crate::request::{percent_escape, RequestDescriptor};
use crate::response::{decode, from_body, ACCEPT_READ};
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_json::Value;
use std::result::Result;
use tracing::trace;

/// One row of a view or `_all_docs` result.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct ViewRow {
    /// Id of the emitting document. Absent for reduced rows.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub value: Value,
    /// The document itself, when `include_docs` was requested.
    #[serde(default)]
    pub doc: Option<Value>,
    /// Set for `_all_docs` rows whose requested key does not exist.
    #[serde(default)]
    pub error: Option<String>,
}

impl ViewRow {
    /// Deserialize the row's document into `T`. `None` if there is no document.
    pub fn doc_into<T: DeserializeOwned>(&self) -> Result<Option<T>, CouchError> {
        match &self.doc {
            Some(Value::Null) | None => Ok(None),
            Some(d) => from_body(crate::response::ResponseBody::Json(d.clone()), self.id.as_deref())
                .map(Some),
        }
    }
}

/// Struct representing the result of a view query.
///
/// `total_rows` and `offset` are absent for reduced results.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ViewResult {
    #[serde(default)]
    pub(crate) total_rows: Option<u64>,
    #[serde(default)]
    pub(crate) offset: Option<u64>,
    #[serde(default)]
    pub(crate) update_seq: Option<Value>,
    #[serde(default)]
    pub(crate) rows: Vec<ViewRow>,
}

impl ViewResult {
    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }
    /// Set when [`QueryOption::UpdateSequence`] was requested.
    pub fn update_seq(&self) -> Option<&Value> {
        self.update_seq.as_ref()
    }
    /// Get a reference to the rows, in server order.
    pub fn rows(&self) -> &Vec<ViewRow> {
        &self.rows
    }
    /// Take the rows, leaving an empty vector.
    pub fn take_rows(&mut self) -> Vec<ViewRow> {
        std::mem::take(&mut self.rows)
    }
}

// Option setters shared by ViewRequest and AllDocsRequest.
macro_rules! query_option_setters {
    () => {
        /// Add a query option. Options are encoded in the order given.
        pub fn option(mut self, opt: QueryOption) -> Self {
            self.options.push(opt);
            self
        }
        /// Replace all query options.
        pub fn options(mut self, opts: Vec<QueryOption>) -> Self {
            self.options = opts;
            self
        }
        /// Only return rows matching `key`.
        pub fn key(self, key: ViewKey) -> Self {
            self.option(QueryOption::Keys(vec![key]))
        }
        /// Only return rows matching any of `keys`.
        pub fn keys(self, keys: Vec<ViewKey>) -> Self {
            self.option(QueryOption::Keys(keys))
        }
        pub fn start_key(self, key: ViewKey) -> Self {
            self.option(QueryOption::StartKey(key))
        }
        pub fn end_key(self, key: ViewKey) -> Self {
            self.option(QueryOption::EndKey(key))
        }
        pub fn limit(self, limit: i64) -> Self {
            self.option(QueryOption::Limit(limit))
        }
        pub fn skip(self, skip: i64) -> Self {
            self.option(QueryOption::Skip(skip))
        }
        pub fn descending(self, val: bool) -> Self {
            self.option(QueryOption::Descending(val))
        }
        pub fn include_docs(self, val: bool) -> Self {
            self.option(QueryOption::IncludeDocs(val))
        }
        pub fn stale(self, stale: Stale) -> Self {
            self.option(QueryOption::Stale(stale))
        }
    };
}

fn build_query(
    h: &Handle,
    base_path: String,
    options: &[QueryOption],
) -> RequestDescriptor {
    let q = encode(options);
    let path = format!("{}{}", base_path, q.query_string);
    trace!("view query {} {}", q.method, path);
    let has_body = q.has_body();
    let req = h.prepare(q.method, &path, has_body, None);
    match q.body {
        Some(b) => req.json_body(b),
        None => req,
    }
}

async fn run_query(h: &Handle, req: RequestDescriptor) -> Result<ViewResult, CouchError> {
    let resp = h.send(&req).await?;
    from_body(decode(&resp, ACCEPT_READ, None, None)?, None)
}

/// Struct used for querying a view of a design document.
///
/// Example:
/// ```no_run
/// use couchdb_rust_sdk::{QueryOption, ViewRequest};
/// use serde_json::json;
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = couchdb_rust_sdk::Handle::builder().endpoint("http://localhost:5984")?.build()?;
/// let res = ViewRequest::new("inventory", "fruit", "by_color")
///     .keys(vec![json!("red"), json!("green")])
///     .option(QueryOption::IncludeDocs(true))
///     .execute(&handle)
///     .await?;
/// for row in res.rows() {
///     println!("{:?} => {:?}", row.key, row.value);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct ViewRequest {
    pub(crate) db: String,
    pub(crate) design: String,
    pub(crate) view: String,
    pub(crate) options: Vec<QueryOption>,
}

impl ViewRequest {
    pub fn new(db: &str, design: &str, view: &str) -> ViewRequest {
        ViewRequest {
            db: db.to_string(),
            design: design.to_string(),
            view: view.to_string(),
            ..Default::default()
        }
    }

    query_option_setters!();

    pub fn reduce(self, val: bool) -> Self {
        self.option(QueryOption::Reduce(val))
    }
    pub fn group(self, val: bool) -> Self {
        self.option(QueryOption::Group(val))
    }
    pub fn group_level(self, level: i64) -> Self {
        self.option(QueryOption::GroupLevel(level))
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.db.is_empty() || self.design.is_empty() || self.view.is_empty() {
            return ia_err!("database, design document and view names must be non-empty");
        }
        let design = self.design.strip_prefix("_design/").unwrap_or(&self.design);
        let base = format!(
            "/{}/_design/{}/_view/{}",
            percent_escape(&self.db),
            percent_escape(design),
            percent_escape(&self.view)
        );
        Ok(build_query(h, base, &self.options))
    }

    pub async fn execute(&self, h: &Handle) -> Result<ViewResult, CouchError> {
        run_query(h, self.build(h)?).await
    }
}

/// Struct used for listing the documents of a database through `_all_docs`.
#[derive(Default, Debug)]
pub struct AllDocsRequest {
    pub(crate) db: String,
    pub(crate) options: Vec<QueryOption>,
}

impl AllDocsRequest {
    pub fn new(db: &str) -> AllDocsRequest {
        AllDocsRequest {
            db: db.to_string(),
            ..Default::default()
        }
    }

    query_option_setters!();

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.db.is_empty() {
            return ia_err!("database name must be non-empty");
        }
        let base = format!("/{}/_all_docs", percent_escape(&self.db));
        Ok(build_query(h, base, &self.options))
    }

    pub async fn execute(&self, h: &Handle) -> Result<ViewResult, CouchError> {
        run_query(h, self.build(h)?).await
    }
}
