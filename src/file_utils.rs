//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, CouchError};
use std::path::PathBuf;

/// Expand a leading `~/` to the current user's home directory.
///
/// If the home directory cannot be determined the path is returned unchanged.
pub(crate) fn expand_user_home(file_path: &str) -> String {
    if file_path.starts_with("~/") || file_path.starts_with("~\\") {
        if let Some(home_dir) = dirs::home_dir() {
            let full_path = home_dir.join(PathBuf::from(correct_path(&file_path[2..])));
            return format!("{}", full_path.display());
        }
    }
    String::from(file_path)
}

fn correct_path(file_path: &str) -> String {
    if cfg!(target_os = "windows") {
        file_path.replace('/', "\\")
    } else {
        String::from(file_path)
    }
}

/// Read a whole file into a string, expanding `~/` first.
pub(crate) fn file_to_string(filename: &str) -> Result<String, CouchError> {
    let path = expand_user_home(filename);
    match std::fs::read_to_string(&path) {
        Ok(s) => Ok(s),
        Err(e) => ia_err!("error reading file '{}': {}", path, e),
    }
}
