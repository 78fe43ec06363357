//! The `{status, data, message}` envelope returned by non-raising entry
//! points.
//!
//! Callers that opt out of `Result`-based error handling branch on
//! [`Response::status`] instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
  pub status:  Status,
  pub data:    T,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T> Response<T> {
  pub fn success(data: T) -> Self {
    Self { status: Status::Success, data, message: None }
  }

  pub fn success_with(data: T, message: impl Into<String>) -> Self {
    Self { status: Status::Success, data, message: Some(message.into()) }
  }

  pub fn error(data: T, message: impl Into<String>) -> Self {
    Self { status: Status::Error, data, message: Some(message.into()) }
  }

  pub fn is_success(&self) -> bool { self.status == Status::Success }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn serialises_lowercase_status_and_omits_empty_message() {
    let ok = Response::success(vec![1, 2]);
    assert_eq!(serde_json::to_value(&ok).unwrap(), json!({
      "status": "success",
      "data": [1, 2],
    }));

    let err: Response<Vec<i32>> = Response::error(vec![], "server unavailable");
    assert_eq!(serde_json::to_value(&err).unwrap(), json!({
      "status": "error",
      "data": [],
      "message": "server unavailable",
    }));
    assert!(!err.is_success());
  }
}
