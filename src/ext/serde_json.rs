// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Nested JSON extraction for tracker payloads via dotted paths, plus rich-text flattening
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper for typed extraction with defaults
// invariants: No panics; missing paths and JSON nulls yield None; numeric path segments index arrays
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

/// A location inside a JSON document, resolved lazily into a typed value.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`. JSON `null` counts as absent.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self
      .inner
      .filter(|v| !v.is_null())
      .and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  pub fn value(&self) -> Option<&'a serde_json::Value> {
    self.inner.filter(|v| !v.is_null())
  }

  /// Plain text of either a JSON string or a rich-text document (nested `content`
  /// arrays with `text` leaves). Block-level nodes are separated by newlines.
  pub fn text(&self) -> Option<String> {
    let v = self.value()?;
    if let Some(s) = v.as_str() {
      return Some(s.to_string());
    }
    let mut out = String::new();
    flatten_rich_text(v, &mut out);
    let trimmed = out.trim().to_string();
    if trimmed.is_empty() { None } else { Some(trimmed) }
  }
}

fn flatten_rich_text(v: &serde_json::Value, out: &mut String) {
  if let Some(t) = v.get("text").and_then(|t| t.as_str()) {
    out.push_str(t);
  }
  if let Some(children) = v.get("content").and_then(|c| c.as_array()) {
    for child in children {
      flatten_rich_text(child, out);
    }
    let is_block = v.get("type").and_then(|t| t.as_str()).map(|t| t != "text").unwrap_or(false);
    if is_block && !out.ends_with('\n') {
      out.push('\n');
    }
  }
}

/// Fetch nested values via dotted paths like "fields.priority.name" or "fields.sprint.0.name".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      let next = match cur {
        serde_json::Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => cur.get(key),
      };
      match next {
        Some(n) => cur = n,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
