//! Tests for `InMemorySessionStore`.

use serde_json::json;
use uuid::Uuid;

use crate::session_store::{InMemorySessionStore, SessionStore};
use crate::types::{ExecutionSession, StateMap};

fn session() -> ExecutionSession {
  ExecutionSession::new(Uuid::new_v4(), "u", "start", StateMap::new())
}

#[tokio::test]
async fn put_get_remove() {
  let store = InMemorySessionStore::new();
  let s = session();
  let id = s.session_id.clone();
  store.put(s.clone()).await.unwrap();
  assert_eq!(store.len().await.unwrap(), 1);
  assert_eq!(store.get(&id).await.unwrap(), Some(s.clone()));
  assert_eq!(store.remove(&id).await.unwrap(), Some(s));
  assert!(store.get(&id).await.unwrap().is_none());
  assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn put_replaces_existing() {
  let store = InMemorySessionStore::new();
  let mut s = session();
  store.put(s.clone()).await.unwrap();
  s.state_variables.insert("k".to_string(), json!(1));
  store.put(s.clone()).await.unwrap();
  assert_eq!(store.len().await.unwrap(), 1);
  let got = store.get(&s.session_id).await.unwrap().unwrap();
  assert_eq!(got.state_variables["k"], json!(1));
}

#[tokio::test]
async fn unknown_id_is_none() {
  let store = InMemorySessionStore::new();
  assert!(store.get("nope").await.unwrap().is_none());
  assert!(store.remove("nope").await.unwrap().is_none());
}
