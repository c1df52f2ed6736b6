use super::*;
use std::thread::sleep;

fn session(url: &str) -> RunSession {
    RunSession::new(url, "task", "openai:gpt-4o")
}

#[test]
fn test_put_get_remove() {
    let registry = SessionRegistry::new(10, Duration::from_secs(60));
    let run_id = registry.put(session("https://a.example")).run_id().to_string();

    assert!(registry.get(&run_id).is_some());
    assert!(registry.get("missing").is_none());
    assert_eq!(registry.len(), 1);

    assert!(registry.remove(&run_id));
    assert!(!registry.remove(&run_id));
    assert!(registry.is_empty());
}

#[test]
fn test_list_summaries() {
    let registry = SessionRegistry::new(10, Duration::from_secs(60));
    let mut s = session("https://a.example");
    s.steps = vec![crate::session::PlanStep::new(1, "one"), crate::session::PlanStep::new(2, "two")];
    let run_id = s.run_id.clone();
    registry.put(s);

    let list = registry.list();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].run_id, run_id);
    assert_eq!(list[0].step_count, 2);
    assert_eq!(list[0].entry_url, "https://a.example");
    assert!(!list[0].busy);
}

#[test]
fn test_ttl_purges_idle_sessions() {
    let registry = SessionRegistry::new(10, Duration::from_millis(50));
    let old = registry.put(session("https://old.example")).run_id().to_string();
    sleep(Duration::from_millis(80));
    let fresh = registry.put(session("https://new.example")).run_id().to_string();

    assert!(!registry.contains(&old));
    assert!(registry.get(&old).is_none());
    assert!(registry.get(&fresh).is_some());
}

#[test]
fn test_get_refreshes_access_time() {
    let registry = SessionRegistry::new(10, Duration::from_millis(120));
    let run_id = registry.put(session("https://a.example")).run_id().to_string();
    for _ in 0..3 {
        sleep(Duration::from_millis(60));
        assert!(registry.get(&run_id).is_some());
    }
}

#[test]
fn test_peek_leaves_idle_time_alone() {
    let registry = SessionRegistry::new(10, Duration::from_millis(100));
    let slot = registry.put(session("https://a.example"));
    let run_id = slot.run_id().to_string();

    sleep(Duration::from_millis(60));
    let summary = registry.peek(&run_id).unwrap();
    assert_eq!(summary.run_id, run_id);
    assert!(slot.idle_for() >= Duration::from_millis(60));

    sleep(Duration::from_millis(80));
    assert!(registry.peek(&run_id).is_none());
    assert!(registry.peek("missing").is_none());
}

#[test]
fn test_zero_ttl_never_expires() {
    let registry = SessionRegistry::new(0, Duration::ZERO);
    let run_id = registry.put(session("https://a.example")).run_id().to_string();
    sleep(Duration::from_millis(10));
    assert_eq!(registry.purge_expired(), 0);
    assert!(registry.get(&run_id).is_some());
}

#[test]
fn test_capacity_evicts_least_recently_accessed() {
    let registry = SessionRegistry::new(2, Duration::from_secs(60));
    let a = registry.put(session("https://a.example")).run_id().to_string();
    sleep(Duration::from_millis(5));
    let b = registry.put(session("https://b.example")).run_id().to_string();
    sleep(Duration::from_millis(5));
    // a becomes the most recently used
    assert!(registry.get(&a).is_some());
    sleep(Duration::from_millis(5));
    let c = registry.put(session("https://c.example")).run_id().to_string();

    assert_eq!(registry.len(), 2);
    assert!(registry.contains(&a));
    assert!(!registry.contains(&b));
    assert!(registry.contains(&c));
}

#[tokio::test]
async fn test_busy_sessions_survive_eviction() {
    let registry = SessionRegistry::new(1, Duration::from_secs(60));
    let slot = registry.put(session("https://a.example"));
    let _guard = slot.lock().await;

    let b = registry.put(session("https://b.example")).run_id().to_string();
    assert!(registry.contains(slot.run_id()));
    assert!(registry.contains(&b));
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_try_lock_reports_busy() {
    let registry = SessionRegistry::new(10, Duration::from_secs(60));
    let slot = registry.put(session("https://a.example"));

    let guard = slot.try_lock().unwrap();
    assert!(slot.is_busy());
    match slot.try_lock() {
        Err(EngineError::SessionBusy(id)) => assert_eq!(id, slot.run_id()),
        other => panic!("expected SessionBusy, got {:?}", other.map(|_| ())),
    }
    drop(guard);
    assert!(slot.try_lock().is_ok());
}
