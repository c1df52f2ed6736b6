use super::*;
use crate::cdp::protocol::{AXNode, FrameTree};

fn ax(json: serde_json::Value) -> AXNode {
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_flatten_frame_tree_order() {
    let tree: FrameTree = serde_json::from_value(serde_json::json!({
        "frame": {"id": "MAIN", "url": "https://example.com/orders"},
        "childFrames": [
            {
                "frame": {"id": "A", "parentId": "MAIN", "name": "grid", "url": "https://example.com/grid"},
                "childFrames": [
                    {"frame": {"id": "A1", "parentId": "A", "url": "about:blank"}}
                ]
            },
            {"frame": {"id": "B", "parentId": "MAIN", "name": "ads", "url": "https://ads.example.net/"}}
        ]
    }))
    .unwrap();

    let frames = flatten_frame_tree(&tree);
    let ids: Vec<&str> = frames.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["MAIN", "A", "A1", "B"]);
    assert!(frames[0].parent_id.is_none());
    assert_eq!(frames[1].name, "grid");
    assert_eq!(frames[2].parent_id.as_deref(), Some("A"));
}

#[test]
fn test_flatten_ax_tree_depths() {
    let nodes = vec![
        ax(serde_json::json!({"nodeId": "1", "ignored": false, "role": {"type": "role", "value": "RootWebArea"}, "name": {"type": "computedString", "value": "Orders"}, "childIds": ["2", "5"]})),
        ax(serde_json::json!({"nodeId": "2", "ignored": true, "parentId": "1", "role": {"type": "role", "value": "none"}, "childIds": ["3"]})),
        ax(serde_json::json!({"nodeId": "3", "ignored": false, "parentId": "2", "role": {"type": "role", "value": "button"}, "name": {"type": "computedString", "value": "Filter"}})),
        ax(serde_json::json!({"nodeId": "5", "ignored": false, "parentId": "1", "role": {"type": "role", "value": "textbox"}, "name": {"type": "computedString", "value": "Search"}, "value": {"type": "string", "value": "unpaid"}})),
    ];

    let flat = flatten_ax_tree(nodes);
    assert_eq!(flat.len(), 4);
    assert_eq!(flat[0].role, "RootWebArea");
    assert_eq!(flat[0].depth, 0);
    assert!(flat[1].ignored);
    // child of an ignored node keeps the parent's level
    assert_eq!(flat[2].role, "button");
    assert_eq!(flat[2].depth, 1);
    assert_eq!(flat[3].role, "textbox");
    assert_eq!(flat[3].depth, 1);
    assert_eq!(flat[3].value.as_deref(), Some("unpaid"));
}

#[test]
fn test_flatten_ax_tree_empty() {
    assert!(flatten_ax_tree(Vec::new()).is_empty());
}
