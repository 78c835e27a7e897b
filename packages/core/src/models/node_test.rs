//! Tests for TreeNode ingestion, keys and flattening

use crate::models::{flatten, node_key, normalize, normalize_forest, payload_items, TreeNode};
use serde_json::json;

fn sample_forest() -> Vec<TreeNode> {
    vec![
        TreeNode::new("Rust")
            .with_id("t1")
            .with_path("/rust")
            .with_children(vec![
                TreeNode::new("Ownership").with_id("n1").with_path("/rust/ownership"),
                TreeNode::new("Async")
                    .with_id("f1")
                    .with_path("/rust/async")
                    .with_children(vec![
                        TreeNode::new("Pinning").with_id("n2").with_path("/rust/async/pin"),
                    ]),
            ]),
        TreeNode::new("Empty topic").with_id("t2").with_path("/empty"),
    ]
}

// ========================================================================
// normalize()
// ========================================================================

#[test]
fn test_normalize_well_formed_node() {
    let node = normalize(&json!({
        "id": "42",
        "currentPath": "/a",
        "name": "Alpha",
        "folder": true,
        "category": "lang",
        "viewCount": 7,
        "visible": true,
        "children": [{ "id": "43", "name": "Beta" }]
    }));

    assert_eq!(node.id.as_deref(), Some("42"));
    assert_eq!(node.current_path.as_deref(), Some("/a"));
    assert_eq!(node.name, "Alpha");
    assert!(node.folder);
    assert_eq!(node.category.as_deref(), Some("lang"));
    assert_eq!(node.view_count, 7);
    assert!(node.visible);
    assert!(!node.is_category_group);
    assert_eq!(node.children.len(), 1);
    assert_eq!(node.children[0].name, "Beta");
}

#[test]
fn test_normalize_missing_fields_use_defaults() {
    let node = normalize(&json!({}));

    assert_eq!(node.id, None);
    assert_eq!(node.current_path, None);
    assert_eq!(node.name, "");
    assert!(!node.folder);
    assert_eq!(node.category, None);
    assert_eq!(node.view_count, 0);
    assert!(!node.visible);
    assert!(node.children.is_empty());
}

#[test]
fn test_normalize_non_object_input() {
    for raw in [json!(null), json!(12), json!("text"), json!([1, 2])] {
        let node = normalize(&raw);
        assert_eq!(node, TreeNode::default());
    }
}

#[test]
fn test_normalize_visible_is_strict() {
    assert!(normalize(&json!({ "visible": true })).visible);
    assert!(normalize(&json!({ "visible": "true" })).visible);
    assert!(!normalize(&json!({ "visible": "TRUE" })).visible);
    assert!(!normalize(&json!({ "visible": 1 })).visible);
    assert!(!normalize(&json!({ "visible": "yes" })).visible);
    assert!(!normalize(&json!({ "visible": null })).visible);
}

#[test]
fn test_normalize_folder_uses_truthiness() {
    assert!(normalize(&json!({ "folder": 1 })).folder);
    assert!(normalize(&json!({ "folder": "yes" })).folder);
    assert!(normalize(&json!({ "folder": {} })).folder);
    assert!(!normalize(&json!({ "folder": 0 })).folder);
    assert!(!normalize(&json!({ "folder": "" })).folder);
    assert!(!normalize(&json!({ "folder": null })).folder);
}

#[test]
fn test_normalize_view_count_coercion() {
    assert_eq!(normalize(&json!({ "viewCount": "15" })).view_count, 15);
    assert_eq!(normalize(&json!({ "viewCount": " 3.9 " })).view_count, 3);
    assert_eq!(normalize(&json!({ "viewCount": "abc" })).view_count, 0);
    assert_eq!(normalize(&json!({ "viewCount": -4 })).view_count, 0);
    assert_eq!(normalize(&json!({ "viewCount": true })).view_count, 1);
    assert_eq!(normalize(&json!({ "viewCount": [] })).view_count, 0);
}

#[test]
fn test_normalize_view_count_only_parses_decimal_strings() {
    assert_eq!(normalize(&json!({ "viewCount": "1e2" })).view_count, 100);
    assert_eq!(normalize(&json!({ "viewCount": "0x1A" })).view_count, 0);
    assert_eq!(normalize(&json!({ "viewCount": "" })).view_count, 0);
    assert_eq!(normalize(&json!({ "viewCount": "inf" })).view_count, 0);
}

#[test]
fn test_normalize_identifier_and_label_coercion() {
    let node = normalize(&json!({ "id": 17, "name": 3, "category": 5 }));
    assert_eq!(node.id.as_deref(), Some("17"));
    assert_eq!(node.name, "3");
    assert_eq!(node.category, None);

    let node = normalize(&json!({ "id": true, "currentPath": {} }));
    assert_eq!(node.id, None);
    assert_eq!(node.current_path, None);
}

#[test]
fn test_normalize_children_must_be_array() {
    let node = normalize(&json!({ "children": { "id": "x" } }));
    assert!(node.children.is_empty());

    let node = normalize(&json!({ "children": [null, { "children": [{}] }] }));
    assert_eq!(node.children.len(), 2);
    assert_eq!(node.children[1].children.len(), 1);
}

#[test]
fn test_normalize_ignores_category_group_flag() {
    let node = normalize(&json!({ "isCategoryGroup": true }));
    assert!(!node.is_category_group);
}

// ========================================================================
// payload envelopes
// ========================================================================

#[test]
fn test_payload_items_envelopes() {
    assert_eq!(payload_items(&json!([{ "id": "a" }])).len(), 1);
    assert_eq!(payload_items(&json!({ "data": [{}, {}] })).len(), 2);
    assert_eq!(payload_items(&json!({ "code": 200, "result": [{}] })).len(), 1);
    assert!(payload_items(&json!({ "data": "nope" })).is_empty());
    assert!(payload_items(&json!(null)).is_empty());
}

#[test]
fn test_normalize_forest_from_envelope() {
    let forest = normalize_forest(&json!({
        "data": [
            { "id": "1", "currentPath": "/a", "visible": "true" },
            { "id": "2", "currentPath": "/b" }
        ]
    }));
    assert_eq!(forest.len(), 2);
    assert!(forest[0].visible);
    assert!(!forest[1].visible);
}

// ========================================================================
// keys
// ========================================================================

#[test]
fn test_node_key_prefers_id() {
    let node = TreeNode::new("n").with_id("abc").with_path("/p");
    assert_eq!(node_key(&node, Some(3)), "abc");
}

#[test]
fn test_node_key_falls_back_to_path() {
    let node = TreeNode::new("n").with_path("/p");
    assert_eq!(node_key(&node, None), "path:/p");
}

#[test]
fn test_node_key_virtual_with_and_without_index() {
    let node = TreeNode::new("Group");
    assert_eq!(node_key(&node, None), "virtual:Group");
    assert_eq!(node_key(&node, Some(2)), "virtual:Group:2");
    assert!(node.is_virtual());
}

#[test]
fn test_node_key_treats_empty_strings_as_absent() {
    let node = TreeNode::new("n").with_id("").with_path("");
    assert_eq!(node.key(), "virtual:n");
}

// ========================================================================
// clone / flatten
// ========================================================================

#[test]
fn test_clone_is_structurally_disjoint() {
    let original = sample_forest();
    let mut copy = original.clone();

    assert_eq!(copy, original);

    copy[0].children[1].children[0].visible = true;
    copy[0].children[1].children[0].name = "changed".to_string();

    assert!(!original[0].children[1].children[0].visible);
    assert_eq!(original[0].children[1].children[0].name, "Pinning");
}

#[test]
fn test_flatten_emits_leaves_in_pre_order() {
    let forest = sample_forest();
    let leaves: Vec<&str> = flatten(&forest).iter().map(|n| n.name.as_str()).collect();
    assert_eq!(leaves, vec!["Ownership", "Pinning", "Empty topic"]);
}

#[test]
fn test_flatten_ignores_folder_flag() {
    let mut forest = sample_forest();
    forest[1].folder = true;

    let leaves = flatten(&forest);
    assert_eq!(leaves.len(), 3);
    assert_eq!(leaves[2].name, "Empty topic");
}

#[test]
fn test_flatten_length_equals_leaf_count() {
    fn count_leaves(nodes: &[TreeNode]) -> usize {
        nodes
            .iter()
            .map(|n| {
                if n.children.is_empty() {
                    1
                } else {
                    count_leaves(&n.children)
                }
            })
            .sum()
    }

    let forest = sample_forest();
    assert_eq!(flatten(&forest).len(), count_leaves(&forest));
    assert!(flatten(&[]).is_empty());
}

#[test]
fn test_subtree_len() {
    let forest = sample_forest();
    assert_eq!(forest[0].subtree_len(), 4);
    assert_eq!(forest[1].subtree_len(), 1);
}

#[test]
fn test_serde_round_trip_uses_camel_case() {
    let node = TreeNode::new("x").with_path("/x").with_view_count(3);
    let value = serde_json::to_value(&node).unwrap();
    assert_eq!(value["currentPath"], "/x");
    assert_eq!(value["viewCount"], 3);
    assert_eq!(value["isCategoryGroup"], false);

    let back: TreeNode = serde_json::from_value(value).unwrap();
    assert_eq!(back, node);
}
