use gooey_dom::{
	node::{expander_field, path_key},
	TreeNode,
};
use serde_json::json;

#[test]
fn lenient_parsing() {
	let nodes = TreeNode::parse_list(r#"[{ "name": "div", "props": null, "children": null }, { "props": { "a": 1 } }]"#).unwrap();
	assert_eq!(nodes[0], TreeNode::new("div"));
	assert_eq!(nodes[1].name, "");
	assert_eq!(nodes[1].props.get("a"), Some(&json!(1)));
	assert!(TreeNode::parse_list("{}").is_err());
}

#[test]
fn walk_order_and_paths() {
	let tree = vec![
		TreeNode::new("a").with_children(vec![TreeNode::new("b"), TreeNode::new("c").with_children(vec![TreeNode::new("d")])]),
		TreeNode::new("e"),
	];
	let mut visited = Vec::new();
	TreeNode::walk(&tree, &mut |node, path| visited.push(format!("{}@{}", node.name, path_key(path))));
	assert_eq!(visited, ["a@0", "b@0.0", "c@0.1", "d@0.1.0", "e@1"]);
}

#[test]
fn expander_fields() {
	assert_eq!(expander_field(&TreeNode::new("expander"), &[2, 0]), "__expander_2.0");
	assert_eq!(expander_field(&TreeNode::new("expander").with_prop("name", ""), &[1]), "__expander_1");
	assert_eq!(expander_field(&TreeNode::new("details").with_prop("name", "more"), &[1]), "more");
}

#[test]
fn props() {
	let node = TreeNode::new("x")
		.with_prop("nothing", json!(null))
		.with_prop("zero", 0)
		.with_prop("empty", "")
		.with_prop("list", json!([]))
		.with_prop("count", 3)
		.with_prop("class", "c");
	let props = &node.props;

	assert_eq!(props.get("nothing"), None);
	assert_eq!(props.first_of(&["nothing", "count"]), Some(&json!(3)));
	assert!(!props.flag("nothing"));
	assert!(!props.flag("zero"));
	assert!(!props.flag("empty"));
	assert!(props.flag("list"));
	assert!(props.flag("count"));
	assert_eq!(props.text("count").as_deref(), Some("3"));
	assert_eq!(props.str("count"), None);
	assert_eq!(props.class_name(), Some("c"));
	assert_eq!(props.field_name(), None);
}

#[test]
fn styles() {
	let style = |value| TreeNode::new("x").with_prop("style", value).props.style();
	assert_eq!(style(json!("color: red;")), Some("color: red;".to_owned()));
	assert_eq!(style(json!("")), None);
	assert_eq!(
		style(json!({ "fontSize": 12, "zIndex": 2, "--accent": "blue", "color": null })),
		Some("font-size: 12px; z-index: 2; --accent: blue;".to_owned())
	);
	assert_eq!(style(json!(5)), None);
}
