use gooey_dom::{extract::extract, TreeNode};

#[test]
fn inputs_by_type() {
	let tree = TreeNode::parse_list(
		r#"[
			{ "name": "input", "props": { "name": "title" } },
			{ "name": "input", "props": { "name": "count", "type": "number" } },
			{ "name": "input", "props": { "name": "agree", "type": "checkbox" } },
			{ "name": "input", "props": { "name": "", "type": "checkbox" } },
			{ "name": "input", "props": { "type": "range" } }
		]"#,
	)
	.unwrap();
	let transforms = extract(&tree);
	assert_eq!(transforms.len(), 3);
	assert_eq!(transforms.kind_of("title"), Some("text"));
	assert_eq!(transforms.kind_of("count"), Some("number"));
	assert_eq!(transforms.kind_of("agree"), Some("checkbox"));
}

#[test]
fn other_named_nodes_by_tag() {
	let tree = vec![
		TreeNode::new("select").with_prop("name", "color"),
		TreeNode::new("textarea").with_prop("name", "notes"),
		TreeNode::new("div").with_children(vec![TreeNode::new("input").with_prop("name", "file").with_prop("type", "file")]),
		TreeNode::new("markdown").with_prop("body", "no name"),
	];
	let transforms = extract(&tree);
	assert_eq!(transforms.len(), 3);
	assert_eq!(transforms.kind_of("color"), Some("select"));
	assert_eq!(transforms.kind_of("notes"), Some("textarea"));
	assert_eq!(transforms.kind_of("file"), Some("file"));
}

#[test]
fn expanders_get_synthetic_names() {
	let tree = vec![
		TreeNode::new("div").with_children(vec![
			TreeNode::new("markdown"),
			TreeNode::new("expander").with_children(vec![TreeNode::new("details")]),
		]),
		TreeNode::new("details").with_prop("name", "advanced"),
	];
	let transforms = extract(&tree);
	assert_eq!(transforms.kind_of("__expander_0.1"), Some("expander"));
	assert_eq!(transforms.kind_of("__expander_0.1.0"), Some("details"));
	assert_eq!(transforms.kind_of("advanced"), Some("details"));
	assert_eq!(transforms.len(), 3);
}

#[test]
fn later_duplicates_win() {
	let tree = vec![
		TreeNode::new("input").with_prop("name", "x").with_prop("type", "number"),
		TreeNode::new("div").with_children(vec![TreeNode::new("input").with_prop("name", "x").with_prop("type", "checkbox")]),
	];
	assert_eq!(extract(&tree).kind_of("x"), Some("checkbox"));
}

#[test]
fn empty_tree() {
	assert!(extract(&[]).is_empty());
}
