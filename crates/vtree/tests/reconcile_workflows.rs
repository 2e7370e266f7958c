mod common;

use std::cell::RefCell;
use std::rc::Rc;

use vtree::cli::{diff_documents, patch_document, CliOptions};
use vtree::html::{vnode_to_html, HtmlOptions};
use vtree::{
    apply_patches, diff, h, AttrValue, Child, Event, EventHandler, LiveTree, PatchError, VNode,
};

use common::{mounted, only_child};

fn todo_list(items: &[(&str, bool)], filter: &str) -> VNode {
    let list = VNode::new("ul").with_children(items.iter().map(|(title, done)| {
        VNode::new("li")
            .with_attr("class", if *done { "done" } else { "open" })
            .with_child(*title)
    }));
    VNode::new("section")
        .with_attr("data-filter", filter)
        .with_child(VNode::new("h1").with_child("Todos"))
        .with_child(list)
}

#[test]
fn successive_renders_keep_untouched_nodes() {
    let v1 = todo_list(&[("milk", false), ("eggs", false)], "all");
    let v2 = todo_list(&[("milk", true), ("eggs", false), ("bread", false)], "all");
    let v3 = todo_list(&[("milk", true)], "done");

    let (mut host, body, root) = mounted(&v1);
    let heading = host.children(&root).unwrap()[0];
    let list = host.children(&root).unwrap()[1];
    let eggs = host.children(&list).unwrap()[1];

    let root = apply_patches(&mut host, root, &diff(&v1, &v2)).unwrap().unwrap();
    assert_eq!(
        host.inner_html(&body),
        concat!(
            r#"<section data-filter="all"><h1>Todos</h1><ul>"#,
            r#"<li class="done">milk</li><li class="open">eggs</li><li class="open">bread</li>"#,
            "</ul></section>"
        )
    );
    assert_eq!(host.children(&root).unwrap()[0], heading);
    assert_eq!(host.children(&list).unwrap()[1], eggs);

    apply_patches(&mut host, root, &diff(&v2, &v3)).unwrap();
    assert_eq!(
        host.inner_html(&body),
        r#"<section data-filter="done"><h1>Todos</h1><ul><li class="done">milk</li></ul></section>"#
    );
    assert_eq!(host.parent(&eggs), None);
    let (fresh, _, fresh_root) = mounted(&v3);
    assert_eq!(host.snapshot(&root), fresh.snapshot(&fresh_root));
}

#[test]
fn handler_swap_rebinds_listener() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let handler = |name: &'static str| {
        let log = Rc::clone(&log);
        EventHandler::new(name, move |event: &Event| log.borrow_mut().push(format!("{name}:{}", event.kind)))
    };

    let v1 = VNode::new("button").with_attr("onClick", handler("save")).with_child("Save");
    let v2 = VNode::new("button").with_attr("onClick", handler("submit")).with_child("Save");
    let v3 = VNode::new("button").with_child("Save");

    let (mut host, _, button) = mounted(&v1);
    assert!(host.dispatch(&button, &Event::new("click")));

    apply_patches(&mut host, button, &diff(&v1, &v2)).unwrap();
    assert!(host.dispatch(&button, &Event::new("click")));

    apply_patches(&mut host, button, &diff(&v2, &v3)).unwrap();
    assert!(!host.dispatch(&button, &Event::new("click")));
    assert!(host.listeners(&button).is_empty());

    assert_eq!(*log.borrow(), vec!["save:click", "submit:click"]);
}

#[test]
fn style_updates_replace_declarations() {
    let v1 = h(
        "div",
        [("style", AttrValue::style([("color", "red"), ("fontSize", "16px")]))],
        ["styled"],
    );
    let v2 = h("div", [("style", AttrValue::style([("color", "blue")]))], ["styled"]);
    let v3 = VNode::new("div").with_child("styled");

    let (mut host, body, div) = mounted(&v1);
    assert_eq!(host.inner_html(&body), r#"<div style="color: red; font-size: 16px;">styled</div>"#);

    apply_patches(&mut host, div, &diff(&v1, &v2)).unwrap();
    assert_eq!(host.style(&div, "color"), Some("blue"));
    assert_eq!(host.style(&div, "font-size"), None);

    apply_patches(&mut host, div, &diff(&v2, &v3)).unwrap();
    assert_eq!(host.inner_html(&body), "<div>styled</div>");
}

#[test]
fn root_tag_change_swaps_root_in_container() {
    let v1 = VNode::new("div").with_attr("id", "app").with_child("loading");
    let v2 = VNode::new("main").with_attr("id", "app").with_child(VNode::new("p").with_child("ready"));

    let (mut host, body, div) = mounted(&v1);
    let main = apply_patches(&mut host, div, &diff(&v1, &v2)).unwrap().unwrap();
    assert_ne!(main, div);
    assert_eq!(only_child(&host, &body), main);
    assert_eq!(host.inner_html(&body), r#"<main id="app"><p>ready</p></main>"#);
}

#[test]
fn markup_matches_serialized_virtual_tree() {
    let v1 = VNode::new("form")
        .with_child(VNode::new("input").with_attr("value", 1).with_attr("disabled", true))
        .with_child(Child::Text("a & b".into()));
    let v2 = VNode::new("form")
        .with_child(VNode::new("input").with_attr("value", 2.5).with_attr("disabled", false))
        .with_child(Child::Text("a < b".into()));

    let (mut host, body, form) = mounted(&v1);
    apply_patches(&mut host, form, &diff(&v1, &v2)).unwrap();
    let expected = vnode_to_html(&v2, &HtmlOptions::default()).unwrap();
    assert_eq!(host.outer_html(&form), expected);
    assert_eq!(host.inner_html(&body), r#"<form><input value="2.5"></input>a &lt; b</form>"#);
}

#[test]
fn stale_script_is_rejected_without_touching_siblings() {
    let v1 = VNode::new("ul").with_child("a").with_child("b");
    let v2 = VNode::new("ul").with_child("a");
    let script = diff(&v1, &v2);

    let (mut host, body, ul) = mounted(&v1);
    apply_patches(&mut host, ul, &script).unwrap();
    let err = apply_patches(&mut host, ul, &script).unwrap_err();
    assert_eq!(err, PatchError::IndexOutOfRange { index: 1, len: 1 });
    assert_eq!(host.inner_html(&body), "<ul>a</ul>");
}

#[test]
fn documents_round_trip_through_cli_helpers() {
    let old = r#"["div", {"id": "a", "title": "x"}, ["p", "one"], ["p", "two"]]"#;
    let new = r#"["div", {"id": "b"}, ["p", "one"], ["span", "two"], "tail"]"#;
    let opts = CliOptions::default();

    let script = diff_documents(old, new, &opts).unwrap();
    let html = patch_document(old, &script, &opts).unwrap();
    assert_eq!(html, r#"<div id="b"><p>one</p><span>two</span>tail</div>"#);

    let pretty = patch_document(old, &script, &CliOptions { pretty: true, verbose: 0 }).unwrap();
    assert_eq!(pretty, "<div id=\"b\">\n  <p>one</p>\n  <span>two</span>\n  tail\n</div>");
}
