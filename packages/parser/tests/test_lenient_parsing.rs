//! Malformed-but-readable markup: the parser recovers where it can and
//! reports only what it cannot.

use quire_parser::{parse, ParseError};

#[test]
fn test_comments_and_bare_attributes_are_skipped() {
    let markup = parse(
        r#"<root id="r">
            <!-- shopping list -->
            <item id="a" checked lang="en">milk</item>
        </root>"#,
    )
    .unwrap();

    let item = markup.tree.element("a").unwrap();
    assert_eq!(item.text(), Some("milk"));
    assert_eq!(item.attributes().get("lang"), Some("en"));
    assert_eq!(item.attributes().get("checked"), None);
    assert_eq!(markup.tree.len(), 2);
}

#[test]
fn test_mixed_content_keeps_leading_text() {
    let markup = parse(r#"<p id="p">lead <b id="b">bold</b> tail</p>"#).unwrap();
    let p = markup.tree.element("p").unwrap();
    assert_eq!(p.text(), Some("lead"));
    assert_eq!(p.children().count(), 1);
    assert_eq!(markup.tree.element("b").unwrap().text(), Some("bold"));
}

#[test]
fn test_text_spanning_lines_is_joined() {
    let markup = parse("<root id=\"r\">\n<t id=\"t\">hello\n    world</t>\n</root>").unwrap();
    assert_eq!(markup.tree.element("t").unwrap().text(), Some("hello world"));
}

#[test]
fn test_missing_close_is_auto_closed() {
    let markup = parse(r#"<root id="r"><a id="a"><b id="b"></a></root>"#).unwrap();
    let b = markup.tree.element("b").unwrap();
    assert_eq!(b.parent().unwrap().id(), Some("a"));
    assert!(markup.tree.check_invariants().is_ok());
}

#[test]
fn test_stray_close_is_ignored() {
    let markup = parse(r#"<root id="r"></x><a id="a"></a></root>"#).unwrap();
    assert!(markup.tree.contains_id("a"));
}

#[test]
fn test_unclosed_root_is_an_error() {
    let err = parse(r#"<root id="r"><a id="a">"#).unwrap_err();
    assert!(matches!(err, ParseError::UnclosedTag { ref tag, pos: 0 } if tag == "root"));
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let err = parse(r#"<root id="r"><a id="x"></a><b id="x"></b></root>"#).unwrap_err();
    assert_eq!(err, ParseError::duplicate_id("x"));
}

#[test]
fn test_same_name_nesting_pairs_innermost_first() {
    let markup = parse(
        r#"<root id="r"><div id="d1"><div id="d2"><div id="d3"></div></div></x></div></root>"#,
    )
    .unwrap();
    let d3 = markup.tree.element("d3").unwrap();
    assert_eq!(d3.parent().unwrap().id(), Some("d2"));
    assert_eq!(markup.tree.element("d2").unwrap().parent().unwrap().id(), Some("d1"));
    assert_eq!(markup.tree.root_element().children().count(), 1);
}

#[test]
fn test_many_siblings() {
    let mut source = String::from(r#"<root id="r">"#);
    for i in 0..20_000 {
        source.push_str(&format!(r#"<item id="i{i}">v{i}</item>"#));
    }
    source.push_str("</root>");

    let markup = parse(&source).unwrap();
    assert_eq!(markup.tree.len(), 20_001);
    assert_eq!(markup.tree.element("i19999").unwrap().text(), Some("v19999"));
}
