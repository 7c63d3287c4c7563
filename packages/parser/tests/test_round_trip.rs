use quire_parser::{parse, render_tree, serialize, Element, ElementTree, Markup};

const BOOKSTORE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bookstore id="root">
    <book id="book1" category="COOKING">
        <title id="title1" lang="en">Everyday Italian</title>
        <author id="author1">Giada De Laurentiis</author>
        <year id="year1">2005</year>
        <price id="price1">30.00</price>
    </book>
    <book id="book2" category="CHILDREN">
        <title id="title2" lang="en">Harry Potter</title>
        <author id="author2">J K. Rowling</author>
    </book>
</bookstore>
"#;

#[test]
fn test_bookstore_parses() {
    let markup = parse(BOOKSTORE).unwrap();
    assert_eq!(markup.tree.len(), 9);
    assert_eq!(markup.tree.id_count(), 9);
    assert!(markup.tree.check_invariants().is_ok());
    assert_eq!(
        markup.tree.element("author2").unwrap().text(),
        Some("J K. Rowling")
    );
}

#[test]
fn test_serialized_bookstore_matches_source_layout() {
    let markup = parse(BOOKSTORE).unwrap();
    let expected: Vec<&str> = BOOKSTORE.lines().collect();
    assert_eq!(serialize(&markup), expected);
}

#[test]
fn test_round_trip_after_edits() {
    let mut markup = parse(BOOKSTORE).unwrap();
    markup
        .tree
        .append_child(Element::new("note").with_id("note1").with_text("signed"), "book2")
        .unwrap();
    markup.tree.delete_subtree("year1").unwrap();
    markup.tree.set_id("book1", "cookbook").unwrap();

    let reparsed = parse(&serialize(&markup).join("\n")).unwrap();
    assert_eq!(reparsed.tree, markup.tree);
    assert!(reparsed.tree.check_invariants().is_ok());
}

#[test]
fn test_log_directive_survives_round_trip() {
    let source = "# log -e delete\n<root id=\"root\"></root>";
    let markup = parse(source).unwrap();
    let lines = serialize(&markup);
    assert_eq!(lines[0], "# log -e delete");

    let reparsed = parse(&lines.join("\n")).unwrap();
    assert_eq!(reparsed.log_directive, markup.log_directive);
}

#[test]
fn test_tree_view_of_default_document() {
    let markup = Markup::default();
    assert_eq!(render_tree(&markup.tree), vec![r#"root [id="root"]"#]);
    assert_eq!(markup.tree, ElementTree::default());
}
