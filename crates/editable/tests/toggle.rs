use manos_editable::{
    Boundary, DomTree, ElementTag, FONT_WEIGHT_ATTRIBUTE, Range, RichEditable, Selection,
    StyleFlags, StyleName, Strategy, Token, TokenizeContext, classify, tokenize,
};

fn editable_with_text(text: &str) -> (RichEditable, manos_editable::NodeId) {
    let mut editable = RichEditable::default();
    let root = editable.root();
    let node = editable.dom_mut().append_text(root, text).unwrap();
    (editable, node)
}

fn root_tokens(editable: &mut RichEditable) -> Vec<Token> {
    let root = editable.root();
    tokenize(editable.dom_mut(), root, &TokenizeContext::default()).unwrap()
}

#[test]
fn direct_child_selection_wraps_only_selected_text() {
    let (mut editable, text) = editable_with_text("hello world");
    editable.select(Range::within(text, 6, 11));

    editable.toggle_inline_style(StyleName::Italic);

    assert_eq!(
        editable.markup(),
        r#"hello <span data-font-style="italic">world</span>"#
    );
    assert_eq!(
        editable.selection().range(),
        Some(&Range::within(editable.root(), 1, 2))
    );
    assert_eq!(editable.active_style(), StyleFlags::only(StyleName::Italic));
}

#[test]
fn toggling_twice_restores_original_runs() {
    let (mut editable, text) = editable_with_text("hello world");
    editable.select(Range::within(text, 6, 11));
    let before = root_tokens(&mut editable);

    editable.toggle_inline_style(StyleName::Italic);
    editable.toggle_inline_style(StyleName::Italic);

    assert_eq!(editable.markup(), "hello world");
    assert_eq!(root_tokens(&mut editable), before);
    assert_eq!(root_tokens(&mut editable), vec![Token::text("hello world")]);
}

#[test]
fn collapsed_selection_is_a_no_op() {
    let (mut editable, text) = editable_with_text("hello");
    let caret = Range::collapsed(Boundary::new(text, 3));
    editable.select(caret);

    editable.toggle_inline_style(StyleName::Bold);

    assert_eq!(editable.markup(), "hello");
    assert_eq!(editable.selection().range(), Some(&caret));
}

#[test]
fn missing_selection_is_a_no_op() {
    let (mut editable, _) = editable_with_text("hello");
    editable.set_selection(Selection::new());

    editable.toggle_inline_style(StyleName::Bold);

    assert_eq!(editable.markup(), "hello");
    assert_eq!(editable.selection().range_count(), 0);
}

#[test]
fn selection_outside_the_root_is_a_no_op() {
    let (mut editable, text) = editable_with_text("hello");
    let detached = editable.dom_mut().create_text("elsewhere");

    editable.select(Range::new(Boundary::new(text, 0), Boundary::new(detached, 4)));
    editable.toggle_inline_style(StyleName::Bold);
    assert_eq!(editable.markup(), "hello");

    editable.select(Range::within(text, 1, 42));
    editable.toggle_inline_style(StyleName::Bold);
    assert_eq!(editable.markup(), "hello");
}

#[test]
fn multi_node_selection_keeps_order_and_xors_each_run() {
    let mut editable = RichEditable::default();
    let root = editable.root();
    let dom = editable.dom_mut();
    let a = dom.append_text(root, "a").unwrap();
    let bold = dom
        .append_element(root, ElementTag::Span, &[(FONT_WEIGHT_ATTRIBUTE, "bold")])
        .unwrap();
    dom.append_text(bold, "b").unwrap();
    let italic = dom
        .append_element(root, ElementTag::Span, &[("data-font-style", "italic")])
        .unwrap();
    let c = dom.append_text(italic, "c").unwrap();

    editable.select(Range::new(Boundary::new(a, 0), Boundary::new(c, 1)));
    editable.toggle_inline_style(StyleName::Bold);

    assert_eq!(
        editable.markup(),
        concat!(
            r#"<span data-font-weight="bold">a</span>"#,
            "b",
            r#"<span data-font-style="italic" data-font-weight="bold">c</span>"#,
        )
    );
    assert_eq!(editable.dom().children(root).len(), 3);
    assert_eq!(editable.selection().range(), Some(&Range::within(root, 0, 3)));
}

#[test]
fn partial_selection_across_styled_run_preserves_unselected_text() {
    let mut editable = RichEditable::default();
    let root = editable.root();
    let dom = editable.dom_mut();
    let span = dom
        .append_element(root, ElementTag::Span, &[(FONT_WEIGHT_ATTRIBUTE, "bold")])
        .unwrap();
    let hello = dom.append_text(span, "HELLO").unwrap();
    let world = dom.append_text(root, " world").unwrap();

    editable.select(Range::new(Boundary::new(hello, 2), Boundary::new(world, 4)));
    editable.toggle_inline_style(StyleName::Bold);

    assert_eq!(
        editable.markup(),
        concat!(
            r#"<span data-font-weight="bold">HE</span>"#,
            "LLO",
            r#"<span data-font-weight="bold"> wor</span>"#,
            "ld",
        )
    );
    assert_eq!(editable.text(), "HELLO world");
    assert_eq!(editable.selection().range(), Some(&Range::within(root, 1, 3)));
}

#[test]
fn whole_text_selection_leaves_no_empty_remnants() {
    let (mut editable, text) = editable_with_text("hello");
    editable.select(Range::within(text, 0, 5));

    editable.toggle_inline_style(StyleName::Code);

    assert_eq!(
        editable.markup(),
        r#"<span data-inline-code="true">hello</span>"#
    );
    assert_eq!(
        editable.selection().range(),
        Some(&Range::within(editable.root(), 0, 1))
    );
}

#[test]
fn reversed_offsets_in_one_node_are_normalized() {
    let (mut editable, text) = editable_with_text("hello world");
    editable.select(Range::new(Boundary::new(text, 5), Boundary::new(text, 0)));

    editable.toggle_inline_style(StyleName::Underlined);

    assert_eq!(
        editable.markup(),
        r#"<span data-text-underlined="true">hello</span> world"#
    );
}

#[test]
fn classify_prefers_insert_for_direct_children_and_root() {
    let mut editable = RichEditable::default();
    let root = editable.root();
    let dom = editable.dom_mut();
    let plain = dom.append_text(root, "plain").unwrap();
    let span = dom
        .append_element(root, ElementTag::Span, &[(FONT_WEIGHT_ATTRIBUTE, "bold")])
        .unwrap();
    let nested = dom.append_text(span, "nested").unwrap();
    let dom = editable.dom();

    assert_eq!(
        classify(dom, &Range::within(plain, 0, 2), root),
        Strategy::InsertStyledRun
    );
    assert_eq!(
        classify(dom, &Range::within(root, 0, 2), root),
        Strategy::InsertStyledRun
    );
    assert_eq!(
        classify(dom, &Range::within(nested, 1, 3), root),
        Strategy::SplitStyledElement
    );
    assert_eq!(
        classify(
            dom,
            &Range::new(Boundary::new(plain, 1), Boundary::new(nested, 2)),
            root
        ),
        Strategy::InsertStyledRun
    );
    assert_eq!(
        classify(dom, &Range::within(span, 0, 1), root),
        Strategy::SplitStyledElement
    );
}

#[test]
fn every_style_writes_its_own_marker() {
    for (name, expected) in [
        (StyleName::Bold, r#"<span data-font-weight="bold">x</span>"#),
        (StyleName::Italic, r#"<span data-font-style="italic">x</span>"#),
        (
            StyleName::Underlined,
            r#"<span data-text-underlined="true">x</span>"#,
        ),
        (
            StyleName::Linethrough,
            r#"<span data-text-linethrough="true">x</span>"#,
        ),
        (StyleName::Code, r#"<span data-inline-code="true">x</span>"#),
    ] {
        let (mut editable, text) = editable_with_text("x");
        editable.select(Range::within(text, 0, 1));
        editable.toggle_inline_style(name);
        assert_eq!(editable.markup(), expected, "{name}");
    }
}

#[test]
fn backward_selection_across_nodes_keeps_text_order() {
    let mut editable = RichEditable::default();
    let root = editable.root();
    let abc = editable.dom_mut().append_text(root, "abc").unwrap();
    let def = editable.dom_mut().append_text(root, "def").unwrap();

    editable.set_selection(Selection::from_range(Range::new(
        Boundary::new(def, 1),
        Boundary::new(abc, 2),
    )));
    editable.toggle_inline_style(StyleName::Bold);

    assert_eq!(
        editable.markup(),
        r#"ab<span data-font-weight="bold">cd</span>ef"#
    );
    assert_eq!(editable.text(), "abcdef");
    assert_eq!(editable.selection().range(), Some(&Range::within(root, 1, 2)));
}

#[test]
fn selecting_styled_span_by_its_boundaries_toggles_it() {
    let mut editable = RichEditable::default();
    let root = editable.root();
    let span = editable
        .dom_mut()
        .append_element(root, ElementTag::Span, &[(FONT_WEIGHT_ATTRIBUTE, "bold")])
        .unwrap();
    editable.dom_mut().append_text(span, "abc").unwrap();

    editable.select(Range::within(span, 0, 1));
    editable.toggle_inline_style(StyleName::Bold);

    assert_eq!(editable.markup(), "abc");
    assert_eq!(editable.selection().range(), Some(&Range::within(root, 0, 1)));

    editable.toggle_inline_style(StyleName::Bold);
    assert_eq!(
        editable.markup(),
        r#"<span data-font-weight="bold">abc</span>"#
    );
    assert_eq!(
        root_tokens(&mut editable),
        vec![Token::styled("abc", StyleFlags::only(StyleName::Bold))]
    );
}

#[test]
fn selecting_styled_span_by_its_boundaries_adds_flags_in_place() {
    let mut editable = RichEditable::default();
    let root = editable.root();
    let span = editable
        .dom_mut()
        .append_element(root, ElementTag::Span, &[(FONT_WEIGHT_ATTRIBUTE, "bold")])
        .unwrap();
    editable.dom_mut().append_text(span, "abc").unwrap();

    editable.select(Range::within(span, 0, 1));
    editable.toggle_inline_style(StyleName::Italic);

    assert_eq!(
        editable.markup(),
        r#"<span data-font-style="italic" data-font-weight="bold">abc</span>"#
    );
    assert_eq!(editable.dom().children(root).len(), 1);
}
