use markup_stream::{
    once, render, AttributeValue, ClassValue, ElementNode, Node, RenderMode, RenderOptions,
    StyleMap,
};

fn html() -> RenderOptions {
    RenderOptions::default()
}

fn xml() -> RenderOptions {
    RenderOptions {
        mode: RenderMode::Xml,
        ..RenderOptions::default()
    }
}

#[tokio::test]
async fn nested_elements_render_in_document_order() {
    let view = ElementNode::new("div")
        .attr("id", "outer")
        .child("before ")
        .child(ElementNode::new("span").attr("id", "inner").child("inner"))
        .child(" after");

    assert_eq!(
        render(view, html()).await.unwrap(),
        r#"<div id="outer">before <span id="inner">inner</span> after</div>"#
    );
}

#[tokio::test]
async fn primitives_render_escaped_or_not_at_all() {
    let view = Node::sequence([
        "text".into(),
        7i64.into(),
        Node::Unit,
        true.into(),
        false.into(),
        3.5f64.into(),
        Option::<&str>::None.into(),
        Some("some").into(),
    ]);

    assert_eq!(render(view, html()).await.unwrap(), "text73.5some");
}

#[tokio::test]
async fn text_is_escaped() {
    let view =
        ElementNode::new("div").child(r#"I'm a little <teapot> "short" & stout"#);

    assert_eq!(
        render(view, html()).await.unwrap(),
        "<div>I'm a little &lt;teapot&gt; &quot;short&quot; &amp; stout</div>"
    );
}

#[tokio::test]
async fn raw_markup_bypasses_escaping() {
    let view = ElementNode::new("div").child(Node::raw("<b>bold</b>"));
    assert_eq!(render(view, html()).await.unwrap(), "<div><b>bold</b></div>");
}

#[tokio::test]
async fn dynamic_values_render_escaped() {
    let view = Node::sequence([Node::dynamic(3.5f64), Node::dynamic("a<b")]);
    assert_eq!(render(view, html()).await.unwrap(), "3.5a&lt;b");
}

#[tokio::test]
async fn fragments_render_only_their_children() {
    let view = ElementNode::fragment()
        .child("a")
        .child(ElementNode::new("em").child("b"))
        .child("c");
    assert_eq!(render(view, html()).await.unwrap(), "a<em>b</em>c");
}

#[tokio::test]
async fn boolean_attributes_in_html_mode() {
    let view = ElementNode::new("input")
        .attr("type", "checkbox")
        .attr("checked", true)
        .attr("disabled", false);

    assert_eq!(
        render(view, html()).await.unwrap(),
        r#"<input type="checkbox" checked>"#
    );
}

#[tokio::test]
async fn boolean_attributes_in_xml_mode_serialize_literally() {
    let view = ElementNode::new("input")
        .attr("type", "checkbox")
        .attr("checked", true)
        .attr("disabled", false);

    assert_eq!(
        render(view, xml()).await.unwrap(),
        r#"<input type="checkbox" checked="true" disabled="false" />"#
    );
}

#[tokio::test]
async fn bool_values_on_non_boolean_attributes_coerce_to_text() {
    let view = ElementNode::new("div").attr("data-active", true).attr("data-hidden", false);
    assert_eq!(
        render(view, html()).await.unwrap(),
        r#"<div data-active="true" data-hidden="false"></div>"#
    );
}

#[tokio::test]
async fn null_valued_attributes_are_omitted() {
    let view = ElementNode::new("a")
        .attr("href", "/home")
        .attr("target", AttributeValue::None)
        .attr("rel", Option::<&str>::None);
    assert_eq!(render(view, html()).await.unwrap(), r#"<a href="/home"></a>"#);
}

#[tokio::test]
async fn attribute_values_are_escaped() {
    let view = ElementNode::new("div").attr("title", r#"say "hi" & <go>"#);
    assert_eq!(
        render(view, html()).await.unwrap(),
        r#"<div title="say &quot;hi&quot; &amp; &lt;go&gt;"></div>"#
    );
}

#[tokio::test]
async fn void_elements_have_no_closing_tag() {
    let view = ElementNode::new("div")
        .child(ElementNode::new("br"))
        .child(ElementNode::new("img").attr("src", "/x.png"));
    assert_eq!(
        render(view, html()).await.unwrap(),
        r#"<div><br><img src="/x.png"></div>"#
    );
}

#[tokio::test]
async fn xml_mode_self_closes_childless_elements_only() {
    let view = ElementNode::new("root")
        .child(ElementNode::new("empty"))
        .child(ElementNode::new("full").child("x"));
    assert_eq!(
        render(view, xml()).await.unwrap(),
        "<root><empty /><full>x</full></root>"
    );
}

#[tokio::test]
async fn xml_mode_has_no_void_elements() {
    let view = ElementNode::new("br").child("x");
    assert_eq!(render(view, xml()).await.unwrap(), "<br>x</br>");
}

#[tokio::test]
async fn style_objects_serialize_to_css() {
    let view = ElementNode::new("input").attr(
        "style",
        StyleMap::new()
            .set("backgroundColor", "red")
            .set("fontSize", 16)
            .set("opacity", 0.5)
            .set("--v", "x"),
    );
    assert_eq!(
        render(view, html()).await.unwrap(),
        r#"<input style="background-color:red;font-size:16px;opacity:0.5;--v:x">"#
    );
}

#[tokio::test]
async fn empty_style_and_class_attributes_are_omitted() {
    let view = ElementNode::new("div")
        .attr("style", StyleMap::new())
        .attr("class", ClassValue::list([ClassValue::Bool(false), ClassValue::Text("".into())]));
    assert_eq!(render(view, html()).await.unwrap(), "<div></div>");
}

#[tokio::test]
async fn class_expressions_flatten_to_token_lists() {
    let view = ElementNode::new("button").attr(
        "class",
        ClassValue::list([
            "btn".into(),
            ClassValue::toggles([("active".into(), true), ("hidden".into(), false)]),
            ClassValue::list(["wide".into()]),
        ]),
    );
    assert_eq!(
        render(view, html()).await.unwrap(),
        r#"<button class="btn active wide"></button>"#
    );
}

#[tokio::test]
async fn once_renders_only_the_first_occurrence_of_a_key() {
    let view = Node::sequence([
        once("k", "A"),
        once("k", "B"),
        once("k", "C"),
    ]);
    assert_eq!(render(view, html()).await.unwrap(), "A");
}

#[tokio::test]
async fn once_keys_of_different_kinds_are_distinct() {
    let view = Node::sequence([
        once("styles", ElementNode::new("style").child(".a{}")),
        once(1, "first"),
        once("styles", "duplicate"),
        once(1, "again"),
        once(2, "second"),
    ]);
    assert_eq!(
        render(view, html()).await.unwrap(),
        "<style>.a{}</style>firstsecond"
    );
}

#[tokio::test]
async fn once_applies_per_render_not_per_process() {
    let view = once("k", "A");
    assert_eq!(render(view.clone(), html()).await.unwrap(), "A");
    assert_eq!(render(view, html()).await.unwrap(), "A");
}
