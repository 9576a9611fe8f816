use futures::StreamExt;
use markup_stream::{
    render, render_to_stream, ElementNode, ErrorKind, Node, RenderOptions, Rendered, Stack,
};
use std::time::Duration;

#[tokio::test]
async fn pushed_content_materializes_at_the_outlet() {
    let head = Stack::new("head");
    let view = ElementNode::new("div")
        .child(head.push("Head1"))
        .child(head.push("Head2"))
        .child(head.outlet());

    assert_eq!(
        render(view, RenderOptions::default()).await.unwrap(),
        "<div>Head1Head2</div>"
    );
}

#[tokio::test]
async fn an_outlet_can_precede_its_pushes() {
    let scripts = Stack::new("scripts");
    let view = Node::sequence([
        scripts.outlet(),
        "body".into(),
        scripts.push(ElementNode::new("script").child("init()")),
    ]);

    assert_eq!(
        render(view, RenderOptions::default()).await.unwrap(),
        "<script>init()</script>body"
    );
}

#[tokio::test]
async fn pushes_keep_document_order_despite_resolution_order() {
    let head = Stack::new("head");

    let slow = {
        let head = head.clone();
        Node::from_fn(move |_| {
            let head = head.clone();
            Rendered::later(async move {
                tokio::time::sleep(Duration::from_millis(40)).await;
                head.push("slow")
            })
        })
    };
    let fast = {
        let head = head.clone();
        Node::from_fn(move |_| {
            let head = head.clone();
            Rendered::later(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                head.push("fast")
            })
        })
    };

    let view = ElementNode::new("div")
        .child(slow)
        .child(fast)
        .child(head.outlet());

    // the fast producer resolves first, but sinks append in walker order
    assert_eq!(
        render(view, RenderOptions::default()).await.unwrap(),
        "<div>slowfast</div>"
    );
}

#[tokio::test]
async fn a_stack_may_be_drained_by_only_one_outlet() {
    let head = Stack::new("head");
    let view = Node::sequence([head.push("x"), head.outlet(), head.outlet()]);

    let error = render(view, RenderOptions::default()).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidContent);
    assert!(error.to_string().contains("head"));
}

#[tokio::test]
async fn distinct_stacks_are_independent_channels() {
    let styles = Stack::new("assets");
    let scripts = Stack::new("assets");
    let view = Node::sequence([
        styles.push("s1"),
        scripts.push("j1"),
        "|".into(),
        styles.outlet(),
        "|".into(),
        scripts.outlet(),
    ]);

    assert_eq!(
        render(view, RenderOptions::default()).await.unwrap(),
        "|s1|j1"
    );
}

#[tokio::test]
async fn a_stack_outlet_inside_another_stack_is_spliced_in_place() {
    let outer = Stack::new("outer");
    let inner = Stack::new("inner");
    let view = Node::sequence([
        inner.push("deep"),
        outer.push(Node::sequence(["[".into(), inner.outlet(), "]".into()])),
        outer.outlet(),
    ]);

    assert_eq!(
        render(view, RenderOptions::default()).await.unwrap(),
        "[deep]"
    );
}

#[tokio::test]
async fn an_unpushed_stack_renders_nothing() {
    let empty = Stack::new("empty");
    let view = Node::sequence(["a".into(), empty.outlet(), "b".into()]);
    assert_eq!(render(view, RenderOptions::default()).await.unwrap(), "ab");
}

#[tokio::test]
async fn the_first_outlet_streams_while_later_content_is_deferred() {
    let head = Stack::new("head");
    let view = Node::sequence([
        head.push("early"),
        head.outlet(),
        Node::pending(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Node::text("late")
        }),
    ]);

    let mut stream = render_to_stream(view, RenderOptions::default());
    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk.unwrap());
    }

    // the stack's content streams as soon as the outlet is reached
    assert_eq!(chunks[0], "early");
    assert_eq!(chunks.concat(), "earlylate");
}

#[tokio::test]
async fn pushes_after_a_streaming_outlet_reach_the_consumer_directly() {
    let head = Stack::new("head");
    let view = Node::sequence([
        head.outlet(),
        head.push("first"),
        head.push("second"),
        "body".into(),
    ]);

    assert_eq!(
        render(view, RenderOptions::default()).await.unwrap(),
        "firstsecondbody"
    );
}
