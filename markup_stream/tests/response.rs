use futures::StreamExt;
use http::{header, HeaderValue, StatusCode};
use markup_stream::{
    render_to_response, ElementNode, Node, RenderMode, ResponseBody, ResponseOptions,
};
use std::time::Duration;

#[tokio::test]
async fn buffered_responses_carry_the_whole_document() {
    let response = render_to_response(
        ElementNode::new("p").child("hi"),
        ResponseOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    match response.into_body() {
        ResponseBody::Full(body) => assert_eq!(body, "<p>hi</p>"),
        ResponseBody::Stream(_) => panic!("expected a buffered body"),
    }
}

#[tokio::test]
async fn xml_mode_selects_the_xml_content_type() {
    let response = render_to_response(
        ElementNode::new("feed").child("x"),
        ResponseOptions {
            mode: RenderMode::Xml,
            ..ResponseOptions::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml; charset=utf-8"
    );
}

#[tokio::test]
async fn caller_status_and_headers_are_preserved() {
    let mut options = ResponseOptions {
        status: Some(StatusCode::NOT_FOUND),
        ..ResponseOptions::default()
    };
    options.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain"),
    );
    options
        .headers
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    let response = render_to_response(ElementNode::new("p").child("gone"), options)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
}

#[tokio::test]
async fn streaming_responses_yield_chunks() {
    let view = Node::sequence([
        "start".into(),
        Node::pending(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Node::text("-end")
        }),
    ]);

    let response = render_to_response(
        view,
        ResponseOptions {
            streaming: true,
            ..ResponseOptions::default()
        },
    )
    .await
    .unwrap();

    let mut body = response.into_body();
    assert!(matches!(body, ResponseBody::Stream(_)));
    let mut out = String::new();
    while let Some(chunk) = body.next().await {
        out.push_str(&chunk.unwrap());
    }
    assert_eq!(out, "start-end");
}

#[tokio::test]
async fn buffered_responses_propagate_render_failures() {
    let view = ElementNode::new("br").child("x");
    let error = render_to_response(view, ResponseOptions::default())
        .await
        .unwrap_err();
    assert_eq!(error.kind(), markup_stream::ErrorKind::AttributeType);
}
