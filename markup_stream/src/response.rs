//! Wrapping a render in an HTTP response.

use crate::{
    error::RenderError,
    node::Node,
    render::{render, render_to_stream, RenderMode, RenderOptions, RenderStream},
};
use futures::Stream;
use http::{
    header::{HeaderMap, CONTENT_TYPE},
    HeaderValue, Response, StatusCode,
};
use render_context::Context;
use std::{
    mem,
    pin::Pin,
    task::{Context as TaskContext, Poll},
};

/// Configuration for [`render_to_response`].
#[derive(Clone, Debug, Default)]
pub struct ResponseOptions {
    /// The response status. Defaults to 200.
    pub status: Option<StatusCode>,
    /// Headers copied onto the response.
    pub headers: HeaderMap,
    /// Whether to stream the body chunk by chunk instead of buffering the
    /// whole document first. A streaming render that fails does so
    /// mid-body; a buffered one fails before any byte is sent.
    pub streaming: bool,
    /// The output flavor; also selects the default `content-type`.
    pub mode: RenderMode,
    /// The context to fork the render's root context from.
    pub context: Option<Context>,
}

/// The body of a rendered response: the whole document, or a live stream.
#[derive(Debug)]
pub enum ResponseBody {
    /// A fully buffered document.
    Full(String),
    /// A chunked stream still being rendered.
    Stream(RenderStream),
}

impl Stream for ResponseBody {
    type Item = Result<String, RenderError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        match self.get_mut() {
            ResponseBody::Full(body) if body.is_empty() => Poll::Ready(None),
            ResponseBody::Full(body) => Poll::Ready(Some(Ok(mem::take(body)))),
            ResponseBody::Stream(stream) => Pin::new(stream).poll_next(cx),
        }
    }
}

/// Renders `node` into an HTTP response.
///
/// The caller's status and headers are applied as-is; `content-type`
/// defaults to `text/html; charset=utf-8` (or `application/xml;
/// charset=utf-8` in XML mode) unless the caller set one.
#[tracing::instrument(level = "trace", skip_all)]
pub async fn render_to_response(
    node: impl Into<Node>,
    options: ResponseOptions,
) -> Result<Response<ResponseBody>, RenderError> {
    let ResponseOptions {
        status,
        headers,
        streaming,
        mode,
        context,
    } = options;
    let render_options = RenderOptions {
        mode,
        context,
        prefetch: true,
    };

    let body = if streaming {
        ResponseBody::Stream(render_to_stream(node, render_options))
    } else {
        ResponseBody::Full(render(node, render_options).await?)
    };

    let mut response = Response::new(body);
    if let Some(status) = status {
        *response.status_mut() = status;
    }
    response.headers_mut().extend(headers);
    let default_content_type = match mode {
        RenderMode::Html => "text/html; charset=utf-8",
        RenderMode::Xml => "application/xml; charset=utf-8",
    };
    response
        .headers_mut()
        .entry(CONTENT_TYPE)
        .or_insert_with(|| HeaderValue::from_static(default_content_type));
    Ok(response)
}
