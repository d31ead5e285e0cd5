use chatdock::error::{DecodeSnafu, StatusSnafu, TransportSnafu};
use chatdock::{BackendResult, ChatBackend, ChatReply, ChatRequest};
use futures::future::{FutureExt, LocalBoxFuture};
use snafu::{OptionExt, ensure};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::describe_js_error;

/// Posts chat requests with the browser's `fetch`.
///
/// No timeout is applied; a request settles whenever the browser settles it.
pub struct FetchBackend {
    endpoint: String,
}

impl FetchBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    async fn post(&self, request: ChatRequest) -> BackendResult<ChatReply> {
        let body = serde_json::to_string(&request).map_err(|error| {
            TransportSnafu {
                stage: "encode-chat-request",
                message: error.to_string(),
            }
            .build()
        })?;

        let window = web_sys::window().context(TransportSnafu {
            stage: "resolve-window",
            message: "no global window",
        })?;

        let headers = Headers::new().map_err(|error| transport("create-headers", &error))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|error| transport("set-content-type", &error))?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(&self.endpoint, &init)
            .map_err(|error| transport("build-chat-request", &error))?;

        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|error| transport("fetch-chat-endpoint", &error))?;
        let response: Response = response
            .dyn_into()
            .map_err(|error| transport("cast-chat-response", &error))?;

        ensure!(
            response.ok(),
            StatusSnafu {
                stage: "check-chat-status",
                status: response.status(),
            }
        );

        let text_promise = response
            .text()
            .map_err(|error| transport("read-chat-response", &error))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|error| transport("read-chat-response", &error))?
            .as_string()
            .context(DecodeSnafu {
                stage: "read-chat-response",
                message: "response body is not a string",
            })?;

        serde_json::from_str(&text).map_err(|error| {
            DecodeSnafu {
                stage: "decode-chat-reply",
                message: error.to_string(),
            }
            .build()
        })
    }
}

impl ChatBackend for FetchBackend {
    fn send(&self, request: ChatRequest) -> LocalBoxFuture<'_, BackendResult<ChatReply>> {
        self.post(request).boxed_local()
    }
}

fn transport(stage: &'static str, error: &JsValue) -> chatdock::BackendError {
    TransportSnafu {
        stage,
        message: describe_js_error(error),
    }
    .build()
}
