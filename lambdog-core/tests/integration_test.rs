//! Integration tests for lambdog-core: direct mode wrapper behavior

use lambdog_core::*;
use serde_json::{Value, json};

async fn echo(props: Props, _args: HandlerArgs) -> HandlerResult {
    Ok(Some(Value::Object(props)))
}

fn get_event() -> Event {
    Event::new("GET", "/foo").with_query("name", "donavon")
}

#[tokio::test]
async fn test_get_echoes_query_props() {
    let app = with_json_handler(handler(echo), LambdogConfig::default());
    let response = app.call(get_event()).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(
        serde_json::from_str::<Value>(&response.body).unwrap(),
        json!({"name": "donavon"})
    );
    assert!(response.header("etag").is_some());
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert!(response.header("lambdog").is_some());
}

#[tokio::test]
async fn test_etag_replay_is_304() {
    let app = with_json_handler(handler(echo), LambdogConfig::default());
    let first = app.call(get_event()).await;
    let etag = first.header("etag").unwrap().to_string();

    let second = app
        .call(get_event().with_header("If-None-Match", etag))
        .await;
    assert_eq!(second.status_code, 304);
    assert_eq!(second.body, "");
    assert!(second.header("lambdog").is_some());
    assert!(second.header("etag").is_none());
}

#[tokio::test]
async fn test_identical_results_share_etag() {
    let app = with_json_handler(
        sync_handler(|_, _| Ok(Some(json!({"fixed": true})))),
        LambdogConfig::default(),
    );
    let a = app.call(Event::new("GET", "/a")).await;
    let b = app.call(Event::new("GET", "/b").with_query("x", "1")).await;
    assert_eq!(a.header("etag"), b.header("etag"));
}

#[tokio::test]
async fn test_no_result_is_204() {
    let app = with_json_handler(sync_handler(|_, _| Ok(None)), LambdogConfig::default());
    let response = app.call(get_event()).await;
    assert_eq!(response.status_code, 204);
    assert_eq!(response.body, "");
    assert!(response.header("lambdog").is_some());
    assert!(response.header("etag").is_none());
}

#[tokio::test]
async fn test_path_to_props_after_netlify_prefix() {
    let app = with_json_handler(
        handler(echo),
        LambdogConfig::new().path_to_props("x/:name2/:namex").max_age(1000),
    );
    let event = Event::new("GET", "/.netlify/functions/function-name/x/bar")
        .with_query("name", "donavon");
    let response = app.call(event).await;

    assert_eq!(
        serde_json::from_str::<Value>(&response.body).unwrap(),
        json!({"name": "donavon", "name2": "bar"})
    );
    assert_eq!(response.header("cache-control"), Some("max-age=1000"));
}

#[tokio::test]
async fn test_handler_sees_params_and_event() {
    let app = with_json_handler(
        sync_handler(|_, args| {
            Ok(Some(json!({
                "params": args.params,
                "method": args.event.http_method,
                "path": args.event.path,
            })))
        }),
        LambdogConfig::new().path_to_props(":id"),
    );
    let response = app
        .call(Event::new("GET", "/.netlify/functions/fn/42"))
        .await;
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["params"], json!({"id": "42"}));
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/.netlify/functions/fn/42");
}

#[tokio::test]
async fn test_post_json_body_merges_and_skips_cache_headers() {
    let app = with_json_handler(
        handler(echo),
        LambdogConfig::new().path_to_props(":name2").max_age(1000),
    );
    let event = Event::new("POST", "/.netlify/functions/function-name/bar")
        .with_header("content-type", "application/json")
        .with_query("name", "donavon")
        .with_body(r#"{"name3":"Jill"}"#);
    let response = app.call(event).await;

    assert_eq!(
        response.body,
        r#"{"name":"donavon","name2":"bar","name3":"Jill"}"#
    );
    assert!(response.header("cache-control").is_none());
    assert!(response.header("etag").is_none());
}

#[tokio::test]
async fn test_post_form_body() {
    let app = with_json_handler(handler(echo), LambdogConfig::new().path_to_props(":name2"));
    let event = Event::new("POST", "/.netlify/functions/function-name/bar")
        .with_header("content-type", "application/x-www-form-urlencoded")
        .with_query("name", "donavon")
        .with_body("name3=Jill&name4=Bob%20Smith");
    let response = app.call(event).await;

    assert_eq!(
        response.body,
        r#"{"name":"donavon","name2":"bar","name3":"Jill","name4":"Bob Smith"}"#
    );
}

#[tokio::test]
async fn test_path_beats_query_beats_body() {
    let app = with_json_handler(handler(echo), LambdogConfig::new().path_to_props(":who"));
    let event = Event::new("POST", "/path")
        .with_header("content-type", "application/json")
        .with_query("who", "query")
        .with_query("what", "query")
        .with_body(r#"{"who":"body","what":"body","when":"body"}"#);
    let response = app.call(event).await;

    assert_eq!(
        serde_json::from_str::<Value>(&response.body).unwrap(),
        json!({"who": "path", "what": "query", "when": "body"})
    );
}

#[tokio::test]
async fn test_base64_event_body() {
    let app = with_json_handler(handler(echo), LambdogConfig::default());
    let mut event = Event::new("POST", "/")
        .with_header("content-type", "application/x-www-form-urlencoded")
        .with_body("YT0x");
    event.is_base64_encoded = true;

    let response = app.call(event).await;
    assert_eq!(response.body, r#"{"a":"1"}"#);
}

#[tokio::test]
async fn test_thrown_error_is_400_text_plain() {
    let app = with_json_handler(
        sync_handler(|_, _| Err(Error::handler("test").into())),
        LambdogConfig::default(),
    );
    let response = app.call(get_event()).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert!(response.body.starts_with("test"));
    assert!(response.header("lambdog").is_some());
}

#[tokio::test]
async fn test_thrown_error_in_production_hides_trace() {
    let app = with_json_handler(
        sync_handler(|_, _| Err(Error::with_trace("test", "at handler").into())),
        LambdogConfig::new().production(true),
    );
    let response = app.call(get_event()).await;
    assert_eq!(response.body, "test");
}

#[tokio::test]
async fn test_thrown_literal_defaults() {
    let app = with_json_handler(
        sync_handler(|_, _| Err(PartialResponse::new().header("x-foo", "bar").into())),
        LambdogConfig::default(),
    );
    let response = app.call(get_event()).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(response.body, "");
    assert_eq!(response.header("x-foo"), Some("bar"));
    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert!(response.header("lambdog").is_some());
}

#[tokio::test]
async fn test_thrown_literal_overrides_status_and_body() {
    let app = with_json_handler(
        sync_handler(|_, _| Err(Failure::status(1000, "foo"))),
        LambdogConfig::default(),
    );
    let response = app.call(get_event()).await;
    assert_eq!(response.status_code, 1000);
    assert_eq!(response.body, "foo");
}

#[tokio::test]
async fn test_thrown_literal_headers_win_over_defaults() {
    let app = with_json_handler(
        sync_handler(|_, _| {
            Err(PartialResponse::new()
                .status(418)
                .header("Content-Type", "application/problem+json")
                .header("lambdog", "custom")
                .into())
        }),
        LambdogConfig::default(),
    );
    let response = app.call(get_event()).await;
    assert_eq!(response.status_code, 418);
    assert_eq!(response.header("content-type"), Some("application/problem+json"));
    assert_eq!(response.header("lambdog"), Some("custom"));
}

#[tokio::test]
async fn test_custom_encoder_and_content_type() {
    let encoder: ContentEncoder = std::sync::Arc::new(|result: Option<&Value>| {
        Ok(match result {
            Some(value) => Encoded::body(format!("<pre>{}</pre>", value))
                .with_status(201)
                .with_header("x-encoder", "html"),
            None => Encoded::default(),
        })
    });
    let app = with_handler(
        sync_handler(|_, _| Ok(Some(json!(1)))),
        LambdogConfig::new()
            .content_encoder(encoder)
            .content_type("text/html"),
    );
    let response = app.call(Event::new("GET", "/")).await;
    assert_eq!(response.status_code, 201);
    assert_eq!(response.body, "<pre>1</pre>");
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert_eq!(response.header("x-encoder"), Some("html"));
}

#[tokio::test]
async fn test_wrapper_middleware_locals_reach_handler() {
    let app = with_json_handler(
        sync_handler(|_, args| Ok(args.request.locals.get("requestId").cloned())),
        LambdogConfig::new().middleware(RequestIdMiddleware),
    );
    let response = app
        .call(Event::new("GET", "/").with_header("X-Request-Id", "req-1"))
        .await;
    assert_eq!(response.body, r#""req-1""#);
}

#[tokio::test]
async fn test_wrapper_middleware_rejection() {
    let app = with_json_handler(
        handler(echo),
        LambdogConfig::new().middleware(AllowMethods::new(["GET"])),
    );
    let response = app.call(Event::new("PUT", "/")).await;
    assert_eq!(response.status_code, 405);
    assert_eq!(response.header("allow"), Some("GET"));
    assert!(response.header("lambdog").is_some());
}

#[test]
fn test_event_deserializes_platform_shape() {
    let event: Event = serde_json::from_value(json!({
        "httpMethod": "GET",
        "path": "/foo",
        "headers": null,
        "queryStringParameters": {"name": "donavon"},
        "isBase64Encoded": false
    }))
    .unwrap();

    assert_eq!(event.http_method, "GET");
    assert!(event.headers.is_empty());
    assert_eq!(event.body, None);

    let response = tokio_test::block_on(
        with_json_handler(handler(echo), LambdogConfig::default()).call(event),
    );
    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire["statusCode"], 200);
    assert_eq!(wire["isBase64Encoded"], false);
}
