//! The same scripted server, observed through every delivery style.
//!
//! Each scenario runs once per style (futures, callbacks, streams) and
//! asserts that all three report the same payload or the same `ApiError`.

use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt};
use tokio::runtime::Handle;
use todos_api::{
    ApiError, AsyncTodosApi, CallbackTodosApi, HttpMethod, Pipeline, Policy, ScriptedTransport,
    StreamTodosApi, Todo, TodoClient, TodoInput, TransportError, TransportErrorKind,
};

const ORIGIN: &str = "http://localhost:3000";

fn pipeline(transport: &Arc<ScriptedTransport>) -> Pipeline {
    Pipeline::new(TodoClient::new(ORIGIN), transport.clone())
}

fn item(id: i64, title: &str) -> String {
    format!(r#"{{"data":{{"id":{id},"title":"{title}","is_done":false}},"message":null}}"#)
}

fn list(titles: &[&str]) -> String {
    let data: Vec<String> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| format!(r#"{{"id":{},"title":"{title}"}}"#, i + 1))
        .collect();
    format!(r#"{{"data":[{}],"meta":null,"message":null}}"#, data.join(","))
}

/// Run `$call` against an api of each style and collect the three results.
macro_rules! every_style {
    ($pipeline:expr, |$api:ident| $call:expr) => {{
        let pipeline: Pipeline = $pipeline;
        let futures = {
            let $api = AsyncTodosApi::futures(pipeline.clone());
            $call.await
        };
        let callbacks = {
            let $api = CallbackTodosApi::callbacks(pipeline.clone(), Handle::current());
            $call.wait().await.expect("completion never ran")
        };
        let streams = {
            let $api = StreamTodosApi::streams(pipeline.clone());
            let mut items = $call;
            items.next().await.expect("stream ended without an item")
        };
        [futures, callbacks, streams]
    }};
}

fn titles(todos: &[Todo]) -> Vec<&str> {
    todos.iter().filter_map(|todo| todo.title.as_deref()).collect()
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unauthorized_in_every_style() {
    let transport = Arc::new(ScriptedTransport::new().respond(HttpMethod::Get, "/todos", 401, ""));
    for result in every_style!(pipeline(&transport), |api| api.fetch_todos(1)) {
        assert_eq!(result, Err(ApiError::Unauthorized));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_list_is_no_content_in_every_style() {
    let transport = Arc::new(ScriptedTransport::new().respond(
        HttpMethod::Get,
        "/todos",
        200,
        r#"{"data":[],"meta":null,"message":null}"#,
    ));
    for result in every_style!(pipeline(&transport), |api| api.fetch_todos(1)) {
        assert_eq!(result, Err(ApiError::NoContent));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn item_204_is_no_content_in_every_style() {
    let transport = Arc::new(ScriptedTransport::new().respond(HttpMethod::Delete, "/todos/5", 204, ""));
    for result in every_style!(pipeline(&transport), |api| api.delete_todo(5)) {
        assert_eq!(result, Err(ApiError::NoContent));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_json_is_decoding_in_every_style() {
    let transport = Arc::new(ScriptedTransport::new().respond(HttpMethod::Get, "/todos/1", 200, "{not json"));
    let [futures, callbacks, streams] = every_style!(pipeline(&transport), |api| api.fetch_todo(1));
    assert!(matches!(futures, Err(ApiError::Decoding(_))));
    assert_eq!(futures, callbacks);
    assert_eq!(futures, streams);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn transport_failure_keeps_its_cause_in_every_style() {
    let transport = Arc::new(ScriptedTransport::new().fail(
        HttpMethod::Get,
        "/todos/1",
        TransportErrorKind::Timeout,
        "deadline elapsed",
    ));
    let cause = TransportError::new(TransportErrorKind::Timeout, "deadline elapsed");
    for result in every_style!(pipeline(&transport), |api| api.fetch_todo(1)) {
        assert_eq!(result, Err(ApiError::Unknown(cause.clone())));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn successful_payload_is_identical_in_every_style() {
    let transport = Arc::new(ScriptedTransport::new().respond(
        HttpMethod::Get,
        "/todos/search",
        200,
        &list(&["Buy milk", "Buy bread"]),
    ));
    let [futures, callbacks, streams] =
        every_style!(pipeline(&transport), |api| api.search_todos("buy", 1));
    let page = futures.unwrap();
    assert_eq!(titles(page.data.as_deref().unwrap()), vec!["Buy milk", "Buy bread"]);
    assert_eq!(callbacks.unwrap(), page);
    assert_eq!(streams.unwrap(), page);
}

// ---------------------------------------------------------------------------
// Fallback variants
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn or_empty_substitutes_in_every_style() {
    let transport = Arc::new(ScriptedTransport::new().respond(HttpMethod::Get, "/todos", 500, ""));
    for todos in every_style!(pipeline(&transport), |api| api.fetch_todos_or_empty(1)) {
        assert!(todos.is_empty());
    }
    for todo in every_style!(pipeline(&transport), |api| api.fetch_todo_or_none(1)) {
        assert!(todo.is_none());
    }
}

// ---------------------------------------------------------------------------
// Chaining
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn add_then_fetch_returns_first_page() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(HttpMethod::Post, "/todos", 201, &item(2, "New"))
            .respond(HttpMethod::Get, "/todos", 200, &list(&["New", "Old"])),
    );
    for result in every_style!(pipeline(&transport), |api| {
        api.add_todo_and_fetch_todos(TodoInput::new("New"))
    }) {
        assert_eq!(titles(&result.unwrap()), vec!["New", "Old"]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_create_never_fetches() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(HttpMethod::Post, "/todos", 422, "")
            .respond(HttpMethod::Get, "/todos", 200, &list(&["Old"])),
    );
    for result in every_style!(pipeline(&transport), |api| {
        api.add_todo_and_fetch_todos(TodoInput::new("   "))
    }) {
        assert_eq!(result, Err(ApiError::BadStatus(422)));
    }
    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|call| call.method == HttpMethod::Post));

    for todos in every_style!(pipeline(&transport), |api| {
        api.add_todo_and_fetch_todos_or_empty(TodoInput::new("   "))
    }) {
        assert!(todos.is_empty());
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

fn one_two_three(second_status: u16) -> Arc<ScriptedTransport> {
    Arc::new(
        ScriptedTransport::new()
            .respond(HttpMethod::Get, "/todos/1", 200, &item(1, "one"))
            .respond(HttpMethod::Get, "/todos/2", second_status, "")
            .respond(HttpMethod::Get, "/todos/3", 200, &item(3, "three")),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn best_effort_drops_the_failed_id_in_every_style() {
    let transport = one_two_three(500);
    for result in every_style!(pipeline(&transport), |api| {
        api.fetch_selected_todos(vec![1, 2, 3], Policy::BestEffort)
    }) {
        let mut todos = result.unwrap();
        todos.sort_by_key(|todo| todo.id);
        assert_eq!(titles(&todos), vec!["one", "three"]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fail_fast_reports_the_single_call_error() {
    let transport = one_two_three(500);
    let single = AsyncTodosApi::futures(pipeline(&transport))
        .fetch_todo(2)
        .await
        .unwrap_err();
    for result in every_style!(pipeline(&transport), |api| {
        api.fetch_selected_todos(vec![1, 2, 3], Policy::FailFast)
    }) {
        assert_eq!(result, Err(single.clone()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_ids_issue_no_calls_in_any_style() {
    let transport = one_two_three(500);
    for policy in [Policy::FailFast, Policy::BestEffort] {
        for result in every_style!(pipeline(&transport), |api| {
            api.fetch_selected_todos(Vec::new(), policy)
        }) {
            assert_eq!(result, Ok(Vec::new()));
        }
        for result in every_style!(pipeline(&transport), |api| {
            api.delete_selected_todos(Vec::new(), policy)
        }) {
            assert_eq!(result, Ok(Vec::new()));
        }
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delete_selected_returns_confirmed_ids() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(HttpMethod::Delete, "/todos/1", 200, &item(1, "one"))
            .respond(HttpMethod::Delete, "/todos/2", 404, ""),
    );
    for result in every_style!(pipeline(&transport), |api| {
        api.delete_selected_todos(vec![1, 2], Policy::BestEffort)
    }) {
        assert_eq!(result, Ok(vec![1]));
    }
}

// ---------------------------------------------------------------------------
// Stream-only operators
// ---------------------------------------------------------------------------

#[tokio::test]
async fn merged_fan_out_yields_in_completion_order() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond_after(
                Duration::from_millis(100),
                HttpMethod::Get,
                "/todos/1",
                200,
                &item(1, "slow"),
            )
            .respond(HttpMethod::Get, "/todos/3", 200, &item(3, "fast")),
    );
    let api = StreamTodosApi::streams(pipeline(&transport));
    let todos: Vec<Todo> = api
        .fetch_selected_todos_merged(vec![1, 3], Policy::FailFast)
        .map(|result| result.unwrap())
        .collect()
        .await;
    assert_eq!(titles(&todos), vec!["fast", "slow"]);
}

#[tokio::test]
async fn merged_fail_fast_stops_after_the_error() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(HttpMethod::Get, "/todos/1", 401, "")
            .respond_after(
                Duration::from_millis(100),
                HttpMethod::Get,
                "/todos/2",
                200,
                &item(2, "late"),
            ),
    );
    let api = StreamTodosApi::streams(pipeline(&transport));
    let items: Vec<_> = api
        .fetch_selected_todos_merged(vec![1, 2], Policy::FailFast)
        .collect()
        .await;
    assert_eq!(items, vec![Err(ApiError::Unauthorized)]);
}

#[tokio::test]
async fn merged_delete_skips_failures_under_best_effort() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(HttpMethod::Delete, "/todos/1", 500, "")
            .respond(HttpMethod::Delete, "/todos/2", 200, &item(2, "two")),
    );
    let api = StreamTodosApi::streams(pipeline(&transport));
    let ids: Vec<_> = api
        .delete_selected_todos_merged(vec![1, 2], Policy::BestEffort)
        .collect()
        .await;
    assert_eq!(ids, vec![Ok(2)]);
}

#[tokio::test]
async fn newer_create_supersedes_pending_fetch() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(HttpMethod::Post, "/todos", 201, &item(1, "created"))
            .respond_after(
                Duration::from_millis(50),
                HttpMethod::Get,
                "/todos",
                200,
                &list(&["second", "first"]),
            ),
    );
    let api = StreamTodosApi::streams(pipeline(&transport));
    let inputs = stream::iter(vec![TodoInput::new("first"), TodoInput::new("second")]);
    let pages: Vec<Vec<Todo>> = api.add_todos_and_fetch_latest(inputs).collect().await;

    assert_eq!(pages.len(), 1);
    assert_eq!(titles(&pages[0]), vec!["second", "first"]);
    let posts = transport
        .calls()
        .iter()
        .filter(|call| call.method == HttpMethod::Post)
        .count();
    assert_eq!(posts, 2);
}

#[tokio::test]
async fn failed_create_in_chain_becomes_empty_list() {
    let transport = Arc::new(ScriptedTransport::new().respond(HttpMethod::Post, "/todos", 500, ""));
    let api = StreamTodosApi::streams(pipeline(&transport));
    let pages: Vec<Vec<Todo>> = api
        .add_todos_and_fetch_latest(stream::iter(vec![TodoInput::new("x")]))
        .collect()
        .await;
    assert_eq!(pages, vec![Vec::<Todo>::new()]);
}
