use caffa_core::{Arguments, MethodOutput, ObjectError, ProxyObject, Session, Value};
use fake_server::{FakeServer, connect};
use serde_json::{Value as Json, json};
use std::sync::Arc;


fn server() -> FakeServer {
    FakeServer::demo()
        .with_document("", json!({ "keyword": "DemoObject", "uuid": "obj-uuid" }))
        .with_object("obj-uuid", json!({ "intField": 1 }))
        .with_method("echoArguments", |_| Ok(json!({})))
        .with_method("copyValues", |_| Ok(Json::Null))
        .with_method("adopt", |_| Ok(Json::Null))
        .with_method("sum", |arguments| {
            let values = arguments["positionalArguments"]
                .as_array()
                .ok_or("expected positional arguments")?;
            let sum: i64 = values.iter().filter_map(Json::as_i64).sum();
            Ok(json!({ "value": sum }))
        })
        .with_method("clone", |_| {
            Ok(json!({ "keyword": "DemoObject", "intField": 5, "stringField": "copy" }))
        })
}

async fn open(server: &Arc<FakeServer>) -> (Session, ProxyObject) {
    let session = connect(server).await;
    let object = session.document("").await.unwrap().into_object();
    (session, object)
}

#[tokio::test]
async fn test_labelled_and_positional_payloads() {
    let server = Arc::new(server());
    let (mut session, object) = open(&server).await;
    let method = object.method("echoArguments").unwrap();

    let labelled = method
        .payload(&Arguments::labelled([
            ("intArgument", Value::from(41)),
            ("stringArgument", Value::from("A")),
        ]))
        .await
        .unwrap();
    assert_eq!(
        labelled,
        json!({ "labelledArguments": { "intArgument": 41, "stringArgument": "A" } })
    );

    let positional = method
        .payload(&Arguments::positional([Value::from(41), Value::from("A")]))
        .await
        .unwrap();
    assert_eq!(positional, json!({ "positionalArguments": [41, "A"] }));

    method
        .call(Arguments::labelled([("intArgument", 41)]))
        .await
        .unwrap();
    let requests = server.method_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "echoArguments");
    assert_eq!(requests[0].object.uuid, "obj-uuid");
    assert_eq!(
        requests[0].arguments,
        json!({ "labelledArguments": { "intArgument": 41, "stringArgument": null } })
    );

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_object_arguments_are_sent_as_json() {
    let server = Arc::new(server());
    let (mut session, object) = open(&server).await;
    let child = session
        .factory()
        .create("DemoObject", [("intField", Value::from(7)), ("stringField", Value::from("child"))])
        .await
        .unwrap();
    let child_json = child.to_json().await.unwrap();
    assert_eq!(child_json["keyword"], "DemoObject");
    assert_eq!(child_json["intField"], 7);

    let method = object.method("adopt").unwrap();
    method
        .call(Arguments::labelled([
            ("child", Value::from(child.clone())),
            ("label", Value::from("first")),
        ]))
        .await
        .unwrap();
    method
        .call(Arguments::positional([Value::from(child), Value::from("second")]))
        .await
        .unwrap();

    let requests = server.method_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].arguments,
        json!({ "labelledArguments": { "child": child_json.clone(), "label": "first" } })
    );
    assert_eq!(
        requests[1].arguments,
        json!({ "positionalArguments": [child_json, "second"] })
    );

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_arguments_from_json() {
    let server = Arc::new(server());
    let (mut session, object) = open(&server).await;
    let method = object.method("echoArguments").unwrap();

    let labelled = method
        .arguments_from_json(&json!({ "stringArgument": "A", "intArgument": 41 }))
        .await
        .unwrap();
    assert_eq!(
        method.payload(&labelled).await.unwrap(),
        json!({ "labelledArguments": { "intArgument": 41, "stringArgument": "A" } })
    );

    let positional = method.arguments_from_json(&json!([41, "A"])).await.unwrap();
    assert_eq!(
        positional,
        Arguments::Positional(vec![Value::Int(41), Value::from("A")])
    );

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_arguments_fail_before_any_request() {
    let server = Arc::new(server());
    let (mut session, object) = open(&server).await;

    let result = object
        .method("echoArguments")
        .unwrap()
        .call(Arguments::labelled([("bogus", 1)]))
        .await;
    assert!(matches!(
        result,
        Err(ObjectError::UnknownArgument { argument, .. }) if argument == "bogus"
    ));

    let result = object
        .method("sum")
        .unwrap()
        .call(Arguments::positional([1, 2, 3]))
        .await;
    assert!(matches!(result, Err(ObjectError::UnknownArgument { .. })));

    assert!(matches!(
        object.method("missing"),
        Err(ObjectError::UnknownMethod { .. })
    ));
    assert_eq!(server.calls("execute_method"), 0);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_results_without_value_are_void() {
    let server = Arc::new(server());
    let (mut session, object) = open(&server).await;

    let echoed = object
        .method("echoArguments")
        .unwrap()
        .call(Arguments::None)
        .await
        .unwrap();
    assert!(echoed.is_none());

    let copied = object
        .method("copyValues")
        .unwrap()
        .call(Arguments::labelled([("intValue", 1)]))
        .await
        .unwrap();
    assert!(copied.is_none());

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_declared_return_types_are_decoded() {
    let server = Arc::new(server());
    let (mut session, object) = open(&server).await;

    let output = object
        .method("sum")
        .unwrap()
        .call(Arguments::positional([41, 42]))
        .await
        .unwrap();
    assert_eq!(output, Some(MethodOutput::Value(Value::Int(83))));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_object_results_are_local_snapshots() {
    let server = Arc::new(server());
    let (mut session, object) = open(&server).await;

    let output = object
        .method("clone")
        .unwrap()
        .call(Arguments::None)
        .await
        .unwrap()
        .unwrap();
    let snapshot = output.into_object().unwrap();

    assert!(snapshot.is_local());
    assert_eq!(snapshot.keyword(), "DemoObject");
    assert_eq!(snapshot.get("intField").await.unwrap(), Value::Int(5));

    snapshot.set("intField", 6).await.unwrap();
    assert_eq!(server.calls("set_field"), 0);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_server_failures_carry_the_server_detail() {
    let server = Arc::new(server().with_method("sum", |_| Err("division by zero".to_string())));
    let (mut session, object) = open(&server).await;

    let result = object
        .method("sum")
        .unwrap()
        .call(Arguments::positional([1, 0]))
        .await;
    assert!(matches!(
        result,
        Err(ObjectError::ExecutionFailed { method, detail }) if method == "sum" && detail == "division by zero"
    ));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_local_objects_cannot_call_methods() {
    let server = Arc::new(server());
    let (mut session, _) = open(&server).await;

    let local = session
        .factory()
        .create("DemoObject", [("intField", 1)])
        .await
        .unwrap();
    let result = local.method("sum").unwrap().call(Arguments::None).await;

    assert!(matches!(result, Err(ObjectError::Detached(keyword)) if keyword == "DemoObject"));
    assert_eq!(server.calls("execute_method"), 0);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_listing_methods_from_the_server() {
    let server = Arc::new(server().with_listed_method(json!({
        "name": "reset",
        "positionalArguments": { "items": [{ "type": "bool" }] }
    })));
    let (mut session, object) = open(&server).await;

    let methods = object.list_methods().await.unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "reset");
    assert_eq!(methods[0].positional.as_ref().map(Vec::len), Some(1));

    let declared: Vec<String> = object.methods().map(|m| m.name().to_string()).collect();
    assert_eq!(declared, vec!["adopt", "clone", "copyValues", "echoArguments", "sum"]);

    session.close().await.unwrap();
}
