use caffa_core::{
    Array, Document, FieldType, ObjectError, ObjectFactory, ProxyObject, ScalarType, SchemaCache,
    Value,
};
use fake_server::{FakeServer, connect, demo_schemas};
use serde_json::json;
use std::sync::Arc;


fn offline_factory() -> Arc<ObjectFactory> {
    ObjectFactory::offline(SchemaCache::offline(demo_schemas()))
}

fn demo_server() -> FakeServer {
    FakeServer::demo()
        .with_document(
            "doc1",
            json!({ "keyword": "DemoDocument", "uuid": "doc-uuid", "id": "doc1" }),
        )
        .with_object(
            "doc-uuid",
            json!({
                "id": "doc1",
                "fileName": "demo.caffa",
                "demoObject": { "keyword": "DemoObject", "uuid": "obj-uuid" },
                "inheritedObjects": [
                    { "keyword": "InheritedDemoObject", "uuid": "inherited-1" },
                    { "keyword": "InheritedDemoObject", "uuid": "inherited-2" }
                ]
            }),
        )
        .with_object(
            "obj-uuid",
            json!({
                "doubleField": 2.5,
                "floatField": 0.5,
                "intField": 7,
                "boolField": true,
                "stringField": "hello",
                "intVector": [1, 2, 3],
                "floatVector": [],
                "doubleVector": [],
                "stringVector": ["a"]
            }),
        )
        .with_object("inherited-1", json!({ "childIntField": 64, "intField": 1 }))
        .with_object("inherited-2", json!({ "childIntField": 65, "intField": 2 }))
}

#[tokio::test]
async fn test_local_document_with_read_only_id() {
    let factory = offline_factory();
    let document = Document::new(
        factory
            .create("DemoDocument", [("id", "doc1")])
            .await
            .unwrap(),
    );

    assert_eq!(document.get("id").await.unwrap(), Value::from("doc1"));

    let result = document.set("id", "x").await;
    assert!(matches!(
        result,
        Err(ObjectError::ReadOnlyViolation { field, .. }) if field == "id"
    ));
    assert_eq!(document.id().await.unwrap().as_deref(), Some("doc1"));
}

#[tokio::test]
async fn test_objects_are_sealed() {
    let factory = offline_factory();
    let object = factory
        .create("DemoObject", [("intField", 1)])
        .await
        .unwrap();

    let result = object.set("notAField", 5).await;
    assert!(matches!(
        result,
        Err(ObjectError::UnknownField { keyword, field }) if keyword == "DemoObject" && field == "notAField"
    ));
    assert!(matches!(
        object.get("notAField").await,
        Err(ObjectError::UnknownField { .. })
    ));
    assert!(matches!(
        object.set("keyword", "Other").await,
        Err(ObjectError::ReadOnlyViolation { .. })
    ));

    assert_eq!(object.get("intField").await.unwrap(), Value::Int(1));
    assert_eq!(object.keyword(), "DemoObject");
    assert_eq!(object.get("keyword").await.unwrap(), Value::from("DemoObject"));

    let created = factory.create("DemoObject", [("bogus", 1)]).await;
    assert!(matches!(created, Err(ObjectError::UnknownField { .. })));
}

#[tokio::test]
async fn test_write_only_fields_cannot_be_read() {
    let object = offline_factory()
        .create("DemoObject", [("secret", "hunter2")])
        .await
        .unwrap();

    assert!(matches!(
        object.get("secret").await,
        Err(ObjectError::WriteOnlyViolation { .. })
    ));
    object.set("secret", "changed").await.unwrap();
}

#[tokio::test]
async fn test_values_round_trip_through_local_fields() {
    let object = offline_factory()
        .create("DemoObject", Vec::<(&str, Value)>::new())
        .await
        .unwrap();

    let cases = [
        ("intField", Value::Int(-41)),
        ("doubleField", Value::Float(3.25)),
        ("floatField", Value::Float(0.5)),
        ("boolField", Value::Bool(true)),
        ("stringField", Value::from("text")),
        ("intVector", Value::from(vec![1, -2, 3])),
        ("floatVector", Value::from(vec![0.5f32, 1.5])),
        ("doubleVector", Value::from(vec![0.25, 1e10])),
        ("stringVector", Value::from(vec!["a".to_string(), "b".to_string()])),
    ];

    for (name, value) in cases {
        object.set(name, value.clone()).await.unwrap();
        assert_eq!(object.get(name).await.unwrap(), value, "field {name}");
    }

    let json = object.to_json().await.unwrap();
    assert_eq!(json["keyword"], "DemoObject");
    assert_eq!(json["intVector"], json!([1, -2, 3]));
    assert!(json.get("uuid").is_none());
}

#[tokio::test]
async fn test_set_rejects_values_of_the_wrong_type() {
    let object = offline_factory()
        .create("DemoObject", [("intField", 3)])
        .await
        .unwrap();

    assert!(object.set("intField", "three").await.is_err());
    assert!(object.set("intVector", vec![1.5f64]).await.is_err());
    assert!(object.set("intField", i64::MAX).await.is_err());
    assert_eq!(object.get("intField").await.unwrap(), Value::Int(3));
}

#[tokio::test]
async fn test_nested_local_objects_are_reused() {
    let factory = offline_factory();
    let child = factory
        .create("DemoObject", [("intField", 9)])
        .await
        .unwrap();
    let document = factory
        .create("DemoDocument", [("demoObject", child.clone())])
        .await
        .unwrap();

    let first = document.get("demoObject").await.unwrap();
    let second = document.get("demoObject").await.unwrap();
    assert_eq!(first.as_object(), Some(&child));
    assert_eq!(first, second);

    child.set("intField", 10).await.unwrap();
    let json = document.to_json().await.unwrap();
    assert_eq!(json["demoObject"]["intField"], 10);
}

#[tokio::test]
async fn test_create_field_and_indexed_writes_on_local_objects() {
    let object = offline_factory()
        .create("DemoObject", [("intVector", vec![1, 2, 3])])
        .await
        .unwrap();

    object
        .create_field("extra", FieldType::Scalar(ScalarType::String), "added")
        .await
        .unwrap();
    assert_eq!(object.get("extra").await.unwrap(), Value::from("added"));
    object.set("extra", "changed").await.unwrap();
    assert_eq!(object.get_json("extra").await.unwrap(), json!("changed"));

    object.set_at("intVector", 20, 1).await.unwrap();
    assert_eq!(
        object.get("intVector").await.unwrap(),
        Value::Array(Array::Int32(vec![1, 20, 3]))
    );

    let result = object.set_at("intVector", 4, 3).await;
    assert!(matches!(
        result,
        Err(ObjectError::IndexOutOfBounds { index: 3, len: 3, .. })
    ));
}

#[tokio::test]
async fn test_create_field_cannot_redeclare_a_field() {
    let document = offline_factory()
        .create("DemoDocument", [("id", "doc1"), ("fileName", "a.caffa")])
        .await
        .unwrap();

    let result = document
        .create_field("id", FieldType::Scalar(ScalarType::String), "changed")
        .await;
    assert!(matches!(
        result,
        Err(ObjectError::ReadOnlyViolation { field, .. }) if field == "id"
    ));
    assert_eq!(document.get("id").await.unwrap(), Value::from("doc1"));

    let result = document
        .create_field("fileName", FieldType::Scalar(ScalarType::Int32), 3)
        .await;
    assert!(matches!(
        result,
        Err(ObjectError::FieldExists { field, .. }) if field == "fileName"
    ));
    assert_eq!(document.get("fileName").await.unwrap(), Value::from("a.caffa"));

    let result = document
        .create_field("uuid", FieldType::Scalar(ScalarType::String), "other")
        .await;
    assert!(matches!(result, Err(ObjectError::ReadOnlyViolation { .. })));
}

#[tokio::test]
async fn test_remote_document_reads_and_writes_through_the_server() {
    let server = Arc::new(demo_server());
    let mut session = connect(&server).await;

    let document = session.document("doc1").await.unwrap();
    assert!(!document.is_local());
    assert_eq!(document.uuid(), Some("doc-uuid"));
    assert_eq!(document.file_name().await.unwrap().as_deref(), Some("demo.caffa"));

    let object = document
        .get("demoObject")
        .await
        .unwrap()
        .as_object()
        .cloned()
        .unwrap();
    assert_eq!(object.get("intField").await.unwrap(), Value::Int(7));
    assert_eq!(object.get("floatField").await.unwrap(), Value::Float(0.5));
    assert_eq!(
        object.get("stringVector").await.unwrap(),
        Value::from(vec!["a".to_string()])
    );

    object.set("intField", 42).await.unwrap();
    assert_eq!(server.field("obj-uuid", "intField"), Some(json!(42)));
    assert_eq!(object.get("intField").await.unwrap(), Value::Int(42));

    object.set_at("intVector", 20, 1).await.unwrap();
    assert_eq!(server.field("obj-uuid", "intVector"), Some(json!([1, 20, 3])));

    object.set_json("stringField", &json!("from json")).await.unwrap();
    assert_eq!(server.field("obj-uuid", "stringField"), Some(json!("from json")));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_remote_children_are_materialized_once() {
    let server = Arc::new(demo_server());
    let mut session = connect(&server).await;
    let document = session.document("").await.unwrap();

    let first = document.get("inheritedObjects").await.unwrap();
    let reads = server.calls("get_field");
    let second = document.get("inheritedObjects").await.unwrap();

    assert_eq!(server.calls("get_field"), reads);
    assert_eq!(first, second);

    let children: &[ProxyObject] = first.as_objects().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[1].keyword(), "InheritedDemoObject");
    assert_eq!(children[1].get("childIntField").await.unwrap(), Value::Int(65));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_writing_a_remote_object_field_invalidates_the_cached_child() {
    let server = Arc::new(demo_server());
    let mut session = connect(&server).await;
    let document = session.document("doc1").await.unwrap();

    assert!(document.get("demoObject").await.unwrap().as_object().is_some());
    let reads = server.calls("get_field");

    document.set("demoObject", Value::Null).await.unwrap();
    assert_eq!(server.field("doc-uuid", "demoObject"), Some(json!(null)));

    assert!(document.get("demoObject").await.unwrap().is_null());
    assert_eq!(server.calls("get_field"), reads + 1);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_remote_objects_serialize_their_readable_fields() {
    let server = Arc::new(demo_server());
    let mut session = connect(&server).await;
    let document = session.document("doc1").await.unwrap();
    let object = document.get("demoObject").await.unwrap().as_object().cloned().unwrap();

    let json = object.to_json().await.unwrap();
    assert_eq!(json["keyword"], "DemoObject");
    assert_eq!(json["uuid"], "obj-uuid");
    assert_eq!(json["intVector"], json!([1, 2, 3]));
    assert!(json.get("secret").is_none());

    let created = object
        .create_field("extra", FieldType::Scalar(ScalarType::Int32), 1)
        .await;
    assert!(matches!(created, Err(ObjectError::RemoteFieldCreation { .. })));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_empty_object_arrays_read_from_an_array_stream() {
    let server = Arc::new(
        FakeServer::demo()
            .streaming_arrays()
            .with_document("", json!({ "keyword": "DemoDocument", "uuid": "doc-uuid" }))
            .with_object("doc-uuid", json!({ "inheritedObjects": [], "id": "doc1" })),
    );
    let mut session = connect(&server).await;
    let document = session.document("").await.unwrap();

    let children = document.get("inheritedObjects").await.unwrap();
    assert_eq!(children.as_objects().map(|objects| objects.len()), Some(0));

    session.close().await.unwrap();
}
