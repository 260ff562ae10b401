use caffa_core::{
    FieldType, ObjectFactory, ScalarType, SchemaCache, SchemaError, object::factory::Mode,
};
use fake_server::{FakeServer, connect, demo_schemas};
use serde_json::json;
use std::sync::Arc;


#[tokio::test]
async fn test_composed_schema_is_the_union_of_its_branches() {
    let server = Arc::new(FakeServer::demo());
    let mut session = connect(&server).await;

    let parent = session.schemas().schema_for("DemoObject").await.unwrap();
    let child = session
        .schemas()
        .schema_for("InheritedDemoObject")
        .await
        .unwrap();

    for name in parent.keys() {
        assert!(child.contains_key(name), "missing inherited property '{name}'");
    }
    assert!(child.contains_key("childIntField"));
    assert_eq!(child.len(), parent.len() + 1);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_schemas_are_fetched_once() {
    let server = Arc::new(FakeServer::demo());
    let mut session = connect(&server).await;

    session.factory().type_for("InheritedDemoObject").await.unwrap();
    let fetched = server.calls("schema");
    assert!(fetched >= 2);

    session.factory().type_for("InheritedDemoObject").await.unwrap();
    session
        .schemas()
        .schema_for("InheritedDemoObject")
        .await
        .unwrap();
    assert_eq!(server.calls("schema"), fetched);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_properties_keep_the_first_definition() {
    let schemas = SchemaCache::offline([(
        "Conflicted",
        json!({
            "allOf": [
                { "properties": { "value": { "type": "int32" } } },
                { "properties": { "value": { "type": "string" }, "other": { "type": "bool" } } }
            ]
        }),
    )]);

    let properties = schemas.schema_for("Conflicted").await.unwrap();
    assert_eq!(properties["value"], json!({ "type": "int32" }));
    assert!(properties.contains_key("other"));
}

#[tokio::test]
async fn test_missing_schema_is_an_error() {
    let schemas = SchemaCache::offline(demo_schemas());

    let result = schemas.schema_for("Nonexistent").await;
    assert!(matches!(result, Err(SchemaError::SchemaNotFound(location)) if location.ends_with("/Nonexistent")));
}

#[tokio::test]
async fn test_unresolved_type_fails_type_synthesis() {
    let factory = ObjectFactory::offline(SchemaCache::offline([(
        "Broken",
        json!({ "properties": { "blob": { "type": "binary" } } }),
    )]));

    let result = factory.type_for("Broken").await;
    assert!(matches!(
        result,
        Err(SchemaError::UnresolvedType { property, tag }) if property == "blob" && tag == "binary"
    ));
}

#[tokio::test]
async fn test_keywords() {
    let offline = SchemaCache::offline(demo_schemas());
    assert_eq!(
        offline.keywords().await.unwrap(),
        vec!["DemoDocument", "DemoObject", "InheritedDemoObject"]
    );

    let server = Arc::new(FakeServer::demo());
    let mut session = connect(&server).await;
    assert_eq!(
        session.schema_keywords().await.unwrap(),
        offline.keywords().await.unwrap()
    );
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_wire_id_overrides_the_schema_location() {
    let server = Arc::new(FakeServer::demo().with_schema_at(
        "#/components/plugin_schemas/DemoObject",
        json!({ "properties": { "pluginField": { "type": "uint32" } } }),
    ));
    let mut session = connect(&server).await;

    let object = session
        .factory()
        .materialize(
            &json!({
                "keyword": "DemoObject",
                "$id": "#/components/plugin_schemas/DemoObject",
                "pluginField": 3
            }),
            Mode::Local,
        )
        .await
        .unwrap();

    assert_eq!(
        object.descriptor().field("pluginField").unwrap().field_type,
        FieldType::Scalar(ScalarType::UInt32)
    );
    assert!(object.descriptor().field("intField").is_none());
    assert_eq!(object.get("pluginField").await.unwrap().as_u64(), Some(3));

    session.close().await.unwrap();
}
