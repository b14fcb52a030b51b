//! Integration tests for policy documents and resource authorization.

use gatehouse_core::error::ErrorResponse;
use gatehouse_core::prelude::*;

use PermissionMode::{Create, Delete, Read, Update};

const STORE_POLICY: &str = r#"
[defaults.deny]
crud = ["banned"]

[resources.product.allow]
read = ["*"]
crud = ["staff"]

[resources.product.fields.cost.allow]
read = ["accountant"]

[resources.product.fields.cost.deny]
read = ["*"]

[resources.product.fields.name]

[resources.review.deny]
delete = ["customer"]
"#;

fn registry() -> ResourceRegistry {
    PolicyDocument::from_toml(STORE_POLICY)
        .expect("policy parses")
        .build()
        .expect("policy builds")
}

#[test]
fn test_defaults_apply_to_every_resource() {
    let registry = registry();
    let banned = Context::new(["staff", "banned"]);

    for name in ["product", "review"] {
        for mode in [Create, Read, Update, Delete] {
            assert!(registry.authorize(name, None, mode, &banned).is_err());
        }
    }
}

#[test]
fn test_public_read_with_staff_writes() {
    let registry = registry();

    assert!(registry.authorize("product", None, Read, &Context::anonymous()).is_ok());
    assert!(registry.authorize("product", None, Update, &Context::new(["customer"])).is_err());
    assert!(registry.authorize("product", None, Update, &Context::new(["staff"])).is_ok());
}

#[test]
fn test_field_wildcard_deny_hides_field_from_everyone() {
    let registry = registry();

    for roles in [vec!["staff"], vec!["accountant"], vec![]] {
        let err = registry
            .authorize("product", Some("cost"), Read, &Context::new(roles))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}

#[test]
fn test_field_without_rules_inherits_resource() {
    let registry = registry();

    assert!(registry
        .authorize("product", Some("name"), Update, &Context::new(["staff"]))
        .is_ok());
    assert!(registry
        .authorize("product", Some("name"), Update, &Context::new(["customer"]))
        .is_err());
}

#[test]
fn test_deny_only_resource() {
    let registry = registry();
    let customer = Context::new(["customer"]);

    assert!(registry.authorize("review", None, Create, &customer).is_ok());
    assert!(registry.authorize("review", None, Delete, &customer).is_err());
}

#[test]
fn test_forbidden_error_response() {
    let err = registry()
        .authorize("review", None, Delete, &Context::new(["customer"]))
        .unwrap_err();
    let response = ErrorResponse::from(&err);

    assert_eq!(err.http_status(), 403);
    assert_eq!(response.error.status, 403);
    assert_eq!(response.error.code, ErrorCode::Forbidden);
}

#[test]
fn test_unknown_resource_and_field() {
    let registry = registry();
    let ctx = Context::anonymous();

    assert_eq!(
        registry.authorize("invoice", None, Read, &ctx).unwrap_err().code(),
        ErrorCode::ResourceNotFound
    );
    assert_eq!(
        registry
            .authorize("product", Some("weight"), Read, &ctx)
            .unwrap_err()
            .code(),
        ErrorCode::ResourceNotFound
    );
}

#[test]
fn test_document_formats_build_the_same_registry() {
    let json = r#"{
        "resources": {
            "product": {
                "allow": {"read": ["*"], "crud": ["staff"]}
            }
        }
    }"#;
    let yaml = "resources:\n  product:\n    allow:\n      read: ['*']\n      crud: [staff]\n";

    let from_json = PolicyDocument::from_json(json).unwrap().build().unwrap();
    let from_yaml = PolicyDocument::from_yaml(yaml).unwrap().build().unwrap();

    assert_eq!(
        from_json.get("product").unwrap().permission(),
        from_yaml.get("product").unwrap().permission()
    );
}
