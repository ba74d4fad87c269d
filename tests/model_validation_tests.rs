use chrono::Utc;
use inkpost::models::{
    self, Post, Role, TITLE_MAX_LEN, UpdatePostRequest, User, normalize_email,
};
use uuid::Uuid;

// --- Serialization Shape Tests ---

#[test]
fn serialized_user_never_contains_credentials() {
    let user = User {
        id: Uuid::new_v4(),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        role: Role::Admin,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let json = serde_json::to_value(&user).unwrap();
    let object = json.as_object().unwrap();
    assert!(!object.contains_key("password"));
    assert!(!object.contains_key("password_hash"));
    assert_eq!(object["role"], "admin");
}

#[test]
fn role_serializes_lowercase_and_rejects_unknown_values() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);

    assert_eq!(Role::parse("admin"), Some(Role::Admin));
    assert_eq!(Role::parse("user"), Some(Role::User));
    // Out-of-enum values must be rejected, not defaulted.
    assert_eq!(Role::parse("superadmin"), None);
    assert_eq!(Role::parse("Admin"), None);
    assert_eq!(Role::parse(""), None);
}

#[test]
fn post_omits_author_fields_when_author_is_gone() {
    let post = Post {
        id: Uuid::new_v4(),
        title: "Orphaned".to_string(),
        content: "The author row was deleted".to_string(),
        author: Uuid::new_v4(),
        author_name: None,
        author_email: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let json = serde_json::to_value(&post).unwrap();
    let object = json.as_object().unwrap();
    assert!(!object.contains_key("author_name"));
    assert!(!object.contains_key("author_email"));
    // The raw author id reference survives the deletion.
    assert!(object.contains_key("author"));
}

#[test]
fn partial_update_omits_unset_fields() {
    let update = UpdatePostRequest {
        title: Some("New".to_string()),
        content: None,
    };

    let json = serde_json::to_value(&update).unwrap();
    let object = json.as_object().unwrap();
    assert!(object.contains_key("title"));
    assert!(!object.contains_key("content"));
}

// --- Validation Tests ---

#[test]
fn title_length_boundaries() {
    assert!(models::validate_title(&"x".repeat(TITLE_MAX_LEN)).is_ok());
    assert!(models::validate_title(&"x".repeat(TITLE_MAX_LEN + 1)).is_err());
    assert!(models::validate_title("").is_err());
    assert!(models::validate_title("   ").is_err());
    // Length counts characters, not bytes.
    assert!(models::validate_title(&"é".repeat(TITLE_MAX_LEN)).is_ok());
}

#[test]
fn content_must_not_be_blank() {
    assert!(models::validate_content("hello").is_ok());
    assert!(models::validate_content("").is_err());
    assert!(models::validate_content(" \n\t ").is_err());
}

#[test]
fn email_normalization_trims_and_lowercases() {
    assert_eq!(normalize_email("  Alice@Example.COM  "), "alice@example.com");
    assert_eq!(normalize_email("bob@site.org"), "bob@site.org");
}

#[test]
fn email_shape_validation() {
    assert!(models::validate_email("a@b.co").is_ok());
    assert!(models::validate_email("no-at-sign").is_err());
    assert!(models::validate_email("@missing-local.com").is_err());
    assert!(models::validate_email("missing-domain@").is_err());
    assert!(models::validate_email("no-dot@domain").is_err());
}

#[test]
fn password_minimum_length() {
    assert!(models::validate_password("123456").is_ok());
    assert!(models::validate_password("12345").is_err());
    assert!(models::validate_password("").is_err());
}

#[test]
fn name_must_not_be_blank() {
    assert!(models::validate_name("Alice").is_ok());
    assert!(models::validate_name("  ").is_err());
}
