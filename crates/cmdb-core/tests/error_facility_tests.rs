use cmdb_core::errors::{CmdbError, ExError, ExErrorKind};

#[test]
fn test_not_found_family_shares_kind() {
    let errors = vec![
        CmdbError::ObjectNotFound { object_id: 1 },
        CmdbError::TypeNotFound { type_id: 2 },
        CmdbError::UserNotFound { user_id: 3 },
        CmdbError::SectionNotFound {
            type_id: 2,
            section: "general".to_string(),
        },
    ];

    for err in errors {
        assert!(err.is_recoverable());
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
        assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    }
}

#[test]
fn test_access_denied_distinct_from_not_found() {
    let err = CmdbError::AccessDenied {
        type_id: 7,
        user_id: 3,
        permission: "read".to_string(),
    };
    assert!(err.is_access_denied());
    assert!(!err.is_recoverable());

    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::AccessDenied);
    assert_eq!(ex_err.entity_id(), Some("7"));
    assert!(ex_err.message().contains("read"));
}

#[test]
fn test_render_error_chains_source() {
    let err = CmdbError::Render {
        object_id: 100,
        cause: Box::new(CmdbError::Store {
            message: "connection reset".to_string(),
        }),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Render);
    assert_eq!(ex_err.entity_id(), Some("100"));
    let source = ex_err.source_error().unwrap();
    assert_eq!(source.kind(), ExErrorKind::Persistence);
    assert_eq!(source.message(), "connection reset");
}

#[test]
fn test_malformed_json_is_serialization_error() {
    let parsed: Result<cmdb_core::model::Type, _> = serde_json::from_str("{\"public_id\": ");
    let err: CmdbError = parsed.unwrap_err().into();
    assert!(matches!(err, CmdbError::Serialization { .. }));
}
