use pretty_assertions::assert_eq;
use serde_json::json;
use tzindex_demos::Package;
use tzindex_hasura::{generate, HasuraError};
use tzindex_tests::{defaults::SCHEMA, fixtures::token_registry};

#[test]
fn test_token_holder_relationships() {
    let metadata = generate(&token_registry(Some("tokens")), &[], SCHEMA).unwrap();

    assert_eq!(
        serde_json::to_value(&metadata).unwrap(),
        json!({
            "version": 2,
            "tables": [
                {
                    "table": {"schema": "public", "name": "token"},
                    "object_relationships": [
                        {"name": "holder", "using": {"foreign_key_constraint_on": "holder_id"}}
                    ],
                    "array_relationships": [],
                    "select_permissions": [
                        {
                            "role": "user",
                            "permission": {"columns": "*", "filter": {}, "allow_aggregations": true}
                        }
                    ]
                },
                {
                    "table": {"schema": "public", "name": "account"},
                    "object_relationships": [],
                    "array_relationships": [
                        {
                            "name": "tokens",
                            "using": {
                                "foreign_key_constraint_on": {
                                    "column": "holder_id",
                                    "table": {"schema": "public", "name": "token"}
                                }
                            }
                        }
                    ],
                    "select_permissions": [
                        {
                            "role": "user",
                            "permission": {"columns": "*", "filter": {}, "allow_aggregations": true}
                        }
                    ]
                }
            ]
        })
    );
}

#[test]
fn test_missing_related_name_is_a_configuration_error() {
    let err = generate(&token_registry(None), &[], SCHEMA).unwrap_err();
    assert!(matches!(err, HasuraError::ConfigurationError(_)));
}

#[test]
fn test_package_metadata_counts() {
    for package in [Package::Tzcolors, Package::Hicdex] {
        let registry = package.registry();
        let views = vec!["holder_stats".to_string()];
        let metadata = generate(&registry, &views, SCHEMA).unwrap();

        let mut names = metadata
            .tables
            .iter()
            .map(|t| t.table.name.clone())
            .collect::<Vec<_>>();
        assert_eq!(names.len(), registry.concrete().count() + 1);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), registry.concrete().count() + 1);

        let foreign_keys = registry
            .concrete()
            .map(|m| m.foreign_keys().count())
            .sum::<usize>();
        let objects = metadata
            .tables
            .iter()
            .map(|t| t.object_relationships.len())
            .sum::<usize>();
        let arrays = metadata
            .tables
            .iter()
            .map(|t| t.array_relationships.len())
            .sum::<usize>();
        assert_eq!(objects, foreign_keys);
        assert_eq!(arrays, foreign_keys);
    }
}

#[test]
fn test_tzcolors_address_relationships() {
    let metadata = generate(&Package::Tzcolors.registry(), &[], SCHEMA).unwrap();
    let address = metadata.table(SCHEMA, "address").unwrap();

    let names = address
        .array_relationships
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["tokens", "winning_auctions", "created_auctions"]);

    let state = metadata.table(SCHEMA, "tzindex_state").unwrap();
    assert_eq!(state.select_permissions.len(), 1);
}
