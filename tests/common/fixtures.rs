use predata::catalog::{privileges_for, Acl, MetadataMap, ObjectMetadata, ObjectType};

/// Grantee holding every privilege that applies to `object_type`.
pub fn default_acl_for_type(grantee: &str, object_type: ObjectType) -> Acl {
    let mut acl = Acl::new(grantee);
    for privilege in privileges_for(object_type) {
        acl.grant(*privilege);
    }
    acl
}

/// Same as [`default_acl_for_type`], with the grant option on everything.
pub fn default_acl_for_type_with_grant(grantee: &str, object_type: ObjectType) -> Acl {
    let mut acl = Acl::new(grantee);
    for privilege in privileges_for(object_type) {
        acl.grant_with_option(*privilege);
    }
    acl
}

pub fn default_metadata(
    object_type: ObjectType,
    has_privileges: bool,
    has_owner: bool,
    has_comment: bool,
) -> ObjectMetadata {
    let mut metadata = ObjectMetadata::default();
    if has_privileges {
        metadata.privileges = vec![default_acl_for_type("testrole", object_type)];
    }
    if has_owner {
        metadata.owner = "testrole".to_string();
    }
    if has_comment {
        metadata.comment = format!("This is a {} comment.", object_type.to_string().to_lowercase());
    }
    metadata
}

/// Metadata for OID 1.
pub fn default_metadata_map(
    object_type: ObjectType,
    has_privileges: bool,
    has_owner: bool,
    has_comment: bool,
) -> MetadataMap {
    [(1, default_metadata(object_type, has_privileges, has_owner, has_comment))]
        .into_iter()
        .collect()
}
