#![allow(non_snake_case)]

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const OPENAPI_VERSION: &str = "3.0.0";

pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "multipart/form-data";

// Document-level attributes.
pub const ATTRIBUTE_TITLE: &str = "@title";
pub const ATTRIBUTE_VERSION: &str = "@version";
pub const ATTRIBUTE_DESCRIPTION: &str = "@description";
pub const ATTRIBUTE_TOS_URL: &str = "@termsofserviceurl";
pub const ATTRIBUTE_CONTACT_NAME: &str = "@contactname";
pub const ATTRIBUTE_CONTACT_EMAIL: &str = "@contactemail";
pub const ATTRIBUTE_CONTACT_URL: &str = "@contacturl";
pub const ATTRIBUTE_LICENSE_NAME: &str = "@licensename";
pub const ATTRIBUTE_LICENSE_URL: &str = "@licenseurl";
pub const ATTRIBUTE_SERVER: &str = "@server";
pub const ATTRIBUTE_SERVER_VARIABLE: &str = "@servervariable";
pub const ATTRIBUTE_SECURITY: &str = "@security";
pub const ATTRIBUTE_SECURITY_SCHEME: &str = "@securityscheme";
pub const ATTRIBUTE_SECURITY_SCOPE: &str = "@securityscope";
pub const ATTRIBUTE_EXTERNAL_DOC: &str = "@externaldoc";
pub const ATTRIBUTE_TAG: &str = "@tag";

// Operation-level attributes.
pub const ATTRIBUTE_HIDDEN: &str = "@hidden";
pub const ATTRIBUTE_PARAM: &str = "@param";
pub const ATTRIBUTE_SUCCESS: &str = "@success";
pub const ATTRIBUTE_FAILURE: &str = "@failure";
pub const ATTRIBUTE_HEADER: &str = "@header";
pub const ATTRIBUTE_ID: &str = "@id";
pub const ATTRIBUTE_RESOURCE: &str = "@resource";
pub const ATTRIBUTE_ROUTE: &str = "@route";
pub const ATTRIBUTE_ROUTER: &str = "@router";
pub const ATTRIBUTE_DEPRECATED_ROUTER: &str = "@deprecated-router";

pub const KEYWORD_REQUIRED: &str = "required";
pub const DEFAULT_FIELD_NAME: &str = "key";
pub const DEFAULT_TAG: &str = "others";

pub const GO_TYPE_TIME: &str = "time.Time";
pub const GO_TYPE_INTERFACE: &str = "interface{}";
pub const GO_TYPE_IGNORED: &str = "ignored";

pub const MESSAGE_INVALID_EXAMPLE: &str = "invalid example";

static BASIC_GO_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bool", "uint", "uint8", "uint16", "uint32", "uint64", "int", "int8", "int16", "int32",
        "int64", "float32", "float64", "string", "complex64", "complex128", "byte", "rune",
        "uintptr", "error",
    ]
    .into_iter()
    .collect()
});

static GO_TYPES_OAS_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("bool", "boolean"),
        ("uint", "integer"),
        ("uint8", "integer"),
        ("uint16", "integer"),
        ("uint32", "integer"),
        ("uint64", "integer"),
        ("int", "integer"),
        ("int8", "integer"),
        ("int16", "integer"),
        ("int32", "integer"),
        ("int64", "integer"),
        ("float32", "number"),
        ("float64", "number"),
        ("string", "string"),
    ]
    .into_iter()
    .collect()
});

/// Checks whether a type name is one of Go's predeclared types.
pub fn is_basic_go_type(type_name: &str) -> bool {
    BASIC_GO_TYPES.contains(type_name)
}

/// Maps a predeclared Go type to its OpenAPI schema type, if it has one.
pub fn go_type_oas_type(type_name: &str) -> Option<&'static str> {
    GO_TYPES_OAS_TYPES.get(type_name).copied()
}

/// The schema ID for a (possibly package-qualified) type name is its bare name.
pub fn schema_object_id(type_name: &str) -> String {
    type_name
        .rsplit('.')
        .next()
        .unwrap_or(type_name)
        .to_string()
}

/// Prefixes a schema ID with the component-schemas reference path.
pub fn schema_ref_link(name: &str) -> String {
    if name.starts_with("#/components/schemas/") {
        name.replace('\\', "/")
    } else {
        format!("#/components/schemas/{}", name).replace('\\', "/")
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OpenApiObject {
    pub openapi: String,
    pub info: InfoObject,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub servers: Vec<ServerObject>,
    pub paths: BTreeMap<String, PathItemObject>,
    pub components: ComponentsObject,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<TagObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub externalDocs: Option<ExternalDocumentationObject>,
}

impl OpenApiObject {
    pub fn new() -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InfoObject {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub termsOfService: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseObject>,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactObject {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LicenseObject {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerObject {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub variables: BTreeMap<String, ServerVariableObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerVariableObject {
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty", default)]
    pub enum_values: Vec<String>,
    pub default: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathItemObject {
    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty", default)]
    pub ref_: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<OperationObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OperationObject {
    pub responses: BTreeMap<String, ResponseObject>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<ParameterObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requestBody: Option<RequestBodyObject>,
    #[serde(rename = "operationId", skip_serializing_if = "String::is_empty", default)]
    pub operationId: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub externalDocs: Option<ExternalDocumentationObject>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParameterObject {
    pub name: String,
    #[serde(rename = "in")]
    pub in_: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "is_false", default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaObject>,
    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty", default)]
    pub ref_: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceObject {
    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty", default)]
    pub ref_: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestBodyObject {
    pub content: BTreeMap<String, MediaTypeObject>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "is_false", default)]
    pub required: bool,
    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty", default)]
    pub ref_: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaTypeObject {
    pub schema: SchemaObject,
}

/// The central recursive schema node. A node is either a reference
/// (`ref_` set, structure empty) or a definition, never both; an example
/// overlay clears `ref_` to keep that invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaObject {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub pkg_name: String,
    #[serde(skip)]
    pub field_name: String,
    #[serde(skip)]
    pub disabled_field_names: HashSet<String>,

    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub type_: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub format: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub properties: IndexMap<String, SchemaObject>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaObject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multipleOf: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub exclusiveMinimum: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub exclusiveMaximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minLength: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxLength: Option<u64>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minItems: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxItems: Option<u64>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub uniqueItems: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minProperties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxProperties: Option<u64>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty", default)]
    pub enum_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub allOf: Vec<ReferenceObject>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub oneOf: Vec<ReferenceObject>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub anyOf: Vec<ReferenceObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<DiscriminatorObject>,

    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty", default)]
    pub ref_: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiscriminatorObject {
    pub propertyName: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseObject {
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub headers: BTreeMap<String, HeaderObject>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub content: BTreeMap<String, MediaTypeObject>,
    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty", default)]
    pub ref_: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HeaderObject {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub type_: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComponentsObject {
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub schemas: BTreeMap<String, SchemaObject>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub securitySchemes: BTreeMap<String, SecuritySchemeObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SecuritySchemeObject {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub scheme: String,
    #[serde(rename = "in", skip_serializing_if = "String::is_empty", default)]
    pub in_: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "String::is_empty", default)]
    pub openIdConnectUrl: String,
    #[serde(rename = "flows", skip_serializing_if = "Option::is_none")]
    pub flows: Option<SecuritySchemeOauthObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SecuritySchemeOauthObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<SecuritySchemeOauthFlowObject>,
    #[serde(rename = "authorizationCode", skip_serializing_if = "Option::is_none")]
    pub authorizationCode: Option<SecuritySchemeOauthFlowObject>,
    #[serde(rename = "password", skip_serializing_if = "Option::is_none")]
    pub resourceOwnerPassword: Option<SecuritySchemeOauthFlowObject>,
    #[serde(rename = "clientCredentials", skip_serializing_if = "Option::is_none")]
    pub clientCredentials: Option<SecuritySchemeOauthFlowObject>,
}

impl SecuritySchemeOauthObject {
    /// Copies a scope map onto every flow the scheme declares.
    pub fn apply_scopes(&mut self, scopes: &BTreeMap<String, String>) {
        for flow in [
            &mut self.implicit,
            &mut self.authorizationCode,
            &mut self.resourceOwnerPassword,
            &mut self.clientCredentials,
        ]
        .into_iter()
        .flatten()
        {
            flow.scopes = scopes.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SecuritySchemeOauthFlowObject {
    #[serde(rename = "authorizationUrl", skip_serializing_if = "String::is_empty", default)]
    pub authorizationUrl: String,
    #[serde(rename = "tokenUrl", skip_serializing_if = "String::is_empty", default)]
    pub tokenUrl: String,
    pub scopes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExternalDocumentationObject {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TagObject {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub externalDocs: Option<ExternalDocumentationObject>,
}
