use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::gosrc::{self, GoTypeDecl};
use crate::index::{GoSourceFile, PackageRecord};
use crate::models::*;

static PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([-\w]+)\s+(\w+)\s+([\w./\[\]{}]+)\s+(\w+)\s+"([^"]+)""#).unwrap()
});

static ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\w./\-{}]+)[^\[]+\[([^\]]+)").unwrap());

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([-\w]+)[\s]+"([^"]+)"[\s]*(?:([\w?&#/_:.]+)[\s]+"([^"]+)"|$)"#).unwrap()
});

static EXTERNAL_DOC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([\w?&#/_:.]+)[\s]+"([^"]+)""#).unwrap());

static SERVER_VARIABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([-\w]+)[\s]+"([^"]+)"[\s]*(?:"([^"]+)"(?:[\s]+"([\w,\d^"]+)"|$))"#).unwrap()
});

static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)""#).unwrap());

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Module(String),

    #[error("can not parse {kind} comment \"{text}\"")]
    DirectiveParse { kind: &'static str, text: String },

    #[error("can not find definition of {type_name}, current package {pkg_name}")]
    TypeNotFound { type_name: String, pkg_name: String },

    #[error("operationID {0} is already in use")]
    DuplicateOperationId(String),

    #[error("unable to find discriminator field: {property}, in schema: {schema_id}")]
    MissingDiscriminator { property: String, schema_id: String },

    #[error("unable to parse {tag} value: {value}")]
    TagValue { tag: &'static str, value: String },

    #[error("{0}")]
    Validation(String),
}

/// Splits one comment line into a lower-cased attribute keyword and its
/// raw value. Lines that carry no `@` keyword are not directives.
pub(crate) fn split_directive(line: &str) -> Option<(String, String)> {
    let comment = line.trim_start_matches('/').trim();
    let attribute = comment.split_whitespace().next()?;
    if !attribute.starts_with('@') {
        return None;
    }
    let value = comment[attribute.len()..].trim().to_string();
    Some((attribute.to_lowercase(), value))
}

fn is_hidden(comments: &[String]) -> bool {
    comments.iter().any(|line| {
        let comment = line.trim_start_matches('/').trim();
        comment
            .split_whitespace()
            .next()
            .map(|a| a.eq_ignore_ascii_case(ATTRIBUTE_HIDDEN))
            .unwrap_or(false)
    })
}

fn parse_external_doc_comment(comment: &str) -> Result<ExternalDocumentationObject, ParserError> {
    let caps = EXTERNAL_DOC_RE
        .captures(comment)
        .ok_or_else(|| ParserError::DirectiveParse {
            kind: "externaldoc",
            text: comment.to_string(),
        })?;
    Ok(ExternalDocumentationObject {
        url: caps[1].to_string(),
        description: caps[2].to_string(),
    })
}

fn parse_tag_comment(comment: &str) -> Result<TagObject, ParserError> {
    let caps = TAG_RE
        .captures(comment)
        .ok_or_else(|| ParserError::DirectiveParse {
            kind: "tag",
            text: comment.to_string(),
        })?;
    let mut tag = TagObject {
        name: caps[1].to_string(),
        description: caps[2].to_string(),
        externalDocs: None,
    };
    if let (Some(url), Some(desc)) = (caps.get(3), caps.get(4)) {
        tag.externalDocs = Some(ExternalDocumentationObject {
            url: url.as_str().to_string(),
            description: desc.as_str().to_string(),
        });
    }
    Ok(tag)
}

fn parse_route_comment(comment: &str) -> Result<(String, String), ParserError> {
    let caps = ROUTE_RE
        .captures(comment)
        .ok_or_else(|| ParserError::DirectiveParse {
            kind: "router",
            text: comment.to_string(),
        })?;
    Ok((caps[1].to_string(), caps[2].to_lowercase()))
}

/// Applies a `@ServerVariable` declaration to one server. Servers whose
/// URL does not carry the `{name}` placeholder are left untouched.
fn parse_server_variable_comment(
    comment: &str,
    server: &mut ServerObject,
) -> Result<(), ParserError> {
    let caps = SERVER_VARIABLE_RE
        .captures(comment)
        .ok_or_else(|| ParserError::DirectiveParse {
            kind: "servervariable",
            text: comment.to_string(),
        })?;
    let name = caps[1].to_string();
    if !server.url.contains(&format!("{{{}}}", name)) {
        return Ok(());
    }
    let mut variable = ServerVariableObject {
        default: caps[2].to_string(),
        description: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
        enum_values: Vec::new(),
    };
    if let Some(enums) = caps.get(4) {
        variable.enum_values = enums.as_str().split(',').map(str::to_string).collect();
    }
    server.variables.insert(name, variable);
    Ok(())
}

/// The parsing context. Owns every registry the indexes and the schema
/// resolver share; one instance per run.
pub struct Parser {
    pub(crate) module_path: PathBuf,
    pub(crate) module_name: String,
    pub(crate) main_file_path: PathBuf,
    pub(crate) handler_path: Option<PathBuf>,
    pub(crate) go_mod_file_path: PathBuf,
    pub(crate) go_mod_cache_path: PathBuf,

    pub openapi: OpenApiObject,

    pub(crate) known_pkgs: Vec<PackageRecord>,
    pub(crate) known_name_pkg: HashMap<String, usize>,
    pub(crate) known_path_pkg: HashMap<String, usize>,
    pub(crate) known_id_schema: HashMap<String, SchemaObject>,
    pub(crate) known_operation_ids: Vec<String>,

    pub(crate) type_specs: HashMap<String, HashMap<String, GoTypeDecl>>,
    pub(crate) pkg_file_cache: HashMap<String, Vec<GoSourceFile>>,
    pub(crate) pkg_imported_aliases: HashMap<String, HashMap<String, Vec<String>>>,
}

impl Parser {
    pub fn new(
        module_path: impl AsRef<Path>,
        main_file_path: Option<&Path>,
        handler_path: Option<&Path>,
    ) -> Result<Self, ParserError> {
        let module_path = fs::canonicalize(module_path.as_ref())?;
        if !module_path.is_dir() {
            return Err(ParserError::Module(format!(
                "module path {} should be a directory",
                module_path.display()
            )));
        }

        let go_mod_file_path = module_path.join("go.mod");
        if !go_mod_file_path.is_file() {
            return Err(ParserError::Module(format!(
                "can not find go.mod in {}",
                module_path.display()
            )));
        }
        let go_mod = fs::read_to_string(&go_mod_file_path)?;
        let module_name = gosrc::module_name(&go_mod).ok_or_else(|| {
            ParserError::Module(format!(
                "can not get module name from {}",
                go_mod_file_path.display()
            ))
        })?;

        let main_file_path = match main_file_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ParserError::Module(format!(
                        "main file {} does not exist",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => Self::find_main_file(&module_path)?,
        };

        let go_path = std::env::var("GOPATH").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            format!("{}/go", home)
        });
        let go_mod_cache_path = PathBuf::from(go_path).join("pkg").join("mod");
        if !go_mod_cache_path.is_dir() {
            debug!(
                "module cache {} not found, dependency packages will be skipped",
                go_mod_cache_path.display()
            );
        }

        let handler_path = match handler_path {
            Some(path) => Some(fs::canonicalize(path)?),
            None => None,
        };

        debug!("module path: {}", module_path.display());
        debug!("module name: {}", module_name);
        debug!("main file path: {}", main_file_path.display());

        Ok(Self {
            module_path,
            module_name,
            main_file_path,
            handler_path,
            go_mod_file_path,
            go_mod_cache_path,
            openapi: OpenApiObject::new(),
            known_pkgs: Vec::new(),
            known_name_pkg: HashMap::new(),
            known_path_pkg: HashMap::new(),
            known_id_schema: HashMap::new(),
            known_operation_ids: Vec::new(),
            type_specs: HashMap::new(),
            pkg_file_cache: HashMap::new(),
            pkg_imported_aliases: HashMap::new(),
        })
    }

    fn find_main_file(module_path: &Path) -> Result<PathBuf, ParserError> {
        let mut names: Vec<PathBuf> = fs::read_dir(module_path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "go"))
            .collect();
        names.sort();
        for path in names {
            if let Ok(src) = fs::read_to_string(&path) {
                if gosrc::is_main_file(&src) {
                    return Ok(path);
                }
            }
        }
        Err(ParserError::Module(format!(
            "can not find main file under {}",
            module_path.display()
        )))
    }

    /// Runs the whole pipeline: document info, package and type indexes,
    /// then every operation comment block.
    pub fn create_document(&mut self) -> Result<(), ParserError> {
        let main_src = fs::read_to_string(&self.main_file_path)?;
        let main_info = gosrc::scan_file(&main_src);
        self.parse_info(&main_info.comment_blocks)?;

        self.parse_module()?;
        self.parse_go_mod()?;
        self.parse_import_statements()?;
        self.parse_type_specs()?;
        self.parse_paths()?;
        Ok(())
    }

    pub(crate) fn parse_info(&mut self, blocks: &[Vec<String>]) -> Result<(), ParserError> {
        // security scopes live at a different level than where they land
        // in the document, so they are collected first and applied after
        let mut oauth_scopes: HashMap<String, BTreeMap<String, String>> = HashMap::new();

        for block in blocks {
            for line in block {
                let Some((attribute, value)) = split_directive(line) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                match attribute.as_str() {
                    ATTRIBUTE_VERSION => self.openapi.info.version = value,
                    ATTRIBUTE_TITLE => self.openapi.info.title = value,
                    ATTRIBUTE_DESCRIPTION => self.openapi.info.description = value,
                    ATTRIBUTE_TOS_URL => self.openapi.info.termsOfService = value,
                    ATTRIBUTE_CONTACT_NAME => {
                        self.openapi.info.contact.get_or_insert_with(Default::default).name = value;
                    }
                    ATTRIBUTE_CONTACT_EMAIL => {
                        self.openapi.info.contact.get_or_insert_with(Default::default).email =
                            value;
                    }
                    ATTRIBUTE_CONTACT_URL => {
                        self.openapi.info.contact.get_or_insert_with(Default::default).url = value;
                    }
                    ATTRIBUTE_LICENSE_NAME => {
                        self.openapi.info.license.get_or_insert_with(Default::default).name =
                            value;
                    }
                    ATTRIBUTE_LICENSE_URL => {
                        self.openapi.info.license.get_or_insert_with(Default::default).url = value;
                    }
                    ATTRIBUTE_SERVER => {
                        let fields: Vec<&str> = value.split_whitespace().collect();
                        let server_url = fields[0];
                        // server variable placeholders are allowed through
                        if url::Url::parse(server_url).is_err() && !server_url.contains('{') {
                            return Err(ParserError::Validation(format!(
                                "server: \"{}\" is not a valid URL",
                                server_url
                            )));
                        }
                        self.openapi.servers.push(ServerObject {
                            url: server_url.to_string(),
                            description: value[server_url.len()..].trim().to_string(),
                            variables: BTreeMap::new(),
                        });
                    }
                    ATTRIBUTE_SECURITY => {
                        let fields: Vec<&str> = value.split_whitespace().collect();
                        let mut security = BTreeMap::new();
                        security.insert(
                            fields[0].to_string(),
                            fields[1..].iter().map(|s| s.to_string()).collect(),
                        );
                        self.openapi.security.push(security);
                    }
                    ATTRIBUTE_SECURITY_SCHEME => self.parse_security_scheme(&value)?,
                    ATTRIBUTE_SECURITY_SCOPE => {
                        let fields: Vec<&str> = value.split_whitespace().collect();
                        if fields.len() >= 2 {
                            oauth_scopes
                                .entry(fields[0].to_string())
                                .or_default()
                                .insert(fields[1].to_string(), fields[2..].join(" "));
                        }
                    }
                    ATTRIBUTE_EXTERNAL_DOC => {
                        self.openapi.externalDocs = Some(parse_external_doc_comment(&value)?);
                    }
                    ATTRIBUTE_TAG => {
                        let tag = parse_tag_comment(&value)?;
                        self.openapi.tags.push(tag);
                    }
                    ATTRIBUTE_SERVER_VARIABLE => {
                        for server in &mut self.openapi.servers {
                            parse_server_variable_comment(&value, server)?;
                        }
                    }
                    _ => {}
                }
            }
        }

        for (name, scheme) in self.openapi.components.securitySchemes.iter_mut() {
            if scheme.type_ == "oauth2" {
                if let (Some(scopes), Some(flows)) = (oauth_scopes.get(name), scheme.flows.as_mut())
                {
                    flows.apply_scopes(scopes);
                }
            }
        }

        if self.openapi.info.title.is_empty() {
            return Err(ParserError::Validation(
                "info.title cannot not be empty".to_string(),
            ));
        }
        if self.openapi.info.version.is_empty() {
            return Err(ParserError::Validation(
                "info.version cannot not be empty".to_string(),
            ));
        }
        for (i, server) in self.openapi.servers.iter().enumerate() {
            if server.url.is_empty() {
                return Err(ParserError::Validation(format!(
                    "servers[{}].url cannot not be empty",
                    i
                )));
            }
        }

        Ok(())
    }

    // {key} http {scheme} [{name}] {description}
    // {key} apiKey {in} {name} {description}
    // {key} openIdConnect {connect_url} {description}
    // {key} oauth2AuthCode {auth_url} {token_url}
    // {key} oauth2Implicit {auth_url}
    // {key} oauth2ResourceOwnerCredentials {token_url}
    // {key} oauth2ClientCredentials {token_url}
    pub(crate) fn parse_security_scheme(&mut self, value: &str) -> Result<(), ParserError> {
        let parse_err = || ParserError::DirectiveParse {
            kind: "securityscheme",
            text: value.to_string(),
        };
        let fields: Vec<&str> = value.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(parse_err());
        }
        let key = fields[0].to_string();
        let kind = fields[1];

        // multiple oauth2 directives under one key accumulate flows
        let mut scheme = if kind.contains("oauth2") {
            self.openapi
                .components
                .securitySchemes
                .get(&key)
                .cloned()
                .unwrap_or_else(|| SecuritySchemeObject {
                    type_: "oauth2".to_string(),
                    flows: Some(SecuritySchemeOauthObject::default()),
                    ..Default::default()
                })
        } else {
            SecuritySchemeObject {
                type_: kind.to_string(),
                ..Default::default()
            }
        };

        match kind {
            "http" => {
                scheme.scheme = fields.get(2).ok_or_else(parse_err)?.to_string();
                if scheme.scheme == "bearer" {
                    scheme.description = fields[3..].join(" ");
                } else {
                    scheme.name = fields.get(3).ok_or_else(parse_err)?.to_string();
                    scheme.description = fields[4..].join(" ");
                }
            }
            "apiKey" => {
                scheme.in_ = fields.get(2).ok_or_else(parse_err)?.to_string();
                scheme.name = fields.get(3).ok_or_else(parse_err)?.to_string();
                scheme.description = fields[4..].join(" ");
            }
            "openIdConnect" => {
                scheme.openIdConnectUrl = fields.get(2).ok_or_else(parse_err)?.to_string();
                scheme.description = fields[3..].join(" ");
            }
            "oauth2AuthCode" => {
                let flows = scheme.flows.get_or_insert_with(Default::default);
                flows.authorizationCode = Some(SecuritySchemeOauthFlowObject {
                    authorizationUrl: fields.get(2).ok_or_else(parse_err)?.to_string(),
                    tokenUrl: fields.get(3).ok_or_else(parse_err)?.to_string(),
                    scopes: BTreeMap::new(),
                });
            }
            "oauth2Implicit" => {
                let flows = scheme.flows.get_or_insert_with(Default::default);
                flows.implicit = Some(SecuritySchemeOauthFlowObject {
                    authorizationUrl: fields.get(2).ok_or_else(parse_err)?.to_string(),
                    ..Default::default()
                });
            }
            "oauth2ResourceOwnerCredentials" => {
                let flows = scheme.flows.get_or_insert_with(Default::default);
                flows.resourceOwnerPassword = Some(SecuritySchemeOauthFlowObject {
                    tokenUrl: fields.get(2).ok_or_else(parse_err)?.to_string(),
                    ..Default::default()
                });
            }
            "oauth2ClientCredentials" => {
                let flows = scheme.flows.get_or_insert_with(Default::default);
                flows.clientCredentials = Some(SecuritySchemeOauthFlowObject {
                    tokenUrl: fields.get(2).ok_or_else(parse_err)?.to_string(),
                    ..Default::default()
                });
            }
            _ => return Err(parse_err()),
        }

        self.openapi.components.securitySchemes.insert(key, scheme);
        Ok(())
    }

    pub(crate) fn parse_paths(&mut self) -> Result<(), ParserError> {
        let pkgs: Vec<(String, String)> = self
            .known_pkgs
            .iter()
            .map(|p| (p.name.clone(), p.path.clone()))
            .collect();
        for (pkg_name, pkg_path) in pkgs {
            if !Path::new(&pkg_path).starts_with(&self.module_path) {
                continue;
            }
            if let Some(handler_path) = &self.handler_path {
                if !Path::new(&pkg_path).starts_with(handler_path) {
                    continue;
                }
            }
            let files = self.package_files(&pkg_path)?;
            for file in &files {
                for doc in &file.info.func_docs {
                    self.parse_operation(&pkg_path, &pkg_name, doc)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn parse_operation(
        &mut self,
        pkg_path: &str,
        pkg_name: &str,
        comments: &[String],
    ) -> Result<(), ParserError> {
        if is_hidden(comments) {
            return Ok(());
        }

        let mut operation = OperationObject::default();
        let mut routes: Vec<(String, String)> = Vec::new();

        for line in comments {
            let Some((attribute, value)) = split_directive(line) else {
                continue;
            };
            match attribute.as_str() {
                ATTRIBUTE_TITLE => operation.summary = value,
                ATTRIBUTE_DESCRIPTION => {
                    operation.description = if operation.description.is_empty() {
                        value
                    } else {
                        format!("{} {}", operation.description, value)
                    };
                }
                ATTRIBUTE_PARAM => {
                    self.parse_param_comment(pkg_path, pkg_name, &mut operation, &value)?;
                }
                ATTRIBUTE_SUCCESS | ATTRIBUTE_FAILURE => {
                    self.parse_response_comment(pkg_path, pkg_name, &mut operation, &value)?;
                }
                ATTRIBUTE_HEADER => {
                    Self::parse_response_header_comment(&mut operation, &value)?;
                }
                ATTRIBUTE_ID => {
                    self.validate_operation_id(&value)?;
                    operation.operationId = value;
                }
                ATTRIBUTE_EXTERNAL_DOC => {
                    operation.externalDocs = Some(parse_external_doc_comment(&value)?);
                }
                ATTRIBUTE_RESOURCE | ATTRIBUTE_TAG => {
                    let resource = if value.is_empty() {
                        DEFAULT_TAG.to_string()
                    } else {
                        value
                    };
                    if !operation.tags.contains(&resource) {
                        operation.tags.push(resource);
                    }
                }
                ATTRIBUTE_ROUTE | ATTRIBUTE_ROUTER => {
                    routes.push(parse_route_comment(&value)?);
                }
                ATTRIBUTE_DEPRECATED_ROUTER => {
                    operation.deprecated = true;
                    routes.push(parse_route_comment(&value)?);
                }
                ATTRIBUTE_SECURITY => {
                    if let Some(name) = value.split_whitespace().next() {
                        let mut security = BTreeMap::new();
                        security.insert(name.to_string(), Vec::new());
                        operation.security.push(security);
                    }
                }
                _ => {}
            }
        }

        for (path, method) in routes {
            let item = self.openapi.paths.entry(path).or_default();
            // unknown verbs leave the path entry in place with nothing attached
            match method.as_str() {
                "get" => item.get = Some(operation.clone()),
                "post" => item.post = Some(operation.clone()),
                "patch" => item.patch = Some(operation.clone()),
                "put" => item.put = Some(operation.clone()),
                "delete" => item.delete = Some(operation.clone()),
                "options" => item.options = Some(operation.clone()),
                "head" => item.head = Some(operation.clone()),
                "trace" => item.trace = Some(operation.clone()),
                _ => {}
            }
        }

        Ok(())
    }

    // {name}  {in}  {goType}  {required}  {description}
    // user    body  User      true        "Info of a user."
    // f       file  ignored   true        "Upload a file."
    pub(crate) fn parse_param_comment(
        &mut self,
        pkg_path: &str,
        pkg_name: &str,
        operation: &mut OperationObject,
        comment: &str,
    ) -> Result<(), ParserError> {
        let caps = PARAM_RE
            .captures(comment)
            .ok_or_else(|| ParserError::DirectiveParse {
                kind: "param",
                text: comment.to_string(),
            })?;
        let name = caps[1].to_string();
        let in_ = caps[2].to_string();
        let raw_type = caps[3].to_string();
        let go_type = gosrc::normalize_go_type(&raw_type);
        let required = matches!(
            caps[4].to_lowercase().as_str(),
            "true" | KEYWORD_REQUIRED
        );
        let description = caps[5].to_string();

        // `file`, `files`, `form`
        if in_ == "file" || in_ == "files" || in_ == "form" {
            if operation.requestBody.is_none() {
                let mut content = BTreeMap::new();
                content.insert(
                    CONTENT_TYPE_FORM.to_string(),
                    MediaTypeObject {
                        schema: SchemaObject {
                            type_: "object".to_string(),
                            ..Default::default()
                        },
                    },
                );
                operation.requestBody = Some(RequestBodyObject {
                    content,
                    required,
                    ..Default::default()
                });
            }
            let body = operation.requestBody.as_mut().unwrap();
            let schema = &mut body
                .content
                .get_mut(CONTENT_TYPE_FORM)
                .ok_or_else(|| ParserError::DirectiveParse {
                    kind: "param",
                    text: comment.to_string(),
                })?
                .schema;
            if in_ == "file" {
                schema.properties.insert(
                    name,
                    SchemaObject {
                        type_: "string".to_string(),
                        format: "binary".to_string(),
                        description,
                        ..Default::default()
                    },
                );
            } else if in_ == "files" {
                schema.properties.insert(
                    name,
                    SchemaObject {
                        type_: "array".to_string(),
                        description,
                        items: Some(Box::new(SchemaObject {
                            type_: "string".to_string(),
                            format: "binary".to_string(),
                            ..Default::default()
                        })),
                        ..Default::default()
                    },
                );
            } else if let Some(oas_type) = go_type_oas_type(&go_type) {
                schema.properties.insert(
                    name,
                    SchemaObject {
                        type_: oas_type.to_string(),
                        format: go_type.clone(),
                        description,
                        ..Default::default()
                    },
                );
            }
            return Ok(());
        }

        // `path`, `query`, `header`, `cookie`
        if in_ != "body" {
            let mut parameter = ParameterObject {
                name,
                in_: in_.clone(),
                description: description.clone(),
                required,
                ..Default::default()
            };
            if in_ == "path" {
                parameter.required = true;
            }
            if go_type == GO_TYPE_TIME {
                match self.parse_schema_object(pkg_path, pkg_name, "", &go_type) {
                    Ok(schema) => parameter.schema = Some(schema),
                    Err(err) => debug!("parse_param_comment cannot parse goType {}: {}", go_type, err),
                }
                operation.parameters.push(parameter);
            } else if let Some(oas_type) = go_type_oas_type(&go_type) {
                parameter.schema = Some(SchemaObject {
                    type_: oas_type.to_string(),
                    format: go_type.clone(),
                    description,
                    ..Default::default()
                });
                operation.parameters.push(parameter);
            } else {
                debug!("parse_param_comment ignores non-basic {} param {}", in_, go_type);
            }
            return Ok(());
        }

        // `body`
        if operation.requestBody.is_none() {
            operation.requestBody = Some(RequestBodyObject {
                required,
                ..Default::default()
            });
        }
        let schema = if go_type.starts_with("[]")
            || go_type.starts_with("map[]")
            || go_type == GO_TYPE_TIME
        {
            match self.parse_schema_object(pkg_path, pkg_name, &name, &go_type) {
                Ok(schema) => schema,
                Err(err) => {
                    debug!("parse_param_comment cannot parse goType {}: {}", go_type, err);
                    SchemaObject::default()
                }
            }
        } else {
            let type_name = self.register_type(pkg_path, pkg_name, &go_type)?;
            if is_basic_go_type(&type_name) {
                SchemaObject {
                    type_: "string".to_string(),
                    ..Default::default()
                }
            } else if type_name.is_empty() {
                debug!("parse_param_comment could not resolve {}", go_type);
                SchemaObject::default()
            } else {
                SchemaObject {
                    ref_: schema_ref_link(&type_name),
                    ..Default::default()
                }
            }
        };
        operation
            .requestBody
            .as_mut()
            .unwrap()
            .content
            .insert(CONTENT_TYPE_JSON.to_string(), MediaTypeObject { schema });

        Ok(())
    }

    // {status}  [{jsonType}]  [{goType}]  "{description}"
    // 201       object        models.User "User Model"
    // 204 "No Content"
    pub(crate) fn parse_response_comment(
        &mut self,
        pkg_path: &str,
        pkg_name: &str,
        operation: &mut OperationObject,
        comment: &str,
    ) -> Result<(), ParserError> {
        let parse_err = || ParserError::DirectiveParse {
            kind: "response",
            text: comment.to_string(),
        };
        let description = QUOTED_RE
            .captures(comment)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        let head = comment.split('"').next().unwrap_or("").trim();
        let mut tokens = head.split_whitespace();
        let status = tokens.next().ok_or_else(parse_err)?;
        if status != "default" && status.parse::<u16>().is_err() {
            return Err(parse_err());
        }
        let rest: Vec<&str> = tokens.collect();
        let (json_type, go_type) = match rest.len() {
            0 => (None, None),
            1 => (Some(rest[0]), None),
            2 => (Some(rest[0]), Some(rest[1])),
            _ => return Err(parse_err()),
        };
        if let Some(json_type) = json_type {
            match json_type.trim_start_matches('{').trim_end_matches('}') {
                "object" | "array" => {}
                _ => return Err(parse_err()),
            }
        }

        let mut response = ResponseObject {
            description,
            ..Default::default()
        };

        if let Some(go_type_raw) = go_type {
            let go_type = gosrc::normalize_go_type(go_type_raw);
            if go_type.starts_with("[]") || go_type.starts_with("map[]") {
                match self.parse_schema_object(pkg_path, pkg_name, "", &go_type) {
                    Ok(schema) => {
                        response
                            .content
                            .insert(CONTENT_TYPE_JSON.to_string(), MediaTypeObject { schema });
                    }
                    Err(err) => {
                        debug!("parse_response_comment cannot parse goType {}: {}", go_type, err)
                    }
                }
            } else {
                let type_name = self.register_type(pkg_path, pkg_name, &go_type)?;
                if is_basic_go_type(&type_name) {
                    response.content.insert(
                        CONTENT_TYPE_TEXT.to_string(),
                        MediaTypeObject {
                            schema: SchemaObject {
                                type_: "string".to_string(),
                                ..Default::default()
                            },
                        },
                    );
                } else if type_name.is_empty() {
                    debug!("parse_response_comment could not resolve {}", go_type);
                } else {
                    response.content.insert(
                        CONTENT_TYPE_JSON.to_string(),
                        MediaTypeObject {
                            schema: SchemaObject {
                                ref_: schema_ref_link(&type_name),
                                ..Default::default()
                            },
                        },
                    );
                }
            }
        }

        operation.responses.insert(status.to_string(), response);
        Ok(())
    }

    // {status}  {name}  "{description}" accumulates headers on the
    // response for that status, creating it when absent.
    pub(crate) fn parse_response_header_comment(
        operation: &mut OperationObject,
        comment: &str,
    ) -> Result<(), ParserError> {
        let parse_err = || ParserError::DirectiveParse {
            kind: "header",
            text: comment.to_string(),
        };
        let description = QUOTED_RE
            .captures(comment)
            .map(|c| c[1].to_string())
            .ok_or_else(parse_err)?;
        let head = comment.split('"').next().unwrap_or("").trim();
        let mut tokens = head.split_whitespace();
        let status = tokens.next().ok_or_else(parse_err)?;
        if status != "default" && status.parse::<u16>().is_err() {
            return Err(parse_err());
        }
        let name = tokens.next().ok_or_else(parse_err)?;

        let response = operation.responses.entry(status.to_string()).or_default();
        response.headers.insert(
            name.to_string(),
            HeaderObject {
                type_: "string".to_string(),
                description,
            },
        );
        Ok(())
    }

    pub(crate) fn validate_operation_id(&mut self, id: &str) -> Result<(), ParserError> {
        if self.known_operation_ids.iter().any(|oid| oid == id) {
            return Err(ParserError::DuplicateOperationId(id.to_string()));
        }
        self.known_operation_ids.push(id.to_string());
        Ok(())
    }
}
