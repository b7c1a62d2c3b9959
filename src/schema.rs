//! Schema resolution: turns Go type names into recursive schema graphs.
//!
//! The one correctness-critical pattern here is pre-registration: a node
//! is entered into the by-ID memo before its fields are descended into,
//! so self-referential and mutually-referential types resolve to `$ref`
//! nodes instead of recursing forever.

use log::debug;
use serde_json::Value;

use crate::gosrc::{GoField, GoTypeDecl, StructTag, TypeShape};
use crate::models::*;
use crate::parser::{split_directive, Parser, ParserError};

fn coerce_example(field_type: &str, raw: &str) -> Value {
    match field_type {
        "boolean" => Value::Bool(raw.parse().unwrap_or_default()),
        "integer" => Value::from(raw.parse::<i64>().unwrap_or_default()),
        "number" => Value::from(raw.parse::<f64>().unwrap_or_default()),
        "array" => serde_json::from_str::<Vec<Value>>(raw)
            .map(Value::Array)
            .unwrap_or_else(|_| Value::String(MESSAGE_INVALID_EXAMPLE.to_string())),
        "object" => serde_json::from_str::<serde_json::Map<String, Value>>(raw)
            .map(Value::Object)
            .unwrap_or_else(|_| Value::String(MESSAGE_INVALID_EXAMPLE.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

fn coerce_number(
    field_type: &str,
    tag: &'static str,
    raw: &str,
) -> Result<Value, ParserError> {
    let err = || ParserError::TagValue {
        tag,
        value: raw.to_string(),
    };
    match field_type {
        "integer" => raw.parse::<i64>().map(Value::from).map_err(|_| err()),
        "number" => raw.parse::<f64>().map(Value::from).map_err(|_| err()),
        _ => Err(err()),
    }
}

fn parse_count(tag: &'static str, raw: &str) -> Result<u64, ParserError> {
    raw.parse::<u64>().map_err(|_| ParserError::TagValue {
        tag,
        value: raw.to_string(),
    })
}

impl Parser {
    /// Resolves a type name and returns its registry ID. Basic Go types
    /// come back as themselves; everything else is memoized by ID.
    pub(crate) fn register_type(
        &mut self,
        pkg_path: &str,
        pkg_name: &str,
        type_name: &str,
    ) -> Result<String, ParserError> {
        if is_basic_go_type(type_name) {
            return Ok(type_name.to_string());
        }
        let id = schema_object_id(type_name);
        if self.known_id_schema.contains_key(&id) {
            return Ok(id);
        }
        let schema = self.parse_schema_object(pkg_path, pkg_name, "", type_name)?;
        Ok(schema.id)
    }

    /// The resolver. Structural prefixes first, then scalar aliases, then
    /// symbol lookup; object shapes are pre-registered before their fields
    /// are parsed. A dotted name that cannot be located degrades to an
    /// empty schema (the unqualified miss in `find_type` stays fatal).
    pub(crate) fn parse_schema_object(
        &mut self,
        pkg_path: &str,
        pkg_name: &str,
        field_name: &str,
        type_name: &str,
    ) -> Result<SchemaObject, ParserError> {
        let mut schema = SchemaObject::default();

        if let Some(item_type) = type_name.strip_prefix("[]") {
            schema.type_ = "array".to_string();
            let item_id = schema_object_id(item_type);
            if self.known_id_schema.contains_key(&item_id) {
                schema.items = Some(Box::new(SchemaObject {
                    ref_: schema_ref_link(&item_id),
                    ..Default::default()
                }));
                return Ok(schema);
            }
            let items = self.parse_schema_object(pkg_path, pkg_name, field_name, item_type)?;
            schema.items = Some(Box::new(items));
            return Ok(schema);
        }

        if let Some(item_type) = type_name.strip_prefix("map[]") {
            schema.type_ = "object".to_string();
            let key = if field_name.is_empty() {
                DEFAULT_FIELD_NAME
            } else {
                field_name
            };
            let item_id = schema_object_id(item_type);
            if self.known_id_schema.contains_key(&item_id) {
                schema.properties.insert(
                    key.to_string(),
                    SchemaObject {
                        ref_: schema_ref_link(&item_id),
                        ..Default::default()
                    },
                );
                return Ok(schema);
            }
            let property = self.parse_schema_object(pkg_path, pkg_name, field_name, item_type)?;
            schema.properties.insert(key.to_string(), property);
            return Ok(schema);
        }

        if type_name == GO_TYPE_TIME {
            schema.type_ = "string".to_string();
            schema.format = "date-time".to_string();
            return Ok(schema);
        }
        if type_name.starts_with(GO_TYPE_INTERFACE) {
            return Ok(schema);
        }
        if let Some(oas_type) = go_type_oas_type(type_name) {
            schema.type_ = oas_type.to_string();
            return Ok(schema);
        }

        let parts: Vec<&str> = type_name.split('.').collect();
        let located = if parts.len() == 1 {
            match self.find_type(pkg_path, pkg_name, type_name) {
                Some(found) => found,
                None => {
                    return Err(ParserError::TypeNotFound {
                        type_name: type_name.to_string(),
                        pkg_name: pkg_name.to_string(),
                    })
                }
            }
        } else {
            match self.find_qualified_type(pkg_name, &parts) {
                Some(found) => found,
                None => {
                    debug!(
                        "can not find definition of {} in any known package",
                        type_name
                    );
                    return Ok(schema);
                }
            }
        };
        let (decl, found_pkg_name, found_pkg_path) = located;

        schema.pkg_name = found_pkg_name.clone();
        schema.id = schema_object_id(parts[parts.len() - 1]);

        // pre-registration: recursive references hit the memo and become
        // $ref nodes instead of re-entering this function
        let mut placeholder = schema.clone();
        placeholder.type_ = match &decl.shape {
            TypeShape::Struct(_) | TypeShape::Map(_) => "object".to_string(),
            TypeShape::Array(_) => "array".to_string(),
            _ => String::new(),
        };
        self.known_id_schema.insert(schema.id.clone(), placeholder);

        parse_schema_doc_comments(&decl.doc, &mut schema);

        match &decl.shape {
            TypeShape::Struct(fields) => {
                schema.type_ = "object".to_string();
                self.parse_schema_struct_fields(
                    &found_pkg_path,
                    &found_pkg_name,
                    &mut schema,
                    fields,
                )?;
            }
            TypeShape::Array(element) => {
                schema.type_ = "array".to_string();
                let mut items = SchemaObject::default();
                if !is_basic_go_type(element) {
                    let item_id =
                        self.register_type(&found_pkg_path, &found_pkg_name, element)?;
                    if !item_id.is_empty() {
                        items.ref_ = schema_ref_link(&item_id);
                    }
                } else if let Some(oas_type) = go_type_oas_type(element) {
                    items.type_ = oas_type.to_string();
                }
                schema.items = Some(Box::new(items));
            }
            TypeShape::Map(value) => {
                schema.type_ = "object".to_string();
                let key = if field_name.is_empty() {
                    DEFAULT_FIELD_NAME
                } else {
                    field_name
                };
                let mut property = SchemaObject::default();
                if !is_basic_go_type(value) {
                    let value_id = self.register_type(&found_pkg_path, &found_pkg_name, value)?;
                    if !value_id.is_empty() {
                        property.ref_ = schema_ref_link(&value_id);
                    }
                } else if let Some(oas_type) = go_type_oas_type(value) {
                    property.type_ = oas_type.to_string();
                }
                schema.properties.insert(key.to_string(), property);
            }
            // alias and interface declarations carry no structure of their own
            TypeShape::Alias(_) | TypeShape::Interface => {}
        }

        self.known_id_schema.insert(schema.id.clone(), schema.clone());
        if !self.openapi.components.schemas.contains_key(&schema.id) {
            self.openapi
                .components
                .schemas
                .insert(schema.id.clone(), schema.clone());
        }

        Ok(schema)
    }

    fn get_type_spec(&self, pkg_name: &str, type_name: &str) -> Option<&GoTypeDecl> {
        self.type_specs.get(pkg_name)?.get(type_name)
    }

    /// Precedence-ordered lookup for unqualified names: the current
    /// package wins, then every known package in registration order.
    fn find_type(
        &self,
        pkg_path: &str,
        pkg_name: &str,
        type_name: &str,
    ) -> Option<(GoTypeDecl, String, String)> {
        if let Some(decl) = self.get_type_spec(pkg_name, type_name) {
            return Some((decl.clone(), pkg_name.to_string(), pkg_path.to_string()));
        }
        for pkg in &self.known_pkgs {
            if let Some(decl) = self.get_type_spec(&pkg.name, type_name) {
                return Some((decl.clone(), pkg.name.clone(), pkg.path.clone()));
            }
        }
        None
    }

    /// Dotted-name lookup: guess the package by substring containment
    /// against known package names, then fall back to the current
    /// package's import-alias table (first candidate wins).
    fn find_qualified_type(
        &self,
        current_pkg_name: &str,
        parts: &[&str],
    ) -> Option<(GoTypeDecl, String, String)> {
        let guess_segment = parts[..parts.len() - 1].join("/");
        let type_name = parts[parts.len() - 1];

        for pkg in &self.known_pkgs {
            if pkg.name.contains(&guess_segment) {
                if let Some(decl) = self.get_type_spec(&pkg.name, type_name) {
                    return Some((decl.clone(), pkg.name.clone(), pkg.path.clone()));
                }
                break;
            }
        }

        let aliases = self.pkg_imported_aliases.get(current_pkg_name)?;
        let candidates = aliases.get(&guess_segment)?;
        let canonical = candidates.first()?;
        let index = self.known_name_pkg.get(canonical)?;
        let pkg = &self.known_pkgs[*index];
        let decl = self.get_type_spec(&pkg.name, type_name)?;
        Some((decl.clone(), pkg.name.clone(), pkg.path.clone()))
    }

    /// Resolves every member of a tag-declared union. Unlike parameter
    /// and body references, union members must resolve.
    fn resolve_union_members(
        &mut self,
        pkg_path: &str,
        pkg_name: &str,
        members: &str,
    ) -> Result<(Vec<ReferenceObject>, Vec<String>), ParserError> {
        let mut refs = Vec::new();
        let mut ids = Vec::new();
        for member in members.split(',').map(str::trim).filter(|m| !m.is_empty()) {
            let schema = self.parse_schema_object(pkg_path, pkg_name, "", member)?;
            if schema.id.is_empty() {
                return Err(ParserError::TypeNotFound {
                    type_name: member.to_string(),
                    pkg_name: pkg_name.to_string(),
                });
            }
            refs.push(ReferenceObject {
                ref_: schema_ref_link(&schema.id),
            });
            ids.push(schema.id);
        }
        Ok((refs, ids))
    }

    /// Populates an object schema from struct fields, overlaying the
    /// tag-sourced constraints in a fixed order: opt-out, naming and
    /// required, example, description, numeric bounds, pattern, lengths,
    /// item and property counts, enum, unions, discriminator.
    pub(crate) fn parse_schema_struct_fields(
        &mut self,
        pkg_path: &str,
        pkg_name: &str,
        struct_schema: &mut SchemaObject,
        fields: &[GoField],
    ) -> Result<(), ParserError> {
        'fields: for field in fields.iter().filter(|f| !f.names.is_empty()) {
            let type_name = field.type_name.clone();
            let mut field_schema = SchemaObject::default();
            // the resolved schema type steers example coercion and the
            // array/object-only constraint tags, even when the field
            // itself serializes as a bare $ref
            let mut resolved_type = String::new();

            if type_name.starts_with("[]")
                || type_name.starts_with("map[]")
                || type_name == GO_TYPE_TIME
                || type_name.starts_with(GO_TYPE_INTERFACE)
            {
                field_schema = self.parse_schema_object(pkg_path, pkg_name, "", &type_name)?;
                resolved_type = field_schema.type_.clone();
            } else if !is_basic_go_type(&type_name) {
                let id = self.register_type(pkg_path, pkg_name, &type_name)?;
                if id.is_empty() {
                    debug!("field {} type {} not resolved", field.names[0], type_name);
                } else {
                    field_schema.id = id.clone();
                    if let Some(known) = self.known_id_schema.get(&id) {
                        resolved_type = known.type_.clone();
                    }
                    field_schema.ref_ = schema_ref_link(&id);
                }
            } else if let Some(oas_type) = go_type_oas_type(&type_name) {
                field_schema.type_ = oas_type.to_string();
                resolved_type = oas_type.to_string();
            }

            let mut name = field.names[0].clone();
            field_schema.field_name = name.clone();
            if struct_schema.disabled_field_names.contains(&name) {
                continue;
            }

            if let Some(raw_tag) = &field.tag {
                let tag = StructTag::new(raw_tag);

                // opt-out markers win over everything else on the field
                if let Some(goas_tag) = tag.get("goas") {
                    if goas_tag.split(',').any(|v| v == "-") {
                        struct_schema.disabled_field_names.insert(name);
                        field_schema.deprecated = true;
                        continue 'fields;
                    }
                }
                let mut is_required = false;
                if let Some(json_tag) = tag.get("json") {
                    for value in json_tag.split(',') {
                        if value == "-" {
                            struct_schema.disabled_field_names.insert(name.clone());
                            field_schema.deprecated = true;
                            continue 'fields;
                        } else if value == KEYWORD_REQUIRED {
                            is_required = true;
                        } else if !value.is_empty() && value != "omitempty" {
                            name = value.to_string();
                        }
                    }
                }
                if tag.has(KEYWORD_REQUIRED) || is_required {
                    struct_schema.required.push(name.clone());
                }

                if let Some(example) = tag.get("example") {
                    field_schema.example = Some(coerce_example(&resolved_type, &example));
                    // an example and a $ref cannot be layered
                    if !field_schema.ref_.is_empty() {
                        field_schema.ref_.clear();
                    }
                }

                if let Some(description) = tag.get("description") {
                    field_schema.description = description;
                }

                if let Some(multiple_of) = tag.get("multipleOf") {
                    field_schema.multipleOf =
                        Some(coerce_number(&resolved_type, "multipleOf", &multiple_of)?);
                }
                if let Some(minimum) = tag.get("minimum") {
                    field_schema.minimum =
                        Some(coerce_number(&resolved_type, "minimum", &minimum)?);
                }
                if let Some(maximum) = tag.get("maximum") {
                    field_schema.maximum =
                        Some(coerce_number(&resolved_type, "maximum", &maximum)?);
                }
                if let Some(exclusive_min) = tag.get("exclusiveMinimum") {
                    field_schema.exclusiveMinimum = exclusive_min.parse().unwrap_or_default();
                }
                if let Some(exclusive_max) = tag.get("exclusiveMaximum") {
                    field_schema.exclusiveMaximum = exclusive_max.parse().unwrap_or_default();
                }

                if let Some(pattern) = tag.get("pattern") {
                    field_schema.pattern = pattern;
                }
                if let Some(min_length) = tag.get("minLength") {
                    field_schema.minLength = Some(parse_count("minLength", &min_length)?);
                }
                if let Some(max_length) = tag.get("maxLength") {
                    field_schema.maxLength = Some(parse_count("maxLength", &max_length)?);
                }

                if resolved_type == "array" {
                    if let Some(min_items) = tag.get("minItems") {
                        field_schema.minItems = Some(parse_count("minItems", &min_items)?);
                    }
                    if let Some(max_items) = tag.get("maxItems") {
                        field_schema.maxItems = Some(parse_count("maxItems", &max_items)?);
                    }
                    if let Some(unique) = tag.get("uniqueItems") {
                        field_schema.uniqueItems = unique.parse().unwrap_or_default();
                    }
                }

                if resolved_type == "object" {
                    if let Some(min_properties) = tag.get("minProperties") {
                        field_schema.minProperties =
                            Some(parse_count("minProperties", &min_properties)?);
                    }
                    if let Some(max_properties) = tag.get("maxProperties") {
                        field_schema.maxProperties =
                            Some(parse_count("maxProperties", &max_properties)?);
                    }
                }

                if let Some(enum_tag) = tag.get("enum") {
                    field_schema.enum_values = enum_tag
                        .trim()
                        .split(',')
                        .map(str::to_string)
                        .collect();
                }

                if let Some(all_of) = tag.get("allOf") {
                    let (refs, _) = self.resolve_union_members(pkg_path, pkg_name, &all_of)?;
                    field_schema.allOf = refs;
                }
                let mut one_of_ids = Vec::new();
                if let Some(one_of) = tag.get("oneOf") {
                    let (refs, ids) = self.resolve_union_members(pkg_path, pkg_name, &one_of)?;
                    field_schema.oneOf = refs;
                    one_of_ids = ids;
                }
                if let Some(any_of) = tag.get("anyOf") {
                    let (refs, _) = self.resolve_union_members(pkg_path, pkg_name, &any_of)?;
                    field_schema.anyOf = refs;
                }

                if let Some(property) = tag.get("discriminator") {
                    // every oneOf member must declare the property
                    for member_id in &one_of_ids {
                        let member_has_property = self
                            .known_id_schema
                            .get(member_id)
                            .map(|member| member.properties.contains_key(&property))
                            .unwrap_or(false);
                        if !member_has_property {
                            return Err(ParserError::MissingDiscriminator {
                                property,
                                schema_id: member_id.clone(),
                            });
                        }
                    }
                    field_schema.discriminator = Some(DiscriminatorObject {
                        propertyName: property,
                    });
                }
            }

            struct_schema.properties.insert(name, field_schema);
        }

        // embedded types merge their properties into the parent, skipping
        // names already present or explicitly disabled
        for field in fields.iter().filter(|f| f.names.is_empty()) {
            let type_name = &field.type_name;
            let embedded = if type_name.starts_with("[]")
                || type_name.starts_with("map[]")
                || type_name == GO_TYPE_TIME
                || type_name.starts_with(GO_TYPE_INTERFACE)
            {
                self.parse_schema_object(pkg_path, pkg_name, "", type_name)?
            } else if !is_basic_go_type(type_name) {
                let id = self.register_type(pkg_path, pkg_name, type_name)?;
                if id.is_empty() {
                    continue;
                }
                match self.known_id_schema.get(&id) {
                    Some(known) => known.clone(),
                    None => continue,
                }
            } else {
                continue;
            };
            for (property_name, property) in embedded.properties {
                if struct_schema
                    .disabled_field_names
                    .contains(&property.field_name)
                {
                    continue;
                }
                if struct_schema.properties.contains_key(&property_name) {
                    continue;
                }
                struct_schema.properties.insert(property_name, property);
            }
        }

        Ok(())
    }
}

/// Title and description directives inside a type's doc comment.
fn parse_schema_doc_comments(doc: &[String], schema: &mut SchemaObject) {
    for line in doc {
        let Some((attribute, value)) = split_directive(line) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match attribute.as_str() {
            ATTRIBUTE_TITLE => schema.title = value,
            ATTRIBUTE_DESCRIPTION => schema.description = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn parser_for(dir: &TempDir, models: &str) -> Parser {
        write_file(dir.path(), "go.mod", "module github.com/acme/sample\n\ngo 1.21\n");
        write_file(dir.path(), "main.go", "package main\n\nfunc main() {}\n");
        write_file(dir.path(), "models.go", models);
        let mut parser = Parser::new(dir.path(), None, None).unwrap();
        parser.parse_module().unwrap();
        parser.parse_import_statements().unwrap();
        parser.parse_type_specs().unwrap();
        parser
    }

    fn root_pkg(parser: &Parser) -> (String, String) {
        let pkg = &parser.known_pkgs[0];
        (pkg.path.clone(), pkg.name.clone())
    }

    #[test]
    fn test_resolve_simple_struct_with_property_order() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Fruit struct {
	Color   string `json:"color" example:"red"`
	HasSeed bool   `json:"has_seed"`
	Weight  int64  `json:"weight"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser.parse_schema_object(&path, &name, "", "Fruit").unwrap();

        assert_eq!(schema.type_, "object");
        assert_eq!(schema.id, "Fruit");
        let keys: Vec<&String> = schema.properties.keys().collect();
        assert_eq!(keys, vec!["color", "has_seed", "weight"]);
        assert_eq!(
            schema.properties["color"].example,
            Some(Value::String("red".to_string()))
        );
        assert!(parser.openapi.components.schemas.contains_key("Fruit"));
    }

    #[test]
    fn test_idempotent_resolution() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            "package main\n\ntype User struct {\n\tName string `json:\"name\"`\n}\n",
        );
        let (path, name) = root_pkg(&parser);
        let first = parser.parse_schema_object(&path, &name, "", "User").unwrap();
        let again = parser.register_type(&path, &name, "User").unwrap();

        assert_eq!(again, "User");
        assert_eq!(parser.openapi.components.schemas.len(), 1);
        assert_eq!(
            parser.openapi.components.schemas["User"].properties,
            first.properties
        );
    }

    #[test]
    fn test_self_referential_array_terminates() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Category struct {
	Name     string     `json:"name"`
	Children []Category `json:"children"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser
            .parse_schema_object(&path, &name, "", "Category")
            .unwrap();

        let children = &schema.properties["children"];
        assert_eq!(children.type_, "array");
        assert_eq!(
            children.items.as_ref().unwrap().ref_,
            "#/components/schemas/Category"
        );
        assert_eq!(parser.openapi.components.schemas.len(), 1);
    }

    #[test]
    fn test_mutually_referential_structs_terminate() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Author struct {
	Name  string `json:"name"`
	Posts []Post `json:"posts"`
}

type Post struct {
	Title  string `json:"title"`
	Author Author `json:"author"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        parser.parse_schema_object(&path, &name, "", "Author").unwrap();

        assert_eq!(parser.openapi.components.schemas.len(), 2);
        let post = &parser.openapi.components.schemas["Post"];
        assert_eq!(
            post.properties["author"].ref_,
            "#/components/schemas/Author"
        );
    }

    #[test]
    fn test_required_markers_apply_once() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Form struct {
	Name  string `json:"name,required" required:"true"`
	Email string `json:"email" required:"true"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser.parse_schema_object(&path, &name, "", "Form").unwrap();
        assert_eq!(schema.required, vec!["name", "email"]);
    }

    #[test]
    fn test_opt_out_short_circuits_other_tags() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Release struct {
	Version    string `json:"version"`
	Internal   string `json:"internal" goas:"-" minimum:"1"`
	Deprecated string `json:"deprecated,-"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        // minimum on a string field would be fatal; the opt-out must win
        let schema = parser
            .parse_schema_object(&path, &name, "", "Release")
            .unwrap();
        let keys: Vec<&String> = schema.properties.keys().collect();
        assert_eq!(keys, vec!["version"]);
    }

    #[test]
    fn test_numeric_tag_on_non_numeric_field_fails() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            "package main\n\ntype Bad struct {\n\tName string `json:\"name\" minimum:\"1\"`\n}\n",
        );
        let (path, name) = root_pkg(&parser);
        let err = parser.parse_schema_object(&path, &name, "", "Bad").unwrap_err();
        assert!(matches!(err, ParserError::TagValue { tag: "minimum", .. }));
    }

    #[test]
    fn test_constraint_tags_by_field_kind() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Citrus struct {
	Kind string `json:"kind"`
}

type Release struct {
	MultipleOf10 int64             `json:"multiple_of_10" multipleOf:"10"`
	RangeInt     int64             `json:"range_int" minimum:"1" maximum:"100" example:"3"`
	RangeFloat   float64           `json:"range_float" minimum:"0.01" maximum:"0.5"`
	Description  string            `json:"description" minLength:"30" maxLength:"255" exclusiveMinimum:"true" exclusiveMaximum:"true"`
	Version      string            `json:"version" pattern:"^v[0-9]+$"`
	Status       string            `json:"status" enum:"active,pending,disabled"`
	Fruit        []Citrus          `json:"fruit" minItems:"5" maxItems:"10" uniqueItems:"true"`
	Properties   map[string]Citrus `json:"properties" minProperties:"2" maxProperties:"5"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser
            .parse_schema_object(&path, &name, "", "Release")
            .unwrap();

        assert_eq!(schema.properties["multiple_of_10"].multipleOf, Some(Value::from(10)));
        assert_eq!(schema.properties["range_int"].minimum, Some(Value::from(1)));
        assert_eq!(schema.properties["range_int"].example, Some(Value::from(3)));
        assert_eq!(
            schema.properties["range_float"].maximum,
            Some(Value::from(0.5))
        );
        let description = &schema.properties["description"];
        assert_eq!(description.minLength, Some(30));
        assert_eq!(description.maxLength, Some(255));
        assert!(description.exclusiveMinimum);
        assert!(description.exclusiveMaximum);
        assert_eq!(schema.properties["version"].pattern, "^v[0-9]+$");
        assert_eq!(
            schema.properties["status"].enum_values,
            vec!["active", "pending", "disabled"]
        );
        let fruit = &schema.properties["fruit"];
        assert_eq!(fruit.minItems, Some(5));
        assert_eq!(fruit.maxItems, Some(10));
        assert!(fruit.uniqueItems);
        let properties = &schema.properties["properties"];
        assert_eq!(properties.minProperties, Some(2));
        assert_eq!(properties.maxProperties, Some(5));
    }

    #[test]
    fn test_one_of_with_valid_discriminator() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Citrus struct {
	Kind string `json:"kind"`
}

type Banana struct {
	Kind string `json:"kind"`
}

type FruitOneOfAKind struct {
	Kind interface{} `json:"kind" oneOf:"Citrus,Banana" discriminator:"kind"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser
            .parse_schema_object(&path, &name, "", "FruitOneOfAKind")
            .unwrap();

        let kind = &schema.properties["kind"];
        assert_eq!(
            kind.oneOf,
            vec![
                ReferenceObject { ref_: "#/components/schemas/Citrus".to_string() },
                ReferenceObject { ref_: "#/components/schemas/Banana".to_string() },
            ]
        );
        assert_eq!(
            kind.discriminator.as_ref().unwrap().propertyName,
            "kind"
        );
    }

    #[test]
    fn test_one_of_with_missing_discriminator_fails() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Citrus struct {
	Kind string `json:"kind"`
}

type Banana struct {
	Kind string `json:"kind"`
}

type FruitOneOfAKindInvalidDisc struct {
	Kind interface{} `json:"kind" oneOf:"Citrus,Banana" discriminator:"kindle"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let err = parser
            .parse_schema_object(&path, &name, "", "FruitOneOfAKindInvalidDisc")
            .unwrap_err();
        match err {
            ParserError::MissingDiscriminator { property, schema_id } => {
                assert_eq!(property, "kindle");
                assert_eq!(schema_id, "Citrus");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unqualified_miss_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(&dir, "package main\n");
        let (path, name) = root_pkg(&parser);
        let err = parser
            .parse_schema_object(&path, &name, "", "NoSuchType")
            .unwrap_err();
        assert!(matches!(err, ParserError::TypeNotFound { .. }));
    }

    #[test]
    fn test_qualified_miss_degrades_to_empty_schema() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(&dir, "package main\n");
        let (path, name) = root_pkg(&parser);
        let schema = parser
            .parse_schema_object(&path, &name, "", "unknownpkg.Missing")
            .unwrap();
        assert!(schema.id.is_empty());
        assert!(schema.type_.is_empty());
    }

    #[test]
    fn test_cross_package_resolution() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "go.mod", "module github.com/acme/sample\n\ngo 1.21\n");
        write_file(dir.path(), "main.go", "package main\n\nfunc main() {}\n");
        write_file(
            dir.path(),
            "store/widget.go",
            "package store\n\ntype Widget struct {\n\tLabel string `json:\"label\"`\n}\n",
        );
        let mut parser = Parser::new(dir.path(), None, None).unwrap();
        parser.parse_module().unwrap();
        parser.parse_import_statements().unwrap();
        parser.parse_type_specs().unwrap();
        let (path, name) = root_pkg(&parser);

        // unqualified fallback scan across all packages
        let by_scan = parser.parse_schema_object(&path, &name, "", "Widget").unwrap();
        assert_eq!(by_scan.pkg_name, "github.com/acme/sample/store");

        // dotted form guessed by substring containment
        let by_guess = parser
            .parse_schema_object(&path, &name, "", "store.Widget")
            .unwrap();
        assert_eq!(by_guess.id, "Widget");
    }

    #[test]
    fn test_embedded_struct_merges_properties() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Audit struct {
	CreatedAt string `json:"created_at"`
	UpdatedAt string `json:"updated_at"`
}

type Entity struct {
	Audit
	Name      string `json:"name"`
	CreatedAt string `json:"created_at" description:"overrides embedded"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser.parse_schema_object(&path, &name, "", "Entity").unwrap();

        let keys: Vec<&String> = schema.properties.keys().collect();
        assert_eq!(keys, vec!["name", "created_at", "updated_at"]);
        // the named field wins over the embedded property
        assert_eq!(
            schema.properties["created_at"].description,
            "overrides embedded"
        );
    }

    #[test]
    fn test_array_and_map_declarations() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Citrus struct {
	Kind string `json:"kind"`
}

type Names []string
type CitrusList []Citrus
type Ratings map[string]float64
"#,
        );
        let (path, name) = root_pkg(&parser);

        let names = parser.parse_schema_object(&path, &name, "", "Names").unwrap();
        assert_eq!(names.type_, "array");
        assert_eq!(names.items.as_ref().unwrap().type_, "string");

        let list = parser
            .parse_schema_object(&path, &name, "", "CitrusList")
            .unwrap();
        assert_eq!(
            list.items.as_ref().unwrap().ref_,
            "#/components/schemas/Citrus"
        );

        let ratings = parser
            .parse_schema_object(&path, &name, "items", "Ratings")
            .unwrap();
        assert_eq!(ratings.type_, "object");
        assert_eq!(ratings.properties["items"].type_, "number");
    }

    #[test]
    fn test_time_and_interface_fields() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Event struct {
	At      time.Time   `json:"at"`
	Payload interface{} `json:"payload"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser.parse_schema_object(&path, &name, "", "Event").unwrap();
        let at = &schema.properties["at"];
        assert_eq!(at.type_, "string");
        assert_eq!(at.format, "date-time");
        assert!(schema.properties["payload"].type_.is_empty());
    }

    #[test]
    fn test_example_clears_reference() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Citrus struct {
	Kind string `json:"kind"`
}

type Wrapper struct {
	Favorite Citrus `json:"favorite" example:"{\"kind\":\"orange\"}"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser.parse_schema_object(&path, &name, "", "Wrapper").unwrap();
        let favorite = &schema.properties["favorite"];
        assert!(favorite.ref_.is_empty());
        assert_eq!(
            favorite.example,
            Some(serde_json::json!({"kind": "orange"}))
        );
    }

    #[test]
    fn test_invalid_json_example_degrades_to_sentinel() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

type Basket struct {
	Fruit []string `json:"fruit" example:"{not json"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser.parse_schema_object(&path, &name, "", "Basket").unwrap();
        assert_eq!(
            schema.properties["fruit"].example,
            Some(Value::String(MESSAGE_INVALID_EXAMPLE.to_string()))
        );
    }

    #[test]
    fn test_type_doc_directives() {
        let dir = TempDir::new().unwrap();
        let mut parser = parser_for(
            &dir,
            r#"package main

// Fruit a piece of fruit
// @Title One piece of fruit
// @Description fresh from the tree
type Fruit struct {
	Color string `json:"color"`
}
"#,
        );
        let (path, name) = root_pkg(&parser);
        let schema = parser.parse_schema_object(&path, &name, "", "Fruit").unwrap();
        assert_eq!(schema.title, "One piece of fruit");
        assert_eq!(schema.description, "fresh from the tree");
    }
}
