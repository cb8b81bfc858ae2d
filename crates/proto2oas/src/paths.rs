//! Service methods → `paths` operations.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::openapi::{
    json_content, Operation, Parameter, ParameterLocation, PathItem, RequestBody, Response,
    Schema,
};
use crate::routes::{resolve_route, ResolvedRoute, RouteTable};
use crate::schema::{Message, Method, NodeId, NodeKind, SchemaTree, Service};
use crate::types::map_type;

/// Verbs whose request message travels as a query parameter.
const QUERY_VERBS: &[&str] = &["get", "delete"];

/// Route sources consulted for every method.
#[derive(Debug, Clone, Copy)]
pub struct RouteOptions<'a> {
    /// `Service.Method` overrides.
    pub routes: &'a RouteTable,
    /// Fall back to `google.api.http` bindings before the default route.
    pub http_annotations: bool,
}

/// Build one operation per method of the service at `id` and merge them into
/// `paths`, in declaration order.
///
/// An operation for a `(template, verb)` pair already present replaces the
/// earlier one.
///
/// # Errors
///
/// Returns an error if a route override is malformed, a request/response type
/// does not resolve to a message, or a path parameter has no matching request
/// field.
pub fn merge_service_paths(
    tree: &SchemaTree,
    id: NodeId,
    service: &Service,
    options: RouteOptions<'_>,
    paths: &mut IndexMap<String, PathItem>,
) -> Result<()> {
    let tag = tree.qualified_name(id);
    let service_name = tree.node(id).name();

    for method in &service.methods {
        let route = resolve_route(
            &tag,
            service_name,
            &method.name,
            options.routes,
            method.http.as_ref(),
            options.http_annotations,
        )?;
        let operation = build_operation(tree, id, &tag, method, &route)?;

        let item = paths.entry(route.template.clone()).or_default();
        if item.insert(route.verb.clone(), operation).is_some() {
            tracing::debug!(
                path = %route.template,
                verb = %route.verb,
                method = %method.name,
                "operation replaced by later method",
            );
        } else {
            tracing::debug!(path = %route.template, verb = %route.verb, "merged operation");
        }
    }

    Ok(())
}

fn build_operation(
    tree: &SchemaTree,
    service_id: NodeId,
    tag: &str,
    method: &Method,
    route: &ResolvedRoute,
) -> Result<Operation> {
    let (request_id, request) = resolve_message(tree, service_id, &method.request_type)?;
    let (response_id, response) = resolve_message(tree, service_id, &method.response_type)?;

    let mut operation = Operation {
        tags: vec![tag.to_string()],
        summary: method.comment.clone().unwrap_or_default(),
        operation_id: format!("{tag}.{}", method.name),
        parameters: Vec::new(),
        request_body: None,
        responses: IndexMap::new(),
    };

    let request_node = tree.node(request_id);
    let request_ref = Schema::reference(tree.qualified_name(request_id));
    let request_description = request_node.comment().unwrap_or_default().to_string();

    if !request.fields.is_empty() {
        if QUERY_VERBS.contains(&route.verb.as_str())
            && route.path_params.len() < request.fields.len()
        {
            operation.parameters.push(Parameter {
                name: request_node.name().to_string(),
                location: ParameterLocation::Query,
                description: request_description,
                required: false,
                schema: request_ref,
            });
        } else {
            operation.request_body = Some(RequestBody {
                description: request_description,
                content: json_content(request_ref),
                required: true,
            });
        }
    }

    for param in &route.path_params {
        let field = request
            .field_named(param)
            .ok_or_else(|| Error::UnknownPathParam {
                param: param.clone(),
                route: route.template.clone(),
                message: tree.qualified_name(request_id),
            })?;

        operation.parameters.push(Parameter {
            name: param.clone(),
            location: ParameterLocation::Path,
            description: field.comment.clone().unwrap_or_default(),
            required: true,
            schema: map_type(tree, request_id, &field.type_name, None)?,
        });
    }

    let response_description = tree
        .node(response_id)
        .comment()
        .unwrap_or_default()
        .to_string();
    let content = (!response.fields.is_empty())
        .then(|| json_content(Schema::reference(tree.qualified_name(response_id))));
    operation.responses.insert(
        "200".to_string(),
        Response {
            description: response_description,
            content,
        },
    );

    Ok(operation)
}

/// Resolve a method's request/response type to its message node.
fn resolve_message<'t>(
    tree: &'t SchemaTree,
    scope: NodeId,
    type_name: &str,
) -> Result<(NodeId, &'t Message)> {
    let id = tree
        .lookup(type_name, scope)
        .ok_or_else(|| Error::UnresolvedType {
            type_name: type_name.to_string(),
            scope: tree.full_name(scope),
        })?;

    match tree.node(id).kind() {
        NodeKind::Message(message) => Ok((id, message)),
        _ => Err(Error::NotAMessage {
            type_name: type_name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::schema::{Enum, Field};

    /// `user` package with a `User` service whose methods are added by each test.
    fn user_tree(methods: Vec<Method>) -> (SchemaTree, NodeId, Service) {
        let mut tree = SchemaTree::new();
        let pkg = tree.namespace(tree.root(), "user");
        let get_req = tree.insert(
            pkg,
            "GetUserRequest",
            NodeKind::Message(
                Message::new()
                    .field(Field::new("userId", "int64").comment("user id"))
                    .field(Field::new("verbose", "bool")),
            ),
        );
        tree.set_comment(get_req, "Lookup request");
        tree.insert(
            pkg,
            "IdOnly",
            NodeKind::Message(Message::new().field(Field::new("userId", "string"))),
        );
        let user = tree.insert(
            pkg,
            "UserInfo",
            NodeKind::Message(Message::new().field(Field::new("name", "string"))),
        );
        tree.set_comment(user, "A user");
        tree.insert(pkg, "Empty", NodeKind::Message(Message::new()));
        tree.insert(pkg, "Role", NodeKind::Enum(Enum::new().value("ADMIN", 0)));

        let service = methods
            .into_iter()
            .fold(Service::new(), Service::method);
        let id = tree.insert(pkg, "User", NodeKind::Service(service.clone()));
        (tree, id, service)
    }

    fn run(
        methods: Vec<Method>,
        routes: &[(&str, &str)],
    ) -> Result<IndexMap<String, PathItem>> {
        let (tree, id, service) = user_tree(methods);
        let routes: RouteTable = routes
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut paths = IndexMap::new();
        merge_service_paths(
            &tree,
            id,
            &service,
            RouteOptions {
                routes: &routes,
                http_annotations: false,
            },
            &mut paths,
        )?;
        Ok(paths)
    }

    #[test]
    fn default_route_posts_request_body() {
        let paths = run(
            vec![Method::new("getUser", "GetUserRequest", "UserInfo").comment("Fetch a user")],
            &[],
        )
        .unwrap();

        let op = &paths["/user.User/getUser"]["post"];
        assert_eq!(
            serde_json::to_value(op).unwrap(),
            json!({
                "tags": ["user.User"],
                "summary": "Fetch a user",
                "operationId": "user.User.getUser",
                "requestBody": {
                    "description": "Lookup request",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/user.GetUserRequest" }
                        }
                    },
                    "required": true
                },
                "responses": {
                    "200": {
                        "description": "A user",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/user.UserInfo" }
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn get_with_leftover_fields_uses_query_and_path_params() {
        let paths = run(
            vec![Method::new("getUser", "GetUserRequest", "UserInfo")],
            &[("User.getUser", "get /users/:userId")],
        )
        .unwrap();

        let op = &paths["/users/{userId}"]["get"];
        assert!(op.request_body.is_none());
        assert_eq!(
            serde_json::to_value(&op.parameters).unwrap(),
            json!([
                {
                    "name": "GetUserRequest",
                    "in": "query",
                    "description": "Lookup request",
                    "required": false,
                    "schema": { "$ref": "#/components/schemas/user.GetUserRequest" }
                },
                {
                    "name": "userId",
                    "in": "path",
                    "description": "user id",
                    "required": true,
                    "schema": { "type": "integer", "format": "int64" }
                }
            ])
        );
    }

    #[test]
    fn get_with_all_fields_in_path_falls_back_to_body() {
        let paths = run(
            vec![Method::new("getById", "IdOnly", "UserInfo")],
            &[("User.getById", "get /users/:userId")],
        )
        .unwrap();

        let op = &paths["/users/{userId}"]["get"];
        assert!(op.request_body.is_some());
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].location, ParameterLocation::Path);
    }

    #[test]
    fn empty_messages_skip_body_and_response_content() {
        let paths = run(vec![Method::new("ping", "Empty", "Empty")], &[]).unwrap();

        let op = &paths["/user.User/ping"]["post"];
        assert!(op.request_body.is_none());
        assert!(op.parameters.is_empty());
        assert_eq!(
            serde_json::to_value(&op.responses).unwrap(),
            json!({ "200": { "description": "" } })
        );
    }

    #[test]
    fn verbs_share_a_template_and_later_methods_win() {
        let paths = run(
            vec![
                Method::new("getUser", "GetUserRequest", "UserInfo"),
                Method::new("deleteUser", "GetUserRequest", "Empty"),
                Method::new("fetchUser", "IdOnly", "UserInfo"),
            ],
            &[
                ("User.getUser", "get /users/:userId"),
                ("User.deleteUser", "delete /users/:userId"),
                ("User.fetchUser", "get /users/:userId"),
            ],
        )
        .unwrap();

        assert_eq!(paths.len(), 1);
        let item = &paths["/users/{userId}"];
        assert_eq!(item.keys().collect::<Vec<_>>(), vec!["get", "delete"]);
        assert_eq!(item["get"].operation_id, "user.User.fetchUser");
    }

    #[test]
    fn unknown_path_param_is_fatal() {
        let err = run(
            vec![Method::new("getUser", "GetUserRequest", "UserInfo")],
            &[("User.getUser", "get /users/:id")],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownPathParam { ref param, ref message, .. }
                if param == "id" && message == "user.GetUserRequest"
        ));
    }

    #[test]
    fn unresolved_request_type_is_fatal() {
        let err = run(vec![Method::new("getUser", "Missing", "UserInfo")], &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedType { ref type_name, .. } if type_name == "Missing"
        ));
    }

    #[test]
    fn enum_request_type_is_rejected() {
        let err = run(vec![Method::new("getRole", "Role", "UserInfo")], &[]).unwrap_err();
        assert!(matches!(err, Error::NotAMessage { ref type_name } if type_name == "Role"));
    }

    #[test]
    fn fully_qualified_request_types_resolve() {
        let paths = run(
            vec![Method::new("getUser", ".user.GetUserRequest", "user.UserInfo")],
            &[],
        )
        .unwrap();
        assert!(paths["/user.User/getUser"]["post"].request_body.is_some());
    }
}
