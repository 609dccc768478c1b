//! Project tools: project CRUD and lifecycle, plus milestone and work
//! package subresources.

use serde_json::{json, Map, Value};

use super::{
    body_without, id_schema, object_schema, page_query, paged_schema, req_i64,
};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

fn project_child_schema(child_field: &str) -> Value {
    object_schema(
        json!({
            "project_id": { "type": "integer", "description": "Project ID" },
            child_field: { "type": "integer" },
        }),
        &["project_id", child_field],
    )
}

pub fn module() -> DomainModule {
    DomainModule::new("projects")
        .tool(
            "list_projects",
            "List projects with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/pr_project{}", page_query(&args))).await
            },
        )
        .tool(
            "get_project",
            "Fetch a single project by its ID",
            id_schema("project_id", "Project ID"),
            |client, args| async move {
                let id = req_i64(&args, "project_id")?;
                client.get(&format!("/pr_project/{id}")).await
            },
        )
        .tool(
            "create_project",
            "Create a project",
            object_schema(
                json!({
                    "name": { "type": "string", "description": "Project name" },
                    "contact_id": { "type": "integer", "description": "Client contact" },
                    "pr_state_id": { "type": "integer", "default": 1 },
                    "pr_project_type_id": { "type": "integer", "default": 1 },
                    "user_id": { "type": "integer", "default": 1 },
                }),
                &["name", "contact_id"],
            ),
            |client, args| async move { client.post("/pr_project", &args).await },
        )
        .tool(
            "update_project",
            "Update fields of an existing project",
            object_schema(
                json!({
                    "project_id": { "type": "integer", "description": "Project ID" },
                    "name": { "type": "string" },
                    "pr_state_id": { "type": "integer" },
                }),
                &["project_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "project_id")?;
                let body = body_without(&args, &["project_id"]);
                client.post(&format!("/pr_project/{id}"), &body).await
            },
        )
        .tool(
            "delete_project",
            "Delete a project",
            id_schema("project_id", "Project ID"),
            |client, args| async move {
                let id = req_i64(&args, "project_id")?;
                client.delete(&format!("/pr_project/{id}")).await
            },
        )
        .tool(
            "archive_project",
            "Archive a project",
            id_schema("project_id", "Project ID"),
            |client, args| async move {
                let id = req_i64(&args, "project_id")?;
                client.post_action(&format!("/pr_project/{id}/archive")).await
            },
        )
        .tool(
            "unarchive_project",
            "Restore an archived project",
            id_schema("project_id", "Project ID"),
            |client, args| async move {
                let id = req_i64(&args, "project_id")?;
                client.post_action(&format!("/pr_project/{id}/unarchive")).await
            },
        )
        .tool(
            "search_projects",
            "Search projects by field filters; string values match partially",
            object_schema(
                json!({ "filters": { "type": "object", "description": "Field/value pairs" } }),
                &["filters"],
            ),
            |client, args| async move {
                let filters = args
                    .get("filters")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_else(Map::new);
                client.search("/pr_project", &build_search_criteria(&filters)).await
            },
        )
        .tool(
            "list_project_types",
            "List project types",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/pr_project_type{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_project_type",
            "Fetch a single project type",
            id_schema("type_id", "Project type ID"),
            |client, args| async move {
                let id = req_i64(&args, "type_id")?;
                client.get(&format!("/pr_project_type/{id}")).await
            },
        )
        .tool(
            "list_project_statuses",
            "List project statuses",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/pr_project_state{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_project_status",
            "Fetch a single project status",
            id_schema("status_id", "Project status ID"),
            |client, args| async move {
                let id = req_i64(&args, "status_id")?;
                client.get(&format!("/pr_project_state/{id}")).await
            },
        )
        .tool(
            "list_milestones",
            "List milestones of a project",
            id_schema("project_id", "Project ID"),
            |client, args| async move {
                let id = req_i64(&args, "project_id")?;
                client.get(&format!("/pr_project/{id}/milestone")).await
            },
        )
        .tool(
            "get_milestone",
            "Fetch a single milestone of a project",
            project_child_schema("milestone_id"),
            |client, args| async move {
                let project = req_i64(&args, "project_id")?;
                let milestone = req_i64(&args, "milestone_id")?;
                client
                    .get(&format!("/pr_project/{project}/milestone/{milestone}"))
                    .await
            },
        )
        .tool(
            "create_milestone",
            "Create a milestone on a project",
            object_schema(
                json!({
                    "project_id": { "type": "integer", "description": "Project ID" },
                    "name": { "type": "string", "description": "Milestone name" },
                    "end_date": { "type": "string", "description": "Due date (YYYY-MM-DD)" },
                }),
                &["project_id", "name"],
            ),
            |client, args| async move {
                let project = req_i64(&args, "project_id")?;
                let body = body_without(&args, &["project_id"]);
                client
                    .post(&format!("/pr_project/{project}/milestone"), &body)
                    .await
            },
        )
        .tool(
            "delete_milestone",
            "Delete a milestone from a project",
            project_child_schema("milestone_id"),
            |client, args| async move {
                let project = req_i64(&args, "project_id")?;
                let milestone = req_i64(&args, "milestone_id")?;
                client
                    .delete(&format!("/pr_project/{project}/milestone/{milestone}"))
                    .await
            },
        )
        .tool(
            "list_work_packages",
            "List work packages of a project",
            id_schema("project_id", "Project ID"),
            |client, args| async move {
                let id = req_i64(&args, "project_id")?;
                client.get(&format!("/pr_project/{id}/workpackage")).await
            },
        )
        .tool(
            "get_work_package",
            "Fetch a single work package of a project",
            project_child_schema("workpackage_id"),
            |client, args| async move {
                let project = req_i64(&args, "project_id")?;
                let workpackage = req_i64(&args, "workpackage_id")?;
                client
                    .get(&format!("/pr_project/{project}/workpackage/{workpackage}"))
                    .await
            },
        )
        .tool(
            "create_work_package",
            "Create a work package on a project",
            object_schema(
                json!({
                    "project_id": { "type": "integer", "description": "Project ID" },
                    "name": { "type": "string", "description": "Work package name" },
                    "estimated_time_in_hours": { "type": "number" },
                }),
                &["project_id", "name"],
            ),
            |client, args| async move {
                let project = req_i64(&args, "project_id")?;
                let body = body_without(&args, &["project_id"]);
                client
                    .post(&format!("/pr_project/{project}/workpackage"), &body)
                    .await
            },
        )
        .tool(
            "update_work_package",
            "Update fields of a work package",
            object_schema(
                json!({
                    "project_id": { "type": "integer", "description": "Project ID" },
                    "workpackage_id": { "type": "integer", "description": "Work package ID" },
                    "name": { "type": "string" },
                    "estimated_time_in_hours": { "type": "number" },
                }),
                &["project_id", "workpackage_id"],
            ),
            |client, args| async move {
                let project = req_i64(&args, "project_id")?;
                let workpackage = req_i64(&args, "workpackage_id")?;
                let body = body_without(&args, &["project_id", "workpackage_id"]);
                client
                    .patch(
                        &format!("/pr_project/{project}/workpackage/{workpackage}"),
                        &body,
                    )
                    .await
            },
        )
        .tool(
            "delete_work_package",
            "Delete a work package from a project",
            project_child_schema("workpackage_id"),
            |client, args| async move {
                let project = req_i64(&args, "project_id")?;
                let workpackage = req_i64(&args, "workpackage_id")?;
                client
                    .delete(&format!("/pr_project/{project}/workpackage/{workpackage}"))
                    .await
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 21);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
