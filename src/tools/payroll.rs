//! Payroll tools: employees, absences and payroll documents. Every handler
//! checks module availability through the probe before touching its
//! endpoint, so accounts without the payroll subscription get one
//! instructive error instead of raw 403s.

use serde_json::json;

use super::{body_without, id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("payroll")
        .tool(
            "list_employees",
            "List employees (requires the Payroll module)",
            paged_schema(),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                client.get(&format!("/employee{}", page_query(&args))).await
            },
        )
        .tool(
            "get_employee",
            "Fetch a single employee (requires the Payroll module)",
            id_schema("employee_id", "Employee ID"),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                let id = req_i64(&args, "employee_id")?;
                client.get(&format!("/employee/{id}")).await
            },
        )
        .tool(
            "create_employee",
            "Create an employee (requires the Payroll module)",
            object_schema(
                json!({
                    "firstname": { "type": "string" },
                    "lastname": { "type": "string" },
                    "email": { "type": "string" },
                }),
                &["firstname", "lastname"],
            ),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                client.post("/employee", &args).await
            },
        )
        .tool(
            "update_employee",
            "Update fields of an employee (requires the Payroll module)",
            object_schema(
                json!({
                    "employee_id": { "type": "integer", "description": "Employee ID" },
                    "firstname": { "type": "string" },
                    "lastname": { "type": "string" },
                    "email": { "type": "string" },
                }),
                &["employee_id"],
            ),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                let id = req_i64(&args, "employee_id")?;
                let body = body_without(&args, &["employee_id"]);
                client.post(&format!("/employee/{id}"), &body).await
            },
        )
        .tool(
            "list_absences",
            "List absences (requires the Payroll module)",
            paged_schema(),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                client.get(&format!("/absence{}", page_query(&args))).await
            },
        )
        .tool(
            "get_absence",
            "Fetch a single absence (requires the Payroll module)",
            id_schema("absence_id", "Absence ID"),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                let id = req_i64(&args, "absence_id")?;
                client.get(&format!("/absence/{id}")).await
            },
        )
        .tool(
            "create_absence",
            "Record an absence (requires the Payroll module)",
            object_schema(
                json!({
                    "employee_id": { "type": "integer" },
                    "date_from": { "type": "string", "description": "YYYY-MM-DD" },
                    "date_to": { "type": "string", "description": "YYYY-MM-DD" },
                    "reason": { "type": "string" },
                }),
                &["employee_id", "date_from", "date_to"],
            ),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                client.post("/absence", &args).await
            },
        )
        .tool(
            "update_absence",
            "Update an absence (requires the Payroll module)",
            object_schema(
                json!({
                    "absence_id": { "type": "integer", "description": "Absence ID" },
                    "date_from": { "type": "string" },
                    "date_to": { "type": "string" },
                    "reason": { "type": "string" },
                }),
                &["absence_id"],
            ),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                let id = req_i64(&args, "absence_id")?;
                let body = body_without(&args, &["absence_id"]);
                client.post(&format!("/absence/{id}"), &body).await
            },
        )
        .tool(
            "delete_absence",
            "Delete an absence (requires the Payroll module)",
            id_schema("absence_id", "Absence ID"),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                let id = req_i64(&args, "absence_id")?;
                client.delete(&format!("/absence/{id}")).await
            },
        )
        .tool(
            "list_payroll_documents",
            "List payroll documents (requires the Payroll module)",
            paged_schema(),
            |client, args| async move {
                client.ensure_payroll_available().await?;
                client
                    .get(&format!("/payroll_document{}", page_query(&args)))
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
        assert_eq!(module.definitions.len(), 10);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
