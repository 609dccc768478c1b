//! Reference data tools: the simple name-keyed catalogs bexio uses across
//! documents (groups, sectors, salutations, titles, countries, languages,
//! units). All follow the same list/get/create(/delete) shape, so the tools
//! are stamped out by a local helper.

use serde_json::json;

use super::{id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::registry::DomainModule;

struct Resource {
    singular: &'static str,
    plural: &'static str,
    endpoint: &'static str,
    id_field: &'static str,
    deletable: bool,
}

fn add_resource(mut module: DomainModule, resource: Resource) -> DomainModule {
    let Resource {
        singular,
        plural,
        endpoint,
        id_field,
        deletable,
    } = resource;

    module = module
        .tool(
            &format!("list_{plural}"),
            &format!("List {}", plural.replace('_', " ")),
            paged_schema(),
            move |client, args| async move {
                client.get(&format!("{endpoint}{}", page_query(&args))).await
            },
        )
        .tool(
            &format!("get_{singular}"),
            &format!("Fetch a single {}", singular.replace('_', " ")),
            id_schema(id_field, "Record ID"),
            move |client, args| async move {
                let id = req_i64(&args, id_field)?;
                client.get(&format!("{endpoint}/{id}")).await
            },
        )
        .tool(
            &format!("create_{singular}"),
            &format!("Create a {}", singular.replace('_', " ")),
            object_schema(
                json!({ "name": { "type": "string", "description": "Name of the record" } }),
                &["name"],
            ),
            move |client, args| async move { client.post(endpoint, &args).await },
        );

    if deletable {
        module = module.tool(
            &format!("delete_{singular}"),
            &format!("Delete a {}", singular.replace('_', " ")),
            id_schema(id_field, "Record ID"),
            move |client, args| async move {
                let id = req_i64(&args, id_field)?;
                client.delete(&format!("{endpoint}/{id}")).await
            },
        );
    }
    module
}

pub fn module() -> DomainModule {
    let mut module = DomainModule::new("reference");
    for resource in [
        Resource {
            singular: "contact_group",
            plural: "contact_groups",
            endpoint: "/contact_group",
            id_field: "group_id",
            deletable: true,
        },
        Resource {
            singular: "contact_sector",
            plural: "contact_sectors",
            endpoint: "/contact_sector",
            id_field: "sector_id",
            deletable: false,
        },
        Resource {
            singular: "salutation",
            plural: "salutations",
            endpoint: "/salutation",
            id_field: "salutation_id",
            deletable: true,
        },
        Resource {
            singular: "title",
            plural: "titles",
            endpoint: "/title",
            id_field: "title_id",
            deletable: true,
        },
        Resource {
            singular: "country",
            plural: "countries",
            endpoint: "/country",
            id_field: "country_id",
            deletable: true,
        },
        Resource {
            singular: "language",
            plural: "languages",
            endpoint: "/language",
            id_field: "language_id",
            deletable: false,
        },
        Resource {
            singular: "unit",
            plural: "units",
            endpoint: "/unit",
            id_field: "unit_id",
            deletable: true,
        },
    ] {
        module = add_resource(module, resource);
    }
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        // 5 deletable resources with 4 tools, 2 without delete at 3 tools.
        assert_eq!(module.definitions.len(), 26);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }

    #[test]
    fn non_deletable_catalogs_have_no_delete_tool() {
        let module = module();
        let names: Vec<&str> = module.definitions.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"list_countries"));
        assert!(names.contains(&"delete_country"));
        assert!(names.contains(&"create_language"));
        assert!(!names.contains(&"delete_language"));
        assert!(!names.contains(&"delete_contact_sector"));
    }
}
