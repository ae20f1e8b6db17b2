//! `types` and `schema`: everything answerable without a server.

use serde::Serialize;
use tabled::Tabled;

use nxrm_core::{Provider, Schema};

use crate::cli::{GlobalOpts, SchemaArgs, TypesArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct TypeInfo {
    name: String,
    kind: &'static str,
    version: i64,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    deprecation: Option<String>,
}

impl TypeInfo {
    fn new(name: &str, kind: &'static str, schema: &Schema) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            version: schema.version,
            description: schema.description.clone(),
            deprecation: schema.deprecation.clone(),
        }
    }
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Ver")]
    version: i64,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&TypeInfo> for TypeRow {
    fn from(t: &TypeInfo) -> Self {
        let mut description = t.description.lines().next().unwrap_or_default().to_owned();
        if t.deprecation.is_some() {
            description.insert_str(0, "[deprecated] ");
        }
        Self {
            name: t.name.clone(),
            kind: t.kind,
            version: t.version,
            description,
        }
    }
}

fn collect_types(provider: &Provider, args: &TypesArgs) -> Result<Vec<TypeInfo>, CliError> {
    let mut types = Vec::new();
    if !args.data_sources {
        for name in provider.resource_types() {
            let schema = provider.resource(name)?.schema();
            types.push(TypeInfo::new(name, "resource", schema));
        }
    }
    if !args.resources {
        for name in provider.data_source_types() {
            let schema = provider.data_source(name)?.schema();
            types.push(TypeInfo::new(name, "data source", schema));
        }
    }
    Ok(types)
}

pub fn types(provider: &Provider, args: &TypesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let types = collect_types(provider, args)?;
    let out = output::render_list(global.output, &types, |t| TypeRow::from(t), |t| t.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn schema(provider: &Provider, args: &SchemaArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.type_name.as_deref() {
        None => output::render_document(global.output, &provider.schema_export())?,
        Some(name) if args.data_source => {
            output::render_document(global.output, provider.data_source(name)?.schema())?
        }
        Some(name) => output::render_document(global.output, provider.resource(name)?.schema())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_kind() {
        let provider = Provider::new();
        let only_data = TypesArgs {
            data_sources: true,
            resources: false,
        };
        let listed = collect_types(&provider, &only_data).unwrap_or_default();
        assert_eq!(listed.len(), provider.data_source_types().count());
        assert!(listed.iter().all(|t| t.kind == "data source"));

        let all = TypesArgs {
            data_sources: false,
            resources: false,
        };
        let listed = collect_types(&provider, &all).unwrap_or_default();
        assert_eq!(
            listed.len(),
            provider.resource_types().count() + provider.data_source_types().count()
        );
    }
}
