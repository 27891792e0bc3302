//! Record commands shared by every entity.

use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use grc_core::config::AppConfig;
use grc_core::error::AppError;
use grc_core::traits::Row;
use grc_core::types::{FilterInput, SearchRequest, SortDirection};
use grc_entity::{
    Assessment, ComplianceFramework, Control, ControlMapping, Entity, Incident, Policy,
    Requirement, Vulnerability,
};
use grc_service::EntityRepository;

/// Entity a record command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    /// Security incidents
    Incident,
    /// Vulnerabilities
    Vulnerability,
    /// Policies
    Policy,
    /// Controls
    Control,
    /// Compliance frameworks
    Framework,
    /// Framework requirements
    Requirement,
    /// Requirement-to-control mappings
    Mapping,
    /// Assessments
    Assessment,
}

/// Sort direction flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Order {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl From<Order> for SortDirection {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortDirection::Asc,
            Order::Desc => SortDirection::Desc,
        }
    }
}

/// Search options shared by `list` and `count`
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Free-text search across the entity's text columns
    #[arg(short, long)]
    pub query: Option<String>,
    /// Filter as `field=v1,v2` or `field=start..end`; repeatable
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,
}

impl SearchArgs {
    /// Build the search request these options describe.
    pub fn to_request(&self) -> Result<SearchRequest, AppError> {
        let mut request = SearchRequest::new();
        if let Some(query) = &self.query {
            request = request.query(query.clone());
        }
        for raw in &self.filters {
            let (field, input) = parse_filter(raw)?;
            request = request.filter(field, input);
        }
        Ok(request)
    }
}

/// Record subcommands
#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// List one page of records
    List {
        /// Entity to list
        entity: EntityKind,
        #[command(flatten)]
        search: SearchArgs,
        /// Sort column
        #[arg(long)]
        sort: Option<String>,
        /// Sort direction
        #[arg(long, value_enum)]
        order: Option<Order>,
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Records per page [default: query.default_page_size]
        #[arg(long)]
        page_size: Option<u64>,
    },
    /// Count records grouped by a field
    Count {
        /// Entity to count
        entity: EntityKind,
        /// Field to group by
        field: String,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Show one record
    Get {
        /// Entity type
        entity: EntityKind,
        /// Record id
        id: Uuid,
    },
    /// Create a record from a JSON object
    Create {
        /// Entity type
        entity: EntityKind,
        /// JSON object with the new record's fields
        #[arg(short, long)]
        data: String,
    },
    /// Update fields of a record from a JSON object
    Update {
        /// Entity type
        entity: EntityKind,
        /// Record id
        id: Uuid,
        /// JSON object with the fields to change
        #[arg(short, long)]
        data: String,
    },
    /// Move a record to a new status
    SetStatus {
        /// Entity type
        entity: EntityKind,
        /// Record id
        id: Uuid,
        /// New status label
        status: String,
        /// JSON object with fields written together with the status
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Delete a record
    Delete {
        /// Entity type
        entity: EntityKind,
        /// Record id
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

impl RecordCommand {
    fn entity(&self) -> EntityKind {
        match self {
            Self::List { entity, .. }
            | Self::Count { entity, .. }
            | Self::Get { entity, .. }
            | Self::Create { entity, .. }
            | Self::Update { entity, .. }
            | Self::SetStatus { entity, .. }
            | Self::Delete { entity, .. } => *entity,
        }
    }
}

/// Execute record commands
pub async fn execute(
    command: &RecordCommand,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let repos = super::connect_repositories(config).await?;

    match command.entity() {
        EntityKind::Incident => run::<Incident>(&repos.incidents, command, format).await,
        EntityKind::Vulnerability => {
            run::<Vulnerability>(&repos.vulnerabilities, command, format).await
        }
        EntityKind::Policy => run::<Policy>(&repos.policies, command, format).await,
        EntityKind::Control => run::<Control>(&repos.controls, command, format).await,
        EntityKind::Framework => {
            run::<ComplianceFramework>(&repos.frameworks, command, format).await
        }
        EntityKind::Requirement => {
            run::<Requirement>(&repos.requirements, command, format).await
        }
        EntityKind::Mapping => {
            run::<ControlMapping>(&repos.mappings, command, format).await
        }
        EntityKind::Assessment => {
            run::<Assessment>(&repos.assessments, command, format).await
        }
    }
}

async fn run<E: Entity>(
    repo: &EntityRepository<E>,
    command: &RecordCommand,
    format: OutputFormat,
) -> Result<(), AppError> {
    match command {
        RecordCommand::List {
            search,
            sort,
            order,
            page,
            page_size,
            ..
        } => {
            let mut request = search.to_request()?;
            request.sort_by = sort.clone();
            request.sort_order = order.map(SortDirection::from);
            request.page = *page;
            request.page_size = *page_size;

            let page = repo.list(&request).await?;
            output::print_page(&page, E::LIST_COLUMNS, format);
        }
        RecordCommand::Count { field, search, .. } => {
            let counts = repo.count_by(field, &search.to_request()?).await?;
            output::print_counts(&counts, format);
        }
        RecordCommand::Get { id, .. } => {
            let record = repo.get_by_id(*id).await?;
            output::print_item(&record, format);
        }
        RecordCommand::Create { data, .. } => {
            let input: E::Create = parse_json(data)?;
            let record = repo.create(&input).await?;
            output::print_item(&record, format);
            output::print_success(&format!("Created {} {}", E::NAME, record.id()));
        }
        RecordCommand::Update { id, data, .. } => {
            let changes: E::Update = parse_json(data)?;
            let record = repo.update(*id, &changes).await?;
            output::print_item(&record, format);
            output::print_success(&format!("Updated {} {id}", E::NAME));
        }
        RecordCommand::SetStatus {
            id, status, data, ..
        } => {
            let status: E::Status = status.parse()?;
            let extra = data.as_deref().map(parse_object).transpose()?;
            let record = repo.update_status(*id, status, extra).await?;
            output::print_item(&record, format);
            output::print_success(&format!("{} {id} is now {status}", E::NAME));
        }
        RecordCommand::Delete { id, force, .. } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete {} {id}? This cannot be undone.", E::NAME))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    output::print_warning("Cancelled.");
                    return Ok(());
                }
            }
            repo.delete(*id).await?;
            output::print_success(&format!("Deleted {} {id}", E::NAME));
        }
    }

    Ok(())
}

/// Parse `field=v1,v2` into a value list or `field=start..end` into a
/// date range.
pub fn parse_filter(raw: &str) -> Result<(String, FilterInput), AppError> {
    let (field, value) = raw
        .split_once('=')
        .map(|(f, v)| (f.trim(), v.trim()))
        .filter(|(f, _)| !f.is_empty())
        .ok_or_else(|| {
            AppError::validation(format!("Filter '{raw}' must look like field=value"))
        })?;

    let input = match value.split_once("..") {
        Some((start, end)) => FilterInput::range(start.trim(), end.trim()),
        None => FilterInput::values(
            value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty()),
        ),
    };
    Ok((field.to_string(), input))
}

fn parse_json<T: serde::de::DeserializeOwned>(data: &str) -> Result<T, AppError> {
    serde_json::from_str(data)
        .map_err(|e| AppError::validation(format!("Invalid JSON payload: {e}")))
}

fn parse_object(data: &str) -> Result<Row, AppError> {
    match parse_json::<Value>(data)? {
        Value::Object(row) => Ok(row),
        other => Err(AppError::validation(format!(
            "Expected a JSON object, got {other}"
        ))),
    }
}
