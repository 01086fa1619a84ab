//! Node command handlers.

use tabled::Tabled;

use dpsync_core::{Node, SiteClient, catalog};

use crate::cli::{GlobalOpts, NodesArgs, NodesCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Node> for NodeRow {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id.clone(),
            name: n.name.clone(),
            server: n.server.clone().unwrap_or_default(),
            description: n.description.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &SiteClient,
    args: NodesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NodesCommand::List => {
            let nodes = catalog::list_nodes(client).await?;
            let format = global.output_format();
            let out = output::render_list(&format, &nodes, |n| NodeRow::from(n), |n| n.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
