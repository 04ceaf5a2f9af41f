//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::sink::StreamingSink;
use crate::tables::{Plugin, Query};
use crate::types::Row;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Tables => self.tables(),
            Commands::Columns { table } => self.columns(table),
            Commands::Query {
                table,
                quals,
                limit,
                get,
            } => self.query(table, quals, *limit, *get).await,
            Commands::Serve { port } => {
                let plugin = self.plugin()?;
                crate::cli::serve(plugin, *port).await
            }
        }
    }

    /// Load connection configuration; inline JSON wins over a file
    pub fn load_config(&self) -> Result<ConnectionConfig> {
        if let Some(json_str) = &self.cli.config_json {
            return ConnectionConfig::from_json(json_str);
        }

        if let Some(path) = &self.cli.config {
            return ConnectionConfig::from_file(path);
        }

        // Token and endpoint come from the environment
        Ok(ConnectionConfig::default())
    }

    fn plugin(&self) -> Result<Plugin> {
        Ok(Plugin::new(Connection::new(self.load_config()?)))
    }

    /// List tables
    fn tables(&self) -> Result<()> {
        let plugin = self.plugin()?;
        for table in plugin.tables() {
            self.output_message(&json!({
                "name": table.name,
                "description": table.description,
            }));
        }
        Ok(())
    }

    /// Show the columns of one table
    fn columns(&self, name: &str) -> Result<()> {
        let plugin = self.plugin()?;
        let table = plugin.table(name)?;
        for column in &table.columns {
            self.output_message(&serde_json::to_value(column)?);
        }
        Ok(())
    }

    /// List or get rows
    async fn query(
        &self,
        table: &str,
        quals: &[(String, String)],
        limit: Option<u64>,
        get: bool,
    ) -> Result<()> {
        let plugin = self.plugin()?;
        let query = build_query(quals, limit);
        let start = Instant::now();

        // Ctrl-C stops paging but keeps rows already printed
        let cancel = query.cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let result = if get {
            plugin.get(table, &query).await.map(|row| {
                if let Some(row) = row {
                    self.output_message(&Value::Object(row));
                }
            })
        } else {
            let format = self.cli.format;
            let mut sink = StreamingSink::new(
                move |row: Row| print_value(format, &Value::Object(row)),
                None,
            );
            plugin.list(table, &query, &mut sink).await.map(|outcome| {
                debug!("Stopped: {:?}", outcome.stop);
            })
        };
        watcher.abort();
        result?;

        info!(
            "Query on {} finished in {:.2}s",
            table,
            start.elapsed().as_secs_f64()
        );
        if query.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        print_value(self.cli.format, msg);
    }
}

/// Turn `--qual` pairs into a query
fn build_query(quals: &[(String, String)], limit: Option<u64>) -> Query {
    let mut query = Query::new();
    for (column, value) in quals {
        query = query.qual(column.as_str(), value.as_str());
    }
    query.limit = limit;
    query
}

fn print_value(format: OutputFormat, msg: &Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
        OutputFormat::Pretty => {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        }
    }
}
