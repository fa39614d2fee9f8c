use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use clap::Subcommand;
use tokio::net::TcpListener;
use tokio::runtime::{Builder, Runtime};
use tracing::info;
use tracker_core::view::TableRenderer;
use tracker_server::TrackerServer;

use crate::args::{FetchArgs, ServeArgs};
use crate::config::ProviderConfig;
use crate::table::format_view;

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the data api (default).
    Serve(ServeArgs),
    /// Fetch the spreadsheet once and print it.
    Fetch(FetchArgs),
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Serve(serve) => serve.run(),
            Commands::Fetch(fetch) => fetch.run(),
        }
    }
}

trait RunCommand {
    fn run(self) -> Result<()>;
}

impl RunCommand for ServeArgs {
    fn run(self) -> Result<()> {
        // Bad configuration should fail before anything is bound.
        let conf = ProviderConfig::from_args(self.sheet)?;
        info!(
            spreadsheet_id = %conf.sheets.spreadsheet_id,
            column_mode = ?conf.sheets.column_mode,
            "resolved provider config"
        );
        let sheets = conf.into_client()?;
        let bind = self.bind;

        let runtime = build_runtime("server")?;
        runtime.block_on(async move {
            let listener = TcpListener::bind(&bind).await?;
            let server = TrackerServer::new(listener, sheets);
            info!(addr = %server.local_addr()?, "listening");
            server.serve().await?;
            Ok::<_, anyhow::Error>(())
        })
    }
}

impl RunCommand for FetchArgs {
    fn run(self) -> Result<()> {
        let sheets = ProviderConfig::from_args(self.sheet)?.into_client()?;

        let runtime = build_runtime("fetch")?;
        let contents = runtime.block_on(sheets.fetch_contents())?;

        let mut stdout = std::io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &contents)?;
            writeln!(stdout)?;
            return Ok(());
        }

        let mut renderer = TableRenderer::new();
        renderer.load(contents);
        let query = self.query.unwrap_or_default();
        if let Some(view) = renderer.filter(&query) {
            write!(stdout, "{}", format_view(&view))?;
        }

        Ok(())
    }
}

fn build_runtime(thread_label: &'static str) -> Result<Runtime> {
    let runtime = Builder::new_multi_thread()
        .thread_name_fn(move || {
            static THREAD_ID: AtomicU64 = AtomicU64::new(0);
            let id = THREAD_ID.fetch_add(1, Ordering::Relaxed);
            format!("{}-thread-{}", thread_label, id)
        })
        .enable_all()
        .build()?;

    Ok(runtime)
}
